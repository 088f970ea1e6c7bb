//! Notification entries shown in the side list.

use crate::transfer::TransferOutcome;

/// A notification entry with message and timestamp
#[derive(Clone)]
pub struct NotificationEntry {
    pub message: String,
    pub timestamp: chrono::DateTime<chrono::Local>,
}

impl NotificationEntry {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timestamp: chrono::Local::now(),
        }
    }

    pub fn time_ago(&self) -> String {
        let now = chrono::Local::now();
        let duration = now.signed_duration_since(self.timestamp);
        if duration.num_seconds() < 60 {
            "just now".to_string()
        } else if duration.num_minutes() < 60 {
            format!("{}m ago", duration.num_minutes())
        } else if duration.num_hours() < 24 {
            format!("{}h ago", duration.num_hours())
        } else {
            self.timestamp.format("%m/%d %H:%M").to_string()
        }
    }
}

/// Notification text for an outcome worth announcing, if any.
pub fn outcome_notification(symbol: &str, outcome: &TransferOutcome) -> Option<String> {
    match outcome {
        TransferOutcome::Submitted(handle) => Some(format!("{} transfer sent: {}", symbol, handle)),
        TransferOutcome::Confirmed { handle, .. } => {
            Some(format!("{} transfer confirmed: {}", symbol, handle))
        }
        TransferOutcome::Failed { error, .. } => {
            let message = error.to_string();
            // Wallet rejections are usually the user pressing "reject"
            if message.contains("denied") || message.contains("rejected by user") {
                Some(format!("{} transfer cancelled in wallet.", symbol))
            } else {
                Some(format!("{} transfer failed: {}", symbol, message))
            }
        }
        TransferOutcome::Idle | TransferOutcome::Validating | TransferOutcome::Confirming(_) => None,
    }
}

/// Notification text for a finished faucet claim.
pub fn claim_notification(symbol: &str, outcome: &TransferOutcome) -> String {
    match outcome {
        TransferOutcome::Confirmed { handle, .. } => format!("{} claimed: {}", symbol, handle),
        TransferOutcome::Failed { error, .. } => {
            let message = error.to_string();
            if message.contains("denied") || message.contains("rejected by user") {
                format!("{} claim cancelled in wallet.", symbol)
            } else {
                format!("{} claim failed: {}", symbol, message)
            }
        }
        _ => format!("{} claim sent.", symbol),
    }
}
