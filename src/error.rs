//! Error types for the transfer workflow.

use thiserror::Error;

/// Everything that can stop a transfer, from form validation to on-chain failure.
///
/// Validation variants are recoverable by editing the form. `SubmissionRejected` and
/// `ConfirmationFailed` end the current attempt; the user may submit again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("Improper address: {0}")]
    InvalidAddress(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Balance unavailable: {0}")]
    InvalidBalance(String),

    #[error("Insufficient funds: {amount} + {margin} reserve exceeds balance {balance}")]
    InsufficientFunds {
        amount: String,
        margin: String,
        balance: String,
    },

    #[error("Transaction rejected: {0}")]
    SubmissionRejected(String),

    #[error("Transaction failed: {0}")]
    ConfirmationFailed(String),
}
