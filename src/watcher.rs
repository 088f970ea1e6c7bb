//! Receipt watching.
//!
//! The transfer controller never polls. It consumes a [`ReceiptWatcher`] stream and
//! leaves intervals, timeouts and RPC hiccups to the watcher.

use crate::transfer::TxHandle;
use ethers::prelude::*;
use ethers::providers::{Http, Provider};
use futures::stream::{self, BoxStream, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

/// What a watcher reports about a broadcast transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// Broadcast but not mined yet
    Pending,
    Confirmed { block_number: Option<u64> },
    /// Reverted, dropped, or timed out
    Failed(String),
}

/// Source of status events for a transaction handle.
pub trait ReceiptWatcher: Send + Sync {
    /// Stream ends after `Confirmed` or `Failed`.
    fn watch(&self, handle: TxHandle) -> BoxStream<'static, WatchEvent>;
}

/// Polls `eth_getTransactionReceipt` until a receipt shows up or the timeout passes.
pub struct ProviderReceiptWatcher {
    provider: Arc<Provider<Http>>,
    poll_interval: Duration,
    timeout: Duration,
}

enum PollState {
    Announce,
    Polling,
    Done,
}

impl ProviderReceiptWatcher {
    pub fn new(provider: Arc<Provider<Http>>, poll_interval: Duration, timeout: Duration) -> Self {
        Self {
            provider,
            poll_interval,
            timeout,
        }
    }

    pub fn from_config(provider: Arc<Provider<Http>>, config: &crate::config::Config) -> Self {
        Self::new(provider, config.poll_interval(), config.confirmation_timeout())
    }
}

/// Map a mined receipt to its final event.
pub fn receipt_event(receipt: &TransactionReceipt) -> WatchEvent {
    let block_number = receipt.block_number.map(|n| n.as_u64());
    match receipt.status {
        Some(status) if status.is_zero() => WatchEvent::Failed("transaction reverted".to_string()),
        _ => WatchEvent::Confirmed { block_number },
    }
}

impl ReceiptWatcher for ProviderReceiptWatcher {
    fn watch(&self, handle: TxHandle) -> BoxStream<'static, WatchEvent> {
        let provider = self.provider.clone();
        let poll_interval = self.poll_interval;
        let timeout = self.timeout;
        let deadline = Instant::now() + timeout;

        stream::unfold(PollState::Announce, move |state| {
            let provider = provider.clone();
            async move {
                match state {
                    PollState::Done => None,
                    PollState::Announce => Some((WatchEvent::Pending, PollState::Polling)),
                    PollState::Polling => loop {
                        match provider.get_transaction_receipt(handle.hash()).await {
                            Ok(Some(receipt)) => {
                                debug!("Receipt for {} in block {:?}", handle, receipt.block_number);
                                return Some((receipt_event(&receipt), PollState::Done));
                            }
                            Ok(None) => {}
                            Err(e) => warn!("Receipt lookup for {} failed: {}", handle, e),
                        }

                        if Instant::now() >= deadline {
                            return Some((
                                WatchEvent::Failed(format!(
                                    "Confirmation timeout after {} seconds",
                                    timeout.as_secs()
                                )),
                                PollState::Done,
                            ));
                        }
                        sleep(poll_interval).await;
                    },
                }
            }
        })
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt(status: Option<u64>, block: Option<u64>) -> TransactionReceipt {
        TransactionReceipt {
            status: status.map(U64::from),
            block_number: block.map(U64::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_receipt_success() {
        assert_eq!(
            receipt_event(&receipt(Some(1), Some(100))),
            WatchEvent::Confirmed {
                block_number: Some(100)
            }
        );
    }

    #[test]
    fn test_receipt_reverted() {
        assert_eq!(
            receipt_event(&receipt(Some(0), Some(100))),
            WatchEvent::Failed("transaction reverted".to_string())
        );
    }

    #[test]
    fn test_pre_byzantium_receipt_counts_as_confirmed() {
        assert!(matches!(
            receipt_event(&receipt(None, Some(5))),
            WatchEvent::Confirmed { .. }
        ));
    }

    #[tokio::test]
    async fn test_unreachable_node_times_out() {
        // Nothing listens on port 9; every lookup errors until the deadline passes
        let provider = Arc::new(Provider::<Http>::try_from("http://127.0.0.1:9").unwrap());
        let watcher =
            ProviderReceiptWatcher::new(provider, Duration::from_millis(10), Duration::from_millis(50));

        let events: Vec<_> = watcher
            .watch(TxHandle::new(TxHash::zero()))
            .collect()
            .await;

        assert_eq!(events.len(), 2);
        assert_eq!(events[0], WatchEvent::Pending);
        assert!(matches!(&events[1], WatchEvent::Failed(reason) if reason.contains("timeout")));
    }
}
