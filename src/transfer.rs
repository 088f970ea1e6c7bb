//! Transfer workflow controller.
//!
//! One controller backs one send form. It validates user input, hands a
//! [`TransferRequest`] to the injected [`TransferSigner`], and follows the resulting
//! transaction through the injected [`ReceiptWatcher`] until it is confirmed or fails.
//!
//! Every submission is an attempt with its own [`AttemptId`] and cancellation token.
//! Starting a new attempt cancels the previous one, and any event still in flight for
//! it is discarded by [`TransferController::apply`].

use crate::address::{self, ChecksumPolicy};
use crate::config::ExplorerTable;
use crate::error::TransferError;
use crate::signer::TransferSigner;
use crate::utils::{self, NATIVE_DECIMALS};
use crate::watcher::{ReceiptWatcher, WatchEvent};
use ethers::types::{Address, TxHash, U256};
use futures::stream::{self, BoxStream, StreamExt};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// ERC-20 token metadata needed to move it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub contract: Address,
    pub symbol: String,
    pub decimals: u8,
}

/// What a send form moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Asset {
    Native { symbol: String },
    Token(TokenInfo),
}

impl Asset {
    pub fn native(symbol: impl Into<String>) -> Self {
        Asset::Native {
            symbol: symbol.into(),
        }
    }

    pub fn decimals(&self) -> u32 {
        match self {
            Asset::Native { .. } => NATIVE_DECIMALS,
            Asset::Token(token) => token.decimals as u32,
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            Asset::Native { symbol } => symbol,
            Asset::Token(token) => &token.symbol,
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Asset::Native { .. })
    }

    /// Token metadata, or None for the native currency.
    pub fn token(&self) -> Option<&TokenInfo> {
        match self {
            Asset::Token(info) => Some(info),
            Asset::Native { .. } => None,
        }
    }
}

/// Opaque transaction identifier returned by the signer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxHandle(TxHash);

impl TxHandle {
    pub fn new(hash: TxHash) -> Self {
        Self(hash)
    }

    pub fn hash(&self) -> TxHash {
        self.0
    }
}

impl From<TxHash> for TxHandle {
    fn from(hash: TxHash) -> Self {
        Self(hash)
    }
}

impl fmt::Display for TxHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// Validation knobs taken from [`crate::config::Config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPolicy {
    /// Headroom kept for fees, in the asset's display units
    pub reserve_margin: String,
    pub checksum: ChecksumPolicy,
}

impl Default for TransferPolicy {
    fn default() -> Self {
        Self {
            reserve_margin: crate::config::DEFAULT_RESERVE_MARGIN.to_string(),
            checksum: ChecksumPolicy::default(),
        }
    }
}

/// A validated transfer. Only [`validate`] builds one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    recipient: String,
    to: Address,
    amount: String,
    amount_base_units: U256,
    asset: Asset,
    chain_id: u64,
}

impl TransferRequest {
    /// Recipient exactly as entered (trimmed)
    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn to(&self) -> Address {
        self.to
    }

    /// Amount exactly as entered (trimmed)
    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn amount_base_units(&self) -> U256 {
        self.amount_base_units
    }

    pub fn asset(&self) -> &Asset {
        &self.asset
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn describe(&self) -> String {
        format!("{} {} to {}", self.amount, self.asset.symbol(), self.recipient)
    }
}

/// Check recipient, amount and funds, and build a request.
///
/// Errors come back in a fixed order: address, then amount, then balance, then funds.
/// Funds are insufficient when `amount + reserve margin >= balance`, compared exactly
/// in base units.
pub fn validate(
    recipient: &str,
    amount: &str,
    balance: &str,
    asset: &Asset,
    chain_id: u64,
    policy: &TransferPolicy,
) -> Result<TransferRequest, TransferError> {
    let to = address::parse_address(recipient, policy.checksum)?;

    let decimals = asset.decimals();
    let amount_units = utils::parse_decimal_units(amount, decimals)
        .map_err(|e| TransferError::InvalidAmount(e.to_string()))?;
    if amount_units.is_zero() {
        return Err(TransferError::InvalidAmount(
            "amount must be greater than zero".to_string(),
        ));
    }

    let balance_units = utils::parse_decimal_units(balance, decimals)
        .map_err(|e| TransferError::InvalidBalance(e.to_string()))?;
    // The margin rounds up to the asset's smallest unit
    let margin_units = utils::parse_units_ceil(&policy.reserve_margin, decimals)
        .map_err(|e| TransferError::InvalidBalance(format!("reserve margin: {}", e)))?;

    let required = amount_units.saturating_add(margin_units);
    if required >= balance_units {
        return Err(TransferError::InsufficientFunds {
            amount: amount.trim().to_string(),
            margin: policy.reserve_margin.clone(),
            balance: balance.trim().to_string(),
        });
    }

    Ok(TransferRequest {
        recipient: recipient.trim().to_string(),
        to,
        amount: amount.trim().to_string(),
        amount_base_units: amount_units,
        asset: asset.clone(),
        chain_id,
    })
}

/// Build the explorer URL for a transaction. Unknown chains use the table's default.
pub fn explorer_link(explorers: &ExplorerTable, handle: &TxHandle, chain_id: u64) -> String {
    explorers.tx_url(chain_id, &handle.to_string())
}

/// Claim faucet funds from `token` and wait for the receipt.
///
/// Claims sit outside the send form's attempt tracking. They do not touch any
/// controller state.
pub async fn claim_tokens(
    signer: &dyn TransferSigner,
    watcher: &dyn ReceiptWatcher,
    token: &TokenInfo,
) -> TransferOutcome {
    let handle = match signer.claim_tokens(token).await {
        Ok(handle) => handle,
        Err(error) => {
            warn!("Claim of {} rejected: {}", token.symbol, error);
            return TransferOutcome::Failed { handle: None, error };
        }
    };
    info!("Claim of {} submitted: {}", token.symbol, handle);

    let mut events = watcher.watch(handle);
    while let Some(event) = events.next().await {
        match event {
            WatchEvent::Pending => continue,
            WatchEvent::Confirmed { block_number } => {
                return TransferOutcome::Confirmed {
                    handle,
                    block_number,
                }
            }
            WatchEvent::Failed(reason) => {
                return TransferOutcome::Failed {
                    handle: Some(handle),
                    error: TransferError::ConfirmationFailed(reason),
                }
            }
        }
    }
    TransferOutcome::Failed {
        handle: Some(handle),
        error: TransferError::ConfirmationFailed("receipt watch ended early".to_string()),
    }
}

/// Status of the live attempt.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TransferOutcome {
    #[default]
    Idle,
    /// Request accepted by validation and handed to the signer
    Validating,
    Submitted(TxHandle),
    Confirming(TxHandle),
    Confirmed {
        handle: TxHandle,
        block_number: Option<u64>,
    },
    Failed {
        handle: Option<TxHandle>,
        error: TransferError,
    },
}

impl TransferOutcome {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransferOutcome::Confirmed { .. } | TransferOutcome::Failed { .. }
        )
    }

    /// True while the signer is still deciding.
    pub fn is_pending_signature(&self) -> bool {
        matches!(self, TransferOutcome::Validating)
    }

    pub fn handle(&self) -> Option<&TxHandle> {
        match self {
            TransferOutcome::Submitted(h) | TransferOutcome::Confirming(h) => Some(h),
            TransferOutcome::Confirmed { handle, .. } => Some(handle),
            TransferOutcome::Failed { handle, .. } => handle.as_ref(),
            TransferOutcome::Idle | TransferOutcome::Validating => None,
        }
    }

    pub fn status_text(&self) -> String {
        match self {
            TransferOutcome::Idle => String::new(),
            TransferOutcome::Validating => "Confirm in wallet...".to_string(),
            TransferOutcome::Submitted(_) => "Transaction sent.".to_string(),
            TransferOutcome::Confirming(_) => "Waiting for confirmation...".to_string(),
            TransferOutcome::Confirmed { .. } => "Transaction confirmed.".to_string(),
            TransferOutcome::Failed { error, .. } => error.to_string(),
        }
    }
}

/// Identifies one submission attempt within a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttemptId(u64);

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A status change for a specific attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptEvent {
    pub attempt: AttemptId,
    pub outcome: TransferOutcome,
}

/// Handle for the attempt that [`TransferController::begin_attempt`] started.
#[derive(Debug, Clone)]
pub struct AttemptTicket {
    pub id: AttemptId,
    pub request: TransferRequest,
}

#[derive(Debug)]
struct LiveAttempt {
    id: AttemptId,
    cancel: CancellationToken,
}

/// Editable form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferForm {
    pub recipient: String,
    pub amount: String,
    pub error: Option<TransferError>,
}

pub struct TransferController {
    signer: Arc<dyn TransferSigner>,
    watcher: Arc<dyn ReceiptWatcher>,
    explorers: ExplorerTable,
    policy: TransferPolicy,
    asset: Asset,
    chain_id: u64,
    pub form: TransferForm,
    outcome: TransferOutcome,
    live: Option<LiveAttempt>,
    next_attempt: u64,
}

impl TransferController {
    pub fn new(
        signer: Arc<dyn TransferSigner>,
        watcher: Arc<dyn ReceiptWatcher>,
        asset: Asset,
        chain_id: u64,
        policy: TransferPolicy,
        explorers: ExplorerTable,
    ) -> Self {
        Self {
            signer,
            watcher,
            explorers,
            policy,
            asset,
            chain_id,
            form: TransferForm::default(),
            outcome: TransferOutcome::Idle,
            live: None,
            next_attempt: 1,
        }
    }

    pub fn asset(&self) -> &Asset {
        &self.asset
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn outcome(&self) -> &TransferOutcome {
        &self.outcome
    }

    pub fn current_attempt(&self) -> Option<AttemptId> {
        self.live.as_ref().map(|a| a.id)
    }

    pub fn signer(&self) -> Arc<dyn TransferSigner> {
        self.signer.clone()
    }

    pub fn watcher(&self) -> Arc<dyn ReceiptWatcher> {
        self.watcher.clone()
    }

    /// Validate arbitrary input against this controller's asset and chain.
    pub fn validate(
        &self,
        recipient: &str,
        amount: &str,
        balance: &str,
    ) -> Result<TransferRequest, TransferError> {
        validate(recipient, amount, balance, &self.asset, self.chain_id, &self.policy)
    }

    /// Validate the form fields, recording any error on the form.
    pub fn validate_form(&mut self, balance: &str) -> Result<TransferRequest, TransferError> {
        let result = self.validate(&self.form.recipient, &self.form.amount, balance);
        self.form.error = result.as_ref().err().cloned();
        if let Err(ref e) = result {
            debug!("Transfer form rejected: {}", e);
        }
        result
    }

    /// Start a new attempt, abandoning whatever was live before.
    pub fn begin_attempt(&mut self, request: TransferRequest) -> AttemptTicket {
        if let Some(previous) = self.live.take() {
            debug!("Abandoning attempt {}", previous.id);
            previous.cancel.cancel();
        }

        let id = AttemptId(self.next_attempt);
        self.next_attempt += 1;
        self.live = Some(LiveAttempt {
            id,
            cancel: CancellationToken::new(),
        });
        self.outcome = TransferOutcome::Validating;
        self.form.error = None;

        info!("Attempt {} started: {}", id, request.describe());
        AttemptTicket { id, request }
    }

    /// Record the signer's answer for an attempt. Returns false if it was ignored.
    pub fn record_submission(
        &mut self,
        attempt: AttemptId,
        result: Result<TxHandle, TransferError>,
    ) -> bool {
        if !self.is_live(attempt) || self.outcome != TransferOutcome::Validating {
            debug!("Ignoring submission result for stale attempt {}", attempt);
            return false;
        }

        self.outcome = match result {
            Ok(handle) => {
                info!("Attempt {} submitted as {}", attempt, handle);
                TransferOutcome::Submitted(handle)
            }
            Err(error) => {
                warn!("Attempt {} rejected: {}", attempt, error);
                let error = match error {
                    e @ TransferError::SubmissionRejected(_) => e,
                    other => TransferError::SubmissionRejected(other.to_string()),
                };
                TransferOutcome::Failed {
                    handle: None,
                    error,
                }
            }
        };
        true
    }

    /// Submit a validated request and wait for the signer's answer.
    pub async fn submit(&mut self, request: TransferRequest) -> Result<TxHandle, TransferError> {
        let ticket = self.begin_attempt(request);
        let result = self.signer.submit_transfer(&ticket.request).await;
        self.record_submission(ticket.id, result.clone());
        result.map_err(|e| match e {
            e @ TransferError::SubmissionRejected(_) => e,
            other => TransferError::SubmissionRejected(other.to_string()),
        })
    }

    /// Stream of status events for `handle`, tagged with its attempt.
    ///
    /// The stream ends when the watcher reports a final status or the attempt is
    /// abandoned. A handle that does not belong to the live attempt yields nothing.
    pub fn track_confirmation(&self, handle: &TxHandle) -> BoxStream<'static, AttemptEvent> {
        let live = match &self.live {
            Some(live) if self.outcome.handle() == Some(handle) => live,
            _ => {
                warn!("No live attempt owns {}", handle);
                return stream::empty::<AttemptEvent>().boxed();
            }
        };

        let attempt = live.id;
        let cancel = live.cancel.clone();
        let handle = *handle;
        self.watcher
            .watch(handle)
            .map(move |event| AttemptEvent {
                attempt,
                outcome: match event {
                    WatchEvent::Pending => TransferOutcome::Confirming(handle),
                    WatchEvent::Confirmed { block_number } => TransferOutcome::Confirmed {
                        handle,
                        block_number,
                    },
                    WatchEvent::Failed(reason) => TransferOutcome::Failed {
                        handle: Some(handle),
                        error: TransferError::ConfirmationFailed(reason),
                    },
                },
            })
            .take_until(cancel.cancelled_owned())
            .boxed()
    }

    /// Fold a status event into the outcome. Returns false if it was ignored.
    pub fn apply(&mut self, event: AttemptEvent) -> bool {
        if !self.is_live(event.attempt) {
            debug!("Dropping event for stale attempt {}", event.attempt);
            return false;
        }
        // Terminal outcomes stay put; nothing is tracked before the signer answers
        if !matches!(
            self.outcome,
            TransferOutcome::Submitted(_) | TransferOutcome::Confirming(_)
        ) {
            return false;
        }
        if !matches!(
            event.outcome,
            TransferOutcome::Confirming(_)
                | TransferOutcome::Confirmed { .. }
                | TransferOutcome::Failed { .. }
        ) {
            return false;
        }

        match &event.outcome {
            TransferOutcome::Confirmed { handle, block_number } => {
                info!("Attempt {} confirmed: {} (block {:?})", event.attempt, handle, block_number)
            }
            TransferOutcome::Failed { error, .. } => {
                warn!("Attempt {} failed: {}", event.attempt, error)
            }
            _ => {}
        }
        self.outcome = event.outcome;
        true
    }

    /// Follow the live attempt until it reaches a final state or its events run out.
    pub async fn confirm(&mut self) -> TransferOutcome {
        let Some(handle) = self.outcome.handle().copied() else {
            return self.outcome.clone();
        };
        if self.outcome.is_terminal() {
            return self.outcome.clone();
        }

        let mut events = self.track_confirmation(&handle);
        while let Some(event) = events.next().await {
            self.apply(event);
            if self.outcome.is_terminal() {
                break;
            }
        }
        self.outcome.clone()
    }

    pub fn explorer_link(&self, handle: &TxHandle, chain_id: u64) -> String {
        explorer_link(&self.explorers, handle, chain_id)
    }

    /// Clear the form. The outcome of the last attempt stays visible.
    pub fn reset_form(&mut self) {
        self.form = TransferForm::default();
    }

    fn is_live(&self, attempt: AttemptId) -> bool {
        self.live.as_ref().map(|a| a.id) == Some(attempt)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    fn eth() -> Asset {
        Asset::native("ETH")
    }

    fn usdc() -> Asset {
        Asset::Token(TokenInfo {
            contract: Address::repeat_byte(0x11),
            symbol: "USDC".to_string(),
            decimals: 6,
        })
    }

    fn controller_with(
        signer: Arc<ScriptedSigner>,
        watcher: Arc<dyn ReceiptWatcher>,
    ) -> TransferController {
        TransferController::new(
            signer,
            watcher,
            eth(),
            1,
            TransferPolicy::default(),
            ExplorerTable::builtin(),
        )
    }

    fn confirmed_watcher() -> Arc<dyn ReceiptWatcher> {
        Arc::new(ScriptedWatcher {
            events: vec![
                WatchEvent::Pending,
                WatchEvent::Confirmed {
                    block_number: Some(42),
                },
            ],
        })
    }

    // ==================== validate tests ====================

    #[test]
    fn test_validate_short_address() {
        let err = validate("0x1234", "0.5", "1.0", &eth(), 1, &TransferPolicy::default())
            .unwrap_err();
        assert!(matches!(err, TransferError::InvalidAddress(_)));
    }

    #[test]
    fn test_validate_address_checked_before_amount() {
        let err = validate("nope", "abc", "zzz", &eth(), 1, &TransferPolicy::default())
            .unwrap_err();
        assert!(matches!(err, TransferError::InvalidAddress(_)));
    }

    #[test]
    fn test_validate_insufficient_at_margin_boundary() {
        let err = validate(RECIPIENT, "0.999", "1.0", &eth(), 1, &TransferPolicy::default())
            .unwrap_err();
        assert_eq!(
            err,
            TransferError::InsufficientFunds {
                amount: "0.999".to_string(),
                margin: "0.001".to_string(),
                balance: "1.0".to_string(),
            }
        );
    }

    #[test]
    fn test_validate_just_under_boundary_succeeds() {
        assert!(validate(RECIPIENT, "0.998", "1.0", &eth(), 1, &TransferPolicy::default()).is_ok());
    }

    #[test]
    fn test_validate_amount_above_balance() {
        let err = validate(RECIPIENT, "5", "1", &eth(), 1, &TransferPolicy::default()).unwrap_err();
        assert!(matches!(err, TransferError::InsufficientFunds { .. }));
    }

    #[test]
    fn test_validate_invalid_amounts() {
        for amount in ["", "abc", "-1", "0", "0.0", "1e3", "NaN", "inf"] {
            let err = validate(RECIPIENT, amount, "10", &eth(), 1, &TransferPolicy::default())
                .unwrap_err();
            assert!(
                matches!(err, TransferError::InvalidAmount(_)),
                "{:?} gave {:?}",
                amount,
                err
            );
        }
    }

    #[test]
    fn test_validate_invalid_balance() {
        let err = validate(RECIPIENT, "0.5", "", &eth(), 1, &TransferPolicy::default())
            .unwrap_err();
        assert!(matches!(err, TransferError::InvalidBalance(_)));
    }

    #[test]
    fn test_validate_success_keeps_exact_inputs() {
        let request =
            validate(RECIPIENT, "0.5", "1.0", &eth(), 1, &TransferPolicy::default()).unwrap();
        assert_eq!(request.recipient(), RECIPIENT);
        assert_eq!(request.amount(), "0.5");
        assert_eq!(request.chain_id(), 1);
        assert_eq!(
            request.amount_base_units(),
            U256::from(5u64) * U256::exp10(17)
        );
        assert_eq!(request.to(), RECIPIENT.parse::<Address>().unwrap());
    }

    #[test]
    fn test_validate_token_uses_token_decimals() {
        let request =
            validate(RECIPIENT, "12.5", "100", &usdc(), 137, &TransferPolicy::default()).unwrap();
        assert_eq!(request.amount_base_units(), U256::from(12_500_000u64));
        assert_eq!(request.asset().symbol(), "USDC");
    }

    #[test]
    fn test_validate_token_precision_limit() {
        let err = validate(RECIPIENT, "0.0000001", "100", &usdc(), 137, &TransferPolicy::default())
            .unwrap_err();
        assert!(matches!(err, TransferError::InvalidAmount(_)));
    }

    fn coarse_token(decimals: u8) -> Asset {
        Asset::Token(TokenInfo {
            contract: Address::repeat_byte(0x12),
            symbol: "GOLD".to_string(),
            decimals,
        })
    }

    #[test]
    fn test_validate_two_decimal_token_with_default_margin() {
        let asset = coarse_token(2);
        let request = validate(RECIPIENT, "5", "100", &asset, 1, &TransferPolicy::default()).unwrap();
        assert_eq!(request.amount_base_units(), U256::from(500u64));

        // 0.001 rounds up to 0.01, so 99.99 + 0.01 uses the whole balance
        let err = validate(RECIPIENT, "99.99", "100", &asset, 1, &TransferPolicy::default())
            .unwrap_err();
        assert!(matches!(err, TransferError::InsufficientFunds { .. }));
        assert!(validate(RECIPIENT, "99.98", "100", &asset, 1, &TransferPolicy::default()).is_ok());
    }

    #[test]
    fn test_validate_zero_decimal_token_with_default_margin() {
        let asset = coarse_token(0);
        let request = validate(RECIPIENT, "5", "100", &asset, 1, &TransferPolicy::default()).unwrap();
        assert_eq!(request.amount_base_units(), U256::from(5u64));

        let err = validate(RECIPIENT, "99", "100", &asset, 1, &TransferPolicy::default())
            .unwrap_err();
        assert!(matches!(err, TransferError::InsufficientFunds { .. }));
        assert!(validate(RECIPIENT, "98", "100", &asset, 1, &TransferPolicy::default()).is_ok());
    }

    #[test]
    fn test_validate_custom_margin() {
        let policy = TransferPolicy {
            reserve_margin: "0.5".to_string(),
            checksum: ChecksumPolicy::Lenient,
        };
        assert!(validate(RECIPIENT, "0.5", "1.0", &eth(), 1, &policy).is_err());
        assert!(validate(RECIPIENT, "0.4", "1.0", &eth(), 1, &policy).is_ok());
    }

    #[test]
    fn test_validate_strict_checksum() {
        let policy = TransferPolicy {
            reserve_margin: "0.001".to_string(),
            checksum: ChecksumPolicy::Strict,
        };
        let wrong_case = "0xa0Cf798816D4b9b9866b5330EEa46a18382f251e";
        let err = validate(wrong_case, "0.5", "1.0", &eth(), 1, &policy).unwrap_err();
        assert!(matches!(err, TransferError::InvalidAddress(_)));
    }

    // ==================== explorer_link tests ====================

    #[test]
    fn test_explorer_link_mainnet() {
        let handle = TxHandle::new(TxHash::from_low_u64_be(0xabc));
        let link = explorer_link(&ExplorerTable::builtin(), &handle, 1);
        assert_eq!(link, format!("https://etherscan.io/tx/{}", handle));
        assert!(link.ends_with("0000000abc"));
    }

    #[test]
    fn test_explorer_link_unknown_falls_back_and_is_stable() {
        let mut table = ExplorerTable::builtin();
        table.set_default("https://cardona-zkevm.polygonscan.com");
        let handle = TxHandle::new(TxHash::from_low_u64_be(7));
        let first = explorer_link(&table, &handle, 999999);
        let second = explorer_link(&table, &handle, 999999);
        assert_eq!(first, second);
        assert!(first.starts_with("https://cardona-zkevm.polygonscan.com/tx/0x"));
    }

    #[test]
    fn test_tx_handle_display() {
        let handle = TxHandle::new(TxHash::from_low_u64_be(1));
        let text = handle.to_string();
        assert_eq!(text.len(), 66);
        assert!(text.starts_with("0x"));
        assert!(text.ends_with('1'));
    }

    // ==================== controller tests ====================

    #[test]
    fn test_invalid_form_never_reaches_signer() {
        let signer = Arc::new(ScriptedSigner::new());
        let mut controller = controller_with(signer.clone(), confirmed_watcher());
        controller.form.recipient = "0x1234".to_string();
        controller.form.amount = "0.5".to_string();

        let err = controller.validate_form("1.0").unwrap_err();

        assert!(matches!(err, TransferError::InvalidAddress(_)));
        assert_eq!(controller.form.error, Some(err));
        assert_eq!(controller.outcome(), &TransferOutcome::Idle);
        assert_eq!(signer.call_count(), 0);
    }

    #[tokio::test]
    async fn test_submit_and_confirm() {
        let signer = Arc::new(ScriptedSigner::new());
        let mut controller = controller_with(signer.clone(), confirmed_watcher());
        let request = controller.validate(RECIPIENT, "0.5", "1.0").unwrap();

        let handle = controller.submit(request).await.unwrap();
        assert_eq!(controller.outcome(), &TransferOutcome::Submitted(handle));

        let sent = signer.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(sent.amount_base_units(), U256::from(5u64) * U256::exp10(17));

        let outcome = controller.confirm().await;
        assert_eq!(
            outcome,
            TransferOutcome::Confirmed {
                handle,
                block_number: Some(42)
            }
        );
    }

    #[tokio::test]
    async fn test_submission_rejected() {
        let signer = Arc::new(ScriptedSigner::rejecting("User denied transaction signature"));
        let mut controller = controller_with(signer.clone(), confirmed_watcher());
        let request = controller.validate(RECIPIENT, "0.5", "1.0").unwrap();

        let err = controller.submit(request).await.unwrap_err();

        assert!(matches!(err, TransferError::SubmissionRejected(_)));
        assert!(matches!(
            controller.outcome(),
            TransferOutcome::Failed { handle: None, .. }
        ));
        assert_eq!(signer.call_count(), 1);
    }

    #[tokio::test]
    async fn test_watcher_failure_is_terminal() {
        let signer = Arc::new(ScriptedSigner::new());
        let watcher: Arc<dyn ReceiptWatcher> = Arc::new(ScriptedWatcher {
            events: vec![
                WatchEvent::Pending,
                WatchEvent::Failed("transaction reverted".to_string()),
                WatchEvent::Confirmed { block_number: Some(1) },
            ],
        });
        let mut controller = controller_with(signer, watcher);
        let request = controller.validate(RECIPIENT, "0.1", "1.0").unwrap();
        let handle = controller.submit(request).await.unwrap();

        let outcome = controller.confirm().await;

        assert_eq!(
            outcome,
            TransferOutcome::Failed {
                handle: Some(handle),
                error: TransferError::ConfirmationFailed("transaction reverted".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_terminal_state_ignores_later_events() {
        let signer = Arc::new(ScriptedSigner::new());
        let mut controller = controller_with(signer, confirmed_watcher());
        let request = controller.validate(RECIPIENT, "0.1", "1.0").unwrap();
        let handle = controller.submit(request).await.unwrap();
        controller.confirm().await;
        let attempt = controller.current_attempt().unwrap();

        let applied = controller.apply(AttemptEvent {
            attempt,
            outcome: TransferOutcome::Failed {
                handle: Some(handle),
                error: TransferError::ConfirmationFailed("late".to_string()),
            },
        });

        assert!(!applied);
        assert!(matches!(controller.outcome(), TransferOutcome::Confirmed { .. }));
    }

    #[tokio::test]
    async fn test_stale_events_are_discarded() {
        let signer = Arc::new(ScriptedSigner::new());
        let mut controller = controller_with(signer, Arc::new(StalledWatcher));

        let first = controller.validate(RECIPIENT, "0.1", "1.0").unwrap();
        let first_handle = controller.submit(first).await.unwrap();
        let old_attempt = controller.current_attempt().unwrap();

        let second = controller.validate(RECIPIENT, "0.2", "1.0").unwrap();
        let second_handle = controller.submit(second).await.unwrap();
        assert_ne!(first_handle, second_handle);

        let applied = controller.apply(AttemptEvent {
            attempt: old_attempt,
            outcome: TransferOutcome::Confirmed {
                handle: first_handle,
                block_number: Some(9),
            },
        });

        assert!(!applied);
        assert_eq!(controller.outcome(), &TransferOutcome::Submitted(second_handle));
    }

    #[tokio::test]
    async fn test_abandoned_stream_ends() {
        let signer = Arc::new(ScriptedSigner::new());
        let mut controller = controller_with(signer, Arc::new(StalledWatcher));
        let request = controller.validate(RECIPIENT, "0.1", "1.0").unwrap();
        let handle = controller.submit(request).await.unwrap();

        let mut events = controller.track_confirmation(&handle);
        let first = events.next().await.unwrap();
        assert_eq!(first.outcome, TransferOutcome::Confirming(handle));

        let next = controller.validate(RECIPIENT, "0.2", "1.0").unwrap();
        controller.begin_attempt(next);

        assert!(events.next().await.is_none());
    }

    #[test]
    fn test_track_unknown_handle_is_empty() {
        let signer = Arc::new(ScriptedSigner::new());
        let controller = controller_with(signer, confirmed_watcher());
        let handle = TxHandle::new(TxHash::from_low_u64_be(5));

        let events: Vec<_> = tokio_test::block_on(controller.track_confirmation(&handle).collect());

        assert!(events.is_empty());
    }

    #[test]
    fn test_late_submission_result_ignored() {
        let signer = Arc::new(ScriptedSigner::new());
        let mut controller = controller_with(signer, confirmed_watcher());
        let first = controller.validate(RECIPIENT, "0.1", "1.0").unwrap();
        let old = controller.begin_attempt(first);
        let second = controller.validate(RECIPIENT, "0.2", "1.0").unwrap();
        let current = controller.begin_attempt(second);

        let stale = controller.record_submission(
            old.id,
            Ok(TxHandle::new(TxHash::from_low_u64_be(1))),
        );

        assert!(!stale);
        assert_eq!(controller.outcome(), &TransferOutcome::Validating);
        assert!(current.id > old.id);
    }

    #[tokio::test]
    async fn test_reset_form_keeps_outcome() {
        let signer = Arc::new(ScriptedSigner::new());
        let mut controller = controller_with(signer, confirmed_watcher());
        controller.form.recipient = RECIPIENT.to_string();
        controller.form.amount = "0.5".to_string();
        let request = controller.validate_form("1.0").unwrap();
        controller.submit(request).await.unwrap();
        controller.confirm().await;

        controller.form.error = Some(TransferError::InvalidAmount("x".to_string()));
        controller.reset_form();

        assert_eq!(controller.form, TransferForm::default());
        assert!(matches!(controller.outcome(), TransferOutcome::Confirmed { .. }));
    }

    #[test]
    fn test_outcome_status_text() {
        assert_eq!(TransferOutcome::Idle.status_text(), "");
        let handle = TxHandle::new(TxHash::zero());
        assert_eq!(
            TransferOutcome::Confirming(handle).status_text(),
            "Waiting for confirmation..."
        );
        assert_eq!(
            TransferOutcome::Confirmed {
                handle,
                block_number: None
            }
            .status_text(),
            "Transaction confirmed."
        );
    }

    // ==================== claim tests ====================

    fn faucet_token() -> TokenInfo {
        match usdc() {
            Asset::Token(info) => info,
            Asset::Native { .. } => unreachable!(),
        }
    }

    #[tokio::test]
    async fn test_claim_confirmed() {
        let signer = ScriptedSigner::new();
        let watcher = ScriptedWatcher {
            events: vec![
                WatchEvent::Pending,
                WatchEvent::Confirmed { block_number: Some(7) },
            ],
        };

        let outcome = claim_tokens(&signer, &watcher, &faucet_token()).await;

        assert_eq!(
            outcome,
            TransferOutcome::Confirmed {
                handle: TxHandle::new(TxHash::from_low_u64_be(1)),
                block_number: Some(7),
            }
        );
        assert_eq!(signer.claim_count(), 1);
        assert_eq!(signer.call_count(), 0);
    }

    #[tokio::test]
    async fn test_claim_rejected_by_wallet() {
        let signer = ScriptedSigner::rejecting("User denied transaction signature");
        let watcher = ScriptedWatcher { events: vec![] };

        let outcome = claim_tokens(&signer, &watcher, &faucet_token()).await;

        assert!(matches!(
            outcome,
            TransferOutcome::Failed {
                handle: None,
                error: TransferError::SubmissionRejected(_)
            }
        ));
    }

    #[tokio::test]
    async fn test_claim_reverted() {
        let signer = ScriptedSigner::new();
        let watcher = ScriptedWatcher {
            events: vec![WatchEvent::Failed("transaction reverted".to_string())],
        };

        let outcome = claim_tokens(&signer, &watcher, &faucet_token()).await;

        assert_eq!(
            outcome,
            TransferOutcome::Failed {
                handle: Some(TxHandle::new(TxHash::from_low_u64_be(1))),
                error: TransferError::ConfirmationFailed("transaction reverted".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_claim_watch_ending_without_receipt_fails() {
        let signer = ScriptedSigner::new();
        let watcher = ScriptedWatcher {
            events: vec![WatchEvent::Pending],
        };

        let outcome = claim_tokens(&signer, &watcher, &faucet_token()).await;

        assert!(matches!(
            outcome,
            TransferOutcome::Failed {
                handle: Some(_),
                error: TransferError::ConfirmationFailed(_)
            }
        ));
    }

    #[test]
    fn test_asset_token_accessor() {
        assert!(eth().token().is_none());
        assert!(eth().is_native());
        assert_eq!(usdc().token().map(|t| t.decimals), Some(6));
        assert!(!usdc().is_native());
    }
}
