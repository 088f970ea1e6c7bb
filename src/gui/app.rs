//! Main GUI application module
//!
//! Contains the WalletApp struct, the per-asset send panels, settings handling, and the
//! frame loop.

use crate::{
    account::{self, AccountSnapshot},
    config::Config,
    error::TransferError,
    operation_log,
    signer::{LocalWalletSigner, TransferSigner},
    transfer::{
        self, Asset, AttemptEvent, AttemptId, TransferController, TransferOutcome,
        TransferRequest, TxHandle,
    },
    user_settings::UserSettings,
    watcher::{ProviderReceiptWatcher, ReceiptWatcher},
};
use anyhow::{anyhow, Result};
use eframe::{egui, egui::RichText, App, Frame, NativeOptions};
use ethers::types::Address;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use super::async_job::{spawn_job, AsyncJob, EventFeed};
use super::notifications::{claim_notification, outcome_notification, NotificationEntry};
use super::theme::{configure_style, AppTheme};
use super::views::settings::SettingsForm;

const MAX_NOTIFICATIONS: usize = 20;

/// Which send form is showing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetTab {
    Native,
    Token,
}

/// GUI section enum for navigation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuiSection {
    Wallet,
    Settings,
}

/// Something a send panel reports back to the app after polling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PanelEvent {
    Submitted {
        request: TransferRequest,
        handle: TxHandle,
    },
    Rejected {
        request: TransferRequest,
        error: TransferError,
    },
    Settled(TransferOutcome),
    ClaimSettled(TransferOutcome),
}

struct PendingSubmission {
    attempt: AttemptId,
    request: TransferRequest,
    job: AsyncJob<Result<TxHandle, TransferError>>,
}

/// One send form: its controller plus the background work it is waiting on.
pub(crate) struct SendPanel {
    pub(crate) controller: TransferController,
    submission: Option<PendingSubmission>,
    confirmations: Option<EventFeed<AttemptEvent>>,
    claim: Option<AsyncJob<TransferOutcome>>,
}

impl SendPanel {
    pub(crate) fn new(controller: TransferController) -> Self {
        Self {
            controller,
            submission: None,
            confirmations: None,
            claim: None,
        }
    }

    /// Validate the form against `balance` and hand the request to the signer.
    pub(crate) fn start_send(&mut self, balance: &str) {
        let Ok(request) = self.controller.validate_form(balance) else {
            return;
        };

        let ticket = self.controller.begin_attempt(request);
        // The previous attempt's stream ends on its own once cancelled
        self.confirmations = None;

        let signer = self.controller.signer();
        let request = ticket.request.clone();
        let job = spawn_job(move || async move { Ok(signer.submit_transfer(&request).await) });
        self.submission = Some(PendingSubmission {
            attempt: ticket.id,
            request: ticket.request,
            job,
        });
    }

    /// Ask the token contract for faucet funds. Native panels have nothing to claim.
    pub(crate) fn start_claim(&mut self) {
        if self.is_claiming() {
            return;
        }
        let Some(token) = self.controller.asset().token().cloned() else {
            return;
        };
        let signer = self.controller.signer();
        let watcher = self.controller.watcher();
        self.claim = Some(spawn_job(move || async move {
            Ok(transfer::claim_tokens(signer.as_ref(), watcher.as_ref(), &token).await)
        }));
    }

    pub(crate) fn is_claiming(&self) -> bool {
        self.claim.is_some()
    }

    pub(crate) fn is_working(&self) -> bool {
        self.submission.is_some() || self.confirmations.is_some() || self.claim.is_some()
    }

    /// Pick up the signer's answer and any confirmation events.
    pub(crate) fn poll(&mut self) -> Vec<PanelEvent> {
        let mut events = Vec::new();

        let finished = self.submission.as_mut().and_then(|pending| pending.job.poll());
        if let Some(result) = finished {
            let Some(pending) = self.submission.take() else {
                return events;
            };
            let result = result
                .unwrap_or_else(|e| Err(TransferError::SubmissionRejected(e.to_string())));
            if self.controller.record_submission(pending.attempt, result) {
                match self.controller.outcome().clone() {
                    TransferOutcome::Submitted(handle) => {
                        self.confirmations =
                            Some(EventFeed::spawn(self.controller.track_confirmation(&handle)));
                        events.push(PanelEvent::Submitted {
                            request: pending.request,
                            handle,
                        });
                    }
                    TransferOutcome::Failed { error, .. } => {
                        events.push(PanelEvent::Rejected {
                            request: pending.request,
                            error,
                        });
                    }
                    _ => {}
                }
            }
        }

        if let Some(feed) = self.confirmations.as_mut() {
            let received = feed.drain();
            let open = feed.is_open();
            for event in received {
                if self.controller.apply(event) && self.controller.outcome().is_terminal() {
                    events.push(PanelEvent::Settled(self.controller.outcome().clone()));
                }
            }
            if !open || self.controller.outcome().is_terminal() {
                self.confirmations = None;
            }
        }

        let claimed = self.claim.as_mut().and_then(|job| job.poll());
        if let Some(result) = claimed {
            self.claim = None;
            let outcome = result.unwrap_or_else(|e| TransferOutcome::Failed {
                handle: None,
                error: TransferError::SubmissionRejected(e.to_string()),
            });
            events.push(PanelEvent::ClaimSettled(outcome));
        }

        events
    }
}

/// Signer and watcher shared by every send panel.
struct WalletSession {
    signer: Arc<dyn TransferSigner>,
    watcher: Arc<dyn ReceiptWatcher>,
}

impl WalletSession {
    fn connect(config: &Config) -> Result<Self> {
        let signer: Arc<dyn TransferSigner> = Arc::new(LocalWalletSigner::from_env(config)?);
        let watcher: Arc<dyn ReceiptWatcher> = Arc::new(ProviderReceiptWatcher::from_config(
            config.get_provider()?,
            config,
        ));
        Ok(Self { signer, watcher })
    }

    fn panel(&self, config: &Config, asset: Asset) -> SendPanel {
        SendPanel::new(TransferController::new(
            self.signer.clone(),
            self.watcher.clone(),
            asset,
            config.chain_id,
            config.transfer_policy(),
            config.explorers.clone(),
        ))
    }
}

#[derive(Default)]
pub(crate) struct LogViewState {
    pub(crate) open: bool,
    pub(crate) content: String,
}

pub struct WalletApp {
    pub(crate) config: Config,
    pub(crate) user_settings: UserSettings,
    pub(crate) settings_form: SettingsForm,
    pub(crate) settings_error: Option<String>,
    pub(crate) section: GuiSection,
    pub(crate) theme: AppTheme,
    session: Option<WalletSession>,
    pub(crate) wallet_address: Option<Address>,
    pub(crate) wallet_error: Option<String>,
    pub(crate) account: Option<AccountSnapshot>,
    pub(crate) account_error: Option<String>,
    pub(crate) account_job: Option<AsyncJob<AccountSnapshot>>,
    pub(crate) tab: AssetTab,
    pub(crate) native: Option<SendPanel>,
    pub(crate) token: Option<SendPanel>,
    pub(crate) notifications: VecDeque<NotificationEntry>,
    pub(crate) log_view: LogViewState,
}

impl WalletApp {
    fn new(user_settings: UserSettings, config: Config, ctx: &egui::Context) -> Self {
        let theme = AppTheme::default();
        configure_style(ctx, &theme);

        let mut app = Self {
            config,
            settings_form: SettingsForm::from_settings(&user_settings),
            user_settings,
            settings_error: None,
            section: GuiSection::Wallet,
            theme,
            session: None,
            wallet_address: None,
            wallet_error: None,
            account: None,
            account_error: None,
            account_job: None,
            tab: AssetTab::Native,
            native: None,
            token: None,
            notifications: VecDeque::with_capacity(MAX_NOTIFICATIONS),
            log_view: LogViewState::default(),
        };
        app.connect_wallet();
        app
    }

    /// (Re)build the wallet session and send panels for the current config.
    pub(crate) fn connect_wallet(&mut self) {
        let (session, wallet_error) = match WalletSession::connect(&self.config) {
            Ok(session) => (Some(session), None),
            Err(e) => {
                error!("Wallet unavailable: {:#}", e);
                (None, Some(format!("{:#}", e)))
            }
        };
        self.wallet_address = session.as_ref().map(|s| s.signer.address());
        self.native = session
            .as_ref()
            .map(|s| s.panel(&self.config, Asset::native(self.config.native_token())));
        self.session = session;
        self.wallet_error = wallet_error;
        self.token = None;
        self.tab = AssetTab::Native;
        self.account = None;
        self.account_error = None;
        // Any in-flight snapshot belongs to the previous config
        self.account_job = None;
        self.refresh_account();
    }

    /// Validate the settings form, persist it, and switch to the resulting config.
    pub(crate) fn save_settings(&mut self) {
        let mut updated = self.user_settings.clone();
        if let Err(e) = self.settings_form.apply(&mut updated) {
            self.settings_error = Some(format!("{:#}", e));
            return;
        }
        if let Err(e) = updated.save() {
            self.settings_error = Some(format!("Failed to save settings: {:#}", e));
            return;
        }
        self.user_settings = updated;
        self.settings_form = SettingsForm::from_settings(&self.user_settings);
        self.settings_error = None;

        match self.user_settings.resolve_config() {
            Ok(config) => {
                info!(
                    "Settings saved; now on {} (chain {})",
                    config.network_label(),
                    config.chain_id
                );
                self.config = config;
                self.connect_wallet();
                self.notify("Settings saved.");
            }
            Err(e) => {
                warn!("Saved settings do not resolve: {:#}", e);
                self.settings_error = Some(format!(
                    "Saved, but the environment overrides are invalid: {:#}",
                    e
                ));
            }
        }
    }

    pub(crate) fn refresh_account(&mut self) {
        let Some(address) = self.wallet_address else {
            return;
        };
        if self.account_job.as_ref().is_some_and(|job| job.is_running()) {
            return;
        }
        let config = self.config.clone();
        self.account_job = Some(spawn_job(move || async move {
            account::fetch_account(&config, address).await
        }));
    }

    pub(crate) fn refresh_logs(&mut self) {
        self.log_view.content = match operation_log::read_log() {
            Ok(content) if content.trim().is_empty() => {
                "No logs yet. Send a transfer to generate entries.".to_string()
            }
            Ok(content) => content,
            Err(e) => format!("Failed to read {}: {}", operation_log::log_file_path(), e),
        };
    }

    pub(crate) fn notify(&mut self, message: impl Into<String>) {
        if self.notifications.len() == MAX_NOTIFICATIONS {
            self.notifications.pop_back();
        }
        self.notifications.push_front(NotificationEntry::new(message));
    }

    /// Send panel for the active tab, if that asset is available.
    pub(crate) fn active_panel_mut(&mut self) -> Option<&mut SendPanel> {
        match self.tab {
            AssetTab::Native => self.native.as_mut(),
            AssetTab::Token => self.token.as_mut(),
        }
    }

    fn on_account_loaded(&mut self, snapshot: AccountSnapshot) {
        info!(
            "Account {} holds {} {}",
            snapshot.display_name(),
            snapshot.native_balance,
            snapshot.native_symbol
        );

        match (&snapshot.token, &self.session) {
            (Some(token), Some(session)) => {
                let asset = Asset::Token(token.info.clone());
                let stale = self
                    .token
                    .as_ref()
                    .map_or(true, |panel| panel.controller.asset() != &asset);
                if stale {
                    self.token = Some(session.panel(&self.config, asset));
                }
            }
            _ => {
                self.token = None;
                self.tab = AssetTab::Native;
            }
        }

        self.account = Some(snapshot);
        self.account_error = None;
    }

    fn poll_jobs(&mut self) {
        let finished = self.account_job.as_mut().and_then(|job| job.poll());
        if let Some(result) = finished {
            self.account_job = None;
            match result {
                Ok(snapshot) => self.on_account_loaded(snapshot),
                Err(e) => {
                    warn!("Account refresh failed: {:#}", e);
                    self.account_error = Some(format!("{:#}", e));
                }
            }
        }

        let mut events = Vec::new();
        for panel in [self.native.as_mut(), self.token.as_mut()].into_iter().flatten() {
            let symbol = panel.controller.asset().symbol().to_string();
            events.extend(panel.poll().into_iter().map(|event| (symbol.clone(), event)));
        }
        for (symbol, event) in events {
            self.handle_panel_event(&symbol, event);
        }
    }

    fn handle_panel_event(&mut self, symbol: &str, event: PanelEvent) {
        let chain_id = self.config.chain_id;
        match event {
            PanelEvent::Submitted { request, handle } => {
                record_operation(
                    "transfer_submitted",
                    chain_id,
                    format!("{}\ntx: {}", request.describe(), handle),
                );
                self.notify_outcome(symbol, &TransferOutcome::Submitted(handle));
            }
            PanelEvent::Rejected { request, error } => {
                record_operation(
                    "transfer_rejected",
                    chain_id,
                    format!("{}\nreason: {}", request.describe(), error),
                );
                self.notify_outcome(
                    symbol,
                    &TransferOutcome::Failed {
                        handle: None,
                        error,
                    },
                );
            }
            PanelEvent::Settled(outcome) => {
                let tx = outcome
                    .handle()
                    .map(|h| h.to_string())
                    .unwrap_or_default();
                match &outcome {
                    TransferOutcome::Confirmed { block_number, .. } => record_operation(
                        "transfer_confirmed",
                        chain_id,
                        format!("tx: {}\nblock: {:?}", tx, block_number),
                    ),
                    TransferOutcome::Failed { error, .. } => record_operation(
                        "transfer_failed",
                        chain_id,
                        format!("tx: {}\nreason: {}", tx, error),
                    ),
                    _ => {}
                }
                self.notify_outcome(symbol, &outcome);
                self.refresh_account();
            }
            PanelEvent::ClaimSettled(outcome) => {
                let tx = outcome
                    .handle()
                    .map(|h| h.to_string())
                    .unwrap_or_default();
                let details = match &outcome {
                    TransferOutcome::Failed { error, .. } => {
                        format!("token: {}
tx: {}
reason: {}", symbol, tx, error)
                    }
                    _ => format!("token: {}
tx: {}", symbol, tx),
                };
                record_operation("token_claim", chain_id, details);
                self.notify(claim_notification(symbol, &outcome));
                self.refresh_account();
            }
        }
    }

    fn notify_outcome(&mut self, symbol: &str, outcome: &TransferOutcome) {
        if let Some(message) = outcome_notification(symbol, outcome) {
            self.notify(message);
        }
    }

    /// True while any send panel waits on the wallet or the chain.
    pub(crate) fn panels_working(&self) -> bool {
        [self.native.as_ref(), self.token.as_ref()]
            .into_iter()
            .flatten()
            .any(|panel| panel.is_working())
    }

    fn is_busy(&self) -> bool {
        self.account_job.is_some() || self.panels_working()
    }

    fn render_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.add_space(self.theme.spacing_sm);
            ui.horizontal(|ui| {
                ui.heading(RichText::new("walletdash").strong().color(self.theme.primary));
                ui.label(
                    RichText::new(format!("v{}", env!("CARGO_PKG_VERSION")))
                        .small()
                        .color(self.theme.text_secondary),
                );
                ui.add_space(self.theme.spacing_md);
                for (section, label) in [
                    (GuiSection::Wallet, "Wallet"),
                    (GuiSection::Settings, "Settings"),
                ] {
                    if ui
                        .selectable_label(self.section == section, label)
                        .clicked()
                        && self.section != section
                    {
                        if section == GuiSection::Settings {
                            // Start from what is saved, not from abandoned edits
                            self.settings_form = SettingsForm::from_settings(&self.user_settings);
                            self.settings_error = None;
                        }
                        self.section = section;
                    }
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.add(self.theme.button_small("Log")).clicked() {
                        self.log_view.open = !self.log_view.open;
                        if self.log_view.open {
                            self.refresh_logs();
                        }
                    }
                    ui.label(
                        RichText::new(format!(
                            "{} ({}) · #{}",
                            self.config.network_label(),
                            self.config.native_token(),
                            self.config.chain_id
                        ))
                        .color(self.theme.text_secondary),
                    );
                });
            });
            ui.add_space(self.theme.spacing_xs);
        });
    }

    fn render_notifications(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("notifications")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.add_space(self.theme.spacing_sm);
                ui.horizontal(|ui| {
                    ui.label(RichText::new("Notifications").strong());
                    if !self.notifications.is_empty()
                        && ui.add(egui::Button::new("Clear").small()).clicked()
                    {
                        self.notifications.clear();
                    }
                });
                ui.separator();
                if self.notifications.is_empty() {
                    ui.label(RichText::new("Nothing yet.").color(self.theme.text_secondary));
                }
                egui::ScrollArea::vertical().show(ui, |ui| {
                    for entry in &self.notifications {
                        ui.label(entry.message.as_str());
                        ui.label(
                            RichText::new(entry.time_ago())
                                .small()
                                .color(self.theme.text_secondary),
                        );
                        ui.add_space(self.theme.spacing_xs);
                    }
                });
            });
    }

    fn render_log_window(&mut self, ctx: &egui::Context) {
        let mut open = self.log_view.open;
        let mut reload = false;
        egui::Window::new("Operation log")
            .open(&mut open)
            .default_size([560.0, 380.0])
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new(operation_log::log_file_path())
                            .small()
                            .color(self.theme.text_secondary),
                    );
                    if ui.add(egui::Button::new("Reload").small()).clicked() {
                        reload = true;
                    }
                });
                ui.separator();
                egui::ScrollArea::vertical().show(ui, |ui| {
                    ui.label(RichText::new(&self.log_view.content).monospace());
                });
            });
        self.log_view.open = open;
        if reload {
            self.refresh_logs();
        }
    }
}

fn record_operation(operation: &str, chain_id: u64, details: String) {
    if let Err(e) = operation_log::append_log(operation, chain_id, details) {
        warn!("Failed to write operation log: {}", e);
    }
}

impl App for WalletApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.poll_jobs();

        self.render_top_bar(ctx);
        self.render_notifications(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| match self.section {
                GuiSection::Wallet => {
                    self.view_account(ui);
                    ui.add_space(self.theme.spacing_lg);
                    self.view_send(ui);
                }
                GuiSection::Settings => self.view_settings(ui),
            });
        });

        if self.log_view.open {
            self.render_log_window(ctx);
        }

        if self.is_busy() {
            ctx.request_repaint_after(Duration::from_millis(200));
        }
    }
}

pub fn launch(user_settings: UserSettings, config: Config) -> Result<()> {
    info!(
        "Starting dashboard on {} (chain {})",
        config.network_label(),
        config.chain_id
    );

    let app_creator = move |cc: &eframe::CreationContext<'_>| {
        Box::new(WalletApp::new(user_settings.clone(), config.clone(), &cc.egui_ctx))
            as Box<dyn App>
    };

    let native_options = NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([980.0, 640.0]),
        persist_window: true,
        ..Default::default()
    };

    eframe::run_native("walletdash", native_options, Box::new(app_creator))
        .map_err(|e| anyhow!("Failed to start GUI: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::testing::{ScriptedSigner, ScriptedWatcher, StalledWatcher, RECIPIENT};
    use crate::transfer::{TokenInfo, TransferPolicy};
    use crate::watcher::WatchEvent;
    use std::time::Instant;

    fn panel(signer: Arc<ScriptedSigner>, watcher: Arc<dyn ReceiptWatcher>) -> SendPanel {
        let mut panel = SendPanel::new(TransferController::new(
            signer,
            watcher,
            Asset::native("ETH"),
            1,
            TransferPolicy::default(),
            Default::default(),
        ));
        panel.controller.form.recipient = RECIPIENT.to_string();
        panel.controller.form.amount = "0.5".to_string();
        panel
    }

    /// Poll until `done` holds, collecting every event on the way.
    fn poll_until(panel: &mut SendPanel, done: impl Fn(&SendPanel) -> bool) -> Vec<PanelEvent> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut events = Vec::new();
        while !done(&*panel) {
            events.extend(panel.poll());
            assert!(Instant::now() < deadline, "panel never settled");
            std::thread::sleep(Duration::from_millis(5));
        }
        events.extend(panel.poll());
        events
    }

    #[test]
    fn test_send_runs_to_confirmation() {
        let signer = Arc::new(ScriptedSigner::new());
        let watcher = Arc::new(ScriptedWatcher {
            events: vec![
                WatchEvent::Pending,
                WatchEvent::Confirmed {
                    block_number: Some(7),
                },
            ],
        });
        let mut panel = panel(signer.clone(), watcher);

        panel.start_send("2");
        assert!(panel.controller.outcome().is_pending_signature());

        let events = poll_until(&mut panel, |p| p.controller.outcome().is_terminal());

        assert_eq!(signer.call_count(), 1);
        assert!(matches!(events[0], PanelEvent::Submitted { .. }));
        assert!(matches!(
            events.last(),
            Some(PanelEvent::Settled(TransferOutcome::Confirmed {
                block_number: Some(7),
                ..
            }))
        ));
        assert!(!panel.is_working());
    }

    #[test]
    fn test_rejected_signature_reports_once() {
        let signer = Arc::new(ScriptedSigner::rejecting("User denied transaction signature"));
        let mut panel = panel(signer, Arc::new(StalledWatcher));

        panel.start_send("2");
        let events = poll_until(&mut panel, |p| p.controller.outcome().is_terminal());

        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            PanelEvent::Rejected {
                error: TransferError::SubmissionRejected(_),
                ..
            }
        ));
        assert!(!panel.is_working());
    }

    #[test]
    fn test_invalid_form_never_reaches_signer() {
        let signer = Arc::new(ScriptedSigner::new());
        let mut panel = panel(signer.clone(), Arc::new(StalledWatcher));
        panel.controller.form.amount = "5".to_string();

        panel.start_send("2");

        assert!(matches!(
            panel.controller.form.error,
            Some(TransferError::InsufficientFunds { .. })
        ));
        assert_eq!(panel.controller.outcome(), &TransferOutcome::Idle);
        assert!(!panel.is_working());
        assert_eq!(signer.call_count(), 0);
    }

    #[test]
    fn test_new_send_replaces_stalled_confirmation() {
        let signer = Arc::new(ScriptedSigner::new());
        let mut panel = panel(signer.clone(), Arc::new(StalledWatcher));

        panel.start_send("2");
        poll_until(&mut panel, |p| {
            matches!(p.controller.outcome(), TransferOutcome::Confirming(_))
        });
        let first = panel.controller.current_attempt();

        panel.start_send("2");
        poll_until(&mut panel, |p| {
            matches!(p.controller.outcome(), TransferOutcome::Confirming(_))
        });

        assert_ne!(panel.controller.current_attempt(), first);
        assert_eq!(signer.call_count(), 2);
        assert_eq!(
            panel.controller.outcome().handle(),
            Some(&TxHandle::new(ethers::types::TxHash::from_low_u64_be(2)))
        );
    }

    #[test]
    fn test_claim_settles_once() {
        let signer = Arc::new(ScriptedSigner::new());
        let watcher = Arc::new(ScriptedWatcher {
            events: vec![
                WatchEvent::Pending,
                WatchEvent::Confirmed {
                    block_number: Some(9),
                },
            ],
        });
        let token = Asset::Token(TokenInfo {
            contract: Address::repeat_byte(0x11),
            symbol: "USDC".to_string(),
            decimals: 6,
        });
        let mut panel = SendPanel::new(TransferController::new(
            signer.clone(),
            watcher,
            token,
            2442,
            TransferPolicy::default(),
            Default::default(),
        ));

        panel.start_claim();
        assert!(panel.is_claiming());
        // A second press while the first is running is ignored
        panel.start_claim();

        let events = poll_until(&mut panel, |p| !p.is_working());

        assert_eq!(signer.claim_count(), 1);
        assert_eq!(signer.call_count(), 0);
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            PanelEvent::ClaimSettled(TransferOutcome::Confirmed {
                block_number: Some(9),
                ..
            })
        ));
        // Claims leave the send form's attempt alone
        assert_eq!(panel.controller.outcome(), &TransferOutcome::Idle);
    }

    #[test]
    fn test_native_panel_has_nothing_to_claim() {
        let signer = Arc::new(ScriptedSigner::new());
        let mut panel = panel(signer.clone(), Arc::new(StalledWatcher));

        panel.start_claim();

        assert!(!panel.is_claiming());
        assert!(!panel.is_working());
        assert_eq!(signer.claim_count(), 0);
    }
}
