//! Send panel: one form per asset, switched with tabs.

use crate::gui::app::{AssetTab, SendPanel, WalletApp};
use crate::gui::theme::AppTheme;
use crate::transfer::{Asset, TransferOutcome};
use crate::utils;
use eframe::egui::{self, RichText};

impl WalletApp {
    pub(crate) fn view_send(&mut self, ui: &mut egui::Ui) {
        let theme = self.theme;
        theme.frame_panel().show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            self.render_section_header(ui, "Send");

            ui.horizontal(|ui| {
                let native_label = self.config.native_token().to_string();
                ui.selectable_value(&mut self.tab, AssetTab::Native, native_label);
                let token_label = self
                    .token
                    .as_ref()
                    .map(|p| p.controller.asset().symbol().to_string());
                ui.add_enabled_ui(token_label.is_some(), |ui| {
                    ui.selectable_value(
                        &mut self.tab,
                        AssetTab::Token,
                        token_label.unwrap_or_else(|| "Token".to_string()),
                    )
                    .on_disabled_hover_text("No token contract configured for this network");
                });
            });
            ui.add_space(theme.spacing_sm);

            let reserve = self.config.reserve_margin.clone();
            let account = self.account.clone();
            let Some(panel) = self.active_panel_mut() else {
                ui.label(RichText::new("Load a wallet to send.").color(theme.text_secondary));
                return;
            };
            let balance = account
                .as_ref()
                .and_then(|a| a.balance_for(panel.controller.asset()))
                .map(str::to_string);
            render_send_form(ui, &theme, panel, balance.as_deref(), &reserve);
        });
    }
}

/// Send needs a loaded balance and no signature request already open.
fn send_enabled(balance: Option<&str>, outcome: &TransferOutcome) -> bool {
    balance.is_some() && !outcome.is_pending_signature()
}

/// Faucet claims are offered only for a token whose loaded balance is zero.
fn offers_claim(asset: &Asset, balance: Option<&str>) -> bool {
    if asset.is_native() {
        return false;
    }
    balance
        .and_then(|b| utils::parse_decimal_units(b, asset.decimals()).ok())
        .is_some_and(|units| units.is_zero())
}

fn render_send_form(
    ui: &mut egui::Ui,
    theme: &AppTheme,
    panel: &mut SendPanel,
    balance: Option<&str>,
    reserve: &str,
) {
    let symbol = panel.controller.asset().symbol().to_string();

    ui.label(RichText::new("Recipient").color(theme.text_secondary));
    ui.add(
        egui::TextEdit::singleline(&mut panel.controller.form.recipient)
            .hint_text("0x...")
            .font(egui::TextStyle::Monospace)
            .desired_width(440.0),
    );
    ui.add_space(theme.spacing_xs);

    ui.label(RichText::new(format!("Amount ({})", symbol)).color(theme.text_secondary));
    ui.horizontal(|ui| {
        ui.add(
            egui::TextEdit::singleline(&mut panel.controller.form.amount)
                .hint_text("0.0")
                .desired_width(200.0),
        );
        match balance {
            Some(balance) => ui.label(
                RichText::new(format!(
                    "Available: {} {} (keeps {} in reserve)",
                    balance, symbol, reserve
                ))
                .small()
                .color(theme.text_secondary),
            ),
            None => ui.label(
                RichText::new("Balance not loaded")
                    .small()
                    .color(theme.warning),
            ),
        };
    });
    ui.add_space(theme.spacing_sm);

    let can_send = send_enabled(balance, panel.controller.outcome());
    ui.horizontal(|ui| {
        let send = ui
            .add_enabled(can_send, theme.button_primary("Send"))
            .on_disabled_hover_text(if balance.is_none() {
                "Balance not loaded yet"
            } else {
                "Waiting for the wallet"
            });
        if send.clicked() {
            if let Some(balance) = balance {
                panel.start_send(balance);
            }
        }
        if ui.add(theme.button_secondary("Reset")).clicked() {
            panel.controller.reset_form();
        }
        if offers_claim(panel.controller.asset(), balance) {
            let claiming = panel.is_claiming();
            let label = if claiming { "Claiming..." } else { "Claim" };
            if ui
                .add_enabled(!claiming, theme.button_secondary(label))
                .on_hover_text(format!("Mint test {} from the token contract", symbol))
                .clicked()
            {
                panel.start_claim();
            }
            if claiming {
                ui.spinner();
            }
        }
    });

    if let Some(err) = &panel.controller.form.error {
        ui.add_space(theme.spacing_xs);
        ui.label(RichText::new(err.to_string()).color(theme.error));
    }

    let outcome = panel.controller.outcome().clone();
    if outcome == TransferOutcome::Idle {
        return;
    }
    ui.add_space(theme.spacing_sm);
    ui.separator();
    ui.horizontal(|ui| {
        if !outcome.is_terminal() {
            ui.spinner();
        }
        ui.label(RichText::new(outcome.status_text()).color(theme.status_color(&outcome)));
    });

    if let Some(handle) = outcome.handle() {
        ui.horizontal(|ui| {
            ui.label(RichText::new(handle.to_string()).monospace().small());
            if ui.link("View tx on explorer").clicked() {
                let url = panel
                    .controller
                    .explorer_link(handle, panel.controller.chain_id());
                if let Err(e) = open::that(&url) {
                    tracing::warn!("Failed to open {}: {}", url, e);
                }
            }
        });
    }
}
