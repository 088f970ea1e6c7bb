//! Settings view implementation
//!
//! Edits the saved settings for one chain at a time:
//! - Network selection and RPC override
//! - Token contract and explorer URLs
//! - Reserve margin, checksum policy and confirmation timeout

use crate::address::{self, ChecksumPolicy};
use crate::config::{self, NetworkCategory, NETWORKS};
use crate::gui::app::WalletApp;
use crate::user_settings::UserSettings;
use anyhow::{anyhow, Context, Result};
use eframe::egui::{self, RichText};
use url::Url;

/// Pending edits, applied to [`UserSettings`] only when saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SettingsForm {
    pub(crate) chain_id: u64,
    pub(crate) rpc: String,
    pub(crate) token_contract: String,
    pub(crate) explorer: String,
    pub(crate) default_explorer: String,
    pub(crate) reserve_margin: String,
    pub(crate) strict_checksum: bool,
    pub(crate) confirmation_timeout_secs: String,
}

impl SettingsForm {
    pub(crate) fn from_settings(settings: &UserSettings) -> Self {
        let mut form = Self {
            chain_id: settings.selected_chain_id,
            rpc: String::new(),
            token_contract: String::new(),
            explorer: String::new(),
            default_explorer: settings.default_explorer.clone().unwrap_or_default(),
            reserve_margin: settings.reserve_margin.clone(),
            strict_checksum: settings.strict_checksum,
            confirmation_timeout_secs: settings.confirmation_timeout_secs.to_string(),
        };
        form.load_chain(settings, settings.selected_chain_id);
        form
    }

    /// Switch to `chain_id` and show its saved per-chain overrides.
    pub(crate) fn load_chain(&mut self, settings: &UserSettings, chain_id: u64) {
        self.chain_id = chain_id;
        self.rpc = settings.get_custom_rpc(chain_id).cloned().unwrap_or_default();
        self.token_contract = settings
            .token_contracts
            .get(&chain_id)
            .cloned()
            .unwrap_or_default();
        self.explorer = settings
            .explorer_overrides
            .get(&chain_id)
            .cloned()
            .unwrap_or_default();
    }

    /// Check every field, then write them into `settings`. Nothing is written on error.
    pub(crate) fn apply(&self, settings: &mut UserSettings) -> Result<()> {
        let rpc = self.rpc.trim();
        if rpc.is_empty() {
            if !config::is_builtin_chain_id(self.chain_id) {
                return Err(anyhow!(
                    "Chain {} has no built-in RPC; enter an RPC URL",
                    self.chain_id
                ));
            }
        } else {
            Url::parse(rpc).with_context(|| format!("Invalid RPC URL '{}'", rpc))?;
        }

        let token = self.token_contract.trim();
        if !token.is_empty() {
            address::parse_address(token, ChecksumPolicy::Lenient)
                .map_err(|e| anyhow!("Token contract: {}", e))?;
        }

        let explorer = match self.explorer.trim() {
            "" => String::new(),
            raw => config::normalize_explorer_base(raw)?,
        };
        let default_explorer = match self.default_explorer.trim() {
            "" => None,
            raw => Some(config::normalize_explorer_base(raw)?),
        };
        let reserve_margin = config::normalize_reserve_margin(&self.reserve_margin)?;
        let timeout: u64 = self
            .confirmation_timeout_secs
            .trim()
            .parse()
            .map_err(|_| anyhow!("Confirmation timeout must be a whole number of seconds"))?;
        if timeout == 0 {
            return Err(anyhow!("Confirmation timeout must be at least 1 second"));
        }

        settings.selected_chain_id = self.chain_id;
        settings.set_custom_rpc(self.chain_id, rpc.to_string());
        settings.set_token_contract(self.chain_id, token.to_string());
        settings.set_explorer_override(self.chain_id, explorer);
        settings.default_explorer = default_explorer;
        settings.reserve_margin = reserve_margin;
        settings.strict_checksum = self.strict_checksum;
        settings.confirmation_timeout_secs = timeout;
        Ok(())
    }
}

fn network_label(chain_id: u64) -> String {
    match config::find_network_by_chain_id(chain_id) {
        Some(network) => format!("{} · #{}", network.label, network.chain_id),
        None => format!("Custom chain · #{}", chain_id),
    }
}

impl WalletApp {
    /// Render the settings view
    pub(crate) fn view_settings(&mut self, ui: &mut egui::Ui) {
        let theme = self.theme;
        let busy = self.panels_working();

        theme.frame_panel().show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            self.render_section_header(ui, "Settings");

            // --- Network ---
            ui.group(|ui| {
                ui.label(RichText::new("Network").strong().color(theme.accent));
                ui.add_space(theme.spacing_xs);

                let mut selected = self.settings_form.chain_id;
                ui.horizontal(|ui| {
                    egui::ComboBox::from_id_source("settings_network")
                        .selected_text(network_label(selected))
                        .width(260.0)
                        .show_ui(ui, |ui| {
                            let mut last_category: Option<NetworkCategory> = None;
                            for network in NETWORKS {
                                if last_category != Some(network.category) {
                                    if last_category.is_some() {
                                        ui.separator();
                                    }
                                    ui.label(
                                        RichText::new(format!("── {} ──", network.category.header()))
                                            .small()
                                            .color(theme.text_secondary),
                                    );
                                    last_category = Some(network.category);
                                }
                                let label = format!(
                                    "{} · {} · #{}",
                                    network.label, network.native_token, network.chain_id
                                );
                                if ui
                                    .selectable_label(selected == network.chain_id, label)
                                    .clicked()
                                {
                                    selected = network.chain_id;
                                }
                            }
                        });
                    ui.label("Chain ID:");
                    ui.add(egui::DragValue::new(&mut selected).speed(1));
                });
                if selected != self.settings_form.chain_id {
                    self.settings_form.load_chain(&self.user_settings, selected);
                }

                ui.add_space(theme.spacing_xs);
                egui::Grid::new("settings_chain_grid")
                    .num_columns(2)
                    .spacing([theme.spacing_md, theme.spacing_xs])
                    .show(ui, |ui| {
                        ui.label("RPC URL:");
                        let hint = config::find_network_by_chain_id(selected)
                            .map(|n| n.default_rpc)
                            .unwrap_or("required for custom chains");
                        ui.add(
                            egui::TextEdit::singleline(&mut self.settings_form.rpc)
                                .hint_text(hint)
                                .desired_width(400.0),
                        );
                        ui.end_row();

                        ui.label("Token contract:");
                        ui.add(
                            egui::TextEdit::singleline(&mut self.settings_form.token_contract)
                                .hint_text("0x... (optional)")
                                .font(egui::TextStyle::Monospace)
                                .desired_width(400.0),
                        );
                        ui.end_row();

                        ui.label("Explorer:");
                        let hint = self.config.explorers.base_for(selected).to_string();
                        ui.add(
                            egui::TextEdit::singleline(&mut self.settings_form.explorer)
                                .hint_text(hint)
                                .desired_width(400.0),
                        );
                        ui.end_row();
                    });
            });

            ui.add_space(theme.spacing_md);

            // --- Transfers ---
            ui.group(|ui| {
                ui.label(RichText::new("Transfers").strong().color(theme.accent));
                ui.add_space(theme.spacing_xs);
                egui::Grid::new("settings_transfer_grid")
                    .num_columns(2)
                    .spacing([theme.spacing_md, theme.spacing_xs])
                    .show(ui, |ui| {
                        ui.label("Reserve margin:");
                        ui.add(
                            egui::TextEdit::singleline(&mut self.settings_form.reserve_margin)
                                .hint_text(config::DEFAULT_RESERVE_MARGIN)
                                .desired_width(120.0),
                        );
                        ui.end_row();

                        ui.label("Confirmation timeout (s):");
                        ui.add(
                            egui::TextEdit::singleline(
                                &mut self.settings_form.confirmation_timeout_secs,
                            )
                            .desired_width(120.0),
                        );
                        ui.end_row();

                        ui.label("Fallback explorer:");
                        ui.add(
                            egui::TextEdit::singleline(&mut self.settings_form.default_explorer)
                                .hint_text(config::DEFAULT_EXPLORER)
                                .desired_width(400.0),
                        );
                        ui.end_row();
                    });
                ui.checkbox(
                    &mut self.settings_form.strict_checksum,
                    "Reject mixed-case addresses with a bad EIP-55 checksum",
                );
            });

            ui.add_space(theme.spacing_md);

            let dirty = self.settings_form != SettingsForm::from_settings(&self.user_settings);
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(dirty && !busy, theme.button_primary("Save"))
                    .on_disabled_hover_text(if busy {
                        "Wait for pending transfers to settle"
                    } else {
                        "No changes to save"
                    })
                    .clicked()
                {
                    self.save_settings();
                }
                if ui
                    .add_enabled(dirty, theme.button_secondary("Revert"))
                    .clicked()
                {
                    self.settings_form = SettingsForm::from_settings(&self.user_settings);
                    self.settings_error = None;
                }
                if dirty {
                    ui.label(RichText::new("(unsaved changes)").small().color(theme.warning));
                }
            });

            if let Some(err) = &self.settings_error {
                ui.add_space(theme.spacing_xs);
                ui.label(RichText::new(err).color(theme.error));
            }

            ui.add_space(theme.spacing_sm);
            ui.label(
                RichText::new("WALLET_* environment variables still override saved values.")
                    .small()
                    .color(theme.text_secondary),
            );
            ui.label(
                RichText::new(UserSettings::settings_path_display())
                    .small()
                    .color(theme.text_secondary),
            );
        });
    }
}
