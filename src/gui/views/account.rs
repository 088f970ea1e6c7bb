//! Account panel: who is connected and what they hold.

use crate::gui::app::WalletApp;
use eframe::egui::{self, RichText};
use ethers::utils::to_checksum;

impl WalletApp {
    pub(crate) fn render_section_header(&self, ui: &mut egui::Ui, title: &str) {
        ui.label(RichText::new(title).size(16.0).strong().color(self.theme.primary));
        ui.add_space(self.theme.spacing_sm);
    }

    pub(crate) fn view_account(&mut self, ui: &mut egui::Ui) {
        let theme = self.theme;
        theme.frame_panel().show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            self.render_section_header(ui, "Account");

            let Some(address) = self.wallet_address else {
                ui.label(RichText::new("No wallet loaded.").color(theme.warning));
                if let Some(err) = &self.wallet_error {
                    ui.label(RichText::new(err).small().color(theme.text_secondary));
                }
                ui.label(
                    RichText::new(format!(
                        "Set {} in the environment or .env and restart.",
                        crate::signer::PRIVATE_KEY_ENV
                    ))
                    .small()
                    .color(theme.text_secondary),
                );
                return;
            };
            let checksummed = to_checksum(&address, None);

            egui::Grid::new("account_grid")
                .num_columns(2)
                .spacing([theme.spacing_md, theme.spacing_xs])
                .show(ui, |ui| {
                    ui.label(RichText::new("Address:").color(theme.text_secondary));
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(&checksummed).monospace());
                        if ui.add(egui::Button::new("Copy").small()).clicked() {
                            ui.output_mut(|o| o.copied_text = checksummed.clone());
                        }
                        if ui.add(egui::Button::new("Explorer").small()).clicked() {
                            let url = self
                                .config
                                .explorers
                                .address_url(self.config.chain_id, &checksummed);
                            if let Err(e) = open::that(&url) {
                                tracing::warn!("Failed to open {}: {}", url, e);
                            }
                        }
                    });
                    ui.end_row();

                    if let Some(snapshot) = &self.account {
                        if let Some(name) = &snapshot.ens_name {
                            ui.label(RichText::new("ENS:").color(theme.text_secondary));
                            ui.label(RichText::new(name).strong());
                            ui.end_row();
                        }

                        ui.label(RichText::new("Balance:").color(theme.text_secondary));
                        ui.label(
                            RichText::new(format!(
                                "{} {}",
                                snapshot.native_balance, snapshot.native_symbol
                            ))
                            .strong(),
                        );
                        ui.end_row();

                        if let Some(token) = &snapshot.token {
                            ui.label(RichText::new("Token:").color(theme.text_secondary));
                            ui.label(
                                RichText::new(format!("{} {}", token.balance, token.info.symbol))
                                    .strong(),
                            );
                            ui.end_row();
                        } else if self.config.token_address.is_some() {
                            ui.label(RichText::new("Token:").color(theme.text_secondary));
                            ui.label(RichText::new("unavailable").color(theme.warning));
                            ui.end_row();
                        }
                    }
                });

            ui.add_space(theme.spacing_sm);
            ui.horizontal(|ui| {
                let loading = self.account_job.is_some();
                if ui
                    .add_enabled(!loading, theme.button_secondary("Refresh"))
                    .clicked()
                {
                    self.refresh_account();
                }
                if loading {
                    ui.spinner();
                }
                if let Some(err) = &self.account_error {
                    ui.label(RichText::new(err).small().color(theme.error));
                }
            });
        });
    }
}
