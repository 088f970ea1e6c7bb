#![windows_subsystem = "windows"]

use anyhow::Result;
use tracing_subscriber::EnvFilter;
use walletdash::{gui, user_settings::UserSettings};

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("walletdash=info")),
        )
        .init();

    // Saved settings first, WALLET_* environment variables on top
    let settings = UserSettings::load();
    let config = settings.resolve_config()?;
    gui::launch(settings, config)?;

    Ok(())
}
