//! GUI module for the wallet dashboard
//!
//! This module provides the graphical user interface built with egui/eframe.
//!
//! ## Module Structure
//!
//! - `app` - WalletApp, the per-asset send panels, and the frame loop
//! - `async_job` - polling of background jobs and event streams
//! - `theme` - colors, spacing and styled widgets (AppTheme)
//! - `notifications` - notification entries and outcome messages
//! - `views` - account, send and settings panels
//!
//! ## Usage
//!
//! ```no_run
//! use walletdash::gui;
//! use walletdash::user_settings::UserSettings;
//!
//! let settings = UserSettings::load();
//! let config = settings.resolve_config().expect("Invalid configuration");
//! gui::launch(settings, config).expect("Failed to launch GUI");
//! ```

mod app;
pub mod async_job;
pub mod notifications;
pub mod theme;
pub mod views;

pub use app::{launch, AssetTab, GuiSection, WalletApp};

pub use async_job::{spawn_job, AsyncJob, EventFeed};
pub use notifications::NotificationEntry;
pub use theme::{configure_style, AppTheme};
