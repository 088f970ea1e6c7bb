pub mod account;
pub mod address;
pub mod config;
pub mod erc20;
pub mod error;
pub mod gui;
pub mod operation_log;
pub mod signer;
pub mod transfer;
pub mod user_settings;
pub mod utils;
pub mod watcher;
