//! View modules for the GUI
//!
//! Each view is an `impl WalletApp` block rendering one panel of the central area.
//!
//! - `account` - connected address, ENS name and balances
//! - `send` - native and token send forms with attempt status
//! - `settings` - saved network, token and transfer settings

pub mod account;
pub mod send;
pub mod settings;
