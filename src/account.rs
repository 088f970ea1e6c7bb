use crate::config::Config;
use crate::erc20;
use crate::transfer::{Asset, TokenInfo};
use crate::utils;
use anyhow::Result;
use ethers::prelude::*;
use ethers::providers::{Http, Provider};
use std::sync::Arc;
use tracing::{info, warn};

/// Chain on which ENS reverse records are resolved.
const ENS_CHAIN_ID: u64 = 1;

#[derive(Debug, Clone, PartialEq)]
pub struct TokenBalance {
    pub info: TokenInfo,
    /// Balance in display units, e.g. `"12.5"`
    pub balance: String,
}

/// Identity and balances of the connected account, as plain values.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountSnapshot {
    pub address: Address,
    pub ens_name: Option<String>,
    pub native_symbol: String,
    /// Native balance in display units
    pub native_balance: String,
    pub token: Option<TokenBalance>,
}

impl AccountSnapshot {
    /// Balance string for the asset a send form moves.
    pub fn balance_for(&self, asset: &Asset) -> Option<&str> {
        match asset {
            Asset::Native { .. } => Some(self.native_balance.as_str()),
            Asset::Token(info) => self
                .token
                .as_ref()
                .filter(|t| t.info.contract == info.contract)
                .map(|t| t.balance.as_str()),
        }
    }

    pub fn display_name(&self) -> String {
        match &self.ens_name {
            Some(name) => name.clone(),
            None => crate::address::short_address(&self.address),
        }
    }
}

/// Read symbol and decimals of an ERC-20 contract.
pub async fn fetch_token_info(provider: &Arc<Provider<Http>>, contract: Address) -> Result<TokenInfo> {
    let symbol = erc20::symbol(provider, contract).await?;
    let decimals = erc20::decimals(provider, contract).await?;
    Ok(TokenInfo {
        contract,
        symbol,
        decimals,
    })
}

async fn fetch_token_balance(
    provider: &Arc<Provider<Http>>,
    contract: Address,
    owner: Address,
) -> Result<TokenBalance> {
    let info = fetch_token_info(provider, contract).await?;
    let raw = erc20::balance_of(provider, contract, owner).await?;
    Ok(TokenBalance {
        balance: utils::format_units_trimmed(raw, info.decimals as u32),
        info,
    })
}

/// Fetch everything the dashboard shows about `address`.
///
/// Token and ENS lookups are best effort; only the native balance is required.
pub async fn fetch_account(config: &Config, address: Address) -> Result<AccountSnapshot> {
    let provider = config.get_provider()?;

    let native = provider.get_balance(address, None).await?;

    let token = match config.token_address {
        Some(contract) => match fetch_token_balance(&provider, contract, address).await {
            Ok(balance) => Some(balance),
            Err(e) => {
                warn!("Token balance lookup for {:?} failed: {}", contract, e);
                None
            }
        },
        None => None,
    };

    let ens_name = if config.chain_id == ENS_CHAIN_ID {
        match provider.lookup_address(address).await {
            Ok(name) => Some(name),
            Err(e) => {
                info!("No ENS name for {:?}: {}", address, e);
                None
            }
        }
    } else {
        None
    };

    Ok(AccountSnapshot {
        address,
        ens_name,
        native_symbol: config.native_token().to_string(),
        native_balance: utils::format_units_trimmed(native, utils::NATIVE_DECIMALS),
        token,
    })
}
