use crate::address::{self, ChecksumPolicy};
use crate::transfer::TransferPolicy;
use crate::utils;
use anyhow::{anyhow, Context, Result};
use ethers::providers::{Http, Provider};
use ethers::types::Address;
use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Network category for grouping in the UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NetworkCategory {
    EthereumMainnet,
    EthereumTestnet,
    L2Mainnet,
    L2Testnet,
    OtherMainnet,
}

impl NetworkCategory {
    /// Group heading shown above the networks of this category.
    pub fn header(&self) -> &'static str {
        match self {
            EthereumMainnet => "Ethereum",
            EthereumTestnet => "Ethereum Testnets",
            L2Mainnet => "L2 Networks",
            L2Testnet => "L2 Testnets",
            OtherMainnet => "Other Chains",
        }
    }
}

/// A predefined EVM-compatible network with label, chain ID, native token, and default RPC.
#[derive(Clone, Debug)]
pub struct EvmNetwork {
    pub label: &'static str,
    pub chain_id: u64,
    pub native_token: &'static str,
    pub default_rpc: &'static str,
    pub explorer: &'static str,
    pub category: NetworkCategory,
}

impl EvmNetwork {
    pub const fn new(
        label: &'static str,
        chain_id: u64,
        native_token: &'static str,
        default_rpc: &'static str,
        explorer: &'static str,
        category: NetworkCategory,
    ) -> Self {
        Self {
            label,
            chain_id,
            native_token,
            default_rpc,
            explorer,
            category,
        }
    }
}

use NetworkCategory::*;

/// Built-in networks, grouped by category. Cardona is the dashboard's default target.
pub const NETWORKS: &[EvmNetwork] = &[
    EvmNetwork::new("Ethereum", 1, "ETH", "https://ethereum-rpc.publicnode.com", "https://etherscan.io", EthereumMainnet),
    EvmNetwork::new("Sepolia", 11155111, "ETH", "https://ethereum-sepolia-rpc.publicnode.com", "https://sepolia.etherscan.io", EthereumTestnet),
    EvmNetwork::new("Optimism", 10, "ETH", "https://mainnet.optimism.io", "https://optimistic.etherscan.io", L2Mainnet),
    EvmNetwork::new("Base", 8453, "ETH", "https://mainnet.base.org", "https://basescan.org", L2Mainnet),
    EvmNetwork::new("Polygon", 137, "POL", "https://polygon-rpc.com", "https://polygonscan.com", L2Mainnet),
    EvmNetwork::new("Linea", 59144, "ETH", "https://rpc.linea.build", "https://lineascan.build", L2Mainnet),
    EvmNetwork::new("Gnosis Chain", 100, "xDAI", "https://rpc.gnosischain.com", "https://gnosisscan.io", L2Mainnet),
    EvmNetwork::new("Polygon zkEVM Cardona", 2442, "ETH", "https://rpc.cardona.zkevm-rpc.com", "https://cardona-zkevm.polygonscan.com", L2Testnet),
    EvmNetwork::new("BNB Chain", 56, "BNB", "https://bsc-dataseed.binance.org", "https://bscscan.com", OtherMainnet),
    EvmNetwork::new("Avalanche C-Chain", 43114, "AVAX", "https://avalanche-c-chain-rpc.publicnode.com", "https://snowtrace.io", OtherMainnet),
];

/// Explorers for chains that have no entry in [`NETWORKS`] but still show up in wallets.
const EXTRA_EXPLORERS: &[(u64, &str)] = &[(80001, "https://mumbai.polygonscan.com")];

/// Chain the dashboard targets when nothing else is configured.
pub const DEFAULT_CHAIN_ID: u64 = 2442;

/// Explorer used for chains missing from the table.
pub const DEFAULT_EXPLORER: &str = "https://cardona-zkevm.polygonscan.com";

/// Headroom left for network fees, in the asset's display units.
pub const DEFAULT_RESERVE_MARGIN: &str = "0.001";

pub const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 90;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Find a network by chain ID
pub fn find_network_by_chain_id(chain_id: u64) -> Option<&'static EvmNetwork> {
    NETWORKS.iter().find(|n| n.chain_id == chain_id)
}

/// Check if a chain ID is used by a built-in network
pub fn is_builtin_chain_id(chain_id: u64) -> bool {
    NETWORKS.iter().any(|n| n.chain_id == chain_id)
}

/// Chain id from `WALLET_CHAIN_ID`, if set.
pub fn env_chain_id() -> Result<Option<u64>> {
    match env::var("WALLET_CHAIN_ID") {
        Ok(chain) => {
            let chain_id = chain
                .trim()
                .parse()
                .with_context(|| format!("WALLET_CHAIN_ID is not a number: '{}'", chain))?;
            Ok(Some(chain_id))
        }
        Err(_) => Ok(None),
    }
}

/// Validate an explorer base URL and strip any trailing slash.
pub fn normalize_explorer_base(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed).with_context(|| format!("Invalid explorer URL '{}'", trimmed))?;
    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(anyhow!("Explorer URL must be http(s): {}", trimmed));
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

/// Validate a reserve margin as a non-negative decimal and return it trimmed.
///
/// Checked at native precision; each asset later rounds it up to its own decimals.
pub fn normalize_reserve_margin(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("Reserve margin cannot be empty"));
    }
    utils::parse_decimal_units(trimmed, utils::NATIVE_DECIMALS)
        .with_context(|| format!("Invalid reserve margin '{}'", trimmed))?;
    Ok(trimmed.to_string())
}

/// Block explorer base URLs keyed by chain id, with a fallback for unknown chains.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExplorerTable {
    entries: HashMap<u64, String>,
    default_base: String,
}

impl ExplorerTable {
    /// Table with no entries; every chain resolves to `default_base`.
    pub fn empty(default_base: impl Into<String>) -> Self {
        Self {
            entries: HashMap::new(),
            default_base: default_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Explorers for every built-in network, falling back to [`DEFAULT_EXPLORER`].
    pub fn builtin() -> Self {
        let mut table = Self::empty(DEFAULT_EXPLORER);
        for network in NETWORKS {
            table.insert(network.chain_id, network.explorer);
        }
        for (chain_id, base) in EXTRA_EXPLORERS {
            table.insert(*chain_id, *base);
        }
        table
    }

    pub fn insert(&mut self, chain_id: u64, base: impl Into<String>) {
        self.entries
            .insert(chain_id, base.into().trim_end_matches('/').to_string());
    }

    pub fn set_default(&mut self, base: impl Into<String>) {
        self.default_base = base.into().trim_end_matches('/').to_string();
    }

    pub fn default_base(&self) -> &str {
        &self.default_base
    }

    pub fn contains(&self, chain_id: u64) -> bool {
        self.entries.contains_key(&chain_id)
    }

    /// Base URL for a chain. Never fails: unknown chains get the default.
    pub fn base_for(&self, chain_id: u64) -> &str {
        self.entries
            .get(&chain_id)
            .map(String::as_str)
            .unwrap_or(&self.default_base)
    }

    /// Full URL to view a transaction.
    pub fn tx_url(&self, chain_id: u64, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.base_for(chain_id), tx_hash)
    }

    /// Full URL to view an address.
    pub fn address_url(&self, chain_id: u64, address: &str) -> String {
        format!("{}/address/{}", self.base_for(chain_id), address)
    }
}

impl Default for ExplorerTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub rpc_url: String,
    pub chain_id: u64,
    /// ERC-20 contract offered by the token send form
    pub token_address: Option<Address>,
    pub reserve_margin: String,
    pub checksum_policy: ChecksumPolicy,
    pub explorers: ExplorerTable,
    pub confirmation_timeout_secs: u64,
    pub poll_interval_ms: u64,
    // Overrides for custom networks
    pub native_token_override: Option<String>,
    pub label_override: Option<String>,
}

impl Config {
    pub fn new(rpc_url: String, chain_id: u64) -> Self {
        Self {
            rpc_url,
            chain_id,
            token_address: None,
            reserve_margin: DEFAULT_RESERVE_MARGIN.to_string(),
            checksum_policy: ChecksumPolicy::default(),
            explorers: ExplorerTable::builtin(),
            confirmation_timeout_secs: DEFAULT_CONFIRMATION_TIMEOUT_SECS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            native_token_override: None,
            label_override: None,
        }
    }

    pub fn from_network(network: &EvmNetwork) -> Self {
        Self::new(network.default_rpc.to_string(), network.chain_id)
    }

    /// Build a config from `WALLET_*` environment variables on top of the defaults.
    ///
    /// Call `dotenvy::dotenv()` first if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self> {
        let mut config = match env_chain_id()? {
            Some(chain_id) => Self::for_chain(chain_id),
            None => Self::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    /// Defaults for a chain: the built-in network if there is one, else no RPC.
    pub fn for_chain(chain_id: u64) -> Self {
        match find_network_by_chain_id(chain_id) {
            Some(network) => Self::from_network(network),
            None => Self::new(String::new(), chain_id),
        }
    }

    /// Override fields from `WALLET_*` variables. `WALLET_CHAIN_ID` is handled by the caller.
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(rpc) = env::var("WALLET_RPC_URL") {
            Url::parse(rpc.trim()).with_context(|| format!("WALLET_RPC_URL is invalid: '{}'", rpc))?;
            self.rpc_url = rpc.trim().to_string();
        }
        if self.rpc_url.is_empty() {
            return Err(anyhow!(
                "No RPC URL known for chain {}; set WALLET_RPC_URL",
                self.chain_id
            ));
        }
        if let Ok(token) = env::var("WALLET_TOKEN_ADDRESS") {
            if !token.trim().is_empty() {
                let parsed = address::parse_address(&token, ChecksumPolicy::Lenient)
                    .map_err(|e| anyhow!("WALLET_TOKEN_ADDRESS: {}", e))?;
                self.token_address = Some(parsed);
            }
        }
        if let Ok(margin) = env::var("WALLET_RESERVE_MARGIN") {
            self.reserve_margin = normalize_reserve_margin(&margin)
                .map_err(|e| anyhow!("WALLET_RESERVE_MARGIN: {:#}", e))?;
        }
        if let Ok(explorer) = env::var("WALLET_EXPLORER_DEFAULT") {
            self.explorers.set_default(normalize_explorer_base(&explorer)?);
        }
        if let Ok(strict) = env::var("WALLET_STRICT_CHECKSUM") {
            if matches!(strict.trim(), "1" | "true" | "yes") {
                self.checksum_policy = ChecksumPolicy::Strict;
            }
        }
        Ok(())
    }

    pub fn native_token(&self) -> &str {
        if let Some(ref token) = self.native_token_override {
            token.as_str()
        } else {
            find_network_by_chain_id(self.chain_id)
                .map(|n| n.native_token)
                .unwrap_or("ETH")
        }
    }

    pub fn network_label(&self) -> &str {
        if let Some(ref label) = self.label_override {
            label.as_str()
        } else {
            find_network_by_chain_id(self.chain_id)
                .map(|n| n.label)
                .unwrap_or("Unknown")
        }
    }

    pub fn transfer_policy(&self) -> TransferPolicy {
        TransferPolicy {
            reserve_margin: self.reserve_margin.clone(),
            checksum: self.checksum_policy,
        }
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn get_provider(&self) -> Result<Arc<Provider<Http>>> {
        let url = Url::parse(&self.rpc_url)?;
        let provider = Provider::<Http>::try_from(url.as_str())?
            .interval(self.poll_interval());
        Ok(Arc::new(provider))
    }
}

impl Default for Config {
    fn default() -> Self {
        if let Some(network) = find_network_by_chain_id(DEFAULT_CHAIN_ID) {
            Self::from_network(network)
        } else {
            Self::new("https://rpc.cardona.zkevm-rpc.com".to_string(), DEFAULT_CHAIN_ID)
        }
    }
}
