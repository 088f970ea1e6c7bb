use crate::address::{self, ChecksumPolicy};
use crate::config::{self, Config};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

const SETTINGS_FILE: &str = "walletdash_settings.json";

fn default_reserve_margin() -> String {
    config::DEFAULT_RESERVE_MARGIN.to_string()
}

fn default_confirmation_timeout() -> u64 {
    config::DEFAULT_CONFIRMATION_TIMEOUT_SECS
}

/// User settings that persist between sessions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSettings {
    /// Selected network chain ID
    pub selected_chain_id: u64,
    /// Custom RPC overrides per chain ID
    #[serde(default)]
    pub custom_rpcs: HashMap<u64, String>,
    /// ERC-20 contract offered by the token form, per chain ID
    #[serde(default)]
    pub token_contracts: HashMap<u64, String>,
    /// Explorer base URL overrides per chain ID
    #[serde(default)]
    pub explorer_overrides: HashMap<u64, String>,
    /// Explorer for chains without an entry
    #[serde(default)]
    pub default_explorer: Option<String>,
    #[serde(default = "default_reserve_margin")]
    pub reserve_margin: String,
    #[serde(default)]
    pub strict_checksum: bool,
    #[serde(default = "default_confirmation_timeout")]
    pub confirmation_timeout_secs: u64,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            selected_chain_id: config::DEFAULT_CHAIN_ID,
            custom_rpcs: HashMap::new(),
            token_contracts: HashMap::new(),
            explorer_overrides: HashMap::new(),
            default_explorer: None,
            reserve_margin: default_reserve_margin(),
            strict_checksum: false,
            confirmation_timeout_secs: default_confirmation_timeout(),
        }
    }
}

impl UserSettings {
    fn settings_path() -> PathBuf {
        crate::operation_log::app_data_dir().join(SETTINGS_FILE)
    }

    /// Load settings from disk, or return defaults if not found
    pub fn load() -> Self {
        Self::load_from(&Self::settings_path())
    }

    fn load_from(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(settings) => {
                        tracing::info!("Loaded settings from {:?}", path);
                        return settings;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse settings file: {}", e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read settings file: {}", e);
                }
            }
        }
        tracing::info!("Using default settings");
        Self::default()
    }

    /// Save settings to disk
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::settings_path())
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        tracing::info!("Saved settings to {:?}", path);
        Ok(())
    }

    pub fn settings_path_display() -> String {
        Self::settings_path().display().to_string()
    }

    /// Get custom RPC for a chain, or None if using default
    pub fn get_custom_rpc(&self, chain_id: u64) -> Option<&String> {
        self.custom_rpcs.get(&chain_id).filter(|s| !s.is_empty())
    }

    /// Set custom RPC for a chain (empty string removes the override)
    pub fn set_custom_rpc(&mut self, chain_id: u64, rpc: String) {
        set_or_remove(&mut self.custom_rpcs, chain_id, rpc);
    }

    pub fn set_token_contract(&mut self, chain_id: u64, contract: String) {
        set_or_remove(&mut self.token_contracts, chain_id, contract);
    }

    pub fn set_explorer_override(&mut self, chain_id: u64, base: String) {
        set_or_remove(&mut self.explorer_overrides, chain_id, base);
    }

    /// Build a config for the selected chain with every override applied.
    pub fn to_config(&self) -> Config {
        let mut config = Config::for_chain(self.selected_chain_id);
        self.apply_to(&mut config);
        config
    }

    /// Settings first, then `WALLET_*` environment overrides on top.
    pub fn resolve_config(&self) -> Result<Config> {
        let mut settings = self.clone();
        if let Some(chain_id) = config::env_chain_id()? {
            settings.selected_chain_id = chain_id;
        }
        let mut config = settings.to_config();
        config.apply_env()?;
        Ok(config)
    }

    /// Layer these settings onto `config` for its chain. Bad entries are logged and skipped.
    pub fn apply_to(&self, config: &mut Config) {
        let chain_id = config.chain_id;

        if let Some(rpc) = self.get_custom_rpc(chain_id) {
            config.rpc_url = rpc.clone();
        }

        if let Some(contract) = self.token_contracts.get(&chain_id) {
            match address::parse_address(contract, ChecksumPolicy::Lenient) {
                Ok(parsed) => config.token_address = Some(parsed),
                Err(e) => warn!("Ignoring token contract for chain {}: {}", chain_id, e),
            }
        }

        for (id, base) in &self.explorer_overrides {
            match config::normalize_explorer_base(base) {
                Ok(base) => config.explorers.insert(*id, base),
                Err(e) => warn!("Ignoring explorer for chain {}: {}", id, e),
            }
        }
        if let Some(ref base) = self.default_explorer {
            match config::normalize_explorer_base(base) {
                Ok(base) => config.explorers.set_default(base),
                Err(e) => warn!("Ignoring default explorer: {}", e),
            }
        }

        match config::normalize_reserve_margin(&self.reserve_margin) {
            Ok(margin) => config.reserve_margin = margin,
            Err(e) => warn!("Ignoring reserve margin: {:#}", e),
        }
        config.checksum_policy = if self.strict_checksum {
            ChecksumPolicy::Strict
        } else {
            ChecksumPolicy::Lenient
        };
        if self.confirmation_timeout_secs > 0 {
            config.confirmation_timeout_secs = self.confirmation_timeout_secs;
        }
    }
}

fn set_or_remove(map: &mut HashMap<u64, String>, chain_id: u64, value: String) {
    if value.trim().is_empty() {
        map.remove(&chain_id);
    } else {
        map.insert(chain_id, value.trim().to_string());
    }
}
