//! Signing and broadcast.
//!
//! [`TransferSigner`] is the seam between the transfer workflow and whatever holds the
//! keys. [`LocalWalletSigner`] signs with a private key through ethers-rs and
//! broadcasts over the configured RPC.

use crate::config::Config;
use crate::erc20;
use crate::error::TransferError;
use crate::transfer::{Asset, TokenInfo, TransferRequest, TxHandle};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use ethers::prelude::*;
use ethers::providers::{Http, Provider};
use std::env;
use std::sync::Arc;
use tracing::{error, info};

/// Environment variable holding the hex private key.
pub const PRIVATE_KEY_ENV: &str = "WALLET_PRIVATE_KEY";

/// Signs and broadcasts a validated transfer.
#[async_trait]
pub trait TransferSigner: Send + Sync {
    /// Name for logging
    fn name(&self) -> &'static str;

    /// Address the transfers are sent from.
    fn address(&self) -> Address;

    /// Sign and broadcast. Returns the transaction hash once the node accepted it.
    async fn submit_transfer(&self, request: &TransferRequest) -> Result<TxHandle, TransferError>;

    /// Ask a faucet token to mint test funds to [`address`](Self::address).
    async fn claim_tokens(&self, token: &TokenInfo) -> Result<TxHandle, TransferError>;
}

type WalletClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Private-key signer backed by ethers-rs.
pub struct LocalWalletSigner {
    client: Arc<WalletClient>,
    chain_id: u64,
}

impl LocalWalletSigner {
    pub fn new(provider: Arc<Provider<Http>>, wallet: LocalWallet, chain_id: u64) -> Self {
        let wallet = wallet.with_chain_id(chain_id);
        Self {
            client: Arc::new(SignerMiddleware::new((*provider).clone(), wallet)),
            chain_id,
        }
    }

    /// Build a signer from the key in [`PRIVATE_KEY_ENV`] and the config's RPC.
    pub fn from_env(config: &Config) -> Result<Self> {
        let key = env::var(PRIVATE_KEY_ENV)
            .with_context(|| format!("{} is not set", PRIVATE_KEY_ENV))?;
        let wallet = parse_wallet(&key)?;
        let provider = config.get_provider()?;
        info!(
            "Loaded wallet {:?} for chain {}",
            wallet.address(),
            config.chain_id
        );
        Ok(Self::new(provider, wallet, config.chain_id))
    }

    fn build_transaction(&self, request: &TransferRequest) -> Result<TransactionRequest> {
        let from = self.client.address();
        let tx = match request.asset() {
            Asset::Native { .. } => TransactionRequest::new()
                .from(from)
                .to(request.to())
                .value(request.amount_base_units()),
            Asset::Token(token) => TransactionRequest::new()
                .from(from)
                .to(token.contract)
                .data(erc20::encode_transfer(request.to(), request.amount_base_units())?),
        };
        Ok(tx.chain_id(self.chain_id))
    }

    fn build_claim(&self, token: &TokenInfo) -> Result<TransactionRequest> {
        let from = self.client.address();
        Ok(TransactionRequest::new()
            .from(from)
            .to(token.contract)
            .data(erc20::encode_claim(from)?)
            .chain_id(self.chain_id))
    }

    async fn broadcast(&self, tx: TransactionRequest) -> Result<TxHandle, TransferError> {
        match self.client.send_transaction(tx, None).await {
            Ok(pending) => Ok(TxHandle::new(pending.tx_hash())),
            Err(e) => {
                error!("Broadcast failed: {}", e);
                Err(TransferError::SubmissionRejected(e.to_string()))
            }
        }
    }
}

/// Parse a hex private key, with or without `0x`.
pub fn parse_wallet(key: &str) -> Result<LocalWallet> {
    let trimmed = key.trim();
    let hex = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    hex.parse::<LocalWallet>()
        .map_err(|e| anyhow!("Invalid private key: {}", e))
}

#[async_trait]
impl TransferSigner for LocalWalletSigner {
    fn name(&self) -> &'static str {
        "local-wallet"
    }

    fn address(&self) -> Address {
        self.client.address()
    }

    async fn submit_transfer(&self, request: &TransferRequest) -> Result<TxHandle, TransferError> {
        if request.chain_id() != self.chain_id {
            return Err(TransferError::SubmissionRejected(format!(
                "wallet is on chain {}, request targets chain {}",
                self.chain_id,
                request.chain_id()
            )));
        }

        let tx = self
            .build_transaction(request)
            .map_err(|e| TransferError::SubmissionRejected(e.to_string()))?;

        info!("Broadcasting {} via {}", request.describe(), self.name());
        self.broadcast(tx).await
    }

    async fn claim_tokens(&self, token: &TokenInfo) -> Result<TxHandle, TransferError> {
        let tx = self
            .build_claim(token)
            .map_err(|e| TransferError::SubmissionRejected(e.to_string()))?;

        info!("Claiming {} from {:?} via {}", token.symbol, token.contract, self.name());
        self.broadcast(tx).await
    }
}
