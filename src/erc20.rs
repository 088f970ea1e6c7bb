//! Minimal ERC-20 ABI: the calls the dashboard needs, plus the faucet `claim`.

use anyhow::{anyhow, Result};
use ethers::abi::{Function, Param, ParamType, StateMutability, Token};
use ethers::prelude::*;
use ethers::providers::{Http, Provider};
use std::sync::Arc;

/// keccak256("transfer(address,uint256)")[..4]
pub const TRANSFER_SELECTOR: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];

fn param(name: &str, kind: ParamType) -> Param {
    Param {
        name: name.to_string(),
        kind,
        internal_type: None,
    }
}

#[allow(deprecated)]
fn function(
    name: &str,
    inputs: Vec<Param>,
    outputs: Vec<Param>,
    state_mutability: StateMutability,
) -> Function {
    Function {
        name: name.to_string(),
        inputs,
        outputs,
        constant: None,
        state_mutability,
    }
}

fn transfer_fn() -> Function {
    function(
        "transfer",
        vec![param("to", ParamType::Address), param("amount", ParamType::Uint(256))],
        vec![param("", ParamType::Bool)],
        StateMutability::NonPayable,
    )
}

/// Faucet mint on test tokens that expose `claim(address)`.
fn claim_fn() -> Function {
    function(
        "claim",
        vec![param("account", ParamType::Address)],
        vec![],
        StateMutability::NonPayable,
    )
}

fn balance_of_fn() -> Function {
    function(
        "balanceOf",
        vec![param("account", ParamType::Address)],
        vec![param("", ParamType::Uint(256))],
        StateMutability::View,
    )
}

fn decimals_fn() -> Function {
    function(
        "decimals",
        vec![],
        vec![param("", ParamType::Uint(8))],
        StateMutability::View,
    )
}

fn symbol_fn() -> Function {
    function(
        "symbol",
        vec![],
        vec![param("", ParamType::String)],
        StateMutability::View,
    )
}

/// Calldata for `transfer(to, amount)`.
pub fn encode_transfer(to: Address, amount: U256) -> Result<Bytes> {
    let data = transfer_fn().encode_input(&[Token::Address(to), Token::Uint(amount)])?;
    Ok(data.into())
}

/// Calldata for `claim(account)`.
pub fn encode_claim(account: Address) -> Result<Bytes> {
    let data = claim_fn().encode_input(&[Token::Address(account)])?;
    Ok(data.into())
}

async fn call(
    provider: &Arc<Provider<Http>>,
    contract: Address,
    func: &Function,
    args: &[Token],
) -> Result<Vec<Token>> {
    let calldata = func.encode_input(args)?;
    let tx = TransactionRequest::new().to(contract).data(calldata);
    let raw = provider.call(&tx.into(), None).await?;
    func.decode_output(&raw)
        .map_err(|e| anyhow!("Failed to decode {}() from {:?}: {}", func.name, contract, e))
}

/// Token balance of `owner` in base units.
pub async fn balance_of(
    provider: &Arc<Provider<Http>>,
    contract: Address,
    owner: Address,
) -> Result<U256> {
    let tokens = call(provider, contract, &balance_of_fn(), &[Token::Address(owner)]).await?;
    match tokens.into_iter().next() {
        Some(Token::Uint(value)) => Ok(value),
        other => Err(anyhow!("Unexpected balanceOf output: {:?}", other)),
    }
}

pub async fn decimals(provider: &Arc<Provider<Http>>, contract: Address) -> Result<u8> {
    let tokens = call(provider, contract, &decimals_fn(), &[]).await?;
    match tokens.into_iter().next() {
        Some(Token::Uint(value)) if value <= U256::from(u8::MAX) => Ok(value.as_u32() as u8),
        other => Err(anyhow!("Unexpected decimals output: {:?}", other)),
    }
}

pub async fn symbol(provider: &Arc<Provider<Http>>, contract: Address) -> Result<String> {
    let tokens = call(provider, contract, &symbol_fn(), &[]).await?;
    match tokens.into_iter().next() {
        Some(Token::String(value)) => Ok(value),
        other => Err(anyhow!("Unexpected symbol output: {:?}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_selector_matches_signature() {
        let selector = &ethers::utils::keccak256("transfer(address,uint256)")[..4];
        assert_eq!(selector, TRANSFER_SELECTOR);
        assert_eq!(transfer_fn().short_signature(), TRANSFER_SELECTOR);
    }

    #[test]
    fn test_encode_transfer_layout() {
        let to = Address::repeat_byte(0x22);
        let data = encode_transfer(to, U256::from(1_000_000u64)).unwrap();

        assert_eq!(data.len(), 4 + 32 + 32);
        assert_eq!(&data[..4], &TRANSFER_SELECTOR);
        // Address is left-padded into the first word
        assert_eq!(&data[16..36], to.as_bytes());
        assert_eq!(U256::from_big_endian(&data[36..68]), U256::from(1_000_000u64));
    }

    #[test]
    fn test_encode_claim_layout() {
        let account = Address::repeat_byte(0x44);
        let data = encode_claim(account).unwrap();

        assert_eq!(data.len(), 4 + 32);
        assert_eq!(&data[..4], &ethers::utils::keccak256("claim(address)")[..4]);
        assert_eq!(&data[16..36], account.as_bytes());
    }

    #[test]
    fn test_view_selectors() {
        assert_eq!(
            balance_of_fn().short_signature(),
            ethers::utils::keccak256("balanceOf(address)")[..4]
        );
        assert_eq!(
            decimals_fn().short_signature(),
            ethers::utils::keccak256("decimals()")[..4]
        );
        assert_eq!(
            symbol_fn().short_signature(),
            ethers::utils::keccak256("symbol()")[..4]
        );
    }
}
