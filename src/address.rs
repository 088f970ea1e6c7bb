//! Recipient address validation.
//!
//! Validity depends only on the string: `0x` followed by exactly 40 hex digits.
//! Under [`ChecksumPolicy::Strict`] a mixed-case address must also carry a correct
//! EIP-55 checksum. All-lowercase and all-uppercase forms carry no checksum and pass.

use crate::error::TransferError;
use ethers::types::Address;
use ethers::utils::to_checksum;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

static ADDRESS_PATTERN: OnceLock<Regex> = OnceLock::new();

fn address_pattern() -> &'static Regex {
    ADDRESS_PATTERN.get_or_init(|| {
        Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("address pattern is a valid regex")
    })
}

/// How strictly letter case in an address is checked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChecksumPolicy {
    /// Any letter case is accepted.
    #[default]
    Lenient,
    /// Mixed-case addresses must match their EIP-55 checksum.
    Strict,
}

/// Check the lexical form only.
pub fn is_valid_address(input: &str) -> bool {
    address_pattern().is_match(input)
}

/// Parse a recipient string into an [`Address`], applying the checksum policy.
pub fn parse_address(input: &str, policy: ChecksumPolicy) -> Result<Address, TransferError> {
    let trimmed = input.trim();
    if !is_valid_address(trimmed) {
        return Err(TransferError::InvalidAddress(format!(
            "'{}' is not 0x followed by 40 hex digits",
            trimmed
        )));
    }

    let address: Address = trimmed
        .parse()
        .map_err(|e| TransferError::InvalidAddress(format!("'{}': {}", trimmed, e)))?;

    if policy == ChecksumPolicy::Strict && is_mixed_case(&trimmed[2..]) {
        let expected = to_checksum(&address, None);
        if expected != trimmed {
            return Err(TransferError::InvalidAddress(format!(
                "checksum mismatch, expected {}",
                expected
            )));
        }
    }

    Ok(address)
}

fn is_mixed_case(hex: &str) -> bool {
    let has_lower = hex.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = hex.chars().any(|c| c.is_ascii_uppercase());
    has_lower && has_upper
}

/// Shorten an address for display: `0xA0Cf…251e`.
pub fn short_address(address: &Address) -> String {
    let full = to_checksum(address, None);
    format!("{}…{}", &full[..6], &full[full.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;

    // Vitalik's address, the standard EIP-55 test vector
    const CHECKSUMMED: &str = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";

    #[test]
    fn test_valid_lowercase() {
        assert!(is_valid_address("0xd8da6bf26964af9d7eed9e03e53415d37aa96045"));
    }

    #[test]
    fn test_too_short_rejected() {
        assert!(!is_valid_address("0x1234"));
        let err = parse_address("0x1234", ChecksumPolicy::Lenient).unwrap_err();
        assert!(matches!(err, TransferError::InvalidAddress(_)));
    }

    #[test]
    fn test_missing_prefix_rejected() {
        assert!(!is_valid_address("d8da6bf26964af9d7eed9e03e53415d37aa96045"));
    }

    #[test]
    fn test_non_hex_rejected() {
        assert!(!is_valid_address("0xg8da6bf26964af9d7eed9e03e53415d37aa96045"));
    }

    #[test]
    fn test_too_long_rejected() {
        assert!(!is_valid_address("0xd8da6bf26964af9d7eed9e03e53415d37aa960450"));
    }

    #[test]
    fn test_ens_name_rejected() {
        assert!(!is_valid_address("vitalik.eth"));
    }

    #[test]
    fn test_surrounding_whitespace_trimmed() {
        let addr = parse_address(&format!("  {}  ", CHECKSUMMED), ChecksumPolicy::Strict).unwrap();
        assert_eq!(to_checksum(&addr, None), CHECKSUMMED);
    }

    #[test]
    fn test_lenient_accepts_bad_checksum() {
        let bad = "0xD8dA6BF26964aF9D7eEd9e03E53415D37aA96045";
        assert!(parse_address(bad, ChecksumPolicy::Lenient).is_ok());
    }

    #[test]
    fn test_strict_rejects_bad_checksum() {
        let bad = "0xD8dA6BF26964aF9D7eEd9e03E53415D37aA96045";
        let err = parse_address(bad, ChecksumPolicy::Strict).unwrap_err();
        assert!(err.to_string().contains("checksum"));
    }

    #[test]
    fn test_strict_accepts_valid_checksum() {
        assert!(parse_address(CHECKSUMMED, ChecksumPolicy::Strict).is_ok());
    }

    #[test]
    fn test_strict_accepts_single_case() {
        assert!(parse_address(&CHECKSUMMED.to_lowercase(), ChecksumPolicy::Strict).is_ok());
        let upper = format!("0x{}", CHECKSUMMED[2..].to_uppercase());
        assert!(parse_address(&upper, ChecksumPolicy::Strict).is_ok());
    }

    #[test]
    fn test_short_address() {
        let addr: Address = CHECKSUMMED.parse().unwrap();
        assert_eq!(short_address(&addr), "0xd8dA…6045");
    }
}
