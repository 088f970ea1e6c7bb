use anyhow::{anyhow, Result};
use ethers::types::U256;
use regex::Regex;
use std::sync::OnceLock;

/// Decimals of every EVM chain's native currency.
pub const NATIVE_DECIMALS: u32 = 18;

/// Largest number of decimal digits a U256 can always hold.
const U256_SAFE_DIGITS: usize = 77;

static DECIMAL_PATTERN: OnceLock<Regex> = OnceLock::new();

fn decimal_pattern() -> &'static Regex {
    DECIMAL_PATTERN.get_or_init(|| {
        Regex::new(r"^([0-9]+\.?[0-9]*|\.[0-9]+)$").expect("decimal pattern is a valid regex")
    })
}

/// Format base units as a decimal string without trailing fractional zeros.
///
/// `1_500_000` with 6 decimals gives `"1.5"`, one whole unit gives `"1"`.
pub fn format_units_trimmed(value: U256, decimals: u32) -> String {
    let formatted = match ethers::utils::format_units(value, decimals) {
        Ok(s) => s,
        Err(_) => return value.to_string(),
    };
    if !formatted.contains('.') {
        return formatted;
    }
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Parse a plain decimal string into base units for a currency with `decimals` decimals.
///
/// Only digits and one optional point are accepted. Signs, exponents, `NaN` and `inf`
/// are rejected. More fractional digits than `decimals` is an error rather than a
/// silent truncation.
///
/// # Errors
/// Returns an error if the string is empty, malformed, too precise or too large.
pub fn parse_decimal_units(input: &str, decimals: u32) -> Result<U256> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("amount cannot be empty"));
    }
    if !decimal_pattern().is_match(trimmed) {
        return Err(anyhow!("'{}' is not a plain decimal number", trimmed));
    }

    let (whole, fraction) = match trimmed.split_once('.') {
        Some((w, f)) => (w, f),
        None => (trimmed, ""),
    };
    if fraction.len() > decimals as usize {
        return Err(anyhow!(
            "'{}' has more than {} decimal places",
            trimmed,
            decimals
        ));
    }
    let significant = whole.trim_start_matches('0').len();
    if significant + decimals as usize > U256_SAFE_DIGITS {
        return Err(anyhow!("'{}' is too large", trimmed));
    }

    ethers::utils::parse_units(trimmed, decimals)
        .map(|pu| pu.into())
        .map_err(|e| anyhow!("Invalid amount '{}': {}", trimmed, e))
}

/// Like [`parse_decimal_units`], but extra precision rounds up instead of failing.
///
/// Used for headroom such as the reserve margin: `"0.001"` on a 2-decimal token becomes
/// one base unit (`0.01`), on a 0-decimal token one whole token. Input is read with
/// 18 decimals, so anything finer than that is still an error.
pub fn parse_units_ceil(input: &str, decimals: u32) -> Result<U256> {
    if decimals >= NATIVE_DECIMALS {
        return parse_decimal_units(input, decimals);
    }
    let fine = parse_decimal_units(input, NATIVE_DECIMALS)?;
    let scale = U256::exp10((NATIVE_DECIMALS - decimals) as usize);
    let (whole, rest) = fine.div_mod(scale);
    if rest.is_zero() {
        Ok(whole)
    } else {
        Ok(whole + 1)
    }
}
