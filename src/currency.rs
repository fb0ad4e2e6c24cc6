// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Rupiah display and input parsing. The locale is fixed: `Rp` symbol, `.`
//! thousands separator, no fractional digits on display.

use anyhow::{Context, Result, anyhow};
use num_format::{Locale, ToFormattedString};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::prelude::*;

pub const SYMBOL: &str = "Rp";

static INPUT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(-)?\s*(?:rp\.?)?\s*(-)?\s*([0-9][0-9.,]*)\s*$").unwrap()
});
static GROUPED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,3}(\.\d{3})+$").unwrap());
static GROUPED_COMMA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,3}(\.\d{3})*,\d+$|^\d+,\d+$").unwrap());

/// `Rp 1.250.000`, `-Rp 5.000`; a missing amount renders as `Rp 0`.
pub fn format_currency(amount: Option<Decimal>) -> String {
    let rounded = amount
        .unwrap_or(Decimal::ZERO)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let digits = rounded
        .abs()
        .to_u128()
        .unwrap_or_default()
        .to_formatted_string(&Locale::id);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-{} {}", SYMBOL, digits)
    } else {
        format!("{} {}", SYMBOL, digits)
    }
}

/// Accepts plain decimals (`12500.50`), grouped rupiah (`1.250.000`,
/// `Rp 1.250.000`) and comma decimals (`1.250,50`).
pub fn parse_rupiah(s: &str) -> Result<Decimal> {
    let caps = INPUT
        .captures(s)
        .ok_or_else(|| anyhow!("Invalid amount '{}'", s.trim()))?;
    let negative = caps.get(1).is_some() || caps.get(2).is_some();
    let raw = caps.get(3).map(|m| m.as_str()).unwrap_or_default();
    let normalised = if GROUPED.is_match(raw) {
        raw.replace('.', "")
    } else if GROUPED_COMMA.is_match(raw) {
        raw.replace('.', "").replace(',', ".")
    } else {
        raw.to_string()
    };
    let value = normalised
        .parse::<Decimal>()
        .with_context(|| format!("Invalid amount '{}'", s.trim()))?;
    Ok(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn zero_and_missing_render_the_same() {
        assert_eq!(format_currency(Some(Decimal::ZERO)), "Rp 0");
        assert_eq!(format_currency(None), format_currency(Some(Decimal::ZERO)));
    }

    #[test]
    fn groups_thousands_with_dots() {
        assert_eq!(format_currency(Some(dec("1000000"))), "Rp 1.000.000");
        assert_eq!(format_currency(Some(dec("999"))), "Rp 999");
        assert_eq!(format_currency(Some(dec("1250"))), "Rp 1.250");
    }

    #[test]
    fn negative_puts_minus_before_symbol() {
        assert_eq!(format_currency(Some(dec("-5000"))), "-Rp 5.000");
        assert_eq!(format_currency(Some(dec("-0.4"))), "Rp 0");
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(format_currency(Some(dec("1499.5"))), "Rp 1.500");
        assert_eq!(format_currency(Some(dec("1499.49"))), "Rp 1.499");
        assert_eq!(format_currency(Some(dec("-2.5"))), "-Rp 3");
    }

    #[test]
    fn parses_common_inputs() {
        assert_eq!(parse_rupiah("1250000").unwrap(), dec("1250000"));
        assert_eq!(parse_rupiah("1.250.000").unwrap(), dec("1250000"));
        assert_eq!(parse_rupiah(" Rp 1.250.000 ").unwrap(), dec("1250000"));
        assert_eq!(parse_rupiah("rp5.000").unwrap(), dec("5000"));
        assert_eq!(parse_rupiah("-Rp 5.000").unwrap(), dec("-5000"));
        assert_eq!(parse_rupiah("12500.50").unwrap(), dec("12500.50"));
        assert_eq!(parse_rupiah("1.250,50").unwrap(), dec("1250.50"));
    }

    #[test]
    fn parse_then_format_is_stable_for_display_strings() {
        for s in ["Rp 0", "Rp 1.000.000", "-Rp 5.000"] {
            assert_eq!(format_currency(Some(parse_rupiah(s).unwrap())), s);
        }
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_rupiah("").is_err());
        assert!(parse_rupiah("abc").is_err());
        assert!(parse_rupiah("1.2.3").is_err());
        assert!(parse_rupiah("Rp").is_err());
    }
}
