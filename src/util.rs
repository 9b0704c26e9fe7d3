// Formatting and lenient parsing helpers.
//
// Amounts stay `Decimal` end to end; only the final display string is built
// here.
use chrono::Month;
use num_format::{Locale, ToFormattedString};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer};

/// Format a decimal with a fixed number of decimal places and thousands
/// separators, e.g. `-1,234.50`.
pub fn format_decimal(n: Decimal, decimals: u32) -> String {
    let rounded = n.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    let neg = rounded.is_sign_negative() && !rounded.is_zero();
    let s = format!("{:.*}", decimals as usize, rounded.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let mut res = match int_part.parse::<u64>() {
        Ok(v) => v.to_formatted_string(&Locale::en),
        // Beyond u64: leave the digits ungrouped.
        Err(_) => int_part.to_string(),
    };
    if decimals > 0 {
        res.push('.');
        match frac_part {
            Some(frac) => res.push_str(frac),
            None => res.push_str(&"0".repeat(decimals as usize)),
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

/// Two-decimal amount followed by the currency suffix, e.g. `1,200.00 zł`.
pub fn format_amount(n: Decimal, currency: &str) -> String {
    if currency.is_empty() {
        format_decimal(n, 2)
    } else {
        format!("{} {}", format_decimal(n, 2), currency)
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

/// English month name for 1..=12; anything else is echoed back as a number.
pub fn month_name(month: u32) -> String {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name().to_string())
        .unwrap_or_else(|| format!("{:02}", month))
}

/// Accepts a count written either as a JSON number or as a numeric string.
pub fn de_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(u64),
        Text(String),
    }
    match Count::deserialize(deserializer)? {
        Count::Number(n) => Ok(n),
        Count::Text(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid count: {:?}", s))),
    }
}
