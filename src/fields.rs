use std::str::FromStr;

use rust_decimal::Decimal;

const CURRENCY_SYMBOLS: &[char] = &['£', '$', '€', '¥', '₹', '₩', '₽', '¢'];

/// Outcome of a lenient numeric parse: the value used plus whether the raw
/// text had to be replaced by a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parsed<T> {
    pub value: T,
    pub defaulted: bool,
}

/// Quantity is always at least 1. Empty text defaults silently; invalid or
/// non-positive text is clamped and flagged.
pub fn parse_quantity(raw: &str) -> Parsed<u32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Parsed {
            value: 1,
            defaulted: false,
        };
    }
    match trimmed.parse::<u32>() {
        Ok(value) if value > 0 => Parsed {
            value,
            defaulted: false,
        },
        _ => Parsed {
            value: 1,
            defaulted: true,
        },
    }
}

/// Strips currency symbols, thousands separators and stray text, then parses
/// what remains. `None` when nothing numeric survives.
pub fn parse_order_value(raw: &str) -> Option<Decimal> {
    let cleaned = raw
        .chars()
        .filter(|c| !CURRENCY_SYMBOLS.contains(c) && *c != ',' && !c.is_whitespace())
        .collect::<String>();
    let mut numeric = String::with_capacity(cleaned.len());
    for ch in cleaned.chars() {
        match ch {
            '0'..='9' | '.' => numeric.push(ch),
            '-' if numeric.is_empty() => numeric.push(ch),
            _ => {}
        }
    }
    if numeric.is_empty() || numeric == "-" {
        return None;
    }
    Decimal::from_str(&numeric).ok()
}

pub fn parse_remaining_stock(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse().ok()
}

/// Removes every whitespace character, not only the ends.
pub fn strip_whitespace(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

pub fn optional_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
