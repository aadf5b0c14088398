// Copyright 2025 Cardwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! Locale-aware price normalization.
//!
//! Marketplace pages mix comma-decimal ("3,50 €"), dot-decimal ("1234.56€"),
//! and grouped ("15.000,00€", "1 234.56") formats depending on the viewer's
//! locale. The disambiguation rules:
//!
//! - both `.` and `,` present: the rightmost one is the decimal separator,
//!   the other is grouping and is stripped;
//! - only `,`: decimal (grouping when it occurs more than once);
//! - only `.`: decimal, unless the fraction is exactly three digits and no
//!   comma appears anywhere in the original text (then grouping);
//! - space / NBSP grouping is stripped before parsing.

use crate::error::PriceParseError;
use regex::Regex;
use std::sync::OnceLock;

fn price_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\d+(?:[.,]\d{3})*(?:[.,]\d{1,2})?").expect("price regex is valid")
    })
}

/// Parse the first price-shaped token out of `text`.
///
/// Failure is never fatal to an extraction pass — the caller logs it and
/// applies the zero-price policy.
pub fn parse_price(text: &str) -> Result<f64, PriceParseError> {
    let cleaned = strip_grouping_spaces(text);
    let token = price_token()
        .find(&cleaned)
        .ok_or_else(|| PriceParseError(text.to_string()))?
        .as_str();

    let has_dot = token.contains('.');
    let has_comma = token.contains(',');

    let normalized = if has_dot && has_comma {
        // Rightmost separator is the decimal one.
        let (decimal, grouping) = if token.rfind('.') > token.rfind(',') {
            ('.', ',')
        } else {
            (',', '.')
        };
        token.replace(grouping, "").replace(decimal, ".")
    } else if has_comma {
        if token.matches(',').count() > 1 {
            token.replace(',', "")
        } else {
            token.replace(',', ".")
        }
    } else if has_dot {
        if token.matches('.').count() > 1 {
            token.replace('.', "")
        } else {
            let fraction = &token[token.find('.').map(|i| i + 1).unwrap_or(0)..];
            if fraction.len() == 3 && !text.contains(',') {
                // "15.000" with no comma anywhere reads as fifteen thousand.
                token.replace('.', "")
            } else {
                token.to_string()
            }
        }
    } else {
        token.to_string()
    };

    normalized
        .parse::<f64>()
        .map_err(|_| PriceParseError(text.to_string()))
}

/// Drop space-like grouping characters that sit between digits ("1 234.56").
fn strip_grouping_spaces(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    for (i, &c) in chars.iter().enumerate() {
        let spacey = c == ' ' || c == '\u{a0}' || c == '\u{202f}';
        if spacey
            && i > 0
            && chars[i - 1].is_ascii_digit()
            && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit())
        {
            continue;
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_decimal() {
        assert_eq!(parse_price("3,50 €").unwrap(), 3.50);
        assert_eq!(parse_price("0,99€").unwrap(), 0.99);
    }

    #[test]
    fn grouped_european() {
        assert_eq!(parse_price("15.000,00€").unwrap(), 15000.00);
        assert_eq!(parse_price("1.234.567,89 €").unwrap(), 1_234_567.89);
    }

    #[test]
    fn dot_decimal() {
        assert_eq!(parse_price("1234.56€").unwrap(), 1234.56);
        assert_eq!(parse_price("15.50").unwrap(), 15.50);
    }

    #[test]
    fn lone_dot_with_three_digit_fraction_is_grouping() {
        assert_eq!(parse_price("15.000€").unwrap(), 15000.00);
        // A comma elsewhere flips the reading back to decimal grouping pair.
        assert_eq!(parse_price("ab, 15.000").unwrap(), 15.0);
    }

    #[test]
    fn grouped_anglo() {
        assert_eq!(parse_price("1,234.56 €").unwrap(), 1234.56);
        assert_eq!(parse_price("1,234,567").unwrap(), 1_234_567.0);
    }

    #[test]
    fn space_grouping() {
        assert_eq!(parse_price("1 234.56").unwrap(), 1234.56);
        assert_eq!(parse_price("1\u{a0}234,56 €").unwrap(), 1234.56);
    }

    #[test]
    fn no_number_is_an_error() {
        assert!(parse_price("ask seller").is_err());
        assert!(parse_price("").is_err());
    }

    #[test]
    fn idempotent_under_format_round_trip() {
        for text in ["3,50 €", "15.000,00€", "1234.56€", "15.000€", "7€"] {
            let first = parse_price(text).unwrap();
            let second = parse_price(&format!("{first:.2}")).unwrap();
            assert!((first - second).abs() < 1e-9, "{text} drifted");
        }
    }
}
