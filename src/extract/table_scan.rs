// Copyright 2025 Cardwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! Generic-table strategy: layouts that abandoned the semantic row markup
//! but still group one offer per table row or row-like container.

use crate::extract::lexicon;
use crate::model::Offer;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::OnceLock;

fn currency_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\d+(?:[.,\u{a0}\u{202f} ]\d{3})*(?:[.,]\d{1,2})?\s*(?:€|EUR)")
            .expect("currency regex is valid")
    })
}

/// Extract offers from generic row-shaped elements carrying a euro amount.
///
/// Only leaf rows are considered: a container that itself holds another
/// row-shaped element is a wrapper, not an offer. Rows are deduplicated on
/// their normalized text, since wrapper markup often repeats.
pub fn extract(document: &Html) -> Vec<Offer> {
    let row_sel =
        Selector::parse(r#"tr, .offer-row, [class*="row"]"#).expect("row selector is valid");

    let mut seen = HashSet::new();
    let mut offers = Vec::new();
    for row in document.select(&row_sel) {
        // Skip wrappers that contain a nested row-shaped element.
        if row.select(&row_sel).next().is_some() {
            continue;
        }
        let text = normalize_whitespace(&row.text().collect::<String>());
        if text.is_empty() || !seen.insert(text.clone()) {
            continue;
        }
        let Some(price_match) = currency_token().find(&text) else {
            continue;
        };
        let price_display = price_match.as_str().trim().to_string();
        let Ok(price_value) = crate::price::parse_price(&price_display) else {
            continue;
        };

        offers.push(Offer {
            condition: lexicon::condition_from_text(&text).unwrap_or("").to_string(),
            language: lexicon::language_from_text(&text).unwrap_or("").to_string(),
            first_edition: lexicon::first_edition_from_text(&text),
            price_display,
            price_value,
            rarity: None,
            set_label: None,
        });
    }
    offers
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_without_a_euro_amount_are_ignored() {
        let document = Html::parse_document(
            r#"<table>
              <tr><td>Seller</td><td>Condition</td><td>Price</td></tr>
              <tr><td>Near Mint</td><td>English</td><td>3,50 €</td></tr>
            </table>"#,
        );
        let offers = extract(&document);
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].price_value, 3.5);
        assert_eq!(offers[0].condition, "NM");
    }

    #[test]
    fn wrapper_rows_and_duplicates_collapse() {
        let document = Html::parse_document(
            r#"<div class="outer-row">
              <div class="offer-row">Lightly Played Deutsch 1,20 €</div>
            </div>
            <div class="offer-row">Lightly Played Deutsch 1,20 €</div>"#,
        );
        let offers = extract(&document);
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].language, "Deutsch");
        assert_eq!(offers[0].condition, "LP");
    }

    #[test]
    fn attributes_default_to_empty_when_text_is_silent() {
        let document = Html::parse_document(r#"<div class="offer-row">9,99 €</div>"#);
        let offers = extract(&document);
        assert_eq!(offers[0].condition, "");
        assert_eq!(offers[0].language, "");
        assert!(!offers[0].first_edition);
    }
}
