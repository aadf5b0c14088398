// Copyright 2025 Cardwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! Raw-text strategy: the last resort when the page kept its prices but
//! lost all recognizable structure. Scans visible text plus tooltip-style
//! attributes for euro amounts and infers attributes from surrounding words.

use crate::extract::lexicon;
use crate::model::Offer;
use regex::Regex;
use scraper::Html;
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::debug;

/// Cap on offers recovered from loose text; beyond this the page is noise.
const MAX_LOOSE_OFFERS: usize = 10;

fn currency_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\d+(?:[.,\u{a0}\u{202f} ]\d{3})*(?:[.,]\d{1,2})?\s*(?:€|EUR)")
            .expect("currency regex is valid")
    })
}

pub fn extract(document: &Html) -> Vec<Offer> {
    let mut seen_cents: HashSet<i64> = HashSet::new();
    let mut offers = Vec::new();

    for chunk in text_chunks(document) {
        for price_match in currency_token().find_iter(&chunk) {
            if offers.len() >= MAX_LOOSE_OFFERS {
                debug!("loose-text scan hit the offer cap, stopping");
                return offers;
            }
            let price_display = price_match.as_str().trim().to_string();
            let Ok(price_value) = crate::price::parse_price(&price_display) else {
                continue;
            };
            // Amounts outside the plausible single-card range are page
            // chrome (shipping thresholds, ad banners), not offers.
            if price_value <= 0.0 || price_value >= 1000.0 {
                continue;
            }
            if !seen_cents.insert((price_value * 100.0).round() as i64) {
                continue;
            }
            let context = context_window(&chunk, price_match.start(), price_match.end());
            offers.push(Offer {
                condition: lexicon::condition_from_text(context).unwrap_or("").to_string(),
                language: lexicon::language_from_text(context).unwrap_or("").to_string(),
                first_edition: lexicon::first_edition_from_text(context),
                price_display,
                price_value,
                rarity: None,
                set_label: None,
            });
        }
    }
    offers
}

/// Byte radius of the attribute-inference window around a currency token.
const CONTEXT_RADIUS: usize = 40;

/// Window of the chunk centered on one token, snapped to char boundaries.
/// A long text node holding several prices keeps their contexts apart.
fn context_window(chunk: &str, start: usize, end: usize) -> &str {
    let mut lo = start.saturating_sub(CONTEXT_RADIUS);
    while !chunk.is_char_boundary(lo) {
        lo -= 1;
    }
    let mut hi = (end + CONTEXT_RADIUS).min(chunk.len());
    while !chunk.is_char_boundary(hi) {
        hi += 1;
    }
    &chunk[lo..hi]
}

/// Visible text nodes (script/style excluded) followed by tooltip-style
/// attribute values, each as one normalized chunk.
fn text_chunks(document: &Html) -> Vec<String> {
    let mut chunks = Vec::new();
    for node in document.tree.nodes() {
        if let Some(text) = node.value().as_text() {
            let hidden = node.ancestors().any(|a| {
                a.value()
                    .as_element()
                    .is_some_and(|el| matches!(el.name(), "script" | "style"))
            });
            if !hidden {
                push_chunk(&mut chunks, text);
            }
        } else if let Some(el) = node.value().as_element() {
            for (name, value) in el.attrs() {
                if name == "title" || name == "alt" || name.starts_with("data-") {
                    push_chunk(&mut chunks, value);
                }
            }
        }
    }
    chunks
}

fn push_chunk(chunks: &mut Vec<String>, raw: &str) {
    let normalized = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if !normalized.is_empty() {
        chunks.push(normalized);
    }
}
