// Copyright 2025 Cardwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! Card-level enrichment: after an offer is chosen, pull the card's display
//! name, rarity, set and image from the same page snapshot. Every field has
//! a fallback; enrichment can degrade but never fail.

use crate::model::{Offer, ScrapeResult};
use scraper::{Html, Selector};

pub fn enrich(html: &str, chosen_offer: Offer, offer_count: usize) -> ScrapeResult {
    let document = Html::parse_document(html);

    let display_name =
        select_text(&document, "h1").unwrap_or_else(|| "Unknown card".to_string());

    let rarity = select_attr(
        &document,
        ".info-list-container svg[data-bs-original-title]",
        "data-bs-original-title",
    )
    .or_else(|| {
        select_attr(
            &document,
            ".info-list-container svg[data-original-title]",
            "data-original-title",
        )
    })
    .or_else(|| chosen_offer.rarity.clone())
    .unwrap_or_else(|| "Unknown rarity".to_string());

    let set_label = select_text(&document, r#".info-list-container a[href*="/Expansions/"]"#)
        .or_else(|| select_text(&document, r#"a[href*="/Expansions/"]"#))
        .or_else(|| chosen_offer.set_label.clone())
        .unwrap_or_else(|| "Unknown set".to_string());

    let image_url = select_attr(&document, r#"meta[property="og:image"]"#, "content")
        .or_else(|| select_attr(&document, ".card-image img", "src"));

    ScrapeResult {
        display_name,
        set_label,
        rarity,
        chosen_offer,
        offer_count,
        image_url,
    }
}

fn select_text(document: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    document
        .select(&sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn select_attr(document: &Html, selector: &str, attr: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    document
        .select(&sel)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
