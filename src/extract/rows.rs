// Copyright 2025 Cardwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! Semantic-row strategy: the structured offer table the marketplace renders
//! when the page loads normally. Highest-confidence extraction.

use super::ZeroPricePolicy;
use crate::model::Offer;
use crate::price;
use scraper::{ElementRef, Html, Selector};
use tracing::warn;

/// Extract offers from `.article-row` elements.
///
/// A failing sub-field skips the row, never aborts the pass. Page-level
/// rarity and set labels are attached to every offer when present, so the
/// enricher can fall back to them later.
pub fn extract(document: &Html, policy: ZeroPricePolicy) -> Vec<Offer> {
    let row_sel = Selector::parse(".article-row").expect("row selector is valid");
    let badge_sel =
        Selector::parse(".product-attributes .badge").expect("badge selector is valid");
    let icon_sel = Selector::parse(".product-attributes .icon").expect("icon selector is valid");
    let special_sel =
        Selector::parse(".product-attributes .st_SpecialIcon")
            .expect("special icon selector is valid");
    let price_sel = Selector::parse(".price-container").expect("price selector is valid");

    let (rarity, set_label) = page_details(document);

    let mut offers = Vec::new();
    for row in document.select(&row_sel) {
        // A row without a condition badge or a price is not a sale offer.
        let Some(condition) = first_text(&row, &badge_sel) else {
            continue;
        };
        let Some(price_display) = first_text(&row, &price_sel) else {
            continue;
        };

        let language = row
            .select(&icon_sel)
            .next()
            .and_then(|el| {
                el.value()
                    .attr("data-original-title")
                    .or_else(|| el.value().attr("title"))
            })
            .map(|s| s.trim().to_string())
            .unwrap_or_default();
        let first_edition = row.select(&special_sel).next().is_some();

        let price_value = match price::parse_price(&price_display) {
            Ok(value) => value,
            Err(e) => match policy {
                ZeroPricePolicy::Keep => {
                    warn!("keeping offer with unparsable price: {e}");
                    0.0
                }
                ZeroPricePolicy::Drop => {
                    warn!("dropping offer with unparsable price: {e}");
                    continue;
                }
            },
        };

        offers.push(Offer {
            condition,
            language,
            first_edition,
            price_display,
            price_value,
            rarity: rarity.clone(),
            set_label: set_label.clone(),
        });
    }
    offers
}

/// Page-level rarity and set/expansion labels from the card info panel.
fn page_details(document: &Html) -> (Option<String>, Option<String>) {
    let rarity_sel = Selector::parse(".info-list-container svg[data-bs-original-title]")
        .expect("rarity selector is valid");
    let set_sel = Selector::parse(r#".info-list-container a[href*="/Expansions/"]"#)
        .expect("set selector is valid");

    let rarity = document
        .select(&rarity_sel)
        .next()
        .and_then(|el| el.value().attr("data-bs-original-title"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    let set_label = document
        .select(&set_sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty());
    (rarity, set_label)
}

fn first_text(row: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    row.select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(body: &str) -> Html {
        Html::parse_document(&format!("<html><body>{body}</body></html>"))
    }

    #[test]
    fn rows_missing_subfields_are_skipped_not_fatal() {
        let document = page(
            r#"
            <div class="article-row">
              <div class="product-attributes"><span class="badge">NM</span></div>
              <div class="price-container">2,00 €</div>
            </div>
            <div class="article-row">
              <div class="product-attributes"><span class="badge">LP</span></div>
              <!-- no price container: skipped -->
            </div>"#,
        );
        let offers = extract(&document, ZeroPricePolicy::Keep);
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].condition, "NM");
    }

    #[test]
    fn zero_price_policy_keep_retains_offer_at_zero() {
        let document = page(
            r#"
            <div class="article-row">
              <div class="product-attributes"><span class="badge">NM</span></div>
              <div class="price-container">ask seller</div>
            </div>"#,
        );
        let offers = extract(&document, ZeroPricePolicy::Keep);
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].price_value, 0.0);
        assert_eq!(offers[0].price_display, "ask seller");
    }

    #[test]
    fn zero_price_policy_drop_discards_offer() {
        let document = page(
            r#"
            <div class="article-row">
              <div class="product-attributes"><span class="badge">NM</span></div>
              <div class="price-container">ask seller</div>
            </div>"#,
        );
        let offers = extract(&document, ZeroPricePolicy::Drop);
        assert!(offers.is_empty());
    }

    #[test]
    fn language_falls_back_to_title_attribute() {
        let document = page(
            r#"
            <div class="article-row">
              <div class="product-attributes">
                <span class="badge">NM</span>
                <span class="icon" title="Deutsch"></span>
              </div>
              <div class="price-container">9,99 €</div>
            </div>"#,
        );
        let offers = extract(&document, ZeroPricePolicy::Keep);
        assert_eq!(offers[0].language, "Deutsch");
    }
}
