// Copyright 2025 Cardwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! Offer extraction cascade over a rendered HTML snapshot.
//!
//! Three strategies are tried in order, stopping at the first that yields at
//! least one offer. Results are never merged across strategies — a later
//! strategy only runs when the earlier one found nothing, so extraction
//! confidence stays uniform within one pass.
//!
//! All entry points are synchronous because the `scraper` crate's types are
//! `!Send`; the engine extracts from an HTML string it already holds.

pub mod lexicon;
pub mod rows;
pub mod table_scan;
pub mod text_scan;

use crate::model::Offer;
use scraper::Html;
use tracing::debug;

/// What to do with an offer whose price text failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZeroPricePolicy {
    /// Keep the offer at price 0.0 — its other attributes may still match.
    #[default]
    Keep,
    /// Drop the offer entirely.
    Drop,
}

/// Which strategy produced a batch of offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    SemanticRows,
    TableScan,
    TextScan,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::SemanticRows => "semantic-rows",
            Strategy::TableScan => "table-scan",
            Strategy::TextScan => "text-scan",
        }
    }
}

/// Run the cascade over a page snapshot.
///
/// Returns the offers plus the strategy that produced them, or an empty list
/// when even the raw text scan found nothing.
pub fn extract_offers(html: &str, policy: ZeroPricePolicy) -> (Vec<Offer>, Option<Strategy>) {
    let document = Html::parse_document(html);

    let offers = rows::extract(&document, policy);
    if !offers.is_empty() {
        return (offers, Some(Strategy::SemanticRows));
    }
    debug!("no semantic rows found, falling back to table scan");

    let offers = table_scan::extract(&document);
    if !offers.is_empty() {
        return (offers, Some(Strategy::TableScan));
    }
    debug!("table scan found nothing, falling back to raw text scan");

    let offers = text_scan::extract(&document);
    if !offers.is_empty() {
        return (offers, Some(Strategy::TextScan));
    }

    (Vec::new(), None)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEMANTIC_PAGE: &str = r#"
    <html><body>
      <div class="info-list-container">
        <svg data-bs-original-title="Rare"></svg>
        <a href="/en/Pokemon/Expansions/Base-Set">Base Set</a>
      </div>
      <div class="article-row">
        <div class="product-attributes">
          <span class="badge">NM</span>
          <span class="icon" data-original-title="English"></span>
        </div>
        <div class="price-container">2,00 €</div>
      </div>
      <div class="article-row">
        <div class="product-attributes">
          <span class="badge">NM</span>
          <span class="icon" data-original-title="English"></span>
          <span class="st_SpecialIcon"></span>
        </div>
        <div class="price-container">5,00 €</div>
      </div>
    </body></html>"#;

    const TABLE_PAGE: &str = r#"
    <html><body>
      <table>
        <tr><td>Near Mint</td><td>English</td><td>3,50 €</td></tr>
        <tr><td>Lightly Played</td><td>Français, 1st Edition</td><td>1,20 €</td></tr>
      </table>
    </body></html>"#;

    const LOOSE_PAGE: &str = r#"
    <html><body>
      <p>Trending near mint copies from 4,00 € this week.</p>
      <span title="English NM 4,00 €">best seller</span>
      <div data-price="12,34 €">promo</div>
    </body></html>"#;

    #[test]
    fn semantic_rows_win_and_later_strategies_never_run() {
        let (offers, strategy) = extract_offers(SEMANTIC_PAGE, ZeroPricePolicy::Keep);
        assert_eq!(strategy, Some(Strategy::SemanticRows));
        assert_eq!(offers.len(), 2);
        assert_eq!(offers[0].condition, "NM");
        assert_eq!(offers[0].language, "English");
        assert!(!offers[0].first_edition);
        assert_eq!(offers[0].price_value, 2.0);
        assert!(offers[1].first_edition);
        assert_eq!(offers[1].rarity.as_deref(), Some("Rare"));
        assert_eq!(offers[1].set_label.as_deref(), Some("Base Set"));
    }

    #[test]
    fn table_scan_runs_when_no_semantic_rows_exist() {
        let (offers, strategy) = extract_offers(TABLE_PAGE, ZeroPricePolicy::Keep);
        assert_eq!(strategy, Some(Strategy::TableScan));
        assert_eq!(offers.len(), 2);
        assert_eq!(offers[0].condition, "NM");
        assert_eq!(offers[0].language, "English");
        assert_eq!(offers[0].price_value, 3.5);
        assert_eq!(offers[1].condition, "LP");
        assert_eq!(offers[1].language, "Français");
        assert!(offers[1].first_edition);
    }

    #[test]
    fn text_scan_is_the_last_resort() {
        let (offers, strategy) = extract_offers(LOOSE_PAGE, ZeroPricePolicy::Keep);
        assert_eq!(strategy, Some(Strategy::TextScan));
        // 4,00 € appears twice but is deduplicated by numeric value.
        assert_eq!(offers.len(), 2);
        assert!(offers.iter().any(|o| o.price_value == 4.0));
        assert!(offers.iter().any(|o| o.price_value == 12.34));
    }

    #[test]
    fn empty_page_yields_nothing() {
        let (offers, strategy) = extract_offers("<html><body></body></html>", ZeroPricePolicy::Keep);
        assert!(offers.is_empty());
        assert_eq!(strategy, None);
    }
}
