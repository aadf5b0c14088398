// Copyright 2025 Cardwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! Criteria matching over an extracted offer batch.
//!
//! Selection is deterministic regardless of page ordering: among equally
//! acceptable offers the cheapest wins, with the display string as the final
//! tie-break.

use crate::model::{MatchCriteria, Offer};
use serde::Serialize;
use tracing::info;

/// How strictly the criteria bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Only an exact (condition, language, first-edition) hit counts.
    #[default]
    Exact,
    /// Progressively relax the criteria rather than fail the scrape.
    BestEffort,
}

/// Which rung of the relaxation ladder produced a best-effort hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelaxationStep {
    Exact,
    AnyEdition,
    AnyLanguage,
    CheapestAvailable,
}

/// Cheapest offer matching the full criteria triple, if any.
pub fn select_exact(offers: &[Offer], criteria: &MatchCriteria) -> Option<Offer> {
    cheapest(offers.iter().filter(|o| matches_triple(o, criteria)))
}

/// Exact match first, then drop the edition constraint, then the language,
/// and finally settle for the cheapest offer on the page.
pub fn select_with_fallback(
    offers: &[Offer],
    criteria: &MatchCriteria,
) -> Option<(Offer, RelaxationStep)> {
    if let Some(offer) = select_exact(offers, criteria) {
        return Some((offer, RelaxationStep::Exact));
    }

    info!("no exact match for {criteria}, relaxing edition constraint");
    if let Some(offer) = cheapest(offers.iter().filter(|o| {
        condition_matches(o, criteria) && language_matches(o, criteria)
    })) {
        return Some((offer, RelaxationStep::AnyEdition));
    }

    info!("still no match, relaxing language constraint");
    if let Some(offer) = cheapest(offers.iter().filter(|o| condition_matches(o, criteria))) {
        return Some((offer, RelaxationStep::AnyLanguage));
    }

    info!("no offer in the requested condition, taking cheapest available");
    cheapest(offers.iter()).map(|offer| (offer, RelaxationStep::CheapestAvailable))
}

fn matches_triple(offer: &Offer, criteria: &MatchCriteria) -> bool {
    condition_matches(offer, criteria)
        && language_matches(offer, criteria)
        && offer.first_edition == criteria.first_edition
}

fn condition_matches(offer: &Offer, criteria: &MatchCriteria) -> bool {
    offer.condition.eq_ignore_ascii_case(&criteria.condition)
}

fn language_matches(offer: &Offer, criteria: &MatchCriteria) -> bool {
    offer.language.eq_ignore_ascii_case(&criteria.language)
}

fn cheapest<'a>(offers: impl Iterator<Item = &'a Offer>) -> Option<Offer> {
    offers
        .min_by(|a, b| {
            a.price_value
                .partial_cmp(&b.price_value)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.price_display.cmp(&b.price_display))
        })
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(condition: &str, language: &str, first_edition: bool, price: f64) -> Offer {
        Offer {
            condition: condition.to_string(),
            language: language.to_string(),
            first_edition,
            price_display: format!("{price:.2} €"),
            price_value: price,
            rarity: None,
            set_label: None,
        }
    }

    fn criteria() -> MatchCriteria {
        MatchCriteria {
            condition: "NM".to_string(),
            language: "English".to_string(),
            first_edition: false,
        }
    }

    #[test]
    fn exact_match_picks_the_cheapest_hit() {
        let offers = vec![
            offer("NM", "English", false, 5.0),
            offer("NM", "English", false, 2.0),
            offer("NM", "English", true, 1.0),
        ];
        let chosen = select_exact(&offers, &criteria()).unwrap();
        assert_eq!(chosen.price_value, 2.0);
    }

    #[test]
    fn selection_ignores_list_order() {
        let mut offers = vec![
            offer("NM", "English", false, 2.0),
            offer("NM", "English", false, 5.0),
        ];
        let forward = select_exact(&offers, &criteria()).unwrap();
        offers.reverse();
        let backward = select_exact(&offers, &criteria()).unwrap();
        assert_eq!(forward, backward);
    }

    #[test]
    fn comparison_is_case_insensitive() {
        let offers = vec![offer("nm", "ENGLISH", false, 3.0)];
        assert!(select_exact(&offers, &criteria()).is_some());
    }

    #[test]
    fn exact_mode_finds_nothing_without_a_triple_hit() {
        let offers = vec![offer("LP", "English", false, 1.0)];
        assert!(select_exact(&offers, &criteria()).is_none());
    }

    #[test]
    fn fallback_walks_the_ladder_in_order() {
        let edition_only = vec![offer("NM", "English", true, 4.0)];
        let (_, step) = select_with_fallback(&edition_only, &criteria()).unwrap();
        assert_eq!(step, RelaxationStep::AnyEdition);

        let language_only = vec![offer("NM", "Deutsch", true, 4.0)];
        let (_, step) = select_with_fallback(&language_only, &criteria()).unwrap();
        assert_eq!(step, RelaxationStep::AnyLanguage);

        let anything = vec![offer("PO", "Deutsch", true, 4.0)];
        let (_, step) = select_with_fallback(&anything, &criteria()).unwrap();
        assert_eq!(step, RelaxationStep::CheapestAvailable);

        assert!(select_with_fallback(&[], &criteria()).is_none());
    }
}
