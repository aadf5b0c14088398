// Copyright 2025 Cardwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! Data shapes shared across the offer discovery engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One sale listing's attributes as scraped from a page.
///
/// Offers are ephemeral: they live for the duration of one extraction pass
/// and are never mutated after creation. The chosen one is cloned into the
/// final [`ScrapeResult`] (copy-on-select).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    /// Condition grade as shown on the page ("NM", "LP", … or a raw label).
    pub condition: String,
    /// Offer language ("English", "Français", …). Empty when unknown.
    pub language: String,
    /// Whether the offer is marked as a first edition.
    pub first_edition: bool,
    /// Price exactly as displayed on the page.
    pub price_display: String,
    /// Normalized numeric price. 0.0 when parsing failed under the keep policy.
    pub price_value: f64,
    pub rarity: Option<String>,
    pub set_label: Option<String>,
}

/// The caller-specified attributes used to select among offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCriteria {
    pub condition: String,
    pub language: String,
    pub first_edition: bool,
}

impl fmt::Display for MatchCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "condition={}, language={}, first_edition={}",
            self.condition, self.language, self.first_edition
        )
    }
}

/// The outcome of one successful acquisition, handed to the card store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeResult {
    pub display_name: String,
    pub set_label: String,
    pub rarity: String,
    pub chosen_offer: Offer,
    /// How many candidate offers the winning extraction pass produced.
    pub offer_count: usize,
    pub image_url: Option<String>,
}

/// How much on-page content is loaded before extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadDepth {
    /// Extract from the page as initially rendered.
    Shallow,
    /// Scroll and trigger the "load more" control first.
    Expanded,
}

impl LoadDepth {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadDepth::Shallow => "shallow",
            LoadDepth::Expanded => "expanded",
        }
    }
}

/// Diagnostic record for one (profile, depth) attempt. Transient — drives
/// logs and the retry ladder, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct AcquisitionAttempt {
    pub profile_id: String,
    pub depth: LoadDepth,
    pub outcome: AttemptOutcome,
}

/// What a single acquisition attempt produced.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// Offers were extracted and one matched the criteria.
    Matched { offer_count: usize },
    /// Offers were extracted but none matched.
    NoMatch { offer_count: usize },
    /// The attempt failed before matching could run.
    Failed { reason: String },
}
