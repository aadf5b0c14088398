// Copyright 2025 Cardwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error taxonomy for the scraping engine.
//!
//! Sub-step failures inside page handling and extraction are logged and
//! swallowed — they represent expected page variability. Callers only ever
//! see the terminal kinds below.

use crate::model::MatchCriteria;
use thiserror::Error;

/// Terminal failures of one scrape request.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Transport/DNS/timeout failure reaching the page. Retried with the
    /// next launch profile before ever surfacing.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// Every (profile, depth) pair was exhausted without a criteria hit.
    /// Echoes the requested criteria for diagnostics.
    #[error("no offer matched {criteria} after {attempts} attempt(s)")]
    NoMatchingOffer {
        criteria: MatchCriteria,
        attempts: usize,
    },

    /// The browser capability could not be started under any profile.
    #[error("browser environment unavailable: {0}")]
    EnvironmentUnavailable(String),
}

/// A price snippet contained no parsable numeric value.
///
/// Local and non-fatal: the owning offer is kept at 0.0 or dropped per the
/// configured [`ZeroPricePolicy`](crate::extract::ZeroPricePolicy).
#[derive(Debug, Error)]
#[error("no numeric value in price text {0:?}")]
pub struct PriceParseError(pub String);
