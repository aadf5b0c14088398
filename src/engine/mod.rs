// Copyright 2025 Cardwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! The acquisition engine: walks the (profile × depth) ladder until one
//! attempt yields a criteria match, collecting per-attempt diagnostics along
//! the way.

pub mod profiles;

use crate::browser::{BrowserLauncher, LaunchProfile, PageSession};
use crate::enrich;
use crate::error::ScrapeError;
use crate::extract::{self, ZeroPricePolicy};
use crate::matching::{self, MatchMode, RelaxationStep};
use crate::model::{
    AcquisitionAttempt, AttemptOutcome, LoadDepth, MatchCriteria, ScrapeResult,
};
use crate::session;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Tunables for one engine instance. The defaults mirror interactive use;
/// tests shrink the ladder and zero the backoff.
#[derive(Clone)]
pub struct EngineConfig {
    pub profiles: Vec<LaunchProfile>,
    /// Depths tried per profile, shallowest first.
    pub depths: Vec<LoadDepth>,
    /// Backoff before attempt N is `backoff_base_ms * N` (none before the
    /// first attempt).
    pub backoff_base_ms: u64,
    pub zero_price_policy: ZeroPricePolicy,
    pub match_mode: MatchMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            profiles: profiles::default_profiles(),
            depths: vec![LoadDepth::Shallow, LoadDepth::Expanded],
            backoff_base_ms: 2_000,
            zero_price_policy: ZeroPricePolicy::default(),
            match_mode: MatchMode::default(),
        }
    }
}

/// A successful acquisition plus everything it took to get there.
#[derive(Debug, Clone)]
pub struct Acquisition {
    pub result: ScrapeResult,
    pub attempts: Vec<AcquisitionAttempt>,
    /// How far the criteria had to relax. [`RelaxationStep::Exact`] unless
    /// the engine runs in best-effort mode.
    pub relaxation: RelaxationStep,
}

pub struct ScrapeEngine {
    launcher: Arc<dyn BrowserLauncher>,
    config: EngineConfig,
}

enum AttemptResult {
    Hit {
        result: ScrapeResult,
        relaxation: RelaxationStep,
        offer_count: usize,
    },
    Miss {
        offer_count: usize,
    },
}

impl ScrapeEngine {
    pub fn new(launcher: Arc<dyn BrowserLauncher>, config: EngineConfig) -> Self {
        ScrapeEngine { launcher, config }
    }

    /// Acquire and keep only the result.
    pub async fn scrape(
        &self,
        url: &str,
        criteria: &MatchCriteria,
    ) -> Result<ScrapeResult, ScrapeError> {
        self.acquire(url, criteria).await.map(|a| a.result)
    }

    /// Walk the ladder until a criteria match or exhaustion.
    ///
    /// Each (profile, depth) pair gets a fresh session; a session never
    /// outlives its attempt. Failed attempts are recorded, never fatal until
    /// the ladder runs out.
    pub async fn acquire(
        &self,
        url: &str,
        criteria: &MatchCriteria,
    ) -> Result<Acquisition, ScrapeError> {
        let mut attempts: Vec<AcquisitionAttempt> = Vec::new();
        let mut launched_any = false;
        let mut extracted_any = false;
        let mut last_failure = String::new();
        let mut attempt_no: u64 = 0;

        for profile in &self.config.profiles {
            for depth in &self.config.depths {
                if attempt_no > 0 && self.config.backoff_base_ms > 0 {
                    let backoff = self.config.backoff_base_ms * attempt_no;
                    debug!(backoff_ms = backoff, "backing off before next attempt");
                    tokio::time::sleep(Duration::from_millis(backoff)).await;
                }
                attempt_no += 1;
                info!(
                    profile = profile.id,
                    depth = depth.as_str(),
                    attempt = attempt_no,
                    "starting acquisition attempt"
                );

                let mut page = match self.launcher.launch(profile).await {
                    Ok(page) => {
                        launched_any = true;
                        page
                    }
                    Err(e) => {
                        warn!(profile = profile.id, "launch failed: {e:#}");
                        last_failure = format!("{e:#}");
                        attempts.push(AcquisitionAttempt {
                            profile_id: profile.id.to_string(),
                            depth: *depth,
                            outcome: AttemptOutcome::Failed {
                                reason: last_failure.clone(),
                            },
                        });
                        continue;
                    }
                };

                let outcome = self
                    .run_attempt(page.as_mut(), profile, url, *depth, criteria)
                    .await;
                page.close().await;

                match outcome {
                    Ok(AttemptResult::Hit {
                        result,
                        relaxation,
                        offer_count,
                    }) => {
                        attempts.push(AcquisitionAttempt {
                            profile_id: profile.id.to_string(),
                            depth: *depth,
                            outcome: AttemptOutcome::Matched { offer_count },
                        });
                        info!(
                            profile = profile.id,
                            depth = depth.as_str(),
                            offer_count,
                            price = %result.chosen_offer.price_display,
                            "acquisition succeeded"
                        );
                        return Ok(Acquisition {
                            result,
                            attempts,
                            relaxation,
                        });
                    }
                    Ok(AttemptResult::Miss { offer_count }) => {
                        extracted_any = true;
                        info!(
                            profile = profile.id,
                            depth = depth.as_str(),
                            offer_count,
                            "attempt found offers but none matched"
                        );
                        attempts.push(AcquisitionAttempt {
                            profile_id: profile.id.to_string(),
                            depth: *depth,
                            outcome: AttemptOutcome::NoMatch { offer_count },
                        });
                    }
                    Err(e) => {
                        warn!(
                            profile = profile.id,
                            depth = depth.as_str(),
                            "attempt failed: {e:#}"
                        );
                        last_failure = format!("{e:#}");
                        attempts.push(AcquisitionAttempt {
                            profile_id: profile.id.to_string(),
                            depth: *depth,
                            outcome: AttemptOutcome::Failed {
                                reason: last_failure.clone(),
                            },
                        });
                    }
                }
            }
        }

        if !launched_any {
            return Err(ScrapeError::EnvironmentUnavailable(if last_failure.is_empty() {
                "no launch profiles configured".to_string()
            } else {
                last_failure
            }));
        }
        if !extracted_any {
            // Sessions launched but no attempt ever reached extraction.
            return Err(ScrapeError::Navigation(last_failure));
        }
        Err(ScrapeError::NoMatchingOffer {
            criteria: criteria.clone(),
            attempts: attempts.len(),
        })
    }

    async fn run_attempt(
        &self,
        page: &mut dyn PageSession,
        profile: &LaunchProfile,
        url: &str,
        depth: LoadDepth,
        criteria: &MatchCriteria,
    ) -> anyhow::Result<AttemptResult> {
        session::prepare(page, profile, url, depth).await?;
        let html = page.html().await?;

        let (offers, strategy) = extract::extract_offers(&html, self.config.zero_price_policy);
        if let Some(strategy) = strategy {
            debug!(
                strategy = strategy.as_str(),
                count = offers.len(),
                "offers extracted"
            );
        }

        let selected = match self.config.match_mode {
            MatchMode::Exact => {
                matching::select_exact(&offers, criteria).map(|o| (o, RelaxationStep::Exact))
            }
            MatchMode::BestEffort => matching::select_with_fallback(&offers, criteria),
        };

        Ok(match selected {
            Some((offer, relaxation)) => AttemptResult::Hit {
                result: enrich::enrich(&html, offer, offers.len()),
                relaxation,
                offer_count: offers.len(),
            },
            None => AttemptResult::Miss {
                offer_count: offers.len(),
            },
        })
    }
}
