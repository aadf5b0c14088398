// Copyright 2025 Cardwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! Batch re-scraping of tracked cards. Cards are processed sequentially so
//! only one browser session is alive at a time; one card failing never stops
//! the batch.

use crate::engine::ScrapeEngine;
use crate::store::CardStore;
use anyhow::{bail, Context};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct RefreshSummary {
    pub total: usize,
    pub updated: usize,
    pub failed: usize,
    /// (card name, failure reason) for each card that could not refresh.
    pub failures: Vec<(String, String)>,
}

/// Re-scrape every tracked card and persist the fresh prices.
pub async fn refresh_all(engine: &ScrapeEngine, store: &CardStore) -> anyhow::Result<RefreshSummary> {
    let cards = store.all().context("listing cards to refresh")?;
    let mut summary = RefreshSummary {
        total: cards.len(),
        updated: 0,
        failed: 0,
        failures: Vec::new(),
    };

    for card in cards {
        info!(id = card.id, name = %card.name, "refreshing card");
        match engine.scrape(&card.url, &card.criteria).await {
            Ok(result) => {
                store.update_scrape(card.id, &result)?;
                info!(
                    name = %card.name,
                    old = %card.price_display,
                    new = %result.chosen_offer.price_display,
                    "card refreshed"
                );
                summary.updated += 1;
            }
            Err(e) => {
                warn!(name = %card.name, "refresh failed: {e}");
                summary.failed += 1;
                summary.failures.push((card.name, e.to_string()));
            }
        }
    }
    Ok(summary)
}

/// Re-scrape one card by id.
pub async fn refresh_one(engine: &ScrapeEngine, store: &CardStore, id: i64) -> anyhow::Result<()> {
    let Some(card) = store.get_by_id(id)? else {
        bail!("no card with id {id}");
    };
    let result = engine
        .scrape(&card.url, &card.criteria)
        .await
        .with_context(|| format!("re-scraping '{}'", card.name))?;
    store.update_scrape(card.id, &result)?;
    info!(
        name = %card.name,
        old = %card.price_display,
        new = %result.chosen_offer.price_display,
        "card refreshed"
    );
    Ok(())
}
