// Copyright 2025 Cardwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! Subcommand implementations for the cardwatch binary.

use crate::browser::ChromiumLauncher;
use crate::cli::output;
use crate::engine::{EngineConfig, ScrapeEngine};
use crate::matching::MatchMode;
use crate::model::MatchCriteria;
use crate::model::ScrapeResult;
use crate::refresh;
use crate::store::{CardRecord, CardStore, Partition};
use anyhow::{bail, Result};
use std::sync::Arc;

fn default_engine(best_effort: bool) -> ScrapeEngine {
    let config = EngineConfig {
        match_mode: if best_effort {
            MatchMode::BestEffort
        } else {
            MatchMode::Exact
        },
        ..EngineConfig::default()
    };
    ScrapeEngine::new(Arc::new(ChromiumLauncher), config)
}

/// `cardwatch add` — scrape a card page and track it.
pub async fn add(
    url: &str,
    partition: Partition,
    condition: &str,
    language: &str,
    first_edition: bool,
    best_effort: bool,
) -> Result<()> {
    url::Url::parse(url)?;
    let criteria = MatchCriteria {
        condition: condition.to_string(),
        language: language.to_string(),
        first_edition,
    };

    let store = CardStore::open_default()?;
    let engine = default_engine(best_effort);
    match add_card(&store, &engine, url, partition, &criteria).await? {
        AddReport::Added(result) => {
            if output::is_json() {
                output::print_json(&result);
            } else if !output::is_quiet() {
                println!(
                    "Added '{}' ({}) to your {partition} at {}",
                    result.display_name, result.set_label, result.chosen_offer.price_display
                );
            }
        }
        AddReport::Moved(name) => {
            if !output::is_quiet() {
                println!("'{name}' was already tracked; moved it to your {partition}");
            }
        }
    }
    Ok(())
}

#[derive(Debug)]
enum AddReport {
    Added(ScrapeResult),
    Moved(String),
}

/// The store is consulted before the browser: a URL already tracked in the
/// other partition moves without a scrape, and a same-partition duplicate
/// is rejected without one.
async fn add_card(
    store: &CardStore,
    engine: &ScrapeEngine,
    url: &str,
    partition: Partition,
    criteria: &MatchCriteria,
) -> Result<AddReport> {
    if let Some(existing) = store.get_by_url(url)? {
        if existing.partition == partition {
            bail!("'{}' is already in your {partition}", existing.name);
        }
        store.move_card(existing.id, partition)?;
        return Ok(AddReport::Moved(existing.name));
    }

    let result = engine.scrape(url, criteria).await?;
    store.add(url, partition, criteria, &result)?;
    Ok(AddReport::Added(result))
}

/// `cardwatch list` — show tracked cards, optionally one partition.
pub fn list(partition: Option<Partition>) -> Result<()> {
    let store = CardStore::open_default()?;
    let cards = match partition {
        Some(p) => store.list(p)?,
        None => store.all()?,
    };

    if output::is_json() {
        output::print_json(&cards);
        return Ok(());
    }
    if cards.is_empty() {
        println!("No cards tracked yet. Add one with `cardwatch add <url>`.");
        return Ok(());
    }
    for card in &cards {
        print_card_line(card);
    }
    Ok(())
}

fn print_card_line(card: &CardRecord) {
    println!(
        "#{:<4} [{}] {} — {} ({}) — {} [{} / {}{}]",
        card.id,
        card.partition,
        card.name,
        card.set_label,
        card.rarity,
        card.price_display,
        card.criteria.condition,
        card.criteria.language,
        if card.criteria.first_edition {
            " / 1st ed"
        } else {
            ""
        },
    );
}

/// `cardwatch remove <id>`.
pub fn remove(id: i64) -> Result<()> {
    let store = CardStore::open_default()?;
    let card = store.get_by_id(id)?;
    store.delete(id)?;
    if !output::is_quiet() {
        if let Some(card) = card {
            println!("Removed '{}'", card.name);
        }
    }
    Ok(())
}

/// `cardwatch move <id> <partition>`.
pub fn move_card(id: i64, to: Partition) -> Result<()> {
    let store = CardStore::open_default()?;
    store.move_card(id, to)?;
    if !output::is_quiet() {
        println!("Moved card #{id} to your {to}");
    }
    Ok(())
}

/// `cardwatch update <id>` — re-scrape one card.
pub async fn update(id: i64, best_effort: bool) -> Result<()> {
    let store = CardStore::open_default()?;
    let engine = default_engine(best_effort);
    refresh::refresh_one(&engine, &store, id).await?;
    if let Some(card) = store.get_by_id(id)? {
        if output::is_json() {
            output::print_json(&card);
        } else if !output::is_quiet() {
            println!("'{}' is now {}", card.name, card.price_display);
        }
    }
    Ok(())
}

/// `cardwatch refresh` — re-scrape every tracked card.
pub async fn refresh_all(best_effort: bool) -> Result<()> {
    let store = CardStore::open_default()?;
    let engine = default_engine(best_effort);
    let summary = refresh::refresh_all(&engine, &store).await?;

    if output::is_json() {
        output::print_json(&summary);
        return Ok(());
    }
    if !output::is_quiet() {
        println!(
            "Refreshed {}/{} cards ({} failed)",
            summary.updated, summary.total, summary.failed
        );
        for (name, reason) in &summary.failures {
            println!("  {} {name}: {reason}", output::Styled::warn());
        }
    }
    Ok(())
}

/// `cardwatch stats` — per-partition counts and totals.
pub fn stats() -> Result<()> {
    let store = CardStore::open_default()?;
    let stats = store.stats()?;

    if output::is_json() {
        output::print_json(&stats);
        return Ok(());
    }
    println!(
        "Collection: {} card(s), {:.2} € total",
        stats.collection_count, stats.collection_value
    );
    println!(
        "Wishlist:   {} card(s), {:.2} € total",
        stats.wishlist_count, stats.wishlist_value
    );
    Ok(())
}
