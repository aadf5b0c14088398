// Copyright 2025 Cardwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! SQLite-backed card store. One `cards` table holds both the collection and
//! the wishlist, discriminated by a partition column; a card URL is unique
//! across both.

use crate::model::{MatchCriteria, ScrapeResult};
use anyhow::{bail, Context};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Partition {
    Collection,
    Wishlist,
}

impl Partition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Partition::Collection => "collection",
            Partition::Wishlist => "wishlist",
        }
    }

    pub fn parse(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "collection" => Ok(Partition::Collection),
            "wishlist" => Ok(Partition::Wishlist),
            other => bail!("unknown partition '{other}' (expected collection or wishlist)"),
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tracked card as persisted.
#[derive(Debug, Clone, Serialize)]
pub struct CardRecord {
    pub id: i64,
    pub name: String,
    pub set_label: String,
    pub rarity: String,
    pub price_display: String,
    pub price_value: f64,
    pub image_url: Option<String>,
    pub url: String,
    pub partition: Partition,
    pub criteria: MatchCriteria,
    pub total_offers: i64,
    pub added_at: String,
    pub last_updated: String,
}

/// What [`CardStore::add`] did with the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Inserted(i64),
    /// The URL was already tracked in the other partition and was moved.
    Moved(i64),
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub collection_count: i64,
    pub wishlist_count: i64,
    pub collection_value: f64,
    pub wishlist_value: f64,
}

pub struct CardStore {
    db: Connection,
}

impl CardStore {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let db = Connection::open(path)
            .with_context(|| format!("opening card store at {}", path.display()))?;
        let store = CardStore { db };
        store.init_schema()?;
        debug!(path = %path.display(), "card store opened");
        Ok(store)
    }

    /// The per-user store at `~/.cardwatch/cards.db`.
    pub fn open_default() -> anyhow::Result<Self> {
        let home = dirs::home_dir().context("could not determine home directory")?;
        Self::open(&home.join(".cardwatch").join("cards.db"))
    }

    pub fn open_in_memory() -> anyhow::Result<Self> {
        let db = Connection::open_in_memory().context("opening in-memory store")?;
        let store = CardStore { db };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> anyhow::Result<()> {
        self.db
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS cards (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    set_label TEXT NOT NULL,
                    rarity TEXT NOT NULL,
                    price TEXT NOT NULL,
                    price_value REAL NOT NULL DEFAULT 0,
                    image_url TEXT,
                    card_url TEXT NOT NULL UNIQUE,
                    partition TEXT NOT NULL,
                    condition_grade TEXT NOT NULL,
                    language TEXT NOT NULL,
                    first_edition INTEGER NOT NULL DEFAULT 0,
                    total_offers INTEGER NOT NULL DEFAULT 0,
                    added_at TEXT NOT NULL,
                    last_updated TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_cards_partition ON cards(partition);",
            )
            .context("initializing card store schema")
    }

    /// Insert a freshly scraped card. A URL already tracked in the same
    /// partition is an error; in the other partition it moves instead.
    pub fn add(
        &self,
        url: &str,
        partition: Partition,
        criteria: &MatchCriteria,
        result: &ScrapeResult,
    ) -> anyhow::Result<AddOutcome> {
        if let Some(existing) = self.get_by_url(url)? {
            if existing.partition == partition {
                bail!("'{}' is already in your {partition}", existing.name);
            }
            self.move_card(existing.id, partition)?;
            return Ok(AddOutcome::Moved(existing.id));
        }

        let now = timestamp();
        self.db
            .execute(
                "INSERT INTO cards (name, set_label, rarity, price, price_value, image_url,
                                    card_url, partition, condition_grade, language,
                                    first_edition, total_offers, added_at, last_updated)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)",
                params![
                    result.display_name,
                    result.set_label,
                    result.rarity,
                    result.chosen_offer.price_display,
                    result.chosen_offer.price_value,
                    result.image_url,
                    url,
                    partition.as_str(),
                    criteria.condition,
                    criteria.language,
                    criteria.first_edition,
                    result.offer_count as i64,
                    now,
                ],
            )
            .context("inserting card")?;
        Ok(AddOutcome::Inserted(self.db.last_insert_rowid()))
    }

    pub fn list(&self, partition: Partition) -> anyhow::Result<Vec<CardRecord>> {
        self.query_cards(
            "SELECT * FROM cards WHERE partition = ?1 ORDER BY id",
            params![partition.as_str()],
        )
    }

    pub fn all(&self) -> anyhow::Result<Vec<CardRecord>> {
        self.query_cards("SELECT * FROM cards ORDER BY id", params![])
    }

    pub fn get_by_id(&self, id: i64) -> anyhow::Result<Option<CardRecord>> {
        self.db
            .query_row("SELECT * FROM cards WHERE id = ?1", params![id], row_to_card)
            .optional()
            .context("looking up card by id")
    }

    pub fn get_by_url(&self, url: &str) -> anyhow::Result<Option<CardRecord>> {
        self.db
            .query_row(
                "SELECT * FROM cards WHERE card_url = ?1",
                params![url],
                row_to_card,
            )
            .optional()
            .context("looking up card by url")
    }

    pub fn delete(&self, id: i64) -> anyhow::Result<()> {
        let affected = self
            .db
            .execute("DELETE FROM cards WHERE id = ?1", params![id])
            .context("deleting card")?;
        if affected == 0 {
            bail!("no card with id {id}");
        }
        Ok(())
    }

    pub fn move_card(&self, id: i64, to: Partition) -> anyhow::Result<()> {
        let affected = self
            .db
            .execute(
                "UPDATE cards SET partition = ?1, last_updated = ?2 WHERE id = ?3",
                params![to.as_str(), timestamp(), id],
            )
            .context("moving card")?;
        if affected == 0 {
            bail!("no card with id {id}");
        }
        Ok(())
    }

    /// Overwrite the price-bearing fields after a re-scrape. Identity fields
    /// (name, set, rarity) are refreshed too when the page still reports them.
    pub fn update_scrape(&self, id: i64, result: &ScrapeResult) -> anyhow::Result<()> {
        let affected = self
            .db
            .execute(
                "UPDATE cards SET name = ?1, set_label = ?2, rarity = ?3, price = ?4,
                        price_value = ?5, image_url = COALESCE(?6, image_url),
                        total_offers = ?7, last_updated = ?8
                 WHERE id = ?9",
                params![
                    result.display_name,
                    result.set_label,
                    result.rarity,
                    result.chosen_offer.price_display,
                    result.chosen_offer.price_value,
                    result.image_url,
                    result.offer_count as i64,
                    timestamp(),
                    id,
                ],
            )
            .context("updating card after re-scrape")?;
        if affected == 0 {
            bail!("no card with id {id}");
        }
        Ok(())
    }

    pub fn stats(&self) -> anyhow::Result<StoreStats> {
        let mut stats = StoreStats {
            collection_count: 0,
            wishlist_count: 0,
            collection_value: 0.0,
            wishlist_value: 0.0,
        };
        let mut stmt = self.db.prepare(
            "SELECT partition, COUNT(*), COALESCE(SUM(price_value), 0)
             FROM cards GROUP BY partition",
        )?;
        let rows = stmt.query_map(params![], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, f64>(2)?,
            ))
        })?;
        for row in rows {
            let (partition, count, value) = row?;
            match partition.as_str() {
                "collection" => {
                    stats.collection_count = count;
                    stats.collection_value = value;
                }
                "wishlist" => {
                    stats.wishlist_count = count;
                    stats.wishlist_value = value;
                }
                _ => {}
            }
        }
        Ok(stats)
    }

    fn query_cards(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> anyhow::Result<Vec<CardRecord>> {
        let mut stmt = self.db.prepare(sql)?;
        let rows = stmt.query_map(params, row_to_card)?;
        let mut cards = Vec::new();
        for row in rows {
            cards.push(row?);
        }
        Ok(cards)
    }
}

fn row_to_card(row: &Row<'_>) -> rusqlite::Result<CardRecord> {
    let partition: String = row.get("partition")?;
    Ok(CardRecord {
        id: row.get("id")?,
        name: row.get("name")?,
        set_label: row.get("set_label")?,
        rarity: row.get("rarity")?,
        price_display: row.get("price")?,
        price_value: row.get("price_value")?,
        image_url: row.get("image_url")?,
        url: row.get("card_url")?,
        partition: if partition == "wishlist" {
            Partition::Wishlist
        } else {
            Partition::Collection
        },
        criteria: MatchCriteria {
            condition: row.get("condition_grade")?,
            language: row.get("language")?,
            first_edition: row.get("first_edition")?,
        },
        total_offers: row.get("total_offers")?,
        added_at: row.get("added_at")?,
        last_updated: row.get("last_updated")?,
    })
}

fn timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Offer;

    fn result(name: &str, price: f64) -> ScrapeResult {
        ScrapeResult {
            display_name: name.to_string(),
            set_label: "Base Set".to_string(),
            rarity: "Rare".to_string(),
            chosen_offer: Offer {
                condition: "NM".to_string(),
                language: "English".to_string(),
                first_edition: false,
                price_display: format!("{price:.2} €"),
                price_value: price,
                rarity: None,
                set_label: None,
            },
            offer_count: 3,
            image_url: None,
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
    fn add_list_delete_round_trip() {
        let store = CardStore::open_in_memory().unwrap();
        let outcome = store
            .add("https://m.example/c/1", Partition::Collection, &criteria(), &result("Pikachu", 2.0))
            .unwrap();
        let AddOutcome::Inserted(id) = outcome else {
            panic!("expected insert");
        };

        let cards = store.list(Partition::Collection).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].name, "Pikachu");
        assert_eq!(cards[0].criteria, criteria());
        assert!(store.list(Partition::Wishlist).unwrap().is_empty());

        store.delete(id).unwrap();
        assert!(store.all().unwrap().is_empty());
        assert!(store.delete(id).is_err());
    }

    #[test]
    fn duplicate_url_in_same_partition_is_rejected() {
        let store = CardStore::open_in_memory().unwrap();
        store
            .add("https://m.example/c/1", Partition::Wishlist, &criteria(), &result("Mew", 9.0))
            .unwrap();
        let err = store
            .add("https://m.example/c/1", Partition::Wishlist, &criteria(), &result("Mew", 9.0))
            .unwrap_err();
        assert!(err.to_string().contains("already in your wishlist"));
    }

    #[test]
    fn duplicate_url_in_other_partition_moves_instead() {
        let store = CardStore::open_in_memory().unwrap();
        store
            .add("https://m.example/c/1", Partition::Wishlist, &criteria(), &result("Mew", 9.0))
            .unwrap();
        let outcome = store
            .add("https://m.example/c/1", Partition::Collection, &criteria(), &result("Mew", 9.0))
            .unwrap();
        assert!(matches!(outcome, AddOutcome::Moved(_)));
        assert_eq!(store.list(Partition::Collection).unwrap().len(), 1);
        assert!(store.list(Partition::Wishlist).unwrap().is_empty());
    }

    #[test]
    fn update_scrape_refreshes_price_fields() {
        let store = CardStore::open_in_memory().unwrap();
        let AddOutcome::Inserted(id) = store
            .add("https://m.example/c/1", Partition::Collection, &criteria(), &result("Mew", 9.0))
            .unwrap()
        else {
            panic!("expected insert");
        };
        store.update_scrape(id, &result("Mew", 12.5)).unwrap();
        let card = store.get_by_id(id).unwrap().unwrap();
        assert_eq!(card.price_value, 12.5);
        assert_eq!(card.price_display, "12.50 €");
    }

    #[test]
    fn stats_aggregate_per_partition() {
        let store = CardStore::open_in_memory().unwrap();
        store
            .add("https://m.example/c/1", Partition::Collection, &criteria(), &result("A", 2.0))
            .unwrap();
        store
            .add("https://m.example/c/2", Partition::Collection, &criteria(), &result("B", 3.0))
            .unwrap();
        store
            .add("https://m.example/c/3", Partition::Wishlist, &criteria(), &result("C", 5.0))
            .unwrap();
        let stats = store.stats().unwrap();
        assert_eq!(stats.collection_count, 2);
        assert_eq!(stats.wishlist_count, 1);
        assert!((stats.collection_value - 5.0).abs() < 1e-9);
        assert!((stats.wishlist_value - 5.0).abs() < 1e-9);
    }

    #[test]
    fn on_disk_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cards.db");
        {
            let store = CardStore::open(&path).unwrap();
            store
                .add("https://m.example/c/1", Partition::Collection, &criteria(), &result("A", 2.0))
                .unwrap();
        }
        let store = CardStore::open(&path).unwrap();
        assert_eq!(store.all().unwrap().len(), 1);
    }
}
