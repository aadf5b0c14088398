// Copyright 2025 Cardwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! Cardwatch library — offer discovery and price tracking for collectible
//! card marketplaces.
//!
//! The crate splits along capability seams: [`browser`] hides the real
//! Chromium backend behind traits, [`engine`] walks the acquisition ladder,
//! [`extract`] and [`matching`] are pure functions over page snapshots, and
//! [`store`] persists the tracked cards.

pub mod browser;
pub mod cli;
pub mod engine;
pub mod enrich;
pub mod error;
pub mod extract;
pub mod matching;
pub mod model;
pub mod price;
pub mod refresh;
pub mod session;
pub mod store;
