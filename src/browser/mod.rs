// Copyright 2025 Cardwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! Browser capability boundary.
//!
//! The engine only ever talks to [`BrowserLauncher`] and [`PageSession`], so
//! tests drive it with scripted fakes and the real Chromium backend stays in
//! one module.

pub mod chromium;

pub use chromium::{find_browser, ChromiumLauncher};

use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;

/// Where the browser executable comes from.
#[derive(Debug, Clone, Default)]
pub enum ExecutablePolicy {
    /// Probe the environment (env var, PATH, well-known install paths).
    #[default]
    Discover,
    /// Use exactly this binary.
    Fixed(PathBuf),
}

/// One rung of the acquisition ladder: a named launch configuration plus the
/// timing budgets that go with it.
#[derive(Debug, Clone)]
pub struct LaunchProfile {
    pub id: &'static str,
    pub args: Vec<String>,
    pub user_agent: Option<String>,
    pub executable: ExecutablePolicy,
    /// Budget for the initial navigation, in milliseconds.
    pub nav_timeout_ms: u64,
    /// How long to wait out an anti-bot interstitial before giving up on it.
    pub bot_check_window_ms: u64,
    /// Quiet period after navigation for late-rendering content.
    pub settle_ms: u64,
    /// Quiet period after expanding the offer list.
    pub load_more_settle_ms: u64,
}

/// Starts browser sessions. One launcher can serve many sequential sessions.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self, profile: &LaunchProfile) -> anyhow::Result<Box<dyn PageSession>>;
}

/// A live page inside a launched browser.
#[async_trait]
pub trait PageSession: Send + Sync {
    /// Navigate and wait for the load event, bounded by `timeout_ms`.
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> anyhow::Result<()>;

    /// Current document title.
    async fn title(&self) -> anyhow::Result<String>;

    /// Click the first element matching a CSS selector. Errors when no such
    /// element exists.
    async fn click(&self, selector: &str) -> anyhow::Result<()>;

    /// Evaluate a JavaScript expression and return its JSON value.
    async fn evaluate(&self, script: &str) -> anyhow::Result<Value>;

    /// Serialized HTML of the current document.
    async fn html(&self) -> anyhow::Result<String>;

    /// Tear the session down. Errors during teardown are swallowed; the
    /// session is gone either way.
    async fn close(self: Box<Self>);
}
