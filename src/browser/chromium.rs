// Copyright 2025 Cardwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! Chromium-family backend for the browser capability, driven over CDP via
//! `chromiumoxide`.

use super::{BrowserLauncher, ExecutablePolicy, LaunchProfile, PageSession};
use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Locate a Chromium-family executable.
///
/// Probe order: the `CARDWATCH_BROWSER_PATH` override, then `$PATH`, then the
/// platform's well-known install locations.
pub fn find_browser() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("CARDWATCH_BROWSER_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    const PATH_CANDIDATES: &[&str] = &[
        "google-chrome",
        "google-chrome-stable",
        "chromium",
        "chromium-browser",
        "chrome",
        "msedge",
    ];
    for name in PATH_CANDIDATES {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    #[cfg(target_os = "macos")]
    {
        const APP_PATHS: &[&str] = &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
        ];
        for candidate in APP_PATHS {
            let path = PathBuf::from(candidate);
            if path.exists() {
                return Some(path);
            }
        }
    }

    #[cfg(target_os = "windows")]
    {
        const SUFFIXES: &[&str] = &[
            r"Google\Chrome\Application\chrome.exe",
            r"Chromium\Application\chrome.exe",
            r"Microsoft\Edge\Application\msedge.exe",
        ];
        for root in ["PROGRAMFILES", "PROGRAMFILES(X86)", "LOCALAPPDATA"] {
            if let Ok(base) = std::env::var(root) {
                for suffix in SUFFIXES {
                    let path = PathBuf::from(&base).join(suffix);
                    if path.exists() {
                        return Some(path);
                    }
                }
            }
        }
    }

    None
}

/// Launches one Chromium process per session.
#[derive(Debug, Default)]
pub struct ChromiumLauncher;

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self, profile: &LaunchProfile) -> anyhow::Result<Box<dyn PageSession>> {
        let executable = match &profile.executable {
            ExecutablePolicy::Fixed(path) => path.clone(),
            ExecutablePolicy::Discover => find_browser().ok_or_else(|| {
                anyhow!(
                    "no compatible browser found; install Chrome or Chromium, \
                     or point CARDWATCH_BROWSER_PATH at one"
                )
            })?,
        };

        let mut builder = BrowserConfig::builder()
            .chrome_executable(&executable)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage");
        for arg in &profile.args {
            builder = builder.arg(arg);
        }
        if let Some(user_agent) = &profile.user_agent {
            builder = builder.arg(format!("--user-agent={user_agent}"));
        }
        let config = builder
            .build()
            .map_err(|e| anyhow!("building browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .with_context(|| format!("launching browser under profile '{}'", profile.id))?;

        // CDP events must be drained for the connection to make progress.
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .context("opening initial page")?;
        debug!(
            profile = profile.id,
            path = %executable.display(),
            "browser session started"
        );
        Ok(Box::new(ChromiumSession { browser, page }))
    }
}

struct ChromiumSession {
    browser: Browser,
    page: Page,
}

#[async_trait]
impl PageSession for ChromiumSession {
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> anyhow::Result<()> {
        match tokio::time::timeout(Duration::from_millis(timeout_ms), self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => bail!("navigation to {url} failed: {e}"),
            Err(_) => bail!("navigation to {url} timed out after {timeout_ms}ms"),
        }
    }

    async fn title(&self) -> anyhow::Result<String> {
        Ok(self
            .page
            .get_title()
            .await
            .context("reading document title")?
            .unwrap_or_default())
    }

    async fn click(&self, selector: &str) -> anyhow::Result<()> {
        self.page
            .find_element(selector)
            .await
            .with_context(|| format!("no element matches '{selector}'"))?
            .click()
            .await
            .with_context(|| format!("clicking '{selector}'"))?;
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> anyhow::Result<Value> {
        let value = self
            .page
            .evaluate(script)
            .await
            .context("evaluating script")?
            .into_value()
            .unwrap_or(Value::Null);
        Ok(value)
    }

    async fn html(&self) -> anyhow::Result<String> {
        self.page.content().await.context("serializing page HTML")
    }

    async fn close(self: Box<Self>) {
        let ChromiumSession { mut browser, page } = *self;
        let _ = page.close().await;
        let _ = browser.close().await;
        let _ = browser.wait().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::profiles::default_profiles;

    // Needs a local Chromium install.
    #[tokio::test]
    #[ignore]
    async fn launches_and_reads_a_data_url() {
        let profile = default_profiles().remove(0);
        let mut session = ChromiumLauncher.launch(&profile).await.unwrap();
        session
            .navigate("data:text/html,<title>probe</title><p>hello</p>", 10_000)
            .await
            .unwrap();
        assert_eq!(session.title().await.unwrap(), "probe");
        assert!(session.html().await.unwrap().contains("hello"));
        session.close().await;
    }
}
