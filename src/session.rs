// Copyright 2025 Cardwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! Page preparation: everything between "session launched" and "HTML ready
//! to extract". Navigation is the only fatal step here; anti-bot waits,
//! consent banners and list expansion are best-effort and merely logged.

use crate::browser::{LaunchProfile, PageSession};
use crate::model::LoadDepth;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Title fragments that mark an anti-bot interstitial still in progress.
const BOT_CHECK_MARKERS: &[&str] = &[
    "Just a moment",
    "Attention Required",
    "Checking your browser",
    "Un instant",
];

const BOT_CHECK_POLL_MS: u64 = 500;

/// One way of locating a consent-banner button.
enum ConsentProbe {
    Css(&'static str),
    ButtonText(&'static str),
}

impl ConsentProbe {
    fn describe(&self) -> String {
        match self {
            ConsentProbe::Css(selector) => format!("selector {selector}"),
            ConsentProbe::ButtonText(text) => format!("button text {text:?}"),
        }
    }
}

/// Tried in order; refusal buttons first so tracking consent is never
/// granted just to clear the overlay.
const CONSENT_PROBES: &[ConsentProbe] = &[
    ConsentProbe::Css("#denyAll"),
    ConsentProbe::Css("[data-testid='cookie-banner-deny']"),
    ConsentProbe::Css("button[class*='cookie'][class*='deny']"),
    ConsentProbe::Css("button[class*='cookie'][class*='decline']"),
    ConsentProbe::ButtonText("Refuser"),
    ConsentProbe::ButtonText("Reject"),
    ConsentProbe::ButtonText("Ablehnen"),
    ConsentProbe::Css("#acceptAll"),
    ConsentProbe::Css("[data-testid='cookie-banner-accept']"),
    ConsentProbe::ButtonText("Accepter"),
    ConsentProbe::ButtonText("Accept"),
    ConsentProbe::ButtonText("Akzeptieren"),
];

const LOAD_MORE_TEXTS: &[&str] = &[
    "Montrer plus",
    "Afficher plus",
    "Charger plus",
    "Show more",
    "Load more",
];

/// Bring a fresh session to the point where its HTML is worth extracting.
pub async fn prepare(
    session: &mut dyn PageSession,
    profile: &LaunchProfile,
    url: &str,
    depth: LoadDepth,
) -> anyhow::Result<()> {
    session.navigate(url, profile.nav_timeout_ms).await?;
    wait_out_bot_check(session, profile.bot_check_window_ms).await;
    dismiss_consent_banner(session).await;
    tokio::time::sleep(Duration::from_millis(profile.settle_ms)).await;
    if depth == LoadDepth::Expanded {
        expand_content(session, profile.load_more_settle_ms).await;
    }
    Ok(())
}

/// Poll the title until the anti-bot interstitial clears or the window runs
/// out. Timing out is not fatal — the page may still hold offers.
async fn wait_out_bot_check(session: &dyn PageSession, window_ms: u64) {
    let deadline = tokio::time::Instant::now() + Duration::from_millis(window_ms);
    loop {
        match session.title().await {
            Ok(title) if BOT_CHECK_MARKERS.iter().any(|m| title.contains(m)) => {
                debug!(%title, "anti-bot interstitial still up, waiting");
            }
            Ok(_) => return,
            Err(e) => {
                warn!("could not read title during bot-check wait: {e}");
                return;
            }
        }
        if tokio::time::Instant::now() >= deadline {
            warn!("anti-bot interstitial did not clear within {window_ms}ms");
            return;
        }
        tokio::time::sleep(Duration::from_millis(BOT_CHECK_POLL_MS)).await;
    }
}

/// Try each consent probe until one click lands. All failures are expected —
/// most pages show no banner at all.
async fn dismiss_consent_banner(session: &dyn PageSession) {
    for probe in CONSENT_PROBES {
        let clicked = match probe {
            ConsentProbe::Css(selector) => session.click(selector).await.is_ok(),
            ConsentProbe::ButtonText(text) => click_button_with_text(session, text).await,
        };
        if clicked {
            info!("dismissed consent banner via {}", probe.describe());
            return;
        }
    }
    debug!("no consent banner found");
}

/// Scroll to the bottom and work the "load more" control so the full offer
/// list renders before extraction.
async fn expand_content(session: &dyn PageSession, settle_ms: u64) {
    if let Err(e) = session
        .evaluate("window.scrollTo(0, document.body.scrollHeight)")
        .await
    {
        debug!("scroll to bottom failed: {e}");
    }

    let load_more_visible = session
        .evaluate(
            "(() => { const b = document.querySelector('#loadMoreButton'); \
             return b !== null && b.offsetParent !== null; })()",
        )
        .await
        .ok()
        .and_then(|v| v.as_bool())
        .unwrap_or(false);

    let mut clicked = false;
    if load_more_visible {
        clicked = session
            .evaluate("document.querySelector('#loadMoreButton').click()")
            .await
            .is_ok();
    }
    if !clicked {
        for text in LOAD_MORE_TEXTS {
            if click_button_with_text(session, text).await {
                clicked = true;
                break;
            }
        }
    }

    if clicked {
        debug!("expanded offer list, settling");
        tokio::time::sleep(Duration::from_millis(settle_ms)).await;
    } else {
        debug!("no load-more control found");
    }
}

/// Find a button (or link) whose visible text contains `text` and click it
/// in-page. Returns whether a click landed.
async fn click_button_with_text(session: &dyn PageSession, text: &str) -> bool {
    let script = format!(
        "(() => {{ \
           const needle = {text:?}; \
           for (const el of document.querySelectorAll('button, a[role=\"button\"]')) {{ \
             if (el.textContent.trim().includes(needle) && el.offsetParent !== null) {{ \
               el.click(); return true; \
             }} \
           }} \
           return false; \
         }})()"
    );
    session
        .evaluate(&script)
        .await
        .ok()
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
}
