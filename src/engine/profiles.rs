// Copyright 2025 Cardwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! The built-in launch ladder, ordered strictest to loosest. Escalating
//! means trading isolation hardening for reachability, so the hardened
//! profile always runs first.

use crate::browser::{ExecutablePolicy, LaunchProfile};

const DESKTOP_UA: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

const WINDOWS_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

fn hardened_args() -> Vec<String> {
    [
        "--disable-background-networking",
        "--disable-default-apps",
        "--disable-extensions",
        "--disable-sync",
        "--disable-translate",
        "--mute-audio",
        "--no-first-run",
        "--disable-blink-features=AutomationControlled",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Standard, permissive, minimal. Budgets grow down the ladder because later
/// profiles only run when the page is already being difficult.
pub fn default_profiles() -> Vec<LaunchProfile> {
    let permissive_args: Vec<String> = hardened_args()
        .into_iter()
        .chain(
            [
                "--no-sandbox",
                "--disable-setuid-sandbox",
                "--disable-accelerated-2d-canvas",
            ]
            .iter()
            .map(|s| s.to_string()),
        )
        .collect();

    vec![
        LaunchProfile {
            id: "standard",
            args: hardened_args(),
            user_agent: Some(DESKTOP_UA.to_string()),
            executable: ExecutablePolicy::Discover,
            nav_timeout_ms: 30_000,
            bot_check_window_ms: 10_000,
            settle_ms: 2_000,
            load_more_settle_ms: 5_000,
        },
        LaunchProfile {
            id: "permissive",
            args: permissive_args,
            user_agent: Some(DESKTOP_UA.to_string()),
            executable: ExecutablePolicy::Discover,
            nav_timeout_ms: 45_000,
            bot_check_window_ms: 20_000,
            settle_ms: 3_000,
            load_more_settle_ms: 8_000,
        },
        LaunchProfile {
            id: "minimal",
            args: vec![
                "--no-sandbox".to_string(),
                "--no-first-run".to_string(),
                "--blink-settings=imagesEnabled=false".to_string(),
            ],
            user_agent: Some(WINDOWS_UA.to_string()),
            executable: ExecutablePolicy::Discover,
            nav_timeout_ms: 60_000,
            bot_check_window_ms: 20_000,
            settle_ms: 5_000,
            load_more_settle_ms: 8_000,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ladder_is_ordered_strictest_first() {
        let profiles = default_profiles();
        assert_eq!(
            profiles.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec!["standard", "permissive", "minimal"]
        );
        assert!(!profiles[0].args.iter().any(|a| a == "--no-sandbox"));
        assert!(profiles[1].args.iter().any(|a| a == "--no-sandbox"));
    }

    #[test]
    fn budgets_grow_down_the_ladder() {
        let profiles = default_profiles();
        assert!(profiles[0].nav_timeout_ms < profiles[1].nav_timeout_ms);
        assert!(profiles[1].nav_timeout_ms < profiles[2].nav_timeout_ms);
    }
}
