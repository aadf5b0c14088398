// Copyright 2025 Cardwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! Output helpers shared by the subcommands. Global flags arrive as
//! environment variables so every module can check them without threading
//! state through call chains.

use serde::Serialize;

pub fn is_json() -> bool {
    std::env::var("CARDWATCH_JSON").is_ok()
}

pub fn is_quiet() -> bool {
    std::env::var("CARDWATCH_QUIET").is_ok()
}

pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("could not serialize output: {e}"),
    }
}

/// Status glyphs, plain ASCII when NO_COLOR is set.
pub struct Styled;

impl Styled {
    pub fn ok() -> &'static str {
        if no_color() {
            "[OK]"
        } else {
            "\u{1b}[32m[OK]\u{1b}[0m"
        }
    }

    pub fn warn() -> &'static str {
        if no_color() {
            "[!!]"
        } else {
            "\u{1b}[33m[!!]\u{1b}[0m"
        }
    }

    pub fn err() -> &'static str {
        if no_color() {
            "[XX]"
        } else {
            "\u{1b}[31m[XX]\u{1b}[0m"
        }
    }
}

fn no_color() -> bool {
    std::env::var("NO_COLOR").is_ok() || std::env::var("CARDWATCH_NO_COLOR").is_ok()
}
