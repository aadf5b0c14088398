//! Environment readiness check.

use crate::browser::find_browser;
use crate::cli::output::Styled;
use anyhow::Result;

/// Check browser availability and the card store location.
pub fn run() -> Result<()> {
    println!("Cardwatch Doctor");
    println!("================");
    println!();

    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;
    println!("OS:   {os}");
    println!("Arch: {arch}");
    println!();

    let browser = find_browser();
    match &browser {
        Some(path) => println!("{} Browser found: {}", Styled::ok(), path.display()),
        None => println!(
            "{} No Chromium-family browser found. Install Chrome/Chromium or set CARDWATCH_BROWSER_PATH.",
            Styled::warn()
        ),
    }

    match dirs::home_dir() {
        Some(home) => {
            let store_path = home.join(".cardwatch").join("cards.db");
            if store_path.exists() {
                println!("{} Card store: {}", Styled::ok(), store_path.display());
            } else {
                println!(
                    "{} Card store not created yet (will be at {})",
                    Styled::ok(),
                    store_path.display()
                );
            }
        }
        None => println!("{} Could not determine home directory", Styled::err()),
    }

    println!();
    if browser.is_some() {
        println!("Status: READY");
    } else {
        println!("Status: NOT READY");
        println!("  Install Chrome or Chromium, or point CARDWATCH_BROWSER_PATH at a binary.");
    }

    Ok(())
}
