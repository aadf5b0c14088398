// Copyright 2025 Cardwatch Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use cardwatch::cli::{commands, doctor, output};
use cardwatch::store::Partition;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "cardwatch",
    about = "Cardwatch — track collectible card prices from marketplace pages",
    version,
    after_help = "Run 'cardwatch <command> --help' for details on each command."
)]
struct Cli {
    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape a card page and start tracking it
    Add {
        /// Card page URL
        url: String,
        /// Where to file the card (collection or wishlist)
        #[arg(long, default_value = "collection")]
        to: String,
        /// Condition grade to match (NM, LP, MP, HP, PO)
        #[arg(long, default_value = "NM")]
        grade: String,
        /// Offer language to match
        #[arg(long, default_value = "English")]
        language: String,
        /// Require a first-edition offer
        #[arg(long)]
        first_edition: bool,
        /// Relax the criteria instead of failing when nothing matches exactly
        #[arg(long)]
        best_effort: bool,
    },
    /// List tracked cards
    List {
        /// Only one partition (collection or wishlist)
        #[arg(long)]
        from: Option<String>,
    },
    /// Stop tracking a card
    Remove {
        /// Card id as shown by `list`
        id: i64,
    },
    /// Move a card between collection and wishlist
    Move {
        id: i64,
        /// Target partition (collection or wishlist)
        to: String,
    },
    /// Re-scrape one card's price
    Update {
        id: i64,
        /// Relax the criteria instead of failing when nothing matches exactly
        #[arg(long)]
        best_effort: bool,
    },
    /// Re-scrape every tracked card
    Refresh {
        /// Relax the criteria instead of failing when nothing matches exactly
        #[arg(long)]
        best_effort: bool,
    },
    /// Per-partition counts and total values
    Stats,
    /// Check environment and diagnose issues
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global flags via environment variables so all modules can check them
    if cli.json {
        std::env::set_var("CARDWATCH_JSON", "1");
    }
    if cli.quiet {
        std::env::set_var("CARDWATCH_QUIET", "1");
    }
    if cli.no_color {
        std::env::set_var("CARDWATCH_NO_COLOR", "1");
    }

    let default_level = if cli.verbose {
        "cardwatch=debug"
    } else {
        "cardwatch=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(default_level.parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Add {
            url,
            to,
            grade,
            language,
            first_edition,
            best_effort,
        } => {
            let partition = Partition::parse(&to)?;
            commands::add(&url, partition, &grade, &language, first_edition, best_effort).await
        }
        Commands::List { from } => {
            let partition = from.as_deref().map(Partition::parse).transpose()?;
            commands::list(partition)
        }
        Commands::Remove { id } => commands::remove(id),
        Commands::Move { id, to } => commands::move_card(id, Partition::parse(&to)?),
        Commands::Update { id, best_effort } => commands::update(id, best_effort).await,
        Commands::Refresh { best_effort } => commands::refresh_all(best_effort).await,
        Commands::Stats => commands::stats(),
        Commands::Doctor => doctor::run(),
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        if !output::is_quiet() && !output::is_json() {
            eprintln!("  Error: {e:#}");
        }
        if output::is_json() {
            output::print_json(&serde_json::json!({
                "error": true,
                "message": format!("{e:#}"),
            }));
        }
        std::process::exit(1);
    }

    result
}
