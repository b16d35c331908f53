mod cmd;
mod output;

use clap::{Parser, Subcommand};
use cmd::hints::HintsSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "trigmenu",
    about = "Trigger menu tools — threshold classification, menu dumps, and rate reports",
    version,
    propagate_version = true
)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the rate report for a menu
    Report {
        /// Menu file (YAML; a .json extension switches to JSON)
        #[arg(long, env = "TRIGMENU_MENU")]
        menu: PathBuf,

        /// Rates file: total rate plus per-trigger rate and pure rate
        #[arg(long)]
        rates: PathBuf,

        /// Reference ordering file, a YAML list of trigger names
        /// (default: the stock 2015 menu ordering)
        #[arg(long)]
        order: Option<PathBuf>,
    },

    /// Dump the menu: thresholds, eta cuts and muon qualities per trigger
    Menu {
        /// Menu file (YAML; a .json extension switches to JSON)
        #[arg(long, env = "TRIGMENU_MENU")]
        menu: PathBuf,
    },

    /// Manage suggested-range hint files
    Hints {
        #[command(subcommand)]
        subcommand: HintsSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Report { menu, rates, order } => {
            cmd::report::run(&menu, &rates, order.as_deref(), cli.json)
        }
        Commands::Menu { menu } => cmd::menu::run(&menu, cli.json),
        Commands::Hints { subcommand } => cmd::hints::run(subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
