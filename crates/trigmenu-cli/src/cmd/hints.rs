use crate::output::print_json;
use anyhow::{bail, Context};
use clap::Subcommand;
use std::path::{Path, PathBuf};
use trigmenu_core::hints::RangeHints;

#[derive(Subcommand)]
pub enum HintsSubcommand {
    /// Write the stock 2015 range hints as a starting file
    Init {
        /// Destination path
        #[arg(long)]
        file: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Check a hints file for inverted or non-finite search edges
    Validate {
        /// Hints file to check
        #[arg(long)]
        file: PathBuf,
    },
}

pub fn run(subcommand: HintsSubcommand, json: bool) -> anyhow::Result<()> {
    match subcommand {
        HintsSubcommand::Init { file, force } => init(&file, force),
        HintsSubcommand::Validate { file } => validate(&file, json),
    }
}

fn init(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists (pass --force to overwrite)",
            path.display()
        );
    }
    let hints = RangeHints::l1_menu_2015();
    hints
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("wrote {} hints to {}", hints.len(), path.display());
    Ok(())
}

fn validate(path: &Path, json: bool) -> anyhow::Result<()> {
    let hints = RangeHints::load(path)
        .with_context(|| format!("failed to load hints file {}", path.display()))?;
    let warnings = hints.validate();

    if json {
        print_json(&warnings)?;
    } else {
        for warning in &warnings {
            println!(
                "{} / {}: {}",
                warning.trigger, warning.parameter, warning.message
            );
        }
    }

    if !warnings.is_empty() {
        bail!("{} invalid hint(s) in {}", warnings.len(), path.display());
    }
    if !json {
        println!("{} hints ok", hints.len());
    }
    Ok(())
}
