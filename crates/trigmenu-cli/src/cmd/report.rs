use crate::output::print_json;
use anyhow::Context;
use serde::Deserialize;
use std::path::Path;
use trigmenu_core::classifier;
use trigmenu_core::menu::Menu;
use trigmenu_core::report::{render_rates, RateRecord, ReferenceOrder};
use trigmenu_core::trigger::Trigger;

// ---------------------------------------------------------------------------
// Rates file
// ---------------------------------------------------------------------------

/// On-disk form of the external rate computation's output: the total rate
/// with overlaps, and one entry per trigger.
#[derive(Debug, Deserialize)]
struct RatesFile {
    total_rate: f64,
    #[serde(default)]
    triggers: Vec<RateEntry>,
}

#[derive(Debug, Deserialize)]
struct RateEntry {
    name: String,
    rate: f64,
    pure_rate: f64,
}

fn load_rates(path: &Path) -> anyhow::Result<RatesFile> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read rates file {}", path.display()))?;
    let rates: RatesFile = serde_yaml::from_str(&data)
        .with_context(|| format!("failed to parse rates file {}", path.display()))?;
    Ok(rates)
}

fn load_order(path: &Path) -> anyhow::Result<ReferenceOrder> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read ordering file {}", path.display()))?;
    let names: Vec<String> = serde_yaml::from_str(&data)
        .with_context(|| format!("failed to parse ordering file {}", path.display()))?;
    Ok(ReferenceOrder::new(names))
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

pub fn run(
    menu_path: &Path,
    rates_path: &Path,
    order_path: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    let menu = Menu::load(menu_path)
        .with_context(|| format!("failed to load menu {}", menu_path.display()))?;
    let rates = load_rates(rates_path)?;
    let order = match order_path {
        Some(path) => load_order(path)?,
        None => ReferenceOrder::l1_menu_2015(),
    };

    let mut records: Vec<RateRecord> = Vec::with_capacity(rates.triggers.len());
    for entry in &rates.triggers {
        let trigger = menu.get(&entry.name).with_context(|| {
            format!(
                "trigger '{}' from the rates file is not in the menu",
                entry.name
            )
        })?;
        records.push(RateRecord {
            trigger,
            rate: entry.rate,
            pure_rate: entry.pure_rate,
        });
    }
    tracing::debug!("joined {} rate records against the menu", records.len());

    if json {
        #[derive(serde::Serialize)]
        struct JsonRecord<'a> {
            name: &'a str,
            thresholds: Vec<f64>,
            rate: f64,
            pure_rate: f64,
        }

        #[derive(serde::Serialize)]
        struct JsonReport<'a> {
            triggers: Vec<JsonRecord<'a>>,
            total_with_overlap: f64,
            total_without_overlap: f64,
            total_pure: f64,
        }

        order.sort(&mut records);
        let triggers: Vec<JsonRecord> = records
            .iter()
            .map(|r| JsonRecord {
                name: r.trigger.name(),
                thresholds: classifier::threshold_names(r.trigger)
                    .iter()
                    .filter_map(|n| r.trigger.parameter(n).ok())
                    .collect(),
                rate: r.rate,
                pure_rate: r.pure_rate,
            })
            .collect();

        let output = JsonReport {
            total_with_overlap: rates.total_rate,
            total_without_overlap: records.iter().map(|r| r.rate).sum(),
            total_pure: records.iter().map(|r| r.pure_rate).sum(),
            triggers,
        };
        return print_json(&output);
    }

    print!("{}", render_rates(&records, rates.total_rate, &order));
    Ok(())
}
