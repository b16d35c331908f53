use crate::output::print_json;
use anyhow::Context;
use std::path::Path;
use trigmenu_core::classifier;
use trigmenu_core::menu::Menu;
use trigmenu_core::report::{eta_cut, muon_quality, render_menu};
use trigmenu_core::trigger::Trigger;

pub fn run(menu_path: &Path, json: bool) -> anyhow::Result<()> {
    let menu = Menu::load(menu_path)
        .with_context(|| format!("failed to load menu {}", menu_path.display()))?;

    if json {
        #[derive(serde::Serialize)]
        struct JsonTrigger<'a> {
            name: &'a str,
            version: u32,
            correlated: bool,
            thresholds: Vec<f64>,
            #[serde(skip_serializing_if = "Option::is_none")]
            eta_cut: Option<f64>,
            #[serde(skip_serializing_if = "Option::is_none")]
            muon_quality: Option<f64>,
        }

        let triggers: Vec<JsonTrigger> = menu
            .triggers
            .iter()
            .map(|t| JsonTrigger {
                name: t.name(),
                version: t.version(),
                correlated: t.thresholds_are_correlated(),
                thresholds: classifier::threshold_names(t)
                    .iter()
                    .filter_map(|n| t.parameter(n).ok())
                    .collect(),
                eta_cut: eta_cut(t),
                muon_quality: muon_quality(t),
            })
            .collect();
        return print_json(&triggers);
    }

    let triggers = menu.triggers.iter().map(|t| t as &dyn Trigger);
    print!("{}", render_menu(triggers));
    Ok(())
}
