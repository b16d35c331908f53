use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// RangeHint
// ---------------------------------------------------------------------------

/// A suggested search interval for one threshold parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeHint {
    pub lower_edge: f64,
    pub upper_edge: f64,
}

// ---------------------------------------------------------------------------
// HintWarning
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HintWarning {
    pub trigger: String,
    pub parameter: String,
    pub message: String,
}

// ---------------------------------------------------------------------------
// RangeHints
// ---------------------------------------------------------------------------

/// Read-only registry of suggested search ranges, keyed by trigger name and
/// then parameter name.
///
/// This is an explicitly passed configuration value: callers build one (or
/// load it from YAML) and hand a shared reference to the tightening engine.
/// A missing entry is routine — the engine falls back to its default
/// interval.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RangeHints {
    #[serde(default)]
    hints: BTreeMap<String, BTreeMap<String, RangeHint>>,
}

impl RangeHints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        trigger: impl Into<String>,
        parameter: impl Into<String>,
        lower_edge: f64,
        upper_edge: f64,
    ) {
        self.hints.entry(trigger.into()).or_default().insert(
            parameter.into(),
            RangeHint {
                lower_edge,
                upper_edge,
            },
        );
    }

    pub fn lookup(&self, trigger: &str, parameter: &str) -> Option<&RangeHint> {
        self.hints.get(trigger)?.get(parameter)
    }

    pub fn is_empty(&self) -> bool {
        self.hints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hints.values().map(|params| params.len()).sum()
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let hints: RangeHints = serde_yaml::from_str(&data)?;
        Ok(hints)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<HintWarning> {
        let mut warnings = Vec::new();
        for (trigger, params) in &self.hints {
            for (parameter, hint) in params {
                if !hint.lower_edge.is_finite() || !hint.upper_edge.is_finite() {
                    warnings.push(HintWarning {
                        trigger: trigger.clone(),
                        parameter: parameter.clone(),
                        message: format!(
                            "edges must be finite, got [{}, {}]",
                            hint.lower_edge, hint.upper_edge
                        ),
                    });
                } else if hint.upper_edge <= hint.lower_edge {
                    warnings.push(HintWarning {
                        trigger: trigger.clone(),
                        parameter: parameter.clone(),
                        message: format!(
                            "upper edge {} is not above lower edge {}",
                            hint.upper_edge, hint.lower_edge
                        ),
                    });
                }
            }
        }
        warnings
    }

    // -----------------------------------------------------------------------
    // Presets
    // -----------------------------------------------------------------------

    /// Search ranges for the stock 2015 L1 menu.
    pub fn l1_menu_2015() -> Self {
        let mut hints = Self::new();
        hints.insert("L1_DoubleJet", "threshold1", -2.0, 402.0);
        hints.insert("L1_DoubleMu", "threshold1", -0.5, 140.5);
        hints.insert("L1_HTM", "threshold1", -0.5, 200.5);
        hints.insert("L1_HTT", "threshold1", -0.25, 800.25);
        hints.insert("L1_isoEG_EG", "leg1threshold1", -0.5, 63.5);
        hints.insert("L1_SingleIsoEG_HTM", "leg1threshold1", -0.5, 63.5);
        hints.insert("L1_SingleIsoEG_CJet", "leg1threshold1", -0.5, 63.5);
        hints.insert("L1_isoEG_Mu", "leg1threshold1", -0.5, 63.5);
        hints.insert("L1_isoEG_Tau", "leg1threshold1", -0.5, 63.5);
        hints.insert("L1_isoMu_Mu", "threshold1", -0.5, 140.5);
        hints.insert("L1_isoTau_Tau", "leg1threshold1", -0.5, 200.5);
        hints.insert("L1_isoMu_EG", "leg1threshold1", -0.5, 140.5);
        hints.insert("L1_isoMu_Tau", "leg1threshold1", -0.5, 140.5);
        hints.insert("L1_SingleMu_HTM", "leg1threshold1", -0.5, 140.5);
        hints.insert("L1_SingleMu_CJet", "leg1threshold1", -0.5, 140.5);
        hints.insert("L1_QuadJetC", "threshold1", -2.0, 402.0);
        hints.insert("L1_SingleEG", "threshold1", -0.5, 63.5);
        hints.insert("L1_SingleIsoEG", "threshold1", -0.5, 63.5);
        hints.insert("L1_SingleIsoMu", "threshold1", -0.5, 140.5);
        hints.insert("L1_SingleIsoTau", "threshold1", -0.5, 200.5);
        hints.insert("L1_SingleJetC", "threshold1", -2.0, 402.0);
        hints.insert("L1_SingleMu", "threshold1", -0.5, 140.5);
        hints.insert("L1_SingleTau", "threshold1", -0.5, 200.5);
        hints.insert("L1_SixJet", "threshold1", -2.0, 402.0);
        hints
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn lookup_present_and_absent() {
        let mut hints = RangeHints::new();
        hints.insert("L1_SingleMu", "threshold1", -0.5, 140.5);

        let hint = hints.lookup("L1_SingleMu", "threshold1").unwrap();
        assert_eq!(hint.lower_edge, -0.5);
        assert_eq!(hint.upper_edge, 140.5);

        assert!(hints.lookup("L1_SingleMu", "threshold2").is_none());
        assert!(hints.lookup("L1_Unknown", "threshold1").is_none());
    }

    #[test]
    fn insert_overwrites_existing_entry() {
        let mut hints = RangeHints::new();
        hints.insert("L1_HTT", "threshold1", 0.0, 100.0);
        hints.insert("L1_HTT", "threshold1", -0.25, 800.25);
        assert_eq!(hints.len(), 1);
        assert_eq!(
            hints.lookup("L1_HTT", "threshold1").unwrap().upper_edge,
            800.25
        );
    }

    #[test]
    fn yaml_roundtrip() {
        let mut hints = RangeHints::new();
        hints.insert("L1_SingleEG", "threshold1", -0.5, 63.5);
        hints.insert("L1_isoEG_EG", "leg1threshold1", -0.5, 63.5);

        let yaml = serde_yaml::to_string(&hints).unwrap();
        let parsed: RangeHints = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(
            parsed.lookup("L1_SingleEG", "threshold1").unwrap().upper_edge,
            63.5
        );
    }

    #[test]
    fn empty_yaml_deserializes() {
        let hints: RangeHints = serde_yaml::from_str("{}").unwrap();
        assert!(hints.is_empty());
    }

    #[test]
    fn save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hints.yaml");

        let mut hints = RangeHints::new();
        hints.insert("L1_SingleTau", "threshold1", -0.5, 200.5);
        hints.save(&path).unwrap();

        let loaded = RangeHints::load(&path).unwrap();
        assert_eq!(
            loaded.lookup("L1_SingleTau", "threshold1").unwrap().upper_edge,
            200.5
        );
    }

    #[test]
    fn validate_clean_hints() {
        assert!(RangeHints::l1_menu_2015().validate().is_empty());
    }

    #[test]
    fn validate_inverted_edges() {
        let mut hints = RangeHints::new();
        hints.insert("L1_HTT", "threshold1", 800.0, 0.0);
        let warnings = hints.validate();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].trigger, "L1_HTT");
        assert!(warnings[0].message.contains("not above"));
    }

    #[test]
    fn validate_non_finite_edges() {
        let mut hints = RangeHints::new();
        hints.insert("L1_ETM", "threshold1", 0.0, f64::INFINITY);
        let warnings = hints.validate();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("finite"));
    }

    #[test]
    fn menu_2015_preset_covers_single_object_seeds() {
        let hints = RangeHints::l1_menu_2015();
        assert!(hints.lookup("L1_SingleMu", "threshold1").is_some());
        assert!(hints.lookup("L1_isoEG_EG", "leg1threshold1").is_some());
        assert_eq!(hints.len(), 24);
    }
}
