use crate::error::{Result, TrigmenuError};
use crate::trigger::Trigger;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// TriggerSnapshot
// ---------------------------------------------------------------------------

/// A trigger description captured as plain data: name, version, correlation
/// flag and the current parameter values.
///
/// Snapshots implement [`Trigger`] (but not `EventTrigger` — they carry no
/// decision logic), which is all the classifier and the rate reporter need.
/// Parameters live in a `BTreeMap`, so `parameter_names` is sorted name
/// order and serialized files stay stable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerSnapshot {
    pub name: String,
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub correlated: bool,
    #[serde(default)]
    pub parameters: BTreeMap<String, f64>,
}

impl TriggerSnapshot {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: 0,
            correlated: false,
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: f64) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }
}

impl Trigger for TriggerSnapshot {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> u32 {
        self.version
    }

    fn parameter_names(&self) -> Vec<String> {
        self.parameters.keys().cloned().collect()
    }

    fn parameter(&self, name: &str) -> Result<f64> {
        self.parameters
            .get(name)
            .copied()
            .ok_or_else(|| TrigmenuError::ParameterNotFound {
                trigger: self.name.clone(),
                parameter: name.to_string(),
            })
    }

    fn set_parameter(&mut self, name: &str, value: f64) -> Result<()> {
        match self.parameters.get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(TrigmenuError::ParameterNotFound {
                trigger: self.name.clone(),
                parameter: name.to_string(),
            }),
        }
    }

    fn has_parameter(&self, name: &str) -> bool {
        self.parameters.contains_key(name)
    }

    fn thresholds_are_correlated(&self) -> bool {
        self.correlated
    }
}

// ---------------------------------------------------------------------------
// Menu
// ---------------------------------------------------------------------------

/// An ordered collection of trigger snapshots, loadable from YAML or JSON
/// (chosen by file extension).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Menu {
    #[serde(default)]
    pub triggers: Vec<TriggerSnapshot>,
}

impl Menu {
    pub fn get(&self, name: &str) -> Option<&TriggerSnapshot> {
        self.triggers.iter().find(|t| t.name == name)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let menu = if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
            serde_json::from_str(&data)?
        } else {
            serde_yaml::from_str(&data)?
        };
        Ok(menu)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(path, data.as_bytes())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
