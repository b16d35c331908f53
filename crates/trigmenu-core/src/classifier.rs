use crate::trigger::Trigger;

// ---------------------------------------------------------------------------
// ThresholdPartition
// ---------------------------------------------------------------------------

/// A trigger's parameter names split into thresholds and everything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdPartition {
    pub thresholds: Vec<String>,
    pub non_thresholds: Vec<String>,
}

// ---------------------------------------------------------------------------
// Probing
// ---------------------------------------------------------------------------

/// The threshold parameter names of a trigger, discovered by probing.
///
/// There is no schema for how many thresholds a trigger has, so candidate
/// names are probed against the trigger itself: for each leg L = 0, 1, 2, …
/// the names `threshold1`, `threshold2`, … (prefixed with `legL` when L > 0)
/// are tried in order until one is absent. Cross triggers keep their
/// per-leg thresholds under the `leg1…`, `leg2…` prefixes, so the leg scan
/// only stops once a leg beyond the first fails at its first threshold
/// index. Probing reads existence only; parameter values are untouched.
pub fn threshold_names<T: Trigger + ?Sized>(trigger: &T) -> Vec<String> {
    let mut names = Vec::new();

    for leg in 0.. {
        let mut index = 1;
        loop {
            let candidate = if leg == 0 {
                format!("threshold{index}")
            } else {
                format!("leg{leg}threshold{index}")
            };
            if !trigger.has_parameter(&candidate) {
                break;
            }
            names.push(candidate);
            index += 1;
        }
        // A leg beyond the first with no thresholds at all means the probe
        // space is exhausted. Leg 0 may legitimately be empty for cross
        // triggers that start at leg1.
        if index == 1 && leg != 0 {
            break;
        }
    }

    names
}

/// Every parameter name that is not a threshold, in declaration order.
pub fn non_threshold_names<T: Trigger + ?Sized>(trigger: &T) -> Vec<String> {
    let thresholds = threshold_names(trigger);
    trigger
        .parameter_names()
        .into_iter()
        .filter(|name| !thresholds.contains(name))
        .collect()
}

/// Partition a trigger's parameters into thresholds and non-thresholds.
pub fn classify<T: Trigger + ?Sized>(trigger: &T) -> ThresholdPartition {
    let thresholds = threshold_names(trigger);
    let non_thresholds = trigger
        .parameter_names()
        .into_iter()
        .filter(|name| !thresholds.contains(name))
        .collect();
    ThresholdPartition {
        thresholds,
        non_thresholds,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
