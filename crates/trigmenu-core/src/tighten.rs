use crate::classifier;
use crate::error::{Result, TrigmenuError};
use crate::hints::RangeHints;
use crate::trigger::EventTrigger;
use std::collections::BTreeMap;

/// Search interval used when no range hint exists for a threshold.
const DEFAULT_LOWER_EDGE: f64 = 0.0;
const DEFAULT_UPPER_EDGE: f64 = 500.0;

/// The upper edge is stretched by this factor so the turn-on point is
/// interior to the interval even when a hint underestimates the ceiling.
const UPPER_EDGE_MARGIN: f64 = 5.0;

// ---------------------------------------------------------------------------
// ScaledThreshold
// ---------------------------------------------------------------------------

/// A threshold that follows the driving parameter at a fixed ratio.
///
/// When a trigger declares its thresholds correlated they cannot be searched
/// independently: the first threshold drives, and every other one is derived
/// as `factor * driver` at each evaluation, where `factor` is the ratio
/// observed when tightening started.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledThreshold {
    pub name: String,
    pub factor: f64,
}

// ---------------------------------------------------------------------------
// Tightener
// ---------------------------------------------------------------------------

/// Coordinate-wise bisection engine that pushes a trigger's thresholds as
/// high as they can go while the trigger still accepts a given event.
pub struct Tightener<'a> {
    hints: &'a RangeHints,
    tolerance: f64,
}

impl<'a> Tightener<'a> {
    /// Fails with `InvalidTolerance` unless `tolerance > 0` — the bisection
    /// loop would otherwise never terminate.
    pub fn new(hints: &'a RangeHints, tolerance: f64) -> Result<Self> {
        if !(tolerance > 0.0) {
            return Err(TrigmenuError::InvalidTolerance(tolerance));
        }
        Ok(Self { hints, tolerance })
    }

    /// Set every threshold of `trigger` to the tightest value that still
    /// accepts `event`, and return the final assignment.
    ///
    /// Each threshold is bisected independently with all other thresholds
    /// held at zero; the recorded values are applied together at the end.
    /// For correlated thresholds only the first is searched and the rest are
    /// scaled from it, preserving their entry ratios exactly (a correlated
    /// trigger entering with a zero driver value has no well-defined ratios
    /// and is a caller error).
    ///
    /// The converged value is the upper end of the final interval, so it sits
    /// at most `tolerance` above the true turn-on point; acceptance at the
    /// final assignment holds to within that tolerance. If acceptance is not
    /// monotonic in a threshold, bisection converges to some crossing point,
    /// not necessarily the tightest one.
    ///
    /// The trigger is left mutated even on the error path; callers that need
    /// the original configuration must save it first.
    pub fn tighten<T>(&self, trigger: &mut T, event: &T::Event) -> Result<BTreeMap<String, f64>>
    where
        T: EventTrigger + ?Sized,
    {
        let mut active = classifier::threshold_names(trigger);
        let mut scalings: Vec<ScaledThreshold> = Vec::new();

        // Correlated thresholds can only move together: keep the first as
        // the driving parameter and record the entry ratio of each of the
        // others against it.
        if trigger.thresholds_are_correlated() && !active.is_empty() {
            let driver_value = trigger.parameter(&active[0])?;
            for name in active.iter().skip(1) {
                scalings.push(ScaledThreshold {
                    name: name.clone(),
                    factor: trigger.parameter(name)? / driver_value,
                });
            }
            active.truncate(1);
        }

        // Clean baseline: every search runs with the other thresholds at zero.
        for name in &active {
            trigger.set_parameter(name, 0.0)?;
        }

        let mut tightest: BTreeMap<String, f64> = BTreeMap::new();
        for name in &active {
            let (mut low, mut high) = match self.hints.lookup(trigger.name(), name) {
                Some(hint) => (hint.lower_edge, hint.upper_edge),
                None => (DEFAULT_LOWER_EDGE, DEFAULT_UPPER_EDGE),
            };
            high *= UPPER_EDGE_MARGIN;

            let low_test = probe(trigger, event, name, low, &scalings)?;
            let high_test = probe(trigger, event, name, high, &scalings)?;
            if low_test == high_test {
                return Err(TrigmenuError::Infeasible {
                    trigger: trigger.name().to_string(),
                    parameter: name.clone(),
                });
            }

            while high - low > self.tolerance {
                let mid = (high + low) / 2.0;
                let mid_test = probe(trigger, event, name, mid, &scalings)?;

                if mid_test == low_test && mid_test != high_test {
                    low = mid;
                } else if mid_test == high_test {
                    high = mid;
                } else {
                    return Err(TrigmenuError::InvariantViolation {
                        trigger: trigger.name().to_string(),
                        parameter: name.clone(),
                    });
                }
            }

            tightest.insert(name.clone(), high);
            // Back to the clean baseline for the remaining searches.
            trigger.set_parameter(name, 0.0)?;
        }

        // Apply the combined assignment, re-deriving correlated dependents
        // from the driver's final value.
        for (name, value) in &tightest {
            trigger.set_parameter(name, *value)?;
            for scaling in &scalings {
                trigger.set_parameter(&scaling.name, scaling.factor * value)?;
            }
        }

        Ok(tightest)
    }
}

/// Set `name` (and every scaled dependent) to `value`, then evaluate.
fn probe<T>(
    trigger: &mut T,
    event: &T::Event,
    name: &str,
    value: f64,
    scalings: &[ScaledThreshold],
) -> Result<bool>
where
    T: EventTrigger + ?Sized,
{
    trigger.set_parameter(name, value)?;
    for scaling in scalings {
        trigger.set_parameter(&scaling.name, scaling.factor * value)?;
    }
    Ok(trigger.accepts(event))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::Trigger;

    /// An event carrying one measured quantity per trigger leg.
    struct TestEvent {
        quantities: Vec<f64>,
    }

    /// Trigger that accepts when every threshold is at or below the matching
    /// event quantity (positionally). With `always_reject` set, accepts
    /// nothing at all.
    struct CutTrigger {
        name: String,
        params: Vec<(String, f64)>,
        correlated: bool,
        always_reject: bool,
    }

    impl CutTrigger {
        fn new(name: &str, params: &[(&str, f64)]) -> Self {
            Self {
                name: name.to_string(),
                params: params
                    .iter()
                    .map(|(n, v)| (n.to_string(), *v))
                    .collect(),
                correlated: false,
                always_reject: false,
            }
        }

        fn threshold_values(&self) -> Vec<f64> {
            self.params
                .iter()
                .filter(|(n, _)| n.contains("threshold"))
                .map(|(_, v)| *v)
                .collect()
        }
    }

    impl Trigger for CutTrigger {
        fn name(&self) -> &str {
            &self.name
        }

        fn parameter_names(&self) -> Vec<String> {
            self.params.iter().map(|(n, _)| n.clone()).collect()
        }

        fn parameter(&self, name: &str) -> Result<f64> {
            self.params
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| *v)
                .ok_or_else(|| TrigmenuError::ParameterNotFound {
                    trigger: self.name.clone(),
                    parameter: name.to_string(),
                })
        }

        fn set_parameter(&mut self, name: &str, value: f64) -> Result<()> {
            let trigger = self.name.clone();
            self.params
                .iter_mut()
                .find(|(n, _)| n == name)
                .map(|(_, v)| *v = value)
                .ok_or(TrigmenuError::ParameterNotFound {
                    trigger,
                    parameter: name.to_string(),
                })
        }

        fn thresholds_are_correlated(&self) -> bool {
            self.correlated
        }
    }

    impl EventTrigger for CutTrigger {
        type Event = TestEvent;

        fn accepts(&self, event: &TestEvent) -> bool {
            if self.always_reject {
                return false;
            }
            self.threshold_values()
                .iter()
                .zip(&event.quantities)
                .all(|(threshold, quantity)| *threshold <= *quantity)
        }
    }

    fn hints() -> RangeHints {
        RangeHints::new()
    }

    #[test]
    fn rejects_non_positive_tolerance() {
        let hints = hints();
        assert!(matches!(
            Tightener::new(&hints, 0.0),
            Err(TrigmenuError::InvalidTolerance(_))
        ));
        assert!(matches!(
            Tightener::new(&hints, -1.0),
            Err(TrigmenuError::InvalidTolerance(_))
        ));
        assert!(Tightener::new(&hints, 0.01).is_ok());
    }

    #[test]
    fn single_threshold_converges_to_turn_on_point() {
        let hints = hints();
        let tolerance = 0.01;
        let tightener = Tightener::new(&hints, tolerance).unwrap();

        let mut trigger = CutTrigger::new("L1_SingleJet", &[("threshold1", 0.0)]);
        let event = TestEvent {
            quantities: vec![37.5],
        };

        let result = tightener.tighten(&mut trigger, &event).unwrap();
        let value = result["threshold1"];
        assert!(value > 37.5, "converged value {value} must exceed the turn-on point");
        assert!(value <= 37.5 + tolerance, "converged value {value} outside tolerance");
        assert_eq!(trigger.parameter("threshold1").unwrap(), value);
    }

    #[test]
    fn independent_thresholds_use_their_own_quantities() {
        let hints = hints();
        let tolerance = 0.01;
        let tightener = Tightener::new(&hints, tolerance).unwrap();

        let mut trigger = CutTrigger::new(
            "L1_DoubleJet",
            &[("threshold1", 0.0), ("threshold2", 0.0)],
        );
        let event = TestEvent {
            quantities: vec![120.0, 45.0],
        };

        let result = tightener.tighten(&mut trigger, &event).unwrap();
        assert!((result["threshold1"] - 120.0).abs() <= tolerance);
        assert!((result["threshold2"] - 45.0).abs() <= tolerance);
    }

    #[test]
    fn tighten_is_deterministic() {
        let hints = hints();
        let event = TestEvent {
            quantities: vec![63.2, 17.9],
        };

        let run = || {
            let tightener = Tightener::new(&hints, 0.05).unwrap();
            let mut trigger = CutTrigger::new(
                "L1_DoubleTau",
                &[("threshold1", 0.0), ("threshold2", 0.0)],
            );
            tightener.tighten(&mut trigger, &event).unwrap()
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn correlated_thresholds_preserve_entry_ratio() {
        let hints = hints();
        let tolerance = 0.01;
        let tightener = Tightener::new(&hints, tolerance).unwrap();

        // threshold2 enters at half of threshold1 and must stay there.
        let mut trigger = CutTrigger::new(
            "L1_QuadJetC",
            &[("threshold1", 40.0), ("threshold2", 20.0)],
        );
        trigger.correlated = true;
        // Acceptance is limited by the second leg: threshold2 <= 30 means
        // the driver can rise until threshold1 * 0.5 hits 30.
        let event = TestEvent {
            quantities: vec![100.0, 30.0],
        };

        let result = tightener.tighten(&mut trigger, &event).unwrap();
        assert_eq!(result.len(), 1, "only the driver is searched");

        let driver = trigger.parameter("threshold1").unwrap();
        let dependent = trigger.parameter("threshold2").unwrap();
        assert_eq!(dependent, 0.5 * driver, "scaling must hold exactly");
        assert!((dependent - 30.0).abs() <= 0.5 * tolerance + f64::EPSILON);
    }

    #[test]
    fn always_rejecting_trigger_is_infeasible() {
        let hints = hints();
        let tightener = Tightener::new(&hints, 0.1).unwrap();

        let mut trigger = CutTrigger::new("L1_Broken", &[("threshold1", 0.0)]);
        trigger.always_reject = true;
        let event = TestEvent {
            quantities: vec![50.0],
        };

        let err = tightener.tighten(&mut trigger, &event).unwrap_err();
        match err {
            TrigmenuError::Infeasible { trigger, parameter } => {
                assert_eq!(trigger, "L1_Broken");
                assert_eq!(parameter, "threshold1");
            }
            other => panic!("expected Infeasible, got {other:?}"),
        }
    }

    #[test]
    fn range_hint_bounds_the_search() {
        let mut hints = RangeHints::new();
        // Deliberately low ceiling: the margin factor must still leave the
        // turn-on point of 700 interior to [0, 200 * 5].
        hints.insert("L1_HTT", "threshold1", 0.0, 200.0);
        let tolerance = 0.1;
        let tightener = Tightener::new(&hints, tolerance).unwrap();

        let mut trigger = CutTrigger::new("L1_HTT", &[("threshold1", 0.0)]);
        let event = TestEvent {
            quantities: vec![700.0],
        };

        let result = tightener.tighten(&mut trigger, &event).unwrap();
        assert!((result["threshold1"] - 700.0).abs() <= tolerance);
    }

    #[test]
    fn turn_on_beyond_default_ceiling_is_infeasible() {
        // Default interval tops out at 500 * 5; an event quantity above that
        // makes both edges accept.
        let hints = hints();
        let tightener = Tightener::new(&hints, 0.1).unwrap();

        let mut trigger = CutTrigger::new("L1_ETM", &[("threshold1", 0.0)]);
        let event = TestEvent {
            quantities: vec![3000.0],
        };

        assert!(matches!(
            tightener.tighten(&mut trigger, &event),
            Err(TrigmenuError::Infeasible { .. })
        ));
    }

    #[test]
    fn trigger_without_thresholds_is_untouched() {
        let hints = hints();
        let tightener = Tightener::new(&hints, 0.1).unwrap();

        let mut trigger = CutTrigger::new("L1_NoCuts", &[("etaCut", 2.1)]);
        let event = TestEvent { quantities: vec![] };

        let result = tightener.tighten(&mut trigger, &event).unwrap();
        assert!(result.is_empty());
        assert_eq!(trigger.parameter("etaCut").unwrap(), 2.1);
    }

    #[test]
    fn multi_leg_thresholds_are_searched() {
        let hints = hints();
        let tolerance = 0.01;
        let tightener = Tightener::new(&hints, tolerance).unwrap();

        let mut trigger = CutTrigger::new(
            "L1_Mu_EG",
            &[("leg1threshold1", 0.0), ("leg2threshold1", 0.0)],
        );
        let event = TestEvent {
            quantities: vec![22.0, 15.0],
        };

        let result = tightener.tighten(&mut trigger, &event).unwrap();
        assert!((result["leg1threshold1"] - 22.0).abs() <= tolerance);
        assert!((result["leg2threshold1"] - 15.0).abs() <= tolerance);
    }
}
