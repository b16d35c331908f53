use crate::error::Result;

// ---------------------------------------------------------------------------
// Trigger
// ---------------------------------------------------------------------------

/// The parameter surface of a trigger: a named, versioned bundle of numeric
/// parameters, some of which are thresholds.
///
/// Implementations are constructed and owned externally; the calibration
/// engine only borrows them. All parameter mutation goes by name through
/// [`set_parameter`](Trigger::set_parameter) so that callers never hold
/// aliased references into a trigger's internals.
pub trait Trigger {
    fn name(&self) -> &str;

    fn version(&self) -> u32 {
        0
    }

    /// Every parameter name this trigger recognizes, in declaration order.
    fn parameter_names(&self) -> Vec<String>;

    /// Current value of a parameter, or `ParameterNotFound` if `name` is not
    /// a recognized parameter of this trigger.
    fn parameter(&self, name: &str) -> Result<f64>;

    /// Set a parameter; the trigger's next evaluation reflects the change.
    /// Fails with `ParameterNotFound` for unrecognized names.
    fn set_parameter(&mut self, name: &str, value: f64) -> Result<()>;

    /// Explicit existence query. Probing for parameters is done through this
    /// method, never by catching `ParameterNotFound` as control flow.
    fn has_parameter(&self, name: &str) -> bool {
        self.parameter(name).is_ok()
    }

    /// True if the threshold parameters must move together (under a fixed
    /// scaling) rather than be searched independently.
    fn thresholds_are_correlated(&self) -> bool {
        false
    }
}

// ---------------------------------------------------------------------------
// EventTrigger
// ---------------------------------------------------------------------------

/// A trigger that can be evaluated against an event.
///
/// The event type is opaque to this crate: the engine passes it through to
/// `accepts` by reference and never inspects it. Components that only need
/// the parameter surface (the classifier, the reporter) take a plain
/// [`Trigger`] bound instead, so implementations backed by stored parameter
/// values alone never have to invent an event type.
pub trait EventTrigger: Trigger {
    type Event;

    fn accepts(&self, event: &Self::Event) -> bool;
}

/// Value of the first parameter in `names` that the trigger recognizes.
///
/// This is the fallback-probe pattern used for display columns that can be
/// stored under several names (eta cut, muon quality). Absence of every
/// candidate is a normal outcome, not an error.
pub fn first_present<T: Trigger + ?Sized>(trigger: &T, names: &[&str]) -> Option<f64> {
    names
        .iter()
        .find(|n| trigger.has_parameter(n))
        .and_then(|n| trigger.parameter(n).ok())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
