use crate::classifier;
use crate::trigger::{first_present, Trigger};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Sentinel rendered for threshold/eta/quality columns a trigger does not
/// have.
pub const NOT_APPLICABLE: f64 = -1.0;

/// Reports show at most this many threshold columns per trigger.
pub const MAX_THRESHOLD_COLUMNS: usize = 4;

/// Parameter names that can hold a trigger's eta cut, in priority order.
const ETA_CUT_NAMES: [&str; 4] = ["etaCut", "regionCut", "leg1etaCut", "leg1regionCut"];

/// Parameter names that can hold a trigger's muon quality, in priority order.
const MUON_QUALITY_NAMES: [&str; 3] = ["muonQuality", "leg1muonQuality", "leg2muonQuality"];

// ---------------------------------------------------------------------------
// RateRecord
// ---------------------------------------------------------------------------

/// One trigger's measured rate and pure rate (both in kHz), as produced by
/// an external rate computation.
#[derive(Clone, Copy)]
pub struct RateRecord<'a> {
    pub trigger: &'a dyn Trigger,
    pub rate: f64,
    pub pure_rate: f64,
}

// ---------------------------------------------------------------------------
// ReferenceOrder
// ---------------------------------------------------------------------------

/// The canonical ordering of trigger names in a report.
///
/// Built once as a name → position map. Names on the list sort by position;
/// names off the list sort after every listed name, alphabetically among
/// themselves. The list is a display convention and is not validated
/// against the actual trigger set.
pub struct ReferenceOrder {
    ranks: HashMap<String, usize>,
}

impl ReferenceOrder {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ranks = names
            .into_iter()
            .enumerate()
            .map(|(rank, name)| (name.into(), rank))
            .collect();
        Self { ranks }
    }

    pub fn rank(&self, name: &str) -> Option<usize> {
        self.ranks.get(name).copied()
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match (self.rank(a), self.rank(b)) {
            (Some(ra), Some(rb)) => ra.cmp(&rb),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.cmp(b),
        }
    }

    pub fn sort(&self, records: &mut [RateRecord<'_>]) {
        records.sort_by(|a, b| self.compare(a.trigger.name(), b.trigger.name()));
    }

    /// The stock 2015 L1 menu ordering.
    pub fn l1_menu_2015() -> Self {
        Self::new([
            "L1_SingleEG",
            "L1_SingleIsoEG",
            "L1_SingleMu",
            "L1_SingleIsoMu",
            "L1_SingleTau",
            "L1_SingleIsoTau",
            "L1_DoubleEG",
            "L1_isoEG_EG",
            "L1_DoubleIsoEG",
            "L1_DoubleMu",
            "L1_isoMu_Mu",
            "L1_DoubleIsoMu",
            "L1_DoubleTau",
            "L1_isoTau_Tau",
            "L1_DoubleIsoTau",
            "L1_EG_Mu",
            "L1_isoEG_Mu",
            "L1_isoEG_isoMu",
            "L1_Mu_EG",
            "L1_isoMu_EG",
            "L1_isoMu_isoEG",
            "L1_EG_Tau",
            "L1_isoEG_Tau",
            "L1_isoEG_isoTau",
            "L1_Mu_Tau",
            "L1_isoMu_Tau",
            "L1_isoMu_isoTau",
            "L1_SingleJet",
            "L1_SingleJetC",
            "L1_DoubleJet",
            "L1_QuadJetC",
            "L1_SixJet",
            "L1_SingleEG_CJet",
            "L1_SingleIsoEG_CJet",
            "L1_SingleMu_CJet",
            "L1_SingleIsoMu_CJet",
            "L1_SingleTau_TwoFJet",
            "L1_DoubleFwdJet",
            "L1_SingleEG_ETM",
            "L1_SingleIsoEG_ETM",
            "L1_SingleMu_ETM",
            "L1_SingleIsoMu_ETM",
            "L1_SingleTau_ETM",
            "L1_SingleIsoTau_ETM",
            "L1_SingleEG_HTM",
            "L1_SingleIsoEG_HTM",
            "L1_SingleMu_HTM",
            "L1_SingleIsoMu_HTM",
            "L1_SingleTau_HTM",
            "L1_SingleIsoTau_HTM",
            "L1_HTM",
            "L1_ETM",
            "L1_HTT",
        ])
    }
}

// ---------------------------------------------------------------------------
// Column helpers
// ---------------------------------------------------------------------------

/// The first four threshold values of a trigger, padded with the sentinel.
pub fn threshold_columns<T: Trigger + ?Sized>(trigger: &T) -> [f64; MAX_THRESHOLD_COLUMNS] {
    let names = classifier::threshold_names(trigger);
    let mut columns = [NOT_APPLICABLE; MAX_THRESHOLD_COLUMNS];
    for (slot, name) in columns.iter_mut().zip(&names) {
        *slot = trigger.parameter(name).unwrap_or(NOT_APPLICABLE);
    }
    columns
}

/// A trigger's eta cut, wherever it is stored.
pub fn eta_cut<T: Trigger + ?Sized>(trigger: &T) -> Option<f64> {
    first_present(trigger, &ETA_CUT_NAMES)
}

/// A trigger's muon quality code, wherever it is stored.
pub fn muon_quality<T: Trigger + ?Sized>(trigger: &T) -> Option<f64> {
    first_present(trigger, &MUON_QUALITY_NAMES)
}

// ---------------------------------------------------------------------------
// Rate report
// ---------------------------------------------------------------------------

/// Render the rate table: one fixed-width line per record in canonical
/// order, then a separator and the three-total summary block.
///
/// The with-overlaps total comes from the caller (only the external rate
/// computation knows it); the without-overlaps and pure totals are summed
/// here. Empty input yields an empty table with zero computed totals.
pub fn render_rates(
    records: &[RateRecord<'_>],
    total_with_overlap: f64,
    order: &ReferenceOrder,
) -> String {
    let mut sorted = records.to_vec();
    order.sort(&mut sorted);

    let mut out = String::new();
    let mut total_no_overlap = 0.0;
    let mut total_pure = 0.0;

    for record in &sorted {
        out.push_str(&format!("{:>23}", record.trigger.name()));
        for threshold in threshold_columns(record.trigger) {
            out.push_str(&format!("{threshold:>8}"));
        }
        out.push_str(&format!("{:>16}{:>12}\n", record.rate, record.pure_rate));

        total_no_overlap += record.rate;
        total_pure += record.pure_rate;
    }

    let width = 23 + 8 * MAX_THRESHOLD_COLUMNS + 16 + 12;
    out.push_str(&"-".repeat(width));
    out.push('\n');
    out.push_str(&format!(
        " Total rate (with overlaps)    = {total_with_overlap:>8} kHz\n"
    ));
    out.push_str(&format!(
        " Total rate (without overlaps) = {total_no_overlap:>8} kHz\n"
    ));
    out.push_str(&format!(
        " Total rate (pure triggers)    = {total_pure:>8} kHz\n"
    ));

    out
}

// ---------------------------------------------------------------------------
// Menu dump
// ---------------------------------------------------------------------------

/// Render one line per trigger: name, threshold columns padded to four with
/// the sentinel, then the eta cut and muon quality resolved by fallback
/// probing (sentinel when absent under every known name).
pub fn render_menu<'a, I>(triggers: I) -> String
where
    I: IntoIterator<Item = &'a dyn Trigger>,
{
    let mut out = String::new();
    for trigger in triggers {
        out.push_str(&format!("{:>21}", trigger.name()));
        for threshold in threshold_columns(trigger) {
            out.push_str(&format!("{threshold:>8}"));
        }
        out.push_str(&format!(
            "{:>8}{:>8}\n",
            eta_cut(trigger).unwrap_or(NOT_APPLICABLE),
            muon_quality(trigger).unwrap_or(NOT_APPLICABLE)
        ));
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
