use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Outcome of comparing expected and actual tag holders for one family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    NoMatchFound,
    Ambiguous,
    AmbiguousSubset,
    Mismatch,
    MismatchSubset,
    Ok,
    SetTag,
}

impl Verdict {
    pub const ALL: [Verdict; 7] = [
        Verdict::NoMatchFound,
        Verdict::Ambiguous,
        Verdict::AmbiguousSubset,
        Verdict::Mismatch,
        Verdict::MismatchSubset,
        Verdict::Ok,
        Verdict::SetTag,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::NoMatchFound => "NO_MATCH_FOUND",
            Verdict::Ambiguous => "AMBIGUOUS",
            Verdict::AmbiguousSubset => "AMBIGUOUS_SUBSET",
            Verdict::Mismatch => "MISMATCH",
            Verdict::MismatchSubset => "MISMATCH_SUBSET",
            Verdict::Ok => "OK",
            Verdict::SetTag => "SET_TAG",
        }
    }

    /// Verdicts that need no attention; `--hide` drops them from reports.
    pub fn is_quiet(&self) -> bool {
        matches!(self, Verdict::NoMatchFound | Verdict::Ok)
    }

    /// More scans qualify than the family allows.
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Verdict::Ambiguous | Verdict::AmbiguousSubset)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set relations between the expected and actual holders.
struct Comparison {
    expected_len: usize,
    actual_len: usize,
    same_sets: bool,
    /// Some scans are tagged and all of them are among the expected ones.
    tagged_within_expected: bool,
    expected_within_actual: bool,
}

impl Comparison {
    fn new(expected: &[String], actual: &[String]) -> Comparison {
        let expected_set: BTreeSet<&str> = expected.iter().map(String::as_str).collect();
        let actual_set: BTreeSet<&str> = actual.iter().map(String::as_str).collect();
        Comparison {
            expected_len: expected.len(),
            actual_len: actual.len(),
            same_sets: expected_set == actual_set,
            tagged_within_expected: !actual_set.is_empty() && actual_set.is_subset(&expected_set),
            expected_within_actual: expected_set.is_subset(&actual_set),
        }
    }
}

/// Reconcile one family. Arms are evaluated top to bottom; the first match wins.
pub fn reconcile(expected: &[String], actual: &[String], limit: usize) -> Verdict {
    match Comparison::new(expected, actual) {
        Comparison { expected_len: 0, .. } => Verdict::NoMatchFound,
        c if c.expected_len > limit => {
            if c.tagged_within_expected {
                Verdict::AmbiguousSubset
            } else {
                Verdict::Ambiguous
            }
        }
        c if c.actual_len > 0 && !c.same_sets => {
            if c.actual_len <= limit && c.expected_within_actual {
                Verdict::MismatchSubset
            } else {
                Verdict::Mismatch
            }
        }
        c if c.expected_within_actual => Verdict::Ok,
        _ => Verdict::SetTag,
    }
}
