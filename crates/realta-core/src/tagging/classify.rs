use super::note::has_tag;
use super::reconcile::{reconcile, Verdict};
use crate::rules::{self, RuleTable};
use crate::scan::ScanRecord;
use serde::Serialize;
use tracing::debug;

/// A scan the rules say should carry `tag`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub scan: String,
    pub tag: String,
}

/// Expected and actual holders of one tag family within a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagEntry {
    pub name: String,
    pub limit: usize,
    pub expected: Vec<String>,
    pub actual: Vec<String>,
    pub candidates: Vec<Candidate>,
}

impl TagEntry {
    pub fn verdict(&self) -> Verdict {
        reconcile(&self.expected, &self.actual, self.limit)
    }
}

/// Per-family entries in rule table order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub entries: Vec<TagEntry>,
}

impl Classification {
    pub fn get(&self, name: &str) -> Option<&TagEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TagEntry> {
        self.entries.iter()
    }
}

/// Classify a session's scan listing against the rule table.
///
/// Positional indices restart at 1 for every rule and follow listing order
/// among the scans that rule accepts. Id sequences keep listing order.
pub fn classify(scans: &[ScanRecord], rules: &RuleTable) -> Classification {
    let entries = rules
        .iter()
        .map(|rule| {
            let expected: Vec<String> = scans
                .iter()
                .filter(|scan| rules::matches(scan, rule))
                .map(|scan| scan.id.clone())
                .collect();

            let candidates = expected
                .iter()
                .enumerate()
                .map(|(i, scan)| Candidate {
                    scan: scan.clone(),
                    tag: format!("{}_{}", rule.name, i + 1),
                })
                .collect();

            let actual: Vec<String> = scans
                .iter()
                .filter(|scan| has_tag(&scan.note, rule.pattern()))
                .map(|scan| scan.id.clone())
                .collect();

            debug!(
                "{}: expected {:?}, actual {:?}",
                rule.name, expected, actual
            );

            TagEntry {
                name: rule.name.clone(),
                limit: rule.limit,
                expected,
                actual,
                candidates,
            }
        })
        .collect();

    Classification { entries }
}
