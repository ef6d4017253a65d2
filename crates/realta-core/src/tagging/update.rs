use super::classify::Classification;
use super::note::compose_note;
use crate::error::Error;
use crate::scan::{ScanLocator, ScanRecord};
use serde::Serialize;
use tracing::{debug, info, warn};

/// A note write for one scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteUpdate {
    pub locator: ScanLocator,
    pub tag: String,
    pub current: String,
    pub note: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NotePlan {
    pub updates: Vec<NoteUpdate>,
    /// Candidates whose note already holds the tag.
    pub already_tagged: usize,
    /// Families left alone because more scans qualify than their limit.
    pub skipped_families: Vec<String>,
}

/// Work out which notes need to change for a classified session.
///
/// Fails with [`Error::Conflict`] before anything is written when two
/// candidate tags land on the same scan.
pub fn plan_note_updates(
    scans: &[ScanRecord],
    classification: &Classification,
) -> Result<NotePlan, Error> {
    let mut plan = NotePlan::default();
    let mut candidates: Vec<(&str, &str)> = Vec::new();

    for entry in classification.iter() {
        if entry.expected.len() > entry.limit {
            warn!(
                "{}: {} scans qualify but the limit is {}, not tagging",
                entry.name,
                entry.expected.len(),
                entry.limit
            );
            plan.skipped_families.push(entry.name.clone());
            continue;
        }
        candidates.extend(
            entry
                .candidates
                .iter()
                .map(|c| (c.scan.as_str(), c.tag.as_str())),
        );
    }

    for scan in scans {
        let tags: Vec<&str> = candidates
            .iter()
            .filter(|(id, _)| *id == scan.id)
            .map(|(_, tag)| *tag)
            .collect();

        let tag = match tags.as_slice() {
            [] => continue,
            [tag] => *tag,
            _ => {
                return Err(Error::Conflict {
                    scan: scan.id.clone(),
                    tags: tags.iter().map(|t| t.to_string()).collect(),
                })
            }
        };

        let note = compose_note(&scan.note, tag);
        if note == scan.note {
            info!("'{}' already in note '{}' for scan {}", tag, scan.note.trim(), scan.id);
            plan.already_tagged += 1;
            continue;
        }

        debug!("scan {}: note '{}' -> '{}'", scan.id, scan.note, note);
        plan.updates.push(NoteUpdate {
            locator: scan.locator(),
            tag: tag.to_string(),
            current: scan.note.clone(),
            note,
        });
    }

    Ok(plan)
}
