use crate::confirm::ConfirmGate;
use crate::error::Error;
use crate::progress::ProgressReporter;
use crate::report::{self, AuditRow, AuditWriter, TypeReportWriter};
use crate::rules::RuleTable;
use crate::scan::ScanRecord;
use crate::tagging::{classify, plan_note_updates, Classification, NotePlan, Verdict};
use crate::type_map::{type_mismatches, TypeMapping};
use crate::xnat::{Experiment, FieldUpdate, FieldWriter, ScanSource};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Runs classification, audits and updates one session at a time.
pub struct SessionEngine<S> {
    source: S,
    rules: Option<RuleTable>,
}

/// A session's listing together with its classification.
#[derive(Debug, Clone, Serialize)]
pub struct SessionTags {
    pub experiment: Experiment,
    #[serde(skip)]
    pub scans: Vec<ScanRecord>,
    pub classification: Classification,
}

impl SessionTags {
    pub fn audit_rows(&self) -> Vec<AuditRow> {
        report::audit_rows(&self.experiment, &self.classification)
    }

    pub fn plan_note_updates(&self) -> Result<NotePlan, Error> {
        plan_note_updates(&self.scans, &self.classification)
    }
}

#[derive(Debug, Default)]
pub struct AuditResult {
    pub sessions: usize,
    pub rows_written: usize,
    pub verdicts: BTreeMap<Verdict, usize>,
    pub duration: Duration,
}

#[derive(Debug, Default)]
pub struct UpdateResult {
    pub written: usize,
    pub declined: usize,
    pub duration: Duration,
}

#[derive(Debug, Default)]
pub struct TypeResult {
    pub sessions: usize,
    pub mismatches: usize,
    pub written: usize,
    pub declined: usize,
    pub duration: Duration,
}

impl<S: ScanSource> SessionEngine<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            rules: None,
        }
    }

    pub fn with_rules(mut self, rules: RuleTable) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn rules(&self) -> Result<&RuleTable, Error> {
        self.rules
            .as_ref()
            .ok_or_else(|| Error::Configuration("no tag rules loaded".to_string()))
    }

    /// Sessions matching a label and/or project, in repository order.
    pub fn resolve_sessions(
        &self,
        label: Option<&str>,
        project: Option<&str>,
    ) -> Result<Vec<Experiment>, Error> {
        if label.is_none() && project.is_none() {
            return Err(Error::Validation(
                "a session label or a project is required".to_string(),
            ));
        }
        let experiments = self.source.experiments(label, project)?;
        if experiments.is_empty() {
            return Err(Error::SessionNotFound(describe(label, project)));
        }
        debug!("Resolved {} sessions for {}", experiments.len(), describe(label, project));
        Ok(experiments)
    }

    /// Exactly one session for `label`.
    pub fn resolve_session(&self, label: &str, project: Option<&str>) -> Result<Experiment, Error> {
        let mut experiments = self.resolve_sessions(Some(label), project)?;
        if experiments.len() > 1 {
            return Err(Error::AmbiguousSession {
                label: label.to_string(),
                count: experiments.len(),
            });
        }
        experiments
            .pop()
            .ok_or_else(|| Error::SessionNotFound(describe(Some(label), project)))
    }

    pub fn classify_session(&self, experiment: &Experiment) -> Result<SessionTags, Error> {
        let rules = self.rules()?;
        let scans = self.source.scans(experiment)?;
        let classification = classify(&scans, rules);
        info!(
            "Classified {} scans of {} against {} rules",
            scans.len(),
            experiment.label,
            rules.len()
        );
        Ok(SessionTags {
            experiment: experiment.clone(),
            scans,
            classification,
        })
    }

    /// Audit each session in turn. Rows are flushed per session, so output for
    /// sessions finished before an error is kept.
    pub fn audit<W: Write>(
        &self,
        experiments: &[Experiment],
        out: &mut AuditWriter<W>,
        reporter: &dyn ProgressReporter,
    ) -> Result<AuditResult, Error> {
        let start = Instant::now();
        let mut result = AuditResult::default();

        for (index, experiment) in experiments.iter().enumerate() {
            reporter.on_session_start(&experiment.label, index + 1, experiments.len());
            let tags = self.classify_session(experiment)?;
            for row in tags.audit_rows() {
                reporter.on_verdict(&row.session, &row.tag, row.verdict);
                *result.verdicts.entry(row.verdict).or_default() += 1;
                if out.write_row(&row)? {
                    result.rows_written += 1;
                }
            }
            out.flush()?;
            result.sessions += 1;
            reporter.on_session_complete(&experiment.label);
        }

        reporter.on_run_complete(result.sessions);
        result.duration = start.elapsed();
        Ok(result)
    }

    /// Compare scan types with the mapping, optionally writing the expected type.
    pub fn sync_types<W: Write>(
        &self,
        experiments: &[Experiment],
        mapping: &TypeMapping,
        out: &mut TypeReportWriter<W>,
        writer: Option<(&dyn FieldWriter, &dyn ConfirmGate)>,
        reporter: &dyn ProgressReporter,
    ) -> Result<TypeResult, Error> {
        let start = Instant::now();
        let mut result = TypeResult::default();

        for (index, experiment) in experiments.iter().enumerate() {
            reporter.on_session_start(&experiment.label, index + 1, experiments.len());
            let scans = self.source.scans(experiment)?;
            for mismatch in type_mismatches(&scans, mapping) {
                out.write_row(&mismatch)?;
                result.mismatches += 1;

                let Some((field_writer, gate)) = writer else {
                    continue;
                };
                let prompt = format!(
                    "Set type of {} from '{}' to '{}'?",
                    mismatch.locator, mismatch.actual, mismatch.expected
                );
                if !gate.confirm(&prompt)? {
                    info!("Skipped type update for {}", mismatch.locator);
                    result.declined += 1;
                    continue;
                }
                field_writer.set_field(&mismatch.locator, &FieldUpdate::scan_type(&mismatch.expected))?;
                reporter.on_field_written(
                    &mismatch.locator.session,
                    &mismatch.locator.scan,
                    "type",
                    &mismatch.expected,
                );
                result.written += 1;
            }
            out.flush()?;
            result.sessions += 1;
            reporter.on_session_complete(&experiment.label);
        }

        reporter.on_run_complete(result.sessions);
        result.duration = start.elapsed();
        Ok(result)
    }
}

/// Write every planned note. The first failed write aborts the rest.
pub fn apply_note_plan(
    plan: &NotePlan,
    writer: &dyn FieldWriter,
    gate: &dyn ConfirmGate,
    reporter: &dyn ProgressReporter,
) -> Result<UpdateResult, Error> {
    let start = Instant::now();
    let mut result = UpdateResult::default();

    for update in &plan.updates {
        let prompt = format!("Set note for {} to \"{}\"?", update.locator, update.note);
        if !gate.confirm(&prompt)? {
            info!("Skipped note update for {}", update.locator);
            result.declined += 1;
            continue;
        }
        info!("setting note for scan {} to \"{}\"", update.locator.scan, update.note);
        writer.set_field(&update.locator, &FieldUpdate::note(&update.note))?;
        reporter.on_field_written(
            &update.locator.session,
            &update.locator.scan,
            "note",
            &update.note,
        );
        result.written += 1;
    }

    result.duration = start.elapsed();
    Ok(result)
}

fn describe(label: Option<&str>, project: Option<&str>) -> String {
    match (label, project) {
        (Some(label), Some(project)) => format!("label '{}' in project '{}'", label, project),
        (Some(label), None) => format!("label '{}'", label),
        (None, Some(project)) => format!("project '{}'", project),
        (None, None) => "all sessions".to_string(),
    }
}
