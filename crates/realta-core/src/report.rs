use crate::error::Error;
use crate::tagging::{Classification, Verdict};
use crate::type_map::TypeMismatch;
use crate::xnat::Experiment;
use serde::Serialize;
use std::io::Write;

pub const AUDIT_HEADER: [&str; 7] = [
    "Project", "Subject", "Session", "Tag", "Expected", "Actual", "Status",
];

pub const TYPE_HEADER: [&str; 7] = [
    "Project",
    "Subject",
    "Session",
    "Scan",
    "Series_Description",
    "Type",
    "Expected",
];

/// One (session, tag family) verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditRow {
    pub project: String,
    pub subject: String,
    pub session: String,
    pub tag: String,
    pub expected: Vec<String>,
    pub actual: Vec<String>,
    pub verdict: Verdict,
}

impl AuditRow {
    fn record(&self) -> [String; 7] {
        [
            self.project.clone(),
            self.subject.clone(),
            self.session.clone(),
            self.tag.clone(),
            self.expected.join(";"),
            self.actual.join(";"),
            self.verdict.to_string(),
        ]
    }
}

/// Audit rows for a classified session, one per family in rule order.
pub fn audit_rows(experiment: &Experiment, classification: &Classification) -> Vec<AuditRow> {
    classification
        .iter()
        .map(|entry| AuditRow {
            project: experiment.project.clone(),
            subject: experiment.subject_label.clone(),
            session: experiment.label.clone(),
            tag: entry.name.clone(),
            expected: entry.expected.clone(),
            actual: entry.actual.clone(),
            verdict: entry.verdict(),
        })
        .collect()
}

/// CSV writer for audit rows. With `hide_quiet`, `OK` and `NO_MATCH_FOUND`
/// rows are computed but not written.
pub struct AuditWriter<W: Write> {
    csv: csv::Writer<W>,
    hide_quiet: bool,
}

impl<W: Write> AuditWriter<W> {
    pub fn new(writer: W, hide_quiet: bool) -> Result<Self, Error> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(AUDIT_HEADER)?;
        Ok(Self { csv, hide_quiet })
    }

    /// Returns whether the row was written.
    pub fn write_row(&mut self, row: &AuditRow) -> Result<bool, Error> {
        if self.hide_quiet && row.verdict.is_quiet() {
            return Ok(false);
        }
        self.csv.write_record(row.record())?;
        Ok(true)
    }

    pub fn flush(&mut self) -> Result<(), Error> {
        self.csv.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W, Error> {
        self.csv
            .into_inner()
            .map_err(|e| Error::Io(e.into_error()))
    }
}

/// CSV writer for scan type mismatches.
pub struct TypeReportWriter<W: Write> {
    csv: csv::Writer<W>,
}

impl<W: Write> TypeReportWriter<W> {
    pub fn new(writer: W) -> Result<Self, Error> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(TYPE_HEADER)?;
        Ok(Self { csv })
    }

    pub fn write_row(&mut self, mismatch: &TypeMismatch) -> Result<(), Error> {
        self.csv.write_record([
            mismatch.locator.project.as_str(),
            mismatch.locator.subject.as_str(),
            mismatch.locator.session.as_str(),
            mismatch.locator.scan.as_str(),
            mismatch.series_description.as_str(),
            mismatch.actual.as_str(),
            mismatch.expected.as_str(),
        ])?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), Error> {
        self.csv.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W, Error> {
        self.csv
            .into_inner()
            .map_err(|e| Error::Io(e.into_error()))
    }
}
