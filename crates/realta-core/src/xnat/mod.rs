pub mod cache;
pub mod client;

use crate::error::Error;
use crate::scan::{Quality, ScanLocator, ScanRecord};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use cache::CachedSource;
pub use client::XnatClient;

/// An MR session as listed by the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experiment {
    #[serde(rename = "ID")]
    pub id: String,
    pub label: String,
    pub project: String,
    pub subject_label: String,
}

impl Experiment {
    pub fn locator(&self, scan: &str) -> ScanLocator {
        ScanLocator {
            project: self.project.clone(),
            subject: self.subject_label.clone(),
            session: self.label.clone(),
            scan: scan.to_string(),
        }
    }
}

/// Reads sessions and their scan listings.
///
/// Implementations must return scans in a stable order for the same session.
pub trait ScanSource {
    fn experiments(&self, label: Option<&str>, project: Option<&str>)
        -> Result<Vec<Experiment>, Error>;

    fn scans(&self, experiment: &Experiment) -> Result<Vec<ScanRecord>, Error>;
}

impl<S: ScanSource + ?Sized> ScanSource for &S {
    fn experiments(
        &self,
        label: Option<&str>,
        project: Option<&str>,
    ) -> Result<Vec<Experiment>, Error> {
        (**self).experiments(label, project)
    }

    fn scans(&self, experiment: &Experiment) -> Result<Vec<ScanRecord>, Error> {
        (**self).scans(experiment)
    }
}

/// Writes a single scan field. Any non-success response is an error.
pub trait FieldWriter {
    fn set_field(&self, target: &ScanLocator, update: &FieldUpdate) -> Result<(), Error>;
}

/// Scan fields that may be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanField {
    Note,
    Type,
    Quality,
}

impl ScanField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanField::Note => "note",
            ScanField::Type => "type",
            ScanField::Quality => "quality",
        }
    }
}

impl FromStr for ScanField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "note" => Ok(ScanField::Note),
            "type" => Ok(ScanField::Type),
            "quality" => Ok(ScanField::Quality),
            other => Err(Error::Validation(format!(
                "unknown scan field '{}', expected note, type or quality",
                other
            ))),
        }
    }
}

impl fmt::Display for ScanField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated value for one scan field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldUpdate {
    field: ScanField,
    value: String,
}

impl FieldUpdate {
    /// Validate `value` for `field`; quality must be one of the known ratings.
    pub fn new(field: ScanField, value: &str) -> Result<FieldUpdate, Error> {
        if field == ScanField::Quality {
            value.parse::<Quality>()?;
        }
        Ok(FieldUpdate {
            field,
            value: value.to_string(),
        })
    }

    pub fn note(value: &str) -> FieldUpdate {
        FieldUpdate {
            field: ScanField::Note,
            value: value.to_string(),
        }
    }

    pub fn scan_type(value: &str) -> FieldUpdate {
        FieldUpdate {
            field: ScanField::Type,
            value: value.to_string(),
        }
    }

    pub fn field(&self) -> ScanField {
        self.field
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Query parameter name the repository expects.
    pub fn param_name(&self) -> String {
        format!("xnat:mrscandata/{}", self.field)
    }

    /// The repository ignores empty values, so clearing sends a single space.
    pub fn param_value(&self) -> &str {
        if self.value.is_empty() {
            " "
        } else {
            &self.value
        }
    }
}
