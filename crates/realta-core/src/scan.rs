use crate::error::Error;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Quality rating an annotator assigned to a scan.
///
/// Values outside the three known ratings are kept as `Unknown` so a listing
/// with an odd value still loads; they never satisfy a rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Usable,
    Questionable,
    Unusable,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Quality {
    pub const CHOICES: [&'static str; 3] = ["usable", "questionable", "unusable"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::Usable => "usable",
            Quality::Questionable => "questionable",
            Quality::Unusable => "unusable",
            Quality::Unknown => "unknown",
        }
    }

    /// Lenient parse used for repository rows.
    pub fn from_listing(value: &str) -> Quality {
        value.trim().parse().unwrap_or(Quality::Unknown)
    }
}

impl FromStr for Quality {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "usable" => Ok(Quality::Usable),
            "questionable" => Ok(Quality::Questionable),
            "unusable" => Ok(Quality::Unusable),
            other => Err(Error::Validation(format!(
                "quality must be one of {:?}, got '{}'",
                Quality::CHOICES,
                other
            ))),
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One acquired scan within an MR session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub id: String,
    pub session_label: String,
    pub subject_label: String,
    pub project: String,
    #[serde(default)]
    pub series_description: Option<String>,
    #[serde(default, rename = "type")]
    pub scan_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_image_type")]
    pub image_type: Option<Vec<String>>,
    #[serde(default)]
    pub quality: Quality,
    #[serde(default)]
    pub note: String,
}

impl ScanRecord {
    pub fn locator(&self) -> ScanLocator {
        ScanLocator {
            project: self.project.clone(),
            subject: self.subject_label.clone(),
            session: self.session_label.clone(),
            scan: self.id.clone(),
        }
    }
}

/// Path components that address a scan for remote writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanLocator {
    pub project: String,
    pub subject: String,
    pub session: String,
    pub scan: String,
}

impl fmt::Display for ScanLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{} scan {}", self.project, self.subject, self.session, self.scan)
    }
}

lazy_static::lazy_static! {
    static ref BACKSLASH_RUN: Regex = Regex::new(r"\\+").expect("constant pattern");
}

/// Split a DICOM ImageType value on runs of backslashes, keeping order.
///
/// Returns `None` for an absent (blank) value so callers treat it as missing.
pub fn normalize_image_type(raw: &str) -> Option<Vec<String>> {
    if raw.trim().is_empty() {
        return None;
    }
    Some(BACKSLASH_RUN.split(raw).map(str::to_string).collect())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawImageType {
    Text(String),
    Tokens(Vec<String>),
}

fn deserialize_image_type<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawImageType>::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawImageType::Text(text)) => normalize_image_type(&text),
        Some(RawImageType::Tokens(tokens)) if !tokens.is_empty() => Some(tokens),
        _ => None,
    })
}
