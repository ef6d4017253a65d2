use crate::error::Error;
use crate::scan::{ScanLocator, ScanRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize)]
struct MappingRow {
    #[serde(rename = "Series Description")]
    series_description: String,
    #[serde(rename = "Type")]
    scan_type: String,
}

/// Series description -> canonical scan type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeMapping {
    entries: BTreeMap<String, String>,
}

impl TypeMapping {
    pub fn load(path: &Path) -> Result<TypeMapping, Error> {
        let file = File::open(path).map_err(|e| {
            Error::Configuration(format!("cannot read type mapping {}: {}", path.display(), e))
        })?;
        let mapping = TypeMapping::from_reader(file)?;
        debug!("Loaded {} type mappings from {}", mapping.len(), path.display());
        Ok(mapping)
    }

    /// Read `Series Description,Type` rows. Repeated rows must agree.
    pub fn from_reader<R: Read>(reader: R) -> Result<TypeMapping, Error> {
        let mut entries: BTreeMap<String, String> = BTreeMap::new();
        let mut csv_reader = csv::Reader::from_reader(reader);
        for row in csv_reader.deserialize::<MappingRow>() {
            let row =
                row.map_err(|e| Error::Configuration(format!("invalid type mapping: {}", e)))?;
            match entries.get(&row.series_description) {
                Some(existing) if *existing != row.scan_type => {
                    return Err(Error::Configuration(format!(
                        "found multiple instances of \"{}\" with differing types ('{}', '{}')",
                        row.series_description, existing, row.scan_type
                    )));
                }
                Some(_) => {}
                None => {
                    entries.insert(row.series_description, row.scan_type);
                }
            }
        }
        Ok(TypeMapping { entries })
    }

    pub fn expected_type(&self, series_description: &str) -> Option<&str> {
        self.entries.get(series_description).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A scan whose `type` disagrees with the mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeMismatch {
    pub locator: ScanLocator,
    pub series_description: String,
    pub actual: String,
    pub expected: String,
}

/// Mapped scans whose type differs from the mapping, in listing order.
pub fn type_mismatches(scans: &[ScanRecord], mapping: &TypeMapping) -> Vec<TypeMismatch> {
    scans
        .iter()
        .filter_map(|scan| {
            let series = scan.series_description.as_deref()?;
            let expected = mapping.expected_type(series)?;
            let actual = scan.scan_type.as_deref().unwrap_or_default();
            if actual == expected {
                return None;
            }
            Some(TypeMismatch {
                locator: scan.locator(),
                series_description: series.to_string(),
                actual: actual.to_string(),
                expected: expected.to_string(),
            })
        })
        .collect()
}
