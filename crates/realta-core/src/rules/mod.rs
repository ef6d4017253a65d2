pub mod matcher;

use crate::error::Error;
use crate::scan::normalize_image_type;
use crate::tagging::note::TagPattern;
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;
use tracing::debug;

pub use matcher::matches;

/// A single field=value requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    SeriesDescription(String),
    ImageType(Vec<String>),
    ScanType(String),
}

/// A conjunction of constraints; every one must hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alternative {
    pub constraints: Vec<Constraint>,
}

/// Declarative rule producing the tag family `name`.
#[derive(Debug, Clone)]
pub struct Rule {
    pub name: String,
    pub alternatives: Vec<Alternative>,
    pub limit: usize,
    pattern: TagPattern,
}

impl Rule {
    pub fn new(name: &str, alternatives: Vec<Alternative>, limit: usize) -> Result<Rule, Error> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Configuration("rule name must not be empty".to_string()));
        }
        if limit == 0 {
            return Err(Error::Configuration(format!(
                "rule '{}': limit must be at least 1",
                name
            )));
        }
        if alternatives.is_empty() {
            return Err(Error::Configuration(format!(
                "rule '{}': no match alternatives",
                name
            )));
        }
        if alternatives.iter().any(|alt| alt.constraints.is_empty()) {
            return Err(Error::Configuration(format!(
                "rule '{}': a match alternative has no constraints",
                name
            )));
        }
        Ok(Rule {
            name: name.to_string(),
            alternatives,
            limit,
            pattern: TagPattern::new(name)?,
        })
    }

    /// Pattern recognizing committed `<name>_<n>` tokens in notes.
    pub fn pattern(&self) -> &TagPattern {
        &self.pattern
    }
}

/// Ordered rule table. Order is the order of the source document.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    pub fn new(rules: Vec<Rule>) -> Result<RuleTable, Error> {
        if rules.is_empty() {
            return Err(Error::Configuration("rule table is empty".to_string()));
        }
        for (i, rule) in rules.iter().enumerate() {
            if rules[..i].iter().any(|other| other.name == rule.name) {
                return Err(Error::Configuration(format!(
                    "rule '{}' is defined more than once",
                    rule.name
                )));
            }
        }
        Ok(RuleTable { rules })
    }

    pub fn load(path: &Path) -> Result<RuleTable, Error> {
        let text = fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("cannot read rule file {}: {}", path.display(), e))
        })?;
        let table = RuleTable::from_yaml_str(&text)?;
        debug!("Loaded {} rules from {}", table.len(), path.display());
        Ok(table)
    }

    /// Parse a rule document of the form
    ///
    /// ```yaml
    /// ANAT_T1w_ABCD:
    ///   limit: 1
    ///   match:
    ///     series_description: ABCD_T1w_MPR_vNav
    ///     image_type: [ORIGINAL, PRIMARY, M, ND, NORM]
    /// ```
    ///
    /// `match` may also be a list of such mappings (any one suffices).
    pub fn from_yaml_str(text: &str) -> Result<RuleTable, Error> {
        let document: Mapping = serde_yaml::from_str(text)
            .map_err(|e| Error::Configuration(format!("invalid rule document: {}", e)))?;

        let mut rules = Vec::with_capacity(document.len());
        for (key, body) in document.iter() {
            let name = key
                .as_str()
                .ok_or_else(|| Error::Configuration(format!("rule name {:?} is not a string", key)))?;
            rules.push(parse_rule(name, body)?);
        }
        RuleTable::new(rules)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.name == name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn parse_rule(name: &str, body: &Value) -> Result<Rule, Error> {
    let body = body
        .as_mapping()
        .ok_or_else(|| Error::Configuration(format!("rule '{}': expected a mapping", name)))?;

    let mut limit = 1usize;
    let mut alternatives = Vec::new();
    for (key, value) in body.iter() {
        match key.as_str() {
            Some("limit") => {
                limit = value
                    .as_u64()
                    .and_then(|n| usize::try_from(n).ok())
                    .ok_or_else(|| {
                        Error::Configuration(format!(
                            "rule '{}': limit must be a positive integer",
                            name
                        ))
                    })?;
            }
            Some("match") => {
                alternatives = match value {
                    Value::Sequence(items) => items
                        .iter()
                        .map(|item| parse_alternative(name, item))
                        .collect::<Result<Vec<_>, _>>()?,
                    other => vec![parse_alternative(name, other)?],
                };
            }
            _ => {
                return Err(Error::Configuration(format!(
                    "rule '{}': unknown key {:?}",
                    name, key
                )))
            }
        }
    }
    Rule::new(name, alternatives, limit)
}

fn parse_alternative(name: &str, value: &Value) -> Result<Alternative, Error> {
    let fields = value.as_mapping().ok_or_else(|| {
        Error::Configuration(format!("rule '{}': match entries must be mappings", name))
    })?;

    let mut constraints = Vec::with_capacity(fields.len());
    for (key, value) in fields.iter() {
        let field = key.as_str().unwrap_or_default();
        match field {
            "series_description" => {
                constraints.push(Constraint::SeriesDescription(expect_string(name, field, value)?));
            }
            "type" => {
                constraints.push(Constraint::ScanType(expect_string(name, field, value)?));
            }
            "image_type" => {
                let tokens = match value {
                    Value::Sequence(items) => items
                        .iter()
                        .map(|item| expect_string(name, field, item))
                        .collect::<Result<Vec<_>, _>>()?,
                    Value::String(text) => normalize_image_type(text).unwrap_or_default(),
                    _ => Vec::new(),
                };
                if tokens.is_empty() {
                    return Err(Error::Configuration(format!(
                        "rule '{}': image_type must be a non-empty list",
                        name
                    )));
                }
                constraints.push(Constraint::ImageType(tokens));
            }
            // Only usable scans ever match; the key is accepted for readability.
            "quality" => {
                let quality = expect_string(name, field, value)?;
                if quality != "usable" {
                    return Err(Error::Configuration(format!(
                        "rule '{}': quality can only be 'usable', got '{}'",
                        name, quality
                    )));
                }
            }
            _ => {
                return Err(Error::Configuration(format!(
                    "rule '{}': unknown field {:?}",
                    name, key
                )))
            }
        }
    }
    Ok(Alternative { constraints })
}

fn expect_string(name: &str, field: &str, value: &Value) -> Result<String, Error> {
    value.as_str().map(str::to_string).ok_or_else(|| {
        Error::Configuration(format!("rule '{}': field '{}' must be a string", name, field))
    })
}
