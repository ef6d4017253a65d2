use super::{Alternative, Constraint, Rule};
use crate::scan::{Quality, ScanRecord};

impl Constraint {
    /// Exact comparison against the scan's value. A missing value never matches.
    pub fn matches(&self, scan: &ScanRecord) -> bool {
        match self {
            Constraint::SeriesDescription(expected) => {
                scan.series_description.as_deref() == Some(expected.as_str())
            }
            Constraint::ScanType(expected) => scan.scan_type.as_deref() == Some(expected.as_str()),
            Constraint::ImageType(expected) => scan.image_type.as_ref() == Some(expected),
        }
    }
}

impl Alternative {
    pub fn matches(&self, scan: &ScanRecord) -> bool {
        self.constraints.iter().all(|c| c.matches(scan))
    }
}

/// True when the scan is usable and satisfies at least one of the rule's alternatives.
pub fn matches(scan: &ScanRecord, rule: &Rule) -> bool {
    scan.quality == Quality::Usable && rule.alternatives.iter().any(|alt| alt.matches(scan))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn t1_rule() -> Rule {
        Rule::new(
            "ANAT_T1w_ABCD",
            vec![Alternative {
                constraints: vec![
                    Constraint::SeriesDescription("ABCD_T1w_MPR_vNav".to_string()),
                    Constraint::ImageType(tokens(&["ORIGINAL", "PRIMARY", "M", "ND", "NORM"])),
                ],
            }],
            1,
        )
        .unwrap()
    }

    fn t1_scan() -> ScanRecord {
        ScanRecord {
            id: "7".to_string(),
            series_description: Some("ABCD_T1w_MPR_vNav".to_string()),
            image_type: Some(tokens(&["ORIGINAL", "PRIMARY", "M", "ND", "NORM"])),
            quality: Quality::Usable,
            ..Default::default()
        }
    }

    #[test]
    fn test_exact_match() {
        assert!(matches(&t1_scan(), &t1_rule()));
    }

    #[test]
    fn test_quality_must_be_usable() {
        let mut scan = t1_scan();
        scan.quality = Quality::Questionable;
        assert!(!matches(&scan, &t1_rule()));
    }

    #[test]
    fn test_image_type_order_matters() {
        let mut scan = t1_scan();
        scan.image_type = Some(tokens(&["PRIMARY", "ORIGINAL", "M", "ND", "NORM"]));
        assert!(!matches(&scan, &t1_rule()));
    }

    #[test]
    fn test_image_type_is_not_prefix_match() {
        let mut scan = t1_scan();
        scan.image_type = Some(tokens(&["ORIGINAL", "PRIMARY", "M", "ND", "NORM", "DIS2D"]));
        assert!(!matches(&scan, &t1_rule()));
    }

    #[test]
    fn test_missing_field_does_not_match() {
        let mut scan = t1_scan();
        scan.image_type = None;
        assert!(!matches(&scan, &t1_rule()));

        let mut scan = t1_scan();
        scan.series_description = None;
        assert!(!matches(&scan, &t1_rule()));
    }

    #[test]
    fn test_series_description_is_exact() {
        let mut scan = t1_scan();
        scan.series_description = Some("ABCD_T1w_MPR_vNav ".to_string());
        assert!(!matches(&scan, &t1_rule()));
    }

    #[test]
    fn test_any_alternative_suffices() {
        let rule = Rule::new(
            "MOVE_T1w_GSP",
            vec![
                Alternative {
                    constraints: vec![Constraint::SeriesDescription("T1_vNav_setter".to_string())],
                },
                Alternative {
                    constraints: vec![Constraint::ScanType("T1_setter".to_string())],
                },
            ],
            2,
        )
        .unwrap();
        let scan = ScanRecord {
            scan_type: Some("T1_setter".to_string()),
            quality: Quality::Usable,
            ..Default::default()
        };
        assert!(matches(&scan, &rule));
    }
}
