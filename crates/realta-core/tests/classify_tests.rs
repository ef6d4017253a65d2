use realta_core::rules::RuleTable;
use realta_core::scan::{normalize_image_type, Quality, ScanRecord};
use realta_core::tagging::{classify, Verdict};

const TAGS_YAML: &str = include_str!("../../../config/tags.yaml");

const NORM: &str = r"ORIGINAL\PRIMARY\M\ND\NORM";
const MOSAIC: &str = r"ORIGINAL\PRIMARY\M\ND\MOSAIC";
const MEAN: &str = r"ORIGINAL\PRIMARY\OTHER\ND\NORM\MEAN";

fn make_scan(id: &str, series: &str, image_type: &str, quality: Quality, note: &str) -> ScanRecord {
    ScanRecord {
        id: id.to_string(),
        session_label: "STAR01_MR1".to_string(),
        subject_label: "STAR01".to_string(),
        project: "STAR".to_string(),
        series_description: Some(series.to_string()),
        scan_type: None,
        image_type: normalize_image_type(image_type),
        quality,
        note: note.to_string(),
    }
}

/// A typical ABCD + GSP session:
///   1  T1w_setter                  usable
///   2  ABCD_T1w_MPR_vNav (NORM)    usable      note "ANAT_T1w_ABCD_1"
///   3  ABCD_T1w_MPR_vNav (NORM)    unusable
///   4  T1_MEMPRAGE_GSP_vNavTrk RMS usable
///   5  T1_MEMPRAGE_GSP_vNavTrk RMS usable      note "ANAT_T1w_GSP_1 ok"
///   6  T1_MEMPRAGE_GSP_vNavTrk RMS usable
///   7  T2w_setter                  usable      note "MOVE_T1w_ABCD_1"
fn session() -> Vec<ScanRecord> {
    vec![
        make_scan("1", "T1w_setter", MOSAIC, Quality::Usable, ""),
        make_scan("2", "ABCD_T1w_MPR_vNav", NORM, Quality::Usable, "ANAT_T1w_ABCD_1"),
        make_scan("3", "ABCD_T1w_MPR_vNav", NORM, Quality::Unusable, ""),
        make_scan("4", "T1_MEMPRAGE_GSP_vNavTrk RMS", MEAN, Quality::Usable, ""),
        make_scan("5", "T1_MEMPRAGE_GSP_vNavTrk RMS", MEAN, Quality::Usable, "ANAT_T1w_GSP_1 ok"),
        make_scan("6", "T1_MEMPRAGE_GSP_vNavTrk RMS", MEAN, Quality::Usable, ""),
        make_scan("7", "T2w_setter", MOSAIC, Quality::Usable, "MOVE_T1w_ABCD_1"),
    ]
}

fn rules() -> RuleTable {
    RuleTable::from_yaml_str(TAGS_YAML).unwrap()
}

#[test]
fn test_shipped_rule_table_loads_in_order() {
    let table = rules();
    let names: Vec<&str> = table.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "MOVE_T1w_ABCD",
            "ANAT_T1w_ABCD",
            "MOVE_T2w_ABCD",
            "ANAT_T2w_ABCD",
            "MOVE_T1w_GSP",
            "ANAT_T1w_GSP",
            "MOVE_T2w_GSP",
            "ANAT_T2w_GSP",
        ]
    );
    assert_eq!(table.get("ANAT_T1w_ABCD").unwrap().limit, 1);
    assert_eq!(table.get("ANAT_T1w_GSP").unwrap().limit, 2);
}

#[test]
fn test_expected_and_actual_sets() {
    let classification = classify(&session(), &rules());

    let anat = classification.get("ANAT_T1w_ABCD").unwrap();
    assert_eq!(anat.expected, vec!["2"]);
    assert_eq!(anat.actual, vec!["2"]);
    assert_eq!(anat.verdict(), Verdict::Ok);

    let move_t1 = classification.get("MOVE_T1w_ABCD").unwrap();
    assert_eq!(move_t1.expected, vec!["1"]);
    assert_eq!(move_t1.actual, vec!["7"]);
    assert_eq!(move_t1.verdict(), Verdict::Mismatch);

    let move_t2 = classification.get("MOVE_T2w_ABCD").unwrap();
    assert_eq!(move_t2.expected, vec!["7"]);
    assert!(move_t2.actual.is_empty());
    assert_eq!(move_t2.verdict(), Verdict::SetTag);

    let gsp = classification.get("ANAT_T1w_GSP").unwrap();
    assert_eq!(gsp.expected, vec!["4", "5", "6"]);
    assert_eq!(gsp.actual, vec!["5"]);
    assert_eq!(gsp.verdict(), Verdict::AmbiguousSubset);

    let t2_gsp = classification.get("ANAT_T2w_GSP").unwrap();
    assert!(t2_gsp.expected.is_empty());
    assert_eq!(t2_gsp.verdict(), Verdict::NoMatchFound);
}

#[test]
fn test_one_entry_per_rule_in_rule_order() {
    let table = rules();
    let classification = classify(&session(), &table);
    let names: Vec<&str> = classification.iter().map(|e| e.name.as_str()).collect();
    let rule_names: Vec<&str> = table.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, rule_names);
}

#[test]
fn test_positional_tags_restart_per_rule() {
    let classification = classify(&session(), &rules());

    let gsp_tags: Vec<(&str, &str)> = classification
        .get("ANAT_T1w_GSP")
        .unwrap()
        .candidates
        .iter()
        .map(|c| (c.scan.as_str(), c.tag.as_str()))
        .collect();
    assert_eq!(
        gsp_tags,
        vec![
            ("4", "ANAT_T1w_GSP_1"),
            ("5", "ANAT_T1w_GSP_2"),
            ("6", "ANAT_T1w_GSP_3"),
        ]
    );

    // Scan 2 is the second ABCD T1w in the listing but the first usable one.
    let abcd = &classification.get("ANAT_T1w_ABCD").unwrap().candidates;
    assert_eq!(abcd.len(), 1);
    assert_eq!(abcd[0].tag, "ANAT_T1w_ABCD_1");
}

#[test]
fn test_listing_order_is_preserved() {
    let mut scans = session();
    scans.reverse();
    let classification = classify(&scans, &rules());
    let gsp = classification.get("ANAT_T1w_GSP").unwrap();
    assert_eq!(gsp.expected, vec!["6", "5", "4"]);
    assert_eq!(gsp.candidates[0].scan, "6");
    assert_eq!(gsp.candidates[0].tag, "ANAT_T1w_GSP_1");
}

#[test]
fn test_classification_is_deterministic() {
    let scans = session();
    let table = rules();
    let first = classify(&scans, &table);
    for _ in 0..10 {
        assert_eq!(classify(&scans, &table), first);
    }
    assert_eq!(
        serde_json::to_string(&classify(&scans, &table)).unwrap(),
        serde_json::to_string(&first).unwrap()
    );
}

#[test]
fn test_empty_listing_yields_no_match_everywhere() {
    let classification = classify(&[], &rules());
    assert_eq!(classification.entries.len(), 8);
    assert!(classification
        .iter()
        .all(|entry| entry.verdict() == Verdict::NoMatchFound));
}

#[test]
fn test_scan_matching_two_alternatives_counted_once() {
    let table = RuleTable::from_yaml_str(
        "ANAT_T1w_ABCD:\n  match:\n    - series_description: ABCD_T1w_MPR_vNav\n    - image_type: [ORIGINAL, PRIMARY, M, ND, NORM]\n",
    )
    .unwrap();
    let scans = vec![make_scan("2", "ABCD_T1w_MPR_vNav", NORM, Quality::Usable, "")];
    let classification = classify(&scans, &table);
    assert_eq!(classification.get("ANAT_T1w_ABCD").unwrap().expected, vec!["2"]);
}
