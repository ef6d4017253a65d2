use crate::error::Error;
use regex::Regex;

/// Recognizes committed tokens of one tag family, e.g. `ANAT_T1w_ABCD_2`.
/// Zero-padded indices (`ANAT_T1w_ABCD_01`) count; an index of zero does not.
#[derive(Debug, Clone)]
pub struct TagPattern {
    regex: Regex,
}

impl TagPattern {
    pub fn new(family: &str) -> Result<TagPattern, Error> {
        let regex = Regex::new(&format!("{}_0*[1-9][0-9]*", regex::escape(family))).map_err(|e| {
            Error::Configuration(format!("cannot build tag pattern for '{}': {}", family, e))
        })?;
        Ok(TagPattern { regex })
    }

    /// Substring search; the note may hold other annotator text around the token.
    pub fn is_match(&self, note: &str) -> bool {
        self.regex.is_match(note)
    }
}

/// True when `note` already carries a token of the pattern's family.
pub fn has_tag(note: &str, pattern: &TagPattern) -> bool {
    pattern.is_match(note)
}

/// Prepend `tag` to the trimmed note unless the note already contains it.
pub fn compose_note(existing: &str, tag: &str) -> String {
    let note = existing.trim();
    if note.contains(tag) {
        existing.to_string()
    } else if note.is_empty() {
        tag.to_string()
    } else {
        format!("{} {}", tag, note)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_tag_substring() {
        let pattern = TagPattern::new("ANAT_T1w_ABCD").unwrap();
        assert!(has_tag("ANAT_T1w_ABCD_1", &pattern));
        assert!(has_tag("motion ok; ANAT_T1w_ABCD_2 rescan", &pattern));
        assert!(has_tag("ANAT_T1w_ABCD_12", &pattern));
    }

    #[test]
    fn test_has_tag_requires_positive_index() {
        let pattern = TagPattern::new("ANAT_T1w_ABCD").unwrap();
        assert!(!has_tag("", &pattern));
        assert!(!has_tag("ANAT_T1w_ABCD", &pattern));
        assert!(!has_tag("ANAT_T1w_ABCD_", &pattern));
        assert!(!has_tag("ANAT_T1w_ABCD_0", &pattern));
        assert!(!has_tag("ANAT_T1w_ABCD_00", &pattern));
        assert!(!has_tag("ANAT_T2w_ABCD_1", &pattern));
    }

    #[test]
    fn test_has_tag_zero_padded_index() {
        let pattern = TagPattern::new("ANAT_T1w_ABCD").unwrap();
        assert!(has_tag("ANAT_T1w_ABCD_01", &pattern));
        assert!(has_tag("rescan ANAT_T1w_ABCD_002", &pattern));
    }

    #[test]
    fn test_family_name_is_literal() {
        let pattern = TagPattern::new("A.B").unwrap();
        assert!(has_tag("A.B_1", &pattern));
        assert!(!has_tag("AxB_1", &pattern));
    }

    #[test]
    fn test_compose_note_empty() {
        assert_eq!(compose_note("", "ANAT_T1w_ABCD_1"), "ANAT_T1w_ABCD_1");
        assert_eq!(compose_note("   ", "ANAT_T1w_ABCD_1"), "ANAT_T1w_ABCD_1");
    }

    #[test]
    fn test_compose_note_prepends() {
        assert_eq!(
            compose_note("  motion artifact ", "ANAT_T1w_ABCD_1"),
            "ANAT_T1w_ABCD_1 motion artifact"
        );
    }

    #[test]
    fn test_compose_note_already_tagged_unchanged() {
        let note = "ANAT_T1w_ABCD_1 motion artifact";
        assert_eq!(compose_note(note, "ANAT_T1w_ABCD_1"), note);
    }

    #[test]
    fn test_compose_note_idempotent() {
        for note in ["", "x", " ANAT_T1w_ABCD_1 ", "MOVE_T1w_ABCD_1 keep"] {
            let once = compose_note(note, "ANAT_T1w_ABCD_1");
            assert_eq!(compose_note(&once, "ANAT_T1w_ABCD_1"), once);
        }
    }
}
