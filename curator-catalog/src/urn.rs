//! URN normalization for tags and glossary terms.

pub const TAG_URN_PREFIX: &str = "urn:li:tag:";
pub const GLOSSARY_TERM_URN_PREFIX: &str = "urn:li:glossaryTerm:";

/// The one tag written by `flag_quality_issue`. Issue details never become
/// part of a tag name.
pub const QUALITY_ISSUE_TAG_URN: &str = "urn:li:tag:QualityIssue";

fn with_prefix(prefix: &str, value: &str) -> String {
    if value.starts_with(prefix) {
        value.to_string()
    } else {
        format!("{prefix}{value}")
    }
}

/// `pii` becomes `urn:li:tag:pii`; qualified URNs pass through.
pub fn normalize_tag_urn(tag: &str) -> String {
    with_prefix(TAG_URN_PREFIX, tag)
}

/// `Revenue` becomes `urn:li:glossaryTerm:Revenue`; qualified URNs pass through.
pub fn normalize_glossary_term_urn(term: &str) -> String {
    with_prefix(GLOSSARY_TERM_URN_PREFIX, term)
}
