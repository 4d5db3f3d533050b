//! Course code canonicalization.

use std::collections::HashSet;

use super::types::CourseCode;

/// Canonicalizes a raw course code: every whitespace character is removed and
/// the rest is uppercased. Returns `None` when nothing is left.
pub fn normalize(raw: &str) -> Option<CourseCode> {
    let canonical: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect();

    if canonical.is_empty() {
        None
    } else {
        Some(CourseCode::from_canonical(canonical))
    }
}

/// Normalizes every entry, drops blanks and keeps only the first occurrence of
/// each course.
pub fn normalize_and_dedupe<I, S>(raws: I) -> Vec<CourseCode>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    raws.into_iter()
        .filter_map(|raw| normalize(raw.as_ref()))
        .filter(|code| seen.insert(code.clone()))
        .collect()
}
