//! Collation-aware text comparison.

use std::borrow::Cow;

use memchr::memmem;

use super::filter::{Collation, CollationKind, MatchType};

/// Compares `haystack` against `pattern` under the given collation.
///
/// Unrecognized collations compare like `i;unicode-casemap`. An empty pattern
/// is contained in, starts and ends every haystack, and equals only "".
pub fn text_matches(
    haystack: &str,
    pattern: &str,
    collation: &Collation,
    match_type: MatchType,
) -> bool {
    let (haystack, pattern) = fold_for_collation(haystack, pattern, collation.kind());
    bytes_match(haystack.as_bytes(), pattern.as_bytes(), match_type)
}

fn fold_for_collation<'a>(
    haystack: &'a str,
    pattern: &'a str,
    kind: CollationKind,
) -> (Cow<'a, str>, Cow<'a, str>) {
    match kind {
        CollationKind::Octet => (Cow::Borrowed(haystack), Cow::Borrowed(pattern)),
        CollationKind::AsciiCasemap => (
            Cow::Owned(haystack.to_ascii_lowercase()),
            Cow::Owned(pattern.to_ascii_lowercase()),
        ),
        CollationKind::UnicodeCasemap | CollationKind::Unrecognized => {
            (unicode_fold(haystack), unicode_fold(pattern))
        }
    }
}

/// Lowercases one character at a time, without context, so a pattern folds
/// the same way wherever it sits in the haystack. Final sigma folds to `σ`.
fn unicode_fold(value: &str) -> Cow<'_, str> {
    if !value.chars().any(folds) {
        return Cow::Borrowed(value);
    }
    Cow::Owned(
        value
            .chars()
            .flat_map(char::to_lowercase)
            .map(|c| if c == 'ς' { 'σ' } else { c })
            .collect(),
    )
}

fn folds(c: char) -> bool {
    c == 'ς' || c.to_lowercase().ne([c])
}

fn bytes_match(haystack: &[u8], pattern: &[u8], match_type: MatchType) -> bool {
    match match_type {
        MatchType::Contains => memmem::find(haystack, pattern).is_some(),
        MatchType::Equals => haystack == pattern,
        MatchType::StartsWith => haystack.starts_with(pattern),
        MatchType::EndsWith => haystack.ends_with(pattern),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unicode() -> Collation {
        Collation::default()
    }

    fn ascii() -> Collation {
        Collation::new("i;ascii-casemap")
    }

    fn octet() -> Collation {
        Collation::new("i;octet")
    }

    #[test]
    fn contains_is_substring() {
        assert!(text_matches(
            "a@example.com",
            "example",
            &unicode(),
            MatchType::Contains
        ));
        assert!(!text_matches(
            "a@example.com",
            "example.org",
            &unicode(),
            MatchType::Contains
        ));
    }

    #[test]
    fn positional_match_types() {
        assert!(text_matches("Smith", "sm", &unicode(), MatchType::StartsWith));
        assert!(!text_matches("Smith", "th", &unicode(), MatchType::StartsWith));
        assert!(text_matches("Smith", "TH", &unicode(), MatchType::EndsWith));
        assert!(!text_matches("Smith", "sm", &unicode(), MatchType::EndsWith));
        assert!(text_matches("Smith", "SMITH", &unicode(), MatchType::Equals));
        assert!(!text_matches("Smithers", "smith", &unicode(), MatchType::Equals));
    }

    #[test]
    fn unicode_casemap_folds_non_ascii() {
        assert!(text_matches("ÉMILE", "émile", &unicode(), MatchType::Equals));
        assert!(text_matches("Grüße", "GRÜ", &unicode(), MatchType::StartsWith));
    }

    #[test]
    fn unicode_casemap_folds_sigma_without_context() {
        assert!(text_matches("ΣΑΣΑ", "ΑΣ", &unicode(), MatchType::Contains));
        assert!(text_matches("ς", "Σ", &unicode(), MatchType::Equals));
        assert!(text_matches(
            "ΟΔΥΣΣΕΥΣ",
            "οδυσσευς",
            &unicode(),
            MatchType::Equals
        ));
        assert!(text_matches("οδυσσευς", "ΣΣ", &unicode(), MatchType::Contains));
    }

    #[test]
    fn unicode_casemap_folds_titlecase() {
        assert!(text_matches("ǅ", "ǆ", &unicode(), MatchType::Equals));
        assert!(text_matches("ǅemal", "Ǆ", &unicode(), MatchType::StartsWith));
    }

    #[test]
    fn ascii_casemap_leaves_non_ascii_alone() {
        assert!(text_matches("WORK", "work", &ascii(), MatchType::Equals));
        assert!(!text_matches("ÉMILE", "émile", &ascii(), MatchType::Equals));
        assert!(text_matches(
            "ÉMILE",
            "émile".to_uppercase().as_str(),
            &ascii(),
            MatchType::Equals
        ));
    }

    #[test]
    fn octet_is_exact() {
        assert!(!text_matches("WORK", "work", &octet(), MatchType::Equals));
        assert!(text_matches("work", "work", &octet(), MatchType::Equals));
        assert!(text_matches("homework", "work", &octet(), MatchType::EndsWith));
    }

    #[test]
    fn unrecognized_collation_uses_default_rules() {
        let custom = Collation::new("i;basic");
        assert!(text_matches("Alice", "ALICE", &custom, MatchType::Equals));
    }

    #[test]
    fn empty_pattern() {
        assert!(text_matches("anything", "", &unicode(), MatchType::Contains));
        assert!(text_matches("anything", "", &unicode(), MatchType::StartsWith));
        assert!(text_matches("anything", "", &unicode(), MatchType::EndsWith));
        assert!(!text_matches("anything", "", &unicode(), MatchType::Equals));
        assert!(text_matches("", "", &octet(), MatchType::Equals));
    }

    #[test]
    fn pattern_longer_than_haystack() {
        assert!(!text_matches("ab", "abc", &unicode(), MatchType::Contains));
        assert!(!text_matches("ab", "abc", &unicode(), MatchType::StartsWith));
        assert!(!text_matches("ab", "abc", &unicode(), MatchType::EndsWith));
    }
}
