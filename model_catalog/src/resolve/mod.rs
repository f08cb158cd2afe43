//! Resolution of scraped product names onto tracked model names.
//!
//! Scraped titles mix a Cyrillic description with the Latin model name
//! ("Смартфон iPhone 13 Pro"). [`normalize_observed_name`] keeps the Latin
//! part, and [`resolve_against`] matches it against the catalog:
//!
//! 1. the best fuzzy match is computed with [`fuzz::extract_one`];
//! 2. names contained in the candidate (or containing it), case-insensitively,
//!    form the *contained* set;
//! 3. a best match that is also contained resolves without review;
//! 4. otherwise the normalized candidate itself is returned, flagged for review
//!    when the best score is below the threshold.

pub mod fuzz;

use once_cell::sync::Lazy;
use regex::Regex;

/// Score below which an uncontained match is flagged for manual review.
pub const DEFAULT_REVIEW_THRESHOLD: u8 = 96;

static CYRILLIC_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[а-яА-ЯёЁ]+").expect("static regex"));
static SPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").expect("static regex"));

/// Outcome of [`resolve_against`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// True when a human should confirm `name` before it is trusted.
    pub needs_review: bool,
    /// Resolved model name, or the normalized candidate when nothing matched.
    pub name: String,
}

/// Strip Cyrillic runs, trim, and collapse repeated spaces.
pub fn normalize_observed_name(observed: &str) -> String {
    let stripped = CYRILLIC_RUN.replace_all(observed, "");
    SPACE_RUN.replace_all(stripped.trim(), " ").into_owned()
}

/// Names equal to, contained in, or containing `candidate` (ignoring case).
pub fn contained_names<'n, S: AsRef<str>>(candidate: &str, names: &'n [S]) -> Vec<&'n str> {
    let candidate = candidate.to_lowercase();
    names
        .iter()
        .map(|n| n.as_ref())
        .filter(|name| {
            let name = name.to_lowercase();
            candidate.contains(&name) || name.contains(&candidate)
        })
        .collect()
}

/// Resolve `observed` against the known `names`.
///
/// An empty candidate (nothing Latin left) or an empty catalog always needs
/// review. When the best match is not in the contained set the normalized
/// candidate is returned even for scores at or above `threshold`.
pub fn resolve_against<S: AsRef<str>>(observed: &str, names: &[S], threshold: u8) -> Resolution {
    let candidate = normalize_observed_name(observed);
    if candidate.is_empty() {
        let contained: Vec<&str> = Vec::new();
        tracing::info!(
            observed,
            ?contained,
            best_match = "",
            score = 0u8,
            "resolving scraped model name"
        );
        return Resolution {
            needs_review: true,
            name: candidate,
        };
    }

    let best = fuzz::extract_one(&candidate, names);
    let contained = contained_names(&candidate, names);

    let (best_match, score) = best.unwrap_or(("", 0));
    tracing::info!(
        observed,
        ?contained,
        best_match,
        score,
        "resolving scraped model name"
    );

    if best.is_some() && contained.contains(&best_match) {
        return Resolution {
            needs_review: false,
            name: best_match.to_string(),
        };
    }

    Resolution {
        needs_review: score < threshold,
        name: candidate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const NAMES: [&str; 3] = ["iPhone 13", "iPhone 13 Pro", "Galaxy S21"];

    #[test]
    fn normalization_strips_cyrillic_and_squeezes_spaces() {
        assert_eq!(normalize_observed_name("Айфон iPhone 13 Pro   "), "iPhone 13 Pro");
        assert_eq!(normalize_observed_name("Смартфон Galaxy  ёлка  S21"), "Galaxy S21");
        assert_eq!(normalize_observed_name("Телефон"), "");
    }

    #[test]
    fn contained_match_resolves_without_review() {
        let r = resolve_against("Айфон iPhone 13 Pro   ", &NAMES, DEFAULT_REVIEW_THRESHOLD);
        assert_eq!(
            r,
            Resolution {
                needs_review: false,
                name: "iPhone 13 Pro".into()
            }
        );
    }

    #[test]
    fn unknown_device_needs_review() {
        let r = resolve_against("Some Unknown Device XYZ", &NAMES, DEFAULT_REVIEW_THRESHOLD);
        assert!(r.needs_review);
        assert_eq!(r.name, "Some Unknown Device XYZ");
    }

    #[test]
    fn exact_name_resolves_to_itself() {
        for name in NAMES {
            let r = resolve_against(name, &NAMES, DEFAULT_REVIEW_THRESHOLD);
            assert_eq!(r, Resolution { needs_review: false, name: name.into() });
        }
    }

    #[test]
    fn uncontained_high_score_returns_candidate_without_review() {
        // "galaxy s 21" differs only in spacing: high score, but not a substring.
        let r = resolve_against("galaxy s 21", &NAMES, 80);
        assert_eq!(r.name, "galaxy s 21");
        assert!(!r.needs_review);
    }

    #[test]
    fn uncontained_match_at_default_threshold_keeps_candidate() {
        let names = ["iPhone 13", "iPhone 13 Pro Max"];
        // Best match scores 97 but only "iPhone 13" is contained.
        let r = resolve_against("iPhone 13 Proo Max", &names, DEFAULT_REVIEW_THRESHOLD);
        assert_eq!(
            r,
            Resolution {
                needs_review: false,
                name: "iPhone 13 Proo Max".into()
            }
        );
    }

    #[test]
    fn empty_catalog_or_candidate_needs_review() {
        let none: [&str; 0] = [];
        assert!(resolve_against("iPhone 13", &none, DEFAULT_REVIEW_THRESHOLD).needs_review);
        assert!(resolve_against("Телефон", &NAMES, DEFAULT_REVIEW_THRESHOLD).needs_review);
    }

    #[test]
    fn contained_names_is_case_insensitive_both_ways() {
        assert_eq!(contained_names("IPHONE 13 pro max", &NAMES), vec!["iPhone 13", "iPhone 13 Pro"]);
        assert_eq!(contained_names("galaxy", &NAMES), vec!["Galaxy S21"]);
    }

    proptest! {
        #[test]
        fn normalized_names_are_trimmed_latin(s in "[a-zA-Zа-яА-Я0-9 ]{0,40}") {
            let n = normalize_observed_name(&s);
            prop_assert!(!n.contains("  "));
            prop_assert_eq!(n.trim(), n.as_str());
            prop_assert!(!n.chars().any(|c| matches!(c, 'а'..='я' | 'А'..='Я')));
        }
    }
}
