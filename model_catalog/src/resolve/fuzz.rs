//! Fuzzy string scoring on a 0..=100 scale.
//!
//! Scores are built on the indel similarity of two strings ([`ratio`]:
//! `2 * lcs / (len_a + len_b)`, where `lcs` is the longest common subsequence)
//! and combined by [`weighted_ratio`], which also considers
//! substring alignment and token order/overlap:
//!
//! - strings of similar length: max of [`ratio`] and 0.95 × the token sort/set ratios;
//! - one string at least 1.5× longer: partial variants are used instead, scaled by
//!   0.9 (or 0.6 once the length ratio exceeds 8).
//!
//! Inputs are pre-processed by [`full_process`]: anything that is not a letter
//! or digit becomes a space, the result is lowercased and trimmed.

use std::collections::BTreeSet;

const UNBASE_SCALE: f64 = 0.95;

/// Lowercase, replace non-alphanumerics with spaces, trim.
pub fn full_process(s: &str) -> String {
    let replaced: String = s
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    replaced.to_lowercase().trim().to_string()
}

fn percent(similarity: f64) -> u8 {
    (similarity * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Length of the longest common subsequence, in chars.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut row = vec![0usize; b.len() + 1];
    for &ca in a {
        let mut diag = 0;
        for (j, &cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == cb { diag + 1 } else { above.max(row[j]) };
            diag = above;
        }
    }
    row[b.len()]
}

/// Indel similarity of the raw strings; 0 if either is empty.
///
/// Equals `1 - indel_distance / (len_a + len_b)`: only insertions and
/// deletions count, so a substitution costs 2.
pub fn ratio(a: &str, b: &str) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let (a, b): (Vec<char>, Vec<char>) = (a.chars().collect(), b.chars().collect());
    let total = (a.len() + b.len()) as f64;
    percent(2.0 * lcs_len(&a, &b) as f64 / total)
}

/// Best [`ratio`] of the shorter string against every same-length window of the longer.
pub fn partial_ratio(a: &str, b: &str) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let (short, long) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };
    let long_chars: Vec<char> = long.chars().collect();
    let width = short.chars().count();

    let mut best = 0;
    for start in 0..=(long_chars.len() - width) {
        let window: String = long_chars[start..start + width].iter().collect();
        best = best.max(ratio(short, &window));
        if best == 100 {
            break;
        }
    }
    best
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn token_sort(a: &str, b: &str, partial: bool) -> u8 {
    let (a, b) = (sorted_tokens(&full_process(a)), sorted_tokens(&full_process(b)));
    if partial { partial_ratio(&a, &b) } else { ratio(&a, &b) }
}

fn token_set(a: &str, b: &str, partial: bool) -> u8 {
    let (a, b) = (full_process(a), full_process(b));
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let ta: BTreeSet<&str> = a.split_whitespace().collect();
    let tb: BTreeSet<&str> = b.split_whitespace().collect();

    let join = |set: Vec<&&str>| set.into_iter().copied().collect::<Vec<_>>().join(" ");
    let sect = join(ta.intersection(&tb).collect());
    let diff_ab = join(ta.difference(&tb).collect());
    let diff_ba = join(tb.difference(&ta).collect());

    if partial && !sect.is_empty() {
        // Any shared token is a perfect partial match.
        return 100;
    }

    let combined_ab = format!("{sect} {diff_ab}").trim().to_string();
    let combined_ba = format!("{sect} {diff_ba}").trim().to_string();
    let score = |x: &str, y: &str| if partial { partial_ratio(x, y) } else { ratio(x, y) };

    score(&sect, &combined_ab)
        .max(score(&sect, &combined_ba))
        .max(score(&combined_ab, &combined_ba))
}

/// [`ratio`] after sorting whitespace-separated tokens.
pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
    token_sort(a, b, false)
}

/// [`ratio`] over the shared tokens plus each side's leftovers.
pub fn token_set_ratio(a: &str, b: &str) -> u8 {
    token_set(a, b, false)
}

/// Weighted combination of the scorers above.
pub fn weighted_ratio(a: &str, b: &str) -> u8 {
    let (p1, p2) = (full_process(a), full_process(b));
    if p1.is_empty() || p2.is_empty() {
        return 0;
    }

    let base = f64::from(ratio(&p1, &p2));
    let (l1, l2) = (p1.chars().count() as f64, p2.chars().count() as f64);
    let len_ratio = l1.max(l2) / l1.min(l2);

    let best = if len_ratio < 1.5 {
        let tsor = f64::from(token_sort(&p1, &p2, false)) * UNBASE_SCALE;
        let tser = f64::from(token_set(&p1, &p2, false)) * UNBASE_SCALE;
        base.max(tsor).max(tser)
    } else {
        let partial_scale = if len_ratio > 8.0 { 0.6 } else { 0.9 };
        let partial = f64::from(partial_ratio(&p1, &p2)) * partial_scale;
        let ptsor = f64::from(token_sort(&p1, &p2, true)) * UNBASE_SCALE * partial_scale;
        let ptser = f64::from(token_set(&p1, &p2, true)) * UNBASE_SCALE * partial_scale;
        base.max(partial).max(ptsor).max(ptser)
    };
    best.round().clamp(0.0, 100.0) as u8
}

/// Highest-scoring choice for `query`; the earliest choice wins ties.
pub fn extract_one<'c, S: AsRef<str>>(query: &str, choices: &'c [S]) -> Option<(&'c str, u8)> {
    let mut best: Option<(&'c str, u8)> = None;
    for choice in choices {
        let choice = choice.as_ref();
        let score = weighted_ratio(query, choice);
        if best.is_none_or(|(_, s)| score > s) {
            best = Some((choice, score));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn identical_strings_score_100() {
        assert_eq!(ratio("iphone 13", "iphone 13"), 100);
        assert_eq!(weighted_ratio("iPhone 13 Pro", "iPhone 13 Pro"), 100);
        assert_eq!(weighted_ratio("iPhone-13 PRO", "iphone 13 pro"), 100);
    }

    #[test]
    fn empty_inputs_score_zero() {
        assert_eq!(ratio("", "x"), 0);
        assert_eq!(partial_ratio("x", ""), 0);
        assert_eq!(weighted_ratio("   ", "Galaxy S21"), 0);
    }

    #[test]
    fn partial_ratio_finds_embedded_substring() {
        assert_eq!(partial_ratio("galaxy", "samsung galaxy s21"), 100);
    }

    #[test]
    fn token_order_does_not_matter_for_token_scores() {
        assert_eq!(token_sort_ratio("13 Pro iPhone", "iPhone 13 Pro"), 100);
        assert_eq!(token_set_ratio("iPhone 13", "iPhone 13 Pro"), 100);
    }

    #[test]
    fn superset_name_scores_below_exact_match() {
        // Shared tokens are capped at 95 by the token-set scale.
        assert_eq!(weighted_ratio("iPhone 13 Pro", "iPhone 13"), 95);
    }

    #[test]
    fn extract_one_prefers_best_then_earliest() {
        let names = ["iPhone 13", "iPhone 13 Pro", "Galaxy S21"];
        assert_eq!(extract_one("iPhone 13 Pro", &names), Some(("iPhone 13 Pro", 100)));
        assert_eq!(extract_one("iPhone 13", &names), Some(("iPhone 13", 100)));

        let tied = ["ab x", "ab y"];
        assert_eq!(extract_one("ab", &tied), Some(("ab x", 90)));

        let empty: [&str; 0] = [];
        assert_eq!(extract_one("anything", &empty), None);
    }

    #[test]
    fn ratio_matches_reference_scores() {
        assert_eq!(ratio("ab", "ab x"), 67);
        assert_eq!(ratio("this is a test", "this is a test!"), 97);
        assert_eq!(ratio("fuzzy wuzzy was a bear", "wuzzy fuzzy was a bear"), 91);
        assert_eq!(ratio("iphone 13 proo max", "iphone 13 pro max"), 97);
        assert_eq!(ratio("abc", "xyz"), 0);
    }

    #[test]
    fn weighted_ratio_matches_reference_scores() {
        assert_eq!(token_sort_ratio("fuzzy wuzzy was a bear", "wuzzy fuzzy was a bear"), 100);
        assert_eq!(weighted_ratio("iPhone 13 Proo Max", "iPhone 13 Pro Max"), 97);
        let teams = ["Atlanta Falcons", "New York Jets", "New York Giants", "Dallas Cowboys"];
        assert_eq!(extract_one("cowboys", &teams), Some(("Dallas Cowboys", 90)));
    }

    #[test]
    fn partial_scale_drops_only_past_length_ratio_eight() {
        // Exactly 8x longer: still scaled by 0.9.
        assert_eq!(weighted_ratio("a", "a bcdefg"), 90);
        // 9x longer: scaled by 0.6.
        assert_eq!(weighted_ratio("a", "a bcdefgh"), 60);
    }

    proptest! {
        #[test]
        fn scores_stay_in_range_and_are_symmetric(a in ".{0,24}", b in ".{0,24}") {
            let s = weighted_ratio(&a, &b);
            prop_assert!(s <= 100);
            prop_assert_eq!(s, weighted_ratio(&b, &a));
        }
    }
}
