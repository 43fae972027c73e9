//! Relevance scoring for free-text listing search.
//!
//! A query is split into lower-cased alphanumeric terms. A listing scores one
//! point for every word in its searchable text that starts with a term.
//! Scoring only sees the newest [`MAX_CANDIDATES`] rows that mention a term.

/// Upper bound on rows loaded for one search.
pub const MAX_CANDIDATES: u64 = 1000;

/// Lower-cased alphanumeric terms of `query`, deduplicated, in first-seen order.
pub fn terms(query: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for word in words(query) {
        if !out.contains(&word) {
            out.push(word);
        }
    }
    out
}

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

/// Number of words across `fields` that start with any of `terms`.
pub fn score(terms: &[String], fields: &[&str]) -> u32 {
    if terms.is_empty() {
        return 0;
    }
    fields
        .iter()
        .flat_map(|f| words(f))
        .filter(|w| terms.iter().any(|t| w.starts_with(t.as_str())))
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terms_are_lowercased_and_deduplicated() {
        assert_eq!(terms("  Pool, pool-side VIEW! "), vec!["pool", "side", "view"]);
        assert!(terms(" -- ").is_empty());
    }

    #[test]
    fn score_counts_prefix_matches_per_word() {
        let t = terms("lake view");
        assert_eq!(score(&t, &["Lakeside Loft", "Lake Towers", "Great views of the lake"]), 4);
        assert_eq!(score(&t, &["City Center"]), 0);
    }

    #[test]
    fn empty_terms_score_zero() {
        assert_eq!(score(&[], &["anything"]), 0);
    }
}
