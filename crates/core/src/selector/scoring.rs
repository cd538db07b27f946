//! Candidate title scoring.

use crate::bibliography::SearchCandidate;

/// Substrings that mark a page about something other than the print series.
const EXCLUDED_SUBSTRINGS: &[&str] = &[
    "movie",
    "film",
    " tv ",
    "tv series",
    "season ",
    "episode",
    "special",
];

/// Whole words that mark a non-print page.
const EXCLUDED_WORDS: &[&str] = &["ova"];

/// Other page kinds that are never the volume list.
const NON_CANONICAL_KEYWORDS: &[&str] = &[
    "disambiguation",
    "soundtrack",
    "video game",
    "characters",
    "discography",
    "musical",
];

/// Lower-case, unify quotes and `×`, turn `:` into a space and collapse whitespace.
pub fn normalize_title(title: &str) -> String {
    let mapped: String = title
        .to_lowercase()
        .chars()
        .map(|c| match c {
            '×' => 'x',
            '\u{2018}' | '\u{2019}' | '\u{201B}' | '`' | '\u{00B4}' => '\'',
            '\u{201C}' | '\u{201D}' | '\u{201E}' => '"',
            ':' => ' ',
            other => other,
        })
        .collect();

    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_excluded(normalized: &str) -> bool {
    if EXCLUDED_SUBSTRINGS
        .iter()
        .chain(NON_CANONICAL_KEYWORDS)
        .any(|k| normalized.contains(k))
    {
        return true;
    }

    normalized
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| EXCLUDED_WORDS.contains(&word))
}

/// Score a search result against the query. `None` means the title is excluded.
pub fn score_candidate(title: &str, query: &str) -> Option<i32> {
    let normalized = normalize_title(title);
    let normalized_query = normalize_title(query);

    // Pad so " tv " also matches at either end.
    if is_excluded(&format!(" {} ", normalized)) {
        return None;
    }

    let title_len = normalized.chars().count();
    let query_len = normalized_query.chars().count();
    let has_manga_tag = normalized.contains("(manga)");
    let mut score = 0;

    if normalized.starts_with("list of")
        && (normalized.contains("volumes") || normalized.contains("chapters"))
    {
        score += 500;
    }
    if has_manga_tag {
        score += 300;
    }
    if normalized == normalized_query {
        // Usually the franchise or disambiguation page.
        score -= 50;
    }
    if normalized == format!("{} (manga)", normalized_query) {
        score += 200;
    }
    if !normalized_query.is_empty() && normalized.contains(&normalized_query) {
        score += 50;
    }
    if title.contains(':') && !normalized.starts_with(&normalized_query) {
        score -= 100;
    }
    if title_len > query_len * 2 {
        score -= 30;
    }
    if (5..=40).contains(&title_len) {
        score += 10;
    }
    if title_len < 15 && !has_manga_tag {
        score -= 50;
    }

    Some(score)
}

/// Score and order search results, best first. Ties keep search order.
pub fn rank_candidates<S: AsRef<str>>(titles: &[S], query: &str) -> Vec<SearchCandidate> {
    let mut candidates: Vec<SearchCandidate> = titles
        .iter()
        .filter_map(|title| {
            let title = title.as_ref();
            score_candidate(title, query).map(|score| SearchCandidate {
                title: title.to_string(),
                score,
            })
        })
        .collect();

    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    candidates
}
