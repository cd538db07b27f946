//! Page-title variants to probe for a query.

use super::scoring::rank_candidates;

const MANGA_SUFFIXES: &[&str] = &[" (japanese manga)", " (manga)"];

fn strip_manga_suffix(title: &str) -> &str {
    let lower = title.to_lowercase();
    for suffix in MANGA_SUFFIXES {
        if lower.ends_with(suffix) && title.is_char_boundary(title.len() - suffix.len()) {
            return title[..title.len() - suffix.len()].trim_end();
        }
    }
    title
}

fn list_variants(base: &str) -> [String; 2] {
    [
        format!("List of {} chapters", base),
        format!("List of {} manga volumes", base),
    ]
}

/// Ordered, case-insensitively de-duplicated titles to fetch for `query`.
///
/// Order: list pages named after the query, list pages named after the best
/// search result (with and without its subtitle), search results that
/// already look like list pages, then the bare query as a last resort.
pub fn candidate_titles<S: AsRef<str>>(query: &str, search_results: &[S]) -> Vec<String> {
    let query = query.trim();
    let mut titles: Vec<String> = Vec::new();
    let mut push = |title: String| {
        let title = title.trim().to_string();
        if !title.is_empty() && !titles.iter().any(|t| t.eq_ignore_ascii_case(&title)) {
            titles.push(title);
        }
    };

    for variant in list_variants(query) {
        push(variant);
    }

    if let Some(top) = rank_candidates(search_results, query).into_iter().next() {
        let base = strip_manga_suffix(&top.title).to_string();
        for variant in list_variants(&base) {
            push(variant);
        }
        if let Some((head, _subtitle)) = base.split_once(':') {
            for variant in list_variants(head.trim()) {
                push(variant);
            }
        }
    }

    for result in search_results {
        let result = result.as_ref();
        let lower = result.to_lowercase();
        if lower.contains("chapters") || lower.contains("volumes") {
            push(result.to_string());
        }
    }

    push(query.to_string());
    push(format!("{} (manga)", query));

    titles
}
