//! Heading-based relationship classification.
//!
//! Decides whether a section heading belongs to the main series or to one of
//! the related kinds (spin-off, sequel, side story, ...). Rules are evaluated
//! in a fixed priority order and the first match wins.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::media_type::detect_media_type;
use super::types::{MediaType, SeriesRelationship};

/// "Part 2", "Volume 3", "Volumes 1-10": continuation of the main numbering.
static CONTINUATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:part\s*\d|volumes?\s*\d)").unwrap());

/// "Year 2", "Year 3": school-year sequels.
static SEQUEL_YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"year\s*\d").unwrap());

/// Headings that only describe the list itself.
const GENERIC_HEADINGS: &[&str] = &[
    "volume list",
    "volumes",
    "chapter list",
    "chapters",
    "manga",
    "light novels",
];

/// Phrases marking side material rather than the main story.
const SPINOFF_LEXICON: &[&str] = &[
    "short story",
    "side story",
    "anthology",
    "gaiden",
    "stories –",
    "stories -",
    "fan book",
    "guidebook",
    "art book",
];

/// Trailing words dropped from a page title before taking its first word.
const TITLE_SUFFIXES: &[&str] = &["light novels", "chapters", "volumes", "manga"];

/// Check lower-cased text against the spin-off lexicon.
pub(crate) fn matches_spinoff_lexicon(text: &str) -> bool {
    let lower = text.to_lowercase();
    SPINOFF_LEXICON.iter().any(|term| lower.contains(term))
}

/// First significant word of the main series title, lower-cased.
///
/// Punctuation is stripped, a leading "list of" is removed and trailing
/// "chapters" / "volumes" / "manga" / "light novels" are removed before the
/// first whitespace-delimited token is taken.
pub fn main_series_first_word(main_title: &str) -> String {
    let stripped: String = main_title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    let mut title = stripped.split_whitespace().collect::<Vec<_>>().join(" ");

    if let Some(rest) = title.strip_prefix("list of ") {
        title = rest.to_string();
    }

    loop {
        let before = title.len();
        for suffix in TITLE_SUFFIXES {
            if let Some(rest) = title.strip_suffix(suffix) {
                if rest.is_empty() || rest.ends_with(' ') {
                    title = rest.trim_end().to_string();
                }
            }
        }
        if title.len() == before {
            break;
        }
    }

    title
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string()
}

fn contains_word(haystack: &str, word: &str) -> bool {
    !word.is_empty() && haystack.contains(word)
}

/// Classify a section heading relative to the main series.
///
/// `parent` is the nearest enclosing heading, when there is one.
pub fn classify_section(
    heading: &str,
    main_title: &str,
    parent: Option<&str>,
) -> SeriesRelationship {
    let lower = heading.trim().to_lowercase();
    let first_word = main_series_first_word(main_title);

    if CONTINUATION_RE.is_match(&lower) {
        return SeriesRelationship::Main;
    }

    if GENERIC_HEADINGS.contains(&lower.as_str()) {
        return SeriesRelationship::Main;
    }

    if lower.contains("spin-off") || lower.contains("spinoff") {
        return SeriesRelationship::Spinoff;
    }

    if SEQUEL_YEAR_RE.is_match(&lower) {
        return SeriesRelationship::Sequel;
    }

    if lower.contains("alternative") || lower.contains("progressive") {
        return SeriesRelationship::Spinoff;
    }

    if lower.contains("side stor") {
        return SeriesRelationship::SideStory;
    }
    if lower.contains("short stor") {
        return SeriesRelationship::Anthology;
    }
    if lower.contains("gaiden") {
        return SeriesRelationship::SideStory;
    }
    if lower.contains("prequel") {
        return SeriesRelationship::Prequel;
    }

    if lower.contains("stories") && !contains_word(&lower, &first_word) {
        return SeriesRelationship::Anthology;
    }

    if lower.contains(':')
        && contains_word(&lower, &first_word)
        && lower != main_title.trim().to_lowercase()
    {
        return SeriesRelationship::Spinoff;
    }

    if let Some(parent) = parent {
        let parent_lower = parent.to_lowercase();
        let parent_is_media = detect_media_type(parent) != MediaType::Unknown
            || parent_lower.contains("media");
        if parent_is_media && !contains_word(&lower, &first_word) {
            return SeriesRelationship::Spinoff;
        }
    }

    if matches_spinoff_lexicon(&lower) {
        return SeriesRelationship::Spinoff;
    }

    // Headings naming the main series, and anything unrecognized.
    SeriesRelationship::Main
}
