//! Testing utilities: an in-memory wiki and markup builders.
//!
//! # Example
//!
//! ```rust,ignore
//! use volumewiki_core::testing::{fixtures, MockWikiSource};
//!
//! let source = MockWikiSource::new();
//! source.set_search_results(vec!["Naruto (manga)".to_string()]).await;
//! source.add_page("Naruto (manga)", &fixtures::volume_section("Manga", 2, 1..=72)).await;
//! ```

mod mock_wiki_source;

pub use mock_wiki_source::{MockWikiSource, RecordedWikiQuery};

/// Markup builders for volume-list pages.
pub mod fixtures {
    use std::ops::RangeInclusive;

    /// A `{{Graphic novel list}}` block with the given fields.
    pub fn volume_template(number: u32, fields: &[(&str, &str)]) -> String {
        let mut out = format!("{{{{Graphic novel list\n| VolumeNumber = {}\n", number);
        for (name, value) in fields {
            out.push_str(&format!("| {} = {}\n", name, value));
        }
        out.push_str("}}\n");
        out
    }

    /// Consecutive volume blocks with ISBNs and release dates filled in.
    pub fn volume_templates(numbers: RangeInclusive<u32>) -> String {
        numbers
            .map(|n| {
                let date = format!("{{{{Start date|2020|1|{}}}}}", n.min(28));
                let isbn = isbn13_for(n);
                volume_template(
                    n,
                    &[("OriginalRelDate", date.as_str()), ("OriginalISBN", isbn.as_str())],
                )
            })
            .collect()
    }

    /// A heading of `level` followed by volume blocks.
    pub fn volume_section(heading: &str, level: u8, numbers: RangeInclusive<u32>) -> String {
        let marks = "=".repeat(level as usize);
        format!("{}{}{}\n{}", marks, heading, marks, volume_templates(numbers))
    }

    /// A print infobox with author and, when finished, an end date.
    pub fn infobox(author: &str, last: Option<&str>) -> String {
        let mut out = String::from("{{Infobox animanga/Header\n| name = Test\n}}\n");
        out.push_str("{{Infobox animanga/Print\n| type = manga\n");
        out.push_str(&format!("| author = [[{}]]\n", author));
        out.push_str("| first = 2020\n");
        if let Some(last) = last {
            out.push_str(&format!("| last = {}\n", last));
        }
        out.push_str("}}\n");
        out
    }

    /// A valid ISBN-13 derived from a volume number.
    pub fn isbn13_for(number: u32) -> String {
        let body = format!("978408{:06}", number % 1_000_000);
        let sum: u32 = body
            .bytes()
            .enumerate()
            .map(|(i, b)| u32::from(b - b'0') * if i % 2 == 0 { 1 } else { 3 })
            .sum();
        format!("{}{}", body, (10 - sum % 10) % 10)
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures;
    use crate::bibliography::{is_valid_isbn13, parse_sections, total_volume_count};

    #[test]
    fn test_fixture_isbns_are_valid() {
        for n in [1, 7, 42, 999] {
            assert!(is_valid_isbn13(&fixtures::isbn13_for(n)));
        }
    }

    #[test]
    fn test_volume_section_parses() {
        let markup = fixtures::volume_section("Volume list", 2, 1..=4);
        let sections = parse_sections(&markup, "Test");
        assert_eq!(total_volume_count(&sections), 4);
        assert!(sections[0].volumes[0].japanese_isbn.is_some());
    }
}
