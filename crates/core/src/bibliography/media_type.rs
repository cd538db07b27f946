//! Heading-based media type detection.

use super::types::MediaType;

/// Classify a heading as manga, light novel or unknown.
///
/// "novel" is checked before "manga", so mixed headings lean towards light novels.
pub fn detect_media_type(heading: &str) -> MediaType {
    let lower = heading.to_lowercase();
    if lower.contains("novel") {
        MediaType::LightNovel
    } else if lower.contains("manga") {
        MediaType::Manga
    } else {
        MediaType::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_light_novel() {
        assert_eq!(detect_media_type("Light novels"), MediaType::LightNovel);
        assert_eq!(detect_media_type("NOVEL"), MediaType::LightNovel);
    }

    #[test]
    fn test_detect_manga() {
        assert_eq!(detect_media_type("Manga"), MediaType::Manga);
        assert_eq!(detect_media_type("Spin-off manga"), MediaType::Manga);
    }

    #[test]
    fn test_detect_unknown() {
        assert_eq!(detect_media_type("Anime"), MediaType::Unknown);
        assert_eq!(detect_media_type(""), MediaType::Unknown);
    }

    #[test]
    fn test_novel_wins_over_manga() {
        assert_eq!(detect_media_type("Manga Light Novels"), MediaType::LightNovel);
    }
}
