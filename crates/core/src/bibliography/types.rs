//! Bibliography records produced by the parser and the assembler.

use serde::{Deserialize, Serialize};

/// Publication medium of a section or volume.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Manga,
    LightNovel,
    #[default]
    Unknown,
}

impl MediaType {
    /// Ordering rank used when sorting volumes: manga, then light novels, then the rest.
    pub fn sort_rank(self) -> u8 {
        match self {
            MediaType::Manga => 0,
            MediaType::LightNovel => 1,
            MediaType::Unknown => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Manga => "manga",
            MediaType::LightNovel => "light_novel",
            MediaType::Unknown => "unknown",
        }
    }
}

/// How a section relates to the main series of the page.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum SeriesRelationship {
    #[default]
    Main,
    Spinoff,
    Sequel,
    SideStory,
    Anthology,
    Prequel,
    Adaptation,
}

impl SeriesRelationship {
    pub fn is_main(self) -> bool {
        matches!(self, SeriesRelationship::Main)
    }
}

/// A single published volume.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    /// Volume number, adjusted for "Part N" continuation numbering.
    pub volume_number: u32,
    /// Subtitle of the volume.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Normalized ISBN-13 of the original Japanese edition.
    #[serde(rename = "japaneseISBN", default, skip_serializing_if = "Option::is_none")]
    pub japanese_isbn: Option<String>,
    /// Normalized ISBN-13 of the licensed English edition.
    #[serde(rename = "englishISBN", default, skip_serializing_if = "Option::is_none")]
    pub english_isbn: Option<String>,
    /// Japanese release date, as authored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub japanese_release_date: Option<String>,
    /// English release date, as authored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub english_release_date: Option<String>,
    pub media_type: MediaType,
}

impl Volume {
    /// Create a bare volume with only a number and media type.
    pub fn new(volume_number: u32, media_type: MediaType) -> Self {
        Self {
            volume_number,
            title: None,
            japanese_isbn: None,
            english_isbn: None,
            japanese_release_date: None,
            english_release_date: None,
            media_type,
        }
    }
}

/// A headed section of a page together with the volumes listed under it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub name: String,
    /// Heading level (2-4).
    pub heading_level: u8,
    pub media_type: MediaType,
    pub relationship: SeriesRelationship,
    pub volumes: Vec<Volume>,
}

impl Section {
    pub fn new(
        name: impl Into<String>,
        heading_level: u8,
        media_type: MediaType,
        relationship: SeriesRelationship,
    ) -> Self {
        Self {
            name: name.into(),
            heading_level,
            media_type,
            relationship,
            volumes: Vec::new(),
        }
    }
}

/// A fully assembled series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub title: String,
    pub page_id: u64,
    pub volumes: Vec<Volume>,
    pub total_volumes: usize,
    pub is_complete: bool,
    pub media_type: MediaType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_series: Option<Vec<RelatedSeries>>,
}

/// A spin-off, sequel, adaptation, etc. found on the same page as the main series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RelatedSeries {
    pub title: String,
    /// Never `Main`.
    pub relationship: SeriesRelationship,
    pub volumes: Vec<Volume>,
    pub media_type: MediaType,
}

/// A scored search result, used only while ranking candidate pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCandidate {
    pub title: String,
    pub score: i32,
}
