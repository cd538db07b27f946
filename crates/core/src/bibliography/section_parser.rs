//! Section-hierarchy parser for volume-list pages.
//!
//! The markup is scanned as a fold over its lines. Each line consumes the
//! previous [`ParserState`] and yields the next one; nothing outlives a single
//! call to [`parse_sections`].

use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::classifier::classify_section;
use super::isbn::clean_isbn;
use super::markup::{is_volume_template_open, parse_field_line, parse_heading, Heading};
use super::media_type::detect_media_type;
use super::types::{MediaType, Section, SeriesRelationship, Volume};

static PART_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bpart\s*(\d+)").unwrap());

/// Headings tracked: levels 2, 3 and 4.
const MIN_LEVEL: u8 = 2;
const MAX_LEVEL: u8 = 4;
const STACK_DEPTH: usize = (MAX_LEVEL - MIN_LEVEL + 1) as usize;

/// Parse wiki markup into sections carrying their volumes.
///
/// `main_title` is the page (or series) title used as classification context.
/// Sections without volumes are dropped; order follows the input.
pub fn parse_sections(markup: &str, main_title: &str) -> Vec<Section> {
    markup
        .lines()
        .fold(ParserState::new(main_title), ParserState::step)
        .finish()
}

/// Count volumes across parsed sections.
pub fn total_volume_count(sections: &[Section]) -> usize {
    sections.iter().map(|s| s.volumes.len()).sum()
}

#[derive(Debug, Clone)]
struct HeadingSlot {
    text: String,
    relationship: SeriesRelationship,
}

/// Current heading path, one slot per level.
#[derive(Debug, Clone, Default)]
struct HeadingStack {
    slots: [Option<HeadingSlot>; STACK_DEPTH],
}

impl HeadingStack {
    fn index(level: u8) -> usize {
        (level.clamp(MIN_LEVEL, MAX_LEVEL) - MIN_LEVEL) as usize
    }

    /// Set the slot for `level` and clear every deeper slot.
    fn with_heading(mut self, level: u8, slot: HeadingSlot) -> Self {
        let idx = Self::index(level);
        self.slots[idx] = Some(slot);
        for deeper in self.slots.iter_mut().skip(idx + 1) {
            *deeper = None;
        }
        self
    }

    /// Nearest heading above `level`.
    fn parent(&self, level: u8) -> Option<&HeadingSlot> {
        let idx = Self::index(level);
        self.slots[..idx].iter().rev().find_map(|s| s.as_ref())
    }

    /// Nearest enclosing level-3 or level-4 heading above `level`.
    /// Top-level headings never serve as classification context.
    fn classification_parent(&self, level: u8) -> Option<&HeadingSlot> {
        let idx = Self::index(level);
        let first = Self::index(MIN_LEVEL + 1);
        self.slots
            .get(first..idx)?
            .iter()
            .rev()
            .find_map(|s| s.as_ref())
    }

    /// Media type of the deepest heading that names one.
    fn media_type(&self) -> MediaType {
        self.slots
            .iter()
            .rev()
            .flatten()
            .map(|s| detect_media_type(&s.text))
            .find(|m| *m != MediaType::Unknown)
            .unwrap_or(MediaType::Unknown)
    }
}

/// "Part N" continuation numbering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct PartState {
    /// Active part number and the heading level it was declared at.
    current: Option<(u32, u8)>,
    offset: u32,
    highest: u32,
}

impl PartState {
    fn enter(self, part: u32, level: u8) -> Self {
        match self.current {
            None => Self {
                current: Some((part, level)),
                ..self
            },
            Some((active, _)) if part > active => Self {
                current: Some((part, level)),
                offset: self.offset.saturating_add(self.highest),
                highest: 0,
            },
            Some(_) => self,
        }
    }

    /// A non-part heading at or above the part's own level ends the run.
    fn after_plain_heading(self, level: u8) -> Self {
        match self.current {
            Some((_, part_level)) if level <= part_level => Self::default(),
            _ => self,
        }
    }

    fn observe(self, raw: u32) -> Self {
        Self {
            highest: self.highest.max(raw),
            ..self
        }
    }

    /// Continued number for `raw`, or `None` when it leaves the `u32` range.
    fn adjust(&self, raw: u32) -> Option<u32> {
        if self.current.is_some() {
            raw.checked_add(self.offset)
        } else {
            Some(raw)
        }
    }
}

/// In-progress `{{Graphic novel list}}` entry.
#[derive(Debug, Clone, Default)]
struct VolumeDraft {
    number: Option<u32>,
    title: Option<String>,
    japanese_isbn: Option<String>,
    english_isbn: Option<String>,
    japanese_release_date: Option<String>,
    english_release_date: Option<String>,
    media_type: MediaType,
}

fn set_once(slot: &mut Option<String>, value: Option<String>) {
    if slot.is_none() {
        *slot = value.filter(|v| !v.is_empty());
    }
}

fn parse_volume_number(value: &str) -> Option<u32> {
    let digits: String = value
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse::<u32>().ok().filter(|n| *n > 0)
}

impl VolumeDraft {
    fn new(media_type: MediaType) -> Self {
        Self {
            media_type,
            ..Self::default()
        }
    }

    fn with_field(mut self, name: &str, value: String) -> Self {
        match name {
            "volumenumber" => {
                if let Some(n) = parse_volume_number(&value) {
                    self.number = Some(n);
                }
            }
            "isbn" | "originalisbn" => set_once(&mut self.japanese_isbn, clean_isbn(&value)),
            "licensedisbn" => set_once(&mut self.english_isbn, clean_isbn(&value)),
            "reldate" | "originalreldate" => set_once(&mut self.japanese_release_date, Some(value)),
            "licensedreldate" => set_once(&mut self.english_release_date, Some(value)),
            "licensedtitle" | "originaltitle" | "title" => set_once(&mut self.title, Some(value)),
            _ => {}
        }
        self
    }
}

/// Where the scan currently is.
#[derive(Debug, Clone)]
enum Cursor {
    NoSection,
    InSection(Section),
    InVolume { section: Section, draft: VolumeDraft },
}

#[derive(Debug, Clone)]
struct ParserState<'a> {
    main_title: &'a str,
    headings: HeadingStack,
    media_type: MediaType,
    parts: PartState,
    cursor: Cursor,
    finished: Vec<Section>,
}

impl<'a> ParserState<'a> {
    fn new(main_title: &'a str) -> Self {
        Self {
            main_title,
            headings: HeadingStack::default(),
            media_type: MediaType::Unknown,
            parts: PartState::default(),
            cursor: Cursor::NoSection,
            finished: Vec::new(),
        }
    }

    fn step(self, line: &str) -> Self {
        if let Some(heading) = parse_heading(line) {
            return self.on_heading(heading);
        }
        if is_volume_template_open(line) {
            return self.on_volume_open();
        }
        match self.cursor {
            Cursor::InVolume { section, draft } => {
                let draft = match parse_field_line(line) {
                    Some((name, value)) => draft.with_field(&name, value),
                    None => draft,
                };
                Self {
                    cursor: Cursor::InVolume { section, draft },
                    ..self
                }
            }
            _ => self,
        }
    }

    /// Close any open volume, returning the section it belongs to.
    fn close_volume(self) -> (Self, Option<Section>) {
        match self.cursor {
            Cursor::NoSection => (
                Self {
                    cursor: Cursor::NoSection,
                    ..self
                },
                None,
            ),
            Cursor::InSection(section) => (
                Self {
                    cursor: Cursor::NoSection,
                    ..self
                },
                Some(section),
            ),
            Cursor::InVolume { mut section, draft } => {
                let mut parts = self.parts;
                let numbered = draft
                    .number
                    .and_then(|raw| self.parts.adjust(raw).map(|n| (raw, n)));
                if let Some((raw, volume_number)) = numbered {
                    parts = parts.observe(raw);
                    section.volumes.push(Volume {
                        volume_number,
                        title: draft.title,
                        japanese_isbn: draft.japanese_isbn,
                        english_isbn: draft.english_isbn,
                        japanese_release_date: draft.japanese_release_date,
                        english_release_date: draft.english_release_date,
                        media_type: draft.media_type,
                    });
                }
                (
                    Self {
                        parts,
                        cursor: Cursor::NoSection,
                        ..self
                    },
                    Some(section),
                )
            }
        }
    }

    fn on_heading(self, heading: Heading) -> Self {
        let (state, section) = self.close_volume();
        let mut finished = state.finished;
        finished.extend(section);

        let Heading { level, text } = heading;
        let parent = state.headings.parent(level).cloned();
        let context = state
            .headings
            .classification_parent(level)
            .map(|p| p.text.clone());
        let headings = state.headings.with_heading(
            level,
            HeadingSlot {
                text: text.clone(),
                relationship: SeriesRelationship::Main,
            },
        );

        let media_type = headings.media_type();
        let mut parts = if media_type != state.media_type {
            PartState::default()
        } else {
            state.parts
        };
        parts = match PART_RE
            .captures(&text)
            .and_then(|caps| caps[1].parse::<u32>().ok())
        {
            Some(part) => parts.enter(part, level),
            None => parts.after_plain_heading(level),
        };

        let mut relationship = classify_section(&text, state.main_title, context.as_deref());
        if let Some(parent) = parent.as_ref() {
            if relationship.is_main() && !parent.relationship.is_main() {
                relationship = parent.relationship;
            }
        }

        let headings = headings.with_heading(
            level,
            HeadingSlot {
                text: text.clone(),
                relationship,
            },
        );

        Self {
            main_title: state.main_title,
            headings,
            media_type,
            parts,
            cursor: Cursor::InSection(Section::new(text, level, media_type, relationship)),
            finished,
        }
    }

    fn on_volume_open(self) -> Self {
        let (state, section) = self.close_volume();
        let section = section.unwrap_or_else(|| {
            Section::new(
                state.main_title,
                MIN_LEVEL,
                state.media_type,
                SeriesRelationship::Main,
            )
        });
        let draft = VolumeDraft::new(state.media_type);
        Self {
            cursor: Cursor::InVolume { section, draft },
            ..state
        }
    }

    fn finish(self) -> Vec<Section> {
        let (state, section) = self.close_volume();
        let mut finished = state.finished;
        finished.extend(section);
        finished.retain(|s| !s.volumes.is_empty());
        finished
    }
}
