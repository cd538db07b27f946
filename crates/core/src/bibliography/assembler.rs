//! Composition of parsed sections into series records.

use super::markup::SeriesMetadata;
use super::media_type::detect_media_type;
use super::normalizer::{filter_spinoff_titles, merge_volume_lists, normalize_section};
use super::types::{MediaType, RelatedSeries, Section, Series, SeriesRelationship, Volume};

/// Page prefixes and suffixes that are not part of the series name.
const TITLE_PREFIX: &str = "list of ";
const TITLE_SUFFIXES: &[&str] = &[
    " chapters",
    " manga volumes",
    " light novel volumes",
    " volumes",
    " light novels",
    " (japanese manga)",
    " (manga)",
];

/// Identity of the page the sections were parsed from.
#[derive(Debug, Clone, Copy)]
pub struct PageRef<'a> {
    pub title: &'a str,
    pub page_id: u64,
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let cut = prefix.len();
    if text.len() < cut || !text.is_char_boundary(cut) {
        return None;
    }
    text[..cut]
        .eq_ignore_ascii_case(prefix)
        .then(|| &text[cut..])
}

fn strip_suffix_ignore_case<'a>(text: &'a str, suffix: &str) -> Option<&'a str> {
    let cut = text.len().checked_sub(suffix.len())?;
    if !text.is_char_boundary(cut) {
        return None;
    }
    text[cut..]
        .eq_ignore_ascii_case(suffix)
        .then(|| &text[..cut])
}

/// Derive the series name from a page title ("List of X chapters" -> "X").
pub fn series_title_from_page(page_title: &str) -> String {
    let mut title = page_title.trim();
    if let Some(rest) = strip_prefix_ignore_case(title, TITLE_PREFIX) {
        title = rest;
    }

    while let Some(rest) = TITLE_SUFFIXES
        .iter()
        .find_map(|suffix| strip_suffix_ignore_case(title, suffix))
    {
        title = rest.trim_end();
    }

    title.to_string()
}

fn media_label(media_type: MediaType) -> &'static str {
    match media_type {
        MediaType::Manga => "manga",
        MediaType::LightNovel => "light novel",
        MediaType::Unknown => "other",
    }
}

/// Volumes whose media type could not be told from the headings inherit the page's.
fn resolve_media_type(section: Section, default: MediaType) -> Section {
    if section.media_type != MediaType::Unknown {
        return section;
    }
    let volumes = section
        .volumes
        .into_iter()
        .map(|v| Volume {
            media_type: if v.media_type == MediaType::Unknown {
                default
            } else {
                v.media_type
            },
            ..v
        })
        .collect();
    Section {
        media_type: default,
        volumes,
        ..section
    }
}

struct Assembly {
    title: String,
    media_type: MediaType,
    volumes: Vec<Volume>,
    related: Vec<RelatedSeries>,
}

fn assemble(page: PageRef<'_>, sections: Vec<Section>) -> Option<Assembly> {
    let default_media = match detect_media_type(page.title) {
        MediaType::Unknown => MediaType::Manga,
        detected => detected,
    };

    let (main_sections, other_sections): (Vec<Section>, Vec<Section>) = sections
        .into_iter()
        .map(|s| normalize_section(resolve_media_type(s, default_media)))
        .partition(|s| s.relationship.is_main());

    // Main volumes, split by media type; the largest group is the series itself.
    let main_volumes = merge_volume_lists(main_sections.into_iter().map(|s| s.volumes));
    let mut by_media: Vec<(MediaType, Vec<Volume>)> = Vec::new();
    for volume in main_volumes {
        match by_media.iter_mut().find(|(m, _)| *m == volume.media_type) {
            Some((_, list)) => list.push(volume),
            None => by_media.push((volume.media_type, vec![volume])),
        }
    }
    // Stable sort: ties keep manga before light novels.
    by_media.sort_by(|a, b| b.1.len().cmp(&a.1.len()));

    let mut related: Vec<RelatedSeries> = Vec::new();
    for section in other_sections {
        match related
            .iter_mut()
            .find(|r| r.title == section.name && r.relationship == section.relationship)
        {
            Some(existing) => {
                let merged =
                    merge_volume_lists([std::mem::take(&mut existing.volumes), section.volumes]);
                existing.volumes = merged;
            }
            None => related.push(RelatedSeries {
                title: section.name,
                relationship: section.relationship,
                volumes: section.volumes,
                media_type: section.media_type,
            }),
        }
    }

    let base_title = series_title_from_page(page.title);
    let mut groups = by_media.into_iter();

    let (title, media_type, volumes) = match groups.next() {
        Some((media_type, volumes)) => (base_title.clone(), media_type, volumes),
        None => {
            // Nothing classified as main: promote the largest related group.
            let idx = related
                .iter()
                .enumerate()
                .max_by(|(ia, a), (ib, b)| a.volumes.len().cmp(&b.volumes.len()).then(ib.cmp(ia)))
                .map(|(i, _)| i)?;
            let promoted = related.remove(idx);
            (promoted.title, promoted.media_type, promoted.volumes)
        }
    };

    for (other_media, volumes) in groups {
        related.push(RelatedSeries {
            title: format!("{} ({})", base_title, media_label(other_media)),
            relationship: SeriesRelationship::Adaptation,
            volumes,
            media_type: other_media,
        });
    }

    Some(Assembly {
        title,
        media_type,
        volumes: filter_spinoff_titles(volumes),
        related,
    })
}

/// Build the main series record, with every other group attached as related series.
///
/// Returns `None` when the sections hold no volumes at all.
pub fn assemble_series(
    page: PageRef<'_>,
    sections: Vec<Section>,
    metadata: &SeriesMetadata,
) -> Option<Series> {
    let assembly = assemble(page, sections)?;
    Some(Series {
        title: assembly.title,
        page_id: page.page_id,
        total_volumes: assembly.volumes.len(),
        volumes: assembly.volumes,
        is_complete: metadata.is_complete,
        media_type: assembly.media_type,
        author: metadata.author.clone(),
        related_series: (!assembly.related.is_empty()).then_some(assembly.related),
    })
}

/// Build the main series followed by each related series as a standalone record.
pub fn assemble_all_series(
    page: PageRef<'_>,
    sections: Vec<Section>,
    metadata: &SeriesMetadata,
) -> Vec<Series> {
    let Some(main) = assemble_series(page, sections, metadata) else {
        return Vec::new();
    };

    let related: Vec<Series> = main
        .related_series
        .iter()
        .flatten()
        .map(|r| Series {
            title: r.title.clone(),
            page_id: page.page_id,
            volumes: r.volumes.clone(),
            total_volumes: r.volumes.len(),
            is_complete: false,
            media_type: r.media_type,
            author: None,
            related_series: None,
        })
        .collect();

    std::iter::once(main).chain(related).collect()
}
