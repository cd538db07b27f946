//! Volume deduplication, ordering and spin-off filtering.

use std::collections::HashMap;

use super::classifier::matches_spinoff_lexicon;
use super::types::{MediaType, Section, Volume};

/// Deduplicate volumes by (media type, volume number).
///
/// On a collision the first-seen volume is kept, unless the newcomer carries
/// an English ISBN and the kept one does not. The result is ordered manga
/// first, then light novels, then everything else, and by ascending volume
/// number within each media type.
pub fn dedupe_volumes(volumes: Vec<Volume>) -> Vec<Volume> {
    let mut by_key: HashMap<(MediaType, u32), Volume> = HashMap::new();

    for volume in volumes {
        let key = (volume.media_type, volume.volume_number);
        match by_key.get_mut(&key) {
            Some(existing) => {
                if existing.english_isbn.is_none() && volume.english_isbn.is_some() {
                    *existing = volume;
                }
            }
            None => {
                by_key.insert(key, volume);
            }
        }
    }

    let mut results: Vec<Volume> = by_key.into_values().collect();
    results.sort_by_key(|v| (v.media_type.sort_rank(), v.volume_number));
    results
}

/// Merge several volume lists into one ordered, deduplicated list.
pub fn merge_volume_lists<I>(lists: I) -> Vec<Volume>
where
    I: IntoIterator<Item = Vec<Volume>>,
{
    dedupe_volumes(lists.into_iter().flatten().collect())
}

/// Deduplicate and order the volumes of a single section.
pub fn normalize_section(section: Section) -> Section {
    Section {
        volumes: dedupe_volumes(section.volumes),
        ..section
    }
}

/// Drop volumes whose own title marks them as side material (fan books, anthologies, ...).
pub fn filter_spinoff_titles(volumes: Vec<Volume>) -> Vec<Volume> {
    volumes
        .into_iter()
        .filter(|v| {
            v.title
                .as_deref()
                .map(|t| !matches_spinoff_lexicon(t))
                .unwrap_or(true)
        })
        .collect()
}
