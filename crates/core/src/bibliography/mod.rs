//! Volume bibliography extraction from wiki markup.
//!
//! Turns a volume-list page into typed sections and volumes, classifies how
//! each section relates to the main series, and assembles the final series
//! records.

mod assembler;
mod classifier;
mod isbn;
mod markup;
mod media_type;
mod normalizer;
mod section_parser;
mod types;

pub use assembler::{assemble_all_series, assemble_series, series_title_from_page, PageRef};
pub use classifier::{classify_section, main_series_first_word};
pub use isbn::{clean_isbn, convert_isbn10_to_13, is_valid_isbn13};
pub use markup::{
    clean_field_value, extract_series_metadata, transclusion_target, SeriesMetadata,
};
pub use media_type::detect_media_type;
pub use normalizer::{dedupe_volumes, filter_spinoff_titles, merge_volume_lists, normalize_section};
pub use section_parser::{parse_sections, total_volume_count};
pub use types::*;
