//! Series lookup integration tests.
//!
//! These tests run the whole lookup against an in-memory wiki:
//! - Page selection across candidate titles
//! - Section parsing, classification and volume renumbering
//! - Assembly into main and related series
//! - Caching of raw pages and parsed results

use std::sync::Arc;

use chrono::Duration;
use tempfile::TempDir;

use volumewiki_core::{
    testing::{fixtures, MockWikiSource},
    CachedWikiSource, DiskCache, MediaType, PageSelector, SelectorConfig, SeriesLookup,
    SeriesRelationship, WikiError,
};

/// Test helper wiring a mock wiki into a lookup.
struct TestHarness {
    source: Arc<MockWikiSource>,
    lookup: SeriesLookup,
}

impl TestHarness {
    fn new() -> Self {
        let source = Arc::new(MockWikiSource::new());
        let lookup = SeriesLookup::new(
            source.clone(),
            PageSelector::new(SelectorConfig::default(), 10),
        );
        Self { source, lookup }
    }

    async fn with_page(self, search_results: &[&str], title: &str, markup: &str) -> Self {
        self.source
            .set_search_results(search_results.iter().map(|s| s.to_string()).collect())
            .await;
        self.source.add_page(title, markup).await;
        self
    }
}

fn manga_and_light_novel_page() -> String {
    let mut markup = String::from("==Manga==\n");
    for n in 1..=3 {
        let isbn = fixtures::isbn13_for(n);
        let mut fields = vec![("OriginalISBN", isbn.as_str())];
        if n % 2 == 1 {
            fields.push(("LicensedISBN", "978-1-56931-901-7"));
        }
        markup.push_str(&fixtures::volume_template(n, &fields));
    }
    markup.push_str("==Light novels==\n");
    markup.push_str(&fixtures::volume_templates(1..=2));
    markup
}

#[tokio::test]
async fn test_light_novels_become_adaptation() {
    let harness = TestHarness::new()
        .with_page(
            &["Kaguya-sama (manga)"],
            "List of Kaguya-sama chapters",
            &manga_and_light_novel_page(),
        )
        .await;

    let series = harness
        .lookup
        .get_series("Kaguya-sama")
        .await
        .unwrap()
        .expect("series should be found");

    assert_eq!(series.title, "Kaguya-sama");
    assert_eq!(series.media_type, MediaType::Manga);
    assert_eq!(series.total_volumes, 3);
    let numbers: Vec<u32> = series.volumes.iter().map(|v| v.volume_number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    assert!(series.volumes[0].english_isbn.is_some());
    assert!(series.volumes[1].english_isbn.is_none());

    let related = series.related_series.expect("light novels should be related");
    assert_eq!(related.len(), 1);
    assert_eq!(related[0].relationship, SeriesRelationship::Adaptation);
    assert_eq!(related[0].media_type, MediaType::LightNovel);
    assert_eq!(related[0].volumes.len(), 2);
    assert_eq!(related[0].title, "Kaguya-sama (light novel)");
}

#[tokio::test]
async fn test_parts_and_nested_spinoff() {
    let markup = format!(
        "==Media==\n===Light novels===\n{}{}{}",
        fixtures::volume_section("Part 1", 4, 1..=3),
        fixtures::volume_section("Part 2", 4, 1..=2),
        fixtures::volume_section("Hannelore's Fifth Year", 4, 1..=2),
    );
    let harness = TestHarness::new()
        .with_page(&["Ascendance of a Bookworm"], "Ascendance of a Bookworm", &markup)
        .await;

    let series = harness
        .lookup
        .get_series("Ascendance of a Bookworm")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(series.media_type, MediaType::LightNovel);
    let numbers: Vec<u32> = series.volumes.iter().map(|v| v.volume_number).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4, 5]);

    let related = series.related_series.unwrap();
    assert_eq!(related.len(), 1);
    assert_eq!(related[0].title, "Hannelore's Fifth Year");
    assert_eq!(related[0].relationship, SeriesRelationship::Spinoff);
    let spinoff_numbers: Vec<u32> = related[0].volumes.iter().map(|v| v.volume_number).collect();
    assert_eq!(spinoff_numbers, vec![1, 2]);
}

#[tokio::test]
async fn test_all_series_lists_related_as_standalone() {
    let harness = TestHarness::new()
        .with_page(
            &["Kaguya-sama (manga)"],
            "List of Kaguya-sama chapters",
            &manga_and_light_novel_page(),
        )
        .await;

    let all = harness
        .lookup
        .get_all_series_from_page("Kaguya-sama")
        .await
        .unwrap();

    assert_eq!(all.len(), 2);
    assert_eq!(all[0].media_type, MediaType::Manga);
    assert_eq!(all[1].media_type, MediaType::LightNovel);
    assert_eq!(all[1].total_volumes, 2);
    assert!(!all[1].is_complete);
}

#[tokio::test]
async fn test_early_exit_skips_remaining_candidates() {
    let harness = TestHarness::new()
        .with_page(
            &["One Punch-Man"],
            "List of One Punch-Man chapters",
            &format!(
                "{}{}",
                fixtures::infobox("One", None),
                fixtures::volume_section("Volume list", 2, 1..=30)
            ),
        )
        .await;
    harness
        .source
        .add_page(
            "List of One Punch-Man manga volumes",
            &fixtures::volume_section("Volume list", 2, 1..=31),
        )
        .await;

    let series = harness.lookup.get_series("One Punch-Man").await.unwrap().unwrap();

    assert_eq!(series.total_volumes, 30);
    assert_eq!(
        harness.source.fetched_titles().await,
        vec!["List of One Punch-Man chapters".to_string()]
    );
}

#[tokio::test]
async fn test_transcluded_volume_pages() {
    let harness = TestHarness::new()
        .with_page(
            &["Detective Conan", "List of Detective Conan volumes"],
            "List of Detective Conan volumes",
            "==Volume list==\n{{:List of Detective Conan volumes (1–20)}}\n{{:List of Detective Conan volumes (21–40)}}\n",
        )
        .await;
    harness
        .source
        .add_page(
            "List of Detective Conan volumes (1–20)",
            &fixtures::volume_templates(1..=20),
        )
        .await;
    harness
        .source
        .add_page(
            "List of Detective Conan volumes (21–40)",
            &fixtures::volume_templates(21..=40),
        )
        .await;

    let series = harness.lookup.get_series("Detective Conan").await.unwrap().unwrap();

    assert_eq!(series.title, "Detective Conan");
    assert_eq!(series.total_volumes, 40);
    assert_eq!(series.volumes.last().map(|v| v.volume_number), Some(40));
}

#[tokio::test]
async fn test_redirected_page_keeps_canonical_title() {
    let harness = TestHarness::new()
        .with_page(
            &["Kimetsu no Yaiba"],
            "List of Demon Slayer: Kimetsu no Yaiba chapters",
            &fixtures::volume_section("Volume list", 2, 1..=23),
        )
        .await;
    harness
        .source
        .add_redirect(
            "List of Kimetsu no Yaiba chapters",
            "List of Demon Slayer: Kimetsu no Yaiba chapters",
        )
        .await;

    let series = harness.lookup.get_series("Kimetsu no Yaiba").await.unwrap().unwrap();

    assert_eq!(series.title, "Demon Slayer: Kimetsu no Yaiba");
    assert_eq!(series.total_volumes, 23);
}

#[tokio::test]
async fn test_transport_errors_propagate() {
    let harness = TestHarness::new();
    harness
        .source
        .set_next_error(WikiError::Api {
            status: 500,
            message: "boom".to_string(),
        })
        .await;

    let result = harness.lookup.get_series("Naruto").await;
    assert!(matches!(result, Err(WikiError::Api { status: 500, .. })));
}

#[tokio::test]
async fn test_cached_source_and_parsed_cache() {
    let dir = TempDir::new().unwrap();
    let mock = MockWikiSource::new();
    mock.set_search_results(vec!["Bakuman".to_string()]).await;
    mock.add_page(
        "List of Bakuman chapters",
        &format!(
            "{}{}",
            fixtures::infobox("Tsugumi Ohba", Some("2012")),
            fixtures::volume_section("Volume list", 2, 1..=20)
        ),
    )
    .await;

    let cache = DiskCache::new(dir.path(), Duration::hours(1));
    let source = Arc::new(CachedWikiSource::new(mock, cache));
    let lookup = SeriesLookup::new(
        source.clone(),
        PageSelector::new(SelectorConfig::default(), 10),
    );

    let series = lookup.get_series("Bakuman").await.unwrap().unwrap();
    assert_eq!(series.total_volumes, 20);

    // A second lookup without the parsed cache is served from raw page entries.
    let uncached_parse = SeriesLookup::new(
        source.clone(),
        PageSelector::new(SelectorConfig::default(), 10),
    );
    let again = uncached_parse.get_series("Bakuman").await.unwrap().unwrap();
    assert_eq!(again, series);
    assert_eq!(source.inner().search_count().await, 1);
    assert_eq!(source.inner().fetched_titles().await.len(), 1);
}

#[test]
fn test_not_found_is_none_not_error() {
    let harness = TestHarness::new();
    let series = tokio_test::block_on(harness.lookup.get_series("Nothing at all")).unwrap();
    assert!(series.is_none());
}
