//! Integration tests for whole crawls
//!
//! The HTTP tests use wiremock to serve a paginated listing; the rest drive
//! the coordinator with a scripted fetcher so interruption points are exact.

use crate::common::{create_test_config, listing_page, ScriptedFetcher};
use mcq_harvest::config::ExtractConfig;
use mcq_harvest::crawler::{
    Coordinator, CrawlSettings, Extractor, HttpFetcher, PageFetcher, StartPage, StopFlag,
};
use mcq_harvest::state::{CrawlState, PageResult, PageStatus, RunPhase};
use mcq_harvest::storage::{
    CheckpointStore, JsonCheckpointStore, MemoryCheckpointStore, StorageError, StorageResult,
};
use mcq_harvest::HarvestError;
use std::time::Duration;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(start: StartPage, end_page: u32, checkpoint_interval: u32) -> CrawlSettings {
    CrawlSettings {
        start,
        end_page,
        checkpoint_interval,
        page_delay: Duration::ZERO,
        fresh: false,
        config_hash: None,
    }
}

fn coordinator(
    settings: CrawlSettings,
    fetcher: impl PageFetcher + 'static,
    store: impl CheckpointStore + 'static,
    stop: StopFlag,
) -> Result<Coordinator, HarvestError> {
    Coordinator::new(
        settings,
        Extractor::new(&ExtractConfig::default()).unwrap(),
        Box::new(fetcher),
        Box::new(store),
        stop,
    )
}

/// Mounts pages 1..=end, answering 500 for the pages in `failing`
async fn mount_listing(server: &MockServer, end: u32, per_page: usize, failing: &[u32]) {
    for page in 1..=end {
        let route = if page == 1 {
            "/".to_string()
        } else {
            format!("/page/{}", page)
        };
        let response = if failing.contains(&page) {
            ResponseTemplate::new(500)
        } else {
            ResponseTemplate::new(200)
                .set_body_string(listing_page(page, per_page))
                .insert_header("content-type", "text/html")
        };
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(response)
            .mount(server)
            .await;
    }
}

#[tokio::test]
async fn test_full_crawl_over_http() {
    let server = MockServer::start().await;
    mount_listing(&server, 4, 3, &[]).await;

    let dir = tempdir().unwrap();
    let checkpoint = dir.path().join("data").join("mcqs.json");
    let config = create_test_config(&server.uri(), 4, checkpoint.to_str().unwrap());

    let report = mcq_harvest::crawler::crawl(&config, CrawlSettings::from_config(&config))
        .await
        .expect("Crawl failed");

    assert_eq!(report.phase, RunPhase::Completed);
    assert_eq!(report.pages_attempted, 4);
    assert_eq!(report.records_added, 12);
    assert!(report.failed_pages.is_empty());

    let state = JsonCheckpointStore::new(&checkpoint).load().unwrap();
    assert_eq!(state.len(), 12);
    assert_eq!(state.last_completed_page, 4);
    assert_eq!(state.records[0].prompt(), "Page 1 question 0?");
    assert_eq!(state.records[0].correct_index(), 1);
    assert_eq!(state.records[0].answer(), "Choice 1-0-1");
}

#[tokio::test]
async fn test_failed_page_does_not_stop_crawl() {
    let server = MockServer::start().await;
    mount_listing(&server, 8, 2, &[7]).await;

    let dir = tempdir().unwrap();
    let checkpoint = dir.path().join("mcqs.json");
    let config = create_test_config(&server.uri(), 8, checkpoint.to_str().unwrap());
    let fetcher = HttpFetcher::from_config(&config).unwrap();
    let mut settings = CrawlSettings::from_config(&config);
    settings.start = StartPage::Explicit(6);

    let mut coordinator = coordinator(
        settings,
        fetcher,
        JsonCheckpointStore::new(&checkpoint),
        StopFlag::new(),
    )
    .unwrap();

    assert_eq!(coordinator.process_page(7).await, PageResult::fetch_failed(7));

    let report = coordinator.run().await.unwrap();
    assert_eq!(report.failed_pages, vec![7]);
    assert_eq!(report.pages_attempted, 3);
    assert_eq!(report.records_added, 4);
    assert_eq!(report.last_completed_page, 8);
    assert!(coordinator
        .state()
        .records
        .iter()
        .all(|r| !r.prompt().starts_with("Page 7 ")));
}

#[tokio::test]
async fn test_interrupt_then_resume_matches_single_pass() {
    // Uninterrupted reference run
    let reference = MemoryCheckpointStore::new();
    let mut single = coordinator(
        settings(StartPage::Explicit(1), 10, 5),
        ScriptedFetcher::new(2),
        reference.clone(),
        StopFlag::new(),
    )
    .unwrap();
    single.run().await.unwrap();

    // Same range, stopped while page 5 is in flight
    let store = MemoryCheckpointStore::new();
    let stop = StopFlag::new();
    let mut first = coordinator(
        settings(StartPage::Explicit(1), 10, 5),
        ScriptedFetcher::new(2).stop_at(5, &stop),
        store.clone(),
        stop,
    )
    .unwrap();
    let interrupted = first.run().await.unwrap();

    assert_eq!(interrupted.phase, RunPhase::Interrupted);
    assert_eq!(interrupted.pages_attempted, 5);
    assert_eq!(interrupted.last_completed_page, 5);
    assert_eq!(store.load().unwrap().len(), 10);

    let mut second = coordinator(
        settings(StartPage::FromCheckpoint, 10, 5),
        ScriptedFetcher::new(2),
        store.clone(),
        StopFlag::new(),
    )
    .unwrap();
    let resumed = second.run().await.unwrap();

    assert_eq!(resumed.start_page, 6);
    assert_eq!(resumed.phase, RunPhase::Completed);
    assert_eq!(store.load().unwrap(), reference.load().unwrap());
    assert_eq!(store.bytes(), reference.bytes());
}

#[tokio::test]
async fn test_stop_before_first_page() {
    let store = MemoryCheckpointStore::new();
    let stop = StopFlag::new();
    stop.request();

    let mut coordinator = coordinator(
        settings(StartPage::Explicit(1), 10, 5),
        ScriptedFetcher::new(1),
        store.clone(),
        stop,
    )
    .unwrap();
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.phase, RunPhase::Interrupted);
    assert_eq!(report.pages_attempted, 0);
    assert_eq!(store.save_count(), 1);
    assert!(store.load().unwrap().is_empty());
}

#[tokio::test]
async fn test_stop_during_last_page_completes() {
    let store = MemoryCheckpointStore::new();
    let stop = StopFlag::new();

    let mut coordinator = coordinator(
        settings(StartPage::Explicit(1), 3, 50),
        ScriptedFetcher::new(1).stop_at(3, &stop),
        store.clone(),
        stop,
    )
    .unwrap();
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.phase, RunPhase::Completed);
    assert_eq!(coordinator.phase(), RunPhase::Completed);
    assert_eq!(report.pages_attempted, 3);
    assert_eq!(report.last_completed_page, 3);
    assert_eq!(store.save_count(), 1);
}

#[tokio::test]
async fn test_stop_during_earlier_page_interrupts() {
    let stop = StopFlag::new();

    let mut coordinator = coordinator(
        settings(StartPage::Explicit(1), 3, 50),
        ScriptedFetcher::new(1).stop_at(2, &stop),
        MemoryCheckpointStore::new(),
        stop,
    )
    .unwrap();
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.phase, RunPhase::Interrupted);
    assert_eq!(report.pages_attempted, 2);
}

#[tokio::test(start_paused = true)]
async fn test_page_delay_follows_every_page() {
    let mut settings = settings(StartPage::Explicit(1), 3, 50);
    settings.page_delay = Duration::from_millis(100);

    let mut coordinator = coordinator(
        settings,
        ScriptedFetcher::new(1).failing(&[2]),
        MemoryCheckpointStore::new(),
        StopFlag::new(),
    )
    .unwrap();

    let started = tokio::time::Instant::now();
    let report = coordinator.run().await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(report.failed_pages, vec![2]);
    // One pause per page, the failed one included
    assert!(elapsed >= Duration::from_millis(300), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(400), "elapsed {:?}", elapsed);
}

#[tokio::test]
async fn test_checkpoint_interval_counts_saves() {
    let store = MemoryCheckpointStore::new();
    let mut coordinator = coordinator(
        settings(StartPage::Explicit(1), 120, 50),
        ScriptedFetcher::new(1),
        store.clone(),
        StopFlag::new(),
    )
    .unwrap();

    let report = coordinator.run().await.unwrap();

    assert_eq!(report.checkpoints_written, 3);
    assert_eq!(store.save_count(), 3);
    assert_eq!(store.load().unwrap().len(), 120);
}

#[tokio::test]
async fn test_corrupt_checkpoint_is_fatal() {
    let dir = tempdir().unwrap();
    let checkpoint = dir.path().join("mcqs.json");
    std::fs::write(&checkpoint, "{\"format_version\": 1, \"records\": [tru").unwrap();

    let result = coordinator(
        settings(StartPage::Explicit(1), 3, 50),
        ScriptedFetcher::new(1),
        JsonCheckpointStore::new(&checkpoint),
        StopFlag::new(),
    );

    match result {
        Err(HarvestError::Storage(e)) => assert!(e.is_corruption()),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("corrupt checkpoint was accepted"),
    }
    // The broken file is left for inspection
    assert_eq!(
        std::fs::read_to_string(&checkpoint).unwrap(),
        "{\"format_version\": 1, \"records\": [tru"
    );
}

#[tokio::test]
async fn test_newer_format_is_fatal() {
    let store = MemoryCheckpointStore::with_bytes(
        r#"{"format_version": 99, "last_completed_page": 3, "records": []}"#,
    );

    let result = coordinator(
        settings(StartPage::Explicit(1), 3, 50),
        ScriptedFetcher::new(1),
        store,
        StopFlag::new(),
    );

    assert!(matches!(
        result,
        Err(HarvestError::Storage(StorageError::UnsupportedVersion { found: 99, .. }))
    ));
}

#[tokio::test]
async fn test_fresh_ignores_corrupt_checkpoint() {
    let dir = tempdir().unwrap();
    let checkpoint = dir.path().join("mcqs.json");
    std::fs::write(&checkpoint, "not json at all").unwrap();

    let mut settings = settings(StartPage::Explicit(1), 2, 50);
    settings.fresh = true;
    let mut coordinator = coordinator(
        settings,
        ScriptedFetcher::new(2),
        JsonCheckpointStore::new(&checkpoint),
        StopFlag::new(),
    )
    .unwrap();
    coordinator.run().await.unwrap();

    let state = JsonCheckpointStore::new(&checkpoint).load().unwrap();
    assert_eq!(state.len(), 4);
    assert_eq!(state.last_completed_page, 2);
}

#[tokio::test]
async fn test_legacy_array_checkpoint_resumes_with_explicit_start() {
    let legacy = r#"[
        {"question": "Old one?", "options": ["a", "b", "c", "d"], "correctAnswer": 3}
    ]"#;
    let store = MemoryCheckpointStore::with_bytes(legacy);

    let mut coordinator = coordinator(
        settings(StartPage::Explicit(54), 55, 50),
        ScriptedFetcher::new(1),
        store.clone(),
        StopFlag::new(),
    )
    .unwrap();
    let report = coordinator.run().await.unwrap();

    let state = store.load().unwrap();
    assert_eq!(report.records_added, 2);
    assert_eq!(state.len(), 3);
    assert_eq!(state.records[0].prompt(), "Old one?");
    assert_eq!(state.last_completed_page, 55);
}

#[tokio::test]
async fn test_legacy_array_checkpoint_resume_restarts_at_first_page() {
    let legacy = r#"[
        {"question": "Old one?", "options": ["a", "b", "c", "d"], "correctAnswer": 3}
    ]"#;
    let store = MemoryCheckpointStore::with_bytes(legacy);

    let mut coordinator = coordinator(
        settings(StartPage::FromCheckpoint, 2, 50),
        ScriptedFetcher::new(1),
        store.clone(),
        StopFlag::new(),
    )
    .unwrap();

    assert!(coordinator.state().has_untracked_records());
    assert_eq!(coordinator.resolve_start(), 1);

    let report = coordinator.run().await.unwrap();
    assert_eq!(report.start_page, 1);
    assert!(!store.load().unwrap().has_untracked_records());
}

#[tokio::test]
async fn test_resumed_run_past_end_changes_nothing() {
    let dir = tempdir().unwrap();
    let checkpoint = dir.path().join("mcqs.json");

    let mut first = coordinator(
        settings(StartPage::Explicit(1), 3, 50),
        ScriptedFetcher::new(2),
        JsonCheckpointStore::new(&checkpoint),
        StopFlag::new(),
    )
    .unwrap();
    first.run().await.unwrap();
    let before = std::fs::read(&checkpoint).unwrap();

    let mut second = coordinator(
        settings(StartPage::FromCheckpoint, 3, 50),
        ScriptedFetcher::new(2),
        JsonCheckpointStore::new(&checkpoint),
        StopFlag::new(),
    )
    .unwrap();
    let report = second.run().await.unwrap();

    assert_eq!(report.pages_attempted, 0);
    assert_eq!(std::fs::read(&checkpoint).unwrap(), before);
}

#[tokio::test]
async fn test_failed_last_page_is_not_progress() {
    let store = MemoryCheckpointStore::new();
    let mut coordinator = coordinator(
        settings(StartPage::Explicit(1), 3, 50),
        ScriptedFetcher::new(1).failing(&[3]),
        store.clone(),
        StopFlag::new(),
    )
    .unwrap();
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.phase, RunPhase::Completed);
    assert_eq!(report.failed_pages, vec![3]);
    assert_eq!(store.load().unwrap().last_completed_page, 2);
}

#[tokio::test]
async fn test_empty_pages_advance_progress() {
    struct BlankFetcher;

    #[async_trait::async_trait]
    impl PageFetcher for BlankFetcher {
        async fn fetch(&self, _page_index: u32) -> Result<String, mcq_harvest::crawler::FetchFailure> {
            Ok("<html><body><p>Nothing here</p></body></html>".to_string())
        }

        fn describe_page(&self, page_index: u32) -> String {
            format!("blank://{}", page_index)
        }
    }

    let store = MemoryCheckpointStore::new();
    let mut coordinator = coordinator(
        settings(StartPage::Explicit(1), 3, 50),
        BlankFetcher,
        store.clone(),
        StopFlag::new(),
    )
    .unwrap();
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.empty_pages, 3);
    assert_eq!(report.records_added, 0);
    assert_eq!(store.load().unwrap().last_completed_page, 3);
    assert_eq!(coordinator.process_page(1).await.status, PageStatus::ParseEmpty);
}

/// Fails the first `failures` saves, then behaves like the inner store
struct FlakyStore {
    inner: MemoryCheckpointStore,
    failures: usize,
}

impl CheckpointStore for FlakyStore {
    fn load(&self) -> StorageResult<CrawlState> {
        self.inner.load()
    }

    fn save(&mut self, state: &CrawlState) -> StorageResult<()> {
        if self.failures > 0 {
            self.failures -= 1;
            return Err(StorageError::Io {
                path: "flaky".into(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            });
        }
        self.inner.save(state)
    }

    fn describe(&self) -> String {
        "flaky".to_string()
    }
}

#[tokio::test]
async fn test_intermediate_save_failure_continues() {
    let inner = MemoryCheckpointStore::new();
    let store = FlakyStore {
        inner: inner.clone(),
        failures: 1,
    };

    let mut coordinator = coordinator(
        settings(StartPage::Explicit(1), 4, 2),
        ScriptedFetcher::new(1),
        store,
        StopFlag::new(),
    )
    .unwrap();
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.phase, RunPhase::Completed);
    assert_eq!(report.checkpoints_written, 2);
    assert_eq!(inner.save_count(), 2);
    assert_eq!(inner.load().unwrap().len(), 4);
}

#[tokio::test]
async fn test_final_save_failure_is_fatal() {
    let store = MemoryCheckpointStore::new();
    store.set_failing(true);

    let mut coordinator = coordinator(
        settings(StartPage::Explicit(1), 2, 50),
        ScriptedFetcher::new(1),
        store.clone(),
        StopFlag::new(),
    )
    .unwrap();
    let result = coordinator.run().await;

    assert!(matches!(result, Err(HarvestError::Storage(_))));
    assert_eq!(coordinator.phase(), RunPhase::FatalError);
    assert_eq!(coordinator.state().len(), 2);
}
