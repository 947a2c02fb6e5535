use std::time::Duration;

use anyhow::Result;
use core_test_support::FakeImageLoader;
use core_test_support::FakeProvider;
use core_test_support::song;
use core_test_support::songs;
use core_test_support::start_search;
use pretty_assertions::assert_eq;
use songsearch_core::SearchConfig;
use songsearch_core::SearchService;
use songsearch_core::SearchServiceError;
use songsearch_core::protocol::ProviderInfo;
use songsearch_core::protocol::SearchMode;
use songsearch_core::protocol::SearchResult;
use songsearch_core::reply_channel;
use tokio::time::sleep;

#[tokio::test]
async fn handle_reports_provider_and_cache_capacity() -> Result<()> {
    let search = start_search(SearchConfig {
        thumbnail_cache_capacity: 64,
        ..Default::default()
    })?;
    let handle = search.service.handle();

    assert_eq!(handle.provider(), &ProviderInfo::new("Tidal", "tidal"));
    let stats = handle.cache_stats();
    assert_eq!(stats.capacity, 64);
    assert_eq!(stats.size, 0);
    Ok(())
}

#[tokio::test]
async fn load_tracks_preserves_result_order() -> Result<()> {
    let search = start_search(SearchConfig::default())?;
    let handle = search.service.handle();

    let results: Vec<SearchResult> = songs(3).into_iter().map(SearchResult::new).collect();
    let Some(selection) = handle.load_tracks(&results) else {
        anyhow::bail!("non-empty results should produce a selection");
    };
    assert_eq!(selection.songs, songs(3));
    assert_eq!(
        selection.urls,
        vec![song(0).url, song(1).url, song(2).url]
    );

    assert!(handle.load_tracks(&[]).is_none());
    Ok(())
}

#[tokio::test]
async fn invalid_config_is_rejected_before_spawning() {
    let (_replies, replies_rx) = reply_channel();
    let config = SearchConfig {
        debounce_ms: 0,
        ..Default::default()
    };

    let err = SearchService::spawn(
        config,
        FakeProvider::default(),
        FakeImageLoader::default(),
        replies_rx,
    )
    .err();
    assert!(matches!(err, Some(SearchServiceError::InvalidConfig(_))));
}

#[tokio::test(start_paused = true)]
async fn calls_after_shutdown_report_closed_service() -> Result<()> {
    let search = start_search(SearchConfig::default())?;
    let handle = search.service.handle();
    let origin = handle.search_async("daft", SearchMode::Songs)?;

    search.service.shutdown().await;

    assert!(matches!(
        handle.search_async("justice", SearchMode::Songs),
        Err(SearchServiceError::ServiceClosed)
    ));
    assert!(matches!(
        handle.cancel_search(origin),
        Err(SearchServiceError::ServiceClosed)
    ));
    assert!(matches!(
        handle.load_art_async(&SearchResult::new(song(1))),
        Err(SearchServiceError::ServiceClosed)
    ));

    // The debounced search was dropped with the service.
    sleep(Duration::from_millis(500)).await;
    assert!(search.provider.calls().is_empty());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn service_keeps_running_after_reply_senders_drop() -> Result<()> {
    let TestParts {
        mut service,
        provider,
    } = spawn_without_replies()?;
    let handle = service.handle();

    handle.search_async("daft", SearchMode::Songs)?;
    sleep(Duration::from_millis(250)).await;
    assert_eq!(provider.calls().len(), 1);
    assert!(service.try_next_event().is_none());
    service.shutdown().await;
    Ok(())
}

struct TestParts {
    service: SearchService,
    provider: FakeProvider,
}

fn spawn_without_replies() -> Result<TestParts> {
    let provider = FakeProvider::default();
    let (replies, replies_rx) = reply_channel();
    drop(replies);
    let service = SearchService::spawn(
        SearchConfig::default(),
        provider.clone(),
        FakeImageLoader::default(),
        replies_rx,
    )?;
    Ok(TestParts { service, provider })
}
