use std::time::Duration;

use anyhow::Result;
use core_test_support::RecordedSearch;
use core_test_support::start_search;
use pretty_assertions::assert_eq;
use songsearch_core::SearchConfig;
use songsearch_core::protocol::BackendCorrelationId;
use songsearch_core::protocol::SearchMode;
use songsearch_core::protocol::SearchRequestId;
use tokio::time::sleep;

#[tokio::test(start_paused = true)]
async fn search_is_dispatched_after_quiet_period() -> Result<()> {
    let search = start_search(SearchConfig::default())?;
    let handle = search.service.handle();

    let origin = handle.search_async("daft punk", SearchMode::Artists)?;
    assert_eq!(origin, SearchRequestId(1));

    sleep(Duration::from_millis(150)).await;
    assert!(search.provider.calls().is_empty());

    sleep(Duration::from_millis(100)).await;
    assert_eq!(
        search.provider.calls(),
        vec![RecordedSearch {
            correlation_id: BackendCorrelationId(1),
            query: "daft punk".to_string(),
            mode: SearchMode::Artists,
        }]
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn only_last_query_for_origin_reaches_backend() -> Result<()> {
    let search = start_search(SearchConfig::default())?;
    let handle = search.service.handle();

    let origin = handle.search_async("d", SearchMode::Songs)?;
    for query in ["da", "daf", "daft"] {
        sleep(Duration::from_millis(120)).await;
        handle.update_search(origin, query, SearchMode::Songs)?;
    }
    handle.update_search(origin, "daft punk", SearchMode::Albums)?;

    // Each update restarted the timer, so nothing has fired yet.
    sleep(Duration::from_millis(150)).await;
    assert!(search.provider.calls().is_empty());

    sleep(Duration::from_millis(100)).await;
    let calls = search.provider.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].query, "daft punk");
    assert_eq!(calls[0].mode, SearchMode::Albums);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn cancel_before_quiet_period_prevents_dispatch() -> Result<()> {
    let search = start_search(SearchConfig::default())?;
    let handle = search.service.handle();

    let cancelled = handle.search_async("daft", SearchMode::Songs)?;
    let kept = handle.search_async("justice", SearchMode::Songs)?;
    sleep(Duration::from_millis(100)).await;
    handle.cancel_search(cancelled)?;

    sleep(Duration::from_millis(500)).await;
    let calls = search.provider.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].query, "justice");
    assert_ne!(cancelled, kept);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn cancel_of_unknown_origin_is_harmless() -> Result<()> {
    let search = start_search(SearchConfig::default())?;
    let handle = search.service.handle();

    handle.cancel_search(SearchRequestId(404))?;
    handle.search_async("daft", SearchMode::Songs)?;

    sleep(Duration::from_millis(250)).await;
    assert_eq!(search.provider.calls().len(), 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn custom_quiet_period_is_honoured() -> Result<()> {
    let search = start_search(SearchConfig {
        debounce_ms: 50,
        ..Default::default()
    })?;
    let handle = search.service.handle();

    handle.search_async("daft", SearchMode::Songs)?;
    sleep(Duration::from_millis(60)).await;
    assert_eq!(search.provider.calls().len(), 1);
    Ok(())
}
