use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::Duration;

use image::DynamicImage;
use image::Rgba;
use image::RgbaImage;
use songsearch_core::ImageLoader;
use songsearch_core::ReplySender;
use songsearch_core::ScaleOptions;
use songsearch_core::SearchConfig;
use songsearch_core::SearchProvider;
use songsearch_core::SearchService;
use songsearch_core::protocol::BackendCorrelationId;
use songsearch_core::protocol::LoaderId;
use songsearch_core::protocol::ProviderInfo;
use songsearch_core::protocol::SearchEvent;
use songsearch_core::protocol::SearchMode;
use songsearch_core::protocol::Song;
use songsearch_core::reply_channel;
use url::Url;

const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedSearch {
    pub correlation_id: BackendCorrelationId,
    pub query: String,
    pub mode: SearchMode,
}

/// Provider that records every dispatched query and never replies on its own.
#[derive(Clone, Default)]
pub struct FakeProvider {
    calls: Arc<Mutex<Vec<RecordedSearch>>>,
}

impl FakeProvider {
    pub fn calls(&self) -> Vec<RecordedSearch> {
        lock(&self.calls).clone()
    }
}

impl SearchProvider for FakeProvider {
    fn info(&self) -> ProviderInfo {
        ProviderInfo::new("Tidal", "tidal")
    }

    fn search(&mut self, query: &str, mode: SearchMode) -> BackendCorrelationId {
        let mut calls = lock(&self.calls);
        let correlation_id = BackendCorrelationId(calls.len() as u64 + 1);
        calls.push(RecordedSearch {
            correlation_id,
            query: query.to_string(),
            mode,
        });
        correlation_id
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedFetch {
    pub loader_id: LoaderId,
    /// Url the image would have been fetched from.
    pub url: Url,
}

/// Image subsystem fake. Loader ids start at 1000 so they never line up with
/// art request ids by accident.
#[derive(Clone, Default)]
pub struct FakeImageLoader {
    fetches: Arc<Mutex<Vec<RecordedFetch>>>,
}

impl FakeImageLoader {
    pub fn fetches(&self) -> Vec<RecordedFetch> {
        lock(&self.fetches).clone()
    }
}

impl ImageLoader for FakeImageLoader {
    fn load_image_async(&mut self, _options: &ScaleOptions, metadata: &Song) -> LoaderId {
        let mut fetches = lock(&self.fetches);
        let loader_id = LoaderId(1000 + fetches.len() as u64);
        fetches.push(RecordedFetch {
            loader_id,
            url: metadata.art_source().clone(),
        });
        loader_id
    }
}

/// A running service wired to the fakes.
pub struct TestSearch {
    pub service: SearchService,
    pub provider: FakeProvider,
    pub images: FakeImageLoader,
    pub replies: ReplySender,
}

pub fn start_search(config: SearchConfig) -> anyhow::Result<TestSearch> {
    let provider = FakeProvider::default();
    let images = FakeImageLoader::default();
    let (replies, replies_rx) = reply_channel();
    let service = SearchService::spawn(config, provider.clone(), images.clone(), replies_rx)?;
    Ok(TestSearch {
        service,
        provider,
        images,
        replies,
    })
}

/// Waits for the next event, failing after a generous timeout.
pub async fn next_event(search: &mut TestSearch) -> anyhow::Result<SearchEvent> {
    match tokio::time::timeout(EVENT_TIMEOUT, search.service.next_event()).await {
        Ok(Some(event)) => Ok(event),
        Ok(None) => anyhow::bail!("search service closed its event stream"),
        Err(_) => anyhow::bail!("timed out waiting for a search event"),
    }
}

/// Skips events until `predicate` matches.
pub async fn wait_for_event<F>(
    search: &mut TestSearch,
    mut predicate: F,
) -> anyhow::Result<SearchEvent>
where
    F: FnMut(&SearchEvent) -> bool,
{
    loop {
        let event = next_event(search).await?;
        if predicate(&event) {
            return Ok(event);
        }
    }
}

pub fn song(index: usize) -> Song {
    let url = match Url::parse(&format!("tidal://track/{index}")) {
        Ok(url) => url,
        Err(err) => unreachable!("static test url must parse: {err}"),
    };
    Song::new(format!("Track {index}"), "Daft Punk", "Discovery", url)
}

pub fn songs(count: usize) -> Vec<Song> {
    (0..count).map(song).collect()
}

pub fn solid_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        width,
        height,
        Rgba([200, 40, 40, 255]),
    ))
}
