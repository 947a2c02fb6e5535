use std::collections::HashMap;
use std::sync::Arc;

use image::DynamicImage;
use songsearch_protocol::ArtRequestId;
use songsearch_protocol::LoaderId;
use songsearch_protocol::SearchEvent;
use songsearch_protocol::SearchResult;
use songsearch_protocol::Thumbnail;
use songsearch_utils_cache::BoundedLruCache;
use songsearch_utils_image::ScaleOptions;
use songsearch_utils_image::scale_and_pad;
use tracing::debug;
use tracing::warn;

use crate::ids::IdAllocator;
use crate::provider::ImageLoader;
use crate::sink::EventSink;

pub type ThumbnailCache = BoundedLruCache<String, Thumbnail>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingArtRequest {
    pub requester: ArtRequestId,
    pub cache_key: Option<String>,
}

/// One outstanding fetch in the image subsystem.
#[derive(Debug)]
struct LoaderTask {
    /// Key the fetched image is stored under.
    cache_key: Option<String>,
    waiters: Vec<ArtRequestId>,
}

/// Fetches thumbnails through the image subsystem and fills the cache.
///
/// Two tables bridge the id spaces: `pending` is keyed by our own request id,
/// `loader_tasks` maps each loader id to the fetch and the requests waiting on
/// it. Requests for a key that is already being fetched join the existing
/// fetch.
pub struct ArtLoader<L> {
    loader: L,
    ids: Arc<IdAllocator>,
    options: ScaleOptions,
    cache: Arc<ThumbnailCache>,
    pending: HashMap<ArtRequestId, PendingArtRequest>,
    loader_tasks: HashMap<LoaderId, LoaderTask>,
    in_flight: HashMap<String, LoaderId>,
    events: EventSink,
}

impl<L: ImageLoader> ArtLoader<L> {
    pub fn new(
        loader: L,
        ids: Arc<IdAllocator>,
        options: ScaleOptions,
        cache: Arc<ThumbnailCache>,
        events: EventSink,
    ) -> Self {
        Self {
            loader,
            ids,
            options,
            cache,
            pending: HashMap::new(),
            loader_tasks: HashMap::new(),
            in_flight: HashMap::new(),
            events,
        }
    }

    pub fn request_art(&mut self, result: &SearchResult) -> ArtRequestId {
        let id = self.ids.next();
        self.request_art_as(id, result);
        id
    }

    /// Starts (or joins) the fetch for `result` on behalf of an id allocated
    /// by the caller. A cache hit counts as a use of that entry.
    pub fn request_art_as(&mut self, id: ArtRequestId, result: &SearchResult) {
        let cache_key = result.cache_key.clone();

        if let Some(image) = cache_key.as_deref().and_then(|key| self.cache.get(key)) {
            debug!(%id, "art already cached");
            self.events.send(SearchEvent::ArtLoaded { id, image });
            return;
        }

        self.pending.insert(
            id,
            PendingArtRequest {
                requester: id,
                cache_key: cache_key.clone(),
            },
        );

        if let Some(loader_id) = cache_key
            .as_deref()
            .and_then(|key| self.in_flight.get(key).copied())
            && let Some(task) = self.loader_tasks.get_mut(&loader_id)
        {
            debug!(%id, %loader_id, "joining in-flight art fetch");
            task.waiters.push(id);
            return;
        }

        let loader_id = self.loader.load_image_async(&self.options, &result.metadata);
        debug!(%id, %loader_id, "requested art");

        let mut task = LoaderTask {
            cache_key: cache_key.clone(),
            waiters: Vec::new(),
        };
        if let Some(superseded) = self.loader_tasks.remove(&loader_id) {
            // Older waiters still complete, but only this fetch's key is cached.
            warn!(%loader_id, "image loader reused a pending id; superseding the older fetch");
            if let Some(old_key) = superseded.cache_key
                && self.in_flight.get(&old_key) == Some(&loader_id)
            {
                self.in_flight.remove(&old_key);
            }
            task.waiters = superseded.waiters;
        }
        if let Some(key) = cache_key {
            self.in_flight.insert(key, loader_id);
        }
        task.waiters.push(id);
        self.loader_tasks.insert(loader_id, task);
    }

    pub fn on_image_fetched(&mut self, loader_id: LoaderId, image: DynamicImage) {
        let Some(task) = self.loader_tasks.remove(&loader_id) else {
            debug!(%loader_id, "ignoring image for another consumer");
            return;
        };

        let thumbnail: Thumbnail = Arc::new(scale_and_pad(&image, &self.options));
        if let Some(key) = &task.cache_key {
            if self.in_flight.get(key) == Some(&loader_id) {
                self.in_flight.remove(key);
            }
            if thumbnail.width() > 0 && thumbnail.height() > 0 {
                self.cache.insert(key.clone(), Arc::clone(&thumbnail));
            } else {
                warn!(%loader_id, "image subsystem returned an empty image; not caching");
            }
        }

        for id in task.waiters {
            let Some(pending) = self.pending.remove(&id) else {
                warn!(%id, "no pending art request for waiter");
                continue;
            };
            if pending.cache_key != task.cache_key {
                debug!(%id, "completing superseded art request without caching");
            }
            self.events.send(SearchEvent::ArtLoaded {
                id: pending.requester,
                image: Arc::clone(&thumbnail),
            });
        }
    }

    /// Cached thumbnail for `result`. Never blocks and never fetches.
    pub fn find_cached(&self, result: &SearchResult) -> Option<Thumbnail> {
        result
            .cache_key
            .as_deref()
            .and_then(|key| self.cache.lookup(key))
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn cache(&self) -> &Arc<ThumbnailCache> {
        &self.cache
    }
}
