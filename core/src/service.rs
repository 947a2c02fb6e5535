use std::sync::Arc;

use songsearch_protocol::ArtRequestId;
use songsearch_protocol::ProviderInfo;
use songsearch_protocol::SearchEvent;
use songsearch_protocol::SearchMode;
use songsearch_protocol::SearchRequestId;
use songsearch_protocol::SearchResult;
use songsearch_protocol::Thumbnail;
use songsearch_protocol::TrackSelection;
use songsearch_utils_cache::BoundedLruCache;
use songsearch_utils_cache::CacheStats;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;
use tracing::info;

use crate::art_loader::ArtLoader;
use crate::art_loader::ThumbnailCache;
use crate::config::SearchConfig;
use crate::debounce::DebounceScheduler;
use crate::dispatcher::SearchDispatcher;
use crate::error::Result;
use crate::error::SearchServiceError;
use crate::ids::IdAllocator;
use crate::processor::ResultProcessor;
use crate::provider::BackendReply;
use crate::provider::ImageLoader;
use crate::provider::ReplyReceiver;
use crate::provider::SearchProvider;
use crate::sink::EventSink;

#[derive(Debug)]
enum Command {
    Search {
        origin: SearchRequestId,
        query: String,
        mode: SearchMode,
    },
    Cancel {
        origin: SearchRequestId,
    },
    LoadArt {
        id: ArtRequestId,
        result: SearchResult,
    },
    Shutdown,
}

/// Cloneable caller-side handle. Ids are allocated here so every call returns
/// immediately; the work itself runs on the service task.
#[derive(Clone)]
pub struct SearchHandle {
    commands: mpsc::UnboundedSender<Command>,
    search_ids: Arc<IdAllocator>,
    art_ids: Arc<IdAllocator>,
    cache: Arc<ThumbnailCache>,
    provider: ProviderInfo,
}

impl SearchHandle {
    /// Starts a debounced search and returns its caller-visible id.
    pub fn search_async(
        &self,
        query: impl Into<String>,
        mode: SearchMode,
    ) -> Result<SearchRequestId> {
        let origin = self.search_ids.next();
        self.update_search(origin, query, mode)?;
        Ok(origin)
    }

    /// Replaces the query of a search, restarting its quiet period. Once the
    /// previous query has already been dispatched this issues another backend
    /// call under the same id.
    pub fn update_search(
        &self,
        origin: SearchRequestId,
        query: impl Into<String>,
        mode: SearchMode,
    ) -> Result<()> {
        self.send(Command::Search {
            origin,
            query: query.into(),
            mode,
        })
    }

    /// Only affects searches still waiting out their quiet period.
    pub fn cancel_search(&self, origin: SearchRequestId) -> Result<()> {
        self.send(Command::Cancel { origin })
    }

    pub fn load_art_async(&self, result: &SearchResult) -> Result<ArtRequestId> {
        let id = self.art_ids.next();
        self.send(Command::LoadArt {
            id,
            result: result.clone(),
        })?;
        Ok(id)
    }

    pub fn find_cached_pixmap(&self, result: &SearchResult) -> Option<Thumbnail> {
        result
            .cache_key
            .as_deref()
            .and_then(|key| self.cache.lookup(key))
    }

    pub fn load_tracks(&self, results: &[SearchResult]) -> Option<TrackSelection> {
        TrackSelection::from_results(results)
    }

    pub fn provider(&self) -> &ProviderInfo {
        &self.provider
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| SearchServiceError::ServiceClosed)
    }
}

/// Running search service: the handle, the caller notification stream and
/// the task that owns all correlation state.
pub struct SearchService {
    handle: SearchHandle,
    events: mpsc::UnboundedReceiver<SearchEvent>,
    task: JoinHandle<()>,
}

impl SearchService {
    /// Spawns the service task on the current tokio runtime. Collaborators
    /// post their replies through the sender paired with `replies`.
    pub fn spawn<P, L>(
        config: SearchConfig,
        provider: P,
        image_loader: L,
        replies: ReplyReceiver,
    ) -> Result<Self>
    where
        P: SearchProvider,
        L: ImageLoader,
    {
        config.validate()?;

        let info = provider.info();
        let cache = Arc::new(BoundedLruCache::new(config.cache_capacity()?));
        let search_ids = Arc::new(IdAllocator::default());
        let art_ids = Arc::new(IdAllocator::default());
        let (events, events_rx) = EventSink::channel();
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();

        let processor = ResultProcessor::new(
            info.id.clone(),
            config.max_results_per_emission,
            config.client_side_filter,
        );
        let runtime = ServiceRuntime {
            commands: commands_rx,
            replies: replies.rx,
            debounce: DebounceScheduler::new(config.debounce()),
            dispatcher: SearchDispatcher::new(
                provider,
                Arc::clone(&search_ids),
                processor,
                events.clone(),
            ),
            art: ArtLoader::new(
                image_loader,
                Arc::clone(&art_ids),
                config.scale_options(),
                Arc::clone(&cache),
                events,
            ),
        };

        info!(provider = %info.name, "starting search service");
        let task = tokio::spawn(runtime.run());

        Ok(Self {
            handle: SearchHandle {
                commands: commands_tx,
                search_ids,
                art_ids,
                cache,
                provider: info,
            },
            events: events_rx,
            task,
        })
    }

    pub fn handle(&self) -> SearchHandle {
        self.handle.clone()
    }

    pub async fn next_event(&mut self) -> Option<SearchEvent> {
        self.events.recv().await
    }

    pub fn try_next_event(&mut self) -> Option<SearchEvent> {
        self.events.try_recv().ok()
    }

    /// Stops the service task and waits for it to exit. Pending debounced
    /// searches are dropped.
    pub async fn shutdown(self) {
        if let Err(err) = self.handle.send(Command::Shutdown) {
            debug!("search service already stopped: {err}");
        }
        if let Err(err) = self.task.await {
            debug!("search service task ended abnormally: {err}");
        }
    }
}

struct ServiceRuntime<P, L> {
    commands: mpsc::UnboundedReceiver<Command>,
    replies: mpsc::UnboundedReceiver<BackendReply>,
    debounce: DebounceScheduler,
    dispatcher: SearchDispatcher<P>,
    art: ArtLoader<L>,
}

impl<P: SearchProvider, L: ImageLoader> ServiceRuntime<P, L> {
    async fn run(mut self) {
        let mut replies_open = true;
        loop {
            tokio::select! {
                biased;

                command = self.commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
                reply = self.replies.recv(), if replies_open => match reply {
                    Some(reply) => self.handle_reply(reply),
                    None => {
                        debug!("all reply senders dropped");
                        replies_open = false;
                    }
                },
                Some(expired) = self.debounce.next_expired(), if !self.debounce.is_empty() => {
                    self.dispatcher.dispatch(expired.origin, &expired.query, expired.mode);
                }
            }
        }
        info!("search service stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Search {
                origin,
                query,
                mode,
            } => self.debounce.schedule(origin, query, mode),
            Command::Cancel { origin } => {
                if !self.debounce.cancel(origin) {
                    debug!(%origin, "cancel found no pending search");
                }
            }
            Command::LoadArt { id, result } => self.art.request_art_as(id, &result),
            Command::Shutdown => {}
        }
    }

    fn handle_reply(&mut self, reply: BackendReply) {
        match reply {
            BackendReply::SearchResults {
                correlation_id,
                songs,
            } => self.dispatcher.on_backend_success(correlation_id, songs),
            BackendReply::SearchError {
                correlation_id,
                message,
            } => self.dispatcher.on_backend_error(correlation_id, message),
            BackendReply::ImageLoaded { loader_id, image } => {
                self.art.on_image_fetched(loader_id, image);
            }
        }
    }
}
