use std::collections::HashMap;
use std::sync::Arc;

use songsearch_protocol::BackendCorrelationId;
use songsearch_protocol::SearchEvent;
use songsearch_protocol::SearchMode;
use songsearch_protocol::SearchRequestId;
use songsearch_protocol::SearchResult;
use songsearch_protocol::Song;
use songsearch_utils_tokenizer::tokenize;
use tracing::debug;
use tracing::warn;

use crate::ids::IdAllocator;
use crate::processor::ResultProcessor;
use crate::provider::SearchProvider;
use crate::sink::EventSink;

/// State kept for one backend call until its reply arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSearchState {
    pub origin: SearchRequestId,
    pub match_tokens: Vec<String>,
}

/// Sends queries to the backend and maps replies back to the caller-visible
/// search that issued them.
///
/// `pending` is keyed by the provider's correlation id; `outstanding` counts
/// live pending entries per origin so a search is known to be finished as
/// soon as its count reaches zero.
pub struct SearchDispatcher<P> {
    provider: P,
    ids: Arc<IdAllocator>,
    pending: HashMap<BackendCorrelationId, PendingSearchState>,
    outstanding: HashMap<SearchRequestId, usize>,
    processor: ResultProcessor,
    events: EventSink,
}

impl<P: SearchProvider> SearchDispatcher<P> {
    pub fn new(
        provider: P,
        ids: Arc<IdAllocator>,
        processor: ResultProcessor,
        events: EventSink,
    ) -> Self {
        Self {
            provider,
            ids,
            pending: HashMap::new(),
            outstanding: HashMap::new(),
            processor,
            events,
        }
    }

    pub fn allocate_request_id(&self) -> SearchRequestId {
        self.ids.next()
    }

    pub fn dispatch(&mut self, origin: SearchRequestId, query: &str, mode: SearchMode) {
        let correlation_id = self.provider.search(query, mode);
        debug!(%origin, %correlation_id, ?mode, "dispatched search");

        let state = PendingSearchState {
            origin,
            match_tokens: tokenize(query),
        };
        *self.outstanding.entry(origin).or_insert(0) += 1;
        if let Some(stale) = self.pending.insert(correlation_id, state) {
            warn!(
                %correlation_id,
                stale_origin = %stale.origin,
                "provider reused a pending correlation id; dropping the older search"
            );
            self.settle(stale.origin);
        }
    }

    pub fn on_backend_success(&mut self, correlation_id: BackendCorrelationId, songs: Vec<Song>) {
        let Some(state) = self.pending.remove(&correlation_id) else {
            debug!(%correlation_id, "ignoring results for unknown or stale correlation id");
            return;
        };

        let results = songs.into_iter().map(SearchResult::new).collect();
        if let Some(event) = self
            .processor
            .process(state.origin, results, &state.match_tokens)
        {
            self.events.send(event);
        }
        self.settle(state.origin);
    }

    pub fn on_backend_error(&mut self, correlation_id: BackendCorrelationId, message: String) {
        let Some(state) = self.pending.remove(&correlation_id) else {
            debug!(%correlation_id, "ignoring error for unknown or stale correlation id: {message}");
            return;
        };

        warn!(origin = %state.origin, %correlation_id, "search failed: {message}");
        self.events.send(SearchEvent::SearchError {
            origin: state.origin,
            message,
        });
        self.settle(state.origin);
    }

    /// True while any backend call for `origin` is still unanswered.
    pub fn in_flight(&self, origin: SearchRequestId) -> bool {
        self.outstanding.contains_key(&origin)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    fn settle(&mut self, origin: SearchRequestId) {
        let Some(count) = self.outstanding.get_mut(&origin) else {
            warn!(%origin, "settled a search with no outstanding calls");
            return;
        };
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.outstanding.remove(&origin);
            debug!(%origin, "search finished");
            self.events.send(SearchEvent::SearchFinished { origin });
        }
    }
}
