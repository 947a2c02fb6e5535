use songsearch_protocol::SearchEvent;
use songsearch_protocol::SearchRequestId;
use songsearch_protocol::SearchResult;
use songsearch_protocol::Song;
use songsearch_utils_tokenizer::matches;
use tracing::debug;

/// Thumbnail cache key for a song. Identical urls share one entry.
pub fn cache_key(namespace: &str, song: &Song) -> String {
    format!("{namespace}:{}", song.url)
}

/// Bounds and annotates raw result batches before they reach the caller.
#[derive(Debug, Clone)]
pub struct ResultProcessor {
    namespace: String,
    max_results: usize,
    client_side_filter: bool,
}

impl ResultProcessor {
    pub fn new(namespace: impl Into<String>, max_results: usize, client_side_filter: bool) -> Self {
        Self {
            namespace: namespace.into(),
            max_results,
            client_side_filter,
        }
    }

    /// Builds the `ResultsAvailable` event for one backend reply, or `None`
    /// when nothing survives.
    ///
    /// The cap applies per reply; several replies for one search may each
    /// carry up to `max_results` entries.
    pub fn process(
        &self,
        origin: SearchRequestId,
        mut results: Vec<SearchResult>,
        match_tokens: &[String],
    ) -> Option<SearchEvent> {
        if self.client_side_filter {
            results.retain(|result| matches(match_tokens, &result.match_text()));
        }
        if results.is_empty() {
            return None;
        }

        if results.len() > self.max_results {
            debug!(
                %origin,
                received = results.len(),
                kept = self.max_results,
                "truncating result batch"
            );
            results.truncate(self.max_results);
        }

        for result in &mut results {
            result.cache_key = Some(cache_key(&self.namespace, &result.metadata));
        }

        Some(SearchEvent::ResultsAvailable {
            origin,
            results,
            match_tokens: match_tokens.to_vec(),
        })
    }
}
