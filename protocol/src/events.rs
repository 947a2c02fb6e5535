use std::sync::Arc;

use image::RgbaImage;

use crate::ids::ArtRequestId;
use crate::ids::SearchRequestId;
use crate::song::SearchResult;

/// Decoded, already scaled thumbnail. Shared between the cache and callers.
pub type Thumbnail = Arc<RgbaImage>;

/// Notifications delivered to the caller of the search service.
#[derive(Debug, Clone)]
pub enum SearchEvent {
    /// A bounded batch of results for `origin`. `match_tokens` are the
    /// tokens of the query that produced the batch, for highlighting.
    ResultsAvailable {
        origin: SearchRequestId,
        results: Vec<SearchResult>,
        match_tokens: Vec<String>,
    },

    /// Every backend call issued under `origin` has replied.
    SearchFinished { origin: SearchRequestId },

    /// A backend call issued under `origin` failed.
    SearchError {
        origin: SearchRequestId,
        message: String,
    },

    /// Thumbnail for an art request. Empty when the image subsystem could
    /// not produce one.
    ArtLoaded {
        id: ArtRequestId,
        image: Thumbnail,
    },
}

impl SearchEvent {
    /// Search the event belongs to, if any.
    pub fn origin(&self) -> Option<SearchRequestId> {
        match self {
            SearchEvent::ResultsAvailable { origin, .. }
            | SearchEvent::SearchFinished { origin }
            | SearchEvent::SearchError { origin, .. } => Some(*origin),
            SearchEvent::ArtLoaded { .. } => None,
        }
    }
}
