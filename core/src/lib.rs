//! Search orchestration for a remote track catalogue.
//!
//! Free-text searches are debounced per caller-visible id, dispatched to a
//! [`SearchProvider`], and their replies correlated back, bounded and
//! annotated with thumbnail cache keys. Artwork for results is fetched
//! through an [`ImageLoader`] and kept in a bounded LRU cache.
//!
//! All state lives on a single service task; see [`SearchService`].

// Prevent accidental direct writes to stdout/stderr in library code. All
// diagnostics go through `tracing`.
#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod art_loader;
pub mod config;
pub mod debounce;
pub mod dispatcher;
mod error;
mod ids;
pub mod processor;
pub mod provider;
mod service;
mod sink;

pub use art_loader::ArtLoader;
pub use art_loader::PendingArtRequest;
pub use art_loader::ThumbnailCache;
pub use config::SearchConfig;
pub use debounce::DebounceScheduler;
pub use debounce::DelayedSearch;
pub use dispatcher::PendingSearchState;
pub use dispatcher::SearchDispatcher;
pub use error::Result;
pub use error::SearchServiceError;
pub use ids::IdAllocator;
pub use processor::ResultProcessor;
pub use processor::cache_key;
pub use provider::BackendReply;
pub use provider::ImageLoader;
pub use provider::ReplyReceiver;
pub use provider::ReplySender;
pub use provider::SearchProvider;
pub use provider::reply_channel;
pub use service::SearchHandle;
pub use service::SearchService;
pub use sink::EventSink;

pub use songsearch_protocol as protocol;
pub use songsearch_utils_image::ScaleOptions;
