//! Types shared between the search core and its callers.

pub mod events;
pub mod ids;
pub mod song;

pub use events::SearchEvent;
pub use events::Thumbnail;
pub use ids::ArtRequestId;
pub use ids::BackendCorrelationId;
pub use ids::LoaderId;
pub use ids::SearchRequestId;
pub use song::ProviderInfo;
pub use song::SearchMode;
pub use song::SearchResult;
pub use song::Song;
pub use song::TrackSelection;
