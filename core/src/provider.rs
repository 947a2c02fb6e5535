//! Seams to the external collaborators: the backend search provider and the
//! image-fetch subsystem.
//!
//! Both issue requests synchronously and reply later through a
//! [`ReplySender`]. Replies are queued onto the service task, so an
//! implementation may complete work on any thread.

use image::DynamicImage;
use songsearch_protocol::BackendCorrelationId;
use songsearch_protocol::LoaderId;
use songsearch_protocol::ProviderInfo;
use songsearch_protocol::SearchMode;
use songsearch_protocol::Song;
use songsearch_utils_image::ScaleOptions;
use tokio::sync::mpsc;
use tracing::debug;

/// Backend that actually runs searches.
pub trait SearchProvider: Send + 'static {
    fn info(&self) -> ProviderInfo;

    /// Starts a search and returns the id its reply will carry.
    fn search(&mut self, query: &str, mode: SearchMode) -> BackendCorrelationId;
}

/// Subsystem that fetches and decodes artwork.
pub trait ImageLoader: Send + 'static {
    /// Starts a fetch and returns the id its reply will carry.
    fn load_image_async(&mut self, options: &ScaleOptions, metadata: &Song) -> LoaderId;
}

/// Completion posted by a collaborator.
#[derive(Debug)]
pub enum BackendReply {
    SearchResults {
        correlation_id: BackendCorrelationId,
        songs: Vec<Song>,
    },
    SearchError {
        correlation_id: BackendCorrelationId,
        message: String,
    },
    ImageLoaded {
        loader_id: LoaderId,
        image: DynamicImage,
    },
}

/// Cloneable handle collaborators use to post their replies.
#[derive(Clone, Debug)]
pub struct ReplySender {
    tx: mpsc::UnboundedSender<BackendReply>,
}

pub struct ReplyReceiver {
    pub(crate) rx: mpsc::UnboundedReceiver<BackendReply>,
}

pub fn reply_channel() -> (ReplySender, ReplyReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ReplySender { tx }, ReplyReceiver { rx })
}

impl ReplySender {
    pub fn search_results(&self, correlation_id: BackendCorrelationId, songs: Vec<Song>) {
        self.send(BackendReply::SearchResults {
            correlation_id,
            songs,
        });
    }

    pub fn search_error(&self, correlation_id: BackendCorrelationId, message: impl Into<String>) {
        self.send(BackendReply::SearchError {
            correlation_id,
            message: message.into(),
        });
    }

    pub fn image_loaded(&self, loader_id: LoaderId, image: DynamicImage) {
        self.send(BackendReply::ImageLoaded { loader_id, image });
    }

    pub fn send(&self, reply: BackendReply) {
        if self.tx.send(reply).is_err() {
            debug!("search service stopped, dropping backend reply");
        }
    }
}
