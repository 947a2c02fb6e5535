use songsearch_protocol::SearchEvent;
use tokio::sync::mpsc;
use tracing::debug;

/// Outbound side of the caller notification channel.
#[derive(Clone, Debug)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<SearchEvent>,
}

impl EventSink {
    pub fn new(tx: mpsc::UnboundedSender<SearchEvent>) -> Self {
        Self { tx }
    }

    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SearchEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    pub fn send(&self, event: SearchEvent) {
        if self.tx.send(event).is_err() {
            debug!("event receiver dropped; discarding search event");
        }
    }
}
