//! [`ChangeNotifier`] implementations.

use async_trait::async_trait;
use fanpulse_core::{ChangeNotifier, MetadataChanged, NotifyError};
use tokio::sync::mpsc;

/// Logs each change and forgets it.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait]
impl ChangeNotifier for TracingNotifier {
    async fn publish(&self, change: &MetadataChanged) -> Result<(), NotifyError> {
        tracing::info!(
            event_id = %change.event_id,
            title_changed = change.title_changed(),
            thumbnail_changed = change.thumbnail_changed(),
            new_title = %change.new_title,
            "refresh: stream metadata changed"
        );
        Ok(())
    }
}

/// Forwards changes to an in-process consumer.
///
/// Publishing waits for channel capacity; a closed receiver is an error.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::Sender<MetadataChanged>,
}

impl ChannelNotifier {
    #[must_use]
    pub fn new(tx: mpsc::Sender<MetadataChanged>) -> Self {
        Self { tx }
    }

    /// Creates a notifier together with the receiving half of its channel.
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<MetadataChanged>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(tx), rx)
    }
}

#[async_trait]
impl ChangeNotifier for ChannelNotifier {
    async fn publish(&self, change: &MetadataChanged) -> Result<(), NotifyError> {
        self.tx
            .send(change.clone())
            .await
            .map_err(|e| NotifyError(format!("change receiver dropped: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn change() -> MetadataChanged {
        MetadataChanged {
            event_id: Uuid::new_v4(),
            previous_title: "old".to_owned(),
            new_title: "new".to_owned(),
            previous_thumbnail_url: None,
            new_thumbnail_url: None,
            occurred_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn channel_notifier_delivers_changes() {
        let (notifier, mut rx) = ChannelNotifier::channel(4);
        let sent = change();

        notifier.publish(&sent).await.unwrap();

        assert_eq!(rx.recv().await, Some(sent));
    }

    #[tokio::test]
    async fn closed_receiver_is_an_error() {
        let (notifier, rx) = ChannelNotifier::channel(1);
        drop(rx);

        assert!(notifier.publish(&change()).await.is_err());
    }

    #[tokio::test]
    async fn tracing_notifier_accepts_everything() {
        assert!(TracingNotifier.publish(&change()).await.is_ok());
    }
}
