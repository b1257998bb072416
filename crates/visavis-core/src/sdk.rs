//! Trait-level model of the vendor real-time media SDK.
//!
//! The shell never links a concrete SDK. Hosts provide a [`SessionDriver`]
//! binding; everything the vendor reports comes back on one multiplexed
//! [`SdkEvent`] feed per session, and dropping the feed's receiver is how
//! a torn-down shell stops hearing from it.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::config::{MediaOptions, SessionCredentials};
use crate::errors::SdkError;
use crate::events::{AudioOrigin, StreamInfo, StreamPropertyChange};

/// Events delivered by the vendor SDK on the per-session feed.
#[derive(Debug, Clone)]
pub enum SdkEvent {
    Disconnected { reason: String },
    Reconnecting,
    Reconnected,
    StreamCreated(StreamInfo),
    StreamDestroyed { stream_id: String, reason: String },
    StreamPropertyChanged { stream_id: String, change: StreamPropertyChange },
    /// Raw instantaneous audio level in [0, 1] for one origin.
    AudioLevel { origin: AudioOrigin, level: f64 },
    /// Vendor-side exception that is not tied to any operation.
    Error { message: String },
}

pub type SdkEventFeed = UnboundedReceiver<SdkEvent>;

/// Entry point into the vendor SDK.
#[async_trait]
pub trait SessionDriver: Send + Sync {
    /// Attempt one connection with the given credentials.
    ///
    /// Resolves exactly once per invocation: `Ok` carries the connected
    /// session and its event feed, `Err` is one transient failure.
    async fn connect(
        &self,
        credentials: &SessionCredentials,
    ) -> Result<(Arc<dyn SessionHandle>, SdkEventFeed), SdkError>;
}

/// A connected vendor session.
#[async_trait]
pub trait SessionHandle: Send + Sync {
    async fn publish(&self, options: &MediaOptions) -> Result<Arc<dyn PublisherHandle>, SdkError>;

    async fn subscribe(&self, stream: &StreamInfo) -> Result<Arc<dyn SubscriberHandle>, SdkError>;

    async fn unsubscribe(&self, subscriber: Arc<dyn SubscriberHandle>) -> Result<(), SdkError>;

    async fn unpublish(&self, publisher: Arc<dyn PublisherHandle>) -> Result<(), SdkError>;

    async fn disconnect(&self) -> Result<(), SdkError>;
}

/// The local participant's outbound media stream.
#[async_trait]
pub trait PublisherHandle: Send + Sync {
    fn id(&self) -> &str;

    async fn set_audio_enabled(&self, enabled: bool) -> Result<(), SdkError>;

    async fn set_video_enabled(&self, enabled: bool) -> Result<(), SdkError>;
}

/// A subscription to one remote stream.
pub trait SubscriberHandle: Send + Sync {
    fn stream_id(&self) -> &str;
}
