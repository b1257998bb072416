use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::audio_level::AudioLevelMeter;
use crate::config::{MediaOptions, SessionCredentials};
use crate::connector::SessionConnector;
use crate::errors::VisavisError;
use crate::events::{
    AudioOrigin, ConnectionState, EventEmitter, SessionEvent, SessionEventListener, StreamInfo,
    VideoType,
};
use crate::sdk::{PublisherHandle, SdkEvent, SdkEventFeed, SessionDriver, SessionHandle};
use crate::streams::{StreamRegistry, StreamSlot};

/// Manages the lifecycle of one vendor SDK session at a time.
///
/// `connect` spawns a relay task that drives the bounded connect loop,
/// publishes local media with the construction-time [`MediaOptions`], and
/// then forwards every SDK event to registered listeners. Teardown is a
/// matter of ownership: aborting the relay task drops the SDK event feed,
/// and releasing the handles below deregisters everything at once — there
/// is no attach/detach pairing to keep in sync.
pub struct SessionManager {
    driver: Arc<dyn SessionDriver>,
    options: MediaOptions,
    session: Arc<Mutex<Option<Arc<dyn SessionHandle>>>>,
    emitter: EventEmitter,
    connection_state: Arc<Mutex<ConnectionState>>,
    streams: Arc<Mutex<StreamRegistry>>,
    publisher: Arc<Mutex<Option<Arc<dyn PublisherHandle>>>>,
    relay_task: std::sync::Mutex<Option<JoinHandle<()>>>,
    connected_at: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl SessionManager {
    pub fn new(driver: Arc<dyn SessionDriver>, options: MediaOptions) -> Self {
        Self {
            driver,
            options,
            session: Arc::new(Mutex::new(None)),
            emitter: EventEmitter::new(),
            connection_state: Arc::new(Mutex::new(ConnectionState::Disconnected)),
            streams: Arc::new(Mutex::new(StreamRegistry::new())),
            publisher: Arc::new(Mutex::new(None)),
            relay_task: std::sync::Mutex::new(None),
            connected_at: Arc::new(Mutex::new(None)),
        }
    }

    /// Register a listener for shell events.
    pub fn add_listener(&self, listener: Arc<dyn SessionEventListener>) {
        self.emitter.add_listener(listener);
    }

    /// Get current connection state.
    pub async fn connection_state(&self) -> ConnectionState {
        self.connection_state.lock().await.clone()
    }

    /// The camera stream currently subscribed, if any.
    pub async fn subscriber_stream(&self) -> Option<StreamInfo> {
        self.streams.lock().await.camera_stream().cloned()
    }

    /// The screen-share stream currently subscribed, if any.
    pub async fn screen_share_stream(&self) -> Option<StreamInfo> {
        self.streams.lock().await.screen_share_stream().cloned()
    }

    /// Connect to a session.
    ///
    /// Returns `Err` only for precondition failures (incomplete credentials,
    /// a session already active). Every connection outcome — connected,
    /// reconnecting, retry exhaustion — arrives through the event listener.
    pub async fn connect(&self, credentials: SessionCredentials) -> Result<(), VisavisError> {
        credentials.validate()?;

        {
            let mut state = self.connection_state.lock().await;
            if *state != ConnectionState::Disconnected {
                return Err(VisavisError::AlreadyConnected);
            }
            *state = ConnectionState::Connecting;
        }
        self.emitter
            .emit(SessionEvent::ConnectionStateChanged(ConnectionState::Connecting));

        let connector = SessionConnector::new(self.driver.clone(), credentials);
        let options = self.options.clone();
        let session = self.session.clone();
        let emitter = self.emitter.clone();
        let connection_state = self.connection_state.clone();
        let streams = self.streams.clone();
        let publisher = self.publisher.clone();
        let connected_at = self.connected_at.clone();

        let task = tokio::spawn(async move {
            let connected = match connector.run().await {
                Ok(connected) => connected,
                Err(err) => {
                    if let VisavisError::ConnectExhausted { retries, last_error } = err {
                        emitter.emit(SessionEvent::ConnectExhausted {
                            attempts: retries + 1,
                            last_error,
                        });
                    }
                    *connection_state.lock().await = ConnectionState::Disconnected;
                    emitter.emit(SessionEvent::ConnectionStateChanged(
                        ConnectionState::Disconnected,
                    ));
                    return;
                }
            };

            *session.lock().await = Some(connected.handle.clone());
            *connected_at.lock().await = Some(Utc::now());
            *connection_state.lock().await = ConnectionState::Connected;
            emitter.emit(SessionEvent::ConnectionStateChanged(ConnectionState::Connected));

            match connected.handle.publish(&options).await {
                Ok(p) => {
                    tracing::info!("local media published: {}", p.id());
                    *publisher.lock().await = Some(p);
                }
                Err(e) => {
                    // TODO: bounded retry here, like the session connect loop
                    tracing::error!("publisher init error: {e}");
                }
            }

            Self::relay_loop(
                connected.events,
                connected.handle,
                emitter,
                connection_state,
                session,
                streams,
                publisher,
                connected_at,
            )
            .await;
        });

        *self.relay_task.lock().unwrap() = Some(task);
        Ok(())
    }

    /// Toggle audio on the published stream.
    pub async fn set_publish_audio(&self, enabled: bool) -> Result<(), VisavisError> {
        let publisher = self.publisher.lock().await;
        let publisher = publisher.as_ref().ok_or(VisavisError::NotConnected)?;
        publisher
            .set_audio_enabled(enabled)
            .await
            .map_err(|e| VisavisError::Session(format!("set publish audio: {e}")))?;
        tracing::info!("publish audio enabled: {enabled}");
        Ok(())
    }

    /// Toggle video on the published stream.
    pub async fn set_publish_video(&self, enabled: bool) -> Result<(), VisavisError> {
        let publisher = self.publisher.lock().await;
        let publisher = publisher.as_ref().ok_or(VisavisError::NotConnected)?;
        publisher
            .set_video_enabled(enabled)
            .await
            .map_err(|e| VisavisError::Session(format!("set publish video: {e}")))?;
        tracing::info!("publish video enabled: {enabled}");
        Ok(())
    }

    /// Disconnect from the current session.
    ///
    /// Aborts the relay task first so no late SDK event can act, then
    /// releases subscriber, publisher and session handles in that order.
    /// SDK-side release failures are logged, never propagated.
    pub async fn disconnect(&self) {
        if let Some(task) = self.relay_task.lock().unwrap().take() {
            task.abort();
        }

        let subscribers = self.streams.lock().await.take_subscribers();
        let publisher = self.publisher.lock().await.take();
        let session = self.session.lock().await.take();

        if let Some(session) = session {
            for subscriber in subscribers {
                if let Err(e) = session.unsubscribe(subscriber).await {
                    tracing::warn!("unsubscribe error: {e}");
                }
            }
            if let Some(publisher) = publisher {
                if let Err(e) = session.unpublish(publisher).await {
                    tracing::warn!("unpublish error: {e}");
                }
            }
            if let Err(e) = session.disconnect().await {
                tracing::warn!("error closing session: {e}");
            }
        }

        *self.connected_at.lock().await = None;
        self.set_connection_state(ConnectionState::Disconnected).await;
    }

    async fn set_connection_state(&self, state: ConnectionState) {
        *self.connection_state.lock().await = state.clone();
        self.emitter.emit(SessionEvent::ConnectionStateChanged(state));
    }

    async fn relay_loop(
        mut events: SdkEventFeed,
        handle: Arc<dyn SessionHandle>,
        emitter: EventEmitter,
        connection_state: Arc<Mutex<ConnectionState>>,
        session: Arc<Mutex<Option<Arc<dyn SessionHandle>>>>,
        streams: Arc<Mutex<StreamRegistry>>,
        publisher: Arc<Mutex<Option<Arc<dyn PublisherHandle>>>>,
        connected_at: Arc<Mutex<Option<DateTime<Utc>>>>,
    ) {
        let mut reconnect_attempt: u32 = 0;
        let mut publisher_meter = AudioLevelMeter::new();
        let mut subscriber_meter = AudioLevelMeter::new();

        while let Some(event) = events.recv().await {
            match event {
                SdkEvent::Reconnecting => {
                    reconnect_attempt += 1;
                    let state = ConnectionState::Reconnecting {
                        attempt: reconnect_attempt,
                    };
                    *connection_state.lock().await = state.clone();
                    emitter.emit(SessionEvent::ConnectionStateChanged(state));
                }

                SdkEvent::Reconnected => {
                    reconnect_attempt = 0;
                    *connection_state.lock().await = ConnectionState::Connected;
                    emitter.emit(SessionEvent::ConnectionStateChanged(
                        ConnectionState::Connected,
                    ));
                }

                SdkEvent::Disconnected { reason } => {
                    match connected_at.lock().await.take() {
                        Some(since) => {
                            let secs = (Utc::now() - since).num_seconds();
                            tracing::info!("session disconnected after {secs}s: {reason}");
                        }
                        None => tracing::info!("session disconnected: {reason}"),
                    }
                    streams.lock().await.clear();
                    *publisher.lock().await = None;
                    *session.lock().await = None;
                    *connection_state.lock().await = ConnectionState::Disconnected;
                    emitter.emit(SessionEvent::ConnectionStateChanged(
                        ConnectionState::Disconnected,
                    ));
                    break;
                }

                SdkEvent::StreamCreated(info) => match info.video_type {
                    VideoType::Camera => {
                        if streams.lock().await.camera_stream().is_some() {
                            tracing::debug!("ignoring extra camera stream {}", info.id);
                            continue;
                        }
                        match handle.subscribe(&info).await {
                            Ok(subscriber) => {
                                streams.lock().await.track_camera(info.clone(), subscriber);
                                emitter.emit(SessionEvent::StreamCreated(info));
                            }
                            Err(e) => {
                                tracing::warn!("subscribe failed for stream {}: {e}", info.id)
                            }
                        }
                    }
                    VideoType::Screen => {
                        if streams.lock().await.screen_share_stream().is_some() {
                            tracing::debug!("ignoring extra screen-share stream {}", info.id);
                            continue;
                        }
                        match handle.subscribe(&info).await {
                            Ok(subscriber) => {
                                streams
                                    .lock()
                                    .await
                                    .track_screen_share(info.clone(), subscriber);
                                emitter.emit(SessionEvent::ScreenShareStarted(info));
                            }
                            Err(e) => {
                                tracing::warn!("subscribe failed for stream {}: {e}", info.id)
                            }
                        }
                    }
                    VideoType::Unknown => {
                        tracing::debug!("ignoring stream {} with unknown video type", info.id);
                    }
                },

                SdkEvent::StreamDestroyed { stream_id, reason } => {
                    let slot = streams.lock().await.remove(&stream_id);
                    if slot == Some(StreamSlot::ScreenShare) {
                        emitter.emit(SessionEvent::ScreenShareEnded {
                            stream_id: stream_id.clone(),
                        });
                    }
                    emitter.emit(SessionEvent::StreamDestroyed { stream_id, reason });
                }

                SdkEvent::StreamPropertyChanged { stream_id, change } => {
                    if !streams.lock().await.apply_change(&stream_id, &change) {
                        tracing::debug!("property change for untracked stream {stream_id}");
                    }
                    emitter.emit(SessionEvent::StreamPropertyChanged { stream_id, change });
                }

                SdkEvent::AudioLevel { origin, level } => {
                    let percent = match origin {
                        AudioOrigin::Publisher => publisher_meter.update(level),
                        AudioOrigin::Subscriber => subscriber_meter.update(level),
                    };
                    emitter.emit(SessionEvent::AudioLevelUpdated { origin, percent });
                }

                SdkEvent::Error { message } => {
                    tracing::warn!("sdk exception: {message}");
                }
            }
        }

        tracing::debug!("session relay loop ended");
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        // A leaked manager must not keep relaying into host listeners.
        if let Ok(mut task) = self.relay_task.lock() {
            if let Some(task) = task.take() {
                task.abort();
            }
        }
    }
}
