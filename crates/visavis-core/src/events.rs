use std::sync::Arc;

/// Events emitted by the session shell to host listeners.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    ConnectionStateChanged(ConnectionState),
    /// The connect retry budget is spent. Emitted at most once per connect.
    ConnectExhausted { attempts: u32, last_error: String },
    StreamCreated(StreamInfo),
    StreamDestroyed { stream_id: String, reason: String },
    ScreenShareStarted(StreamInfo),
    ScreenShareEnded { stream_id: String },
    StreamPropertyChanged { stream_id: String, change: StreamPropertyChange },
    /// Smoothed meter level for one origin, e.g. `"38.5%"`.
    AudioLevelUpdated { origin: AudioOrigin, percent: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting { attempt: u32 },
}

/// A remote media stream as described by the vendor SDK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamInfo {
    pub id: String,
    pub name: Option<String>,
    pub video_type: VideoType,
    pub has_audio: bool,
    pub has_video: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoType {
    Camera,
    Screen,
    Unknown,
}

/// A property change reported for a live stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamPropertyChange {
    AudioEnabled(bool),
    VideoEnabled(bool),
    VideoDimensions { width: u32, height: u32 },
}

/// Which side of the call an audio-level sample belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioOrigin {
    Publisher,
    Subscriber,
}

/// Trait for receiving events from the shell.
/// Implementations must be Send + Sync (called from tokio tasks).
pub trait SessionEventListener: Send + Sync {
    fn on_event(&self, event: SessionEvent);
}

/// Internal event emitter that dispatches to registered listeners.
#[derive(Clone)]
pub struct EventEmitter {
    listeners: Arc<std::sync::RwLock<Vec<Arc<dyn SessionEventListener>>>>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(std::sync::RwLock::new(Vec::new())),
        }
    }

    pub fn add_listener(&self, listener: Arc<dyn SessionEventListener>) {
        self.listeners.write().unwrap().push(listener);
    }

    /// Dispatch an event to every listener. With no listeners registered
    /// the event is silently dropped.
    pub fn emit(&self, event: SessionEvent) {
        let listeners = self.listeners.read().unwrap();
        for listener in listeners.iter() {
            listener.on_event(event.clone());
        }
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new()
    }
}
