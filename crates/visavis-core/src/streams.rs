use std::sync::Arc;

use crate::events::{StreamInfo, StreamPropertyChange};
use crate::sdk::SubscriberHandle;

/// Which registry slot a stream occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamSlot {
    Camera,
    ScreenShare,
}

struct TrackedStream {
    info: StreamInfo,
    subscriber: Arc<dyn SubscriberHandle>,
}

/// Tracks the remote streams the shell is subscribed to.
///
/// A two-party call subscribes to at most one camera stream and one
/// screen-share stream; the first of each wins, later ones are ignored
/// until the tracked stream is destroyed and frees its slot.
/// Mutated only by the relay loop.
#[derive(Default)]
pub struct StreamRegistry {
    camera: Option<TrackedStream>,
    screen_share: Option<TrackedStream>,
}

impl StreamRegistry {
    pub fn new() -> Self {
        Self {
            camera: None,
            screen_share: None,
        }
    }

    /// Track a camera stream. Returns false if the slot is occupied.
    pub fn track_camera(&mut self, info: StreamInfo, subscriber: Arc<dyn SubscriberHandle>) -> bool {
        if self.camera.is_some() {
            return false;
        }
        self.camera = Some(TrackedStream { info, subscriber });
        true
    }

    /// Track a screen-share stream. Returns false if the slot is occupied.
    pub fn track_screen_share(
        &mut self,
        info: StreamInfo,
        subscriber: Arc<dyn SubscriberHandle>,
    ) -> bool {
        if self.screen_share.is_some() {
            return false;
        }
        self.screen_share = Some(TrackedStream { info, subscriber });
        true
    }

    pub fn camera_stream(&self) -> Option<&StreamInfo> {
        self.camera.as_ref().map(|t| &t.info)
    }

    pub fn screen_share_stream(&self) -> Option<&StreamInfo> {
        self.screen_share.as_ref().map(|t| &t.info)
    }

    /// Drop a destroyed stream, freeing its slot for a successor.
    pub fn remove(&mut self, stream_id: &str) -> Option<StreamSlot> {
        if self.camera.as_ref().is_some_and(|t| t.info.id == stream_id) {
            self.camera = None;
            return Some(StreamSlot::Camera);
        }
        if self
            .screen_share
            .as_ref()
            .is_some_and(|t| t.info.id == stream_id)
        {
            self.screen_share = None;
            return Some(StreamSlot::ScreenShare);
        }
        None
    }

    /// Apply a vendor-reported property change to the tracked stream.
    /// Returns false if the stream is not tracked.
    pub fn apply_change(&mut self, stream_id: &str, change: &StreamPropertyChange) -> bool {
        let Some(tracked) = self.tracked_mut(stream_id) else {
            return false;
        };
        match *change {
            StreamPropertyChange::AudioEnabled(enabled) => tracked.info.has_audio = enabled,
            StreamPropertyChange::VideoEnabled(enabled) => tracked.info.has_video = enabled,
            StreamPropertyChange::VideoDimensions { .. } => {}
        }
        true
    }

    /// Drain both slots, handing back the subscriber handles for release.
    pub fn take_subscribers(&mut self) -> Vec<Arc<dyn SubscriberHandle>> {
        self.camera
            .take()
            .into_iter()
            .chain(self.screen_share.take())
            .map(|t| t.subscriber)
            .collect()
    }

    pub fn clear(&mut self) {
        self.camera = None;
        self.screen_share = None;
    }

    fn tracked_mut(&mut self, stream_id: &str) -> Option<&mut TrackedStream> {
        if self.camera.as_ref().is_some_and(|t| t.info.id == stream_id) {
            return self.camera.as_mut();
        }
        if self
            .screen_share
            .as_ref()
            .is_some_and(|t| t.info.id == stream_id)
        {
            return self.screen_share.as_mut();
        }
        None
    }
}
