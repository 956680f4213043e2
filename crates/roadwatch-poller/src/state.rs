use chrono::{DateTime, Utc};
use serde::Serialize;

/// Most recently applied frame for one camera.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameSnapshot {
    pub camera_id: String,
    pub url: String,
    pub fetched_at: DateTime<Utc>,
}

/// Observable state of a polling controller.
///
/// `Loading`, `Ready` and `Error` are mutually exclusive once the first fetch
/// settles; `Stopped` is terminal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "lowercase")]
pub enum FeedState {
    Idle,
    Loading,
    Ready(FrameSnapshot),
    Error(String),
    Stopped,
}

impl FeedState {
    pub fn is_settled(&self) -> bool {
        matches!(self, FeedState::Ready(_) | FeedState::Error(_))
    }

    pub fn frame(&self) -> Option<&FrameSnapshot> {
        match self {
            FeedState::Ready(frame) => Some(frame),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FeedState::Idle => "Idle",
            FeedState::Loading => "Loading…",
            FeedState::Ready(_) => "Live",
            FeedState::Error(_) => "Feed unavailable",
            FeedState::Stopped => "Stopped",
        }
    }
}
