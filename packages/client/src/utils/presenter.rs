use async_trait::async_trait;
use std::time::Duration;

use crate::error::GameError;
use crate::models::Seat;

/// One block of text shown next to a seat, optionally with an audio handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reveal {
    pub title: String,
    pub auto_play: bool,
    pub body: String,
    pub is_thinking: bool,
    pub audio: Option<String>,
}

impl Reveal {
    pub fn speech(title: impl Into<String>, auto_play: bool, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            auto_play,
            body: body.into(),
            is_thinking: false,
            audio: None,
        }
    }

    pub fn thinking(title: impl Into<String>, auto_play: bool, body: impl Into<String>) -> Self {
        Self {
            is_thinking: true,
            ..Self::speech(title, auto_play, body)
        }
    }

    pub fn with_audio(mut self, audio: Option<String>) -> Self {
        self.audio = audio;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    Day,
    Night,
}

/// Where the game is shown. Every call completes once the presentation has
/// finished (typewriter done, dwell elapsed, audio played).
#[async_trait]
pub trait Presenter: Send + Sync {
    async fn reveal(&self, reveal: Reveal);
    async fn present_player(&self, seat: Seat);
    async fn clear_presentation(&self);
    async fn set_background(&self, background: Background);
    async fn announce(&self, text: &str, dwell: Duration);
    async fn mark_dead(&self, seat: Seat);
    async fn show_vote_count(&self, seat: Seat, votes: usize);
    async fn clear_vote_counts(&self);
    async fn show_day(&self, day: u32);
    async fn label_player(&self, seat: Seat, role_label: Option<&str>, badge: Option<&str>);
    async fn show_failure(&self, message: &str);
}

#[async_trait]
pub trait HumanInput: Send + Sync {
    /// Waits for one line from the human player.
    async fn prompt(&self, text: &str) -> Result<String, GameError>;
    async fn reject(&self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryKind {
    Thinking,
    Speech,
    Action,
    Vote,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub seat: Seat,
    pub role_label: String,
    pub kind: HistoryKind,
    pub text: String,
}

pub trait HistorySink: Send + Sync {
    fn record(&self, entry: HistoryEntry);
}
