use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, Once, PoisonError};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use super::presenter::{Background, HistoryEntry, HistorySink, HumanInput, Presenter, Reveal};
use crate::error::GameError;
use crate::models::Seat;

static INIT: Once = Once::new();

pub fn setup_test_env() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    });
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Reveal(Reveal),
    PresentPlayer(Seat),
    Clear,
    Background(Background),
    Announce(String),
    MarkDead(Seat),
    VoteCount(Seat, usize),
    ClearVoteCounts,
    Day(u32),
    Label(Seat, Option<String>, Option<String>),
    Failure(String),
}

/// Presenter that records every call and returns immediately.
#[derive(Default)]
pub struct RecordingPresenter {
    events: Mutex<Vec<Event>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn reveals(&self) -> Vec<Reveal> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Reveal(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    pub fn announcements(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Announce(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn dead(&self) -> Vec<Seat> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::MarkDead(seat) => Some(seat),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Presenter for RecordingPresenter {
    async fn reveal(&self, reveal: Reveal) {
        self.push(Event::Reveal(reveal));
    }

    async fn present_player(&self, seat: Seat) {
        self.push(Event::PresentPlayer(seat));
    }

    async fn clear_presentation(&self) {
        self.push(Event::Clear);
    }

    async fn set_background(&self, background: Background) {
        self.push(Event::Background(background));
    }

    async fn announce(&self, text: &str, _dwell: Duration) {
        self.push(Event::Announce(text.to_string()));
    }

    async fn mark_dead(&self, seat: Seat) {
        self.push(Event::MarkDead(seat));
    }

    async fn show_vote_count(&self, seat: Seat, votes: usize) {
        self.push(Event::VoteCount(seat, votes));
    }

    async fn clear_vote_counts(&self) {
        self.push(Event::ClearVoteCounts);
    }

    async fn show_day(&self, day: u32) {
        self.push(Event::Day(day));
    }

    async fn label_player(&self, seat: Seat, role_label: Option<&str>, badge: Option<&str>) {
        self.push(Event::Label(
            seat,
            role_label.map(str::to_string),
            badge.map(str::to_string),
        ));
    }

    async fn show_failure(&self, message: &str) {
        self.push(Event::Failure(message.to_string()));
    }
}

/// Human input that replays a fixed script; running dry closes the input.
#[derive(Default)]
pub struct ScriptedInput {
    lines: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
    rejections: Mutex<Vec<String>>,
}

impl ScriptedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: Mutex::new(lines.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn rejections(&self) -> Vec<String> {
        self.rejections.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl HumanInput for ScriptedInput {
    async fn prompt(&self, text: &str) -> Result<String, GameError> {
        self.prompts.lock().unwrap_or_else(PoisonError::into_inner).push(text.to_string());
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .ok_or(GameError::InputClosed)
    }

    async fn reject(&self, message: &str) {
        self.rejections.lock().unwrap_or_else(PoisonError::into_inner).push(message.to_string());
    }
}

#[derive(Default)]
pub struct MemoryHistory {
    entries: Mutex<Vec<HistoryEntry>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl HistorySink for MemoryHistory {
    fn record(&self, entry: HistoryEntry) {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).push(entry);
    }
}
