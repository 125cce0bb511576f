use std::sync::Arc;

use super::action_queue::ActionQueue;
use super::prefetch;
use crate::backend::BackendClient;
use crate::models::{Clock, DisplayConfig, Roster, Seat};
use crate::utils::{HistoryEntry, HistoryKind, HistorySink, HumanInput, Presenter, Reveal};

/// Session state shared by every action.
///
/// Only the driver and the action currently running touch it, one step at a
/// time, so nothing here needs a lock.
pub struct GameContext {
    pub client: BackendClient,
    pub roster: Roster,
    pub display: DisplayConfig,
    pub clock: Clock,
    /// Seats that died in the phase in progress.
    pub deaths: Vec<Seat>,
    pub queue: ActionQueue,
    pub cursor: usize,
    pub presenter: Arc<dyn Presenter>,
    pub input: Arc<dyn HumanInput>,
    pub history: Arc<dyn HistorySink>,
}

impl GameContext {
    pub fn role_label(&self, seat: Seat) -> &'static str {
        self.roster.role_label(seat, self.display.display_role)
    }

    /// Warms the next prefetchable action after the cursor, if any.
    pub fn prefetch_next(&self) {
        if let Some(next) = prefetch::plan(&self.queue, self.cursor, &self.roster) {
            prefetch::issue(&self.client, next);
        }
    }

    pub fn record(&self, seat: Seat, kind: HistoryKind, text: &str) {
        self.history.record(HistoryEntry {
            seat,
            role_label: self.role_label(seat).to_string(),
            kind,
            text: text.to_string(),
        });
    }

    /// Shows a seat's thinking and records it.
    pub async fn reveal_thinking(&self, seat: Seat, thinking: &str) {
        let title = format!("{}号 {} 思考中：", seat, self.role_label(seat));
        self.presenter
            .reveal(Reveal::thinking(title, self.display.auto_play, thinking))
            .await;
        self.record(seat, HistoryKind::Thinking, thinking);
    }

    /// Shows a line said by a seat under a heading such as "发言：".
    pub async fn reveal_line(&self, seat: Seat, heading: &str, body: &str) {
        let title = format!("{}号 {} {}", seat, self.role_label(seat), heading);
        self.presenter
            .reveal(Reveal::speech(title, self.display.auto_play, body))
            .await;
    }
}
