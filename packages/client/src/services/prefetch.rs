use tracing::debug;

use super::action_queue::{Action, ActionQueue};
use crate::backend::BackendClient;
use crate::models::{Roster, Seat};

/// A speculative request worth issuing for an upcoming action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prefetch {
    Speak(Seat),
    Divine(Seat),
    CurrentTime,
    VoteTally,
}

/// Looks ahead from the action at `cursor` for the first upcoming action whose
/// backend call does not depend on anything still unsettled.
///
/// Dead or human speakers and actions with nothing to warm are skipped.
/// WitchPhase and CheckWinner end the scan: nothing past them is warmed.
pub fn plan(queue: &ActionQueue, cursor: usize, roster: &Roster) -> Option<Prefetch> {
    let mut index = queue.next_index(cursor);
    for _ in 0..queue.len() {
        match queue.get(index)? {
            Action::Speak(seat) => {
                if roster.get(seat).map_or(false, |p| p.is_living_agent()) {
                    return Some(Prefetch::Speak(seat));
                }
            }
            Action::Divine => {
                if let Some(seer) = roster.diviner().filter(|p| p.is_alive) {
                    return Some(Prefetch::Divine(seer.index));
                }
            }
            Action::EndNight => return Some(Prefetch::CurrentTime),
            Action::Execute => return Some(Prefetch::VoteTally),
            Action::WitchPhase | Action::CheckWinner => return None,
            Action::WolfPhase | Action::Vote(_) | Action::EndDay => {}
        }
        index = queue.next_index(index);
    }
    None
}

pub fn issue(client: &BackendClient, prefetch: Prefetch) {
    match prefetch {
        Prefetch::Speak(seat) => client.prefetch_speak(seat, ""),
        Prefetch::Divine(seat) => client.prefetch_divine(seat),
        Prefetch::CurrentTime => client.prefetch_current_time(),
        // the tally is read fresh by Execute itself
        Prefetch::VoteTally => debug!("vote tally is not cached, nothing to warm"),
    }
}
