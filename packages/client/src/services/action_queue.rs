use crate::models::{Roster, Seat};

/// One step of the day/night cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Divine,
    WolfPhase,
    WitchPhase,
    CheckWinner,
    EndNight,
    Speak(Seat),
    Vote(Seat),
    Execute,
    EndDay,
}

/// The fixed, cyclic action order for a session.
///
/// Built once from the starting roster. Dead seats keep their Speak/Vote
/// slots; those actions turn into no-ops when they come up.
#[derive(Debug, Clone)]
pub struct ActionQueue {
    actions: Vec<Action>,
}

impl ActionQueue {
    pub fn build(roster: &Roster) -> Self {
        let seats: Vec<Seat> = roster.players().iter().map(|p| p.index).collect();

        let mut actions = vec![
            Action::Divine,
            Action::WolfPhase,
            Action::WitchPhase,
            Action::CheckWinner,
            Action::EndNight,
        ];
        actions.extend(seats.iter().map(|&seat| Action::Speak(seat)));
        actions.extend(seats.iter().map(|&seat| Action::Vote(seat)));
        actions.extend([Action::Execute, Action::CheckWinner, Action::EndDay]);

        Self { actions }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Action> {
        self.actions.get(index).copied()
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Index after `index`, wrapping at the end of the cycle.
    pub fn next_index(&self, index: usize) -> usize {
        if self.actions.is_empty() {
            0
        } else {
            (index + 1) % self.actions.len()
        }
    }
}
