use serde::{Deserialize, Serialize};

use super::player::Seat;

/// Verdict string the backend returns while nobody has won yet.
pub const UNDECIDED: &str = "胜负未分";

/// Sentinel the backend uses for "nobody" in target fields.
pub const NO_TARGET: i32 = -1;

/// Sentinel telling the backend to let the agent decide.
pub const AGENT_DECIDES: i32 = -100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    #[serde(rename = "白天")]
    Day,
    #[serde(rename = "夜晚")]
    Night,
}

/// Day counter and phase as last read from the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clock {
    #[serde(rename = "current_day")]
    pub day: u32,
    #[serde(rename = "current_phase")]
    pub phase: Phase,
}

impl Default for Clock {
    fn default() -> Self {
        Clock {
            day: 1,
            phase: Phase::Night,
        }
    }
}

impl Clock {
    pub fn is_day(&self) -> bool {
        self.phase == Phase::Day
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    #[serde(rename = "被狼人杀死")]
    WolfKill,
    #[serde(rename = "被女巫毒杀")]
    Poison,
    #[serde(rename = "被投票处决")]
    Execution,
    #[serde(rename = "被猎人杀死")]
    HunterShot,
}

/// What an action hands back to the driver loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// The game is decided; carries the backend's verdict text.
    Finished(String),
}

/// Maps the wire sentinel (`-1` or any non-positive value) to "no seat".
pub fn target(raw: i32) -> Option<Seat> {
    if raw > 0 {
        Some(raw as Seat)
    } else {
        None
    }
}
