use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::game::{DeathCause, NO_TARGET, UNDECIDED};
use super::player::Seat;

// ---- requests ----

#[derive(Debug, Serialize, Deserialize)]
pub struct PlayerRequest {
    pub player_idx: Seat,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DecideKillRequest {
    pub player_idx: Seat,
    pub kill_id: i32,
    pub is_second_vote: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SpeakRequest {
    pub player_idx: Seat,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VoteRequest {
    pub player_idx: Seat,
    pub vote_id: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LastWordsRequest {
    pub player_idx: Seat,
    pub speak: String,
    pub death_reason: DeathCause,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RevengeRequest {
    pub player_idx: Seat,
    pub death_reason: DeathCause,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AttackRequest {
    pub player_idx: Seat,
    pub target_idx: Seat,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TtsRequest {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    pub model: String,
    pub use_cache: bool,
}

impl TtsRequest {
    /// Voice left unset so the backend picks one.
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            voice: None,
            model: "tts-1".to_string(),
            use_cache: true,
        }
    }
}

// ---- responses ----

fn enabled() -> bool {
    true
}

/// Display toggles returned by `/start`. Fixed for the rest of the session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisplayConfig {
    #[serde(default = "enabled")]
    pub display_role: bool,
    #[serde(default = "enabled")]
    pub display_thinking: bool,
    #[serde(default = "enabled")]
    pub display_witch_action: bool,
    #[serde(default = "enabled")]
    pub display_wolf_action: bool,
    #[serde(default = "enabled")]
    pub display_hunter_action: bool,
    #[serde(default = "enabled")]
    pub display_divine_action: bool,
    #[serde(default = "enabled")]
    pub display_vote_action: bool,
    #[serde(default = "enabled")]
    pub display_model: bool,
    #[serde(default = "enabled")]
    pub auto_play: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            display_role: true,
            display_thinking: true,
            display_witch_action: true,
            display_wolf_action: true,
            display_hunter_action: true,
            display_divine_action: true,
            display_vote_action: true,
            display_model: true,
            auto_play: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DivineDecision {
    #[serde(default)]
    pub divine: i32,
    #[serde(default)]
    pub thinking: String,
}

/// One wolf's kill vote. The backend calls the narrative `reason`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KillDecision {
    pub kill: i32,
    #[serde(default)]
    pub reason: String,
}

impl KillDecision {
    pub fn abstain() -> Self {
        Self {
            kill: NO_TARGET,
            reason: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WolfWantKill {
    pub wolf_want_kill: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CureOrPoison {
    #[serde(default)]
    pub cure: i32,
    #[serde(default = "no_target")]
    pub poison: i32,
    #[serde(default)]
    pub thinking: String,
}

fn no_target() -> i32 {
    NO_TARGET
}

impl CureOrPoison {
    pub fn cures(&self) -> bool {
        self.cure == 1
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Speech {
    #[serde(default)]
    pub speak: String,
    #[serde(default)]
    pub thinking: String,
    #[serde(default)]
    pub audio_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Revenge {
    #[serde(default = "no_target")]
    pub attack: i32,
    #[serde(default)]
    pub thinking: String,
}

/// An agent's vote intention. Not recorded by the backend until submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteDecision {
    pub vote: Option<i32>,
    pub thinking: String,
}

impl VoteDecision {
    /// Lenient decoding: a missing, non-numeric or out-of-range `vote` yields `None`.
    pub fn from_value(value: &Value) -> Self {
        let vote = value
            .get("vote")
            .and_then(Value::as_i64)
            .and_then(|v| i32::try_from(v).ok());
        let thinking = value
            .get("thinking")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Self { vote, thinking }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteReceipt {
    #[serde(default = "no_target")]
    pub vote: i32,
    #[serde(default)]
    pub thinking: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    pub player_idx: Seat,
    pub vote_id: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteResult {
    #[serde(default)]
    pub vote_result: Vec<Ballot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteOutcome {
    #[serde(default)]
    pub message: String,
    pub executed_player: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub winner: String,
}

impl Verdict {
    pub fn is_decided(&self) -> bool {
        self.winner != UNDECIDED
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsOutcome {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub audio_path: Option<String>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsStatus {
    #[serde(default)]
    pub available: bool,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreLine {
    pub player_index: Seat,
    #[serde(default)]
    pub role_type: String,
    #[serde(default)]
    pub total_score: f64,
}

/// Post-game scores. Before scoring finishes the backend only sends `message`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameScores {
    #[serde(default)]
    pub winner: Option<String>,
    #[serde(default)]
    pub ranking: Vec<ScoreLine>,
    #[serde(default)]
    pub message: Option<String>,
}

impl GameScores {
    pub fn summary(&self) -> Option<String> {
        if self.ranking.is_empty() {
            return self.message.clone();
        }
        let lines: Vec<String> = self
            .ranking
            .iter()
            .enumerate()
            .map(|(i, line)| {
                format!(
                    "第{}名：{}号 {} - {}分",
                    i + 1,
                    line.player_index,
                    line.role_type,
                    line.total_score
                )
            })
            .collect();
        Some(lines.join("\n"))
    }
}
