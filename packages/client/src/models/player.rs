use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 1-based seat index, stable for the whole game.
pub type Seat = u32;

/// Label shown instead of the role when role display is off.
pub const ROLE_PLACEHOLDER: &str = "玩家";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "狼人")]
    Werewolf,
    #[serde(rename = "预言家")]
    Seer,
    #[serde(rename = "女巫")]
    Witch,
    #[serde(rename = "猎人")]
    Hunter,
    #[serde(rename = "村民")]
    Villager,
}

impl Role {
    /// The role string exactly as the backend spells it.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Werewolf => "狼人",
            Role::Seer => "预言家",
            Role::Witch => "女巫",
            Role::Hunter => "猎人",
            Role::Villager => "村民",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Player {
    pub index: Seat,
    #[serde(default)]
    pub name: String,
    pub role_type: Role,
    pub is_alive: bool,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub is_human: bool,
}

impl Player {
    pub fn new(index: Seat, role_type: Role) -> Self {
        Self {
            index,
            name: format!("{}号玩家", index),
            role_type,
            is_alive: true,
            model: String::new(),
            is_human: false,
        }
    }

    pub fn human(mut self) -> Self {
        self.is_human = true;
        self.model = "human".to_string();
        self
    }

    pub fn dead(mut self) -> Self {
        self.is_alive = false;
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    /// Living agent seat, i.e. one whose decision can be fetched ahead of time.
    pub fn is_living_agent(&self) -> bool {
        self.is_alive && !self.is_human
    }
}

/// Snapshot of every seat. Replaced wholesale on each status refresh.
#[derive(Clone, Debug, Default)]
pub struct Roster {
    players: Vec<Player>,
}

impl Roster {
    pub fn new(mut players: Vec<Player>) -> Self {
        players.sort_by_key(|p| p.index);
        Self { players }
    }

    /// The `/status` payload is an object keyed by seat number.
    pub fn from_status(status: BTreeMap<Seat, Player>) -> Self {
        Self::new(status.into_values().collect())
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn get(&self, seat: Seat) -> Option<&Player> {
        self.players.iter().find(|p| p.index == seat)
    }

    pub fn is_alive(&self, seat: Seat) -> bool {
        self.get(seat).map_or(false, |p| p.is_alive)
    }

    pub fn is_human(&self, seat: Seat) -> bool {
        self.get(seat).map_or(false, |p| p.is_human)
    }

    pub fn find_role(&self, role: Role) -> Option<&Player> {
        self.players.iter().find(|p| p.role_type == role)
    }

    pub fn diviner(&self) -> Option<&Player> {
        self.find_role(Role::Seer)
    }

    pub fn witch(&self) -> Option<&Player> {
        self.find_role(Role::Witch)
    }

    pub fn hunter(&self) -> Option<&Player> {
        self.find_role(Role::Hunter)
    }

    pub fn wolves(&self) -> Vec<&Player> {
        self.players
            .iter()
            .filter(|p| p.role_type == Role::Werewolf)
            .collect()
    }

    /// Next living agent seated after `seat` in roster order. Does not wrap.
    pub fn next_living_agent_after(&self, seat: Seat) -> Option<Seat> {
        let position = self.players.iter().position(|p| p.index == seat)?;
        self.players[position + 1..]
            .iter()
            .find(|p| p.is_living_agent())
            .map(|p| p.index)
    }

    /// Role label for display: the role string, or the placeholder when roles are hidden.
    pub fn role_label(&self, seat: Seat, display_role: bool) -> &'static str {
        match self.get(seat) {
            Some(player) if display_role => player.role_type.as_str(),
            _ => ROLE_PLACEHOLDER,
        }
    }
}

/// Vendor badge for a known agent model id.
pub fn model_badge(model: &str) -> Option<&'static str> {
    let badge = match model {
        "o3-mini" | "o3-mini-2025-01-31" => "gpt",
        "deepseek-ai/DeepSeek-R1"
        | "Pro/deepseek-ai/DeepSeek-R1"
        | "ep-20250216231709-2qcrf" => "deepseek",
        "gemini-2.0-flash-thinking-exp-01-21" => "gemini",
        "qwen-max-2025-01-25" => "qwen",
        "moonshot-v1-32k" => "kimi",
        "glm-4-plus" => "glm",
        "Baichuan4" => "baichuan",
        "ep-20250216184924-4n4b2" => "doubao",
        "hunyuan-large" => "hunyuan",
        _ => return None,
    };
    Some(badge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_roster() -> Roster {
        Roster::new(vec![
            Player::new(3, Role::Witch),
            Player::new(1, Role::Werewolf).human(),
            Player::new(2, Role::Seer).dead(),
            Player::new(4, Role::Hunter),
            Player::new(5, Role::Werewolf),
        ])
    }

    #[test]
    fn test_roster_is_sorted_by_seat() {
        let roster = sample_roster();
        let seats: Vec<Seat> = roster.players().iter().map(|p| p.index).collect();
        assert_eq!(seats, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_role_queries() {
        let roster = sample_roster();
        assert_eq!(roster.diviner().map(|p| p.index), Some(2));
        assert_eq!(roster.witch().map(|p| p.index), Some(3));
        assert_eq!(roster.hunter().map(|p| p.index), Some(4));
        let wolves: Vec<Seat> = roster.wolves().iter().map(|p| p.index).collect();
        assert_eq!(wolves, vec![1, 5]);
    }

    #[test]
    fn test_next_living_agent_skips_dead_and_human_and_never_wraps() {
        let roster = sample_roster();
        // 2 is dead
        assert_eq!(roster.next_living_agent_after(1), Some(3));
        assert_eq!(roster.next_living_agent_after(4), Some(5));
        assert_eq!(roster.next_living_agent_after(5), None);
        assert_eq!(roster.next_living_agent_after(42), None);
    }

    #[test]
    fn test_role_label_for_every_seat() {
        let roster = sample_roster();
        for player in roster.players() {
            assert_eq!(
                roster.role_label(player.index, true),
                player.role_type.as_str()
            );
            assert_eq!(roster.role_label(player.index, false), ROLE_PLACEHOLDER);
        }
    }

    #[test]
    fn test_roster_from_status_payload() {
        let payload = json!({
            "2": {"index": 2, "name": "2号玩家", "role_type": "女巫", "is_alive": true, "model": "glm-4-plus", "is_human": false},
            "1": {"index": 1, "name": "1号玩家", "role_type": "狼人", "is_alive": false, "model": "human", "is_human": true}
        });
        let status: BTreeMap<Seat, Player> = serde_json::from_value(payload).unwrap();
        let roster = Roster::from_status(status);

        assert_eq!(roster.len(), 2);
        assert_eq!(roster.get(1).unwrap().role_type, Role::Werewolf);
        assert!(!roster.is_alive(1));
        assert!(roster.is_human(1));
        assert_eq!(roster.get(2).unwrap().model, "glm-4-plus");
    }

    #[test]
    fn test_model_badge() {
        assert_eq!(model_badge("glm-4-plus"), Some("glm"));
        assert_eq!(model_badge("Pro/deepseek-ai/DeepSeek-R1"), Some("deepseek"));
        assert_eq!(model_badge("human"), None);
    }
}
