use reqwest::Method;

/// Read-only endpoints whose answers may be fetched ahead of time and cached
/// until one consumer takes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SafeEndpoint {
    Divine,
    DecideKill,
    DecideCureOrPoison,
    CurrentTime,
    Speak,
    DecideVote,
}

/// Endpoints that mutate game state, or whose answer must always be fresh.
/// These never touch the request cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnsafeEndpoint {
    Start,
    Status,
    ResetWolfWantKill,
    GetWolfWantKill,
    Kill,
    Cure,
    Poison,
    LastWords,
    Revenge,
    Attack,
    ToggleDayNight,
    ResetVoteResult,
    Vote,
    GetVoteResult,
    Execute,
    CheckWinner,
    GenerateTts,
    TtsStatus,
    GetHistory,
    GetGameScores,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Safe(SafeEndpoint),
    Unsafe(UnsafeEndpoint),
}

impl SafeEndpoint {
    pub fn route(self) -> (Method, &'static str) {
        match self {
            SafeEndpoint::Divine => (Method::POST, "/divine"),
            SafeEndpoint::DecideKill => (Method::POST, "/decide_kill"),
            SafeEndpoint::DecideCureOrPoison => (Method::POST, "/decide_cure_or_poison"),
            SafeEndpoint::CurrentTime => (Method::GET, "/current_time"),
            SafeEndpoint::Speak => (Method::POST, "/speak"),
            SafeEndpoint::DecideVote => (Method::POST, "/decide_vote"),
        }
    }
}

impl UnsafeEndpoint {
    pub fn route(self) -> (Method, &'static str) {
        match self {
            UnsafeEndpoint::Start => (Method::GET, "/start"),
            UnsafeEndpoint::Status => (Method::GET, "/status"),
            UnsafeEndpoint::ResetWolfWantKill => (Method::POST, "/reset_wolf_want_kill"),
            UnsafeEndpoint::GetWolfWantKill => (Method::GET, "/get_wolf_want_kill"),
            UnsafeEndpoint::Kill => (Method::POST, "/kill"),
            UnsafeEndpoint::Cure => (Method::POST, "/cure"),
            UnsafeEndpoint::Poison => (Method::POST, "/poison"),
            UnsafeEndpoint::LastWords => (Method::POST, "/last_words"),
            UnsafeEndpoint::Revenge => (Method::POST, "/revenge"),
            UnsafeEndpoint::Attack => (Method::POST, "/attack"),
            UnsafeEndpoint::ToggleDayNight => (Method::POST, "/toggle_day_night"),
            UnsafeEndpoint::ResetVoteResult => (Method::POST, "/reset_vote_result"),
            UnsafeEndpoint::Vote => (Method::POST, "/vote"),
            UnsafeEndpoint::GetVoteResult => (Method::GET, "/get_vote_result"),
            UnsafeEndpoint::Execute => (Method::POST, "/execute"),
            UnsafeEndpoint::CheckWinner => (Method::GET, "/check_winner"),
            UnsafeEndpoint::GenerateTts => (Method::POST, "/generate_tts"),
            UnsafeEndpoint::TtsStatus => (Method::GET, "/tts_status"),
            UnsafeEndpoint::GetHistory => (Method::GET, "/get_history"),
            UnsafeEndpoint::GetGameScores => (Method::GET, "/get_game_scores"),
        }
    }
}

impl Endpoint {
    pub fn route(self) -> (Method, &'static str) {
        match self {
            Endpoint::Safe(endpoint) => endpoint.route(),
            Endpoint::Unsafe(endpoint) => endpoint.route(),
        }
    }

    pub fn path(self) -> &'static str {
        self.route().1
    }
}

impl From<SafeEndpoint> for Endpoint {
    fn from(endpoint: SafeEndpoint) -> Self {
        Endpoint::Safe(endpoint)
    }
}

impl From<UnsafeEndpoint> for Endpoint {
    fn from(endpoint: UnsafeEndpoint) -> Self {
        Endpoint::Unsafe(endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_changing_endpoints_are_posts() {
        for endpoint in [
            UnsafeEndpoint::Kill,
            UnsafeEndpoint::Cure,
            UnsafeEndpoint::Poison,
            UnsafeEndpoint::Vote,
            UnsafeEndpoint::Execute,
            UnsafeEndpoint::ToggleDayNight,
            UnsafeEndpoint::ResetVoteResult,
            UnsafeEndpoint::ResetWolfWantKill,
        ] {
            let (method, _) = endpoint.route();
            assert_eq!(method, Method::POST, "{:?}", endpoint);
        }
    }

    #[test]
    fn test_paths() {
        assert_eq!(Endpoint::from(SafeEndpoint::DecideKill).path(), "/decide_kill");
        assert_eq!(
            Endpoint::from(UnsafeEndpoint::GetWolfWantKill).route(),
            (Method::GET, "/get_wolf_want_kill")
        );
    }
}
