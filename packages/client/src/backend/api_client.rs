use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::cache::{CacheKey, RequestCache};
use super::endpoint::{Endpoint, SafeEndpoint, UnsafeEndpoint};
use crate::error::ClientError;
use crate::models::{
    target, AttackRequest, Ballot, Clock, CureOrPoison, DeathCause, DecideKillRequest,
    DisplayConfig, DivineDecision, ExecuteOutcome, GameScores, KillDecision, LastWordsRequest, Player,
    PlayerRequest, Revenge, RevengeRequest, Roster, Seat, SpeakRequest, Speech, TtsOutcome,
    TtsRequest, TtsStatus, Verdict, VoteDecision, VoteReceipt, VoteRequest, VoteResult,
    WolfWantKill,
};

/// Cloneable HTTP half of the client; moved into prefetch tasks.
#[derive(Clone)]
struct Transport {
    http: Client,
    base_url: Arc<str>,
}

impl Transport {
    async fn call(&self, endpoint: Endpoint, body: Option<Value>) -> Result<Value, ClientError> {
        let (method, path) = endpoint.route();
        let mut request = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest(path, e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ClientError::Protocol {
                endpoint: path,
                detail: format!("status {}: {}", status, text),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ClientError::from_reqwest(path, e))
    }
}

fn decode<T: DeserializeOwned>(endpoint: Endpoint, value: Value) -> Result<T, ClientError> {
    serde_json::from_value(value).map_err(|e| ClientError::Protocol {
        endpoint: endpoint.path(),
        detail: e.to_string(),
    })
}

fn to_body<T: Serialize>(endpoint: Endpoint, payload: &T) -> Result<Value, ClientError> {
    serde_json::to_value(payload).map_err(|e| ClientError::Protocol {
        endpoint: endpoint.path(),
        detail: e.to_string(),
    })
}

/// Typed façade over the game backend.
///
/// Read-only decisions go through the request cache and come in pairs:
/// `prefetch_x` warms the cache, `x` takes the warmed answer or fetches it.
/// Everything else is a direct call that never sees the cache.
pub struct BackendClient {
    transport: Transport,
    cache: RequestCache<CacheKey, Value>,
    prefetch_enabled: bool,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Transport {
                endpoint: "client",
                message: e.to_string(),
            })?;

        Ok(Self {
            transport: Transport {
                http,
                base_url: Arc::from(base_url.trim_end_matches('/')),
            },
            cache: RequestCache::new(),
            prefetch_enabled: true,
        })
    }

    pub fn with_prefetch(mut self, enabled: bool) -> Self {
        self.prefetch_enabled = enabled;
        self
    }

    pub fn prefetch_enabled(&self) -> bool {
        self.prefetch_enabled
    }

    pub fn cache(&self) -> &RequestCache<CacheKey, Value> {
        &self.cache
    }

    fn key(endpoint: SafeEndpoint, body: Option<&Value>) -> CacheKey {
        let (method, path) = endpoint.route();
        CacheKey::new(method, path, body)
    }

    fn warm<T: Serialize>(&self, endpoint: SafeEndpoint, payload: Option<&T>) {
        if !self.prefetch_enabled {
            return;
        }
        let body = match payload.map(|p| to_body(endpoint.into(), p)).transpose() {
            Ok(body) => body,
            Err(e) => {
                debug!(error = %e, "skipping prefetch");
                return;
            }
        };
        let key = Self::key(endpoint, body.as_ref());
        let transport = self.transport.clone();
        self.cache
            .prefetch(key, move || async move { transport.call(endpoint.into(), body).await });
    }

    async fn cached<T, P>(&self, endpoint: SafeEndpoint, payload: Option<&P>) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        P: Serialize,
    {
        let body = payload.map(|p| to_body(endpoint.into(), p)).transpose()?;
        let key = Self::key(endpoint, body.as_ref());
        let transport = self.transport.clone();
        let value = self
            .cache
            .take_or_fetch(&key, move || async move {
                transport.call(endpoint.into(), body).await
            })
            .await?;
        decode(endpoint.into(), value)
    }

    async fn direct<T, P>(&self, endpoint: UnsafeEndpoint, payload: Option<&P>) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        P: Serialize,
    {
        let body = payload.map(|p| to_body(endpoint.into(), p)).transpose()?;
        let value = self.transport.call(endpoint.into(), body).await?;
        decode(endpoint.into(), value)
    }

    // ---- session ----

    pub async fn start(&self) -> Result<DisplayConfig, ClientError> {
        self.direct(UnsafeEndpoint::Start, None::<&()>).await
    }

    pub async fn status(&self) -> Result<Roster, ClientError> {
        let status: BTreeMap<Seat, Player> = self.direct(UnsafeEndpoint::Status, None::<&()>).await?;
        Ok(Roster::from_status(status))
    }

    // ---- safe reads ----

    pub fn prefetch_divine(&self, seat: Seat) {
        self.warm(SafeEndpoint::Divine, Some(&PlayerRequest { player_idx: seat }));
    }

    pub async fn divine(&self, seat: Seat) -> Result<DivineDecision, ClientError> {
        self.cached(SafeEndpoint::Divine, Some(&PlayerRequest { player_idx: seat }))
            .await
    }

    pub fn prefetch_decide_kill(&self, seat: Seat, kill_id: i32, is_second_vote: bool) {
        let request = DecideKillRequest {
            player_idx: seat,
            kill_id,
            is_second_vote,
        };
        self.warm(SafeEndpoint::DecideKill, Some(&request));
    }

    pub async fn decide_kill(
        &self,
        seat: Seat,
        kill_id: i32,
        is_second_vote: bool,
    ) -> Result<KillDecision, ClientError> {
        let request = DecideKillRequest {
            player_idx: seat,
            kill_id,
            is_second_vote,
        };
        self.cached(SafeEndpoint::DecideKill, Some(&request)).await
    }

    pub fn prefetch_decide_cure_or_poison(&self, seat: Seat) {
        self.warm(
            SafeEndpoint::DecideCureOrPoison,
            Some(&PlayerRequest { player_idx: seat }),
        );
    }

    pub async fn decide_cure_or_poison(&self, seat: Seat) -> Result<CureOrPoison, ClientError> {
        self.cached(
            SafeEndpoint::DecideCureOrPoison,
            Some(&PlayerRequest { player_idx: seat }),
        )
        .await
    }

    pub fn prefetch_current_time(&self) {
        self.warm(SafeEndpoint::CurrentTime, None::<&()>);
    }

    pub async fn current_time(&self) -> Result<Clock, ClientError> {
        self.cached(SafeEndpoint::CurrentTime, None::<&()>).await
    }

    pub fn prefetch_speak(&self, seat: Seat, content: &str) {
        let request = SpeakRequest {
            player_idx: seat,
            content: content.to_string(),
        };
        self.warm(SafeEndpoint::Speak, Some(&request));
    }

    pub async fn speak(&self, seat: Seat, content: &str) -> Result<Speech, ClientError> {
        let request = SpeakRequest {
            player_idx: seat,
            content: content.to_string(),
        };
        self.cached(SafeEndpoint::Speak, Some(&request)).await
    }

    pub fn prefetch_decide_vote(&self, seat: Seat) {
        self.warm(SafeEndpoint::DecideVote, Some(&PlayerRequest { player_idx: seat }));
    }

    pub async fn decide_vote(&self, seat: Seat) -> Result<VoteDecision, ClientError> {
        let value: Value = self
            .cached(SafeEndpoint::DecideVote, Some(&PlayerRequest { player_idx: seat }))
            .await?;
        Ok(VoteDecision::from_value(&value))
    }

    // ---- state changes and always-fresh reads ----

    pub async fn reset_wolf_want_kill(&self) -> Result<(), ClientError> {
        self.direct::<Value, ()>(UnsafeEndpoint::ResetWolfWantKill, None)
            .await
            .map(drop)
    }

    /// Aggregated wolf target; `None` on a tie or when every wolf abstained.
    pub async fn wolf_want_kill(&self) -> Result<Option<Seat>, ClientError> {
        let result: WolfWantKill = self
            .direct(UnsafeEndpoint::GetWolfWantKill, None::<&()>)
            .await?;
        Ok(target(result.wolf_want_kill))
    }

    pub async fn kill(&self, seat: Seat) -> Result<(), ClientError> {
        self.direct::<Value, _>(UnsafeEndpoint::Kill, Some(&PlayerRequest { player_idx: seat }))
            .await
            .map(drop)
    }

    pub async fn cure(&self, seat: Seat) -> Result<(), ClientError> {
        self.direct::<Value, _>(UnsafeEndpoint::Cure, Some(&PlayerRequest { player_idx: seat }))
            .await
            .map(drop)
    }

    pub async fn poison(&self, seat: Seat) -> Result<(), ClientError> {
        self.direct::<Value, _>(UnsafeEndpoint::Poison, Some(&PlayerRequest { player_idx: seat }))
            .await
            .map(drop)
    }

    pub async fn last_words(
        &self,
        seat: Seat,
        speech: &str,
        cause: DeathCause,
    ) -> Result<Speech, ClientError> {
        let request = LastWordsRequest {
            player_idx: seat,
            speak: speech.to_string(),
            death_reason: cause,
        };
        self.direct(UnsafeEndpoint::LastWords, Some(&request)).await
    }

    pub async fn revenge(&self, seat: Seat, cause: DeathCause) -> Result<Revenge, ClientError> {
        let request = RevengeRequest {
            player_idx: seat,
            death_reason: cause,
        };
        self.direct(UnsafeEndpoint::Revenge, Some(&request)).await
    }

    pub async fn attack(&self, hunter: Seat, victim: Seat) -> Result<(), ClientError> {
        let request = AttackRequest {
            player_idx: hunter,
            target_idx: victim,
        };
        self.direct::<Value, _>(UnsafeEndpoint::Attack, Some(&request))
            .await
            .map(drop)
    }

    pub async fn toggle_day_night(&self) -> Result<(), ClientError> {
        self.direct::<Value, ()>(UnsafeEndpoint::ToggleDayNight, None)
            .await
            .map(drop)
    }

    pub async fn reset_vote_result(&self) -> Result<(), ClientError> {
        self.direct::<Value, ()>(UnsafeEndpoint::ResetVoteResult, None)
            .await
            .map(drop)
    }

    pub async fn vote(&self, seat: Seat, vote_id: i32) -> Result<VoteReceipt, ClientError> {
        let request = VoteRequest {
            player_idx: seat,
            vote_id,
        };
        self.direct(UnsafeEndpoint::Vote, Some(&request)).await
    }

    pub async fn vote_result(&self) -> Result<Vec<Ballot>, ClientError> {
        let result: VoteResult = self
            .direct(UnsafeEndpoint::GetVoteResult, None::<&()>)
            .await?;
        Ok(result.vote_result)
    }

    /// The backend decides who is executed; `None` on a tie or a full abstain.
    pub async fn execute(&self) -> Result<Option<Seat>, ClientError> {
        let outcome: ExecuteOutcome = self.direct(UnsafeEndpoint::Execute, None::<&()>).await?;
        debug!(message = %outcome.message, "execute");
        Ok(target(outcome.executed_player))
    }

    pub async fn check_winner(&self) -> Result<Verdict, ClientError> {
        self.direct(UnsafeEndpoint::CheckWinner, None::<&()>).await
    }

    pub async fn generate_tts(&self, text: &str) -> Result<TtsOutcome, ClientError> {
        self.direct(UnsafeEndpoint::GenerateTts, Some(&TtsRequest::new(text)))
            .await
    }

    pub async fn tts_status(&self) -> Result<TtsStatus, ClientError> {
        self.direct(UnsafeEndpoint::TtsStatus, None::<&()>).await
    }

    pub async fn history(&self) -> Result<Value, ClientError> {
        self.direct(UnsafeEndpoint::GetHistory, None::<&()>).await
    }

    pub async fn game_scores(&self) -> Result<GameScores, ClientError> {
        self.direct(UnsafeEndpoint::GetGameScores, None::<&()>).await
    }
}
