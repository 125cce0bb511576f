#![allow(dead_code)]

use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use werewolf_client::backend::BackendClient;
use werewolf_client::models::{Clock, DisplayConfig, Phase, Player, Roster};
use werewolf_client::services::{ActionQueue, GameContext};
use werewolf_client::utils::test_setup::{
    setup_test_env, MemoryHistory, RecordingPresenter, ScriptedInput,
};

pub struct Harness {
    pub ctx: GameContext,
    pub presenter: Arc<RecordingPresenter>,
    pub input: Arc<ScriptedInput>,
    pub history: Arc<MemoryHistory>,
}

impl Harness {
    pub fn new(server: &MockServer, players: Vec<Player>, lines: Vec<&str>) -> Self {
        setup_test_env();
        let roster = Roster::new(players);
        let presenter = Arc::new(RecordingPresenter::new());
        let input = Arc::new(ScriptedInput::new(lines));
        let history = Arc::new(MemoryHistory::new());
        let client = BackendClient::new(&server.uri(), Duration::from_secs(5)).unwrap();

        let ctx = GameContext {
            client,
            queue: ActionQueue::build(&roster),
            roster,
            display: DisplayConfig::default(),
            // second night: deaths leave no last words unless executed by day
            clock: Clock {
                day: 2,
                phase: Phase::Night,
            },
            deaths: Vec::new(),
            cursor: 0,
            presenter: presenter.clone(),
            input: input.clone(),
            history: history.clone(),
        };

        Self {
            ctx,
            presenter,
            input,
            history,
        }
    }

    pub fn at(mut self, day: u32, phase: Phase) -> Self {
        self.ctx.clock = Clock { day, phase };
        self
    }
}

/// `/status` payload for a roster.
pub fn status_body(players: &[Player]) -> Value {
    let mut map = Map::new();
    for player in players {
        map.insert(player.index.to_string(), serde_json::to_value(player).unwrap());
    }
    Value::Object(map)
}

pub fn ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"message": "ok"}))
}

pub fn reply(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

pub async fn mount_ok(server: &MockServer, http_method: &str, route: &str) {
    Mock::given(method(http_method))
        .and(path(route))
        .respond_with(ok())
        .mount(server)
        .await;
}

/// Lets spawned prefetch tasks reach the mock server.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(100)).await;
}
