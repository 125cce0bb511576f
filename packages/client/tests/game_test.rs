mod common;

use common::{mount_ok, reply, settle, status_body, Harness};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use werewolf_client::backend::BackendClient;
use werewolf_client::error::{ClientError, GameError};
use werewolf_client::models::{Player, Role};
use werewolf_client::services::{Action, Game};
use werewolf_client::utils::test_setup::{
    setup_test_env, Event, MemoryHistory, RecordingPresenter, ScriptedInput,
};

fn small_village() -> Vec<Player> {
    vec![
        Player::new(1, Role::Werewolf).with_model("glm-4-plus"),
        Player::new(2, Role::Seer),
        Player::new(3, Role::Witch),
        Player::new(4, Role::Hunter),
        Player::new(5, Role::Villager),
    ]
}

fn position(h: &Harness, action: Action) -> usize {
    h.ctx
        .queue
        .actions()
        .iter()
        .position(|&a| a == action)
        .unwrap()
}

async fn mount_session(server: &MockServer, players: &[Player]) {
    Mock::given(method("GET"))
        .and(path("/start"))
        .respond_with(reply(json!({"display_model": true})))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(reply(status_body(players)))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/current_time"))
        .respond_with(reply(json!({"current_day": 1, "current_phase": "夜晚"})))
        .up_to_n_times(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/current_time"))
        .respond_with(reply(json!({"current_day": 2, "current_phase": "白天"})))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_scheduler_skips_dead_speaker() {
    let mock_server = MockServer::start().await;
    let mut players = small_village();
    players[1] = Player::new(2, Role::Seer).dead();

    Mock::given(method("POST"))
        .and(path("/speak"))
        .and(body_json(json!({"player_idx": 3, "content": ""})))
        .respond_with(reply(json!({"speak": "hi", "thinking": ""})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut h = Harness::new(&mock_server, players, vec![]);
    h.ctx.cursor = position(&h, Action::Speak(1));
    h.ctx.prefetch_next();
    h.ctx.prefetch_next();
    settle().await;

    assert_eq!(h.ctx.client.cache().len(), 1);
}

#[tokio::test]
async fn test_scheduler_issues_nothing_before_witch_or_check_winner() {
    let mock_server = MockServer::start().await;
    let mut h = Harness::new(&mock_server, small_village(), vec![]);

    for action in [Action::WolfPhase, Action::WitchPhase, Action::Execute] {
        h.ctx.cursor = position(&h, action);
        h.ctx.prefetch_next();
    }
    settle().await;

    assert!(mock_server.received_requests().await.unwrap().is_empty());
    assert!(h.ctx.client.cache().is_empty());
}

#[tokio::test]
async fn test_prefetch_can_be_switched_off() {
    let mock_server = MockServer::start().await;
    let mut h = Harness::new(&mock_server, small_village(), vec![]);
    h.ctx.client = BackendClient::new(&mock_server.uri(), Duration::from_secs(5))
        .unwrap()
        .with_prefetch(false);

    h.ctx.cursor = position(&h, Action::EndNight);
    h.ctx.prefetch_next();
    settle().await;

    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_full_game_runs_to_verdict() {
    setup_test_env();
    let mock_server = MockServer::start().await;
    let players = small_village();
    mount_session(&mock_server, &players).await;

    Mock::given(method("POST"))
        .and(path("/divine"))
        .and(body_json(json!({"player_idx": 2})))
        .respond_with(reply(json!({"divine": 1, "thinking": "1 looks nervous"})))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_ok(&mock_server, "POST", "/reset_wolf_want_kill").await;
    Mock::given(method("POST"))
        .and(path("/decide_kill"))
        .respond_with(reply(json!({"kill": -1, "reason": ""})))
        .expect(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/get_wolf_want_kill"))
        .respond_with(reply(json!({"wolf_want_kill": -1})))
        .expect(3)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/decide_cure_or_poison"))
        .respond_with(reply(json!({"cure": 0, "poison": -1, "thinking": ""})))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/check_winner"))
        .respond_with(reply(json!({"winner": "胜负未分"})))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/check_winner"))
        .respond_with(reply(json!({"winner": "好人胜利"})))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_ok(&mock_server, "POST", "/toggle_day_night").await;
    mount_ok(&mock_server, "POST", "/reset_vote_result").await;
    Mock::given(method("POST"))
        .and(path("/speak"))
        .respond_with(reply(json!({"speak": "I am a villager.", "thinking": "", "audio_path": "/a.mp3"})))
        .expect(5)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/decide_vote"))
        .respond_with(reply(json!({"vote": 1, "thinking": "wolf"})))
        .expect(5)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/vote"))
        .respond_with(reply(json!({"vote": 1, "thinking": ""})))
        .expect(5)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/get_vote_result"))
        .respond_with(reply(json!({"vote_result": [
            {"player_idx": 1, "vote_id": 2},
            {"player_idx": 2, "vote_id": 1},
            {"player_idx": 3, "vote_id": 1},
            {"player_idx": 4, "vote_id": 1},
            {"player_idx": 5, "vote_id": 1}
        ]})))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/execute"))
        .respond_with(reply(json!({"message": "1号玩家 被处决!", "executed_player": 1})))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/last_words"))
        .and(body_json(json!({"player_idx": 1, "speak": "", "death_reason": "被投票处决"})))
        .respond_with(reply(json!({"speak": "You got me.", "thinking": ""})))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/get_game_scores"))
        .respond_with(reply(json!({"message": "游戏尚未结束或积分未计算"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let presenter = Arc::new(RecordingPresenter::new());
    let client = BackendClient::new(&mock_server.uri(), Duration::from_secs(5)).unwrap();
    let mut game = Game::start(
        client,
        presenter.clone(),
        Arc::new(ScriptedInput::default()),
        Arc::new(MemoryHistory::new()),
    )
    .await
    .unwrap();

    let winner = game.run().await.unwrap();

    assert_eq!(winner, "好人胜利");
    assert_eq!(game.current_action(), Some(Action::EndDay));
    assert_eq!(game.context().deaths, vec![1]);
    assert!(game.context().client.cache().is_empty());

    let events = presenter.events();
    assert!(events.contains(&Event::Label(
        1,
        Some("狼人".to_string()),
        Some("glm".to_string())
    )));
    assert!(events.contains(&Event::Day(2)));
    assert!(events.contains(&Event::VoteCount(1, 4)));
    assert_eq!(
        presenter.announcements(),
        vec![
            "今晚是平安夜".to_string(),
            "天亮了".to_string(),
            "好人胜利".to_string(),
            "游戏尚未结束或积分未计算".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_failed_action_halts_and_keeps_cursor() {
    let mock_server = MockServer::start().await;
    let players = small_village();
    mount_session(&mock_server, &players).await;

    Mock::given(method("POST"))
        .and(path("/divine"))
        .respond_with(reply(json!({"divine": 1, "thinking": ""})))
        .mount(&mock_server)
        .await;
    mount_ok(&mock_server, "POST", "/reset_wolf_want_kill").await;
    Mock::given(method("POST"))
        .and(path("/decide_kill"))
        .respond_with(reply(json!({"kill": 5, "reason": ""})))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/get_wolf_want_kill"))
        .respond_with(reply(json!({"wolf_want_kill": 5})))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/decide_cure_or_poison"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let presenter = Arc::new(RecordingPresenter::new());
    let client = BackendClient::new(&mock_server.uri(), Duration::from_secs(5)).unwrap();
    let mut game = Game::start(
        client,
        presenter.clone(),
        Arc::new(ScriptedInput::default()),
        Arc::new(MemoryHistory::new()),
    )
    .await
    .unwrap();

    let result = game.run().await;

    assert!(matches!(
        result,
        Err(GameError::Client(ClientError::Protocol {
            endpoint: "/decide_cure_or_poison",
            ..
        }))
    ));
    assert_eq!(game.current_action(), Some(Action::WitchPhase));
    assert!(presenter
        .events()
        .iter()
        .any(|e| matches!(e, Event::Failure(_))));
}
