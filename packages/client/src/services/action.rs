use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::action_queue::Action;
use super::context::GameContext;
use super::death::handle_death;
use super::input::prompt_target;
use crate::error::GameError;
use crate::models::{
    target, Ballot, DeathCause, Flow, KillDecision, Player, Role, Seat, AGENT_DECIDES, NO_TARGET,
};
use crate::utils::{Background, HistoryKind, Reveal};

const DEATH_LIST_DWELL: Duration = Duration::from_secs(2);
const VERDICT_DWELL: Duration = Duration::from_secs(3);

impl Action {
    /// Runs one step of the cycle. Only a decided CheckWinner finishes the game.
    pub async fn execute(self, ctx: &mut GameContext) -> Result<Flow, GameError> {
        debug!(action = ?self, cursor = ctx.cursor, "executing");
        match self {
            Action::Divine => divine(ctx).await?,
            Action::WolfPhase => wolf_phase(ctx).await?,
            Action::WitchPhase => witch_phase(ctx).await?,
            Action::CheckWinner => return check_winner(ctx).await,
            Action::EndNight => end_night(ctx).await?,
            Action::Speak(seat) => speak(ctx, seat).await?,
            Action::Vote(seat) => vote(ctx, seat).await?,
            Action::Execute => execute(ctx).await?,
            Action::EndDay => end_day(ctx).await?,
        }
        Ok(Flow::Continue)
    }
}

async fn divine(ctx: &mut GameContext) -> Result<(), GameError> {
    let seer = ctx
        .roster
        .diviner()
        .cloned()
        .ok_or(GameError::MissingRole(Role::Seer))?;
    if !seer.is_alive {
        return Ok(());
    }
    info!(seat = seer.index, "seer divines");
    let decision = ctx.client.divine(seer.index).await?;

    if ctx.display.display_thinking && ctx.display.display_divine_action {
        ctx.presenter.present_player(seer.index).await;
        ctx.prefetch_next();
        ctx.reveal_thinking(seer.index, &decision.thinking).await;
        ctx.presenter.clear_presentation().await;
    }
    Ok(())
}

async fn wolf_phase(ctx: &mut GameContext) -> Result<(), GameError> {
    info!("wolves act");
    ctx.client.reset_wolf_want_kill().await?;
    let wolves: Vec<Player> = ctx.roster.wolves().into_iter().cloned().collect();

    for is_second_vote in [false, true] {
        for (i, wolf) in wolves.iter().enumerate() {
            if wolf.is_alive {
                wolf_vote(ctx, &wolves, i, is_second_vote).await?;
            }
        }
        match ctx.client.wolf_want_kill().await? {
            Some(seat) => {
                info!(seat, "wolves agreed on a target");
                return Ok(());
            }
            None if !is_second_vote => info!("wolf vote inconclusive, voting again"),
            None => info!("second wolf vote inconclusive, no kill tonight"),
        }
    }
    Ok(())
}

async fn wolf_vote(
    ctx: &GameContext,
    wolves: &[Player],
    position: usize,
    is_second_vote: bool,
) -> Result<(), GameError> {
    let wolf = &wolves[position];
    if ctx.display.display_wolf_action {
        ctx.presenter.present_player(wolf.index).await;
    }

    let kill_id = if wolf.is_human {
        prompt_target(ctx.input.as_ref(), "请输入你的杀人目标 :1~9\n 输入-1代表放弃").await?
    } else {
        AGENT_DECIDES
    };

    let decision = match ctx
        .client
        .decide_kill(wolf.index, kill_id, is_second_vote)
        .await
    {
        Ok(decision) => decision,
        Err(e) => {
            warn!(seat = wolf.index, error = %e, "kill decision failed, showing abstain");
            KillDecision::abstain()
        }
    };

    // warm the next agent wolf while this one is on screen
    if let Some(next) = wolves[position + 1..].iter().find(|w| w.is_alive) {
        if !next.is_human {
            ctx.client
                .prefetch_decide_kill(next.index, AGENT_DECIDES, is_second_vote);
        }
    }

    let kill_text = match target(decision.kill) {
        Some(seat) => format!("我决定杀掉【{}】 号玩家!", seat),
        None => "我决定今晚不杀人！".to_string(),
    };

    if ctx.display.display_wolf_action {
        if ctx.display.display_thinking {
            ctx.prefetch_next();
            ctx.reveal_thinking(wolf.index, &decision.reason).await;
        }
        ctx.reveal_line(wolf.index, "", &kill_text).await;
        ctx.record(wolf.index, HistoryKind::Action, &kill_text);
        ctx.presenter.clear_presentation().await;
    }
    Ok(())
}

async fn witch_phase(ctx: &mut GameContext) -> Result<(), GameError> {
    let witch = ctx
        .roster
        .witch()
        .cloned()
        .ok_or(GameError::MissingRole(Role::Witch))?;
    let pending_kill = ctx.client.wolf_want_kill().await?;

    if !witch.is_alive {
        if let Some(victim) = pending_kill {
            ctx.client.kill(victim).await?;
            handle_death(ctx, victim, DeathCause::WolfKill).await?;
        }
        return Ok(());
    }

    info!(seat = witch.index, "witch acts");
    // never prefetched: depends on the settled wolf vote
    let decision = ctx.client.decide_cure_or_poison(witch.index).await?;
    if ctx.display.display_witch_action {
        ctx.presenter.present_player(witch.index).await;
    }

    let cured = match pending_kill {
        Some(victim) if decision.cures() => {
            ctx.client.cure(victim).await?;
            Some(victim)
        }
        _ => None,
    };
    let poisoned = target(decision.poison);

    let cure_text = match cured {
        Some(victim) => format!("我决定治疗【{}】号玩家！", victim),
        None => "我决定今晚不治疗！".to_string(),
    };
    let poison_text = match poisoned {
        Some(seat) => format!("我决定毒杀【{}】 号玩家！", seat),
        None => "我决定今晚不毒杀！".to_string(),
    };

    if ctx.display.display_witch_action {
        if ctx.display.display_thinking {
            ctx.reveal_thinking(witch.index, &decision.thinking).await;
        }
        let text = format!("{}{}", cure_text, poison_text);
        ctx.reveal_line(witch.index, "", &text).await;
        ctx.record(witch.index, HistoryKind::Action, &text);
        ctx.presenter.clear_presentation().await;
    }

    if cured.is_none() {
        if let Some(victim) = pending_kill {
            ctx.client.kill(victim).await?;
            handle_death(ctx, victim, DeathCause::WolfKill).await?;
        }
    }
    if let Some(seat) = poisoned {
        ctx.client.poison(seat).await?;
        handle_death(ctx, seat, DeathCause::Poison).await?;
    }
    Ok(())
}

async fn check_winner(ctx: &mut GameContext) -> Result<Flow, GameError> {
    let verdict = ctx.client.check_winner().await?;
    if !verdict.is_decided() {
        return Ok(Flow::Continue);
    }
    info!(winner = %verdict.winner, "game decided");
    ctx.presenter.announce(&verdict.winner, VERDICT_DWELL).await;
    Ok(Flow::Finished(verdict.winner))
}

fn death_list(deaths: &[Seat], empty: &str) -> String {
    if deaths.is_empty() {
        return empty.to_string();
    }
    deaths
        .iter()
        .map(|seat| format!("{}号玩家死亡", seat))
        .collect::<Vec<_>>()
        .join("\n")
}

async fn end_night(ctx: &mut GameContext) -> Result<(), GameError> {
    info!("night ends");
    ctx.client.toggle_day_night().await?;
    ctx.clock = ctx.client.current_time().await?;

    let deaths = death_list(&ctx.deaths, "今晚是平安夜");
    ctx.prefetch_next();
    ctx.presenter.announce(&deaths, DEATH_LIST_DWELL).await;
    ctx.presenter.announce("天亮了", DEATH_LIST_DWELL).await;
    ctx.presenter.clear_presentation().await;
    ctx.presenter.set_background(Background::Day).await;
    ctx.presenter.show_day(ctx.clock.day).await;

    ctx.client.reset_vote_result().await?;
    ctx.deaths.clear();
    Ok(())
}

async fn end_day(ctx: &mut GameContext) -> Result<(), GameError> {
    info!("day ends");
    ctx.client.toggle_day_night().await?;
    ctx.clock = ctx.client.current_time().await?;

    let deaths = death_list(&ctx.deaths, "无人被处决");
    ctx.prefetch_next();
    ctx.presenter.announce(&deaths, DEATH_LIST_DWELL).await;
    ctx.presenter.announce("天黑了，请闭眼", DEATH_LIST_DWELL).await;
    ctx.presenter.clear_presentation().await;
    ctx.presenter.clear_vote_counts().await;
    ctx.presenter.set_background(Background::Night).await;

    ctx.deaths.clear();
    Ok(())
}

async fn speak(ctx: &mut GameContext, seat: Seat) -> Result<(), GameError> {
    if !ctx.roster.is_alive(seat) {
        return Ok(());
    }
    ctx.presenter.present_player(seat).await;

    let content = if ctx.roster.is_human(seat) {
        ctx.input.prompt("请输入你的发言").await?
    } else {
        String::new()
    };
    let speech = ctx.client.speak(seat, &content).await?;

    ctx.prefetch_next();
    if ctx.display.display_thinking && !speech.thinking.is_empty() {
        ctx.reveal_thinking(seat, &speech.thinking).await;
    }

    let mut audio = speech.audio_path.clone();
    if audio.is_none() && ctx.clock.is_day() && !speech.speak.trim().is_empty() {
        audio = synthesize(ctx, &speech.speak).await;
    }

    let title = format!("{}号 {} 发言：", seat, ctx.role_label(seat));
    ctx.presenter
        .reveal(Reveal::speech(title, ctx.display.auto_play, speech.speak.as_str()).with_audio(audio))
        .await;
    ctx.record(seat, HistoryKind::Speech, &speech.speak);
    ctx.presenter.clear_presentation().await;
    Ok(())
}

/// Best effort: any failure leaves the speech silent.
async fn synthesize(ctx: &GameContext, text: &str) -> Option<String> {
    match ctx.client.generate_tts(text).await {
        Ok(outcome) if outcome.success => outcome.audio_path,
        Ok(outcome) => {
            warn!(message = %outcome.message, "speech synthesis refused");
            None
        }
        Err(e) => {
            warn!(error = %e, "speech synthesis failed");
            None
        }
    }
}

async fn vote(ctx: &mut GameContext, seat: Seat) -> Result<(), GameError> {
    if !ctx.roster.is_alive(seat) {
        return Ok(());
    }
    let is_human = ctx.roster.is_human(seat);
    let human_vote = if is_human {
        Some(prompt_target(ctx.input.as_ref(), "请输入你的投票 1~9\n如果弃票输入-1 ").await?)
    } else {
        None
    };

    // warm the next living agent voter; never wraps past the last seat
    if let Some(next) = ctx.roster.next_living_agent_after(seat) {
        ctx.client.prefetch_decide_vote(next);
    }

    ctx.presenter.present_player(seat).await;
    ctx.prefetch_next();

    let (vote_id, thinking) = match human_vote {
        Some(vote_id) => (vote_id, String::new()),
        None => match ctx.client.decide_vote(seat).await {
            Ok(decision) => (decision.vote.unwrap_or(NO_TARGET), decision.thinking),
            Err(e) => {
                warn!(seat, error = %e, "vote decision failed, abstaining");
                (NO_TARGET, String::new())
            }
        },
    };

    ctx.reveal_line(seat, "投票：", "投票中").await;
    let receipt = ctx.client.vote(seat, vote_id).await?;
    ctx.presenter.clear_presentation().await;

    if ctx.display.display_vote_action {
        ctx.presenter.present_player(seat).await;
        if ctx.display.display_thinking {
            let thinking = if thinking.is_empty() {
                receipt.thinking.as_str()
            } else {
                thinking.as_str()
            };
            ctx.reveal_thinking(seat, thinking).await;
        }
        let text = match target(receipt.vote) {
            Some(choice) => format!("我决定投票投给【{}】号玩家！", choice),
            None => "我决定不投票！".to_string(),
        };
        ctx.reveal_line(seat, "投票：", &text).await;
        ctx.record(seat, HistoryKind::Vote, &text);
        ctx.presenter.clear_presentation().await;
    }
    Ok(())
}

/// Votes received per candidate. Abstains are listed, not counted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    pub counts: BTreeMap<Seat, usize>,
    pub abstains: Vec<Seat>,
}

impl Tally {
    pub fn from_ballots(ballots: &[Ballot]) -> Self {
        let mut tally = Tally::default();
        for ballot in ballots {
            match target(ballot.vote_id) {
                Some(candidate) => *tally.counts.entry(candidate).or_insert(0) += 1,
                None => tally.abstains.push(ballot.player_idx),
            }
        }
        tally
    }

    pub fn summary(ballots: &[Ballot]) -> String {
        ballots
            .iter()
            .map(|ballot| match target(ballot.vote_id) {
                Some(candidate) => format!("【{}号玩家 -> {}号玩家】", ballot.player_idx, candidate),
                None => format!("【{}号玩家 -> 弃票】", ballot.player_idx),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

async fn execute(ctx: &mut GameContext) -> Result<(), GameError> {
    let ballots = ctx.client.vote_result().await?;
    let tally = Tally::from_ballots(&ballots);
    debug!(?tally, "vote tally");

    ctx.prefetch_next();
    ctx.presenter
        .reveal(Reveal::speech(
            "-- 投票结果 --",
            ctx.display.auto_play,
            Tally::summary(&ballots),
        ))
        .await;
    for (&seat, &votes) in &tally.counts {
        ctx.presenter.show_vote_count(seat, votes).await;
    }

    // the backend decides who goes, not the local tally
    if let Some(seat) = ctx.client.execute().await? {
        handle_death(ctx, seat, DeathCause::Execution).await?;
    } else {
        info!("nobody executed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ballot(player_idx: Seat, vote_id: i32) -> Ballot {
        Ballot {
            player_idx,
            vote_id,
        }
    }

    #[test]
    fn test_tally_excludes_abstains() {
        let ballots = vec![ballot(1, 3), ballot(2, 3), ballot(3, -1)];
        let tally = Tally::from_ballots(&ballots);

        assert_eq!(tally.counts, BTreeMap::from([(3, 2)]));
        assert_eq!(tally.abstains, vec![3]);
        assert_eq!(
            Tally::summary(&ballots),
            "【1号玩家 -> 3号玩家】\n【2号玩家 -> 3号玩家】\n【3号玩家 -> 弃票】"
        );
    }

    #[test]
    fn test_death_list_placeholder() {
        assert_eq!(death_list(&[], "今晚是平安夜"), "今晚是平安夜");
        assert_eq!(death_list(&[5, 7], "x"), "5号玩家死亡\n7号玩家死亡");
    }
}
