use std::collections::{HashSet, VecDeque};
use tracing::{debug, info};

use super::context::GameContext;
use crate::error::GameError;
use crate::models::{target, DeathCause, Seat};
use crate::utils::{HistoryKind, Reveal};

/// Applies a death and everything it sets off.
///
/// A hunter shot enqueues the victim instead of recursing, so a chain of
/// deaths is processed in order from one work list. A seat is handled at
/// most once per chain.
pub async fn handle_death(
    ctx: &mut GameContext,
    seat: Seat,
    cause: DeathCause,
) -> Result<(), GameError> {
    let mut pending = VecDeque::from([(seat, cause)]);
    let mut handled = HashSet::new();

    while let Some((seat, cause)) = pending.pop_front() {
        if !handled.insert(seat) {
            debug!(seat, "death already handled in this chain");
            continue;
        }
        info!(seat, ?cause, "player died");
        ctx.deaths.push(seat);
        ctx.presenter.mark_dead(seat).await;

        if may_leave_last_words(ctx, cause) {
            last_words(ctx, seat, cause).await?;
        }

        if let Some(victim) = hunter_revenge(ctx, seat, cause).await? {
            pending.push_back((victim, DeathCause::HunterShot));
        }
    }
    Ok(())
}

/// First night, or an execution during the day.
fn may_leave_last_words(ctx: &GameContext, cause: DeathCause) -> bool {
    ctx.clock.day == 1 || (ctx.clock.is_day() && cause == DeathCause::Execution)
}

async fn last_words(ctx: &GameContext, seat: Seat, cause: DeathCause) -> Result<(), GameError> {
    let content = if ctx.roster.is_human(seat) {
        ctx.input.prompt("请输入你的遗言").await?
    } else {
        String::new()
    };
    let speech = ctx.client.last_words(seat, &content, cause).await?;

    ctx.presenter.present_player(seat).await;
    if ctx.display.display_thinking {
        ctx.reveal_thinking(seat, &speech.thinking).await;
    }
    ctx.reveal_line(seat, "发表遗言：", &speech.speak).await;
    ctx.record(seat, HistoryKind::Speech, &speech.speak);
    ctx.presenter.clear_presentation().await;
    Ok(())
}

/// Asks a dying hunter for a target and applies the shot. Poisoned hunters
/// cannot shoot.
async fn hunter_revenge(
    ctx: &GameContext,
    seat: Seat,
    cause: DeathCause,
) -> Result<Option<Seat>, GameError> {
    let is_hunter = ctx.roster.hunter().map_or(false, |h| h.index == seat);
    if !is_hunter || cause == DeathCause::Poison {
        return Ok(None);
    }

    let revenge = ctx.client.revenge(seat, cause).await?;
    let Some(victim) = target(revenge.attack) else {
        info!(seat, "hunter holds fire");
        return Ok(None);
    };

    ctx.client.attack(seat, victim).await?;
    info!(hunter = seat, victim, "hunter shot");

    if ctx.display.display_hunter_action {
        let label = ctx.role_label(seat);
        ctx.presenter.present_player(seat).await;
        if ctx.display.display_thinking && !revenge.thinking.is_empty() {
            ctx.reveal_thinking(seat, &revenge.thinking).await;
        }
        let text = format!("我决定开枪带走【{}】号玩家！", victim);
        ctx.presenter
            .reveal(Reveal::speech(
                format!("{}号 {} ", seat, label),
                ctx.display.auto_play,
                text.as_str(),
            ))
            .await;
        ctx.record(seat, HistoryKind::Action, &text);
        ctx.presenter.clear_presentation().await;
    }
    Ok(Some(victim))
}
