use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use super::action_queue::{Action, ActionQueue};
use super::context::GameContext;
use crate::backend::BackendClient;
use crate::error::GameError;
use crate::models::{model_badge, Flow, Role};
use crate::utils::{HistorySink, HumanInput, Presenter};

const SCORES_DWELL: Duration = Duration::from_secs(3);

/// Drives the action queue until a CheckWinner reports a decided game.
pub struct Game {
    ctx: GameContext,
}

impl Game {
    /// Starts a session on the backend, labels the seats and builds the queue.
    pub async fn start(
        client: BackendClient,
        presenter: Arc<dyn Presenter>,
        input: Arc<dyn HumanInput>,
        history: Arc<dyn HistorySink>,
    ) -> Result<Self, GameError> {
        info!("starting game");
        let display = client.start().await?;
        let roster = client.status().await?;
        let clock = client.current_time().await?;
        let queue = ActionQueue::build(&roster);
        info!(players = roster.len(), actions = queue.len(), "game ready");

        for player in roster.players() {
            let show_role = display.display_role
                || (display.display_wolf_action && player.role_type == Role::Werewolf);
            let role_label = show_role.then(|| player.role_type.as_str());
            let badge = if display.display_model {
                model_badge(&player.model)
            } else {
                None
            };
            presenter.label_player(player.index, role_label, badge).await;
        }

        Ok(Self {
            ctx: GameContext {
                client,
                roster,
                display,
                clock,
                deaths: Vec::new(),
                queue,
                cursor: 0,
                presenter,
                input,
                history,
            },
        })
    }

    pub fn context(&self) -> &GameContext {
        &self.ctx
    }

    pub fn current_action(&self) -> Option<Action> {
        self.ctx.queue.get(self.ctx.cursor)
    }

    /// Refreshes the roster, runs the action under the cursor and moves the
    /// cursor on. A failed action leaves the cursor where it was.
    pub async fn run_step(&mut self) -> Result<Flow, GameError> {
        self.ctx.roster = self.ctx.client.status().await?;
        let action = self
            .current_action()
            .ok_or(GameError::EmptyQueue)?;
        let flow = action.execute(&mut self.ctx).await?;
        self.ctx.cursor = self.ctx.queue.next_index(self.ctx.cursor);
        Ok(flow)
    }

    /// Plays to the end and returns the verdict.
    pub async fn run(&mut self) -> Result<String, GameError> {
        loop {
            match self.run_step().await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Finished(winner)) => {
                    self.announce_scores().await;
                    return Ok(winner);
                }
                Err(e) => {
                    error!(error = %e, action = ?self.current_action(), "game halted");
                    self.ctx.presenter.show_failure(&e.to_string()).await;
                    return Err(e);
                }
            }
        }
    }

    async fn announce_scores(&self) {
        match self.ctx.client.game_scores().await {
            Ok(scores) => {
                if let Some(summary) = scores.summary() {
                    self.ctx.presenter.announce(&summary, SCORES_DWELL).await;
                }
            }
            Err(e) => warn!(error = %e, "could not load game scores"),
        }
    }
}
