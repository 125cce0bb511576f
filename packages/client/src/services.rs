pub mod action;
pub mod action_queue;
pub mod context;
pub mod death;
pub mod game_service;
pub mod input;
pub mod prefetch;

pub use action::Tally;
pub use action_queue::{Action, ActionQueue};
pub use context::GameContext;
pub use game_service::Game;
pub use prefetch::Prefetch;
