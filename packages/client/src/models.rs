pub mod api;
pub mod cli;
pub mod config;
pub mod game;
pub mod player;

pub use api::*;
pub use cli::*;
pub use config::*;
pub use game::*;
pub use player::*;
