pub mod board_state;
pub mod call;
pub mod errors;
pub mod event;
pub mod game;
pub mod player;
pub mod result;
pub mod rule;
pub mod scoring;
pub mod seeding;
pub mod tile;
pub mod types;
pub mod wall;

mod tests;

pub use board_state::{BoardState, PlayerState};
pub use call::{Call, CallType};
pub use errors::{EngineResult, GameError};
pub use event::{events_from_json, events_to_json, merge_pos_events, Event};
pub use game::{CallMenu, Game, GameJudge, GameState};
pub use result::{RoundResult, RyuuKyokuReason};
pub use rule::GameRule;
pub use scoring::{ScoringAdapter, StandardScorer, WinContext};
pub use types::{EndType, Wind, WindRound};
