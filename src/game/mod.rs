//! Core game logic: domain model, engine aggregate, events, and read model.

pub mod engine;
pub mod entities;
pub mod events;
pub mod snapshot;

pub use engine::{GameError, LiarsTable, MAX_WAGER, MIN_WAGER};
pub use entities::{
    Card, CardRank, ChallengeOutcome, GamePhase, MAIN_RANKS, PlayerId, ROUND_DECK_COUNTS,
    ROUND_DECK_SIZE, TableId, TableMode,
};
pub use events::{GameEvent, GameEventType};
pub use snapshot::{GameSnapshot, PlayerSnapshot};
