//! # Liar's Bar
//!
//! A turn-based bluffing/elimination card-game engine: a single-table state
//! machine governing mode selection, seating, dealing, turn-taking, bluff
//! challenges, and bullet-based elimination, optionally wagering a stake via
//! an external economy.
//!
//! ## Architecture
//!
//! The crate splits into three layers:
//!
//! - [`game`]: the domain model and the [`LiarsTable`] aggregate — a phase
//!   state machine (`ModeSelection → Joining → Dealing → FirstTurn →
//!   StandardTurn ↔ ResolveChallenge → Dealing | Finished`) whose commands
//!   validate, mutate, and return typed [`GameEvent`]s. [`GameSnapshot`]
//!   exposes a point-in-time read model.
//! - [`ports`]: the two capabilities the host supplies — [`RandomSource`]
//!   (all engine randomness, replayable under a deterministic double) and
//!   [`EconomyPort`] (wager charge/reward).
//! - [`table`]: the concurrency shell — one single-consumer actor per table
//!   serializing every command, and a registry mapping table ids to actors
//!   with create-if-absent and remove-and-shutdown semantics.
//!
//! ## Example
//!
//! ```
//! use liars_bar::{LiarsTable, NoopEconomy, SeededRng, TableConfig, TableMode};
//! use uuid::Uuid;
//!
//! let mut table = LiarsTable::new(
//!     "bar-1",
//!     TableConfig::default(),
//!     Box::new(NoopEconomy),
//!     Box::new(SeededRng::from_seed(1)),
//! );
//!
//! let owner = Uuid::new_v4();
//! table.join(owner).unwrap();
//! table.join(Uuid::new_v4()).unwrap();
//! let events = table.select_mode(owner, TableMode::LifeOnly, 1).unwrap();
//! assert!(!events.is_empty());
//! assert_eq!(table.snapshot().joined_count, 2);
//! ```

/// Core game logic, entities, events, and the read model.
pub mod game;
pub use game::{
    Card, CardRank, ChallengeOutcome, GameError, GameEvent, GameEventType, GamePhase,
    GameSnapshot, LiarsTable, MAX_WAGER, MIN_WAGER, PlayerId, PlayerSnapshot, ROUND_DECK_SIZE,
    TableId, TableMode,
};

/// Host-supplied capability ports and their stock implementations.
pub mod ports;
pub use ports::{
    EconomyPort, FixedSequence, NoopEconomy, RandomSource, SeededRng, ThreadRngSource,
};

/// Actor wrapper and table registry.
pub mod table;
pub use table::{
    CommandResult, TableActor, TableConfig, TableError, TableHandle, TableManager, TableMessage,
    TableMetadata,
};
