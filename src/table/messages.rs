//! Table actor message types.

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::game::engine::GameError;
use crate::game::entities::{PlayerId, TableId, TableMode};
use crate::game::events::GameEvent;
use crate::game::snapshot::GameSnapshot;

/// Result of a validated engine command: the ordered events it produced, or
/// the named failure that rejected it.
pub type CommandResult = Result<Vec<GameEvent>, GameError>;

/// Messages that can be sent to a table actor.
#[derive(Debug)]
pub enum TableMessage {
    /// Lock in the table mode and stake (owner only).
    SelectMode {
        actor: PlayerId,
        mode: TableMode,
        wager: u64,
        response: oneshot::Sender<CommandResult>,
    },

    /// Seat a player at the table.
    Join {
        player_id: PlayerId,
        response: oneshot::Sender<CommandResult>,
    },

    /// Play cards from the current player's hand (1-based slots).
    Play {
        player_id: PlayerId,
        slots: Vec<usize>,
        response: oneshot::Sender<CommandResult>,
    },

    /// Challenge the last played cards.
    Challenge {
        player_id: PlayerId,
        response: oneshot::Sender<CommandResult>,
    },

    /// A player dropped; forfeits the seat mid-round.
    Disconnect {
        player_id: PlayerId,
        response: oneshot::Sender<Vec<GameEvent>>,
    },

    /// Terminate the game immediately, paying out the pot in wager modes.
    ForceStop {
        response: oneshot::Sender<Vec<GameEvent>>,
    },

    /// Read a point-in-time snapshot.
    Snapshot {
        response: oneshot::Sender<GameSnapshot>,
    },

    /// Advance the phase countdown by one second. The actor also ticks
    /// itself on an internal interval; this variant exists for external
    /// drivers and tests.
    Tick,

    /// Subscribe to event batches produced by commands and ticks.
    Subscribe {
        player_id: PlayerId,
        sender: mpsc::Sender<Vec<GameEvent>>,
    },

    /// Drop a subscription.
    Unsubscribe { player_id: PlayerId },

    /// Stop the actor after the current queue drains.
    Close { response: oneshot::Sender<()> },
}

/// Transport-level failures from the actor/registry layer.
///
/// Engine rejections pass through as [`TableError::Game`].
#[derive(Debug, Error)]
pub enum TableError {
    #[error("table not found: {0}")]
    NotFound(TableId),

    #[error("table is closed")]
    Closed,

    #[error("invalid table config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Game(#[from] GameError),
}
