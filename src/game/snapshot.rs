//! Denormalized read model of a table.
//!
//! Snapshots are point-in-time deep copies: holding one after the engine
//! mutates further is always safe.

use serde::{Deserialize, Serialize};

use super::entities::{Card, CardRank, GamePhase, PlayerId, TableId, TableMode};

/// Per-player view inside a [`GameSnapshot`].
///
/// Hands are exposed only as a size; card contents travel through the
/// per-player hand-dealt events instead.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct PlayerSnapshot {
    pub player_id: PlayerId,
    pub seat: usize,
    pub alive: bool,
    pub bullets: u32,
    pub hand_size: usize,
}

/// Immutable view of the whole table at one instant.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GameSnapshot {
    pub table_id: TableId,
    pub phase: GamePhase,
    pub phase_seconds: u32,
    pub mode: TableMode,
    pub joined_count: usize,
    pub round: u32,
    pub main_rank: Option<CardRank>,
    pub center_cards: Vec<Card>,
    /// Players in seat order.
    pub players: Vec<PlayerSnapshot>,
    pub owner: Option<PlayerId>,
    pub current_player: Option<PlayerId>,
    pub last_player: Option<PlayerId>,
    pub force_challenge: bool,
}

impl GameSnapshot {
    /// Look up a player's view by id.
    pub fn player(&self, player_id: PlayerId) -> Option<&PlayerSnapshot> {
        self.players.iter().find(|p| p.player_id == player_id)
    }

    /// Count of players still alive.
    pub fn alive_count(&self) -> usize {
        self.players.iter().filter(|p| p.alive).count()
    }
}
