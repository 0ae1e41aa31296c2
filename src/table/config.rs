//! Table configuration models.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Immutable per-table parameters.
///
/// Phase timeouts are counted in ticks; the actor drives one tick per
/// second, so the fields read as seconds.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TableConfig {
    /// Seconds the owner has to lock in a mode before the table resets.
    pub mode_selection_secs: u32,

    /// Seconds the table waits for joiners before dealing.
    pub join_secs: u32,

    /// Seconds the dealing animation phase lasts.
    pub dealing_secs: u32,

    /// Seconds the first player has to open the round.
    pub first_turn_secs: u32,

    /// Seconds each subsequent player has to play or challenge.
    pub standard_turn_secs: u32,

    /// Seconds before a pending challenge resolves into shots.
    pub resolve_challenge_secs: u32,

    /// Seat count (seats are numbered 1..=max_players).
    pub max_players: usize,

    /// Cards dealt to each alive player per round.
    pub hand_size: usize,

    /// Minimum cards playable in one turn.
    pub min_play_cards: usize,

    /// Maximum cards playable in one turn.
    pub max_play_cards: usize,

    /// Bullets each player starts the game with.
    pub starting_bullets: u32,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            mode_selection_secs: 20,
            join_secs: 20,
            dealing_secs: 5,
            first_turn_secs: 30,
            standard_turn_secs: 30,
            resolve_challenge_secs: 5,
            max_players: 4,
            hand_size: 5,
            min_play_cards: 1,
            max_play_cards: 3,
            starting_bullets: 6,
        }
    }
}

impl TableConfig {
    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_players < 2 {
            return Err("max players must be at least 2".to_string());
        }

        if self.hand_size == 0 {
            return Err("hand size must be at least 1".to_string());
        }

        if self.min_play_cards == 0 || self.min_play_cards > self.max_play_cards {
            return Err("min play cards must be in 1..=max play cards".to_string());
        }

        if self.max_play_cards > self.hand_size {
            return Err("max play cards cannot exceed hand size".to_string());
        }

        if self.starting_bullets == 0 {
            return Err("starting bullets must be at least 1".to_string());
        }

        Ok(())
    }

    /// Interval between phase-countdown ticks.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(1)
    }
}
