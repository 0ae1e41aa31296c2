//! Economy port.
//!
//! Wager modes charge a stake per player and reward the winner the pot; the
//! settlement backend lives outside the engine and is reached only through
//! [`EconomyPort`].

use crate::game::entities::{PlayerId, TableMode};

/// Charge/reward capability supplied by the host.
pub trait EconomyPort: Send {
    /// Charge `amount` from the player. Returns `true` on success; a `false`
    /// return makes the calling command fail (after refunding any players
    /// already charged in the same attempt).
    fn charge(&mut self, player_id: PlayerId, mode: TableMode, amount: u64) -> bool;

    /// Credit `amount` to the player. Fire-and-forget: the engine does not
    /// observe failures.
    fn reward(&mut self, player_id: PlayerId, mode: TableMode, amount: u64);
}

/// Economy used when wagering is disabled: every charge succeeds, every
/// reward is a no-op.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopEconomy;

impl EconomyPort for NoopEconomy {
    fn charge(&mut self, _player_id: PlayerId, _mode: TableMode, _amount: u64) -> bool {
        true
    }

    fn reward(&mut self, _player_id: PlayerId, _mode: TableMode, _amount: u64) {}
}
