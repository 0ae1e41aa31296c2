//! Host-supplied capability ports.
//!
//! The engine depends on exactly two inbound capabilities: randomness and
//! the wager economy. Both are object-safe traits held as boxed trait
//! objects, so a table can run against the production implementations or
//! against deterministic doubles without touching engine code.

pub mod economy;
pub mod random;

pub use economy::{EconomyPort, NoopEconomy};
pub use random::{FixedSequence, RandomSource, SeededRng, ThreadRngSource};
