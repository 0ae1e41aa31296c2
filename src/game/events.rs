//! Engine event model.
//!
//! Every engine command returns an ordered list of [`GameEvent`]s describing
//! the state changes it caused. Events carry a closed type tag, a
//! human-readable message, and an immutable key/value payload built once at
//! creation time. Consumers copy and translate; they never mutate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Closed set of event type tags emitted by the engine.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameEventType {
    ModeSelected,
    PlayerJoined,
    HostAssigned,
    PhaseChanged,
    DealCompleted,
    HandDealt,
    TurnChanged,
    CardsPlayed,
    CardsPlayedDetail,
    ForceChallenge,
    ChallengeResolved,
    ShotResolved,
    PlayerEliminated,
    PlayerForfeited,
    GameFinished,
}

/// A single state-change notification.
///
/// The payload keys present depend on the event type; consumers must not
/// assume a key exists beyond what each type is documented to carry.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GameEvent {
    pub kind: GameEventType,
    pub message: String,
    pub data: Map<String, Value>,
    pub at: DateTime<Utc>,
}

impl GameEvent {
    /// Build an event with an empty payload.
    pub fn new(kind: GameEventType, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            data: Map::new(),
            at: Utc::now(),
        }
    }

    /// Build an event from a `serde_json::json!` object literal.
    ///
    /// Non-object values are treated as an empty payload.
    pub fn with(kind: GameEventType, message: impl Into<String>, data: Value) -> Self {
        let data = match data {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            kind,
            message: message.into(),
            data,
            at: Utc::now(),
        }
    }
}
