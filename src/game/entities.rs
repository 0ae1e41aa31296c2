use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifies a player across tables.
pub type PlayerId = Uuid;

/// Identifies a table in the registry.
pub type TableId = String;

/// The four ranks a round deck is built from.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum CardRank {
    #[serde(rename = "A")]
    Ace,
    #[serde(rename = "Q")]
    Queen,
    #[serde(rename = "K")]
    King,
    #[serde(rename = "J")]
    Jack,
}

impl fmt::Display for CardRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Ace => "A",
            Self::Queen => "Q",
            Self::King => "K",
            Self::Jack => "J",
        };
        write!(f, "{repr}")
    }
}

/// The ranks a round's main rank is drawn from. Jacks are wild and never main.
pub const MAIN_RANKS: [CardRank; 3] = [CardRank::Ace, CardRank::Queen, CardRank::King];

/// (rank, copies) pairs making up the 20-card round deck.
pub const ROUND_DECK_COUNTS: [(CardRank, usize); 4] = [
    (CardRank::Ace, 7),
    (CardRank::Queen, 6),
    (CardRank::King, 5),
    (CardRank::Jack, 2),
];

/// Number of cards in a round deck.
pub const ROUND_DECK_SIZE: usize = 20;

/// A single card in a round deck.
///
/// Card ids increase monotonically over the lifetime of a game so observers
/// can correlate the same physical card across events. The demon flag is a
/// one-way promotion: exactly one main-rank card per round carries it.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Card {
    pub id: u64,
    pub rank: CardRank,
    pub demon: bool,
}

impl Card {
    pub fn new(id: u64, rank: CardRank) -> Self {
        Self {
            id,
            rank,
            demon: false,
        }
    }

    /// Promote this card to the round's demon card. Idempotent.
    #[must_use]
    pub fn as_demon(self) -> Self {
        Self {
            demon: true,
            ..self
        }
    }

    /// A card counts as truthful when it is the demon, a Jack, or matches
    /// the round's main rank.
    pub fn is_main_like(&self, main_rank: CardRank) -> bool {
        self.demon || self.rank == CardRank::Jack || self.rank == main_rank
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.demon {
            write!(f, "{}*", self.rank)
        } else {
            write!(f, "{}", self.rank)
        }
    }
}

/// Stake variants a table can run under.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableMode {
    LifeOnly,
    FantuanCoin,
    KunkunCoin,
}

impl TableMode {
    /// Wager modes charge players on lock-in/join and reward the winner.
    pub fn is_wager_mode(&self) -> bool {
        matches!(self, Self::FantuanCoin | Self::KunkunCoin)
    }
}

impl fmt::Display for TableMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::LifeOnly => "life_only",
            Self::FantuanCoin => "fantuan_coin",
            Self::KunkunCoin => "kunkun_coin",
        };
        write!(f, "{repr}")
    }
}

/// Phases of the table state machine.
///
/// `ModeSelection` doubles as the idle state the table returns to after
/// every finished or cancelled game.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    ModeSelection,
    Joining,
    Dealing,
    FirstTurn,
    StandardTurn,
    ResolveChallenge,
    Finished,
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::ModeSelection => "mode_selection",
            Self::Joining => "joining",
            Self::Dealing => "dealing",
            Self::FirstTurn => "first_turn",
            Self::StandardTurn => "standard_turn",
            Self::ResolveChallenge => "resolve_challenge",
            Self::Finished => "finished",
        };
        write!(f, "{repr}")
    }
}

/// How a challenge classified the center pile.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeOutcome {
    /// The pile contained the demon card; everyone but the last player shoots.
    Demon,
    /// The pile contained a lie; the last player shoots.
    NotMain,
    /// The pile was truthful; the challenger shoots.
    Main,
}

impl fmt::Display for ChallengeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Demon => "demon",
            Self::NotMain => "not_main",
            Self::Main => "main",
        };
        write!(f, "{repr}")
    }
}

/// Mutable per-player record, exclusively owned by the engine.
///
/// Seats are 1-based and fixed at join time. A dead player keeps the seat
/// entry until the table resets, but holds no cards and no bullets.
#[derive(Clone, Debug)]
pub(crate) struct PlayerState {
    pub id: PlayerId,
    pub seat: usize,
    pub hand: Vec<Card>,
    pub alive: bool,
    pub bullets: u32,
}

impl PlayerState {
    pub fn new(id: PlayerId, seat: usize, bullets: u32) -> Self {
        Self {
            id,
            seat,
            hand: Vec::new(),
            alive: true,
            bullets,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // === Card Tests ===

    #[test]
    fn test_demon_promotion_is_one_way() {
        let card = Card::new(1, CardRank::Ace);
        assert!(!card.demon);
        let demon = card.as_demon();
        assert!(demon.demon);
        assert_eq!(demon.as_demon(), demon);
        assert_eq!(demon.id, card.id);
        assert_eq!(demon.rank, card.rank);
    }

    #[test]
    fn test_main_like_matches_main_rank() {
        let card = Card::new(1, CardRank::Queen);
        assert!(card.is_main_like(CardRank::Queen));
        assert!(!card.is_main_like(CardRank::Ace));
    }

    #[test]
    fn test_jack_is_always_main_like() {
        let jack = Card::new(2, CardRank::Jack);
        for rank in MAIN_RANKS {
            assert!(jack.is_main_like(rank));
        }
    }

    #[test]
    fn test_demon_is_always_main_like() {
        let demon = Card::new(3, CardRank::King).as_demon();
        for rank in MAIN_RANKS {
            assert!(demon.is_main_like(rank));
        }
    }

    #[test]
    fn test_round_deck_counts_sum_to_deck_size() {
        let total: usize = ROUND_DECK_COUNTS.iter().map(|(_, n)| n).sum();
        assert_eq!(total, ROUND_DECK_SIZE);
    }

    // === Mode Tests ===

    #[test]
    fn test_wager_modes() {
        assert!(!TableMode::LifeOnly.is_wager_mode());
        assert!(TableMode::FantuanCoin.is_wager_mode());
        assert!(TableMode::KunkunCoin.is_wager_mode());
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(TableMode::KunkunCoin.to_string(), "kunkun_coin");
        assert_eq!(GamePhase::ResolveChallenge.to_string(), "resolve_challenge");
        assert_eq!(ChallengeOutcome::NotMain.to_string(), "not_main");
    }

    // === PlayerState Tests ===

    #[test]
    fn test_new_player_is_alive_with_empty_hand() {
        let player = PlayerState::new(Uuid::new_v4(), 2, 6);
        assert!(player.alive);
        assert!(player.hand.is_empty());
        assert_eq!(player.seat, 2);
        assert_eq!(player.bullets, 6);
    }
}
