//! The table engine aggregate.
//!
//! [`LiarsTable`] owns all per-table game state and exposes the command
//! surface: mode selection, joining, playing, challenging, disconnects,
//! ticking, and forced termination. Every command validates, mutates, and
//! returns the ordered list of events it produced. The engine assumes
//! single-threaded mutation; the actor in [`crate::table`] provides that
//! guarantee.

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use thiserror::Error;

use super::entities::{
    Card, CardRank, ChallengeOutcome, GamePhase, MAIN_RANKS, PlayerId, PlayerState,
    ROUND_DECK_COUNTS, ROUND_DECK_SIZE, TableId, TableMode,
};
use super::events::{GameEvent, GameEventType};
use super::snapshot::{GameSnapshot, PlayerSnapshot};
use crate::ports::{EconomyPort, RandomSource};
use crate::table::config::TableConfig;

/// Smallest stake accepted in the variable-stake mode.
pub const MIN_WAGER: u64 = 1;
/// Largest stake accepted in the variable-stake mode.
pub const MAX_WAGER: u64 = 1_000_000;

/// Named command failures surfaced to callers.
///
/// Every failure is a pure rejection with no side effects, except a failed
/// wager lock-in which refunds the players already charged in the same
/// attempt before surfacing [`GameError::InsufficientBalance`].
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum GameError {
    #[error("cannot {action} in phase {phase}")]
    WrongPhase { action: String, phase: GamePhase },
    #[error("only the owner can select the mode")]
    NotOwner,
    #[error("not the current player")]
    NotCurrentPlayer,
    #[error("current player must challenge")]
    ForcedChallengePending,
    #[error("invalid card selection: {0}")]
    InvalidCardSelection(String),
    #[error("insufficient balance")]
    InsufficientBalance,
    #[error("invalid wager amount: {wager}")]
    InvalidWagerAmount { wager: u64 },
    #[error("table is full")]
    TableFull,
    #[error("player already joined")]
    DuplicateJoin,
    #[error("player is not alive at this table")]
    PlayerNotAlive,
    #[error("nothing to challenge")]
    NothingToChallenge,
}

/// A single table's complete game state.
///
/// Seats form a fixed arena indexed `1..=max_players`; player records are
/// owned by the `players` map and never leak outside the engine. All
/// randomness goes through the [`RandomSource`] port and all stake movement
/// through the [`EconomyPort`], so a table is fully reproducible under
/// deterministic ports.
pub struct LiarsTable {
    table_id: TableId,
    config: TableConfig,
    economy: Box<dyn EconomyPort>,
    random: Box<dyn RandomSource>,

    players: HashMap<PlayerId, PlayerState>,
    seats: Vec<Option<PlayerId>>,
    center_cards: Vec<Card>,
    shoot_candidates: Vec<PlayerId>,
    preferred_shooters: Vec<PlayerId>,

    mode: TableMode,
    phase: GamePhase,
    phase_seconds: u32,
    joined_count: usize,
    alive_count: usize,
    round: u32,
    next_card_id: u64,
    force_challenge: bool,
    wager_per_player: u64,

    main_rank: Option<CardRank>,
    owner: Option<PlayerId>,
    current_player: Option<PlayerId>,
    last_player: Option<PlayerId>,
    after_gun_candidate: Option<PlayerId>,
}

impl LiarsTable {
    pub fn new(
        table_id: impl Into<TableId>,
        config: TableConfig,
        economy: Box<dyn EconomyPort>,
        random: Box<dyn RandomSource>,
    ) -> Self {
        let seats = vec![None; config.max_players + 1];
        Self {
            table_id: table_id.into(),
            config,
            economy,
            random,
            players: HashMap::new(),
            seats,
            center_cards: Vec::new(),
            shoot_candidates: Vec::new(),
            preferred_shooters: Vec::new(),
            mode: TableMode::LifeOnly,
            phase: GamePhase::ModeSelection,
            phase_seconds: 0,
            joined_count: 0,
            alive_count: 0,
            round: 0,
            next_card_id: 1,
            force_challenge: false,
            wager_per_player: 1,
            main_rank: None,
            owner: None,
            current_player: None,
            last_player: None,
            after_gun_candidate: None,
        }
    }

    pub fn table_id(&self) -> &TableId {
        &self.table_id
    }

    /// Lock in the table mode and stake.
    ///
    /// Only the owner may call this once an owner exists; an empty table
    /// accepts any actor (the first joiner then becomes owner). Locking in a
    /// wager mode charges every seated alive player once; if any charge
    /// fails, all already-charged players are refunded and the command fails
    /// with the economy untouched.
    pub fn select_mode(
        &mut self,
        actor: PlayerId,
        mode: TableMode,
        wager: u64,
    ) -> Result<Vec<GameEvent>, GameError> {
        self.ensure_phase(GamePhase::ModeSelection, "select mode")?;
        if let Some(owner) = self.owner
            && owner != actor
        {
            return Err(GameError::NotOwner);
        }

        let charge_amount = self.resolve_wager_amount(mode, wager)?;
        if mode.is_wager_mode() {
            let mut charged: Vec<PlayerId> = Vec::new();
            for player_id in self.alive_players_in_seat_order() {
                if !self.economy.charge(player_id, mode, charge_amount) {
                    for paid in charged {
                        self.economy.reward(paid, mode, charge_amount);
                    }
                    return Err(GameError::InsufficientBalance);
                }
                charged.push(player_id);
            }
        }

        self.mode = mode;
        self.wager_per_player = charge_amount;
        let mut events = vec![GameEvent::with(
            GameEventType::ModeSelected,
            "mode selected",
            json!({
                "actor": actor,
                "mode": mode,
                "wager_per_player": charge_amount,
            }),
        )];
        self.set_phase(GamePhase::Joining, &mut events, "mode_selected");
        if self.alive_count >= self.config.max_players {
            let more = self.start_initial_deal("table_full_after_mode_selected");
            events.extend(more);
        }
        Ok(events)
    }

    /// Seat a new player at the first open seat.
    ///
    /// Allowed in `ModeSelection` and `Joining`. If a wager mode is already
    /// locked in, the stake is charged before seating. The first joiner
    /// becomes owner; filling the table during `Joining` deals immediately.
    pub fn join(&mut self, player_id: PlayerId) -> Result<Vec<GameEvent>, GameError> {
        if self.phase != GamePhase::ModeSelection && self.phase != GamePhase::Joining {
            return Err(GameError::WrongPhase {
                action: "join".into(),
                phase: self.phase,
            });
        }
        if self.players.contains_key(&player_id) {
            return Err(GameError::DuplicateJoin);
        }
        let Some(seat) = self.first_open_seat() else {
            return Err(GameError::TableFull);
        };
        if self.mode.is_wager_mode()
            && !self
                .economy
                .charge(player_id, self.mode, self.wager_per_player)
        {
            return Err(GameError::InsufficientBalance);
        }

        self.players.insert(
            player_id,
            PlayerState::new(player_id, seat, self.config.starting_bullets),
        );
        self.seats[seat] = Some(player_id);
        self.joined_count += 1;
        self.alive_count += 1;

        let mut events = vec![GameEvent::with(
            GameEventType::PlayerJoined,
            "player joined",
            json!({
                "player_id": player_id,
                "seat": seat,
                "joined_count": self.joined_count,
            }),
        )];
        if self.owner.is_none() {
            self.owner = Some(player_id);
            events.push(self.host_assigned_event(player_id, None, "first_join"));
        }

        if self.phase == GamePhase::Joining && self.alive_count >= self.config.max_players {
            let more = self.start_initial_deal("table_full");
            events.extend(more);
        }
        Ok(events)
    }

    /// Handle a player dropping from the table.
    ///
    /// Before the game starts the player is removed outright. During an
    /// active round the seat is forfeited, ownership reassigned if needed,
    /// and the whole round collapses into a fresh deal; partial turn state is
    /// deliberately discarded. Unknown players and finished tables yield no
    /// events.
    pub fn player_disconnected(&mut self, player_id: PlayerId) -> Vec<GameEvent> {
        if self.phase == GamePhase::Finished {
            return Vec::new();
        }
        let Some(state) = self.players.get(&player_id) else {
            return Vec::new();
        };
        if !state.alive {
            return Vec::new();
        }
        let seat = state.seat;
        if matches!(self.phase, GamePhase::ModeSelection | GamePhase::Joining) {
            return self.remove_before_game_start(player_id, seat);
        }

        let mut events = Vec::new();
        self.players.remove(&player_id);
        self.seats[seat] = None;
        self.alive_count = self.alive_count.saturating_sub(1);

        self.shoot_candidates.retain(|id| *id != player_id);
        self.preferred_shooters.retain(|id| *id != player_id);

        if self.current_player == Some(player_id) {
            self.current_player = None;
        }
        if self.last_player == Some(player_id) {
            self.last_player = None;
        }
        if self.after_gun_candidate == Some(player_id) {
            self.after_gun_candidate = None;
        }
        if self.owner == Some(player_id) {
            self.reassign_owner(&mut events, player_id, "host_disconnected");
        }

        events.push(GameEvent::with(
            GameEventType::PlayerForfeited,
            "player disconnected and forfeited",
            json!({
                "player_id": player_id,
                "seat": seat,
                "phase": self.phase,
                "before_start": false,
                "round_reset": true,
            }),
        ));

        if self.alive_count == 0 {
            self.cancel_to_idle("disconnect:no_alive_players", &mut events);
            return events;
        }

        let more = self.start_deal_round("disconnect_round_reset");
        events.extend(more);
        events
    }

    /// Play cards from the current player's hand into the center pile.
    ///
    /// Slots are 1-based, de-duplicated, and sorted; the count must fall
    /// within the configured bounds and the demon card can only be played
    /// alone. The selection replaces the center pile and the turn advances.
    pub fn play(
        &mut self,
        player_id: PlayerId,
        one_based_slots: &[usize],
    ) -> Result<Vec<GameEvent>, GameError> {
        if self.phase != GamePhase::FirstTurn && self.phase != GamePhase::StandardTurn {
            return Err(GameError::WrongPhase {
                action: "play cards".into(),
                phase: self.phase,
            });
        }
        if self.current_player != Some(player_id) {
            return Err(GameError::NotCurrentPlayer);
        }
        if self.force_challenge {
            return Err(GameError::ForcedChallengePending);
        }
        let hand_len = match self.players.get(&player_id) {
            Some(state) if state.alive => state.hand.len(),
            _ => return Err(GameError::PlayerNotAlive),
        };

        let slots = Self::normalize_slots(one_based_slots, hand_len)?;
        if slots.len() < self.config.min_play_cards || slots.len() > self.config.max_play_cards {
            return Err(GameError::InvalidCardSelection(format!(
                "card count must be between {} and {}",
                self.config.min_play_cards, self.config.max_play_cards
            )));
        }

        let player = self
            .players
            .get_mut(&player_id)
            .ok_or(GameError::PlayerNotAlive)?;
        let selected: Vec<Card> = slots.iter().map(|slot| player.hand[slot - 1]).collect();
        let has_demon = selected.iter().any(|card| card.demon);
        if has_demon && selected.len() > 1 {
            return Err(GameError::InvalidCardSelection(
                "demon card must be played alone".into(),
            ));
        }
        for slot in slots.iter().rev() {
            player.hand.remove(slot - 1);
        }

        self.center_cards = selected.clone();
        self.last_player = Some(player_id);

        let ranks: Vec<String> = selected.iter().map(|card| card.rank.to_string()).collect();
        let mut events = vec![
            GameEvent::with(
                GameEventType::CardsPlayed,
                "cards played",
                json!({
                    "player_id": player_id,
                    "count": selected.len(),
                }),
            ),
            GameEvent::with(
                GameEventType::CardsPlayedDetail,
                "cards played detail",
                json!({
                    "player_id": player_id,
                    "count": selected.len(),
                    "ranks": ranks,
                    "contains_demon": has_demon,
                }),
            ),
        ];
        let more = self.advance_after_play(player_id)?;
        events.extend(more);
        Ok(events)
    }

    /// Challenge the last played cards.
    ///
    /// Classifies the center pile: any demon card means everyone but the
    /// last player shoots; any non-main-like card means the last player
    /// shoots; an honest pile turns the gun on the challenger.
    pub fn challenge(&mut self, player_id: PlayerId) -> Result<Vec<GameEvent>, GameError> {
        self.ensure_phase(GamePhase::StandardTurn, "challenge")?;
        if self.current_player != Some(player_id) {
            return Err(GameError::NotCurrentPlayer);
        }
        if self.center_cards.is_empty() {
            return Err(GameError::NothingToChallenge);
        }
        let Some(last_player) = self.last_player else {
            return Err(GameError::NothingToChallenge);
        };
        let Some(main_rank) = self.main_rank else {
            return Err(GameError::NothingToChallenge);
        };

        let mut events = Vec::new();
        self.shoot_candidates.clear();

        let has_demon = self.center_cards.iter().any(|card| card.demon);
        let has_non_main = self
            .center_cards
            .iter()
            .any(|card| !card.is_main_like(main_rank));

        let outcome = if has_demon {
            for candidate in self.alive_players_in_seat_order() {
                if candidate != last_player {
                    self.shoot_candidates.push(candidate);
                }
            }
            ChallengeOutcome::Demon
        } else if has_non_main {
            if self.is_alive(last_player) {
                self.shoot_candidates.push(last_player);
            }
            self.after_gun_candidate = Some(player_id);
            ChallengeOutcome::NotMain
        } else {
            if self.is_alive(player_id) {
                self.shoot_candidates.push(player_id);
            }
            self.after_gun_candidate = self.find_next_player_with_cards_after(Some(player_id));
            ChallengeOutcome::Main
        };

        self.current_player = None;
        self.force_challenge = false;
        self.set_phase(GamePhase::ResolveChallenge, &mut events, "challenge");
        events.push(GameEvent::with(
            GameEventType::ChallengeResolved,
            "challenge resolved",
            json!({
                "challenger": player_id,
                "last_player": last_player,
                "outcome": outcome,
                "shooters": self.shoot_candidates,
            }),
        ));
        Ok(events)
    }

    /// Advance the current phase countdown by one second.
    ///
    /// Timeouts drive the automatic transitions: join/deal progression,
    /// auto-play for stalled turns, and shot resolution. Ticking never
    /// surfaces an error; an inconsistent automatic transition degrades to a
    /// fresh deal.
    pub fn tick(&mut self) -> Vec<GameEvent> {
        if self.phase == GamePhase::Finished {
            return Vec::new();
        }

        self.phase_seconds += 1;
        let mut events = Vec::new();
        match self.phase {
            GamePhase::ModeSelection => {
                if self.phase_seconds >= self.config.mode_selection_secs {
                    self.cancel_to_idle("mode_selection_timeout", &mut events);
                }
            }
            GamePhase::Joining => {
                if self.phase_seconds >= self.config.join_secs {
                    let more = self.start_initial_deal("join_timeout");
                    events.extend(more);
                }
            }
            GamePhase::Dealing => {
                if self.phase_seconds >= self.config.dealing_secs {
                    let more = self.begin_first_turn();
                    events.extend(more);
                }
            }
            GamePhase::FirstTurn => {
                if self.phase_seconds >= self.config.first_turn_secs {
                    let more = self.auto_play_current("first_turn_timeout");
                    events.extend(more);
                }
            }
            GamePhase::StandardTurn => {
                if self.phase_seconds >= self.config.standard_turn_secs {
                    let more = self.auto_play_current("standard_turn_timeout");
                    events.extend(more);
                }
            }
            GamePhase::ResolveChallenge => {
                if self.phase_seconds >= self.config.resolve_challenge_secs {
                    let more = self.resolve_shots_and_continue();
                    events.extend(more);
                }
            }
            GamePhase::Finished => {}
        }
        events
    }

    /// Terminate the game immediately.
    ///
    /// In a wager mode with at least one alive player the full pot goes to a
    /// uniformly random alive player; otherwise the game finishes without a
    /// winner. No-op on an already finished table.
    pub fn force_stop(&mut self) -> Vec<GameEvent> {
        if self.phase == GamePhase::Finished {
            return Vec::new();
        }
        let mut events = Vec::new();
        if self.mode.is_wager_mode() && self.alive_count > 0 {
            let candidates = self.alive_players_in_seat_order();
            let winner = self.pick_random(&candidates);
            self.finish(winner, "forced_stop_wager_mode", &mut events);
        } else {
            self.finish(None, "forced_stop", &mut events);
        }
        events
    }

    /// Point-in-time copy of the table state, safe to retain.
    pub fn snapshot(&self) -> GameSnapshot {
        let mut players = Vec::with_capacity(self.joined_count);
        for seat in 1..=self.config.max_players {
            let Some(player_id) = self.seats[seat] else {
                continue;
            };
            let Some(state) = self.players.get(&player_id) else {
                continue;
            };
            players.push(PlayerSnapshot {
                player_id: state.id,
                seat: state.seat,
                alive: state.alive,
                bullets: state.bullets,
                hand_size: state.hand.len(),
            });
        }

        GameSnapshot {
            table_id: self.table_id.clone(),
            phase: self.phase,
            phase_seconds: self.phase_seconds,
            mode: self.mode,
            joined_count: self.joined_count,
            round: self.round,
            main_rank: self.main_rank,
            center_cards: self.center_cards.clone(),
            players,
            owner: self.owner,
            current_player: self.current_player,
            last_player: self.last_player,
            force_challenge: self.force_challenge,
        }
    }

    fn start_initial_deal(&mut self, reason: &str) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.alive_count == 0 {
            self.cancel_to_idle(&format!("{reason}:no_players"), &mut events);
            return events;
        }
        let starting_bullets = self.config.starting_bullets;
        for state in self.players.values_mut() {
            if state.alive {
                state.bullets = starting_bullets;
            }
        }
        let more = self.start_deal_round(&format!("initial:{reason}"));
        events.extend(more);
        events
    }

    fn start_deal_round(&mut self, reason: &str) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if let Some(winner) = self.sole_alive_player() {
            self.finish(
                Some(winner),
                &format!("winner_before_deal:{reason}"),
                &mut events,
            );
            return events;
        }

        for state in self.players.values_mut() {
            if state.alive {
                state.hand.clear();
            }
        }

        self.round += 1;
        let rank_idx = self
            .random
            .next_int_inclusive(0, (MAIN_RANKS.len() - 1) as u32);
        let main_rank = MAIN_RANKS[rank_idx as usize];
        self.main_rank = Some(main_rank);
        let mut deck = self.create_round_deck(main_rank);
        self.random.shuffle(&mut deck);

        self.center_cards.clear();
        self.current_player = None;
        self.force_challenge = false;

        let alive_ids = self.alive_players_in_seat_order();
        let mut cursor = 0;
        for player_id in &alive_ids {
            let Some(state) = self.players.get_mut(player_id) else {
                continue;
            };
            for _ in 0..self.config.hand_size {
                if cursor >= deck.len() {
                    break;
                }
                state.hand.push(deck[cursor]);
                cursor += 1;
            }
        }

        self.set_phase(
            GamePhase::Dealing,
            &mut events,
            &format!("deal_round:{reason}"),
        );
        events.push(GameEvent::with(
            GameEventType::DealCompleted,
            "deal completed",
            json!({
                "round": self.round,
                "main_rank": main_rank,
                "alive_players": self.alive_count,
            }),
        ));

        // One HandDealt per player so the presentation layer can show cards.
        for player_id in &alive_ids {
            let Some(state) = self.players.get(player_id) else {
                continue;
            };
            events.push(GameEvent::with(
                GameEventType::HandDealt,
                "hand dealt",
                json!({
                    "player_id": state.id,
                    "seat": state.seat,
                    "cards": state.hand,
                    "main_rank": main_rank,
                    "round": self.round,
                }),
            ));
        }

        events
    }

    fn begin_first_turn(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if let Some(winner) = self.sole_alive_player() {
            self.finish(Some(winner), "winner_before_first_turn", &mut events);
            return events;
        }

        let Some(first) = self.select_first_player_after_deal() else {
            self.finish(None, "no_player_for_first_turn", &mut events);
            return events;
        };

        self.current_player = Some(first);
        self.force_challenge = false;
        self.set_phase(GamePhase::FirstTurn, &mut events, "first_turn");
        events.push(GameEvent::with(
            GameEventType::TurnChanged,
            "first turn selected",
            json!({
                "player_id": first,
                "phase": GamePhase::FirstTurn,
            }),
        ));
        events
    }

    fn auto_play_current(&mut self, reason: &str) -> Vec<GameEvent> {
        let mut actor = self.current_player.filter(|id| self.is_alive(*id));
        if actor.is_none() {
            actor = self.find_any_player_with_cards();
        }
        let Some(actor) = actor else {
            return self.start_deal_round(&format!("auto_play_no_actor:{reason}"));
        };

        if self.phase == GamePhase::StandardTurn && self.force_challenge {
            return match self.challenge(actor) {
                Ok(events) => events,
                Err(err) => {
                    warn!(
                        "table {}: automatic challenge failed ({err}), dealing fresh round",
                        self.table_id
                    );
                    self.start_deal_round(&format!("auto_challenge_failed:{reason}"))
                }
            };
        }

        let has_cards = self
            .players
            .get(&actor)
            .is_some_and(|state| !state.hand.is_empty());
        if !has_cards {
            return self.start_deal_round(&format!("auto_play_empty_hand:{reason}"));
        }
        match self.play(actor, &[1]) {
            Ok(events) => events,
            Err(err) => {
                warn!(
                    "table {}: automatic play failed ({err}), dealing fresh round",
                    self.table_id
                );
                self.start_deal_round(&format!("auto_play_failed:{reason}"))
            }
        }
    }

    fn advance_after_play(&mut self, from_player: PlayerId) -> Result<Vec<GameEvent>, GameError> {
        let mut events = Vec::new();
        let Some(next) = self.find_next_player_with_cards_after(Some(from_player)) else {
            let more = self.start_deal_round("no_next_player_after_play");
            events.extend(more);
            return Ok(events);
        };

        self.current_player = Some(next);
        self.set_phase(GamePhase::StandardTurn, &mut events, "advance_after_play");
        self.force_challenge = self.count_players_with_cards() == 1;
        events.push(GameEvent::with(
            GameEventType::TurnChanged,
            "turn moved",
            json!({
                "player_id": next,
                "force_challenge": self.force_challenge,
            }),
        ));
        if self.force_challenge {
            events.push(GameEvent::with(
                GameEventType::ForceChallenge,
                "only one player holds cards, challenge forced",
                json!({"player_id": next}),
            ));
            let more = self.challenge(next)?;
            events.extend(more);
        }
        Ok(events)
    }

    fn resolve_shots_and_continue(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        let mut shooters: Vec<PlayerId> = self
            .shoot_candidates
            .iter()
            .copied()
            .filter(|id| self.is_alive(*id))
            .collect();
        shooters.sort_by_key(|id| self.seat_of(*id));

        self.preferred_shooters.clear();
        for shooter_id in shooters {
            let Some(shooter) = self.players.get_mut(&shooter_id) else {
                continue;
            };
            if !shooter.alive {
                continue;
            }

            let bullets_before = shooter.bullets.max(1);
            let roll = if bullets_before == 1 {
                1
            } else {
                self.random.next_int_inclusive(1, bullets_before)
            };
            shooter.bullets = shooter.bullets.saturating_sub(1);
            let bullets_after = shooter.bullets;
            let lethal = roll == 1;

            events.push(GameEvent::with(
                GameEventType::ShotResolved,
                "shot resolved",
                json!({
                    "player_id": shooter_id,
                    "roll": roll,
                    "bullets_before": bullets_before,
                    "bullets_after": bullets_after,
                    "lethal": lethal,
                }),
            ));

            if lethal {
                self.eliminate(shooter_id, &mut events);
            } else {
                self.preferred_shooters.push(shooter_id);
            }

            if let Some(winner) = self.sole_alive_player() {
                self.shoot_candidates.clear();
                self.finish(Some(winner), "winner_after_shoot", &mut events);
                return events;
            }
        }
        self.shoot_candidates.clear();

        if let Some(winner) = self.sole_alive_player() {
            self.finish(Some(winner), "winner_after_shoot", &mut events);
            return events;
        }

        let more = self.start_deal_round("after_shoot");
        events.extend(more);
        events
    }

    fn eliminate(&mut self, player_id: PlayerId, events: &mut Vec<GameEvent>) {
        let Some(player) = self.players.get_mut(&player_id) else {
            return;
        };
        player.alive = false;
        player.hand.clear();
        player.bullets = 0;
        let seat = player.seat;
        self.alive_count = self.alive_count.saturating_sub(1);

        if self.current_player == Some(player_id) {
            self.current_player = None;
        }
        if self.after_gun_candidate == Some(player_id) {
            self.after_gun_candidate = None;
        }

        events.push(GameEvent::with(
            GameEventType::PlayerEliminated,
            "player eliminated",
            json!({"player_id": player_id, "seat": seat}),
        ));
    }

    fn finish(&mut self, winner: Option<PlayerId>, reason: &str, events: &mut Vec<GameEvent>) {
        if self.phase == GamePhase::Finished {
            return;
        }
        if let Some(winner) = winner {
            let pot = self.joined_count as u64 * self.wager_per_player;
            self.economy.reward(winner, self.mode, pot);
        }
        self.current_player = None;
        self.force_challenge = false;
        self.shoot_candidates.clear();
        self.preferred_shooters.clear();
        self.set_phase(GamePhase::Finished, events, reason);

        let mut payload = json!({
            "mode": self.mode,
            "joined_count": self.joined_count,
            "reason": reason,
        });
        if let Some(winner) = winner {
            payload["winner"] = json!(winner);
        }
        events.push(GameEvent::with(
            GameEventType::GameFinished,
            "game finished",
            payload,
        ));
        self.reset_for_idle();
    }

    fn cancel_to_idle(&mut self, reason: &str, events: &mut Vec<GameEvent>) {
        if self.phase != GamePhase::ModeSelection {
            self.set_phase(GamePhase::ModeSelection, events, reason);
        } else {
            self.phase_seconds = 0;
        }
        self.reset_for_idle();
    }

    fn remove_before_game_start(&mut self, player_id: PlayerId, seat: usize) -> Vec<GameEvent> {
        let mut events = Vec::new();
        self.players.remove(&player_id);
        self.seats[seat] = None;
        self.joined_count = self.joined_count.saturating_sub(1);
        self.alive_count = self.alive_count.saturating_sub(1);

        self.shoot_candidates.retain(|id| *id != player_id);
        self.preferred_shooters.retain(|id| *id != player_id);
        if self.current_player == Some(player_id) {
            self.current_player = None;
        }
        if self.last_player == Some(player_id) {
            self.last_player = None;
        }
        if self.after_gun_candidate == Some(player_id) {
            self.after_gun_candidate = None;
        }
        if self.owner == Some(player_id) {
            self.reassign_owner(&mut events, player_id, "host_left_before_start");
        }

        events.push(GameEvent::with(
            GameEventType::PlayerForfeited,
            "player left before game start",
            json!({
                "player_id": player_id,
                "seat": seat,
                "phase": self.phase,
                "before_start": true,
            }),
        ));
        events
    }

    fn reset_for_idle(&mut self) {
        self.players.clear();
        self.seats.fill(None);
        self.center_cards.clear();
        self.shoot_candidates.clear();
        self.preferred_shooters.clear();

        self.mode = TableMode::LifeOnly;
        self.phase = GamePhase::ModeSelection;
        self.phase_seconds = 0;
        self.joined_count = 0;
        self.alive_count = 0;
        self.round = 0;
        self.next_card_id = 1;
        self.force_challenge = false;
        self.wager_per_player = 1;

        self.main_rank = None;
        self.owner = None;
        self.current_player = None;
        self.last_player = None;
        self.after_gun_candidate = None;
    }

    fn reassign_owner(
        &mut self,
        events: &mut Vec<GameEvent>,
        previous_owner: PlayerId,
        reason: &str,
    ) {
        let candidates = self.alive_players_in_seat_order();
        let next_owner = self.pick_random(&candidates);
        self.owner = next_owner;
        if let Some(next_owner) = next_owner {
            events.push(self.host_assigned_event(next_owner, Some(previous_owner), reason));
        }
    }

    fn host_assigned_event(
        &self,
        new_owner: PlayerId,
        previous_owner: Option<PlayerId>,
        reason: &str,
    ) -> GameEvent {
        let mut payload = json!({
            "player_id": new_owner,
            "reason": reason,
        });
        if let Some(previous) = previous_owner {
            payload["previous_owner"] = json!(previous);
        }
        GameEvent::with(GameEventType::HostAssigned, "host assigned", payload)
    }

    fn create_round_deck(&mut self, main_rank: CardRank) -> Vec<Card> {
        let mut cards = Vec::with_capacity(ROUND_DECK_SIZE);
        for (rank, count) in ROUND_DECK_COUNTS {
            for _ in 0..count {
                cards.push(Card::new(self.next_card_id, rank));
                self.next_card_id += 1;
            }
        }

        let main_indexes: Vec<usize> = cards
            .iter()
            .enumerate()
            .filter(|(_, card)| card.rank == main_rank)
            .map(|(idx, _)| idx)
            .collect();
        let pick = self
            .random
            .next_int_inclusive(0, (main_indexes.len() - 1) as u32);
        let chosen = main_indexes[pick as usize];
        cards[chosen] = cards[chosen].as_demon();
        cards
    }

    fn select_first_player_after_deal(&mut self) -> Option<PlayerId> {
        if let Some(last) = self.last_player
            && self.preferred_shooters.contains(&last)
            && self.is_alive(last)
        {
            self.preferred_shooters.clear();
            self.after_gun_candidate = None;
            return Some(last);
        }

        let alive_preferred: Vec<PlayerId> = self
            .preferred_shooters
            .iter()
            .copied()
            .filter(|id| self.is_alive(*id))
            .collect();
        if !alive_preferred.is_empty() {
            let selected = self.pick_random(&alive_preferred);
            self.preferred_shooters.clear();
            self.after_gun_candidate = None;
            return selected;
        }

        if let Some(candidate) = self.after_gun_candidate
            && self.is_alive(candidate)
        {
            self.preferred_shooters.clear();
            self.after_gun_candidate = None;
            return Some(candidate);
        }

        self.preferred_shooters.clear();
        self.after_gun_candidate = None;
        let alive = self.alive_players_in_seat_order();
        self.pick_random(&alive)
    }

    fn find_next_player_with_cards_after(&self, player_id: Option<PlayerId>) -> Option<PlayerId> {
        let Some(player_id) = player_id else {
            return self.find_any_player_with_cards();
        };
        let Some(base) = self.players.get(&player_id) else {
            return self.find_any_player_with_cards();
        };

        let max = self.config.max_players;
        for offset in 1..=max {
            let seat = ((base.seat - 1 + offset) % max) + 1;
            let Some(candidate_id) = self.seats[seat] else {
                continue;
            };
            if let Some(candidate) = self.players.get(&candidate_id)
                && candidate.alive
                && !candidate.hand.is_empty()
            {
                return Some(candidate_id);
            }
        }
        None
    }

    fn find_any_player_with_cards(&self) -> Option<PlayerId> {
        self.alive_players_in_seat_order()
            .into_iter()
            .find(|id| self.players.get(id).is_some_and(|s| !s.hand.is_empty()))
    }

    fn alive_players_in_seat_order(&self) -> Vec<PlayerId> {
        let mut ids = Vec::with_capacity(self.alive_count);
        for seat in 1..=self.config.max_players {
            let Some(player_id) = self.seats[seat] else {
                continue;
            };
            if self.players.get(&player_id).is_some_and(|s| s.alive) {
                ids.push(player_id);
            }
        }
        ids
    }

    fn sole_alive_player(&self) -> Option<PlayerId> {
        if self.alive_count != 1 {
            return None;
        }
        self.alive_players_in_seat_order().into_iter().next()
    }

    fn count_players_with_cards(&self) -> usize {
        self.players
            .values()
            .filter(|state| state.alive && !state.hand.is_empty())
            .count()
    }

    fn first_open_seat(&self) -> Option<usize> {
        (1..=self.config.max_players).find(|&seat| self.seats[seat].is_none())
    }

    fn seat_of(&self, player_id: PlayerId) -> usize {
        self.players
            .get(&player_id)
            .map_or(usize::MAX, |state| state.seat)
    }

    fn is_alive(&self, player_id: PlayerId) -> bool {
        self.players.get(&player_id).is_some_and(|state| state.alive)
    }

    fn ensure_phase(&self, expected: GamePhase, action: &str) -> Result<(), GameError> {
        if self.phase != expected {
            return Err(GameError::WrongPhase {
                action: action.to_string(),
                phase: self.phase,
            });
        }
        Ok(())
    }

    fn set_phase(&mut self, next: GamePhase, events: &mut Vec<GameEvent>, reason: &str) {
        self.phase = next;
        self.phase_seconds = 0;
        events.push(GameEvent::with(
            GameEventType::PhaseChanged,
            "phase changed",
            json!({"phase": next, "reason": reason}),
        ));
    }

    fn pick_random(&mut self, candidates: &[PlayerId]) -> Option<PlayerId> {
        if candidates.is_empty() {
            return None;
        }
        let idx = self
            .random
            .next_int_inclusive(0, (candidates.len() - 1) as u32);
        Some(candidates[idx as usize])
    }

    fn resolve_wager_amount(&self, mode: TableMode, wager: u64) -> Result<u64, GameError> {
        if mode != TableMode::KunkunCoin {
            return Ok(1);
        }
        if !(MIN_WAGER..=MAX_WAGER).contains(&wager) {
            return Err(GameError::InvalidWagerAmount { wager });
        }
        Ok(wager)
    }

    fn normalize_slots(slots: &[usize], hand_len: usize) -> Result<Vec<usize>, GameError> {
        if slots.is_empty() {
            return Err(GameError::InvalidCardSelection(
                "must select at least one card".into(),
            ));
        }
        let mut normalized = slots.to_vec();
        normalized.sort_unstable();
        normalized.dedup();
        for &slot in &normalized {
            if slot < 1 || slot > hand_len {
                return Err(GameError::InvalidCardSelection(format!(
                    "invalid card slot: {slot}"
                )));
            }
        }
        Ok(normalized)
    }
}
