//! Table actor: one worker per table, commands strictly serialized.

use std::collections::HashMap;
use tokio::sync::mpsc;
use tokio::time::{Instant, interval_at};

use super::config::TableConfig;
use super::messages::{CommandResult, TableError, TableMessage};
use crate::game::engine::LiarsTable;
use crate::game::entities::{PlayerId, TableId};
use crate::game::events::GameEvent;
use crate::ports::{EconomyPort, RandomSource};

/// Cloneable handle for sending messages to a table actor.
#[derive(Clone)]
pub struct TableHandle {
    sender: mpsc::Sender<TableMessage>,
    table_id: TableId,
}

impl TableHandle {
    pub fn new(sender: mpsc::Sender<TableMessage>, table_id: TableId) -> Self {
        Self { sender, table_id }
    }

    pub fn table_id(&self) -> &TableId {
        &self.table_id
    }

    /// Enqueue a message for the table worker.
    pub async fn send(&self, message: TableMessage) -> Result<(), TableError> {
        self.sender
            .send(message)
            .await
            .map_err(|_| TableError::Closed)
    }
}

/// Single-consumer worker owning one [`LiarsTable`].
///
/// All mutation happens on this worker: messages drain strictly in arrival
/// order and each command runs to completion before the next is dequeued, so
/// the engine never needs internal locking. An internal interval drives the
/// phase countdown once per second.
pub struct TableActor {
    table: LiarsTable,
    inbox: mpsc::Receiver<TableMessage>,
    config: TableConfig,
    subscribers: HashMap<PlayerId, mpsc::Sender<Vec<GameEvent>>>,
    is_closed: bool,
}

impl TableActor {
    /// Create an actor and the handle used to reach it.
    pub fn new(
        table_id: TableId,
        config: TableConfig,
        economy: Box<dyn EconomyPort>,
        random: Box<dyn RandomSource>,
    ) -> (Self, TableHandle) {
        let (sender, inbox) = mpsc::channel(100);
        let table = LiarsTable::new(table_id.clone(), config.clone(), economy, random);

        let actor = Self {
            table,
            inbox,
            config,
            subscribers: HashMap::new(),
            is_closed: false,
        };
        let handle = TableHandle::new(sender, table_id);

        (actor, handle)
    }

    /// Run the actor event loop until closed or all handles are dropped.
    pub async fn run(mut self) {
        log::info!("table {} starting", self.table.table_id());

        // First countdown tick lands one full period after spawn.
        let period = self.config.tick_interval();
        let mut ticker = interval_at(Instant::now() + period, period);

        loop {
            tokio::select! {
                message = self.inbox.recv() => {
                    match message {
                        Some(message) => {
                            self.handle_message(message);
                            if self.is_closed {
                                break;
                            }
                        }
                        // Every handle dropped; nobody can reach this table.
                        None => break,
                    }
                }

                _ = ticker.tick() => {
                    if !self.is_closed {
                        self.handle_tick();
                    }
                }
            }
        }

        log::info!("table {} closed", self.table.table_id());
    }

    fn handle_message(&mut self, message: TableMessage) {
        match message {
            TableMessage::SelectMode {
                actor,
                mode,
                wager,
                response,
            } => {
                let result = self.table.select_mode(actor, mode, wager);
                self.publish_result(&result);
                let _ = response.send(result);
            }

            TableMessage::Join {
                player_id,
                response,
            } => {
                let result = self.table.join(player_id);
                self.publish_result(&result);
                let _ = response.send(result);
            }

            TableMessage::Play {
                player_id,
                slots,
                response,
            } => {
                let result = self.table.play(player_id, &slots);
                self.publish_result(&result);
                let _ = response.send(result);
            }

            TableMessage::Challenge {
                player_id,
                response,
            } => {
                let result = self.table.challenge(player_id);
                self.publish_result(&result);
                let _ = response.send(result);
            }

            TableMessage::Disconnect {
                player_id,
                response,
            } => {
                let events = self.table.player_disconnected(player_id);
                self.publish(&events);
                let _ = response.send(events);
            }

            TableMessage::ForceStop { response } => {
                let events = self.table.force_stop();
                self.publish(&events);
                let _ = response.send(events);
            }

            TableMessage::Snapshot { response } => {
                let _ = response.send(self.table.snapshot());
            }

            TableMessage::Tick => self.handle_tick(),

            TableMessage::Subscribe { player_id, sender } => {
                self.subscribers.insert(player_id, sender);
                log::debug!(
                    "player {player_id} subscribed to table {} events",
                    self.table.table_id()
                );
            }

            TableMessage::Unsubscribe { player_id } => {
                self.subscribers.remove(&player_id);
            }

            TableMessage::Close { response } => {
                self.is_closed = true;
                let _ = response.send(());
            }
        }
    }

    fn handle_tick(&mut self) {
        let events = self.table.tick();
        if !events.is_empty() {
            log::debug!(
                "table {}: tick produced {} events",
                self.table.table_id(),
                events.len()
            );
            self.publish(&events);
        }
    }

    fn publish_result(&mut self, result: &CommandResult) {
        if let Ok(events) = result {
            self.publish(events);
        }
    }

    /// Fan a batch of events out to subscribers, dropping the ones that went
    /// away. A full subscriber channel keeps the subscription but loses the
    /// batch.
    fn publish(&mut self, events: &[GameEvent]) {
        if events.is_empty() || self.subscribers.is_empty() {
            return;
        }
        let table_id = self.table.table_id().clone();
        self.subscribers
            .retain(|player_id, sender| match sender.try_send(events.to_vec()) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    log::warn!(
                        "table {table_id}: subscriber {player_id} channel full, dropping batch"
                    );
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => false,
            });
    }
}
