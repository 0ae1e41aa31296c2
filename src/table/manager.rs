//! Table manager: a concurrent registry of table actors.

use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::{
    sync::{RwLock, mpsc, oneshot},
    task::JoinHandle,
    time,
};

use super::actor::{TableActor, TableHandle};
use super::config::TableConfig;
use super::messages::{TableError, TableMessage};
use crate::game::entities::{GamePhase, PlayerId, TableId, TableMode};
use crate::game::events::GameEvent;
use crate::game::snapshot::GameSnapshot;
use crate::ports::{EconomyPort, RandomSource};

/// How long a closing table gets to drain its queue before its worker is
/// forcibly cancelled.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(3);

/// Table summary for discovery.
#[derive(Clone, Debug)]
pub struct TableMetadata {
    pub id: TableId,
    pub phase: GamePhase,
    pub mode: TableMode,
    pub joined_count: usize,
    pub alive_count: usize,
    pub round: u32,
}

struct TableEntry {
    handle: TableHandle,
    task: JoinHandle<()>,
}

/// Registry mapping table ids to their actors.
///
/// Tables run fully in parallel, one worker each; the registry is the only
/// cross-table shared state. All methods take `&self` and the manager is
/// cheap to share behind an `Arc`.
#[derive(Default)]
pub struct TableManager {
    tables: Arc<RwLock<HashMap<TableId, TableEntry>>>,
}

impl TableManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the table's handle, spawning a new actor if the id is unknown.
    ///
    /// When the table already exists the supplied config and ports are
    /// dropped and the existing handle is returned.
    pub async fn get_or_create(
        &self,
        table_id: impl Into<TableId>,
        config: TableConfig,
        economy: Box<dyn EconomyPort>,
        random: Box<dyn RandomSource>,
    ) -> Result<TableHandle, TableError> {
        config.validate().map_err(TableError::InvalidConfig)?;

        let table_id = table_id.into();
        let mut tables = self.tables.write().await;
        if let Some(entry) = tables.get(&table_id) {
            return Ok(entry.handle.clone());
        }

        let (actor, handle) = TableActor::new(table_id.clone(), config, economy, random);
        let task = tokio::spawn(actor.run());
        tables.insert(
            table_id.clone(),
            TableEntry {
                handle: handle.clone(),
                task,
            },
        );
        log::info!("created and spawned table {table_id}");

        Ok(handle)
    }

    /// Get a table handle.
    pub async fn get_table(&self, table_id: &str) -> Option<TableHandle> {
        let tables = self.tables.read().await;
        tables.get(table_id).map(|entry| entry.handle.clone())
    }

    /// Remove a table and shut its worker down.
    ///
    /// The worker drains its queue and stops; if it does not quiesce within
    /// the grace period the task is aborted.
    pub async fn remove_table(&self, table_id: &str) -> Result<(), TableError> {
        let Some(entry) = self.tables.write().await.remove(table_id) else {
            return Err(TableError::NotFound(table_id.to_string()));
        };

        let (tx, rx) = oneshot::channel();
        match entry.handle.send(TableMessage::Close { response: tx }).await {
            Ok(()) => {
                if time::timeout(SHUTDOWN_GRACE, rx).await.is_err() {
                    log::warn!("table {table_id} did not quiesce in time, aborting worker");
                    entry.task.abort();
                }
            }
            Err(_) => entry.task.abort(),
        }

        log::info!("closed table {table_id}");
        Ok(())
    }

    /// Close every table in the registry.
    pub async fn shutdown(&self) {
        let ids: Vec<TableId> = self.tables.read().await.keys().cloned().collect();
        for table_id in ids {
            let _ = self.remove_table(&table_id).await;
        }
    }

    /// Number of live tables.
    pub async fn active_table_count(&self) -> usize {
        self.tables.read().await.len()
    }

    /// Summaries of all live tables, built from fresh snapshots.
    pub async fn list_tables(&self) -> Vec<TableMetadata> {
        let handles: Vec<TableHandle> = {
            let tables = self.tables.read().await;
            tables.values().map(|entry| entry.handle.clone()).collect()
        };

        let mut listing = Vec::with_capacity(handles.len());
        for handle in handles {
            if let Ok(snapshot) = Self::snapshot_from(&handle).await {
                listing.push(TableMetadata {
                    id: snapshot.table_id.clone(),
                    phase: snapshot.phase,
                    mode: snapshot.mode,
                    joined_count: snapshot.joined_count,
                    alive_count: snapshot.alive_count(),
                    round: snapshot.round,
                });
            }
        }
        listing
    }

    /// Lock in a table's mode and stake.
    pub async fn select_mode(
        &self,
        table_id: &str,
        actor: PlayerId,
        mode: TableMode,
        wager: u64,
    ) -> Result<Vec<GameEvent>, TableError> {
        let handle = self.require(table_id).await?;
        let (tx, rx) = oneshot::channel();
        handle
            .send(TableMessage::SelectMode {
                actor,
                mode,
                wager,
                response: tx,
            })
            .await?;
        let result = rx.await.map_err(|_| TableError::Closed)?;
        Ok(result?)
    }

    /// Seat a player at a table.
    pub async fn join(
        &self,
        table_id: &str,
        player_id: PlayerId,
    ) -> Result<Vec<GameEvent>, TableError> {
        let handle = self.require(table_id).await?;
        let (tx, rx) = oneshot::channel();
        handle
            .send(TableMessage::Join {
                player_id,
                response: tx,
            })
            .await?;
        let result = rx.await.map_err(|_| TableError::Closed)?;
        Ok(result?)
    }

    /// Play cards on a table.
    pub async fn play(
        &self,
        table_id: &str,
        player_id: PlayerId,
        slots: Vec<usize>,
    ) -> Result<Vec<GameEvent>, TableError> {
        let handle = self.require(table_id).await?;
        let (tx, rx) = oneshot::channel();
        handle
            .send(TableMessage::Play {
                player_id,
                slots,
                response: tx,
            })
            .await?;
        let result = rx.await.map_err(|_| TableError::Closed)?;
        Ok(result?)
    }

    /// Challenge the last played cards on a table.
    pub async fn challenge(
        &self,
        table_id: &str,
        player_id: PlayerId,
    ) -> Result<Vec<GameEvent>, TableError> {
        let handle = self.require(table_id).await?;
        let (tx, rx) = oneshot::channel();
        handle
            .send(TableMessage::Challenge {
                player_id,
                response: tx,
            })
            .await?;
        let result = rx.await.map_err(|_| TableError::Closed)?;
        Ok(result?)
    }

    /// Report a player disconnect to a table.
    pub async fn disconnect(
        &self,
        table_id: &str,
        player_id: PlayerId,
    ) -> Result<Vec<GameEvent>, TableError> {
        let handle = self.require(table_id).await?;
        let (tx, rx) = oneshot::channel();
        handle
            .send(TableMessage::Disconnect {
                player_id,
                response: tx,
            })
            .await?;
        rx.await.map_err(|_| TableError::Closed)
    }

    /// Terminate a table's game immediately.
    pub async fn force_stop(&self, table_id: &str) -> Result<Vec<GameEvent>, TableError> {
        let handle = self.require(table_id).await?;
        let (tx, rx) = oneshot::channel();
        handle
            .send(TableMessage::ForceStop { response: tx })
            .await?;
        rx.await.map_err(|_| TableError::Closed)
    }

    /// Read a point-in-time snapshot of a table.
    pub async fn snapshot(&self, table_id: &str) -> Result<GameSnapshot, TableError> {
        let handle = self.require(table_id).await?;
        Self::snapshot_from(&handle).await
    }

    /// Subscribe to a table's event batches.
    pub async fn subscribe(
        &self,
        table_id: &str,
        player_id: PlayerId,
    ) -> Result<mpsc::Receiver<Vec<GameEvent>>, TableError> {
        let handle = self.require(table_id).await?;
        let (sender, receiver) = mpsc::channel(32);
        handle
            .send(TableMessage::Subscribe { player_id, sender })
            .await?;
        Ok(receiver)
    }

    async fn snapshot_from(handle: &TableHandle) -> Result<GameSnapshot, TableError> {
        let (tx, rx) = oneshot::channel();
        handle.send(TableMessage::Snapshot { response: tx }).await?;
        rx.await.map_err(|_| TableError::Closed)
    }

    async fn require(&self, table_id: &str) -> Result<TableHandle, TableError> {
        self.get_table(table_id)
            .await
            .ok_or_else(|| TableError::NotFound(table_id.to_string()))
    }
}
