//! Table module providing multi-table support with an async actor model.
//!
//! This module implements:
//! - `TableActor`: a single-consumer worker owning one table engine
//! - `TableManager`: a concurrent registry of table actors
//! - Message-based communication with tokio channels
//! - Table configuration and lifecycle management
//!
//! ## Architecture
//!
//! Each table runs in its own tokio task with an mpsc message inbox; every
//! command — mode selection, join, play, challenge, disconnect, tick,
//! force-stop, snapshot — is enqueued and executed strictly in arrival
//! order, so the engine itself needs no locking. The `TableManager` spawns
//! and tracks actors, providing create-if-absent lookup and
//! remove-and-shutdown with a bounded grace period.
//!
//! ## Example
//!
//! ```
//! use liars_bar::ports::{NoopEconomy, ThreadRngSource};
//! use liars_bar::table::{TableConfig, TableManager};
//!
//! #[tokio::main]
//! async fn main() {
//!     let manager = TableManager::new();
//!     let handle = manager
//!         .get_or_create(
//!             "bar-1",
//!             TableConfig::default(),
//!             Box::new(NoopEconomy),
//!             Box::new(ThreadRngSource),
//!         )
//!         .await
//!         .unwrap();
//!
//!     let snapshot = manager.snapshot(handle.table_id()).await.unwrap();
//!     assert_eq!(snapshot.joined_count, 0);
//!     manager.shutdown().await;
//! }
//! ```

pub mod actor;
pub mod config;
pub mod manager;
pub mod messages;

pub use actor::{TableActor, TableHandle};
pub use config::TableConfig;
pub use manager::{TableManager, TableMetadata};
pub use messages::{CommandResult, TableError, TableMessage};
