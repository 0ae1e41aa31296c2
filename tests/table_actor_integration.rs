//! Integration tests for the table actor and registry.
//!
//! Tick-driven scenarios run under tokio's paused clock so the actor's
//! one-second interval fires deterministically during `sleep`.

use std::sync::Arc;
use std::time::Duration;

use liars_bar::{
    GameError, GameEventType, GamePhase, NoopEconomy, SeededRng, TableConfig, TableError,
    TableManager, TableMode,
};
use tokio::{task::JoinSet, time::sleep};
use uuid::Uuid;

fn fast_config() -> TableConfig {
    TableConfig {
        mode_selection_secs: 99,
        join_secs: 1,
        dealing_secs: 1,
        first_turn_secs: 30,
        standard_turn_secs: 30,
        resolve_challenge_secs: 1,
        max_players: 4,
        hand_size: 5,
        min_play_cards: 1,
        max_play_cards: 3,
        starting_bullets: 6,
    }
}

async fn create_table(manager: &TableManager, table_id: &str, seed: u64) -> anyhow::Result<()> {
    manager
        .get_or_create(
            table_id,
            fast_config(),
            Box::new(NoopEconomy),
            Box::new(SeededRng::from_seed(seed)),
        )
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_get_or_create_is_idempotent() -> anyhow::Result<()> {
    let manager = TableManager::new();
    create_table(&manager, "bar-1", 1).await?;
    manager.join("bar-1", Uuid::new_v4()).await?;

    // Second create with the same id returns the existing table.
    create_table(&manager, "bar-1", 99).await?;

    assert_eq!(manager.active_table_count().await, 1);
    let snapshot = manager.snapshot("bar-1").await?;
    assert_eq!(snapshot.joined_count, 1);
    Ok(())
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let manager = TableManager::new();
    let config = TableConfig {
        max_players: 1,
        ..fast_config()
    };
    let result = manager
        .get_or_create(
            "bad",
            config,
            Box::new(NoopEconomy),
            Box::new(SeededRng::from_seed(1)),
        )
        .await;
    assert!(matches!(result, Err(TableError::InvalidConfig(_))));
}

#[tokio::test]
async fn test_unknown_table_is_not_found() {
    let manager = TableManager::new();
    let result = manager.snapshot("missing").await;
    assert!(matches!(result, Err(TableError::NotFound(_))));
}

#[tokio::test]
async fn test_concurrent_joins_admit_exactly_max_players() -> anyhow::Result<()> {
    let manager = Arc::new(TableManager::new());
    create_table(&manager, "bar-1", 1).await?;

    let mut tasks = JoinSet::new();
    for _ in 0..8 {
        let manager = Arc::clone(&manager);
        tasks.spawn(async move { manager.join("bar-1", Uuid::new_v4()).await });
    }

    let mut admitted = 0;
    let mut rejected = 0;
    while let Some(result) = tasks.join_next().await {
        match result? {
            Ok(_) => admitted += 1,
            Err(TableError::Game(GameError::TableFull)) => rejected += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(admitted, 4);
    assert_eq!(rejected, 4);
    assert_eq!(manager.snapshot("bar-1").await?.joined_count, 4);
    Ok(())
}

#[tokio::test]
async fn test_engine_rejections_surface_through_manager() -> anyhow::Result<()> {
    let manager = TableManager::new();
    create_table(&manager, "bar-1", 1).await?;

    let player = Uuid::new_v4();
    manager.join("bar-1", player).await?;
    let result = manager.join("bar-1", player).await;

    assert!(matches!(
        result,
        Err(TableError::Game(GameError::DuplicateJoin))
    ));
    Ok(())
}

#[tokio::test]
async fn test_remove_table_shuts_down_worker() -> anyhow::Result<()> {
    let manager = TableManager::new();
    create_table(&manager, "bar-1", 1).await?;
    assert_eq!(manager.active_table_count().await, 1);

    manager.remove_table("bar-1").await?;

    assert_eq!(manager.active_table_count().await, 0);
    assert!(manager.get_table("bar-1").await.is_none());
    assert!(matches!(
        manager.snapshot("bar-1").await,
        Err(TableError::NotFound(_))
    ));
    Ok(())
}

#[tokio::test]
async fn test_shutdown_closes_every_table() -> anyhow::Result<()> {
    let manager = TableManager::new();
    create_table(&manager, "bar-1", 1).await?;
    create_table(&manager, "bar-2", 2).await?;
    create_table(&manager, "bar-3", 3).await?;

    manager.shutdown().await;

    assert_eq!(manager.active_table_count().await, 0);
    Ok(())
}

#[tokio::test]
async fn test_list_tables_reports_live_state() -> anyhow::Result<()> {
    let manager = TableManager::new();
    create_table(&manager, "bar-1", 1).await?;
    create_table(&manager, "bar-2", 2).await?;
    manager.join("bar-1", Uuid::new_v4()).await?;

    let mut listing = manager.list_tables().await;
    listing.sort_by(|a, b| a.id.cmp(&b.id));

    assert_eq!(listing.len(), 2);
    assert_eq!(listing[0].id, "bar-1");
    assert_eq!(listing[0].joined_count, 1);
    assert_eq!(listing[0].phase, GamePhase::ModeSelection);
    assert_eq!(listing[1].joined_count, 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_internal_ticks_advance_phases() -> anyhow::Result<()> {
    let manager = TableManager::new();
    create_table(&manager, "bar-1", 1).await?;

    manager
        .select_mode("bar-1", Uuid::new_v4(), TableMode::LifeOnly, 1)
        .await?;
    manager.join("bar-1", Uuid::new_v4()).await?;
    manager.join("bar-1", Uuid::new_v4()).await?;

    // Three interval fires: join timeout -> deal, deal timeout -> first
    // turn, plus one idle first-turn second.
    sleep(Duration::from_secs(3)).await;

    let snapshot = manager.snapshot("bar-1").await?;
    assert_eq!(snapshot.phase, GamePhase::FirstTurn);
    assert_eq!(snapshot.round, 1);
    assert!(snapshot.current_player.is_some());
    assert!(snapshot.players.iter().all(|p| p.hand_size == 5));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_subscribers_receive_tick_driven_events() -> anyhow::Result<()> {
    let manager = TableManager::new();
    create_table(&manager, "bar-1", 1).await?;

    let observer = Uuid::new_v4();
    let mut receiver = manager.subscribe("bar-1", observer).await?;

    manager
        .select_mode("bar-1", Uuid::new_v4(), TableMode::LifeOnly, 1)
        .await?;
    manager.join("bar-1", Uuid::new_v4()).await?;
    manager.join("bar-1", Uuid::new_v4()).await?;
    sleep(Duration::from_secs(2)).await;

    let mut seen = Vec::new();
    while let Ok(batch) = receiver.try_recv() {
        seen.extend(batch);
    }

    // The join-timeout deal happened on the actor's own tick, with no
    // command in flight; subscribers are the only way to observe it.
    assert!(seen.iter().any(|e| e.kind == GameEventType::PlayerJoined));
    assert!(seen.iter().any(|e| e.kind == GameEventType::DealCompleted));
    assert!(seen.iter().any(|e| e.kind == GameEventType::HandDealt));
    Ok(())
}
