use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use liars_bar::{GameEventType, LiarsTable, NoopEconomy, SeededRng, TableConfig, TableMode};
use uuid::Uuid;

fn bench_config() -> TableConfig {
    TableConfig {
        mode_selection_secs: 99,
        join_secs: 1,
        dealing_secs: 1,
        first_turn_secs: 1,
        standard_turn_secs: 1,
        resolve_challenge_secs: 1,
        ..TableConfig::default()
    }
}

/// Helper to create a full table one command away from dealing.
fn table_before_deal(seed: u64) -> (LiarsTable, Uuid) {
    let mut table = LiarsTable::new(
        "bench",
        bench_config(),
        Box::new(NoopEconomy),
        Box::new(SeededRng::from_seed(seed)),
    );
    let owner = Uuid::new_v4();
    table.join(owner).unwrap();
    for _ in 0..3 {
        table.join(Uuid::new_v4()).unwrap();
    }
    (table, owner)
}

/// Benchmark locking the mode on a full table, which builds, shuffles, and
/// deals a complete round deck.
fn bench_mode_lock_and_deal(c: &mut Criterion) {
    c.bench_function("mode_lock_and_deal", |b| {
        b.iter_batched(
            || table_before_deal(1),
            |(mut table, owner)| {
                table.select_mode(owner, TableMode::LifeOnly, 1).unwrap();
                table
            },
            BatchSize::SmallInput,
        );
    });
}

/// Benchmark a complete four-player game driven purely by tick timeouts.
fn bench_full_game_auto_play(c: &mut Criterion) {
    c.bench_function("full_game_auto_play", |b| {
        b.iter_batched(
            || {
                let (mut table, owner) = table_before_deal(7);
                table.select_mode(owner, TableMode::LifeOnly, 1).unwrap();
                table
            },
            |mut table| {
                for _ in 0..100_000 {
                    let events = table.tick();
                    if events
                        .iter()
                        .any(|event| event.kind == GameEventType::GameFinished)
                    {
                        break;
                    }
                }
                table
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_mode_lock_and_deal, bench_full_game_auto_play);
criterion_main!(benches);
