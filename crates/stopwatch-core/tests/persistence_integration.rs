//! Integration tests for lap persistence through the engine.

use std::sync::{Arc, Mutex};

use stopwatch_core::{
    BackgroundWriter, Database, KvStore, LapStore, ManualClock, MemoryStore, StopwatchEngine,
};

#[test]
fn test_laps_reload_into_fresh_engine() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stopwatch.db");
    let clock = ManualClock::new(0);

    {
        let laps = LapStore::new(Database::open_at(&path).unwrap());
        let mut engine = StopwatchEngine::with_clock(clock.clone())
            .with_laps(laps.load())
            .on_laps_changed(laps);
        engine.start();
        for _ in 0..3 {
            clock.advance(100);
            engine.record_lap();
        }
        assert_eq!(engine.laps(), &[100, 200, 300]);
    }

    let laps = LapStore::new(Database::open_at(&path).unwrap());
    let engine = StopwatchEngine::with_clock(clock).with_laps(laps.load());
    assert_eq!(engine.laps(), &[100, 200, 300]);
    assert!(!engine.is_running(), "run state is not persisted");
    assert_eq!(engine.elapsed_ms(), 0);
}

#[test]
fn test_stored_format_is_plain_json_array() {
    let store = Arc::new(MemoryStore::new());
    let clock = ManualClock::new(5_000);
    let mut engine = StopwatchEngine::with_clock(clock.clone())
        .on_laps_changed(LapStore::new(Arc::clone(&store)));

    engine.start();
    clock.advance(1_234);
    engine.record_lap();
    clock.advance(4_444);
    engine.record_lap();

    assert_eq!(store.get("laps").unwrap().as_deref(), Some("[1234,5678]"));

    engine.delete_lap(0);
    assert_eq!(store.get("laps").unwrap().as_deref(), Some("[5678]"));

    engine.reset();
    assert_eq!(store.get("laps").unwrap().as_deref(), Some("[]"));
}

#[test]
fn test_malformed_store_starts_empty_and_recovers() {
    let store = Arc::new(MemoryStore::new());
    store.set("laps", "{oops").unwrap();

    let laps = LapStore::new(Arc::clone(&store));
    let clock = ManualClock::new(0);
    let mut engine = StopwatchEngine::with_clock(clock.clone())
        .with_laps(laps.load())
        .on_laps_changed(laps);
    assert!(engine.laps().is_empty());

    engine.start();
    clock.advance(42);
    engine.record_lap();
    assert_eq!(store.get("laps").unwrap().as_deref(), Some("[42]"));
}

#[tokio::test]
async fn test_background_writer_with_engine() {
    let db = Arc::new(Mutex::new(Database::open_memory().unwrap()));
    let writer = BackgroundWriter::spawn(LapStore::new(Arc::clone(&db)));
    let clock = ManualClock::new(0);
    let mut engine = StopwatchEngine::with_clock(clock.clone()).on_laps_changed(writer.hook());

    engine.start();
    for _ in 0..10 {
        clock.advance(10);
        engine.record_lap();
    }
    engine.delete_lap(9);
    drop(engine);
    writer.shutdown().await;

    let expected: Vec<u64> = (1..=9).map(|i| i * 10).collect();
    assert_eq!(LapStore::new(db).load(), expected);
}
