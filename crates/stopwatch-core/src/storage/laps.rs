//! Lap list persistence.
//!
//! The lap list is stored under a single key as a JSON array of non-negative
//! integer milliseconds, e.g. `[1234, 5678]`. Loading never fails: anything
//! unreadable is logged and treated as an empty list, since the in-memory
//! engine stays authoritative for the session either way.

use std::sync::Arc;

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

use super::KvStore;
use crate::error::Result;
use crate::stopwatch::LapsHook;

pub const DEFAULT_LAPS_KEY: &str = "laps";

/// Loads and saves the lap list under one fixed key.
#[derive(Debug)]
pub struct LapStore<S> {
    store: S,
    key: String,
}

impl<S: KvStore> LapStore<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, DEFAULT_LAPS_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read the persisted laps. Missing, unreadable or malformed data yields `[]`.
    pub fn load(&self) -> Vec<u64> {
        let json = match self.store.get(&self.key) {
            Ok(Some(json)) => json,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "failed to load laps");
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<u64>>(&json) {
            Ok(laps) => laps,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "ignoring malformed lap data");
                Vec::new()
            }
        }
    }

    /// Serialize and write the full lap list.
    ///
    /// # Errors
    /// Returns an error if the underlying store rejects the write.
    pub fn save(&self, laps: &[u64]) -> Result<()> {
        let json = serde_json::to_string(laps)?;
        self.store.set(&self.key, &json)?;
        tracing::debug!(key = %self.key, count = laps.len(), "laps saved");
        Ok(())
    }
}

/// Writes synchronously on every change; failures are logged only.
impl<S: KvStore + Send> LapsHook for LapStore<S> {
    fn laps_changed(&self, laps: &[u64]) {
        if let Err(e) = self.save(laps) {
            tracing::error!(key = %self.key, error = %e, "failed to save laps");
        }
    }
}

/// Fire-and-forget lap persistence on a background task.
///
/// Hooks publish the newest lap list and return immediately. The writer task
/// saves whatever is newest when it gets to it, so intermediate lists may be
/// skipped but the last one always lands.
#[derive(Debug)]
pub struct BackgroundWriter {
    tx: watch::Sender<Option<Vec<u64>>>,
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl BackgroundWriter {
    /// Spawn the writer task. Must be called from within a tokio runtime.
    pub fn spawn<S>(lap_store: LapStore<S>) -> Self
    where
        S: KvStore + Send + Sync + 'static,
    {
        let (tx, mut rx) = watch::channel::<Option<Vec<u64>>>(None);
        let (stop, mut stop_rx) = oneshot::channel::<()>();
        let lap_store = Arc::new(lap_store);

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    changed = rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let latest = rx.borrow_and_update().clone();
                        write_latest(&lap_store, latest).await;
                    }
                    _ = &mut stop_rx => {
                        if rx.has_changed().unwrap_or(false) {
                            let latest = rx.borrow_and_update().clone();
                            write_latest(&lap_store, latest).await;
                        }
                        break;
                    }
                }
            }
        });

        Self { tx, stop, task }
    }

    /// A hook to install on the engine. Any number may be handed out.
    pub fn hook(&self) -> BackgroundHook {
        BackgroundHook {
            tx: self.tx.clone(),
        }
    }

    /// Flush the newest pending list and stop the writer task.
    pub async fn shutdown(self) {
        let _ = self.stop.send(());
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "lap writer task failed");
        }
    }
}

async fn write_latest<S>(lap_store: &Arc<LapStore<S>>, latest: Option<Vec<u64>>)
where
    S: KvStore + Send + Sync + 'static,
{
    let Some(laps) = latest else {
        return;
    };
    let lap_store = Arc::clone(lap_store);
    match tokio::task::spawn_blocking(move || lap_store.laps_changed(&laps)).await {
        Ok(()) => {}
        Err(e) => tracing::error!(error = %e, "lap write panicked"),
    }
}

/// Engine-side handle of a [`BackgroundWriter`].
#[derive(Debug, Clone)]
pub struct BackgroundHook {
    tx: watch::Sender<Option<Vec<u64>>>,
}

impl LapsHook for BackgroundHook {
    fn laps_changed(&self, laps: &[u64]) {
        self.tx.send_replace(Some(laps.to_vec()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::storage::MemoryStore;

    struct FailingStore;

    impl KvStore for FailingStore {
        fn get(&self, _key: &str) -> std::result::Result<Option<String>, StorageError> {
            Err(StorageError::Locked)
        }

        fn set(&self, _key: &str, _value: &str) -> std::result::Result<(), StorageError> {
            Err(StorageError::Locked)
        }
    }

    #[test]
    fn save_writes_json_array() {
        let laps = LapStore::new(MemoryStore::new());
        laps.save(&[1234, 5678]).unwrap();
        assert_eq!(
            laps.store().get("laps").unwrap().as_deref(),
            Some("[1234,5678]")
        );
    }

    #[test]
    fn load_roundtrips_exactly() {
        let laps = LapStore::new(MemoryStore::new());
        laps.save(&[100, 200, 300]).unwrap();
        assert_eq!(laps.load(), vec![100, 200, 300]);
    }

    #[test]
    fn missing_key_loads_empty() {
        assert!(LapStore::new(MemoryStore::new()).load().is_empty());
    }

    #[test]
    fn malformed_data_loads_empty() {
        let store = MemoryStore::new();
        for bad in ["not json", "{\"a\":1}", "[-5]", "[1.5]", "[\"1\"]"] {
            store.set("laps", bad).unwrap();
            assert!(LapStore::new(&store).load().is_empty(), "accepted {bad}");
        }
    }

    #[test]
    fn read_failure_loads_empty() {
        assert!(LapStore::new(FailingStore).load().is_empty());
    }

    #[test]
    fn write_failure_is_not_fatal_through_hook() {
        let laps = LapStore::new(FailingStore);
        assert!(laps.save(&[1]).is_err());
        laps.laps_changed(&[1]);
    }

    #[test]
    fn custom_key_is_used() {
        let laps = LapStore::with_key(MemoryStore::new(), "history");
        laps.save(&[7]).unwrap();
        assert_eq!(laps.key(), "history");
        assert_eq!(laps.store().get("laps").unwrap(), None);
        assert_eq!(laps.store().get("history").unwrap().as_deref(), Some("[7]"));
    }

    #[tokio::test]
    async fn background_writer_lands_last_write() {
        let store = Arc::new(MemoryStore::new());
        let writer = BackgroundWriter::spawn(LapStore::new(Arc::clone(&store)));
        let hook = writer.hook();

        hook.laps_changed(&[1]);
        hook.laps_changed(&[1, 2]);
        hook.laps_changed(&[1, 2, 3]);
        writer.shutdown().await;

        assert_eq!(LapStore::new(store).load(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn background_writer_without_changes_writes_nothing() {
        let store = Arc::new(MemoryStore::new());
        let writer = BackgroundWriter::spawn(LapStore::new(Arc::clone(&store)));
        writer.shutdown().await;
        assert_eq!(store.get("laps").unwrap(), None);
    }
}
