//! Per-invocation wiring: config, database, and an engine seeded from storage.
//!
//! Every CLI invocation is short-lived, so the run state is saved under the
//! configured session key on exit and restored on the next start. Laps are
//! persisted by the engine's hook as they change.

use std::sync::{Arc, Mutex};

use stopwatch_core::{
    BackgroundWriter, Config, Database, KvStore, LapStore, LapsHook, Session, StopwatchEngine,
};

pub type Store = Arc<Mutex<Database>>;

pub struct App {
    pub config: Config,
    pub engine: StopwatchEngine,
    store: Store,
}

impl App {
    /// Open with synchronous lap writes.
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let (config, store) = Self::open_store()?;
        let laps = LapStore::with_key(Arc::clone(&store), config.storage.laps_key.clone());
        let seeded = laps.load();
        Ok(Self::assemble(config, store, seeded, laps))
    }

    /// Open with lap writes handed to a background task.
    /// Must be called from within a tokio runtime.
    pub fn open_background() -> Result<(Self, BackgroundWriter), Box<dyn std::error::Error>> {
        let (config, store) = Self::open_store()?;
        let laps = LapStore::with_key(Arc::clone(&store), config.storage.laps_key.clone());
        let seeded = laps.load();
        let writer = BackgroundWriter::spawn(laps);
        let app = Self::assemble(config, store, seeded, writer.hook());
        Ok((app, writer))
    }

    fn open_store() -> Result<(Config, Store), Box<dyn std::error::Error>> {
        let config = Config::load_or_default();
        let store = Arc::new(Mutex::new(Database::open()?));
        Ok((config, store))
    }

    fn assemble(
        config: Config,
        store: Store,
        laps: Vec<u64>,
        hook: impl LapsHook + 'static,
    ) -> Self {
        let mut engine = StopwatchEngine::new().with_laps(laps).on_laps_changed(hook);
        if let Some(session) = load_session(&store, &config.storage.session_key) {
            engine.restore(session);
        }
        Self {
            config,
            engine,
            store,
        }
    }

    /// Engine over an in-memory database with default config.
    #[cfg(test)]
    pub fn in_memory() -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config::default();
        let store = Arc::new(Mutex::new(Database::open_memory()?));
        let laps = LapStore::with_key(Arc::clone(&store), config.storage.laps_key.clone());
        let seeded = laps.load();
        Ok(Self::assemble(config, store, seeded, laps))
    }

    #[cfg(test)]
    pub fn store(&self) -> &Store {
        &self.store
    }

    #[cfg(test)]
    pub fn load_session(&self) -> Option<Session> {
        load_session(&self.store, &self.config.storage.session_key)
    }

    /// Persist the run state for the next invocation.
    pub fn save_session(&self) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string(&self.engine.session())?;
        self.store.set(&self.config.storage.session_key, &json)?;
        Ok(())
    }
}

fn load_session(store: &Store, key: &str) -> Option<Session> {
    let json = match store.get(key) {
        Ok(json) => json?,
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to load session");
            return None;
        }
    };
    match serde_json::from_str(&json) {
        Ok(session) => Some(session),
        Err(e) => {
            tracing::warn!(key, error = %e, "ignoring malformed session");
            None
        }
    }
}
