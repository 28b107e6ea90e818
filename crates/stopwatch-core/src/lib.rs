//! # Stopwatch Core Library
//!
//! This library provides the core logic for the Stopwatch application: the
//! timing engine, lap bookkeeping, and local key-value persistence. Any
//! presentation layer (the bundled CLI, or a GUI) is a thin shell over it.
//!
//! ## Architecture
//!
//! - **Stopwatch Engine**: A wall-clock-based run/pause state machine with an
//!   ordered lap list. The caller invokes `tick()` when it wants a fresh display
//!   value; correctness never depends on how often that happens.
//! - **Ticker**: A cancellable periodic tick source for display refresh.
//! - **Storage**: SQLite key-value store, lap persistence and TOML configuration.
//!
//! ## Key Components
//!
//! - [`StopwatchEngine`]: Core stopwatch state machine
//! - [`LapStore`]: Lap list load/save against a [`KvStore`]
//! - [`Database`]: SQLite-backed [`KvStore`]
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod stopwatch;
pub mod storage;

pub use error::{ConfigError, CoreError, StorageError};
pub use events::Event;
pub use stopwatch::{
    format_time, Clock, Lap, LapsHook, ManualClock, Session, StopwatchEngine, SystemClock,
    TickHandle, Ticker,
};
pub use storage::{
    BackgroundHook, BackgroundWriter, Config, Database, KvStore, LapStore, MemoryStore,
};
