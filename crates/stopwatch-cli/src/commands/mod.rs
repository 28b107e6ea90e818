pub mod config;
pub mod laps;
pub mod stopwatch;
pub mod watch;
