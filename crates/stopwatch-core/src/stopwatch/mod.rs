mod clock;
mod engine;
mod format;
mod ticker;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{Lap, LapsHook, Session, StopwatchEngine};
pub use format::format_time;
pub use ticker::{TickHandle, Ticker, DEFAULT_TICK_INTERVAL};
