use std::io::Write;

use stopwatch_core::format_time;

use crate::app::App;
use crate::common::write_event;

#[derive(Debug, Clone, Copy)]
pub enum Control {
    Start,
    Pause,
    Reset,
    Lap,
}

pub fn run(control: Control) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::open()?;
    apply(&mut app, control, &mut std::io::stdout().lock())
}

/// Apply a control and persist the run state. The event is only reported
/// once the session is saved.
fn apply(
    app: &mut App,
    control: Control,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let event = match control {
        Control::Start => app.engine.start(),
        Control::Pause => app.engine.pause(),
        Control::Reset => app.engine.reset(),
        Control::Lap => app.engine.record_lap(),
    };
    if event.is_none() {
        tracing::info!(?control, "ignored: not valid in the current state");
    }
    app.save_session()?;
    write_event(out, event)
}

pub fn status(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::open()?;
    let current_ms = app.engine.tick();

    if json {
        println!("{}", serde_json::to_string_pretty(&app.engine.snapshot())?);
        return Ok(());
    }

    let state = if app.engine.is_running() {
        "running"
    } else {
        "paused"
    };
    println!("{} ({state})", format_time(current_ms));
    for lap in app.engine.lap_entries() {
        println!("{lap}");
    }
    Ok(())
}
