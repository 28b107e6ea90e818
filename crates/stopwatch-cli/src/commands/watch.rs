//! Live display.
//!
//! The engine lives on this one task. A ticker is held only while the
//! stopwatch runs; pausing, resetting or quitting drops it so no refresh
//! fires against a stopped or torn-down engine. Lap writes go through a
//! background writer and are flushed before exit.

use std::io::Write;
use std::time::Duration;

use clap::Args;
use stopwatch_core::{format_time, Clock, Event, StopwatchEngine, TickHandle, Ticker};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::app::App;

#[derive(Args)]
pub struct WatchArgs {
    /// Display refresh interval in milliseconds (defaults to ticker.interval_ms)
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Exit after this many seconds
    #[arg(long)]
    for_secs: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Start,
    Pause,
    Lap,
    Reset,
    Quit,
    Unknown,
}

fn parse_input(line: &str) -> Option<Input> {
    let input = match line.trim() {
        "" => return None,
        "s" | "start" => Input::Start,
        "p" | "pause" => Input::Pause,
        "l" | "lap" => Input::Lap,
        "r" | "reset" => Input::Reset,
        "q" | "quit" => Input::Quit,
        _ => Input::Unknown,
    };
    Some(input)
}

pub fn run(args: WatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(watch(args))
}

async fn watch(args: WatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (mut app, writer) = App::open_background()?;
    let ticker = match args.interval_ms {
        Some(ms) => Ticker::new(Duration::from_millis(ms)),
        None => app.config.ticker(),
    };

    eprintln!("controls: s=start p=pause l=lap r=reset q=quit");
    let mut ticks = app.engine.is_running().then(|| ticker.spawn());
    render(app.engine.tick());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let deadline = async {
        match args.for_secs {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            Some(()) = next_tick(&mut ticks) => render(app.engine.tick()),
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let Some(input) = parse_input(&line) else { continue };
                if input == Input::Quit {
                    break;
                }
                apply(&mut app.engine, &ticker, &mut ticks, input);
            }
            _ = &mut ctrl_c => break,
            _ = &mut deadline => break,
        }
    }

    if let Some(mut handle) = ticks.take() {
        handle.stop();
    }
    println!();
    app.save_session()?;
    drop(app);
    writer.shutdown().await;
    Ok(())
}

/// Run one command. The ticker is held exactly while the engine runs.
fn apply<C: Clock>(
    engine: &mut StopwatchEngine<C>,
    ticker: &Ticker,
    ticks: &mut Option<TickHandle>,
    input: Input,
) {
    let event = match input {
        Input::Start => {
            let event = engine.start();
            if event.is_some() {
                *ticks = Some(ticker.spawn());
            }
            event
        }
        Input::Pause => engine.pause(),
        Input::Reset => engine.reset(),
        Input::Lap => engine.record_lap(),
        Input::Quit => None,
        Input::Unknown => {
            eprintln!("\nunknown command; use s, p, l, r or q");
            None
        }
    };

    if !engine.is_running() {
        if let Some(mut handle) = ticks.take() {
            handle.stop();
        }
    }

    match event {
        Some(Event::LapRecorded {
            number, elapsed_ms, ..
        }) => println!("\nLap {number}: {}", format_time(elapsed_ms)),
        Some(Event::StopwatchReset { .. }) => render(0),
        Some(_) => render(engine.current_ms()),
        None => {}
    }
}

async fn next_tick(ticks: &mut Option<TickHandle>) -> Option<()> {
    match ticks {
        Some(handle) => handle.recv().await,
        None => std::future::pending().await,
    }
}

fn render(ms: u64) {
    let mut stdout = std::io::stdout();
    let _ = write!(stdout, "\r{}", format_time(ms));
    let _ = stdout.flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use stopwatch_core::ManualClock;

    #[test]
    fn parses_short_and_long_commands() {
        assert_eq!(parse_input("s\n"), Some(Input::Start));
        assert_eq!(parse_input(" pause "), Some(Input::Pause));
        assert_eq!(parse_input("l"), Some(Input::Lap));
        assert_eq!(parse_input("reset"), Some(Input::Reset));
        assert_eq!(parse_input("q"), Some(Input::Quit));
        assert_eq!(parse_input("x"), Some(Input::Unknown));
        assert_eq!(parse_input("   "), None);
    }

    #[tokio::test]
    async fn ticker_is_held_only_while_running() {
        let mut engine = StopwatchEngine::with_clock(ManualClock::new(0));
        let ticker = Ticker::new(Duration::from_millis(5));
        let mut ticks = None;

        apply(&mut engine, &ticker, &mut ticks, Input::Start);
        assert!(ticks.is_some());
        assert!(next_tick(&mut ticks).await.is_some());

        apply(&mut engine, &ticker, &mut ticks, Input::Lap);
        assert!(ticks.is_some(), "lap keeps the display running");

        apply(&mut engine, &ticker, &mut ticks, Input::Pause);
        assert!(ticks.is_none());
        apply(&mut engine, &ticker, &mut ticks, Input::Lap);
        assert!(ticks.is_none(), "lap while paused does not restart ticking");

        apply(&mut engine, &ticker, &mut ticks, Input::Start);
        assert!(ticks.is_some());
        apply(&mut engine, &ticker, &mut ticks, Input::Reset);
        assert!(ticks.is_none());
        assert!(engine.laps().is_empty());
    }

    #[tokio::test]
    async fn repeated_start_keeps_one_ticker() {
        let mut engine = StopwatchEngine::with_clock(ManualClock::new(0));
        let ticker = Ticker::default();
        let mut ticks = None;

        apply(&mut engine, &ticker, &mut ticks, Input::Start);
        apply(&mut engine, &ticker, &mut ticks, Input::Start);
        assert!(ticks.is_some());
        apply(&mut engine, &ticker, &mut ticks, Input::Unknown);
        assert!(ticks.is_some());
    }
}
