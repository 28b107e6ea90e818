//! Output and prompt helpers shared by commands.

use std::io::{self, BufRead, Write};

use stopwatch_core::Event;

/// Print an event as pretty JSON, or `null` when the command was a no-op.
pub fn print_event(event: Option<Event>) -> Result<(), Box<dyn std::error::Error>> {
    write_event(&mut io::stdout().lock(), event)
}

pub fn write_event(
    out: &mut impl Write,
    event: Option<Event>,
) -> Result<(), Box<dyn std::error::Error>> {
    match event {
        Some(event) => writeln!(out, "{}", serde_json::to_string_pretty(&event)?)?,
        None => writeln!(out, "null")?,
    }
    Ok(())
}

/// Ask a yes/no question on stderr. Anything but `y`/`yes` is a no.
pub fn confirm(prompt: &str) -> io::Result<bool> {
    let mut stderr = io::stderr();
    write!(stderr, "{prompt} [y/N] ")?;
    stderr.flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
