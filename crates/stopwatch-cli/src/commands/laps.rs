use clap::Subcommand;

use crate::app::App;
use crate::common::{confirm, print_event};

#[derive(Subcommand)]
pub enum LapsAction {
    /// List recorded laps
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a lap by its displayed number (1-based)
    Delete {
        /// Lap number as shown by `laps list`
        number: usize,
    },
    /// Delete all laps
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

pub fn run(action: LapsAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::open()?;

    match action {
        LapsAction::List { json } => {
            let laps = app.engine.lap_entries();
            if json {
                println!("{}", serde_json::to_string_pretty(&laps)?);
            } else if laps.is_empty() {
                println!("no laps recorded");
            } else {
                for lap in laps {
                    println!("{lap}");
                }
            }
        }
        LapsAction::Delete { number } => {
            let event = number
                .checked_sub(1)
                .and_then(|index| app.engine.delete_lap(index));
            print_event(event)?;
        }
        LapsAction::Clear { yes } => {
            let count = app.engine.laps().len();
            if count > 0 && !yes && app.config.ui.confirm_clear_laps {
                let prompt = format!("Clear all {count} laps?");
                if !confirm(&prompt)? {
                    eprintln!("aborted");
                    return Ok(());
                }
            }
            print_event(app.engine.clear_laps())?;
        }
    }
    Ok(())
}
