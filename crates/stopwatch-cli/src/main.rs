use clap::{ArgAction, CommandFactory, Parser, Subcommand};

mod app;
mod commands;
mod common;
mod logging;

#[derive(Parser)]
#[command(name = "stopwatch", version, about = "Stopwatch CLI")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start (or continue) timing
    Start,
    /// Pause timing
    Pause,
    /// Stop timing and discard elapsed time and laps
    Reset,
    /// Record a lap at the current elapsed time
    Lap,
    /// Show elapsed time and laps
    Status {
        /// Print the full state snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Lap history management
    Laps {
        #[command(subcommand)]
        action: commands::laps::LapsAction,
    },
    /// Live display with interactive controls
    Watch(commands::watch::WatchArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Start => commands::stopwatch::run(commands::stopwatch::Control::Start),
        Commands::Pause => commands::stopwatch::run(commands::stopwatch::Control::Pause),
        Commands::Reset => commands::stopwatch::run(commands::stopwatch::Control::Reset),
        Commands::Lap => commands::stopwatch::run(commands::stopwatch::Control::Lap),
        Commands::Status { json } => commands::stopwatch::status(json),
        Commands::Laps { action } => commands::laps::run(action),
        Commands::Watch(args) => commands::watch::run(args),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "stopwatch", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        tracing::debug!(error = ?e, "command failed");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
