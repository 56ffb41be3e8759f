mod cmd;
mod host;
mod output;
mod root;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;
use taskminder_core::calendar::ReminderTime;

#[derive(Parser)]
#[command(
    name = "taskminder",
    about = "Daily local reminders for outstanding recurring and date-ranged tasks",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .taskminder/)
    #[arg(long, global = true, env = "TASKMINDER_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .taskminder/ with a default config and a sample task file
    Init,

    /// Turn the daily reminder on and arm the next wake-up
    Enable {
        /// Local time of day, HH:MM (default: the last configured time, else 07:55)
        #[arg(long, value_name = "HH:MM")]
        at: Option<ReminderTime>,
    },

    /// Turn the daily reminder off and cancel the pending wake-up
    Disable,

    /// Show reminder settings and the pending wake-up
    Status,

    /// List tasks still outstanding today without notifying
    Outstanding {
        /// Evaluate this local date instead of today (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Run the reminder cycle once now: re-arm, evaluate, notify
    Trigger,

    /// Restore the wake-up after a restart if reminders are enabled
    Boot,

    /// Run the host loop that delivers wake-ups until interrupted
    Daemon,

    /// Inspect the host configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Daemon => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root, cli.json),
        Commands::Enable { at } => cmd::reminder::enable(&root, at, cli.json),
        Commands::Disable => cmd::reminder::disable(&root, cli.json),
        Commands::Status => cmd::reminder::status(&root, cli.json),
        Commands::Outstanding { date } => cmd::outstanding::run(&root, date, cli.json),
        Commands::Trigger => cmd::trigger::trigger(&root, cli.json),
        Commands::Boot => cmd::trigger::boot(&root, cli.json),
        Commands::Daemon => cmd::daemon::run(&root),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
