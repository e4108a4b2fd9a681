use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// A `--rc KEY=VALUE` override.
#[derive(Debug, Clone)]
pub struct KeyVal {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for KeyVal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {s}"))?;
        Ok(Self {
            key: k.trim().to_string(),
            value: v.trim().to_string(),
        })
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "agenda",
    version,
    about = "File-backed task list for the terminal",
    disable_help_subcommand = true
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Config file to use instead of ~/.agendarc.
    #[arg(long = "agendarc", global = true)]
    pub agendarc: Option<PathBuf>,

    /// Data directory to use instead of the data.location config key.
    #[arg(long = "data", global = true)]
    pub data: Option<PathBuf>,

    /// Override a config key for this invocation. May be repeated.
    #[arg(
        long = "rc",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
        action = ArgAction::Append,
        global = true
    )]
    pub rc_overrides: Vec<KeyVal>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task.
    Add {
        /// Task name. Empty is accepted.
        name: String,
        /// Optional longer description.
        #[arg(long, default_value = "")]
        desc: String,
        /// Due date: YYYY-MM-DD, an RFC 3339 timestamp, "today",
        /// "tomorrow", "yesterday", or "in Nd" / "in Nw". Defaults to now.
        #[arg(long)]
        due: Option<String>,
    },

    /// List tasks in their current order.
    List,

    /// Show a single task in full.
    Show {
        /// Task id (or unique prefix), or exact task name.
        id: String,
    },

    /// Advance a task one step along the status cycle
    /// Not Started -> In Progress -> Completed -> Not Started.
    Toggle {
        /// Task id (or unique prefix), or exact task name.
        id: String,
    },

    /// Delete tasks by id or by list position.
    Delete {
        /// Task ids (or unique prefixes), or exact task names.
        ids: Vec<String>,
        /// Zero-based list positions instead of ids. May be repeated.
        #[arg(long = "at")]
        positions: Vec<usize>,
    },

    /// Reorder the task list.
    Sort {
        #[arg(value_enum)]
        key: SortKey,
    },

    /// Print the effective configuration.
    Config,
}

/// Sort keys for the `sort` subcommand.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortKey {
    /// Ascending by due date; ties keep their order.
    Date,
    /// Not Started first, then In Progress, then Completed.
    Status,
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}
