//! Bookings Commission Dashboard
//!
//! Summarizes agent booking commissions from the bookings table: firmwide
//! revenue by year and quarter, then one agent's quarterly summary and a
//! client drill-down for the selected years or quarter.

mod config;
mod constants;
mod dashboard;
mod error;
mod filter;
mod queries;
mod render;
mod source;
mod summary;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::filter::EnvFilter;

use config::{Config, FileConfig};
use dashboard::{Request, Selection};
use filter::YearsRequest;
use render::{OutputFormat, Renderer};

#[derive(Parser, Debug)]
#[command(name = "bookings-dashboard")]
#[command(about = "Commission reporting dashboard for agent bookings")]
struct Args {
    /// Config file (optional; built-in defaults apply when missing)
    #[arg(short, long, default_value = constants::CONFIG_FILENAME, global = true)]
    config: PathBuf,

    /// Bookings database file (overrides the config file)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    format: OutputFormat,

    /// Verbose output (logs to stderr)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the full dashboard (default)
    Show {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Drill-down period: a YearAndQuarter label or "All Selected Year(s)"
        #[arg(long)]
        period: Option<String>,
    },

    /// List agents
    Agents,

    /// List years with bookings, most recent first
    Years,

    /// List drill-down periods for an agent and years
    Periods {
        #[command(flatten)]
        selection: SelectionArgs,
    },
}

#[derive(ClapArgs, Debug)]
struct SelectionArgs {
    /// Agent name (default: configured agent, else the first agent)
    #[arg(long)]
    agent: Option<String>,

    /// Year to include; repeat or comma-separate for several
    /// (default: configured year, else latest)
    #[arg(long = "year", value_delimiter = ',')]
    years: Vec<i64>,

    /// Select no years at all
    #[arg(long, conflicts_with = "years")]
    no_years: bool,
}

impl SelectionArgs {
    fn into_selection(self, period: Option<String>) -> Selection {
        let years = if self.no_years {
            YearsRequest::Explicit(Vec::new())
        } else if self.years.is_empty() {
            YearsRequest::Default
        } else {
            YearsRequest::Explicit(self.years)
        };

        Selection {
            agent: self.agent,
            years,
            period,
        }
    }
}

/// Initialize logging to stderr; RUST_LOG overrides the default level
fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let file_config = FileConfig::load_or_default(&args.config)?;
    let config = Config::from_file(&file_config, args.database)?;

    let request = match args.command {
        None => Request::Dashboard(Selection::default()),
        Some(Command::Show { selection, period }) => {
            Request::Dashboard(selection.into_selection(period))
        }
        Some(Command::Agents) => Request::Agents,
        Some(Command::Years) => Request::Years,
        Some(Command::Periods { selection }) => Request::Periods(selection.into_selection(None)),
    };

    let mut renderer = Renderer::new(std::io::stdout(), args.format);
    dashboard::run_render_pass(&config, &request, &mut renderer).await
}
