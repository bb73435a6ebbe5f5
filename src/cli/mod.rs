//! Command-line interface for `roo-md`.
//!
//! Every command loads a project description, registers the physical type
//! provider and the bundled add-ons, feeds the project's types through the
//! engine and then reports on the result:
//!
//! - `scan` - members each ITD contributes to each type
//! - `status` - service statistics and per-provider timings
//! - `graph` - downstream dependency tree of one identifier
//! - `describe` - cached state and immediate edges of one identifier
//!
//! # Global Options
//!
//! - `--config <path>` - engine configuration (defaults to `roo-metadata.toml`)
//! - `--verbose` - debug logging
//! - `--quiet` - errors only
//!
//! A non-zero `trace_level` in the configuration also enables the
//! `roo_metadata::trace` target at `info`, unless `--quiet` is given.
//! `RUST_LOG` overrides all of these.

mod describe;
mod graph;
mod scan;
mod status;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use crate::config::EngineConfig;
use crate::constants::TRACE_TARGET;
use crate::project::{Project, ProjectSession};

pub use describe::DescribeCommand;
pub use graph::GraphCommand;
pub use scan::ScanCommand;
pub use status::StatusCommand;

/// Output format for commands that support machine-readable output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Top-level `roo-md` arguments.
#[derive(Parser, Debug)]
#[command(
    name = "roo-md",
    about = "Incremental ITD metadata engine",
    version,
    long_about = "Computes inter-type declaration metadata for a project description, \
                  tracking dependencies between metadata so only what changed is recomputed."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Engine configuration file
    #[arg(long, global = true, env = "ROO_MD_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compute every ITD of every type and print the contributed members
    Scan(ScanCommand),
    /// Print service statistics and provider timings after a scan
    Status(StatusCommand),
    /// Print the downstream dependency tree of a metadata identifier
    Graph(GraphCommand),
    /// Print what the engine knows about a metadata identifier
    Describe(DescribeCommand),
}

impl Cli {
    /// Initialise logging, load configuration and run the selected command.
    ///
    /// # Errors
    ///
    /// Returns any configuration, project or engine error.
    pub fn execute(self) -> Result<()> {
        let config = EngineConfig::load(self.config.as_deref());
        self.init_logging(config.as_ref().map_or(0, |c| c.trace_level));
        let config = config?;

        match self.command {
            Commands::Scan(cmd) => cmd.execute(&config),
            Commands::Status(cmd) => cmd.execute(&config),
            Commands::Graph(cmd) => cmd.execute(&config),
            Commands::Describe(cmd) => cmd.execute(&config),
        }
    }

    fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        }
    }

    /// Filter directives for the verbosity flags and the configured trace level.
    fn log_directives(&self, trace_level: u8) -> String {
        if trace_level > 0 && !self.quiet {
            format!("{},{TRACE_TARGET}=info", self.log_level())
        } else {
            self.log_level().to_string()
        }
    }

    fn init_logging(&self, trace_level: u8) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(self.log_directives(trace_level))
        };
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Build a session and load the project into it.
pub(crate) fn open_session(project: &Path, config: &EngineConfig) -> Result<ProjectSession> {
    let project = Project::load(project)?;
    let session = ProjectSession::new(config)?;
    session.load(&project)?;
    Ok(session)
}
