//! `roo-md status`: service statistics and provider timings.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::{OutputFormat, open_session};
use crate::config::EngineConfig;

#[derive(Args, Debug)]
pub struct StatusCommand {
    /// Project description file
    pub project: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl StatusCommand {
    pub fn execute(self, config: &EngineConfig) -> Result<()> {
        let session = open_session(&self.project, config)?;
        session.scan()?;
        let service = session.service();
        let statistics = service.statistics();
        let timings = service.timings();

        match self.format {
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "statistics": statistics,
                    "timings": timings,
                });
                println!("{}", serde_json::to_string_pretty(&json)?);
            }
            OutputFormat::Text => {
                println!("{}", "Metadata service".bold());
                println!("{statistics}");
                println!();
                println!("{}", "Provider timings".bold());
                for timing in &timings {
                    println!(
                        "  {:>8}µs {:>6}x  {}",
                        timing.total.as_micros(),
                        timing.invocations,
                        timing.class
                    );
                }
            }
        }
        Ok(())
    }
}
