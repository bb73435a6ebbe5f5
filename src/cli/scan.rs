//! `roo-md scan`: print the members every ITD contributes.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::{OutputFormat, open_session};
use crate::config::EngineConfig;

#[derive(Args, Debug)]
pub struct ScanCommand {
    /// Project description file
    pub project: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl ScanCommand {
    pub fn execute(self, config: &EngineConfig) -> Result<()> {
        let session = open_session(&self.project, config)?;
        let reports = session.scan()?;

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
            OutputFormat::Text => {
                for report in &reports {
                    println!("{}", report.name.to_string().cyan().bold());
                    if report.itds.is_empty() {
                        println!("  {}", "(no ITDs)".dimmed());
                    }
                    for itd in &report.itds {
                        println!("  {}", itd.id.metadata_class().green());
                        for field in &itd.fields {
                            println!("    field  {field}");
                        }
                        for method in &itd.methods {
                            println!("    method {method}");
                        }
                    }
                }
                let contributing = reports.iter().filter(|r| !r.itds.is_empty()).count();
                println!("\n{} type(s), {contributing} with ITDs", reports.len());
            }
        }
        Ok(())
    }
}
