//! `roo-md describe`: cached state and immediate edges of one identifier.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use super::open_session;
use crate::config::EngineConfig;
use crate::metadata::MetadataId;

#[derive(Args, Debug)]
pub struct DescribeCommand {
    /// Project description file
    pub project: PathBuf,

    /// Metadata identifier
    pub id: String,
}

impl DescribeCommand {
    pub fn execute(self, config: &EngineConfig) -> Result<()> {
        let id = MetadataId::parse(&self.id)?;
        let session = open_session(&self.project, config)?;
        session.scan()?;
        print!("{}", session.service().describe(&id));
        Ok(())
    }
}
