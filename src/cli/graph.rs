//! `roo-md graph`: downstream dependency tree of one identifier.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use super::open_session;
use crate::config::EngineConfig;
use crate::metadata::MetadataId;

#[derive(Args, Debug)]
pub struct GraphCommand {
    /// Project description file
    pub project: PathBuf,

    /// Metadata identifier, e.g. `MID:org.springframework.roo.classpath.PhysicalTypeIdentifier#com.example.Person`
    pub id: String,
}

impl GraphCommand {
    pub fn execute(self, config: &EngineConfig) -> Result<()> {
        let id = MetadataId::parse(&self.id)?;
        let session = open_session(&self.project, config)?;
        session.scan()?;
        print!("{}", session.service().dependency_tree(&id));
        Ok(())
    }
}
