//! Shared helpers for the integration suite.

#![allow(dead_code)]

use anyhow::Result;
use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use roo_metadata::config::EngineConfig;
use roo_metadata::itd::ItdMetadata;
use roo_metadata::metadata::{MetadataId, SharedItem, downcast_item};
use roo_metadata::project::{Project, ProjectSession};

pub const JAVA_BEAN_CLASS: &str = "org.springframework.roo.addon.javabean.JavaBeanMetadata";
pub const TO_STRING_CLASS: &str = "org.springframework.roo.addon.tostring.ToStringMetadata";
pub const EQUALS_CLASS: &str = "org.springframework.roo.addon.equals.EqualsMetadata";
pub const PHYSICAL_CLASS: &str = "org.springframework.roo.classpath.PhysicalTypeIdentifier";

/// Two-level entity hierarchy used by most add-on scenarios.
pub const PETCLINIC: &str = r#"
name = "petclinic"

[[types]]
name = "com.example.BaseEntity"
annotations = ["org.springframework.roo.addon.javabean.RooJavaBean"]

[[types.fields]]
name = "code"
type = "java.lang.String"

[[types]]
name = "com.example.Owner"
superclass = "com.example.BaseEntity"
annotations = [
    "org.springframework.roo.addon.javabean.RooJavaBean",
    "org.springframework.roo.addon.tostring.RooToString",
    "org.springframework.roo.addon.equals.RooEquals",
]

[[types.fields]]
name = "id"
type = "java.lang.Long"
annotations = ["javax.persistence.Id"]

[[types.fields]]
name = "version"
type = "int"
annotations = ["javax.persistence.Version"]

[[types.fields]]
name = "lastName"
type = "java.lang.String"

[[types]]
name = "com.example.Plain"
"#;

/// A project file in a temporary directory.
pub struct TestProject {
    dir: TempDir,
    path: PathBuf,
}

impl TestProject {
    pub fn new(content: &str) -> Result<Self> {
        let dir = TempDir::new()?;
        let path = dir.path().join("project.toml");
        std::fs::write(&path, content)?;
        Ok(Self { dir, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// `roo-md` running inside the project directory with a clean environment.
    pub fn roo_md(&self) -> Command {
        let mut cmd = Command::cargo_bin("roo-md").expect("roo-md binary is built");
        cmd.current_dir(self.dir())
            .env_remove("RUST_LOG")
            .env_remove("ROO_MD_CONFIG")
            .env("NO_COLOR", "1");
        cmd
    }
}

/// A session with `content` loaded.
pub fn session(content: &str) -> Result<ProjectSession> {
    let session = ProjectSession::new(&EngineConfig::default())?;
    session.load(&Project::parse(content)?)?;
    Ok(session)
}

pub fn itd_id(class: &str, type_name: &str) -> MetadataId {
    MetadataId::instance(class, type_name).expect("valid instance identifier")
}

pub fn physical_id(type_name: &str) -> MetadataId {
    itd_id(PHYSICAL_CLASS, type_name)
}

/// `FIELDS` custom data of an ITD method, if the method was generated.
pub fn method_fields(item: &SharedItem, method: &str, parameter_types: &[&str]) -> Option<Vec<String>> {
    let itd = downcast_item::<ItdMetadata>(item)?;
    let parameter_types: Vec<_> = parameter_types
        .iter()
        .map(|p| roo_metadata::model::JavaType::new(*p))
        .collect();
    itd.members()
        .method(method, &parameter_types)
        .and_then(|m| m.custom_data().get(roo_metadata::constants::FIELDS))
        .map(<[String]>::to_vec)
}
