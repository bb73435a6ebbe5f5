//! Project descriptions and the session that drives the engine over them.
//!
//! A project file stands in for a source tree: it lists the governor types
//! with their superclass, annotations, fields and methods.
//!
//! ```toml
//! name = "petclinic"
//!
//! [[types]]
//! name = "com.example.Person"
//! annotations = ["org.springframework.roo.addon.javabean.RooJavaBean"]
//!
//! [[types.fields]]
//! name = "name"
//! type = "java.lang.String"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::addons;
use crate::config::{EngineConfig, parse_toml_file};
use crate::itd::{ItdMetadata, PhysicalTypeProvider, TypeDeclaration, physical_type_id};
use crate::metadata::{MetadataId, MetadataService, downcast_item};
use crate::model::JavaType;
use crate::scanner::MemberDetailsScanner;

/// Parsed project file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Project {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub types: Vec<TypeDeclaration>,
}

impl Project {
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let project: Self = parse_toml_file(path)?;
        tracing::debug!("Loaded {} type(s) from {}", project.types.len(), path.display());
        Ok(project)
    }

    /// # Errors
    ///
    /// Fails if `content` is not a valid project description.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse project description")
    }
}

/// Members one ITD contributes to one type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItdReport {
    pub id: MetadataId,
    pub fields: Vec<String>,
    pub methods: Vec<String>,
}

/// Every ITD computed for one type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeReport {
    pub name: JavaType,
    pub itds: Vec<ItdReport>,
}

impl fmt::Display for TypeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        if self.itds.is_empty() {
            writeln!(f, "  (no ITDs)")?;
        }
        for itd in &self.itds {
            writeln!(f, "  {}", itd.id.metadata_class())?;
            for field in &itd.fields {
                writeln!(f, "    field  {field}")?;
            }
            for method in &itd.methods {
                writeln!(f, "    method {method}")?;
            }
        }
        Ok(())
    }
}

/// A metadata service with the physical type provider and bundled add-ons installed.
pub struct ProjectSession {
    service: MetadataService,
    scanner: Arc<MemberDetailsScanner>,
    physical: Arc<PhysicalTypeProvider>,
}

impl ProjectSession {
    /// # Errors
    ///
    /// Fails if the configuration is invalid.
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let service = MetadataService::with_config(config)?;
        let scanner = Arc::new(MemberDetailsScanner::new());
        let physical = Arc::new(PhysicalTypeProvider::new());
        service.register_provider(physical.clone())?;
        addons::install(&service, &scanner)?;
        Ok(Self {
            service,
            scanner,
            physical,
        })
    }

    pub fn service(&self) -> &MetadataService {
        &self.service
    }

    pub fn scanner(&self) -> &Arc<MemberDetailsScanner> {
        &self.scanner
    }

    pub fn physical(&self) -> &PhysicalTypeProvider {
        &self.physical
    }

    /// Feed every type declaration to the physical type provider.
    ///
    /// # Errors
    ///
    /// Fails on an unusable type name or a provider failure.
    pub fn load(&self, project: &Project) -> Result<()> {
        for declaration in &project.types {
            let name = declaration.name.clone();
            self.physical
                .update_type(&self.service, declaration.clone())
                .with_context(|| format!("Failed to load type {name}"))?;
        }
        Ok(())
    }

    /// Compute every ITD of every known type.
    ///
    /// # Errors
    ///
    /// Fails if any provider fails.
    pub fn scan(&self) -> Result<Vec<TypeReport>> {
        let itd_providers = self.service.itd_providers();
        let mut reports = Vec::new();
        for name in self.physical.type_names() {
            let Some(physical_id) = physical_type_id(&name) else {
                continue;
            };
            let mut itds = Vec::new();
            for provider in &itd_providers {
                let Some(itd_id) = provider
                    .as_itd_provider()
                    .and_then(|itd| itd.id_for_physical_type(&physical_id))
                else {
                    continue;
                };
                let Some(item) = self.service.get(&itd_id)? else {
                    continue;
                };
                let Some(metadata) = downcast_item::<ItdMetadata>(&item) else {
                    tracing::warn!("{itd_id} is not ITD metadata, skipping");
                    continue;
                };
                if metadata.members().is_empty() {
                    continue;
                }
                itds.push(ItdReport {
                    id: itd_id,
                    fields: metadata
                        .members()
                        .fields()
                        .iter()
                        .map(|f| format!("{} {}", f.field_type(), f.name()))
                        .collect(),
                    methods: metadata
                        .members()
                        .methods()
                        .iter()
                        .map(|m| format!("{} {}", m.return_type(), m.signature()))
                        .collect(),
                });
            }
            reports.push(TypeReport { name, itds });
        }
        Ok(reports)
    }
}
