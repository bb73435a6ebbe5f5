//! Physical type metadata: the source of truth for governor declarations.
//!
//! Physical type identifiers have the form
//! `MID:org.springframework.roo.classpath.PhysicalTypeIdentifier#<fqcn>`.
//! Declarations are pushed in through [`PhysicalTypeProvider::update_type`]
//! (a source file was saved) and [`PhysicalTypeProvider::remove_type`] (a
//! source file was deleted). A declaration's superclass is resolved through
//! the service, so a subclass is refreshed whenever its superclass changes.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::constants::PHYSICAL_TYPE_CLASS;
use crate::core::{MetadataError, Result};
use crate::metadata::{
    HashTrackingNotifier, MetadataId, MetadataItem, MetadataNotificationListener, MetadataProvider,
    MetadataService, SharedItem, content_hash_of, downcast_item,
};
use crate::model::{
    ClassOrInterfaceTypeDetails, FieldMetadata, JavaType, MemberHoldingTypeDetails, MethodMetadata,
    TypeDetailsBuilder, TypeKind,
};

/// Class identifier of physical type metadata.
pub fn physical_type_class_id() -> MetadataId {
    MetadataId::from_static_class(PHYSICAL_TYPE_CLASS)
}

/// Physical type identifier for a fully qualified type name.
pub fn physical_type_id(type_name: &JavaType) -> Option<MetadataId> {
    MetadataId::instance(PHYSICAL_TYPE_CLASS, type_name.as_str())
}

/// Whether `id` is a physical type instance identifier.
pub fn is_physical_type_id(id: &MetadataId) -> bool {
    id.is_instance() && id.metadata_class() == PHYSICAL_TYPE_CLASS
}

/// A field as written in a source declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDeclaration {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: JavaType,
    #[serde(default)]
    pub annotations: Vec<JavaType>,
}

/// A method as written in a source declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodDeclaration {
    pub name: String,
    #[serde(default = "JavaType::void_primitive")]
    pub return_type: JavaType,
    #[serde(default)]
    pub parameters: Vec<JavaType>,
    #[serde(default)]
    pub annotations: Vec<JavaType>,
}

/// A governor type as written in its source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeDeclaration {
    pub name: JavaType,
    #[serde(default = "default_kind")]
    pub kind: TypeKind,
    #[serde(default)]
    pub superclass: Option<JavaType>,
    #[serde(default)]
    pub annotations: Vec<JavaType>,
    #[serde(default)]
    pub fields: Vec<FieldDeclaration>,
    #[serde(default)]
    pub methods: Vec<MethodDeclaration>,
}

fn default_kind() -> TypeKind {
    TypeKind::Class
}

impl TypeDeclaration {
    pub fn new(name: impl Into<JavaType>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Class,
            superclass: None,
            annotations: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    #[must_use]
    pub fn extends(mut self, superclass: impl Into<JavaType>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    #[must_use]
    pub fn annotated(mut self, annotation: impl Into<JavaType>) -> Self {
        self.annotations.push(annotation.into());
        self
    }

    #[must_use]
    pub fn field(mut self, name: &str, field_type: impl Into<JavaType>, annotations: &[&str]) -> Self {
        self.fields.push(FieldDeclaration {
            name: name.to_string(),
            field_type: field_type.into(),
            annotations: annotations.iter().map(|a| JavaType::new(*a)).collect(),
        });
        self
    }

    #[must_use]
    pub fn method(mut self, name: &str, return_type: impl Into<JavaType>, parameters: &[&str]) -> Self {
        self.methods.push(MethodDeclaration {
            name: name.to_string(),
            return_type: return_type.into(),
            parameters: parameters.iter().map(|p| JavaType::new(*p)).collect(),
            annotations: Vec::new(),
        });
        self
    }

    fn to_member_details(&self, declared_by: MetadataId) -> MemberHoldingTypeDetails {
        let mut builder = TypeDetailsBuilder::new(declared_by.clone(), self.kind, self.name.clone());
        for annotation in &self.annotations {
            builder.add_annotation(annotation.clone());
        }
        for field in &self.fields {
            let mut metadata =
                FieldMetadata::builder(declared_by.clone(), field.name.clone(), field.field_type.clone());
            for annotation in &field.annotations {
                metadata = metadata.annotation(annotation.clone());
            }
            builder.add_field(metadata.build());
        }
        for method in &self.methods {
            let mut metadata =
                MethodMetadata::builder(declared_by.clone(), method.name.clone(), method.return_type.clone());
            for (i, parameter) in method.parameters.iter().enumerate() {
                metadata = metadata.parameter(format!("arg{i}"), parameter.clone());
            }
            for annotation in &method.annotations {
                metadata = metadata.annotation(annotation.clone());
            }
            builder.add_method(metadata.build());
        }
        builder.build()
    }
}

/// A governor's declaration with its superclass chain resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhysicalTypeMetadata {
    id: MetadataId,
    details: Arc<ClassOrInterfaceTypeDetails>,
}

impl PhysicalTypeMetadata {
    pub fn details(&self) -> &Arc<ClassOrInterfaceTypeDetails> {
        &self.details
    }
}

impl MetadataItem for PhysicalTypeMetadata {
    fn id(&self) -> &MetadataId {
        &self.id
    }

    fn is_valid(&self) -> bool {
        true
    }

    fn content_hash(&self) -> u64 {
        content_hash_of(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Fetch the resolved details of a governor through the service.
pub fn governor_details(
    service: &MetadataService,
    physical_id: &MetadataId,
) -> Result<Option<Arc<ClassOrInterfaceTypeDetails>>> {
    let Some(item) = service.get(physical_id)? else {
        return Ok(None);
    };
    Ok(downcast_item::<PhysicalTypeMetadata>(&item).map(|physical| Arc::clone(physical.details())))
}

/// Holds every known governor declaration.
pub struct PhysicalTypeProvider {
    class_id: MetadataId,
    declarations: RwLock<BTreeMap<JavaType, TypeDeclaration>>,
    notifier: HashTrackingNotifier,
}

impl Default for PhysicalTypeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicalTypeProvider {
    pub fn new() -> Self {
        let class_id = physical_type_class_id();
        Self {
            notifier: HashTrackingNotifier::new(class_id.clone()),
            class_id,
            declarations: RwLock::new(BTreeMap::new()),
        }
    }

    /// Known type names in alphabetical order.
    pub fn type_names(&self) -> Vec<JavaType> {
        self.declarations.read().keys().cloned().collect()
    }

    pub fn declaration(&self, name: &JavaType) -> Option<TypeDeclaration> {
        self.declarations.read().get(name).cloned()
    }

    /// Record a new or changed declaration and notify downstream if it differs.
    ///
    /// Returns whether downstream metadata was notified.
    ///
    /// # Errors
    ///
    /// Fails if the type name cannot form an identifier or downstream
    /// notification fails.
    pub fn update_type(&self, service: &MetadataService, declaration: TypeDeclaration) -> Result<bool> {
        let id = physical_type_id(&declaration.name)
            .ok_or_else(|| MetadataError::invalid_id(declaration.name.as_str(), "a type name usable as an instance"))?;
        tracing::debug!("Updating physical type {}", declaration.name);
        self.declarations.write().insert(declaration.name.clone(), declaration);

        match service.evict_and_get(&id)? {
            Some(item) => self.notifier.notify_if_required(service, &item),
            None => Ok(false),
        }
    }

    /// Forget a declaration and notify everything that depended on it.
    ///
    /// Returns whether the type was known.
    pub fn remove_type(&self, service: &MetadataService, name: &JavaType) -> Result<bool> {
        if self.declarations.write().remove(name).is_none() {
            return Ok(false);
        }
        let Some(id) = physical_type_id(name) else {
            return Ok(true);
        };
        tracing::debug!("Removed physical type {name}");
        service.evict(&id);
        self.notifier.forget(&id);
        service.notify_downstream(&id)?;
        Ok(true)
    }

    fn resolve_superclass(
        &self,
        service: &MetadataService,
        superclass: &JavaType,
        id: &MetadataId,
    ) -> Result<Option<Arc<ClassOrInterfaceTypeDetails>>> {
        let Some(super_id) = physical_type_id(superclass) else {
            return Ok(None);
        };
        if !service.is_valid_dependency(&super_id, id) {
            tracing::warn!("Ignoring cyclic superclass {superclass} of {id}");
            return Ok(None);
        }
        // Registered even when the superclass is unknown, so its later arrival refreshes us.
        service.register_dependency(&super_id, id)?;
        governor_details(service, &super_id)
    }
}

impl MetadataProvider for PhysicalTypeProvider {
    fn provides_type(&self) -> MetadataId {
        self.class_id.clone()
    }

    fn get(&self, service: &MetadataService, id: &MetadataId) -> Result<Option<SharedItem>> {
        let Some(key) = id.instance_key() else {
            return Ok(None);
        };
        let Some(declaration) = self.declaration(&JavaType::new(key)) else {
            return Ok(None);
        };

        service.deregister_dependencies(id);
        let superclass = match &declaration.superclass {
            Some(name) => self.resolve_superclass(service, name, id)?,
            None => None,
        };
        let details = ClassOrInterfaceTypeDetails::new(
            declaration.to_member_details(id.clone()),
            declaration.superclass.clone(),
            superclass,
        );
        Ok(Some(Arc::new(PhysicalTypeMetadata {
            id: id.clone(),
            details: Arc::new(details),
        })))
    }

    fn as_notification_listener(&self) -> Option<&dyn MetadataNotificationListener> {
        Some(self)
    }
}

impl MetadataNotificationListener for PhysicalTypeProvider {
    /// A superclass changed: rebuild the subclass, notifying only on real change.
    fn notify(
        &self,
        service: &MetadataService,
        _upstream: &MetadataId,
        downstream: Option<&MetadataId>,
    ) -> Result<()> {
        match downstream {
            Some(id) if id.is_instance() => super::refresh(service, &self.notifier, id),
            _ => Ok(()),
        }
    }
}
