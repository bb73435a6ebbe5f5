//! Member-holding type details.
//!
//! A [`MemberHoldingTypeDetails`] is one contributor to a type's member surface:
//! either the governor's own class or interface declaration, or one ITD's
//! contribution. [`ClassOrInterfaceTypeDetails`] adds the resolved superclass
//! chain on top.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{CustomData, FieldMetadata, JavaType, MethodMetadata};
use crate::metadata::MetadataId;

/// What kind of declaration contributed a set of members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Class,
    Interface,
    Itd,
}

/// Immutable members contributed by one declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberHoldingTypeDetails {
    declared_by: MetadataId,
    kind: TypeKind,
    name: JavaType,
    annotations: Vec<JavaType>,
    fields: Vec<FieldMetadata>,
    methods: Vec<MethodMetadata>,
    custom_data: CustomData,
}

impl MemberHoldingTypeDetails {
    /// Identifier of the metadata that declared these members.
    pub fn declared_by(&self) -> &MetadataId {
        &self.declared_by
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// The type these members belong to (the governor, for ITDs).
    pub fn name(&self) -> &JavaType {
        &self.name
    }

    pub fn annotations(&self) -> &[JavaType] {
        &self.annotations
    }

    pub fn has_annotation(&self, annotation: &JavaType) -> bool {
        self.annotations.contains(annotation)
    }

    pub fn fields(&self) -> &[FieldMetadata] {
        &self.fields
    }

    pub fn methods(&self) -> &[MethodMetadata] {
        &self.methods
    }

    pub fn custom_data(&self) -> &CustomData {
        &self.custom_data
    }

    /// Whether this declaration contributes no members.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.methods.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&FieldMetadata> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn method(&self, name: &str, parameter_types: &[JavaType]) -> Option<&MethodMetadata> {
        self.methods.iter().find(|m| m.matches(name, parameter_types))
    }

    pub(crate) fn fields_mut(&mut self) -> &mut [FieldMetadata] {
        &mut self.fields
    }

    pub(crate) fn methods_mut(&mut self) -> &mut [MethodMetadata] {
        &mut self.methods
    }

    pub(crate) fn custom_data_mut(&mut self) -> &mut CustomData {
        &mut self.custom_data
    }
}

/// Mutable staging structure for [`MemberHoldingTypeDetails`].
///
/// Members added through the builder are re-stamped with the builder's
/// `declared_by` so a declaration never claims members it did not declare.
#[derive(Debug, Clone)]
pub struct TypeDetailsBuilder {
    details: MemberHoldingTypeDetails,
}

impl TypeDetailsBuilder {
    pub fn new(declared_by: MetadataId, kind: TypeKind, name: JavaType) -> Self {
        Self {
            details: MemberHoldingTypeDetails {
                declared_by,
                kind,
                name,
                annotations: Vec::new(),
                fields: Vec::new(),
                methods: Vec::new(),
                custom_data: CustomData::new(),
            },
        }
    }

    pub fn declared_by(&self) -> &MetadataId {
        &self.details.declared_by
    }

    pub fn name(&self) -> &JavaType {
        &self.details.name
    }

    pub fn add_annotation(&mut self, annotation: JavaType) -> &mut Self {
        if !self.details.annotations.contains(&annotation) {
            self.details.annotations.push(annotation);
        }
        self
    }

    pub fn add_field(&mut self, field: FieldMetadata) -> &mut Self {
        let field = field.with_declared_by(self.details.declared_by.clone());
        self.details.fields.push(field);
        self
    }

    pub fn add_method(&mut self, method: MethodMetadata) -> &mut Self {
        let method = method.with_declared_by(self.details.declared_by.clone());
        self.details.methods.push(method);
        self
    }

    pub fn has_method(&self, name: &str, parameter_types: &[JavaType]) -> bool {
        self.details.method(name, parameter_types).is_some()
    }

    pub fn build(self) -> MemberHoldingTypeDetails {
        self.details
    }
}

/// A governor's own declaration with its superclass chain resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassOrInterfaceTypeDetails {
    members: Arc<MemberHoldingTypeDetails>,
    superclass_name: Option<JavaType>,
    superclass: Option<Arc<ClassOrInterfaceTypeDetails>>,
}

impl ClassOrInterfaceTypeDetails {
    pub fn new(
        members: MemberHoldingTypeDetails,
        superclass_name: Option<JavaType>,
        superclass: Option<Arc<ClassOrInterfaceTypeDetails>>,
    ) -> Self {
        Self {
            members: Arc::new(members),
            superclass_name,
            superclass,
        }
    }

    pub fn members(&self) -> &Arc<MemberHoldingTypeDetails> {
        &self.members
    }

    pub fn name(&self) -> &JavaType {
        self.members.name()
    }

    pub fn declared_by(&self) -> &MetadataId {
        self.members.declared_by()
    }

    pub fn annotations(&self) -> &[JavaType] {
        self.members.annotations()
    }

    /// The declared superclass name, whether or not it could be resolved.
    pub fn superclass_name(&self) -> Option<&JavaType> {
        self.superclass_name.as_ref()
    }

    pub fn superclass(&self) -> Option<&Arc<ClassOrInterfaceTypeDetails>> {
        self.superclass.as_ref()
    }

    /// This type followed by each resolved superclass, nearest first.
    pub fn hierarchy(&self) -> Vec<&ClassOrInterfaceTypeDetails> {
        let mut chain = vec![self];
        let mut current = self.superclass.as_deref();
        while let Some(parent) = current {
            chain.push(parent);
            current = parent.superclass.as_deref();
        }
        chain
    }
}
