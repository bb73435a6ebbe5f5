//! Aggregated member surface of a type.

use std::sync::Arc;

use super::{FieldMetadata, JavaType, MemberHoldingTypeDetails, MethodMetadata};
use crate::metadata::MetadataId;

/// The complete observable member surface of a type at one point in time.
///
/// Holds the governor's own declarations (root-most superclass first) and
/// every ITD contribution, in the order the scanner gathered them. Instances
/// are never modified; [`MemberDetailsBuilder`] produces a replacement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberDetails {
    details: Vec<Arc<MemberHoldingTypeDetails>>,
}

impl MemberDetails {
    pub fn new(details: Vec<Arc<MemberHoldingTypeDetails>>) -> Self {
        Self { details }
    }

    pub fn details(&self) -> &[Arc<MemberHoldingTypeDetails>] {
        &self.details
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldMetadata> {
        self.details.iter().flat_map(|d| d.fields())
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodMetadata> {
        self.details.iter().flat_map(|d| d.methods())
    }

    pub fn field(&self, name: &str) -> Option<&FieldMetadata> {
        self.fields().find(|f| f.name() == name)
    }

    pub fn method(&self, name: &str, parameter_types: &[JavaType]) -> Option<&MethodMetadata> {
        self.methods().find(|m| m.matches(name, parameter_types))
    }

    /// Whether a method with this signature is declared by anyone other than `requester`.
    pub fn is_method_declared_by_another(
        &self,
        name: &str,
        parameter_types: &[JavaType],
        requester: &MetadataId,
    ) -> bool {
        self.methods()
            .any(|m| m.matches(name, parameter_types) && m.declared_by() != requester)
    }

    pub fn fields_with_tag<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a FieldMetadata> {
        self.fields().filter(move |f| f.custom_data().contains(key))
    }

    /// Whether any contributing declaration is tagged with `key`.
    pub fn is_type_tagged(&self, key: &str) -> bool {
        self.details.iter().any(|d| d.custom_data().contains(key))
    }

    /// Whether any contributing declaration carries the annotation.
    pub fn has_annotation(&self, annotation: &JavaType) -> bool {
        self.details.iter().any(|d| d.has_annotation(annotation))
    }
}

/// Produces a new [`MemberDetails`] only when a modification actually happened.
///
/// Decorators rely on this: the scanner detects a fixpoint by checking whether a
/// decorator handed back the very same `Arc` it received.
#[derive(Debug)]
pub struct MemberDetailsBuilder {
    original: Arc<MemberDetails>,
    details: Vec<MemberHoldingTypeDetails>,
    changed: bool,
}

impl MemberDetailsBuilder {
    pub fn new(original: &Arc<MemberDetails>) -> Self {
        Self {
            original: Arc::clone(original),
            details: original.details.iter().map(|d| (**d).clone()).collect(),
            changed: false,
        }
    }

    /// Tag a field, matched by declarer and name.
    pub fn tag_field(&mut self, field: &FieldMetadata, key: &str, values: Vec<String>) -> bool {
        let target = self
            .details
            .iter_mut()
            .filter(|d| d.declared_by() == field.declared_by())
            .flat_map(|d| d.fields_mut().iter_mut())
            .find(|f| f.name() == field.name());
        let changed = target.is_some_and(|f| f.custom_data_mut().put(key, values));
        self.changed |= changed;
        changed
    }

    /// Tag a method, matched by declarer and signature.
    pub fn tag_method(&mut self, method: &MethodMetadata, key: &str, values: Vec<String>) -> bool {
        let target = self
            .details
            .iter_mut()
            .filter(|d| d.declared_by() == method.declared_by())
            .flat_map(|d| d.methods_mut().iter_mut())
            .find(|m| m.matches(method.name(), method.parameter_types()));
        let changed = target.is_some_and(|m| m.custom_data_mut().put(key, values));
        self.changed |= changed;
        changed
    }

    /// Tag the declaration identified by `declared_by`.
    pub fn tag_type(&mut self, declared_by: &MetadataId, key: &str, values: Vec<String>) -> bool {
        let changed = self
            .details
            .iter_mut()
            .find(|d| d.declared_by() == declared_by)
            .is_some_and(|d| d.custom_data_mut().put(key, values));
        self.changed |= changed;
        changed
    }

    /// The original instance if nothing changed, otherwise a fresh one.
    pub fn build(self) -> Arc<MemberDetails> {
        if !self.changed {
            return self.original;
        }
        Arc::new(MemberDetails::new(self.details.into_iter().map(Arc::new).collect()))
    }
}
