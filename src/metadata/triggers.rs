//! Annotation triggers for metadata providers.
//!
//! Each provider declares the annotations that make a governor type eligible
//! for its metadata. The table is populated when providers are registered and
//! consulted by ITD providers before computing anything.

use std::collections::{BTreeMap, BTreeSet};

use super::MetadataId;
use crate::model::JavaType;

/// Mapping from trigger annotation to the provider classes it activates.
#[derive(Debug, Default, Clone)]
pub struct TriggerTable {
    by_annotation: BTreeMap<JavaType, BTreeSet<MetadataId>>,
    by_class: BTreeMap<MetadataId, BTreeSet<JavaType>>,
}

impl TriggerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `annotation` activates the provider for `class_id`.
    pub fn register(&mut self, annotation: JavaType, class_id: &MetadataId) {
        self.by_annotation
            .entry(annotation.clone())
            .or_default()
            .insert(class_id.clone());
        self.by_class.entry(class_id.clone()).or_default().insert(annotation);
    }

    /// Forget every trigger of a provider class.
    pub fn deregister_class(&mut self, class_id: &MetadataId) {
        let Some(annotations) = self.by_class.remove(class_id) else {
            return;
        };
        for annotation in annotations {
            if let Some(classes) = self.by_annotation.get_mut(&annotation) {
                classes.remove(class_id);
                if classes.is_empty() {
                    self.by_annotation.remove(&annotation);
                }
            }
        }
    }

    /// Whether a type with `annotations` activates the provider for `class_id`.
    ///
    /// A provider class without any registered trigger is always active.
    pub fn is_triggered<'a>(
        &self,
        class_id: &MetadataId,
        annotations: impl IntoIterator<Item = &'a JavaType>,
    ) -> bool {
        let Some(triggers) = self.by_class.get(class_id) else {
            return true;
        };
        annotations.into_iter().any(|a| triggers.contains(a))
    }

    /// Provider classes activated by one annotation.
    pub fn classes_for(&self, annotation: &JavaType) -> BTreeSet<MetadataId> {
        self.by_annotation.get(annotation).cloned().unwrap_or_default()
    }
}
