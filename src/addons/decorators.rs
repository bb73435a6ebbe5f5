use std::sync::Arc;

use crate::constants::{IDENTIFIER_FIELD, PERSISTENT_TYPE, VERSION_FIELD};
use crate::metadata::MetadataId;
use crate::model::{FieldMetadata, JavaType, MemberDetails, MemberDetailsBuilder};
use crate::scanner::MemberDetailsDecorator;

use super::{JPA_ID, JPA_VERSION};

/// Tags JPA identifier and version fields.
pub struct IdentifierDecorator;

impl MemberDetailsDecorator for IdentifierDecorator {
    fn name(&self) -> &str {
        "identifier"
    }

    fn decorate(&self, _requesting_class: &MetadataId, details: &Arc<MemberDetails>) -> Arc<MemberDetails> {
        let id = JavaType::new(JPA_ID);
        let version = JavaType::new(JPA_VERSION);
        let untagged: Vec<(FieldMetadata, &str)> = details
            .fields()
            .filter_map(|f| {
                if f.has_annotation(&id) && !f.custom_data().contains(IDENTIFIER_FIELD) {
                    Some((f.clone(), IDENTIFIER_FIELD))
                } else if f.has_annotation(&version) && !f.custom_data().contains(VERSION_FIELD) {
                    Some((f.clone(), VERSION_FIELD))
                } else {
                    None
                }
            })
            .collect();
        if untagged.is_empty() {
            return Arc::clone(details);
        }

        let mut builder = MemberDetailsBuilder::new(details);
        for (field, key) in untagged {
            builder.tag_field(&field, key, Vec::new());
        }
        builder.build()
    }
}

/// Tags every declaration that holds an identifier field.
///
/// Relies on [`IdentifierDecorator`] having tagged the field first.
pub struct PersistentTypeDecorator;

impl MemberDetailsDecorator for PersistentTypeDecorator {
    fn name(&self) -> &str {
        "persistent-type"
    }

    fn decorate(&self, _requesting_class: &MetadataId, details: &Arc<MemberDetails>) -> Arc<MemberDetails> {
        let untagged: Vec<MetadataId> = details
            .details()
            .iter()
            .filter(|d| !d.custom_data().contains(PERSISTENT_TYPE))
            .filter(|d| d.fields().iter().any(|f| f.custom_data().contains(IDENTIFIER_FIELD)))
            .map(|d| d.declared_by().clone())
            .collect();
        if untagged.is_empty() {
            return Arc::clone(details);
        }

        let mut builder = MemberDetailsBuilder::new(details);
        for declared_by in &untagged {
            builder.tag_type(declared_by, PERSISTENT_TYPE, Vec::new());
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TypeDetailsBuilder, TypeKind};
    use crate::scanner::MemberDetailsScanner;

    fn entity() -> Arc<MemberDetails> {
        let declared_by = MetadataId::parse("MID:test.Physical#a.Person").unwrap();
        let mut builder = TypeDetailsBuilder::new(declared_by.clone(), TypeKind::Class, JavaType::new("a.Person"));
        builder
            .add_field(
                FieldMetadata::builder(declared_by.clone(), "id", JavaType::new("java.lang.Long"))
                    .annotation(JavaType::new(JPA_ID))
                    .build(),
            )
            .add_field(
                FieldMetadata::builder(declared_by.clone(), "version", JavaType::int_primitive())
                    .annotation(JavaType::new(JPA_VERSION))
                    .build(),
            )
            .add_field(FieldMetadata::builder(declared_by, "name", JavaType::string()).build());
        Arc::new(MemberDetails::new(vec![Arc::new(builder.build())]))
    }

    fn requester() -> MetadataId {
        MetadataId::class("test.Requester").unwrap()
    }

    #[test]
    fn test_identifier_decorator_tags_once() {
        let original = entity();
        let tagged = IdentifierDecorator.decorate(&requester(), &original);
        assert!(!Arc::ptr_eq(&original, &tagged));
        assert!(tagged.field("id").unwrap().custom_data().contains(IDENTIFIER_FIELD));
        assert!(tagged.field("version").unwrap().custom_data().contains(VERSION_FIELD));
        assert!(tagged.field("name").unwrap().custom_data().is_empty());

        let again = IdentifierDecorator.decorate(&requester(), &tagged);
        assert!(Arc::ptr_eq(&tagged, &again));
    }

    #[test]
    fn test_persistent_type_waits_for_identifier() {
        let original = entity();
        let untouched = PersistentTypeDecorator.decorate(&requester(), &original);
        assert!(Arc::ptr_eq(&original, &untouched));

        let scanner = MemberDetailsScanner::new();
        scanner.add_decorator(Arc::new(PersistentTypeDecorator));
        scanner.add_decorator(Arc::new(IdentifierDecorator));
        let decorated = scanner.decorate(&requester(), original);
        assert!(decorated.is_type_tagged(PERSISTENT_TYPE));
    }
}
