//! Field and method metadata.
//!
//! Members are immutable once built. Each member records the identifier of the
//! type details that declared it, which is how [`super::MemberDetails`] tells a
//! governor's own members from ITD-contributed ones.

use serde::{Deserialize, Serialize};

use super::{CustomData, JavaType};
use crate::metadata::MetadataId;

/// A field declared by a class, interface or ITD.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldMetadata {
    declared_by: MetadataId,
    name: String,
    field_type: JavaType,
    annotations: Vec<JavaType>,
    custom_data: CustomData,
}

impl FieldMetadata {
    pub fn builder(
        declared_by: MetadataId,
        name: impl Into<String>,
        field_type: JavaType,
    ) -> FieldMetadataBuilder {
        FieldMetadataBuilder {
            field: Self {
                declared_by,
                name: name.into(),
                field_type,
                annotations: Vec::new(),
                custom_data: CustomData::new(),
            },
        }
    }

    pub fn declared_by(&self) -> &MetadataId {
        &self.declared_by
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> &JavaType {
        &self.field_type
    }

    pub fn annotations(&self) -> &[JavaType] {
        &self.annotations
    }

    pub fn has_annotation(&self, annotation: &JavaType) -> bool {
        self.annotations.contains(annotation)
    }

    pub fn custom_data(&self) -> &CustomData {
        &self.custom_data
    }

    pub(crate) fn custom_data_mut(&mut self) -> &mut CustomData {
        &mut self.custom_data
    }

    pub(crate) fn with_declared_by(mut self, declared_by: MetadataId) -> Self {
        self.declared_by = declared_by;
        self
    }
}

/// Staging structure for [`FieldMetadata`].
#[derive(Debug, Clone)]
pub struct FieldMetadataBuilder {
    field: FieldMetadata,
}

impl FieldMetadataBuilder {
    #[must_use]
    pub fn annotation(mut self, annotation: JavaType) -> Self {
        self.field.annotations.push(annotation);
        self
    }

    #[must_use]
    pub fn custom_data(mut self, key: impl Into<String>, values: Vec<String>) -> Self {
        self.field.custom_data.put(key, values);
        self
    }

    pub fn build(self) -> FieldMetadata {
        self.field
    }
}

/// A method declared by a class, interface or ITD.
///
/// `body` holds the generated Java source for ITD-contributed methods.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodMetadata {
    declared_by: MetadataId,
    name: String,
    return_type: JavaType,
    parameter_types: Vec<JavaType>,
    parameter_names: Vec<String>,
    annotations: Vec<JavaType>,
    custom_data: CustomData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    body: Option<String>,
}

impl MethodMetadata {
    pub fn builder(
        declared_by: MetadataId,
        name: impl Into<String>,
        return_type: JavaType,
    ) -> MethodMetadataBuilder {
        MethodMetadataBuilder {
            method: Self {
                declared_by,
                name: name.into(),
                return_type,
                parameter_types: Vec::new(),
                parameter_names: Vec::new(),
                annotations: Vec::new(),
                custom_data: CustomData::new(),
                body: None,
            },
        }
    }

    pub fn declared_by(&self) -> &MetadataId {
        &self.declared_by
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn return_type(&self) -> &JavaType {
        &self.return_type
    }

    pub fn parameter_types(&self) -> &[JavaType] {
        &self.parameter_types
    }

    pub fn parameter_names(&self) -> &[String] {
        &self.parameter_names
    }

    pub fn annotations(&self) -> &[JavaType] {
        &self.annotations
    }

    pub fn custom_data(&self) -> &CustomData {
        &self.custom_data
    }

    pub(crate) fn custom_data_mut(&mut self) -> &mut CustomData {
        &mut self.custom_data
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Whether this method has the given name and exact parameter types.
    pub fn matches(&self, name: &str, parameter_types: &[JavaType]) -> bool {
        self.name == name && self.parameter_types == parameter_types
    }

    /// Java-style signature, e.g. `equals(java.lang.Object)`.
    pub fn signature(&self) -> String {
        let params: Vec<&str> = self.parameter_types.iter().map(JavaType::as_str).collect();
        format!("{}({})", self.name, params.join(", "))
    }

    pub(crate) fn with_declared_by(mut self, declared_by: MetadataId) -> Self {
        self.declared_by = declared_by;
        self
    }
}

/// Staging structure for [`MethodMetadata`].
#[derive(Debug, Clone)]
pub struct MethodMetadataBuilder {
    method: MethodMetadata,
}

impl MethodMetadataBuilder {
    #[must_use]
    pub fn parameter(mut self, name: impl Into<String>, parameter_type: JavaType) -> Self {
        self.method.parameter_names.push(name.into());
        self.method.parameter_types.push(parameter_type);
        self
    }

    #[must_use]
    pub fn annotation(mut self, annotation: JavaType) -> Self {
        self.method.annotations.push(annotation);
        self
    }

    #[must_use]
    pub fn custom_data(mut self, key: impl Into<String>, values: Vec<String>) -> Self {
        self.method.custom_data.put(key, values);
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.method.body = Some(body.into());
        self
    }

    pub fn build(self) -> MethodMetadata {
        self.method
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declarer() -> MetadataId {
        MetadataId::parse("MID:test.Provider#com.example.Foo").unwrap()
    }

    #[test]
    fn test_method_signature_and_matching() {
        let method = MethodMetadata::builder(declarer(), "equals", JavaType::boolean_primitive())
            .parameter("obj", JavaType::object())
            .body("return this == obj;")
            .build();

        assert_eq!(method.signature(), "equals(java.lang.Object)");
        assert!(method.matches("equals", &[JavaType::object()]));
        assert!(!method.matches("equals", &[]));
        assert_eq!(method.parameter_names(), &["obj".to_string()]);
        assert_eq!(method.body(), Some("return this == obj;"));
    }

    #[test]
    fn test_field_builder() {
        let field = FieldMetadata::builder(declarer(), "id", JavaType::new("java.lang.Long"))
            .annotation(JavaType::new("javax.persistence.Id"))
            .custom_data("TAG", vec![])
            .build();

        assert_eq!(field.name(), "id");
        assert!(field.has_annotation(&JavaType::new("javax.persistence.Id")));
        assert!(field.custom_data().contains("TAG"));
        assert_eq!(field.declared_by(), &declarer());
    }
}
