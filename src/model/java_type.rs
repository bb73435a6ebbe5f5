//! Fully qualified Java type names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A fully qualified Java type name such as `com.example.Person` or `int`.
///
/// Only the name is modelled; generics and arrays are carried verbatim in the
/// string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JavaType(String);

impl JavaType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn object() -> Self {
        Self::new("java.lang.Object")
    }

    pub fn string() -> Self {
        Self::new("java.lang.String")
    }

    pub fn boolean_primitive() -> Self {
        Self::new("boolean")
    }

    pub fn int_primitive() -> Self {
        Self::new("int")
    }

    pub fn void_primitive() -> Self {
        Self::new("void")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name without its package, e.g. `Person` for `com.example.Person`.
    pub fn simple_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }

    /// The package portion, or `None` for the default package and primitives.
    pub fn package(&self) -> Option<&str> {
        self.0.rsplit_once('.').map(|(package, _)| package)
    }

    pub fn is_primitive(&self) -> bool {
        matches!(
            self.0.as_str(),
            "boolean" | "byte" | "char" | "short" | "int" | "long" | "float" | "double" | "void"
        )
    }
}

impl fmt::Display for JavaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JavaType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}
