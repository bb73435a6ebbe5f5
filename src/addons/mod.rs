//! Sample add-ons built on the metadata engine.
//!
//! Generators (each wrapped in an [`ItdProvider`]):
//!
//! - [`EqualsGenerator`] - `equals(Object)` and `hashCode()` for `@RooEquals` types
//! - [`ToStringGenerator`] - `toString()` for `@RooToString` types
//! - [`JavaBeanGenerator`] - accessors and mutators for `@RooJavaBean` types
//!
//! Decorators (registered with the [`MemberDetailsScanner`]):
//!
//! - [`IdentifierDecorator`] - tags JPA `@Id` and `@Version` fields
//! - [`PersistentTypeDecorator`] - tags types that declare an identifier field

mod decorators;
mod equals;
mod javabean;
mod tostring;

pub use decorators::{IdentifierDecorator, PersistentTypeDecorator};
pub use equals::EqualsGenerator;
pub use javabean::JavaBeanGenerator;
pub use tostring::ToStringGenerator;

use std::sync::Arc;

use crate::core::Result;
use crate::itd::ItdProvider;
use crate::metadata::MetadataService;
use crate::scanner::MemberDetailsScanner;

pub const ROO_EQUALS: &str = "org.springframework.roo.addon.equals.RooEquals";
pub const ROO_TO_STRING: &str = "org.springframework.roo.addon.tostring.RooToString";
pub const ROO_JAVA_BEAN: &str = "org.springframework.roo.addon.javabean.RooJavaBean";
pub const JPA_ID: &str = "javax.persistence.Id";
pub const JPA_VERSION: &str = "javax.persistence.Version";

/// Register every bundled decorator and ITD provider.
///
/// # Errors
///
/// Fails if any of the providers is already registered.
pub fn install(service: &MetadataService, scanner: &Arc<MemberDetailsScanner>) -> Result<()> {
    scanner.add_decorator(Arc::new(IdentifierDecorator));
    scanner.add_decorator(Arc::new(PersistentTypeDecorator));

    service.register_provider(Arc::new(ItdProvider::new(JavaBeanGenerator, Arc::clone(scanner))?))?;
    service.register_provider(Arc::new(ItdProvider::new(ToStringGenerator, Arc::clone(scanner))?))?;
    service.register_provider(Arc::new(ItdProvider::new(EqualsGenerator, Arc::clone(scanner))?))?;
    Ok(())
}

/// Upper-case the first character of a field name.
pub(crate) fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lower-case the first character of an accessor suffix.
pub(crate) fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize_roundtrip() {
        assert_eq!(capitalize("name"), "Name");
        assert_eq!(decapitalize("Name"), "name");
        assert_eq!(capitalize(""), "");
    }
}
