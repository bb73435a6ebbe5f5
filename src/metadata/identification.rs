//! Metadata identification strings.
//!
//! Every piece of metadata is addressed by an opaque string with one of two
//! shapes:
//!
//! - **class identifier** `MID:<class>` names a kind of metadata, and therefore
//!   the provider responsible for it
//! - **instance identifier** `MID:<class>#<instance-key>` names one computed item
//!   about one governor type
//!
//! The free functions in this module are pure and total: malformed input yields
//! `false` or `None`, never a panic. [`MetadataId`] wraps a string that has
//! already passed validation so the rest of the engine never re-parses.
//!
//! # Examples
//!
//! ```
//! use roo_metadata::metadata::identification;
//!
//! let id = identification::create_instance_id("com.example.EqualsMetadata", "com.example.Foo").unwrap();
//! assert_eq!(id, "MID:com.example.EqualsMetadata#com.example.Foo");
//! assert!(identification::is_identifying_instance(&id));
//! assert_eq!(identification::metadata_class(&id), Some("com.example.EqualsMetadata"));
//! assert_eq!(identification::metadata_instance(&id), Some("com.example.Foo"));
//!
//! assert!(identification::create_class_id("bad#class").is_none());
//! ```

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::constants::{INSTANCE_DELIMITER, MID_PREFIX};
use crate::core::MetadataError;

/// Split a string into its class and optional instance halves.
///
/// Returns `None` unless the string is a well-formed identifier of either shape.
fn split(id: &str) -> Option<(&str, Option<&str>)> {
    let body = id.strip_prefix(MID_PREFIX)?;
    match body.split_once(INSTANCE_DELIMITER) {
        None if !body.is_empty() => Some((body, None)),
        None => None,
        Some((class, key)) => {
            if class.is_empty() || key.is_empty() || key.contains(INSTANCE_DELIMITER) {
                None
            } else {
                Some((class, Some(key)))
            }
        }
    }
}

/// Whether `id` is a well-formed class or instance identifier.
pub fn is_valid(id: &str) -> bool {
    split(id).is_some()
}

/// Whether `id` is a well-formed class identifier (`MID:<class>`).
pub fn is_identifying_class(id: &str) -> bool {
    matches!(split(id), Some((_, None)))
}

/// Whether `id` is a well-formed instance identifier (`MID:<class>#<key>`).
pub fn is_identifying_instance(id: &str) -> bool {
    matches!(split(id), Some((_, Some(_))))
}

/// The bare metadata class named by `id`, without the `MID:` prefix.
pub fn metadata_class(id: &str) -> Option<&str> {
    split(id).map(|(class, _)| class)
}

/// The instance key of an instance identifier.
pub fn metadata_instance(id: &str) -> Option<&str> {
    split(id).and_then(|(_, key)| key)
}

/// Build a class identifier from a bare class name.
///
/// Returns `None` when the class is empty or contains the instance delimiter.
pub fn create_class_id(class: &str) -> Option<String> {
    if class.is_empty() || class.contains(INSTANCE_DELIMITER) {
        return None;
    }
    Some(format!("{MID_PREFIX}{class}"))
}

/// Build an instance identifier from a bare class name and an instance key.
///
/// Returns `None` when either half is empty or contains the instance delimiter.
pub fn create_instance_id(class: &str, instance_key: &str) -> Option<String> {
    if instance_key.is_empty() || instance_key.contains(INSTANCE_DELIMITER) {
        return None;
    }
    create_class_id(class).map(|class_id| format!("{class_id}{INSTANCE_DELIMITER}{instance_key}"))
}

/// The class identifier of any valid identifier (identity for class identifiers).
pub fn class_id_of(id: &str) -> Option<String> {
    metadata_class(id).and_then(create_class_id)
}

/// A validated metadata identification string.
///
/// Cloning is cheap; the string is shared.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MetadataId(Arc<str>);

impl MetadataId {
    /// Parse and validate an identification string of either shape.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::InvalidIdentifier`] for malformed input.
    pub fn parse(id: impl AsRef<str>) -> Result<Self, MetadataError> {
        let id = id.as_ref();
        if is_valid(id) {
            Ok(Self(Arc::from(id)))
        } else {
            Err(MetadataError::invalid_id(id, "a class or instance"))
        }
    }

    /// Class identifier `MID:<class>`.
    pub fn class(class: &str) -> Option<Self> {
        create_class_id(class).map(|id| Self(Arc::from(id)))
    }

    /// Instance identifier `MID:<class>#<key>`.
    pub fn instance(class: &str, instance_key: &str) -> Option<Self> {
        create_instance_id(class, instance_key).map(|id| Self(Arc::from(id)))
    }

    /// Class identifier for a class name known to be valid at compile time.
    pub(crate) fn from_static_class(class: &'static str) -> Self {
        debug_assert!(create_class_id(class).is_some(), "invalid class name {class}");
        Self(Arc::from(format!("{MID_PREFIX}{class}")))
    }

    /// The full identification string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_class(&self) -> bool {
        is_identifying_class(&self.0)
    }

    pub fn is_instance(&self) -> bool {
        is_identifying_instance(&self.0)
    }

    /// The bare metadata class name.
    pub fn metadata_class(&self) -> &str {
        metadata_class(&self.0).unwrap_or_default()
    }

    /// The instance key, for instance identifiers.
    pub fn instance_key(&self) -> Option<&str> {
        metadata_instance(&self.0)
    }

    /// The class identifier this identifier belongs to.
    pub fn class_id(&self) -> MetadataId {
        if self.is_class() {
            return self.clone();
        }
        // Both halves were validated on construction, so the prefix is a valid class id.
        let end = MID_PREFIX.len() + self.metadata_class().len();
        Self(Arc::from(&self.0[..end]))
    }

    /// An instance identifier of the same class with a different key.
    pub fn with_instance(&self, instance_key: &str) -> Option<MetadataId> {
        Self::instance(self.metadata_class(), instance_key)
    }

    /// Require a class identifier.
    pub fn expect_class(&self) -> Result<&Self, MetadataError> {
        if self.is_class() {
            Ok(self)
        } else {
            Err(MetadataError::invalid_id(self.as_str(), "a class"))
        }
    }

    /// Require an instance identifier.
    pub fn expect_instance(&self) -> Result<&Self, MetadataError> {
        if self.is_instance() {
            Ok(self)
        } else {
            Err(MetadataError::invalid_id(self.as_str(), "an instance"))
        }
    }
}

impl fmt::Display for MetadataId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for MetadataId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MetadataId({})", self.0)
    }
}

impl AsRef<str> for MetadataId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for MetadataId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl FromStr for MetadataId {
    type Err = MetadataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MetadataId {
    type Error = MetadataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<MetadataId> for String {
    fn from(id: MetadataId) -> Self {
        id.0.to_string()
    }
}
