//! Java type model consumed and produced by metadata providers.
//!
//! - [`JavaType`] - fully qualified type names
//! - [`CustomData`] - semantic tags attached by decorators
//! - [`FieldMetadata`] / [`MethodMetadata`] - immutable members
//! - [`MemberHoldingTypeDetails`] - members contributed by one declaration
//! - [`ClassOrInterfaceTypeDetails`] - a governor's declaration plus superclass chain
//! - [`MemberDetails`] - the aggregated member surface of a type
//!
//! Every value here is immutable once built. Construction goes through a
//! builder (`FieldMetadata::builder`, [`TypeDetailsBuilder`],
//! [`MemberDetailsBuilder`]) that owns the mutable state until `build()`.

mod custom_data;
mod java_type;
mod member;
mod member_details;
mod type_details;

pub use custom_data::CustomData;
pub use java_type::JavaType;
pub use member::{FieldMetadata, FieldMetadataBuilder, MethodMetadata, MethodMetadataBuilder};
pub use member_details::{MemberDetails, MemberDetailsBuilder};
pub use type_details::{
    ClassOrInterfaceTypeDetails, MemberHoldingTypeDetails, TypeDetailsBuilder, TypeKind,
};
