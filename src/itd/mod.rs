//! Inter-type declaration (ITD) metadata.
//!
//! - [`physical`] - governor declarations, the upstream of every ITD
//! - [`provider`] - [`ItdProvider`], which turns an [`ItdGenerator`] into a
//!   full metadata provider with dependency tracking and change detection

pub mod physical;
pub mod provider;

pub use physical::{
    FieldDeclaration, MethodDeclaration, PhysicalTypeMetadata, PhysicalTypeProvider,
    TypeDeclaration, governor_details, is_physical_type_id, physical_type_class_id,
    physical_type_id,
};
pub use provider::{ItdContext, ItdGenerator, ItdMetadata, ItdProvider};

use crate::core::Result;
use crate::metadata::{HashTrackingNotifier, MetadataId, MetadataService};

/// Recompute `id` and notify downstream only if the result changed.
///
/// When the item can no longer be computed, downstream is notified once and
/// the remembered hash is dropped.
pub(crate) fn refresh(
    service: &MetadataService,
    notifier: &HashTrackingNotifier,
    id: &MetadataId,
) -> Result<()> {
    match service.evict_and_get(id)? {
        Some(item) => {
            notifier.notify_if_required(service, &item)?;
        }
        None => {
            if notifier.forget(id) {
                service.notify_downstream(id)?;
            }
        }
    }
    Ok(())
}
