//! The metadata engine: identifiers, providers, dependency tracking and caching.
//!
//! # Architecture
//!
//! - [`identification`] - the `MID:<class>[#<instance>]` codec and [`MetadataId`]
//! - [`registry`] - upstream → downstream dependency graph with cycle rejection
//! - [`cache`] - bounded LRU cache of computed items with counters
//! - [`service`] - [`MetadataService`], the orchestrator routing `get`/`notify`/`evict`
//! - [`notifier`] - [`HashTrackingNotifier`], suppresses notifications for unchanged items
//! - [`logger`] - [`MetadataLogger`], event tracing and per-provider timings
//! - [`triggers`] - [`TriggerTable`], which annotations activate which providers
//!
//! # Capabilities
//!
//! A provider implements [`MetadataProvider`] and may additionally expose any
//! of three capabilities through the `as_*` accessors:
//!
//! - [`MetadataNotificationListener`] - the provider owns its eviction policy
//! - [`MetadataCacheHolder`] - the provider keeps a private cache to clear on `evict_all`
//! - [`ItdMetadataProvider`] - the provider contributes members to governor types

pub mod cache;
pub mod identification;
pub mod logger;
pub mod notifier;
pub mod registry;
pub mod service;
pub mod triggers;

pub use cache::{CacheStatistics, MetadataCache};
pub use identification::MetadataId;
pub use logger::{MetadataLogger, TimingStatistic};
pub use notifier::HashTrackingNotifier;
pub use registry::DependencyRegistry;
pub use service::{MetadataDescription, MetadataService, ServiceStatistics};
pub use triggers::TriggerTable;

use std::any::Any;
use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;

use crate::core::Result;
use crate::model::MemberHoldingTypeDetails;

/// A computed, immutable piece of metadata.
///
/// `content_hash` must cover every externally observable field: the
/// [`HashTrackingNotifier`] suppresses downstream notifications whenever two
/// successive items report the same hash. [`content_hash_of`] derives it from
/// a [`Hash`] implementation, which makes the contract structural instead of
/// conventional.
pub trait MetadataItem: Any + Send + Sync + fmt::Debug {
    /// The instance identifier this item was computed for.
    fn id(&self) -> &MetadataId;

    /// Whether the item could be computed meaningfully.
    fn is_valid(&self) -> bool;

    /// Hash over every externally observable field.
    fn content_hash(&self) -> u64;

    fn as_any(&self) -> &dyn Any;

    /// Members this item contributes to its governor, for ITD metadata.
    fn itd_type_details(&self) -> Option<&Arc<MemberHoldingTypeDetails>> {
        None
    }
}

/// Shared handle to a computed item.
pub type SharedItem = Arc<dyn MetadataItem>;

/// Hash a value's full contents for [`MetadataItem::content_hash`].
pub fn content_hash_of<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Downcast a shared item to its concrete type.
pub fn downcast_item<T: MetadataItem>(item: &SharedItem) -> Option<&T> {
    item.as_any().downcast_ref::<T>()
}

/// Authority for one metadata class.
///
/// Providers are registered with [`MetadataService::register_provider`] and
/// invoked only through the service, which passes itself in so the provider
/// can fetch other metadata and record dependencies while computing.
pub trait MetadataProvider: Send + Sync {
    /// The class identifier this provider is responsible for.
    ///
    /// Must be stable for the provider's lifetime.
    fn provides_type(&self) -> MetadataId;

    /// Compute the item for an instance identifier of [`Self::provides_type`].
    ///
    /// `Ok(None)` means the item cannot be computed right now (for example the
    /// governor type does not exist yet).
    fn get(&self, service: &MetadataService, id: &MetadataId) -> Result<Option<SharedItem>>;

    /// Called once after registration, outside any retrieval.
    fn on_register(&self, _service: &MetadataService) -> Result<()> {
        Ok(())
    }

    fn as_notification_listener(&self) -> Option<&dyn MetadataNotificationListener> {
        None
    }

    fn as_cache_holder(&self) -> Option<&dyn MetadataCacheHolder> {
        None
    }

    fn as_itd_provider(&self) -> Option<&dyn ItdMetadataProvider> {
        None
    }
}

/// Receives change notifications.
///
/// Providers receive `Some(downstream)`; general-purpose listeners registered
/// with [`MetadataService::add_notification_listener`] receive `None`.
pub trait MetadataNotificationListener: Send + Sync {
    fn notify(
        &self,
        service: &MetadataService,
        upstream: &MetadataId,
        downstream: Option<&MetadataId>,
    ) -> Result<()>;
}

/// A provider-private cache that must be cleared along with the service cache.
pub trait MetadataCacheHolder: Send + Sync {
    fn evict(&self, id: &MetadataId);

    fn evict_all(&self);
}

/// A provider whose items contribute members to governor types.
pub trait ItdMetadataProvider: Send + Sync {
    /// The identifier of this provider's metadata for a physical type.
    ///
    /// Returns `None` when `physical_type_id` is not a physical type instance.
    fn id_for_physical_type(&self, physical_type_id: &MetadataId) -> Option<MetadataId>;
}
