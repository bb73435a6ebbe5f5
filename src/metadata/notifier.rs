//! Change detection for provider results.
//!
//! A provider recomputing its item on every upstream tick would otherwise
//! trigger a full downstream cascade each time, even when nothing observable
//! changed. [`HashTrackingNotifier`] remembers the last content hash per
//! instance and only primes the cache and notifies downstream when it differs.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use super::{MetadataId, MetadataService, SharedItem};
use crate::core::{MetadataError, Result};

/// Per-provider record of the last content hash seen for each instance.
///
/// All items passed to one notifier must belong to the class it was created for.
#[derive(Debug)]
pub struct HashTrackingNotifier {
    class_id: MetadataId,
    hashes: Mutex<HashMap<MetadataId, u64>>,
}

impl HashTrackingNotifier {
    pub fn new(class_id: MetadataId) -> Self {
        Self {
            class_id,
            hashes: Mutex::new(HashMap::new()),
        }
    }

    pub fn class_id(&self) -> &MetadataId {
        &self.class_id
    }

    /// Notify downstream of `item` if its content hash changed since last time.
    ///
    /// Returns whether a notification was sent.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::ClassMismatch`] if the item belongs to another
    /// class, or any error raised while notifying downstream.
    pub fn notify_if_required(&self, service: &MetadataService, item: &SharedItem) -> Result<bool> {
        let id = item.id();
        if id.class_id() != self.class_id {
            return Err(MetadataError::ClassMismatch {
                id: id.to_string(),
                expected: self.class_id.to_string(),
            });
        }

        let hash = item.content_hash();
        let previous = self.hashes.lock().insert(id.clone(), hash);
        if previous == Some(hash) {
            tracing::trace!("{id} unchanged, downstream notification suppressed");
            return Ok(false);
        }

        service.put(Arc::clone(item))?;
        service.notify_downstream(id)?;
        Ok(true)
    }

    /// Forget the hash of one instance so its next item always notifies.
    ///
    /// Returns whether a hash was remembered.
    pub fn forget(&self, id: &MetadataId) -> bool {
        self.hashes.lock().remove(id).is_some()
    }

    pub fn clear(&self) {
        self.hashes.lock().clear();
    }

    /// Number of instances with a remembered hash.
    pub fn tracked(&self) -> usize {
        self.hashes.lock().len()
    }
}
