//! Test utilities for the metadata engine
//!
//! Shared by unit tests and the integration suite (through the `test-utils`
//! feature):
//!
//! - [`init_test_logging`] - one-time tracing setup honouring `RUST_LOG`
//! - [`CountingProvider`] - provider double that counts invocations
//! - [`RecordingListener`] - listener double that records notifications
//! - [`SimpleItem`] - minimal metadata item with string content
//!
//! # Example
//!
//! ```rust,no_run
//! use roo_metadata::metadata::{MetadataId, MetadataService};
//! use roo_metadata::test_utils::CountingProvider;
//!
//! let service = MetadataService::new();
//! let provider = CountingProvider::new("test.Counting");
//! service.register_provider(provider.clone()).unwrap();
//! service.get(&MetadataId::parse("MID:test.Counting#Foo").unwrap()).unwrap();
//! assert_eq!(provider.invocations(), 1);
//! ```

use parking_lot::Mutex;
use std::any::Any;
use std::sync::Arc;
use std::sync::Once;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::core::Result;
use crate::metadata::{
    MetadataId, MetadataItem, MetadataNotificationListener, MetadataProvider, MetadataService,
    SharedItem, content_hash_of,
};
use crate::model::MemberHoldingTypeDetails;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, otherwise `RUST_LOG`; without either, tests run
/// without a subscriber.
///
/// ```bash
/// RUST_LOG=roo_metadata=trace cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

/// Item carrying an identifier and a content string, optionally contributing
/// members to its governor like ITD metadata does.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SimpleItem {
    id: MetadataId,
    content: String,
    valid: bool,
    members: Option<Arc<MemberHoldingTypeDetails>>,
}

impl SimpleItem {
    pub fn new(id: MetadataId, content: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
            valid: true,
            members: None,
        }
    }

    pub fn invalid(id: MetadataId) -> Self {
        Self {
            id,
            content: String::new(),
            valid: false,
            members: None,
        }
    }

    pub fn with_members(mut self, members: MemberHoldingTypeDetails) -> Self {
        self.members = Some(Arc::new(members));
        self
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

impl MetadataItem for SimpleItem {
    fn id(&self) -> &MetadataId {
        &self.id
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn content_hash(&self) -> u64 {
        content_hash_of(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn itd_type_details(&self) -> Option<&Arc<MemberHoldingTypeDetails>> {
        self.members.as_ref()
    }
}

/// Provider producing [`SimpleItem`]s with content `v<version>`.
///
/// Counts invocations, can be made to return nothing, and can be made to
/// request its own identifier while computing it.
pub struct CountingProvider {
    class_id: MetadataId,
    invocations: AtomicUsize,
    version: AtomicU64,
    available: AtomicBool,
    reentrant: AtomicBool,
    nested_results: Mutex<Vec<bool>>,
}

impl CountingProvider {
    /// # Panics
    ///
    /// Panics if `class` cannot form a class identifier.
    pub fn new(class: &str) -> Arc<Self> {
        Arc::new(Self {
            class_id: MetadataId::class(class).expect("valid class name"),
            invocations: AtomicUsize::new(0),
            version: AtomicU64::new(1),
            available: AtomicBool::new(true),
            reentrant: AtomicBool::new(false),
            nested_results: Mutex::new(Vec::new()),
        })
    }

    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    /// Change the content of subsequently computed items.
    pub fn set_version(&self, version: u64) {
        self.version.store(version, Ordering::SeqCst);
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Request the identifier being computed from inside `get`.
    pub fn set_reentrant(&self, reentrant: bool) {
        self.reentrant.store(reentrant, Ordering::SeqCst);
    }

    /// For each re-entrant request made, whether it returned nothing.
    pub fn nested_results(&self) -> Vec<bool> {
        self.nested_results.lock().clone()
    }
}

impl MetadataProvider for CountingProvider {
    fn provides_type(&self) -> MetadataId {
        self.class_id.clone()
    }

    fn get(&self, service: &MetadataService, id: &MetadataId) -> Result<Option<SharedItem>> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        if self.reentrant.load(Ordering::SeqCst) {
            let nested = service.get(id)?;
            self.nested_results.lock().push(nested.is_none());
        }
        if !self.available.load(Ordering::SeqCst) {
            return Ok(None);
        }
        let version = self.version.load(Ordering::SeqCst);
        Ok(Some(Arc::new(SimpleItem::new(id.clone(), format!("v{version}")))))
    }
}

/// Listener recording the upstream of every notification it receives.
#[derive(Default)]
pub struct RecordingListener {
    notifications: Mutex<Vec<MetadataId>>,
}

impl RecordingListener {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn notifications(&self) -> Vec<MetadataId> {
        self.notifications.lock().clone()
    }

    pub fn clear(&self) {
        self.notifications.lock().clear();
    }
}

impl MetadataNotificationListener for RecordingListener {
    fn notify(
        &self,
        _service: &MetadataService,
        upstream: &MetadataId,
        _downstream: Option<&MetadataId>,
    ) -> Result<()> {
        self.notifications.lock().push(upstream.clone());
        Ok(())
    }
}
