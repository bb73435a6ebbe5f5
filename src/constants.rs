//! Global constants used throughout the metadata engine.
//!
//! Identifier prefixes, default capacities and the well-known custom data
//! keys shared between decorators and ITD generators live here so the
//! string literals are defined exactly once.

/// Prefix carried by every metadata identification string.
pub const MID_PREFIX: &str = "MID:";

/// Separator between the class and instance halves of an instance identifier.
pub const INSTANCE_DELIMITER: char = '#';

/// Default maximum number of metadata items retained by the service cache.
///
/// Large projects produce several ITDs per governor type, so the default is
/// sized for a few thousand types before least-recently-used eviction begins.
pub const DEFAULT_CACHE_CAPACITY: usize = 10_000;

/// Highest supported [`crate::metadata::MetadataLogger`] trace level.
pub const MAX_TRACE_LEVEL: u8 = 2;

/// Tracing target of metadata event traces.
pub const TRACE_TARGET: &str = "roo_metadata::trace";

/// Default configuration file name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "roo-metadata.toml";

/// Metadata class of the physical (on-disk) Java type provider.
pub const PHYSICAL_TYPE_CLASS: &str = "org.springframework.roo.classpath.PhysicalTypeIdentifier";

/// Custom data key placed on fields that hold the persistence identifier.
pub const IDENTIFIER_FIELD: &str = "IDENTIFIER_FIELD";

/// Custom data key placed on fields that hold the optimistic-locking version.
pub const VERSION_FIELD: &str = "VERSION_FIELD";

/// Custom data key placed on types that carry a persistence identifier.
pub const PERSISTENT_TYPE: &str = "PERSISTENT_TYPE";

/// Custom data key listing the fields a generated method relies on.
pub const FIELDS: &str = "FIELDS";
