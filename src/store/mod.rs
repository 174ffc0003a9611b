//! Collaborator boundaries: the byte store, reference store and config
//! source a repository is assembled from.
//!
//! The object model never touches disks, packs or wires itself. It talks to
//! three narrow traits, each of which a backend (loose-object directory,
//! pack reader, database, test fixture) can implement independently:
//!
//! - [`ObjectStore`]: identity → raw bytes plus type/size metadata.
//! - [`RefStore`]: reference name → identity.
//! - [`ConfigSource`]: (scope, section, key) → value.
//!
//! All three are object-safe and `Send + Sync` so a single repository handle
//! can serve concurrent read-only resolution. Thread-safety of concurrent
//! reads is the backend's responsibility; this layer adds no locking.

pub mod memory;

use std::io::Read;

use crate::errors::OdbError;
use crate::hash::ObjectId;
use crate::internal::object::types::ObjectType;

pub use memory::{MemoryConfig, MemoryRefStore, MemoryStore};

/// The scope a config read is performed under. A missing key is a
/// caller-visible absence; scopes are never merged or defaulted here.
#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy)]
pub enum ConfigScope {
    /// Repository-local configuration.
    Repository,
    /// Per-user configuration.
    Global,
    /// Machine-wide configuration.
    System,
}

impl ConfigScope {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConfigScope::Repository => "repository",
            ConfigScope::Global => "global",
            ConfigScope::System => "system",
        }
    }
}

/// Raw object bytes plus the metadata the store keeps alongside them.
///
/// The stream is fresh and positioned at the start; it is single-pass
/// forward, and the store may produce it lazily (e.g. decompressing on
/// read) rather than materializing the payload first.
pub struct RawObject {
    pub kind: ObjectType,
    pub size: u64,
    pub stream: Box<dyn Read + Send>,
}

/// The byte store: a key-value mapping from identity to raw object bytes.
///
/// Implementations must support concurrent `get_raw` calls if the owning
/// repository is shared across threads.
pub trait ObjectStore: Send + Sync {
    /// Fetch the raw payload and metadata for `id`, or
    /// [`OdbError::ObjectNotFound`].
    fn get_raw(&self, id: &ObjectId) -> Result<RawObject, OdbError>;

    /// Whether `id` is present, without opening a stream.
    fn contains(&self, id: &ObjectId) -> bool {
        self.get_raw(id).is_ok()
    }
}

/// The reference store: named pointers (branches, tags, HEAD) resolving to
/// identities. A reference itself is not an object.
pub trait RefStore: Send + Sync {
    /// Resolve `name`, following any symbolic indirection, to an identity, or
    /// [`OdbError::ReferenceNotFound`].
    fn lookup_ref(&self, name: &str) -> Result<ObjectId, OdbError>;
}

/// The config store: scoped `(section, key)` lookups returning the raw
/// string value. Typed interpretation happens in the repository layer.
pub trait ConfigSource: Send + Sync {
    /// Read a value, or [`OdbError::ConfigKeyNotFound`] on absence.
    fn read(&self, scope: ConfigScope, section: &str, key: &str) -> Result<String, OdbError>;
}
