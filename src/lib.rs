//! git-object-db: a content-addressable Git object model with lazy, typed,
//! stream-based access.
//!
//! Goals
//! - Model the four object kinds (blob, tree, commit, tag) as typed
//!   handles whose identity is fixed at construction and whose attributes
//!   (size, payload, parsed fields) resolve lazily from a pluggable byte
//!   store and are cached per handle.
//! - Resolve symbolic references (HEAD, branches, tags) into commits,
//!   following annotated-tag indirection exactly once.
//! - Expose scoped config reads where a missing key is a visible condition,
//!   never a silent default.
//!
//! Boundaries
//! - Physical storage (loose objects, packs), the wire protocol and
//!   working-tree/index mutation live behind the [`store`] traits and are
//!   not implemented here; [`store::memory`] provides in-memory backends
//!   for tests and ephemeral repositories.
//!
//! Modules
//! - [`hash`]: binary/hex object identities.
//! - [`internal::object`]: parsed records and the canonical payload codecs.
//! - [`objects`]: lazy handles, tree walks and ancestor traversal.
//! - [`store`]: collaborator traits plus the in-memory implementations.
//! - [`repo`]: the repository surface (references, config, collaborator
//!   handles).
//! - [`errors`]: the unified error enumeration.
//!
//! Typical Usage
//! - Assemble a [`repo::Repository`] from store handles, call
//!   [`repo::Repository::resolve_reference`] to obtain a commit, then walk
//!   [`objects::Commit::tree`] and stream blob contents through
//!   [`objects::ObjectAccess::data_stream`].

pub mod errors;
pub mod hash;
pub mod internal;
pub mod objects;
pub mod repo;
pub mod store;
pub mod utils;

pub use errors::OdbError;
pub use hash::ObjectId;
pub use internal::object::tree::{EntryMode, TreeItem};
pub use internal::object::types::ObjectType;
pub use objects::{
    AncestorIter, Blob, Commit, Object, ObjectAccess, TagObject, TraversalOrder, Tree, TreeWalk,
};
pub use repo::{ConfigReader, Repository};
pub use store::{ConfigScope, ConfigSource, ObjectStore, RawObject, RefStore};
