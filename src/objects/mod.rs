//! Lazy, store-backed object handles.
//!
//! A handle names a stored object by identity and fetches everything else on
//! demand: the size on first access, the payload as a fresh stream per call,
//! and the variant-specific fields (tree entries, commit metadata, tag
//! target) parsed once and cached. Handles hold only a weak reference to
//! their byte store, so an outstanding handle never keeps a repository's
//! storage alive.
//!
//! Equality and hashing are defined solely by identity: two handles naming
//! the same object compare equal even if one has populated its lazy fields
//! and the other has not. A well-formed store never assigns one identity to
//! two kinds, so the kind does not participate in equality; the assumption
//! is checked with a `debug_assert!` where both sides know their kind.

pub mod walk;

use std::fmt::Display;
use std::io::{self, Read, Write};
use std::sync::{Arc, OnceLock, Weak};

use crate::errors::OdbError;
use crate::hash::ObjectId;
use crate::internal::object::ObjectTrait;
use crate::internal::object::commit::Commit as CommitRecord;
use crate::internal::object::signature::Signature;
use crate::internal::object::tag::Tag as TagRecord;
use crate::internal::object::tree::{EntryMode, Tree as TreeRecord, TreeItem};
use crate::internal::object::types::ObjectType;
use crate::repo::Repository;
use crate::store::ObjectStore;

pub use walk::{AncestorIter, TraversalOrder, TreeWalk};

/// Where an object sits inside the tree it was reached through: the path
/// relative to the repository root, and the entry's file mode.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct IndexInfo {
    path: String,
    mode: EntryMode,
}

impl IndexInfo {
    /// Build location info for a handle. The path must be relative to the
    /// containing tree; an absolute path is a contract violation and fails
    /// fast with [`OdbError::InvalidPath`].
    pub fn new(path: &str, mode: EntryMode) -> Result<IndexInfo, OdbError> {
        if path.starts_with('/') || path.starts_with('\\') {
            return Err(OdbError::InvalidPath(path.to_string()));
        }
        Ok(IndexInfo {
            path: path.to_string(),
            mode,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn mode(&self) -> EntryMode {
        self.mode
    }
}

/// The store-facing half every handle shares: identity, kind, weak store
/// back-reference, the lazily cached size and the optional tree location.
#[derive(Clone)]
pub struct ObjectCore {
    id: ObjectId,
    kind: ObjectType,
    store: Weak<dyn ObjectStore>,
    size: OnceLock<u64>,
    index: Option<IndexInfo>,
}

impl ObjectCore {
    fn new(
        store: Weak<dyn ObjectStore>,
        id: ObjectId,
        kind: ObjectType,
        index: Option<IndexInfo>,
    ) -> ObjectCore {
        ObjectCore {
            id,
            kind,
            store,
            size: OnceLock::new(),
            index,
        }
    }

    fn store(&self) -> Result<Arc<dyn ObjectStore>, OdbError> {
        self.store.upgrade().ok_or(OdbError::StoreReleased)
    }

    fn size(&self) -> Result<u64, OdbError> {
        if let Some(size) = self.size.get() {
            return Ok(*size);
        }
        let raw = self.store()?.get_raw(&self.id)?;
        Ok(*self.size.get_or_init(|| raw.size))
    }

    fn data_stream(&self) -> Result<Box<dyn Read + Send>, OdbError> {
        let raw = self.store()?.get_raw(&self.id)?;
        if raw.kind != self.kind {
            return Err(OdbError::TypeMismatch {
                expected: self.kind.as_str(),
                actual: raw.kind.as_str(),
            });
        }
        // Opening a stream also tells us the size; prime the cache.
        let _ = self.size.set(raw.size);
        Ok(raw.stream)
    }

    fn read_all(&self) -> Result<Vec<u8>, OdbError> {
        let mut data = Vec::new();
        self.data_stream()?.read_to_end(&mut data)?;
        Ok(data)
    }

    fn eq_by_id(&self, other: &ObjectCore) -> bool {
        // Identity spaces do not collide across kinds in a well-formed
        // store; equal ids with different kinds indicate a corrupt store.
        debug_assert!(
            self.id != other.id || self.kind == other.kind,
            "identity {} is claimed by both {} and {}",
            self.id,
            self.kind,
            other.kind
        );
        self.id == other.id
    }

    fn debug_fmt(&self, f: &mut std::fmt::Formatter, variant: &str) -> std::fmt::Result {
        write!(f, "{variant}({}", self.id)?;
        if let Some(index) = &self.index {
            write!(f, ", path={:?}", index.path)?;
        }
        write!(f, ")")
    }
}

/// Read access shared by all four handle variants.
pub trait ObjectAccess {
    #[doc(hidden)]
    fn core(&self) -> &ObjectCore;

    /// The object's identity.
    fn id(&self) -> ObjectId {
        self.core().id
    }

    /// The object's kind.
    fn kind(&self) -> ObjectType {
        self.core().kind
    }

    /// The raw payload length in bytes. Resolved from the store on first
    /// access and cached for the handle's lifetime.
    fn size(&self) -> Result<u64, OdbError> {
        self.core().size()
    }

    /// A fresh stream over the raw payload, positioned at the start. Each
    /// call opens an independent stream; streams are single-pass forward.
    fn data_stream(&self) -> Result<Box<dyn Read + Send>, OdbError> {
        self.core().data_stream()
    }

    /// Copy the whole payload into `sink`, returning the bytes written. The
    /// stream is acquired for the duration of the copy and released on all
    /// exit paths.
    fn copy_stream_to(&self, sink: &mut dyn Write) -> Result<u64, OdbError> {
        let mut stream = self.core().data_stream()?;
        Ok(io::copy(&mut stream, sink)?)
    }

    /// The path relative to the repository root, when the handle was
    /// reached through a tree entry.
    fn path(&self) -> Option<&str> {
        self.core().index.as_ref().map(IndexInfo::path)
    }

    /// The tree entry's file mode, when the handle was reached through one.
    fn mode(&self) -> Option<EntryMode> {
        self.core().index.as_ref().map(IndexInfo::mode)
    }
}

macro_rules! object_handle_impls {
    ($handle:ident, $variant:literal) => {
        impl ObjectAccess for $handle {
            fn core(&self) -> &ObjectCore {
                &self.core
            }
        }

        impl PartialEq for $handle {
            fn eq(&self, other: &Self) -> bool {
                self.core.eq_by_id(&other.core)
            }
        }

        impl Eq for $handle {}

        impl std::hash::Hash for $handle {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                self.core.id.hash(state);
            }
        }

        impl Display for $handle {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str(&self.core.id.to_hex())
            }
        }

        impl std::fmt::Debug for $handle {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                self.core.debug_fmt(f, $variant)
            }
        }
    };
}

/// A blob handle: opaque file bytes.
#[derive(Clone)]
pub struct Blob {
    core: ObjectCore,
}

object_handle_impls!(Blob, "Blob");

impl Blob {
    /// A handle for the blob `id` in `repo`'s store.
    pub fn new(repo: &Repository, id: ObjectId) -> Blob {
        Blob {
            core: ObjectCore::new(repo.store_weak(), id, ObjectType::Blob, None),
        }
    }

    /// A handle for a blob reached through a tree entry at `path`.
    pub fn with_location(
        repo: &Repository,
        id: ObjectId,
        path: &str,
        mode: EntryMode,
    ) -> Result<Blob, OdbError> {
        Ok(Blob {
            core: ObjectCore::new(
                repo.store_weak(),
                id,
                ObjectType::Blob,
                Some(IndexInfo::new(path, mode)?),
            ),
        })
    }

    /// Read the whole payload into memory.
    pub fn content(&self) -> Result<Vec<u8>, OdbError> {
        self.core.read_all()
    }
}

/// A tree handle: a lazily parsed, ordered directory listing.
#[derive(Clone)]
pub struct Tree {
    core: ObjectCore,
    record: OnceLock<TreeRecord>,
}

object_handle_impls!(Tree, "Tree");

impl Tree {
    /// A handle for the tree `id` in `repo`'s store.
    pub fn new(repo: &Repository, id: ObjectId) -> Tree {
        Tree {
            core: ObjectCore::new(repo.store_weak(), id, ObjectType::Tree, None),
            record: OnceLock::new(),
        }
    }

    /// A handle for a tree reached through a tree entry at `path`.
    pub fn with_location(
        repo: &Repository,
        id: ObjectId,
        path: &str,
        mode: EntryMode,
    ) -> Result<Tree, OdbError> {
        Ok(Tree {
            core: ObjectCore::new(
                repo.store_weak(),
                id,
                ObjectType::Tree,
                Some(IndexInfo::new(path, mode)?),
            ),
            record: OnceLock::new(),
        })
    }

    fn record(&self) -> Result<&TreeRecord, OdbError> {
        if let Some(record) = self.record.get() {
            return Ok(record);
        }
        let data = self.core.read_all()?;
        let parsed = TreeRecord::from_bytes(&data, self.core.id)?;
        Ok(self.record.get_or_init(|| parsed))
    }

    /// The entries of this tree, in canonical (byte-wise, directory-slash)
    /// order. Parsed on first access and cached.
    pub fn items(&self) -> Result<&[TreeItem], OdbError> {
        Ok(&self.record()?.items)
    }

    /// A fresh iterator over the entries. Restartable: each call produces a
    /// new, independently positioned sequence.
    pub fn entries(&self) -> Result<impl Iterator<Item = &TreeItem>, OdbError> {
        Ok(self.items()?.iter())
    }

    /// Resolve a direct entry into a typed handle. The child's path is this
    /// tree's path joined with the entry name (or just the entry name when
    /// this is the repository root). Submodule entries resolve to commit
    /// handles: leaf references whose object usually lives elsewhere.
    pub fn resolve(&self, item: &TreeItem) -> Result<Object, OdbError> {
        let path = match self.path() {
            Some(parent) => format!("{parent}/{}", item.name),
            None => item.name.clone(),
        };
        let index = IndexInfo::new(&path, item.mode)?;
        let core = ObjectCore::new(
            self.core.store.clone(),
            item.id,
            item.mode.object_type(),
            Some(index),
        );
        Ok(match item.mode.object_type() {
            ObjectType::Tree => Object::Tree(Tree {
                core,
                record: OnceLock::new(),
            }),
            ObjectType::Commit => Object::Commit(Commit {
                core,
                record: OnceLock::new(),
            }),
            _ => Object::Blob(Blob { core }),
        })
    }

    /// Look up a direct entry by name and resolve it.
    pub fn child(&self, name: &str) -> Result<Object, OdbError> {
        let item = self
            .record()?
            .item(name)
            .cloned()
            .ok_or_else(|| OdbError::ObjectNotFound(format!("{}:{name}", self.core.id)))?;
        self.resolve(&item)
    }

    /// A fresh depth-first walk over the whole subtree, yielding located
    /// handles. Submodule entries are yielded but never descended into.
    /// Restartable: each call starts a new traversal.
    pub fn walk(&self) -> TreeWalk {
        TreeWalk::new(self.clone())
    }
}

/// A commit handle: lazily parsed snapshot metadata plus history access.
#[derive(Clone)]
pub struct Commit {
    core: ObjectCore,
    record: OnceLock<CommitRecord>,
}

object_handle_impls!(Commit, "Commit");

impl Commit {
    /// A handle for the commit `id` in `repo`'s store.
    pub fn new(repo: &Repository, id: ObjectId) -> Commit {
        Commit {
            core: ObjectCore::new(repo.store_weak(), id, ObjectType::Commit, None),
            record: OnceLock::new(),
        }
    }

    fn from_core(core: ObjectCore) -> Commit {
        Commit {
            core,
            record: OnceLock::new(),
        }
    }

    fn record(&self) -> Result<&CommitRecord, OdbError> {
        if let Some(record) = self.record.get() {
            return Ok(record);
        }
        let data = self.core.read_all()?;
        let parsed = CommitRecord::from_bytes(&data, self.core.id)?;
        Ok(self.record.get_or_init(|| parsed))
    }

    /// The top-level tree this commit records.
    pub fn tree(&self) -> Result<Tree, OdbError> {
        let record = self.record()?;
        Ok(Tree {
            core: ObjectCore::new(
                self.core.store.clone(),
                record.tree_id,
                ObjectType::Tree,
                None,
            ),
            record: OnceLock::new(),
        })
    }

    /// Parent identities in declaration order.
    pub fn parent_ids(&self) -> Result<&[ObjectId], OdbError> {
        Ok(&self.record()?.parent_ids)
    }

    /// Parent commit handles in declaration order. Handles are built
    /// without touching the store; each parent's fields resolve lazily on
    /// its own first access.
    pub fn parents(&self) -> Result<Vec<Commit>, OdbError> {
        Ok(self
            .record()?
            .parent_ids
            .iter()
            .map(|id| {
                Commit::from_core(ObjectCore::new(
                    self.core.store.clone(),
                    *id,
                    ObjectType::Commit,
                    None,
                ))
            })
            .collect())
    }

    pub fn author(&self) -> Result<&Signature, OdbError> {
        Ok(&self.record()?.author)
    }

    pub fn committer(&self) -> Result<&Signature, OdbError> {
        Ok(&self.record()?.committer)
    }

    pub fn message(&self) -> Result<&str, OdbError> {
        Ok(&self.record()?.message)
    }

    /// The first meaningful line of the message.
    pub fn summary(&self) -> Result<String, OdbError> {
        Ok(self.record()?.summary())
    }

    /// Walk this commit's ancestry in the given order, starting with the
    /// commit itself. Each commit is yielded at most once, even if the
    /// parent graph is degenerate.
    pub fn traverse(&self, order: TraversalOrder) -> AncestorIter {
        AncestorIter::new(self.clone(), order)
    }
}

/// An annotated-tag handle.
#[derive(Clone)]
pub struct TagObject {
    core: ObjectCore,
    record: OnceLock<TagRecord>,
}

object_handle_impls!(TagObject, "TagObject");

impl TagObject {
    /// A handle for the tag `id` in `repo`'s store.
    pub fn new(repo: &Repository, id: ObjectId) -> TagObject {
        TagObject {
            core: ObjectCore::new(repo.store_weak(), id, ObjectType::Tag, None),
            record: OnceLock::new(),
        }
    }

    fn record(&self) -> Result<&TagRecord, OdbError> {
        if let Some(record) = self.record.get() {
            return Ok(record);
        }
        let data = self.core.read_all()?;
        let parsed = TagRecord::from_bytes(&data, self.core.id)?;
        Ok(self.record.get_or_init(|| parsed))
    }

    pub fn tag_name(&self) -> Result<&str, OdbError> {
        Ok(&self.record()?.tag_name)
    }

    pub fn tagger(&self) -> Result<&Signature, OdbError> {
        Ok(&self.record()?.tagger)
    }

    pub fn message(&self) -> Result<&str, OdbError> {
        Ok(&self.record()?.message)
    }

    /// A typed handle for the tagged object. The target kind is recorded in
    /// the tag payload, so no extra store access is needed here.
    pub fn target(&self) -> Result<Object, OdbError> {
        let record = self.record()?;
        Ok(Object::from_parts(
            self.core.store.clone(),
            record.target_id,
            record.target_type,
            None,
        ))
    }
}

/// Any of the four handle variants, for call sites that dispatch on kind.
#[derive(Clone)]
pub enum Object {
    Blob(Blob),
    Tree(Tree),
    Commit(Commit),
    Tag(TagObject),
}

impl Object {
    /// Build the handle variant matching `kind`. This is the dispatch from
    /// store metadata to a typed handle.
    pub(crate) fn from_parts(
        store: Weak<dyn ObjectStore>,
        id: ObjectId,
        kind: ObjectType,
        size: Option<u64>,
    ) -> Object {
        let core = ObjectCore::new(store, id, kind, None);
        if let Some(size) = size {
            let _ = core.size.set(size);
        }
        match kind {
            ObjectType::Blob => Object::Blob(Blob { core }),
            ObjectType::Tree => Object::Tree(Tree {
                core,
                record: OnceLock::new(),
            }),
            ObjectType::Commit => Object::Commit(Commit {
                core,
                record: OnceLock::new(),
            }),
            ObjectType::Tag => Object::Tag(TagObject {
                core,
                record: OnceLock::new(),
            }),
        }
    }

    pub fn as_blob(&self) -> Option<&Blob> {
        match self {
            Object::Blob(blob) => Some(blob),
            _ => None,
        }
    }

    pub fn as_tree(&self) -> Option<&Tree> {
        match self {
            Object::Tree(tree) => Some(tree),
            _ => None,
        }
    }

    pub fn as_commit(&self) -> Option<&Commit> {
        match self {
            Object::Commit(commit) => Some(commit),
            _ => None,
        }
    }

    pub fn as_tag(&self) -> Option<&TagObject> {
        match self {
            Object::Tag(tag) => Some(tag),
            _ => None,
        }
    }

    /// Convert into a commit handle, or report what it actually is.
    pub fn into_commit(self) -> Result<Commit, OdbError> {
        match self {
            Object::Commit(commit) => Ok(commit),
            other => Err(OdbError::TypeMismatch {
                expected: ObjectType::Commit.as_str(),
                actual: other.kind().as_str(),
            }),
        }
    }
}

impl ObjectAccess for Object {
    fn core(&self) -> &ObjectCore {
        match self {
            Object::Blob(blob) => &blob.core,
            Object::Tree(tree) => &tree.core,
            Object::Commit(commit) => &commit.core,
            Object::Tag(tag) => &tag.core,
        }
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.core().eq_by_id(other.core())
    }
}

impl Eq for Object {}

impl std::hash::Hash for Object {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.core().id.hash(state);
    }
}

impl Display for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(&self.core().id.to_hex())
    }
}

impl std::fmt::Debug for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let variant = match self {
            Object::Blob(_) => "Blob",
            Object::Tree(_) => "Tree",
            Object::Commit(_) => "Commit",
            Object::Tag(_) => "TagObject",
        };
        self.core().debug_fmt(f, variant)
    }
}
