//! The repository: the entry point that turns names into typed objects.
//!
//! A [`Repository`] is assembled from the three collaborator handles (byte
//! store, reference store and config source) plus an optional working-tree
//! root. It resolves symbolic references to commits, hands out typed object
//! handles, and exposes scoped config reads. It performs no staging, commit
//! creation or other mutation; a working-tree/index collaborator consumes
//! [`Repository::object_store`] and [`Repository::work_dir`] for that, and
//! objects already handed out are immutable snapshots unaffected by it.
//!
//! A repository handle may be shared read-only across threads; concurrent
//! resolution is safe whenever the underlying stores support concurrent
//! reads.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

use tracing::debug;

use crate::errors::OdbError;
use crate::hash::ObjectId;
use crate::objects::{Commit, Object, ObjectAccess};
use crate::store::{ConfigScope, ConfigSource, ObjectStore, RefStore};

/// A read surface over one repository.
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn ObjectStore>,
    refs: Arc<dyn RefStore>,
    config: Arc<dyn ConfigSource>,
    work_dir: Option<PathBuf>,
}

impl Repository {
    /// A bare repository: object database only, no working tree.
    pub fn bare(
        store: Arc<dyn ObjectStore>,
        refs: Arc<dyn RefStore>,
        config: Arc<dyn ConfigSource>,
    ) -> Repository {
        Repository {
            store,
            refs,
            config,
            work_dir: None,
        }
    }

    /// A repository with a working tree rooted at `work_dir`.
    pub fn with_work_dir(
        store: Arc<dyn ObjectStore>,
        refs: Arc<dyn RefStore>,
        config: Arc<dyn ConfigSource>,
        work_dir: PathBuf,
    ) -> Repository {
        Repository {
            store,
            refs,
            config,
            work_dir: Some(work_dir),
        }
    }

    pub fn is_bare(&self) -> bool {
        self.work_dir.is_none()
    }

    /// The working-tree root, for the working-tree/index collaborator.
    pub fn work_dir(&self) -> Option<&Path> {
        self.work_dir.as_deref()
    }

    /// The byte-store handle, for collaborators that need direct access.
    pub fn object_store(&self) -> Arc<dyn ObjectStore> {
        self.store.clone()
    }

    /// The weak store reference object handles carry. Handles must not keep
    /// the store alive beyond the repository's own lifetime.
    pub(crate) fn store_weak(&self) -> Weak<dyn ObjectStore> {
        Arc::downgrade(&self.store)
    }

    /// Fetch metadata for `id` and build the matching typed handle. The
    /// size learned from the store primes the handle's cache.
    pub fn find_object(&self, id: &ObjectId) -> Result<Object, OdbError> {
        let raw = self.store.get_raw(id)?;
        debug!(id = %id, kind = %raw.kind, size = raw.size, "resolved object");
        Ok(Object::from_parts(
            self.store_weak(),
            *id,
            raw.kind,
            Some(raw.size),
        ))
    }

    /// Resolve a reference name (`HEAD`, a branch, a tag) to a commit.
    ///
    /// The name is resolved to an identity by the reference store, then
    /// dispatched to a typed handle. An annotated tag is dereferenced
    /// exactly once; any other non-commit terminal object is a
    /// [`OdbError::TypeMismatch`].
    pub fn resolve_reference(&self, name: &str) -> Result<Commit, OdbError> {
        let id = self.refs.lookup_ref(name)?;
        debug!(reference = name, id = %id, "resolved reference");
        match self.find_object(&id)? {
            Object::Commit(commit) => Ok(commit),
            Object::Tag(tag) => {
                debug!(reference = name, tag = %tag, "dereferencing annotated tag");
                tag.target()?.into_commit()
            }
            other => Err(OdbError::TypeMismatch {
                expected: "commit",
                actual: other.kind().as_str(),
            }),
        }
    }

    /// The commit the current head points at.
    pub fn head(&self) -> Result<Commit, OdbError> {
        self.resolve_reference("HEAD")
    }

    /// A reader over one config scope. Absence of a key is reported, never
    /// defaulted.
    pub fn config(&self, scope: ConfigScope) -> ConfigReader {
        ConfigReader {
            source: self.config.clone(),
            scope,
        }
    }
}

/// Typed, scoped config reads keyed by `(section, key)`.
#[derive(Clone)]
pub struct ConfigReader {
    source: Arc<dyn ConfigSource>,
    scope: ConfigScope,
}

impl ConfigReader {
    pub fn scope(&self) -> ConfigScope {
        self.scope
    }

    /// The raw string value.
    pub fn string(&self, section: &str, key: &str) -> Result<String, OdbError> {
        self.source.read(self.scope, section, key)
    }

    /// A boolean value, accepting git's token set: `true`/`yes`/`on`/`1`
    /// are true; `false`/`no`/`off`/`0` and the empty string are false.
    pub fn bool(&self, section: &str, key: &str) -> Result<bool, OdbError> {
        let value = self.string(section, key)?;
        match value.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" | "" => Ok(false),
            _ => Err(OdbError::InvalidConfigValue(
                format!("{section}.{key}"),
                format!("`{value}` is not a boolean"),
            )),
        }
    }

    /// An integer value, accepting git's `k`/`m`/`g` binary suffixes.
    pub fn int(&self, section: &str, key: &str) -> Result<i64, OdbError> {
        let value = self.string(section, key)?;
        let trimmed = value.trim();
        let (digits, multiplier) = match trimmed.char_indices().last() {
            Some((pos, 'k')) | Some((pos, 'K')) => (&trimmed[..pos], 1024),
            Some((pos, 'm')) | Some((pos, 'M')) => (&trimmed[..pos], 1024 * 1024),
            Some((pos, 'g')) | Some((pos, 'G')) => (&trimmed[..pos], 1024 * 1024 * 1024),
            _ => (trimmed, 1),
        };
        digits
            .parse::<i64>()
            .ok()
            .and_then(|n| n.checked_mul(multiplier))
            .ok_or_else(|| {
                OdbError::InvalidConfigValue(
                    format!("{section}.{key}"),
                    format!("`{value}` is not an integer"),
                )
            })
    }
}
