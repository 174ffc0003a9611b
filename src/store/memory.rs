//! In-memory reference implementations of the collaborator traits.
//!
//! These back the test fixtures and give embedders a zero-setup store for
//! ephemeral repositories. Storage is `DashMap`-based, so concurrent reads
//! (and inserts) need no external locking.

use std::io::Cursor;
use std::sync::Arc;

use dashmap::DashMap;

use crate::errors::OdbError;
use crate::hash::ObjectId;
use crate::internal::object::ObjectTrait;
use crate::internal::object::types::ObjectType;
use crate::store::{ConfigScope, ConfigSource, ObjectStore, RawObject, RefStore};

/// An in-memory byte store keyed by identity.
#[derive(Default)]
pub struct MemoryStore {
    objects: DashMap<ObjectId, (ObjectType, Arc<[u8]>)>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    /// Insert raw bytes under their canonical content address and return it.
    pub fn put_raw(&self, kind: ObjectType, data: &[u8]) -> ObjectId {
        let id = ObjectId::from_kind_and_data(kind, data);
        self.objects.insert(id, (kind, Arc::from(data)));
        tracing::trace!(kind = %kind, id = %id, len = data.len(), "stored object");
        id
    }

    /// Serialize a parsed record and store it under its content address.
    pub fn put(&self, object: &dyn ObjectTrait) -> Result<ObjectId, OdbError> {
        let data = object.to_data()?;
        Ok(self.put_raw(object.get_type(), &data))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl ObjectStore for MemoryStore {
    fn get_raw(&self, id: &ObjectId) -> Result<RawObject, OdbError> {
        let entry = self
            .objects
            .get(id)
            .ok_or_else(|| OdbError::ObjectNotFound(id.to_hex()))?;
        let (kind, data) = entry.value().clone();
        Ok(RawObject {
            kind,
            size: data.len() as u64,
            stream: Box::new(Cursor::new(data)),
        })
    }

    fn contains(&self, id: &ObjectId) -> bool {
        self.objects.contains_key(id)
    }
}

/// A reference target: either an identity or a pointer to another
/// reference (as `HEAD` usually is).
#[derive(Debug, Clone)]
pub enum RefTarget {
    Direct(ObjectId),
    Symbolic(String),
}

/// How many symbolic hops a lookup will follow before giving up. Mirrors
/// git's own chain limit.
const MAX_SYMREF_DEPTH: usize = 5;

/// An in-memory reference store with symbolic-reference support.
///
/// Lookup accepts full names as stored and falls back to the conventional
/// search path for short names: `refs/heads/<name>`, then
/// `refs/tags/<name>`.
#[derive(Default)]
pub struct MemoryRefStore {
    refs: DashMap<String, RefTarget>,
}

impl MemoryRefStore {
    pub fn new() -> MemoryRefStore {
        MemoryRefStore::default()
    }

    pub fn set_ref(&self, name: &str, id: ObjectId) {
        self.refs.insert(name.to_string(), RefTarget::Direct(id));
    }

    pub fn set_symbolic_ref(&self, name: &str, target: &str) {
        self.refs
            .insert(name.to_string(), RefTarget::Symbolic(target.to_string()));
    }

    fn target(&self, name: &str) -> Option<RefTarget> {
        if let Some(found) = self.refs.get(name) {
            return Some(found.value().clone());
        }
        for prefix in ["refs/heads/", "refs/tags/"] {
            if let Some(found) = self.refs.get(&format!("{prefix}{name}")) {
                return Some(found.value().clone());
            }
        }
        None
    }
}

impl RefStore for MemoryRefStore {
    fn lookup_ref(&self, name: &str) -> Result<ObjectId, OdbError> {
        let mut current = name.to_string();
        for _ in 0..MAX_SYMREF_DEPTH {
            match self.target(&current) {
                Some(RefTarget::Direct(id)) => return Ok(id),
                Some(RefTarget::Symbolic(next)) => {
                    tracing::trace!(from = %current, to = %next, "following symbolic ref");
                    current = next;
                }
                None => return Err(OdbError::ReferenceNotFound(name.to_string())),
            }
        }
        Err(OdbError::ReferenceNotFound(name.to_string()))
    }
}

/// An in-memory config source with independent per-scope key spaces.
#[derive(Default)]
pub struct MemoryConfig {
    values: DashMap<(ConfigScope, String), String>,
}

impl MemoryConfig {
    pub fn new() -> MemoryConfig {
        MemoryConfig::default()
    }

    pub fn set(&self, scope: ConfigScope, section: &str, key: &str, value: &str) {
        self.values
            .insert((scope, format!("{section}.{key}")), value.to_string());
    }
}

impl ConfigSource for MemoryConfig {
    fn read(&self, scope: ConfigScope, section: &str, key: &str) -> Result<String, OdbError> {
        self.values
            .get(&(scope, format!("{section}.{key}")))
            .map(|v| v.value().clone())
            .ok_or_else(|| OdbError::ConfigKeyNotFound {
                scope: scope.as_str(),
                section: section.to_string(),
                key: key.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;
    use crate::internal::object::blob::Blob;

    #[test]
    fn test_put_and_get_round_trip() {
        let store = MemoryStore::new();
        let blob = Blob::from_content(b"what is up, doc?");
        let id = store.put(&blob).unwrap();
        assert_eq!(id, blob.id);
        assert!(store.contains(&id));

        let raw = store.get_raw(&id).unwrap();
        assert_eq!(raw.kind, ObjectType::Blob);
        assert_eq!(raw.size, 16);
        let mut stream = raw.stream;
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"what is up, doc?");
    }

    #[test]
    fn test_each_stream_is_independent() {
        let store = MemoryStore::new();
        let id = store.put_raw(ObjectType::Blob, b"abcdef");

        let mut first = store.get_raw(&id).unwrap().stream;
        let mut half = [0u8; 3];
        first.read_exact(&mut half).unwrap();

        // a second stream starts back at the beginning
        let mut second = store.get_raw(&id).unwrap().stream;
        let mut buf = Vec::new();
        second.read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"abcdef");
    }

    #[test]
    fn test_missing_object() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.get_raw(&ObjectId::ZERO),
            Err(OdbError::ObjectNotFound(_))
        ));
        assert!(!store.contains(&ObjectId::ZERO));
    }

    #[test]
    fn test_symbolic_refs_and_short_names() {
        let refs = MemoryRefStore::new();
        let id = ObjectId::hash_of(b"commit");
        refs.set_ref("refs/heads/main", id);
        refs.set_symbolic_ref("HEAD", "refs/heads/main");

        assert_eq!(refs.lookup_ref("HEAD").unwrap(), id);
        assert_eq!(refs.lookup_ref("refs/heads/main").unwrap(), id);
        assert_eq!(refs.lookup_ref("main").unwrap(), id);
        assert!(matches!(
            refs.lookup_ref("develop"),
            Err(OdbError::ReferenceNotFound(_))
        ));
    }

    #[test]
    fn test_symbolic_cycle_is_bounded() {
        let refs = MemoryRefStore::new();
        refs.set_symbolic_ref("A", "B");
        refs.set_symbolic_ref("B", "A");
        assert!(matches!(
            refs.lookup_ref("A"),
            Err(OdbError::ReferenceNotFound(_))
        ));
    }

    #[test]
    fn test_config_scopes_are_independent() {
        let config = MemoryConfig::new();
        config.set(ConfigScope::Repository, "core", "bare", "true");
        config.set(ConfigScope::Global, "user", "name", "eli");

        assert_eq!(
            config
                .read(ConfigScope::Repository, "core", "bare")
                .unwrap(),
            "true"
        );
        assert!(matches!(
            config.read(ConfigScope::Global, "core", "bare"),
            Err(OdbError::ConfigKeyNotFound { .. })
        ));
        assert!(matches!(
            config.read(ConfigScope::System, "user", "name"),
            Err(OdbError::ConfigKeyNotFound { .. })
        ));
    }
}
