//! The Blob object stores raw file content. It carries no structure of its
//! own: the payload is the file's bytes, and everything else (name, mode,
//! location) lives on the tree entry that points at it.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::errors::OdbError;
use crate::hash::ObjectId;
use crate::internal::object::ObjectTrait;
use crate::internal::object::types::ObjectType;

/// A parsed blob record: an identity plus opaque bytes.
#[derive(Eq, Debug, Clone, Serialize, Deserialize)]
pub struct Blob {
    pub id: ObjectId,
    pub data: Vec<u8>,
}

impl PartialEq for Blob {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Display for Blob {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "blob {}", self.id)?;
        writeln!(f, "size: {}", self.data.len())
    }
}

impl Blob {
    /// Build a blob from content, computing its canonical identity.
    pub fn from_content(content: &[u8]) -> Blob {
        Blob {
            id: ObjectId::from_kind_and_data(ObjectType::Blob, content),
            data: content.to_vec(),
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

impl ObjectTrait for Blob {
    fn from_bytes(data: &[u8], id: ObjectId) -> Result<Self, OdbError> {
        Ok(Blob {
            id,
            data: data.to_vec(),
        })
    }

    fn get_type(&self) -> ObjectType {
        ObjectType::Blob
    }

    fn to_data(&self) -> Result<Vec<u8>, OdbError> {
        Ok(self.data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_content_hashes_canonically() {
        let blob = Blob::from_content(b"what is up, doc?");
        assert_eq!(blob.id.to_hex(), "bd9dbf5aae1a3862dd1526723246b20206e5fc37");
        assert_eq!(blob.size(), 16);
    }

    #[test]
    fn test_round_trip() {
        let blob = Blob::from_content(b"hello\n");
        let data = blob.to_data().unwrap();
        let parsed = Blob::from_bytes(&data, blob.id).unwrap();
        assert_eq!(parsed, blob);
        assert_eq!(parsed.object_id().unwrap(), blob.id);
    }
}
