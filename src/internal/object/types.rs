//! Object type enumeration.
//!
//! The four object kinds form a closed set, fixed at compile time: the enum
//! itself is the type registry, and dispatch from a store's type token to a
//! concrete variant goes through [`ObjectType::from_str`]. There is no
//! dynamic registration of new kinds.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::errors::OdbError;

const BLOB_TOKEN: &[u8] = b"blob";
const TREE_TOKEN: &[u8] = b"tree";
const COMMIT_TOKEN: &[u8] = b"commit";
const TAG_TOKEN: &[u8] = b"tag";

/// The kind of a stored object.
///
/// * `Blob`: opaque file content.
/// * `Tree`: an ordered directory listing of (mode, name, identity) entries.
/// * `Commit`: a snapshot with tree, parents, author/committer and message.
/// * `Tag`: an annotated tag pointing at another object.
#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
    Tag,
}

impl Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ObjectType {
    /// All kinds, in the order the on-disk format assigns their numeric ids.
    pub const ALL: [ObjectType; 4] = [
        ObjectType::Commit,
        ObjectType::Tree,
        ObjectType::Blob,
        ObjectType::Tag,
    ];

    /// The canonical type token as written in object headers.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Blob => "blob",
            ObjectType::Tree => "tree",
            ObjectType::Commit => "commit",
            ObjectType::Tag => "tag",
        }
    }

    /// The canonical type token as bytes.
    pub const fn to_bytes(&self) -> &'static [u8] {
        match self {
            ObjectType::Blob => BLOB_TOKEN,
            ObjectType::Tree => TREE_TOKEN,
            ObjectType::Commit => COMMIT_TOKEN,
            ObjectType::Tag => TAG_TOKEN,
        }
    }

    /// Resolve a type token to its kind. The match is exact and
    /// case-sensitive; anything outside the closed set (including the empty
    /// string and case variants) is [`OdbError::UnknownObjectType`].
    pub fn from_str(token: &str) -> Result<ObjectType, OdbError> {
        match token {
            "blob" => Ok(ObjectType::Blob),
            "tree" => Ok(ObjectType::Tree),
            "commit" => Ok(ObjectType::Commit),
            "tag" => Ok(ObjectType::Tag),
            _ => Err(OdbError::UnknownObjectType(token.to_string())),
        }
    }

    /// Resolve a raw type token as read from an object header.
    pub fn from_bytes(token: &[u8]) -> Result<ObjectType, OdbError> {
        match token {
            BLOB_TOKEN => Ok(ObjectType::Blob),
            TREE_TOKEN => Ok(ObjectType::Tree),
            COMMIT_TOKEN => Ok(ObjectType::Commit),
            TAG_TOKEN => Ok(ObjectType::Tag),
            _ => Err(OdbError::UnknownObjectType(
                String::from_utf8_lossy(token).into_owned(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_over_closed_set() {
        for kind in ObjectType::ALL {
            assert_eq!(ObjectType::from_str(kind.as_str()).unwrap(), kind);
            assert_eq!(ObjectType::from_bytes(kind.to_bytes()).unwrap(), kind);
            assert_eq!(kind.to_string(), kind.as_str());
        }
    }

    #[test]
    fn test_unknown_token_is_rejected() {
        for token in ["doesntexist", "", "Blob", "BLOB", "commit "] {
            assert!(matches!(
                ObjectType::from_str(token),
                Err(OdbError::UnknownObjectType(_))
            ));
        }
        assert!(ObjectType::from_bytes(b"blobs").is_err());
    }
}
