//! Object identities.
//!
//! Every object in the store is addressed by the SHA-1 hash of its canonical
//! serialization (`"<type> <len>\0<payload>"`). The [`ObjectId`] struct,
//! encapsulating a `[u8; 20]` array, represents that address: a fixed-width
//! binary value whose 40-character lowercase hex rendering is the familiar
//! user-facing form. Two objects with equal identity are the same stored
//! object, regardless of which in-memory instance produced them.

use std::{fmt::Display, io, str::FromStr};

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use crate::errors::OdbError;
use crate::internal::object::types::ObjectType;

/// Number of bytes in a binary identity.
pub const ID_RAW_LEN: usize = 20;

/// Number of characters in the hex rendering of an identity.
pub const ID_HEX_LEN: usize = ID_RAW_LEN * 2;

/// A 20-byte binary object identity.
///
/// Equality, ordering and hashing are structural over the raw bytes, so any
/// two instances naming the same stored object compare equal and hash
/// identically. Conversion to and from the hex form round-trips exactly;
/// the hex rendering is always lowercase.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct ObjectId([u8; ID_RAW_LEN]);

impl Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "ObjectId({})", self.to_hex())
    }
}

impl AsRef<[u8]> for ObjectId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for ObjectId {
    type Err = OdbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl ObjectId {
    /// The all-zero identity, used as a placeholder before hashing.
    pub const ZERO: ObjectId = ObjectId([0u8; ID_RAW_LEN]);

    /// Parse a 40-character hex string. Either case is accepted; the binary
    /// form is case-normalized by construction.
    pub fn from_hex(s: &str) -> Result<ObjectId, OdbError> {
        if s.len() != ID_HEX_LEN {
            return Err(OdbError::MalformedIdentity(s.to_string()));
        }
        let mut raw = [0u8; ID_RAW_LEN];
        hex::decode_to_slice(s, &mut raw)
            .map_err(|_| OdbError::MalformedIdentity(s.to_string()))?;
        Ok(ObjectId(raw))
    }

    /// Render as a 40-character lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Copy a binary identity out of a byte slice, checking the length.
    pub fn from_bytes(bytes: &[u8]) -> Result<ObjectId, OdbError> {
        if bytes.len() != ID_RAW_LEN {
            return Err(OdbError::MalformedIdentity(hex::encode(bytes)));
        }
        let mut raw = [0u8; ID_RAW_LEN];
        raw.copy_from_slice(bytes);
        Ok(ObjectId(raw))
    }

    /// Read a binary identity from a stream.
    pub fn from_stream(data: &mut impl io::Read) -> io::Result<ObjectId> {
        let mut raw = [0u8; ID_RAW_LEN];
        data.read_exact(&mut raw)?;
        Ok(ObjectId(raw))
    }

    /// Hash arbitrary bytes into an identity.
    pub fn hash_of(data: &[u8]) -> ObjectId {
        let digest = Sha1::digest(data);
        let mut raw = [0u8; ID_RAW_LEN];
        raw.copy_from_slice(&digest);
        ObjectId(raw)
    }

    /// Compute the canonical content address of an object: the hash of
    /// `"<type> <len>\0<payload>"`.
    pub fn from_kind_and_data(kind: ObjectType, data: &[u8]) -> ObjectId {
        let mut hasher = Sha1::new();
        hasher.update(kind.to_bytes());
        hasher.update(b" ");
        hasher.update(data.len().to_string().as_bytes());
        hasher.update(b"\0");
        hasher.update(data);
        let mut raw = [0u8; ID_RAW_LEN];
        raw.copy_from_slice(&hasher.finalize());
        ObjectId(raw)
    }

    /// Borrow the raw bytes.
    pub fn as_bytes(&self) -> &[u8; ID_RAW_LEN] {
        &self.0
    }

    /// Export the raw bytes as an owned vector.
    pub fn to_data(self) -> Vec<u8> {
        self.0.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_hash_of() {
        let id = ObjectId::hash_of(b"Hello, world!");
        assert_eq!(id.to_hex(), "943a702d06f34599aee1f8da8ef9f7296031d699");
    }

    #[test]
    fn test_from_kind_and_data() {
        // git hash-object on an empty blob
        let id = ObjectId::from_kind_and_data(ObjectType::Blob, b"");
        assert_eq!(id.to_hex(), "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391");

        let id = ObjectId::from_kind_and_data(ObjectType::Blob, b"what is up, doc?");
        assert_eq!(id.to_hex(), "bd9dbf5aae1a3862dd1526723246b20206e5fc37");
    }

    #[test]
    fn test_hex_round_trip() {
        let hex = "8ab686eafeb1f44702738c8b0f24f2567c36da6d";
        let id = ObjectId::from_hex(hex).unwrap();
        assert_eq!(id.to_hex(), hex);
        assert_eq!(id.to_string(), hex);
        assert_eq!(ObjectId::from_str(hex).unwrap(), id);
    }

    #[test]
    fn test_from_hex_normalizes_case() {
        let upper = "8AB686EAFEB1F44702738C8B0F24F2567C36DA6D";
        let id = ObjectId::from_hex(upper).unwrap();
        assert_eq!(id.to_hex(), upper.to_lowercase());
    }

    #[test]
    fn test_from_hex_rejects_bad_input() {
        assert!(matches!(
            ObjectId::from_hex("deadbeef"),
            Err(OdbError::MalformedIdentity(_))
        ));
        assert!(matches!(
            ObjectId::from_hex("zzb686eafeb1f44702738c8b0f24f2567c36da6d"),
            Err(OdbError::MalformedIdentity(_))
        ));
        assert!(matches!(
            ObjectId::from_hex(""),
            Err(OdbError::MalformedIdentity(_))
        ));
    }

    #[test]
    fn test_from_bytes() {
        let raw = [
            0x8a, 0xb6, 0x86, 0xea, 0xfe, 0xb1, 0xf4, 0x47, 0x02, 0x73, 0x8c, 0x8b, 0x0f, 0x24,
            0xf2, 0x56, 0x7c, 0x36, 0xda, 0x6d,
        ];
        let id = ObjectId::from_bytes(&raw).unwrap();
        assert_eq!(id.to_hex(), "8ab686eafeb1f44702738c8b0f24f2567c36da6d");
        assert_eq!(id.to_data(), raw.to_vec());
        assert!(ObjectId::from_bytes(&raw[..19]).is_err());
    }

    #[test]
    fn test_from_stream() {
        let raw = [
            0x8a, 0xb6, 0x86, 0xea, 0xfe, 0xb1, 0xf4, 0x47, 0x02, 0x73, 0x8c, 0x8b, 0x0f, 0x24,
            0xf2, 0x56, 0x7c, 0x36, 0xda, 0x6d,
        ];
        let mut reader = std::io::Cursor::new(raw);
        let id = ObjectId::from_stream(&mut reader).unwrap();
        assert_eq!(id.to_hex(), "8ab686eafeb1f44702738c8b0f24f2567c36da6d");
    }

    #[test]
    fn test_structural_equality() {
        let a = ObjectId::from_hex("8ab686eafeb1f44702738c8b0f24f2567c36da6d").unwrap();
        let b = ObjectId::from_hex("8ab686eafeb1f44702738c8b0f24f2567c36da6d").unwrap();
        assert_eq!(a, b);
        let mut set = std::collections::HashSet::new();
        set.insert(a);
        set.insert(b);
        assert_eq!(set.len(), 1);
    }
}
