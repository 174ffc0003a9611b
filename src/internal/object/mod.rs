//! Parsed object records for blobs, trees, commits and tags, plus the
//! supporting trait that lets store and handle layers create strongly typed
//! values from raw bytes.
//!
//! Records are immutable value types: once parsed, a record's identity and
//! fields never change. The lazy, store-backed access layer lives in
//! [`crate::objects`]; everything here works on fully materialized byte
//! slices.

pub mod blob;
pub mod commit;
pub mod signature;
pub mod tag;
pub mod tree;
pub mod types;

use std::fmt::Display;

use crate::{errors::OdbError, hash::ObjectId, internal::object::types::ObjectType};

/// Common interface for the four parsed object records.
pub trait ObjectTrait: Send + Sync + Display {
    /// Parse a record from its raw payload. The identity is supplied by the
    /// caller (it is the address the bytes were fetched under) rather than
    /// recomputed.
    fn from_bytes(data: &[u8], id: ObjectId) -> Result<Self, OdbError>
    where
        Self: Sized;

    /// The kind of this record.
    fn get_type(&self) -> ObjectType;

    /// Serialize the record to its canonical payload.
    fn to_data(&self) -> Result<Vec<u8>, OdbError>;

    /// Compute the content address of the serialized record.
    ///
    /// Default implementation serializes and hashes; override only for
    /// custom caching.
    fn object_id(&self) -> Result<ObjectId, OdbError> {
        let data = self.to_data()?;
        Ok(ObjectId::from_kind_and_data(self.get_type(), &data))
    }
}
