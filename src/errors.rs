//! Error types for the object-model crate.
//!
//! This module defines a unified error enumeration used across identity
//! parsing, object decoding, reference resolution and config lookup. It
//! integrates with `thiserror` to provide rich `Display` implementations
//! and error source chaining where applicable.
//!
//! Notes:
//! - Each variant carries contextual details via its message payload.
//! - All variants surface to the caller as distinct, catchable conditions;
//!   none are swallowed or retried at this layer.

use thiserror::Error;

#[derive(Error, Debug)]
/// Unified error enumeration for the object-model library.
///
/// - Used across identity, object parsing, handle access, reference
///   resolution and scoped config reads.
/// - Implements `std::error::Error` via `thiserror`.
pub enum OdbError {
    /// Hex string with wrong length or non-hex characters, or a raw
    /// identity with the wrong byte length.
    #[error("The `{0}` is not a valid object identity.")]
    MalformedIdentity(String),

    /// Type-name dispatch miss: not one of blob/tree/commit/tag.
    #[error("The `{0}` is not a valid git object type.")]
    UnknownObjectType(String),

    /// Identity absent from the byte store.
    #[error("Can't find object `{0}` in the object store.")]
    ObjectNotFound(String),

    /// Symbolic reference did not resolve to an identity.
    #[error("Can't resolve reference `{0}`.")]
    ReferenceNotFound(String),

    /// Config key absent in the requested scope.
    #[error("Config key `{section}.{key}` not found in {scope} scope.")]
    ConfigKeyNotFound {
        scope: &'static str,
        section: String,
        key: String,
    },

    /// Config value present but not parseable as the requested type.
    #[error("Invalid config value for `{0}`: {1}")]
    InvalidConfigValue(String, String),

    /// Malformed commit payload.
    #[error("Not a valid git commit object: {0}")]
    InvalidCommit(String),

    /// Malformed tree payload.
    #[error("Not a valid git tree object: {0}")]
    InvalidTree(String),

    /// Invalid tree entry (mode/name/identity).
    #[error("The `{0}` is not a valid git tree entry.")]
    InvalidTreeEntry(String),

    /// Malformed author/committer/tagger line.
    #[error("The `{0}` is not a valid git signature.")]
    InvalidSignature(String),

    /// Malformed tag payload.
    #[error("Not a valid git tag object: {0}")]
    InvalidTag(String),

    /// A located handle was given an absolute path; tree-entry paths are
    /// relative to their containing tree.
    #[error("The path `{0}` must be relative to its containing tree.")]
    InvalidPath(String),

    /// An object resolved to a different kind than the operation requires.
    #[error("Expected a {expected} object, found a {actual}.")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// The owning object store was dropped while a handle was still alive.
    #[error("The object store backing this handle has been released.")]
    StoreReleased,

    /// Structural field that must be ASCII/UTF-8 failed to decode.
    #[error("Text decoding failed: {0}")]
    Encoding(String),

    /// I/O error from an underlying reader or writer.
    #[error("IO Error: {0}")]
    IOError(#[from] std::io::Error),
}
