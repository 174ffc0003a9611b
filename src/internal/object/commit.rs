//! The Commit object records a snapshot of the project at a point in time:
//! the top-level tree, zero or more parent commits, the author and committer
//! signatures, and the message.
//!
//! A commit with no parents is a root commit; more than one parent marks a
//! merge. Parent order is declaration order in the payload, which is the
//! order consumers see from [`Commit::parent_ids`].

use std::fmt::Display;

use bstr::ByteSlice;

use serde::{Deserialize, Serialize};

use crate::errors::OdbError;
use crate::hash::ObjectId;
use crate::internal::object::ObjectTrait;
use crate::internal::object::signature::Signature;
use crate::internal::object::types::ObjectType;
use crate::utils::{decode_text, decode_text_strict};

/// A parsed commit record.
///
/// - `tree_id` points at the top-level tree reflecting the complete state of
///   the repository at commit time.
/// - `parent_ids` chain commits into the history DAG, first parent first.
/// - `message` holds everything after the header block, including any PGP
///   signature lines, decoded with the substitution policy.
#[derive(Eq, Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    pub id: ObjectId,
    pub tree_id: ObjectId,
    pub parent_ids: Vec<ObjectId>,
    pub author: Signature,
    pub committer: Signature,
    pub message: String,
}

impl PartialEq for Commit {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Display for Commit {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "tree: {}", self.tree_id)?;
        for parent in &self.parent_ids {
            writeln!(f, "parent: {parent}")?;
        }
        writeln!(f, "author {}", self.author)?;
        writeln!(f, "committer {}", self.committer)?;
        writeln!(f, "{}", self.message)
    }
}

impl Commit {
    /// Build a commit from its parts, computing the canonical identity.
    pub fn new(
        author: Signature,
        committer: Signature,
        tree_id: ObjectId,
        parent_ids: Vec<ObjectId>,
        message: &str,
    ) -> Result<Commit, OdbError> {
        let mut commit = Commit {
            id: ObjectId::ZERO,
            tree_id,
            parent_ids,
            author,
            committer,
            message: message.to_string(),
        };
        commit.id = ObjectId::from_kind_and_data(ObjectType::Commit, &commit.to_data()?);
        Ok(commit)
    }

    /// True for a commit with no parents.
    pub fn is_root(&self) -> bool {
        self.parent_ids.is_empty()
    }

    /// True for a commit with more than one parent.
    pub fn is_merge(&self) -> bool {
        self.parent_ids.len() > 1
    }

    /// The first meaningful line of the message.
    ///
    /// If the message embeds a PGP signature block, the summary is the first
    /// non-empty line after it; otherwise the first non-empty line overall.
    /// Falls back to the whole message when no such line exists.
    pub fn summary(&self) -> String {
        if let Some(pos) = self
            .message
            .lines()
            .position(|line| line.contains("-----END PGP SIGNATURE-----"))
        {
            return self
                .message
                .lines()
                .skip(pos + 1)
                .find(|line| !line.trim().is_empty())
                .map(|line| line.to_owned())
                .unwrap_or_else(|| self.message.clone());
        }

        self.message
            .lines()
            .find(|line| !line.trim().is_empty())
            .map(|line| line.to_owned())
            .unwrap_or_else(|| self.message.clone())
    }
}

impl ObjectTrait for Commit {
    fn from_bytes(data: &[u8], id: ObjectId) -> Result<Self, OdbError> {
        let mut rest = data;

        // `tree <hex>\n`
        let tree_end = rest
            .find_byte(b'\n')
            .ok_or_else(|| OdbError::InvalidCommit("missing tree line".to_string()))?;
        let tree_line = &rest[..tree_end];
        let tree_hex = tree_line
            .strip_prefix(b"tree ")
            .ok_or_else(|| OdbError::InvalidCommit("payload does not start with a tree".to_string()))?;
        let tree_id = ObjectId::from_hex(&decode_text_strict(tree_hex)?)?;
        rest = &rest[tree_end + 1..];

        // Zero or more `parent <hex>\n` lines, in declaration order.
        let mut parent_ids = Vec::new();
        while let Some(parent_hex) = rest
            .split(|&b| b == b'\n')
            .next()
            .and_then(|line| line.strip_prefix(b"parent "))
        {
            parent_ids.push(ObjectId::from_hex(&decode_text_strict(parent_hex)?)?);
            let line_end = rest
                .find_byte(b'\n')
                .ok_or_else(|| OdbError::InvalidCommit("truncated parent line".to_string()))?;
            rest = &rest[line_end + 1..];
        }

        // `author …\n` and `committer …\n`
        let author_end = rest
            .find_byte(b'\n')
            .ok_or_else(|| OdbError::InvalidCommit("missing author line".to_string()))?;
        let author = Signature::from_data(&rest[..author_end])?;
        rest = &rest[author_end + 1..];

        let committer_end = rest
            .find_byte(b'\n')
            .ok_or_else(|| OdbError::InvalidCommit("missing committer line".to_string()))?;
        let committer = Signature::from_data(&rest[..committer_end])?;
        rest = &rest[committer_end + 1..];

        // Everything remaining, extra headers such as gpgsig included, is
        // kept verbatim as the message, matching the serialized layout.
        let message = decode_text(rest);

        Ok(Commit {
            id,
            tree_id,
            parent_ids,
            author,
            committer,
            message,
        })
    }

    fn get_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn to_data(&self) -> Result<Vec<u8>, OdbError> {
        let mut data = Vec::new();

        data.extend(b"tree ");
        data.extend(self.tree_id.to_hex().as_bytes());
        data.push(b'\n');

        for parent_id in &self.parent_ids {
            data.extend(b"parent ");
            data.extend(parent_id.to_hex().as_bytes());
            data.push(b'\n');
        }

        data.extend(self.author.to_data()?);
        data.push(b'\n');
        data.extend(self.committer.to_data()?);
        data.push(b'\n');
        data.extend(self.message.as_bytes());

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::internal::object::signature::SignatureKind;

    fn signed_commit() -> Commit {
        let raw = br#"tree 341e54913a3a43069f2927cc0f703e5a9f730df1
author benjamin.747 <benjamin.747@outlook.com> 1757467768 +0800
committer benjamin.747 <benjamin.747@outlook.com> 1757491219 +0800
gpgsig -----BEGIN PGP SIGNATURE-----

 iQJNBAABCAA3FiEEs4MaYUV7JcjxsVMPyqxGczTZ6K4FAmjBMC4ZHGJlbmphbWlu
 -----END PGP SIGNATURE-----

test parse commit from bytes
"#;
        let id = ObjectId::from_str("57d7685c60213a9da465cf900f31933be3a7ee39").unwrap();
        Commit::from_bytes(raw, id).unwrap()
    }

    #[test]
    fn test_parse_root_commit() {
        let raw = b"tree 341e54913a3a43069f2927cc0f703e5a9f730df1\n\
                    author a <a@b.c> 1700000000 +0000\n\
                    committer a <a@b.c> 1700000000 +0000\n\
                    \ninitial\n";
        let commit = Commit::from_bytes(raw, ObjectId::ZERO).unwrap();
        assert!(commit.is_root());
        assert!(!commit.is_merge());
        assert_eq!(commit.message, "\ninitial\n");
        assert_eq!(commit.summary(), "initial");
        assert_eq!(commit.author.kind, SignatureKind::Author);
    }

    #[test]
    fn test_parse_merge_commit_keeps_parent_order() {
        let raw = b"tree 341e54913a3a43069f2927cc0f703e5a9f730df1\n\
                    parent 1111111111111111111111111111111111111111\n\
                    parent 2222222222222222222222222222222222222222\n\
                    author a <a@b.c> 1700000000 +0000\n\
                    committer a <a@b.c> 1700000000 +0000\n\
                    \nmerge\n";
        let commit = Commit::from_bytes(raw, ObjectId::ZERO).unwrap();
        assert!(commit.is_merge());
        assert_eq!(
            commit.parent_ids[0].to_hex(),
            "1111111111111111111111111111111111111111"
        );
        assert_eq!(
            commit.parent_ids[1].to_hex(),
            "2222222222222222222222222222222222222222"
        );
    }

    #[test]
    fn test_parse_commit_with_gpgsig() {
        let commit = signed_commit();
        assert_eq!(
            commit.tree_id,
            ObjectId::from_str("341e54913a3a43069f2927cc0f703e5a9f730df1").unwrap()
        );
        assert_eq!(commit.author.name, "benjamin.747");
        assert_eq!(commit.committer.email, "benjamin.747@outlook.com");
        assert!(commit.message.contains("-----BEGIN PGP SIGNATURE-----"));
        assert!(commit.message.contains("test parse commit from bytes"));
        assert_eq!(commit.summary(), "test parse commit from bytes");
    }

    #[test]
    fn test_round_trip_preserves_identity() {
        let commit = Commit::new(
            Signature::from_data(b"author a <a@b.c> 1700000000 +0000").unwrap(),
            Signature::from_data(b"committer a <a@b.c> 1700000001 +0000").unwrap(),
            ObjectId::from_str("341e54913a3a43069f2927cc0f703e5a9f730df1").unwrap(),
            vec![],
            "\nround trip\n",
        )
        .unwrap();
        let data = commit.to_data().unwrap();
        let parsed = Commit::from_bytes(&data, commit.id).unwrap();
        assert_eq!(parsed, commit);
        assert_eq!(parsed.object_id().unwrap(), commit.id);
        assert_eq!(parsed.message, "\nround trip\n");
    }

    #[test]
    fn test_json_round_trip() {
        let commit = signed_commit();
        let json = serde_json::to_string(&commit).unwrap();
        let back: Commit = serde_json::from_str(&json).unwrap();
        assert_eq!(back, commit);
        assert_eq!(back.author.name, commit.author.name);
        assert_eq!(back.message, commit.message);
    }

    #[test]
    fn test_malformed_payloads() {
        assert!(matches!(
            Commit::from_bytes(b"blob 1234", ObjectId::ZERO),
            Err(OdbError::InvalidCommit(_))
        ));
        assert!(matches!(
            Commit::from_bytes(
                b"tree 341e54913a3a43069f2927cc0f703e5a9f730df1\n",
                ObjectId::ZERO
            ),
            Err(OdbError::InvalidCommit(_))
        ));
        // tree line must carry a well-formed identity
        assert!(Commit::from_bytes(b"tree notahash\nx", ObjectId::ZERO).is_err());
    }
}
