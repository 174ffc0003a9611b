//! The Tree object represents a directory: an ordered list of entries, each
//! an (mode, name, identity) triple pointing at a blob or a nested tree.
//!
//! The canonical payload is a run of `<octal mode> <name>\0<20-byte id>`
//! records with no separators between them. Entries sort by name bytewise,
//! with directory names compared as if they carried a trailing `/`, the
//! order git itself writes, and the order [`Tree::items`] preserves.

use std::cmp::Ordering;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::errors::OdbError;
use crate::hash::{ID_RAW_LEN, ObjectId};
use crate::internal::object::ObjectTrait;
use crate::internal::object::types::ObjectType;
use crate::utils::decode_text;

/// File-mode of a tree entry: type bits plus permission bits, as stored in
/// the octal mode token.
#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryMode {
    /// Regular file, `100644`.
    Blob,
    /// Executable file, `100755`.
    BlobExecutable,
    /// Symbolic link, `120000`.
    Link,
    /// Nested directory, `40000`.
    Tree,
    /// Submodule (gitlink), `160000`. A leaf reference to a commit in
    /// another repository; never resolvable as a tree in this store.
    Submodule,
}

impl EntryMode {
    /// Parse the octal mode token as written in a tree payload.
    pub fn from_bytes(mode: &[u8]) -> Result<EntryMode, OdbError> {
        match mode {
            b"100644" | b"100664" => Ok(EntryMode::Blob),
            b"100755" => Ok(EntryMode::BlobExecutable),
            b"120000" => Ok(EntryMode::Link),
            b"40000" | b"040000" => Ok(EntryMode::Tree),
            b"160000" => Ok(EntryMode::Submodule),
            _ => Err(OdbError::InvalidTreeEntry(
                String::from_utf8_lossy(mode).into_owned(),
            )),
        }
    }

    /// The canonical token for serialization. Trees use the short `40000`
    /// form, matching what git writes.
    pub const fn to_bytes(&self) -> &'static [u8] {
        match self {
            EntryMode::Blob => b"100644",
            EntryMode::BlobExecutable => b"100755",
            EntryMode::Link => b"120000",
            EntryMode::Tree => b"40000",
            EntryMode::Submodule => b"160000",
        }
    }

    /// The numeric mode bitmask (type bits plus permissions).
    pub const fn mode_bits(&self) -> u32 {
        match self {
            EntryMode::Blob => 0o100644,
            EntryMode::BlobExecutable => 0o100755,
            EntryMode::Link => 0o120000,
            EntryMode::Tree => 0o040000,
            EntryMode::Submodule => 0o160000,
        }
    }

    /// The kind of object this entry points at. Submodule entries reference
    /// a commit even though no such commit needs to exist in this store.
    pub const fn object_type(&self) -> ObjectType {
        match self {
            EntryMode::Tree => ObjectType::Tree,
            EntryMode::Submodule => ObjectType::Commit,
            _ => ObjectType::Blob,
        }
    }

    pub const fn is_tree(&self) -> bool {
        matches!(self, EntryMode::Tree)
    }

    pub const fn is_submodule(&self) -> bool {
        matches!(self, EntryMode::Submodule)
    }
}

/// One tree entry: mode, name and the identity it points at.
#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
pub struct TreeItem {
    pub mode: EntryMode,
    pub name: String,
    pub id: ObjectId,
}

impl TreeItem {
    pub fn new(mode: EntryMode, name: &str, id: ObjectId) -> TreeItem {
        TreeItem {
            mode,
            name: name.to_string(),
            id,
        }
    }

    /// The name git uses when ordering entries: directories compare as if
    /// they carried a trailing slash.
    fn sort_key(&self) -> Vec<u8> {
        let mut key = self.name.as_bytes().to_vec();
        if self.mode.is_tree() {
            key.push(b'/');
        }
        key
    }
}

impl Display for TreeItem {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} {} {}\t{}",
            String::from_utf8_lossy(self.mode.to_bytes()),
            self.mode.object_type(),
            self.id,
            self.name
        )
    }
}

/// A parsed tree record: an identity plus its ordered entries.
#[derive(Eq, Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub id: ObjectId,
    pub items: Vec<TreeItem>,
}

impl PartialEq for Tree {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Display for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "tree {}", self.id)?;
        for item in &self.items {
            writeln!(f, "{item}")?;
        }
        Ok(())
    }
}

impl Tree {
    /// Build a tree from entries, sorting them canonically and computing the
    /// identity from the serialized form.
    pub fn from_items(mut items: Vec<TreeItem>) -> Result<Tree, OdbError> {
        items.sort_by(|a, b| canonical_order(a, b));
        let mut tree = Tree {
            id: ObjectId::ZERO,
            items,
        };
        tree.id = ObjectId::from_kind_and_data(ObjectType::Tree, &tree.to_data()?);
        Ok(tree)
    }

    /// Look up a direct entry by name.
    pub fn item(&self, name: &str) -> Option<&TreeItem> {
        self.items.iter().find(|item| item.name == name)
    }
}

fn canonical_order(a: &TreeItem, b: &TreeItem) -> Ordering {
    a.sort_key().cmp(&b.sort_key())
}

impl ObjectTrait for Tree {
    fn from_bytes(data: &[u8], id: ObjectId) -> Result<Self, OdbError> {
        let mut items = Vec::new();
        let mut rest = data;
        while !rest.is_empty() {
            let space = memchr::memchr(b' ', rest)
                .ok_or_else(|| OdbError::InvalidTree(format!("entry {} has no mode", items.len())))?;
            let mode = EntryMode::from_bytes(&rest[..space])?;
            rest = &rest[space + 1..];

            let nul = memchr::memchr(b'\0', rest)
                .ok_or_else(|| OdbError::InvalidTree(format!("entry {} has no name", items.len())))?;
            let name = decode_text(&rest[..nul]);
            rest = &rest[nul + 1..];

            if rest.len() < ID_RAW_LEN {
                return Err(OdbError::InvalidTree(format!(
                    "entry `{name}` has a truncated identity"
                )));
            }
            let entry_id = ObjectId::from_bytes(&rest[..ID_RAW_LEN])?;
            rest = &rest[ID_RAW_LEN..];

            items.push(TreeItem {
                mode,
                name,
                id: entry_id,
            });
        }
        Ok(Tree { id, items })
    }

    fn get_type(&self) -> ObjectType {
        ObjectType::Tree
    }

    fn to_data(&self) -> Result<Vec<u8>, OdbError> {
        let mut data = Vec::new();
        for item in &self.items {
            data.extend(item.mode.to_bytes());
            data.push(b' ');
            data.extend(item.name.as_bytes());
            data.push(b'\0');
            data.extend(item.id.as_bytes());
        }
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn blob_id(n: u8) -> ObjectId {
        ObjectId::from_bytes(&[n; 20]).unwrap()
    }

    #[test]
    fn test_entry_mode_tokens() {
        assert_eq!(EntryMode::from_bytes(b"100644").unwrap(), EntryMode::Blob);
        assert_eq!(EntryMode::from_bytes(b"40000").unwrap(), EntryMode::Tree);
        assert_eq!(
            EntryMode::from_bytes(b"160000").unwrap(),
            EntryMode::Submodule
        );
        assert!(EntryMode::from_bytes(b"100645").is_err());
        assert_eq!(EntryMode::Tree.mode_bits(), 0o040000);
        assert_eq!(EntryMode::Submodule.object_type(), ObjectType::Commit);
        assert!(EntryMode::Submodule.is_submodule());
        assert!(!EntryMode::Submodule.is_tree());
    }

    #[test]
    fn test_parse_canonical_payload() {
        let mut data = Vec::new();
        data.extend(b"100644 hello.txt\0");
        data.extend([0x11u8; 20]);
        data.extend(b"40000 lib\0");
        data.extend([0x22u8; 20]);

        let id = ObjectId::from_kind_and_data(ObjectType::Tree, &data);
        let tree = Tree::from_bytes(&data, id).unwrap();

        assert_eq!(tree.items.len(), 2);
        assert_eq!(tree.items[0].name, "hello.txt");
        assert_eq!(tree.items[0].mode, EntryMode::Blob);
        assert_eq!(tree.items[0].id, blob_id(0x11));
        assert_eq!(tree.items[1].name, "lib");
        assert!(tree.items[1].mode.is_tree());
        assert_eq!(tree.to_data().unwrap(), data);
        assert_eq!(tree.object_id().unwrap(), id);
    }

    #[test]
    fn test_truncated_payload_is_rejected() {
        let mut data = Vec::new();
        data.extend(b"100644 short.txt\0");
        data.extend([0x11u8; 10]); // half an identity
        assert!(matches!(
            Tree::from_bytes(&data, ObjectId::ZERO),
            Err(OdbError::InvalidTree(_))
        ));

        assert!(matches!(
            Tree::from_bytes(b"100644 no-nul-or-id", ObjectId::ZERO),
            Err(OdbError::InvalidTree(_))
        ));
    }

    #[test]
    fn test_canonical_sort_puts_directory_after_shadowing_file() {
        // `foo.txt` < `foo/` < `foo0` bytewise once the directory gets its
        // virtual trailing slash ('.' = 0x2e, '/' = 0x2f, '0' = 0x30).
        let tree = Tree::from_items(vec![
            TreeItem::new(EntryMode::Blob, "foo0", blob_id(1)),
            TreeItem::new(EntryMode::Tree, "foo", blob_id(2)),
            TreeItem::new(EntryMode::Blob, "foo.txt", blob_id(3)),
        ])
        .unwrap();
        let names: Vec<&str> = tree.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["foo.txt", "foo", "foo0"]);
    }

    #[test]
    fn test_known_tree_hash() {
        // git mktree with a single entry `100644 blob bd9dbf… greeting`
        let item = TreeItem::new(
            EntryMode::Blob,
            "greeting",
            ObjectId::from_str("bd9dbf5aae1a3862dd1526723246b20206e5fc37").unwrap(),
        );
        let tree = Tree::from_items(vec![item]).unwrap();
        assert_eq!(tree.id.to_hex(), "aaa79793412b23c2eb80776e20957f6ab21e68c1");
    }

    #[test]
    fn test_item_lookup() {
        let tree = Tree::from_items(vec![
            TreeItem::new(EntryMode::Blob, "a", blob_id(1)),
            TreeItem::new(EntryMode::Tree, "b", blob_id(2)),
        ])
        .unwrap();
        assert_eq!(tree.item("b").unwrap().id, blob_id(2));
        assert!(tree.item("missing").is_none());
    }
}
