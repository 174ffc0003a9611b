//! The Tag object is an annotated tag: a stored object in its own right that
//! names a target object, records who created the tag and when, and carries
//! a message. It is distinct from a lightweight tag, which is merely a named
//! reference and never appears in the object store.

use std::fmt::Display;

use bstr::ByteSlice;
use serde::{Deserialize, Serialize};

use crate::errors::OdbError;
use crate::hash::ObjectId;
use crate::internal::object::ObjectTrait;
use crate::internal::object::signature::Signature;
use crate::internal::object::types::ObjectType;
use crate::utils::{decode_text, decode_text_strict};

/// A parsed annotated-tag record.
///
/// `target_type` is recorded in the payload, so resolving the target into a
/// typed handle needs no extra store access for the kind. Annotated tags
/// usually point at commits but may target any object kind.
#[derive(Eq, Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: ObjectId,
    pub target_id: ObjectId,
    pub target_type: ObjectType,
    pub tag_name: String,
    pub tagger: Signature,
    pub message: String,
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "object {}", self.target_id)?;
        writeln!(f, "type {}", self.target_type)?;
        writeln!(f, "tag {}", self.tag_name)?;
        writeln!(f, "tagger {}", self.tagger)?;
        writeln!(f, "{}", self.message)
    }
}

impl Tag {
    /// Build a tag from its parts, computing the canonical identity.
    pub fn new(
        target_id: ObjectId,
        target_type: ObjectType,
        tag_name: &str,
        tagger: Signature,
        message: &str,
    ) -> Result<Tag, OdbError> {
        let mut tag = Tag {
            id: ObjectId::ZERO,
            target_id,
            target_type,
            tag_name: tag_name.to_string(),
            tagger,
            message: message.to_string(),
        };
        tag.id = ObjectId::from_kind_and_data(ObjectType::Tag, &tag.to_data()?);
        Ok(tag)
    }
}

/// Split one `<keyword> <value>` header line off the front of `data`,
/// checking the keyword.
fn header_line<'a>(data: &'a [u8], keyword: &[u8]) -> Result<(&'a [u8], &'a [u8]), OdbError> {
    let line_end = data.find_byte(b'\n').ok_or_else(|| {
        OdbError::InvalidTag(format!(
            "missing `{}` line",
            String::from_utf8_lossy(keyword)
        ))
    })?;
    let line = &data[..line_end];
    let value = line
        .strip_prefix(keyword)
        .and_then(|rest| rest.strip_prefix(b" "))
        .ok_or_else(|| {
            OdbError::InvalidTag(format!(
                "expected a `{}` line, got `{}`",
                String::from_utf8_lossy(keyword),
                line.as_bstr()
            ))
        })?;
    Ok((value, &data[line_end + 1..]))
}

impl ObjectTrait for Tag {
    fn from_bytes(data: &[u8], id: ObjectId) -> Result<Self, OdbError> {
        let (target_hex, rest) = header_line(data, b"object")?;
        let target_id = ObjectId::from_hex(&decode_text_strict(target_hex)?)?;

        let (type_token, rest) = header_line(rest, b"type")?;
        let target_type = ObjectType::from_bytes(type_token)?;

        let (name, rest) = header_line(rest, b"tag")?;
        let tag_name = decode_text(name);

        let tagger_end = rest
            .find_byte(b'\n')
            .ok_or_else(|| OdbError::InvalidTag("missing tagger line".to_string()))?;
        let tagger = Signature::from_data(&rest[..tagger_end])?;
        let rest = &rest[tagger_end + 1..];

        // A blank line separates headers from the message.
        let message = decode_text(rest.strip_prefix(b"\n").unwrap_or(rest));

        Ok(Tag {
            id,
            target_id,
            target_type,
            tag_name,
            tagger,
            message,
        })
    }

    fn get_type(&self) -> ObjectType {
        ObjectType::Tag
    }

    fn to_data(&self) -> Result<Vec<u8>, OdbError> {
        let mut data = Vec::new();

        data.extend(b"object ");
        data.extend(self.target_id.to_hex().as_bytes());
        data.push(b'\n');

        data.extend(b"type ");
        data.extend(self.target_type.to_bytes());
        data.push(b'\n');

        data.extend(b"tag ");
        data.extend(self.tag_name.as_bytes());
        data.push(b'\n');

        data.extend(self.tagger.to_data()?);
        data.push(b'\n');

        data.push(b'\n');
        data.extend(self.message.as_bytes());

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn raw_tag() -> &'static [u8] {
        b"object 57d7685c60213a9da465cf900f31933be3a7ee39\n\
          type commit\n\
          tag v1.2.0\n\
          tagger release-bot <bot@example.com> 1700000000 +0000\n\
          \n\
          release 1.2.0\n"
    }

    #[test]
    fn test_parse_annotated_tag() {
        let id = ObjectId::from_kind_and_data(ObjectType::Tag, raw_tag());
        let tag = Tag::from_bytes(raw_tag(), id).unwrap();
        assert_eq!(
            tag.target_id,
            ObjectId::from_str("57d7685c60213a9da465cf900f31933be3a7ee39").unwrap()
        );
        assert_eq!(tag.target_type, ObjectType::Commit);
        assert_eq!(tag.tag_name, "v1.2.0");
        assert_eq!(tag.tagger.name, "release-bot");
        assert_eq!(tag.message, "release 1.2.0\n");
    }

    #[test]
    fn test_round_trip() {
        let id = ObjectId::from_kind_and_data(ObjectType::Tag, raw_tag());
        let tag = Tag::from_bytes(raw_tag(), id).unwrap();
        assert_eq!(tag.to_data().unwrap(), raw_tag().to_vec());
        assert_eq!(tag.object_id().unwrap(), id);
    }

    #[test]
    fn test_constructor_hashes_canonically() {
        let tagger =
            Signature::from_data(b"tagger release-bot <bot@example.com> 1700000000 +0000").unwrap();
        let tag = Tag::new(
            ObjectId::from_str("57d7685c60213a9da465cf900f31933be3a7ee39").unwrap(),
            ObjectType::Commit,
            "v1.2.0",
            tagger,
            "release 1.2.0\n",
        )
        .unwrap();
        assert_eq!(tag.id, ObjectId::from_kind_and_data(ObjectType::Tag, raw_tag()));
    }

    #[test]
    fn test_malformed_payloads() {
        assert!(matches!(
            Tag::from_bytes(b"tree 1234\n", ObjectId::ZERO),
            Err(OdbError::InvalidTag(_))
        ));
        // unknown target type token surfaces as a dispatch miss
        let raw = b"object 57d7685c60213a9da465cf900f31933be3a7ee39\n\
                    type Commit\n\
                    tag v1\n\
                    tagger t <t@t.t> 1 +0000\n\n";
        assert!(matches!(
            Tag::from_bytes(raw, ObjectId::ZERO),
            Err(OdbError::UnknownObjectType(_))
        ));
    }
}
