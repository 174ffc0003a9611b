//! Shared text-decoding helpers.
//!
//! Object metadata (author names, commit messages, entry names) is stored as
//! raw bytes and is not guaranteed to be well-formed UTF-8. Human-facing
//! fields decode through a single substitution policy: invalid sequences are
//! replaced rather than failing the whole parse. Structural fields that must
//! be ASCII (hex identities, type tokens) use the strict variant instead.

use bstr::ByteSlice;

use crate::errors::OdbError;

/// Decode bytes as UTF-8, substituting U+FFFD for invalid sequences.
///
/// This is the one place the crate converts stored bytes into `String`s for
/// human-facing fields, so the substitution policy is applied uniformly.
pub fn decode_text(data: &[u8]) -> String {
    let (text, _, _) = encoding_rs::UTF_8.decode(data);
    text.into_owned()
}

/// Decode bytes that are required to be valid UTF-8, failing with
/// [`OdbError::Encoding`] otherwise. Used for structural fields where
/// substitution would silently corrupt the value.
pub fn decode_text_strict(data: &[u8]) -> Result<String, OdbError> {
    match data.to_str() {
        Ok(s) => Ok(s.to_string()),
        Err(_) => Err(OdbError::Encoding(format!(
            "expected UTF-8, got `{}`",
            data.as_bstr()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_text_valid_utf8() {
        assert_eq!(decode_text(b"hello"), "hello");
        assert_eq!(decode_text("שלום".as_bytes()), "שלום");
    }

    #[test]
    fn test_decode_text_substitutes_invalid_sequences() {
        let decoded = decode_text(b"abc\xff\xfedef");
        assert!(decoded.starts_with("abc"));
        assert!(decoded.ends_with("def"));
        assert!(decoded.contains('\u{FFFD}'));
    }

    #[test]
    fn test_decode_text_strict() {
        assert_eq!(decode_text_strict(b"tree").unwrap(), "tree");
        assert!(matches!(
            decode_text_strict(b"\xff\xfe"),
            Err(OdbError::Encoding(_))
        ));
    }
}
