//! Author, committer and tagger identity lines.
//!
//! Commits and tags attribute work with a signature line of the form
//! `author Name <email> 1699000000 +0800`. The leading keyword names the
//! role, the timestamp is seconds since the epoch and the trailing field is
//! the timezone offset. Name and email are stored bytes and decode through
//! the crate's substitution policy; the structure around them is strict.

use std::fmt::Display;

use bstr::ByteSlice;
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::OdbError;
use crate::utils::decode_text;

/// The role a signature plays in the object that carries it.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureKind {
    Author,
    Committer,
    Tagger,
}

impl SignatureKind {
    pub const fn keyword(&self) -> &'static str {
        match self {
            SignatureKind::Author => "author",
            SignatureKind::Committer => "committer",
            SignatureKind::Tagger => "tagger",
        }
    }

    fn from_keyword(word: &[u8]) -> Result<SignatureKind, OdbError> {
        match word {
            b"author" => Ok(SignatureKind::Author),
            b"committer" => Ok(SignatureKind::Committer),
            b"tagger" => Ok(SignatureKind::Tagger),
            _ => Err(OdbError::InvalidSignature(
                String::from_utf8_lossy(word).into_owned(),
            )),
        }
    }
}

/// A parsed signature line: who, when, and in which role.
#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
pub struct Signature {
    pub kind: SignatureKind,
    pub name: String,
    pub email: String,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    /// Offset in `+HHMM` / `-HHMM` form, kept verbatim for re-serialization.
    pub timezone: String,
}

impl Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} <{}> {} {}",
            self.name, self.email, self.timestamp, self.timezone
        )
    }
}

impl Signature {
    /// Build a signature stamped with the current time in UTC.
    pub fn now(kind: SignatureKind, name: &str, email: &str) -> Signature {
        Signature {
            kind,
            name: name.to_string(),
            email: email.to_string(),
            timestamp: Utc::now().timestamp(),
            timezone: "+0000".to_string(),
        }
    }

    /// Parse one signature line, keyword included, without the trailing
    /// newline.
    pub fn from_data(data: &[u8]) -> Result<Signature, OdbError> {
        let line = data.as_bstr();
        let invalid = || OdbError::InvalidSignature(line.to_string());

        let space = data.find_byte(b' ').ok_or_else(invalid)?;
        let kind = SignatureKind::from_keyword(&data[..space])?;
        let rest = &data[space + 1..];

        // `Name <email> ts tz`; the name may itself contain spaces.
        let email_open = rest.find_byte(b'<').ok_or_else(invalid)?;
        let email_close = rest.find_byte(b'>').ok_or_else(invalid)?;
        if email_close < email_open {
            return Err(invalid());
        }
        let name = decode_text(rest[..email_open].trim());
        let email = decode_text(&rest[email_open + 1..email_close]);

        let mut tail = rest[email_close + 1..].trim().splitn_str(2, b" ");
        let ts_bytes = tail.next().ok_or_else(invalid)?;
        let tz_bytes = tail.next().ok_or_else(invalid)?;
        let timestamp: i64 = ts_bytes
            .to_str()
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(invalid)?;
        let timezone = tz_bytes
            .to_str()
            .map_err(|_| invalid())?
            .trim()
            .to_string();

        Ok(Signature {
            kind,
            name,
            email,
            timestamp,
            timezone,
        })
    }

    /// Serialize back to the canonical line, keyword included.
    pub fn to_data(&self) -> Result<Vec<u8>, OdbError> {
        let mut data = Vec::new();
        data.extend(self.kind.keyword().as_bytes());
        data.push(b' ');
        data.extend(self.name.as_bytes());
        data.extend(b" <");
        data.extend(self.email.as_bytes());
        data.extend(b"> ");
        data.extend(self.timestamp.to_string().as_bytes());
        data.push(b' ');
        data.extend(self.timezone.as_bytes());
        Ok(data)
    }

    /// The signature time as a timezone-aware instant. Falls back to UTC if
    /// the recorded offset is unparseable, and to the epoch if the timestamp
    /// is out of chrono's range.
    pub fn when(&self) -> DateTime<FixedOffset> {
        let utc = FixedOffset::east_opt(0).expect("zero offset is always valid");
        let offset = parse_offset(&self.timezone).unwrap_or(utc);
        offset
            .timestamp_opt(self.timestamp, 0)
            .single()
            .unwrap_or_else(|| DateTime::<FixedOffset>::from(DateTime::UNIX_EPOCH))
    }
}

fn parse_offset(tz: &str) -> Option<FixedOffset> {
    let bytes = tz.as_bytes();
    if bytes.len() != 5 {
        return None;
    }
    let sign: i32 = match bytes[0] {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let hours: i32 = tz[1..3].parse().ok()?;
    let minutes: i32 = tz[3..5].parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
