//! Credential lines: `<username>:<passwordHash>:<bio>`.
//!
//! The bio is the remainder of the line after the second `:`, so it may
//! contain colons. It may also be empty.

use quack_types::{CredentialEntry, Username};

use crate::error::{CodecError, CodecResult};
use crate::lines::LineCodec;

/// Codec for [`CredentialEntry`] lines.
pub struct CredentialCodec;

impl LineCodec for CredentialCodec {
    type Record = CredentialEntry;

    fn encode(record: &CredentialEntry) -> CodecResult<String> {
        if record.password_hash.is_empty() {
            return Err(CodecError::MissingField("passwordHash"));
        }
        if let Some(ch) = record
            .password_hash
            .chars()
            .find(|c| matches!(c, ':' | '\n' | '\r'))
        {
            return Err(CodecError::ForbiddenCharacter {
                field: "passwordHash",
                ch,
            });
        }
        if let Some(ch) = record.bio.chars().find(|c| matches!(c, '\n' | '\r')) {
            return Err(CodecError::ForbiddenCharacter { field: "bio", ch });
        }
        Ok(format!(
            "{}:{}:{}",
            record.username, record.password_hash, record.bio
        ))
    }

    fn decode(line: &str) -> CodecResult<CredentialEntry> {
        let mut parts = line.splitn(3, ':');
        let username = parts.next().ok_or(CodecError::MissingField("username"))?;
        let password_hash = parts
            .next()
            .ok_or(CodecError::MissingField("passwordHash"))?;
        let bio = parts.next().ok_or(CodecError::MissingField("bio"))?;

        if password_hash.is_empty() {
            return Err(CodecError::InvalidField {
                field: "passwordHash",
                reason: "empty".into(),
            });
        }

        Ok(CredentialEntry {
            username: Username::new(username)?,
            password_hash: password_hash.to_string(),
            bio: bio.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_entry() {
        let e = CredentialCodec::decode("alice:5f4dcc3b:Loves ponds").unwrap();
        assert_eq!(e.username, "alice");
        assert_eq!(e.password_hash, "5f4dcc3b");
        assert_eq!(e.bio, "Loves ponds");
    }

    #[test]
    fn bio_keeps_colons_and_may_be_empty() {
        let e = CredentialCodec::decode("bob:h:time: 5pm: pond").unwrap();
        assert_eq!(e.bio, "time: 5pm: pond");

        let e = CredentialCodec::decode("carol:h:").unwrap();
        assert_eq!(e.bio, "");
    }

    #[test]
    fn missing_fields_fail_closed() {
        assert_eq!(
            CredentialCodec::decode("alice").unwrap_err(),
            CodecError::MissingField("passwordHash")
        );
        assert_eq!(
            CredentialCodec::decode("alice:hash").unwrap_err(),
            CodecError::MissingField("bio")
        );
        assert!(matches!(
            CredentialCodec::decode("alice::bio").unwrap_err(),
            CodecError::InvalidField { field: "passwordHash", .. }
        ));
        assert!(matches!(
            CredentialCodec::decode(":hash:bio").unwrap_err(),
            CodecError::Username(_)
        ));
    }

    #[test]
    fn encode_rejects_separator_in_hash() {
        let entry = CredentialEntry {
            username: Username::new("alice").unwrap(),
            password_hash: "a:b".into(),
            bio: String::new(),
        };
        assert_eq!(
            CredentialCodec::encode(&entry).unwrap_err(),
            CodecError::ForbiddenCharacter { field: "passwordHash", ch: ':' }
        );
    }

    #[test]
    fn encode_then_decode() {
        let entry = CredentialEntry {
            username: Username::new("dave").unwrap(),
            password_hash: "abc123".into(),
            bio: "quack: quack".into(),
        };
        let line = CredentialCodec::encode(&entry).unwrap();
        assert_eq!(line, "dave:abc123:quack: quack");
        assert_eq!(CredentialCodec::decode(&line).unwrap(), entry);
    }
}
