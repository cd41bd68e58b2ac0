//! Image metadata log lines.
//!
//! ```text
//! ImageID: alice_3, Username: alice, Bio: sunset, Timestamp: 2024-03-01 18:02:11, Likes: 0
//! ```
//!
//! The caption is free text and may itself contain `, ` sequences, so the
//! decoder anchors on the *last* `, Timestamp: ` separator. Usernames can
//! never contain a comma, which keeps the leading fields unambiguous.

use chrono::NaiveDateTime;
use quack_types::{ImageRecord, Username, TIMESTAMP_FORMAT};

use crate::error::{CodecError, CodecResult};
use crate::lines::LineCodec;

const ID_PREFIX: &str = "ImageID: ";
const USERNAME_SEP: &str = ", Username: ";
const BIO_SEP: &str = ", Bio: ";
const TIMESTAMP_SEP: &str = ", Timestamp: ";
const LIKES_SEP: &str = ", Likes: ";

/// Codec for [`ImageRecord`] metadata lines.
pub struct ImageRecordCodec;

impl LineCodec for ImageRecordCodec {
    type Record = ImageRecord;

    fn encode(record: &ImageRecord) -> CodecResult<String> {
        if let Some(ch) = record.caption.chars().find(|c| matches!(c, '\n' | '\r')) {
            return Err(CodecError::ForbiddenCharacter { field: "Bio", ch });
        }
        Ok(format!(
            "{ID_PREFIX}{key}{USERNAME_SEP}{owner}{BIO_SEP}{caption}{TIMESTAMP_SEP}{ts}{LIKES_SEP}{likes}",
            key = record.key(),
            owner = record.owner,
            caption = record.caption,
            ts = record.timestamp.format(TIMESTAMP_FORMAT),
            likes = record.likes,
        ))
    }

    fn decode(line: &str) -> CodecResult<ImageRecord> {
        let rest = line
            .strip_prefix(ID_PREFIX)
            .ok_or(CodecError::MissingField("ImageID"))?;
        let (key, rest) = rest
            .split_once(USERNAME_SEP)
            .ok_or(CodecError::MissingField("Username"))?;
        let (owner, rest) = rest
            .split_once(BIO_SEP)
            .ok_or(CodecError::MissingField("Bio"))?;
        let (caption, rest) = rest
            .rsplit_once(TIMESTAMP_SEP)
            .ok_or(CodecError::MissingField("Timestamp"))?;
        let (timestamp, likes) = rest
            .split_once(LIKES_SEP)
            .ok_or(CodecError::MissingField("Likes"))?;

        let owner = Username::new(owner.trim())?;
        let id = parse_image_key(key.trim(), &owner)?;
        let timestamp = NaiveDateTime::parse_from_str(timestamp.trim(), TIMESTAMP_FORMAT)
            .map_err(|e| CodecError::InvalidField {
                field: "Timestamp",
                reason: e.to_string(),
            })?;
        let likes = likes
            .trim()
            .parse::<u32>()
            .map_err(|e| CodecError::InvalidField {
                field: "Likes",
                reason: e.to_string(),
            })?;

        Ok(ImageRecord {
            id,
            owner,
            caption: caption.to_string(),
            timestamp,
            likes,
        })
    }
}

/// Split an image key `<owner>_<id>` and check it belongs to `owner`.
fn parse_image_key(key: &str, owner: &Username) -> CodecResult<u64> {
    let invalid = |reason: String| CodecError::InvalidField {
        field: "ImageID",
        reason,
    };
    let id = key
        .strip_prefix(owner.as_str())
        .and_then(|rest| rest.strip_prefix('_'))
        .ok_or_else(|| invalid(format!("{key:?} is not an image of {owner}")))?;
    match id.parse::<u64>() {
        Ok(0) => Err(invalid("image ids start at 1".into())),
        Ok(id) => Ok(id),
        Err(e) => Err(invalid(format!("{id:?}: {e}"))),
    }
}
