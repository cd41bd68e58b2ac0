//! Follow graph lines: `<follower>:<followee1>;<followee2>;...`.

use quack_types::Username;

use crate::error::{CodecError, CodecResult};
use crate::lines::LineCodec;

/// One decoded follow line.
///
/// The codec keeps the followee list as written (order and duplicates
/// included); deduplication and self-edge filtering belong to the graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FollowLine {
    pub follower: Username,
    pub followees: Vec<Username>,
}

/// Codec for [`FollowLine`]s.
pub struct FollowLineCodec;

impl LineCodec for FollowLineCodec {
    type Record = FollowLine;

    fn encode(record: &FollowLine) -> CodecResult<String> {
        let followees: Vec<&str> = record.followees.iter().map(Username::as_str).collect();
        Ok(format!("{}:{}", record.follower, followees.join(";")))
    }

    fn decode(line: &str) -> CodecResult<FollowLine> {
        let (follower, followees) = line
            .split_once(':')
            .ok_or(CodecError::MissingField("follower"))?;
        if followees.contains(':') {
            return Err(CodecError::InvalidField {
                field: "followees",
                reason: "more than one ':' separator".into(),
            });
        }

        let follower = Username::new(follower.trim())?;
        let followees = followees
            .split(';')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(Username::new)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FollowLine {
            follower,
            followees,
        })
    }
}
