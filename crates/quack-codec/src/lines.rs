//! The [`LineCodec`] trait and multi-line decoding.

use quack_types::ParseWarning;
use tracing::warn;

use crate::error::CodecResult;

/// A codec for one line-oriented record format.
///
/// `encode` never emits a line terminator; `decode` receives a single line
/// without one.
pub trait LineCodec {
    type Record;

    fn encode(record: &Self::Record) -> CodecResult<String>;

    fn decode(line: &str) -> CodecResult<Self::Record>;
}

/// Records decoded from a file, with the warnings for skipped lines.
#[derive(Debug)]
pub struct Decoded<R> {
    /// `(line_number, record)` pairs, 1-based, in file order.
    pub records: Vec<(usize, R)>,
    pub warnings: Vec<ParseWarning>,
}

/// Decode every non-blank line of `text`.
///
/// Malformed lines are logged and reported as [`ParseWarning`]s; decoding
/// continues with the next line.
pub fn decode_lines<C: LineCodec>(text: &str) -> Decoded<C::Record> {
    let mut records = Vec::new();
    let mut warnings = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line_number = idx + 1;
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        if line.trim().is_empty() {
            continue;
        }
        match C::decode(line) {
            Ok(record) => records.push((line_number, record)),
            Err(e) => {
                warn!(line_number, error = %e, "skipping malformed line");
                warnings.push(ParseWarning::new(line_number, line, e));
            }
        }
    }

    Decoded { records, warnings }
}
