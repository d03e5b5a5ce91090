//! Decoder for tab-separated indoor sensor trace logs.
//!
//! A trace file mixes `#` metadata lines (`Key:Value` subsections) with data
//! lines of the form `timestamp<TAB>TAG<TAB>field...`. Every data line must
//! carry a recognized tag; an unknown tag stops decoding of that file.

use thiserror::Error;
use tracing::debug;

pub mod record;
pub mod tag;

pub use record::{
    BeaconSample, Position, TimestampedValue, Timestamp, TraceHeader, TraceRecord, Vector3,
    WifiSample, timestamp_deltas,
};
pub use tag::SensorTag;

use record::{HeaderField, LineFields};

pub const METADATA_MARKER: char = '#';
const FIELD_DELIMITER: char = '\t';
const KEY_DELIMITER: char = ':';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeErrorKind {
    #[error("empty line")]
    EmptyLine,
    #[error("missing sensor tag")]
    MissingSensorTag,
    #[error("unknown sensor tag {0:?}")]
    UnknownSensorTag(String),
    #[error("invalid timestamp {0:?}")]
    InvalidTimestamp(String),
    #[error("{tag} line is missing field {index}")]
    MissingField { tag: SensorTag, index: usize },
    #[error("{tag} line has invalid number {value:?}")]
    InvalidNumber { tag: SensorTag, value: String },
}

/// Decoding failure localized to a file and 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{file_id}:{line}: {kind}")]
pub struct DecodeError {
    pub file_id: String,
    pub line: usize,
    pub kind: DecodeErrorKind,
}

impl DecodeError {
    /// The offending tag when decoding stopped on an unrecognized sensor.
    pub fn unknown_tag(&self) -> Option<&str> {
        match &self.kind {
            DecodeErrorKind::UnknownSensorTag(tag) => Some(tag),
            _ => None,
        }
    }
}

/// Decode a whole trace file held in memory.
pub fn decode_str(text: &str, file_id: &str) -> Result<TraceRecord, DecodeError> {
    decode(text.lines(), file_id)
}

/// Decode trace log lines, in file order, into a [`TraceRecord`].
///
/// Header fields that never appear stay `None`; streams whose tag never
/// appears stay empty.
pub fn decode<'a, I>(lines: I, file_id: &str) -> Result<TraceRecord, DecodeError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut record = TraceRecord::empty(file_id);
    let mut line_count = 0;

    for (index, raw) in lines.into_iter().enumerate() {
        let line = raw.trim_end_matches(['\r', '\n']);
        let result = if line.starts_with(METADATA_MARKER) {
            decode_metadata(line, record.header_mut());
            Ok(())
        } else {
            decode_data(line, &mut record)
        };
        result.map_err(|kind| DecodeError {
            file_id: file_id.to_string(),
            line: index + 1,
            kind,
        })?;
        line_count = index + 1;
    }

    debug!(
        file_id,
        lines = line_count,
        waypoints = record.waypoint().len(),
        wifi = record.wifi().len(),
        "Trace decoded"
    );
    Ok(record)
}

fn decode_metadata(line: &str, header: &mut TraceHeader) {
    for subsection in line.split(FIELD_DELIMITER) {
        let mut parts = subsection.split(KEY_DELIMITER);
        let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
            continue;
        };
        if let Some(field) = HeaderField::from_key(key) {
            header.set(field, value.trim_end().to_string());
        }
    }
}

fn decode_data(line: &str, record: &mut TraceRecord) -> Result<(), DecodeErrorKind> {
    if line.is_empty() {
        return Err(DecodeErrorKind::EmptyLine);
    }
    let fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();
    let tag_name = fields.get(1).ok_or(DecodeErrorKind::MissingSensorTag)?;
    let tag = SensorTag::from_log_name(tag_name)
        .ok_or_else(|| DecodeErrorKind::UnknownSensorTag(tag_name.to_string()))?;
    let timestamp = fields[0]
        .trim()
        .parse()
        .map_err(|_| DecodeErrorKind::InvalidTimestamp(fields[0].to_string()))?;
    record.append(timestamp, &LineFields::new(tag, &fields))
}
