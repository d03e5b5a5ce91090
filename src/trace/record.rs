//! Typed, time-indexed contents of a single trace file.

use super::DecodeErrorKind;
use super::tag::SensorTag;
use time::OffsetDateTime;

pub type Timestamp = i64;

#[derive(Debug, Clone, PartialEq)]
pub struct TimestampedValue<T> {
    pub timestamp: Timestamp,
    pub value: T,
}

impl<T> TimestampedValue<T> {
    pub fn new(timestamp: Timestamp, value: T) -> Self {
        Self { timestamp, value }
    }
}

/// Three-axis reading of a motion sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiSample {
    pub ssid: String,
    pub bssid: String,
    pub rssi: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeaconSample {
    /// `uuid_major_minor`
    pub id: String,
    pub rssi: i32,
}

/// Ground-truth position in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Positional fields of one data line, with errors tagged by sensor.
pub(crate) struct LineFields<'a> {
    tag: SensorTag,
    fields: &'a [&'a str],
}

impl<'a> LineFields<'a> {
    pub(crate) fn new(tag: SensorTag, fields: &'a [&'a str]) -> Self {
        Self { tag, fields }
    }

    fn text(&self, index: usize) -> Result<&'a str, DecodeErrorKind> {
        self.fields
            .get(index)
            .copied()
            .ok_or(DecodeErrorKind::MissingField {
                tag: self.tag,
                index,
            })
    }

    fn real(&self, index: usize) -> Result<f64, DecodeErrorKind> {
        let raw = self.text(index)?;
        raw.trim().parse().map_err(|_| DecodeErrorKind::InvalidNumber {
            tag: self.tag,
            value: raw.to_string(),
        })
    }

    fn integer(&self, index: usize) -> Result<i32, DecodeErrorKind> {
        let raw = self.text(index)?;
        raw.trim().parse().map_err(|_| DecodeErrorKind::InvalidNumber {
            tag: self.tag,
            value: raw.to_string(),
        })
    }
}

impl Vector3 {
    fn from_fields(fields: &LineFields<'_>) -> Result<Self, DecodeErrorKind> {
        Ok(Self {
            x: fields.real(2)?,
            y: fields.real(3)?,
            z: fields.real(4)?,
        })
    }
}

impl WifiSample {
    fn from_fields(fields: &LineFields<'_>) -> Result<Self, DecodeErrorKind> {
        Ok(Self {
            ssid: fields.text(2)?.to_string(),
            bssid: fields.text(3)?.to_string(),
            rssi: fields.integer(4)?,
        })
    }
}

impl BeaconSample {
    fn from_fields(fields: &LineFields<'_>) -> Result<Self, DecodeErrorKind> {
        let id = [fields.text(2)?, fields.text(3)?, fields.text(4)?].join("_");
        Ok(Self {
            id,
            rssi: fields.integer(6)?,
        })
    }
}

impl Position {
    // The coordinates are the two trailing fields; some recorders pad
    // between the tag and the position.
    fn from_fields(fields: &LineFields<'_>) -> Result<Self, DecodeErrorKind> {
        let len = fields.fields.len().max(4);
        Ok(Self {
            x: fields.real(len - 2)?,
            y: fields.real(len - 1)?,
        })
    }
}

/// Metadata key recognized on `#` lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HeaderField {
    StartTime,
    SiteId,
    SiteName,
    FloorId,
    FloorName,
}

impl HeaderField {
    pub(crate) fn from_key(key: &str) -> Option<Self> {
        match key {
            "startTime" => Some(Self::StartTime),
            "SiteID" => Some(Self::SiteId),
            "SiteName" => Some(Self::SiteName),
            "FloorId" => Some(Self::FloorId),
            "FloorName" => Some(Self::FloorName),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceHeader {
    pub start_time: Option<String>,
    pub site_id: Option<String>,
    pub site_name: Option<String>,
    pub floor_id: Option<String>,
    pub floor_name: Option<String>,
}

impl TraceHeader {
    pub(crate) fn set(&mut self, field: HeaderField, value: String) {
        let slot = match field {
            HeaderField::StartTime => &mut self.start_time,
            HeaderField::SiteId => &mut self.site_id,
            HeaderField::SiteName => &mut self.site_name,
            HeaderField::FloorId => &mut self.floor_id,
            HeaderField::FloorName => &mut self.floor_name,
        };
        *slot = Some(value);
    }

    /// `start_time` read as Unix epoch milliseconds.
    pub fn started_at(&self) -> Option<OffsetDateTime> {
        let millis: i128 = self.start_time.as_deref()?.trim().parse().ok()?;
        OffsetDateTime::from_unix_timestamp_nanos(millis.checked_mul(1_000_000)?).ok()
    }
}

/// One parsed trace file. Built once by the decoder, read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraceRecord {
    file_id: String,
    header: TraceHeader,
    acc_calib: Vec<TimestampedValue<Vector3>>,
    acc_uncalib: Vec<TimestampedValue<Vector3>>,
    mag_calib: Vec<TimestampedValue<Vector3>>,
    mag_uncalib: Vec<TimestampedValue<Vector3>>,
    gyro_calib: Vec<TimestampedValue<Vector3>>,
    gyro_uncalib: Vec<TimestampedValue<Vector3>>,
    rotation_vector: Vec<TimestampedValue<Vector3>>,
    wifi: Vec<TimestampedValue<WifiSample>>,
    beacon: Vec<TimestampedValue<BeaconSample>>,
    waypoint: Vec<TimestampedValue<Position>>,
}

impl TraceRecord {
    pub(crate) fn empty(file_id: &str) -> Self {
        Self {
            file_id: file_id.to_string(),
            ..Self::default()
        }
    }

    pub(crate) fn header_mut(&mut self) -> &mut TraceHeader {
        &mut self.header
    }

    /// Decode the tag-specific fields and append them to that tag's stream.
    pub(crate) fn append(
        &mut self,
        timestamp: Timestamp,
        fields: &LineFields<'_>,
    ) -> Result<(), DecodeErrorKind> {
        match fields.tag {
            SensorTag::AccCalib => self.acc_calib.push(TimestampedValue::new(
                timestamp,
                Vector3::from_fields(fields)?,
            )),
            SensorTag::AccUncalib => self.acc_uncalib.push(TimestampedValue::new(
                timestamp,
                Vector3::from_fields(fields)?,
            )),
            SensorTag::MagCalib => self.mag_calib.push(TimestampedValue::new(
                timestamp,
                Vector3::from_fields(fields)?,
            )),
            SensorTag::MagUncalib => self.mag_uncalib.push(TimestampedValue::new(
                timestamp,
                Vector3::from_fields(fields)?,
            )),
            SensorTag::GyroCalib => self.gyro_calib.push(TimestampedValue::new(
                timestamp,
                Vector3::from_fields(fields)?,
            )),
            SensorTag::GyroUncalib => self.gyro_uncalib.push(TimestampedValue::new(
                timestamp,
                Vector3::from_fields(fields)?,
            )),
            SensorTag::RotationVector => self.rotation_vector.push(TimestampedValue::new(
                timestamp,
                Vector3::from_fields(fields)?,
            )),
            SensorTag::Wifi => self.wifi.push(TimestampedValue::new(
                timestamp,
                WifiSample::from_fields(fields)?,
            )),
            SensorTag::Beacon => self.beacon.push(TimestampedValue::new(
                timestamp,
                BeaconSample::from_fields(fields)?,
            )),
            SensorTag::Waypoint => self.waypoint.push(TimestampedValue::new(
                timestamp,
                Position::from_fields(fields)?,
            )),
        }
        Ok(())
    }

    pub fn file_id(&self) -> &str {
        &self.file_id
    }

    pub fn header(&self) -> &TraceHeader {
        &self.header
    }

    /// Stream of a motion tag; `None` for WiFi, beacon and waypoint.
    pub fn motion(&self, tag: SensorTag) -> Option<&[TimestampedValue<Vector3>]> {
        let stream = match tag {
            SensorTag::AccCalib => &self.acc_calib,
            SensorTag::AccUncalib => &self.acc_uncalib,
            SensorTag::MagCalib => &self.mag_calib,
            SensorTag::MagUncalib => &self.mag_uncalib,
            SensorTag::GyroCalib => &self.gyro_calib,
            SensorTag::GyroUncalib => &self.gyro_uncalib,
            SensorTag::RotationVector => &self.rotation_vector,
            SensorTag::Wifi | SensorTag::Beacon | SensorTag::Waypoint => return None,
        };
        Some(stream)
    }

    pub fn acc_calib(&self) -> &[TimestampedValue<Vector3>] {
        &self.acc_calib
    }

    pub fn acc_uncalib(&self) -> &[TimestampedValue<Vector3>] {
        &self.acc_uncalib
    }

    pub fn mag_calib(&self) -> &[TimestampedValue<Vector3>] {
        &self.mag_calib
    }

    pub fn mag_uncalib(&self) -> &[TimestampedValue<Vector3>] {
        &self.mag_uncalib
    }

    pub fn gyro_calib(&self) -> &[TimestampedValue<Vector3>] {
        &self.gyro_calib
    }

    pub fn gyro_uncalib(&self) -> &[TimestampedValue<Vector3>] {
        &self.gyro_uncalib
    }

    pub fn rotation_vector(&self) -> &[TimestampedValue<Vector3>] {
        &self.rotation_vector
    }

    pub fn wifi(&self) -> &[TimestampedValue<WifiSample>] {
        &self.wifi
    }

    pub fn beacon(&self) -> &[TimestampedValue<BeaconSample>] {
        &self.beacon
    }

    pub fn waypoint(&self) -> &[TimestampedValue<Position>] {
        &self.waypoint
    }

    /// Training traces carry ground-truth waypoints, testing traces do not.
    pub fn is_training(&self) -> bool {
        !self.waypoint.is_empty()
    }

    /// Timestamps of one stream in file order.
    pub fn timestamps(&self, tag: SensorTag) -> Vec<Timestamp> {
        fn stamps<T>(stream: &[TimestampedValue<T>]) -> Vec<Timestamp> {
            stream.iter().map(|sample| sample.timestamp).collect()
        }
        match tag {
            SensorTag::Wifi => stamps(&self.wifi),
            SensorTag::Beacon => stamps(&self.beacon),
            SensorTag::Waypoint => stamps(&self.waypoint),
            motion => self.motion(motion).map(stamps).unwrap_or_default(),
        }
    }

    pub fn stream_len(&self, tag: SensorTag) -> usize {
        match tag {
            SensorTag::Wifi => self.wifi.len(),
            SensorTag::Beacon => self.beacon.len(),
            SensorTag::Waypoint => self.waypoint.len(),
            motion => self.motion(motion).map_or(0, <[_]>::len),
        }
    }

    /// Euclidean norm of every accelerometer sample, single precision.
    pub fn acceleration_magnitude(&self, calibrated: bool) -> Vec<f32> {
        let stream = if calibrated {
            &self.acc_calib
        } else {
            &self.acc_uncalib
        };
        stream
            .iter()
            .map(|sample| sample.value.magnitude() as f32)
            .collect()
    }
}

/// Consecutive differences of a timestamp sequence.
///
/// Widened to `i128` so that any pair of `i64` timestamps has an exact difference.
pub fn timestamp_deltas(timestamps: &[Timestamp]) -> Vec<i128> {
    timestamps
        .windows(2)
        .map(|pair| i128::from(pair[1]) - i128::from(pair[0]))
        .collect()
}
