use std::fmt;

/// Sensor a data line describes, selected by field[1] of the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SensorTag {
    AccCalib,
    AccUncalib,
    MagCalib,
    MagUncalib,
    GyroCalib,
    GyroUncalib,
    RotationVector,
    Wifi,
    Beacon,
    Waypoint,
}

impl SensorTag {
    pub const ALL: [SensorTag; 10] = [
        SensorTag::AccCalib,
        SensorTag::AccUncalib,
        SensorTag::MagCalib,
        SensorTag::MagUncalib,
        SensorTag::GyroCalib,
        SensorTag::GyroUncalib,
        SensorTag::RotationVector,
        SensorTag::Wifi,
        SensorTag::Beacon,
        SensorTag::Waypoint,
    ];

    /// Tag string as written in the log.
    pub fn log_name(self) -> &'static str {
        match self {
            SensorTag::AccCalib => "TYPE_ACCELEROMETER",
            SensorTag::AccUncalib => "TYPE_ACCELEROMETER_UNCALIBRATED",
            SensorTag::MagCalib => "TYPE_MAGNETIC_FIELD",
            SensorTag::MagUncalib => "TYPE_MAGNETIC_FIELD_UNCALIBRATED",
            SensorTag::GyroCalib => "TYPE_GYROSCOPE",
            SensorTag::GyroUncalib => "TYPE_GYROSCOPE_UNCALIBRATED",
            SensorTag::RotationVector => "TYPE_ROTATION_VECTOR",
            SensorTag::Wifi => "TYPE_WIFI",
            SensorTag::Beacon => "TYPE_BEACON",
            SensorTag::Waypoint => "TYPE_WAYPOINT",
        }
    }

    pub fn from_log_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.log_name() == name)
    }

    /// True for the tags carrying an (x, y, z) vector.
    pub fn is_motion(self) -> bool {
        !matches!(
            self,
            SensorTag::Wifi | SensorTag::Beacon | SensorTag::Waypoint
        )
    }
}

impl fmt::Display for SensorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.log_name())
    }
}
