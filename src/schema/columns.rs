//! Column names and schema declarations for sensor and prediction logs.

use serde::{Deserialize, Serialize};

/// Header of the millisecond timestamp column.
pub const TIMESTAMP: &str = "Timestamp(ms)";
pub const ACCEL_X: &str = "AccelX(g)";
pub const ACCEL_Y: &str = "AccelY(g)";
pub const ACCEL_Z: &str = "AccelZ(g)";
pub const GYRO_X: &str = "GyroX(deg/s)";
pub const GYRO_Y: &str = "GyroY(deg/s)";
pub const GYRO_Z: &str = "GyroZ(deg/s)";
/// Single ultrasonic sensor.
pub const DISTANCE: &str = "Distance(cm)";
pub const DISTANCE_LEFT: &str = "DistanceLeft(cm)";
pub const DISTANCE_RIGHT: &str = "DistanceRight(cm)";

/// Semantic channel a column feeds into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Time,
    AccelX,
    AccelY,
    AccelZ,
    GyroX,
    GyroY,
    GyroZ,
    Distance,
    DistanceLeft,
    DistanceRight,
}

impl Channel {
    /// Whether the channel carries an ultrasonic distance reading.
    pub fn is_distance(self) -> bool {
        matches!(
            self,
            Channel::Distance | Channel::DistanceLeft | Channel::DistanceRight
        )
    }
}

/// One declared column of a [`ColumnSchema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub channel: Channel,
    /// Exact header text the column is matched by
    pub header: String,
    /// Whether absence of the column rejects the whole file
    pub required: bool,
}

impl ColumnSpec {
    pub fn required(channel: Channel, header: impl Into<String>) -> Self {
        Self {
            channel,
            header: header.into(),
            required: true,
        }
    }

    pub fn optional(channel: Channel, header: impl Into<String>) -> Self {
        Self {
            channel,
            header: header.into(),
            required: false,
        }
    }
}

/// Ordered set of columns expected in a motion/distance log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    columns: Vec<ColumnSpec>,
}

impl ColumnSchema {
    /// Build a schema from column specs, in declaration order.
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        Self { columns }
    }

    /// Timestamp, accelerometer and gyroscope columns shared by every variant.
    pub fn motion_columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::required(Channel::Time, TIMESTAMP),
            ColumnSpec::required(Channel::AccelX, ACCEL_X),
            ColumnSpec::required(Channel::AccelY, ACCEL_Y),
            ColumnSpec::required(Channel::AccelZ, ACCEL_Z),
            ColumnSpec::required(Channel::GyroX, GYRO_X),
            ColumnSpec::required(Channel::GyroY, GYRO_Y),
            ColumnSpec::required(Channel::GyroZ, GYRO_Z),
        ]
    }

    /// Motion columns plus a single distance channel.
    pub fn single_sensor() -> Self {
        let mut columns = Self::motion_columns();
        columns.push(ColumnSpec::required(Channel::Distance, DISTANCE));
        Self::new(columns)
    }

    /// Motion columns plus left/right distance channels.
    pub fn dual_sensor() -> Self {
        let mut columns = Self::motion_columns();
        columns.push(ColumnSpec::required(Channel::DistanceLeft, DISTANCE_LEFT));
        columns.push(ColumnSpec::required(Channel::DistanceRight, DISTANCE_RIGHT));
        Self::new(columns)
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Look up the spec declared for a channel.
    pub fn spec(&self, channel: Channel) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.channel == channel)
    }

    /// Header names of all required columns, in declaration order.
    pub fn required_headers(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.required)
            .map(|c| c.header.as_str())
            .collect()
    }

    /// Whether the schema declares a left/right distance pair.
    pub fn is_dual_distance(&self) -> bool {
        self.spec(Channel::DistanceLeft).is_some() || self.spec(Channel::DistanceRight).is_some()
    }

    /// Comma-joined header row in declaration order.
    pub fn header_line(&self) -> String {
        self.columns
            .iter()
            .map(|c| c.header.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Columns expected in a separately logged prediction file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionSchema {
    /// Header of the time column
    pub time_header: String,
    /// Class names, which double as the probability column headers
    pub classes: Vec<String>,
}

impl PredictionSchema {
    pub fn new<S: Into<String>>(classes: impl IntoIterator<Item = S>) -> Self {
        Self {
            time_header: TIMESTAMP.to_string(),
            classes: classes.into_iter().map(Into::into).collect(),
        }
    }

    /// Shaking / posture / fall / normal.
    pub fn set_a() -> Self {
        Self::new(["Shaking", "Posture", "Fall", "Normal"])
    }

    /// Normal / tremor / tonic / postural.
    pub fn set_b() -> Self {
        Self::new(["Normal", "Tremor", "Tonic", "Postural"])
    }

    /// All headers the prediction file must carry.
    pub fn required_headers(&self) -> Vec<&str> {
        std::iter::once(self.time_header.as_str())
            .chain(self.classes.iter().map(String::as_str))
            .collect()
    }
}
