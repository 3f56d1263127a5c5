//! Row decoding and normalization.
//!
//! Data rows are every record after the header. A row with fewer fields than
//! the header, or without a readable timestamp, is skipped without error.
//! Timestamps are integer milliseconds and become seconds since the first
//! decoded row. Numeric fields are read up to the first character that cannot
//! continue a number; a field with no numeric prefix becomes `NaN` rather than
//! failing the file.

use crate::core::parser::ParseError;
use crate::core::resolver::{find_column, log_reader, read_header, resolve_columns, ColumnMap};
use crate::core::series::{Axes, ClassSeries, DistanceSeries, NormalizedSeries, PredictionSeries};
use crate::schema::columns::TIMESTAMP;
use crate::schema::{Channel, ColumnSchema, MissingValuePolicy, PredictionSchema};
use csv::StringRecord;

/// Parse the leading integer of a field, ignoring surrounding whitespace.
///
/// `"1500"` and `"1500.9"` both give 1500; a field with no leading digits
/// gives `None`.
pub fn parse_timestamp_ms(field: &str) -> Option<i64> {
    let field = field.trim();
    let digits_start = usize::from(field.starts_with(['-', '+']));
    let digits_end = field[digits_start..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(field.len(), |pos| pos + digits_start);

    if digits_end == digits_start {
        return None;
    }
    field[..digits_end].parse().ok()
}

/// Parse the longest numeric prefix of a reading.
///
/// `"0.5g"` gives 0.5 and `"1e3Hz"` gives 1000; a field that does not start
/// with a number gives `NaN`.
pub fn parse_reading(field: &str) -> f64 {
    let field = field.trim();
    let bytes = field.as_bytes();
    let digits = |from: usize| {
        bytes[from.min(bytes.len())..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let mut end = usize::from(field.starts_with(['-', '+']));
    if field[end..].starts_with("Infinity") {
        return field[..end + "Infinity".len()].parse().unwrap_or(f64::NAN);
    }

    let int_digits = digits(end);
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digits(end + 1);
        if int_digits + frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return f64::NAN;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exp_digits = digits(end + 1 + sign);
        if exp_digits > 0 {
            end += 1 + sign + exp_digits;
        }
    }
    field[..end].parse().unwrap_or(f64::NAN)
}

/// Seconds between `timestamp` and `origin`, rounded to two decimals.
pub fn elapsed_secs(timestamp: i64, origin: i64) -> f64 {
    let millis = i128::from(timestamp) - i128::from(origin);
    let secs = millis as f64 / 1000.0;
    (secs * 100.0).round() / 100.0
}

/// Time axis relative to the first pushed timestamp.
#[derive(Debug, Default)]
struct TimeAxis {
    origin: Option<i64>,
    last: Option<i64>,
    values: Vec<f64>,
    regressions: usize,
}

impl TimeAxis {
    fn push(&mut self, timestamp: i64) {
        let origin = *self.origin.get_or_insert(timestamp);
        if self.last.is_some_and(|last| timestamp < last) {
            self.regressions += 1;
        }
        self.last = Some(timestamp);
        self.values.push(elapsed_secs(timestamp, origin));
    }

    fn finish(self) -> Vec<f64> {
        if self.regressions > 0 {
            tracing::warn!(
                regressions = self.regressions,
                "Timestamps go backwards; time axis is not monotonic"
            );
        }
        self.values
    }
}

/// Records after the header that carry at least `width` fields and a readable timestamp.
fn data_rows(
    text: &str,
    width: usize,
    time_index: usize,
) -> impl Iterator<Item = (i64, StringRecord)> + '_ {
    log_reader(text)
        .into_records()
        .skip(1)
        .filter_map(move |result| {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    tracing::trace!("Skipping unreadable row: {}", e);
                    return None;
                }
            };
            let line = record.position().map_or(0, |p| p.line());
            if record.len() < width {
                tracing::trace!(line, fields = record.len(), width, "Skipping short row");
                return None;
            }
            match record.get(time_index).and_then(parse_timestamp_ms) {
                Some(ts) => Some((ts, record)),
                None => {
                    tracing::trace!(line, "Skipping row without a timestamp");
                    None
                }
            }
        })
}

/// Header row of `text`, or [`ParseError::EmptyInput`].
fn header_of(text: &str) -> Result<StringRecord, ParseError> {
    read_header(text).ok_or(ParseError::EmptyInput)
}

/// Resolve `schema` and fail fast on missing required columns.
fn resolve_required(header: &[&str], schema: &ColumnSchema) -> Result<ColumnMap, ParseError> {
    let map = resolve_columns(header, schema);

    let mut missing: Vec<String> = map.missing_required().iter().map(|h| h.to_string()).collect();
    if map.index(Channel::Time).is_none() && missing.is_empty() {
        // The time axis cannot be optional even if declared so.
        let time_header = schema
            .spec(Channel::Time)
            .map_or(TIMESTAMP, |spec| spec.header.as_str());
        missing.push(time_header.to_string());
    }
    if !missing.is_empty() {
        return Err(ParseError::MissingColumns { missing });
    }

    let optional = map.missing_optional();
    if !optional.is_empty() {
        tracing::warn!(columns = ?optional, "Optional columns not found; channels left empty");
    }
    Ok(map)
}

/// Decode a motion/distance log into a [`NormalizedSeries`].
pub fn decode_motion(
    text: &str,
    schema: &ColumnSchema,
    policy: MissingValuePolicy,
) -> Result<NormalizedSeries, ParseError> {
    let header = header_of(text)?;
    let header: Vec<&str> = header.iter().collect();
    let map = resolve_required(&header, schema)?;
    let time_index = map.index(Channel::Time).ok_or_else(|| ParseError::MissingColumns {
        missing: vec![TIMESTAMP.to_string()],
    })?;

    let reading = |fields: &StringRecord, channel: Channel| -> f64 {
        map.index(channel)
            .and_then(|i| fields.get(i))
            .map_or(f64::NAN, parse_reading)
    };
    let distance = |fields: &StringRecord, channel: Channel| -> Option<f64> {
        map.index(channel)
            .and_then(|i| fields.get(i))
            .and_then(|f| policy.apply(parse_reading(f)))
    };

    let dual = schema.is_dual_distance();
    let mut time = TimeAxis::default();
    let mut accel = Axes::default();
    let mut gyro = Axes::default();
    let mut single = Vec::new();
    let mut left = Vec::new();
    let mut right = Vec::new();

    for (timestamp, fields) in data_rows(text, map.header_width(), time_index) {
        time.push(timestamp);
        accel.push(
            reading(&fields, Channel::AccelX),
            reading(&fields, Channel::AccelY),
            reading(&fields, Channel::AccelZ),
        );
        gyro.push(
            reading(&fields, Channel::GyroX),
            reading(&fields, Channel::GyroY),
            reading(&fields, Channel::GyroZ),
        );
        if dual {
            left.push(distance(&fields, Channel::DistanceLeft));
            right.push(distance(&fields, Channel::DistanceRight));
        } else {
            single.push(distance(&fields, Channel::Distance));
        }
    }

    let distance = if dual {
        DistanceSeries::Dual { left, right }
    } else {
        DistanceSeries::Single { values: single }
    };

    let series = NormalizedSeries {
        time: time.finish(),
        accel,
        gyro,
        distance,
        prediction: None,
    };
    tracing::debug!(rows = series.len(), "Decoded motion log");
    debug_assert!(series.is_aligned());
    Ok(series)
}

/// Decode a prediction log on its own time axis.
pub fn decode_predictions(
    text: &str,
    schema: &PredictionSchema,
) -> Result<PredictionSeries, ParseError> {
    let header = header_of(text)?;
    let header: Vec<&str> = header.iter().collect();

    let missing: Vec<String> = schema
        .required_headers()
        .into_iter()
        .filter(|name| find_column(&header, name).is_none())
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(ParseError::MissingColumns { missing });
    }

    let time_index = find_column(&header, &schema.time_header).ok_or_else(|| {
        ParseError::MissingColumns {
            missing: vec![schema.time_header.clone()],
        }
    })?;
    let class_indices: Vec<Option<usize>> = schema
        .classes
        .iter()
        .map(|name| find_column(&header, name))
        .collect();

    let mut time = TimeAxis::default();
    let mut classes: Vec<ClassSeries> = schema
        .classes
        .iter()
        .map(|name| ClassSeries {
            name: name.clone(),
            values: Vec::new(),
        })
        .collect();

    for (timestamp, fields) in data_rows(text, header.len(), time_index) {
        time.push(timestamp);
        for (class, index) in classes.iter_mut().zip(&class_indices) {
            let value = index
                .and_then(|i| fields.get(i))
                .map(parse_reading);
            class.values.push(value);
        }
    }

    let series = PredictionSeries {
        time: time.finish(),
        classes,
    };
    tracing::debug!(rows = series.len(), "Decoded prediction log");
    Ok(series)
}
