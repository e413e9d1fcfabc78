//! Interface header decoding

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Interface, LogRecord};
use crate::error::{Result, StageLogError};

/// Laser mounting geometry from the first laser line: pose on the robot and body size
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LaserGeometry {
    pub lx: f64,
    pub ly: f64,
    pub la: f64,
    pub sx: f64,
    pub sy: f64,
}

/// Scan parameters from the second laser line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaserConfig {
    pub scan_id: i64,
    pub min_angle: f64,
    pub max_angle: f64,
    pub resolution: f64,
    pub max_range: f64,
    /// Beams per scan
    pub count: usize,
}

const GEOMETRY_FIELDS: [&str; 5] = ["lx", "ly", "la", "sx", "sy"];

fn header_field<T: FromStr>(record: &LogRecord, column: usize, field: &'static str) -> Result<T> {
    let value = record.token(column);
    value.parse().map_err(|_| StageLogError::InvalidHeader {
        line: record.line,
        field,
        value: value.to_string(),
    })
}

fn next_header<I>(lines: &mut I, interface: Interface, found: usize) -> Result<LogRecord>
where
    I: Iterator<Item = Result<LogRecord>>,
{
    lines.next().unwrap_or_else(|| {
        Err(StageLogError::MissingHeader {
            interface: interface.name(),
            expected: interface.descriptor().header_rows,
            found,
        })
    })
}

/// Consume the two laser header lines and decode geometry and scan parameters
pub fn decode_laser_header<I>(lines: &mut I) -> Result<(LaserGeometry, LaserConfig)>
where
    I: Iterator<Item = Result<LogRecord>>,
{
    let fields = &Interface::Laser.descriptor().layout.fields;

    let record = next_header(lines, Interface::Laser, 0)?;
    let mut values = [0.0; 5];
    for (i, (value, field)) in values.iter_mut().zip(GEOMETRY_FIELDS).enumerate() {
        *value = header_field(&record, fields.start + i, field)?;
    }
    let [lx, ly, la, sx, sy] = values;
    let geometry = LaserGeometry { lx, ly, la, sx, sy };

    let record = next_header(lines, Interface::Laser, 1)?;
    let c = fields.start;
    let config = LaserConfig {
        scan_id: header_field(&record, c, "scan_id")?,
        min_angle: header_field(&record, c + 1, "min_angle")?,
        max_angle: header_field(&record, c + 2, "max_angle")?,
        resolution: header_field(&record, c + 3, "resolution")?,
        max_range: header_field(&record, c + 4, "max_range")?,
        count: header_field(&record, c + 5, "count")?,
    };
    if Interface::Laser.descriptor().layout.row_width(config.count).is_none() {
        return Err(StageLogError::InvalidHeader {
            line: record.line,
            field: "count",
            value: record.token(c + 5).to_string(),
        });
    }

    tracing::debug!(?geometry, ?config, "decoded laser header");
    Ok((geometry, config))
}

/// Consume the position2d header line; it publishes no fields
pub fn skip_position_header<I>(lines: &mut I) -> Result<()>
where
    I: Iterator<Item = Result<LogRecord>>,
{
    next_header(lines, Interface::Position2d, 0).map(|_| ())
}
