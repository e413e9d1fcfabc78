//! Data row decoding
//!
//! Rows are validated against the interface layout before any column is
//! read; a width mismatch fails the whole trial.

use std::str::FromStr;

use super::{Interface, LaserConfig, LogRecord};
use crate::error::{Result, StageLogError};

/// One decoded laser data line
#[derive(Debug, Clone, PartialEq)]
pub struct LaserRow {
    pub line: usize,
    pub time: f64,
    pub scan_id: i64,
    pub min_angle: f64,
    pub max_angle: f64,
    pub resolution: f64,
    pub max_range: f64,
    pub count: usize,
    /// Raw ranges, sentinel values untouched
    pub ranges: Vec<f64>,
    pub intensities: Vec<f64>,
}

/// One decoded position2d data line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionRow {
    pub line: usize,
    pub time: f64,
    pub px: f64,
    pub py: f64,
    pub pa: f64,
    pub vx: f64,
    pub vy: f64,
    pub va: f64,
}

fn row_value<T: FromStr>(record: &LogRecord, column: usize) -> Result<T> {
    let value = record.token(column);
    value.parse().map_err(|_| StageLogError::InvalidNumber {
        line: record.line,
        column,
        value: value.to_string(),
    })
}

/// Decode a laser row laid out for the header's beam count
pub fn decode_laser_row(record: &LogRecord, config: &LaserConfig) -> Result<LaserRow> {
    let layout = &Interface::Laser.descriptor().layout;
    let expected = layout.row_width(config.count).unwrap_or(usize::MAX);
    if record.width() != expected {
        return Err(StageLogError::RowWidth {
            line: record.line,
            expected,
            found: record.width(),
        });
    }

    let c = layout.fields.start;
    let count: usize = row_value(record, c + 5)?;
    if count != config.count {
        return Err(match layout.row_width(count) {
            Some(expected) => StageLogError::RowWidth {
                line: record.line,
                expected,
                found: record.width(),
            },
            None => StageLogError::InvalidNumber {
                line: record.line,
                column: c + 5,
                value: record.token(c + 5).to_string(),
            },
        });
    }

    let pairs_start = layout.pairs_start.unwrap_or(layout.fields.end);
    let mut ranges = Vec::with_capacity(count);
    let mut intensities = Vec::with_capacity(count);
    for beam in 0..count {
        let column = pairs_start + 2 * beam;
        ranges.push(row_value(record, column)?);
        intensities.push(row_value(record, column + 1)?);
    }

    Ok(LaserRow {
        line: record.line,
        time: row_value(record, layout.time_column)?,
        scan_id: row_value(record, c)?,
        min_angle: row_value(record, c + 1)?,
        max_angle: row_value(record, c + 2)?,
        resolution: row_value(record, c + 3)?,
        max_range: row_value(record, c + 4)?,
        count,
        ranges,
        intensities,
    })
}

/// Decode a position2d row; columns past the pose and velocity are ignored
pub fn decode_position_row(record: &LogRecord) -> Result<PositionRow> {
    let layout = &Interface::Position2d.descriptor().layout;
    let expected = layout.fields.end;
    if record.width() < expected {
        return Err(StageLogError::RowWidth {
            line: record.line,
            expected,
            found: record.width(),
        });
    }

    let c = layout.fields.start;
    Ok(PositionRow {
        line: record.line,
        time: row_value(record, layout.time_column)?,
        px: row_value(record, c)?,
        py: row_value(record, c + 1)?,
        pa: row_value(record, c + 2)?,
        vx: row_value(record, c + 3)?,
        vy: row_value(record, c + 4)?,
        va: row_value(record, c + 5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(count: usize) -> LaserConfig {
        LaserConfig {
            scan_id: 0,
            min_angle: -1.0,
            max_angle: 1.0,
            resolution: 1.0,
            max_range: 8.0,
            count,
        }
    }

    fn record(interface: Interface, text: &str) -> LogRecord {
        LogRecord::parse(10, text, interface).unwrap()
    }

    #[test]
    fn test_decode_laser_row() {
        let rec = record(
            Interface::Laser,
            "0002.500 1 6665 laser 00 001 001 0007 -1.0 +1.0 1.0 8.000 0003 1.5 0 8.000 0 2.25 1",
        );
        let row = decode_laser_row(&rec, &config(3)).unwrap();
        assert_eq!(row.time, 2.5);
        assert_eq!(row.scan_id, 7);
        assert_eq!(row.count, 3);
        assert_eq!(row.ranges, vec![1.5, 8.0, 2.25]);
        assert_eq!(row.intensities, vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_laser_row_width_mismatch() {
        let rec = record(
            Interface::Laser,
            "0002.500 1 6665 laser 00 001 001 0007 -1.0 +1.0 1.0 8.000 0003 1.5 0 8.000 0",
        );
        match decode_laser_row(&rec, &config(3)) {
            Err(StageLogError::RowWidth {
                line,
                expected,
                found,
            }) => {
                assert_eq!(line, 10);
                assert_eq!(expected, 19);
                assert_eq!(found, 17);
            }
            other => panic!("Expected RowWidth, got {:?}", other),
        }
    }

    #[test]
    fn test_laser_row_count_disagrees_with_header() {
        let rec = record(
            Interface::Laser,
            "0002.500 1 6665 laser 00 001 001 0007 -1.0 +1.0 1.0 8.000 0002 1.5 0 8.000 0 2.0 0",
        );
        assert!(matches!(
            decode_laser_row(&rec, &config(3)),
            Err(StageLogError::RowWidth { expected: 17, found: 19, .. })
        ));
    }

    #[test]
    fn test_laser_row_count_too_large() {
        let rec = record(
            Interface::Laser,
            "0002.500 1 6665 laser 00 001 001 0007 -1.0 +1.0 1.0 8.000 18446744073709551615 1.5 0",
        );
        assert!(matches!(
            decode_laser_row(&rec, &config(1)),
            Err(StageLogError::InvalidNumber { column: 12, .. })
        ));
    }

    #[test]
    fn test_laser_row_bad_number() {
        let rec = record(
            Interface::Laser,
            "0002.500 1 6665 laser 00 001 001 0007 -1.0 +1.0 1.0 8.000 0001 nan? 0",
        );
        match decode_laser_row(&rec, &config(1)) {
            Err(StageLogError::InvalidNumber { column, value, .. }) => {
                assert_eq!(column, 13);
                assert_eq!(value, "nan?");
            }
            other => panic!("Expected InvalidNumber, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_position_row_ignores_stall() {
        let rec = record(
            Interface::Position2d,
            "0001.100 1 6665 position2d 02 001 001 +1.000 -2.000 +0.500 0.100 0.000 -0.050 0",
        );
        let row = decode_position_row(&rec).unwrap();
        assert_eq!(row.time, 1.1);
        assert_eq!(row.px, 1.0);
        assert_eq!(row.py, -2.0);
        assert_eq!(row.pa, 0.5);
        assert_eq!(row.vx, 0.1);
        assert_eq!(row.va, -0.05);
    }

    #[test]
    fn test_short_position_row() {
        let rec = record(Interface::Position2d, "0001.100 1 6665 position2d 02 001 001 1.0 2.0");
        assert!(matches!(
            decode_position_row(&rec),
            Err(StageLogError::RowWidth { expected: 13, found: 9, .. })
        ));
    }
}
