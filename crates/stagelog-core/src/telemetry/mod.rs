//! Telemetry Log Decoding
//!
//! Reads Player/Stage text logs and decodes the `laser` and `position2d`
//! channels into typed rows.
//!
//! Every log line is whitespace tokenized. Token 3 names the interface and
//! the columns that follow are interface specific:
//!
//! ```text
//! time      host     robot interface idx type sub  fields...
//! 0000.100  16777343 6665  laser     00  001  001  <scan_id> <min> <max> <res> <max_range> <count> <r0> <i0> ...
//! 0000.100  16777343 6665  position2d 02 001  001  <px> <py> <pa> <vx> <vy> <va> <stall>
//! ```

mod filter;
mod header;
mod record;

pub use filter::{read_records, InterfaceLines};
pub use header::{decode_laser_header, skip_position_header, LaserConfig, LaserGeometry};
pub use record::{decode_laser_row, decode_position_row, LaserRow, PositionRow};

use std::ops::Range;

/// Token index of the interface name on every log line
pub const INTERFACE_COLUMN: usize = 3;

/// Telemetry channels this crate knows how to decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interface {
    /// Laser range finder
    Laser,
    /// Planar odometry / pose
    Position2d,
}

impl Interface {
    /// Token that identifies this interface in column 3 of a log line
    pub fn name(&self) -> &'static str {
        self.descriptor().name
    }

    /// Static decode description for this interface
    pub fn descriptor(&self) -> &'static InterfaceDescriptor {
        match self {
            Interface::Laser => &LASER,
            Interface::Position2d => &POSITION2D,
        }
    }
}

/// Column positions shared by the header and data rows of one interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    /// Column holding the row timestamp
    pub time_column: usize,
    /// Interface specific scalar fields
    pub fields: Range<usize>,
    /// First column of the trailing `(range, intensity)` pairs, if any
    pub pairs_start: Option<usize>,
}

impl ColumnLayout {
    /// Number of tokens a data row must carry for `pairs` trailing pairs
    ///
    /// `None` when the width does not fit in a `usize`.
    pub fn row_width(&self, pairs: usize) -> Option<usize> {
        match self.pairs_start {
            Some(start) => pairs.checked_mul(2).and_then(|n| n.checked_add(start)),
            None => Some(self.fields.end),
        }
    }
}

/// Interface name, header depth and column layout, driving the generic decoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceDescriptor {
    /// Interface token
    pub name: &'static str,
    /// Leading lines of this interface that are headers, not data
    pub header_rows: usize,
    /// Column layout of data rows
    pub layout: ColumnLayout,
}

static LASER: InterfaceDescriptor = InterfaceDescriptor {
    name: "laser",
    header_rows: 2,
    layout: ColumnLayout {
        time_column: 0,
        fields: 7..13,
        pairs_start: Some(13),
    },
};

static POSITION2D: InterfaceDescriptor = InterfaceDescriptor {
    name: "position2d",
    header_rows: 1,
    layout: ColumnLayout {
        time_column: 0,
        fields: 7..13,
        pairs_start: None,
    },
};

/// One raw log line selected for an interface, already tokenized
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    /// 1-based line number in the source file
    pub line: usize,
    /// Interface the line was selected for
    pub interface: Interface,
    /// Whitespace separated tokens
    pub tokens: Vec<String>,
}

impl LogRecord {
    /// Tokenize `text`, returning `None` unless token 3 equals `interface`
    pub fn parse(line: usize, text: &str, interface: Interface) -> Option<Self> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.get(INTERFACE_COLUMN).copied() != Some(interface.name()) {
            return None;
        }
        Some(Self {
            line,
            interface,
            tokens: tokens.into_iter().map(str::to_string).collect(),
        })
    }

    /// Token count of the line
    pub fn width(&self) -> usize {
        self.tokens.len()
    }

    pub(crate) fn token(&self, column: usize) -> &str {
        self.tokens.get(column).map(String::as_str).unwrap_or("")
    }
}
