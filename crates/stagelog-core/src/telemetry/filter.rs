//! Interface line filter
//!
//! Streams the lines of a log that belong to one interface. Each pass owns
//! its file handle; reopen to read the same interface again.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use super::{Interface, LogRecord};
use crate::error::{Result, StageLogError};

/// Lazy iterator over the records of a single interface in one log file
pub struct InterfaceLines {
    path: PathBuf,
    interface: Interface,
    lines: Lines<BufReader<File>>,
    line_number: usize,
}

impl InterfaceLines {
    /// Open `path` and select lines tagged with `interface`
    pub fn open<P: AsRef<Path>>(path: P, interface: Interface) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| StageLogError::from_io(&path, e))?;
        Ok(Self {
            path,
            interface,
            lines: BufReader::new(file).lines(),
            line_number: 0,
        })
    }

    /// Interface being selected
    pub fn interface(&self) -> Interface {
        self.interface
    }
}

impl Iterator for InterfaceLines {
    type Item = Result<LogRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?;
            self.line_number += 1;
            match line {
                Ok(text) => {
                    if let Some(record) = LogRecord::parse(self.line_number, &text, self.interface)
                    {
                        return Some(Ok(record));
                    }
                }
                Err(e) => return Some(Err(StageLogError::from_io(&self.path, e))),
            }
        }
    }
}

/// Read every record of `interface` from `path` in one scoped pass
pub fn read_records<P: AsRef<Path>>(path: P, interface: Interface) -> Result<Vec<LogRecord>> {
    let records = InterfaceLines::open(path.as_ref(), interface)?.collect::<Result<Vec<_>>>()?;
    tracing::debug!(
        path = %path.as_ref().display(),
        interface = interface.name(),
        lines = records.len(),
        "filtered interface lines"
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MIXED_LOG: &str = "\
## Player version 3.0.2
0000000000.000 16777343 6665 laser 00 004 001 +0.030 +0.000 0.000 0.140 0.140
0000000000.000 16777343 6665 position2d 02 004 001 +0.000 +0.000 0.000 0.440 0.380
bad line
0000000000.100 16777343 6665 position2d 02 001 001 +1.000 +2.000 0.500 0.000 0.000 0.000 0
";

    fn write_log(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_filter_by_interface() {
        let log = write_log(MIXED_LOG);

        let laser = read_records(log.path(), Interface::Laser).unwrap();
        assert_eq!(laser.len(), 1);
        assert_eq!(laser[0].line, 2);

        let position = read_records(log.path(), Interface::Position2d).unwrap();
        assert_eq!(position.len(), 2);
        assert_eq!(position[0].line, 3);
        assert_eq!(position[1].line, 5);
    }

    #[test]
    fn test_reopen_gives_fresh_pass() {
        let log = write_log(MIXED_LOG);
        let first: Vec<_> = InterfaceLines::open(log.path(), Interface::Position2d)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        let second: Vec<_> = InterfaceLines::open(log.path(), Interface::Position2d)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.log");
        match InterfaceLines::open(&missing, Interface::Laser) {
            Err(StageLogError::NotFound(path)) => assert_eq!(path, missing),
            other => panic!("Expected NotFound, got {:?}", other.map(|_| ())),
        }
    }
}
