//! Test fixtures and helpers shared across the apt reader test modules

use std::io::Write;

use tempfile::NamedTempFile;

pub use super::reader::AptReader;
pub use crate::app::services::readers::DatReader;

mod reader_tests;

/// Write an apt.dat file with the given version line and record body
pub fn apt_file(version: &str, records: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "I").unwrap();
    writeln!(file, "{}", version).unwrap();
    write!(file, "{}", records).unwrap();
    file.flush().unwrap();
    file
}

/// Parse a complete v8.50 apt.dat body (the file gets a trailing 99)
pub fn read_v850(records: &str) -> AptReader {
    let body = format!("{}99\n", records);
    let file = apt_file("850 Version - data cycle 2008.01", &body);
    let mut reader = AptReader::open(file.path()).unwrap();
    reader.read_until(None).unwrap();
    reader
}

/// Parse a complete v8.10 apt.dat body (the file gets a trailing 99)
pub fn read_v810(records: &str) -> AptReader {
    let body = format!("{}99\n", records);
    let file = apt_file("810 Version - data cycle 2006.01", &body);
    let mut reader = AptReader::open(file.path()).unwrap();
    reader.read_until(None).unwrap();
    reader
}

/// A minimal airport header for LOWI
pub const HEADER: &str = "1 1907 0 0 LOWI Innsbruck Kranebitten\n";

/// A v8.50 runway 08/26 with no displaced thresholds or stopways
pub const RUNWAY_08_26: &str = "100 45.00 1 0 0.25 0 2 1 \
    08 47.259000 11.331000 0.00 0.00 2 8 1 0 \
    26 47.261000 11.357000 0.00 0.00 2 8 1 0\n";
