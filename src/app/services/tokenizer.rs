//! Line reading, tokenization and typed field extraction.
//!
//! Every physical line becomes a [`RecordLine`]: whitespace-split tokens plus
//! the 1-based line number, consumed immediately by the active parse routine.
//! Field readers return [`Error::DataValidation`] on conversion or range
//! failures; callers log the error with the line number and skip the record,
//! so a bad line never aborts the file.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::constants::END_OF_SECTION;
use crate::{Error, Result};

/// Buffered line reader with a running line counter.
///
/// The counter advances by exactly one per physical line regardless of
/// whether the line parses, which keeps logged line numbers accurate.
#[derive(Debug)]
pub struct DatLineReader {
    reader: BufReader<File>,
    line_number: usize,
}

impl DatLineReader {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| Error::io(format!("failed to open {}", path.display()), e))?;
        Ok(Self {
            reader: BufReader::new(file),
            line_number: 0,
        })
    }

    /// Read one raw line (used for the two header lines). Returns `None` at
    /// end of file.
    pub fn next_raw_line(&mut self) -> Result<Option<String>> {
        let mut buf = String::new();
        let n = self
            .reader
            .read_line(&mut buf)
            .map_err(|e| Error::io("failed to read line", e))?;
        if n == 0 {
            return Ok(None);
        }
        self.line_number += 1;
        while buf.ends_with('\n') || buf.ends_with('\r') {
            buf.pop();
        }
        Ok(Some(buf))
    }

    /// Read and tokenize the next record line
    pub fn next_record(&mut self) -> Result<Option<RecordLine>> {
        match self.next_raw_line()? {
            Some(line) => Ok(Some(RecordLine::tokenize(&line, self.line_number))),
            None => Ok(None),
        }
    }

    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

/// One tokenized input line
#[derive(Debug, Clone)]
pub struct RecordLine {
    tokens: Vec<String>,
    pub line_number: usize,
}

/// Leading-integer parse with C `atoi` semantics: optional sign, then
/// digits, stopping at the first non-digit. Anything else is 0.
pub fn atoi(s: &str) -> i32 {
    let s = s.trim_start();
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'-') => (-1i64, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let mut value: i64 = 0;
    for b in rest.bytes() {
        if b.is_ascii_digit() {
            value = (value * 10 + (b - b'0') as i64).min(i32::MAX as i64);
        } else {
            break;
        }
    }
    (sign * value).clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

impl RecordLine {
    /// Split a physical line on whitespace
    pub fn tokenize(line: &str, line_number: usize) -> Self {
        Self {
            tokens: line.split_whitespace().map(|t| t.to_string()).collect(),
            line_number,
        }
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn token(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(|t| t.as_str())
    }

    /// Whether this line is the `99` end-of-section sentinel
    pub fn is_end_of_section(&self) -> bool {
        self.tokens.len() == 1 && self.tokens[0] == END_OF_SECTION
    }

    /// Leading record-type code (`atoi` of the first token)
    pub fn record_code(&self) -> i32 {
        self.tokens.first().map(|t| atoi(t)).unwrap_or(-1)
    }

    /// Fail unless the line has at least `min` tokens
    pub fn assert_min_col(&self, min: usize) -> Result<()> {
        if self.tokens.len() < min {
            return Err(Error::data_validation(format!(
                "line {}: not enough columns: {} found, {} expected",
                self.line_number,
                self.tokens.len(),
                min
            )));
        }
        Ok(())
    }

    /// Required string token
    pub fn read_string(&self, index: usize) -> Result<&str> {
        self.token(index).ok_or_else(|| {
            Error::data_validation(format!("line {}: missing token {}", self.line_number, index))
        })
    }

    /// Integer token with `atoi` semantics (never fails on present tokens,
    /// matching how secondary codes are consumed)
    pub fn read_int_lenient(&self, index: usize) -> i32 {
        self.token(index).map(atoi).unwrap_or(0)
    }

    /// Strictly parsed integer token
    pub fn read_int(&self, index: usize, what: &str) -> Result<i32> {
        let token = self.read_string(index)?;
        token.parse::<i32>().map_err(|_| {
            Error::data_validation(format!(
                "line {}: invalid integer for {}: '{}'",
                self.line_number, what, token
            ))
        })
    }

    /// Boolean flag token (`atoi` of the token, non-zero is true)
    pub fn read_bool_flag(&self, index: usize) -> bool {
        self.read_int_lenient(index) != 0
    }

    /// Real-number token
    pub fn read_f64(&self, index: usize, what: &str) -> Result<f64> {
        let token = self.read_string(index)?;
        token.parse::<f64>().map_err(|_| {
            Error::data_validation(format!(
                "line {}: invalid numeric value for {}: '{}'",
                self.line_number, what, token
            ))
        })
    }

    /// Real-number token constrained to `[min, max]`
    pub fn read_f64_bounded(&self, index: usize, what: &str, min: f64, max: f64) -> Result<f64> {
        let value = self.read_f64(index, what)?;
        if !(min..=max).contains(&value) {
            return Err(Error::data_validation(format!(
                "line {}: value {} for {} outside [{}, {}]",
                self.line_number, value, what, min, max
            )));
        }
        Ok(value)
    }

    /// Real-number token multiplied by a unit factor, bounds checked after
    /// conversion
    pub fn read_f64_converted(
        &self,
        index: usize,
        what: &str,
        factor: f64,
        min: f64,
        max: f64,
    ) -> Result<f64> {
        let value = self.read_f64(index, what)? * factor;
        if !(min..=max).contains(&value) {
            return Err(Error::data_validation(format!(
                "line {}: converted value {} for {} outside [{}, {}]",
                self.line_number, value, what, min, max
            )));
        }
        Ok(value)
    }

    /// Latitude at `index`, longitude at `index + 1`, both range checked
    pub fn read_lat_lon(&self, index: usize) -> Result<(f64, f64)> {
        let lat = self.read_f64_bounded(index, "latitude", -90.0, 90.0)?;
        let lon = self.read_f64_bounded(index + 1, "longitude", -180.0, 180.0)?;
        Ok((lat, lon))
    }

    /// True heading in degrees. Accepts `[-180, 360]`; negative values are
    /// normalized by adding 180 (so -10 becomes 170 and -180 becomes 0).
    pub fn read_true_heading(&self, index: usize, what: &str) -> Result<f64> {
        let mut heading = self.read_f64_bounded(index, what, -180.0, 360.0)?;
        if heading < 0.0 {
            heading += 180.0;
        }
        Ok(heading)
    }

    /// Join every token from `index` to the end with single spaces (names
    /// and free text trail the fixed columns)
    pub fn read_string_until_end(&self, index: usize) -> String {
        if index >= self.tokens.len() {
            return String::new();
        }
        self.tokens[index..].join(" ")
    }

    /// A token packing two sub-values separated by `.`: the integer before
    /// the dot and the integer after it, both scaled by `factor`. When no
    /// dot is present the second sub-value is left at zero.
    pub fn read_paired_values(&self, index: usize, factor: f64) -> Result<(f64, f64)> {
        let token = self.read_string(index)?;
        let first = atoi(token) as f64 * factor;
        let second = match token.split_once('.') {
            Some((_, rest)) => atoi(rest) as f64 * factor,
            None => 0.0,
        };
        Ok((first, second))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str) -> RecordLine {
        RecordLine::tokenize(text, 7)
    }

    #[test]
    fn test_tokenize_collapses_whitespace() {
        let rec = line("100  29.87  1   0\t3");
        assert_eq!(rec.token_count(), 5);
        assert_eq!(rec.token(1), Some("29.87"));
        assert_eq!(rec.record_code(), 100);
    }

    #[test]
    fn test_end_of_section_detection() {
        assert!(line("99").is_end_of_section());
        assert!(!line("99 extra").is_end_of_section());
        assert!(!line("990").is_end_of_section());
    }

    #[test]
    fn test_assert_min_col() {
        let rec = line("1 2 3");
        assert!(rec.assert_min_col(3).is_ok());
        let err = rec.assert_min_col(4).unwrap_err();
        assert!(err.to_string().contains("line 7"));
    }

    #[test]
    fn test_atoi_semantics() {
        assert_eq!(atoi("42"), 42);
        assert_eq!(atoi("-7"), -7);
        assert_eq!(atoi("400.200"), 400);
        assert_eq!(atoi("12abc"), 12);
        assert_eq!(atoi("abc"), 0);
        assert_eq!(atoi(""), 0);
    }

    #[test]
    fn test_lat_lon_bounds() {
        assert!(line("x 47.5 11.2").read_lat_lon(1).is_ok());
        assert!(line("x 90.5 11.2").read_lat_lon(1).is_err());
        assert!(line("x 47.5 -180.5").read_lat_lon(1).is_err());
        assert!(line("x 47.5 abc").read_lat_lon(1).is_err());
    }

    #[test]
    fn test_true_heading_normalization() {
        assert_eq!(line("x -10").read_true_heading(1, "heading").unwrap(), 170.0);
        assert_eq!(line("x -180").read_true_heading(1, "heading").unwrap(), 0.0);
        assert_eq!(line("x 0").read_true_heading(1, "heading").unwrap(), 0.0);
        assert_eq!(line("x 359.9").read_true_heading(1, "heading").unwrap(), 359.9);
        assert!(line("x 361").read_true_heading(1, "heading").is_err());
        assert!(line("x -181").read_true_heading(1, "heading").is_err());
    }

    #[test]
    fn test_converted_bounds_apply_after_conversion() {
        // 40000 ft converts to ~12192 m, above the 10000 m ceiling
        let rec = line("1 40000");
        assert!(rec
            .read_f64_converted(1, "elevation", crate::constants::FEET_TO_METER, -1000.0, 10000.0)
            .is_err());
        let rec = line("1 5000");
        let v = rec
            .read_f64_converted(1, "elevation", crate::constants::FEET_TO_METER, -1000.0, 10000.0)
            .unwrap();
        assert!((v - 1524.0).abs() < 0.01);
    }

    #[test]
    fn test_paired_values() {
        let (a, b) = line("10 400.200").read_paired_values(1, 1.0).unwrap();
        assert_eq!((a, b), (400.0, 200.0));
        // no dot: the second sub-value stays untouched at zero
        let (a, b) = line("10 400").read_paired_values(1, 1.0).unwrap();
        assert_eq!((a, b), (400.0, 0.0));
    }

    #[test]
    fn test_read_string_until_end() {
        let rec = line("1 5 0 0 LOWI Innsbruck Kranebitten");
        assert_eq!(rec.read_string_until_end(5), "Innsbruck Kranebitten");
        assert_eq!(rec.read_string_until_end(7), "");
    }
}
