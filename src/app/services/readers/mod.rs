//! Per-format readers for the X-Plane `.dat` family.
//!
//! Each reader owns one open file, a running line number, its set of output
//! layers and whatever cross-line state its format needs. Readers share the
//! header-validation and record-loop plumbing in [`ReaderCore`] and differ
//! only in their record-code dispatch tables.

pub mod apt;
pub mod awy;
pub mod fix;
pub mod nav;

use std::path::{Path, PathBuf};

use tracing::debug;

use super::layer::Layer;
use super::tokenizer::{DatLineReader, RecordLine};
use crate::constants::is_recognized_version;
use crate::{Error, Result};

/// Common interface over the four format readers
pub trait DatReader {
    /// The reader's output layers, in registration order
    fn layers(&self) -> &[Layer];

    fn layers_mut(&mut self) -> &mut [Layer];

    /// Parsing statistics accumulated so far
    fn stats(&self) -> &ParseStats;

    /// Consume records. With `interest` set, returns as soon as that
    /// layer's buffer becomes non-empty (streaming early exit); otherwise
    /// runs to end of file. Returns `true` once the end of the file or the
    /// `99` sentinel has been reached.
    fn read_until(&mut self, interest: Option<usize>) -> Result<bool>;

    /// Reopen the file and reset all cross-line parse state
    fn rewind(&mut self) -> Result<()>;
}

/// Parsing statistics for one pass over a file
#[derive(Debug, Clone, Default)]
pub struct ParseStats {
    /// Record lines consumed (header lines excluded)
    pub records_read: usize,

    /// Records that produced at least one feature or updated parse state
    pub records_parsed: usize,

    /// Records discarded for too few columns, failed conversions or
    /// out-of-range values
    pub records_skipped: usize,

    /// Records whose leading type code matched no dispatch branch
    pub unknown_codes: usize,
}

impl ParseStats {
    pub fn new() -> Self {
        Self::default()
    }
}

/// File handle, header validation and line plumbing shared by all readers
#[derive(Debug)]
pub struct ReaderCore {
    path: PathBuf,
    lines: DatLineReader,
    /// Version line accepted during header validation
    version: String,
    eof: bool,
    pub stats: ParseStats,
}

impl ReaderCore {
    /// Open a file and validate its two-line header: an `I` or `A` encoding
    /// marker, then a version string matching the reader's whitelist. Any
    /// mismatch means "not this format" and rejects the whole file.
    pub fn open(path: &Path, version_whitelist: &[&str]) -> Result<Self> {
        let mut lines = DatLineReader::open(path)?;

        let marker = lines
            .next_raw_line()?
            .ok_or_else(|| Error::unrecognized_format(path.display().to_string(), "empty file"))?;
        let marker = marker.trim_start_matches('\u{feff}').trim();
        if marker != "I" && marker != "A" {
            return Err(Error::unrecognized_format(
                path.display().to_string(),
                format!("missing I/A encoding marker, found '{}'", marker),
            ));
        }

        let version = lines.next_raw_line()?.ok_or_else(|| {
            Error::unrecognized_format(path.display().to_string(), "missing version line")
        })?;
        if !is_recognized_version(version.trim(), version_whitelist) {
            return Err(Error::unrecognized_format(
                path.display().to_string(),
                format!("unrecognized version string '{}'", version.trim()),
            ));
        }

        Ok(Self {
            path: path.to_path_buf(),
            lines,
            version: version.trim().to_string(),
            eof: false,
            stats: ParseStats::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn eof(&self) -> bool {
        self.eof
    }

    pub fn mark_eof(&mut self) {
        self.eof = true;
    }

    pub fn line_number(&self) -> usize {
        self.lines.line_number()
    }

    /// Next tokenized record line, or `None` at physical end of file
    pub fn next_record(&mut self) -> Result<Option<RecordLine>> {
        let record = self.lines.next_record()?;
        if record.is_some() {
            self.stats.records_read += 1;
        }
        Ok(record)
    }

    /// Log and count a skipped record
    pub fn skip_record(&mut self, err: &Error) {
        self.stats.records_skipped += 1;
        debug!("Skipped record: {}", err);
    }

    /// Log and count a record with an unrecognized type code
    pub fn unknown_code(&mut self, line_number: usize, code: i32) {
        self.stats.unknown_codes += 1;
        debug!("Line {}, unknown code: {}", line_number, code);
    }

    /// Reopen the file and skip the already-validated header
    pub fn rewind(&mut self) -> Result<()> {
        let mut lines = DatLineReader::open(&self.path)?;
        lines.next_raw_line()?;
        lines.next_raw_line()?;
        self.lines = lines;
        self.eof = false;
        self.stats = ParseStats::new();
        Ok(())
    }
}
