//! Data source over one `.dat` file.
//!
//! Selects a reader implementation from the file's base name, validates the
//! two-line header on open, and then serves features either from a single
//! eager whole-file parse (the default) or through per-layer streams, each
//! backed by an independent reader over the same file.
//!
//! State machine: `HeaderValidated -> (WholeFileRead | Streaming) -> Closed`.
//! The mode is fixed by configuration; the first feature access performs the
//! transition.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::layer::Layer;
use super::readers::{apt::AptReader, awy::AwyReader, fix::FixReader, nav::NavReader};
use super::readers::{DatReader, ParseStats};
use crate::app::models::Feature;
use crate::config::{DatConfig, ReadMode};
use crate::constants::{APT_FILE_NAMES, AWY_FILE_NAMES, FIX_FILE_NAMES, NAV_FILE_NAMES};
use crate::{Error, Result};

/// The four recognized file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatFormat {
    Apt,
    Nav,
    Awy,
    Fix,
}

impl DatFormat {
    /// Select a format from the file's base name (`apt.dat`, `nav.dat`,
    /// `awy.dat`, `fix.dat` and their `earth_*` variants)
    pub fn detect(path: &Path) -> Option<DatFormat> {
        let base = path.file_name()?.to_str()?.to_ascii_lowercase();
        let matches = |names: &[&str]| names.iter().any(|n| *n == base);
        if matches(APT_FILE_NAMES) {
            Some(DatFormat::Apt)
        } else if matches(NAV_FILE_NAMES) {
            Some(DatFormat::Nav)
        } else if matches(AWY_FILE_NAMES) {
            Some(DatFormat::Awy)
        } else if matches(FIX_FILE_NAMES) {
            Some(DatFormat::Fix)
        } else {
            None
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DatFormat::Apt => "apt",
            DatFormat::Nav => "nav",
            DatFormat::Awy => "awy",
            DatFormat::Fix => "fix",
        }
    }
}

impl std::fmt::Display for DatFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn open_reader(format: DatFormat, path: &Path) -> Result<Box<dyn DatReader>> {
    Ok(match format {
        DatFormat::Apt => Box::new(AptReader::open(path)?),
        DatFormat::Nav => Box::new(NavReader::open(path)?),
        DatFormat::Awy => Box::new(AwyReader::open(path)?),
        DatFormat::Fix => Box::new(FixReader::open(path)?),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    HeaderValidated,
    WholeFileRead,
    Streaming,
    Closed,
}

/// One opened `.dat` file and its layers
pub struct DataSource {
    path: PathBuf,
    format: DatFormat,
    config: DatConfig,
    reader: Box<dyn DatReader>,
    state: State,
}

impl std::fmt::Debug for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSource")
            .field("path", &self.path)
            .field("format", &self.format)
            .field("config", &self.config)
            .field("reader", &"<dyn DatReader>")
            .field("state", &self.state)
            .finish()
    }
}

impl DataSource {
    /// Open a file: detect its format from the base name and validate the
    /// two-line header. Both failures are reported as "not this format" so
    /// callers can fall through to other drivers.
    pub fn open(path: impl AsRef<Path>, config: DatConfig) -> Result<Self> {
        let path = path.as_ref();
        let format = DatFormat::detect(path).ok_or_else(|| {
            Error::unrecognized_format(
                path.display().to_string(),
                "file name matches no known X-Plane data file",
            )
        })?;
        let reader = open_reader(format, path)?;
        debug!("Opened {} as {} data", path.display(), format);
        Ok(Self {
            path: path.to_path_buf(),
            format,
            config,
            reader,
            state: State::HeaderValidated,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> DatFormat {
        self.format
    }

    pub fn read_mode(&self) -> ReadMode {
        self.config.read_mode
    }

    pub fn layer_names(&self) -> Vec<&'static str> {
        self.reader.layers().iter().map(|l| l.name()).collect()
    }

    fn layer_index(&self, name: &str) -> Result<usize> {
        self.reader
            .layers()
            .iter()
            .position(|l| l.name() == name)
            .ok_or_else(|| Error::unknown_layer(name))
    }

    /// Run the single eager whole-file parse if it has not happened yet
    fn ensure_whole_file_read(&mut self) -> Result<()> {
        match self.state {
            State::WholeFileRead => Ok(()),
            State::HeaderValidated => {
                if self.config.read_mode != ReadMode::WholeFile {
                    return Err(Error::invalid_state(
                        "data source is configured for streaming; use open_stream",
                    ));
                }
                self.reader.read_until(None)?;
                let stats = self.reader.stats();
                info!(
                    "Read {}: {} records, {} parsed, {} skipped, {} unknown codes",
                    self.path.display(),
                    stats.records_read,
                    stats.records_parsed,
                    stats.records_skipped,
                    stats.unknown_codes
                );
                self.state = State::WholeFileRead;
                Ok(())
            }
            State::Streaming => Err(Error::invalid_state(
                "data source is already streaming; use open_stream",
            )),
            State::Closed => Err(Error::invalid_state("data source is closed")),
        }
    }

    /// All layers, after the eager whole-file parse
    pub fn layers(&mut self) -> Result<&[Layer]> {
        self.ensure_whole_file_read()?;
        Ok(self.reader.layers())
    }

    /// One layer by name, after the eager whole-file parse
    pub fn layer(&mut self, name: &str) -> Result<&Layer> {
        let idx = self.layer_index(name)?;
        self.ensure_whole_file_read()?;
        Ok(&self.reader.layers()[idx])
    }

    /// Parsing statistics of the primary reader
    pub fn stats(&self) -> &ParseStats {
        self.reader.stats()
    }

    /// Open an independent stream over one layer. Only valid in streaming
    /// mode; each stream gets a private reader positioned at the same file,
    /// so per-layer iteration proceeds without contention.
    pub fn open_stream(&mut self, layer_name: &str) -> Result<LayerStream> {
        match self.state {
            State::HeaderValidated | State::Streaming => {}
            State::WholeFileRead => {
                return Err(Error::invalid_state(
                    "data source already read eagerly; use layer/layers",
                ));
            }
            State::Closed => return Err(Error::invalid_state("data source is closed")),
        }
        if self.config.read_mode != ReadMode::Streaming {
            return Err(Error::invalid_state(
                "data source is configured for whole-file reads; use layer/layers",
            ));
        }

        let layer_idx = self.layer_index(layer_name)?;
        let reader = open_reader(self.format, &self.path)?;
        self.state = State::Streaming;
        Ok(LayerStream {
            reader,
            layer_idx,
            eof: false,
        })
    }

    /// Release the data source. Further access is a state error.
    pub fn close(&mut self) {
        self.state = State::Closed;
    }

    pub fn is_closed(&self) -> bool {
        self.state == State::Closed
    }
}

/// Iterator over one layer's features, backed by a private reader clone.
///
/// Each `next` call resumes the clone's read loop until the layer of
/// interest has a buffered feature or the file ends.
pub struct LayerStream {
    reader: Box<dyn DatReader>,
    layer_idx: usize,
    eof: bool,
}

impl LayerStream {
    pub fn layer_name(&self) -> &'static str {
        self.reader.layers()[self.layer_idx].name()
    }

    pub fn schema(&self) -> &'static crate::app::services::layer::LayerSchema {
        self.reader.layers()[self.layer_idx].schema()
    }
}

impl Iterator for LayerStream {
    type Item = Result<Feature>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(feature) = self.reader.layers_mut()[self.layer_idx].pop_front() {
                return Some(Ok(feature));
            }
            if self.eof {
                return None;
            }
            match self.reader.read_until(Some(self.layer_idx)) {
                Ok(eof) => self.eof = eof,
                Err(e) => {
                    self.eof = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn write_fix_file(dir: &Path) -> PathBuf {
        let path = dir.join("earth_fix.dat");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "I").unwrap();
        writeln!(file, "600 Version - fixes").unwrap();
        writeln!(file, "37.428522 -097.419194 ACESI").unwrap();
        writeln!(file, "68.587503 -152.856714 AAMYY").unwrap();
        writeln!(file, "99").unwrap();
        path
    }

    #[test]
    fn test_format_detection_by_base_name() {
        assert_eq!(
            DatFormat::detect(Path::new("/data/apt.dat")),
            Some(DatFormat::Apt)
        );
        assert_eq!(
            DatFormat::detect(Path::new("earth_nav.dat")),
            Some(DatFormat::Nav)
        );
        assert_eq!(
            DatFormat::detect(Path::new("AWY.DAT")),
            Some(DatFormat::Awy)
        );
        assert_eq!(DatFormat::detect(Path::new("scenery.dat")), None);
        assert_eq!(DatFormat::detect(Path::new("apt.txt")), None);
    }

    #[test]
    fn test_open_rejects_bad_marker() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fix.dat");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "X").unwrap();
        writeln!(file, "600 Version").unwrap();
        drop(file);
        let err = DataSource::open(&path, DatConfig::default()).unwrap_err();
        assert!(matches!(err, Error::UnrecognizedFormat { .. }));
    }

    #[test]
    fn test_open_rejects_bad_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fix.dat");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "I").unwrap();
        writeln!(file, "777 Version").unwrap();
        drop(file);
        let err = DataSource::open(&path, DatConfig::default()).unwrap_err();
        assert!(matches!(err, Error::UnrecognizedFormat { .. }));
    }

    #[test]
    fn test_eager_read_caches_features() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fix_file(dir.path());
        let mut source = DataSource::open(&path, DatConfig::default()).unwrap();
        assert_eq!(source.layer("FIX").unwrap().len(), 2);
        // second access serves the cache, no re-read
        assert_eq!(source.layer("FIX").unwrap().len(), 2);
        assert_eq!(source.stats().records_parsed, 2);
    }

    #[test]
    fn test_unknown_layer_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fix_file(dir.path());
        let mut source = DataSource::open(&path, DatConfig::default()).unwrap();
        assert!(matches!(
            source.layer("Nope"),
            Err(Error::UnknownLayer { .. })
        ));
    }

    #[test]
    fn test_streaming_matches_eager() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fix_file(dir.path());

        let mut eager = DataSource::open(&path, DatConfig::default()).unwrap();
        let eager_features: Vec<_> = eager.layer("FIX").unwrap().features().cloned().collect();

        let mut streaming =
            DataSource::open(&path, DatConfig::default().with_streaming()).unwrap();
        let streamed: Vec<_> = streaming
            .open_stream("FIX")
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();

        assert_eq!(eager_features, streamed);
    }

    #[test]
    fn test_independent_streams() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fix_file(dir.path());
        let mut source = DataSource::open(&path, DatConfig::default().with_streaming()).unwrap();
        let mut s1 = source.open_stream("FIX").unwrap();
        let mut s2 = source.open_stream("FIX").unwrap();
        // interleaved pulls do not disturb each other
        let a1 = s1.next().unwrap().unwrap();
        let b1 = s2.next().unwrap().unwrap();
        let a2 = s1.next().unwrap().unwrap();
        let b2 = s2.next().unwrap().unwrap();
        assert_eq!(a1, b1);
        assert_eq!(a2, b2);
        assert!(s1.next().is_none());
        assert!(s2.next().is_none());
    }

    #[test]
    fn test_mode_mismatch_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fix_file(dir.path());

        let mut eager = DataSource::open(&path, DatConfig::default()).unwrap();
        assert!(matches!(
            eager.open_stream("FIX"),
            Err(Error::InvalidState { .. })
        ));

        let mut streaming =
            DataSource::open(&path, DatConfig::default().with_streaming()).unwrap();
        assert!(matches!(
            streaming.layer("FIX"),
            Err(Error::InvalidState { .. })
        ));
    }

    #[test]
    fn test_closed_source_rejects_access() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fix_file(dir.path());
        let mut source = DataSource::open(&path, DatConfig::default()).unwrap();
        source.close();
        assert!(source.is_closed());
        assert!(matches!(
            source.layer("FIX"),
            Err(Error::InvalidState { .. })
        ));
    }
}
