//! Configuration for how a data source consumes its file.
//!
//! A data source either parses the whole file once and caches every feature
//! (the default, fast random access afterwards) or streams records lazily
//! through per-layer readers (low memory, single pass per layer).

use serde::{Deserialize, Serialize};

/// Environment variable overriding the read mode. Set to `NO`, `0` or
/// `false` to select streaming instead of the default whole-file read.
pub const READ_WHOLE_FILE_ENV: &str = "XPLANE_READ_WHOLE_FILE";

/// File consumption strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReadMode {
    /// Parse the whole file eagerly on first access and cache all features
    #[default]
    WholeFile,
    /// Give each layer an independent reader that parses on demand
    Streaming,
}

/// Reader configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatConfig {
    /// Whether files are parsed eagerly or streamed per layer
    pub read_mode: ReadMode,
}

impl DatConfig {
    /// Configuration honoring the `XPLANE_READ_WHOLE_FILE` environment toggle
    pub fn from_env() -> Self {
        let read_mode = match std::env::var(READ_WHOLE_FILE_ENV) {
            Ok(v) if matches!(v.trim(), "NO" | "no" | "No" | "0" | "false" | "FALSE") => {
                ReadMode::Streaming
            }
            _ => ReadMode::WholeFile,
        };
        Self { read_mode }
    }

    /// Select lazy per-layer streaming
    pub fn with_streaming(mut self) -> Self {
        self.read_mode = ReadMode::Streaming;
        self
    }

    /// Select the eager whole-file read
    pub fn with_whole_file(mut self) -> Self {
        self.read_mode = ReadMode::WholeFile;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_whole_file() {
        assert_eq!(DatConfig::default().read_mode, ReadMode::WholeFile);
    }

    #[test]
    fn test_builders() {
        assert_eq!(
            DatConfig::default().with_streaming().read_mode,
            ReadMode::Streaming
        );
        assert_eq!(
            DatConfig::default().with_streaming().with_whole_file().read_mode,
            ReadMode::WholeFile
        );
    }
}
