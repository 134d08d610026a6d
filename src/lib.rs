//! X-Plane `.dat` Reader Library
//!
//! A Rust library for reading the X-Plane family of aeronautical data files
//! (`apt.dat`, `nav.dat`, `awy.dat`, `fix.dat`) into in-memory vector layers.
//!
//! This library provides tools for:
//! - Validating the two-line file header (encoding marker + version string)
//! - Parsing whitespace-tokenized records dispatched on their numeric type code
//! - Deriving geometries (runway polygons, bezier-sampled pavement boundaries,
//!   antimeridian-aware airway segments) from record fields
//! - Collecting features into schema-checked layers, either eagerly for the
//!   whole file or lazily through per-layer streams
//! - Recoverable per-record error handling with a debug-log side channel

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod data_source;
        pub mod enumerations;
        pub mod geo;
        pub mod layer;
        pub mod readers;
        pub mod tokenizer;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{Feature, FieldDefn, FieldType, FieldValue};
pub use app::services::data_source::{DataSource, DatFormat, LayerStream};
pub use app::services::layer::{Layer, LayerSchema};
pub use config::{DatConfig, ReadMode};

/// Result type alias for the X-Plane reader
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for X-Plane `.dat` processing operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// File is not a recognized X-Plane `.dat` file (bad name, missing
    /// encoding marker or unknown version string)
    #[error("unrecognized format for '{file}': {message}")]
    UnrecognizedFormat { file: String, message: String },

    /// A record field failed conversion or range validation. Raised while
    /// parsing a single record; callers log it and skip the record.
    #[error("data validation error: {message}")]
    DataValidation { message: String },

    /// Requested layer does not exist in the data source
    #[error("unknown layer: {name}")]
    UnknownLayer { name: String },

    /// Operation not permitted in the data source's current state
    #[error("invalid state: {message}")]
    InvalidState { message: String },

    /// Feature does not match its layer's field schema
    #[error("schema mismatch in layer '{layer}': {message}")]
    Schema { layer: String, message: String },

    /// JSON encoding failed while dumping features
    #[error("serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create an unrecognized-format error
    pub fn unrecognized_format(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnrecognizedFormat {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create a data validation error
    pub fn data_validation(message: impl Into<String>) -> Self {
        Self::DataValidation {
            message: message.into(),
        }
    }

    /// Create an unknown-layer error
    pub fn unknown_layer(name: impl Into<String>) -> Self {
        Self::UnknownLayer { name: name.into() }
    }

    /// Create an invalid-state error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Create a schema mismatch error
    pub fn schema(layer: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            layer: layer.into(),
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            message: message.into(),
            source,
        }
    }
}
