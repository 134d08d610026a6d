//! Data models for parsed X-Plane features
//!
//! This module contains the value model shared by every layer: typed field
//! definitions, field values, and the feature record itself. A feature is an
//! attribute tuple plus an optional geometry, owned by exactly one layer once
//! registered.

pub mod geometry;

use serde::Serialize;

use self::geometry::Geometry;

/// Declared type of a layer field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldType {
    String,
    Integer,
    Real,
    Boolean,
}

/// A single attribute value.
///
/// `Null` stands in for values the format could not provide, such as an
/// unknown enumeration code or the tower fields of an airport without one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Integer(i32),
    Real(f64),
    Boolean(bool),
    Null,
}

impl FieldValue {
    /// Whether this value is acceptable for a field of the given type.
    /// `Null` is acceptable everywhere.
    pub fn matches(&self, field_type: FieldType) -> bool {
        matches!(
            (self, field_type),
            (FieldValue::String(_), FieldType::String)
                | (FieldValue::Integer(_), FieldType::Integer)
                | (FieldValue::Real(_), FieldType::Real)
                | (FieldValue::Boolean(_), FieldType::Boolean)
                | (FieldValue::Null, _)
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i32> {
        match self {
            FieldValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            FieldValue::Real(v) => Some(*v),
            FieldValue::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Build a string value from an optional enumeration lookup
    pub fn from_enum_text(text: Option<&str>) -> Self {
        match text {
            Some(t) => FieldValue::String(t.to_string()),
            None => FieldValue::Null,
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Integer(v) => write!(f, "{}", v),
            FieldValue::Real(v) => write!(f, "{}", v),
            FieldValue::Boolean(v) => write!(f, "{}", v),
            FieldValue::Null => write!(f, "(null)"),
        }
    }
}

/// Named, typed field of a layer schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDefn {
    pub name: &'static str,
    pub field_type: FieldType,
}

/// One parsed feature: an attribute tuple and an optional geometry.
///
/// Features are immutable after construction except for computed-value
/// backfills (runway length and heading are only known once both thresholds
/// have been read).
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    fid: u64,
    values: Vec<FieldValue>,
    geometry: Option<Geometry>,
}

impl Feature {
    pub(crate) fn new(fid: u64, values: Vec<FieldValue>, geometry: Option<Geometry>) -> Self {
        Self {
            fid,
            values,
            geometry,
        }
    }

    /// Feature id, unique within its layer
    pub fn fid(&self) -> u64 {
        self.fid
    }

    pub fn values(&self) -> &[FieldValue] {
        &self.values
    }

    pub fn value(&self, index: usize) -> Option<&FieldValue> {
        self.values.get(index)
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    pub(crate) fn set_value(&mut self, index: usize, value: FieldValue) {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = value;
        }
    }

    pub(crate) fn set_geometry(&mut self, geometry: Option<Geometry>) {
        self.geometry = geometry;
    }

    pub(crate) fn with_fid(mut self, fid: u64) -> Self {
        self.fid = fid;
        self
    }
}
