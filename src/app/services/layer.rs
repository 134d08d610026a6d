//! Generic vector layer.
//!
//! One `Layer` type serves every feature class; what varies per class is its
//! `LayerSchema` (a static descriptor) and the builder function that
//! assembles attribute tuples for it. A feature's field count and order must
//! match its layer's schema at construction time, which `add_feature`
//! enforces.

use std::collections::VecDeque;

use crate::app::models::geometry::{Geometry, GeometryType};
use crate::app::models::{Feature, FieldDefn, FieldValue};
use crate::{Error, Result};

/// Static descriptor of a feature class: name, geometry column and fields
#[derive(Debug)]
pub struct LayerSchema {
    pub name: &'static str,
    pub geometry_type: GeometryType,
    pub fields: &'static [FieldDefn],
}

impl LayerSchema {
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// Growable feature buffer bound to a schema.
///
/// Eager readers fill it once and it is consumed in place; streaming readers
/// use it as a FIFO drained through [`Layer::pop_front`].
#[derive(Debug)]
pub struct Layer {
    schema: &'static LayerSchema,
    features: VecDeque<Feature>,
    next_fid: u64,
}

impl Layer {
    pub fn new(schema: &'static LayerSchema) -> Self {
        Self {
            schema,
            features: VecDeque::new(),
            next_fid: 0,
        }
    }

    pub fn schema(&self) -> &'static LayerSchema {
        self.schema
    }

    pub fn name(&self) -> &'static str {
        self.schema.name
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Register a feature built from an attribute tuple and an optional
    /// geometry, validating the tuple against the schema.
    pub fn add_feature(
        &mut self,
        values: Vec<FieldValue>,
        geometry: Option<Geometry>,
    ) -> Result<u64> {
        if values.len() != self.schema.fields.len() {
            return Err(Error::schema(
                self.schema.name,
                format!(
                    "expected {} fields, got {}",
                    self.schema.fields.len(),
                    values.len()
                ),
            ));
        }
        for (value, defn) in values.iter().zip(self.schema.fields) {
            if !value.matches(defn.field_type) {
                return Err(Error::schema(
                    self.schema.name,
                    format!("field '{}' has mismatched value {:?}", defn.name, value),
                ));
            }
        }

        let fid = self.next_fid;
        self.next_fid += 1;
        self.features.push_back(Feature::new(fid, values, geometry));
        Ok(fid)
    }

    /// Re-register a copy of an existing feature (used for derived features
    /// such as displaced thresholds). A fresh fid is assigned.
    pub fn add_feature_copy(&mut self, feature: Feature) -> u64 {
        let fid = self.next_fid;
        self.next_fid += 1;
        self.features.push_back(feature.with_fid(fid));
        fid
    }

    pub fn feature(&self, fid: u64) -> Option<&Feature> {
        self.features.iter().rev().find(|f| f.fid() == fid)
    }

    /// Mutable access for computed-value backfills
    pub fn feature_mut(&mut self, fid: u64) -> Option<&mut Feature> {
        self.features.iter_mut().rev().find(|f| f.fid() == fid)
    }

    pub fn features(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    /// Remove and return the oldest buffered feature (streaming drain)
    pub fn pop_front(&mut self) -> Option<Feature> {
        self.features.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::FieldType;

    static TEST_SCHEMA: LayerSchema = LayerSchema {
        name: "Test",
        geometry_type: GeometryType::Point,
        fields: &[
            FieldDefn {
                name: "name",
                field_type: FieldType::String,
            },
            FieldDefn {
                name: "elevation_m",
                field_type: FieldType::Real,
            },
        ],
    };

    #[test]
    fn test_add_feature_checks_arity() {
        let mut layer = Layer::new(&TEST_SCHEMA);
        let err = layer
            .add_feature(vec![FieldValue::String("X".into())], None)
            .unwrap_err();
        assert!(matches!(err, Error::Schema { .. }));
        assert!(layer.is_empty());
    }

    #[test]
    fn test_add_feature_checks_types() {
        let mut layer = Layer::new(&TEST_SCHEMA);
        let err = layer
            .add_feature(
                vec![FieldValue::String("X".into()), FieldValue::Integer(3)],
                None,
            )
            .unwrap_err();
        assert!(matches!(err, Error::Schema { .. }));
    }

    #[test]
    fn test_null_is_accepted_anywhere() {
        let mut layer = Layer::new(&TEST_SCHEMA);
        layer
            .add_feature(vec![FieldValue::Null, FieldValue::Null], None)
            .unwrap();
        assert_eq!(layer.len(), 1);
    }

    #[test]
    fn test_fids_are_monotonic_and_survive_drain() {
        let mut layer = Layer::new(&TEST_SCHEMA);
        let values = || vec![FieldValue::String("X".into()), FieldValue::Real(1.0)];
        let a = layer.add_feature(values(), None).unwrap();
        let b = layer.add_feature(values(), None).unwrap();
        assert_eq!((a, b), (0, 1));
        assert_eq!(layer.pop_front().unwrap().fid(), 0);
        let c = layer.add_feature(values(), None).unwrap();
        assert_eq!(c, 2);
        assert!(layer.feature_mut(b).is_some());
    }

    #[test]
    fn test_backfill_by_fid() {
        let mut layer = Layer::new(&TEST_SCHEMA);
        let fid = layer
            .add_feature(vec![FieldValue::String("X".into()), FieldValue::Null], None)
            .unwrap();
        let idx = layer.schema().field_index("elevation_m").unwrap();
        layer
            .feature_mut(fid)
            .unwrap()
            .set_value(idx, FieldValue::Real(12.5));
        assert_eq!(
            layer.feature(fid).unwrap().value(idx),
            Some(&FieldValue::Real(12.5))
        );
    }
}
