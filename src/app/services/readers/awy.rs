//! earth_awy.dat reader: airway segments between named intersections.
//!
//! Airway records carry no leading type code: every line is one segment
//! (two named endpoints, a low/high flag, base and top flight levels, and a
//! dash-separated list of airway names sharing the segment). Segments that
//! cross the antimeridian are split at longitude 180 into a two-part
//! multi-line so no geometry ever spans 340 degrees of longitude.

use std::path::Path;

use crate::app::models::geometry::{
    Geometry, GeometryType, LineString, MultiLineString, Point,
};
use crate::app::models::{FieldDefn, FieldType, FieldValue};
use crate::app::services::layer::{Layer, LayerSchema};
use crate::app::services::readers::{DatReader, ParseStats, ReaderCore};
use crate::app::services::tokenizer::RecordLine;
use crate::constants::versions;
use crate::Result;

/// Indices of the awy layers in registration order
pub mod index {
    pub const SEGMENT: usize = 0;
    pub const INTERSECTION: usize = 1;
    pub const COUNT: usize = 2;
}

const fn s(name: &'static str) -> FieldDefn {
    FieldDefn {
        name,
        field_type: FieldType::String,
    }
}

pub static AIRWAY_SEGMENT: LayerSchema = LayerSchema {
    name: "AirwaySegment",
    geometry_type: GeometryType::Line,
    fields: &[
        s("segment_name"),
        s("point1_name"),
        s("point2_name"),
        FieldDefn {
            name: "is_high",
            field_type: FieldType::Boolean,
        },
        FieldDefn {
            name: "base_FL",
            field_type: FieldType::Integer,
        },
        FieldDefn {
            name: "top_FL",
            field_type: FieldType::Integer,
        },
    ],
};

pub static AIRWAY_INTERSECTION: LayerSchema = LayerSchema {
    name: "AirwayIntersection",
    geometry_type: GeometryType::Point,
    fields: &[s("name")],
};

/// Segment geometry, split in two at the antimeridian when the endpoints
/// are more than 180 degrees of longitude apart
pub fn segment_geometry(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Geometry {
    if (lon1 - lon2).abs() <= 180.0 {
        let mut line = LineString::new();
        line.push(Point::new(lon1, lat1));
        line.push(Point::new(lon2, lat2));
        return Geometry::Line(line);
    }

    // latitude of the crossing, linear in unwrapped longitude
    let span1 = 180.0 - lon1.abs();
    let span2 = 180.0 - lon2.abs();
    let ratio = if span1 + span2 > 0.0 {
        span1 / (span1 + span2)
    } else {
        0.5
    };
    let lat_cross = lat1 + (lat2 - lat1) * ratio;
    let edge1 = if lon1 < 0.0 { -180.0 } else { 180.0 };

    let mut first = LineString::new();
    first.push(Point::new(lon1, lat1));
    first.push(Point::new(edge1, lat_cross));
    let mut second = LineString::new();
    second.push(Point::new(-edge1, lat_cross));
    second.push(Point::new(lon2, lat2));

    let mut multiline = MultiLineString::new();
    multiline.push(first);
    multiline.push(second);
    Geometry::MultiLine(multiline)
}

/// Reader for `earth_awy.dat` airway data files
pub struct AwyReader {
    core: ReaderCore,
    layers: Vec<Layer>,
}

impl AwyReader {
    pub fn open(path: &Path) -> Result<Self> {
        let core = ReaderCore::open(path, versions::AWY)?;
        Ok(Self {
            core,
            layers: Self::create_layers(),
        })
    }

    fn create_layers() -> Vec<Layer> {
        vec![
            Layer::new(&AIRWAY_SEGMENT),
            Layer::new(&AIRWAY_INTERSECTION),
        ]
    }

    pub fn version(&self) -> &str {
        self.core.version()
    }

    fn parse_segment(&mut self, rec: &RecordLine) -> Result<()> {
        rec.assert_min_col(10)?;

        let point1_name = rec.read_string(0)?.to_string();
        let (lat1, lon1) = rec.read_lat_lon(1)?;
        let point2_name = rec.read_string(3)?.to_string();
        let (lat2, lon2) = rec.read_lat_lon(4)?;
        let is_high = rec.read_int_lenient(6) == 2;
        let base_fl = rec.read_int(7, "base flight level")?;
        let top_fl = rec.read_int(8, "top flight level")?;
        let names = rec.read_string(9)?;

        // one feature per airway sharing the segment
        for name in names.split('-').filter(|n| !n.is_empty()) {
            self.layers[index::SEGMENT].add_feature(
                vec![
                    FieldValue::String(name.to_string()),
                    FieldValue::String(point1_name.clone()),
                    FieldValue::String(point2_name.clone()),
                    FieldValue::Boolean(is_high),
                    FieldValue::Integer(base_fl),
                    FieldValue::Integer(top_fl),
                ],
                Some(segment_geometry(lat1, lon1, lat2, lon2)),
            )?;
        }

        for (name, lat, lon) in [(&point1_name, lat1, lon1), (&point2_name, lat2, lon2)] {
            self.layers[index::INTERSECTION].add_feature(
                vec![FieldValue::String(name.clone())],
                Some(Geometry::Point(Point::new(lon, lat))),
            )?;
        }
        Ok(())
    }
}

impl DatReader for AwyReader {
    fn layers(&self) -> &[Layer] {
        &self.layers
    }

    fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    fn stats(&self) -> &ParseStats {
        &self.core.stats
    }

    fn read_until(&mut self, interest: Option<usize>) -> Result<bool> {
        if self.core.eof() {
            return Ok(true);
        }
        loop {
            let Some(rec) = self.core.next_record()? else {
                self.core.mark_eof();
                return Ok(true);
            };
            if rec.is_end_of_section() {
                self.core.mark_eof();
                return Ok(true);
            }
            if rec.token_count() == 0 {
                continue;
            }

            match self.parse_segment(&rec) {
                Ok(()) => self.core.stats.records_parsed += 1,
                Err(e) => self.core.skip_record(&e),
            }

            if let Some(idx) = interest {
                if !self.layers[idx].is_empty() {
                    return Ok(false);
                }
            }
        }
    }

    fn rewind(&mut self) -> Result<()> {
        self.core.rewind()?;
        self.layers = Self::create_layers();
        Ok(())
    }
}
