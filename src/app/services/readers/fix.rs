//! earth_fix.dat reader: named en-route intersections.
//!
//! The simplest member of the family: after the header, every line is a
//! latitude, a longitude and a fix name. Like the airway file there is no
//! leading record-type code.

use std::path::Path;

use crate::app::models::geometry::{Geometry, GeometryType, Point};
use crate::app::models::{FieldDefn, FieldType, FieldValue};
use crate::app::services::layer::{Layer, LayerSchema};
use crate::app::services::readers::{DatReader, ParseStats, ReaderCore};
use crate::app::services::tokenizer::RecordLine;
use crate::constants::versions;
use crate::Result;

pub static FIX: LayerSchema = LayerSchema {
    name: "FIX",
    geometry_type: GeometryType::Point,
    fields: &[FieldDefn {
        name: "fix_name",
        field_type: FieldType::String,
    }],
};

/// Reader for `earth_fix.dat` fix data files
pub struct FixReader {
    core: ReaderCore,
    layers: Vec<Layer>,
}

impl FixReader {
    pub fn open(path: &Path) -> Result<Self> {
        let core = ReaderCore::open(path, versions::FIX)?;
        Ok(Self {
            core,
            layers: vec![Layer::new(&FIX)],
        })
    }

    pub fn version(&self) -> &str {
        self.core.version()
    }

    fn parse_fix(&mut self, rec: &RecordLine) -> Result<()> {
        rec.assert_min_col(3)?;
        let (lat, lon) = rec.read_lat_lon(0)?;
        let name = rec.read_string_until_end(2);
        self.layers[0].add_feature(
            vec![FieldValue::String(name)],
            Some(Geometry::Point(Point::new(lon, lat))),
        )?;
        Ok(())
    }
}

impl DatReader for FixReader {
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

            match self.parse_fix(&rec) {
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
        self.layers = vec![Layer::new(&FIX)];
        Ok(())
    }
}
