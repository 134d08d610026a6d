//! nav.dat reader: radio navigation aids.
//!
//! Record codes 2-13 cover NDBs, VORs (including VORTAC and VOR-DME
//! stations), ILS localizers, glideslopes, the three marker beacons and
//! DMEs. Elevations arrive in feet, ranges in nautical miles, and VHF
//! frequencies in hundredths of a MHz; everything is converted on the way
//! into the layers. The glideslope record packs the approach slope into its
//! heading token.

use std::path::Path;

use crate::app::models::geometry::{Geometry, GeometryType, Point};
use crate::app::models::{FieldDefn, FieldType, FieldValue};
use crate::app::services::layer::{Layer, LayerSchema};
use crate::app::services::readers::{DatReader, ParseStats, ReaderCore};
use crate::app::services::tokenizer::RecordLine;
use crate::constants::nav_records::{
    DME as DME_RECORD, DME_ILS as DME_ILS_RECORD, GLIDESLOPE, ILS_LOC, INNER_MARKER,
    MIDDLE_MARKER, NDB as NDB_RECORD, OUTER_MARKER, STANDALONE_LOC, VOR as VOR_RECORD,
};
use crate::constants::{versions, FEET_TO_METER, MAX_ELEVATION_M, MIN_ELEVATION_M, NM_TO_KM};
use crate::Result;

/// Indices of the nav layers in registration order
pub mod index {
    pub const NDB: usize = 0;
    pub const VOR: usize = 1;
    pub const ILS: usize = 2;
    pub const GS: usize = 3;
    pub const MARKER: usize = 4;
    pub const DME_ILS: usize = 5;
    pub const DME: usize = 6;
    pub const COUNT: usize = 7;
}

const fn s(name: &'static str) -> FieldDefn {
    FieldDefn {
        name,
        field_type: FieldType::String,
    }
}
const fn i(name: &'static str) -> FieldDefn {
    FieldDefn {
        name,
        field_type: FieldType::Integer,
    }
}
const fn r(name: &'static str) -> FieldDefn {
    FieldDefn {
        name,
        field_type: FieldType::Real,
    }
}

pub static NDB: LayerSchema = LayerSchema {
    name: "NDB",
    geometry_type: GeometryType::Point,
    fields: &[
        s("navaid_id"),
        s("navaid_name"),
        r("elevation_m"),
        i("freq_khz"),
        r("range_km"),
    ],
};

pub static VOR: LayerSchema = LayerSchema {
    name: "VOR",
    geometry_type: GeometryType::Point,
    fields: &[
        s("navaid_id"),
        s("navaid_name"),
        r("elevation_m"),
        r("freq_mhz"),
        r("range_km"),
        r("slaved_variation_deg"),
    ],
};

pub static ILS: LayerSchema = LayerSchema {
    name: "ILS",
    geometry_type: GeometryType::Point,
    fields: &[
        s("navaid_id"),
        s("apt_icao"),
        s("rwy_num"),
        s("subtype"),
        r("elevation_m"),
        r("freq_mhz"),
        r("range_km"),
        r("true_heading_deg"),
    ],
};

pub static GS: LayerSchema = LayerSchema {
    name: "GS",
    geometry_type: GeometryType::Point,
    fields: &[
        s("navaid_id"),
        s("apt_icao"),
        s("rwy_num"),
        r("elevation_m"),
        r("freq_mhz"),
        r("range_km"),
        r("true_heading_deg"),
        r("glide_slope_deg"),
    ],
};

pub static MARKER: LayerSchema = LayerSchema {
    name: "Marker",
    geometry_type: GeometryType::Point,
    fields: &[
        s("apt_icao"),
        s("rwy_num"),
        s("subtype"),
        r("elevation_m"),
        r("true_heading_deg"),
    ],
};

pub static DME_ILS: LayerSchema = LayerSchema {
    name: "DMEILS",
    geometry_type: GeometryType::Point,
    fields: &[
        s("navaid_id"),
        s("apt_icao"),
        s("rwy_num"),
        r("elevation_m"),
        r("freq_mhz"),
        r("range_km"),
        r("bias_km"),
    ],
};

pub static DME: LayerSchema = LayerSchema {
    name: "DME",
    geometry_type: GeometryType::Point,
    fields: &[
        s("navaid_id"),
        s("navaid_name"),
        r("elevation_m"),
        r("freq_mhz"),
        r("range_km"),
        r("bias_km"),
    ],
};

fn point(lat: f64, lon: f64) -> Option<Geometry> {
    Some(Geometry::Point(Point::new(lon, lat)))
}

/// Reader for `nav.dat` navaid data files
pub struct NavReader {
    core: ReaderCore,
    layers: Vec<Layer>,
}

impl NavReader {
    pub fn open(path: &Path) -> Result<Self> {
        let core = ReaderCore::open(path, versions::NAV)?;
        Ok(Self {
            core,
            layers: Self::create_layers(),
        })
    }

    fn create_layers() -> Vec<Layer> {
        vec![
            Layer::new(&NDB),
            Layer::new(&VOR),
            Layer::new(&ILS),
            Layer::new(&GS),
            Layer::new(&MARKER),
            Layer::new(&DME_ILS),
            Layer::new(&DME),
        ]
    }

    pub fn version(&self) -> &str {
        self.core.version()
    }

    fn read_elevation(rec: &RecordLine) -> Result<f64> {
        rec.read_f64_converted(
            3,
            "elevation",
            FEET_TO_METER,
            MIN_ELEVATION_M,
            MAX_ELEVATION_M,
        )
    }

    fn parse_ndb(&mut self, rec: &RecordLine) -> Result<()> {
        rec.assert_min_col(9)?;
        let (lat, lon) = rec.read_lat_lon(1)?;
        let elevation_m = Self::read_elevation(rec)?;
        let freq_khz = rec.read_int(4, "frequency")?;
        let range_km = rec.read_f64(5, "range")? * NM_TO_KM;
        // token 6 ignored
        let id = rec.read_string(7)?;
        let name = rec.read_string_until_end(8);

        self.layers[index::NDB].add_feature(
            vec![
                FieldValue::String(id.to_string()),
                FieldValue::String(name),
                FieldValue::Real(elevation_m),
                FieldValue::Integer(freq_khz),
                FieldValue::Real(range_km),
            ],
            point(lat, lon),
        )?;
        Ok(())
    }

    fn parse_vor(&mut self, rec: &RecordLine) -> Result<()> {
        rec.assert_min_col(9)?;
        let (lat, lon) = rec.read_lat_lon(1)?;
        let elevation_m = Self::read_elevation(rec)?;
        let freq_mhz = rec.read_f64(4, "frequency")? / 100.0;
        let range_km = rec.read_f64(5, "range")? * NM_TO_KM;
        let slaved_variation = rec.read_f64(6, "slaved variation")?;
        let id = rec.read_string(7)?;
        let name = rec.read_string_until_end(8);

        self.layers[index::VOR].add_feature(
            vec![
                FieldValue::String(id.to_string()),
                FieldValue::String(name),
                FieldValue::Real(elevation_m),
                FieldValue::Real(freq_mhz),
                FieldValue::Real(range_km),
                FieldValue::Real(slaved_variation),
            ],
            point(lat, lon),
        )?;
        Ok(())
    }

    fn parse_localizer(&mut self, rec: &RecordLine) -> Result<()> {
        rec.assert_min_col(11)?;
        let (lat, lon) = rec.read_lat_lon(1)?;
        let elevation_m = Self::read_elevation(rec)?;
        let freq_mhz = rec.read_f64(4, "frequency")? / 100.0;
        let range_km = rec.read_f64(5, "range")? * NM_TO_KM;
        let true_heading = rec.read_true_heading(6, "true heading")?;
        let id = rec.read_string(7)?;
        let apt_icao = rec.read_string(8)?;
        let rwy_num = rec.read_string(9)?;
        let subtype = rec.read_string_until_end(10);

        self.layers[index::ILS].add_feature(
            vec![
                FieldValue::String(id.to_string()),
                FieldValue::String(apt_icao.to_string()),
                FieldValue::String(rwy_num.to_string()),
                FieldValue::String(subtype),
                FieldValue::Real(elevation_m),
                FieldValue::Real(freq_mhz),
                FieldValue::Real(range_km),
                FieldValue::Real(true_heading),
            ],
            point(lat, lon),
        )?;
        Ok(())
    }

    fn parse_glideslope(&mut self, rec: &RecordLine) -> Result<()> {
        rec.assert_min_col(11)?;
        let (lat, lon) = rec.read_lat_lon(1)?;
        let elevation_m = Self::read_elevation(rec)?;
        let freq_mhz = rec.read_f64(4, "frequency")? / 100.0;
        let range_km = rec.read_f64(5, "range")? * NM_TO_KM;
        // the heading token packs the glide slope:
        // 325176.23 means a 3.25 degree slope on a 176.23 degree heading
        let packed = rec.read_f64(6, "true heading")?;
        let glide_slope = (packed / 1000.0).trunc() / 100.0;
        let true_heading = packed - (packed / 1000.0).trunc() * 1000.0;
        let id = rec.read_string(7)?;
        let apt_icao = rec.read_string(8)?;
        let rwy_num = rec.read_string(9)?;

        self.layers[index::GS].add_feature(
            vec![
                FieldValue::String(id.to_string()),
                FieldValue::String(apt_icao.to_string()),
                FieldValue::String(rwy_num.to_string()),
                FieldValue::Real(elevation_m),
                FieldValue::Real(freq_mhz),
                FieldValue::Real(range_km),
                FieldValue::Real(true_heading),
                FieldValue::Real(glide_slope),
            ],
            point(lat, lon),
        )?;
        Ok(())
    }

    fn parse_marker(&mut self, rec: &RecordLine, code: i32) -> Result<()> {
        rec.assert_min_col(10)?;
        let (lat, lon) = rec.read_lat_lon(1)?;
        let elevation_m = Self::read_elevation(rec)?;
        let true_heading = rec.read_true_heading(6, "true heading")?;
        let apt_icao = rec.read_string(8)?;
        let rwy_num = rec.read_string(9)?;
        let subtype = match code {
            OUTER_MARKER => "OM",
            MIDDLE_MARKER => "MM",
            _ => "IM",
        };

        self.layers[index::MARKER].add_feature(
            vec![
                FieldValue::String(apt_icao.to_string()),
                FieldValue::String(rwy_num.to_string()),
                FieldValue::String(subtype.to_string()),
                FieldValue::Real(elevation_m),
                FieldValue::Real(true_heading),
            ],
            point(lat, lon),
        )?;
        Ok(())
    }

    fn parse_dme(&mut self, rec: &RecordLine, code: i32) -> Result<()> {
        rec.assert_min_col(11)?;
        let (lat, lon) = rec.read_lat_lon(1)?;
        let elevation_m = Self::read_elevation(rec)?;
        let freq_mhz = rec.read_f64(4, "frequency")? / 100.0;
        let range_km = rec.read_f64(5, "range")? * NM_TO_KM;
        let bias_km = rec.read_f64(6, "DME bias")? * NM_TO_KM;
        let id = rec.read_string(7)?;

        if code == DME_ILS_RECORD {
            let apt_icao = rec.read_string(8)?;
            let rwy_num = rec.read_string(9)?;
            self.layers[index::DME_ILS].add_feature(
                vec![
                    FieldValue::String(id.to_string()),
                    FieldValue::String(apt_icao.to_string()),
                    FieldValue::String(rwy_num.to_string()),
                    FieldValue::Real(elevation_m),
                    FieldValue::Real(freq_mhz),
                    FieldValue::Real(range_km),
                    FieldValue::Real(bias_km),
                ],
                point(lat, lon),
            )?;
        } else {
            let name = rec.read_string_until_end(8);
            self.layers[index::DME].add_feature(
                vec![
                    FieldValue::String(id.to_string()),
                    FieldValue::String(name),
                    FieldValue::Real(elevation_m),
                    FieldValue::Real(freq_mhz),
                    FieldValue::Real(range_km),
                    FieldValue::Real(bias_km),
                ],
                point(lat, lon),
            )?;
        }
        Ok(())
    }

    fn dispatch(&mut self, rec: &RecordLine) -> Result<bool> {
        let code = rec.record_code();
        match code {
            NDB_RECORD => self.parse_ndb(rec)?,
            VOR_RECORD => self.parse_vor(rec)?,
            ILS_LOC | STANDALONE_LOC => self.parse_localizer(rec)?,
            GLIDESLOPE => self.parse_glideslope(rec)?,
            OUTER_MARKER | MIDDLE_MARKER | INNER_MARKER => self.parse_marker(rec, code)?,
            DME_ILS_RECORD | DME_RECORD => self.parse_dme(rec, code)?,
            _ => {
                self.core.unknown_code(rec.line_number, code);
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl DatReader for NavReader {
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
            if let Err(e) = rec.assert_min_col(2) {
                self.core.skip_record(&e);
                continue;
            }

            match self.dispatch(&rec) {
                Ok(true) => self.core.stats.records_parsed += 1,
                Ok(false) => {}
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn nav_file(records: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .prefix("nav")
            .suffix(".dat")
            .tempfile()
            .unwrap();
        writeln!(file, "I").unwrap();
        writeln!(file, "810 Version - data cycle 2008.01").unwrap();
        write!(file, "{}", records).unwrap();
        writeln!(file, "99").unwrap();
        file.flush().unwrap();
        file
    }

    fn read_all(records: &str) -> NavReader {
        let file = nav_file(records);
        let mut reader = NavReader::open(file.path()).unwrap();
        reader.read_until(None).unwrap();
        reader
    }

    #[test]
    fn test_ndb_record() {
        let reader =
            read_all("2  47.632522 -122.389887      0    362    50    0.0 BF NOLLA NDB\n");
        let layer = &reader.layers()[index::NDB];
        assert_eq!(layer.len(), 1);
        let f = layer.features().next().unwrap();
        assert_eq!(f.value(0).unwrap().as_str(), Some("BF"));
        assert_eq!(f.value(1).unwrap().as_str(), Some("NOLLA NDB"));
        assert_eq!(f.value(3).unwrap().as_integer(), Some(362));
        assert!((f.value(4).unwrap().as_real().unwrap() - 92.6).abs() < 1e-9);
    }

    #[test]
    fn test_vor_frequency_conversion() {
        let reader = read_all(
            "3  47.435372 -122.309695    354  11680   130     19.0 SEA SEATTLE VORTAC\n",
        );
        let layer = &reader.layers()[index::VOR];
        assert_eq!(layer.len(), 1);
        let f = layer.features().next().unwrap();
        assert!((f.value(3).unwrap().as_real().unwrap() - 116.80).abs() < 1e-9);
        assert!((f.value(5).unwrap().as_real().unwrap() - 19.0).abs() < 1e-9);
        // 354 ft in meters
        assert!((f.value(2).unwrap().as_real().unwrap() - 107.9).abs() < 0.1);
    }

    #[test]
    fn test_localizer_record() {
        let reader = read_all(
            "4  47.437969 -122.310985    425  11030    18     180.343 ISNQ KSEA 16L ILS-cat-I\n",
        );
        let layer = &reader.layers()[index::ILS];
        assert_eq!(layer.len(), 1);
        let f = layer.features().next().unwrap();
        assert_eq!(f.value(0).unwrap().as_str(), Some("ISNQ"));
        assert_eq!(f.value(1).unwrap().as_str(), Some("KSEA"));
        assert_eq!(f.value(2).unwrap().as_str(), Some("16L"));
        assert_eq!(f.value(3).unwrap().as_str(), Some("ILS-cat-I"));
        assert!((f.value(7).unwrap().as_real().unwrap() - 180.343).abs() < 1e-9);
    }

    #[test]
    fn test_glideslope_packed_heading() {
        let reader = read_all(
            "6  47.460816 -122.309394    425  11030    10  325176.23 ISNQ KSEA 16L GS\n",
        );
        let layer = &reader.layers()[index::GS];
        assert_eq!(layer.len(), 1);
        let f = layer.features().next().unwrap();
        let heading = f.value(6).unwrap().as_real().unwrap();
        let slope = f.value(7).unwrap().as_real().unwrap();
        assert!((slope - 3.25).abs() < 1e-9, "slope {}", slope);
        assert!((heading - 176.23).abs() < 1e-9, "heading {}", heading);
    }

    #[test]
    fn test_marker_subtypes() {
        let reader = read_all(concat!(
            "7  47.530629 -122.307560    370      0     0     180.343 ---- KSEA 16L OM\n",
            "8  47.473350 -122.310742    433      0     0     180.343 ---- KSEA 16L MM\n",
            "9  47.461094 -122.310985    425      0     0     180.343 ---- KSEA 16L IM\n",
        ));
        let layer = &reader.layers()[index::MARKER];
        assert_eq!(layer.len(), 3);
        let subtypes: Vec<_> = layer
            .features()
            .map(|f| f.value(2).unwrap().as_str().unwrap().to_string())
            .collect();
        assert_eq!(subtypes, vec!["OM", "MM", "IM"]);
    }

    #[test]
    fn test_dme_records_split_by_coupling() {
        let reader = read_all(concat!(
            "12 47.434967 -122.306258    369  11030    18      0.0 ISNQ KSEA 16L DME-ILS\n",
            "13 47.435372 -122.309695    354  11680   130      0.0 SEA SEATTLE VORTAC DME\n",
        ));
        assert_eq!(reader.layers()[index::DME_ILS].len(), 1);
        assert_eq!(reader.layers()[index::DME].len(), 1);
        let dme = reader.layers()[index::DME].features().next().unwrap();
        assert_eq!(dme.value(1).unwrap().as_str(), Some("SEATTLE VORTAC DME"));
    }

    #[test]
    fn test_out_of_range_latitude_skips_record_only() {
        let reader = read_all(concat!(
            "2  91.5 -122.389887      0    362    50    0.0 BF NOLLA NDB\n",
            "2  47.632522 -122.389887      0    362    50    0.0 BF NOLLA NDB\n",
        ));
        assert_eq!(reader.layers()[index::NDB].len(), 1);
        assert_eq!(reader.stats().records_skipped, 1);
        assert_eq!(reader.stats().records_parsed, 1);
    }

    #[test]
    fn test_unknown_code_is_counted_not_fatal() {
        let reader = read_all("42 1.0 2.0 junk record\n");
        assert_eq!(reader.stats().unknown_codes, 1);
        assert_eq!(reader.stats().records_skipped, 0);
    }

    #[test]
    fn test_rejects_wrong_version() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "I").unwrap();
        writeln!(file, "600 Version").unwrap();
        writeln!(file, "99").unwrap();
        file.flush().unwrap();
        assert!(NavReader::open(file.path()).is_err());
    }
}
