//! apt.dat record dispatch and per-record parsers.
//!
//! One parser per record-type code. Conversion or range failures abort only
//! the offending record; sibling lines keep parsing. The airport header,
//! tower and first-runway coordinates are buffered across records and only
//! committed as an APT feature when the next header or the end of the file
//! is reached, since the effective airport position depends on whether a
//! tower was found.

use std::path::Path;

use super::geometry::{parse_linear_geometry, parse_polygonal_geometry};
use super::layers::{self, index};
use crate::app::models::geometry::Geometry;
use crate::app::services::enumerations as enums;
use crate::app::services::geo;
use crate::app::services::layer::Layer;
use crate::app::services::readers::{DatReader, ParseStats, ReaderCore};
use crate::app::services::tokenizer::{atoi, RecordLine};
use crate::constants::apt_records::*;
use crate::constants::{
    versions, FEET_TO_METER, MAX_ELEVATION_M, MAX_TOWER_HEIGHT_M, MIN_ELEVATION_M,
    MIN_TOWER_HEIGHT_M,
};
use crate::{Error, Result};

/// Airport header state buffered across records until the next header or
/// end of file commits it
#[derive(Debug, Default)]
struct PendingAirport {
    header_found: bool,
    header_code: i32,
    icao: String,
    name: String,
    elevation_m: f64,
    tower: Option<Tower>,
    first_runway: Option<(f64, f64)>,
}

#[derive(Debug)]
struct Tower {
    lat: f64,
    lon: f64,
    height_m: f64,
    name: String,
}

impl PendingAirport {
    fn reset(&mut self) {
        *self = Self::default();
    }

    /// Record the first runway threshold seen for this airport; it stands
    /// in for the airport position when no tower record shows up
    fn note_runway(&mut self, lat: f64, lon: f64) {
        if self.first_runway.is_none() {
            self.first_runway = Some((lat, lon));
        }
    }

    fn apt_type(&self) -> i32 {
        match self.header_code {
            SEAPLANE_HEADER => 1,
            HELIPORT_HEADER => 2,
            _ => 0,
        }
    }
}

/// Reader for `apt.dat` airport data files
pub struct AptReader {
    core: ReaderCore,
    layers: Vec<Layer>,
    pending: PendingAirport,
    /// Record handed back by a geometry sub-loop, re-dispatched before the
    /// next line is read
    lookahead: Option<RecordLine>,
}

impl AptReader {
    pub fn open(path: &Path) -> Result<Self> {
        let core = ReaderCore::open(path, versions::APT)?;
        Ok(Self {
            core,
            layers: layers::create_layers(),
            pending: PendingAirport::default(),
            lookahead: None,
        })
    }

    pub fn version(&self) -> &str {
        self.core.version()
    }

    /// Commit the buffered airport, if any, to the APT layer
    fn flush_pending(&mut self) -> Result<()> {
        if !self.pending.header_found {
            return Ok(());
        }
        self.pending.header_found = false;

        let position = match (&self.pending.tower, self.pending.first_runway) {
            (Some(t), _) => Some((t.lat, t.lon)),
            (None, Some(rwy)) => Some(rwy),
            (None, None) => None,
        };
        if position.is_none() {
            tracing::debug!(
                "Airport {}/{} has no coordinates",
                self.pending.icao,
                self.pending.name
            );
        }
        layers::add_airport(
            &mut self.layers[index::APT],
            &self.pending.icao,
            &self.pending.name,
            self.pending.apt_type(),
            self.pending.elevation_m,
            position,
            self.pending
                .tower
                .as_ref()
                .map(|t| (t.height_m, t.name.as_str())),
        )?;
        Ok(())
    }

    fn parse_airport_header(&mut self, rec: &RecordLine, header_code: i32) -> Result<()> {
        self.pending.reset();

        rec.assert_min_col(6)?;
        let elevation_m = rec.read_f64_converted(
            1,
            "elevation",
            FEET_TO_METER,
            MIN_ELEVATION_M,
            MAX_ELEVATION_M,
        )?;
        // token 2 (tower flag) and token 3 are carried by the format but the
        // committed feature derives has_tower from an actual tower record
        self.pending.icao = rec.read_string(4)?.to_string();
        self.pending.name = rec.read_string_until_end(5);
        self.pending.elevation_m = elevation_m;
        self.pending.header_code = header_code;
        self.pending.header_found = true;
        Ok(())
    }

    fn parse_tower(&mut self, rec: &RecordLine) -> Result<()> {
        rec.assert_min_col(6)?;
        let (lat, lon) = rec.read_lat_lon(1)?;
        let height_m = rec.read_f64_converted(
            3,
            "tower height",
            FEET_TO_METER,
            MIN_TOWER_HEIGHT_M,
            MAX_TOWER_HEIGHT_M,
        )?;
        // token 4 ignored
        let name = rec.read_string_until_end(5);
        self.pending.tower = Some(Tower {
            lat,
            lon,
            height_m,
            name,
        });
        Ok(())
    }

    /// v8.50 land runway record: 8 shared columns then 9 per end
    fn parse_runway(&mut self, rec: &RecordLine) -> Result<()> {
        rec.assert_min_col(8 + 9 + 9)?;

        let width_m = rec.read_f64(1, "runway width")?;
        let surface = enums::RUNWAY_SURFACE.text(rec.read_int_lenient(2));
        let shoulder = enums::RUNWAY_SHOULDER.text(rec.read_int_lenient(3));
        let smoothness = rec.read_f64_bounded(4, "runway smoothness", 0.0, 1.0)?;
        let centerline_lights = rec.read_bool_flag(5);
        let edge_lighting = enums::RUNWAY_EDGE_LIGHTING.text(rec.read_int_lenient(6));
        let distance_remaining_signs = rec.read_bool_flag(7);

        let mut ends = Vec::with_capacity(2);
        for nrwy in 0..2 {
            let base = 8 + 9 * nrwy;
            let rwy_num = rec.read_string(base)?.to_string();
            let (lat, lon) = rec.read_lat_lon(base + 1)?;
            let displaced = rec.read_f64(base + 3, "displaced threshold length")?;
            let stopway = rec.read_f64(base + 4, "stopway/blastpad/over-run length")?;
            let markings = enums::RUNWAY_MARKING.text(rec.read_int_lenient(base + 5));
            let approach = enums::RUNWAY_APPROACH_LIGHTING.text(rec.read_int_lenient(base + 6));
            let touchdown = rec.read_bool_flag(base + 7);
            let reil = enums::RUNWAY_REIL.text(rec.read_int_lenient(base + 8));
            ends.push((rwy_num, lat, lon, displaced, stopway, markings, approach, touchdown, reil));
        }
        for (_, lat, lon, ..) in &ends {
            self.pending.note_runway(*lat, *lon);
        }

        let common = layers::RunwayCommon {
            icao: &self.pending.icao,
            width_m,
            surface,
            shoulder,
            smoothness,
            centerline_lights,
            edge_lighting,
            distance_remaining_signs,
        };
        let (lat1, lon1) = (ends[0].1, ends[0].2);
        let (lat2, lon2) = (ends[1].1, ends[1].2);
        let length_m = geo::distance(lat1, lon1, lat2, lon2);

        let threshold_layer = &mut self.layers[index::RUNWAY_THRESHOLD];
        for nrwy in 0..2 {
            let (rwy_num, lat, lon, displaced, stopway, markings, approach, touchdown, reil) =
                &ends[nrwy];
            let end = layers::ThresholdEnd {
                rwy_num,
                lat: *lat,
                lon: *lon,
                displaced_threshold_m: *displaced,
                stopway_length_m: *stopway,
                markings: *markings,
                approach_lighting: *approach,
                touchdown_lights: *touchdown,
                reil: *reil,
            };
            let fid = layers::add_runway_threshold(threshold_layer, &common, &end)?;
            let (olat, olon) = (ends[1 - nrwy].1, ends[1 - nrwy].2);
            let heading = geo::track(*lat, *lon, olat, olon);
            layers::set_runway_length_and_heading(threshold_layer, fid, length_m, heading);
            if *displaced != 0.0 {
                layers::add_displaced_threshold(threshold_layer, fid);
            }
        }

        layers::add_runway_polygon(
            &mut self.layers[index::RUNWAY_POLYGON],
            &common,
            &ends[0].0,
            &ends[1].0,
            lat1,
            lon1,
            lat2,
            lon2,
        )?;

        for nrwy in 0..2 {
            let stopway = ends[nrwy].4;
            if stopway != 0.0 {
                let (lat, lon) = (ends[nrwy].1, ends[nrwy].2);
                let (olat, olon) = (ends[1 - nrwy].1, ends[1 - nrwy].2);
                let heading = geo::track(lat, lon, olat, olon);
                layers::add_stopway(
                    &mut self.layers[index::STOPWAY],
                    &self.pending.icao,
                    &ends[nrwy].0,
                    lat,
                    lon,
                    heading,
                    width_m,
                    stopway,
                )?;
            }
        }
        Ok(())
    }

    fn parse_water_runway(&mut self, rec: &RecordLine) -> Result<()> {
        rec.assert_min_col(9)?;

        let width_m = rec.read_f64(1, "runway width")?;
        let has_buoys = rec.read_bool_flag(2);
        let mut ids = Vec::with_capacity(2);
        let mut positions = Vec::with_capacity(2);
        for i in 0..2 {
            ids.push(rec.read_string(3 + 3 * i)?.to_string());
            positions.push(rec.read_lat_lon(4 + 3 * i)?);
        }
        for (lat, lon) in &positions {
            self.pending.note_runway(*lat, *lon);
        }

        let (lat1, lon1) = positions[0];
        let (lat2, lon2) = positions[1];
        let length_m = geo::distance(lat1, lon1, lat2, lon2);

        let layer = &mut self.layers[index::WATER_RUNWAY_THRESHOLD];
        for i in 0..2 {
            let (lat, lon) = positions[i];
            let fid = layers::add_water_runway_threshold(
                layer,
                &self.pending.icao,
                &ids[i],
                lat,
                lon,
                width_m,
                has_buoys,
            )?;
            let (olat, olon) = positions[1 - i];
            let heading = geo::track(lat, lon, olat, olon);
            layers::set_runway_length_and_heading(layer, fid, length_m, heading);
        }

        layers::add_water_runway_polygon(
            &mut self.layers[index::WATER_RUNWAY_POLYGON],
            &self.pending.icao,
            &ids[0],
            &ids[1],
            lat1,
            lon1,
            lat2,
            lon2,
            width_m,
            has_buoys,
        )?;
        Ok(())
    }

    fn parse_helipad(&mut self, rec: &RecordLine) -> Result<()> {
        rec.assert_min_col(12)?;

        let name = rec.read_string(1)?.to_string();
        let (lat, lon) = rec.read_lat_lon(2)?;
        let true_heading = rec.read_true_heading(4, "true heading")?;
        let length_m = rec.read_f64(5, "length")?;
        let width_m = rec.read_f64(6, "width")?;
        let surface = enums::RUNWAY_SURFACE.text(rec.read_int_lenient(7));
        let markings = enums::RUNWAY_MARKING.text(rec.read_int_lenient(8));
        let shoulder = enums::RUNWAY_SHOULDER.text(rec.read_int_lenient(9));
        let smoothness = rec.read_f64_bounded(10, "helipad smoothness", 0.0, 1.0)?;
        let edge_lighting = enums::HELIPAD_EDGE_LIGHTING.text(rec.read_int_lenient(11));

        let data = layers::HelipadData {
            icao: &self.pending.icao,
            name: &name,
            lat,
            lon,
            true_heading,
            length_m,
            width_m,
            surface,
            markings,
            shoulder,
            smoothness,
            edge_lighting,
        };
        layers::add_helipad(&mut self.layers[index::HELIPAD], &data)?;
        layers::add_helipad_polygon(&mut self.layers[index::HELIPAD_POLYGON], &data)?;
        Ok(())
    }

    /// v8.10 combined runway/taxiway/helipad record. The runway-number token
    /// decides which feature family the record feeds.
    fn parse_runway_taxiway_v810(&mut self, rec: &RecordLine) -> Result<()> {
        rec.assert_min_col(15)?;

        let (lat, lon) = rec.read_lat_lon(1)?;
        let rwy_num = rec.read_string(3)?.to_string();
        let true_heading = rec.read_true_heading(4, "true heading")?;
        let length_m = rec.read_f64(5, "length")? * FEET_TO_METER;
        let displaced = rec.read_paired_values(6, FEET_TO_METER)?;
        let stopway = rec.read_paired_values(7, FEET_TO_METER)?;
        let width_m = rec.read_f64(8, "width")? * FEET_TO_METER;

        // six-digit lighting token: per-end visual-approach, runway and
        // approach lighting codes
        let lighting = rec.read_string(9)?;
        let (runway_lighting, approach_lighting) = if lighting.len() == 6 {
            let digit = |i: usize| lighting.as_bytes()[i] as i32 - '0' as i32;
            ([digit(1), digit(4)], [digit(2), digit(5)])
        } else {
            ([0, 0], [0, 0])
        };

        let surface_code = rec.read_int_lenient(10);
        let surface = enums::RUNWAY_SURFACE.text(surface_code);
        let shoulder = enums::RUNWAY_SHOULDER.text(rec.read_int_lenient(11));
        let markings = enums::RUNWAY_MARKING.text(rec.read_int_lenient(12));
        let smoothness = rec.read_f64_bounded(13, "runway smoothness", 0.0, 1.0)?;
        let distance_remaining_signs = rec.read_bool_flag(14);
        let glide_angles = if rec.token_count() == 16 {
            let token = rec.read_string(15)?;
            let first = atoi(token) as f64 / 100.0;
            let second = match token.split_once('.') {
                Some((_, rest)) => atoi(rest) as f64 / 100.0,
                None => 0.0,
            };
            [first, second]
        } else {
            [0.0, 0.0]
        };

        if rwy_num == "xxx" {
            // taxiway
            layers::add_taxiway_rectangle(
                &mut self.layers[index::TAXIWAY_RECTANGLE],
                &self.pending.icao,
                lat,
                lon,
                true_heading,
                length_m,
                width_m,
                surface,
                smoothness,
                runway_lighting[0] == 1,
            )?;
        } else if rwy_num.as_bytes().first().is_some_and(|c| c.is_ascii_digit())
            && rwy_num.len() >= 2
        {
            self.parse_v810_runway(
                &rwy_num,
                lat,
                lon,
                true_heading,
                length_m,
                width_m,
                displaced,
                stopway,
                runway_lighting,
                approach_lighting,
                glide_angles,
                surface_code,
                surface,
                shoulder,
                markings,
                smoothness,
                distance_remaining_signs,
            )?;
        } else if rwy_num.starts_with('H') {
            // helipads can belong to regular airports or heliports
            let name = if rwy_num.len() == 3 && rwy_num.ends_with('x') {
                &rwy_num[..2]
            } else {
                &rwy_num
            };
            self.pending.note_runway(lat, lon);
            let edge_lighting = if (2..=5).contains(&runway_lighting[0]) {
                Some("Yes")
            } else {
                Some("None")
            };
            let data = layers::HelipadData {
                icao: &self.pending.icao,
                name,
                lat,
                lon,
                true_heading,
                length_m,
                width_m,
                surface,
                markings,
                shoulder,
                smoothness,
                edge_lighting,
            };
            layers::add_helipad(&mut self.layers[index::HELIPAD], &data)?;
            layers::add_helipad_polygon(&mut self.layers[index::HELIPAD_POLYGON], &data)?;
        } else {
            return Err(Error::data_validation(format!(
                "line {}: unexpected runway number: {}",
                rec.line_number, rwy_num
            )));
        }
        Ok(())
    }

    /// Runway branch of the v8.10 combined record: derive both ends from the
    /// center point, then feed the same layers as the v8.50 record.
    #[allow(clippy::too_many_arguments)]
    fn parse_v810_runway(
        &mut self,
        rwy_num: &str,
        lat: f64,
        lon: f64,
        true_heading: f64,
        length_m: f64,
        width_m: f64,
        displaced: (f64, f64),
        stopway: (f64, f64),
        runway_lighting: [i32; 2],
        approach_lighting: [i32; 2],
        glide_angles: [f64; 2],
        surface_code: i32,
        surface: Option<&str>,
        shoulder: Option<&str>,
        markings: Option<&str>,
        smoothness: f64,
        distance_remaining_signs: bool,
    ) -> Result<()> {
        let num1 = atoi(rwy_num);
        let num2 = if num1 > 18 { num1 - 18 } else { num1 + 18 };
        let ids: [String; 2] = match rwy_num.as_bytes().get(2).copied() {
            Some(b'0') | Some(b'x') | None => {
                [format!("{:02}", num1), format!("{:02}", num2)]
            }
            Some(suffix) => {
                let reciprocal = match suffix {
                    b'L' => 'R',
                    b'R' => 'L',
                    other => other as char,
                };
                [rwy_num.to_string(), format!("{:02}{}", num2, reciprocal)]
            }
        };

        let end1 = geo::extend_position(lat, lon, length_m / 2.0, true_heading + 180.0);
        let end2 = geo::extend_position(lat, lon, length_m / 2.0, true_heading);
        let positions = [end1, end2];
        let displaced = [displaced.0, displaced.1];
        let stopway = [stopway.0, stopway.1];
        let reil: [bool; 2] = [
            (3..=5).contains(&runway_lighting[0]),
            (3..=5).contains(&runway_lighting[1]),
        ];

        self.pending.note_runway(end1.0, end1.1);

        let reciprocal_heading = if true_heading < 180.0 {
            true_heading + 180.0
        } else {
            true_heading - 180.0
        };

        if self.pending.header_code == SEAPLANE_HEADER || surface_code == WATER_SURFACE_CODE {
            // water runways have no dedicated record in v8.10
            let has_buoys = true;
            let layer = &mut self.layers[index::WATER_RUNWAY_THRESHOLD];
            for i in 0..2 {
                let (tlat, tlon) = positions[i];
                let fid = layers::add_water_runway_threshold(
                    layer,
                    &self.pending.icao,
                    &ids[i],
                    tlat,
                    tlon,
                    width_m,
                    has_buoys,
                )?;
                let (olat, olon) = positions[1 - i];
                let heading = geo::track(tlat, tlon, olat, olon);
                layers::set_runway_length_and_heading(layer, fid, length_m, heading);
            }
            layers::add_water_runway_polygon(
                &mut self.layers[index::WATER_RUNWAY_POLYGON],
                &self.pending.icao,
                &ids[0],
                &ids[1],
                end1.0,
                end1.1,
                end2.0,
                end2.1,
                width_m,
                has_buoys,
            )?;
            return Ok(());
        }

        let common = layers::RunwayCommon {
            icao: &self.pending.icao,
            width_m,
            surface,
            shoulder,
            smoothness,
            centerline_lights: runway_lighting[0] == 4 || runway_lighting[0] == 5,
            edge_lighting: if (2..=5).contains(&runway_lighting[0]) {
                Some("Yes")
            } else {
                Some("None")
            },
            distance_remaining_signs,
        };

        let threshold_layer = &mut self.layers[index::RUNWAY_THRESHOLD];
        for i in 0..2 {
            let (tlat, tlon) = positions[i];
            let end = layers::ThresholdEnd {
                rwy_num: &ids[i],
                lat: tlat,
                lon: tlon,
                displaced_threshold_m: displaced[i],
                stopway_length_m: stopway[i],
                markings,
                approach_lighting: enums::RUNWAY_APPROACH_LIGHTING_V810
                    .text(approach_lighting[i]),
                touchdown_lights: runway_lighting[i] == 5,
                reil: if reil[i] && reil[1 - i] {
                    Some("Omni-directional")
                } else if reil[i] {
                    Some("Unidirectional")
                } else {
                    Some("None")
                },
            };
            // per-end lighting differs from the shared columns of the v8.50
            // record, so rebuild the common block per end
            let end_common = layers::RunwayCommon {
                centerline_lights: runway_lighting[i] == 4 || runway_lighting[i] == 5,
                edge_lighting: if (2..=5).contains(&runway_lighting[i]) {
                    Some("Yes")
                } else {
                    Some("None")
                },
                ..common
            };
            let fid = layers::add_runway_threshold(threshold_layer, &end_common, &end)?;
            let heading = if i == 0 {
                true_heading
            } else {
                reciprocal_heading
            };
            layers::set_runway_length_and_heading(threshold_layer, fid, length_m, heading);
            if displaced[i] != 0.0 {
                layers::add_displaced_threshold(threshold_layer, fid);
            }
        }

        layers::add_runway_polygon(
            &mut self.layers[index::RUNWAY_POLYGON],
            &common,
            &ids[0],
            &ids[1],
            end1.0,
            end1.1,
            end2.0,
            end2.1,
        )?;

        for i in 0..2 {
            if stopway[i] != 0.0 {
                let (tlat, tlon) = positions[i];
                let (olat, olon) = positions[1 - i];
                let heading = geo::track(tlat, tlon, olat, olon);
                layers::add_stopway(
                    &mut self.layers[index::STOPWAY],
                    &self.pending.icao,
                    &ids[i],
                    tlat,
                    tlon,
                    heading,
                    width_m,
                    stopway[i],
                )?;
            }
        }

        for i in 0..2 {
            if approach_lighting[i] != 0 {
                let (tlat, tlon) = positions[i];
                let heading = if i == 0 {
                    true_heading
                } else {
                    reciprocal_heading
                };
                layers::add_vasi_papi_wigwag(
                    &mut self.layers[index::VASI_PAPI_WIGWAG],
                    &self.pending.icao,
                    &ids[i],
                    enums::VASI_PAPI_V810.text(approach_lighting[i]),
                    tlat,
                    tlon,
                    heading,
                    glide_angles[i],
                )?;
            }
        }
        Ok(())
    }

    fn parse_pavement(&mut self, rec: &RecordLine) -> Result<()> {
        rec.assert_min_col(4)?;

        let surface = enums::RUNWAY_SURFACE.text(rec.read_int_lenient(1));
        let smoothness = rec.read_f64_bounded(2, "pavement smoothness", 0.0, 1.0)?;
        let texture_heading = rec.read_true_heading(3, "texture heading")?;
        let name = rec.read_string_until_end(4);

        let (geom, lookahead) = parse_polygonal_geometry(&mut self.core)?;
        self.lookahead = lookahead;
        if let Some(geom) = geom {
            let layer = &mut self.layers[index::PAVEMENT];
            for polygon in polygons_of(geom) {
                layers::add_pavement(
                    layer,
                    &self.pending.icao,
                    &name,
                    surface,
                    smoothness,
                    texture_heading,
                    polygon,
                )?;
            }
        }
        Ok(())
    }

    fn parse_boundary(&mut self, rec: &RecordLine) -> Result<()> {
        rec.assert_min_col(2)?;
        let name = rec.read_string_until_end(2);

        let (geom, lookahead) = parse_polygonal_geometry(&mut self.core)?;
        self.lookahead = lookahead;
        if let Some(geom) = geom {
            let layer = &mut self.layers[index::BOUNDARY];
            for polygon in polygons_of(geom) {
                layers::add_boundary(layer, &self.pending.icao, &name, polygon)?;
            }
        }
        Ok(())
    }

    fn parse_linear_feature(&mut self, rec: &RecordLine) -> Result<()> {
        rec.assert_min_col(2)?;
        let name = rec.read_string_until_end(2);

        let (geom, lookahead) = parse_linear_geometry(&mut self.core)?;
        self.lookahead = lookahead;
        if let Some(multiline) = geom {
            layers::add_linear_feature(
                &mut self.layers[index::LINEAR_FEATURE],
                &self.pending.icao,
                &name,
                multiline,
            )?;
        }
        Ok(())
    }

    fn parse_atc(&mut self, rec: &RecordLine, code: i32) -> Result<()> {
        rec.assert_min_col(2)?;
        let freq_mhz = rec.read_f64(1, "frequency")? / 100.0;
        let freq_name = rec.read_string_until_end(2);
        let atc_type = match code {
            ATC_AWOS_ASOS_ATIS => "ATIS",
            ATC_CTAF => "CTAF",
            ATC_CLD => "CLD",
            ATC_GND => "GND",
            ATC_TWR => "TWR",
            ATC_APP => "APP",
            ATC_DEP => "DEP",
            _ => "UNK",
        };
        layers::add_atc_freq(
            &mut self.layers[index::ATC_FREQ],
            &self.pending.icao,
            atc_type,
            &freq_name,
            freq_mhz,
        )?;
        Ok(())
    }

    fn parse_startup_location(&mut self, rec: &RecordLine) -> Result<()> {
        rec.assert_min_col(4)?;
        let (lat, lon) = rec.read_lat_lon(1)?;
        let true_heading = rec.read_true_heading(3, "true heading")?;
        let name = rec.read_string_until_end(4);
        layers::add_startup_location(
            &mut self.layers[index::STARTUP_LOCATION],
            &self.pending.icao,
            &name,
            lat,
            lon,
            true_heading,
        )?;
        Ok(())
    }

    fn parse_light_beacon(&mut self, rec: &RecordLine) -> Result<()> {
        rec.assert_min_col(4)?;
        let (lat, lon) = rec.read_lat_lon(1)?;
        let color = enums::LIGHT_BEACON_COLOR.text(rec.read_int_lenient(3));
        let name = rec.read_string_until_end(4);
        layers::add_light_beacon(
            &mut self.layers[index::LIGHT_BEACON],
            &self.pending.icao,
            &name,
            lat,
            lon,
            color,
        )?;
        Ok(())
    }

    fn parse_windsock(&mut self, rec: &RecordLine) -> Result<()> {
        rec.assert_min_col(4)?;
        let (lat, lon) = rec.read_lat_lon(1)?;
        let is_illuminated = rec.read_bool_flag(3);
        let name = rec.read_string_until_end(4);
        layers::add_windsock(
            &mut self.layers[index::WINDSOCK],
            &self.pending.icao,
            &name,
            lat,
            lon,
            is_illuminated,
        )?;
        Ok(())
    }

    fn parse_taxiway_sign(&mut self, rec: &RecordLine) -> Result<()> {
        rec.assert_min_col(7)?;
        let (lat, lon) = rec.read_lat_lon(1)?;
        let true_heading = rec.read_true_heading(3, "heading")?;
        // token 4 (sign style) ignored
        let size = rec.read_int_lenient(5);
        let sign_text = rec.read_string_until_end(6);
        layers::add_taxiway_sign(
            &mut self.layers[index::TAXIWAY_SIGN],
            &self.pending.icao,
            &sign_text,
            lat,
            lon,
            true_heading,
            size,
        )?;
        Ok(())
    }

    fn parse_vasi_papi_wigwag(&mut self, rec: &RecordLine) -> Result<()> {
        rec.assert_min_col(7)?;
        let (lat, lon) = rec.read_lat_lon(1)?;
        let object_type = enums::VASI_PAPI_WIGWAG.text(rec.read_int_lenient(3));
        let true_heading = rec.read_true_heading(4, "heading")?;
        let visual_glide = rec.read_f64_bounded(5, "visual glidepath angle", 0.0, 90.0)?;
        let rwy_num = rec.read_string(6)?;
        layers::add_vasi_papi_wigwag(
            &mut self.layers[index::VASI_PAPI_WIGWAG],
            &self.pending.icao,
            rwy_num,
            object_type,
            lat,
            lon,
            true_heading,
            visual_glide,
        )?;
        Ok(())
    }

    fn parse_taxi_location(&mut self, rec: &RecordLine) -> Result<()> {
        rec.assert_min_col(7)?;
        let (lat, lon) = rec.read_lat_lon(1)?;
        let true_heading = rec.read_true_heading(3, "heading")?;
        let location_type = rec.read_string(4)?.to_string();
        let airplane_types = rec.read_string(5)?.to_string();
        let name = rec.read_string_until_end(6);
        layers::add_taxi_location(
            &mut self.layers[index::TAXI_LOCATION],
            &self.pending.icao,
            lat,
            lon,
            true_heading,
            &location_type,
            &airplane_types,
            &name,
        )?;
        Ok(())
    }

    fn dispatch(&mut self, rec: &RecordLine) -> Result<bool> {
        let code = rec.record_code();
        match code {
            AIRPORT_HEADER | SEAPLANE_HEADER | HELIPORT_HEADER => {
                self.flush_pending()?;
                self.parse_airport_header(rec, code)?;
            }
            RUNWAY_TAXIWAY_V810 => self.parse_runway_taxiway_v810(rec)?,
            TOWER => self.parse_tower(rec)?,
            STARTUP_LOCATION => self.parse_startup_location(rec)?,
            LIGHT_BEACON => self.parse_light_beacon(rec)?,
            WINDSOCK => self.parse_windsock(rec)?,
            TAXIWAY_SIGN => self.parse_taxiway_sign(rec)?,
            VASI_PAPI_WIGWAG => self.parse_vasi_papi_wigwag(rec)?,
            ATC_AWOS_ASOS_ATIS | ATC_CTAF | ATC_CLD | ATC_GND | ATC_TWR | ATC_APP | ATC_DEP => {
                self.parse_atc(rec, code)?
            }
            RUNWAY => self.parse_runway(rec)?,
            WATER_RUNWAY => self.parse_water_runway(rec)?,
            HELIPAD => self.parse_helipad(rec)?,
            PAVEMENT_HEADER => self.parse_pavement(rec)?,
            LINEAR_HEADER => self.parse_linear_feature(rec)?,
            BOUNDARY_HEADER => self.parse_boundary(rec)?,
            TAXI_LOCATION => self.parse_taxi_location(rec)?,
            _ => {
                self.core.unknown_code(rec.line_number, code);
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Flatten a repaired polygon geometry into its simple polygons, dropping
/// split parts whose exterior collapsed
fn polygons_of(geom: Geometry) -> Vec<crate::app::models::geometry::Polygon> {
    match geom {
        Geometry::Polygon(p) => vec![p],
        Geometry::MultiPolygon(parts) => parts
            .into_iter()
            .filter(|p| p.exterior.len() >= 4)
            .collect(),
        _ => Vec::new(),
    }
}

impl DatReader for AptReader {
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
            let rec = match self.lookahead.take() {
                Some(rec) => rec,
                None => match self.core.next_record()? {
                    Some(rec) => rec,
                    None => {
                        self.flush_pending()?;
                        self.core.mark_eof();
                        return Ok(true);
                    }
                },
            };

            if rec.is_end_of_section() {
                self.flush_pending()?;
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
        self.layers = layers::create_layers();
        self.pending.reset();
        self.lookahead = None;
        Ok(())
    }
}
