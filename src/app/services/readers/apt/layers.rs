//! Layer schemas and feature builders for the apt.dat reader.
//!
//! Every layer is an instance of the generic [`Layer`] type; this module
//! holds the static schema descriptors and one builder function per feature
//! kind, which is where derived rectangle geometries are constructed.

use crate::app::models::geometry::{
    Geometry, GeometryType, MultiLineString, Point, Polygon,
};
use crate::app::models::{FieldDefn, FieldType, FieldValue};
use crate::app::services::geo;
use crate::app::services::layer::{Layer, LayerSchema};
use crate::Result;

/// Indices of the apt layers in registration order
pub mod index {
    pub const APT: usize = 0;
    pub const RUNWAY_THRESHOLD: usize = 1;
    pub const RUNWAY_POLYGON: usize = 2;
    pub const STOPWAY: usize = 3;
    pub const WATER_RUNWAY_THRESHOLD: usize = 4;
    pub const WATER_RUNWAY_POLYGON: usize = 5;
    pub const HELIPAD: usize = 6;
    pub const HELIPAD_POLYGON: usize = 7;
    pub const TAXIWAY_RECTANGLE: usize = 8;
    pub const PAVEMENT: usize = 9;
    pub const BOUNDARY: usize = 10;
    pub const LINEAR_FEATURE: usize = 11;
    pub const ATC_FREQ: usize = 12;
    pub const STARTUP_LOCATION: usize = 13;
    pub const LIGHT_BEACON: usize = 14;
    pub const WINDSOCK: usize = 15;
    pub const TAXIWAY_SIGN: usize = 16;
    pub const VASI_PAPI_WIGWAG: usize = 17;
    pub const TAXI_LOCATION: usize = 18;
    pub const COUNT: usize = 19;
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
const fn b(name: &'static str) -> FieldDefn {
    FieldDefn {
        name,
        field_type: FieldType::Boolean,
    }
}

pub static APT: LayerSchema = LayerSchema {
    name: "APT",
    geometry_type: GeometryType::Point,
    fields: &[
        s("apt_icao"),
        s("apt_name"),
        i("type"),
        r("elevation_m"),
        b("has_tower"),
        r("hgt_tower_m"),
        s("tower_name"),
    ],
};

pub static RUNWAY_THRESHOLD: LayerSchema = LayerSchema {
    name: "RunwayThreshold",
    geometry_type: GeometryType::Point,
    fields: &[
        s("apt_icao"),
        s("rwy_num"),
        r("width_m"),
        s("surface"),
        s("shoulder"),
        r("smoothness"),
        b("centerline_lights"),
        s("edge_lighting"),
        b("distance_remaining_signs"),
        r("displaced_threshold_m"),
        b("is_displaced"),
        r("stopway_length_m"),
        s("markings"),
        s("approach_lighting"),
        b("touchdown_lights"),
        s("REIL"),
        r("length_m"),
        r("true_heading_deg"),
    ],
};

pub static RUNWAY_POLYGON: LayerSchema = LayerSchema {
    name: "RunwayPolygon",
    geometry_type: GeometryType::Polygon,
    fields: &[
        s("apt_icao"),
        s("rwy_num1"),
        s("rwy_num2"),
        r("width_m"),
        s("surface"),
        s("shoulder"),
        r("smoothness"),
        b("centerline_lights"),
        s("edge_lighting"),
        b("distance_remaining_signs"),
        r("length_m"),
        r("true_heading_deg"),
    ],
};

pub static STOPWAY: LayerSchema = LayerSchema {
    name: "Stopway",
    geometry_type: GeometryType::Polygon,
    fields: &[s("apt_icao"), s("rwy_num"), r("width_m"), r("length_m")],
};

pub static WATER_RUNWAY_THRESHOLD: LayerSchema = LayerSchema {
    name: "WaterRunwayThreshold",
    geometry_type: GeometryType::Point,
    fields: &[
        s("apt_icao"),
        s("rwy_num"),
        r("width_m"),
        b("has_buoys"),
        r("length_m"),
        r("true_heading_deg"),
    ],
};

pub static WATER_RUNWAY_POLYGON: LayerSchema = LayerSchema {
    name: "WaterRunwayPolygon",
    geometry_type: GeometryType::Polygon,
    fields: &[
        s("apt_icao"),
        s("rwy_num1"),
        s("rwy_num2"),
        r("width_m"),
        b("has_buoys"),
        r("length_m"),
        r("true_heading_deg"),
    ],
};

const HELIPAD_FIELDS: &[FieldDefn] = &[
    s("apt_icao"),
    s("helipad_name"),
    r("true_heading_deg"),
    r("length_m"),
    r("width_m"),
    s("surface"),
    s("markings"),
    s("shoulder"),
    r("smoothness"),
    s("edge_lighting"),
];

pub static HELIPAD: LayerSchema = LayerSchema {
    name: "Helipad",
    geometry_type: GeometryType::Point,
    fields: HELIPAD_FIELDS,
};

pub static HELIPAD_POLYGON: LayerSchema = LayerSchema {
    name: "HelipadPolygon",
    geometry_type: GeometryType::Polygon,
    fields: HELIPAD_FIELDS,
};

pub static TAXIWAY_RECTANGLE: LayerSchema = LayerSchema {
    name: "TaxiwayRectangle",
    geometry_type: GeometryType::Polygon,
    fields: &[
        s("apt_icao"),
        r("true_heading_deg"),
        r("length_m"),
        r("width_m"),
        s("surface"),
        r("smoothness"),
        b("edge_lighting"),
    ],
};

pub static PAVEMENT: LayerSchema = LayerSchema {
    name: "Pavement",
    geometry_type: GeometryType::Polygon,
    fields: &[
        s("apt_icao"),
        s("name"),
        s("surface"),
        r("smoothness"),
        r("texture_heading"),
    ],
};

pub static BOUNDARY: LayerSchema = LayerSchema {
    name: "APTBoundary",
    geometry_type: GeometryType::Polygon,
    fields: &[s("apt_icao"), s("name")],
};

pub static LINEAR_FEATURE: LayerSchema = LayerSchema {
    name: "APTLinearFeature",
    geometry_type: GeometryType::MultiLine,
    fields: &[s("apt_icao"), s("name")],
};

pub static ATC_FREQ: LayerSchema = LayerSchema {
    name: "ATCFreq",
    geometry_type: GeometryType::None,
    fields: &[s("apt_icao"), s("atc_type"), s("freq_name"), r("freq_mhz")],
};

pub static STARTUP_LOCATION: LayerSchema = LayerSchema {
    name: "StartupLocation",
    geometry_type: GeometryType::Point,
    fields: &[s("apt_icao"), s("name"), r("true_heading_deg")],
};

pub static LIGHT_BEACON: LayerSchema = LayerSchema {
    name: "APTLightBeacon",
    geometry_type: GeometryType::Point,
    fields: &[s("apt_icao"), s("name"), s("color")],
};

pub static WINDSOCK: LayerSchema = LayerSchema {
    name: "APTWindsock",
    geometry_type: GeometryType::Point,
    fields: &[s("apt_icao"), s("name"), b("is_illuminated")],
};

pub static TAXIWAY_SIGN: LayerSchema = LayerSchema {
    name: "TaxiwaySign",
    geometry_type: GeometryType::Point,
    fields: &[
        s("apt_icao"),
        s("text"),
        r("true_heading_deg"),
        i("size"),
    ],
};

pub static VASI_PAPI_WIGWAG: LayerSchema = LayerSchema {
    name: "VASI_PAPI_WIGWAG",
    geometry_type: GeometryType::Point,
    fields: &[
        s("apt_icao"),
        s("rwy_num"),
        s("type"),
        r("true_heading_deg"),
        r("visual_glide_deg"),
    ],
};

pub static TAXI_LOCATION: LayerSchema = LayerSchema {
    name: "TaxiLocation",
    geometry_type: GeometryType::Point,
    fields: &[
        s("apt_icao"),
        r("true_heading_deg"),
        s("location_type"),
        s("airplane_types"),
        s("name"),
    ],
};

/// All apt layers, in [`index`] order
pub fn create_layers() -> Vec<Layer> {
    vec![
        Layer::new(&APT),
        Layer::new(&RUNWAY_THRESHOLD),
        Layer::new(&RUNWAY_POLYGON),
        Layer::new(&STOPWAY),
        Layer::new(&WATER_RUNWAY_THRESHOLD),
        Layer::new(&WATER_RUNWAY_POLYGON),
        Layer::new(&HELIPAD),
        Layer::new(&HELIPAD_POLYGON),
        Layer::new(&TAXIWAY_RECTANGLE),
        Layer::new(&PAVEMENT),
        Layer::new(&BOUNDARY),
        Layer::new(&LINEAR_FEATURE),
        Layer::new(&ATC_FREQ),
        Layer::new(&STARTUP_LOCATION),
        Layer::new(&LIGHT_BEACON),
        Layer::new(&WINDSOCK),
        Layer::new(&TAXIWAY_SIGN),
        Layer::new(&VASI_PAPI_WIGWAG),
        Layer::new(&TAXI_LOCATION),
    ]
}

fn text(value: Option<&str>) -> FieldValue {
    match value {
        Some(t) => FieldValue::String(t.to_string()),
        None => FieldValue::Null,
    }
}

fn point(lat: f64, lon: f64) -> Option<Geometry> {
    Some(Geometry::Point(Point::new(lon, lat)))
}

/// Attributes shared by both ends of a land runway
#[derive(Debug)]
pub struct RunwayCommon<'a> {
    pub icao: &'a str,
    pub width_m: f64,
    pub surface: Option<&'a str>,
    pub shoulder: Option<&'a str>,
    pub smoothness: f64,
    pub centerline_lights: bool,
    pub edge_lighting: Option<&'a str>,
    pub distance_remaining_signs: bool,
}

/// Per-end attributes of a land runway
#[derive(Debug)]
pub struct ThresholdEnd<'a> {
    pub rwy_num: &'a str,
    pub lat: f64,
    pub lon: f64,
    pub displaced_threshold_m: f64,
    pub stopway_length_m: f64,
    pub markings: Option<&'a str>,
    pub approach_lighting: Option<&'a str>,
    pub touchdown_lights: bool,
    pub reil: Option<&'a str>,
}

/// Register one runway threshold. Length and heading are backfilled later
/// through [`set_runway_length_and_heading`] once both ends are known.
pub fn add_runway_threshold(
    layer: &mut Layer,
    common: &RunwayCommon,
    end: &ThresholdEnd,
) -> Result<u64> {
    layer.add_feature(
        vec![
            FieldValue::String(common.icao.to_string()),
            FieldValue::String(end.rwy_num.to_string()),
            FieldValue::Real(common.width_m),
            text(common.surface),
            text(common.shoulder),
            FieldValue::Real(common.smoothness),
            FieldValue::Boolean(common.centerline_lights),
            text(common.edge_lighting),
            FieldValue::Boolean(common.distance_remaining_signs),
            FieldValue::Real(end.displaced_threshold_m),
            FieldValue::Boolean(false),
            FieldValue::Real(end.stopway_length_m),
            text(end.markings),
            text(end.approach_lighting),
            FieldValue::Boolean(end.touchdown_lights),
            text(end.reil),
            FieldValue::Null,
            FieldValue::Null,
        ],
        point(end.lat, end.lon),
    )
}

/// Backfill the computed runway length and true heading on a threshold
/// feature. Works for land and water runway thresholds, which share the
/// field names.
pub fn set_runway_length_and_heading(layer: &mut Layer, fid: u64, length_m: f64, heading: f64) {
    let schema = layer.schema();
    let (Some(length_idx), Some(heading_idx)) = (
        schema.field_index("length_m"),
        schema.field_index("true_heading_deg"),
    ) else {
        return;
    };
    if let Some(feature) = layer.feature_mut(fid) {
        feature.set_value(length_idx, FieldValue::Real(length_m));
        feature.set_value(heading_idx, FieldValue::Real(heading));
    }
}

/// Derive the displaced-threshold twin of a threshold feature: same
/// attributes, `is_displaced` set, and the point moved down the runway by
/// the displaced length.
pub fn add_displaced_threshold(layer: &mut Layer, fid: u64) -> Option<u64> {
    let schema = layer.schema();
    let displaced_idx = schema.field_index("displaced_threshold_m")?;
    let heading_idx = schema.field_index("true_heading_deg")?;
    let is_displaced_idx = schema.field_index("is_displaced")?;

    let base = layer.feature(fid)?.clone();
    let displaced_m = base.value(displaced_idx)?.as_real()?;
    let heading = base.value(heading_idx)?.as_real()?;
    let Some(Geometry::Point(pt)) = base.geometry().cloned() else {
        return None;
    };

    let (lat, lon) = geo::extend_position(pt.lat, pt.lon, displaced_m, heading);
    let mut derived = base;
    derived.set_value(is_displaced_idx, FieldValue::Boolean(true));
    derived.set_geometry(Some(Geometry::Point(Point::new(lon, lat))));
    Some(layer.add_feature_copy(derived))
}

/// Register the runway pavement polygon spanned by the two thresholds
#[allow(clippy::too_many_arguments)]
pub fn add_runway_polygon(
    layer: &mut Layer,
    common: &RunwayCommon,
    rwy_num1: &str,
    rwy_num2: &str,
    lat1: f64,
    lon1: f64,
    lat2: f64,
    lon2: f64,
) -> Result<u64> {
    let length = geo::distance(lat1, lon1, lat2, lon2);
    let heading = geo::track(lat1, lon1, lat2, lon2);
    let corners = geo::centerline_rectangle(lat1, lon1, lat2, lon2, common.width_m);
    let polygon = Polygon::new(geo::corners_to_ring(&corners));

    layer.add_feature(
        vec![
            FieldValue::String(common.icao.to_string()),
            FieldValue::String(rwy_num1.to_string()),
            FieldValue::String(rwy_num2.to_string()),
            FieldValue::Real(common.width_m),
            text(common.surface),
            text(common.shoulder),
            FieldValue::Real(common.smoothness),
            FieldValue::Boolean(common.centerline_lights),
            text(common.edge_lighting),
            FieldValue::Boolean(common.distance_remaining_signs),
            FieldValue::Real(length),
            FieldValue::Real(heading),
        ],
        Some(Geometry::Polygon(polygon)),
    )
}

/// Stopway rectangle extending backwards from a threshold
#[allow(clippy::too_many_arguments)]
pub fn add_stopway(
    layer: &mut Layer,
    icao: &str,
    rwy_num: &str,
    lat: f64,
    lon: f64,
    runway_heading: f64,
    width_m: f64,
    stopway_length_m: f64,
) -> Result<u64> {
    let (lat2, lon2) = geo::extend_position(lat, lon, stopway_length_m, runway_heading + 180.0);
    let corners = [
        geo::extend_position(lat, lon, width_m / 2.0, runway_heading - 90.0),
        geo::extend_position(lat2, lon2, width_m / 2.0, runway_heading - 90.0),
        geo::extend_position(lat2, lon2, width_m / 2.0, runway_heading + 90.0),
        geo::extend_position(lat, lon, width_m / 2.0, runway_heading + 90.0),
    ];
    let polygon = Polygon::new(geo::corners_to_ring(&corners));

    layer.add_feature(
        vec![
            FieldValue::String(icao.to_string()),
            FieldValue::String(rwy_num.to_string()),
            FieldValue::Real(width_m),
            FieldValue::Real(stopway_length_m),
        ],
        Some(Geometry::Polygon(polygon)),
    )
}

#[allow(clippy::too_many_arguments)]
pub fn add_water_runway_threshold(
    layer: &mut Layer,
    icao: &str,
    rwy_num: &str,
    lat: f64,
    lon: f64,
    width_m: f64,
    has_buoys: bool,
) -> Result<u64> {
    layer.add_feature(
        vec![
            FieldValue::String(icao.to_string()),
            FieldValue::String(rwy_num.to_string()),
            FieldValue::Real(width_m),
            FieldValue::Boolean(has_buoys),
            FieldValue::Null,
            FieldValue::Null,
        ],
        point(lat, lon),
    )
}

#[allow(clippy::too_many_arguments)]
pub fn add_water_runway_polygon(
    layer: &mut Layer,
    icao: &str,
    rwy_num1: &str,
    rwy_num2: &str,
    lat1: f64,
    lon1: f64,
    lat2: f64,
    lon2: f64,
    width_m: f64,
    has_buoys: bool,
) -> Result<u64> {
    let length = geo::distance(lat1, lon1, lat2, lon2);
    let heading = geo::track(lat1, lon1, lat2, lon2);
    let corners = geo::centerline_rectangle(lat1, lon1, lat2, lon2, width_m);
    let polygon = Polygon::new(geo::corners_to_ring(&corners));

    layer.add_feature(
        vec![
            FieldValue::String(icao.to_string()),
            FieldValue::String(rwy_num1.to_string()),
            FieldValue::String(rwy_num2.to_string()),
            FieldValue::Real(width_m),
            FieldValue::Boolean(has_buoys),
            FieldValue::Real(length),
            FieldValue::Real(heading),
        ],
        Some(Geometry::Polygon(polygon)),
    )
}

/// Helipad attributes shared by the point and polygon layers
#[derive(Debug)]
pub struct HelipadData<'a> {
    pub icao: &'a str,
    pub name: &'a str,
    pub lat: f64,
    pub lon: f64,
    pub true_heading: f64,
    pub length_m: f64,
    pub width_m: f64,
    pub surface: Option<&'a str>,
    pub markings: Option<&'a str>,
    pub shoulder: Option<&'a str>,
    pub smoothness: f64,
    pub edge_lighting: Option<&'a str>,
}

fn helipad_values(data: &HelipadData) -> Vec<FieldValue> {
    vec![
        FieldValue::String(data.icao.to_string()),
        FieldValue::String(data.name.to_string()),
        FieldValue::Real(data.true_heading),
        FieldValue::Real(data.length_m),
        FieldValue::Real(data.width_m),
        text(data.surface),
        text(data.markings),
        text(data.shoulder),
        FieldValue::Real(data.smoothness),
        text(data.edge_lighting),
    ]
}

pub fn add_helipad(layer: &mut Layer, data: &HelipadData) -> Result<u64> {
    layer.add_feature(helipad_values(data), point(data.lat, data.lon))
}

pub fn add_helipad_polygon(layer: &mut Layer, data: &HelipadData) -> Result<u64> {
    let corners = geo::midpoint_rectangle(
        data.lat,
        data.lon,
        data.true_heading,
        data.length_m,
        data.width_m,
    );
    let polygon = Polygon::new(geo::corners_to_ring(&corners));
    layer.add_feature(helipad_values(data), Some(Geometry::Polygon(polygon)))
}

#[allow(clippy::too_many_arguments)]
pub fn add_taxiway_rectangle(
    layer: &mut Layer,
    icao: &str,
    lat: f64,
    lon: f64,
    true_heading: f64,
    length_m: f64,
    width_m: f64,
    surface: Option<&str>,
    smoothness: f64,
    blue_edge_lights: bool,
) -> Result<u64> {
    let corners = geo::midpoint_rectangle(lat, lon, true_heading, length_m, width_m);
    let polygon = Polygon::new(geo::corners_to_ring(&corners));

    layer.add_feature(
        vec![
            FieldValue::String(icao.to_string()),
            FieldValue::Real(true_heading),
            FieldValue::Real(length_m),
            FieldValue::Real(width_m),
            text(surface),
            FieldValue::Real(smoothness),
            FieldValue::Boolean(blue_edge_lights),
        ],
        Some(Geometry::Polygon(polygon)),
    )
}

#[allow(clippy::too_many_arguments)]
pub fn add_pavement(
    layer: &mut Layer,
    icao: &str,
    name: &str,
    surface: Option<&str>,
    smoothness: f64,
    texture_heading: f64,
    polygon: Polygon,
) -> Result<u64> {
    layer.add_feature(
        vec![
            FieldValue::String(icao.to_string()),
            FieldValue::String(name.to_string()),
            text(surface),
            FieldValue::Real(smoothness),
            FieldValue::Real(texture_heading),
        ],
        Some(Geometry::Polygon(polygon)),
    )
}

pub fn add_boundary(layer: &mut Layer, icao: &str, name: &str, polygon: Polygon) -> Result<u64> {
    layer.add_feature(
        vec![
            FieldValue::String(icao.to_string()),
            FieldValue::String(name.to_string()),
        ],
        Some(Geometry::Polygon(polygon)),
    )
}

pub fn add_linear_feature(
    layer: &mut Layer,
    icao: &str,
    name: &str,
    lines: MultiLineString,
) -> Result<u64> {
    layer.add_feature(
        vec![
            FieldValue::String(icao.to_string()),
            FieldValue::String(name.to_string()),
        ],
        Some(Geometry::MultiLine(lines)),
    )
}

pub fn add_atc_freq(
    layer: &mut Layer,
    icao: &str,
    atc_type: &str,
    freq_name: &str,
    freq_mhz: f64,
) -> Result<u64> {
    layer.add_feature(
        vec![
            FieldValue::String(icao.to_string()),
            FieldValue::String(atc_type.to_string()),
            FieldValue::String(freq_name.to_string()),
            FieldValue::Real(freq_mhz),
        ],
        None,
    )
}

pub fn add_startup_location(
    layer: &mut Layer,
    icao: &str,
    name: &str,
    lat: f64,
    lon: f64,
    true_heading: f64,
) -> Result<u64> {
    layer.add_feature(
        vec![
            FieldValue::String(icao.to_string()),
            FieldValue::String(name.to_string()),
            FieldValue::Real(true_heading),
        ],
        point(lat, lon),
    )
}

pub fn add_light_beacon(
    layer: &mut Layer,
    icao: &str,
    name: &str,
    lat: f64,
    lon: f64,
    color: Option<&str>,
) -> Result<u64> {
    layer.add_feature(
        vec![
            FieldValue::String(icao.to_string()),
            FieldValue::String(name.to_string()),
            text(color),
        ],
        point(lat, lon),
    )
}

pub fn add_windsock(
    layer: &mut Layer,
    icao: &str,
    name: &str,
    lat: f64,
    lon: f64,
    is_illuminated: bool,
) -> Result<u64> {
    layer.add_feature(
        vec![
            FieldValue::String(icao.to_string()),
            FieldValue::String(name.to_string()),
            FieldValue::Boolean(is_illuminated),
        ],
        point(lat, lon),
    )
}

#[allow(clippy::too_many_arguments)]
pub fn add_taxiway_sign(
    layer: &mut Layer,
    icao: &str,
    sign_text: &str,
    lat: f64,
    lon: f64,
    true_heading: f64,
    size: i32,
) -> Result<u64> {
    layer.add_feature(
        vec![
            FieldValue::String(icao.to_string()),
            FieldValue::String(sign_text.to_string()),
            FieldValue::Real(true_heading),
            FieldValue::Integer(size),
        ],
        point(lat, lon),
    )
}

#[allow(clippy::too_many_arguments)]
pub fn add_vasi_papi_wigwag(
    layer: &mut Layer,
    icao: &str,
    rwy_num: &str,
    object_type: Option<&str>,
    lat: f64,
    lon: f64,
    true_heading: f64,
    visual_glide_deg: f64,
) -> Result<u64> {
    layer.add_feature(
        vec![
            FieldValue::String(icao.to_string()),
            FieldValue::String(rwy_num.to_string()),
            text(object_type),
            FieldValue::Real(true_heading),
            FieldValue::Real(visual_glide_deg),
        ],
        point(lat, lon),
    )
}

#[allow(clippy::too_many_arguments)]
pub fn add_taxi_location(
    layer: &mut Layer,
    icao: &str,
    lat: f64,
    lon: f64,
    true_heading: f64,
    location_type: &str,
    airplane_types: &str,
    name: &str,
) -> Result<u64> {
    layer.add_feature(
        vec![
            FieldValue::String(icao.to_string()),
            FieldValue::Real(true_heading),
            FieldValue::String(location_type.to_string()),
            FieldValue::String(airplane_types.to_string()),
            FieldValue::String(name.to_string()),
        ],
        point(lat, lon),
    )
}

/// Airport feature committed once the next header or end of file is seen
#[allow(clippy::too_many_arguments)]
pub fn add_airport(
    layer: &mut Layer,
    icao: &str,
    name: &str,
    apt_type: i32,
    elevation_m: f64,
    position: Option<(f64, f64)>,
    tower: Option<(f64, &str)>,
) -> Result<u64> {
    let (hgt_tower, tower_name) = match tower {
        Some((height, tname)) => (
            FieldValue::Real(height),
            FieldValue::String(tname.to_string()),
        ),
        None => (FieldValue::Null, FieldValue::Null),
    };
    layer.add_feature(
        vec![
            FieldValue::String(icao.to_string()),
            FieldValue::String(name.to_string()),
            FieldValue::Integer(apt_type),
            FieldValue::Real(elevation_m),
            FieldValue::Boolean(tower.is_some()),
            hgt_tower,
            tower_name,
        ],
        position.map(|(lat, lon)| Geometry::Point(Point::new(lon, lat))),
    )
}
