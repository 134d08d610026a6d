//! Tests for apt.dat record parsing and feature synthesis

use super::super::layers::index;
use super::*;
use crate::app::models::geometry::Geometry;
use crate::app::models::{Feature, FieldValue};
use crate::app::services::geo;

fn field<'a>(reader: &'a AptReader, layer: usize, feature: &'a Feature, name: &str) -> &'a FieldValue {
    let idx = reader.layers()[layer].schema().field_index(name).unwrap();
    feature.value(idx).unwrap()
}

fn point_of(feature: &Feature) -> (f64, f64) {
    match feature.geometry() {
        Some(Geometry::Point(p)) => (p.lat, p.lon),
        other => panic!("expected point geometry, got {:?}", other),
    }
}

#[test]
fn test_airport_and_runway_round_trip() {
    let reader = read_v850(&format!("{}{}", HEADER, RUNWAY_08_26));

    // exactly one airport, positioned at the first runway threshold since
    // no tower record is present
    let apt = &reader.layers()[index::APT];
    assert_eq!(apt.len(), 1);
    let airport = apt.features().next().unwrap();
    assert_eq!(field(&reader, index::APT, airport, "apt_icao").as_str(), Some("LOWI"));
    assert_eq!(
        field(&reader, index::APT, airport, "apt_name").as_str(),
        Some("Innsbruck Kranebitten")
    );
    assert_eq!(field(&reader, index::APT, airport, "type").as_integer(), Some(0));
    assert_eq!(
        field(&reader, index::APT, airport, "has_tower").as_boolean(),
        Some(false)
    );
    let (lat, lon) = point_of(airport);
    assert!((lat - 47.259).abs() < 1e-9);
    assert!((lon - 11.331).abs() < 1e-9);
    // 1907 ft elevation in meters
    let elev = field(&reader, index::APT, airport, "elevation_m").as_real().unwrap();
    assert!((elev - 581.26).abs() < 0.01);

    // two thresholds with reciprocal headings
    let thresholds: Vec<_> = reader.layers()[index::RUNWAY_THRESHOLD].features().collect();
    assert_eq!(thresholds.len(), 2);
    let h0 = field(&reader, index::RUNWAY_THRESHOLD, thresholds[0], "true_heading_deg")
        .as_real()
        .unwrap();
    let h1 = field(&reader, index::RUNWAY_THRESHOLD, thresholds[1], "true_heading_deg")
        .as_real()
        .unwrap();
    let diff = (h1 - h0 - 180.0).rem_euclid(360.0);
    let diff = diff.min(360.0 - diff);
    assert!(diff < 0.1, "headings {} / {} are not reciprocal", h0, h1);

    // both thresholds carry the same derived length
    let l0 = field(&reader, index::RUNWAY_THRESHOLD, thresholds[0], "length_m")
        .as_real()
        .unwrap();
    let l1 = field(&reader, index::RUNWAY_THRESHOLD, thresholds[1], "length_m")
        .as_real()
        .unwrap();
    assert_eq!(l0, l1);
    let expected = geo::distance(47.259, 11.331, 47.261, 11.357);
    assert!((l0 - expected).abs() < 1e-6);
}

#[test]
fn test_tower_takes_precedence_for_airport_position() {
    let records = format!(
        "{}14 47.265450 11.356070 24 0 Tower\n{}",
        HEADER, RUNWAY_08_26
    );
    let reader = read_v850(&records);
    let apt = &reader.layers()[index::APT];
    let airport = apt.features().next().unwrap();
    assert_eq!(
        field(&reader, index::APT, airport, "has_tower").as_boolean(),
        Some(true)
    );
    let (lat, lon) = point_of(airport);
    assert!((lat - 47.26545).abs() < 1e-9);
    assert!((lon - 11.35607).abs() < 1e-9);
    let height = field(&reader, index::APT, airport, "hgt_tower_m").as_real().unwrap();
    assert!((height - 24.0 * crate::constants::FEET_TO_METER).abs() < 1e-9);
    assert_eq!(
        field(&reader, index::APT, airport, "tower_name").as_str(),
        Some("Tower")
    );
}

#[test]
fn test_airport_without_position_has_no_geometry() {
    let reader = read_v850(HEADER);
    let apt = &reader.layers()[index::APT];
    assert_eq!(apt.len(), 1);
    assert!(apt.features().next().unwrap().geometry().is_none());
}

#[test]
fn test_next_header_commits_previous_airport() {
    let records = format!("{}1 100 0 0 LOWW Wien Schwechat\n", HEADER);
    let reader = read_v850(&records);
    let apt = &reader.layers()[index::APT];
    assert_eq!(apt.len(), 2);
    let icaos: Vec<_> = apt
        .features()
        .map(|f| field(&reader, index::APT, f, "apt_icao").as_str().unwrap().to_string())
        .collect();
    assert_eq!(icaos, vec!["LOWI", "LOWW"]);
}

#[test]
fn test_runway_polygon_geometry() {
    let reader = read_v850(&format!("{}{}", HEADER, RUNWAY_08_26));
    let polygons = &reader.layers()[index::RUNWAY_POLYGON];
    assert_eq!(polygons.len(), 1);
    let feature = polygons.features().next().unwrap();
    let Some(Geometry::Polygon(polygon)) = feature.geometry() else {
        panic!("expected polygon geometry");
    };
    let ring = &polygon.exterior;
    assert_eq!(ring.len(), 5);
    assert_eq!(ring.first(), ring.last());
    // each corner sits half a runway width from its threshold
    let width = field(&reader, index::RUNWAY_POLYGON, feature, "width_m")
        .as_real()
        .unwrap();
    let ends = [(47.259, 11.331), (47.261, 11.357)];
    for (corner, (elat, elon)) in [
        (ring.points()[0], ends[0]),
        (ring.points()[1], ends[1]),
        (ring.points()[2], ends[1]),
        (ring.points()[3], ends[0]),
    ] {
        let d = geo::distance(corner.lat, corner.lon, elat, elon);
        assert!((d - width / 2.0).abs() < 0.01, "corner at {} m", d);
    }
}

#[test]
fn test_displaced_threshold_synthesizes_extra_feature() {
    let records = format!(
        "{}100 45.00 1 0 0.25 0 2 1 \
         08 47.259000 11.331000 120.00 0.00 2 8 1 0 \
         26 47.261000 11.357000 0.00 0.00 2 8 1 0\n",
        HEADER
    );
    let reader = read_v850(&records);
    let thresholds: Vec<_> = reader.layers()[index::RUNWAY_THRESHOLD].features().collect();
    // two real ends plus one displaced twin for 08
    assert_eq!(thresholds.len(), 3);
    let displaced: Vec<_> = thresholds
        .iter()
        .filter(|f| {
            field(&reader, index::RUNWAY_THRESHOLD, f, "is_displaced").as_boolean() == Some(true)
        })
        .collect();
    assert_eq!(displaced.len(), 1);
    let twin = displaced[0];
    assert_eq!(
        field(&reader, index::RUNWAY_THRESHOLD, twin, "rwy_num").as_str(),
        Some("08")
    );
    // moved 120 m along the runway heading
    let (tlat, tlon) = point_of(twin);
    let d = geo::distance(47.259, 11.331, tlat, tlon);
    assert!((d - 120.0).abs() < 0.01);
}

#[test]
fn test_stopway_features_only_for_nonzero_lengths() {
    let records = format!(
        "{}100 45.00 1 0 0.25 0 2 1 \
         08 47.259000 11.331000 0.00 60.00 2 8 1 0 \
         26 47.261000 11.357000 0.00 0.00 2 8 1 0\n",
        HEADER
    );
    let reader = read_v850(&records);
    let stopways = &reader.layers()[index::STOPWAY];
    assert_eq!(stopways.len(), 1);
    let feature = stopways.features().next().unwrap();
    assert_eq!(
        field(&reader, index::STOPWAY, feature, "length_m").as_real(),
        Some(60.0)
    );
    assert!(matches!(feature.geometry(), Some(Geometry::Polygon(_))));
}

#[test]
fn test_water_runway_record() {
    let records = format!(
        "{}101 49 1 08 35.042267 -106.598495 26 35.059264 -106.598495\n",
        HEADER
    );
    let reader = read_v850(&records);
    assert_eq!(reader.layers()[index::WATER_RUNWAY_THRESHOLD].len(), 2);
    assert_eq!(reader.layers()[index::WATER_RUNWAY_POLYGON].len(), 1);
    let polygon = reader.layers()[index::WATER_RUNWAY_POLYGON]
        .features()
        .next()
        .unwrap();
    assert_eq!(
        field(&reader, index::WATER_RUNWAY_POLYGON, polygon, "has_buoys").as_boolean(),
        Some(true)
    );
}

#[test]
fn test_helipad_record() {
    let records = format!(
        "{}102 H1 47.259000 11.331000 90.00 30.00 30.00 1 0 0 0.25 0\n",
        HEADER
    );
    let reader = read_v850(&records);
    assert_eq!(reader.layers()[index::HELIPAD].len(), 1);
    assert_eq!(reader.layers()[index::HELIPAD_POLYGON].len(), 1);
    let pad = reader.layers()[index::HELIPAD].features().next().unwrap();
    assert_eq!(
        field(&reader, index::HELIPAD, pad, "surface").as_str(),
        Some("Asphalt")
    );
    // polygon corners half a width/length away from the center
    let polygon = reader.layers()[index::HELIPAD_POLYGON].features().next().unwrap();
    let Some(Geometry::Polygon(p)) = polygon.geometry() else {
        panic!("expected polygon");
    };
    for corner in &p.exterior.points()[..4] {
        let d = geo::distance(47.259, 11.331, corner.lat, corner.lon);
        let half_diagonal = (15.0f64.powi(2) + 15.0f64.powi(2)).sqrt();
        assert!((d - half_diagonal).abs() < 0.05);
    }
}

#[test]
fn test_atc_frequencies() {
    let records = format!(
        "{}50 11910 ATIS\n53 12170 GND\n54 12010 TWR\n",
        HEADER
    );
    let reader = read_v850(&records);
    let atc = &reader.layers()[index::ATC_FREQ];
    assert_eq!(atc.len(), 3);
    let first = atc.features().next().unwrap();
    assert_eq!(
        field(&reader, index::ATC_FREQ, first, "atc_type").as_str(),
        Some("ATIS")
    );
    assert!(
        (field(&reader, index::ATC_FREQ, first, "freq_mhz").as_real().unwrap() - 119.10).abs()
            < 1e-9
    );
    assert!(first.geometry().is_none());
}

#[test]
fn test_point_features() {
    let records = format!(
        "{}15 47.2600 11.3400 90.0 Gate A1\n\
         18 47.2610 11.3410 3 BCN\n\
         19 47.2620 11.3420 1 WS1\n\
         20 47.2630 11.3430 90.0 0 2 Taxi B\n\
         21 47.2640 11.3440 2 90.0 3.00 08\n",
        HEADER
    );
    let reader = read_v850(&records);
    assert_eq!(reader.layers()[index::STARTUP_LOCATION].len(), 1);
    assert_eq!(reader.layers()[index::LIGHT_BEACON].len(), 1);
    assert_eq!(reader.layers()[index::WINDSOCK].len(), 1);
    assert_eq!(reader.layers()[index::TAXIWAY_SIGN].len(), 1);
    assert_eq!(reader.layers()[index::VASI_PAPI_WIGWAG].len(), 1);

    let beacon = reader.layers()[index::LIGHT_BEACON].features().next().unwrap();
    assert_eq!(
        field(&reader, index::LIGHT_BEACON, beacon, "color").as_str(),
        Some("Green-yellow-white")
    );
    let vasi = reader.layers()[index::VASI_PAPI_WIGWAG].features().next().unwrap();
    assert_eq!(
        field(&reader, index::VASI_PAPI_WIGWAG, vasi, "type").as_str(),
        Some("PAPI Left")
    );
}

#[test]
fn test_unknown_enum_code_yields_null() {
    let records = format!(
        "{}100 45.00 77 0 0.25 0 2 1 \
         08 47.259000 11.331000 0.00 0.00 2 8 1 0 \
         26 47.261000 11.357000 0.00 0.00 2 8 1 0\n",
        HEADER
    );
    let reader = read_v850(&records);
    let threshold = reader.layers()[index::RUNWAY_THRESHOLD].features().next().unwrap();
    assert_eq!(
        field(&reader, index::RUNWAY_THRESHOLD, threshold, "surface"),
        &FieldValue::Null
    );
}

#[test]
fn test_bad_record_skipped_and_siblings_survive() {
    let records = format!(
        "{}100 45.00 1 0 0.25 0 2 1 08 91.0 11.331 0 0 2 8 1 0 26 47.261 11.357 0 0 2 8 1 0\n\
         {}",
        HEADER, RUNWAY_08_26
    );
    let reader = read_v850(&records);
    // the out-of-range latitude kills only its own record
    assert_eq!(reader.layers()[index::RUNWAY_POLYGON].len(), 1);
    assert_eq!(reader.stats().records_skipped, 1);
}

#[test]
fn test_unknown_record_code_is_skipped() {
    let records = format!("{}1234 some unknown record\n{}", HEADER, RUNWAY_08_26);
    let reader = read_v850(&records);
    assert_eq!(reader.stats().unknown_codes, 1);
    assert_eq!(reader.layers()[index::RUNWAY_POLYGON].len(), 1);
}

#[test]
fn test_v810_runway_reciprocal_identifiers() {
    let records = format!(
        "{}10 47.259000 11.331000 11L 90.00 6561 0.0 0.0 148 111111 1 0 0 0.25 0\n",
        HEADER
    );
    let reader = read_v810(&records);
    let thresholds: Vec<_> = reader.layers()[index::RUNWAY_THRESHOLD].features().collect();
    assert_eq!(thresholds.len(), 2);
    let ids: Vec<_> = thresholds
        .iter()
        .map(|f| {
            field(&reader, index::RUNWAY_THRESHOLD, f, "rwy_num")
                .as_str()
                .unwrap()
                .to_string()
        })
        .collect();
    assert_eq!(ids, vec!["11L", "29R"]);

    // ends sit half the (converted) length from the center point
    let (lat0, lon0) = point_of(thresholds[0]);
    let half_length = 6561.0 * crate::constants::FEET_TO_METER / 2.0;
    let d = geo::distance(47.259, 11.331, lat0, lon0);
    assert!((d - half_length).abs() < 0.01);
}

#[test]
fn test_v810_plain_runway_number_pair() {
    let records = format!(
        "{}10 47.259000 11.331000 08x 90.00 6561 0.0 0.0 148 111111 1 0 0 0.25 0\n",
        HEADER
    );
    let reader = read_v810(&records);
    let ids: Vec<_> = reader.layers()[index::RUNWAY_THRESHOLD]
        .features()
        .map(|f| {
            field(&reader, index::RUNWAY_THRESHOLD, f, "rwy_num")
                .as_str()
                .unwrap()
                .to_string()
        })
        .collect();
    assert_eq!(ids, vec!["08", "26"]);
}

#[test]
fn test_v810_taxiway_rectangle() {
    let records = format!(
        "{}10 47.259000 11.331000 xxx 90.00 656 0.0 0.0 98 111111 1 0 0 0.25 0\n",
        HEADER
    );
    let reader = read_v810(&records);
    assert_eq!(reader.layers()[index::TAXIWAY_RECTANGLE].len(), 1);
    assert_eq!(reader.layers()[index::RUNWAY_THRESHOLD].len(), 0);
}

#[test]
fn test_v810_helipad() {
    let records = format!(
        "{}10 47.259000 11.331000 H1x 90.00 120 0.0 0.0 120 111111 1 0 0 0.25 0\n",
        HEADER
    );
    let reader = read_v810(&records);
    let pads = &reader.layers()[index::HELIPAD];
    assert_eq!(pads.len(), 1);
    let pad = pads.features().next().unwrap();
    assert_eq!(
        field(&reader, index::HELIPAD, pad, "helipad_name").as_str(),
        Some("H1")
    );
}

#[test]
fn test_v810_water_runway_by_surface_code() {
    let records = format!(
        "{}10 47.259000 11.331000 08x 90.00 6561 0.0 0.0 148 111111 13 0 0 0.25 0\n",
        HEADER
    );
    let reader = read_v810(&records);
    assert_eq!(reader.layers()[index::RUNWAY_THRESHOLD].len(), 0);
    assert_eq!(reader.layers()[index::WATER_RUNWAY_THRESHOLD].len(), 2);
    assert_eq!(reader.layers()[index::WATER_RUNWAY_POLYGON].len(), 1);
}

#[test]
fn test_v810_displaced_threshold_packed_token() {
    let records = format!(
        "{}10 47.259000 11.331000 08x 90.00 6561 400.200 0.0 148 111111 1 0 0 0.25 0\n",
        HEADER
    );
    let reader = read_v810(&records);
    let thresholds: Vec<_> = reader.layers()[index::RUNWAY_THRESHOLD].features().collect();
    // both ends displaced: two real ends each followed by a displaced twin
    assert_eq!(thresholds.len(), 4);
    let d0 = field(&reader, index::RUNWAY_THRESHOLD, thresholds[0], "displaced_threshold_m")
        .as_real()
        .unwrap();
    assert!((d0 - 400.0 * crate::constants::FEET_TO_METER).abs() < 1e-9);
    let d1 = field(&reader, index::RUNWAY_THRESHOLD, thresholds[2], "displaced_threshold_m")
        .as_real()
        .unwrap();
    assert!((d1 - 200.0 * crate::constants::FEET_TO_METER).abs() < 1e-9);
    assert_eq!(
        field(&reader, index::RUNWAY_THRESHOLD, thresholds[1], "is_displaced").as_boolean(),
        Some(true)
    );
}

#[test]
fn test_seaplane_and_heliport_header_types() {
    let records = "16 0 0 0 S01 Lake Base\n17 100 0 0 H01 City Heliport\n";
    let reader = read_v850(records);
    let types: Vec<_> = reader.layers()[index::APT]
        .features()
        .map(|f| field(&reader, index::APT, f, "type").as_integer().unwrap())
        .collect();
    assert_eq!(types, vec![1, 2]);
}

#[test]
fn test_eof_without_sentinel_still_commits_airport() {
    let file = apt_file("850 Version", HEADER);
    let mut reader = AptReader::open(file.path()).unwrap();
    reader.read_until(None).unwrap();
    assert_eq!(reader.layers()[index::APT].len(), 1);
}
