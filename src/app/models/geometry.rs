//! Geometry model for parsed features.
//!
//! Coordinates are WGS84 degrees with `x = longitude`, `y = latitude`.
//! Only the shapes this format can produce are modeled: points, line
//! strings, rings/polygons, and the multi variants created by topology
//! repair and antimeridian splitting.

use serde::Serialize;

/// A single position
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub lon: f64,
    pub lat: f64,
}

impl Point {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// Ordered sequence of positions; also used as a linear ring once closed
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LineString {
    points: Vec<Point>,
}

impl LineString {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_points(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<Point> {
        self.points.last().copied()
    }

    pub fn set_point(&mut self, index: usize, point: Point) {
        if let Some(slot) = self.points.get_mut(index) {
            *slot = point;
        }
    }

    /// Append the first point again if the ring is not already closed
    pub fn close_ring(&mut self) {
        if let (Some(first), Some(last)) = (self.first(), self.last()) {
            if first != last {
                self.points.push(first);
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => self.len() > 2 && first == last,
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

/// Exterior ring plus zero or more interior rings
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Polygon {
    pub exterior: LineString,
    pub interiors: Vec<LineString>,
}

impl Polygon {
    pub fn new(exterior: LineString) -> Self {
        Self {
            exterior,
            interiors: Vec::new(),
        }
    }

    pub fn add_interior(&mut self, ring: LineString) {
        self.interiors.push(ring);
    }
}

/// Collection of line strings
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MultiLineString {
    lines: Vec<LineString>,
}

impl MultiLineString {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: LineString) {
        self.lines.push(line);
    }

    pub fn lines(&self) -> &[LineString] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Any geometry a `.dat` record can produce
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Point),
    Line(LineString),
    Polygon(Polygon),
    MultiLine(MultiLineString),
    MultiPolygon(Vec<Polygon>),
}

impl Geometry {
    pub fn geometry_type(&self) -> GeometryType {
        match self {
            Geometry::Point(_) => GeometryType::Point,
            Geometry::Line(_) => GeometryType::Line,
            Geometry::Polygon(_) => GeometryType::Polygon,
            Geometry::MultiLine(_) => GeometryType::MultiLine,
            Geometry::MultiPolygon(_) => GeometryType::MultiPolygon,
        }
    }
}

/// Declared geometry column of a layer schema. `None` is for attribute-only
/// layers such as ATC frequencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GeometryType {
    None,
    Point,
    Line,
    Polygon,
    MultiLine,
    MultiPolygon,
}

/// Ray-casting point-in-ring test.
///
/// The closing duplicate vertex, if present, contributes a zero-length edge
/// and does not affect the result. Points exactly on an edge are not
/// guaranteed either way, which is acceptable for the nudge heuristic built
/// on top of this.
pub fn point_in_ring(ring: &LineString, point: Point) -> bool {
    let pts = ring.points();
    let n = pts.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (pts[i], pts[j]);
        if ((pi.lat > point.lat) != (pj.lat > point.lat))
            && (point.lon
                < (pj.lon - pi.lon) * (point.lat - pi.lat) / (pj.lat - pi.lat) + pi.lon)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}
