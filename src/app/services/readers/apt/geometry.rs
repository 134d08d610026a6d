//! Node-record sub-loop for pavement, boundary and linear features.
//!
//! Pavement (110), linear-feature (120) and boundary (130) headers are
//! followed by a run of node records (111-116) that this module consumes
//! until a closing or foreign record appears. The foreign record is handed
//! back to the main dispatch loop as a lookahead. Curved edges are sampled
//! from bezier control points; assembled polygons go through a topology
//! repair pass that nudges rounding artifacts or falls back to splitting
//! the polygon into one piece per ring.

use tracing::debug;

use crate::app::models::geometry::{
    point_in_ring, Geometry, LineString, MultiLineString, Point, Polygon,
};
use crate::app::services::geo::{add_cubic_bezier, add_quadratic_bezier};
use crate::app::services::readers::ReaderCore;
use crate::app::services::tokenizer::RecordLine;
use crate::constants::apt_records::{
    NODE, NODE_CLOSE, NODE_CLOSE_WITH_BEZIER, NODE_END, NODE_END_WITH_BEZIER, NODE_WITH_BEZIER,
};
use crate::constants::TOPOLOGY_NUDGE_DEG;
use crate::Result;

/// Cross-node state threaded through the sub-loop
#[derive(Debug, Default)]
struct NodeState {
    first: (f64, f64),
    first_bezier: (f64, f64),
    first_is_bezier: bool,
    last: (f64, f64),
    last_bezier: (f64, f64),
    last_is_bezier: bool,
    is_first: bool,
    last_part_closed: bool,
}

impl NodeState {
    fn new() -> Self {
        Self {
            is_first: true,
            ..Self::default()
        }
    }

    /// Roll the per-node bookkeeping after a consumed node record
    fn advance(&mut self, current: (f64, f64), current_bezier: (f64, f64)) {
        if self.is_first {
            self.first = current;
            self.first_bezier = current_bezier;
            self.first_is_bezier = self.last_is_bezier;
        }
        self.is_first = self.last_part_closed;
        self.last = current;
        self.last_bezier = current_bezier;
    }
}

/// Append `current` to the line, curving from the previous node when it
/// carried a control point
fn join_from_last(line: &mut LineString, state: &NodeState, current: (f64, f64)) {
    if state.last_is_bezier && !state.is_first && state.last != current {
        add_quadratic_bezier(
            line,
            state.last.0,
            state.last.1,
            state.last_bezier.0,
            state.last_bezier.1,
            current.0,
            current.1,
        );
    } else {
        line.push(Point::new(current.1, current.0));
    }
}

/// Append `current` (which carries its own control point) to the line
fn join_from_last_bezier(
    line: &mut LineString,
    state: &NodeState,
    current: (f64, f64),
    current_bezier: (f64, f64),
) {
    if state.last_is_bezier {
        add_cubic_bezier(
            line,
            state.last.0,
            state.last.1,
            state.last_bezier.0,
            state.last_bezier.1,
            current_bezier.0,
            current_bezier.1,
            current.0,
            current.1,
        );
    } else if !state.is_first && state.last != current {
        // mirror the incoming control point about the node
        let ctrl = (
            current.0 - (current_bezier.0 - current.0),
            current.1 - (current_bezier.1 - current.1),
        );
        add_quadratic_bezier(
            line,
            state.last.0,
            state.last.1,
            ctrl.0,
            ctrl.1,
            current.0,
            current.1,
        );
    } else {
        line.push(Point::new(current.1, current.0));
    }
}

/// Close the current part back to the ring's first node, curving when the
/// first node carried a control point
fn close_part(line: &mut LineString, state: &NodeState, current: (f64, f64), current_bezier: (f64, f64)) {
    if state.first_is_bezier {
        add_cubic_bezier(
            line,
            current.0,
            current.1,
            current_bezier.0,
            current_bezier.1,
            state.first_bezier.0,
            state.first_bezier.1,
            state.first.0,
            state.first.1,
        );
    } else {
        line.close_ring();
    }
}

/// Consume node records into a (possibly multi-ring) polygon.
///
/// Returns the repaired geometry (if the polygon terminated cleanly) and the
/// record that ended the sub-loop, which the main loop must re-dispatch.
pub(super) fn parse_polygonal_geometry(
    core: &mut ReaderCore,
) -> Result<(Option<Geometry>, Option<RecordLine>)> {
    let mut state = NodeState::new();
    let mut ring = LineString::new();
    let mut rings: Vec<LineString> = Vec::new();

    loop {
        let Some(rec) = core.next_record()? else {
            debug!(
                "Line {}: end of file while reading a polygon",
                core.line_number()
            );
            return Ok((None, None));
        };

        if rec.is_end_of_section() {
            let geom = if state.last_part_closed {
                fix_polygon_topology(rings, rec.line_number)
            } else {
                debug!(
                    "Line {}: unexpected end of section while reading a polygon",
                    rec.line_number
                );
                None
            };
            return Ok((geom, Some(rec)));
        }
        if rec.token_count() == 0 {
            continue;
        }
        if rec.token_count() < 2 {
            debug!("Line {}: not enough columns", rec.line_number);
            continue;
        }

        let code = rec.record_code();
        let mut current_bezier = state.last_bezier;
        let current;

        match code {
            NODE => {
                let parsed = rec.assert_min_col(3).and_then(|_| rec.read_lat_lon(1));
                match parsed {
                    Ok(pos) => current = pos,
                    Err(e) => {
                        core.skip_record(&e);
                        return Ok((None, None));
                    }
                }
                join_from_last(&mut ring, &state, current);
                state.last_part_closed = false;
                state.last_is_bezier = false;
            }
            NODE_WITH_BEZIER => {
                let parsed = rec
                    .assert_min_col(5)
                    .and_then(|_| Ok((rec.read_lat_lon(1)?, rec.read_lat_lon(3)?)));
                match parsed {
                    Ok((pos, bez)) => {
                        current = pos;
                        current_bezier = bez;
                    }
                    Err(e) => {
                        core.skip_record(&e);
                        return Ok((None, None));
                    }
                }
                join_from_last_bezier(&mut ring, &state, current, current_bezier);
                state.last_part_closed = false;
                state.last_is_bezier = true;
            }
            NODE_CLOSE => {
                let parsed = rec.assert_min_col(3).and_then(|_| rec.read_lat_lon(1));
                match parsed {
                    Ok(pos) => current = pos,
                    Err(e) => {
                        core.skip_record(&e);
                        return Ok((None, None));
                    }
                }
                if state.is_first {
                    debug!(
                        "Line {}: unexpected code {} when reading a polygon",
                        rec.line_number, code
                    );
                    return Ok((None, Some(rec)));
                }
                join_from_last(&mut ring, &state, current);
                ring.close_ring();
                rings.push(std::mem::take(&mut ring));
                state.last_part_closed = true;
                state.last_is_bezier = false;
            }
            NODE_CLOSE_WITH_BEZIER => {
                let parsed = rec
                    .assert_min_col(5)
                    .and_then(|_| Ok((rec.read_lat_lon(1)?, rec.read_lat_lon(3)?)));
                match parsed {
                    Ok((pos, bez)) => {
                        current = pos;
                        current_bezier = bez;
                    }
                    Err(e) => {
                        core.skip_record(&e);
                        return Ok((None, None));
                    }
                }
                if state.is_first {
                    debug!(
                        "Line {}: unexpected code {} when reading a polygon",
                        rec.line_number, code
                    );
                    return Ok((None, Some(rec)));
                }
                join_from_last_bezier(&mut ring, &state, current, current_bezier);
                close_part(&mut ring, &state, current, current_bezier);
                rings.push(std::mem::take(&mut ring));
                state.last_part_closed = true;
                // no arc between two parts
                state.last_is_bezier = false;
            }
            _ => {
                let geom = if code == NODE_END
                    || code == NODE_END_WITH_BEZIER
                    || !state.last_part_closed
                {
                    debug!(
                        "Line {}: unexpected code {} when reading a polygon",
                        rec.line_number, code
                    );
                    None
                } else {
                    fix_polygon_topology(rings, rec.line_number)
                };
                return Ok((geom, Some(rec)));
            }
        }

        state.advance(current, current_bezier);
    }
}

/// Consume node records into a multi-line-string. Path-end records (115/116)
/// terminate a part without closing it; ring-closing records close it.
pub(super) fn parse_linear_geometry(
    core: &mut ReaderCore,
) -> Result<(Option<MultiLineString>, Option<RecordLine>)> {
    let mut state = NodeState::new();
    let mut line = LineString::new();
    let mut multiline = MultiLineString::new();

    let finish =
        |multiline: MultiLineString, closed: bool, line_number: usize| -> Option<MultiLineString> {
            if !closed {
                debug!(
                    "Line {}: unexpected end while reading a linear feature",
                    line_number
                );
                None
            } else if multiline.is_empty() {
                debug!("Line {}: linear geometry is invalid or empty", line_number);
                None
            } else {
                Some(multiline)
            }
        };

    loop {
        let Some(rec) = core.next_record()? else {
            debug!(
                "Line {}: end of file while reading a linear feature",
                core.line_number()
            );
            return Ok((None, None));
        };

        if rec.is_end_of_section() {
            let geom = finish(multiline, state.last_part_closed, rec.line_number);
            return Ok((geom, Some(rec)));
        }
        if rec.token_count() == 0 {
            continue;
        }
        if rec.token_count() < 2 {
            debug!("Line {}: not enough columns", rec.line_number);
            continue;
        }

        let code = rec.record_code();
        let mut current_bezier = state.last_bezier;
        let current;

        match code {
            NODE => {
                match rec.assert_min_col(3).and_then(|_| rec.read_lat_lon(1)) {
                    Ok(pos) => current = pos,
                    Err(e) => {
                        core.skip_record(&e);
                        return Ok((None, None));
                    }
                }
                join_from_last(&mut line, &state, current);
                state.last_part_closed = false;
                state.last_is_bezier = false;
            }
            NODE_WITH_BEZIER => {
                match rec
                    .assert_min_col(5)
                    .and_then(|_| Ok((rec.read_lat_lon(1)?, rec.read_lat_lon(3)?)))
                {
                    Ok((pos, bez)) => {
                        current = pos;
                        current_bezier = bez;
                    }
                    Err(e) => {
                        core.skip_record(&e);
                        return Ok((None, None));
                    }
                }
                join_from_last_bezier(&mut line, &state, current, current_bezier);
                state.last_part_closed = false;
                state.last_is_bezier = true;
            }
            NODE_CLOSE | NODE_END => {
                match rec.assert_min_col(3).and_then(|_| rec.read_lat_lon(1)) {
                    Ok(pos) => current = pos,
                    Err(e) => {
                        core.skip_record(&e);
                        return Ok((None, None));
                    }
                }
                if state.is_first {
                    debug!(
                        "Line {}: unexpected code {} when reading a linear feature",
                        rec.line_number, code
                    );
                    return Ok((None, Some(rec)));
                }
                join_from_last(&mut line, &state, current);
                if code == NODE_CLOSE {
                    line.close_ring();
                }
                if line.len() < 2 {
                    debug!("Line {}: a linestring has less than 2 points", rec.line_number);
                    line.clear();
                } else {
                    multiline.push(std::mem::take(&mut line));
                }
                state.last_part_closed = true;
                state.last_is_bezier = false;
            }
            NODE_CLOSE_WITH_BEZIER | NODE_END_WITH_BEZIER => {
                match rec
                    .assert_min_col(5)
                    .and_then(|_| Ok((rec.read_lat_lon(1)?, rec.read_lat_lon(3)?)))
                {
                    Ok((pos, bez)) => {
                        current = pos;
                        current_bezier = bez;
                    }
                    Err(e) => {
                        core.skip_record(&e);
                        return Ok((None, None));
                    }
                }
                if state.is_first {
                    debug!(
                        "Line {}: unexpected code {} when reading a linear feature",
                        rec.line_number, code
                    );
                    return Ok((None, Some(rec)));
                }
                join_from_last_bezier(&mut line, &state, current, current_bezier);
                if code == NODE_CLOSE_WITH_BEZIER {
                    close_part(&mut line, &state, current, current_bezier);
                }
                if line.len() < 2 {
                    debug!("Line {}: a linestring has less than 2 points", rec.line_number);
                    line.clear();
                } else {
                    multiline.push(std::mem::take(&mut line));
                }
                state.last_part_closed = true;
                state.last_is_bezier = false;
            }
            _ => {
                let geom = finish(multiline, state.last_part_closed, rec.line_number);
                return Ok((geom, Some(rec)));
            }
        }

        state.advance(current, current_bezier);
    }
}

/// Split a multi-ring polygon into one simple polygon per ring
fn split_polygon(exterior: LineString, interiors: Vec<LineString>) -> Geometry {
    let mut polygons = vec![Polygon::new(exterior)];
    polygons.extend(interiors.into_iter().map(Polygon::new));
    Geometry::MultiPolygon(polygons)
}

/// Repair topological anomalies in an assembled polygon.
///
/// Degenerate rings (fewer than 4 points once closed) are dropped. An
/// interior ring with exactly one vertex outside the exterior ring, a
/// typical rounding artifact, gets that vertex nudged diagonally until it
/// falls inside; when the nudge fails, or more than one vertex is outside,
/// the polygon is split into one simple polygon per ring instead of
/// returning an invalid multi-ring polygon.
pub(super) fn fix_polygon_topology(
    rings: Vec<LineString>,
    line_number: usize,
) -> Option<Geometry> {
    let mut rings = rings.into_iter();
    let exterior = rings.next()?;
    if exterior.len() < 4 {
        debug!("Line {}: discarded degenerated polygon", line_number);
        return None;
    }

    let mut interiors: Vec<LineString> = Vec::new();
    for (i, ring) in rings.enumerate() {
        if ring.len() < 4 {
            debug!(
                "Line {}: discarded degenerated interior ring ({})",
                line_number, i
            );
            continue;
        }
        interiors.push(ring);
    }

    for idx in 0..interiors.len() {
        let outside: Vec<usize> = interiors[idx]
            .points()
            .iter()
            .enumerate()
            .filter(|(_, pt)| !point_in_ring(&exterior, **pt))
            .map(|(j, _)| j)
            .collect();

        match outside.len() {
            0 => {}
            1 => {
                let j = outside[0];
                let pt = interiors[idx].points()[j];
                let mut fixed = false;
                for k in [-1.0, 1.0] {
                    for l in [-1.0, 1.0] {
                        let candidate = Point::new(
                            pt.lon + k * TOPOLOGY_NUDGE_DEG,
                            pt.lat + l * TOPOLOGY_NUDGE_DEG,
                        );
                        if point_in_ring(&exterior, candidate) {
                            interiors[idx].set_point(j, candidate);
                            fixed = true;
                            break;
                        }
                    }
                    if fixed {
                        break;
                    }
                }
                if !fixed {
                    debug!(
                        "Line {}: didn't manage to fix polygon topology",
                        line_number
                    );
                    return Some(split_polygon(exterior, interiors));
                }
            }
            _ => {
                // two parts, or stranger cases
                return Some(split_polygon(exterior, interiors));
            }
        }
    }

    let mut polygon = Polygon::new(exterior);
    for ring in interiors {
        polygon.add_interior(ring);
    }
    Some(Geometry::Polygon(polygon))
}
