//! Location assemblers: turning matched segment routes into the three
//! result shapes the decoder can produce, plus the offset trimmer shared by
//! all of them (spec.md §4.7, §4.8).

use crate::error::DecodeError;
use crate::geo::GeoKernel;
use crate::map::Line;
use crate::model::{Coordinate, Length, Orientation, RelativeOffsets, SideOfRoad};
use crate::route::{PointOnLine, Route};

/// A decoded line location: the matched, offset-trimmed sub-path.
#[derive(Debug, Clone)]
pub struct LineLocation<L>(pub Route<L>);

impl<L: Line + Clone> LineLocation<L> {
    pub fn edges(&self) -> Vec<L> {
        self.0.edges()
    }

    pub fn coordinates(&self, kernel: &dyn GeoKernel) -> Vec<Coordinate> {
        self.0.coordinates(kernel)
    }
}

/// A decoded point-along-line location.
#[derive(Debug, Clone)]
pub struct PointAlongLine<L> {
    pub point: PointOnLine<L>,
    pub orientation: Orientation,
    pub side: SideOfRoad,
}

/// A decoded POI-with-access-point location: as [`PointAlongLine`] plus the
/// raw POI coordinate, carried verbatim regardless of access-point matching.
#[derive(Debug, Clone)]
pub struct PoiWithAccessPoint<L> {
    pub access_point: PointAlongLine<L>,
    pub poi: Coordinate,
}

/// Concatenates matched per-segment routes into a single route (spec.md
/// §4.7 step 1): the flat edge list drops a duplicate edge straddling two
/// consecutive segments, and the combined start/end are the first
/// segment's start and the last segment's end.
///
/// [`Route::new`] already suppresses a duplicate between its own interior
/// list and its start/end edge, so folding each segment's edges through it
/// reuses that same dedup logic at every segment boundary.
pub fn combine_routes<L: Line + Clone>(routes: Vec<Route<L>>) -> Route<L> {
    assert!(!routes.is_empty(), "combine_routes requires at least one route");

    let start = routes.first().expect("checked non-empty above").start.clone();
    let end = routes.last().expect("checked non-empty above").end.clone();

    let mut interior: Vec<L> = Vec::new();
    for route in &routes {
        for edge in route.edges() {
            if interior.last().is_some_and(|last: &L| last.id() == edge.id()) {
                continue;
            }
            interior.push(edge);
        }
    }

    Route::new(start, interior, end)
}

/// The offset trimmer (spec.md §4.8): converts a raw matched route plus
/// absolute positive/negative meter offsets into a precise sub-line.
pub fn trim<L: Line + Clone>(
    route: &Route<L>,
    pos_offset: Length,
    neg_offset: Length,
) -> Result<Route<L>, DecodeError> {
    let mut edges = route.edges();
    let mut pos_total = pos_offset + route.start.distance_from_start();
    let mut neg_total = neg_offset + route.end.distance_to_end();

    while !edges.is_empty() && pos_total >= edges[0].length() {
        pos_total = pos_total - edges[0].length();
        edges.remove(0);
    }
    if edges.is_empty() {
        return Err(DecodeError::OffsetExceedsPath);
    }

    while !edges.is_empty() && neg_total >= edges.last().expect("checked non-empty above").length() {
        neg_total = neg_total - edges.last().expect("checked non-empty above").length();
        edges.pop();
    }
    if edges.is_empty() {
        return Err(DecodeError::OffsetExceedsPath);
    }

    let first = edges.first().expect("checked non-empty above").clone();
    let last = edges.last().expect("checked non-empty above").clone();

    let start_fraction = fraction_of(pos_total, first.length());
    let end_fraction = 1.0 - fraction_of(neg_total, last.length());

    if edges.len() == 1 && end_fraction < start_fraction {
        return Err(DecodeError::OffsetExceedsPath);
    }

    let interior = if edges.len() > 2 {
        edges[1..edges.len() - 1].to_vec()
    } else {
        Vec::new()
    };

    Ok(Route::new(
        PointOnLine::new(first, start_fraction),
        interior,
        PointOnLine::new(last, end_fraction),
    ))
}

fn fraction_of(offset: Length, length: Length) -> f64 {
    if length == Length::ZERO {
        0.0
    } else {
        (offset.meters() / length.meters()).clamp(0.0, 1.0)
    }
}

/// Assembles a line location (spec.md §4.7 "Line location"): concatenates
/// the matched segments, applies the reference's relative offsets scaled by
/// the first/last segment lengths, then trims.
pub fn assemble_line_location<L: Line + Clone>(
    routes: Vec<Route<L>>,
    offsets: RelativeOffsets,
) -> Result<LineLocation<L>, DecodeError> {
    let pos_off = Length::from_meters(
        offsets.pos * routes.first().expect("at least one matched segment").length().meters(),
    );
    let neg_off = Length::from_meters(
        offsets.neg * routes.last().expect("at least one matched segment").length().meters(),
    );

    let combined = combine_routes(routes);
    trim(&combined, pos_off, neg_off).map(LineLocation)
}

/// Walks the combined route (first partial edge, interior edges, last
/// partial edge) consuming meters until `target` falls within an edge,
/// returning that edge and the residual meter offset from its start
/// (spec.md §4.7 "Point-along-line").
fn locate_offset<L: Line + Clone>(
    combined: &Route<L>,
    target: Length,
) -> Result<(L, Length), DecodeError> {
    if target > combined.length() {
        return Err(DecodeError::OffsetExceedsPath);
    }

    let edges = combined.edges();
    let last_index = edges.len().saturating_sub(1);
    let mut consumed = Length::ZERO;

    for (index, edge) in edges.iter().enumerate() {
        let start_in_edge = if index == 0 {
            combined.start.distance_from_start()
        } else {
            Length::ZERO
        };
        let end_in_edge = if index == last_index {
            combined.end.distance_from_start()
        } else {
            edge.length()
        };
        let segment_len = (end_in_edge - start_in_edge).max(Length::ZERO);

        if target <= consumed + segment_len || index == last_index {
            let local_offset = start_in_edge + (target - consumed);
            return Ok((edge.clone(), local_offset));
        }
        consumed = consumed + segment_len;
    }

    Err(DecodeError::OffsetExceedsPath)
}

/// Assembles a point-along-line location (spec.md §4.7).
pub fn assemble_point_along_line<L: Line + Clone>(
    routes: Vec<Route<L>>,
    pos_offset_fraction: f64,
    orientation: Orientation,
    side: SideOfRoad,
) -> Result<PointAlongLine<L>, DecodeError> {
    let combined = combine_routes(routes);
    let target = Length::from_meters(combined.length().meters() * pos_offset_fraction);
    let (edge, offset_meters) = locate_offset(&combined, target)?;

    let fraction = fraction_of(offset_meters, edge.length());
    Ok(PointAlongLine {
        point: PointOnLine::new(edge, fraction),
        orientation,
        side,
    })
}

/// Assembles a POI-with-access-point location (spec.md §4.7): as
/// [`assemble_point_along_line`] plus the raw POI coordinate, unchanged.
pub fn assemble_poi_with_access_point<L: Line + Clone>(
    routes: Vec<Route<L>>,
    pos_offset_fraction: f64,
    orientation: Orientation,
    side: SideOfRoad,
    poi: Coordinate,
) -> Result<PoiWithAccessPoint<L>, DecodeError> {
    let access_point = assemble_point_along_line(routes, pos_offset_fraction, orientation, side)?;
    Ok(PoiWithAccessPoint { access_point, poi })
}
