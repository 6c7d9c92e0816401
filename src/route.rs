//! Route algebra: a point on an edge plus a fractional offset, and a
//! contiguous directed sub-path built out of them (spec.md §3, §4.2).

use crate::geo::GeoKernel;
use crate::map::Line;
use crate::model::{Coordinate, Length};

/// A point on a [`Line`]: the edge plus a fractional offset in `[0, 1]`,
/// where `0` is the start node and `1` is the end node.
#[derive(Debug, Clone)]
pub struct PointOnLine<L> {
    pub line: L,
    pub offset: f64,
}

impl<L: Line + Clone> PointOnLine<L> {
    pub fn new(line: L, offset: f64) -> Self {
        debug_assert!((0.0..=1.0).contains(&offset), "offset out of [0, 1]: {offset}");
        Self { line, offset }
    }

    pub fn at_start(line: L) -> Self {
        Self::new(line, 0.0)
    }

    pub fn at_end(line: L) -> Self {
        Self::new(line, 1.0)
    }

    /// Meter distance from the edge's start node to this point.
    pub fn distance_from_start(&self) -> Length {
        Length::from_meters(self.line.length().meters() * self.offset)
    }

    /// Meter distance from this point to the edge's end node.
    pub fn distance_to_end(&self) -> Length {
        self.line.length() - self.distance_from_start()
    }

    /// The coordinate this point resolves to, under the active geo kernel.
    pub fn position(&self, kernel: &dyn GeoKernel) -> Coordinate {
        kernel.interpolate(self.line.geometry(), self.distance_from_start())
    }
}

/// A contiguous directed sub-path: a start point, zero or more interior
/// edges, and an end point.
///
/// Constructing through [`Route::new`] enforces the adjacency-dedup
/// invariant (spec.md §3, invariant i): if the start edge equals the first
/// interior edge (or the end edge equals the last interior edge), the
/// duplicate is suppressed and the start/end `PointOnLine` remains the
/// authoritative holder of that edge.
#[derive(Debug, Clone)]
pub struct Route<L> {
    pub start: PointOnLine<L>,
    pub interior: Vec<L>,
    pub end: PointOnLine<L>,
}

impl<L: Line + Clone> Route<L> {
    pub fn new(start: PointOnLine<L>, mut interior: Vec<L>, end: PointOnLine<L>) -> Self {
        if interior.first().is_some_and(|l| l.id() == start.line.id()) {
            interior.remove(0);
        }
        if interior.last().is_some_and(|l| l.id() == end.line.id()) {
            interior.pop();
        }
        Self { start, interior, end }
    }

    /// `true` when the start and end points lie on the same edge with no
    /// interior edges in between.
    pub fn is_single_edge(&self) -> bool {
        self.interior.is_empty() && self.start.line.id() == self.end.line.id()
    }

    /// The flattened edge sequence: the start edge, the interior edges, the
    /// end edge, with the start/end edge never repeated (see [`Route::new`]).
    pub fn edges(&self) -> Vec<L> {
        if self.is_single_edge() {
            return vec![self.start.line.clone()];
        }
        let mut edges = Vec::with_capacity(self.interior.len() + 2);
        edges.push(self.start.line.clone());
        edges.extend(self.interior.iter().cloned());
        edges.push(self.end.line.clone());
        edges
    }

    /// Route length: polyline length of the interior edges, plus the
    /// fraction of the start edge after the start point, plus the fraction
    /// of the end edge before the end point.
    pub fn length(&self) -> Length {
        if self.is_single_edge() {
            let delta = self.end.offset - self.start.offset;
            return Length::from_meters(self.start.line.length().meters() * delta.max(0.0));
        }

        let interior_length: Length = self.interior.iter().map(Line::length).sum();
        self.start.distance_to_end() + interior_length + self.end.distance_from_start()
    }

    /// The coordinate sequence of the whole route, under the active kernel:
    /// the trimmed start edge, the full interior edges, the trimmed end edge.
    pub fn coordinates(&self, kernel: &dyn GeoKernel) -> Vec<Coordinate> {
        if self.is_single_edge() {
            let (_, from_start) = kernel.split_line(self.start.line.geometry(), self.start.distance_from_start());
            let tail = from_start.unwrap_or_default();
            let (pre, _) = kernel.split_line(&tail, self.end.distance_from_start() - self.start.distance_from_start());
            return pre.unwrap_or(tail);
        }

        let mut coords = Vec::new();

        let (_, from_start) = kernel.split_line(self.start.line.geometry(), self.start.distance_from_start());
        coords.extend(from_start.unwrap_or_default());

        for edge in &self.interior {
            if let Some(&last) = coords.last() {
                let geometry = edge.geometry();
                if geometry.first() == Some(&last) {
                    coords.extend(geometry.iter().skip(1).copied());
                    continue;
                }
            }
            coords.extend(edge.geometry().iter().copied());
        }

        let (up_to_end, _) = kernel.split_line(self.end.line.geometry(), self.end.distance_from_start());
        if let Some(up_to_end) = up_to_end {
            if coords.last() == up_to_end.first() {
                coords.extend(up_to_end.into_iter().skip(1));
            } else {
                coords.extend(up_to_end);
            }
        }

        coords
    }
}

/// Projects `coord` onto `line`'s geometry, returning the fractional offset
/// `r` (in `[0, 1]`) of the closest point on the polyline.
///
/// Walks each segment of the polyline and keeps the closest projection,
/// clamping to the segment's own endpoints; `r` is then the cumulative
/// distance to that projection divided by the line's total length.
pub fn project_onto_line(kernel: &dyn GeoKernel, geometry: &[Coordinate], coord: Coordinate) -> f64 {
    if geometry.len() < 2 {
        return 0.0;
    }

    let total = kernel.line_string_length(geometry);
    if total == Length::ZERO {
        return 0.0;
    }

    let mut best_distance = Length::MAX;
    let mut best_offset = Length::ZERO;
    let mut traveled = Length::ZERO;

    for pair in geometry.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        let segment_length = kernel.distance(start, end);

        let along = if segment_length == Length::ZERO {
            Length::ZERO
        } else {
            let to_coord = kernel.distance(start, coord);
            let bearing_to_end = kernel.bearing(start, end);
            let bearing_to_coord = kernel.bearing(start, coord);
            let angle = bearing_to_end.difference(bearing_to_coord).to_radians();
            Length::from_meters((to_coord.meters() * angle.cos()).clamp(0.0, segment_length.meters()))
        };

        let projected = kernel.extrapolate(start, along, kernel.bearing(start, end));
        let distance_to_line = kernel.distance(coord, projected);

        if distance_to_line < best_distance {
            best_distance = distance_to_line;
            best_offset = traveled + along;
        }

        traveled = traveled + segment_length;
    }

    (best_offset.meters() / total.meters()).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::geo::Geographic;
    use crate::model::{Fow, Frc};

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct TestLine {
        id: u32,
        start: u32,
        end: u32,
        geometry: Vec<Coordinate>,
        length: Length,
    }

    impl Line for TestLine {
        type Id = u32;
        type NodeId = u32;

        fn id(&self) -> u32 {
            self.id
        }
        fn start_node(&self) -> u32 {
            self.start
        }
        fn end_node(&self) -> u32 {
            self.end
        }
        fn geometry(&self) -> &[Coordinate] {
            &self.geometry
        }
        fn length(&self) -> Length {
            self.length
        }
        fn frc(&self) -> Frc {
            Frc::Frc3
        }
        fn fow(&self) -> Fow {
            Fow::SingleCarriageway
        }
    }

    fn line(id: u32, a: Coordinate, b: Coordinate) -> TestLine {
        let length = Geographic.distance(a, b);
        TestLine {
            id,
            start: id,
            end: id + 1,
            geometry: vec![a, b],
            length,
        }
    }

    #[test]
    fn point_on_line_midpoint_offset_halves_the_length() {
        let a = Coordinate::new(13.41, 52.52);
        let b = Coordinate::new(13.42, 52.52);
        let edge = line(1, a, b);
        let point = PointOnLine::new(edge.clone(), 0.5);
        assert_abs_diff_eq!(
            point.distance_from_start().meters(),
            edge.length().meters() / 2.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn single_edge_route_length_is_the_offset_delta() {
        let edge = line(1, Coordinate::new(13.41, 52.52), Coordinate::new(13.42, 52.52));
        let start = PointOnLine::new(edge.clone(), 0.25);
        let end = PointOnLine::new(edge.clone(), 0.75);
        let route = Route::new(start, vec![], end);
        assert!(route.is_single_edge());
        assert_abs_diff_eq!(
            route.length().meters(),
            edge.length().meters() * 0.5,
            epsilon = 1e-6
        );
    }

    #[test]
    fn route_new_dedups_interior_edge_matching_the_start() {
        let a = line(1, Coordinate::new(13.41, 52.52), Coordinate::new(13.42, 52.52));
        let b = line(2, Coordinate::new(13.42, 52.52), Coordinate::new(13.43, 52.52));
        let start = PointOnLine::at_start(a.clone());
        let end = PointOnLine::at_end(b.clone());
        let route = Route::new(start, vec![a.clone(), b.clone()], end);
        assert_eq!(route.edges().len(), 2);
    }

    #[test]
    fn project_onto_line_finds_the_midpoint() {
        let a = Coordinate::new(13.41, 52.52);
        let b = Coordinate::new(13.42, 52.52);
        let mid = Coordinate::new(13.415, 52.52);
        let r = project_onto_line(&Geographic, &[a, b], mid);
        assert_abs_diff_eq!(r, 0.5, epsilon = 0.05);
    }
}
