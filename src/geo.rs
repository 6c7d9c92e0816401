//! Geo kernel: distance, bearing, interpolation, extrapolation, line
//! splitting, and polyline length, behind two interchangeable back-ends.
//!
//! Both back-ends implement the same [`GeoKernel`] surface; callers thread a
//! `&dyn GeoKernel` (selected once per decode call from configuration)
//! through every distance/geometry computation instead of hard-coding one.

use geo::{Bearing as _, Destination as _, Distance as _, Euclidean, Geodesic};

use crate::model::{Bearing, Coordinate, Length};

/// The two coordinate-system back-ends a decode call can run under.
///
/// `Geographic` treats coordinates as WGS-84 longitude/latitude and uses
/// geodesic formulas; `EqualArea` treats them as an already-projected,
/// equal-area planar system and uses Euclidean formulas. Both produce
/// lengths in meters.
pub trait GeoKernel {
    /// Great-circle (or planar) distance between two coordinates, in meters.
    fn distance(&self, a: Coordinate, b: Coordinate) -> Length;

    /// Initial bearing from `a` to `b`, in degrees `[0, 360)`.
    fn bearing(&self, a: Coordinate, b: Coordinate) -> Bearing;

    /// A coordinate `distance` meters from `origin` at the given `bearing`.
    fn extrapolate(&self, origin: Coordinate, distance: Length, bearing: Bearing) -> Coordinate;

    /// Total length of a polyline: the sum of pairwise distances between
    /// consecutive vertices.
    fn line_string_length(&self, line: &[Coordinate]) -> Length {
        line.windows(2)
            .map(|pair| self.distance(pair[0], pair[1]))
            .sum()
    }

    /// Walks `line` by `distance` meters from its start and returns the
    /// coordinate reached.
    ///
    /// Returns the first vertex when `distance <= 0`, and the last vertex
    /// when `distance` is at or beyond the polyline's length.
    fn interpolate(&self, line: &[Coordinate], distance: Length) -> Coordinate {
        let Some(&first) = line.first() else {
            return Coordinate::default();
        };
        if distance <= Length::ZERO {
            return first;
        }

        let mut remaining = distance;
        for pair in line.windows(2) {
            let (start, end) = (pair[0], pair[1]);
            let segment = self.distance(start, end);
            if remaining <= segment {
                if segment == Length::ZERO {
                    return start;
                }
                let bearing = self.bearing(start, end);
                return self.extrapolate(start, remaining, bearing);
            }
            remaining = remaining - segment;
        }

        *line.last().unwrap_or(&first)
    }

    /// Splits `line` at `distance` meters from its start.
    ///
    /// Either half is `None` when it would collapse to a single point (the
    /// split point coincides with one of the polyline's own endpoints).
    fn split_line(
        &self,
        line: &[Coordinate],
        distance: Length,
    ) -> (Option<Vec<Coordinate>>, Option<Vec<Coordinate>>) {
        if line.len() < 2 {
            return (None, None);
        }
        if distance <= Length::ZERO {
            return (None, Some(line.to_vec()));
        }

        let total = self.line_string_length(line);
        if distance >= total {
            return (Some(line.to_vec()), None);
        }

        let mut pre = vec![line[0]];
        let mut traveled = Length::ZERO;

        for (index, pair) in line.windows(2).enumerate() {
            let (start, end) = (pair[0], pair[1]);
            let segment = self.distance(start, end);
            let remaining = distance - traveled;

            if remaining < segment {
                let split_point = if remaining <= Length::ZERO {
                    start
                } else {
                    let bearing = self.bearing(start, end);
                    self.extrapolate(start, remaining, bearing)
                };
                pre.push(split_point);
                let mut post = vec![split_point];
                post.extend(line[index + 1..].iter().copied());
                return (Some(pre), Some(post));
            }

            pre.push(end);
            traveled = traveled + segment;
        }

        (Some(pre), None)
    }
}

/// Geodesic back-end: WGS-84 longitude/latitude, distances and bearings
/// computed on the ellipsoid.
#[derive(Debug, Clone, Copy, Default)]
pub struct Geographic;

impl GeoKernel for Geographic {
    fn distance(&self, a: Coordinate, b: Coordinate) -> Length {
        Length::from_meters(Geodesic.distance(a.into(), b.into()))
    }

    fn bearing(&self, a: Coordinate, b: Coordinate) -> Bearing {
        let degrees = Geodesic.bearing(a.into(), b.into());
        Bearing::from_degrees(degrees.rem_euclid(360.0))
    }

    fn extrapolate(&self, origin: Coordinate, distance: Length, bearing: Bearing) -> Coordinate {
        Geodesic
            .destination(origin.into(), bearing.degrees(), distance.meters())
            .into()
    }
}

/// Equal-area back-end: an already-projected planar coordinate system,
/// Euclidean distance and bearing. Coordinates are still carried in
/// [`Coordinate`] (`lon`/`lat` fields double as planar x/y).
#[derive(Debug, Clone, Copy, Default)]
pub struct EqualArea;

impl GeoKernel for EqualArea {
    fn distance(&self, a: Coordinate, b: Coordinate) -> Length {
        Length::from_meters(Euclidean.distance(a.into(), b.into()))
    }

    fn bearing(&self, a: Coordinate, b: Coordinate) -> Bearing {
        let dx = b.lon - a.lon;
        let dy = b.lat - a.lat;
        let degrees = dx.atan2(dy).to_degrees();
        Bearing::from_degrees(degrees.rem_euclid(360.0))
    }

    fn extrapolate(&self, origin: Coordinate, distance: Length, bearing: Bearing) -> Coordinate {
        let radians = bearing.degrees().to_radians();
        Coordinate::new(
            origin.lon + distance.meters() * radians.sin(),
            origin.lat + distance.meters() * radians.cos(),
        )
    }
}
