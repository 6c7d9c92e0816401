//! Core data types shared by every decoding stage: the location reference
//! point (LRP), its road attributes, and the location reference variants
//! that the decoder accepts.

use std::ops::{Add, Sub};

use strum::{EnumCount, EnumIter};

/// Functional Road Class.
///
/// An ordered 8-level road classification based on the importance of the
/// road, `Frc0` being the highest (most important) class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumCount, EnumIter)]
#[repr(u8)]
pub enum Frc {
    /// Main road, highest importance.
    Frc0 = 0,
    Frc1 = 1,
    Frc2 = 2,
    Frc3 = 3,
    Frc4 = 4,
    Frc5 = 5,
    Frc6 = 6,
    /// Other class road, lowest importance.
    Frc7 = 7,
}

impl Default for Frc {
    fn default() -> Self {
        Self::Frc7
    }
}

impl Frc {
    /// All eight variants, ordered from highest to lowest importance.
    pub const ALL: [Frc; 8] = [
        Frc::Frc0,
        Frc::Frc1,
        Frc::Frc2,
        Frc::Frc3,
        Frc::Frc4,
        Frc::Frc5,
        Frc::Frc6,
        Frc::Frc7,
    ];

    const fn from_index(index: u8) -> Self {
        Self::ALL[index as usize]
    }
}

/// Form of Way.
///
/// Describes the physical road type of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumCount, EnumIter)]
#[repr(u8)]
pub enum Fow {
    /// The physical road type is unknown.
    Undefined = 0,
    /// Permitted for motorized vehicles only, two or more physically
    /// separated carriageways, no single level-crossings.
    Motorway = 1,
    /// Physically separated carriageways that are not a motorway.
    MultipleCarriageway = 2,
    /// Roads without separate carriageways.
    SingleCarriageway = 3,
    /// A ring on which traffic traveling in only one direction is allowed.
    Roundabout = 4,
    /// An open area (partly) enclosed by roads, used for non-traffic purposes.
    TrafficSquare = 5,
    /// A road especially designed to enter or leave a line.
    SlipRoad = 6,
    /// The physical road type is known but does not fit the other categories.
    Other = 7,
}

impl Default for Fow {
    fn default() -> Self {
        Self::Other
    }
}

/// The side of the road on which a point location lies, relative to the
/// direction of the referenced line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum SideOfRoad {
    /// On (or above) the road, or the distinction is not applicable.
    #[default]
    OnRoadOrUnknown = 0,
    Right = 1,
    Left = 2,
    Both = 3,
}

/// The relationship between a point location and the direction of the
/// referenced line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Orientation {
    #[default]
    Unknown = 0,
    /// From the first LRP towards the second.
    Forward = 1,
    /// From the second LRP towards the first.
    Backward = 2,
    Both = 3,
}

/// A distance in meters.
///
/// Newtype so that lengths, which the geo kernel always produces and consumes
/// in meters, cannot be confused with bare `f64` offsets or ratios.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Length(f64);

impl Length {
    pub const ZERO: Self = Self(0.0);
    pub const MAX: Self = Self(f64::INFINITY);

    pub const fn from_meters(meters: f64) -> Self {
        Self(meters)
    }

    pub const fn meters(self) -> f64 {
        self.0
    }

    pub fn max(self, other: Self) -> Self {
        Self(self.0.max(other.0))
    }

    pub fn min(self, other: Self) -> Self {
        Self(self.0.min(other.0))
    }
}

impl Add for Length {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Length {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl std::iter::Sum for Length {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Length::ZERO, Add::add)
    }
}

/// An angle in degrees, in the range `[0, 360)`.
///
/// "0" is included and "360" excluded, matching the OpenLR physical data
/// format's bearing field.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Bearing(f64);

impl Bearing {
    pub const fn from_degrees(degrees: f64) -> Self {
        Self(degrees)
    }

    pub const fn degrees(self) -> f64 {
        self.0
    }

    /// The signed difference `self - other`, normalized to `[-180, 180]`.
    pub fn difference(self, other: Self) -> f64 {
        (((self.0 - other.0).abs() + 180.0) % 360.0) - 180.0
    }
}

/// A WGS-84 longitude/latitude pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        const EPSILON: f64 = 1e-5;
        approx::abs_diff_eq!(self.lon, other.lon, epsilon = EPSILON)
            && approx::abs_diff_eq!(self.lat, other.lat, epsilon = EPSILON)
    }
}

impl From<Coordinate> for geo::Point<f64> {
    fn from(coordinate: Coordinate) -> Self {
        geo::Point::new(coordinate.lon, coordinate.lat)
    }
}

impl From<geo::Point<f64>> for Coordinate {
    fn from(point: geo::Point<f64>) -> Self {
        Self {
            lon: point.x(),
            lat: point.y(),
        }
    }
}

/// Line attributes carried by every location reference point: the expected
/// functional road class, form of way, and bearing of the outgoing (or, for
/// the last point, incoming) edge.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LineAttributes {
    pub frc: Frc,
    pub fow: Fow,
    pub bear: Bearing,
}

/// Path attributes, carried by every location reference point except the
/// last one: how the encoder expects the path to continue towards the next
/// point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PathAttributes {
    /// Lowest functional road class the encoder tolerates up to the next point.
    pub lfrcnp: Frc,
    /// Distance to the next point, in meters.
    pub dnp: Length,
}

/// A Location Reference Point (LRP): an anchor coordinate carrying expected
/// road attributes.
///
/// `path` is `Some` for every point except the last one in a path reference —
/// the last point carries neither LFRCNP nor DNP. A reference that places
/// `path` data on what should be the terminal point, or omits it elsewhere,
/// is malformed and must be rejected at construction (see
/// [`LocationReference::line`] and [`LocationReference::point_along_line`]).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub coordinate: Coordinate,
    pub line: LineAttributes,
    pub path: Option<PathAttributes>,
}

impl Point {
    /// A point is "last" exactly when it carries no path attributes, i.e. it
    /// is the terminal LRP of its path reference.
    pub const fn is_last(&self) -> bool {
        self.path.is_none()
    }
}

/// The positive and negative offsets of a line location, expressed as
/// fractions of the first/last segment's expected distance to next point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RelativeOffsets {
    /// Fraction, in `[0, 1)`, of the first segment's DNP to trim from the start.
    pub pos: f64,
    /// Fraction, in `[0, 1)`, of the last segment's DNP to trim from the end.
    pub neg: f64,
}

/// A line location reference: an ordered path of LRPs plus relative offsets.
#[derive(Debug, Clone, PartialEq)]
pub struct LineReference {
    pub points: Vec<Point>,
    pub offsets: RelativeOffsets,
}

/// A point-along-line location reference: a one-segment path reference plus
/// an along-path offset, orientation, and side of road.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointAlongLineReference {
    pub points: [Point; 2],
    /// Fraction, in `[0, 1)`, of the path length at which the point lies.
    pub pos_offset: f64,
    pub orientation: Orientation,
    pub side: SideOfRoad,
}

/// A POI-with-access-point location reference: as [`PointAlongLineReference`]
/// plus the raw, absolute coordinate of the point of interest itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoiWithAccessPointReference {
    pub access_point: PointAlongLineReference,
    pub poi: Coordinate,
}

/// A parsed, already-decoded OpenLR location reference.
///
/// This is the input to [`crate::decode`]. Producing one from wire bytes is
/// the job of a binary codec, which is out of scope for this crate (see
/// `spec.md` §1); this enum only models the four kinds the decoder supports.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationReference {
    Line(LineReference),
    GeoCoordinate(Coordinate),
    PointAlongLine(PointAlongLineReference),
    Poi(PoiWithAccessPointReference),
}

/// Describes why [`LocationReference::line`] or
/// [`LocationReference::point_along_line`] rejected malformed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MalformedReferenceError {
    #[error("a line location reference needs at least 2 location reference points")]
    TooFewPoints,
    #[error("location reference point {0} is missing path attributes (LFRCNP/DNP)")]
    MissingPathAttributes(usize),
    #[error("the last location reference point must not carry path attributes (LFRCNP/DNP)")]
    TerminalPointHasPathAttributes,
}

impl LocationReference {
    /// Builds a line location reference, rejecting the malformed cases called
    /// out as an open question in `spec.md` §9: every point but the last must
    /// carry path attributes, and the last point must carry none.
    pub fn line(
        points: Vec<Point>,
        offsets: RelativeOffsets,
    ) -> Result<Self, MalformedReferenceError> {
        validate_path(&points)?;
        Ok(Self::Line(LineReference { points, offsets }))
    }

    /// Builds a point-along-line reference, applying the same LRP validity
    /// rule as [`Self::line`] to its two points.
    pub fn point_along_line(
        points: [Point; 2],
        pos_offset: f64,
        orientation: Orientation,
        side: SideOfRoad,
    ) -> Result<Self, MalformedReferenceError> {
        validate_path(&points)?;
        Ok(Self::PointAlongLine(PointAlongLineReference {
            points,
            pos_offset,
            orientation,
            side,
        }))
    }

    /// Builds a POI-with-access-point reference.
    pub fn poi(
        points: [Point; 2],
        pos_offset: f64,
        orientation: Orientation,
        side: SideOfRoad,
        poi: Coordinate,
    ) -> Result<Self, MalformedReferenceError> {
        let Self::PointAlongLine(access_point) =
            Self::point_along_line(points, pos_offset, orientation, side)?
        else {
            unreachable!()
        };
        Ok(Self::Poi(PoiWithAccessPointReference { access_point, poi }))
    }
}

fn validate_path(points: &[Point]) -> Result<(), MalformedReferenceError> {
    if points.len() < 2 {
        return Err(MalformedReferenceError::TooFewPoints);
    }
    let (last, rest) = points.split_last().expect("at least 2 points");
    if let Some(index) = rest.iter().position(Point::is_last) {
        return Err(MalformedReferenceError::MissingPathAttributes(index));
    }
    if !last.is_last() {
        return Err(MalformedReferenceError::TerminalPointHasPathAttributes);
    }
    Ok(())
}
