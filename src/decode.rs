//! The primary API: `decode()`, dispatching on the location reference
//! variant (spec.md §6).

use crate::assemble::{
    LineLocation, PointAlongLine, PoiWithAccessPoint, assemble_line_location,
    assemble_point_along_line, assemble_poi_with_access_point,
};
use crate::config::DecoderConfig;
use crate::error::DecodeError;
use crate::geo::{EqualArea, GeoKernel, Geographic};
use crate::map::MapReader;
use crate::matcher::{MatchContext, match_path};
use crate::model::{Coordinate, LocationReference, Point};
use crate::observer::DecoderObserver;
use crate::route::Route;

/// The result of decoding a [`LocationReference`], one variant per kind
/// that carries a result (spec.md §6).
#[derive(Debug, Clone)]
pub enum DecodeResult<L> {
    GeoCoordinate(Coordinate),
    Line(LineLocation<L>),
    PointAlongLine(PointAlongLine<L>),
    Poi(PoiWithAccessPoint<L>),
}

/// Dereferences `reference` against `reader` under `config`, notifying
/// `observer` of matcher progress along the way.
///
/// A geo-coordinate reference is a passthrough: it requires no map lookup
/// and cannot fail. Every other kind matches the reference's location
/// reference points against the map and assembles the corresponding result
/// (spec.md §4.7); [`LocationReference`] has no variant this decoder does
/// not handle, so `DecodeError::UnsupportedReferenceKind` is reserved for
/// future reference kinds rather than reachable today.
pub fn decode<M, O>(
    reference: &LocationReference,
    reader: &M,
    config: &DecoderConfig,
    observer: &O,
) -> Result<DecodeResult<M::Line>, DecodeError>
where
    M: MapReader,
    O: DecoderObserver<M>,
{
    match reference {
        LocationReference::GeoCoordinate(coordinate) => {
            Ok(DecodeResult::GeoCoordinate(*coordinate))
        }

        LocationReference::Line(line_ref) => {
            let routes = match_segments(reader, config, observer, &line_ref.points)?;
            let location = assemble_line_location(routes, line_ref.offsets)?;
            Ok(DecodeResult::Line(location))
        }

        LocationReference::PointAlongLine(reference) => {
            let routes = match_segments(reader, config, observer, &reference.points)?;
            let location = assemble_point_along_line(
                routes,
                reference.pos_offset,
                reference.orientation,
                reference.side,
            )?;
            Ok(DecodeResult::PointAlongLine(location))
        }

        LocationReference::Poi(reference) => {
            let access = &reference.access_point;
            let routes = match_segments(reader, config, observer, &access.points)?;
            let location = assemble_poi_with_access_point(
                routes,
                access.pos_offset,
                access.orientation,
                access.side,
                reference.poi,
            )?;
            Ok(DecodeResult::Poi(location))
        }
    }
}

fn match_segments<M, O>(
    reader: &M,
    config: &DecoderConfig,
    observer: &O,
    points: &[Point],
) -> Result<Vec<Route<M::Line>>, DecodeError>
where
    M: MapReader,
    O: DecoderObserver<M>,
{
    let geographic = Geographic;
    let equal_area = EqualArea;
    let kernel: &dyn GeoKernel = if config.equal_area { &equal_area } else { &geographic };

    let ctx = MatchContext::new(reader, kernel, config, observer);
    match_path(&ctx, points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{GeoKernel as _, Geographic as GeographicKernel};
    use crate::map::tests_support::{TestLine, TestMap, TestNode};
    use crate::model::{
        Bearing, Fow, Frc, LineAttributes, Orientation, PathAttributes, RelativeOffsets,
        SideOfRoad,
    };
    use crate::observer::NoopObserver;

    fn straight_map() -> TestMap {
        let coords = [
            Coordinate::new(13.400, 52.520),
            Coordinate::new(13.410, 52.520),
            Coordinate::new(13.420, 52.520),
        ];
        let mut map = TestMap::default();
        for id in 0..coords.len() as u32 {
            map.nodes.push(TestNode {
                id,
                coordinate: coords[id as usize],
                outgoing: vec![],
                incoming: vec![],
            });
        }
        for id in 0..(coords.len() - 1) as u32 {
            let (start, end) = (id, id + 1);
            let length = GeographicKernel.distance(coords[start as usize], coords[end as usize]);
            map.lines.push(TestLine {
                id,
                start,
                end,
                geometry: vec![coords[start as usize], coords[end as usize]],
                length,
                frc: Frc::Frc3,
                fow: Fow::SingleCarriageway,
            });
            map.nodes[start as usize].outgoing.push(id);
            map.nodes[end as usize].incoming.push(id);
        }
        map
    }

    fn lrp(coord: Coordinate, bear_degrees: f64, path: Option<(Frc, f64)>) -> Point {
        Point {
            coordinate: coord,
            line: LineAttributes {
                frc: Frc::Frc3,
                fow: Fow::SingleCarriageway,
                bear: Bearing::from_degrees(bear_degrees),
            },
            path: path.map(|(lfrcnp, dnp)| PathAttributes {
                lfrcnp,
                dnp: crate::model::Length::from_meters(dnp),
            }),
        }
    }

    #[test]
    fn decode_passes_geo_coordinate_through_verbatim() {
        let map = straight_map();
        let config = DecoderConfig::default();
        let observer = NoopObserver;
        let coordinate = Coordinate::new(13.405, 52.521);
        let reference = LocationReference::GeoCoordinate(coordinate);

        let result = decode(&reference, &map, &config, &observer).unwrap();
        match result {
            DecodeResult::GeoCoordinate(c) => assert_eq!(c, coordinate),
            _ => panic!("expected a geo-coordinate result"),
        }
    }

    #[test]
    fn decode_matches_a_line_reference_across_the_whole_map() {
        let map = straight_map();
        let config = DecoderConfig::default();
        let observer = NoopObserver;

        let points = vec![
            lrp(Coordinate::new(13.400, 52.520), 90.0, Some((Frc::Frc7, 2226.0))),
            lrp(Coordinate::new(13.420, 52.520), 90.0, None),
        ];
        let reference =
            LocationReference::line(points, RelativeOffsets::default()).unwrap();

        let result = decode(&reference, &map, &config, &observer).unwrap();
        match result {
            DecodeResult::Line(location) => assert_eq!(location.edges().len(), 2),
            _ => panic!("expected a line location"),
        }
    }

    #[test]
    fn decode_point_along_line_returns_the_mid_segment_point() {
        let map = straight_map();
        let config = DecoderConfig::default();
        let observer = NoopObserver;

        let points = [
            lrp(Coordinate::new(13.400, 52.520), 90.0, Some((Frc::Frc7, 2226.0))),
            lrp(Coordinate::new(13.420, 52.520), 90.0, None),
        ];
        let reference = LocationReference::point_along_line(
            points,
            0.5,
            Orientation::Forward,
            SideOfRoad::OnRoadOrUnknown,
        )
        .unwrap();

        let result = decode(&reference, &map, &config, &observer).unwrap();
        assert!(matches!(result, DecodeResult::PointAlongLine(_)));
    }
}
