//! The matcher: pair-wise candidate enumeration, route search via A*, tail
//! recursion across remaining LRPs, backtracking on failure (spec.md §4.6).

use std::time::Instant;

use tracing::debug;

use crate::astar::astar;
use crate::candidates::{Candidate, NodeValidityCache, find_candidates};
use crate::config::DecoderConfig;
use crate::error::DecodeError;
use crate::geo::GeoKernel;
use crate::map::{Line, MapReader};
use crate::model::{Frc, Length, Point};
use crate::observer::{DecoderObserver, MatchFailReason, RouteFailReason};
use crate::route::{PointOnLine, Route};

/// Bundles everything threaded through every recursive `match_tail` frame.
pub struct MatchContext<'a, M: MapReader, O> {
    pub reader: &'a M,
    pub kernel: &'a dyn GeoKernel,
    pub config: &'a DecoderConfig,
    pub validity: NodeValidityCache<M::NodeId>,
    pub observer: &'a O,
    deadline: Option<Instant>,
}

impl<'a, M: MapReader, O: DecoderObserver<M>> MatchContext<'a, M, O> {
    pub fn new(reader: &'a M, kernel: &'a dyn GeoKernel, config: &'a DecoderConfig, observer: &'a O) -> Self {
        let deadline = config.timeout.map(|secs| Instant::now() + std::time::Duration::from_secs_f64(secs));
        Self {
            reader,
            kernel,
            config,
            validity: NodeValidityCache::new(),
            observer,
            deadline,
        }
    }

    fn check_timeout(&self) -> Result<(), DecodeError> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(DecodeError::Timeout),
            _ => Ok(()),
        }
    }
}

/// Top-level matcher entry point (spec.md §4.6 "Dispatch"): generates
/// candidates for the first LRP and enters the recursive tail match.
pub fn match_path<M, O>(
    ctx: &MatchContext<M, O>,
    points: &[Point],
) -> Result<Vec<Route<M::Line>>, DecodeError>
where
    M: MapReader,
    O: DecoderObserver<M>,
{
    ctx.check_timeout()?;

    let first = &points[0];
    let first_candidates = find_candidates(
        ctx.reader,
        ctx.kernel,
        ctx.config,
        &ctx.validity,
        first,
        points.len() == 1,
        ctx.observer,
    );
    if first_candidates.is_empty() {
        return Err(DecodeError::NoFirstCandidates);
    }

    match_tail(ctx, first, first_candidates, &points[1..])
}

/// Recursive tail matcher (spec.md §4.6). `current_candidates` are the
/// already-generated, already-scored candidates for `current`; `tail` is the
/// remaining LRPs still to be matched.
fn match_tail<M, O>(
    ctx: &MatchContext<M, O>,
    current: &Point,
    current_candidates: Vec<Candidate<M::Line>>,
    tail: &[Point],
) -> Result<Vec<Route<M::Line>>, DecodeError>
where
    M: MapReader,
    O: DecoderObserver<M>,
{
    ctx.check_timeout()?;

    let next = &tail[0];
    let last = tail.len() == 1;
    debug!("Matching tail of {} point(s), {} candidate(s) so far", tail.len(), current_candidates.len());

    let path = current
        .path
        .expect("non-terminal location reference points always carry path attributes");

    let dnp = path.dnp.meters();
    let min_len = Length::from_meters(
        (1.0 - ctx.config.max_dnp_deviation) * dnp - ctx.config.tolerated_dnp_dev,
    )
    .max(Length::ZERO);
    let max_len = Length::from_meters(
        (1.0 + ctx.config.max_dnp_deviation) * dnp + ctx.config.tolerated_dnp_dev,
    );
    let lfrc = ctx.config.tolerated_lfrc[path.lfrcnp as usize];

    let next_candidates = find_candidates(
        ctx.reader,
        ctx.kernel,
        ctx.config,
        &ctx.validity,
        next,
        last,
        ctx.observer,
    );
    if last && next_candidates.is_empty() {
        return Err(DecodeError::NoLastCandidates);
    }

    let mut pairs: Vec<(&Candidate<M::Line>, &Candidate<M::Line>)> = current_candidates
        .iter()
        .flat_map(|from| next_candidates.iter().map(move |to| (from, to)))
        .collect();
    pairs.sort_by(|a, b| {
        let score_a = a.0.score + a.1.score;
        let score_b = b.0.score + b.1.score;
        score_b.total_cmp(&score_a)
    });

    for (from, to) in pairs {
        ctx.check_timeout()?;

        let route = match attempt_route(ctx, &from.point, &to.point, lfrc, max_len) {
            Ok(route) => route,
            Err(()) => {
                ctx.observer.on_route_fail(
                    current,
                    next,
                    &from.point,
                    &to.point,
                    RouteFailReason::PathNotFound,
                );
                continue;
            }
        };

        let length = route.length();
        if length < min_len || length > max_len {
            ctx.observer.on_route_fail(
                current,
                next,
                &from.point,
                &to.point,
                RouteFailReason::LengthOutOfWindow,
            );
            continue;
        }

        ctx.observer.on_route_success(current, next, &from.point, &to.point, &route);

        if last {
            return Ok(vec![route]);
        }

        let next_candidate = Candidate { point: to.point.clone(), score: to.score };
        match match_tail(ctx, next, vec![next_candidate], &tail[1..]) {
            Ok(mut rest) => {
                rest.insert(0, route);
                return Ok(rest);
            }
            Err(DecodeError::Timeout) => return Err(DecodeError::Timeout),
            Err(_) => continue,
        }
    }

    let from_points: Vec<_> = current_candidates.iter().map(|c| c.point.clone()).collect();
    let to_points: Vec<_> = next_candidates.iter().map(|c| c.point.clone()).collect();
    ctx.observer.on_matching_fail(
        current,
        next,
        &from_points,
        &to_points,
        MatchFailReason::NoPairSucceeded,
    );

    Err(DecodeError::NoMatch)
}

/// Attempts to connect `from` to `to`: the same edge when `from` precedes
/// `to` on it, otherwise an A* search constrained by `lfrc` and `maxlen`.
fn attempt_route<M: MapReader>(
    ctx: &MatchContext<M, impl DecoderObserver<M>>,
    from: &PointOnLine<M::Line>,
    to: &PointOnLine<M::Line>,
    lfrc: Frc,
    maxlen: Length,
) -> Result<Route<M::Line>, ()> {
    if from.line.id() == to.line.id() && from.offset <= to.offset {
        return Ok(Route::new(from.clone(), vec![], to.clone()));
    }

    let keep = |line: &M::Line| line.frc() <= lfrc;
    let edge_ids = astar(
        ctx.reader,
        ctx.kernel,
        from.line.end_node(),
        to.line.start_node(),
        keep,
        maxlen,
    )
    .map_err(|_| ())?;

    let interior: Vec<M::Line> = edge_ids
        .into_iter()
        .map(|id| ctx.reader.get_line(id).ok_or(()))
        .collect::<Result<_, _>>()?;

    Ok(Route::new(from.clone(), interior, to.clone()))
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::geo::Geographic;
    use crate::map::tests_support::{TestLine, TestMap, TestNode};
    use crate::model::{Coordinate, Fow, LineAttributes, PathAttributes};
    use crate::observer::NoopObserver;

    fn straight_map() -> TestMap {
        let coords = [
            Coordinate::new(13.400, 52.520),
            Coordinate::new(13.410, 52.520),
            Coordinate::new(13.420, 52.520),
        ];
        let mut map = TestMap::default();
        for id in 0..coords.len() as u32 {
            map.nodes.push(TestNode { id, coordinate: coords[id as usize], outgoing: vec![], incoming: vec![] });
        }
        for id in 0..(coords.len() - 1) as u32 {
            let (start, end) = (id, id + 1);
            let length = Geographic.distance(coords[start as usize], coords[end as usize]);
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
                bear: crate::model::Bearing::from_degrees(bear_degrees),
            },
            path: path.map(|(lfrcnp, dnp)| PathAttributes { lfrcnp, dnp: Length::from_meters(dnp) }),
        }
    }

    #[test]
    fn match_path_matches_a_two_point_straight_reference() {
        let map = straight_map();
        let config = DecoderConfig::default();
        let observer = NoopObserver;
        let ctx = MatchContext::new(&map, &Geographic, &config, &observer);

        let points = vec![
            lrp(Coordinate::new(13.400, 52.520), 90.0, Some((Frc::Frc7, 2226.0))),
            lrp(Coordinate::new(13.420, 52.520), 90.0, None),
        ];

        let routes = match_path(&ctx, &points).unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].edges().len(), 2);
    }

    #[test]
    fn match_path_fails_no_match_when_dnp_window_is_too_tight() {
        let map = straight_map();
        let config = DecoderConfig::default();
        let observer = NoopObserver;
        let ctx = MatchContext::new(&map, &Geographic, &config, &observer);

        let points = vec![
            lrp(Coordinate::new(13.400, 52.520), 90.0, Some((Frc::Frc7, 1.0))),
            lrp(Coordinate::new(13.420, 52.520), 90.0, None),
        ];

        let result = match_path(&ctx, &points);
        assert!(matches!(result, Err(DecodeError::NoMatch)));
    }

    #[test]
    fn match_path_times_out_immediately_with_zero_budget() {
        let map = straight_map();
        let mut config = DecoderConfig::default();
        config.timeout = Some(0.0);
        let observer = NoopObserver;
        let ctx = MatchContext::new(&map, &Geographic, &config, &observer);

        let points = vec![
            lrp(Coordinate::new(13.400, 52.520), 90.0, Some((Frc::Frc7, 2226.0))),
            lrp(Coordinate::new(13.420, 52.520), 90.0, None),
        ];

        let result = match_path(&ctx, &points);
        assert!(matches!(result, Err(DecodeError::Timeout)));
    }
}
