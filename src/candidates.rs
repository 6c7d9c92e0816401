//! Candidate generation: per-LRP projection onto nearby edges, the
//! junction-snap policy, bearing pre-filter, and score filter (spec.md §4.4).

use std::cell::RefCell;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::config::DecoderConfig;
use crate::geo::GeoKernel;
use crate::map::{Line, MapReader, Node};
use crate::model::{Bearing, Length, Point};
use crate::observer::{CandidateRejectReason, DecoderObserver};
use crate::route::{PointOnLine, project_onto_line};
use crate::scoring::{SubScores, angle_difference, score_bear, score_frc, score_fow, score_geo};

/// A candidate location for an LRP: a point on an edge plus its score.
/// Exists only during matcher execution (spec.md §3).
#[derive(Debug, Clone)]
pub struct Candidate<L> {
    pub point: PointOnLine<L>,
    pub score: f64,
}

/// Per-process memoization of [`is_valid_node`], keyed by node id
/// (`SPEC_FULL.md` §10, mirroring the original's
/// `functools.lru_cache(maxsize=1000)`). Owned by the matcher call site, not
/// global state.
#[derive(Debug, Default)]
pub struct NodeValidityCache<NodeId>(RefCell<FxHashMap<NodeId, bool>>);

impl<NodeId: Copy + Eq + std::hash::Hash> NodeValidityCache<NodeId> {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A node is *valid* unless its arity marks it as a mid-road continuation
/// artifact: exactly one outgoing and one incoming edge, or exactly two of
/// each with only three distinct adjacent endpoints in total (spec.md §4.4).
pub fn is_valid_node<M: MapReader>(
    reader: &M,
    node_id: M::NodeId,
    cache: &NodeValidityCache<M::NodeId>,
) -> bool {
    if let Some(&cached) = cache.0.borrow().get(&node_id) {
        return cached;
    }

    let valid = reader.get_node(node_id).is_none_or(|node| {
        let outgoing = node.outgoing_lines();
        let incoming = node.incoming_lines();

        let is_continuation = match (incoming.len(), outgoing.len()) {
            (1, 1) => true,
            (2, 2) => {
                let mut endpoints: Vec<M::NodeId> = Vec::with_capacity(4);
                for edge_id in incoming.iter().chain(outgoing.iter()) {
                    if let Some(edge) = reader.get_line(*edge_id) {
                        let other = if incoming.contains(edge_id) {
                            edge.start_node()
                        } else {
                            edge.end_node()
                        };
                        if !endpoints.contains(&other) {
                            endpoints.push(other);
                        }
                    }
                }
                endpoints.len() == 3
            }
            _ => false,
        };

        !is_continuation
    });

    cache.0.borrow_mut().insert(node_id, valid);
    valid
}

/// Measures a candidate's bearing over `bear_dist` meters on the outgoing
/// side of the point (non-terminal LRPs) or the incoming side reversed
/// (terminal LRPs). Zero when the geometry on that side is empty.
fn candidate_bearing<L: Line + Clone>(
    kernel: &dyn GeoKernel,
    point: &PointOnLine<L>,
    bear_dist: Length,
    terminal: bool,
) -> Bearing {
    let geometry = point.line.geometry();
    let here = point.position(kernel);

    if terminal {
        let from_distance = (point.distance_from_start() - bear_dist).max(Length::ZERO);
        let before = kernel.interpolate(geometry, from_distance);
        if before == here {
            return Bearing::default();
        }
        kernel.bearing(before, here)
    } else {
        let to_distance = (point.distance_from_start() + bear_dist).min(point.line.length());
        let after = kernel.interpolate(geometry, to_distance);
        if after == here {
            return Bearing::default();
        }
        kernel.bearing(here, after)
    }
}

/// Generates and scores every candidate for `lrp` among the edges
/// `reader.find_lines_close_to` reports within `config.search_radius`.
#[allow(clippy::too_many_arguments)]
pub fn find_candidates<M, O>(
    reader: &M,
    kernel: &dyn GeoKernel,
    config: &DecoderConfig,
    validity: &NodeValidityCache<M::NodeId>,
    lrp: &Point,
    terminal: bool,
    observer: &O,
) -> Vec<Candidate<M::Line>>
where
    M: MapReader,
    O: DecoderObserver<M>,
{
    debug!("Finding candidates for {lrp:?} (terminal={terminal})");

    let search_radius = Length::from_meters(config.search_radius);
    let threshold = Length::from_meters(config.candidate_threshold);
    let bear_dist = Length::from_meters(config.bear_dist);

    let mut candidates = Vec::new();

    for edge in reader.find_lines_close_to(lrp.coordinate, search_radius, None) {
        if edge.length() == Length::ZERO {
            continue;
        }

        let mut r = project_onto_line(kernel, edge.geometry(), lrp.coordinate);

        let to_start = Length::from_meters(edge.length().meters() * r);
        let to_end = edge.length() - to_start;

        if !terminal {
            if to_start <= threshold && is_valid_node(reader, edge.start_node(), validity) {
                r = 0.0;
            } else if to_end <= threshold && is_valid_node(reader, edge.end_node(), validity) {
                continue;
            }
        } else if to_end <= threshold && is_valid_node(reader, edge.end_node(), validity) {
            r = 1.0;
        } else if to_start <= threshold && is_valid_node(reader, edge.start_node(), validity) {
            continue;
        }

        if terminal && r <= 0.0 {
            continue;
        }
        if !terminal && r >= 1.0 {
            continue;
        }

        let point = PointOnLine::new(edge.clone(), r);

        let actual_bearing = candidate_bearing(kernel, &point, bear_dist, terminal);
        if angle_difference(lrp.line.bear, actual_bearing).abs() > config.max_bear_deviation {
            trace!("Discarding {:?}: bearing deviation too large", edge.id());
            observer.on_candidate_rejected(lrp, CandidateRejectReason::BearingDeviation);
            continue;
        }

        let distance = kernel.distance(lrp.coordinate, point.position(kernel));
        let sub_scores = SubScores {
            geo: score_geo(distance, search_radius),
            frc: score_frc(lrp.line.frc, edge.frc()),
            fow: score_fow(lrp.line.fow, edge.fow(), &config.fow_standin_score),
            bear: score_bear(lrp.line.bear, actual_bearing),
        };
        let score = sub_scores.weighted_sum(config);

        if score < config.min_score {
            trace!("Discarding {:?}: score {score} below minimum", edge.id());
            observer.on_candidate_rejected(lrp, CandidateRejectReason::ScoreBelowMinimum);
            continue;
        }

        trace!("Accepted candidate {:?} at offset {r} with score {score}", edge.id());
        observer.on_candidate_found(lrp, &point);
        candidates.push(Candidate { point, score });
    }

    candidates
}
