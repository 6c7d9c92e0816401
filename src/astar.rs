//! A* shortest path over the directed line graph (spec.md §4.3).
//!
//! Mirrors the priority-queue structure of a Dijkstra search (the "HOW" the
//! teacher crate's own `decoder/shortest_path.rs` uses: a manual
//! `BinaryHeap` keyed by a custom `Ord`), generalized with a geographic
//! heuristic, a pluggable edge filter, and a maximum-length cutoff.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::geo::GeoKernel;
use crate::map::{Line, MapReader, Node};
use crate::model::Length;

/// A* failed to find a path within the length cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathNotFound;

/// Priority-queue item: ordered primarily by ascending `f = g + h`, then by
/// descending `g`, so that among equal-`f` items the one carrying more
/// traveled distance (more information) is expanded first.
struct HeapItem<N> {
    f: Length,
    g: Length,
    node: N,
}

impl<N> HeapItem<N> {
    fn key(&self) -> (Reverse<OrderedFloat<f64>>, OrderedFloat<f64>) {
        (Reverse(OrderedFloat(self.f.meters())), OrderedFloat(self.g.meters()))
    }
}

impl<N> PartialEq for HeapItem<N> {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}
impl<N> Eq for HeapItem<N> {}

impl<N> PartialOrd for HeapItem<N> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<N> Ord for HeapItem<N> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key().cmp(&other.key())
    }
}

/// Finds a minimum-length path from `start` to `end` in the directed line
/// graph exposed by `reader`.
///
/// `keep` is the edge predicate (spec.md §4.3 "Filter"): edges for which it
/// returns `false` are not expanded, enforcing e.g. the LFRCNP constraint.
/// `maxlen` prunes any expansion whose `f` would exceed it. Returns the
/// ordered edge list reconstructed by walking back-links; an empty list when
/// `start == end`.
pub fn astar<M, F>(
    reader: &M,
    kernel: &dyn GeoKernel,
    start: M::NodeId,
    end: M::NodeId,
    keep: F,
    maxlen: Length,
) -> Result<Vec<M::LineId>, PathNotFound>
where
    M: MapReader,
    F: Fn(&M::Line) -> bool,
{
    debug!("Computing shortest path {start:?} -> {end:?} (maxlen={maxlen:?})");

    if start == end {
        return Ok(Vec::new());
    }

    let Some(end_node) = reader.get_node(end) else {
        return Err(PathNotFound);
    };
    let end_coord = end_node.coordinate();

    let heuristic = |node: &M::Node| kernel.distance(node.coordinate(), end_coord);

    let Some(start_node) = reader.get_node(start) else {
        return Err(PathNotFound);
    };

    let mut open = BinaryHeap::new();
    let mut best_g: FxHashMap<M::NodeId, Length> = FxHashMap::default();
    let mut came_from: FxHashMap<M::NodeId, (M::NodeId, M::LineId)> = FxHashMap::default();
    let mut closed: FxHashSet<M::NodeId> = FxHashSet::default();

    best_g.insert(start, Length::ZERO);
    open.push(HeapItem {
        f: heuristic(&start_node),
        g: Length::ZERO,
        node: start,
    });

    while let Some(current) = open.pop() {
        if current.node == end {
            return Ok(reconstruct_path(&came_from, start, end));
        }
        if !closed.insert(current.node) {
            continue;
        }

        let Some(node) = reader.get_node(current.node) else {
            continue;
        };

        for edge_id in node.outgoing_lines() {
            let Some(edge) = reader.get_line(edge_id) else {
                continue;
            };
            if !keep(&edge) {
                continue;
            }

            let neighbor = edge.end_node();
            let tentative_g = current.g + edge.length();
            if tentative_g > maxlen {
                continue;
            }
            if closed.contains(&neighbor) {
                continue;
            }
            if best_g.get(&neighbor).is_some_and(|&g| g <= tentative_g) {
                continue;
            }

            let Some(neighbor_node) = reader.get_node(neighbor) else {
                continue;
            };
            let f = tentative_g + heuristic(&neighbor_node);
            if f > maxlen {
                continue;
            }

            best_g.insert(neighbor, tentative_g);
            came_from.insert(neighbor, (current.node, edge_id));
            open.push(HeapItem {
                f,
                g: tentative_g,
                node: neighbor,
            });
        }
    }

    Err(PathNotFound)
}

fn reconstruct_path<N: Copy + Eq + std::hash::Hash, E: Copy>(
    came_from: &FxHashMap<N, (N, E)>,
    start: N,
    end: N,
) -> Vec<E> {
    let mut edges = Vec::new();
    let mut node = end;
    while node != start {
        let Some(&(prev, edge)) = came_from.get(&node) else {
            break;
        };
        edges.push(edge);
        node = prev;
    }
    edges.reverse();
    edges
}
