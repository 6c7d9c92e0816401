//! Map abstraction: the target road network as seen by the decoder.
//!
//! The decoder never owns a map; it borrows one through [`MapReader`], a
//! capability the caller supplies. The trait's methods are infallible by
//! contract (spec.md §4.2, §9.2 in `SPEC_FULL.md`): a reader backed by a
//! fallible store (a database, a file) is expected to pre-validate or panic,
//! not to propagate I/O errors through every lookup.

use std::fmt::Debug;
use std::hash::Hash;

use crate::model::{Coordinate, Fow, Frc, Length};

/// A stable node identifier. Any hashable, totally-equatable type qualifies.
pub trait NodeId: Debug + Copy + Eq + Hash {}
impl<T: Debug + Copy + Eq + Hash> NodeId for T {}

/// A stable, directed-edge identifier. May be composite (way id plus
/// direction plus node pair); only hashability and equality are required.
pub trait LineId: Debug + Copy + Eq + Hash {}
impl<T: Debug + Copy + Eq + Hash> LineId for T {}

/// A node in the target map: a stable identifier, a coordinate, and the
/// directed edges touching it.
pub trait Node {
    type Id: NodeId;
    type LineId: LineId;

    fn id(&self) -> Self::Id;
    fn coordinate(&self) -> Coordinate;

    /// Edges that start at this node.
    fn outgoing_lines(&self) -> Vec<Self::LineId>;

    /// Edges that end at this node.
    fn incoming_lines(&self) -> Vec<Self::LineId>;

    /// Union of outgoing and incoming edges.
    fn connected_lines(&self) -> Vec<Self::LineId> {
        let mut lines = self.outgoing_lines();
        lines.extend(self.incoming_lines());
        lines
    }
}

/// A directed edge in the target map.
///
/// An undirected roadway is modeled as two `Line`s, one per direction;
/// direction is always significant.
pub trait Line {
    type Id: LineId;
    type NodeId: NodeId;

    fn id(&self) -> Self::Id;
    fn start_node(&self) -> Self::NodeId;
    fn end_node(&self) -> Self::NodeId;

    /// Ordered polyline geometry, from `start_node` to `end_node`.
    fn geometry(&self) -> &[Coordinate];

    /// Length in meters, consistent with the active geo kernel's length of
    /// `geometry()`.
    fn length(&self) -> Length;

    fn frc(&self) -> Frc;
    fn fow(&self) -> Fow;
}

/// Read-only access to the target map: lookup by id plus spatial proximity
/// queries. Independent of any storage technology.
pub trait MapReader {
    type NodeId: NodeId;
    type LineId: LineId;
    type Node: Node<Id = Self::NodeId, LineId = Self::LineId> + Clone;
    type Line: Line<Id = Self::LineId, NodeId = Self::NodeId> + Clone;

    fn get_node(&self, id: Self::NodeId) -> Option<Self::Node>;
    fn get_line(&self, id: Self::LineId) -> Option<Self::Line>;

    fn get_nodes(&self) -> Vec<Self::Node>;
    fn get_lines(&self) -> Vec<Self::Line>;

    fn get_nodecount(&self) -> usize {
        self.get_nodes().len()
    }

    fn get_linecount(&self) -> usize {
        self.get_lines().len()
    }

    /// Every node whose coordinate lies within `radius_m` meters of `coord`.
    /// Order is unspecified; a reader may return extra items at its
    /// discretion but must not omit any in-radius node.
    fn find_nodes_close_to(&self, coord: Coordinate, radius_m: Length) -> Vec<Self::Node>;

    /// Every edge whose geometry lies within `radius_m` meters of `coord`,
    /// optionally narrowed by `filter`. Order is unspecified.
    fn find_lines_close_to(
        &self,
        coord: Coordinate,
        radius_m: Length,
        filter: Option<&dyn Fn(&Self::Line) -> bool>,
    ) -> Vec<Self::Line>;
}
