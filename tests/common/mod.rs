//! A small synthetic in-memory `MapReader` shared by the integration tests.
//!
//! Not the production-grade spatial-index-backed reader a real embedder
//! would supply (that implementation is out of this crate's scope, see
//! `spec.md` §1) — just enough graph to exercise `decode()` end to end.

use openlr_dereferencer::{
    Bearing, Coordinate, Fow, Frc, GeoKernel, Geographic, Length, Line, LineAttributes, Node,
    PathAttributes, Point,
};

#[derive(Debug, Clone, PartialEq)]
pub struct TestNode {
    pub id: u32,
    pub coordinate: Coordinate,
    pub outgoing: Vec<u32>,
    pub incoming: Vec<u32>,
}

impl Node for TestNode {
    type Id = u32;
    type LineId = u32;

    fn id(&self) -> u32 {
        self.id
    }
    fn coordinate(&self) -> Coordinate {
        self.coordinate
    }
    fn outgoing_lines(&self) -> Vec<u32> {
        self.outgoing.clone()
    }
    fn incoming_lines(&self) -> Vec<u32> {
        self.incoming.clone()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestLine {
    pub id: u32,
    pub start: u32,
    pub end: u32,
    pub geometry: Vec<Coordinate>,
    pub length: Length,
    pub frc: Frc,
    pub fow: Fow,
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
        self.frc
    }
    fn fow(&self) -> Fow {
        self.fow
    }
}

#[derive(Debug, Clone, Default)]
pub struct TestMap {
    pub nodes: Vec<TestNode>,
    pub lines: Vec<TestLine>,
}

impl openlr_dereferencer::MapReader for TestMap {
    type NodeId = u32;
    type LineId = u32;
    type Node = TestNode;
    type Line = TestLine;

    fn get_node(&self, id: u32) -> Option<TestNode> {
        self.nodes.iter().find(|n| n.id == id).cloned()
    }
    fn get_line(&self, id: u32) -> Option<TestLine> {
        self.lines.iter().find(|l| l.id == id).cloned()
    }
    fn get_nodes(&self) -> Vec<TestNode> {
        self.nodes.clone()
    }
    fn get_lines(&self) -> Vec<TestLine> {
        self.lines.clone()
    }
    fn find_nodes_close_to(&self, coord: Coordinate, radius_m: Length) -> Vec<TestNode> {
        self.nodes
            .iter()
            .filter(|n| Geographic.distance(n.coordinate, coord) <= radius_m)
            .cloned()
            .collect()
    }
    fn find_lines_close_to(
        &self,
        coord: Coordinate,
        radius_m: Length,
        filter: Option<&dyn Fn(&TestLine) -> bool>,
    ) -> Vec<TestLine> {
        self.lines
            .iter()
            .filter(|l| filter.is_none_or(|f| f(l)))
            .filter(|l| {
                let r = openlr_dereferencer::project_onto_line(&Geographic, &l.geometry, coord);
                let projected =
                    Geographic.interpolate(&l.geometry, Length::from_meters(l.length.meters() * r));
                Geographic.distance(projected, coord) <= radius_m
            })
            .cloned()
            .collect()
    }
}

/// Builds a straight chain of `coords.len() - 1` edges, node `i` to node
/// `i + 1`, each a [`Frc::Frc3`]/[`Fow::SingleCarriageway`] single-segment
/// line.
pub fn chain_map(coords: &[Coordinate]) -> TestMap {
    let mut map = TestMap::default();
    for (id, &coordinate) in coords.iter().enumerate() {
        map.nodes.push(TestNode {
            id: id as u32,
            coordinate,
            outgoing: vec![],
            incoming: vec![],
        });
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

/// An LRP with the given coordinate, bearing (degrees), and optional
/// `(lfrcnp, dnp_meters)` path attributes (`None` marks the terminal point).
pub fn lrp(coord: Coordinate, bear_degrees: f64, path: Option<(Frc, f64)>) -> Point {
    Point {
        coordinate: coord,
        line: LineAttributes {
            frc: Frc::Frc3,
            fow: Fow::SingleCarriageway,
            bear: Bearing::from_degrees(bear_degrees),
        },
        path: path.map(|(lfrcnp, dnp)| PathAttributes {
            lfrcnp,
            dnp: Length::from_meters(dnp),
        }),
    }
}
