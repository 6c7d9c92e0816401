#![doc = include_str!("../README.md")]

pub mod assemble;
pub mod astar;
pub mod candidates;
pub mod config;
mod decode;
mod error;
pub mod geo;
pub mod map;
pub mod matcher;
pub mod model;
pub mod observer;
mod route;
pub mod scoring;

pub use assemble::{LineLocation, PointAlongLine, PoiWithAccessPoint};
pub use astar::{PathNotFound, astar};
pub use candidates::{Candidate, NodeValidityCache, find_candidates, is_valid_node};
pub use config::DecoderConfig;
pub use decode::{DecodeResult, decode};
pub use error::DecodeError;
pub use geo::{EqualArea, GeoKernel, Geographic};
pub use map::{Line, LineId, MapReader, Node, NodeId};
pub use matcher::{MatchContext, match_path};
pub use model::{
    Bearing, Coordinate, Fow, Frc, Length, LineAttributes, LineReference, LocationReference,
    MalformedReferenceError, Orientation, PathAttributes, Point, PoiWithAccessPointReference,
    PointAlongLineReference, RelativeOffsets, SideOfRoad,
};
pub use observer::{
    CandidateRejectReason, DecoderObserver, MatchFailReason, NoopObserver, RouteFailReason,
};
pub use route::{PointOnLine, Route, project_onto_line};
pub use scoring::{
    FowStandinMatrix, SubScores, angle_difference, score_bear, score_frc, score_fow, score_geo,
};
