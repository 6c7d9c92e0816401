//! Decoder observer: a side-channel hook into matcher progress (spec.md §6).
//!
//! No observer method participates in routing decisions; every method
//! returns `()` and a default no-op body, so a caller only needs to
//! implement the hooks it cares about (`SPEC_FULL.md` §9.4).

use crate::map::{Line, MapReader};
use crate::model::Point;
use crate::route::{PointOnLine, Route};

/// Why a candidate was rejected during candidate generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateRejectReason {
    BearingDeviation,
    ScoreBelowMinimum,
}

/// Why a route attempt between two candidates failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteFailReason {
    PathNotFound,
    LengthOutOfWindow,
}

/// Why a pairing at a given recursion frame failed to match at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchFailReason {
    NoPairSucceeded,
}

/// Best-effort observer hooks called out of the matcher and candidate
/// generator. Implementations must not raise; all methods are infallible.
pub trait DecoderObserver<M: MapReader> {
    fn on_candidate_found(&self, _lrp: &Point, _candidate: &PointOnLine<M::Line>) {}

    fn on_candidate_rejected(&self, _lrp: &Point, _reason: CandidateRejectReason) {}

    fn on_route_success(
        &self,
        _current: &Point,
        _next: &Point,
        _from: &PointOnLine<M::Line>,
        _to: &PointOnLine<M::Line>,
        _route: &Route<M::Line>,
    ) {
    }

    fn on_route_fail(
        &self,
        _current: &Point,
        _next: &Point,
        _from: &PointOnLine<M::Line>,
        _to: &PointOnLine<M::Line>,
        _reason: RouteFailReason,
    ) {
    }

    fn on_matching_fail(
        &self,
        _current: &Point,
        _next: &Point,
        _from_candidates: &[PointOnLine<M::Line>],
        _to_candidates: &[PointOnLine<M::Line>],
        _reason: MatchFailReason,
    ) {
    }
}

/// An observer that does nothing; the default when the caller supplies none.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl<M: MapReader> DecoderObserver<M> for NoopObserver {}
