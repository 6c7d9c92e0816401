//! The decoder's single error taxonomy (spec.md §7).

use thiserror::Error;

/// Every way [`crate::decode`] can fail.
///
/// `PathNotFound` never reaches a caller: it is recovered locally by the
/// matcher, which tries the next candidate pair instead. Observer
/// notifications accompany, but never replace, these errors.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// The location reference's variant is not one this decoder handles.
    #[error("unsupported location reference kind")]
    UnsupportedReferenceKind,

    /// No candidate survived generation for the first LRP.
    #[error("no candidates found for the first location reference point")]
    NoFirstCandidates,

    /// No candidate survived generation for the terminal LRP.
    #[error("no candidates found for the last location reference point")]
    NoLastCandidates,

    /// Every candidate pair was exhausted, including via backtracking,
    /// without an acceptable route.
    #[error("no matching path found between the location reference points")]
    NoMatch,

    /// A* failed for a specific candidate pair; recovered locally.
    #[error("no path found between two candidate points")]
    PathNotFound,

    /// A requested offset consumes more than the entire matched path.
    #[error("the requested offset exceeds the matched path length")]
    OffsetExceedsPath,

    /// The configured wall-clock decode budget was exceeded.
    #[error("decode timed out")]
    Timeout,
}
