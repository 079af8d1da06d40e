/// Geometric error conditions surfaced to the caller.
///
/// All of these indicate a problem with the input sites (or, for
/// [`GeometryError::ConcurrentLines`], a degeneracy hit on a code path that
/// assumed general position). They are fatal to the current call; the caller
/// is expected to clean its input and retry.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GeometryError {
    /// Two input segments cross in their interiors.
    CrossingSegments,
    /// A point site lies strictly inside a segment site.
    PointInSegment,
    /// Two lines assumed to intersect are parallel.
    ConcurrentLines,
    /// A parallel-bisector degeneracy reached a branch-resolution path that
    /// is deliberately left open. The payload names the path.
    NotImplemented(&'static str),
}

impl std::fmt::Display for GeometryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometryError::CrossingSegments => {
                write!(f, "two segment sites cross in their interiors")
            }
            GeometryError::PointInSegment => {
                write!(f, "a point site lies in the interior of a segment site")
            }
            GeometryError::ConcurrentLines => {
                write!(f, "lines are parallel where an intersection was required")
            }
            GeometryError::NotImplemented(what) => {
                write!(f, "parallel-bisector degeneracy not implemented: {what}")
            }
        }
    }
}

impl std::error::Error for GeometryError {}

pub type Result<T> = std::result::Result<T, GeometryError>;
