use crate::geom::Coordinate;

/// An unordered pair of adjacent coordinates, canonicalized so that
/// `(a,b)` and `(b,a)` hash identically — ordered by the endpoints'
/// Euclidean magnitude, smaller first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Segment {
    pub a: Coordinate,
    pub b: Coordinate,
}

impl Segment {
    /// Builds the canonical form of the segment between two adjacent
    /// coordinates. Does not itself check adjacency; callers that need
    /// the invariant enforced should go through `Grid::make_segment`.
    pub fn new(p: Coordinate, q: Coordinate) -> Self {
        if p.cmp_by_magnitude(&q) == std::cmp::Ordering::Greater {
            Self { a: q, b: p }
        } else {
            Self { a: p, b: q }
        }
    }

    pub fn endpoints(&self) -> [Coordinate; 2] {
        [self.a, self.b]
    }
}
