use crate::geom::Coordinate;

/// Identifies a net by the uids of the two gates it connects, in the
/// order the netlist listed them. Not canonicalized: the original
/// netlists never list both `(a,b)` and `(b,a)` for the same pair, so
/// there is nothing to collide on (see DESIGN.md).
pub type NetKey = (u32, u32);

/// An unordered pair of gates requiring a wire path between them.
#[derive(Clone, Debug)]
pub struct Net {
    pub key: NetKey,
    pub start: Coordinate,
    pub end: Coordinate,
    pub minimal_length: u32,
    pub current_length: Option<u32>,
    pub path: Vec<Coordinate>,
    pub exp_intersections: u32,
}

impl Net {
    pub fn new(key: NetKey, start: Coordinate, end: Coordinate) -> Self {
        Self {
            key,
            start,
            end,
            minimal_length: start.manhattan(&end),
            current_length: None,
            path: Vec::new(),
            exp_intersections: 0,
        }
    }

    pub fn is_routed(&self) -> bool {
        !self.path.is_empty()
    }
}
