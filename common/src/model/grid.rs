use std::collections::{HashMap, HashSet};

use crate::error::RouteError;
use crate::geom::Coordinate;
use crate::model::gate::Gate;
use crate::model::net::{Net, NetKey};
use crate::model::segment::Segment;

/// Bounded 3D routing surface. Owns the gate set, the per-net path map,
/// the segment-occupancy map, and the intersection counter the cost
/// function is derived from.
///
/// Occupancy is tracked per-coordinate as a count of distinct nets
/// touching it (`occupancy: Coordinate -> NetKey -> segment count`)
/// rather than by copying the grid on every tentative rewrite; `occupy`
/// and `release` keep `intersections` correct incrementally, and
/// `recount_intersections`/`update` rebuild it from scratch as a
/// self-heal path.
#[derive(Clone, Debug)]
pub struct Grid {
    pub size: (u32, u32, u32),
    pub gates: HashMap<u32, Gate>,
    pub gate_coordinates: HashSet<Coordinate>,
    gate_by_xy: HashMap<(u32, u32), u32>,
    pub nets: HashMap<NetKey, Net>,
    pub wire_segments: HashMap<Segment, NetKey>,
    occupancy: HashMap<Coordinate, HashMap<NetKey, u32>>,
    pub intersections: u32,
}

impl Grid {
    pub fn new(x: u32, y: u32, z: u32) -> Result<Self, RouteError> {
        if z < 2 {
            return Err(RouteError::ConfigInvalid(format!(
                "grid z-extent must be >= 2 to allow detour layers, got {z}"
            )));
        }
        Ok(Self {
            size: (x, y, z),
            gates: HashMap::new(),
            gate_coordinates: HashSet::new(),
            gate_by_xy: HashMap::new(),
            nets: HashMap::new(),
            wire_segments: HashMap::new(),
            occupancy: HashMap::new(),
            intersections: 0,
        })
    }

    pub fn add_gate(&mut self, gate: Gate) -> Result<(), RouteError> {
        if self.gates.contains_key(&gate.uid) {
            return Err(RouteError::InputMalformed(format!(
                "duplicate gate id {}",
                gate.uid
            )));
        }
        self.gate_coordinates.insert(gate.coord);
        self.gate_by_xy.insert((gate.coord.x, gate.coord.y), gate.uid);
        self.gates.insert(gate.uid, gate);
        Ok(())
    }

    pub fn add_net(&mut self, start_uid: u32, end_uid: u32) -> Result<(), RouteError> {
        let start = self
            .gates
            .get(&start_uid)
            .ok_or_else(|| RouteError::InputMalformed(format!("unknown gate id {start_uid}")))?
            .coord;
        let end = self
            .gates
            .get(&end_uid)
            .ok_or_else(|| RouteError::InputMalformed(format!("unknown gate id {end_uid}")))?
            .coord;
        let key = (start_uid, end_uid);
        self.nets.insert(key, Net::new(key, start, end));
        Ok(())
    }

    pub fn is_within_bounds(&self, c: Coordinate) -> bool {
        c.x <= self.size.0 && c.y <= self.size.1 && c.z <= self.size.2
    }

    /// Gate at `(x, y)` on layer 0, if any, other than the one at `uid`.
    pub fn gate_uid_at_xy(&self, x: u32, y: u32) -> Option<u32> {
        self.gate_by_xy.get(&(x, y)).copied()
    }

    pub fn is_gate_coordinate(&self, c: Coordinate) -> bool {
        self.gate_coordinates.contains(&c)
    }

    /// Number of distinct nets currently touching `c`.
    pub fn occupants(&self, c: Coordinate) -> usize {
        self.occupancy.get(&c).map(HashMap::len).unwrap_or(0)
    }

    pub fn is_coordinate_used(&self, c: Coordinate) -> bool {
        self.occupancy.contains_key(&c)
    }

    pub fn make_segment(&self, a: Coordinate, b: Coordinate) -> Segment {
        Segment::new(a, b)
    }

    pub fn is_segment_occupied(&self, segment: &Segment) -> bool {
        self.wire_segments.contains_key(segment)
    }

    /// Inserts `segment` for `net_key`. Fails (fatal, per the error
    /// handling design) if the segment is already occupied — callers
    /// are expected to have already checked `is_segment_occupied`.
    pub fn occupy(&mut self, segment: Segment, net_key: NetKey) -> Result<(), RouteError> {
        if self.wire_segments.contains_key(&segment) {
            return Err(RouteError::InvariantViolation(format!(
                "attempt to occupy already-occupied segment {segment:?}"
            )));
        }
        self.wire_segments.insert(segment, net_key);
        for coord in segment.endpoints() {
            let owners = self.occupancy.entry(coord).or_default();
            let was_multi = owners.len() >= 2;
            *owners.entry(net_key).or_insert(0) += 1;
            let is_multi = owners.len() >= 2;
            if !self.gate_coordinates.contains(&coord) && !was_multi && is_multi {
                self.intersections += 1;
            }
        }
        Ok(())
    }

    /// Removes `segment` from occupancy. No-op if it wasn't occupied.
    pub fn release(&mut self, segment: Segment) {
        let Some(net_key) = self.wire_segments.remove(&segment) else {
            return;
        };
        for coord in segment.endpoints() {
            let Some(owners) = self.occupancy.get_mut(&coord) else {
                continue;
            };
            let was_multi = owners.len() >= 2;
            if let Some(count) = owners.get_mut(&net_key) {
                *count -= 1;
                if *count == 0 {
                    owners.remove(&net_key);
                }
            }
            let is_multi = owners.len() >= 2;
            if !self.gate_coordinates.contains(&coord) && was_multi && !is_multi {
                self.intersections -= 1;
            }
            if owners.is_empty() {
                self.occupancy.remove(&coord);
            }
        }
    }

    pub fn compute_cost(&self) -> u64 {
        self.wire_segments.len() as u64 + 300 * self.intersections as u64
    }

    /// Recomputes `intersections` from scratch by walking every net's
    /// current path, ignoring `wire_segments` entirely. Used to self-heal
    /// after bulk mutation of `Net::path` outside `occupy`/`release`.
    pub fn recount_intersections(&mut self) {
        let mut touch_counts: HashMap<Coordinate, u32> = HashMap::new();
        for net in self.nets.values() {
            let mut seen_this_net: HashSet<Coordinate> = HashSet::new();
            for &coord in &net.path {
                if self.gate_coordinates.contains(&coord) {
                    continue;
                }
                if seen_this_net.insert(coord) {
                    *touch_counts.entry(coord).or_insert(0) += 1;
                }
            }
        }
        self.intersections = touch_counts.values().filter(|&&n| n >= 2).count() as u32;
    }

    /// Rebuilds `wire_segments` and occupancy from the current set of
    /// net paths. Returns an invariant violation if two nets' paths
    /// claim the same segment — that should never happen under the
    /// occupy/release discipline the optimizers follow.
    pub fn update(&mut self) -> Result<(), RouteError> {
        self.wire_segments.clear();
        self.occupancy.clear();
        self.intersections = 0;
        let keys: Vec<NetKey> = self.nets.keys().copied().collect();
        for key in keys {
            let path = self.nets[&key].path.clone();
            for window in path.windows(2) {
                let segment = self.make_segment(window[0], window[1]);
                self.occupy(segment, key)?;
            }
        }
        Ok(())
    }

    /// Occupies every segment of `path` for `net_key` and installs it
    /// as the net's current path. All-or-nothing in the sense that the
    /// caller is expected to have released any prior path first; if a
    /// segment is already taken this returns an error without undoing
    /// the segments already occupied in this call (a bug in the caller,
    /// not a recoverable condition).
    pub fn commit_path(&mut self, net_key: NetKey, path: Vec<Coordinate>) -> Result<(), RouteError> {
        for window in path.windows(2) {
            let segment = self.make_segment(window[0], window[1]);
            self.occupy(segment, net_key)?;
        }
        let net = self
            .nets
            .get_mut(&net_key)
            .ok_or_else(|| RouteError::InvariantViolation(format!("unknown net {net_key:?}")))?;
        net.current_length = Some(path.len().saturating_sub(1) as u32);
        net.path = path;
        Ok(())
    }

    /// Releases the current path's segments and clears it.
    pub fn release_path(&mut self, net_key: NetKey) {
        let Some(net) = self.nets.get(&net_key) else {
            return;
        };
        let path = net.path.clone();
        for window in path.windows(2) {
            let segment = self.make_segment(window[0], window[1]);
            self.release(segment);
        }
        if let Some(net) = self.nets.get_mut(&net_key) {
            net.path.clear();
            net.current_length = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: u32, y: u32, z: u32) -> Coordinate {
        Coordinate::new(x, y, z)
    }

    #[test]
    fn segment_canonicalization_is_order_independent() {
        let grid = Grid::new(4, 4, 2).unwrap();
        let a = c(0, 0, 0);
        let b = c(1, 0, 0);
        assert_eq!(grid.make_segment(a, b), grid.make_segment(b, a));
    }

    #[test]
    fn occupy_rejects_duplicate_segment() {
        let mut grid = Grid::new(4, 4, 2).unwrap();
        let seg = grid.make_segment(c(0, 0, 0), c(1, 0, 0));
        grid.occupy(seg, (1, 2)).unwrap();
        assert!(grid.occupy(seg, (3, 4)).is_err());
    }

    #[test]
    fn intersection_counted_once_regardless_of_multiplicity() {
        let mut grid = Grid::new(4, 4, 2).unwrap();
        // Net (1,2)'s path passes through (1,1,0) via two segments.
        grid.occupy(grid.make_segment(c(1, 0, 0), c(1, 1, 0)), (1, 2))
            .unwrap();
        grid.occupy(grid.make_segment(c(1, 1, 0), c(1, 2, 0)), (1, 2))
            .unwrap();
        assert_eq!(grid.intersections, 0);
        // Net (3,4) crosses the same non-gate coordinate once.
        grid.occupy(grid.make_segment(c(0, 1, 0), c(1, 1, 0)), (3, 4))
            .unwrap();
        assert_eq!(grid.intersections, 1);
    }

    #[test]
    fn release_drops_intersection_when_second_owner_leaves() {
        let mut grid = Grid::new(4, 4, 2).unwrap();
        let s1 = grid.make_segment(c(1, 0, 0), c(1, 1, 0));
        let s2 = grid.make_segment(c(0, 1, 0), c(1, 1, 0));
        grid.occupy(s1, (1, 2)).unwrap();
        grid.occupy(s2, (3, 4)).unwrap();
        assert_eq!(grid.intersections, 1);
        grid.release(s2);
        assert_eq!(grid.intersections, 0);
    }

    #[test]
    fn gate_coordinates_never_count_as_intersections() {
        let mut grid = Grid::new(4, 4, 2).unwrap();
        grid.add_gate(Gate::new(1, 1, 1)).unwrap();
        let s1 = grid.make_segment(c(0, 1, 0), c(1, 1, 0));
        let s2 = grid.make_segment(c(1, 1, 0), c(2, 1, 0));
        grid.occupy(s1, (1, 2)).unwrap();
        grid.occupy(s2, (3, 4)).unwrap();
        assert_eq!(grid.intersections, 0);
    }

    #[test]
    fn cost_matches_definition() {
        let mut grid = Grid::new(4, 4, 2).unwrap();
        grid.occupy(grid.make_segment(c(0, 0, 0), c(1, 0, 0)), (1, 2))
            .unwrap();
        grid.occupy(grid.make_segment(c(1, 0, 0), c(1, 1, 0)), (1, 2))
            .unwrap();
        grid.occupy(grid.make_segment(c(0, 1, 0), c(1, 1, 0)), (3, 4))
            .unwrap();
        assert_eq!(grid.compute_cost(), 3 + 300);
    }

    #[test]
    fn commit_then_release_path_frees_all_segments() {
        let mut grid = Grid::new(4, 4, 2).unwrap();
        grid.add_gate(Gate::new(1, 0, 0)).unwrap();
        grid.add_gate(Gate::new(2, 2, 0)).unwrap();
        grid.add_net(1, 2).unwrap();
        let path = vec![c(0, 0, 0), c(1, 0, 0), c(2, 0, 0)];
        grid.commit_path((1, 2), path).unwrap();
        assert_eq!(grid.wire_segments.len(), 2);
        grid.release_path((1, 2));
        assert!(grid.wire_segments.is_empty());
        assert!(grid.nets[&(1, 2)].path.is_empty());
    }
}
