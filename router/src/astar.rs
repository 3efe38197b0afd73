use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use routegrid_common::geom::Coordinate;
use routegrid_common::model::{Grid, NetKey};

/// A* frontier entry. `Ord` is reversed so `BinaryHeap` (a max-heap)
/// pops the lowest `f = g + h` first, mirroring the teacher's `State`
/// pattern in `router/src/algo/astar.rs`.
#[derive(Clone, Copy, Eq, PartialEq)]
struct AstarState {
    f: u32,
    g: u32,
    coord: Coordinate,
}

impl Ord for AstarState {
    fn cmp(&self, other: &Self) -> Ordering {
        other.f.cmp(&self.f).then_with(|| other.g.cmp(&self.g))
    }
}

impl PartialOrd for AstarState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

const INTERSECTION_PENALTY: u32 = 300;

fn heuristic(c: Coordinate, goal: Coordinate) -> u32 {
    c.manhattan(&goal)
}

/// A coordinate is illegal for a net `(start, goal)` if it sits above a
/// *foreign* gate's (x, y) at or below the detour-buffer layer — i.e.
/// routing isn't allowed to block another gate's access shaft.
fn blocked_by_foreign_gate(grid: &Grid, c: Coordinate, start: Coordinate, goal: Coordinate) -> bool {
    if c.z > 2 {
        return false;
    }
    match grid.gate_uid_at_xy(c.x, c.y) {
        Some(_) => {
            let gate_xy = Coordinate::new(c.x, c.y, 0);
            gate_xy != Coordinate::new(start.x, start.y, 0) && gate_xy != Coordinate::new(goal.x, goal.y, 0)
        }
        None => false,
    }
}

fn neighbors(grid: &Grid, c: Coordinate) -> Vec<Coordinate> {
    let (max_x, max_y, max_z) = grid.size;
    let mut out = Vec::with_capacity(6);
    let axes: [(u32, i64); 3] = [(c.x, max_x as i64), (c.y, max_y as i64), (c.z, max_z as i64)];
    for axis in 0..3 {
        let (value, max) = axes[axis];
        let directions: &[i64] = if value == 0 {
            &[1]
        } else if value as i64 == max {
            &[-1]
        } else {
            &[-1, 1]
        };
        for &d in directions {
            let mut v = [c.x as i64, c.y as i64, c.z as i64];
            v[axis] += d;
            out.push(Coordinate::new(v[0] as u32, v[1] as u32, v[2] as u32));
        }
    }
    out
}

/// Finds a shortest path from `start` to `goal` on `grid`, charging
/// `INTERSECTION_PENALTY` for stepping onto a coordinate another net
/// already occupies (gate coordinates excepted). Returns `None` if no
/// path exists without crossing a foreign gate or reusing an occupied
/// segment that would self-intersect.
pub fn find_path(grid: &Grid, start: Coordinate, goal: Coordinate) -> Option<Vec<Coordinate>> {
    let mut open = BinaryHeap::new();
    let mut g_score: HashMap<Coordinate, u32> = HashMap::new();
    let mut parents: HashMap<Coordinate, Coordinate> = HashMap::new();
    let mut visited: HashSet<Coordinate> = HashSet::new();
    let mut in_queue: HashSet<Coordinate> = HashSet::new();

    g_score.insert(start, 0);
    open.push(AstarState {
        f: heuristic(start, goal),
        g: 0,
        coord: start,
    });
    in_queue.insert(start);

    while let Some(AstarState { g, coord, .. }) = open.pop() {
        in_queue.remove(&coord);
        if visited.contains(&coord) {
            continue;
        }
        visited.insert(coord);

        if coord == goal {
            return Some(reconstruct(&parents, start, goal));
        }

        for next in neighbors(grid, coord) {
            if !grid.is_within_bounds(next) || visited.contains(&next) || in_queue.contains(&next) {
                continue;
            }
            if blocked_by_foreign_gate(grid, next, start, goal) {
                continue;
            }

            let segment = grid.make_segment(coord, next);
            if grid.is_segment_occupied(&segment) {
                continue;
            }

            let mut step_cost = g + 1;
            if !grid.is_gate_coordinate(next) && grid.is_coordinate_used(next) {
                step_cost += INTERSECTION_PENALTY;
            }

            let better = g_score.get(&next).map(|&known| step_cost < known).unwrap_or(true);
            if better {
                g_score.insert(next, step_cost);
                parents.insert(next, coord);
                open.push(AstarState {
                    f: step_cost + heuristic(next, goal),
                    g: step_cost,
                    coord: next,
                });
                in_queue.insert(next);
            }
        }
    }
    None
}

fn reconstruct(parents: &HashMap<Coordinate, Coordinate>, start: Coordinate, goal: Coordinate) -> Vec<Coordinate> {
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        current = parents[&current];
        path.push(current);
    }
    path.reverse();
    path
}

/// Runs A* over every net in `order`, committing each routed path to
/// `grid` as it's found so later nets see earlier occupancy. Nets that
/// can't be routed are skipped and counted, never surfaced as errors
/// (per the error-handling design: unroutable nets are an absorbed
/// outcome, not a fatal condition).
pub fn route_all(grid: &mut Grid, order: &[NetKey]) -> usize {
    let mut unrouted = 0;
    let total = order.len();
    for (i, &key) in order.iter().enumerate() {
        let (start, end) = {
            let net = &grid.nets[&key];
            (net.start, net.end)
        };
        match find_path(grid, start, end) {
            Some(path) => {
                if grid.commit_path(key, path).is_err() {
                    unrouted += 1;
                } else {
                    log::info!("routed net {key:?} ({}/{total})", i + 1);
                }
            }
            None => {
                unrouted += 1;
                log::warn!("net {key:?} could not be routed");
            }
        }
    }
    unrouted
}

#[cfg(test)]
mod tests {
    use super::*;
    use routegrid_common::model::Gate;

    #[test]
    fn finds_a_straight_line_path() {
        let grid = Grid::new(4, 4, 2).unwrap();
        let path = find_path(&grid, Coordinate::new(0, 0, 0), Coordinate::new(2, 0, 0)).unwrap();
        assert_eq!(path.first().copied(), Some(Coordinate::new(0, 0, 0)));
        assert_eq!(path.last().copied(), Some(Coordinate::new(2, 0, 0)));
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn detours_around_an_occupied_segment() {
        let mut grid = Grid::new(4, 4, 2).unwrap();
        let blocker = grid.make_segment(Coordinate::new(1, 0, 0), Coordinate::new(2, 0, 0));
        grid.occupy(blocker, (99, 98)).unwrap();
        let path = find_path(&grid, Coordinate::new(0, 0, 0), Coordinate::new(2, 0, 0)).unwrap();
        for window in path.windows(2) {
            let segment = grid.make_segment(window[0], window[1]);
            assert_ne!(segment, blocker);
        }
    }

    #[test]
    fn route_all_commits_paths_and_counts_failures() {
        let mut grid = Grid::new(4, 4, 2).unwrap();
        grid.add_gate(Gate::new(1, 0, 0)).unwrap();
        grid.add_gate(Gate::new(2, 2, 0)).unwrap();
        grid.add_net(1, 2).unwrap();
        let order = vec![(1, 2)];
        let unrouted = route_all(&mut grid, &order);
        assert_eq!(unrouted, 0);
        assert!(grid.nets[&(1, 2)].is_routed());
    }
}
