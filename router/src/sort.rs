use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;
use routegrid_common::model::{Grid, NetKey};

/// The net orderings a run can be configured with. `None` is the
/// implicit "leave nets in whatever order the map iterates" option —
/// there is no sixth named algorithm in the original source beyond the
/// five below (see DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SorterKind {
    None,
    Length,
    Random,
    MiddleFirst,
    Gate,
    ExpIntersections,
}

impl SorterKind {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "none" => Some(Self::None),
            "sort_length" => Some(Self::Length),
            "random_sort" => Some(Self::Random),
            "sort_middle_first" => Some(Self::MiddleFirst),
            "sort_gate" => Some(Self::Gate),
            "sort_exp_intersections" => Some(Self::ExpIntersections),
            _ => None,
        }
    }
}

pub fn sort(kind: SorterKind, grid: &mut Grid, descending: bool, rng: &mut impl Rng) -> Vec<NetKey> {
    match kind {
        SorterKind::None => grid.nets.keys().copied().collect(),
        SorterKind::Length => sort_length(grid, descending),
        SorterKind::Random => random_sort(grid, rng),
        SorterKind::MiddleFirst => sort_middle_first(grid, descending),
        SorterKind::Gate => sort_gate(grid, descending),
        SorterKind::ExpIntersections => sort_exp_intersections(grid, descending),
    }
}

/// Ascending by Manhattan distance between the two gates; `descending`
/// reverses the order.
pub fn sort_length(grid: &Grid, descending: bool) -> Vec<NetKey> {
    let mut keys: Vec<NetKey> = grid.nets.keys().copied().collect();
    keys.sort_by_key(|k| grid.nets[k].minimal_length);
    if descending {
        keys.reverse();
    }
    keys
}

pub fn random_sort(grid: &Grid, rng: &mut impl Rng) -> Vec<NetKey> {
    let mut keys: Vec<NetKey> = grid.nets.keys().copied().collect();
    keys.shuffle(rng);
    keys
}

/// Orders nets by the combined Manhattan distance of both endpoints
/// from the grid's (x,y) center. Ascending means middle-first.
pub fn sort_middle_first(grid: &Grid, descending: bool) -> Vec<NetKey> {
    let (size_x, size_y, _) = grid.size;
    let middle_x = size_x / 2;
    let middle_y = size_y / 2;

    let distance = |net: &routegrid_common::model::Net| -> u32 {
        let start = middle_x.abs_diff(net.start.x) + middle_y.abs_diff(net.start.y);
        let end = middle_x.abs_diff(net.end.x) + middle_y.abs_diff(net.end.y);
        start + end
    };

    let mut keys: Vec<NetKey> = grid.nets.keys().copied().collect();
    keys.sort_by_key(|k| distance(&grid.nets[k]));
    if descending {
        keys.reverse();
    }
    keys
}

/// Orders nets by how many other net endpoints share their two gates
/// (`occ(start) + occ(end) - 2`). Default descending = busiest gates
/// first, matching the original's default.
pub fn sort_gate(grid: &Grid, descending: bool) -> Vec<NetKey> {
    let mut gate_occupation: HashMap<(u32, u32), u32> = HashMap::new();
    for net in grid.nets.values() {
        *gate_occupation
            .entry((net.start.x, net.start.y))
            .or_insert(0) += 1;
        *gate_occupation.entry((net.end.x, net.end.y)).or_insert(0) += 1;
    }

    let neighbors = |net: &routegrid_common::model::Net| -> i64 {
        let occ_start = gate_occupation[&(net.start.x, net.start.y)] as i64;
        let occ_end = gate_occupation[&(net.end.x, net.end.y)] as i64;
        occ_start + occ_end - 2
    };

    let mut keys: Vec<NetKey> = grid.nets.keys().copied().collect();
    keys.sort_by_key(|k| neighbors(&grid.nets[k]));
    if descending {
        keys.reverse();
    }
    keys
}

/// For each net, counts how many other nets' straight-line gate-to-gate
/// segments cross it in 2D, via the two cross-product sign tests.
/// Updates `Net::exp_intersections` in place, matching the original's
/// persistent heuristic counter. Ascending = fewest expected crossings.
pub fn sort_exp_intersections(grid: &mut Grid, descending: bool) -> Vec<NetKey> {
    let keys: Vec<NetKey> = grid.nets.keys().copied().collect();
    for &key in &keys {
        grid.nets.get_mut(&key).unwrap().exp_intersections = 0;
    }

    for &key in &keys {
        let (x0, y0, x1, y1) = {
            let net = &grid.nets[&key];
            (
                net.start.x as i64,
                net.start.y as i64,
                net.end.x as i64,
                net.end.y as i64,
            )
        };
        let mut crossings = 0u32;
        for &other_key in &keys {
            if other_key == key {
                continue;
            }
            let other = &grid.nets[&other_key];
            let (ox0, oy0, ox1, oy1) = (
                other.start.x as i64,
                other.start.y as i64,
                other.end.x as i64,
                other.end.y as i64,
            );

            let p0 = (oy1 - oy0) * (ox1 - x0) - (ox1 - ox0) * (oy1 - y0);
            let p1 = (oy1 - oy0) * (ox1 - x1) - (ox1 - ox0) * (oy1 - y1);
            let p2 = (y1 - y0) * (x1 - ox0) - (x1 - x0) * (y1 - oy0);
            let p3 = (y1 - y0) * (x1 - ox1) - (x1 - x0) * (y1 - oy1);

            if p0 * p1 < 0 && p2 * p3 < 0 {
                crossings += 1;
            }
        }
        grid.nets.get_mut(&key).unwrap().exp_intersections = crossings;
    }

    let mut keys = keys;
    keys.sort_by_key(|k| grid.nets[k].exp_intersections);
    if descending {
        keys.reverse();
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use routegrid_common::model::Gate;

    fn sample_grid() -> Grid {
        let mut grid = Grid::new(10, 10, 2).unwrap();
        grid.add_gate(Gate::new(1, 0, 0)).unwrap();
        grid.add_gate(Gate::new(2, 1, 0)).unwrap();
        grid.add_gate(Gate::new(3, 5, 5)).unwrap();
        grid.add_gate(Gate::new(4, 9, 9)).unwrap();
        grid.add_net(1, 2).unwrap();
        grid.add_net(3, 4).unwrap();
        grid
    }

    #[test]
    fn sort_length_ascending_then_descending_reverse_modulo_ties() {
        let grid = sample_grid();
        let asc = sort_length(&grid, false);
        let desc = sort_length(&grid, true);
        assert_eq!(asc, desc.into_iter().rev().collect::<Vec<_>>());
    }

    #[test]
    fn sort_gate_counts_shared_endpoints() {
        let mut grid = Grid::new(10, 10, 2).unwrap();
        grid.add_gate(Gate::new(1, 0, 0)).unwrap();
        grid.add_gate(Gate::new(2, 1, 0)).unwrap();
        grid.add_gate(Gate::new(3, 2, 0)).unwrap();
        grid.add_net(1, 2).unwrap();
        grid.add_net(1, 3).unwrap();
        // Gate 1 is shared by both nets, so both should report a
        // positive neighbor count while not crashing on lookups.
        let ordering = sort_gate(&grid, true);
        assert_eq!(ordering.len(), 2);
    }
}
