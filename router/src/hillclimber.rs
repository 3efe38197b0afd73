use rand::Rng;
use routegrid_common::model::{Grid, NetKey};

use crate::sort::{self, SorterKind};
use crate::walk;

/// Repeatedly tries to shorten or de-intersect each net's path, keeping
/// whichever of the old/new path is cheaper. Reruns for `iterations`
/// full passes over the net order, returning the grid cost after each
/// pass for history plotting.
///
/// Unlike the original, a rejected candidate's segments are released
/// and the saved path is recommitted before moving on, so `wire_segments`
/// never accumulates stale occupancy from abandoned attempts — accepted
/// rewrites are the only ones that leave a mark on the grid.
pub fn run(grid: &mut Grid, iterations: usize, sorter: SorterKind, descending: bool, rng: &mut impl Rng) -> Vec<u64> {
    let mut history = Vec::with_capacity(iterations);
    let mut attempts_without_improvement: u32 = 0;

    for iteration in 0..iterations {
        log::info!("hillclimber iteration {iteration}");
        let order = sort::sort(sorter, grid, descending, rng);
        for net_key in order {
            attempts_without_improvement = improve_connection(grid, net_key, attempts_without_improvement, rng);
        }
        history.push(grid.compute_cost());
    }
    history
}

/// One net's 100-attempt local search. Every 5th attempt since the last
/// improvement tolerates a sideways (equal-cost) move; other attempts
/// require a strict improvement. Either kind of acceptance returns
/// immediately, leaving the remaining attempt budget unused.
fn improve_connection(grid: &mut Grid, net_key: NetKey, mut attempts_without_improvement: u32, rng: &mut impl Rng) -> u32 {
    let (start, end, minimal_length) = {
        let net = &grid.nets[&net_key];
        (net.start, net.end, net.minimal_length)
    };
    let max_length = 2 * minimal_length + 10;
    let best_cost = grid.compute_cost();

    for _ in 0..100 {
        let old_path = grid.nets[&net_key].path.clone();
        grid.release_path(net_key);

        let candidate = walk::find_path(grid, start, end, max_length, rng);

        let Some(candidate_path) = candidate else {
            let _ = grid.commit_path(net_key, old_path);
            attempts_without_improvement += 1;
            continue;
        };

        if grid.commit_path(net_key, candidate_path).is_err() {
            let _ = grid.commit_path(net_key, old_path);
            attempts_without_improvement += 1;
            continue;
        }
        let new_cost = grid.compute_cost();

        if attempts_without_improvement % 5 == 0 {
            if new_cost <= best_cost {
                return 0;
            } else {
                grid.release_path(net_key);
                let _ = grid.commit_path(net_key, old_path);
                attempts_without_improvement += 1;
            }
        } else if new_cost < best_cost {
            return 0;
        } else {
            grid.release_path(net_key);
            let _ = grid.commit_path(net_key, old_path);
            attempts_without_improvement += 1;
        }
    }
    attempts_without_improvement
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use routegrid_common::model::Gate;

    #[test]
    fn never_makes_the_grid_more_expensive_than_the_starting_route() {
        let mut grid = Grid::new(6, 6, 3).unwrap();
        grid.add_gate(Gate::new(1, 0, 0)).unwrap();
        grid.add_gate(Gate::new(2, 4, 0)).unwrap();
        grid.add_net(1, 2).unwrap();
        crate::astar::route_all(&mut grid, &[(1, 2)]);
        let starting_cost = grid.compute_cost();

        let mut rng = StdRng::seed_from_u64(11);
        let history = run(&mut grid, 5, SorterKind::None, false, &mut rng);

        assert!(history.iter().all(|&c| c <= starting_cost));
    }

    #[test]
    fn leaves_no_orphaned_segments_behind() {
        let mut grid = Grid::new(6, 6, 3).unwrap();
        grid.add_gate(Gate::new(1, 0, 0)).unwrap();
        grid.add_gate(Gate::new(2, 4, 0)).unwrap();
        grid.add_net(1, 2).unwrap();
        crate::astar::route_all(&mut grid, &[(1, 2)]);

        let mut rng = StdRng::seed_from_u64(3);
        run(&mut grid, 3, SorterKind::None, false, &mut rng);

        let mut reference = grid.clone();
        reference.update().unwrap();
        assert_eq!(reference.wire_segments.len(), grid.wire_segments.len());
        assert_eq!(reference.intersections, grid.intersections);
    }
}
