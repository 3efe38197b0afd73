use rand::Rng;
use routegrid_common::geom::Coordinate;
use routegrid_common::model::Grid;

const MAX_ATTEMPTS_PER_STEP: u32 = 10;

enum Step {
    Reached,
    Move(Coordinate),
}

/// Attempts a bounded, randomized walk from `start` to `goal`, retrying
/// individual steps up to `MAX_ATTEMPTS_PER_STEP` times before giving up
/// on the whole attempt. Shared by the hillclimber and the annealer, the
/// way the original's `find_path`/`find_smartest_step` pair is shared by
/// both optimizers.
///
/// Purely read-only against `grid`: it only consults current occupancy
/// to avoid stepping onto an already-claimed segment, and never mutates
/// anything. Callers are responsible for releasing the net's old path
/// before calling this (so the walk can reuse its own vacated segments)
/// and for committing the winner afterward.
pub fn find_path(
    grid: &Grid,
    start: Coordinate,
    goal: Coordinate,
    max_pathlength: u32,
    rng: &mut impl Rng,
) -> Option<Vec<Coordinate>> {
    let mut path = Vec::new();
    let mut current = start;
    let mut current_length = 0u32;
    let mut failed_steps = 0u32;

    while current_length < max_pathlength {
        path.push(current);

        let step = loop {
            match find_smartest_step(grid, current, goal, &path, rng) {
                Some(step) => break step,
                None => {
                    failed_steps += 1;
                    if failed_steps > MAX_ATTEMPTS_PER_STEP {
                        return None;
                    }
                }
            }
        };

        match step {
            Step::Reached => return Some(path),
            Step::Move(next) => {
                let segment = grid.make_segment(current, next);
                if grid.is_segment_occupied(&segment) {
                    return None;
                }
                current = next;
                current_length += 1;
            }
        }
    }
    None
}

/// Picks one candidate next step from `position`, axis-weighted `[2, 2,
/// 1]` toward x/y while pinned to layer 0 (forcing a climb to z=1),
/// uniform across all three axes otherwise. Returns `None` if the
/// candidate revisits this attempt's own path, lands on a foreign gate,
/// or falls outside the grid — the caller retries on `None`.
fn find_smartest_step(
    grid: &Grid,
    position: Coordinate,
    destination: Coordinate,
    path_so_far: &[Coordinate],
    rng: &mut impl Rng,
) -> Option<Step> {
    if position == destination {
        return Some(Step::Reached);
    }

    let (axis, direction): (usize, i64) = if position.z == 0 {
        let roll = rng.gen_range(0..5);
        if roll < 2 {
            (0, if rng.gen_bool(0.5) { 1 } else { -1 })
        } else if roll < 4 {
            (1, if rng.gen_bool(0.5) { 1 } else { -1 })
        } else {
            (2, 1)
        }
    } else {
        let axis = rng.gen_range(0..3);
        let direction = if rng.gen_bool(0.5) { 1 } else { -1 };
        (axis, direction)
    };

    let mut coords = [position.x as i64, position.y as i64, position.z as i64];
    coords[axis] += direction;
    if coords.iter().any(|&v| v < 0) {
        return None;
    }
    let candidate = Coordinate::new(coords[0] as u32, coords[1] as u32, coords[2] as u32);

    // Only x/y are bounded above here; z is bounded by construction at
    // the lower end (never negative) and the walk is free to climb as
    // many detour layers as it needs (spec §4.6).
    let (max_x, max_y, _) = grid.size;
    if candidate.x > max_x || candidate.y > max_y {
        return None;
    }
    if path_so_far.contains(&candidate) {
        return None;
    }
    if grid.is_gate_coordinate(candidate) && candidate != destination {
        return None;
    }

    Some(Step::Move(candidate))
}
