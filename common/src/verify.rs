use crate::model::Grid;

/// Checks the grid against the invariants from the testable-properties
/// list: cost derivation, segment well-formedness, path endpoints, and
/// intersection accounting. Intended for use after a run completes, the
/// way the teacher's design-rule checker gates a placement/route.
pub fn run(grid: &Grid) -> Result<(), String> {
    log::info!("Verifying routed grid...");
    let mut errors = Vec::new();

    check_cost_definition(grid, &mut errors);
    check_segment_shape(grid, &mut errors);
    check_path_endpoints(grid, &mut errors);
    check_intersection_accounting(grid, &mut errors);

    if errors.is_empty() {
        log::info!("\x1b[32mPASS\x1b[0m: grid invariants hold.");
        Ok(())
    } else {
        for e in &errors {
            log::error!("\x1b[31mFAIL\x1b[0m: {e}");
        }
        Err(errors.join("; "))
    }
}

fn check_cost_definition(grid: &Grid, errors: &mut Vec<String>) {
    let expected = grid.wire_segments.len() as u64 + 300 * grid.intersections as u64;
    if grid.compute_cost() != expected {
        errors.push(format!(
            "cost {} does not match |wire_segments| + 300*intersections = {}",
            grid.compute_cost(),
            expected
        ));
    }
}

fn check_segment_shape(grid: &Grid, errors: &mut Vec<String>) {
    for segment in grid.wire_segments.keys() {
        let [a, b] = segment.endpoints();
        if !grid.is_within_bounds(a) || !grid.is_within_bounds(b) {
            errors.push(format!("segment {segment:?} out of grid bounds"));
            continue;
        }
        let dx = a.x.abs_diff(b.x);
        let dy = a.y.abs_diff(b.y);
        let dz = a.z.abs_diff(b.z);
        let axes_differing = [dx, dy, dz].iter().filter(|&&d| d != 0).count();
        if axes_differing != 1 || dx + dy + dz != 1 {
            errors.push(format!("segment {segment:?} is not a unit axis-aligned step"));
        }
    }
}

fn check_path_endpoints(grid: &Grid, errors: &mut Vec<String>) {
    for (key, net) in &grid.nets {
        if net.path.is_empty() {
            continue;
        }
        if net.path[0] != net.start || net.path[net.path.len() - 1] != net.end {
            errors.push(format!("net {key:?} path does not span start..end"));
        }
        if net.path[0].z != 0 || net.path[net.path.len() - 1].z != 0 {
            errors.push(format!("net {key:?} path endpoints must sit on layer 0"));
        }
        for window in net.path.windows(2) {
            let segment = grid.make_segment(window[0], window[1]);
            match grid.wire_segments.get(&segment) {
                Some(owner) if *owner == *key => {}
                Some(owner) => errors.push(format!(
                    "segment {segment:?} of net {key:?} path is attributed to {owner:?}"
                )),
                None => errors.push(format!(
                    "segment {segment:?} of net {key:?} path is missing from wire_segments"
                )),
            }
        }
    }
}

fn check_intersection_accounting(grid: &Grid, errors: &mut Vec<String>) {
    let mut reference = grid.clone();
    reference.recount_intersections();
    if reference.intersections != grid.intersections {
        errors.push(format!(
            "incremental intersections ({}) drifted from a from-scratch recount ({})",
            grid.intersections, reference.intersections
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Coordinate;
    use crate::model::Gate;

    #[test]
    fn passes_on_a_freshly_committed_path() {
        let mut grid = Grid::new(4, 4, 2).unwrap();
        grid.add_gate(Gate::new(1, 0, 0)).unwrap();
        grid.add_gate(Gate::new(2, 2, 0)).unwrap();
        grid.add_net(1, 2).unwrap();
        grid.commit_path(
            (1, 2),
            vec![
                Coordinate::new(0, 0, 0),
                Coordinate::new(1, 0, 0),
                Coordinate::new(2, 0, 0),
            ],
        )
        .unwrap();
        assert!(run(&grid).is_ok());
    }

    #[test]
    fn flags_a_path_with_a_missing_segment() {
        let mut grid = Grid::new(4, 4, 2).unwrap();
        grid.add_gate(Gate::new(1, 0, 0)).unwrap();
        grid.add_gate(Gate::new(2, 2, 0)).unwrap();
        grid.add_net(1, 2).unwrap();
        // Write the path directly without going through commit_path, so
        // wire_segments never gets populated.
        grid.nets.get_mut(&(1, 2)).unwrap().path = vec![
            Coordinate::new(0, 0, 0),
            Coordinate::new(1, 0, 0),
            Coordinate::new(2, 0, 0),
        ];
        assert!(run(&grid).is_err());
    }
}
