use std::collections::HashSet;
use std::path::Path;

use rand::Rng;

use crate::error::RouteError;

/// Writes a fresh random `chip,x,y` gate file and `chip_a,chip_b`
/// netlist file for a grid of extent `(x, y)`. Out of core scope per
/// spec.md (an external collaborator, named only by interface) but
/// retained as a CLI utility the way the teacher keeps its own
/// `generate_random_def` behind a `Generate` subcommand.
///
/// Gate coordinates are sampled without replacement over the `(x, y)`
/// plane; nets are sampled as random distinct-gate pairs, duplicates
/// allowed (the original netlist format never deduplicates either).
pub fn generate_random_netlist(
    gate_path: impl AsRef<Path>,
    netlist_path: impl AsRef<Path>,
    size_x: u32,
    size_y: u32,
    num_gates: usize,
    num_nets: usize,
    rng: &mut impl Rng,
) -> Result<(), RouteError> {
    if num_gates < 2 {
        return Err(RouteError::ConfigInvalid(
            "need at least 2 gates to generate any nets".to_string(),
        ));
    }

    log::info!(
        "Generating random benchmark: {num_gates} gates, {num_nets} nets, grid {size_x}x{size_y}"
    );

    let gates = sample_distinct_coordinates(size_x, size_y, num_gates, rng)?;

    let mut gate_writer = csv::Writer::from_path(&gate_path)?;
    gate_writer.write_record(["chip", "x", "y"])?;
    for (uid, (x, y)) in gates.iter().enumerate() {
        gate_writer.write_record([(uid as u32 + 1).to_string(), x.to_string(), y.to_string()])?;
    }
    gate_writer.flush()?;

    let mut net_writer = csv::Writer::from_path(&netlist_path)?;
    net_writer.write_record(["chip_a", "chip_b"])?;
    for _ in 0..num_nets {
        let a = rng.gen_range(0..gates.len());
        let mut b = rng.gen_range(0..gates.len());
        while b == a {
            b = rng.gen_range(0..gates.len());
        }
        net_writer.write_record([(a as u32 + 1).to_string(), (b as u32 + 1).to_string()])?;
    }
    net_writer.flush()?;

    log::info!(
        "Wrote {:?} and {:?}",
        gate_path.as_ref(),
        netlist_path.as_ref()
    );
    Ok(())
}

fn sample_distinct_coordinates(
    size_x: u32,
    size_y: u32,
    count: usize,
    rng: &mut impl Rng,
) -> Result<Vec<(u32, u32)>, RouteError> {
    let capacity = (size_x as u64 + 1) * (size_y as u64 + 1);
    if (count as u64) > capacity {
        return Err(RouteError::ConfigInvalid(format!(
            "cannot place {count} distinct gates on a {size_x}x{size_y} plane"
        )));
    }

    let mut seen = HashSet::with_capacity(count);
    let mut out = Vec::with_capacity(count);
    while out.len() < count {
        let x = rng.gen_range(0..=size_x);
        let y = rng.gen_range(0..=size_y);
        if seen.insert((x, y)) {
            out.push((x, y));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn writes_distinct_gate_coordinates_and_valid_net_references() {
        let dir = std::env::temp_dir();
        let gate_path = dir.join("routegrid_gen_test_gates.csv");
        let net_path = dir.join("routegrid_gen_test_nets.csv");

        let mut rng = StdRng::seed_from_u64(9);
        generate_random_netlist(&gate_path, &net_path, 10, 10, 5, 4, &mut rng).unwrap();

        let mut grid = crate::model::Grid::new(10, 10, 2).unwrap();
        crate::io::load_gates(&mut grid, &gate_path).unwrap();
        crate::io::load_netlists(&mut grid, &net_path).unwrap();

        assert_eq!(grid.gates.len(), 5);
        assert_eq!(grid.nets.len(), 4);
        for net in grid.nets.values() {
            assert_ne!(net.start, net.end);
        }

        let _ = std::fs::remove_file(&gate_path);
        let _ = std::fs::remove_file(&net_path);
    }

    #[test]
    fn rejects_more_gates_than_the_plane_can_hold() {
        let dir = std::env::temp_dir();
        let gate_path = dir.join("routegrid_gen_test_overflow_gates.csv");
        let net_path = dir.join("routegrid_gen_test_overflow_nets.csv");
        let mut rng = StdRng::seed_from_u64(1);
        let result = generate_random_netlist(&gate_path, &net_path, 1, 1, 10, 1, &mut rng);
        assert!(result.is_err());
    }
}
