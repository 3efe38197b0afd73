use std::path::Path;

use crate::error::RouteError;
use crate::model::Grid;

/// Writes the `net,wires` routing table plus the trailing `C = <cost>`
/// summary row, in the shape the original tooling's loaders expect.
pub fn write_routing_csv(
    grid: &Grid,
    chip_id: u32,
    netlist_id: u32,
    path: impl AsRef<Path>,
) -> Result<(), RouteError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(["net", "wires"])?;

    let mut keys: Vec<_> = grid.nets.keys().copied().collect();
    keys.sort_unstable();
    for key in keys {
        let net = &grid.nets[&key];
        writer.write_record([format!("({}, {})", key.0, key.1), serialize_path(&net.path)])?;
    }

    writer.write_record([
        format!("chip_{chip_id}_net_{netlist_id}"),
        format!("C = {}", grid.compute_cost()),
    ])?;
    writer.flush()?;
    Ok(())
}

/// Writes one `iteration,cost` row per entry in `history` (1-based).
pub fn write_history_csv(history: &[u64], path: impl AsRef<Path>) -> Result<(), RouteError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(["iteration", "cost"])?;
    for (i, cost) in history.iter().enumerate() {
        writer.write_record([(i + 1).to_string(), cost.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

fn serialize_path(path: &[crate::geom::Coordinate]) -> String {
    let xs: Vec<String> = path.iter().map(|c| c.x.to_string()).collect();
    let ys: Vec<String> = path.iter().map(|c| c.y.to_string()).collect();
    let zs: Vec<String> = path.iter().map(|c| c.z.to_string()).collect();
    format!(
        "[[{}], [{}], [{}]]",
        xs.join(", "),
        ys.join(", "),
        zs.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Coordinate;
    use crate::model::Gate;

    #[test]
    fn serializes_path_as_three_parallel_sequences() {
        let path = vec![
            Coordinate::new(0, 0, 0),
            Coordinate::new(1, 0, 0),
            Coordinate::new(1, 1, 0),
        ];
        assert_eq!(serialize_path(&path), "[[0, 1, 1], [0, 0, 1], [0, 0, 0]]");
    }

    #[test]
    fn writes_header_rows_and_trailer() {
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

        let path = std::env::temp_dir().join("routegrid_test_routing.csv");
        write_routing_csv(&grid, 1, 1, &path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("net,wires"));
        assert!(contents.contains("C = 2"));
        let _ = std::fs::remove_file(&path);
    }
}
