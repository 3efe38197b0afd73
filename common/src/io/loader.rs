use std::path::Path;

use serde::Deserialize;

use crate::error::RouteError;
use crate::model::{Gate, Grid};

#[derive(Debug, Deserialize)]
struct GateRow {
    chip: u32,
    x: u32,
    y: u32,
}

#[derive(Debug, Deserialize)]
struct NetRow {
    chip_a: u32,
    chip_b: u32,
}

/// Reads `chip,x,y` rows, one per gate, into `grid`.
pub fn load_gates(grid: &mut Grid, path: impl AsRef<Path>) -> Result<(), RouteError> {
    let mut reader = csv::Reader::from_path(path)?;
    for row in reader.deserialize() {
        let row: GateRow = row?;
        grid.add_gate(Gate::new(row.chip, row.x, row.y))?;
    }
    Ok(())
}

/// Reads `chip_a,chip_b` rows, one per net, into `grid`. Gate ids must
/// already be present in `grid.gates` (load gates first).
pub fn load_netlists(grid: &mut Grid, path: impl AsRef<Path>) -> Result<(), RouteError> {
    let mut reader = csv::Reader::from_path(path)?;
    for row in reader.deserialize() {
        let row: NetRow = row?;
        grid.add_net(row.chip_a, row.chip_b)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_gates_then_nets() {
        let dir = std::env::temp_dir();
        let gate_path = dir.join("routegrid_test_gates.csv");
        let net_path = dir.join("routegrid_test_nets.csv");

        let mut gfile = std::fs::File::create(&gate_path).unwrap();
        writeln!(gfile, "chip,x,y\n1,0,0\n2,2,0").unwrap();
        let mut nfile = std::fs::File::create(&net_path).unwrap();
        writeln!(nfile, "chip_a,chip_b\n1,2").unwrap();

        let mut grid = Grid::new(4, 4, 2).unwrap();
        load_gates(&mut grid, &gate_path).unwrap();
        load_netlists(&mut grid, &net_path).unwrap();

        assert_eq!(grid.gates.len(), 2);
        assert_eq!(grid.nets.len(), 1);
        assert!(grid.nets.contains_key(&(1, 2)));

        let _ = std::fs::remove_file(&gate_path);
        let _ = std::fs::remove_file(&net_path);
    }

    #[test]
    fn unknown_gate_id_in_netlist_is_input_malformed() {
        let mut grid = Grid::new(4, 4, 2).unwrap();
        grid.add_gate(Gate::new(1, 0, 0)).unwrap();
        assert!(matches!(
            grid.add_net(1, 99),
            Err(RouteError::InputMalformed(_))
        ));
    }
}
