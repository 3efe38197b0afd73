use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use routegrid_common::config::Config;
use routegrid_common::model::Grid;
use routegrid_common::{generator, io, logging, verify, viz};
use routegrid_router::annealing::{self, CoolingParams, Schedule};
use routegrid_router::hillclimber;
use routegrid_router::sort::SorterKind;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load gates/nets and route every net once with A*, nothing else.
    Route,
    /// Route with A*, then run the Hillclimber for `run.iterations` passes.
    Improve,
    /// Route with A*, then run Simulated Annealing for `run.iterations` passes.
    Anneal,
    /// Write a fresh random gate/netlist CSV pair.
    Generate {
        #[arg(long, default_value_t = 20)]
        gates: usize,
        #[arg(long, default_value_t = 30)]
        nets: usize,
        #[arg(long, default_value_t = 20)]
        size_x: u32,
        #[arg(long, default_value_t = 20)]
        size_y: u32,
        #[arg(long, default_value = "inputs/print.csv")]
        gate_file: String,
        #[arg(long, default_value = "inputs/netlist.csv")]
        netlist_file: String,
        #[arg(long, default_value_t = 1)]
        seed: u64,
    },
}

fn main() -> anyhow::Result<()> {
    logging::init();
    let args = Args::parse();

    let config = load_config(&args.config)?;
    config.annealing.validate()?;

    let command = args.command.unwrap_or_else(|| default_command(&config));

    match command {
        Commands::Generate {
            gates,
            nets,
            size_x,
            size_y,
            gate_file,
            netlist_file,
            seed,
        } => {
            prepare_output_dir(&gate_file)?;
            prepare_output_dir(&netlist_file)?;
            let mut rng = StdRng::seed_from_u64(seed);
            generator::generate_random_netlist(
                &gate_file,
                &netlist_file,
                size_x,
                size_y,
                gates,
                nets,
                &mut rng,
            )?;
        }
        Commands::Route => run_pipeline(&config, RunMode::RouteOnly)?,
        Commands::Improve => run_pipeline(&config, RunMode::Hillclimb)?,
        Commands::Anneal => run_pipeline(&config, RunMode::Anneal)?,
    }

    Ok(())
}

fn load_config(path: &Path) -> anyhow::Result<Config> {
    if path.exists() {
        log::info!("Loading configuration from {:?}", path);
        let text = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file: {e}"))?;
        toml::from_str(&text).map_err(|e| anyhow::anyhow!("failed to parse config TOML: {e}"))
    } else {
        log::warn!("Configuration file {:?} not found. Using internal defaults.", path);
        Ok(Config::default())
    }
}

fn default_command(config: &Config) -> Commands {
    match config.run.algorithm.as_str() {
        "astar_only" | "astar-only" => Commands::Route,
        "hillclimber" => Commands::Improve,
        _ => Commands::Anneal,
    }
}

enum RunMode {
    RouteOnly,
    Hillclimb,
    Anneal,
}

fn run_pipeline(config: &Config, mode: RunMode) -> anyhow::Result<()> {
    if !Path::new(&config.input.gate_file).exists() {
        return Err(anyhow::anyhow!("gate file missing: {}", config.input.gate_file));
    }
    if !Path::new(&config.input.netlist_file).exists() {
        return Err(anyhow::anyhow!("netlist file missing: {}", config.input.netlist_file));
    }

    let sorter = SorterKind::parse(&config.run.sorter)
        .ok_or_else(|| anyhow::anyhow!("unknown sorter '{}'", config.run.sorter))?;

    let mut rng = StdRng::seed_from_u64(config.run.seed);
    let mut grid = build_grid(config)?;

    log::info!(
        "Loaded {} gates and {} nets onto a {:?} grid",
        grid.gates.len(),
        grid.nets.len(),
        grid.size
    );

    let order = routegrid_router::sort::sort(sorter, &mut grid, config.run.descending, &mut rng);
    let unrouted = routegrid_router::astar::route_all(&mut grid, &order);
    if unrouted > 0 {
        log::warn!("{unrouted} net(s) could not be routed by A*");
    }
    log::info!("Cost after initial routing: {}", grid.compute_cost());

    let history = match mode {
        RunMode::RouteOnly => Vec::new(),
        RunMode::Hillclimb => hillclimber::run(
            &mut grid,
            config.run.iterations,
            sorter,
            config.run.descending,
            &mut rng,
        ),
        RunMode::Anneal => {
            let schedule = Schedule::parse(&config.annealing.schedule)
                .ok_or_else(|| anyhow::anyhow!("unknown cooling schedule '{}'", config.annealing.schedule))?;
            let params = CoolingParams {
                t0: config.annealing.t0,
                t_low: config.annealing.t_low,
                k: config.annealing.k,
                beta: config.annealing.beta,
                alpha: config.annealing.alpha,
            };
            annealing::run(
                &mut grid,
                config.run.iterations,
                sorter,
                config.run.descending,
                schedule,
                params,
                &mut rng,
            )
        }
    };

    if let Err(e) = verify::run(&grid) {
        return Err(anyhow::anyhow!("grid invariant check failed: {e}"));
    }

    log::info!("Final cost: {}", grid.compute_cost());

    prepare_output_dir(&config.output.routing_csv)?;
    io::write_routing_csv(
        &grid,
        config.input.chip_id,
        config.input.netlist_id,
        &config.output.routing_csv,
    )?;

    if config.output.make_csv_improvements && !history.is_empty() {
        prepare_output_dir(&config.output.history_csv)?;
        io::write_history_csv(&history, &config.output.history_csv)?;
    }

    if config.output.make_iterative_plot {
        prepare_output_dir(&config.output.plot_png)?;
        viz::draw_routed_design(&grid, &config.output.plot_png, 1000, 1000);
    }

    Ok(())
}

/// Builds a grid sized per `config.grid`, falling back to the widest
/// gate coordinate when `x`/`y` are left at 0, and the minimum legal
/// `z = 2` when `z` is left at 0.
fn build_grid(config: &Config) -> anyhow::Result<Grid> {
    let (max_x, max_y) = scan_gate_extents(&config.input.gate_file)?;
    let size_x = if config.grid.x == 0 { max_x } else { config.grid.x };
    let size_y = if config.grid.y == 0 { max_y } else { config.grid.y };
    let size_z = if config.grid.z == 0 { 2 } else { config.grid.z };

    let mut grid = Grid::new(size_x, size_y, size_z)
        .map_err(|e| anyhow::anyhow!("invalid grid configuration: {e}"))?;
    io::load_gates(&mut grid, &config.input.gate_file)?;
    io::load_netlists(&mut grid, &config.input.netlist_file)?;
    Ok(grid)
}

fn scan_gate_extents(path: &str) -> anyhow::Result<(u32, u32)> {
    #[derive(serde::Deserialize)]
    struct GateRow {
        #[allow(dead_code)]
        chip: u32,
        x: u32,
        y: u32,
    }

    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| anyhow::anyhow!("failed to read gate file '{path}': {e}"))?;
    let mut max_x = 0u32;
    let mut max_y = 0u32;
    for row in reader.deserialize() {
        let row: GateRow = row.map_err(|e| anyhow::anyhow!("malformed gate row in '{path}': {e}"))?;
        max_x = max_x.max(row.x);
        max_y = max_y.max(row.y);
    }
    Ok((max_x, max_y))
}

fn prepare_output_dir(path_str: &str) -> anyhow::Result<()> {
    if let Some(parent) = Path::new(path_str).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            log::info!("Creating output directory: {:?}", parent);
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
