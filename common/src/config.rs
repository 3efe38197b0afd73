use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub annealing: AnnealingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: InputConfig::default(),
            grid: GridConfig::default(),
            run: RunConfig::default(),
            output: OutputConfig::default(),
            annealing: AnnealingConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_chip_id")]
    pub chip_id: u32,
    #[serde(default = "default_netlist_id")]
    pub netlist_id: u32,
    #[serde(default = "default_gate_file")]
    pub gate_file: String,
    #[serde(default = "default_netlist_file")]
    pub netlist_file: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            chip_id: default_chip_id(),
            netlist_id: default_netlist_id(),
            gate_file: default_gate_file(),
            netlist_file: default_netlist_file(),
        }
    }
}

/// Grid extents. `x`/`y` left at 0 mean "derive from the widest gate
/// coordinate"; `z` left at 0 means "use the minimum legal value, 2".
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct GridConfig {
    #[serde(default)]
    pub x: u32,
    #[serde(default)]
    pub y: u32,
    #[serde(default)]
    pub z: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { x: 0, y: 0, z: 0 }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RunConfig {
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    #[serde(default = "default_sorter")]
    pub sorter: String,
    #[serde(default)]
    pub descending: bool,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            algorithm: default_algorithm(),
            iterations: default_iterations(),
            sorter: default_sorter(),
            descending: false,
            seed: default_seed(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_routing_csv")]
    pub routing_csv: String,
    #[serde(default = "default_history_csv")]
    pub history_csv: String,
    #[serde(default = "default_plot_png")]
    pub plot_png: String,
    #[serde(default)]
    pub update_csv_paths: bool,
    #[serde(default)]
    pub make_csv_improvements: bool,
    #[serde(default)]
    pub make_iterative_plot: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            routing_csv: default_routing_csv(),
            history_csv: default_history_csv(),
            plot_png: default_plot_png(),
            update_csv_paths: false,
            make_csv_improvements: false,
            make_iterative_plot: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnnealingConfig {
    #[serde(default = "default_t0")]
    pub t0: f64,
    #[serde(default = "default_schedule")]
    pub schedule: String,
    #[serde(default)]
    pub t_low: f64,
    #[serde(default = "default_k")]
    pub k: f64,
    #[serde(default = "default_beta")]
    pub beta: f64,
    #[serde(default = "default_alpha")]
    pub alpha: f64,
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        Self {
            t0: default_t0(),
            schedule: default_schedule(),
            t_low: 0.0,
            k: default_k(),
            beta: default_beta(),
            alpha: default_alpha(),
        }
    }
}

impl AnnealingConfig {
    /// Matches the configuration-invalid error class: an exponential
    /// schedule with `alpha` outside `(0, 1)` is rejected before the
    /// run starts rather than producing a degenerate temperature curve.
    pub fn validate(&self) -> Result<(), crate::error::RouteError> {
        if self.schedule == "exponential" && !(0.0 < self.alpha && self.alpha < 1.0) {
            return Err(crate::error::RouteError::ConfigInvalid(format!(
                "exponential cooling requires alpha in (0,1), got {}",
                self.alpha
            )));
        }
        Ok(())
    }
}

fn default_chip_id() -> u32 {
    1
}

fn default_netlist_id() -> u32 {
    1
}

fn default_gate_file() -> String {
    "inputs/print.csv".to_string()
}

fn default_netlist_file() -> String {
    "inputs/netlist.csv".to_string()
}

fn default_algorithm() -> String {
    "annealing".to_string()
}

fn default_iterations() -> usize {
    200
}

fn default_sorter() -> String {
    "sort_length".to_string()
}

fn default_seed() -> u64 {
    1
}

fn default_routing_csv() -> String {
    "output/output.csv".to_string()
}

fn default_history_csv() -> String {
    "output/history.csv".to_string()
}

fn default_plot_png() -> String {
    "output/visual.png".to_string()
}

fn default_t0() -> f64 {
    1000.0
}

fn default_schedule() -> String {
    "geometric".to_string()
}

fn default_k() -> f64 {
    20.0
}

fn default_beta() -> f64 {
    0.9
}

fn default_alpha() -> f64 {
    0.98
}
