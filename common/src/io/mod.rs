mod loader;
mod writer;

pub use loader::{load_gates, load_netlists};
pub use writer::{write_history_csv, write_routing_csv};
