mod gate;
mod grid;
mod net;
mod segment;

pub use gate::Gate;
pub use grid::Grid;
pub use net::{Net, NetKey};
pub use segment::Segment;
