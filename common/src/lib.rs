pub mod config;
pub mod error;
pub mod generator;
pub mod geom;
pub mod io;
pub mod logging;
pub mod model;
pub mod verify;
pub mod viz;

pub use error::RouteError;
pub use geom::Coordinate;
pub use model::{Gate, Grid, Net, NetKey, Segment};
