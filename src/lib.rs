pub mod assets;
pub mod error;
pub mod lot;
pub mod math;
pub mod mesh;
pub mod operations;
pub mod params;

pub use error::{LotWallError, Result};
pub use operations::{BuildLotWalls, LotWalls};
pub use params::WallParams;
