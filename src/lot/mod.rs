//! In-memory lot description consumed by the wall builder.
//!
//! Everything here is already parsed; the builder never reads package bytes.

pub mod elevation;
pub mod fence;
pub mod graph;
pub mod layer;
pub mod patterns;

pub use elevation::{ElevationGrid, Sampling};
pub use fence::{FenceCatalogEntry, FencePost};
pub use graph::{Node, NodeId, Segment, WallGraph};
pub use layer::{Layer, LayerTable, WallType, NO_SURFACE};
pub use patterns::{PatternMap, PatternRef};
