//! Build passes over a lot, from pattern loading to fence placement.

pub mod build;
pub mod fence;
pub mod fence_posts;
pub mod intersections;
pub mod load_patterns;
pub mod wall_mesh;

pub use build::{BuildLotWalls, BuildStats, LotWalls};
pub use fence_posts::PlaceFencePosts;
pub use intersections::{BuildIntersections, IncidentMember, Intersection, Intersections};
pub use load_patterns::LoadPatterns;
pub use wall_mesh::{BuildWallMeshes, WallPassStats};
