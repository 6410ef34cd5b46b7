use tracing::debug;

use crate::assets::AssetResolver;
use crate::error::Result;
use crate::lot::{ElevationGrid, FencePost, WallGraph};

use super::fence::FenceSet;

/// Places the lot's free-standing fence posts on their floor's terrain.
pub struct PlaceFencePosts<'a> {
    posts: &'a [FencePost],
    graph: &'a WallGraph,
    elevation: &'a ElevationGrid,
}

impl<'a> PlaceFencePosts<'a> {
    /// Creates a new `PlaceFencePosts` operation.
    #[must_use]
    pub fn new(posts: &'a [FencePost], graph: &'a WallGraph, elevation: &'a ElevationGrid) -> Self {
        Self {
            posts,
            graph,
            elevation,
        }
    }

    /// Executes the placement, returning how many posts were placed.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::FloorOutOfRange` if a post lies on a floor the
    /// lot does not have.
    pub fn execute(&self, fences: &mut FenceSet, assets: &dyn AssetResolver) -> Result<usize> {
        let mut placed = 0;
        for post in self.posts {
            let floor = self.graph.floor_index(post.level)?;
            let elevation = self.elevation.sample_floor(floor, post.x, post.y).unwrap_or_default();
            if fences
                .collection_mut(post.guid, assets)
                .place_post(post.x, post.y, elevation)
                .is_some()
            {
                placed += 1;
            }
        }
        debug!(placed, total = self.posts.len(), "placed fence posts");
        Ok(placed)
    }
}
