use tracing::info;

use crate::assets::{AssetResolver, RoofQuery};
use crate::error::{ConfigError, Result};
use crate::lot::{ElevationGrid, FencePost, LayerTable, PatternMap, WallGraph};
use crate::mesh::CommittedPatterns;
use crate::params::WallParams;

use super::fence::FenceSet;
use super::fence_posts::PlaceFencePosts;
use super::intersections::BuildIntersections;
use super::load_patterns::LoadPatterns;
use super::wall_mesh::{BuildWallMeshes, WallPassStats};

/// Everything produced by one lot wall build.
#[derive(Debug, Clone)]
pub struct LotWalls {
    /// Committed wall meshes, one per resolved pattern plus thickness.
    pub meshes: CommittedPatterns,
    /// Placed fence rails and posts grouped by fence GUID.
    pub fences: FenceSet,
    pub stats: BuildStats,
}

/// Summary of a build for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub walls: WallPassStats,
    /// Intersections built, one per referenced node.
    pub intersections: usize,
    /// Free-standing posts placed.
    pub posts: usize,
}

/// Builds the walls, roof edges and fences of a lot in one pass.
///
/// The pass resolves patterns, computes wall intersections, draws every
/// segment, places fence posts and finally commits every mesh once.
pub struct BuildLotWalls<'a> {
    graph: &'a WallGraph,
    layers: &'a LayerTable,
    patterns: &'a PatternMap,
    elevation: &'a ElevationGrid,
    fence_posts: &'a [FencePost],
    params: WallParams,
}

impl<'a> BuildLotWalls<'a> {
    /// Creates a new `BuildLotWalls` operation with default parameters.
    #[must_use]
    pub fn new(
        graph: &'a WallGraph,
        layers: &'a LayerTable,
        patterns: &'a PatternMap,
        elevation: &'a ElevationGrid,
    ) -> Self {
        Self {
            graph,
            layers,
            patterns,
            elevation,
            fence_posts: &[],
            params: WallParams::default(),
        }
    }

    /// Sets the free-standing fence posts to place.
    #[must_use]
    pub fn with_fence_posts(mut self, posts: &'a [FencePost]) -> Self {
        self.fence_posts = posts;
        self
    }

    /// Overrides the generation parameters.
    #[must_use]
    pub fn with_params(mut self, params: WallParams) -> Self {
        self.params = params;
        self
    }

    /// Executes the build.
    ///
    /// Unresolvable layers, materials and fence models degrade to
    /// fallbacks or skipped elements and are logged.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` before any geometry is generated if the
    /// parameters are invalid or the elevation grid and wall graph disagree
    /// on the number of floors, and `GraphError` if the graph is malformed.
    pub fn execute(&self, assets: &dyn AssetResolver, roofs: &dyn RoofQuery) -> Result<LotWalls> {
        self.params.validate()?;
        if self.graph.floors != self.elevation.floor_count() {
            return Err(ConfigError::FloorCountMismatch {
                graph: self.graph.floors,
                elevation: self.elevation.floor_count(),
            }
            .into());
        }

        let mut patterns = LoadPatterns::new(self.patterns, &self.params).execute(assets);
        let intersections =
            BuildIntersections::new(self.graph, self.layers, self.params.thickness).execute()?;

        let mut fences = FenceSet::new(self.params.diagonal_threshold);
        let walls = BuildWallMeshes::new(
            self.graph,
            self.layers,
            self.elevation,
            &intersections,
            &self.params,
            assets,
            roofs,
        )
        .execute(&mut patterns, &mut fences)?;

        let posts =
            PlaceFencePosts::new(self.fence_posts, self.graph, self.elevation).execute(&mut fences, assets)?;

        let meshes = patterns.commit();
        let stats = BuildStats {
            walls,
            intersections: intersections.len(),
            posts,
        };

        info!(
            walls = stats.walls.walls,
            thick = stats.walls.thick_walls,
            caps = stats.walls.caps,
            rails = stats.walls.rails,
            posts,
            meshes = meshes.patterns.len(),
            triangles = meshes.triangle_count(),
            "built lot walls"
        );

        Ok(LotWalls {
            meshes,
            fences,
            stats,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::assets::fakes::{FakeAssets, FlatRoof};
    use crate::assets::NoRoofs;
    use crate::lot::{Layer, Node, Segment, NO_SURFACE};
    use crate::math::Point3;
    use crate::operations::fence::FencePart;
    use approx::assert_relative_eq;

    const T: f64 = 0.075;
    const BRICK: u16 = 0;
    const PAINT: u16 = 1;
    const WALL: u32 = 10;
    const DECK: u32 = 11;
    const ROOF: u32 = 12;
    const FENCE: u32 = 13;
    const FENCE_GUID: u32 = 0x5000_0001;

    fn assets() -> FakeAssets {
        let mut assets = FakeAssets::with_materials(&["wall_top", "wall_brick_base", "wall_paint_base"]);
        assets.add_model("rail");
        assets.add_model("post");
        assets.add_fence(FENCE_GUID, "rail", None, "post");
        assets
    }

    fn layers() -> LayerTable {
        [
            Layer::new(WALL, 1, BRICK, PAINT),
            Layer::new(DECK, 16, BRICK, PAINT),
            Layer::new(ROOF, 3, BRICK, NO_SURFACE),
            Layer::new(FENCE, FENCE_GUID, NO_SURFACE, NO_SURFACE),
        ]
        .into_iter()
        .collect()
    }

    fn patterns() -> PatternMap {
        [(BRICK, "brick"), (PAINT, "paint")].into_iter().collect()
    }

    fn graph(nodes: &[(u32, f64, f64)], segments: &[(u32, u32, u32)]) -> WallGraph {
        let mut g = WallGraph::new(0, 1);
        for &(id, x, y) in nodes {
            g.add_node(Node::new(id, x, y, 0));
        }
        for &(from, to, layer) in segments {
            g.add_segment(Segment::new(from, to, layer));
        }
        g
    }

    fn build(g: &WallGraph, elevation: &ElevationGrid) -> LotWalls {
        let layers = layers();
        let patterns = patterns();
        BuildLotWalls::new(g, &layers, &patterns, elevation)
            .execute(&assets(), &NoRoofs)
            .unwrap()
    }

    fn square() -> WallGraph {
        graph(
            &[(1, 0.0, 0.0), (2, 10.0, 0.0), (3, 10.0, 10.0), (4, 0.0, 10.0)],
            &[(1, 2, WALL), (2, 3, WALL), (3, 4, WALL), (4, 1, WALL)],
        )
    }

    #[test]
    fn closed_square_has_mitered_corners_and_no_caps() {
        let g = square();
        let elevation = ElevationGrid::flat(11, 11, &[0.0]).unwrap();
        let lot = build(&g, &elevation);

        assert_eq!(lot.stats.intersections, 4);
        assert_eq!(lot.stats.walls.walls, 4);
        assert_eq!(lot.stats.walls.thick_walls, 4);
        assert_eq!(lot.stats.walls.caps, 0);

        for id in [BRICK, PAINT] {
            let mesh = lot.meshes.pattern(id).unwrap();
            assert_eq!(mesh.triangle_count(), 16);
            assert_eq!(mesh.vertex_count(), 24);
        }
        let thickness = &lot.meshes.thickness.mesh;
        assert_eq!(thickness.vertex_count(), 8 * 4);
        assert_eq!(thickness.triangle_count(), 6 * 4);

        // Outer faces of the first two walls meet at the outer corner.
        let brick = lot.meshes.pattern(BRICK).unwrap();
        let first_end = brick.vertices[2];
        let second_start = brick.vertices[6];
        assert_relative_eq!(first_end, Point3::new(10.0 + T, -T, 0.0), epsilon = 1e-9);
        assert_relative_eq!(second_start, first_end, epsilon = 1e-9);

        // Inner faces meet at the inner corner.
        let paint = lot.meshes.pattern(PAINT).unwrap();
        assert_relative_eq!(paint.vertices[2], Point3::new(10.0 - T, T, 0.0), epsilon = 1e-9);
        assert_relative_eq!(paint.vertices[6], paint.vertices[2], epsilon = 1e-9);

        // No floor above: walls are one storey tall.
        assert_relative_eq!(brick.vertices[3].z, 3.0);
    }

    #[test]
    fn free_standing_wall_is_capped_at_both_ends() {
        let g = graph(&[(1, 0.0, 0.0), (2, 4.0, 0.0)], &[(1, 2, WALL)]);
        let elevation = ElevationGrid::flat(5, 5, &[0.0]).unwrap();
        let lot = build(&g, &elevation);

        assert_eq!(lot.stats.walls.caps, 2);
        let brick = lot.meshes.pattern(BRICK).unwrap();
        let paint = lot.meshes.pattern(PAINT).unwrap();
        assert_eq!(brick.triangle_count(), 6);
        assert_eq!(paint.triangle_count(), 6);

        // The start cap spans the two faces at x = 0 and uses the tail of U.
        let cap = &brick.vertices[6..10];
        assert!(cap.iter().all(|v| v.x.abs() < 1e-12));
        assert_relative_eq!(brick.uvs[6].x, 1.0 - 2.0 * T);
        assert_relative_eq!(brick.uvs[7].x, 1.0);
        assert_relative_eq!(brick.uvs[6].y, 1.0);
    }

    #[test]
    fn junction_ends_are_not_capped() {
        let g = graph(
            &[(1, 0.0, 0.0), (2, 2.0, 0.0), (3, 4.0, 0.0), (4, 2.0, 2.0)],
            &[(1, 2, WALL), (2, 3, WALL), (2, 4, WALL)],
        );
        let elevation = ElevationGrid::flat(5, 5, &[0.0]).unwrap();
        let lot = build(&g, &elevation);
        // Only the three dead ends get caps.
        assert_eq!(lot.stats.walls.caps, 3);
    }

    #[test]
    fn thin_walls_share_one_section_and_have_no_thickness() {
        let g = graph(&[(1, 0.0, 0.0), (2, 0.0, 3.0)], &[(1, 2, DECK)]);
        let elevation = ElevationGrid::flat(4, 4, &[0.0]).unwrap();
        let lot = build(&g, &elevation);

        assert!(lot.meshes.thickness.mesh.is_empty());
        assert_eq!(lot.stats.walls.caps, 0);
        let brick = lot.meshes.pattern(BRICK).unwrap();
        let paint = lot.meshes.pattern(PAINT).unwrap();
        assert_eq!(brick.vertices, paint.vertices);
        assert_relative_eq!(brick.uvs[0].x, 0.0);
        assert_relative_eq!(paint.uvs[0].x, 1.0);
        assert_relative_eq!(paint.uvs[2].x, 0.0);
    }

    #[test]
    fn roof_walls_stop_below_the_roof() {
        let g = graph(&[(1, 0.0, 0.0), (2, 2.0, 0.0)], &[(1, 2, ROOF)]);
        let elevation = ElevationGrid::flat(3, 3, &[0.0]).unwrap();
        let layers = layers();
        let patterns = patterns();
        let lot = BuildLotWalls::new(&g, &layers, &patterns, &elevation)
            .execute(&assets(), &FlatRoof(2.0))
            .unwrap();

        let brick = lot.meshes.pattern(BRICK).unwrap();
        let top = 2.0 - T * 2.5;
        for v in &brick.vertices[3..6] {
            assert_relative_eq!(v.z, top);
        }
        assert_relative_eq!(brick.uvs[0].y, 1.0);
        assert_relative_eq!(brick.uvs[5].y, 1.0 - top / 3.0);
        assert!(lot.meshes.pattern(PAINT).unwrap().is_empty());
    }

    #[test]
    fn roof_below_floor_clamps_to_base() {
        let g = graph(&[(1, 0.0, 0.0), (2, 2.0, 0.0)], &[(1, 2, ROOF)]);
        let elevation = ElevationGrid::flat(3, 3, &[1.0]).unwrap();
        let layers = layers();
        let patterns = patterns();
        let lot = BuildLotWalls::new(&g, &layers, &patterns, &elevation)
            .execute(&assets(), &FlatRoof(0.5))
            .unwrap();
        let brick = lot.meshes.pattern(BRICK).unwrap();
        assert_relative_eq!(brick.vertices[3].z, 1.0);
    }

    #[test]
    fn upper_floor_sets_wall_top() {
        let mut g = WallGraph::new(0, 2);
        g.add_node(Node::new(1, 0.0, 0.0, 0));
        g.add_node(Node::new(2, 2.0, 0.0, 0));
        g.add_segment(Segment::new(1, 2, DECK));
        let elevation = ElevationGrid::flat(3, 3, &[0.0, 2.5]).unwrap();
        let lot = build(&g, &elevation);

        let brick = lot.meshes.pattern(BRICK).unwrap();
        assert_relative_eq!(brick.vertices[3].z, 2.5);
        assert_relative_eq!(brick.uvs[0].y, 2.5 / 3.0);
    }

    #[test]
    fn fence_segments_become_rails() {
        let g = graph(
            &[(1, 0.0, 0.0), (2, 1.0, 0.0), (3, 2.0, 1.0)],
            &[(1, 2, FENCE), (2, 3, FENCE)],
        );
        // Height rises by 0.5 per cell along x.
        let mut data = Vec::new();
        for x in 0..3 {
            for _ in 0..3 {
                data.push(f64::from(x) * 0.5);
            }
        }
        let elevation = ElevationGrid::new(3, 3, vec![data]).unwrap();
        let lot = build(&g, &elevation);

        assert_eq!(lot.stats.walls.rails, 2);
        assert_eq!(lot.stats.walls.walls, 0);
        assert_eq!(lot.meshes.triangle_count(), 0);

        let fence = lot.fences.get(FENCE_GUID).unwrap();
        assert_eq!(fence.count(FencePart::Rail), 2);
        for (_, rail) in fence.iter() {
            assert_eq!(rail.chain.len(), 4);
        }
    }

    #[test]
    fn posts_are_placed_with_the_build() {
        let g = graph(&[], &[]);
        let elevation = ElevationGrid::flat(3, 3, &[0.25]).unwrap();
        let layers = layers();
        let patterns = patterns();
        let posts = [FencePost {
            guid: FENCE_GUID,
            x: 1.0,
            y: 1.0,
            level: 0,
        }];
        let lot = BuildLotWalls::new(&g, &layers, &patterns, &elevation)
            .with_fence_posts(&posts)
            .execute(&assets(), &NoRoofs)
            .unwrap();
        assert_eq!(lot.stats.posts, 1);
        assert_eq!(lot.fences.instance_count(), 1);
    }

    #[test]
    fn unknown_layer_draws_nothing_but_succeeds() {
        let g = graph(&[(1, 0.0, 0.0), (2, 1.0, 0.0)], &[(1, 2, 999)]);
        let elevation = ElevationGrid::flat(2, 2, &[0.0]).unwrap();
        let lot = build(&g, &elevation);
        assert_eq!(lot.stats.walls.walls, 1);
        assert_eq!(lot.meshes.triangle_count(), 0);
    }

    #[test]
    fn unresolved_pattern_skips_that_side() {
        let g = graph(&[(1, 0.0, 0.0), (2, 1.0, 0.0)], &[(1, 2, WALL)]);
        let elevation = ElevationGrid::flat(2, 2, &[0.0]).unwrap();
        let layers = layers();
        let patterns: PatternMap = [(BRICK, "brick"), (PAINT, "missing")].into_iter().collect();
        let assets = FakeAssets::with_materials(&["wall_top", "wall_brick_base"]);
        let lot = BuildLotWalls::new(&g, &layers, &patterns, &elevation)
            .execute(&assets, &NoRoofs)
            .unwrap();

        assert!(lot.meshes.pattern(PAINT).is_none());
        assert_eq!(lot.meshes.pattern(BRICK).unwrap().triangle_count(), 6);
        assert_eq!(lot.meshes.thickness.mesh.triangle_count(), 6);
    }

    #[test]
    fn floor_count_mismatch_is_fatal() {
        let g = square();
        let elevation = ElevationGrid::flat(11, 11, &[0.0, 3.0]).unwrap();
        let layers = layers();
        let patterns = patterns();
        let result = BuildLotWalls::new(&g, &layers, &patterns, &elevation).execute(&assets(), &NoRoofs);
        assert!(matches!(
            result,
            Err(crate::LotWallError::Config(ConfigError::FloorCountMismatch {
                graph: 1,
                elevation: 2
            }))
        ));
    }

    #[test]
    fn invalid_params_are_rejected() {
        let g = square();
        let elevation = ElevationGrid::flat(11, 11, &[0.0]).unwrap();
        let layers = layers();
        let patterns = patterns();
        let params = WallParams {
            wall_height: -1.0,
            ..WallParams::default()
        };
        let result = BuildLotWalls::new(&g, &layers, &patterns, &elevation)
            .with_params(params)
            .execute(&assets(), &NoRoofs);
        assert!(result.is_err());
    }
}
