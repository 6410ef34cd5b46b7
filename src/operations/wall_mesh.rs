use tracing::{debug, warn};

use crate::assets::{AssetResolver, RoofQuery};
use crate::error::{GraphError, Result};
use crate::lot::elevation::FloorView;
use crate::lot::{ElevationGrid, Layer, LayerTable, Node, Sampling, WallGraph, WallType};
use crate::math::{normalize_2d, Point2, Point3, Vector2, Vector3};
use crate::mesh::PatternSet;
use crate::params::WallParams;

use super::fence::FenceSet;
use super::intersections::{IncidentMember, Intersections};

/// Cross-section of a wall along its centerline.
///
/// Indices 0..3 run along the base from `from` through the midpoint to
/// `to`; 3..6 run back along the top from `to` to `from`.
type Section = [Point3; 6];

/// Left side strip, wound to face the left.
const LEFT_TRIANGLES: [[u32; 3]; 4] = [[0, 5, 4], [4, 1, 0], [1, 4, 3], [3, 2, 1]];

/// Right side strip, wound to face the right.
const RIGHT_TRIANGLES: [[u32; 3]; 4] = [[0, 1, 4], [4, 5, 0], [1, 2, 3], [3, 4, 1]];

/// Top strip of a thick wall: start-to-mid, mid-to-end, then the two
/// miter fillers at the ends.
const THICKNESS_TRIANGLES: [[u32; 3]; 6] = [
    [1, 0, 4],
    [5, 4, 0],
    [2, 1, 3],
    [4, 3, 1],
    [7, 2, 3],
    [6, 5, 0],
];

const CAP_TRIANGLES: [[u32; 3]; 2] = [[0, 3, 2], [2, 1, 0]];

/// Counters reported by a wall mesh pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WallPassStats {
    /// Segments drawn as walls.
    pub walls: usize,
    /// Of those, walls with thickness.
    pub thick_walls: usize,
    /// End caps emitted.
    pub caps: usize,
    /// Fence rails placed.
    pub rails: usize,
    /// Fence rails skipped for lack of a prototype.
    pub skipped_rails: usize,
}

/// Draws every segment of the wall graph into the pattern meshes, handing
/// fence segments to the fence set.
pub struct BuildWallMeshes<'a> {
    graph: &'a WallGraph,
    layers: &'a LayerTable,
    elevation: &'a ElevationGrid,
    intersections: &'a Intersections,
    params: &'a WallParams,
    assets: &'a dyn AssetResolver,
    roofs: &'a dyn RoofQuery,
}

/// The two faces of a thick wall plus its centerline top corners.
struct Faces {
    left: Section,
    right: Section,
    centre_top_start: Point3,
    centre_top_end: Point3,
}

impl<'a> BuildWallMeshes<'a> {
    /// Creates a new `BuildWallMeshes` operation.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        graph: &'a WallGraph,
        layers: &'a LayerTable,
        elevation: &'a ElevationGrid,
        intersections: &'a Intersections,
        params: &'a WallParams,
        assets: &'a dyn AssetResolver,
        roofs: &'a dyn RoofQuery,
    ) -> Self {
        Self {
            graph,
            layers,
            elevation,
            intersections,
            params,
            assets,
            roofs,
        }
    }

    /// Executes the pass, appending to `patterns` and `fences`.
    ///
    /// Nothing is committed here; the caller commits once all passes are
    /// done.
    ///
    /// # Errors
    ///
    /// Returns a `GraphError` if a segment references a node without an
    /// intersection, lies on a floor outside the elevation grid, or is a
    /// thick wall missing from its own intersections.
    pub fn execute(&self, patterns: &mut PatternSet, fences: &mut FenceSet) -> Result<WallPassStats> {
        let mut stats = WallPassStats::default();

        for (index, segment) in self.graph.segments().iter().enumerate() {
            let from_i = self.intersections.at(index, segment.from)?;
            let to_i = self.intersections.at(index, segment.to)?;
            let from = from_i.node;
            let to = to_i.node;

            let floor = self.graph.floor_index(from.level)?;
            let ground = self
                .elevation
                .floor(floor)
                .ok_or_else(|| self.floor_out_of_range(from.level))?;
            let above = self.elevation.floor(floor + 1);

            let layer = self.layers.get_or_fallback(segment.layer);

            if let Some(guid) = layer.wall_type.fence_guid() {
                let placed = fences.collection_mut(guid, self.assets).place_rail(
                    (from.x, from.y),
                    (to.x, to.y),
                    ground.sample_exact(from.x, from.y),
                    ground.sample_exact(to.x, to.y),
                );
                if placed.is_some() {
                    stats.rails += 1;
                } else {
                    stats.skipped_rails += 1;
                }
                continue;
            }

            let roof = layer.wall_type == WallType::Roof;
            let centre = self.centerline(&from, &to, ground, above, roof);
            let uvs = self.section_uvs(&centre, roof);

            let faces = if layer.wall_type.is_thick() {
                let from_member = self.intersections.member(index, segment.from)?;
                let to_member = self.intersections.member(index, segment.to)?;
                let faces = self.offset_faces(&centre, &from, &to, from_member, to_member);
                Self::emit_thickness(patterns, &faces);
                stats.thick_walls += 1;
                Some(faces)
            } else {
                None
            };

            let (left, right) = faces
                .as_ref()
                .map_or((&centre, &centre), |f| (&f.left, &f.right));

            let (left_pattern, right_pattern) = Self::sides(&layer, patterns);
            if let Some(mesh) = left_pattern.and_then(|p| patterns.pattern_mut(p)) {
                mesh.add_batch(left, &uvs, &LEFT_TRIANGLES);
            }
            if let Some(mesh) = right_pattern.and_then(|p| patterns.pattern_mut(p)) {
                mesh.add_batch(right, &mirror_u(uvs), &RIGHT_TRIANGLES);
            }

            if to_i.is_capped() && to_i.members[0].segment == index {
                if let Some(mesh) = right_pattern.and_then(|p| patterns.pattern_mut(p)) {
                    let (vertices, cap_uvs) = self.end_cap(left, right);
                    mesh.add_batch(&vertices, &cap_uvs, &CAP_TRIANGLES);
                    stats.caps += 1;
                }
            }
            if from_i.is_capped() && from_i.members[0].segment == index {
                if let Some(mesh) = left_pattern.and_then(|p| patterns.pattern_mut(p)) {
                    let (vertices, cap_uvs) = self.start_cap(left, right);
                    mesh.add_batch(&vertices, &cap_uvs, &CAP_TRIANGLES);
                    stats.caps += 1;
                }
            }

            stats.walls += 1;
        }

        debug!(?stats, "wall mesh pass finished");
        Ok(stats)
    }

    fn floor_out_of_range(&self, level: i32) -> GraphError {
        let floors = i32::try_from(self.elevation.floor_count()).unwrap_or(i32::MAX);
        GraphError::FloorOutOfRange {
            level,
            base: self.graph.base_floor,
            end: self.graph.base_floor.saturating_add(floors),
        }
    }

    /// Pattern ids for each side that resolved to a mesh.
    fn sides(layer: &Layer, patterns: &PatternSet) -> (Option<u16>, Option<u16>) {
        let usable = |p: Option<u16>| p.filter(|&id| patterns.contains(id));
        (usable(layer.left_pattern), usable(layer.right_pattern))
    }

    /// Base and top of the wall at its start, midpoint and end.
    fn centerline(
        &self,
        from: &Node,
        to: &Node,
        ground: FloorView<'_>,
        above: Option<FloorView<'_>>,
        roof: bool,
    ) -> Section {
        let mid = ((from.x + to.x) / 2.0, (from.y + to.y) / 2.0);
        let wall_height = self.params.wall_height;

        let base_from = ground.sample_exact(from.x, from.y);
        let base_mid = ground.sample_interpolated(mid.0, mid.1);
        let base_to = ground.sample_exact(to.x, to.y);

        let mut top_to = FloorView::sample_upper(above, to.x, to.y, base_to, wall_height, Sampling::Exact);
        let mut top_mid = FloorView::sample_upper(
            above,
            mid.0,
            mid.1,
            base_mid,
            wall_height,
            Sampling::Interpolated,
        );
        let mut top_from =
            FloorView::sample_upper(above, from.x, from.y, base_from, wall_height, Sampling::Exact);

        if roof {
            let clip = |x: f64, y: f64, top: f64, base: f64| {
                (self.roofs.height_at(x, y, top) - self.params.roof_offset).max(base)
            };
            top_to = clip(to.x, to.y, top_to, base_to);
            top_mid = clip(mid.0, mid.1, top_mid, base_mid);
            top_from = clip(from.x, from.y, top_from, base_from);
        }

        [
            Point3::new(from.x, from.y, base_from),
            Point3::new(mid.0, mid.1, base_mid),
            Point3::new(to.x, to.y, base_to),
            Point3::new(to.x, to.y, top_to),
            Point3::new(mid.0, mid.1, top_mid),
            Point3::new(from.x, from.y, top_from),
        ]
    }

    /// Texture coordinates for the left face.
    ///
    /// V scales with the real wall height so patterns are not stretched.
    /// Roof walls instead run V from 1 at the base up to the clipped top.
    fn section_uvs(&self, section: &Section, roof: bool) -> [Point2; 6] {
        let ratio = |base: usize, top: usize| (section[top].z - section[base].z) / self.params.wall_height;
        let start = ratio(0, 5);
        let mid = ratio(1, 4);
        let end = ratio(2, 3);

        if roof {
            [
                Point2::new(0.0, 1.0),
                Point2::new(0.5, 1.0),
                Point2::new(1.0, 1.0),
                Point2::new(1.0, 1.0 - end),
                Point2::new(0.5, 1.0 - mid),
                Point2::new(0.0, 1.0 - start),
            ]
        } else {
            [
                Point2::new(0.0, start),
                Point2::new(0.5, mid),
                Point2::new(1.0, end),
                Point2::new(1.0, 0.0),
                Point2::new(0.5, 0.0),
                Point2::new(0.0, 0.0),
            ]
        }
    }

    /// Offsets the centerline section to both faces of a thick wall,
    /// stretching each end by its miter extent.
    fn offset_faces(
        &self,
        centre: &Section,
        from: &Node,
        to: &Node,
        from_member: IncidentMember,
        to_member: IncidentMember,
    ) -> Faces {
        let dir = normalize_2d(to.point() - from.point()).unwrap_or_else(|| {
            warn!(from = from.id.0, to = to.id.0, "zero-length thick wall");
            Vector2::zeros()
        });
        let along = Vector3::new(dir.x, dir.y, 0.0);
        let thick = dir * self.params.thickness;

        let offset_right = Vector3::new(-thick.y, thick.x, 0.0);
        let offset_left = Vector3::new(thick.y, -thick.x, 0.0);

        let left_start = offset_left - along * from_member.left_extent;
        let right_start = offset_right - along * from_member.right_extent;
        let left_end = offset_left + along * to_member.left_extent;
        let right_end = offset_right + along * to_member.right_extent;

        let shift = |offsets: [Vector3; 3]| -> Section {
            let [start, mid, end] = offsets;
            [
                centre[0] + start,
                centre[1] + mid,
                centre[2] + end,
                centre[3] + end,
                centre[4] + mid,
                centre[5] + start,
            ]
        };

        Faces {
            left: shift([left_start, offset_left, left_end]),
            right: shift([right_start, offset_right, right_end]),
            centre_top_start: centre[5],
            centre_top_end: centre[3],
        }
    }

    fn emit_thickness(patterns: &mut PatternSet, faces: &Faces) {
        let vertices = [
            faces.left[5],
            faces.left[4],
            faces.left[3],
            faces.right[3],
            faces.right[4],
            faces.right[5],
            faces.centre_top_start,
            faces.centre_top_end,
        ];
        let uvs = vertices.map(|v| Point2::new(0.0, v.y));
        patterns
            .thickness_mut()
            .add_batch(&vertices, &uvs, &THICKNESS_TRIANGLES);
    }

    /// Cap across the `to` end, drawn with the right pattern.
    fn end_cap(&self, left: &Section, right: &Section) -> ([Point3; 4], [Point2; 4]) {
        let bottom_v = (left[3].z - left[2].z) / self.params.wall_height;
        (
            [left[2], right[2], right[3], left[3]],
            self.cap_uvs(bottom_v),
        )
    }

    /// Cap across the `from` end, drawn with the left pattern.
    fn start_cap(&self, left: &Section, right: &Section) -> ([Point3; 4], [Point2; 4]) {
        let bottom_v = (left[5].z - left[0].z) / self.params.wall_height;
        (
            [right[0], left[0], left[5], right[5]],
            self.cap_uvs(bottom_v),
        )
    }

    /// Caps use the last `2 * thickness` of the pattern's U range.
    fn cap_uvs(&self, bottom_v: f64) -> [Point2; 4] {
        let u0 = 1.0 - self.params.thickness * 2.0;
        [
            Point2::new(u0, bottom_v),
            Point2::new(1.0, bottom_v),
            Point2::new(1.0, 0.0),
            Point2::new(u0, 0.0),
        ]
    }
}

/// Flips U so the right face reads left-to-right from its own side.
fn mirror_u(mut uvs: [Point2; 6]) -> [Point2; 6] {
    uvs[0].x = 1.0;
    uvs[2].x = 0.0;
    uvs[3].x = 0.0;
    uvs[5].x = 1.0;
    uvs
}
