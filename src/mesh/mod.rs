//! Append-only triangle accumulators for wall surfaces.

use std::collections::BTreeMap;

use crate::assets::MaterialHandle;
use crate::math::{Point2, Point3};

/// A committed triangle mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    /// Vertex positions in plan x, plan y, elevation z.
    pub vertices: Vec<Point3>,
    /// UV coordinates, one per vertex.
    pub uvs: Vec<Point2>,
    /// Triangle indices (each triple defines a triangle).
    pub indices: Vec<[u32; 3]>,
}

impl TriangleMesh {
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Accumulates the triangles drawn with one wall pattern.
///
/// Writes only ever append: each batch of vertices is followed by
/// triangles indexed relative to the batch start.
#[derive(Debug, Clone)]
pub struct PatternMesh {
    name: String,
    material: Option<MaterialHandle>,
    mesh: TriangleMesh,
}

/// A pattern mesh after the build pass has finished writing to it.
#[derive(Debug, Clone, PartialEq)]
pub struct CommittedMesh {
    /// Material name the mesh was resolved with.
    pub name: String,
    /// Resolved material, `None` if the host could not provide one.
    pub material: Option<MaterialHandle>,
    pub mesh: TriangleMesh,
}

impl PatternMesh {
    /// Creates an empty accumulator for `material`.
    #[must_use]
    pub fn new(name: impl Into<String>, material: Option<MaterialHandle>) -> Self {
        Self {
            name: name.into(),
            material,
            mesh: TriangleMesh::default(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn material(&self) -> Option<MaterialHandle> {
        self.material
    }

    /// Index the next appended vertex will receive.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn vertex_index(&self) -> u32 {
        self.mesh.vertices.len() as u32
    }

    /// Appends a batch of vertices with matching UVs.
    pub fn add_vertices(&mut self, vertices: &[Point3], uvs: &[Point2]) {
        debug_assert_eq!(vertices.len(), uvs.len(), "one uv per vertex");
        self.mesh.vertices.extend_from_slice(vertices);
        self.mesh.uvs.extend_from_slice(uvs);
    }

    /// Appends a triangle whose corners are offsets from `base`.
    pub fn add_triangle(&mut self, base: u32, a: u32, b: u32, c: u32) {
        self.mesh.indices.push([base + a, base + b, base + c]);
    }

    /// Appends a batch of vertices and the triangles that index into it.
    pub fn add_batch(&mut self, vertices: &[Point3], uvs: &[Point2], triangles: &[[u32; 3]]) {
        let base = self.vertex_index();
        self.add_vertices(vertices, uvs);
        for &[a, b, c] in triangles {
            self.add_triangle(base, a, b, c);
        }
    }

    /// Read access to the geometry written so far.
    #[must_use]
    pub fn mesh(&self) -> &TriangleMesh {
        &self.mesh
    }

    /// Finishes the mesh. Consumes the accumulator so it cannot be written
    /// after commit.
    #[must_use]
    pub fn commit(self) -> CommittedMesh {
        CommittedMesh {
            name: self.name,
            material: self.material,
            mesh: self.mesh,
        }
    }
}

/// The pattern meshes written during one build pass.
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: BTreeMap<u16, PatternMesh>,
    thickness: PatternMesh,
}

/// Every mesh produced by a build pass.
#[derive(Debug, Clone, PartialEq)]
pub struct CommittedPatterns {
    /// One mesh per resolved pattern id.
    pub patterns: BTreeMap<u16, CommittedMesh>,
    /// The top strip of thick walls.
    pub thickness: CommittedMesh,
}

impl PatternSet {
    /// Creates a set from resolved pattern meshes and the thickness mesh.
    #[must_use]
    pub fn new(patterns: BTreeMap<u16, PatternMesh>, thickness: PatternMesh) -> Self {
        Self {
            patterns,
            thickness,
        }
    }

    /// Whether pattern `id` resolved to a mesh.
    #[must_use]
    pub fn contains(&self, id: u16) -> bool {
        self.patterns.contains_key(&id)
    }

    /// Mesh for pattern `id`, if it resolved.
    pub fn pattern_mut(&mut self, id: u16) -> Option<&mut PatternMesh> {
        self.patterns.get_mut(&id)
    }

    /// Mesh for the top strip of thick walls.
    pub fn thickness_mut(&mut self) -> &mut PatternMesh {
        &mut self.thickness
    }

    /// Commits every mesh exactly once.
    #[must_use]
    pub fn commit(self) -> CommittedPatterns {
        CommittedPatterns {
            patterns: self
                .patterns
                .into_iter()
                .map(|(id, pm)| (id, pm.commit()))
                .collect(),
            thickness: self.thickness.commit(),
        }
    }
}

impl CommittedPatterns {
    /// Committed mesh for pattern `id`.
    #[must_use]
    pub fn pattern(&self, id: u16) -> Option<&TriangleMesh> {
        self.patterns.get(&id).map(|c| &c.mesh)
    }

    /// Total triangles across all meshes, thickness included.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.patterns
            .values()
            .map(|c| c.mesh.triangle_count())
            .sum::<usize>()
            + self.thickness.mesh.triangle_count()
    }
}
