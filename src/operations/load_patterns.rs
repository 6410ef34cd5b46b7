use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::assets::{AssetResolver, MaterialHandle};
use crate::lot::{PatternMap, PatternRef};
use crate::mesh::{PatternMesh, PatternSet};
use crate::params::WallParams;

/// Resolves every wall pattern to a material and opens a mesh for it.
///
/// Patterns whose material cannot be found retry with the fallback
/// material; if that fails too the pattern gets no mesh and walls using
/// it draw nothing on that side.
pub struct LoadPatterns<'a> {
    patterns: &'a PatternMap,
    params: &'a WallParams,
}

impl<'a> LoadPatterns<'a> {
    /// Creates a new `LoadPatterns` operation.
    #[must_use]
    pub fn new(patterns: &'a PatternMap, params: &'a WallParams) -> Self {
        Self { patterns, params }
    }

    /// Executes the resolution against `assets`.
    pub fn execute<R: AssetResolver + ?Sized>(&self, assets: &R) -> PatternSet {
        let mut meshes = BTreeMap::new();

        for (id, value) in self.patterns.iter() {
            let name = self.material_name(assets, value);
            match self.resolve(assets, &name) {
                Some((name, material)) => {
                    debug!(pattern = id, material = %name, "resolved wall pattern");
                    meshes.insert(id, PatternMesh::new(name, Some(material)));
                }
                None => warn!(pattern = id, reference = value, "wall pattern has no material"),
            }
        }

        let thickness_name = &self.params.thickness_material;
        let thickness_material = assets.material(thickness_name);
        if thickness_material.is_none() {
            warn!(material = %thickness_name, "wall thickness material not found");
        }

        PatternSet::new(meshes, PatternMesh::new(thickness_name.clone(), thickness_material))
    }

    fn material_name<R: AssetResolver + ?Sized>(&self, assets: &R, value: &str) -> String {
        match PatternRef::parse(value) {
            PatternRef::Catalog(guid) => assets.catalog_material(guid).unwrap_or_else(|| {
                debug!(guid, "catalog pattern without material, using fallback");
                self.params.fallback_material.clone()
            }),
            PatternRef::Blank => self.params.fallback_material.clone(),
            PatternRef::Named(name) => name,
        }
    }

    fn resolve<R: AssetResolver + ?Sized>(
        &self,
        assets: &R,
        name: &str,
    ) -> Option<(String, MaterialHandle)> {
        if let Some(material) = assets.material(name) {
            return Some((name.to_owned(), material));
        }
        let fallback = &self.params.fallback_material;
        if name == fallback {
            return None;
        }
        warn!(material = name, fallback = %fallback, "material not found, using fallback");
        assets
            .material(fallback)
            .map(|material| (fallback.clone(), material))
    }
}
