//! Interfaces to the host's asset system.
//!
//! The builder never loads assets itself. Every lookup goes through an
//! injected [`AssetResolver`]; `None` means "could not be resolved" and the
//! builder degrades to a fallback or skips the element.

use crate::lot::FenceCatalogEntry;

/// Opaque handle to a drawable material owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialHandle(pub u64);

/// Opaque handle to a renderable model prototype owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelHandle(pub u64);

/// Read-only lookups into the host's asset caches.
pub trait AssetResolver {
    /// Material name of a catalog entry referenced by GUID.
    fn catalog_material(&self, guid: u32) -> Option<String>;

    /// Resolves a material by name.
    fn material(&self, name: &str) -> Option<MaterialHandle>;

    /// Fence style for a fence catalog GUID.
    fn fence(&self, guid: u32) -> Option<FenceCatalogEntry>;

    /// Resolves a model prototype by name.
    fn model(&self, name: &str) -> Option<ModelHandle>;
}

/// Height of the roofs covering the lot.
pub trait RoofQuery {
    /// Roof height at `(x, y)`, or `fallback` where there is no roof.
    fn height_at(&self, x: f64, y: f64, fallback: f64) -> f64;
}

/// A lot without roofs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRoofs;

impl RoofQuery for NoRoofs {
    fn height_at(&self, _x: f64, _y: f64, fallback: f64) -> f64 {
        fallback
    }
}
