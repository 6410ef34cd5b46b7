use std::collections::BTreeMap;
use std::f64::consts::SQRT_2;

use slotmap::SlotMap;
use tracing::{debug, warn};

use crate::assets::{AssetResolver, ModelHandle};
use crate::math::{Matrix4, Point3};

use super::placement::rail_chain;
use super::transform::{compose, NodeTransform};

slotmap::new_key_type! {
    /// Unique identifier for a placed fence model.
    pub struct FenceInstanceId;
}

/// Which prototype a fence instance was made from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FencePart {
    Rail,
    DiagonalRail,
    Post,
}

/// Resolved model prototypes of one fence style.
///
/// Any of them may be missing; placements needing a missing prototype are
/// skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FencePrototypes {
    pub rail: Option<ModelHandle>,
    pub diagonal_rail: Option<ModelHandle>,
    pub post: Option<ModelHandle>,
}

impl FencePrototypes {
    /// Looks up the catalog entry for `guid` and resolves its models.
    pub fn resolve<R: AssetResolver + ?Sized>(assets: &R, guid: u32) -> Self {
        let Some(entry) = assets.fence(guid) else {
            warn!(guid, "fence style not in catalog");
            return Self::default();
        };

        let model = |name: &str| {
            let handle = assets.model(name);
            if handle.is_none() {
                warn!(guid, model = name, "fence model not found");
            }
            handle
        };

        Self {
            rail: model(&entry.rail),
            diagonal_rail: entry.diagonal_rail.as_deref().and_then(model),
            post: model(&entry.post),
        }
    }
}

/// A fence model instance with its transform hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedModel {
    pub part: FencePart,
    pub prototype: ModelHandle,
    /// Transforms from the lot root down to the model node.
    pub chain: Vec<NodeTransform>,
}

impl PlacedModel {
    /// The composed lot-space matrix of the model node.
    #[must_use]
    pub fn matrix(&self) -> Matrix4 {
        compose(&self.chain)
    }

    /// The model node, last in the chain.
    #[must_use]
    pub fn model_node(&self) -> Option<&NodeTransform> {
        self.chain.last()
    }
}

/// Every instance placed for one fence style.
#[derive(Debug, Clone)]
pub struct FenceCollection {
    guid: u32,
    prototypes: FencePrototypes,
    diagonal_threshold: f64,
    instances: SlotMap<FenceInstanceId, PlacedModel>,
}

impl FenceCollection {
    /// Creates an empty collection for `guid`.
    #[must_use]
    pub fn new(guid: u32, prototypes: FencePrototypes, diagonal_threshold: f64) -> Self {
        Self {
            guid,
            prototypes,
            diagonal_threshold,
            instances: SlotMap::with_key(),
        }
    }

    #[must_use]
    pub fn guid(&self) -> u32 {
        self.guid
    }

    #[must_use]
    pub fn prototypes(&self) -> &FencePrototypes {
        &self.prototypes
    }

    /// Places a rail between two plan points at the given elevations.
    ///
    /// Spans longer than the diagonal threshold use the diagonal prototype
    /// when the style has one; it is modelled at 45 degrees so its length
    /// is divided by `sqrt(2)`. Returns `None` when no usable prototype
    /// exists.
    pub fn place_rail(
        &mut self,
        from: (f64, f64),
        to: (f64, f64),
        from_elevation: f64,
        to_elevation: f64,
    ) -> Option<FenceInstanceId> {
        let dx = to.0 - from.0;
        let dy = to.1 - from.1;
        let direction = dy.atan2(dx);
        let mut length = dx.hypot(dy);

        let (part, prototype) = match (self.prototypes.diagonal_rail, self.prototypes.rail) {
            (Some(diagonal), _) if length > self.diagonal_threshold => {
                length /= SQRT_2;
                (FencePart::DiagonalRail, diagonal)
            }
            (_, Some(rail)) => (FencePart::Rail, rail),
            (_, None) => {
                debug!(guid = self.guid, "no rail prototype, skipping rail");
                return None;
            }
        };

        let origin = Point3::new(from.0, from.1, from_elevation);
        let chain = rail_chain(origin, direction, length, to_elevation - from_elevation);
        Some(self.instances.insert(PlacedModel {
            part,
            prototype,
            chain,
        }))
    }

    /// Places a post at a plan point. Returns `None` without a post
    /// prototype.
    pub fn place_post(&mut self, x: f64, y: f64, elevation: f64) -> Option<FenceInstanceId> {
        let Some(prototype) = self.prototypes.post else {
            debug!(guid = self.guid, "no post prototype, skipping post");
            return None;
        };
        let chain = vec![NodeTransform::identity("model").placed(Point3::new(x, y, elevation), 0.0)];
        Some(self.instances.insert(PlacedModel {
            part: FencePart::Post,
            prototype,
            chain,
        }))
    }

    #[must_use]
    pub fn get(&self, id: FenceInstanceId) -> Option<&PlacedModel> {
        self.instances.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FenceInstanceId, &PlacedModel)> {
        self.instances.iter()
    }

    /// Number of placed instances of `part`.
    #[must_use]
    pub fn count(&self, part: FencePart) -> usize {
        self.instances.values().filter(|m| m.part == part).count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Removes every rail, diagonal rail and post of this style.
    pub fn clear(&mut self) {
        self.instances.clear();
    }
}

/// Fence collections keyed by catalog GUID, created on first use.
#[derive(Debug, Clone)]
pub struct FenceSet {
    diagonal_threshold: f64,
    collections: BTreeMap<u32, FenceCollection>,
}

impl FenceSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new(diagonal_threshold: f64) -> Self {
        Self {
            diagonal_threshold,
            collections: BTreeMap::new(),
        }
    }

    /// The collection for `guid`, resolving its prototypes on first use.
    pub fn collection_mut<R: AssetResolver + ?Sized>(
        &mut self,
        guid: u32,
        assets: &R,
    ) -> &mut FenceCollection {
        let threshold = self.diagonal_threshold;
        self.collections.entry(guid).or_insert_with(|| {
            FenceCollection::new(guid, FencePrototypes::resolve(assets, guid), threshold)
        })
    }

    #[must_use]
    pub fn get(&self, guid: u32) -> Option<&FenceCollection> {
        self.collections.get(&guid)
    }

    pub fn get_mut(&mut self, guid: u32) -> Option<&mut FenceCollection> {
        self.collections.get_mut(&guid)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FenceCollection> {
        self.collections.values()
    }

    /// Total instances across all styles.
    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.collections.values().map(FenceCollection::len).sum()
    }

    /// Clears every collection, keeping the resolved prototypes.
    pub fn clear(&mut self) {
        for collection in self.collections.values_mut() {
            collection.clear();
        }
    }
}
