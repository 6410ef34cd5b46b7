//! Fence rails and posts placed as model instances.

mod collection;
mod placement;
mod transform;

pub use collection::{
    FenceCollection, FenceInstanceId, FencePart, FencePrototypes, FenceSet, PlacedModel,
};
pub use placement::rail_chain;
pub use transform::{compose, NodeTransform};
