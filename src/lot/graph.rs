use std::collections::HashMap;

use crate::error::{GraphError, Result};
use crate::math::Point2;

/// Identifier of a node in the wall graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// A wall graph position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub id: NodeId,
    /// Plan x coordinate.
    pub x: f64,
    /// Plan y coordinate.
    pub y: f64,
    /// Absolute floor level.
    pub level: i32,
}

impl Node {
    /// Creates a new node.
    #[must_use]
    pub fn new(id: u32, x: f64, y: f64, level: i32) -> Self {
        Self {
            id: NodeId(id),
            x,
            y,
            level,
        }
    }

    /// Plan position of the node.
    #[must_use]
    pub fn point(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

/// A wall graph line between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub from: NodeId,
    pub to: NodeId,
    /// Key into the [`LayerTable`](super::LayerTable).
    pub layer: u32,
}

impl Segment {
    /// Creates a new segment.
    #[must_use]
    pub fn new(from: u32, to: u32, layer: u32) -> Self {
        Self {
            from: NodeId(from),
            to: NodeId(to),
            layer,
        }
    }

    /// Returns the endpoint opposite `node`.
    #[must_use]
    pub fn other_end(&self, node: NodeId) -> NodeId {
        if self.from == node {
            self.to
        } else {
            self.from
        }
    }
}

/// Planar graph of wall nodes and segments, spanning one or more floors.
///
/// Segment indices are stable and used as identities by the builder.
#[derive(Debug, Clone, Default)]
pub struct WallGraph {
    /// Level of the lowest floor.
    pub base_floor: i32,
    /// Number of floors described by the graph.
    pub floors: usize,
    nodes: HashMap<NodeId, Node>,
    segments: Vec<Segment>,
}

impl WallGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new(base_floor: i32, floors: usize) -> Self {
        Self {
            base_floor,
            floors,
            ..Self::default()
        }
    }

    /// Inserts or replaces a node.
    pub fn add_node(&mut self, node: Node) {
        self.nodes.insert(node.id, node);
    }

    /// Appends a segment and returns its index.
    pub fn add_segment(&mut self, segment: Segment) -> usize {
        self.segments.push(segment);
        self.segments.len() - 1
    }

    /// All segments in graph order.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Looks up a node by id.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Looks up a node referenced by segment `segment`.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::UnknownNode` if the node is not part of the graph.
    pub fn segment_node(&self, segment: usize, id: NodeId) -> Result<&Node> {
        self.nodes.get(&id).ok_or_else(|| {
            GraphError::UnknownNode {
                segment,
                node: id.0,
            }
            .into()
        })
    }

    /// Converts an absolute level into a zero-based floor index.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::FloorOutOfRange` if the level lies outside the
    /// floors described by the graph.
    pub fn floor_index(&self, level: i32) -> Result<usize> {
        let end = self
            .base_floor
            .saturating_add(i32::try_from(self.floors).unwrap_or(i32::MAX));
        if level < self.base_floor || level >= end {
            return Err(GraphError::FloorOutOfRange {
                level,
                base: self.base_floor,
                end,
            }
            .into());
        }
        usize::try_from(level - self.base_floor).map_err(|_| {
            GraphError::FloorOutOfRange {
                level,
                base: self.base_floor,
                end,
            }
            .into()
        })
    }
}
