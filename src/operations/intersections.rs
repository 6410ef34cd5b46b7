use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::{GraphError, Result};
use crate::lot::{LayerTable, Node, NodeId, WallGraph};
use crate::math::{cross_2d, normalize_2d, Vector2, PARALLEL_TOLERANCE};

/// Upper bound on `tan(half_angle)` for a miter.
///
/// Only reached when a wall doubles back on itself; the sharpest real
/// joint (45 degrees) needs about 2.41.
const MITER_LIMIT: f64 = 8.0;

/// A thick wall segment meeting at an intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IncidentMember {
    /// Index of the segment in the wall graph.
    pub segment: usize,
    /// Distance the left face is pushed along the centerline at this end.
    pub left_extent: f64,
    /// Distance the right face is pushed along the centerline at this end.
    pub right_extent: f64,
}

impl IncidentMember {
    fn new(segment: usize) -> Self {
        Self {
            segment,
            left_extent: 0.0,
            right_extent: 0.0,
        }
    }

    fn unbounded(segment: usize) -> Self {
        Self {
            segment,
            left_extent: f64::INFINITY,
            right_extent: f64::INFINITY,
        }
    }

    fn take_min(&mut self, extent: f64, sign: f64) {
        self.left_extent = self.left_extent.min(extent * sign);
        self.right_extent = self.right_extent.min(-extent * sign);
    }

    fn clear_unbounded(&mut self) {
        if !self.left_extent.is_finite() {
            self.left_extent = 0.0;
        }
        if !self.right_extent.is_finite() {
            self.right_extent = 0.0;
        }
    }
}

/// The thick walls meeting at one graph node.
#[derive(Debug, Clone)]
pub struct Intersection {
    pub node: Node,
    /// Thick segments in the order they joined.
    pub members: Vec<IncidentMember>,
    /// `true` while the node needs no miter: at most one member, or two
    /// collinear members passing straight through.
    pub simple: bool,
}

impl Intersection {
    fn new(node: Node) -> Self {
        Self {
            node,
            members: Vec::new(),
            simple: true,
        }
    }

    /// Whether the end of a wall at this node gets a cap.
    #[must_use]
    pub fn is_capped(&self) -> bool {
        self.simple && self.members.len() == 1
    }

    /// The member entry of `segment`, if it joined this intersection.
    #[must_use]
    pub fn member(&self, segment: usize) -> Option<&IncidentMember> {
        self.members.iter().find(|m| m.segment == segment)
    }
}

/// Intersections of a wall graph keyed by node id.
#[derive(Debug, Clone, Default)]
pub struct Intersections {
    by_node: HashMap<NodeId, Intersection>,
}

impl Intersections {
    /// Intersection at `node`.
    #[must_use]
    pub fn get(&self, node: NodeId) -> Option<&Intersection> {
        self.by_node.get(&node)
    }

    /// Number of intersections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_node.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_node.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Intersection> {
        self.by_node.values()
    }

    /// Intersection at an endpoint of `segment`.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::UnknownNode` if no intersection was built there.
    pub fn at(&self, segment: usize, node: NodeId) -> Result<&Intersection> {
        self.by_node.get(&node).ok_or_else(|| {
            GraphError::UnknownNode {
                segment,
                node: node.0,
            }
            .into()
        })
    }

    /// Member entry for `segment` at `node`.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::MissingMember` if the segment never joined the
    /// intersection, which means the graph and the intersections disagree.
    pub fn member(&self, segment: usize, node: NodeId) -> Result<IncidentMember> {
        self.at(segment, node)?
            .member(segment)
            .copied()
            .ok_or_else(|| {
                GraphError::MissingMember {
                    segment,
                    node: node.0,
                }
                .into()
            })
    }
}

/// Groups thick wall segments by shared endpoint and computes miter
/// extents so adjoining walls meet without gaps or overlaps.
pub struct BuildIntersections<'a> {
    graph: &'a WallGraph,
    layers: &'a LayerTable,
    thickness: f64,
}

impl<'a> BuildIntersections<'a> {
    /// Creates a new `BuildIntersections` operation.
    #[must_use]
    pub fn new(graph: &'a WallGraph, layers: &'a LayerTable, thickness: f64) -> Self {
        Self {
            graph,
            layers,
            thickness,
        }
    }

    /// Executes the pass over all segments in graph order.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::UnknownNode` if a segment references a node
    /// that is not in the graph.
    pub fn execute(&self) -> Result<Intersections> {
        let mut result = Intersections::default();

        for (index, segment) in self.graph.segments().iter().enumerate() {
            let from = *self.graph.segment_node(index, segment.from)?;
            let to = *self.graph.segment_node(index, segment.to)?;

            result
                .by_node
                .entry(from.id)
                .or_insert_with(|| Intersection::new(from));
            result
                .by_node
                .entry(to.id)
                .or_insert_with(|| Intersection::new(to));

            let thick = self
                .layers
                .get(segment.layer)
                .is_some_and(|layer| layer.wall_type.is_thick());
            if !thick {
                continue;
            }

            for (node, entering) in [(from.id, false), (to.id, true)] {
                if let Some(intersection) = result.by_node.get_mut(&node) {
                    self.add_member(intersection, index, entering)?;
                }
            }
        }

        debug!(
            intersections = result.len(),
            segments = self.graph.segments().len(),
            "built wall intersections"
        );
        Ok(result)
    }

    /// Adds `segment` to `intersection`, revising the extents of every
    /// member already there.
    ///
    /// `entering` is true when the intersection is the segment's `to` end.
    fn add_member(&self, intersection: &mut Intersection, segment: usize, entering: bool) -> Result<()> {
        if intersection.members.is_empty() {
            intersection.members.push(IncidentMember::new(segment));
            return Ok(());
        }

        let here = intersection.node;
        let line = self.graph.segments()[segment];
        let far = self.graph.segment_node(segment, line.other_end(here.id))?;

        let Some(incoming) = normalize_2d(here.point() - far.point()) else {
            warn!(segment, node = here.id.0, "zero-length wall at intersection");
            intersection.members.push(IncidentMember::new(segment));
            intersection.simple = false;
            return Ok(());
        };

        let count = intersection.members.len();
        let new_sign = if entering { 1.0 } else { -1.0 };
        let mut joined = IncidentMember::unbounded(segment);

        for i in 0..count {
            let mut other = intersection.members[i];
            let other_line = self.graph.segments()[other.segment];
            let other_leaves = other_line.from == here.id;
            let other_far = self.graph.segment_node(other.segment, other_line.other_end(here.id))?;

            let Some(outgoing) = normalize_2d(other_far.point() - here.point()) else {
                continue;
            };

            let dot = incoming.dot(&outgoing);
            if count == 1 && (dot - 1.0).abs() < PARALLEL_TOLERANCE {
                // Straight pass-through: no miter, still simple.
                joined = IncidentMember::new(segment);
                break;
            }

            let extent = self.miter_extent(&incoming, &outgoing, dot);

            joined.take_min(extent, new_sign);

            if count == 1 {
                other = IncidentMember::unbounded(other.segment);
            }
            let other_sign = if other_leaves { 1.0 } else { -1.0 };
            other.take_min(extent, other_sign);
            other.clear_unbounded();

            intersection.members[i] = other;
            intersection.simple = false;
        }

        joined.clear_unbounded();
        intersection.members.push(joined);
        Ok(())
    }

    /// Push-out distance for a face at a joint between an incoming and an
    /// outgoing direction.
    fn miter_extent(&self, incoming: &Vector2, outgoing: &Vector2, dot: f64) -> f64 {
        let sign = if cross_2d(incoming, outgoing) < 0.0 { -1.0 } else { 1.0 };
        let half_angle = dot.clamp(-1.0, 1.0).acos() * sign / 2.0;
        self.thickness * half_angle.tan().clamp(-MITER_LIMIT, MITER_LIMIT)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::lot::{Layer, Segment, NO_SURFACE};
    use approx::assert_relative_eq;

    const T: f64 = 0.075;
    const WALL: u32 = 1;
    const DECK: u32 = 2;

    fn layers() -> LayerTable {
        [
            Layer::new(WALL, 1, 0, 0),
            Layer::new(DECK, 16, NO_SURFACE, NO_SURFACE),
        ]
        .into_iter()
        .collect()
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

    fn build(g: &WallGraph) -> Intersections {
        BuildIntersections::new(g, &layers(), T).execute().unwrap()
    }

    #[test]
    fn straight_pass_through_stays_simple() {
        let g = graph(
            &[(1, 0.0, 0.0), (2, 1.0, 0.0), (3, 2.0, 0.0)],
            &[(1, 2, WALL), (2, 3, WALL)],
        );
        let ix = build(&g);
        let mid = ix.get(NodeId(2)).unwrap();
        assert!(mid.simple);
        assert_eq!(mid.members.len(), 2);
        for m in &mid.members {
            assert_relative_eq!(m.left_extent, 0.0);
            assert_relative_eq!(m.right_extent, 0.0);
        }
        assert!(!mid.is_capped());
        assert!(ix.get(NodeId(1)).unwrap().is_capped());
        assert!(ix.get(NodeId(3)).unwrap().is_capped());
    }

    #[test]
    fn right_angle_corner_meets_at_outer_and_inner_corner() {
        let g = graph(
            &[(1, 0.0, 0.0), (2, 10.0, 0.0), (3, 10.0, 10.0)],
            &[(1, 2, WALL), (2, 3, WALL)],
        );
        let ix = build(&g);
        let corner = ix.get(NodeId(2)).unwrap();
        assert!(!corner.simple);

        let incoming = corner.member(0).unwrap();
        let outgoing = corner.member(1).unwrap();
        assert_relative_eq!(incoming.left_extent, T, epsilon = 1e-12);
        assert_relative_eq!(incoming.right_extent, -T, epsilon = 1e-12);
        assert_relative_eq!(outgoing.left_extent, T, epsilon = 1e-12);
        assert_relative_eq!(outgoing.right_extent, -T, epsilon = 1e-12);
    }

    #[test]
    fn thin_segments_never_join() {
        let g = graph(
            &[(1, 0.0, 0.0), (2, 1.0, 0.0), (3, 1.0, 1.0)],
            &[(1, 2, DECK), (2, 3, DECK), (3, 1, 99)],
        );
        let ix = build(&g);
        assert_eq!(ix.len(), 3);
        assert!(ix.iter().all(|i| i.members.is_empty() && i.simple));
        assert!(ix.member(0, NodeId(1)).is_err());
    }

    #[test]
    fn many_way_junction_extents_are_finite_and_shrink() {
        // Walls radiating from node 0 in six directions, including a
        // 45 degree diagonal and a wall doubling back over another.
        let g = graph(
            &[
                (0, 5.0, 5.0),
                (1, 0.0, 5.0),
                (2, 5.0, 10.0),
                (3, 10.0, 10.0),
                (4, 10.0, 5.0),
                (5, 5.0, 0.0),
                (6, 2.0, 5.0),
            ],
            &[
                (1, 0, WALL),
                (0, 2, WALL),
                (0, 3, WALL),
                (4, 0, WALL),
                (0, 5, WALL),
                (6, 0, WALL),
            ],
        );

        let mut previous: Option<Intersection> = None;
        for n in 2..=g.segments().len() {
            let mut partial = WallGraph::new(0, 1);
            for id in 0..=6 {
                partial.add_node(*g.node(NodeId(id)).unwrap());
            }
            for s in &g.segments()[..n] {
                partial.add_segment(*s);
            }
            let ix = build(&partial);
            let centre = ix.get(NodeId(0)).unwrap().clone();
            assert!(!centre.simple);
            for m in &centre.members {
                assert!(m.left_extent.is_finite() && m.right_extent.is_finite());
            }
            if let Some(prev) = previous.filter(|p| p.members.len() >= 2) {
                for old in &prev.members {
                    let now = centre.member(old.segment).unwrap();
                    assert!(now.left_extent <= old.left_extent + 1e-12);
                    assert!(now.right_extent <= old.right_extent + 1e-12);
                }
            }
            previous = Some(centre);
        }
    }

    #[test]
    fn three_way_junction_is_never_capped() {
        let g = graph(
            &[(1, 0.0, 0.0), (2, 1.0, 0.0), (3, 2.0, 0.0), (4, 1.0, 1.0)],
            &[(1, 2, WALL), (2, 3, WALL), (2, 4, WALL)],
        );
        let ix = build(&g);
        let tee = ix.get(NodeId(2)).unwrap();
        assert_eq!(tee.members.len(), 3);
        assert!(!tee.simple);
        assert!(!tee.is_capped());
    }

    #[test]
    fn unknown_node_fails() {
        let g = graph(&[(1, 0.0, 0.0)], &[(1, 7, WALL)]);
        assert!(BuildIntersections::new(&g, &layers(), T).execute().is_err());
    }
}
