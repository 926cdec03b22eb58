//! Build-time tree nodes and the recursive split.

use crate::aabb::Aabb;

/// Per-leaf triangle budget. Nodes at or below this size stop subdividing.
/// A fixed policy constant, not derived from the geometry.
pub(crate) const LEAF_SIZE: usize = 64;

/// A KD-tree node - either a leaf holding triangle indices or an internal
/// node with two children.
#[derive(Debug, Clone)]
pub enum KdNode {
    /// Leaf node holding triangle indices directly.
    Leaf {
        /// Axis-aligned bounding box of this node's volume.
        aabb: Aabb,
        /// Indices of every triangle whose box reaches this volume.
        triangles: Vec<u32>,
    },
    /// Internal node with two children.
    Internal {
        /// Axis-aligned bounding box of this node's volume.
        aabb: Aabb,
        /// Child covering the low side of the split plane.
        left: Box<KdNode>,
        /// Child covering the high side of the split plane.
        right: Box<KdNode>,
    },
}

impl KdNode {
    /// Bounding box of this node's volume.
    pub fn aabb(&self) -> Aabb {
        match self {
            Self::Leaf { aabb, .. } => *aabb,
            Self::Internal { aabb, .. } => *aabb,
        }
    }

    /// True if this node has no children.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf { .. })
    }
}

/// Build a KD-tree node recursively.
///
/// `triangles` holds the indices whose boxes reach `aabb`; `boxes` is the
/// full per-triangle box array. Cannot fail: geometry that refuses to
/// partition simply stays a leaf.
pub(crate) fn build_node(aabb: Aabb, triangles: Vec<u32>, boxes: &[Aabb]) -> KdNode {
    // Base case: few enough triangles -> leaf
    if triangles.len() <= LEAF_SIZE {
        return KdNode::Leaf { aabb, triangles };
    }

    // Candidate split per axis at the box center; keep the axis with the
    // smallest total membership (a straddling triangle counts twice).
    // First minimum wins on ties.
    let mut axis = 0;
    let (mut left_set, mut right_set) = partition_axis(&aabb, &triangles, boxes, 0);
    for candidate in 1..3 {
        let (l, r) = partition_axis(&aabb, &triangles, boxes, candidate);
        if l.len() + r.len() < left_set.len() + right_set.len() {
            axis = candidate;
            left_set = l;
            right_set = r;
        }
    }

    // Reject splits that fail to strictly shrink both sides; recursing on
    // an equal-sized set would never terminate.
    if left_set.len() >= triangles.len() || right_set.len() >= triangles.len() {
        return KdNode::Leaf { aabb, triangles };
    }

    let (left_box, right_box) = split_boxes(&aabb, axis);
    KdNode::Internal {
        aabb,
        left: Box::new(build_node(left_box, left_set, boxes)),
        right: Box::new(build_node(right_box, right_set, boxes)),
    }
}

/// Halve `aabb` at its center along `axis`.
fn split_boxes(aabb: &Aabb, axis: usize) -> (Aabb, Aabb) {
    let center = aabb.center()[axis];
    let mut left = *aabb;
    let mut right = *aabb;
    left.max[axis] = center;
    right.min[axis] = center;
    (left, right)
}

/// Partition `triangles` against the two half-boxes of `aabb` on `axis`.
///
/// A triangle whose box straddles the plane lands in both halves; the
/// duplication is required so the triangle stays reachable from every leaf
/// volume it can affect.
fn partition_axis(
    aabb: &Aabb,
    triangles: &[u32],
    boxes: &[Aabb],
    axis: usize,
) -> (Vec<u32>, Vec<u32>) {
    let (left_box, right_box) = split_boxes(aabb, axis);
    let mut left = Vec::new();
    let mut right = Vec::new();

    for &tri in triangles {
        let tri_box = &boxes[tri as usize];
        if tri_box.overlaps(&left_box) {
            left.push(tri);
        }
        if tri_box.overlaps(&right_box) {
            right.push(tri);
        }
    }

    (left, right)
}
