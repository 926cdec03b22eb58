//! GPU-ready representations of the flattened tree.
//!
//! Records are `#[repr(C)]` and pass through bytemuck, so both buffers can
//! be memcpy'd into GPU memory and traversed by a compute kernel without
//! any fixup.

use bytemuck::{Pod, Zeroable};
use thiserror::Error;

use crate::tree::{FlatNode, FlatNodeKind, KdTree};

/// Maximum node records in a single upload.
pub const MAX_GPU_NODES: usize = 65536;

/// Maximum triangle-index records in a single upload.
pub const MAX_GPU_INDICES: usize = 262144;

/// GPU-compatible KD-tree node.
///
/// Internal nodes carry child positions in `left`/`right`; leaves carry
/// their `start`/`count` range in the index buffer. The unused half of the
/// record is zeroed. Traversal must branch on `is_leaf`, never on a zero
/// child index - a leaf's zeroed `left`/`right` would otherwise be
/// indistinguishable from references to the root.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuKdNode {
    /// AABB minimum corner (w unused).
    pub aabb_min: [f32; 4],
    /// AABB maximum corner (w unused).
    pub aabb_max: [f32; 4],
    /// Position of the left child (internal nodes).
    pub left: u32,
    /// Position of the right child (internal nodes).
    pub right: u32,
    /// First position in the triangle-index buffer (leaves).
    pub start: u32,
    /// Number of triangle indices (leaves).
    pub count: u32,
    /// Leaf flag: 0 = internal, 1 = leaf.
    pub is_leaf: u32,
    /// Padding to a 16-byte multiple.
    pub _pad: [u32; 3],
}

impl GpuKdNode {
    /// Pack one flattened node into the GPU layout.
    pub fn from_flat(node: &FlatNode) -> Self {
        let mut out = Self::zeroed();
        out.aabb_min = [node.aabb.min.x, node.aabb.min.y, node.aabb.min.z, 0.0];
        out.aabb_max = [node.aabb.max.x, node.aabb.max.y, node.aabb.max.z, 0.0];
        match node.kind {
            FlatNodeKind::Internal { left, right } => {
                out.left = left;
                out.right = right;
            }
            FlatNodeKind::Leaf { start, count } => {
                out.start = start;
                out.count = count;
                out.is_leaf = 1;
            }
        }
        out
    }
}

/// Flattened tree data prepared for GPU upload.
#[derive(Debug, Clone)]
pub struct GpuTree {
    /// Node records; index 0 is the root.
    pub nodes: Vec<GpuKdNode>,
    /// Shared triangle-index buffer addressed by leaf ranges.
    pub indices: Vec<u32>,
}

/// Error preparing a tree for GPU upload.
#[derive(Error, Debug)]
pub enum GpuTreeError {
    /// Node buffer exceeds the upload limit.
    #[error("too many KD-tree nodes: {0} (max {max})", max = MAX_GPU_NODES)]
    TooManyNodes(usize),
    /// Index buffer exceeds the upload limit.
    #[error("too many leaf triangle indices: {0} (max {max})", max = MAX_GPU_INDICES)]
    TooManyIndices(usize),
}

impl GpuTree {
    /// Flatten `tree` and pack it into GPU records.
    pub fn from_kdtree(tree: &KdTree) -> Result<Self, GpuTreeError> {
        let (nodes, indices) = tree.flatten();
        Self::from_flat(&nodes, indices)
    }

    /// Pack already-flattened buffers into GPU records.
    pub fn from_flat(nodes: &[FlatNode], indices: Vec<u32>) -> Result<Self, GpuTreeError> {
        if nodes.len() > MAX_GPU_NODES {
            return Err(GpuTreeError::TooManyNodes(nodes.len()));
        }
        if indices.len() > MAX_GPU_INDICES {
            return Err(GpuTreeError::TooManyIndices(indices.len()));
        }

        let nodes = nodes.iter().map(GpuKdNode::from_flat).collect();
        Ok(Self { nodes, indices })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aabb::Aabb;
    use crate::tree::KdTreeBuilder;
    use beamline_math::Point3;

    fn leaf_record(start: u32, count: u32) -> FlatNode {
        FlatNode {
            aabb: Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)),
            kind: FlatNodeKind::Leaf { start, count },
        }
    }

    #[test]
    fn test_record_layout() {
        // The compute kernel indexes the node buffer with a 64-byte stride
        assert_eq!(std::mem::size_of::<GpuKdNode>(), 64);
        assert_eq!(std::mem::align_of::<GpuKdNode>(), 4);
    }

    #[test]
    fn test_pack_leaf_and_internal() {
        let internal = FlatNode {
            aabb: Aabb::new(Point3::new(-1.0, -2.0, -3.0), Point3::new(1.0, 2.0, 3.0)),
            kind: FlatNodeKind::Internal { left: 1, right: 2 },
        };
        let packed = GpuKdNode::from_flat(&internal);
        assert_eq!(packed.aabb_min, [-1.0, -2.0, -3.0, 0.0]);
        assert_eq!(packed.aabb_max, [1.0, 2.0, 3.0, 0.0]);
        assert_eq!((packed.left, packed.right), (1, 2));
        assert_eq!((packed.start, packed.count), (0, 0));
        assert_eq!(packed.is_leaf, 0);

        let packed = GpuKdNode::from_flat(&leaf_record(7, 3));
        assert_eq!((packed.left, packed.right), (0, 0));
        assert_eq!((packed.start, packed.count), (7, 3));
        assert_eq!(packed.is_leaf, 1);
    }

    #[test]
    fn test_from_kdtree() {
        let mut builder = KdTreeBuilder::new(130);
        for i in 0..130 {
            let x = i as f32 * 10.0;
            builder
                .set_triangle(
                    i,
                    &Point3::new(x, 0.0, 0.0),
                    &Point3::new(x + 1.0, 0.0, 0.0),
                    &Point3::new(x, 1.0, 0.0),
                )
                .unwrap();
        }
        let tree = builder.build().unwrap();
        let gpu = GpuTree::from_kdtree(&tree).unwrap();

        // The root splits 130 into two 65s, both above the leaf budget,
        // so each side splits once more.
        assert_eq!(gpu.nodes[0].is_leaf, 0);
        assert_eq!((gpu.nodes[0].left, gpu.nodes[0].right), (1, 2));
        assert_eq!(gpu.indices.len(), 130);

        for (i, node) in gpu.nodes.iter().enumerate() {
            if node.is_leaf == 0 {
                assert!(node.left as usize > i);
                assert!(node.right as usize > i);
            } else {
                assert!((node.start + node.count) as usize <= gpu.indices.len());
            }
        }
    }

    #[test]
    fn test_capacity_limits() {
        let nodes = vec![leaf_record(0, 1); MAX_GPU_NODES + 1];
        assert!(matches!(
            GpuTree::from_flat(&nodes, vec![0]),
            Err(GpuTreeError::TooManyNodes(_))
        ));

        let indices = vec![0u32; MAX_GPU_INDICES + 1];
        assert!(matches!(
            GpuTree::from_flat(&[leaf_record(0, 1)], indices),
            Err(GpuTreeError::TooManyIndices(_))
        ));
    }
}
