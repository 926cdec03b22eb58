//! Tree construction and the flatten pass.
//!
//! Construction is a two-phase protocol: a [`KdTreeBuilder`] collects one
//! bounding box per triangle, then [`KdTreeBuilder::build`] consumes it
//! into an immutable [`KdTree`]. [`KdTree::flatten`] serializes the owned
//! tree into two pointer-free buffers a compute kernel can traverse.

use beamline_math::Point3;

use crate::aabb::Aabb;
use crate::error::{KdTreeError, Result};
use crate::mesh::TriangleMesh;
use crate::node::{build_node, KdNode};

/// Collects per-triangle bounding boxes ahead of a build.
///
/// Registration and building cannot interleave: `build` consumes the
/// builder, and the resulting [`KdTree`] is immutable.
#[derive(Debug, Clone)]
pub struct KdTreeBuilder {
    boxes: Vec<Option<Aabb>>,
}

impl KdTreeBuilder {
    /// Create a builder sized for a known number of triangles.
    pub fn new(num_triangles: usize) -> Self {
        Self {
            boxes: vec![None; num_triangles],
        }
    }

    /// Create a builder with every triangle of `mesh` registered.
    pub fn from_mesh(mesh: &TriangleMesh) -> Result<Self> {
        if mesh.indices.len() % 3 != 0 {
            return Err(KdTreeError::MalformedMesh(format!(
                "index count {} is not a multiple of 3",
                mesh.indices.len()
            )));
        }

        let mut builder = Self::new(mesh.num_triangles());
        for i in 0..mesh.num_triangles() {
            let [p0, p1, p2] = mesh.triangle(i)?;
            builder.set_triangle(i, &p0, &p1, &p2)?;
        }
        Ok(builder)
    }

    /// Register the triangle at `index` from its three corners.
    ///
    /// Registering the same index again overwrites its box; last write
    /// wins. Only the box is retained - vertex data is never read after
    /// this call returns.
    pub fn set_triangle(
        &mut self,
        index: usize,
        p0: &Point3,
        p1: &Point3,
        p2: &Point3,
    ) -> Result<()> {
        if index >= self.boxes.len() {
            return Err(KdTreeError::IndexOutOfRange {
                index,
                count: self.boxes.len(),
            });
        }
        self.boxes[index] = Some(Aabb::from_triangle(p0, p1, p2));
        Ok(())
    }

    /// Build the tree over every registered triangle.
    ///
    /// The root covers the union of all boxes and is split recursively.
    /// Fails if nothing was registered, or if an index inside the range
    /// was skipped.
    pub fn build(self) -> Result<KdTree> {
        if self.boxes.iter().all(Option::is_none) {
            return Err(KdTreeError::EmptyInput);
        }

        let mut boxes = Vec::with_capacity(self.boxes.len());
        for (index, slot) in self.boxes.into_iter().enumerate() {
            match slot {
                Some(aabb) => boxes.push(aabb),
                None => return Err(KdTreeError::MissingTriangle(index)),
            }
        }

        let mut root_box = boxes[0];
        for aabb in &boxes[1..] {
            root_box.join(aabb);
        }

        let triangles: Vec<u32> = (0..boxes.len() as u32).collect();
        let root = build_node(root_box, triangles, &boxes);
        Ok(KdTree { boxes, root })
    }
}

/// An immutable KD-tree over triangle bounding boxes.
#[derive(Debug, Clone)]
pub struct KdTree {
    boxes: Vec<Aabb>,
    root: KdNode,
}

impl KdTree {
    /// Number of triangles the tree was built over.
    pub fn num_triangles(&self) -> usize {
        self.boxes.len()
    }

    /// Bounding box registered for a triangle.
    pub fn triangle_box(&self, index: usize) -> Option<&Aabb> {
        self.boxes.get(index)
    }

    /// Root node of the owned tree.
    pub fn root(&self) -> &KdNode {
        &self.root
    }

    /// Flatten the tree into pointer-free buffers for GPU traversal.
    ///
    /// Returns the node array (index 0 is the root) and the shared
    /// triangle-index array addressed by leaf `(start, count)` ranges.
    /// Nodes are laid out breadth-first, so an internal node's children
    /// always sit at strictly greater positions than the node itself. A
    /// triangle straddling several leaf volumes appears once per leaf.
    pub fn flatten(&self) -> (Vec<FlatNode>, Vec<u32>) {
        let mut worklist: Vec<&KdNode> = vec![&self.root];
        let mut nodes = Vec::new();
        let mut indices = Vec::new();

        let mut next = 0;
        while next < worklist.len() {
            let node = worklist[next];
            next += 1;

            match node {
                KdNode::Leaf { aabb, triangles } => {
                    let start = indices.len() as u32;
                    indices.extend_from_slice(triangles);
                    nodes.push(FlatNode {
                        aabb: *aabb,
                        kind: FlatNodeKind::Leaf {
                            start,
                            count: triangles.len() as u32,
                        },
                    });
                }
                KdNode::Internal { aabb, left, right } => {
                    let left_index = worklist.len() as u32;
                    worklist.push(left);
                    let right_index = worklist.len() as u32;
                    worklist.push(right);
                    nodes.push(FlatNode {
                        aabb: *aabb,
                        kind: FlatNodeKind::Internal {
                            left: left_index,
                            right: right_index,
                        },
                    });
                }
            }
        }

        (nodes, indices)
    }
}

/// One record of the flattened node array.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatNode {
    /// Bounding box of the node's volume.
    pub aabb: Aabb,
    /// Leaf/internal payload.
    pub kind: FlatNodeKind,
}

/// Payload of a flattened node.
///
/// The discriminant is explicit: a leaf is never encoded as an internal
/// record with sentinel child indices, so "child at index 0" stays
/// unambiguous for consumers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlatNodeKind {
    /// Internal node; children are positions in the node array.
    Internal {
        /// Position of the left child.
        left: u32,
        /// Position of the right child.
        right: u32,
    },
    /// Leaf node; its triangles are `indices[start..start + count]`.
    Leaf {
        /// First position in the shared triangle-index array.
        start: u32,
        /// Number of triangle indices.
        count: u32,
    },
}
