#![warn(missing_docs)]

//! Triangle KD-tree acceleration structure for the beamline renderer.
//!
//! Builds a recursive spatial partition over triangle bounding boxes and
//! serializes it into flat, pointer-free buffers that a massively parallel
//! consumer (a compute kernel) can traverse without following owned
//! pointers.
//!
//! # Architecture
//!
//! - [`Aabb`] - axis-aligned bounding box math
//! - [`KdNode`] - one node of the build-time tree, with the split recursion
//! - [`KdTreeBuilder`] / [`KdTree`] - registration, build, and the flatten pass
//! - [`TriangleMesh`] - flat vertex/index mesh input
//! - [`gpu`] - GPU-ready node records and upload limits
//!
//! # Example
//!
//! ```
//! use beamline_kdtree::{FlatNodeKind, KdTreeBuilder};
//! use beamline_math::Point3;
//!
//! let mut builder = KdTreeBuilder::new(1);
//! builder.set_triangle(
//!     0,
//!     &Point3::new(0.0, 0.0, 0.0),
//!     &Point3::new(1.0, 0.0, 0.0),
//!     &Point3::new(0.0, 1.0, 0.0),
//! )?;
//!
//! let tree = builder.build()?;
//! let (nodes, indices) = tree.flatten();
//! assert_eq!(nodes.len(), 1);
//! assert_eq!(nodes[0].kind, FlatNodeKind::Leaf { start: 0, count: 1 });
//! assert_eq!(indices, vec![0]);
//! # Ok::<(), beamline_kdtree::KdTreeError>(())
//! ```

mod aabb;
mod error;
mod mesh;
mod node;
mod tree;

pub mod gpu;

pub use aabb::Aabb;
pub use error::{KdTreeError, Result};
pub use mesh::TriangleMesh;
pub use node::KdNode;
pub use tree::{FlatNode, FlatNodeKind, KdTree, KdTreeBuilder};
