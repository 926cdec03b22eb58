#![warn(missing_docs)]

//! Math types for the beamline rendering kernel.
//!
//! Thin wrappers around nalgebra providing the domain-specific types used
//! by the acceleration crates. Everything is single precision: the
//! downstream consumer is a GPU compute kernel fed with `f32` vertex data.

use nalgebra::Vector3;

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f32>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f32>;

/// Tolerance for near-equality tests on geometric quantities.
pub const EPS: f32 = 1e-6;
