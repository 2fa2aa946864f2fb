//! Parser, forward kinematics and CSV export for BVH motion capture files.
//!
//! BVH (Biovision Hierarchy) is a text format describing a skeletal joint
//! hierarchy and per-frame animation channel samples. This crate parses the
//! format into an immutable, index-based joint tree, computes per-joint
//! world-space transforms by composing local transforms down the hierarchy
//! (forward kinematics), and flattens both the raw rotation channels and the
//! computed world locations into CSV tables.
//!
//! # Examples
//!
//! ```no_run
//! use bvh_anim::{BvhFile, FkOptions, compute_world_transforms, export};
//!
//! let bvh = BvhFile::load("walk.bvh")?;
//! let world = compute_world_transforms(&bvh, &FkOptions::default())?;
//!
//! let mut locations = Vec::new();
//! export::write_locations(&bvh, &world, &mut locations)?;
//! # Ok::<(), bvh_anim::BvhError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod export;
pub mod fk;
pub mod parser;
pub mod types;

pub use error::{BvhError, Result};
pub use fk::{FkOptions, RotationOrder, WorldTransforms, compute_world_transforms};
pub use types::{Axis, BvhFile, Channel, EndSite, Joint, Motion, Skeleton};
