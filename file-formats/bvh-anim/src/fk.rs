//! Forward kinematics over a parsed BVH hierarchy
//!
//! Computes one world-space affine transform per joint per frame by
//! composing local transforms down the hierarchy from the root. A joint's
//! local rotation comes from its rotation channels; its local translation is
//! the channel-provided position at the root and the fixed offset
//! everywhere else. Results go into a [`WorldTransforms`] side table keyed
//! by joint index, leaving the parsed tree untouched.

use glam::{DAffine3, DMat3, DVec3};

use crate::error::{BvhError, Result};
use crate::types::{Axis, BvhFile, Channel, Joint};

/// Options controlling forward kinematics
#[derive(Debug, Clone)]
pub struct FkOptions {
    /// Uniform factor applied to the root translation and every fixed
    /// offset. Rotations are unaffected.
    pub scale: f64,
    /// Whether to compute world transforms for End Sites as well
    pub include_end_sites: bool,
}

impl Default for FkOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            include_end_sites: false,
        }
    }
}

/// The six orders in which three distinct axis rotations can be declared
///
/// BVH channel order defines the order in which elemental rotations are
/// applied when going from local to parent space: the last-declared channel
/// rotates first. In column-vector convention that makes the first-declared
/// axis the leftmost factor, which is what [`RotationOrder::matrix`]
/// produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RotationOrder {
    /// Declared X, Y, Z
    Xyz,
    /// Declared X, Z, Y
    Xzy,
    /// Declared Y, X, Z
    Yxz,
    /// Declared Y, Z, X
    Yzx,
    /// Declared Z, X, Y
    Zxy,
    /// Declared Z, Y, X
    Zyx,
}

impl RotationOrder {
    /// The order matching three declared rotation axes, or `None` if the
    /// axes are not a permutation of X, Y, Z
    pub fn from_axes(axes: [Axis; 3]) -> Option<Self> {
        match axes {
            [Axis::X, Axis::Y, Axis::Z] => Some(Self::Xyz),
            [Axis::X, Axis::Z, Axis::Y] => Some(Self::Xzy),
            [Axis::Y, Axis::X, Axis::Z] => Some(Self::Yxz),
            [Axis::Y, Axis::Z, Axis::X] => Some(Self::Yzx),
            [Axis::Z, Axis::X, Axis::Y] => Some(Self::Zxy),
            [Axis::Z, Axis::Y, Axis::X] => Some(Self::Zyx),
            _ => None,
        }
    }

    /// Composes the rotation matrix for per-axis angles in radians
    ///
    /// `x`, `y`, `z` are the angles about the respective axes regardless of
    /// declaration order; the order only decides the composition.
    pub fn matrix(self, x: f64, y: f64, z: f64) -> DMat3 {
        let rx = DMat3::from_rotation_x(x);
        let ry = DMat3::from_rotation_y(y);
        let rz = DMat3::from_rotation_z(z);
        match self {
            Self::Xyz => rx * ry * rz,
            Self::Xzy => rx * rz * ry,
            Self::Yxz => ry * rx * rz,
            Self::Yzx => ry * rz * rx,
            Self::Zxy => rz * rx * ry,
            Self::Zyx => rz * ry * rx,
        }
    }
}

fn axis_rotation(axis: Axis, radians: f64) -> DMat3 {
    match axis {
        Axis::X => DMat3::from_rotation_x(radians),
        Axis::Y => DMat3::from_rotation_y(radians),
        Axis::Z => DMat3::from_rotation_z(radians),
    }
}

/// Composes one frame's local rotation matrix from a joint's channel list
/// and the matching slice of sampled values (degrees)
///
/// Complete axis triplets go through the [`RotationOrder`] table. Joints
/// with fewer than three rotation channels, or with a repeated axis, are
/// composed channel by channel in declared order; axes without a channel
/// contribute no rotation. Position channels in `channels` are skipped.
pub fn compose_rotation(channels: &[Channel], values: &[f64]) -> DMat3 {
    let rotations: Vec<(Axis, f64)> = channels
        .iter()
        .zip(values)
        .filter(|(channel, _)| channel.is_rotation())
        .map(|(channel, value)| (channel.axis(), value.to_radians()))
        .collect();

    if let [(a0, r0), (a1, r1), (a2, r2)] = rotations[..] {
        if let Some(order) = RotationOrder::from_axes([a0, a1, a2]) {
            let mut x = 0.0;
            let mut y = 0.0;
            let mut z = 0.0;
            for (axis, radians) in [(a0, r0), (a1, r1), (a2, r2)] {
                match axis {
                    Axis::X => x = radians,
                    Axis::Y => y = radians,
                    Axis::Z => z = radians,
                }
            }
            return order.matrix(x, y, z);
        }
    }

    rotations
        .iter()
        .fold(DMat3::IDENTITY, |acc, &(axis, radians)| {
            acc * axis_rotation(axis, radians)
        })
}

/// Per-joint, per-frame world transforms produced by one FK pass
///
/// Owned by the conversion run that computed it and discarded after
/// emission; the parsed tree is never mutated.
#[derive(Debug, Clone)]
pub struct WorldTransforms {
    joints: Vec<Vec<DAffine3>>,
    end_sites: Vec<Option<Vec<DAffine3>>>,
    include_end_sites: bool,
}

impl WorldTransforms {
    /// World transforms of the joint at `index`, one per frame
    pub fn joint(&self, index: usize) -> &[DAffine3] {
        &self.joints[index]
    }

    /// World transforms of the End Site owned by the joint at `index`, if
    /// that joint has one and End Sites were requested
    pub fn end_site(&self, index: usize) -> Option<&[DAffine3]> {
        self.end_sites[index].as_deref()
    }

    /// Whether End Site transforms were computed
    pub fn includes_end_sites(&self) -> bool {
        self.include_end_sites
    }
}

/// Runs forward kinematics over every joint and frame
///
/// Joints are visited in document order, so every parent is finished before
/// its children; the world transform of joint `j` at frame `f` is the
/// parent's world transform at `f` composed with `j`'s local transform at
/// `f`. The root has no parent, so its world transform equals its local
/// one.
pub fn compute_world_transforms(bvh: &BvhFile, options: &FkOptions) -> Result<WorldTransforms> {
    let skeleton = &bvh.skeleton;
    if skeleton.is_empty() {
        return Err(BvhError::MissingRoot);
    }

    let frames = bvh.motion.frame_count();
    let mut joints: Vec<Vec<DAffine3>> = Vec::with_capacity(skeleton.len());
    let mut end_sites = Vec::with_capacity(skeleton.len());

    for joint in skeleton.joints() {
        let mut world = Vec::with_capacity(frames);
        for frame in 0..frames {
            let values = bvh.motion.joint_frame(joint, frame);
            let rotation = compose_rotation(&joint.channels, values);
            // Non-root joints place themselves with the fixed offset; any
            // position channels they carry are ignored for world placement.
            let translation = match joint.parent {
                None => root_translation(joint, values) * options.scale,
                Some(_) => joint.offset * options.scale,
            };
            let local = DAffine3::from_mat3_translation(rotation, translation);
            let transform = match joint.parent {
                None => local,
                Some(parent) => joints[parent][frame] * local,
            };
            world.push(transform);
        }

        let ends = if options.include_end_sites {
            joint.end_site.as_ref().map(|end| {
                let local = DAffine3::from_translation(end.offset * options.scale);
                world.iter().map(|parent| *parent * local).collect()
            })
        } else {
            None
        };

        joints.push(world);
        end_sites.push(ends);
    }

    log::trace!(
        "world transforms ready: {} joints, {} frames, scale {}",
        joints.len(),
        frames,
        options.scale
    );
    Ok(WorldTransforms {
        joints,
        end_sites,
        include_end_sites: options.include_end_sites,
    })
}

fn root_translation(joint: &Joint, values: &[f64]) -> DVec3 {
    let mut translation = DVec3::ZERO;
    for (i, channel) in joint.channels.iter().enumerate() {
        if channel.is_position() {
            match channel.axis() {
                Axis::X => translation.x = values[i],
                Axis::Y => translation.y = values[i],
                Axis::Z => translation.z = values[i],
            }
        }
    }
    translation
}
