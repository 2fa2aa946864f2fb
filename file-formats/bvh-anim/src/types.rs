//! Core data types for BVH skeleton hierarchies and motion data
//!
//! The skeleton is stored as a flat vector of joints in hierarchy document
//! order. Children reference their parent by index and parents list their
//! children by index, so the tree stays immutable and cycle-free. Because
//! BVH writes the hierarchy depth-first, a joint's parent index is always
//! smaller than its own index; the parser validates this, and the forward
//! kinematics pass relies on it.

use std::fmt;

use glam::DVec3;

/// A coordinate axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// X axis
    X,
    /// Y axis
    Y,
    /// Z axis
    Z,
}

impl Axis {
    /// Lowercase letter used in CSV column names
    pub fn letter(self) -> char {
        match self {
            Self::X => 'x',
            Self::Y => 'y',
            Self::Z => 'z',
        }
    }
}

/// One animated degree of freedom, as declared on a `CHANNELS` line
///
/// The declaration order of a joint's channels is authoritative: it fixes
/// the layout of the motion rows and the rotation composition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Translation along X (`Xposition`)
    XPosition,
    /// Translation along Y (`Yposition`)
    YPosition,
    /// Translation along Z (`Zposition`)
    ZPosition,
    /// Rotation about X (`Xrotation`), degrees
    XRotation,
    /// Rotation about Y (`Yrotation`), degrees
    YRotation,
    /// Rotation about Z (`Zrotation`), degrees
    ZRotation,
}

impl Channel {
    /// Parses a BVH channel keyword such as `Xposition` or `Zrotation`
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "Xposition" => Some(Self::XPosition),
            "Yposition" => Some(Self::YPosition),
            "Zposition" => Some(Self::ZPosition),
            "Xrotation" => Some(Self::XRotation),
            "Yrotation" => Some(Self::YRotation),
            "Zrotation" => Some(Self::ZRotation),
            _ => None,
        }
    }

    /// The axis this channel animates
    pub fn axis(self) -> Axis {
        match self {
            Self::XPosition | Self::XRotation => Axis::X,
            Self::YPosition | Self::YRotation => Axis::Y,
            Self::ZPosition | Self::ZRotation => Axis::Z,
        }
    }

    /// Whether this is a rotation channel
    pub fn is_rotation(self) -> bool {
        matches!(self, Self::XRotation | Self::YRotation | Self::ZRotation)
    }

    /// Whether this is a translation channel
    pub fn is_position(self) -> bool {
        !self.is_rotation()
    }

    /// The BVH keyword for this channel
    pub fn keyword(self) -> &'static str {
        match self {
            Self::XPosition => "Xposition",
            Self::YPosition => "Yposition",
            Self::ZPosition => "Zposition",
            Self::XRotation => "Xrotation",
            Self::YRotation => "Yrotation",
            Self::ZRotation => "Zrotation",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A terminal `End Site` marker: a bone tip with a fixed offset and no channels
#[derive(Debug, Clone, PartialEq)]
pub struct EndSite {
    /// Name from the source, if it carried one beyond the generic `End Site`
    pub name: Option<String>,
    /// Fixed offset relative to the owning joint
    pub offset: DVec3,
}

/// A joint in the skeleton hierarchy
#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    /// Joint name, unique within the skeleton
    pub name: String,
    /// Parent joint index; `None` only for the root
    pub parent: Option<usize>,
    /// Child joint indices, in declaration order
    pub children: Vec<usize>,
    /// Fixed offset relative to the parent, constant across frames
    pub offset: DVec3,
    /// Animated channels, in declaration order
    pub channels: Vec<Channel>,
    /// Column index of this joint's first channel within a motion row
    pub channel_base: usize,
    /// Optional End Site terminating this joint's bone
    pub end_site: Option<EndSite>,
}

impl Joint {
    /// Rotation channels in declaration order, paired with their absolute
    /// column index within a motion row
    pub fn rotation_channels(&self) -> impl Iterator<Item = (usize, Channel)> + '_ {
        self.channels
            .iter()
            .enumerate()
            .filter(|(_, channel)| channel.is_rotation())
            .map(move |(i, channel)| (self.channel_base + i, *channel))
    }

    /// Translation channels in declaration order, paired with their absolute
    /// column index within a motion row
    pub fn position_channels(&self) -> impl Iterator<Item = (usize, Channel)> + '_ {
        self.channels
            .iter()
            .enumerate()
            .filter(|(_, channel)| channel.is_position())
            .map(move |(i, channel)| (self.channel_base + i, *channel))
    }
}

/// A parsed skeleton hierarchy
///
/// Joints are held in document order, which is a depth-first traversal of
/// the tree with the single root at index 0.
#[derive(Debug, Clone, PartialEq)]
pub struct Skeleton {
    joints: Vec<Joint>,
    channel_count: usize,
}

impl Skeleton {
    pub(crate) fn new(joints: Vec<Joint>) -> Self {
        let channel_count = joints.iter().map(|j| j.channels.len()).sum();
        Self {
            joints,
            channel_count,
        }
    }

    /// All joints in document order
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    /// The joint at `index`
    pub fn joint(&self, index: usize) -> &Joint {
        &self.joints[index]
    }

    /// Number of joints (End Sites not counted)
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    /// Whether the skeleton has no joints
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Total number of channels across all joints, i.e. the width of one
    /// motion row
    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// Resolved name for the End Site of the joint at `index`, if it has one
    ///
    /// Unnamed End Sites get a synthetic `{joint}_End` name so that CSV
    /// column names stay unique.
    pub fn end_site_name(&self, index: usize) -> Option<String> {
        let joint = &self.joints[index];
        joint.end_site.as_ref().map(|end| {
            end.name
                .clone()
                .unwrap_or_else(|| format!("{}_End", joint.name))
        })
    }
}

/// Sampled per-frame channel values from the MOTION section
#[derive(Debug, Clone, PartialEq)]
pub struct Motion {
    frame_count: usize,
    frame_time: f64,
    channels_per_frame: usize,
    /// Row-major, `frame_count * channels_per_frame` values
    samples: Vec<f64>,
}

impl Motion {
    pub(crate) fn new(
        frame_count: usize,
        frame_time: f64,
        channels_per_frame: usize,
        samples: Vec<f64>,
    ) -> Self {
        debug_assert_eq!(samples.len(), frame_count * channels_per_frame);
        Self {
            frame_count,
            frame_time,
            channels_per_frame,
            samples,
        }
    }

    /// Number of animation frames
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Duration of one frame in seconds
    pub fn frame_time(&self) -> f64 {
        self.frame_time
    }

    /// Time in seconds of the frame at `index`
    pub fn frame_seconds(&self, index: usize) -> f64 {
        index as f64 * self.frame_time
    }

    /// All channel values of one frame, in declaration order
    pub fn frame(&self, index: usize) -> &[f64] {
        let start = index * self.channels_per_frame;
        &self.samples[start..start + self.channels_per_frame]
    }

    /// The channel values of one joint at one frame
    pub fn joint_frame(&self, joint: &Joint, frame: usize) -> &[f64] {
        let row = self.frame(frame);
        &row[joint.channel_base..joint.channel_base + joint.channels.len()]
    }
}

/// A fully parsed BVH file: skeleton hierarchy plus motion samples
#[derive(Debug, Clone, PartialEq)]
pub struct BvhFile {
    /// The joint hierarchy
    pub skeleton: Skeleton,
    /// The per-frame channel samples
    pub motion: Motion,
}
