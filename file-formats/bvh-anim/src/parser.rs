//! Text parser for BVH files
//!
//! BVH is a line-oriented text format with two sections: `HIERARCHY`
//! (nested `ROOT`/`JOINT`/`End Site` blocks carrying `OFFSET` and
//! `CHANNELS` declarations) and `MOTION` (frame count, frame time, then one
//! whitespace-delimited row of channel values per frame, in declaration
//! order). Parsing is strict: a missing root, malformed declarations or a
//! motion row that does not match the declared channel count all abort the
//! conversion for that file.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use glam::DVec3;

use crate::error::{BvhError, Result};
use crate::types::{BvhFile, Channel, EndSite, Joint, Motion, Skeleton};

impl BvhFile {
    /// Reads and parses a BVH file from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::parse(BufReader::new(file))
    }

    /// Parses a BVH file from a reader
    pub fn parse<R: BufRead>(reader: R) -> Result<Self> {
        parse(reader)
    }
}

/// Parses a BVH file from a reader
pub fn parse<R: BufRead>(reader: R) -> Result<BvhFile> {
    let lines = reader.lines().collect::<std::io::Result<Vec<_>>>()?;
    let mut cursor = Cursor::new(lines);

    let (line, text) = cursor.expect("HIERARCHY keyword")?;
    if text != "HIERARCHY" {
        return Err(BvhError::parse(line, "expected HIERARCHY"));
    }

    let (line, text) = cursor.expect("ROOT declaration")?;
    let root_name = match text.split_whitespace().collect::<Vec<_>>()[..] {
        ["ROOT", name] => name.to_string(),
        ["MOTION"] => return Err(BvhError::MissingRoot),
        _ => return Err(BvhError::parse(line, "expected ROOT declaration")),
    };

    let mut joints = Vec::new();
    let mut channel_base = 0;
    parse_joint_block(&mut cursor, root_name, None, &mut joints, &mut channel_base)?;

    let (line, text) = cursor.expect("MOTION keyword")?;
    if text.starts_with("ROOT") {
        return Err(BvhError::parse(line, "multiple ROOT joints are not supported"));
    }
    if text != "MOTION" {
        return Err(BvhError::parse(line, "expected MOTION"));
    }

    let skeleton = Skeleton::new(joints);
    let motion = parse_motion(&mut cursor, skeleton.channel_count())?;
    log::debug!(
        "parsed BVH: {} joints, {} channels, {} frames",
        skeleton.len(),
        skeleton.channel_count(),
        motion.frame_count()
    );

    Ok(BvhFile { skeleton, motion })
}

/// Parses the body of one `ROOT`/`JOINT` block, recursing into nested
/// joints. Returns the index of the created joint.
fn parse_joint_block(
    cursor: &mut Cursor,
    name: String,
    parent: Option<usize>,
    joints: &mut Vec<Joint>,
    channel_base: &mut usize,
) -> Result<usize> {
    expect_token(cursor, "{")?;

    // Push first so joints stay in document order and every parent index is
    // smaller than its children's.
    let index = joints.len();
    joints.push(Joint {
        name,
        parent,
        children: Vec::new(),
        offset: DVec3::ZERO,
        channels: Vec::new(),
        channel_base: 0,
        end_site: None,
    });

    loop {
        let (line, text) = cursor.expect("joint block contents")?;
        let tokens: Vec<&str> = text.split_whitespace().collect();
        match tokens[..] {
            ["}"] => return Ok(index),
            ["OFFSET", x, y, z] => {
                joints[index].offset = parse_vec3(line, x, y, z)?;
            }
            ["CHANNELS", count, ..] => {
                let declared: usize = count
                    .parse()
                    .map_err(|_| BvhError::parse(line, "invalid CHANNELS count"))?;
                let names = &tokens[2..];
                if names.len() != declared {
                    return Err(BvhError::parse(
                        line,
                        format!(
                            "CHANNELS declares {declared} channels but lists {}",
                            names.len()
                        ),
                    ));
                }
                let mut channels = Vec::with_capacity(declared);
                for keyword in names {
                    let channel = Channel::from_keyword(keyword).ok_or_else(|| {
                        BvhError::parse(line, format!("unknown channel '{keyword}'"))
                    })?;
                    channels.push(channel);
                }
                joints[index].channel_base = *channel_base;
                *channel_base += channels.len();
                joints[index].channels = channels;
            }
            ["JOINT", child_name] => {
                let child = parse_joint_block(
                    cursor,
                    child_name.to_string(),
                    Some(index),
                    joints,
                    channel_base,
                )?;
                joints[index].children.push(child);
            }
            ["End", "Site", ..] => {
                if joints[index].end_site.is_some() {
                    return Err(BvhError::parse(line, "joint has more than one End Site"));
                }
                // Most files write the bare placeholder `End Site`; keep a
                // trailing name when one is present.
                let name = (tokens.len() > 2).then(|| tokens[2..].join(" "));
                joints[index].end_site = Some(parse_end_site(cursor, name)?);
            }
            _ => {
                return Err(BvhError::parse(
                    line,
                    format!("unexpected line in joint block: '{text}'"),
                ));
            }
        }
    }
}

fn parse_end_site(cursor: &mut Cursor, name: Option<String>) -> Result<EndSite> {
    expect_token(cursor, "{")?;
    let (line, text) = cursor.expect("End Site OFFSET")?;
    let offset = match text.split_whitespace().collect::<Vec<_>>()[..] {
        ["OFFSET", x, y, z] => parse_vec3(line, x, y, z)?,
        _ => return Err(BvhError::parse(line, "expected OFFSET in End Site")),
    };
    expect_token(cursor, "}")?;
    Ok(EndSite { name, offset })
}

fn parse_motion(cursor: &mut Cursor, channel_count: usize) -> Result<Motion> {
    let (line, text) = cursor.expect("Frames declaration")?;
    let frame_count: usize = match text.split_whitespace().collect::<Vec<_>>()[..] {
        ["Frames:", count] => count
            .parse()
            .map_err(|_| BvhError::parse(line, "invalid frame count"))?,
        _ => return Err(BvhError::parse(line, "expected 'Frames: <count>'")),
    };

    let (line, text) = cursor.expect("Frame Time declaration")?;
    let frame_time: f64 = match text.split_whitespace().collect::<Vec<_>>()[..] {
        ["Frame", "Time:", seconds] => seconds
            .parse()
            .map_err(|_| BvhError::parse(line, "invalid frame time"))?,
        _ => return Err(BvhError::parse(line, "expected 'Frame Time: <seconds>'")),
    };

    let mut samples = Vec::with_capacity(frame_count * channel_count);
    for frame in 0..frame_count {
        let (line, text) = match cursor.next() {
            Some(entry) => entry,
            None => {
                return Err(BvhError::MotionRowMismatch {
                    frame,
                    expected: channel_count,
                    found: 0,
                });
            }
        };
        let mut found = 0;
        for token in text.split_whitespace() {
            let value: f64 = token.parse().map_err(|_| {
                BvhError::parse(line, format!("invalid channel value '{token}'"))
            })?;
            samples.push(value);
            found += 1;
        }
        if found != channel_count {
            return Err(BvhError::MotionRowMismatch {
                frame,
                expected: channel_count,
                found,
            });
        }
    }

    if let Some((line, _)) = cursor.next() {
        return Err(BvhError::parse(
            line,
            "more motion rows than declared frames",
        ));
    }

    Ok(Motion::new(frame_count, frame_time, channel_count, samples))
}

fn parse_vec3(line: usize, x: &str, y: &str, z: &str) -> Result<DVec3> {
    let parse = |token: &str| -> Result<f64> {
        token
            .parse()
            .map_err(|_| BvhError::parse(line, format!("invalid offset value '{token}'")))
    };
    Ok(DVec3::new(parse(x)?, parse(y)?, parse(z)?))
}

fn expect_token(cursor: &mut Cursor, token: &str) -> Result<()> {
    let (line, text) = cursor.expect(token)?;
    if text == token {
        Ok(())
    } else {
        Err(BvhError::parse(line, format!("expected '{token}'")))
    }
}

/// Cursor over source lines that skips blanks and tracks 1-based line
/// numbers for error reporting
struct Cursor {
    lines: Vec<String>,
    pos: usize,
}

impl Cursor {
    fn new(lines: Vec<String>) -> Self {
        Self { lines, pos: 0 }
    }

    fn next(&mut self) -> Option<(usize, String)> {
        while self.pos < self.lines.len() {
            let line = self.lines[self.pos].trim();
            self.pos += 1;
            if !line.is_empty() {
                return Some((self.pos, line.to_string()));
            }
        }
        None
    }

    fn expect(&mut self, what: &str) -> Result<(usize, String)> {
        self.next().ok_or_else(|| {
            BvhError::parse(self.lines.len(), format!("unexpected end of file, expected {what}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SIMPLE: &str = "\
HIERARCHY
ROOT Hips
{
  OFFSET 0.0 0.0 0.0
  CHANNELS 6 Xposition Yposition Zposition Zrotation Xrotation Yrotation
  JOINT Spine
  {
    OFFSET 0.0 1.0 0.0
    CHANNELS 3 Zrotation Xrotation Yrotation
    End Site
    {
      OFFSET 0.0 0.5 0.0
    }
  }
}
MOTION
Frames: 2
Frame Time: 0.05
0.0 0.0 0.0 90.0 0.0 0.0 0.0 0.0 0.0
1.0 2.0 3.0 0.0 0.0 0.0 0.0 90.0 0.0
";

    #[test]
    fn test_parse_hierarchy() {
        let bvh = parse(SIMPLE.as_bytes()).unwrap();
        let skeleton = &bvh.skeleton;
        assert_eq!(skeleton.len(), 2);
        assert_eq!(skeleton.channel_count(), 9);

        let root = skeleton.joint(0);
        assert_eq!(root.name, "Hips");
        assert_eq!(root.parent, None);
        assert_eq!(root.children, vec![1]);
        assert_eq!(root.channels.len(), 6);
        assert_eq!(root.channel_base, 0);

        let spine = skeleton.joint(1);
        assert_eq!(spine.name, "Spine");
        assert_eq!(spine.parent, Some(0));
        assert_eq!(spine.offset, DVec3::new(0.0, 1.0, 0.0));
        assert_eq!(
            spine.channels,
            vec![Channel::ZRotation, Channel::XRotation, Channel::YRotation]
        );
        assert_eq!(spine.channel_base, 6);

        let end = spine.end_site.as_ref().unwrap();
        assert_eq!(end.name, None);
        assert_eq!(end.offset, DVec3::new(0.0, 0.5, 0.0));
        assert_eq!(skeleton.end_site_name(1), Some("Spine_End".to_string()));
    }

    #[test]
    fn test_parse_motion() {
        let bvh = parse(SIMPLE.as_bytes()).unwrap();
        assert_eq!(bvh.motion.frame_count(), 2);
        assert_eq!(bvh.motion.frame_time(), 0.05);
        assert_eq!(bvh.motion.frame(0)[3], 90.0);
        assert_eq!(bvh.motion.frame(1), &[1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 0.0, 90.0, 0.0]);
    }

    #[test]
    fn test_missing_root() {
        let source = "HIERARCHY\nMOTION\nFrames: 0\nFrame Time: 0.1\n";
        assert!(matches!(
            parse(source.as_bytes()),
            Err(BvhError::MissingRoot)
        ));
    }

    #[test]
    fn test_rejects_unknown_channel() {
        let source = "\
HIERARCHY
ROOT A
{
  OFFSET 0 0 0
  CHANNELS 1 Wrotation
}
MOTION
Frames: 0
Frame Time: 0.1
";
        let err = parse(source.as_bytes()).unwrap_err();
        assert!(matches!(err, BvhError::Parse { line: 5, .. }), "{err}");
    }

    #[test]
    fn test_rejects_short_motion_row() {
        let source = "\
HIERARCHY
ROOT A
{
  OFFSET 0 0 0
  CHANNELS 3 Zrotation Xrotation Yrotation
}
MOTION
Frames: 1
Frame Time: 0.1
1.0 2.0
";
        let err = parse(source.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            BvhError::MotionRowMismatch {
                frame: 0,
                expected: 3,
                found: 2,
            }
        ));
    }

    #[test]
    fn test_rejects_missing_frames() {
        let source = "\
HIERARCHY
ROOT A
{
  OFFSET 0 0 0
  CHANNELS 3 Zrotation Xrotation Yrotation
}
MOTION
Frames: 2
Frame Time: 0.1
1.0 2.0 3.0
";
        let err = parse(source.as_bytes()).unwrap_err();
        assert!(matches!(err, BvhError::MotionRowMismatch { frame: 1, .. }));
    }

    #[test]
    fn test_rejects_extra_frames() {
        let source = "\
HIERARCHY
ROOT A
{
  OFFSET 0 0 0
  CHANNELS 3 Zrotation Xrotation Yrotation
}
MOTION
Frames: 1
Frame Time: 0.1
1.0 2.0 3.0
4.0 5.0 6.0
";
        let err = parse(source.as_bytes()).unwrap_err();
        assert!(matches!(err, BvhError::Parse { .. }), "{err}");
    }

    #[test]
    fn test_rejects_multiple_roots() {
        let source = "\
HIERARCHY
ROOT A
{
  OFFSET 0 0 0
  CHANNELS 3 Zrotation Xrotation Yrotation
}
ROOT B
{
  OFFSET 0 0 0
  CHANNELS 3 Zrotation Xrotation Yrotation
}
MOTION
Frames: 0
Frame Time: 0.1
";
        let err = parse(source.as_bytes()).unwrap_err();
        assert!(matches!(err, BvhError::Parse { line: 7, .. }), "{err}");
    }
}
