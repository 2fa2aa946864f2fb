//! CSV export of rotation channels and world-space locations
//!
//! Two independent emitters consume a parsed [`BvhFile`]: one flattens the
//! raw rotation channel values per joint into columns, the other flattens
//! the translation block of each joint's world transform. Both prepend a
//! 0-based `frame` index column and a `time` column derived from
//! `frame_index * frame_time`, and both write through any [`io::Write`], so
//! file placement stays with the caller.

use std::io;

use crate::error::{BvhError, Result};
use crate::fk::WorldTransforms;
use crate::types::{BvhFile, Skeleton};

/// Column names of the rotation table, without the leading `frame`/`time`
///
/// One column per rotation channel per joint, in traversal order and source
/// channel order, named `{joint}.{axis}`. End Sites carry no rotation and
/// never appear.
pub fn rotation_columns(skeleton: &Skeleton) -> Vec<String> {
    let mut columns = Vec::new();
    for joint in skeleton.joints() {
        for (_, channel) in joint.rotation_channels() {
            columns.push(format!("{}.{}", joint.name, channel.axis().letter()));
        }
    }
    columns
}

/// Column names of the location table, without the leading `frame`/`time`
///
/// Three columns (`.x`, `.y`, `.z`) per joint in traversal order; when
/// `include_end_sites` is set, an End Site's columns follow directly after
/// its owning joint's.
pub fn location_columns(skeleton: &Skeleton, include_end_sites: bool) -> Vec<String> {
    let mut columns = Vec::new();
    for (index, joint) in skeleton.joints().iter().enumerate() {
        for axis in ["x", "y", "z"] {
            columns.push(format!("{}.{}", joint.name, axis));
        }
        if include_end_sites {
            if let Some(name) = skeleton.end_site_name(index) {
                for axis in ["x", "y", "z"] {
                    columns.push(format!("{name}.{axis}"));
                }
            }
        }
    }
    columns
}

/// Writes the rotation channel table as CSV
///
/// Values are the raw sampled channel values in source units, not
/// recomposed from matrices.
pub fn write_rotations<W: io::Write>(bvh: &BvhFile, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);

    let mut header = vec!["frame".to_string(), "time".to_string()];
    header.extend(rotation_columns(&bvh.skeleton));
    csv.write_record(&header)?;

    // Absolute motion-row columns of every rotation channel, in emission
    // order.
    let value_columns: Vec<usize> = bvh
        .skeleton
        .joints()
        .iter()
        .flat_map(|joint| joint.rotation_channels().map(|(column, _)| column))
        .collect();

    for frame in 0..bvh.motion.frame_count() {
        let row = bvh.motion.frame(frame);
        let mut record = Vec::with_capacity(2 + value_columns.len());
        record.push(frame.to_string());
        record.push(bvh.motion.frame_seconds(frame).to_string());
        for &column in &value_columns {
            record.push(row[column].to_string());
        }
        csv.write_record(&record)?;
    }

    csv.flush().map_err(BvhError::Io)?;
    Ok(())
}

/// Writes the world-space location table as CSV
///
/// Takes the [`WorldTransforms`] of a finished FK pass; End Site columns
/// are emitted exactly when that pass computed them.
pub fn write_locations<W: io::Write>(
    bvh: &BvhFile,
    world: &WorldTransforms,
    writer: W,
) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);

    let mut header = vec!["frame".to_string(), "time".to_string()];
    header.extend(location_columns(&bvh.skeleton, world.includes_end_sites()));
    csv.write_record(&header)?;

    for frame in 0..bvh.motion.frame_count() {
        let mut record = vec![
            frame.to_string(),
            bvh.motion.frame_seconds(frame).to_string(),
        ];
        for index in 0..bvh.skeleton.len() {
            let translation = world.joint(index)[frame].translation;
            record.push(translation.x.to_string());
            record.push(translation.y.to_string());
            record.push(translation.z.to_string());
            if let Some(ends) = world.end_site(index) {
                let translation = ends[frame].translation;
                record.push(translation.x.to_string());
                record.push(translation.y.to_string());
                record.push(translation.z.to_string());
            }
        }
        csv.write_record(&record)?;
    }

    csv.flush().map_err(BvhError::Io)?;
    Ok(())
}
