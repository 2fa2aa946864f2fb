//! Conversion orchestration
//!
//! Reads and parses the source file once, runs forward kinematics when the
//! location table was requested, then attempts each requested CSV write
//! independently: a failed rotation write does not stop the location write
//! or vice versa, but any failed requested output fails the conversion as a
//! whole. Parse and FK errors abort before anything is written.

use std::fs;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use bvh_anim::export::{write_locations, write_rotations};
use bvh_anim::fk::WorldTransforms;
use bvh_anim::{BvhFile, FkOptions, compute_world_transforms};

/// Resolved conversion settings from the command line
pub struct ConvertOptions {
    /// Destination folder; the source file's folder when `None`
    pub out_dir: Option<PathBuf>,
    /// Scale factor for root translation and offsets
    pub scale: f64,
    /// Write the rotation CSV
    pub rotation: bool,
    /// Write the location CSV
    pub location: bool,
    /// Include End Sites in the location CSV
    pub end_sites: bool,
}

/// Converts one BVH file into the requested CSV tables
pub fn convert(input: &Path, options: &ConvertOptions) -> Result<()> {
    let bvh = BvhFile::load(input)
        .with_context(|| format!("Failed to read BVH file: {}", input.display()))?;
    log::debug!(
        "Parsed {}: {} joints, {} frames",
        input.display(),
        bvh.skeleton.len(),
        bvh.motion.frame_count()
    );

    // Neither flag given means both outputs.
    let (do_rotation, do_location) = match (options.rotation, options.location) {
        (false, false) => (true, true),
        requested => requested,
    };

    // FK runs before any write so a computation failure leaves no partial
    // output behind.
    let world = if do_location {
        let fk = FkOptions {
            scale: options.scale,
            include_end_sites: options.end_sites,
        };
        Some(
            compute_world_transforms(&bvh, &fk)
                .with_context(|| format!("Forward kinematics failed for {}", input.display()))?,
        )
    } else {
        None
    };

    let stem = input
        .file_stem()
        .context("input path has no file name")?
        .to_string_lossy()
        .into_owned();
    let out_dir = match &options.out_dir {
        Some(dir) => {
            if !dir.exists() {
                fs::create_dir_all(dir).with_context(|| {
                    format!("Failed to create output directory: {}", dir.display())
                })?;
            }
            dir.clone()
        }
        None => input.parent().unwrap_or_else(|| Path::new(".")).to_path_buf(),
    };

    let mut failed = Vec::new();
    if do_rotation {
        let path = out_dir.join(format!("{stem}_rot.csv"));
        match write_rotation_file(&bvh, &path) {
            Ok(()) => log::info!("Wrote rotation CSV: {}", path.display()),
            Err(err) => {
                log::error!("{err:#}");
                failed.push("rotation");
            }
        }
    }
    if let Some(world) = &world {
        let path = out_dir.join(format!("{stem}_loc.csv"));
        match write_location_file(&bvh, world, &path) {
            Ok(()) => log::info!("Wrote location CSV: {}", path.display()),
            Err(err) => {
                log::error!("{err:#}");
                failed.push("location");
            }
        }
    }

    if !failed.is_empty() {
        bail!("failed to write {} output", failed.join(" and "));
    }
    Ok(())
}

fn write_rotation_file(bvh: &BvhFile, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Could not write to file {}", path.display()))?;
    write_rotations(bvh, BufWriter::new(file))
        .with_context(|| format!("Failed to write rotation CSV: {}", path.display()))
}

fn write_location_file(bvh: &BvhFile, world: &WorldTransforms, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Could not write to file {}", path.display()))?;
    write_locations(bvh, world, BufWriter::new(file))
        .with_context(|| format!("Failed to write location CSV: {}", path.display()))
}
