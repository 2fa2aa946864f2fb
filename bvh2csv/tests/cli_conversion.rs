//! End-to-end CLI tests for bvh2csv
//!
//! These run the real binary against temp directories and check the files
//! it leaves behind as well as its exit status.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const TEST_BVH: &str = "\
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

fn write_test_bvh(dir: &Path) -> PathBuf {
    let path = dir.join("clip.bvh");
    fs::write(&path, TEST_BVH).expect("write test BVH");
    path
}

fn bvh2csv() -> Command {
    Command::cargo_bin("bvh2csv").expect("binary builds")
}

#[test]
fn converts_both_outputs_by_default() {
    let temp = TempDir::new().unwrap();
    let input = write_test_bvh(temp.path());

    bvh2csv().arg(&input).assert().success();

    let rot = fs::read_to_string(temp.path().join("clip_rot.csv")).unwrap();
    let loc = fs::read_to_string(temp.path().join("clip_loc.csv")).unwrap();
    assert!(rot.starts_with("frame,time,"));
    assert!(loc.starts_with("frame,time,"));
    // Header plus one row per frame.
    assert_eq!(rot.lines().count(), 3);
    assert_eq!(loc.lines().count(), 3);
}

#[test]
fn rotation_flag_limits_output() {
    let temp = TempDir::new().unwrap();
    let input = write_test_bvh(temp.path());

    bvh2csv().arg(&input).arg("--rotation").assert().success();

    assert!(temp.path().join("clip_rot.csv").exists());
    assert!(!temp.path().join("clip_loc.csv").exists());
}

#[test]
fn creates_missing_output_directory() {
    let temp = TempDir::new().unwrap();
    let input = write_test_bvh(temp.path());
    let out_dir = temp.path().join("exports").join("csv");

    bvh2csv()
        .arg(&input)
        .arg("--out-dir")
        .arg(&out_dir)
        .assert()
        .success();

    assert!(out_dir.join("clip_rot.csv").exists());
    assert!(out_dir.join("clip_loc.csv").exists());
}

#[test]
fn end_sites_flag_only_affects_location_output() {
    let temp = TempDir::new().unwrap();
    let input = write_test_bvh(temp.path());

    bvh2csv().arg(&input).assert().success();
    let rot_plain = fs::read_to_string(temp.path().join("clip_rot.csv")).unwrap();
    let loc_plain = fs::read_to_string(temp.path().join("clip_loc.csv")).unwrap();

    bvh2csv().arg(&input).arg("--end-sites").assert().success();
    let rot_ends = fs::read_to_string(temp.path().join("clip_rot.csv")).unwrap();
    let loc_ends = fs::read_to_string(temp.path().join("clip_loc.csv")).unwrap();

    assert_eq!(rot_plain, rot_ends);
    assert!(loc_ends.lines().next().unwrap().contains("Spine_End.x"));
    assert!(!loc_plain.lines().next().unwrap().contains("Spine_End.x"));
}

#[test]
fn missing_input_fails_without_output() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("nope.bvh");

    bvh2csv()
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read BVH file"));

    assert!(!temp.path().join("nope_rot.csv").exists());
    assert!(!temp.path().join("nope_loc.csv").exists());
}

#[test]
fn malformed_input_fails_without_output() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("broken.bvh");
    fs::write(&input, "HIERARCHY\nMOTION\nFrames: 0\nFrame Time: 0.1\n").unwrap();

    bvh2csv()
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no ROOT joint"));

    assert!(!temp.path().join("broken_rot.csv").exists());
    assert!(!temp.path().join("broken_loc.csv").exists());
}

#[cfg(unix)]
#[test]
fn partial_write_failure_keeps_other_output() {
    let temp = TempDir::new().unwrap();
    let input = write_test_bvh(temp.path());
    // A directory squatting on the rotation CSV path makes only that write
    // fail; the location write must still go through.
    fs::create_dir(temp.path().join("clip_rot.csv")).unwrap();

    bvh2csv()
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("rotation"));

    let loc = fs::read_to_string(temp.path().join("clip_loc.csv")).unwrap();
    assert!(loc.starts_with("frame,time,"));
    assert_eq!(loc.lines().count(), 3);
}

#[test]
fn scale_factor_scales_locations() {
    let temp = TempDir::new().unwrap();
    let input = write_test_bvh(temp.path());

    bvh2csv().arg(&input).assert().success();
    let unit = fs::read_to_string(temp.path().join("clip_loc.csv")).unwrap();

    bvh2csv().arg(&input).args(["--scale", "2"]).assert().success();
    let scaled = fs::read_to_string(temp.path().join("clip_loc.csv")).unwrap();

    // Second data row, root location columns: (1,2,3) becomes (2,4,6).
    let field = |text: &str, row: usize, column: usize| -> f64 {
        text.lines()
            .nth(row)
            .unwrap()
            .split(',')
            .nth(column)
            .unwrap()
            .parse()
            .unwrap()
    };
    for column in 2..5 {
        let expected = field(&unit, 2, column) * 2.0;
        assert!((field(&scaled, 2, column) - expected).abs() < 1e-9);
    }
}
