//! Root CLI structure for bvh2csv

use clap::Parser;
use std::path::PathBuf;

/// Convert a BVH file to CSV table format.
///
/// Produces a `{input}_rot.csv` table of raw per-joint rotation channels
/// and a `{input}_loc.csv` table of world-space joint locations computed by
/// forward kinematics. If neither --rotation nor --location is given, both
/// files are created.
#[derive(Parser)]
#[command(name = "bvh2csv")]
#[command(version)]
#[command(about = "Convert BVH motion capture files to CSV tables", long_about = None)]
pub struct Cli {
    /// BVH source file to convert
    pub input: PathBuf,

    /// Destination folder for the CSV files; the source file's folder is
    /// used when absent. Created if it does not exist.
    #[arg(short, long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Scale factor for root translation and offset values, e.g. to switch
    /// from centimeters to meters
    #[arg(short, long, default_value_t = 1.0)]
    pub scale: f64,

    /// Output the rotation CSV file
    #[arg(short, long)]
    pub rotation: bool,

    /// Output the world-space location CSV file
    #[arg(short, long)]
    pub location: bool,

    /// Include BVH End Sites in the location CSV (they carry no rotations)
    #[arg(short, long)]
    pub end_sites: bool,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}
