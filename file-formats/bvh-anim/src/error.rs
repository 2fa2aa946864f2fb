//! Error handling for BVH parsing, forward kinematics and export

use std::io;
use thiserror::Error;

/// Errors that can occur when working with BVH files
#[derive(Debug, Error)]
pub enum BvhError {
    /// An I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed text in the HIERARCHY or MOTION section
    #[error("Parse error at line {line}: {message}")]
    Parse {
        /// 1-based line number in the source file
        line: usize,
        /// What was wrong with the line
        message: String,
    },

    /// The hierarchy section declared no root joint
    #[error("Malformed hierarchy: no ROOT joint found")]
    MissingRoot,

    /// A motion row did not match the declared channel count
    #[error("Motion frame {frame}: expected {expected} channel values, found {found}")]
    MotionRowMismatch {
        /// 0-based frame index
        frame: usize,
        /// Total channel count declared in the hierarchy
        expected: usize,
        /// Number of values found on the row
        found: usize,
    },

    /// An error from the CSV writer
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl BvhError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}

/// Type alias for Results from BVH operations
pub type Result<T> = std::result::Result<T, BvhError>;
