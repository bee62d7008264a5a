//! Segmented (HLS) video download and reassembly into a single file.

mod assemble;
pub mod playlist;

pub use assemble::{AssembleOutcome, Assembler};

use std::path::{Path, PathBuf};

/// One media segment of a playlist, with its local temporary path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Zero-based position in the playlist.
    pub index: usize,
    /// Absolute segment URL.
    pub uri: String,
    pub path: PathBuf,
}

impl Segment {
    pub fn new(index: usize, uri: String, dir: &Path) -> Self {
        Self {
            index,
            uri,
            path: dir.join(segment_file_name(index)),
        }
    }
}

/// `0000.ts`, `0001.ts`, ...
pub fn segment_file_name(index: usize) -> String {
    format!("{:04}.ts", index)
}
