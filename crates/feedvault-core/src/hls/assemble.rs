//! HLS assembly: segments fetched on the segment pool into a private
//! temporary directory, then joined in playlist order into one file.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::{playlist, Segment};
use crate::error::AssembleError;
use crate::fetch::{FetchOutcome, Fetcher};
use crate::pool::WorkerPool;
use crate::storage::{self, PartialFile};

const COPY_BUF_SIZE: usize = 64 * 1024;

/// What a successful `assemble` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssembleOutcome {
    /// Destination was already complete.
    Skipped,
    Assembled { segments: usize, bytes: u64 },
}

/// Downloads every segment of a playlist on the segment pool and joins them.
#[derive(Debug, Clone)]
pub struct Assembler {
    fetcher: Fetcher,
    pool: WorkerPool,
}

impl Assembler {
    pub fn new(fetcher: Fetcher, pool: WorkerPool) -> Self {
        Self { fetcher, pool }
    }

    /// Produces `dest` from `playlist_url`.
    ///
    /// Segments land in a fresh `.segments-*` directory beside `dest` that is
    /// removed when this returns, whatever the outcome. `dest` is written only
    /// when every declared segment is present locally.
    pub fn assemble(
        &self,
        playlist_url: &str,
        dest: &Path,
        headers: &HashMap<String, String>,
        label: &str,
    ) -> Result<AssembleOutcome, AssembleError> {
        if storage::is_complete(dest) {
            tracing::debug!(path = %dest.display(), label, "video already present, skipping");
            return Ok(AssembleOutcome::Skipped);
        }

        let uris = playlist::load_segments(&self.fetcher, playlist_url, headers)?;
        let expected = uris.len();
        tracing::info!(label, segments = expected, "downloading segments");

        let parent = match dest.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let work_dir = tempfile::Builder::new()
            .prefix(".segments-")
            .tempdir_in(parent)
            .map_err(|e| AssembleError::io(parent, e))?;

        let segments: Vec<Segment> = uris
            .into_iter()
            .enumerate()
            .map(|(i, uri)| Segment::new(i, uri, work_dir.path()))
            .collect();

        self.pool.run(segments.clone(), |seg| {
            match self.fetcher.fetch(&seg.uri, &seg.path, headers) {
                Ok(FetchOutcome::Downloaded { bytes }) => {
                    tracing::trace!(label, index = seg.index, bytes, "segment done");
                }
                Ok(FetchOutcome::Skipped) => {}
                Err(e) => {
                    tracing::warn!(label, index = seg.index, url = %seg.uri, "segment failed: {}", e);
                }
            }
        });

        let found = segments
            .iter()
            .filter(|s| storage::is_complete(&s.path))
            .count();
        if found < expected {
            return Err(AssembleError::Incomplete { expected, found });
        }

        let bytes = concatenate(&segments, dest)?;
        tracing::info!(label, path = %dest.display(), segments = expected, bytes, "video assembled");
        Ok(AssembleOutcome::Assembled {
            segments: expected,
            bytes,
        })
    }
}

/// Appends segment files in index order into `dest` via its `.part` file.
fn concatenate(segments: &[Segment], dest: &Path) -> Result<u64, AssembleError> {
    let mut ordered: Vec<&Segment> = segments.iter().collect();
    ordered.sort_by_key(|s| s.index);

    let mut out = PartialFile::create(dest).map_err(|e| AssembleError::io(dest, e))?;
    let mut buf = vec![0u8; COPY_BUF_SIZE];
    for seg in ordered {
        let mut file = File::open(&seg.path).map_err(|e| AssembleError::io(&seg.path, e))?;
        loop {
            let n = file
                .read(&mut buf)
                .map_err(|e| AssembleError::io(&seg.path, e))?;
            if n == 0 {
                break;
            }
            out.write_all(&buf[..n])
                .map_err(|e| AssembleError::io(dest, e))?;
        }
    }
    out.commit(dest).map_err(|e| AssembleError::io(dest, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn concatenation_follows_index_not_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut segs: Vec<Segment> = (0..12)
            .map(|i| Segment::new(i, format!("u{}", i), dir.path()))
            .collect();
        for s in &segs {
            fs::write(&s.path, format!("[{}]", s.index)).unwrap();
        }
        segs.reverse();
        let dest = dir.path().join("out.mp4");
        let bytes = concatenate(&segs, &dest).unwrap();
        let expected: String = (0..12).map(|i| format!("[{}]", i)).collect();
        assert_eq!(fs::read_to_string(&dest).unwrap(), expected);
        assert_eq!(bytes, expected.len() as u64);
        assert!(!storage::temp_path(&dest).exists());
    }

    #[test]
    fn missing_segment_file_leaves_no_dest() {
        let dir = tempfile::tempdir().unwrap();
        let segs: Vec<Segment> = (0..2)
            .map(|i| Segment::new(i, format!("u{}", i), dir.path()))
            .collect();
        fs::write(&segs[0].path, b"a").unwrap();
        let dest = dir.path().join("out.mp4");
        assert!(matches!(
            concatenate(&segs, &dest),
            Err(AssembleError::Io { .. })
        ));
        assert!(!dest.exists());
        assert!(!storage::temp_path(&dest).exists());
    }

    #[test]
    fn complete_destination_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("v.mp4");
        fs::write(&dest, b"video").unwrap();
        let asm = Assembler::new(Fetcher::default(), WorkerPool::new("segment", 2));
        let out = asm
            .assemble("http://192.0.2.1:9/i.m3u8", &dest, &HashMap::new(), "t")
            .unwrap();
        assert_eq!(out, AssembleOutcome::Skipped);
    }

    #[test]
    fn unreachable_playlist_creates_no_directory() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("v.mp4");
        let asm = Assembler::new(Fetcher::default(), WorkerPool::new("segment", 2));
        let err = asm
            .assemble("http://127.0.0.1:1/i.m3u8", &dest, &HashMap::new(), "t")
            .unwrap_err();
        assert!(matches!(err, AssembleError::Playlist(_)));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
