//! Destination file lifecycle.
//!
//! Downloads and assemblies write to `<dest>.part` and atomically rename onto
//! the final path, so a destination that exists with non-zero size is always
//! complete. An unfinished `.part` file is removed when its writer is dropped.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `a.mp4` → `a.mp4.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// True if `path` exists and has non-zero size. This is the resume check for
/// every download in the pipeline.
pub fn is_complete(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_file() && m.len() > 0).unwrap_or(false)
}

/// Buffered writer over `<final>.part`. Dropping it without [`PartialFile::commit`]
/// deletes the temp file.
pub struct PartialFile {
    writer: Option<BufWriter<File>>,
    temp_path: PathBuf,
    written: u64,
}

impl PartialFile {
    /// Creates (truncating) the temp file for `final_path`.
    pub fn create(final_path: &Path) -> io::Result<Self> {
        let temp_path = temp_path(final_path);
        let file = File::create(&temp_path)?;
        Ok(Self {
            writer: Some(BufWriter::new(file)),
            temp_path,
            written: 0,
        })
    }

    pub fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(w) => {
                w.write_all(data)?;
                self.written += data.len() as u64;
                Ok(())
            }
            None => Err(io::Error::new(io::ErrorKind::Other, "partial file already closed")),
        }
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Flushes, syncs and renames the temp file onto `final_path`.
    pub fn commit(mut self, final_path: &Path) -> io::Result<u64> {
        if let Some(w) = self.writer.take() {
            let file = w.into_inner().map_err(|e| e.into_error())?;
            file.sync_all()?;
        }
        fs::rename(&self.temp_path, final_path)?;
        Ok(self.written)
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        // `writer` is only None after a commit attempt; a failed rename still
        // leaves the temp file behind, so remove it either way.
        self.writer.take();
        if self.temp_path.exists() {
            if let Err(e) = fs::remove_file(&self.temp_path) {
                tracing::warn!(path = %self.temp_path.display(), "could not remove partial file: {}", e);
            }
        }
    }
}
