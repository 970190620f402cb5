//! # Read-Only File Sources
//!
//! `FileSource` is the random-access region every reader decodes from. It is
//! either a read-only memory map of the whole file or the whole file read into
//! a heap buffer. Both expose the same `&[u8]` view, so the cursor and every
//! decoder above it are backend-agnostic.
//!
//! ## Backends
//!
//! | Kind | Open cost | Read cost | Notes |
//! |------|-----------|-----------|-------|
//! | `Mmap` | O(1) | page fault on first touch | default |
//! | `Buffered` | O(file size) | none | for filesystems where mapping is unavailable |
//!
//! ## Lifetime
//!
//! Slices returned by [`FileSource::bytes`] borrow `&self`. Dropping the
//! source unmaps or frees the region, and the borrow checker guarantees no
//! slice outlives it.
//!
//! ## Safety Considerations
//!
//! Mapping a file is unsafe because another process may truncate or rewrite it
//! while mapped. The files are treated as immutable inputs; the crate never
//! writes them, and every read through the cursor is bounds-checked against
//! the length observed at open time.

use std::fs::File;
use std::path::{Path, PathBuf};

use eyre::{ensure, Result, WrapErr};
use memmap2::Mmap;

/// Backend used to expose a file's bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageKind {
    /// Read-only memory map of the whole file.
    #[default]
    Mmap,
    /// The whole file read into memory at open.
    Buffered,
}

#[derive(Debug)]
enum Region {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    region: Region,
}

impl FileSource {
    pub fn open<P: AsRef<Path>>(path: P, kind: StorageKind) -> Result<Self> {
        let path = path.as_ref();

        let region = match kind {
            StorageKind::Mmap => {
                let file = File::open(path)
                    .wrap_err_with(|| format!("failed to open '{}'", path.display()))?;

                let len = file
                    .metadata()
                    .wrap_err_with(|| format!("failed to get metadata for '{}'", path.display()))?
                    .len();

                ensure!(len > 0, "cannot open empty file '{}'", path.display());

                // SAFETY: Mmap::map is unsafe because the underlying file may be
                // modified externally while mapped. This is acceptable because:
                // 1. The map is read-only and this crate never writes the file
                // 2. The map lifetime is tied to FileSource, preventing use-after-unmap
                // 3. All access goes through bytes(), and every cursor read is
                //    bounds-checked against the length fixed at map time
                let mmap = unsafe {
                    Mmap::map(&file)
                        .wrap_err_with(|| format!("failed to memory-map '{}'", path.display()))?
                };
                Region::Mapped(mmap)
            }
            StorageKind::Buffered => {
                let data = std::fs::read(path)
                    .wrap_err_with(|| format!("failed to read '{}'", path.display()))?;

                ensure!(!data.is_empty(), "cannot open empty file '{}'", path.display());

                Region::Owned(data)
            }
        };

        tracing::trace!(path = %path.display(), ?kind, "opened file source");

        Ok(Self {
            path: path.to_path_buf(),
            region,
        })
    }

    /// Wraps an in-memory image, used by tests and by callers that already
    /// hold the file contents.
    pub fn from_bytes(path: impl Into<PathBuf>, data: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            region: Region::Owned(data),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        match &self.region {
            Region::Mapped(mmap) => mmap,
            Region::Owned(data) => data,
        }
    }

    pub fn len(&self) -> u64 {
        self.bytes().len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes().is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self.region, Region::Mapped(_))
    }

    /// Hints that the region is about to be read front to back.
    ///
    /// Only meaningful for mapped sources on unix; a no-op otherwise.
    pub fn advise_sequential(&self) {
        #[cfg(unix)]
        if let Region::Mapped(mmap) = &self.region {
            if mmap.is_empty() {
                return;
            }
            // SAFETY: madvise is a hint and cannot cause undefined behavior on a
            // valid mapping. The pointer and length come straight from the live
            // Mmap, which covers exactly [ptr, ptr + len).
            unsafe {
                libc::madvise(
                    mmap.as_ptr() as *mut libc::c_void,
                    mmap.len(),
                    libc::MADV_SEQUENTIAL,
                );
            }
        }
    }
}
