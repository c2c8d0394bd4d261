//! Resource staging: turns a user-supplied path or URL into a verified local
//! file that can be handed to the messaging client.
//!
//! The flow is always `fetch` -> `validate` -> send -> `release`. Only
//! `validate` produces a [`ReadyFile`], so nothing unverified can reach a
//! send primitive.

pub mod cleanup;
pub mod fetch;
pub mod validate;

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

pub use cleanup::release;
pub use fetch::Fetcher;
pub use validate::validate;

/// What kind of attachment is being staged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    File,
    Video,
}

impl MediaKind {
    /// Noun used in log lines and download errors ("image", "file", "video").
    pub fn noun(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::File => "file",
            MediaKind::Video => "video",
        }
    }

    /// Label used in validation errors ("image file", "file", "video file").
    pub fn label(self) -> &'static str {
        match self {
            MediaKind::Image => "image file",
            MediaKind::File => "file",
            MediaKind::Video => "video file",
        }
    }

    /// Extension used when the URL carries none.
    pub fn default_extension(self) -> Option<&'static str> {
        match self {
            MediaKind::Image => Some("png"),
            MediaKind::Video => Some("mp4"),
            MediaKind::File => None,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.noun())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to download {kind}: {reason}")]
    DownloadFailed { kind: MediaKind, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("{} not found: {}", .kind.label(), .path.display())]
    NotFound { kind: MediaKind, path: PathBuf },

    #[error("{} is not readable (permission denied): {}", .kind.label(), .path.display())]
    PermissionDenied { kind: MediaKind, path: PathBuf },

    #[error("{} is empty (0 bytes): {}", .kind.label(), .path.display())]
    Empty { kind: MediaKind, path: PathBuf },
}

/// A local file staged for one request.
///
/// Temporary resources (downloads) remove their file exactly once: through
/// [`release`], or on drop if the request never got that far.
#[derive(Debug)]
pub struct StagedResource {
    source: String,
    local_path: PathBuf,
    kind: MediaKind,
    is_temporary: bool,
    size_bytes: Option<u64>,
    released: bool,
}

impl StagedResource {
    /// A file that already exists on disk; never deleted by the gateway.
    pub fn local(source: &str, kind: MediaKind) -> Self {
        Self {
            source: source.to_string(),
            local_path: PathBuf::from(source),
            kind,
            is_temporary: false,
            size_bytes: None,
            released: false,
        }
    }

    /// A download destination owned by the gateway.
    pub(crate) fn temporary(source: &str, local_path: PathBuf, kind: MediaKind) -> Self {
        Self {
            source: source.to_string(),
            local_path,
            kind,
            is_temporary: true,
            size_bytes: None,
            released: false,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn is_temporary(&self) -> bool {
        self.is_temporary
    }

    /// Set once the validator has inspected the file.
    pub fn size_bytes(&self) -> Option<u64> {
        self.size_bytes
    }
}

impl Drop for StagedResource {
    fn drop(&mut self) {
        if !self.is_temporary || self.released {
            return;
        }
        self.released = true;
        match std::fs::remove_file(&self.local_path) {
            Ok(()) => debug!(
                "Removed temporary file on drop: {}",
                self.local_path.display()
            ),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Failed to remove temporary file {}: {}",
                self.local_path.display(),
                e
            ),
        }
    }
}

/// Proof that a staged file passed validation. Borrowed from the
/// [`StagedResource`], so it cannot outlive the file it points at.
#[derive(Debug, Clone, Copy)]
pub struct ReadyFile<'a> {
    path: &'a Path,
    size_bytes: u64,
}

impl<'a> ReadyFile<'a> {
    pub fn path(&self) -> &'a Path {
        self.path
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }
}
