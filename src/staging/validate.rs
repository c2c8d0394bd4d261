use std::io::ErrorKind;

use tracing::{error, info};

use super::{ReadyFile, StagedResource, ValidationError};

/// Checks that a staged file exists, is readable and is non-empty.
///
/// Checks run in that order so the error names the first thing wrong. A path
/// whose metadata cannot be read at all counts as missing; only a failed open
/// of an existing file is reported as a permission problem. On success the
/// resource's `size_bytes` is filled in.
pub async fn validate(resource: &mut StagedResource) -> Result<ReadyFile<'_>, ValidationError> {
    let kind = resource.kind;
    let path = resource.local_path.clone();

    let metadata = match tokio::fs::metadata(&path).await {
        Ok(m) if m.is_file() => m,
        Ok(_) => {
            error!("{} is not a regular file: {}", kind.label(), path.display());
            return Err(ValidationError::NotFound { kind, path });
        }
        Err(e) => {
            error!("{} not found: {} ({})", kind.label(), path.display(), e);
            return Err(ValidationError::NotFound { kind, path });
        }
    };

    if let Err(e) = tokio::fs::File::open(&path).await {
        error!("{} cannot be read: {}: {}", kind.label(), path.display(), e);
        return Err(if e.kind() == ErrorKind::NotFound {
            ValidationError::NotFound { kind, path }
        } else {
            ValidationError::PermissionDenied { kind, path }
        });
    }

    let size_bytes = metadata.len();
    if size_bytes == 0 {
        error!("{} is empty: {}", kind.label(), path.display());
        return Err(ValidationError::Empty { kind, path });
    }

    info!(
        "{} check passed: {} ({} bytes)",
        kind.label(),
        path.display(),
        size_bytes
    );
    resource.size_bytes = Some(size_bytes);

    Ok(ReadyFile {
        path: &resource.local_path,
        size_bytes,
    })
}
