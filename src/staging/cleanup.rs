use std::io::ErrorKind;

use tracing::{debug, info, warn};

use super::StagedResource;

/// Removes a temporary resource's file. Local files are left alone.
///
/// Consumes the resource, so it can run at most once. Failures are logged and
/// swallowed: the response already reflects the send outcome.
pub async fn release(mut resource: StagedResource) {
    if !resource.is_temporary || resource.released {
        return;
    }
    resource.released = true;

    let path = resource.local_path();
    match tokio::fs::remove_file(path).await {
        Ok(()) => info!(
            "Temporary file removed: {} (downloaded from {})",
            path.display(),
            resource.source()
        ),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("Temporary file already gone: {}", path.display())
        }
        Err(e) => warn!("Failed to remove temporary file {}: {}", path.display(), e),
    }
}
