//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::info;

/// Ensure the uploads tree exists (`<uploads_dir>/apartments`).
pub async fn ensure_env(uploads_dir: &Path) -> anyhow::Result<()> {
    let apartments = uploads_dir.join("apartments");
    tokio::fs::create_dir_all(&apartments)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", apartments.display()))?;
    info!(dir = %apartments.display(), "uploads directory ready");
    Ok(())
}
