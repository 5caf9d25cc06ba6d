//! Persisting the mutated document

use std::path::Path;

use tracing::info;

use crate::document::Document;
use crate::error::Result;

/// Serialize `doc` as YAML and overwrite `path` with it
pub async fn write_document(doc: &Document, path: &Path) -> Result<()> {
    info!("Writing mutated spec to {}", path.display());

    let yaml = doc.to_yaml()?;
    tokio::fs::write(path, yaml.as_bytes()).await?;

    Ok(())
}
