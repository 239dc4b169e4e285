// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::path::Path;

use bids_sidecar_model::SidecarDocument;

use crate::GenerationError;

/// Pretty JSON (two-space indent) in document order, with a trailing newline.
pub fn render_document(document: &SidecarDocument) -> Result<Vec<u8>, GenerationError> {
    let mut bytes = serde_json::to_vec_pretty(document)
        .map_err(|e| GenerationError(format!("encode sidecar document failed: {e}")))?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Writes the rendered document, creating parent directories as needed.
pub fn write_document(path: &Path, document: &SidecarDocument) -> Result<(), GenerationError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            GenerationError(format!("create output dir {} failed: {e}", parent.display()))
        })?;
    }
    let bytes = render_document(document)?;
    fs::write(path, bytes)
        .map_err(|e| GenerationError(format!("write {} failed: {e}", path.display())))?;
    tracing::info!(path = %path.display(), fields = document.len(), "sidecar written");
    Ok(())
}
