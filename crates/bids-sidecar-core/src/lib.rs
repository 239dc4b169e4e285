// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

pub mod canonical;
mod error;

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

pub use error::{ExitCode, MachineError};

pub const CRATE_NAME: &str = "bids-sidecar-core";

pub const ENV_SIDECAR_LOG_LEVEL: &str = "BIDS_SIDECAR_LOG_LEVEL";
pub const ENV_SIDECAR_CONFIG_DIR: &str = "BIDS_SIDECAR_CONFIG_DIR";
pub const DEFAULT_CONFIG_DIR: &str = "config";

#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Configuration directory lookup order: explicit path, then
/// `BIDS_SIDECAR_CONFIG_DIR`, then `./config`.
#[must_use]
pub fn resolve_config_dir(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(from_env) = std::env::var(ENV_SIDECAR_CONFIG_DIR) {
        let trimmed = from_env.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    PathBuf::from(DEFAULT_CONFIG_DIR)
}
