// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::path::{Path, PathBuf};

use crate::config_set::{parse_config_set_yaml, SidecarConfigSet};
use crate::validate::ConfigError;

pub const STRUCTURE_CONFIG_FILE: &str = "bids_structure.yaml";
pub const MAPPING_CONFIG_FILE: &str = "sidecar_config.yaml";

#[must_use]
pub fn structure_config_path(config_dir: &Path) -> PathBuf {
    config_dir.join(STRUCTURE_CONFIG_FILE)
}

#[must_use]
pub fn mapping_config_path(config_dir: &Path) -> PathBuf {
    config_dir.join(MAPPING_CONFIG_FILE)
}

pub fn load_config_set(config_dir: &Path) -> Result<SidecarConfigSet, ConfigError> {
    let structure_path = structure_config_path(config_dir);
    let mapping_path = mapping_config_path(config_dir);
    let structure_raw = fs::read_to_string(&structure_path).map_err(|e| {
        ConfigError(format!(
            "read structure config {} failed: {e}",
            structure_path.display()
        ))
    })?;
    let mapping_raw = fs::read_to_string(&mapping_path).map_err(|e| {
        ConfigError(format!(
            "read mapping config {} failed: {e}",
            mapping_path.display()
        ))
    })?;

    parse_config_set_yaml(&structure_raw, &mapping_raw)
}
