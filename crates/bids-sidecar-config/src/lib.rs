// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod adapters;
mod config_set;
mod schema;
mod validate;

pub use adapters::{
    load_config_set, mapping_config_path, structure_config_path, MAPPING_CONFIG_FILE,
    STRUCTURE_CONFIG_FILE,
};
pub use config_set::{parse_config_set_yaml, SidecarConfigSet, SidecarPlan};
pub use schema::{
    ConfigSchemaVersion, LayoutConfig, MappingConfig, SidecarRules, SidecarStructure,
    StructureConfig,
};
pub use validate::{required_fields_key, validate_config_set, ConfigError};

pub const CRATE_NAME: &str = "bids-sidecar-config";
