// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Load a complete flow configuration from JSON / YAML text.

use crate::filter::FilterMapConfig;
use crate::flowcond::FlowConditionConfig;
use crate::pathmap::PathMapConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Path maps of one tenant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TenantPathMapsConfig {
    pub tenant: String,
    #[serde(default)]
    pub path_maps: Vec<PathMapConfig>,
}

/// Every flow condition, flow filter and path map known to the controller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlowConfig {
    #[serde(default)]
    pub conditions: Vec<FlowConditionConfig>,
    #[serde(default)]
    pub filter_maps: Vec<FilterMapConfig>,
    #[serde(default)]
    pub path_maps: Vec<PathMapConfig>,
    #[serde(default)]
    pub tenant_path_maps: Vec<TenantPathMapsConfig>,
}

/// Deserialize a [`FlowConfig`] from YAML text.
///
/// # Errors
///
/// Fails if the text is not a YAML representation of a [`FlowConfig`].
pub fn load_config_from_yaml(yaml: &str) -> Result<FlowConfig, String> {
    serde_yaml_ng::from_str(yaml).map_err(|e| format!("Failed to deserialize YAML config: {e}"))
}

/// Deserialize a [`FlowConfig`] from JSON text.
///
/// # Errors
///
/// Fails if the text is not a JSON representation of a [`FlowConfig`].
pub fn load_config_from_json(json: &str) -> Result<FlowConfig, String> {
    serde_json::from_str(json).map_err(|e| format!("Failed to deserialize JSON config: {e}"))
}

/// Read the file at `path` and deserialize it into a [`FlowConfig`].
/// The format is given by the file extension: `.yaml`, `.yml` or `.json`.
///
/// # Errors
///
/// This function may fail if the file does not exist or cannot be read, if the extension is not
/// supported, or if the contents cannot be deserialized.
pub fn load_config_from_file(path: &str) -> Result<FlowConfig, String> {
    debug!("Loading flow configuration from {path}");
    let ext = Path::new(path).extension();
    let text = || fs::read_to_string(path).map_err(|e| format!("Failed to read {path}: {e}"));
    match ext {
        Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
            load_config_from_yaml(&text()?)
        }
        Some(ext) if ext.eq_ignore_ascii_case("json") => load_config_from_json(&text()?),
        Some(ext) => Err(format!("Unsupported file extension {}", ext.display())),
        None => Err("Missing file extension".to_string()),
    }
}
