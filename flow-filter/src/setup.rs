// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use crate::FlowFilterTable;
use crate::map::FlowFilterMap;
use config::{ConfigError, FilterMapConfig};
use tracing::debug;

impl FlowFilterTable {
    /// Build a [`FlowFilterTable`] from the flow filter lists of a configuration.
    ///
    /// # Errors
    ///
    /// Fails if any list is invalid, or if two lists are attached to the same node for the
    /// same direction.
    pub fn build_from_config(configs: &[FilterMapConfig]) -> Result<Self, ConfigError> {
        let mut table = FlowFilterTable::new();
        for config in configs {
            let map = FlowFilterMap::from_config(config)?;
            let name = map.to_string();
            if table.insert(map).is_some() {
                return Err(ConfigError::DuplicateFilterMap(name));
            }
        }
        debug!("Flow filter table successfully built: {} list(s)", table.len());
        Ok(table)
    }
}
