// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Ordered path map lists, global and per tenant

use crate::pathmap::PathMap;
use config::name::validate_name;
use config::{ConfigError, ConfigResult, FlowConfig, PathMapConfig, TenantPathMapsConfig};
use flow_cond::{FlowCondLookup, UpdateType};
use net::packet::Packet;
use std::collections::BTreeMap;
use std::fmt::Display;
use tracing::{debug, warn};

/// A list of path maps, evaluated by ascending index.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathMapTable(BTreeMap<u16, PathMap>);

impl PathMapTable {
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Build a [`PathMapTable`] from its configuration.
    ///
    /// # Errors
    ///
    /// Fails if any path map is invalid, or if two path maps share an index.
    pub fn from_config(configs: &[PathMapConfig]) -> ConfigResult<Self> {
        let mut table = Self::new();
        for config in configs {
            let pm = PathMap::new(config)?;
            let index = pm.index();
            if table.0.insert(index, pm).is_some() {
                return Err(ConfigError::DuplicateIndex {
                    what: "path map",
                    index: index.into(),
                });
            }
        }
        Ok(table)
    }

    /// Add or replace a path map.
    ///
    /// Returns how the list was modified, or `None` if the path map is already there.
    ///
    /// # Errors
    ///
    /// Fails if the path map is invalid.
    pub fn set(&mut self, config: &PathMapConfig) -> ConfigResult<Option<UpdateType>> {
        let pm = PathMap::new(config)?;
        let update = match self.0.get(&pm.index()) {
            Some(old) if *old == pm => return Ok(None),
            Some(_) => UpdateType::Changed,
            None => UpdateType::Added,
        };
        debug!("path map {update}: {pm}");
        self.0.insert(pm.index(), pm);
        Ok(Some(update))
    }

    pub fn remove(&mut self, index: u16) -> Option<PathMap> {
        self.0.remove(&index)
    }

    #[must_use]
    pub fn get(&self, index: u16) -> Option<&PathMap> {
        self.0.get(&index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn to_config(&self) -> Vec<PathMapConfig> {
        self.0.values().map(PathMap::to_config).collect()
    }

    /// Find the first path map whose flow condition matches `packet`.
    ///
    /// The flow timeouts of that path map, if any, are set on the packet context. Path maps
    /// whose flow condition does not exist are skipped.
    pub fn evaluate(&self, conditions: &dyn FlowCondLookup, packet: &mut Packet) -> Option<u32> {
        for pm in self.0.values() {
            let Some(cond) = conditions.lookup(pm.condition()) else {
                warn!(
                    "path map {}: flow condition {} not found, ignoring",
                    pm.index(),
                    pm.condition()
                );
                continue;
            };
            if !cond.match_packet(packet) {
                continue;
            }
            debug!(
                "path map {} selects policy {} for {}",
                pm.index(),
                pm.policy(),
                packet.source_key()
            );
            if let Some(timeout) = pm.timeout() {
                packet.meta_mut().set_flow_timeout(timeout);
            }
            return Some(pm.policy());
        }
        None
    }
}

impl Display for PathMapTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for pm in self.0.values() {
            writeln!(f, "{pm}")?;
        }
        Ok(())
    }
}

/// The global path maps, and those of every tenant.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathMapTables {
    global: PathMapTable,
    tenants: BTreeMap<String, PathMapTable>,
}

impl PathMapTables {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the path map tables of a configuration.
    ///
    /// # Errors
    ///
    /// Fails if any path map is invalid, if a tenant name is invalid, or if a tenant is given
    /// path maps twice.
    pub fn from_config(config: &FlowConfig) -> ConfigResult<Self> {
        let mut tables = Self {
            global: PathMapTable::from_config(&config.path_maps)?,
            tenants: BTreeMap::new(),
        };
        for TenantPathMapsConfig { tenant, path_maps } in &config.tenant_path_maps {
            validate_name("tenant", tenant)?;
            let table = PathMapTable::from_config(path_maps)?;
            if tables.tenants.insert(tenant.clone(), table).is_some() {
                return Err(ConfigError::InvalidName {
                    what: "tenant",
                    name: tenant.clone(),
                    reason: "path maps given twice",
                });
            }
        }
        Ok(tables)
    }

    #[must_use]
    pub fn global(&self) -> &PathMapTable {
        &self.global
    }

    pub fn global_mut(&mut self) -> &mut PathMapTable {
        &mut self.global
    }

    #[must_use]
    pub fn tenant(&self, tenant: &str) -> Option<&PathMapTable> {
        self.tenants.get(tenant)
    }

    /// The path maps of `tenant`, created empty if needed.
    pub fn tenant_mut(&mut self, tenant: &str) -> &mut PathMapTable {
        self.tenants.entry(tenant.to_owned()).or_default()
    }

    pub fn remove_tenant(&mut self, tenant: &str) -> Option<PathMapTable> {
        self.tenants.remove(tenant)
    }

    /// Select the path policy of a packet of `tenant`.
    ///
    /// The path maps of the tenant are consulted before the global ones. Returns `None` if no
    /// path map selects the packet: then the default policy applies.
    pub fn evaluate(
        &self,
        tenant: &str,
        conditions: &dyn FlowCondLookup,
        packet: &mut Packet,
    ) -> Option<u32> {
        self.tenants
            .get(tenant)
            .and_then(|table| table.evaluate(conditions, packet))
            .or_else(|| self.global.evaluate(conditions, packet))
    }
}
