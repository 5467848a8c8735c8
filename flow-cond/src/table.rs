// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The registry of flow conditions

use crate::cond::FlowCond;
use arc_swap::ArcSwap;
use config::{ConfigError, ConfigResult, FlowConditionConfig};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, info};

/// Something that can resolve a flow condition from its name.
pub trait FlowCondLookup {
    /// Get the flow condition called `name`, if it exists.
    fn lookup(&self, name: &str) -> Option<Arc<FlowCond>>;
}

type Conditions = BTreeMap<String, Arc<FlowCond>>;

/// All the flow conditions, by name.
///
/// Flow filters and path maps refer to flow conditions by name: conditions can be created,
/// replaced and removed independently of them.
pub struct FlowCondTable {
    conds: ArcSwap<Conditions>,
    writer: Mutex<()>,
}

impl std::fmt::Debug for FlowCondTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.conds.load().iter()).finish()
    }
}

impl Default for FlowCondTable {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowCondTable {
    /// Create an empty [`FlowCondTable`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            conds: ArcSwap::from_pointee(Conditions::new()),
            writer: Mutex::new(()),
        }
    }

    /// Build a [`FlowCondTable`] from a list of flow condition configurations.
    ///
    /// # Errors
    ///
    /// Fails if any of the flow conditions is invalid, or if two of them share a name.
    pub fn from_config(configs: &[FlowConditionConfig]) -> ConfigResult<Self> {
        let mut conds = Conditions::new();
        for config in configs {
            let fc = FlowCond::new(config)?;
            if conds.contains_key(fc.name()) {
                return Err(ConfigError::DuplicateCondition(fc.name().to_owned()));
            }
            conds.insert(fc.name().to_owned(), Arc::new(fc));
        }
        Ok(Self {
            conds: ArcSwap::from_pointee(conds),
            writer: Mutex::new(()),
        })
    }

    fn publish(&self, update: impl FnOnce(&mut Conditions)) {
        let mut conds = Conditions::clone(&self.conds.load());
        update(&mut conds);
        self.conds.store(Arc::new(conds));
    }

    /// Add a new flow condition.
    ///
    /// # Errors
    ///
    /// Fails if the flow condition is invalid, or if a flow condition with the same name exists.
    pub fn add(&self, config: &FlowConditionConfig) -> ConfigResult<Arc<FlowCond>> {
        let fc = Arc::new(FlowCond::new(config)?);
        let _guard = self.writer.lock();
        if self.conds.load().contains_key(fc.name()) {
            return Err(ConfigError::DuplicateCondition(fc.name().to_owned()));
        }
        info!("Adding flow condition {}", fc.name());
        self.publish(|conds| {
            conds.insert(fc.name().to_owned(), fc.clone());
        });
        Ok(fc)
    }

    /// Add a flow condition, or replace the flow condition with the same name.
    /// Returns the replaced flow condition, if any.
    ///
    /// # Errors
    ///
    /// Fails if the flow condition is invalid.
    pub fn replace(&self, config: &FlowConditionConfig) -> ConfigResult<Option<Arc<FlowCond>>> {
        let fc = Arc::new(FlowCond::new(config)?);
        let _guard = self.writer.lock();
        let mut old = None;
        self.publish(|conds| {
            old = conds.insert(fc.name().to_owned(), fc.clone());
        });
        if old.is_some() {
            info!("Replaced flow condition {}", fc.name());
        } else {
            info!("Added flow condition {}", fc.name());
        }
        Ok(old)
    }

    /// Remove the flow condition called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoSuchCondition`] if there is no such flow condition.
    pub fn remove(&self, name: &str) -> ConfigResult<Arc<FlowCond>> {
        let _guard = self.writer.lock();
        let Some(fc) = self.conds.load().get(name).cloned() else {
            return Err(ConfigError::NoSuchCondition(name.to_owned()));
        };
        info!("Removing flow condition {name}");
        self.publish(|conds| {
            conds.remove(name);
        });
        Ok(fc)
    }

    /// Get the flow condition called `name`.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Arc<FlowCond>> {
        let fc = self.conds.load().get(name).cloned();
        if fc.is_none() {
            debug!("Flow condition {name} not found");
        }
        fc
    }

    /// Names of all the flow conditions, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.conds.load().keys().cloned().collect()
    }

    /// Number of flow conditions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.conds.load().len()
    }

    /// Returns true if there is no flow condition.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conds.load().is_empty()
    }

    /// The configuration of all the flow conditions.
    #[must_use]
    pub fn to_config(&self) -> Vec<FlowConditionConfig> {
        self.conds.load().values().map(|fc| fc.to_config()).collect()
    }
}

impl FlowCondLookup for FlowCondTable {
    fn lookup(&self, name: &str) -> Option<Arc<FlowCond>> {
        FlowCondTable::lookup(self, name)
    }
}

impl Display for FlowCondTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            " ━━━━━━━━━━━━━━━━━━━━━━ Flow conditions ━━━━━━━━━━━━━━━━━━━━━━"
        )?;
        let conds = self.conds.load();
        if conds.is_empty() {
            return writeln!(f, " (empty)");
        }
        for fc in conds.values() {
            write!(f, "{fc}")?;
        }
        Ok(())
    }
}
