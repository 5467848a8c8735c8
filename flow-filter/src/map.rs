// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Flow filter lists attached to virtual nodes

use crate::filter::FlowFilter;
use crate::outcome::Outcome;
use crate::path::{VInterfaceParent, VNodePath};
use config::{ConfigError, ConfigResult, DirectionConfig, FilterMapConfig, FlowFilterConfig};
use flow_cond::{FlowCondLookup, UpdateType};
use net::packet::Packet;
use std::collections::BTreeMap;
use std::fmt::Display;
use tracing::{debug, trace, warn};

/// Direction of the packets a flow filter list applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    /// Packets received by the node
    In,
    /// Packets sent by the node
    Out,
}

impl From<DirectionConfig> for Direction {
    fn from(value: DirectionConfig) -> Self {
        match value {
            DirectionConfig::In => Direction::In,
            DirectionConfig::Out => Direction::Out,
        }
    }
}

impl From<Direction> for DirectionConfig {
    fn from(value: Direction) -> Self {
        match value {
            Direction::In => DirectionConfig::In,
            Direction::Out => DirectionConfig::Out,
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::In => write!(f, "in"),
            Direction::Out => write!(f, "out"),
        }
    }
}

type Filters = BTreeMap<u16, FlowFilter>;

/// The flow filters of a virtual node for one direction, evaluated by ascending index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowFilterMap {
    owner: VNodePath,
    direction: Direction,
    filters: Filters,
}

impl FlowFilterMap {
    /// An empty list of flow filters.
    #[must_use]
    pub fn new(owner: VNodePath, direction: Direction) -> Self {
        Self {
            owner,
            direction,
            filters: Filters::new(),
        }
    }

    /// Build a [`FlowFilterMap`] from its configuration.
    ///
    /// # Errors
    ///
    /// Fails if the owner is not a valid node or if any of the filters is invalid.
    pub fn from_config(config: &FilterMapConfig) -> ConfigResult<Self> {
        let owner = VNodePath::from_names(
            config.tenant.as_deref(),
            config.bridge.as_deref(),
            config.terminal.as_deref(),
            config.interface.as_deref(),
        )?;
        let mut map = Self::new(owner, config.direction.into());
        map.set_filters(&config.filters)?;
        Ok(map)
    }

    /// The node the flow filters are attached to.
    #[must_use]
    pub fn owner(&self) -> &VNodePath {
        &self.owner
    }

    /// The direction of the packets the flow filters apply to.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// The flow filter at `index`.
    #[must_use]
    pub fn get_filter(&self, index: u16) -> Option<&FlowFilter> {
        self.filters.get(&index)
    }

    /// All the flow filters, by ascending index.
    pub fn filters(&self) -> impl Iterator<Item = &FlowFilter> {
        self.filters.values()
    }

    fn build_filters(&self, configs: &[FlowFilterConfig]) -> ConfigResult<Filters> {
        let mut filters = Filters::new();
        for config in configs {
            let filter = FlowFilter::new(&self.owner, config)?;
            let index = filter.index();
            if filters.insert(index, filter).is_some() {
                return Err(ConfigError::DuplicateIndex {
                    what: "flow filter",
                    index: index.into(),
                });
            }
        }
        Ok(filters)
    }

    /// Replace all the flow filters.
    ///
    /// Returns true if the list changed.
    ///
    /// # Errors
    ///
    /// Fails if any filter is invalid, or if two filters share an index. Then the list is left
    /// untouched.
    pub fn set_filters(&mut self, configs: &[FlowFilterConfig]) -> ConfigResult<bool> {
        let filters = self.build_filters(configs)?;
        if filters == self.filters {
            return Ok(false);
        }
        debug!("{self}: replacing {} flow filter(s)", filters.len());
        self.filters = filters;
        Ok(true)
    }

    /// Add or replace a single flow filter.
    ///
    /// Returns how the list was modified, or `None` if the filter is already there.
    ///
    /// # Errors
    ///
    /// Fails if the filter is invalid.
    pub fn set_filter(&mut self, config: &FlowFilterConfig) -> ConfigResult<Option<UpdateType>> {
        let filter = FlowFilter::new(&self.owner, config)?;
        let update = match self.filters.get(&filter.index()) {
            Some(old) if *old == filter => return Ok(None),
            Some(_) => UpdateType::Changed,
            None => UpdateType::Added,
        };
        debug!("{self}: flow filter {update}: {filter}");
        self.filters.insert(filter.index(), filter);
        Ok(Some(update))
    }

    /// Remove the flow filter at `index`, returning it if it existed.
    pub fn remove_filter(&mut self, index: u16) -> Option<FlowFilter> {
        let removed = self.filters.remove(&index);
        if removed.is_some() {
            debug!("{self}: flow filter {index} {}", UpdateType::Removed);
        }
        removed
    }

    /// The configuration of this list.
    #[must_use]
    pub fn to_config(&self) -> FilterMapConfig {
        let (bridge, terminal, interface) = match &self.owner {
            VNodePath::Tenant(_) => (None, None, None),
            VNodePath::Bridge(b) => (Some(b.bridge_name().to_owned()), None, None),
            VNodePath::Terminal(t) => (None, Some(t.terminal_name().to_owned()), None),
            VNodePath::Interface(i) => {
                let (bridge, terminal) = match i.parent() {
                    VInterfaceParent::Bridge(b) => (Some(b.bridge_name().to_owned()), None),
                    VInterfaceParent::Terminal(t) => (None, Some(t.terminal_name().to_owned())),
                };
                (bridge, terminal, Some(i.interface_name().to_owned()))
            }
        };
        FilterMapConfig {
            tenant: Some(self.owner.tenant_name().to_owned()),
            bridge,
            terminal,
            interface,
            direction: self.direction.into(),
            filters: self.filters.values().map(FlowFilter::to_config).collect(),
        }
    }

    /// Evaluate the flow filters against `packet`, by ascending index.
    ///
    /// A filter whose flow condition does not exist is skipped, and so is a filter that does
    /// not support flooded packets when `packet` is flooded. The flow actions of a selected
    /// filter are applied before the filter itself. Evaluation stops at the first filter that
    /// drops or redirects the packet.
    pub fn evaluate(&self, conditions: &dyn FlowCondLookup, packet: &mut Packet) -> Outcome {
        for filter in self.filters.values() {
            let Some(cond) = conditions.lookup(filter.condition()) else {
                warn!(
                    "{self}: flow filter {}: flow condition {} not found, ignoring",
                    filter.index(),
                    filter.condition()
                );
                continue;
            };
            if !cond.match_packet(packet) {
                continue;
            }
            if packet.meta().is_flooding() && !filter.supports_multicast() {
                trace!(
                    "{self}: flow filter {} ignores flooded packet from {}",
                    filter.index(),
                    packet.source_key()
                );
                continue;
            }
            if filter.needs_flow_action() {
                for action in filter.actions() {
                    action.apply(packet);
                }
            }
            let context = format!("{self}: flow filter {}", filter.index());
            match filter.apply(&context, packet) {
                Outcome::Continue => {}
                outcome => return outcome,
            }
        }
        Outcome::Continue
    }
}

impl Display for FlowFilterMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.owner, self.direction)
    }
}
