// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! A module implementing a structure to back the flow filter lookups.

use crate::map::{Direction, FlowFilterMap};
use crate::outcome::Outcome;
use crate::path::VNodePath;
use config::FilterMapConfig;
use flow_cond::FlowCondLookup;
use net::packet::Packet;
use std::collections::BTreeMap;
use std::fmt::Display;
use tracing::trace;

/// The flow filter lists of all the virtual nodes, one per node and direction.
//
// The structure looks like this:
//
// FlowFilterTable
//   -> BTreeMap<(VNodePath, Direction), FlowFilterMap>
//
//   FlowFilterMap
//     -> BTreeMap<u16, FlowFilter>, evaluated by ascending index
//
//   FlowFilter
//     -> flow condition name, looked up at evaluation time
//     -> PASS / DROP / REDIRECT, with flow actions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowFilterTable(BTreeMap<(VNodePath, Direction), FlowFilterMap>);

impl FlowFilterTable {
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Insert a flow filter list, replacing and returning any list of the same node and
    /// direction.
    pub fn insert(&mut self, map: FlowFilterMap) -> Option<FlowFilterMap> {
        let key = (map.owner().clone(), map.direction());
        self.0.insert(key, map)
    }

    /// Remove the flow filter list of `owner` for `direction`.
    pub fn remove(&mut self, owner: &VNodePath, direction: Direction) -> Option<FlowFilterMap> {
        self.0.remove(&(owner.clone(), direction))
    }

    /// Remove the flow filter lists of `node` and of all the nodes it contains.
    pub fn remove_node(&mut self, node: &VNodePath) -> usize {
        let before = self.0.len();
        self.0.retain(|(owner, _), _| !node.contains(owner));
        before - self.0.len()
    }

    #[must_use]
    pub fn get(&self, owner: &VNodePath, direction: Direction) -> Option<&FlowFilterMap> {
        self.0.get(&(owner.clone(), direction))
    }

    pub fn get_mut(
        &mut self,
        owner: &VNodePath,
        direction: Direction,
    ) -> Option<&mut FlowFilterMap> {
        self.0.get_mut(&(owner.clone(), direction))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlowFilterMap> {
        self.0.values()
    }

    /// Evaluate the flow filters of `owner` for `direction` against `packet`.
    ///
    /// A node without flow filters lets every packet through.
    pub fn evaluate(
        &self,
        owner: &VNodePath,
        direction: Direction,
        conditions: &dyn FlowCondLookup,
        packet: &mut Packet,
    ) -> Outcome {
        let Some(map) = self.get(owner, direction) else {
            trace!("No {direction} flow filter for {owner}");
            return Outcome::Continue;
        };
        map.evaluate(conditions, packet)
    }

    /// The configuration of all the flow filter lists.
    #[must_use]
    pub fn to_config(&self) -> Vec<FilterMapConfig> {
        self.0.values().map(FlowFilterMap::to_config).collect()
    }
}

impl Display for FlowFilterTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for map in self.0.values() {
            writeln!(f, "{map}:")?;
            for filter in map.filters() {
                writeln!(f, "  {filter}")?;
            }
        }
        Ok(())
    }
}
