// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Left-right integration for [`FlowFilterTable`]

use crate::map::{Direction, FlowFilterMap};
use crate::outcome::Outcome;
use crate::path::VNodePath;
use crate::tables::FlowFilterTable;
use flow_cond::FlowCondLookup;
use left_right::{Absorb, ReadGuard, ReadHandle, ReadHandleFactory, WriteHandle, new_from_empty};
use net::packet::Packet;
use tracing::{debug, error};

#[derive(Debug)]
pub(crate) enum FlowFilterTableChange {
    UpdateFlowFilterTable(FlowFilterTable),
    SetFlowFilterMap(FlowFilterMap),
    RemoveFlowFilterMap(VNodePath, Direction),
    RemoveNode(VNodePath),
}

impl Absorb<FlowFilterTableChange> for FlowFilterTable {
    fn absorb_first(&mut self, change: &mut FlowFilterTableChange, _: &Self) {
        match change {
            FlowFilterTableChange::UpdateFlowFilterTable(table) => {
                *self = table.clone();
            }
            FlowFilterTableChange::SetFlowFilterMap(map) => {
                self.insert(map.clone());
            }
            FlowFilterTableChange::RemoveFlowFilterMap(owner, direction) => {
                self.remove(owner, *direction);
            }
            FlowFilterTableChange::RemoveNode(node) => {
                self.remove_node(node);
            }
        }
    }
    fn drop_first(self: Box<Self>) {}
    fn sync_with(&mut self, first: &Self) {
        *self = first.clone();
    }
}

/// A read handle on the published [`FlowFilterTable`]. One per packet processing thread.
#[derive(Debug)]
pub struct FlowFilterTableReader(ReadHandle<FlowFilterTable>);

impl FlowFilterTableReader {
    #[must_use]
    pub fn enter(&self) -> Option<ReadGuard<'_, FlowFilterTable>> {
        self.0.enter()
    }

    #[must_use]
    pub fn factory(&self) -> FlowFilterTableReaderFactory {
        FlowFilterTableReaderFactory(self.0.factory())
    }

    /// Evaluate the flow filters of `owner` for `direction` against `packet`.
    ///
    /// If the table cannot be read the packet is dropped.
    pub fn evaluate(
        &self,
        owner: &VNodePath,
        direction: Direction,
        conditions: &dyn FlowCondLookup,
        packet: &mut Packet,
    ) -> Outcome {
        let Some(table) = self.enter() else {
            error!(
                "Failed to read flow filter table: dropping packet from {}",
                packet.source_key()
            );
            return Outcome::Drop;
        };
        table.evaluate(owner, direction, conditions, packet)
    }
}

#[derive(Debug)]
pub struct FlowFilterTableReaderFactory(ReadHandleFactory<FlowFilterTable>);

impl FlowFilterTableReaderFactory {
    #[must_use]
    pub fn handle(&self) -> FlowFilterTableReader {
        FlowFilterTableReader(self.0.handle())
    }
}

/// The single writer of the [`FlowFilterTable`]. Every change is published immediately.
#[derive(Debug)]
pub struct FlowFilterTableWriter(WriteHandle<FlowFilterTable, FlowFilterTableChange>);

impl FlowFilterTableWriter {
    #[must_use]
    #[allow(clippy::new_without_default)]
    pub fn new() -> FlowFilterTableWriter {
        let (w, _r) =
            new_from_empty::<FlowFilterTable, FlowFilterTableChange>(FlowFilterTable::new());
        FlowFilterTableWriter(w)
    }

    #[must_use]
    pub fn get_reader(&self) -> FlowFilterTableReader {
        FlowFilterTableReader(self.0.clone())
    }

    #[must_use]
    pub fn get_reader_factory(&self) -> FlowFilterTableReaderFactory {
        self.get_reader().factory()
    }

    fn publish(&mut self, change: FlowFilterTableChange) {
        self.0.append(change);
        self.0.publish();
    }

    pub fn update_flow_filter_table(&mut self, table: FlowFilterTable) {
        self.publish(FlowFilterTableChange::UpdateFlowFilterTable(table));
        debug!("Updated flow filter table");
    }

    /// Publish the flow filter list of a node, replacing any previous list of the same node
    /// and direction.
    pub fn set_flow_filter_map(&mut self, map: FlowFilterMap) {
        debug!("Setting flow filter list {map}");
        self.publish(FlowFilterTableChange::SetFlowFilterMap(map));
    }

    pub fn remove_flow_filter_map(&mut self, owner: &VNodePath, direction: Direction) {
        debug!("Removing flow filter list {owner} ({direction})");
        self.publish(FlowFilterTableChange::RemoveFlowFilterMap(
            owner.clone(),
            direction,
        ));
    }

    /// Remove the flow filter lists of `node` and of all the nodes it contains.
    pub fn remove_node(&mut self, node: &VNodePath) {
        debug!("Removing flow filter lists of {node}");
        self.publish(FlowFilterTableChange::RemoveNode(node.clone()));
    }
}
