// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Per-packet side-effect accumulators

use crate::flow::{FlowEntryAction, FlowTimeout, MatchFields};
use tracing::trace;

/// State accumulated while a packet is classified and filtered.
///
/// None of this is carried on the wire: it describes the flow entry that the forwarding
/// pipeline will eventually install for the packet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PacketMeta {
    match_fields: MatchFields,
    flooding: bool,
    redirected: bool,
    redirections: u32,
    flow_timeout: Option<FlowTimeout>,
    actions: Vec<FlowEntryAction>,
}

impl PacketMeta {
    /// Upper bound on the number of times a single packet may be redirected.
    pub const MAX_REDIRECTIONS: u32 = 100;

    /// Record that a flow entry for this packet must match on `fields`.
    pub fn add_match_field(&mut self, fields: MatchFields) {
        self.match_fields |= fields;
    }

    /// The header fields exercised so far.
    #[must_use]
    pub fn match_fields(&self) -> MatchFields {
        self.match_fields
    }

    /// Mark the packet as being flooded (broadcast, or unknown destination).
    pub fn set_flooding(&mut self, flooding: bool) {
        self.flooding = flooding;
    }

    /// Returns true if the packet is being flooded.
    #[must_use]
    pub fn is_flooding(&self) -> bool {
        self.flooding
    }

    /// Check-and-set the "redirected" mark.
    ///
    /// Returns true exactly once per packet: on the first call.
    pub fn first_redirection(&mut self) -> bool {
        let first = !self.redirected;
        self.redirected = true;
        first
    }

    /// Count one more redirection hop and return the new hop count.
    pub fn add_redirection(&mut self) -> u32 {
        self.redirections = self.redirections.saturating_add(1);
        self.redirections
    }

    /// Number of redirection hops taken so far.
    #[must_use]
    pub fn redirections(&self) -> u32 {
        self.redirections
    }

    /// Set the timeouts of the flow entry to be installed.
    pub fn set_flow_timeout(&mut self, timeout: FlowTimeout) {
        trace!("Setting flow timeout: {timeout}");
        self.flow_timeout = Some(timeout);
    }

    /// The timeouts of the flow entry to be installed, if any was set.
    #[must_use]
    pub fn flow_timeout(&self) -> Option<FlowTimeout> {
        self.flow_timeout
    }

    /// Append an action to the flow entry to be installed.
    pub fn add_action(&mut self, action: FlowEntryAction) {
        trace!("Adding flow entry action {action}");
        self.actions.push(action);
    }

    /// Actions recorded so far, in application order.
    #[must_use]
    pub fn actions(&self) -> &[FlowEntryAction] {
        &self.actions
    }

    /// Returns true if a drop flow entry was requested for this packet.
    #[must_use]
    pub fn is_dropped(&self) -> bool {
        self.actions.contains(&FlowEntryAction::Drop)
    }
}
