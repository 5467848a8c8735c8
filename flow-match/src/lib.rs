// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Packet conditions
//!
//! Immutable predicates over the headers of a [`Packet`], built and validated from their
//! configuration objects. Evaluating a condition records on the packet context every header
//! field it had to look at, whether the comparison succeeded or not.

#![deny(clippy::all, clippy::pedantic, clippy::unwrap_used, clippy::expect_used)]
#![allow(clippy::missing_errors_doc)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

mod address;
mod ethernet;
mod flowmatch;
mod inet;
mod l4;
mod port;

pub use address::Inet4AddressMatch;
pub use ethernet::{EthernetMatch, VlanMatch};
pub use flowmatch::FlowMatch;
pub use inet::Inet4Match;
pub use l4::{IcmpMatch, L4Match, PortProtoMatch};
pub use port::L4PortMatch;

use net::packet::Packet;

/// A condition on the headers of a packet.
pub trait PacketMatcher {
    /// Tell if `packet` satisfies this condition.
    ///
    /// The header fields tested are added to the match fields of the packet context.
    fn matches(&self, packet: &mut Packet) -> bool;
}
