// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Flow entry vocabulary shared by packet classification and flow installation.
//!
//! The types in this module describe what a flow entry eventually installed on a switch will
//! look like: which header fields it matches on ([`MatchFields`]), which rewrites it performs
//! ([`FlowEntryAction`]) and when it expires ([`FlowTimeout`]).

use crate::eth::mac::Mac;
use crate::ipv4::dscp::Dscp;
use crate::vlan::Pcp;
use std::fmt::{Display, Formatter};
use std::net::Ipv4Addr;

bitflags::bitflags! {
    /// Set of header fields a flow entry has to match on.
    ///
    /// ICMP type and code are carried by `TP_SRC` and `TP_DST`, as in OpenFlow 1.0.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MatchFields: u16 {
        /// Source MAC address
        const DL_SRC = 1 << 0;
        /// Destination MAC address
        const DL_DST = 1 << 1;
        /// Ethernet type
        const DL_TYPE = 1 << 2;
        /// VLAN ID
        const DL_VLAN = 1 << 3;
        /// VLAN priority
        const DL_VLAN_PR = 1 << 4;
        /// Source IP address
        const NW_SRC = 1 << 5;
        /// Destination IP address
        const NW_DST = 1 << 6;
        /// IP protocol number
        const NW_PROTO = 1 << 7;
        /// IP DSCP
        const NW_TOS = 1 << 8;
        /// L4 source port, or ICMP type
        const TP_SRC = 1 << 9;
        /// L4 destination port, or ICMP code
        const TP_DST = 1 << 10;
    }
}

/// A header rewrite (or the drop instruction) to be installed in a flow entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowEntryAction {
    /// Set the source MAC address
    SetDlSrc(Mac),
    /// Set the destination MAC address
    SetDlDst(Mac),
    /// Set the source IPv4 address
    SetNwSrc(Ipv4Addr),
    /// Set the destination IPv4 address
    SetNwDst(Ipv4Addr),
    /// Set the IP DSCP
    SetNwTos(Dscp),
    /// Set the L4 source port (or ICMP type)
    SetTpSrc(u16),
    /// Set the L4 destination port (or ICMP code)
    SetTpDst(u16),
    /// Set the VLAN priority
    SetVlanPcp(Pcp),
    /// Discard matching packets
    Drop,
}

impl Display for FlowEntryAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FlowEntryAction::SetDlSrc(mac) => write!(f, "SET_DL_SRC({mac})"),
            FlowEntryAction::SetDlDst(mac) => write!(f, "SET_DL_DST({mac})"),
            FlowEntryAction::SetNwSrc(addr) => write!(f, "SET_NW_SRC({addr})"),
            FlowEntryAction::SetNwDst(addr) => write!(f, "SET_NW_DST({addr})"),
            FlowEntryAction::SetNwTos(dscp) => write!(f, "SET_NW_TOS({dscp})"),
            FlowEntryAction::SetTpSrc(port) => write!(f, "SET_TP_SRC({port})"),
            FlowEntryAction::SetTpDst(port) => write!(f, "SET_TP_DST({port})"),
            FlowEntryAction::SetVlanPcp(pcp) => write!(f, "SET_VLAN_PCP({pcp})"),
            FlowEntryAction::Drop => write!(f, "DROP"),
        }
    }
}

/// Idle and hard timeouts of a flow entry, in seconds.  Zero means "never expires".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlowTimeout {
    /// Seconds of inactivity before the entry is removed.
    pub idle: u16,
    /// Seconds after installation before the entry is removed.
    pub hard: u16,
}

impl Display for FlowTimeout {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "idle={} hard={}", self.idle, self.hard)
    }
}
