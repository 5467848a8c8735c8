// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Packet definition
//!
//! A [`Packet`] is the parsed form of a frame received from a switch, together with the
//! [`PacketMeta`] accumulated while it is classified and filtered.

mod meta;
#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

pub use meta::PacketMeta;

use crate::eth::Eth;
use crate::eth::ethtype::EthType;
use crate::eth::macvlan::MacVlan;
use crate::headers::Transport;
use crate::icmp4::Icmp4;
use crate::ipv4::Ipv4;
use crate::tcp::Tcp;
use crate::udp::Udp;
use crate::vlan::Vlan;
use std::fmt::{Display, Formatter};

/// A parsed packet and its context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    eth: Eth,
    vlan: Option<Vlan>,
    ipv4: Option<Ipv4>,
    transport: Option<Transport>,
    meta: PacketMeta,
}

impl Packet {
    /// Create a packet made of an ethernet header only.
    #[must_use]
    pub fn new(eth: Eth) -> Packet {
        Packet {
            eth,
            vlan: None,
            ipv4: None,
            transport: None,
            meta: PacketMeta::default(),
        }
    }

    /// Add a VLAN tag.
    #[must_use]
    pub fn with_vlan(mut self, vlan: Vlan) -> Packet {
        self.vlan = Some(vlan);
        self
    }

    /// Add an IPv4 header.  The ethertype of the ethernet header is set accordingly.
    #[must_use]
    pub fn with_ipv4(mut self, ipv4: Ipv4) -> Packet {
        self.eth.set_ether_type(EthType::IPV4);
        self.ipv4 = Some(ipv4);
        self
    }

    /// Add a transport header.
    #[must_use]
    pub fn with_transport(mut self, transport: impl Into<Transport>) -> Packet {
        self.transport = Some(transport.into());
        self
    }

    /// The ethernet header.
    #[must_use]
    pub fn eth(&self) -> &Eth {
        &self.eth
    }

    /// The ethernet header, mutably.
    pub fn eth_mut(&mut self) -> &mut Eth {
        &mut self.eth
    }

    /// The VLAN tag, if the frame is tagged.
    #[must_use]
    pub fn vlan(&self) -> Option<&Vlan> {
        self.vlan.as_ref()
    }

    /// The VLAN tag, mutably.
    pub fn vlan_mut(&mut self) -> Option<&mut Vlan> {
        self.vlan.as_mut()
    }

    /// The IPv4 header, if any.
    #[must_use]
    pub fn try_ipv4(&self) -> Option<&Ipv4> {
        self.ipv4.as_ref()
    }

    /// The IPv4 header, mutably.
    pub fn try_ipv4_mut(&mut self) -> Option<&mut Ipv4> {
        self.ipv4.as_mut()
    }

    /// The transport header, if any.
    #[must_use]
    pub fn try_transport(&self) -> Option<&Transport> {
        self.transport.as_ref()
    }

    /// The transport header, mutably.
    pub fn try_transport_mut(&mut self) -> Option<&mut Transport> {
        self.transport.as_mut()
    }

    /// The TCP header, if the transport header is TCP.
    #[must_use]
    pub fn try_tcp(&self) -> Option<&Tcp> {
        match self.transport.as_ref()? {
            Transport::Tcp(tcp) => Some(tcp),
            _ => None,
        }
    }

    /// The UDP header, if the transport header is UDP.
    #[must_use]
    pub fn try_udp(&self) -> Option<&Udp> {
        match self.transport.as_ref()? {
            Transport::Udp(udp) => Some(udp),
            _ => None,
        }
    }

    /// The ICMP header, if the transport header is `ICMPv4`.
    #[must_use]
    pub fn try_icmp4(&self) -> Option<&Icmp4> {
        match self.transport.as_ref()? {
            Transport::Icmp4(icmp) => Some(icmp),
            _ => None,
        }
    }

    /// The ICMP header, mutably.
    pub fn try_icmp4_mut(&mut self) -> Option<&mut Icmp4> {
        match self.transport.as_mut()? {
            Transport::Icmp4(icmp) => Some(icmp),
            _ => None,
        }
    }

    /// Identity of the packet's sender: source MAC address and VLAN ID (zero if untagged).
    #[must_use]
    pub fn source_key(&self) -> MacVlan {
        MacVlan::new(
            self.eth.source(),
            self.vlan.as_ref().and_then(|v| v.vid().ok()),
        )
    }

    /// The packet context.
    #[must_use]
    pub fn meta(&self) -> &PacketMeta {
        &self.meta
    }

    /// The packet context, mutably.
    pub fn meta_mut(&mut self) -> &mut PacketMeta {
        &mut self.meta
    }
}

impl Display for Packet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} -> {} type={}",
            self.source_key(),
            self.eth.destination(),
            self.eth.ether_type()
        )?;
        if let Some(ip) = &self.ipv4 {
            write!(
                f,
                " {} -> {} proto={} dscp={}",
                ip.source(),
                ip.destination(),
                ip.protocol(),
                ip.dscp()
            )?;
        }
        match &self.transport {
            Some(Transport::Tcp(tcp)) => {
                write!(f, " tcp {} -> {}", tcp.source(), tcp.destination())
            }
            Some(Transport::Udp(udp)) => {
                write!(f, " udp {} -> {}", udp.source(), udp.destination())
            }
            Some(Transport::Icmp4(icmp)) => {
                write!(f, " icmp type={} code={}", icmp.icmp_type(), icmp.code())
            }
            None => Ok(()),
        }
    }
}
