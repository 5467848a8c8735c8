// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Transport layer header variants

use crate::icmp4::Icmp4;
use crate::ip::NextHeader;
use crate::tcp::Tcp;
use crate::udp::Udp;

/// The transport header carried by an IPv4 packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    /// A TCP header
    Tcp(Tcp),
    /// A UDP header
    Udp(Udp),
    /// An `ICMPv4` header
    Icmp4(Icmp4),
}

impl Transport {
    /// The IP protocol number that announces this header.
    #[must_use]
    pub fn protocol(&self) -> NextHeader {
        match self {
            Transport::Tcp(_) => NextHeader::TCP,
            Transport::Udp(_) => NextHeader::UDP,
            Transport::Icmp4(_) => NextHeader::ICMP,
        }
    }
}

impl From<Tcp> for Transport {
    fn from(value: Tcp) -> Self {
        Transport::Tcp(value)
    }
}

impl From<Udp> for Transport {
    fn from(value: Udp) -> Self {
        Transport::Udp(value)
    }
}

impl From<Icmp4> for Transport {
    fn from(value: Icmp4) -> Self {
        Transport::Icmp4(value)
    }
}
