// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Ipv4 header type and manipulation

pub mod dscp;

use crate::ip::NextHeader;
use crate::ipv4::dscp::Dscp;
use etherparse::Ipv4Header;
use std::net::Ipv4Addr;

/// An IPv4 header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ipv4 {
    inner: Ipv4Header,
}

impl Ipv4 {
    /// Default TTL of headers built with [`Ipv4::new`].
    pub const DEFAULT_TTL: u8 = 64;

    /// Create a new [`Ipv4`] header.
    #[must_use]
    pub fn new(source: Ipv4Addr, destination: Ipv4Addr, protocol: NextHeader) -> Ipv4 {
        Ipv4 {
            inner: Ipv4Header {
                source: source.octets(),
                destination: destination.octets(),
                protocol: protocol.into(),
                time_to_live: Self::DEFAULT_TTL,
                ..Default::default()
            },
        }
    }

    /// The source address.
    #[must_use]
    pub fn source(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.inner.source)
    }

    /// The destination address.
    #[must_use]
    pub fn destination(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.inner.destination)
    }

    /// The protocol number of the payload.
    #[must_use]
    pub fn protocol(&self) -> NextHeader {
        NextHeader::from(self.inner.protocol)
    }

    /// The [`Dscp`] of the header.
    #[must_use]
    pub fn dscp(&self) -> Dscp {
        Dscp::from(self.inner.dscp)
    }

    /// Set the source address.
    pub fn set_source(&mut self, source: Ipv4Addr) -> &mut Ipv4 {
        self.inner.source = source.octets();
        self
    }

    /// Set the destination address.
    pub fn set_destination(&mut self, destination: Ipv4Addr) -> &mut Ipv4 {
        self.inner.destination = destination.octets();
        self
    }

    /// Set the [`Dscp`] of the header.
    pub fn set_dscp(&mut self, dscp: Dscp) -> &mut Ipv4 {
        self.inner.dscp = dscp.into();
        self
    }
}
