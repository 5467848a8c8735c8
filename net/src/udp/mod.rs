// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! UDP header type and logic.

use etherparse::UdpHeader;

/// A UDP header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Udp {
    inner: UdpHeader,
}

impl Udp {
    /// Create a new [`Udp`] header with the given ports.
    #[must_use]
    pub fn new(source: u16, destination: u16) -> Udp {
        Udp {
            inner: UdpHeader {
                source_port: source,
                destination_port: destination,
                ..Default::default()
            },
        }
    }

    /// The source port.
    #[must_use]
    pub fn source(&self) -> u16 {
        self.inner.source_port
    }

    /// The destination port.
    #[must_use]
    pub fn destination(&self) -> u16 {
        self.inner.destination_port
    }

    /// Set the source port.
    pub fn set_source(&mut self, port: u16) -> &mut Udp {
        self.inner.source_port = port;
        self
    }

    /// Set the destination port.
    pub fn set_destination(&mut self, port: u16) -> &mut Udp {
        self.inner.destination_port = port;
        self
    }
}
