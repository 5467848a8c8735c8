// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! TCP header type and logic.

use etherparse::TcpHeader;

/// A TCP header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tcp {
    inner: TcpHeader,
}

impl Tcp {
    /// Create a new [`Tcp`] header with the given ports.
    #[must_use]
    pub fn new(source: u16, destination: u16) -> Tcp {
        Tcp {
            inner: TcpHeader::new(source, destination, 0, u16::MAX),
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
    pub fn set_source(&mut self, port: u16) -> &mut Tcp {
        self.inner.source_port = port;
        self
    }

    /// Set the destination port.
    pub fn set_destination(&mut self, port: u16) -> &mut Tcp {
        self.inner.destination_port = port;
        self
    }
}
