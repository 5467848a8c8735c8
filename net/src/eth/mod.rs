// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Ethernet types

pub mod ethtype;
pub mod mac;
pub mod macvlan;

use crate::eth::ethtype::EthType;
use crate::eth::mac::Mac;
use etherparse::Ethernet2Header;

/// An ethernet header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eth {
    inner: Ethernet2Header,
}

impl Eth {
    /// Create a new [Eth] header.
    pub fn new(source: Mac, destination: Mac, ether_type: EthType) -> Eth {
        Eth {
            inner: Ethernet2Header {
                source: source.0,
                destination: destination.0,
                ether_type: ether_type.into(),
            },
        }
    }

    /// Get the source [Mac] of the header.
    pub fn source(&self) -> Mac {
        Mac(self.inner.source)
    }

    /// Get the destination [Mac] of the header.
    pub fn destination(&self) -> Mac {
        Mac(self.inner.destination)
    }

    /// Get the ethertype of the header.
    ///
    /// For a VLAN tagged frame this is the ethertype of the encapsulated payload, not the TPID.
    #[must_use]
    pub fn ether_type(&self) -> EthType {
        EthType::from(self.inner.ether_type)
    }

    /// Set the source [Mac] of the ethernet header.
    pub fn set_source(&mut self, source: Mac) -> &mut Eth {
        self.inner.source = source.0;
        self
    }

    /// Set the destination [Mac] of the ethernet header.
    pub fn set_destination(&mut self, destination: Mac) -> &mut Eth {
        self.inner.destination = destination.0;
        self
    }

    /// Set the ethertype of the header.
    pub fn set_ether_type(&mut self, ether_type: EthType) -> &mut Eth {
        self.inner.ether_type = ether_type.into();
        self
    }
}
