// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! A (MAC address, VLAN ID) pair packed into a single integer.

use crate::eth::mac::Mac;
use crate::vlan::Vid;
use std::fmt::{Display, Formatter};

/// A [`Mac`] and a VLAN ID packed into 60 bits: the MAC address occupies bits 12..60 and the
/// VLAN ID the low 12 bits.  A VLAN ID of zero means "untagged".
///
/// Ordering is the numeric ordering of the packed value, so entries sort by MAC address first
/// and by VLAN ID second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct MacVlan(u64);

impl MacVlan {
    /// Number of bits used by the VLAN ID.
    pub const VLAN_BITS: u32 = 12;
    /// Mask selecting the VLAN ID bits.
    pub const VLAN_MASK: u64 = (1 << Self::VLAN_BITS) - 1;
    /// Mask selecting all the significant bits.
    pub const MASK: u64 = (1 << (Mac::BITS + Self::VLAN_BITS)) - 1;
    /// The "no MAC address" sentinel.
    pub const UNDEFINED: MacVlan = MacVlan(0);

    /// Pack a [`Mac`] and an optional [`Vid`] (`None` meaning untagged).
    #[must_use]
    pub fn new(mac: Mac, vid: Option<Vid>) -> MacVlan {
        let vlan = vid.map_or(0, |v| u64::from(v.as_u16()));
        MacVlan((mac.as_u64() << Self::VLAN_BITS) | vlan)
    }

    /// Build a [`MacVlan`] from its packed form.  Bits above the 60 significant ones are
    /// ignored.
    #[must_use]
    pub fn from_raw(raw: u64) -> MacVlan {
        MacVlan(raw & Self::MASK)
    }

    /// The packed form.
    #[must_use]
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// The MAC address part.
    pub fn mac(&self) -> Mac {
        Mac::from_u64(self.0 >> Self::VLAN_BITS)
    }

    /// The VLAN ID part, zero if untagged.
    #[must_use]
    pub fn vlan(&self) -> u16 {
        #[allow(clippy::cast_possible_truncation)] // masked to 12 bits
        let vlan = (self.0 & Self::VLAN_MASK) as u16;
        vlan
    }

    /// Returns true if this is the [`MacVlan::UNDEFINED`] sentinel.
    #[must_use]
    pub fn is_undefined(&self) -> bool {
        *self == Self::UNDEFINED
    }
}

impl Display for MacVlan {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.mac(), self.vlan())
    }
}
