// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! VLAN validation and manipulation.

use core::num::NonZero;
use etherparse::{EtherType, SingleVlanHeader, VlanId, VlanPcp};

/// A VLAN Identifier.
///
/// This type is marked `#[repr(transparent)]` to ensure that it has the same memory layout
/// as a [`NonZero<u16>`], so [`Option<Vid>`] has the size of a `u16`.  `None` is the natural
/// encoding of "untagged".
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u16", into = "u16"))]
pub struct Vid(NonZero<u16>);

/// A Priority Code Point.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub struct Pcp(u8);

/// Errors which can occur when converting a `u16` to a validated [`Vid`]
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[must_use]
pub enum InvalidVid {
    /// 0 is a reserved [`Vid`] which means "untagged" (or priority tagged).
    #[error("Zero is a reserved Vid")]
    Zero,
    /// 4095 is a reserved [`Vid`] per IEEE 802.1Q.
    #[error("4095 is a reserved Vid")]
    Reserved,
    /// The value is too large to be a legal [`Vid`] (12-bit max).
    #[error("{0} is too large to be a legal Vid ({MAX} is max legal value)", MAX = Vid::MAX)]
    TooLarge(u16),
}

/// Errors which can occur when converting a `u8` to a validated [`Pcp`]
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{0} is too large to be a legal Pcp ({max} is max legal value)", max = Pcp::MAX.0)]
pub struct InvalidPcp(pub u8);

impl InvalidVid {
    /// The raw `u16` value of the reserved (4095) [`Vid`]
    pub const RESERVED: u16 = 4095;
}

impl Vid {
    /// The minimum legal [`Vid`] value (1).
    pub const MIN: Vid = Vid(NonZero::<u16>::MIN);

    /// The maximum legal [`Vid`] value (2^12 - 2).
    pub const MAX: Vid = match NonZero::new(4094) {
        Some(max) => Vid(max),
        None => unreachable!(),
    };

    /// Create a new [`Vid`] from a `u16`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is 0, 4095 (reserved), or greater than [`Vid::MAX`].
    pub fn new(vid: u16) -> Result<Self, InvalidVid> {
        match NonZero::new(vid) {
            None => Err(InvalidVid::Zero),
            Some(val) if val.get() == InvalidVid::RESERVED => Err(InvalidVid::Reserved),
            Some(val) if val.get() > InvalidVid::RESERVED => Err(InvalidVid::TooLarge(val.get())),
            Some(val) => Ok(Vid(val)),
        }
    }

    /// Get the value of the [`Vid`] as a `u16`.
    #[must_use]
    pub fn as_u16(self) -> u16 {
        self.0.get()
    }
}

impl From<Vid> for u16 {
    fn from(vid: Vid) -> u16 {
        vid.as_u16()
    }
}

impl TryFrom<u16> for Vid {
    type Error = InvalidVid;

    fn try_from(vid: u16) -> Result<Vid, Self::Error> {
        Vid::new(vid)
    }
}

impl core::fmt::Display for Vid {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

impl Pcp {
    /// The lowest priority.
    pub const MIN: Pcp = Pcp(0);
    /// The highest priority.
    pub const MAX: Pcp = Pcp(VlanPcp::MAX_U8);

    /// Create a new [`Pcp`] from a `u8`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPcp`] if the value does not fit in 3 bits.
    pub fn new(raw: u8) -> Result<Pcp, InvalidPcp> {
        if raw > Self::MAX.0 {
            return Err(InvalidPcp(raw));
        }
        Ok(Pcp(raw))
    }

    /// Get the value of the [`Pcp`] as a `u8`.
    #[must_use]
    pub fn as_u8(self) -> u8 {
        self.0
    }
}

impl From<Pcp> for u8 {
    fn from(pcp: Pcp) -> u8 {
        pcp.0
    }
}

impl TryFrom<u8> for Pcp {
    type Error = InvalidPcp;

    fn try_from(raw: u8) -> Result<Pcp, InvalidPcp> {
        Pcp::new(raw)
    }
}

impl core::fmt::Display for Pcp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A VLAN header (802.1Q).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vlan {
    inner: SingleVlanHeader,
}

impl Vlan {
    /// Create a new [Vlan] header.
    #[must_use]
    pub fn new(vid: Vid, pcp: Pcp, ether_type: EtherType) -> Vlan {
        Vlan {
            inner: SingleVlanHeader {
                pcp: VlanPcp::try_new(pcp.as_u8()).unwrap_or_else(|_| unreachable!()),
                drop_eligible_indicator: false,
                vlan_id: VlanId::try_new(vid.as_u16()).unwrap_or_else(|_| unreachable!()),
                ether_type,
            },
        }
    }

    /// Get the [`Vid`] found in the header.
    ///
    /// # Errors
    ///
    /// The header may carry a reserved or zero (priority tagged) VLAN ID, in which case an
    /// [`InvalidVid`] error is returned.
    pub fn vid(&self) -> Result<Vid, InvalidVid> {
        Vid::new(self.inner.vlan_id.value())
    }

    /// The raw 12 bit VLAN ID, zero for priority tagged frames.
    #[must_use]
    pub fn raw_vid(&self) -> u16 {
        self.inner.vlan_id.value()
    }

    /// Get the [`Pcp`] of the header.
    #[must_use]
    pub fn pcp(&self) -> Pcp {
        Pcp(self.inner.pcp.value())
    }

    /// Rewrite the [`Pcp`] of the header.
    pub fn set_pcp(&mut self, pcp: Pcp) -> &mut Vlan {
        self.inner.pcp = VlanPcp::try_new(pcp.as_u8()).unwrap_or_else(|_| unreachable!());
        self
    }
}

#[cfg(any(test, feature = "bolero"))]
mod contract {
    use crate::vlan::{Pcp, Vid};
    use bolero::{Driver, TypeGenerator};

    impl TypeGenerator for Vid {
        fn generate<D: Driver>(driver: &mut D) -> Option<Self> {
            let raw = driver.produce::<u16>()? % Vid::MAX.as_u16() + 1;
            Vid::new(raw).ok()
        }
    }

    impl TypeGenerator for Pcp {
        fn generate<D: Driver>(driver: &mut D) -> Option<Self> {
            Pcp::new(driver.produce::<u8>()? & Pcp::MAX.as_u8()).ok()
        }
    }
}
