// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Types common to all IP versions

use etherparse::IpNumber;
use std::fmt::{Display, Formatter};

/// The IP protocol number ("next header" in IPv6 parlance).
///
/// Thin wrapper around etherparse's [`IpNumber`].
#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "u8", into = "u8"))]
pub struct NextHeader(IpNumber);

impl NextHeader {
    /// ICMP (for IPv4)
    pub const ICMP: NextHeader = NextHeader(IpNumber::ICMP);
    /// TCP
    pub const TCP: NextHeader = NextHeader(IpNumber::TCP);
    /// UDP
    pub const UDP: NextHeader = NextHeader(IpNumber::UDP);

    /// Create a [`NextHeader`] from a raw protocol number.
    #[must_use]
    pub const fn new(raw: u8) -> NextHeader {
        NextHeader(IpNumber(raw))
    }

    /// The raw protocol number.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self.0.0
    }
}

impl From<u8> for NextHeader {
    fn from(raw: u8) -> Self {
        NextHeader::new(raw)
    }
}

impl From<NextHeader> for u8 {
    fn from(value: NextHeader) -> Self {
        value.as_u8()
    }
}

impl From<IpNumber> for NextHeader {
    fn from(value: IpNumber) -> Self {
        NextHeader(value)
    }
}

impl From<NextHeader> for IpNumber {
    fn from(value: NextHeader) -> Self {
        value.0
    }
}

impl Display for NextHeader {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if *self == NextHeader::ICMP {
            write!(f, "icmp")
        } else if *self == NextHeader::TCP {
            write!(f, "tcp")
        } else if *self == NextHeader::UDP {
            write!(f, "udp")
        } else {
            write!(f, "{}", self.as_u8())
        }
    }
}
