// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! IPv4 address / network conditions

use config::{ConfigError, ConfigResult};
use std::fmt::Display;
use std::net::Ipv4Addr;

/// An IPv4 address, or an IPv4 network given as address and CIDR suffix.
///
/// The address is masked at construction, so that `10.1.2.3/8` and `10.0.0.0/8` are equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Inet4AddressMatch {
    address: u32,
    mask: u32,
}

impl Inet4AddressMatch {
    /// Mask of an exact address match.
    pub const MASK_ALL: u32 = u32::MAX;
    /// Smallest accepted CIDR suffix.
    pub const MIN_SUFFIX: u32 = 1;
    /// Largest accepted CIDR suffix. A full length suffix is expressed by omitting the suffix.
    pub const MAX_SUFFIX: u32 = 31;

    /// Build an [`Inet4AddressMatch`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCidrSuffix`] if `suffix` is not in
    /// [[`Self::MIN_SUFFIX`], [`Self::MAX_SUFFIX`]].
    pub fn new(address: Ipv4Addr, suffix: Option<u32>) -> ConfigResult<Self> {
        let mask = match suffix {
            None => Self::MASK_ALL,
            Some(suffix) if (Self::MIN_SUFFIX..=Self::MAX_SUFFIX).contains(&suffix) => {
                u32::MAX << (32 - suffix)
            }
            Some(suffix) => return Err(ConfigError::InvalidCidrSuffix { address, suffix }),
        };
        Ok(Self {
            address: u32::from(address) & mask,
            mask,
        })
    }

    /// Match exactly one address.
    #[must_use]
    pub fn exact(address: Ipv4Addr) -> Self {
        Self {
            address: address.into(),
            mask: Self::MASK_ALL,
        }
    }

    /// The (masked) address.
    #[must_use]
    pub fn address(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.address)
    }

    /// The network mask.
    #[must_use]
    pub fn mask(&self) -> u32 {
        self.mask
    }

    /// The CIDR suffix, or `None` for an exact match.
    #[must_use]
    pub fn suffix(&self) -> Option<u32> {
        (self.mask != Self::MASK_ALL).then_some(self.mask.leading_ones())
    }

    /// Tell if `address` belongs to this network.
    #[must_use]
    pub fn matches(&self, address: Ipv4Addr) -> bool {
        u32::from(address) & self.mask == self.address
    }
}

impl Display for Inet4AddressMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.suffix() {
            Some(suffix) => write!(f, "{}/{suffix}", self.address()),
            None => write!(f, "{}", self.address()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_bounds() {
        let addr = Ipv4Addr::new(192, 168, 10, 1);
        for suffix in [0, 32, 33, 1000] {
            assert_eq!(
                Inet4AddressMatch::new(addr, Some(suffix)),
                Err(ConfigError::InvalidCidrSuffix {
                    address: addr,
                    suffix
                })
            );
        }
        assert_eq!(
            Inet4AddressMatch::new(addr, Some(1)).unwrap().mask(),
            0x8000_0000
        );
        assert_eq!(
            Inet4AddressMatch::new(addr, Some(31)).unwrap().mask(),
            0xffff_fffe
        );
        assert_eq!(
            Inet4AddressMatch::new(addr, None).unwrap(),
            Inet4AddressMatch::exact(addr)
        );
    }

    #[test]
    fn test_address_is_masked() {
        let m = Inet4AddressMatch::new(Ipv4Addr::new(10, 1, 2, 3), Some(8)).unwrap();
        assert_eq!(m.address(), Ipv4Addr::new(10, 0, 0, 0));
        assert_eq!(m.suffix(), Some(8));
        assert_eq!(m.to_string(), "10.0.0.0/8");
        assert_eq!(
            m,
            Inet4AddressMatch::new(Ipv4Addr::new(10, 0, 0, 0), Some(8)).unwrap()
        );
        assert!(m.matches(Ipv4Addr::new(10, 255, 0, 1)));
        assert!(!m.matches(Ipv4Addr::new(11, 0, 0, 0)));

        let exact = Inet4AddressMatch::exact(Ipv4Addr::new(10, 1, 2, 3));
        assert_eq!(exact.suffix(), None);
        assert_eq!(exact.to_string(), "10.1.2.3");
        assert!(exact.matches(Ipv4Addr::new(10, 1, 2, 3)));
        assert!(!exact.matches(Ipv4Addr::new(10, 1, 2, 4)));
    }

    #[test]
    fn test_mask_invariance() {
        bolero::check!()
            .with_type()
            .for_each(|(raw, suffix, noise): &(u32, u8, u32)| {
                let suffix = u32::from(*suffix) % Inet4AddressMatch::MAX_SUFFIX + 1;
                let addr = Ipv4Addr::from(*raw);
                let m = Inet4AddressMatch::new(addr, Some(suffix)).unwrap();
                assert!(m.matches(addr));
                assert_eq!(m.suffix(), Some(suffix));
                // host bits never change the outcome
                let host = Ipv4Addr::from(raw ^ (noise & !m.mask()));
                assert!(m.matches(host));
                // network bits always do
                let net_noise = noise & m.mask();
                if net_noise != 0 {
                    assert!(!m.matches(Ipv4Addr::from(raw ^ net_noise)));
                }
            });
    }
}
