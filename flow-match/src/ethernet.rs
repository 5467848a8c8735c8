// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Ethernet and VLAN header conditions

use crate::PacketMatcher;
use config::{ConfigError, ConfigResult, EthernetMatchConfig};
use net::eth::ethtype::EthType;
use net::eth::mac::Mac;
use net::flow::MatchFields;
use net::packet::Packet;
use net::vlan::{Pcp, Vid};
use std::fmt::Display;

/// Condition on the VLAN tag of a frame.
///
/// VLAN IDs range over 1..=4094. 4095 is reserved by IEEE 802.1Q and never carried by a
/// frame, so a condition on it is rejected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum VlanMatch {
    /// Tagged or not.
    #[default]
    Any,
    /// Untagged (or priority tagged) frames only.
    Untagged,
    /// Frames tagged with a VLAN ID, and optionally a priority.
    Tagged(Vid, Option<Pcp>),
}

impl VlanMatch {
    fn from_config(vlan: Option<u32>, priority: Option<u32>) -> ConfigResult<Self> {
        let vid = match vlan {
            None | Some(0) => {
                if let Some(pcp) = priority {
                    return Err(ConfigError::PriorityWithoutVlan(pcp));
                }
                return Ok(if vlan.is_some() {
                    VlanMatch::Untagged
                } else {
                    VlanMatch::Any
                });
            }
            Some(raw) => u16::try_from(raw)
                .ok()
                .and_then(|raw| Vid::new(raw).ok())
                .ok_or(ConfigError::InvalidVlanId(raw))?,
        };
        let pcp = priority
            .map(|raw| {
                u8::try_from(raw)
                    .ok()
                    .and_then(|raw| Pcp::new(raw).ok())
                    .ok_or(ConfigError::InvalidVlanPriority(raw))
            })
            .transpose()?;
        Ok(VlanMatch::Tagged(vid, pcp))
    }
}

/// Conditions on the ethernet header. Unset fields match anything.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct EthernetMatch {
    source: Option<Mac>,
    destination: Option<Mac>,
    ether_type: Option<EthType>,
    vlan: VlanMatch,
}

impl EthernetMatch {
    /// Build an [`EthernetMatch`] from its configuration.
    ///
    /// # Errors
    ///
    /// Fails if the ethernet type or VLAN fields are out of range, or if a VLAN priority is
    /// given without a VLAN ID.
    pub fn new(config: &EthernetMatchConfig) -> ConfigResult<Self> {
        let ether_type = config
            .ether_type
            .map(|raw| {
                u16::try_from(raw)
                    .map(EthType::new)
                    .map_err(|_| ConfigError::InvalidEtherType(raw))
            })
            .transpose()?;
        Ok(Self {
            source: config.source,
            destination: config.destination,
            ether_type,
            vlan: VlanMatch::from_config(config.vlan, config.vlan_priority)?,
        })
    }

    /// A condition on the ethernet type alone.
    #[must_use]
    pub fn with_only_ether_type(ether_type: EthType) -> Self {
        Self {
            ether_type: Some(ether_type),
            ..Default::default()
        }
    }

    /// Require the ethernet type `ether_type`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EtherTypeConflict`] if a different ethernet type is already
    /// required.
    pub fn require_ether_type(self, ether_type: EthType) -> ConfigResult<Self> {
        match self.ether_type {
            Some(configured) if configured != ether_type => Err(ConfigError::EtherTypeConflict {
                configured: configured.as_u16(),
                required: ether_type.as_u16(),
            }),
            _ => Ok(Self {
                ether_type: Some(ether_type),
                ..self
            }),
        }
    }

    /// Source MAC address condition
    #[must_use]
    pub fn source(&self) -> Option<Mac> {
        self.source
    }

    /// Destination MAC address condition
    #[must_use]
    pub fn destination(&self) -> Option<Mac> {
        self.destination
    }

    /// Ethernet type condition
    #[must_use]
    pub fn ether_type(&self) -> Option<EthType> {
        self.ether_type
    }

    /// VLAN condition
    #[must_use]
    pub fn vlan(&self) -> VlanMatch {
        self.vlan
    }

    /// The configuration of this condition.
    #[must_use]
    pub fn to_config(&self) -> EthernetMatchConfig {
        let (vlan, vlan_priority) = match self.vlan {
            VlanMatch::Any => (None, None),
            VlanMatch::Untagged => (Some(0), None),
            VlanMatch::Tagged(vid, pcp) => (
                Some(u32::from(vid.as_u16())),
                pcp.map(|pcp| u32::from(pcp.as_u8())),
            ),
        };
        EthernetMatchConfig {
            source: self.source,
            destination: self.destination,
            ether_type: self.ether_type.map(|t| u32::from(t.as_u16())),
            vlan,
            vlan_priority,
        }
    }
}

impl PacketMatcher for EthernetMatch {
    fn matches(&self, packet: &mut Packet) -> bool {
        let eth = packet.eth();
        let (src, dst, ether_type) = (eth.source(), eth.destination(), eth.ether_type());
        let tag = packet.vlan().map(|vlan| (vlan.raw_vid(), vlan.pcp()));
        let meta = packet.meta_mut();

        if let Some(mac) = self.source {
            meta.add_match_field(MatchFields::DL_SRC);
            if mac != src {
                return false;
            }
        }
        if let Some(mac) = self.destination {
            meta.add_match_field(MatchFields::DL_DST);
            if mac != dst {
                return false;
            }
        }
        if let Some(t) = self.ether_type {
            meta.add_match_field(MatchFields::DL_TYPE);
            if t != ether_type {
                return false;
            }
        }
        match self.vlan {
            VlanMatch::Any => true,
            VlanMatch::Untagged => {
                meta.add_match_field(MatchFields::DL_VLAN);
                tag.is_none_or(|(raw_vid, _)| raw_vid == 0)
            }
            VlanMatch::Tagged(vid, pcp) => {
                meta.add_match_field(MatchFields::DL_VLAN);
                let Some((raw_vid, tag_pcp)) = tag else {
                    return false;
                };
                if raw_vid != vid.as_u16() {
                    return false;
                }
                match pcp {
                    None => true,
                    Some(pcp) => {
                        meta.add_match_field(MatchFields::DL_VLAN_PR);
                        pcp == tag_pcp
                    }
                }
            }
        }
    }
}

impl Display for EthernetMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ether[")?;
        let mut sep = "";
        if let Some(mac) = self.source {
            write!(f, "src={mac}")?;
            sep = ",";
        }
        if let Some(mac) = self.destination {
            write!(f, "{sep}dst={mac}")?;
            sep = ",";
        }
        if let Some(t) = self.ether_type {
            write!(f, "{sep}type={t}")?;
            sep = ",";
        }
        match self.vlan {
            VlanMatch::Any => {}
            VlanMatch::Untagged => write!(f, "{sep}vlan=untagged")?,
            VlanMatch::Tagged(vid, None) => write!(f, "{sep}vlan={vid}")?,
            VlanMatch::Tagged(vid, Some(pcp)) => write!(f, "{sep}vlan={vid},pcp={pcp}")?,
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::ErrorKind;
    use net::packet::test_utils::{
        TEST_DST_MAC, TEST_SRC_MAC, build_test_arp_packet, build_test_tcp_ipv4_packet, tag,
    };
    use pretty_assertions::assert_eq;

    fn tcp_packet() -> Packet {
        build_test_tcp_ipv4_packet("10.0.0.1", "10.0.0.2", 1234, 80)
    }

    #[test]
    fn test_priority_requires_vlan() {
        for priority in [5, 9] {
            let config = EthernetMatchConfig {
                vlan_priority: Some(priority),
                ..Default::default()
            };
            let err = EthernetMatch::new(&config).unwrap_err();
            assert_eq!(err, ConfigError::PriorityWithoutVlan(priority));
            assert_eq!(err.kind(), ErrorKind::BadArgument);
        }
        let config = EthernetMatchConfig {
            vlan: Some(0),
            vlan_priority: Some(5),
            ..Default::default()
        };
        assert_eq!(
            EthernetMatch::new(&config),
            Err(ConfigError::PriorityWithoutVlan(5))
        );
    }

    #[test]
    fn test_field_ranges() {
        let bad = [
            (
                EthernetMatchConfig {
                    ether_type: Some(0x1_0000),
                    ..Default::default()
                },
                ConfigError::InvalidEtherType(0x1_0000),
            ),
            (
                EthernetMatchConfig {
                    vlan: Some(4095),
                    ..Default::default()
                },
                ConfigError::InvalidVlanId(4095),
            ),
            (
                EthernetMatchConfig {
                    vlan: Some(10),
                    vlan_priority: Some(8),
                    ..Default::default()
                },
                ConfigError::InvalidVlanPriority(8),
            ),
        ];
        for (config, err) in bad {
            assert_eq!(EthernetMatch::new(&config), Err(err));
        }
    }

    #[test]
    fn test_vlan_id_bounds() {
        let vlan = |vlan| {
            EthernetMatch::new(&EthernetMatchConfig {
                vlan: Some(vlan),
                ..Default::default()
            })
            .map(|m| m.vlan())
        };
        assert_eq!(vlan(0), Ok(VlanMatch::Untagged));
        assert_eq!(vlan(1), Ok(VlanMatch::Tagged(Vid::new(1).unwrap(), None)));
        assert_eq!(vlan(4094), Ok(VlanMatch::Tagged(Vid::new(4094).unwrap(), None)));
        for reserved in [4095, 4096, 65536] {
            assert_eq!(vlan(reserved), Err(ConfigError::InvalidVlanId(reserved)));
        }
    }

    #[test]
    fn test_config_round_trip() {
        let config = EthernetMatchConfig {
            source: Some(TEST_SRC_MAC),
            destination: Some(TEST_DST_MAC),
            ether_type: Some(0x0800),
            vlan: Some(10),
            vlan_priority: Some(3),
        };
        let m = EthernetMatch::new(&config).unwrap();
        assert_eq!(m.to_config(), config);
        assert_eq!(
            m.to_string(),
            "ether[src=02:00:00:00:00:01,dst=02:00:00:00:00:02,type=0x0800,vlan=10,pcp=3]"
        );
        let untagged = EthernetMatchConfig {
            vlan: Some(0),
            ..Default::default()
        };
        let m = EthernetMatch::new(&untagged).unwrap();
        assert_eq!(m.vlan(), VlanMatch::Untagged);
        assert_eq!(m.to_config(), untagged);
    }

    #[test]
    fn test_require_ether_type() {
        let m = EthernetMatch::default()
            .require_ether_type(EthType::IPV4)
            .unwrap();
        assert_eq!(m, EthernetMatch::with_only_ether_type(EthType::IPV4));
        assert!(m.clone().require_ether_type(EthType::IPV4).is_ok());
        assert_eq!(
            m.require_ether_type(EthType::ARP),
            Err(ConfigError::EtherTypeConflict {
                configured: 0x0800,
                required: 0x0806
            })
        );
    }

    #[test]
    fn test_match_records_fields() {
        // empty condition matches anything, records nothing
        let mut packet = tcp_packet();
        assert!(EthernetMatch::default().matches(&mut packet));
        assert_eq!(packet.meta().match_fields(), MatchFields::empty());

        // a failing comparison still records its field
        let m = EthernetMatch::new(&EthernetMatchConfig {
            source: Some(TEST_DST_MAC),
            destination: Some(TEST_DST_MAC),
            ..Default::default()
        })
        .unwrap();
        let mut packet = tcp_packet();
        assert!(!m.matches(&mut packet));
        assert_eq!(packet.meta().match_fields(), MatchFields::DL_SRC);

        let m = EthernetMatch::new(&EthernetMatchConfig {
            source: Some(TEST_SRC_MAC),
            ether_type: Some(0x0806),
            ..Default::default()
        })
        .unwrap();
        let mut packet = tcp_packet();
        assert!(!m.matches(&mut packet));
        assert_eq!(
            packet.meta().match_fields(),
            MatchFields::DL_SRC | MatchFields::DL_TYPE
        );
        let mut arp = build_test_arp_packet();
        assert!(m.matches(&mut arp));
    }

    #[test]
    fn test_match_vlan() {
        let tagged = EthernetMatch::new(&EthernetMatchConfig {
            vlan: Some(10),
            vlan_priority: Some(5),
            ..Default::default()
        })
        .unwrap();
        let untagged = EthernetMatch::new(&EthernetMatchConfig {
            vlan: Some(0),
            ..Default::default()
        })
        .unwrap();

        let mut packet = tag(tcp_packet(), 10, 5);
        assert!(tagged.matches(&mut packet));
        assert_eq!(
            packet.meta().match_fields(),
            MatchFields::DL_VLAN | MatchFields::DL_VLAN_PR
        );
        assert!(!untagged.matches(&mut packet));

        // priority is not tested when the VLAN ID differs
        let mut packet = tag(tcp_packet(), 11, 5);
        assert!(!tagged.matches(&mut packet));
        assert_eq!(packet.meta().match_fields(), MatchFields::DL_VLAN);

        let mut packet = tag(tcp_packet(), 10, 4);
        assert!(!tagged.matches(&mut packet));

        let mut packet = tcp_packet();
        assert!(!tagged.matches(&mut packet));
        assert!(untagged.matches(&mut packet));
    }
}
