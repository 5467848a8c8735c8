// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Flow condition configuration objects
//!
//! These are the shapes in which flow conditions reach the core. Numeric fields are wider than
//! the protocol fields they stand for: range checks happen when they get converted into matchers.

use net::eth::mac::Mac;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// A named flow condition: a list of flow matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlowConditionConfig {
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matches: Vec<FlowMatchConfig>,
}

/// One entry of a flow condition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlowMatchConfig {
    pub index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ethernet: Option<EthernetMatchConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inet: Option<InetMatchConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub l4: Option<L4MatchConfig>,
}

/// Ethernet header conditions. Absent fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EthernetMatchConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Mac>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<Mac>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ether_type: Option<u32>,
    /// VLAN ID; 0 matches untagged frames.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vlan: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vlan_priority: Option<u32>,
}

/// IPv4 header conditions. Absent fields match anything.
///
/// An address without a suffix is matched exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InetMatchConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Ipv4Addr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_suffix: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<Ipv4Addr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_suffix: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dscp: Option<u32>,
}

/// Transport layer conditions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum L4MatchConfig {
    Tcp(PortProtoMatchConfig),
    Udp(PortProtoMatchConfig),
    Icmp(IcmpMatchConfig),
}

/// TCP or UDP port conditions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortProtoMatchConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PortRangeConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<PortRangeConfig>,
}

/// An inclusive port range. A range without upper bound is a single port.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PortRangeConfig {
    pub from: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<u32>,
}

impl PortRangeConfig {
    /// A single port.
    #[must_use]
    pub fn port(port: u32) -> Self {
        Self {
            from: Some(port),
            to: None,
        }
    }

    /// The ports from `from` to `to`, inclusive.
    #[must_use]
    pub fn range(from: u32, to: u32) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }
}

/// ICMP conditions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IcmpMatchConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icmp_type: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    #[test]
    fn test_flow_condition_from_yaml() {
        let yaml = r#"
name: cond1
matches:
  - index: 1
    l4:
      type: tcp
      destination:
        from: 80
  - index: 2
    ethernet:
      source: "02:00:00:00:00:01"
      vlan: 10
      vlan_priority: 5
    inet:
      source: 10.0.0.0
      source_suffix: 8
      dscp: 46
"#;
        let cond: FlowConditionConfig = serde_yaml_ng::from_str(yaml).unwrap();
        let expected = FlowConditionConfig {
            name: Some("cond1".to_string()),
            matches: vec![
                FlowMatchConfig {
                    index: Some(1),
                    l4: Some(L4MatchConfig::Tcp(PortProtoMatchConfig {
                        source: None,
                        destination: Some(PortRangeConfig::port(80)),
                    })),
                    ..Default::default()
                },
                FlowMatchConfig {
                    index: Some(2),
                    ethernet: Some(EthernetMatchConfig {
                        source: Some(Mac::from_str("02:00:00:00:00:01").unwrap()),
                        vlan: Some(10),
                        vlan_priority: Some(5),
                        ..Default::default()
                    }),
                    inet: Some(InetMatchConfig {
                        source: Some(Ipv4Addr::new(10, 0, 0, 0)),
                        source_suffix: Some(8),
                        dscp: Some(46),
                        ..Default::default()
                    }),
                    l4: None,
                },
            ],
        };
        assert_eq!(cond, expected);
    }

    #[test]
    fn test_flow_match_json_round_trip() {
        let json = r#"{"index":3,"l4":{"type":"icmp","icmp_type":8}}"#;
        let fm: FlowMatchConfig = serde_json::from_str(json).unwrap();
        assert_eq!(
            fm.l4,
            Some(L4MatchConfig::Icmp(IcmpMatchConfig {
                icmp_type: Some(8),
                code: None
            }))
        );
        assert_eq!(serde_json::to_string(&fm).unwrap(), json);
    }

    #[test]
    fn test_bad_mac_rejected() {
        let yaml = "source: \"02:00:00:00:00\"";
        assert!(serde_yaml_ng::from_str::<EthernetMatchConfig>(yaml).is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = "index: 1\nbogus: 3";
        assert!(serde_yaml_ng::from_str::<FlowMatchConfig>(yaml).is_err());
    }
}
