// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Flow filter and flow action configuration objects

use net::eth::mac::Mac;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// Direction of the packets a flow filter list applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectionConfig {
    #[default]
    In,
    Out,
}

/// The flow filters attached to one virtual node, for one direction.
///
/// The owner is a tenant alone, a bridge or terminal of the tenant, or an interface of such a
/// bridge or terminal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterMapConfig {
    pub tenant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bridge: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,
    #[serde(default)]
    pub direction: DirectionConfig,
    #[serde(default)]
    pub filters: Vec<FlowFilterConfig>,
}

/// A flow filter: what to do with the packets that match a flow condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlowFilterConfig {
    pub index: Option<u32>,
    pub condition: Option<String>,
    pub filter: Option<FilterTypeConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<FlowActionConfig>,
}

/// The type of a flow filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FilterTypeConfig {
    Pass,
    Drop,
    Redirect(RedirectConfig),
}

/// Parameters of a REDIRECT flow filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectConfig {
    pub destination: Option<RedirectDestinationConfig>,
    /// Redirect as outgoing packet (true) or incoming packet (false).
    #[serde(default)]
    pub output: bool,
}

/// A virtual interface within the tenant of the flow filter.
///
/// Exactly one of `bridge` and `terminal` must be given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RedirectDestinationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bridge: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal: Option<String>,
    pub interface: Option<String>,
}

/// A header rewrite applied by PASS and REDIRECT flow filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum FlowActionConfig {
    SetDlSrc { address: Option<Mac> },
    SetDlDst { address: Option<Mac> },
    SetInet4Src { address: Option<Ipv4Addr> },
    SetInet4Dst { address: Option<Ipv4Addr> },
    SetDscp { dscp: Option<u32> },
    SetIcmpType { icmp_type: Option<u32> },
    SetIcmpCode { code: Option<u32> },
    SetTpSrc { port: Option<u32> },
    SetTpDst { port: Option<u32> },
    SetVlanPcp { priority: Option<u32> },
}
