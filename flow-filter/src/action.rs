// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Flow actions: header rewrites applied by PASS and REDIRECT flow filters

use config::{ConfigError, ConfigResult, FlowActionConfig};
use net::eth::mac::Mac;
use net::flow::FlowEntryAction;
use net::headers::Transport;
use net::ipv4::dscp::Dscp;
use net::packet::Packet;
use net::vlan::Pcp;
use std::fmt::Display;
use std::net::Ipv4Addr;
use tracing::trace;

/// A header rewrite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowAction {
    SetDlSrc(Mac),
    SetDlDst(Mac),
    SetInet4Src(Ipv4Addr),
    SetInet4Dst(Ipv4Addr),
    SetDscp(Dscp),
    SetIcmpType(u8),
    SetIcmpCode(u8),
    SetTpSrc(u16),
    SetTpDst(u16),
    SetVlanPcp(Pcp),
}

fn rewrite_mac(address: Option<Mac>) -> ConfigResult<Mac> {
    let mac = address.ok_or(ConfigError::MissingField("flow action MAC address"))?;
    let reason = if mac.is_broadcast() {
        "broadcast address"
    } else if mac.is_multicast() {
        "multicast address"
    } else if mac.is_zero() {
        "zero address"
    } else {
        return Ok(mac);
    };
    Err(ConfigError::InvalidMac {
        what: "flow action",
        mac: mac.to_string(),
        reason,
    })
}

fn port(port: Option<u32>) -> ConfigResult<u16> {
    let raw = port.ok_or(ConfigError::MissingField("flow action port"))?;
    u16::try_from(raw).map_err(|_| ConfigError::InvalidPort(raw))
}

impl FlowAction {
    /// Build a [`FlowAction`] from its configuration.
    ///
    /// # Errors
    ///
    /// Fails if the value of the action is missing or out of range, or if a MAC address is not
    /// a unicast address.
    pub fn new(config: &FlowActionConfig) -> ConfigResult<Self> {
        let action = match config {
            FlowActionConfig::SetDlSrc { address } => FlowAction::SetDlSrc(rewrite_mac(*address)?),
            FlowActionConfig::SetDlDst { address } => FlowAction::SetDlDst(rewrite_mac(*address)?),
            FlowActionConfig::SetInet4Src { address } => FlowAction::SetInet4Src(
                address.ok_or(ConfigError::MissingField("flow action IP address"))?,
            ),
            FlowActionConfig::SetInet4Dst { address } => FlowAction::SetInet4Dst(
                address.ok_or(ConfigError::MissingField("flow action IP address"))?,
            ),
            FlowActionConfig::SetDscp { dscp } => {
                let raw = dscp.ok_or(ConfigError::MissingField("flow action DSCP"))?;
                let dscp = u8::try_from(raw)
                    .ok()
                    .and_then(|raw| Dscp::new(raw).ok())
                    .ok_or(ConfigError::InvalidDscp(raw))?;
                FlowAction::SetDscp(dscp)
            }
            FlowActionConfig::SetIcmpType { icmp_type } => {
                let raw = icmp_type.ok_or(ConfigError::MissingField("flow action ICMP type"))?;
                FlowAction::SetIcmpType(
                    u8::try_from(raw).map_err(|_| ConfigError::InvalidIcmpType(raw))?,
                )
            }
            FlowActionConfig::SetIcmpCode { code } => {
                let raw = code.ok_or(ConfigError::MissingField("flow action ICMP code"))?;
                FlowAction::SetIcmpCode(
                    u8::try_from(raw).map_err(|_| ConfigError::InvalidIcmpCode(raw))?,
                )
            }
            FlowActionConfig::SetTpSrc { port: p } => FlowAction::SetTpSrc(port(*p)?),
            FlowActionConfig::SetTpDst { port: p } => FlowAction::SetTpDst(port(*p)?),
            FlowActionConfig::SetVlanPcp { priority } => {
                let raw = priority.ok_or(ConfigError::MissingField("flow action VLAN priority"))?;
                let pcp = u8::try_from(raw)
                    .ok()
                    .and_then(|raw| Pcp::new(raw).ok())
                    .ok_or(ConfigError::InvalidVlanPriority(raw))?;
                FlowAction::SetVlanPcp(pcp)
            }
        };
        Ok(action)
    }

    /// The configuration of this action.
    #[must_use]
    pub fn to_config(&self) -> FlowActionConfig {
        match *self {
            FlowAction::SetDlSrc(mac) => FlowActionConfig::SetDlSrc { address: Some(mac) },
            FlowAction::SetDlDst(mac) => FlowActionConfig::SetDlDst { address: Some(mac) },
            FlowAction::SetInet4Src(a) => FlowActionConfig::SetInet4Src { address: Some(a) },
            FlowAction::SetInet4Dst(a) => FlowActionConfig::SetInet4Dst { address: Some(a) },
            FlowAction::SetDscp(d) => FlowActionConfig::SetDscp {
                dscp: Some(u32::from(d.value())),
            },
            FlowAction::SetIcmpType(t) => FlowActionConfig::SetIcmpType {
                icmp_type: Some(u32::from(t)),
            },
            FlowAction::SetIcmpCode(c) => FlowActionConfig::SetIcmpCode {
                code: Some(u32::from(c)),
            },
            FlowAction::SetTpSrc(p) => FlowActionConfig::SetTpSrc {
                port: Some(u32::from(p)),
            },
            FlowAction::SetTpDst(p) => FlowActionConfig::SetTpDst {
                port: Some(u32::from(p)),
            },
            FlowAction::SetVlanPcp(pcp) => FlowActionConfig::SetVlanPcp {
                priority: Some(u32::from(pcp.as_u8())),
            },
        }
    }

    /// The flow entry action equivalent to this rewrite.
    #[must_use]
    pub fn entry_action(&self) -> FlowEntryAction {
        match *self {
            FlowAction::SetDlSrc(mac) => FlowEntryAction::SetDlSrc(mac),
            FlowAction::SetDlDst(mac) => FlowEntryAction::SetDlDst(mac),
            FlowAction::SetInet4Src(a) => FlowEntryAction::SetNwSrc(a),
            FlowAction::SetInet4Dst(a) => FlowEntryAction::SetNwDst(a),
            FlowAction::SetDscp(d) => FlowEntryAction::SetNwTos(d),
            FlowAction::SetIcmpType(t) => FlowEntryAction::SetTpSrc(u16::from(t)),
            FlowAction::SetIcmpCode(c) => FlowEntryAction::SetTpDst(u16::from(c)),
            FlowAction::SetTpSrc(p) => FlowEntryAction::SetTpSrc(p),
            FlowAction::SetTpDst(p) => FlowEntryAction::SetTpDst(p),
            FlowAction::SetVlanPcp(pcp) => FlowEntryAction::SetVlanPcp(pcp),
        }
    }

    /// Rewrite the header of `packet`.
    ///
    /// Returns false, leaving the packet untouched, if the packet lacks the header this action
    /// modifies. Otherwise the equivalent flow entry action is recorded in the packet context.
    pub fn apply(&self, packet: &mut Packet) -> bool {
        let applied = match *self {
            FlowAction::SetDlSrc(mac) => {
                packet.eth_mut().set_source(mac);
                true
            }
            FlowAction::SetDlDst(mac) => {
                packet.eth_mut().set_destination(mac);
                true
            }
            FlowAction::SetInet4Src(a) => packet
                .try_ipv4_mut()
                .map(|ip| ip.set_source(a))
                .is_some(),
            FlowAction::SetInet4Dst(a) => packet
                .try_ipv4_mut()
                .map(|ip| ip.set_destination(a))
                .is_some(),
            FlowAction::SetDscp(d) => packet.try_ipv4_mut().map(|ip| ip.set_dscp(d)).is_some(),
            FlowAction::SetIcmpType(t) => packet
                .try_icmp4_mut()
                .map(|icmp| icmp.set_icmp_type(t))
                .is_some(),
            FlowAction::SetIcmpCode(c) => packet
                .try_icmp4_mut()
                .map(|icmp| icmp.set_code(c))
                .is_some(),
            FlowAction::SetTpSrc(p) => match packet.try_transport_mut() {
                Some(Transport::Tcp(tcp)) => {
                    tcp.set_source(p);
                    true
                }
                Some(Transport::Udp(udp)) => {
                    udp.set_source(p);
                    true
                }
                _ => false,
            },
            FlowAction::SetTpDst(p) => match packet.try_transport_mut() {
                Some(Transport::Tcp(tcp)) => {
                    tcp.set_destination(p);
                    true
                }
                Some(Transport::Udp(udp)) => {
                    udp.set_destination(p);
                    true
                }
                _ => false,
            },
            FlowAction::SetVlanPcp(pcp) => packet.vlan_mut().map(|v| v.set_pcp(pcp)).is_some(),
        };
        if applied {
            packet.meta_mut().add_action(self.entry_action());
        } else {
            trace!("Flow action {self} does not apply to {}", packet.source_key());
        }
        applied
    }
}

impl Display for FlowAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlowAction::SetDlSrc(mac) => write!(f, "set-dl-src({mac})"),
            FlowAction::SetDlDst(mac) => write!(f, "set-dl-dst({mac})"),
            FlowAction::SetInet4Src(a) => write!(f, "set-inet4-src({a})"),
            FlowAction::SetInet4Dst(a) => write!(f, "set-inet4-dst({a})"),
            FlowAction::SetDscp(d) => write!(f, "set-dscp({d})"),
            FlowAction::SetIcmpType(t) => write!(f, "set-icmp-type({t})"),
            FlowAction::SetIcmpCode(c) => write!(f, "set-icmp-code({c})"),
            FlowAction::SetTpSrc(p) => write!(f, "set-tp-src({p})"),
            FlowAction::SetTpDst(p) => write!(f, "set-tp-dst({p})"),
            FlowAction::SetVlanPcp(pcp) => write!(f, "set-vlan-pcp({pcp})"),
        }
    }
}
