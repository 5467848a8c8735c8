// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Composite packet conditions spanning the ethernet, IPv4 and transport layers

use crate::PacketMatcher;
use crate::ethernet::EthernetMatch;
use crate::inet::Inet4Match;
use crate::l4::L4Match;
use config::{ConfigError, ConfigResult, FlowMatchConfig};
use net::packet::Packet;
use std::fmt::Display;
use std::num::NonZero;
use tracing::debug;

/// One entry of a flow condition.
///
/// A transport condition implies its IP protocol, and an IP condition implies its ethernet
/// type: both are made explicit at construction. A [`FlowMatch`] without any condition matches
/// every packet.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FlowMatch {
    index: NonZero<u16>,
    ethernet: Option<EthernetMatch>,
    inet: Option<Inet4Match>,
    l4: Option<L4Match>,
}

/// The layer conditions of a [`FlowMatch`], with the implied conditions filled in.
type Layers = (Option<EthernetMatch>, Option<Inet4Match>, Option<L4Match>);

/// Propagate the protocol implied by `l4` into `inet`, and the ethernet type implied by `inet`
/// into `ethernet`.
fn propagate(
    ethernet: Option<EthernetMatch>,
    inet: Option<Inet4Match>,
    l4: Option<L4Match>,
) -> ConfigResult<Layers> {
    let inet = match (inet, &l4) {
        (Some(inet), Some(l4)) => Some(inet.require_protocol(l4.protocol())?),
        (None, Some(l4)) => {
            debug!("{l4} implies IP protocol {}", l4.protocol());
            Some(Inet4Match::with_only_protocol(l4.protocol()))
        }
        (inet, None) => inet,
    };
    let ethernet = match (ethernet, &inet) {
        (Some(eth), Some(inet)) => Some(eth.require_ether_type(inet.ether_type())?),
        (None, Some(inet)) => {
            debug!("{inet} implies ethernet type {}", inet.ether_type());
            Some(EthernetMatch::with_only_ether_type(inet.ether_type()))
        }
        (eth, None) => eth,
    };
    Ok((ethernet, inet, l4))
}

impl FlowMatch {
    /// Lowest legal index.
    pub const MIN_INDEX: u32 = 1;
    /// Highest legal index.
    pub const MAX_INDEX: u32 = 65535;

    /// Build a [`FlowMatch`] from its configuration.
    ///
    /// # Errors
    ///
    /// Fails if the index is missing or out of range, if any layer condition is invalid, or if
    /// the layer conditions are inconsistent with each other (e.g. a TCP condition with an IP
    /// protocol condition other than TCP).
    pub fn new(config: &FlowMatchConfig) -> ConfigResult<Self> {
        let raw = config
            .index
            .ok_or(ConfigError::MissingField("flow match index"))?;
        let index = u16::try_from(raw)
            .ok()
            .and_then(NonZero::new)
            .ok_or(ConfigError::InvalidIndex {
                what: "flow match",
                index: raw,
                min: Self::MIN_INDEX,
                max: Self::MAX_INDEX,
            })?;
        let ethernet = config.ethernet.as_ref().map(EthernetMatch::new).transpose()?;
        let inet = config.inet.as_ref().map(Inet4Match::new).transpose()?;
        let l4 = config.l4.as_ref().map(L4Match::new).transpose()?;
        let (ethernet, inet, l4) = propagate(ethernet, inet, l4)?;
        Ok(Self {
            index,
            ethernet,
            inet,
            l4,
        })
    }

    /// The index of this entry in its flow condition.
    #[must_use]
    pub fn index(&self) -> u16 {
        self.index.get()
    }

    /// The ethernet condition, if any.
    #[must_use]
    pub fn ethernet(&self) -> Option<&EthernetMatch> {
        self.ethernet.as_ref()
    }

    /// The IPv4 condition, if any.
    #[must_use]
    pub fn inet(&self) -> Option<&Inet4Match> {
        self.inet.as_ref()
    }

    /// The transport condition, if any.
    #[must_use]
    pub fn l4(&self) -> Option<&L4Match> {
        self.l4.as_ref()
    }

    /// Returns true if this entry has no condition at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ethernet.is_none() && self.inet.is_none() && self.l4.is_none()
    }

    /// The configuration of this entry, implied conditions included.
    #[must_use]
    pub fn to_config(&self) -> FlowMatchConfig {
        FlowMatchConfig {
            index: Some(u32::from(self.index.get())),
            ethernet: self.ethernet.as_ref().map(EthernetMatch::to_config),
            inet: self.inet.as_ref().map(Inet4Match::to_config),
            l4: self.l4.as_ref().map(L4Match::to_config),
        }
    }
}

impl PacketMatcher for FlowMatch {
    fn matches(&self, packet: &mut Packet) -> bool {
        self.ethernet.as_ref().is_none_or(|m| m.matches(packet))
            && self.inet.as_ref().is_none_or(|m| m.matches(packet))
            && self.l4.as_ref().is_none_or(|m| m.matches(packet))
    }
}

impl Display for FlowMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:", self.index)?;
        if self.is_empty() {
            return write!(f, " any");
        }
        if let Some(m) = &self.ethernet {
            write!(f, " {m}")?;
        }
        if let Some(m) = &self.inet {
            write!(f, " {m}")?;
        }
        if let Some(m) = &self.l4 {
            write!(f, " {m}")?;
        }
        Ok(())
    }
}
