// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Transport layer conditions

use crate::PacketMatcher;
use crate::port::L4PortMatch;
use config::{ConfigError, ConfigResult, IcmpMatchConfig, L4MatchConfig, PortProtoMatchConfig};
use net::flow::MatchFields;
use net::headers::Transport;
use net::ip::NextHeader;
use net::packet::Packet;
use std::fmt::Display;

/// Source and destination port conditions of TCP or UDP. Unset fields match anything.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PortProtoMatch {
    source: Option<L4PortMatch>,
    destination: Option<L4PortMatch>,
}

impl PortProtoMatch {
    /// Build a [`PortProtoMatch`] from its configuration.
    ///
    /// # Errors
    ///
    /// Fails if any of the port ranges is invalid.
    pub fn new(config: &PortProtoMatchConfig) -> ConfigResult<Self> {
        Ok(Self {
            source: config.source.as_ref().map(L4PortMatch::from_config).transpose()?,
            destination: config
                .destination
                .as_ref()
                .map(L4PortMatch::from_config)
                .transpose()?,
        })
    }

    /// Source port condition
    #[must_use]
    pub fn source(&self) -> Option<L4PortMatch> {
        self.source
    }

    /// Destination port condition
    #[must_use]
    pub fn destination(&self) -> Option<L4PortMatch> {
        self.destination
    }

    /// The configuration of this condition.
    #[must_use]
    pub fn to_config(&self) -> PortProtoMatchConfig {
        PortProtoMatchConfig {
            source: self.source.map(|m| m.to_config()),
            destination: self.destination.map(|m| m.to_config()),
        }
    }

    fn matches_ports(&self, packet: &mut Packet, source: u16, destination: u16) -> bool {
        let meta = packet.meta_mut();
        if let Some(m) = self.source {
            meta.add_match_field(MatchFields::TP_SRC);
            if !m.matches(source) {
                return false;
            }
        }
        if let Some(m) = self.destination {
            meta.add_match_field(MatchFields::TP_DST);
            if !m.matches(destination) {
                return false;
            }
        }
        true
    }
}

impl Display for PortProtoMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.source, self.destination) {
            (Some(src), Some(dst)) => write!(f, "src={src},dst={dst}"),
            (Some(src), None) => write!(f, "src={src}"),
            (None, Some(dst)) => write!(f, "dst={dst}"),
            (None, None) => Ok(()),
        }
    }
}

/// ICMP type and code conditions. Unset fields match anything.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct IcmpMatch {
    icmp_type: Option<u8>,
    code: Option<u8>,
}

impl IcmpMatch {
    /// Build an [`IcmpMatch`] from its configuration.
    ///
    /// # Errors
    ///
    /// Fails if the type or code do not fit in 8 bits.
    pub fn new(config: &IcmpMatchConfig) -> ConfigResult<Self> {
        let icmp_type = config
            .icmp_type
            .map(|raw| u8::try_from(raw).map_err(|_| ConfigError::InvalidIcmpType(raw)))
            .transpose()?;
        let code = config
            .code
            .map(|raw| u8::try_from(raw).map_err(|_| ConfigError::InvalidIcmpCode(raw)))
            .transpose()?;
        Ok(Self { icmp_type, code })
    }

    /// ICMP type condition
    #[must_use]
    pub fn icmp_type(&self) -> Option<u8> {
        self.icmp_type
    }

    /// ICMP code condition
    #[must_use]
    pub fn code(&self) -> Option<u8> {
        self.code
    }

    /// The configuration of this condition.
    #[must_use]
    pub fn to_config(&self) -> IcmpMatchConfig {
        IcmpMatchConfig {
            icmp_type: self.icmp_type.map(u32::from),
            code: self.code.map(u32::from),
        }
    }
}

impl PacketMatcher for IcmpMatch {
    // ICMP type and code are reported as TP_SRC and TP_DST.
    fn matches(&self, packet: &mut Packet) -> bool {
        let Some(icmp) = packet.try_icmp4() else {
            return false;
        };
        let (icmp_type, code) = (icmp.icmp_type(), icmp.code());
        let meta = packet.meta_mut();
        if let Some(t) = self.icmp_type {
            meta.add_match_field(MatchFields::TP_SRC);
            if t != icmp_type {
                return false;
            }
        }
        if let Some(c) = self.code {
            meta.add_match_field(MatchFields::TP_DST);
            if c != code {
                return false;
            }
        }
        true
    }
}

impl Display for IcmpMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.icmp_type, self.code) {
            (Some(t), Some(c)) => write!(f, "type={t},code={c}"),
            (Some(t), None) => write!(f, "type={t}"),
            (None, Some(c)) => write!(f, "code={c}"),
            (None, None) => Ok(()),
        }
    }
}

/// A transport layer condition. The variant alone requires the transport protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum L4Match {
    Tcp(PortProtoMatch),
    Udp(PortProtoMatch),
    Icmp(IcmpMatch),
}

impl L4Match {
    /// Build an [`L4Match`] from its configuration.
    ///
    /// # Errors
    ///
    /// Fails if any of the fields of the condition is invalid.
    pub fn new(config: &L4MatchConfig) -> ConfigResult<Self> {
        Ok(match config {
            L4MatchConfig::Tcp(ports) => L4Match::Tcp(PortProtoMatch::new(ports)?),
            L4MatchConfig::Udp(ports) => L4Match::Udp(PortProtoMatch::new(ports)?),
            L4MatchConfig::Icmp(icmp) => L4Match::Icmp(IcmpMatch::new(icmp)?),
        })
    }

    /// The IP protocol implied by this condition.
    #[must_use]
    pub fn protocol(&self) -> NextHeader {
        match self {
            L4Match::Tcp(_) => NextHeader::TCP,
            L4Match::Udp(_) => NextHeader::UDP,
            L4Match::Icmp(_) => NextHeader::ICMP,
        }
    }

    /// The configuration of this condition.
    #[must_use]
    pub fn to_config(&self) -> L4MatchConfig {
        match self {
            L4Match::Tcp(ports) => L4MatchConfig::Tcp(ports.to_config()),
            L4Match::Udp(ports) => L4MatchConfig::Udp(ports.to_config()),
            L4Match::Icmp(icmp) => L4MatchConfig::Icmp(icmp.to_config()),
        }
    }
}

impl PacketMatcher for L4Match {
    fn matches(&self, packet: &mut Packet) -> bool {
        let (m, source, destination) = match self {
            L4Match::Icmp(m) => return m.matches(packet),
            L4Match::Tcp(m) => match packet.try_transport() {
                Some(Transport::Tcp(tcp)) => (m, tcp.source(), tcp.destination()),
                _ => return false,
            },
            L4Match::Udp(m) => match packet.try_transport() {
                Some(Transport::Udp(udp)) => (m, udp.source(), udp.destination()),
                _ => return false,
            },
        };
        m.matches_ports(packet, source, destination)
    }
}

impl Display for L4Match {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            L4Match::Tcp(m) => write!(f, "tcp[{m}]"),
            L4Match::Udp(m) => write!(f, "udp[{m}]"),
            L4Match::Icmp(m) => write!(f, "icmp[{m}]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::PortRangeConfig;
    use net::packet::test_utils::{
        build_test_icmp4_packet, build_test_tcp_ipv4_packet, build_test_udp_ipv4_packet,
    };

    fn tcp_dst(port: u32) -> L4Match {
        L4Match::new(&L4MatchConfig::Tcp(PortProtoMatchConfig {
            source: None,
            destination: Some(PortRangeConfig::port(port)),
        }))
        .unwrap()
    }

    #[test]
    fn test_build_errors() {
        let icmp = IcmpMatchConfig {
            icmp_type: Some(256),
            code: None,
        };
        assert_eq!(
            L4Match::new(&L4MatchConfig::Icmp(icmp)),
            Err(ConfigError::InvalidIcmpType(256))
        );
        let icmp = IcmpMatchConfig {
            icmp_type: Some(8),
            code: Some(300),
        };
        assert_eq!(
            L4Match::new(&L4MatchConfig::Icmp(icmp)),
            Err(ConfigError::InvalidIcmpCode(300))
        );
        let ports = PortProtoMatchConfig {
            source: Some(PortRangeConfig::range(90, 80)),
            destination: None,
        };
        assert_eq!(
            L4Match::new(&L4MatchConfig::Udp(ports)),
            Err(ConfigError::InvalidPortRange(90, 80))
        );
    }

    #[test]
    fn test_protocol_and_display() {
        let m = tcp_dst(80);
        assert_eq!(m.protocol(), NextHeader::TCP);
        assert_eq!(m.to_string(), "tcp[dst=80]");
        let m = L4Match::new(&L4MatchConfig::Icmp(IcmpMatchConfig {
            icmp_type: Some(8),
            code: Some(0),
        }))
        .unwrap();
        assert_eq!(m.protocol(), NextHeader::ICMP);
        assert_eq!(m.to_string(), "icmp[type=8,code=0]");
    }

    #[test]
    fn test_match_ports() {
        let m = tcp_dst(80);
        let mut packet = build_test_tcp_ipv4_packet("10.0.0.1", "10.0.0.2", 12345, 80);
        assert!(m.matches(&mut packet));
        assert_eq!(packet.meta().match_fields(), MatchFields::TP_DST);

        let mut packet = build_test_tcp_ipv4_packet("10.0.0.1", "10.0.0.2", 12345, 8080);
        assert!(!m.matches(&mut packet));
        assert_eq!(packet.meta().match_fields(), MatchFields::TP_DST);

        // protocol discriminates, even if ports would match
        let mut packet = build_test_udp_ipv4_packet("10.0.0.1", "10.0.0.2", 12345, 80);
        assert!(!m.matches(&mut packet));
        assert_eq!(packet.meta().match_fields(), MatchFields::empty());
    }

    #[test]
    fn test_match_icmp() {
        let m = L4Match::new(&L4MatchConfig::Icmp(IcmpMatchConfig {
            icmp_type: Some(8),
            code: Some(0),
        }))
        .unwrap();
        let mut packet = build_test_icmp4_packet("10.0.0.1", "10.0.0.2", 8, 0);
        assert!(m.matches(&mut packet));
        assert_eq!(
            packet.meta().match_fields(),
            MatchFields::TP_SRC | MatchFields::TP_DST
        );
        let mut packet = build_test_icmp4_packet("10.0.0.1", "10.0.0.2", 0, 0);
        assert!(!m.matches(&mut packet));
        assert_eq!(packet.meta().match_fields(), MatchFields::TP_SRC);

        let mut packet = build_test_tcp_ipv4_packet("10.0.0.1", "10.0.0.2", 8, 0);
        assert!(!m.matches(&mut packet));
    }
}
