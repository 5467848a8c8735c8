// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! IPv4 header conditions

use crate::PacketMatcher;
use crate::address::Inet4AddressMatch;
use config::{ConfigError, ConfigResult, InetMatchConfig};
use net::eth::ethtype::EthType;
use net::flow::MatchFields;
use net::ip::NextHeader;
use net::ipv4::dscp::Dscp;
use net::packet::Packet;
use std::fmt::Display;
use std::net::Ipv4Addr;

/// Conditions on the IPv4 header. Unset fields match anything.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Inet4Match {
    source: Option<Inet4AddressMatch>,
    destination: Option<Inet4AddressMatch>,
    protocol: Option<NextHeader>,
    dscp: Option<Dscp>,
}

fn address_match(
    what: &'static str,
    address: Option<Ipv4Addr>,
    suffix: Option<u32>,
) -> ConfigResult<Option<Inet4AddressMatch>> {
    match (address, suffix) {
        (None, None) => Ok(None),
        (None, Some(_)) => Err(ConfigError::MissingField(what)),
        (Some(address), suffix) => Inet4AddressMatch::new(address, suffix).map(Some),
    }
}

impl Inet4Match {
    /// Build an [`Inet4Match`] from its configuration.
    ///
    /// # Errors
    ///
    /// Fails if a CIDR suffix is given without address or is out of range, or if the protocol
    /// or DSCP values are out of range.
    pub fn new(config: &InetMatchConfig) -> ConfigResult<Self> {
        let protocol = config
            .protocol
            .map(|raw| {
                u8::try_from(raw)
                    .map(NextHeader::new)
                    .map_err(|_| ConfigError::InvalidProtocol(raw))
            })
            .transpose()?;
        let dscp = config
            .dscp
            .map(|raw| {
                u8::try_from(raw)
                    .ok()
                    .and_then(|raw| Dscp::new(raw).ok())
                    .ok_or(ConfigError::InvalidDscp(raw))
            })
            .transpose()?;
        Ok(Self {
            source: address_match("inet source address", config.source, config.source_suffix)?,
            destination: address_match(
                "inet destination address",
                config.destination,
                config.destination_suffix,
            )?,
            protocol,
            dscp,
        })
    }

    /// A condition on the IP protocol alone.
    #[must_use]
    pub fn with_only_protocol(protocol: NextHeader) -> Self {
        Self {
            protocol: Some(protocol),
            ..Default::default()
        }
    }

    /// Require the IP protocol `protocol`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ProtocolConflict`] if a different protocol is already required.
    pub fn require_protocol(self, protocol: NextHeader) -> ConfigResult<Self> {
        match self.protocol {
            Some(configured) if configured != protocol => Err(ConfigError::ProtocolConflict {
                configured: configured.as_u8(),
                required: protocol.as_u8(),
            }),
            _ => Ok(Self {
                protocol: Some(protocol),
                ..self
            }),
        }
    }

    /// The ethernet type of the packets this condition may apply to.
    #[must_use]
    pub fn ether_type(&self) -> EthType {
        EthType::IPV4
    }

    /// Source address condition
    #[must_use]
    pub fn source(&self) -> Option<Inet4AddressMatch> {
        self.source
    }

    /// Destination address condition
    #[must_use]
    pub fn destination(&self) -> Option<Inet4AddressMatch> {
        self.destination
    }

    /// IP protocol condition
    #[must_use]
    pub fn protocol(&self) -> Option<NextHeader> {
        self.protocol
    }

    /// DSCP condition
    #[must_use]
    pub fn dscp(&self) -> Option<Dscp> {
        self.dscp
    }

    /// The configuration of this condition.
    #[must_use]
    pub fn to_config(&self) -> InetMatchConfig {
        InetMatchConfig {
            source: self.source.map(|m| m.address()),
            source_suffix: self.source.and_then(|m| m.suffix()),
            destination: self.destination.map(|m| m.address()),
            destination_suffix: self.destination.and_then(|m| m.suffix()),
            protocol: self.protocol.map(|p| u32::from(p.as_u8())),
            dscp: self.dscp.map(|d| u32::from(d.value())),
        }
    }

    fn protocol_and_dscp_match(
        &self,
        packet: &mut Packet,
        protocol: NextHeader,
        dscp: Dscp,
    ) -> bool {
        let meta = packet.meta_mut();
        if let Some(p) = self.protocol {
            meta.add_match_field(MatchFields::NW_PROTO);
            if p != protocol {
                return false;
            }
        }
        if let Some(d) = self.dscp {
            meta.add_match_field(MatchFields::NW_TOS);
            if d != dscp {
                return false;
            }
        }
        true
    }
}

impl PacketMatcher for Inet4Match {
    fn matches(&self, packet: &mut Packet) -> bool {
        let Some(ip) = packet.try_ipv4() else {
            return false;
        };
        let (src, dst) = (ip.source(), ip.destination());
        let (protocol, dscp) = (ip.protocol(), ip.dscp());

        if let Some(m) = self.source {
            packet.meta_mut().add_match_field(MatchFields::NW_SRC);
            if !m.matches(src) {
                return false;
            }
        }
        if let Some(m) = self.destination {
            packet.meta_mut().add_match_field(MatchFields::NW_DST);
            if !m.matches(dst) {
                return false;
            }
        }
        self.protocol_and_dscp_match(packet, protocol, dscp)
    }
}

impl Display for Inet4Match {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "inet4[")?;
        let mut sep = "";
        if let Some(m) = self.source {
            write!(f, "src={m}")?;
            sep = ",";
        }
        if let Some(m) = self.destination {
            write!(f, "{sep}dst={m}")?;
            sep = ",";
        }
        if let Some(p) = self.protocol {
            write!(f, "{sep}proto={p}")?;
            sep = ",";
        }
        if let Some(d) = self.dscp {
            write!(f, "{sep}dscp={d}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::ErrorKind;
    use net::packet::test_utils::{build_test_arp_packet, build_test_udp_ipv4_packet};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_build_errors() {
        let config = InetMatchConfig {
            source_suffix: Some(8),
            ..Default::default()
        };
        let err = Inet4Match::new(&config).unwrap_err();
        assert_eq!(err, ConfigError::MissingField("inet source address"));
        assert_eq!(err.kind(), ErrorKind::NullArgument);

        let config = InetMatchConfig {
            destination: Some(Ipv4Addr::new(10, 0, 0, 0)),
            destination_suffix: Some(0),
            ..Default::default()
        };
        assert_eq!(
            Inet4Match::new(&config),
            Err(ConfigError::InvalidCidrSuffix {
                address: Ipv4Addr::new(10, 0, 0, 0),
                suffix: 0
            })
        );

        let config = InetMatchConfig {
            protocol: Some(256),
            ..Default::default()
        };
        assert_eq!(
            Inet4Match::new(&config),
            Err(ConfigError::InvalidProtocol(256))
        );

        let config = InetMatchConfig {
            dscp: Some(64),
            ..Default::default()
        };
        assert_eq!(Inet4Match::new(&config), Err(ConfigError::InvalidDscp(64)));
    }

    #[test]
    fn test_config_round_trip() {
        let config = InetMatchConfig {
            source: Some(Ipv4Addr::new(10, 0, 0, 0)),
            source_suffix: Some(8),
            destination: Some(Ipv4Addr::new(192, 168, 1, 1)),
            destination_suffix: None,
            protocol: Some(17),
            dscp: Some(46),
        };
        let m = Inet4Match::new(&config).unwrap();
        assert_eq!(m.to_config(), config);
        assert_eq!(
            m.to_string(),
            "inet4[src=10.0.0.0/8,dst=192.168.1.1,proto=udp,dscp=46]"
        );
    }

    #[test]
    fn test_require_protocol() {
        let m = Inet4Match::default()
            .require_protocol(NextHeader::TCP)
            .unwrap();
        assert_eq!(m, Inet4Match::with_only_protocol(NextHeader::TCP));
        assert_eq!(
            m.require_protocol(NextHeader::UDP),
            Err(ConfigError::ProtocolConflict {
                configured: 6,
                required: 17
            })
        );
    }

    #[test]
    fn test_match() {
        let m = Inet4Match::new(&InetMatchConfig {
            source: Some(Ipv4Addr::new(10, 0, 0, 0)),
            source_suffix: Some(8),
            protocol: Some(17),
            dscp: Some(0),
            ..Default::default()
        })
        .unwrap();

        let mut packet = build_test_udp_ipv4_packet("10.1.2.3", "192.168.0.1", 53, 53);
        assert!(m.matches(&mut packet));
        assert_eq!(
            packet.meta().match_fields(),
            MatchFields::NW_SRC | MatchFields::NW_PROTO | MatchFields::NW_TOS
        );

        let mut packet = build_test_udp_ipv4_packet("11.1.2.3", "192.168.0.1", 53, 53);
        assert!(!m.matches(&mut packet));
        assert_eq!(packet.meta().match_fields(), MatchFields::NW_SRC);

        let mut packet = build_test_udp_ipv4_packet("10.1.2.3", "192.168.0.1", 53, 53);
        packet
            .try_ipv4_mut()
            .unwrap()
            .set_dscp(Dscp::new(10).unwrap());
        assert!(!m.matches(&mut packet));

        // not an IPv4 packet
        let mut packet = build_test_arp_packet();
        assert!(!m.matches(&mut packet));
        assert!(Inet4Match::default().matches(&mut build_test_udp_ipv4_packet(
            "1.1.1.1", "2.2.2.2", 1, 2
        )));
        assert!(!Inet4Match::default().matches(&mut build_test_arp_packet()));
    }

    #[test]
    fn test_dscp_match() {
        bolero::check!()
            .with_type()
            .for_each(|&(wanted, actual): &(Dscp, Dscp)| {
                let m = Inet4Match::new(&InetMatchConfig {
                    dscp: Some(u32::from(wanted.value())),
                    ..Default::default()
                })
                .unwrap();
                let mut packet = build_test_udp_ipv4_packet("10.0.0.1", "10.0.0.2", 1, 2);
                packet.try_ipv4_mut().unwrap().set_dscp(actual);
                assert_eq!(m.matches(&mut packet), wanted == actual);
                assert_eq!(packet.meta().match_fields(), MatchFields::NW_TOS);
            });
    }
}
