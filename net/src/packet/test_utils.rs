// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Packet builders for tests

#![allow(clippy::missing_panics_doc)]

use crate::eth::Eth;
use crate::eth::ethtype::EthType;
use crate::eth::mac::Mac;
use crate::icmp4::Icmp4;
use crate::ip::NextHeader;
use crate::ipv4::Ipv4;
use crate::packet::Packet;
use crate::tcp::Tcp;
use crate::udp::Udp;
use crate::vlan::{Pcp, Vid, Vlan};
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Source MAC address of the packets built by this module.
pub const TEST_SRC_MAC: Mac = Mac([0x02, 0, 0, 0, 0, 0x01]);
/// Destination MAC address of the packets built by this module.
pub const TEST_DST_MAC: Mac = Mac([0x02, 0, 0, 0, 0, 0x02]);

fn ipv4_packet(src_ip: &str, dst_ip: &str, proto: NextHeader) -> Packet {
    let src = Ipv4Addr::from_str(src_ip).unwrap_or_else(|e| unreachable!("{src_ip}: {e}"));
    let dst = Ipv4Addr::from_str(dst_ip).unwrap_or_else(|e| unreachable!("{dst_ip}: {e}"));
    Packet::new(Eth::new(TEST_SRC_MAC, TEST_DST_MAC, EthType::IPV4))
        .with_ipv4(Ipv4::new(src, dst, proto))
}

/// Build an untagged TCP over IPv4 packet.
#[must_use]
pub fn build_test_tcp_ipv4_packet(src_ip: &str, dst_ip: &str, sport: u16, dport: u16) -> Packet {
    ipv4_packet(src_ip, dst_ip, NextHeader::TCP).with_transport(Tcp::new(sport, dport))
}

/// Build an untagged UDP over IPv4 packet.
#[must_use]
pub fn build_test_udp_ipv4_packet(src_ip: &str, dst_ip: &str, sport: u16, dport: u16) -> Packet {
    ipv4_packet(src_ip, dst_ip, NextHeader::UDP).with_transport(Udp::new(sport, dport))
}

/// Build an untagged `ICMPv4` packet.
#[must_use]
pub fn build_test_icmp4_packet(src_ip: &str, dst_ip: &str, icmp_type: u8, code: u8) -> Packet {
    ipv4_packet(src_ip, dst_ip, NextHeader::ICMP).with_transport(Icmp4::new(icmp_type, code))
}

/// Build an untagged ARP frame (no payload headers).
#[must_use]
pub fn build_test_arp_packet() -> Packet {
    Packet::new(Eth::new(TEST_SRC_MAC, Mac::BROADCAST, EthType::ARP))
}

/// Add a VLAN tag to a test packet.
#[must_use]
pub fn tag(packet: Packet, vid: u16, pcp: u8) -> Packet {
    let vid = Vid::new(vid).unwrap_or_else(|e| unreachable!("{e}"));
    let pcp = Pcp::new(pcp).unwrap_or_else(|e| unreachable!("{e}"));
    let ether_type = packet.eth().ether_type();
    packet.with_vlan(Vlan::new(vid, pcp, ether_type.into()))
}
