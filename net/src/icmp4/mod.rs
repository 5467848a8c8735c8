// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! `ICMPv4` header type and logic.

/// The type and code fields of an `ICMPv4` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Icmp4 {
    icmp_type: u8,
    code: u8,
}

impl Icmp4 {
    /// Echo request type.
    pub const ECHO_REQUEST: u8 = 8;
    /// Echo reply type.
    pub const ECHO_REPLY: u8 = 0;
    /// Destination unreachable type.
    pub const DESTINATION_UNREACHABLE: u8 = 3;

    /// Create a new [`Icmp4`] header.
    #[must_use]
    pub fn new(icmp_type: u8, code: u8) -> Icmp4 {
        Icmp4 { icmp_type, code }
    }

    /// The ICMP type.
    #[must_use]
    pub fn icmp_type(&self) -> u8 {
        self.icmp_type
    }

    /// The ICMP code.
    #[must_use]
    pub fn code(&self) -> u8 {
        self.code
    }

    /// Set the ICMP type.
    pub fn set_icmp_type(&mut self, icmp_type: u8) -> &mut Icmp4 {
        self.icmp_type = icmp_type;
        self
    }

    /// Set the ICMP code.
    pub fn set_code(&mut self, code: u8) -> &mut Icmp4 {
        self.code = code;
        self
    }
}
