// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Configuration validation errors

use std::net::Ipv4Addr;
use thiserror::Error;

/// Broad classification of a [`ConfigError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A value was supplied but is malformed, out of range or inconsistent.
    BadArgument,
    /// A mandatory value is missing.
    NullArgument,
    /// Not caused by the configuration: a bug.
    Internal,
}

/// The reasons why some configuration object may be rejected.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0}: must be specified")]
    MissingField(&'static str),
    #[error("{what} name '{name}' is invalid: {reason}")]
    InvalidName {
        what: &'static str,
        name: String,
        reason: &'static str,
    },
    #[error("{what} index {index} is out of range [{min}, {max}]")]
    InvalidIndex {
        what: &'static str,
        index: u32,
        min: u32,
        max: u32,
    },
    #[error("Duplicate {what} index: {index}")]
    DuplicateIndex { what: &'static str, index: u32 },
    #[error("Duplicate flow condition: {0}")]
    DuplicateCondition(String),
    #[error("No such flow condition: {0}")]
    NoSuchCondition(String),

    // address and range primitives
    #[error("Invalid CIDR suffix {suffix} for {address}: must be in [1, 31]")]
    InvalidCidrSuffix { address: Ipv4Addr, suffix: u32 },
    #[error("Invalid port number: {0}")]
    InvalidPort(u32),
    #[error("Invalid port range: [{0}-{1}]")]
    InvalidPortRange(u32, u32),

    // layer field values
    #[error("Invalid MAC address {mac} for {what}: {reason}")]
    InvalidMac {
        what: &'static str,
        mac: String,
        reason: &'static str,
    },
    #[error("Invalid ethernet type: {0:#x}")]
    InvalidEtherType(u32),
    #[error("Invalid VLAN ID: {0}")]
    InvalidVlanId(u32),
    #[error("Invalid VLAN priority: {0}")]
    InvalidVlanPriority(u32),
    #[error("VLAN priority {0} requires a VLAN ID")]
    PriorityWithoutVlan(u32),
    #[error("Invalid IP protocol number: {0}")]
    InvalidProtocol(u32),
    #[error("Invalid DSCP value: {0}")]
    InvalidDscp(u32),
    #[error("Invalid ICMP type: {0}")]
    InvalidIcmpType(u32),
    #[error("Invalid ICMP code: {0}")]
    InvalidIcmpCode(u32),

    // cross-layer propagation
    #[error("IP protocol conflict: {configured} is configured, {required} is required")]
    ProtocolConflict { configured: u8, required: u8 },
    #[error("Ethernet type conflict: {configured:#06x} is configured, {required:#06x} is required")]
    EtherTypeConflict { configured: u16, required: u16 },

    // virtual node paths and filters
    #[error("Invalid virtual node path: {0}")]
    InvalidPath(String),
    #[error("Self redirection is not allowed: {destination} is part of {owner}")]
    SelfRedirection { owner: String, destination: String },
    #[error("Invalid redirect destination: {0}")]
    InvalidDestination(String),
    #[error("{0} flow filter is not supported by {1}")]
    UnsupportedFilter(&'static str, String),
    #[error("Duplicate flow filter list: {0}")]
    DuplicateFilterMap(String),

    // path maps
    #[error("Invalid path policy: {0}")]
    InvalidPolicy(u32),
    #[error("Invalid flow timeout: {0}")]
    InvalidTimeout(String),

    /// A bug rather than a bad configuration. Flow actions and matchers are plain enums, so
    /// the flow core itself never returns this variant.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConfigError {
    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::MissingField(_) => ErrorKind::NullArgument,
            ConfigError::Internal(_) => ErrorKind::Internal,
            _ => ErrorKind::BadArgument,
        }
    }
}

/// Result-like type for configurations
pub type ConfigResult<T = ()> = Result<T, ConfigError>;
