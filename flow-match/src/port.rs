// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! TCP / UDP port range conditions

use config::{ConfigError, ConfigResult, PortRangeConfig};
use std::fmt::Display;

/// An inclusive range of TCP or UDP ports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct L4PortMatch {
    from: u16,
    to: u16,
}

fn port(raw: u32) -> ConfigResult<u16> {
    u16::try_from(raw).map_err(|_| ConfigError::InvalidPort(raw))
}

impl L4PortMatch {
    /// Build an [`L4PortMatch`] from its bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPortRange`] if `to` is smaller than `from`.
    pub fn new(from: u16, to: u16) -> ConfigResult<Self> {
        if to < from {
            return Err(ConfigError::InvalidPortRange(from.into(), to.into()));
        }
        Ok(Self { from, to })
    }

    /// A range made of a single port.
    #[must_use]
    pub fn single(port: u16) -> Self {
        Self {
            from: port,
            to: port,
        }
    }

    /// Build an [`L4PortMatch`] from its configuration.
    ///
    /// # Errors
    ///
    /// Fails if the lower bound is missing, if a bound is not a port number, or if the range
    /// is empty.
    pub fn from_config(config: &PortRangeConfig) -> ConfigResult<Self> {
        let from = port(config.from.ok_or(ConfigError::MissingField("port range start"))?)?;
        match config.to {
            None => Ok(Self::single(from)),
            Some(to) => Self::new(from, port(to)?),
        }
    }

    /// The configuration of this range.
    #[must_use]
    pub fn to_config(&self) -> PortRangeConfig {
        if self.is_singleton() {
            PortRangeConfig::port(self.from.into())
        } else {
            PortRangeConfig::range(self.from.into(), self.to.into())
        }
    }

    /// First port of the range.
    #[must_use]
    pub fn from(&self) -> u16 {
        self.from
    }

    /// Last port of the range.
    #[must_use]
    pub fn to(&self) -> u16 {
        self.to
    }

    /// Returns true if the range contains a single port
    #[must_use]
    pub fn is_singleton(&self) -> bool {
        self.from == self.to
    }

    /// Tell if `port` is within the range.
    #[must_use]
    pub fn matches(&self, port: u16) -> bool {
        (self.from..=self.to).contains(&port)
    }
}

impl Display for L4PortMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_singleton() {
            write!(f, "{}", self.from)
        } else {
            write!(f, "{}-{}", self.from, self.to)
        }
    }
}
