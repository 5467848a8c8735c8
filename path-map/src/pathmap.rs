// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Path maps

use config::name::require_name;
use config::{ConfigError, ConfigResult, PathMapConfig};
use net::flow::FlowTimeout;
use std::fmt::Display;
use std::num::NonZero;

/// Selects the path policy of the packets matching a flow condition, and optionally the
/// timeouts of the flow entries installed for them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathMap {
    index: NonZero<u16>,
    condition: String,
    policy: u32,
    timeout: Option<FlowTimeout>,
}

fn timeout(idle: Option<u32>, hard: Option<u32>) -> ConfigResult<Option<FlowTimeout>> {
    let (idle, hard) = match (idle, hard) {
        (None, None) => return Ok(None),
        (Some(idle), Some(hard)) => (idle, hard),
        (Some(_), None) => {
            return Err(ConfigError::InvalidTimeout(
                "idle timeout given without hard timeout".to_string(),
            ));
        }
        (None, Some(_)) => {
            return Err(ConfigError::InvalidTimeout(
                "hard timeout given without idle timeout".to_string(),
            ));
        }
    };
    let idle = u16::try_from(idle)
        .map_err(|_| ConfigError::InvalidTimeout(format!("idle timeout {idle} out of range")))?;
    let hard = u16::try_from(hard)
        .map_err(|_| ConfigError::InvalidTimeout(format!("hard timeout {hard} out of range")))?;
    if idle != 0 && hard != 0 && idle >= hard {
        return Err(ConfigError::InvalidTimeout(format!(
            "idle timeout {idle} must be less than hard timeout {hard}"
        )));
    }
    Ok(Some(FlowTimeout { idle, hard }))
}

impl PathMap {
    /// Lowest legal index.
    pub const MIN_INDEX: u32 = 1;
    /// Highest legal index.
    pub const MAX_INDEX: u32 = 32767;
    /// The policy of the packets no path map selects.
    pub const DEFAULT_POLICY: u32 = 0;
    /// Highest legal policy identifier.
    pub const MAX_POLICY: u32 = 3;

    /// Build a [`PathMap`] from its configuration.
    ///
    /// # Errors
    ///
    /// Fails if the index, condition name or policy is missing or invalid, or if the timeouts
    /// are inconsistent.
    pub fn new(config: &PathMapConfig) -> ConfigResult<Self> {
        let raw = config
            .index
            .ok_or(ConfigError::MissingField("path map index"))?;
        let index = u16::try_from(raw)
            .ok()
            .filter(|i| u32::from(*i) <= Self::MAX_INDEX)
            .and_then(NonZero::new)
            .ok_or(ConfigError::InvalidIndex {
                what: "path map",
                index: raw,
                min: Self::MIN_INDEX,
                max: Self::MAX_INDEX,
            })?;
        let condition = require_name("path map condition", config.condition.as_deref())?;
        let policy = config.policy.unwrap_or(Self::DEFAULT_POLICY);
        if policy > Self::MAX_POLICY {
            return Err(ConfigError::InvalidPolicy(policy));
        }
        Ok(Self {
            index,
            condition: condition.to_owned(),
            policy,
            timeout: timeout(config.idle_timeout, config.hard_timeout)?,
        })
    }

    #[must_use]
    pub fn index(&self) -> u16 {
        self.index.get()
    }

    /// The name of the flow condition selecting the packets.
    #[must_use]
    pub fn condition(&self) -> &str {
        &self.condition
    }

    #[must_use]
    pub fn policy(&self) -> u32 {
        self.policy
    }

    /// Timeouts of the flow entries, if configured.
    #[must_use]
    pub fn timeout(&self) -> Option<FlowTimeout> {
        self.timeout
    }

    /// The configuration of this path map.
    #[must_use]
    pub fn to_config(&self) -> PathMapConfig {
        PathMapConfig {
            index: Some(u32::from(self.index.get())),
            condition: Some(self.condition.clone()),
            policy: Some(self.policy),
            idle_timeout: self.timeout.map(|t| u32::from(t.idle)),
            hard_timeout: self.timeout.map(|t| u32::from(t.hard)),
        }
    }
}

impl Display for PathMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: cond={} policy={}",
            self.index, self.condition, self.policy
        )?;
        if let Some(t) = self.timeout {
            write!(f, " {t}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::ErrorKind;
    use pretty_assertions::assert_eq;

    fn config(index: u32) -> PathMapConfig {
        PathMapConfig {
            index: Some(index),
            condition: Some("cond1".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let pm = PathMap::new(&config(1)).unwrap();
        assert_eq!(pm.policy(), PathMap::DEFAULT_POLICY);
        assert_eq!(pm.timeout(), None);
        assert_eq!(pm.to_string(), "1: cond=cond1 policy=0");
    }

    #[test]
    fn test_index_and_policy() {
        for index in [0, 32768, 65536] {
            assert!(matches!(
                PathMap::new(&config(index)),
                Err(ConfigError::InvalidIndex { what: "path map", .. })
            ));
        }
        assert_eq!(PathMap::new(&config(32767)).unwrap().index(), 32767);
        let err = PathMap::new(&PathMapConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NullArgument);

        let mut c = config(1);
        c.policy = Some(4);
        assert_eq!(PathMap::new(&c), Err(ConfigError::InvalidPolicy(4)));
        c.policy = Some(3);
        assert_eq!(PathMap::new(&c).unwrap().policy(), 3);
    }

    #[test]
    fn test_timeouts() {
        let with = |idle, hard| {
            let mut c = config(1);
            c.idle_timeout = idle;
            c.hard_timeout = hard;
            PathMap::new(&c).map(|pm| pm.timeout())
        };
        assert_eq!(
            with(Some(30), Some(300)),
            Ok(Some(FlowTimeout { idle: 30, hard: 300 }))
        );
        assert_eq!(
            with(Some(0), Some(300)),
            Ok(Some(FlowTimeout { idle: 0, hard: 300 }))
        );
        assert_eq!(
            with(Some(30), Some(0)),
            Ok(Some(FlowTimeout { idle: 30, hard: 0 }))
        );
        for (idle, hard) in [
            (Some(30), None),
            (None, Some(30)),
            (Some(300), Some(300)),
            (Some(301), Some(300)),
            (Some(65536), Some(0)),
        ] {
            assert!(
                matches!(with(idle, hard), Err(ConfigError::InvalidTimeout(_))),
                "{idle:?} {hard:?}"
            );
        }
    }

    #[test]
    fn test_config_round_trip() {
        let c = PathMapConfig {
            index: Some(10),
            condition: Some("cond1".to_string()),
            policy: Some(2),
            idle_timeout: Some(30),
            hard_timeout: Some(300),
        };
        let pm = PathMap::new(&c).unwrap();
        assert_eq!(pm.to_config(), c);
        assert_eq!(pm.to_string(), "10: cond=cond1 policy=2 idle=30 hard=300");
    }
}
