// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Path map configuration objects

use serde::{Deserialize, Serialize};

/// Selects a path policy for the packets matching a flow condition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathMapConfig {
    pub index: Option<u32>,
    pub condition: Option<String>,
    /// Path policy identifier; the default policy (0) if absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idle_timeout: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hard_timeout: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_map_from_yaml() {
        let yaml = "index: 10\ncondition: cond1\npolicy: 2\nidle_timeout: 30\nhard_timeout: 300\n";
        let pm: PathMapConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(
            pm,
            PathMapConfig {
                index: Some(10),
                condition: Some("cond1".to_string()),
                policy: Some(2),
                idle_timeout: Some(30),
                hard_timeout: Some(300),
            }
        );
        assert_eq!(serde_yaml_ng::to_string(&pm).unwrap(), yaml);
    }
}
