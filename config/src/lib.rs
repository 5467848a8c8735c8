// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Flow configuration objects, as handed to the classification core, and their validation errors.

#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod errors;
pub mod filter;
pub mod flowcond;
pub mod loader;
pub mod name;
pub mod pathmap;

pub use errors::{ConfigError, ConfigResult, ErrorKind};
pub use filter::{
    DirectionConfig, FilterMapConfig, FilterTypeConfig, FlowActionConfig, FlowFilterConfig,
    RedirectConfig, RedirectDestinationConfig,
};
pub use flowcond::{
    EthernetMatchConfig, FlowConditionConfig, FlowMatchConfig, IcmpMatchConfig, InetMatchConfig,
    L4MatchConfig, PortProtoMatchConfig, PortRangeConfig,
};
pub use loader::{FlowConfig, TenantPathMapsConfig};
pub use pathmap::PathMapConfig;
