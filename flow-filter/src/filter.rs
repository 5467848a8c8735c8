// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Flow filters

use crate::action::FlowAction;
use crate::outcome::{Outcome, Redirect};
use crate::path::{RedirectDestination, VInterfacePath, VNodePath};
use config::name::require_name;
use config::{ConfigError, ConfigResult, FilterTypeConfig, FlowFilterConfig, RedirectConfig};
use net::flow::FlowEntryAction;
use net::packet::Packet;
use std::fmt::Display;
use std::num::NonZero;
use tracing::{debug, info};

/// Parameters of a REDIRECT flow filter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RedirectFilter {
    destination: RedirectDestination,
    // destination completed with the tenant of the owner
    resolved: VInterfacePath,
    output: bool,
}

impl RedirectFilter {
    fn new(owner: &VNodePath, config: &RedirectConfig) -> ConfigResult<Self> {
        if owner.is_tenant() {
            return Err(ConfigError::UnsupportedFilter("REDIRECT", owner.to_string()));
        }
        let destination = config
            .destination
            .as_ref()
            .ok_or(ConfigError::MissingField("redirect destination"))?;
        let destination = RedirectDestination::from_config(destination)?;
        let resolved = destination.resolve(owner.tenant());
        if owner.contains(&VNodePath::from(resolved.clone())) {
            return Err(ConfigError::SelfRedirection {
                owner: owner.to_string(),
                destination: resolved.to_string(),
            });
        }
        Ok(Self {
            destination,
            resolved,
            output: config.output,
        })
    }

    /// The destination, as configured.
    #[must_use]
    pub fn destination(&self) -> &RedirectDestination {
        &self.destination
    }

    /// The destination interface, within the tenant of the flow filter.
    #[must_use]
    pub fn resolved(&self) -> &VInterfacePath {
        &self.resolved
    }

    /// Redirect as outgoing packet (true) or incoming packet (false).
    #[must_use]
    pub fn is_output(&self) -> bool {
        self.output
    }

    fn to_config(&self) -> RedirectConfig {
        RedirectConfig {
            destination: Some(self.destination.to_config()),
            output: self.output,
        }
    }
}

/// The type of a flow filter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterKind {
    Pass,
    Drop,
    Redirect(RedirectFilter),
}

/// A flow filter: what to do with the packets matching a flow condition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowFilter {
    index: NonZero<u16>,
    condition: String,
    kind: FilterKind,
    actions: Vec<FlowAction>,
}

impl FlowFilter {
    /// Lowest legal index.
    pub const MIN_INDEX: u32 = 1;
    /// Highest legal index.
    pub const MAX_INDEX: u32 = 65535;

    /// Build a [`FlowFilter`] attached to node `owner` from its configuration.
    ///
    /// # Errors
    ///
    /// Fails if any field is missing or invalid, if a REDIRECT filter is configured on a
    /// tenant, or if a REDIRECT filter designates an interface that is part of `owner`.
    pub fn new(owner: &VNodePath, config: &FlowFilterConfig) -> ConfigResult<Self> {
        let raw = config
            .index
            .ok_or(ConfigError::MissingField("flow filter index"))?;
        let index = u16::try_from(raw)
            .ok()
            .and_then(NonZero::new)
            .ok_or(ConfigError::InvalidIndex {
                what: "flow filter",
                index: raw,
                min: Self::MIN_INDEX,
                max: Self::MAX_INDEX,
            })?;
        let condition = require_name("flow filter condition", config.condition.as_deref())?;
        let kind = match config
            .filter
            .as_ref()
            .ok_or(ConfigError::MissingField("flow filter type"))?
        {
            FilterTypeConfig::Pass => FilterKind::Pass,
            FilterTypeConfig::Drop => FilterKind::Drop,
            FilterTypeConfig::Redirect(redirect) => {
                FilterKind::Redirect(RedirectFilter::new(owner, redirect)?)
            }
        };
        let actions = config
            .actions
            .iter()
            .map(FlowAction::new)
            .collect::<ConfigResult<Vec<_>>>()?;
        Ok(Self {
            index,
            condition: condition.to_owned(),
            kind,
            actions,
        })
    }

    /// The index of this filter in its list.
    #[must_use]
    pub fn index(&self) -> u16 {
        self.index.get()
    }

    /// The name of the flow condition selecting the packets.
    #[must_use]
    pub fn condition(&self) -> &str {
        &self.condition
    }

    /// The type of this filter.
    #[must_use]
    pub fn kind(&self) -> &FilterKind {
        &self.kind
    }

    /// The flow actions of this filter, in application order.
    #[must_use]
    pub fn actions(&self) -> &[FlowAction] {
        &self.actions
    }

    /// Tell if the flow actions are applied to the packets this filter selects.
    #[must_use]
    pub fn needs_flow_action(&self) -> bool {
        !matches!(self.kind, FilterKind::Drop)
    }

    /// Tell if this filter applies to flooded packets.
    #[must_use]
    pub fn supports_multicast(&self) -> bool {
        !matches!(self.kind, FilterKind::Redirect(_))
    }

    /// The configuration of this filter.
    #[must_use]
    pub fn to_config(&self) -> FlowFilterConfig {
        let filter = match &self.kind {
            FilterKind::Pass => FilterTypeConfig::Pass,
            FilterKind::Drop => FilterTypeConfig::Drop,
            FilterKind::Redirect(r) => FilterTypeConfig::Redirect(r.to_config()),
        };
        FlowFilterConfig {
            index: Some(u32::from(self.index.get())),
            condition: Some(self.condition.clone()),
            filter: Some(filter),
            actions: self.actions.iter().map(FlowAction::to_config).collect(),
        }
    }

    /// Apply this filter to a packet matching its flow condition. `context` identifies the
    /// filter in log lines.
    pub fn apply(&self, context: &str, packet: &mut Packet) -> Outcome {
        match &self.kind {
            FilterKind::Pass => Outcome::Continue,
            FilterKind::Drop => {
                if !packet.meta().is_flooding() {
                    packet.meta_mut().add_action(FlowEntryAction::Drop);
                }
                debug!("{context}: Packet from {} discarded", packet.source_key());
                Outcome::Drop
            }
            FilterKind::Redirect(r) => {
                if packet.meta_mut().first_redirection() {
                    info!(
                        "{context}: Packet from {} redirected to {}",
                        packet.source_key(),
                        r.resolved
                    );
                } else {
                    debug!(
                        "{context}: Packet from {} redirected again to {}",
                        packet.source_key(),
                        r.resolved
                    );
                }
                Outcome::Redirect(Redirect::new(
                    r.resolved.clone(),
                    r.output,
                    context.to_owned(),
                ))
            }
        }
    }
}

impl Display for FilterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterKind::Pass => write!(f, "PASS"),
            FilterKind::Drop => write!(f, "DROP"),
            FilterKind::Redirect(r) => {
                let direction = if r.output { "out" } else { "in" };
                write!(f, "REDIRECT({} {direction})", r.destination)
            }
        }
    }
}

impl Display for FlowFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} cond={}", self.index, self.kind, self.condition)?;
        for action in &self.actions {
            write!(f, " {action}")?;
        }
        Ok(())
    }
}
