// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Paths to virtual nodes
//!
//! A virtual tenant network (tenant) contains bridges and terminals, which in turn contain
//! interfaces. Flow filter lists are attached to any of them.

use config::name::{require_name, validate_name};
use config::{ConfigError, ConfigResult, RedirectDestinationConfig};
use std::fmt::Display;

/// Path to a tenant.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VTenantPath {
    tenant: String,
}

/// Path to a bridge.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VBridgePath {
    tenant: VTenantPath,
    bridge: String,
}

/// Path to a terminal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VTerminalPath {
    tenant: VTenantPath,
    terminal: String,
}

/// The node holding an interface.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VInterfaceParent {
    Bridge(VBridgePath),
    Terminal(VTerminalPath),
}

/// Path to an interface of a bridge or terminal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VInterfacePath {
    parent: VInterfaceParent,
    interface: String,
}

/// Path to any virtual node.
///
/// Paths sort by kind first (tenants, bridges, terminals, then interfaces), then by name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VNodePath {
    Tenant(VTenantPath),
    Bridge(VBridgePath),
    Terminal(VTerminalPath),
    Interface(VInterfacePath),
}

impl VTenantPath {
    /// Path to tenant `tenant`.
    ///
    /// # Errors
    ///
    /// Fails if `tenant` is not a legal name.
    pub fn new(tenant: &str) -> ConfigResult<Self> {
        validate_name("tenant", tenant)?;
        Ok(Self {
            tenant: tenant.to_owned(),
        })
    }

    /// Name of the tenant.
    #[must_use]
    pub fn tenant_name(&self) -> &str {
        &self.tenant
    }

    /// Path to bridge `bridge` of this tenant.
    ///
    /// # Errors
    ///
    /// Fails if `bridge` is not a legal name.
    pub fn bridge(&self, bridge: &str) -> ConfigResult<VBridgePath> {
        validate_name("bridge", bridge)?;
        Ok(VBridgePath {
            tenant: self.clone(),
            bridge: bridge.to_owned(),
        })
    }

    /// Path to terminal `terminal` of this tenant.
    ///
    /// # Errors
    ///
    /// Fails if `terminal` is not a legal name.
    pub fn terminal(&self, terminal: &str) -> ConfigResult<VTerminalPath> {
        validate_name("terminal", terminal)?;
        Ok(VTerminalPath {
            tenant: self.clone(),
            terminal: terminal.to_owned(),
        })
    }
}

impl VBridgePath {
    /// Name of the bridge.
    #[must_use]
    pub fn bridge_name(&self) -> &str {
        &self.bridge
    }

    /// Path to interface `interface` of this bridge.
    ///
    /// # Errors
    ///
    /// Fails if `interface` is not a legal name.
    pub fn interface(&self, interface: &str) -> ConfigResult<VInterfacePath> {
        VInterfacePath::new(VInterfaceParent::Bridge(self.clone()), interface)
    }
}

impl VTerminalPath {
    /// Name of the terminal.
    #[must_use]
    pub fn terminal_name(&self) -> &str {
        &self.terminal
    }

    /// Path to interface `interface` of this terminal.
    ///
    /// # Errors
    ///
    /// Fails if `interface` is not a legal name.
    pub fn interface(&self, interface: &str) -> ConfigResult<VInterfacePath> {
        VInterfacePath::new(VInterfaceParent::Terminal(self.clone()), interface)
    }
}

impl VInterfaceParent {
    /// The tenant the node belongs to.
    #[must_use]
    pub fn tenant(&self) -> &VTenantPath {
        match self {
            VInterfaceParent::Bridge(b) => &b.tenant,
            VInterfaceParent::Terminal(t) => &t.tenant,
        }
    }
}

impl VInterfacePath {
    fn new(parent: VInterfaceParent, interface: &str) -> ConfigResult<Self> {
        validate_name("interface", interface)?;
        Ok(Self {
            parent,
            interface: interface.to_owned(),
        })
    }

    /// The bridge or terminal holding the interface.
    #[must_use]
    pub fn parent(&self) -> &VInterfaceParent {
        &self.parent
    }

    /// Name of the interface.
    #[must_use]
    pub fn interface_name(&self) -> &str {
        &self.interface
    }
}

impl VNodePath {
    /// Build a path from node names.
    ///
    /// `bridge` and `terminal` are mutually exclusive, and `interface` requires one of them.
    ///
    /// # Errors
    ///
    /// Fails if a name is missing or invalid, or if the combination of names does not
    /// designate a node.
    pub fn from_names(
        tenant: Option<&str>,
        bridge: Option<&str>,
        terminal: Option<&str>,
        interface: Option<&str>,
    ) -> ConfigResult<Self> {
        let tenant = VTenantPath::new(require_name("tenant", tenant)?)?;
        let path = match (bridge, terminal, interface) {
            (None, None, None) => VNodePath::Tenant(tenant),
            (Some(b), None, None) => VNodePath::Bridge(tenant.bridge(b)?),
            (None, Some(t), None) => VNodePath::Terminal(tenant.terminal(t)?),
            (Some(b), None, Some(i)) => VNodePath::Interface(tenant.bridge(b)?.interface(i)?),
            (None, Some(t), Some(i)) => VNodePath::Interface(tenant.terminal(t)?.interface(i)?),
            (Some(b), Some(t), _) => {
                return Err(ConfigError::InvalidPath(format!(
                    "both bridge {b} and terminal {t} given in tenant {tenant}"
                )));
            }
            (None, None, Some(i)) => {
                return Err(ConfigError::InvalidPath(format!(
                    "interface {i} of tenant {tenant} has no bridge or terminal"
                )));
            }
        };
        Ok(path)
    }

    /// The tenant the node belongs to.
    #[must_use]
    pub fn tenant(&self) -> &VTenantPath {
        match self {
            VNodePath::Tenant(t) => t,
            VNodePath::Bridge(b) => &b.tenant,
            VNodePath::Terminal(t) => &t.tenant,
            VNodePath::Interface(i) => i.parent.tenant(),
        }
    }

    /// Name of the tenant the node belongs to.
    #[must_use]
    pub fn tenant_name(&self) -> &str {
        self.tenant().tenant_name()
    }

    /// Tell if `other` is this node or one of the nodes it contains.
    #[must_use]
    pub fn contains(&self, other: &VNodePath) -> bool {
        match (self, other) {
            (VNodePath::Tenant(t), other) => other.tenant() == t,
            (VNodePath::Bridge(b), VNodePath::Bridge(o)) => b == o,
            (VNodePath::Bridge(b), VNodePath::Interface(i)) => {
                i.parent == VInterfaceParent::Bridge(b.clone())
            }
            (VNodePath::Terminal(t), VNodePath::Terminal(o)) => t == o,
            (VNodePath::Terminal(t), VNodePath::Interface(i)) => {
                i.parent == VInterfaceParent::Terminal(t.clone())
            }
            (VNodePath::Interface(i), VNodePath::Interface(o)) => i == o,
            _ => false,
        }
    }

    /// Returns true if this is the path of a tenant.
    #[must_use]
    pub fn is_tenant(&self) -> bool {
        matches!(self, VNodePath::Tenant(_))
    }
}

impl From<VInterfacePath> for VNodePath {
    fn from(path: VInterfacePath) -> Self {
        VNodePath::Interface(path)
    }
}

/// The node of a [`RedirectDestination`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RedirectNode {
    Bridge(String),
    Terminal(String),
}

/// An interface designated without its tenant: the destination of a REDIRECT flow filter,
/// always within the tenant of the filter.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RedirectDestination {
    node: RedirectNode,
    interface: String,
}

impl RedirectDestination {
    /// Build a [`RedirectDestination`] from its configuration.
    ///
    /// # Errors
    ///
    /// Fails if the interface name is missing, if not exactly one of bridge and terminal is
    /// given, or if any of the names is invalid.
    pub fn from_config(config: &RedirectDestinationConfig) -> ConfigResult<Self> {
        let interface =
            require_name("redirect destination interface", config.interface.as_deref())?;
        let node = match (&config.bridge, &config.terminal) {
            (Some(b), None) => {
                validate_name("bridge", b)?;
                RedirectNode::Bridge(b.clone())
            }
            (None, Some(t)) => {
                validate_name("terminal", t)?;
                RedirectNode::Terminal(t.clone())
            }
            (None, None) => {
                return Err(ConfigError::InvalidDestination(format!(
                    "no bridge or terminal given for interface {interface}"
                )));
            }
            (Some(b), Some(t)) => {
                return Err(ConfigError::InvalidDestination(format!(
                    "both bridge {b} and terminal {t} given for interface {interface}"
                )));
            }
        };
        Ok(Self {
            node,
            interface: interface.to_owned(),
        })
    }

    /// The configuration of this destination.
    #[must_use]
    pub fn to_config(&self) -> RedirectDestinationConfig {
        let (bridge, terminal) = match &self.node {
            RedirectNode::Bridge(b) => (Some(b.clone()), None),
            RedirectNode::Terminal(t) => (None, Some(t.clone())),
        };
        RedirectDestinationConfig {
            bridge,
            terminal,
            interface: Some(self.interface.clone()),
        }
    }

    /// Complete this destination with tenant `tenant`.
    #[must_use]
    pub fn resolve(&self, tenant: &VTenantPath) -> VInterfacePath {
        let parent = match &self.node {
            RedirectNode::Bridge(b) => VInterfaceParent::Bridge(VBridgePath {
                tenant: tenant.clone(),
                bridge: b.clone(),
            }),
            RedirectNode::Terminal(t) => VInterfaceParent::Terminal(VTerminalPath {
                tenant: tenant.clone(),
                terminal: t.clone(),
            }),
        };
        VInterfacePath {
            parent,
            interface: self.interface.clone(),
        }
    }
}

impl Display for VTenantPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tenant)
    }
}

impl Display for VBridgePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/bridge:{}", self.tenant, self.bridge)
    }
}

impl Display for VTerminalPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/terminal:{}", self.tenant, self.terminal)
    }
}

impl Display for VInterfaceParent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VInterfaceParent::Bridge(b) => b.fmt(f),
            VInterfaceParent::Terminal(t) => t.fmt(f),
        }
    }
}

impl Display for VInterfacePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.parent, self.interface)
    }
}

impl Display for VNodePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VNodePath::Tenant(p) => p.fmt(f),
            VNodePath::Bridge(p) => p.fmt(f),
            VNodePath::Terminal(p) => p.fmt(f),
            VNodePath::Interface(p) => p.fmt(f),
        }
    }
}

impl Display for RedirectDestination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.node {
            RedirectNode::Bridge(b) => write!(f, "bridge:{b}/{}", self.interface),
            RedirectNode::Terminal(t) => write!(f, "terminal:{t}/{}", self.interface),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::ErrorKind;

    fn path(b: Option<&str>, t: Option<&str>, i: Option<&str>) -> VNodePath {
        VNodePath::from_names(Some("vtn1"), b, t, i).unwrap()
    }

    #[test]
    fn test_from_names() {
        assert_eq!(path(None, None, None).to_string(), "vtn1");
        assert_eq!(path(Some("vbr1"), None, None).to_string(), "vtn1/bridge:vbr1");
        assert_eq!(path(None, Some("vtm1"), None).to_string(), "vtn1/terminal:vtm1");
        assert_eq!(
            path(Some("vbr1"), None, Some("if1")).to_string(),
            "vtn1/bridge:vbr1/if1"
        );
        assert_eq!(path(Some("vbr1"), None, Some("if1")).tenant_name(), "vtn1");

        let err = VNodePath::from_names(None, Some("vbr1"), None, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NullArgument);
        assert!(matches!(
            VNodePath::from_names(Some("vtn1"), Some("b"), Some("t"), None),
            Err(ConfigError::InvalidPath(_))
        ));
        assert!(matches!(
            VNodePath::from_names(Some("vtn1"), None, None, Some("if1")),
            Err(ConfigError::InvalidPath(_))
        ));
        assert!(matches!(
            VNodePath::from_names(Some("vtn1"), Some("bad-name"), None, None),
            Err(ConfigError::InvalidName { .. })
        ));
    }

    #[test]
    fn test_contains() {
        let tenant = path(None, None, None);
        let bridge = path(Some("vbr1"), None, None);
        let if1 = path(Some("vbr1"), None, Some("if1"));
        let if2 = path(Some("vbr1"), None, Some("if2"));
        let term = path(None, Some("vbr1"), None);
        let term_if1 = path(None, Some("vbr1"), Some("if1"));
        let other = VNodePath::from_names(Some("vtn2"), Some("vbr1"), None, Some("if1")).unwrap();

        for p in [&tenant, &bridge, &if1, &if2, &term, &term_if1] {
            assert!(tenant.contains(p), "{p}");
            assert!(p.contains(p), "{p}");
        }
        assert!(!tenant.contains(&other));
        assert!(bridge.contains(&if1));
        assert!(!bridge.contains(&term_if1));
        assert!(!bridge.contains(&tenant));
        assert!(term.contains(&term_if1));
        assert!(!term.contains(&if1));
        assert!(!if1.contains(&if2));
        assert!(!if1.contains(&bridge));
        assert!(!if1.contains(&other));
    }

    #[test]
    fn test_redirect_destination() {
        let config = RedirectDestinationConfig {
            bridge: Some("vbr2".to_string()),
            terminal: None,
            interface: Some("if3".to_string()),
        };
        let dest = RedirectDestination::from_config(&config).unwrap();
        assert_eq!(dest.to_string(), "bridge:vbr2/if3");
        assert_eq!(dest.to_config(), config);
        let tenant = VTenantPath::new("vtn1").unwrap();
        assert_eq!(dest.resolve(&tenant).to_string(), "vtn1/bridge:vbr2/if3");

        let config = RedirectDestinationConfig {
            bridge: None,
            terminal: None,
            interface: Some("if3".to_string()),
        };
        assert!(matches!(
            RedirectDestination::from_config(&config),
            Err(ConfigError::InvalidDestination(_))
        ));
        let config = RedirectDestinationConfig {
            bridge: None,
            terminal: Some("vtm1".to_string()),
            interface: None,
        };
        assert_eq!(
            RedirectDestination::from_config(&config),
            Err(ConfigError::MissingField("redirect destination interface"))
        );
        let config = RedirectDestinationConfig {
            bridge: None,
            terminal: Some("vtm1".to_string()),
            interface: Some("if#1".to_string()),
        };
        assert!(matches!(
            RedirectDestination::from_config(&config),
            Err(ConfigError::InvalidName { .. })
        ));
    }
}
