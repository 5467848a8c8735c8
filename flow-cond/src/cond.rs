// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Flow conditions

use arc_swap::ArcSwap;
use config::name::require_name;
use config::{ConfigError, ConfigResult, FlowConditionConfig, FlowMatchConfig};
use flow_match::{FlowMatch, PacketMatcher};
use net::packet::Packet;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, trace};

/// How a flow condition was modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateType {
    Added,
    Changed,
    Removed,
}

impl Display for UpdateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpdateType::Added => write!(f, "added"),
            UpdateType::Changed => write!(f, "changed"),
            UpdateType::Removed => write!(f, "removed"),
        }
    }
}

type Entries = BTreeMap<u16, FlowMatch>;

fn build_entries(configs: &[FlowMatchConfig]) -> ConfigResult<Entries> {
    let mut entries = Entries::new();
    for config in configs {
        let fm = FlowMatch::new(config)?;
        let index = fm.index();
        if entries.insert(index, fm).is_some() {
            return Err(ConfigError::DuplicateIndex {
                what: "flow match",
                index: index.into(),
            });
        }
    }
    Ok(entries)
}

/// A named, ordered set of [`FlowMatch`]es.
///
/// A flow condition matches a packet if any of its entries does, or unconditionally if it
/// has no entry. Entries are evaluated by ascending index.
///
/// Readers work on a snapshot of the entries and never block. Writers are serialized and
/// publish a complete new set of entries, so a reader sees either all or none of a change.
pub struct FlowCond {
    name: String,
    entries: ArcSwap<Entries>,
    writer: Mutex<()>,
}

impl FlowCond {
    /// Build a [`FlowCond`] from its configuration.
    ///
    /// # Errors
    ///
    /// Fails if the name is missing or invalid, if any of the entries is invalid, or if two
    /// entries share the same index.
    pub fn new(config: &FlowConditionConfig) -> ConfigResult<Self> {
        let name = require_name("flow condition", config.name.as_deref())?;
        let entries = build_entries(&config.matches)?;
        Ok(Self {
            name: name.to_owned(),
            entries: ArcSwap::from_pointee(entries),
            writer: Mutex::new(()),
        })
    }

    /// The name of this flow condition.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if the flow condition has no entry (and so matches every packet).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.load().is_empty()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.load().len()
    }

    /// The entry at `index`.
    #[must_use]
    pub fn get_match(&self, index: u16) -> Option<FlowMatch> {
        self.entries.load().get(&index).cloned()
    }

    /// All the entries, by ascending index.
    #[must_use]
    pub fn matches(&self) -> Vec<FlowMatch> {
        self.entries.load().values().cloned().collect()
    }

    /// Replace all the entries.
    ///
    /// Returns true if the set of entries changed.
    ///
    /// # Errors
    ///
    /// Fails if any of the entries is invalid. Then the flow condition is left untouched.
    pub fn set_matches(&self, configs: &[FlowMatchConfig]) -> ConfigResult<bool> {
        let entries = build_entries(configs)?;
        let _guard = self.writer.lock();
        if **self.entries.load() == entries {
            return Ok(false);
        }
        debug!("{}: replacing {} flow match(es)", self.name, entries.len());
        self.entries.store(Arc::new(entries));
        Ok(true)
    }

    /// Add or replace a single entry.
    ///
    /// Returns how the flow condition was modified, or `None` if the entry is already there.
    ///
    /// # Errors
    ///
    /// Fails if the entry is invalid.
    pub fn set_match(&self, config: &FlowMatchConfig) -> ConfigResult<Option<UpdateType>> {
        let fm = FlowMatch::new(config)?;
        let index = fm.index();
        let _guard = self.writer.lock();
        let current = self.entries.load();
        let update = match current.get(&index) {
            Some(old) if *old == fm => return Ok(None),
            Some(_) => UpdateType::Changed,
            None => UpdateType::Added,
        };
        debug!("{}: flow match {update}: {fm}", self.name);
        let mut entries = Entries::clone(&current);
        entries.insert(index, fm);
        self.entries.store(Arc::new(entries));
        Ok(Some(update))
    }

    /// Remove the entry at `index`, returning it if it existed.
    pub fn remove_match(&self, index: u16) -> Option<FlowMatch> {
        let _guard = self.writer.lock();
        let current = self.entries.load();
        if !current.contains_key(&index) {
            return None;
        }
        let mut entries = Entries::clone(&current);
        let removed = entries.remove(&index);
        self.entries.store(Arc::new(entries));
        debug!("{}: flow match {index} {}", self.name, UpdateType::Removed);
        removed
    }

    /// The configuration of this flow condition.
    #[must_use]
    pub fn to_config(&self) -> FlowConditionConfig {
        FlowConditionConfig {
            name: Some(self.name.clone()),
            matches: self.entries.load().values().map(FlowMatch::to_config).collect(),
        }
    }

    /// Tell if `packet` satisfies this flow condition.
    pub fn match_packet(&self, packet: &mut Packet) -> bool {
        let entries = self.entries.load();
        if entries.is_empty() {
            trace!("{}: empty flow condition matches {}", self.name, packet.source_key());
            return true;
        }
        for (index, fm) in entries.iter() {
            if fm.matches(packet) {
                trace!("{}: {} matched entry {index}", self.name, packet.source_key());
                return true;
            }
        }
        trace!("{}: no entry matched {}", self.name, packet.source_key());
        false
    }
}

impl std::fmt::Debug for FlowCond {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowCond")
            .field("name", &self.name)
            .field("entries", &self.entries.load_full())
            .finish()
    }
}

impl Display for FlowCond {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "flow condition {}:", self.name)?;
        let entries = self.entries.load();
        if entries.is_empty() {
            return writeln!(f, "  (any)");
        }
        for fm in entries.values() {
            writeln!(f, "  {fm}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{
        ErrorKind, IcmpMatchConfig, InetMatchConfig, L4MatchConfig, PortProtoMatchConfig,
        PortRangeConfig,
    };
    use net::packet::test_utils::{
        build_test_arp_packet, build_test_icmp4_packet, build_test_tcp_ipv4_packet,
        build_test_udp_ipv4_packet,
    };
    use pretty_assertions::assert_eq;
    use std::net::Ipv4Addr;
    use tracing_test::traced_test;

    fn tcp_dst(index: u32, port: u32) -> FlowMatchConfig {
        FlowMatchConfig {
            index: Some(index),
            l4: Some(L4MatchConfig::Tcp(PortProtoMatchConfig {
                source: None,
                destination: Some(PortRangeConfig::port(port)),
            })),
            ..Default::default()
        }
    }

    fn icmp(index: u32) -> FlowMatchConfig {
        FlowMatchConfig {
            index: Some(index),
            l4: Some(L4MatchConfig::Icmp(IcmpMatchConfig::default())),
            ..Default::default()
        }
    }

    fn cond(name: &str, matches: Vec<FlowMatchConfig>) -> FlowCond {
        FlowCond::new(&FlowConditionConfig {
            name: Some(name.to_string()),
            matches,
        })
        .unwrap()
    }

    #[test]
    fn test_build_errors() {
        let err = FlowCond::new(&FlowConditionConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NullArgument);

        let config = FlowConditionConfig {
            name: Some("bad name".to_string()),
            matches: vec![],
        };
        assert!(matches!(
            FlowCond::new(&config),
            Err(ConfigError::InvalidName { .. })
        ));

        let config = FlowConditionConfig {
            name: Some("cond1".to_string()),
            matches: vec![tcp_dst(1, 80), icmp(1)],
        };
        assert_eq!(
            FlowCond::new(&config).unwrap_err(),
            ConfigError::DuplicateIndex {
                what: "flow match",
                index: 1
            }
        );
    }

    #[test]
    fn test_cond1_example() {
        let fc = cond("cond1", vec![tcp_dst(1, 80)]);
        let mut packet = build_test_tcp_ipv4_packet("10.0.0.1", "10.0.0.2", 12345, 80);
        assert!(fc.match_packet(&mut packet));
        let mut packet = build_test_tcp_ipv4_packet("10.0.0.1", "10.0.0.2", 12345, 8080);
        assert!(!fc.match_packet(&mut packet));
    }

    #[test]
    fn test_empty_matches_everything() {
        let fc = cond("any", vec![]);
        assert!(fc.is_empty());
        assert!(fc.match_packet(&mut build_test_arp_packet()));
        assert!(fc.match_packet(&mut build_test_icmp4_packet("1.1.1.1", "2.2.2.2", 8, 0)));

        // one entry is enough to reject what it does not match
        assert_eq!(fc.set_match(&tcp_dst(1, 80)).unwrap(), Some(UpdateType::Added));
        assert!(!fc.match_packet(&mut build_test_arp_packet()));
        assert!(!fc.match_packet(&mut build_test_icmp4_packet("1.1.1.1", "2.2.2.2", 8, 0)));
    }

    #[test]
    fn test_ascending_index_order() {
        // index 20 is listed first, but index 5 is evaluated first
        let inet = FlowMatchConfig {
            index: Some(20),
            inet: Some(InetMatchConfig {
                source: Some(Ipv4Addr::new(10, 0, 0, 0)),
                source_suffix: Some(8),
                ..Default::default()
            }),
            ..Default::default()
        };
        let fc = cond("order", vec![inet, tcp_dst(5, 80)]);
        let indices: Vec<u16> = fc.matches().iter().map(FlowMatch::index).collect();
        assert_eq!(indices, vec![5, 20]);

        let mut packet = build_test_tcp_ipv4_packet("10.0.0.1", "10.0.0.2", 12345, 80);
        assert!(fc.match_packet(&mut packet));
        // entry 20 was never evaluated
        assert!(
            !packet
                .meta()
                .match_fields()
                .contains(net::flow::MatchFields::NW_SRC)
        );

        let mut packet = build_test_udp_ipv4_packet("10.0.0.1", "10.0.0.2", 12345, 80);
        assert!(fc.match_packet(&mut packet));
        let mut packet = build_test_udp_ipv4_packet("11.0.0.1", "10.0.0.2", 12345, 80);
        assert!(!fc.match_packet(&mut packet));
    }

    #[test]
    fn test_set_matches() {
        let fc = cond("cond1", vec![tcp_dst(1, 80)]);
        let configs = vec![tcp_dst(1, 80), icmp(2)];
        assert!(fc.set_matches(&configs).unwrap());
        assert_eq!(fc.len(), 2);
        // idempotent
        assert!(!fc.set_matches(&configs).unwrap());
        // all or nothing
        assert!(fc.set_matches(&[icmp(3), icmp(0)]).is_err());
        assert_eq!(fc.len(), 2);
        assert!(fc.get_match(3).is_none());
        assert!(fc.set_matches(&[]).unwrap());
        assert!(fc.is_empty());
    }

    #[test]
    fn test_set_and_remove_match() {
        let fc = cond("cond1", vec![]);
        assert_eq!(fc.set_match(&tcp_dst(1, 80)).unwrap(), Some(UpdateType::Added));
        assert_eq!(fc.set_match(&tcp_dst(1, 80)).unwrap(), None);
        assert_eq!(
            fc.set_match(&tcp_dst(1, 8080)).unwrap(),
            Some(UpdateType::Changed)
        );
        assert!(fc.set_match(&tcp_dst(0, 80)).is_err());
        assert_eq!(
            fc.get_match(1).unwrap(),
            FlowMatch::new(&tcp_dst(1, 8080)).unwrap()
        );
        assert_eq!(fc.remove_match(2), None);
        assert_eq!(fc.remove_match(1).unwrap().index(), 1);
        assert!(fc.is_empty());
    }

    #[test]
    fn test_to_config() {
        let fc = cond("cond1", vec![icmp(2), tcp_dst(1, 80)]);
        let config = fc.to_config();
        assert_eq!(config.name.as_deref(), Some("cond1"));
        assert_eq!(config.matches.len(), 2);
        assert_eq!(config.matches[0].index, Some(1));
        // the configuration rebuilds an identical condition
        let again = FlowCond::new(&config).unwrap();
        assert_eq!(again.matches(), fc.matches());
        assert_eq!(
            fc.to_string(),
            concat!(
                "flow condition cond1:\n",
                "  1: ether[type=0x0800] inet4[proto=tcp] tcp[dst=80]\n",
                "  2: ether[type=0x0800] inet4[proto=icmp] icmp[]\n",
            )
        );
    }

    #[test]
    #[traced_test]
    fn test_update_logs() {
        let fc = cond("logged", vec![]);
        fc.set_match(&tcp_dst(7, 80)).unwrap();
        assert!(logs_contain("logged: flow match added"));
        fc.remove_match(7);
        assert!(logs_contain("logged: flow match 7 removed"));
    }

    #[test]
    fn test_concurrent_readers_and_writer() {
        let fc = cond("busy", vec![tcp_dst(1, 80)]);
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..1000 {
                        let mut packet =
                            build_test_tcp_ipv4_packet("10.0.0.1", "10.0.0.2", 12345, 80);
                        // every published version of the condition matches port 80
                        assert!(fc.match_packet(&mut packet));
                    }
                });
            }
            s.spawn(|| {
                for round in 0..200u32 {
                    let extra = tcp_dst(2 + round % 10, 1000 + round);
                    fc.set_matches(&[tcp_dst(1, 80), extra]).unwrap();
                    fc.set_match(&icmp(100)).unwrap();
                    fc.remove_match(100);
                }
            });
        });
        assert_eq!(fc.len(), 2);
    }
}
