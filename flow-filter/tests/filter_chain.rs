// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Evaluation of flow filter lists against flow conditions, from configuration to outcome

use config::loader::load_config_from_yaml;
use config::{ConfigError, FilterTypeConfig, RedirectConfig, RedirectDestinationConfig};
use flow_cond::FlowCondTable;
use net::flow::{FlowEntryAction, MatchFields};
use net::packet::test_utils::{build_test_tcp_ipv4_packet, build_test_udp_ipv4_packet};
use std::net::Ipv4Addr;
use vtn_flow_filter::{Direction, FlowFilterMap, FlowFilterTable, FlowFilterTableWriter, VNodePath};

const CONFIG: &str = r#"
conditions:
  - name: cond1
    matches:
      - index: 1
        l4:
          type: tcp
          destination:
            from: 80
  - name: udp_dns
    matches:
      - index: 1
        inet:
          destination: 10.0.0.0
          destination_suffix: 8
        l4:
          type: udp
          destination:
            from: 53
  - name: any
filter_maps:
  - tenant: vtn1
    bridge: vbr1
    interface: if1
    direction: in
    filters:
      - index: 1
        condition: cond1
        filter:
          type: pass
        actions:
          - action: set_inet4_dst
            address: 192.168.0.10
      - index: 2
        condition: cond1
        filter:
          type: drop
      - index: 3
        condition: cond1
        filter:
          type: redirect
          destination:
            bridge: vbr1
            interface: if2
          output: true
  - tenant: vtn1
    bridge: vbr1
    interface: if2
    direction: in
    filters:
      - index: 10
        condition: udp_dns
        filter:
          type: redirect
          destination:
            terminal: vtm1
            interface: if1
        actions:
          - action: set_dscp
            dscp: 46
      - index: 20
        condition: missing
        filter:
          type: drop
"#;

fn setup() -> (FlowCondTable, FlowFilterTable) {
    let config = load_config_from_yaml(CONFIG).unwrap();
    let conds = FlowCondTable::from_config(&config.conditions).unwrap();
    let filters = FlowFilterTable::build_from_config(&config.filter_maps).unwrap();
    (conds, filters)
}

fn interface(bridge: &str, interface: &str) -> VNodePath {
    VNodePath::from_names(Some("vtn1"), Some(bridge), None, Some(interface)).unwrap()
}

#[test]
fn test_cond1_selects_port_80() {
    let (conds, _) = setup();
    let cond1 = conds.lookup("cond1").unwrap();
    let mut packet = build_test_tcp_ipv4_packet("10.0.0.1", "10.0.0.2", 12345, 80);
    assert!(cond1.match_packet(&mut packet));
    let mut packet = build_test_tcp_ipv4_packet("10.0.0.1", "10.0.0.2", 12345, 8080);
    assert!(!cond1.match_packet(&mut packet));
}

#[test]
fn test_pass_then_drop_shadows_redirect() {
    let (conds, table) = setup();
    let if1 = interface("vbr1", "if1");
    let mut packet = build_test_tcp_ipv4_packet("10.0.0.1", "10.0.0.2", 12345, 80);
    let outcome = table.evaluate(&if1, Direction::In, &conds, &mut packet);
    assert!(outcome.is_drop());

    // the PASS filter applied its action before the DROP filter stopped the list
    assert_eq!(
        packet.try_ipv4().unwrap().destination(),
        Ipv4Addr::new(192, 168, 0, 10)
    );
    assert_eq!(
        packet.meta().actions(),
        &[
            FlowEntryAction::SetNwDst(Ipv4Addr::new(192, 168, 0, 10)),
            FlowEntryAction::Drop,
        ]
    );
    assert!(packet.meta().match_fields().contains(MatchFields::TP_DST));

    let mut packet = build_test_tcp_ipv4_packet("10.0.0.1", "10.0.0.2", 12345, 8080);
    let outcome = table.evaluate(&if1, Direction::In, &conds, &mut packet);
    assert!(outcome.is_continue());
    assert!(packet.meta().actions().is_empty());
}

#[test]
fn test_redirect_with_actions() {
    let (conds, table) = setup();
    let if2 = interface("vbr1", "if2");
    let mut packet = build_test_udp_ipv4_packet("172.16.0.1", "10.1.1.1", 4000, 53);
    let outcome = table.evaluate(&if2, Direction::In, &conds, &mut packet);
    let redirect = outcome.redirect().unwrap();
    assert_eq!(redirect.destination().to_string(), "vtn1/terminal:vtm1/if1");
    assert!(!redirect.is_output());
    assert_eq!(redirect.context(), "vtn1/bridge:vbr1/if2 (in): flow filter 10");
    assert_eq!(packet.try_ipv4().unwrap().dscp().value(), 46);
    assert!(redirect.add_hop(&mut packet));
    assert_eq!(packet.meta().redirections(), 1);

    // out of 10.0.0.0/8: the filter referencing a missing condition is ignored
    let mut packet = build_test_udp_ipv4_packet("172.16.0.1", "11.1.1.1", 4000, 53);
    assert!(
        table
            .evaluate(&if2, Direction::In, &conds, &mut packet)
            .is_continue()
    );
}

#[test]
fn test_self_redirection_rejected_at_construction() {
    let mut config = load_config_from_yaml(CONFIG).unwrap();
    let map = &mut config.filter_maps[0];
    let redirect = map.filters.iter_mut().find(|f| f.index == Some(3)).unwrap();
    redirect.filter = Some(FilterTypeConfig::Redirect(RedirectConfig {
        destination: Some(RedirectDestinationConfig {
            bridge: Some("vbr1".to_string()),
            terminal: None,
            interface: Some("if1".to_string()),
        }),
        output: false,
    }));
    assert_eq!(
        FlowFilterMap::from_config(map),
        Err(ConfigError::SelfRedirection {
            owner: "vtn1/bridge:vbr1/if1".to_string(),
            destination: "vtn1/bridge:vbr1/if1".to_string(),
        })
    );
    assert!(FlowFilterTable::build_from_config(&config.filter_maps).is_err());
}

#[test]
fn test_published_table() {
    let (conds, table) = setup();
    let mut writer = FlowFilterTableWriter::new();
    writer.update_flow_filter_table(table);
    let reader = writer.get_reader_factory().handle();
    let if1 = interface("vbr1", "if1");

    let mut packet = build_test_tcp_ipv4_packet("10.0.0.1", "10.0.0.2", 12345, 80);
    assert!(
        reader
            .evaluate(&if1, Direction::In, &conds, &mut packet)
            .is_drop()
    );

    // dropping the DROP filter exposes the REDIRECT filter
    let mut map = reader.enter().unwrap().get(&if1, Direction::In).unwrap().clone();
    assert!(map.remove_filter(2).is_some());
    writer.set_flow_filter_map(map);
    let mut packet = build_test_tcp_ipv4_packet("10.0.0.1", "10.0.0.2", 12345, 80);
    let outcome = reader.evaluate(&if1, Direction::In, &conds, &mut packet);
    assert_eq!(
        outcome.redirect().unwrap().destination().to_string(),
        "vtn1/bridge:vbr1/if2"
    );
    assert!(outcome.redirect().unwrap().is_output());
}
