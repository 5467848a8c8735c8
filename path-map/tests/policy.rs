// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use config::loader::load_config_from_yaml;
use flow_cond::FlowCondTable;
use net::flow::FlowTimeout;
use net::packet::test_utils::{build_test_tcp_ipv4_packet, build_test_udp_ipv4_packet};
use vtn_path_map::{PathMap, PathMapTables};

const CONFIG: &str = r"
conditions:
  - name: web
    matches:
      - index: 1
        l4:
          type: tcp
          destination:
            from: 80
            to: 88
  - name: lan
    matches:
      - index: 1
        inet:
          source: 192.168.0.0
          source_suffix: 16
path_maps:
  - index: 10
    condition: web
    policy: 1
  - index: 20
    condition: lan
    policy: 2
tenant_path_maps:
  - tenant: vtn1
    path_maps:
      - index: 5
        condition: lan
        policy: 3
        idle_timeout: 30
        hard_timeout: 300
";

#[test]
fn test_policy_selection() {
    let config = load_config_from_yaml(CONFIG).unwrap();
    let conds = FlowCondTable::from_config(&config.conditions).unwrap();
    let tables = PathMapTables::from_config(&config).unwrap();

    // global list: first match by index
    let mut packet = build_test_tcp_ipv4_packet("192.168.1.1", "10.0.0.1", 1000, 85);
    assert_eq!(tables.evaluate("vtn2", &conds, &mut packet), Some(1));

    // the tenant list comes first
    let mut packet = build_test_tcp_ipv4_packet("192.168.1.1", "10.0.0.1", 1000, 85);
    assert_eq!(tables.evaluate("vtn1", &conds, &mut packet), Some(3));
    assert_eq!(
        packet.meta().flow_timeout(),
        Some(FlowTimeout {
            idle: 30,
            hard: 300
        })
    );

    // nothing matches: default routing
    let mut packet = build_test_udp_ipv4_packet("10.1.1.1", "10.0.0.1", 1000, 53);
    assert_eq!(tables.evaluate("vtn1", &conds, &mut packet), None);
}

#[test]
fn test_config_round_trip() {
    let config = load_config_from_yaml(CONFIG).unwrap();
    let tables = PathMapTables::from_config(&config).unwrap();
    assert_eq!(tables.global().to_config(), config.path_maps);
    assert_eq!(
        tables.tenant("vtn1").unwrap().to_config(),
        config.tenant_path_maps[0].path_maps
    );
    let pm = tables.tenant("vtn1").unwrap().get(5).unwrap();
    assert_eq!(pm.policy(), PathMap::MAX_POLICY);
}
