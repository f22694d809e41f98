mod common;

use std::sync::Arc;

use gridmap_core::units::Unit;
use gridmap_core::{Entity, EntityKind};
use gridmap_io::processor::{self, output_unit};
use gridmap_io::{Extractor, FieldRecord, ResolvedContext};
use uuid::Uuid;

use common::*;

const SCENARIO_NODE: &str = "3e6be3ac-2b51-4080-b815-391313612fc7";

fn scenario_record() -> FieldRecord {
    FieldRecord::new()
        .with("uuid", SCENARIO_NODE)
        .with("id", "Node 1")
        .with("vtarget", "1.0")
        .with("vrated", "110.0")
        .with("slack", "true")
        .with("subnet", "3")
        .with("voltlvl", "hv")
}

#[test]
fn node_record_decodes_into_node() {
    init_tracing();
    let entity = decode(&registry(), EntityKind::Node, &scenario_record());
    let node = entity.as_node().unwrap();

    assert_eq!(node.uuid, Uuid::parse_str(SCENARIO_NODE).unwrap());
    assert_eq!(node.id, "Node 1");
    assert_eq!(node.v_target.unit(), Unit::PerUnit);
    assert_eq!(node.v_target.value(), 1.0);
    assert_eq!(node.volt_lvl.id, "hv");
    assert_eq!(node.volt_lvl.nominal_voltage.unit(), Unit::Kilovolt);
    assert_eq!(node.volt_lvl.nominal_voltage.value(), 110.0);
    assert!(node.slack);
    assert_eq!(node.subnet, 3);
    assert!(node.operator.is_unassigned());
    assert_eq!(node.geo_position, None);
}

#[test]
fn flattened_node_keeps_uuid_and_node_units() {
    init_tracing();
    let entity = decode(&registry(), EntityKind::Node, &scenario_record());
    let flat = processor::flatten(&entity).unwrap();

    assert_eq!(flat.header()[0], "uuid");
    assert_eq!(flat.get("uuid"), Some(SCENARIO_NODE));
    assert_eq!(output_unit(EntityKind::Node, "vrated"), Some(Unit::Kilovolt));
    assert_eq!(output_unit(EntityKind::Node, "vtarget"), Some(Unit::PerUnit));
    assert_eq!(flat.get("vrated"), Some("110.0"));
    assert_eq!(flat.get("vtarget"), Some("1.0"));
    assert_eq!(flat.get("slack"), Some("true"));
    assert_eq!(flat.get("subnet"), Some("3"));
    assert_eq!(flat.get("operator"), Some(""));
}

#[test]
fn unit_suffix_is_converted_into_declared_unit() {
    let record = scenario_record().with("vrated", "110000 V");
    let entity = decode(&registry(), EntityKind::Node, &record);
    let flat = processor::flatten(&entity).unwrap();
    assert_eq!(flat.get("vrated"), Some("110.0"));
}

#[test]
fn line_extraction_yields_nodes_type_and_operator() {
    init_tracing();
    let registry = registry();
    let index = grid_index(&registry);
    let line = decode_with(
        &registry,
        EntityKind::Line,
        &line_record("92ec3bcb-b3d5-4b59-9bb1-2f5b4e4a3d11", NODE_A, NODE_B),
        &index,
    );

    let extraction = Extractor::default().extract(&line).unwrap();
    assert!(extraction.is_complete());

    let mut keys: Vec<(EntityKind, String)> = extraction
        .entities()
        .iter()
        .map(|e| (e.kind(), e.uuid().unwrap().to_string()))
        .collect();
    keys.sort();
    let mut expected = vec![
        (EntityKind::Operator, OPERATOR.to_string()),
        (EntityKind::Node, NODE_A.to_string()),
        (EntityKind::Node, NODE_B.to_string()),
        (EntityKind::LineType, LINE_TYPE.to_string()),
    ];
    expected.sort();
    assert_eq!(keys, expected);

    // the extracted nodes are the very instances the line holds
    let held = line.as_line().unwrap();
    assert!(extraction
        .entities()
        .iter()
        .any(|e| e.ptr_eq(&Entity::Node(Arc::clone(&held.node_a)))));
}

#[test]
fn context_entry_wins_over_record_fields() {
    let registry = registry();
    let ehv = decode(
        &registry,
        EntityKind::VoltageLevel,
        &FieldRecord::new().with("voltlvl", "ehv").with("vrated", "380.0"),
    );
    let ctx = ResolvedContext::new().with("voltlvl", ehv);
    let entity = registry
        .decode_entity(EntityKind::Node, &scenario_record(), &ctx)
        .unwrap();
    let node = entity.as_node().unwrap();
    assert_eq!(node.volt_lvl.id, "ehv");
    assert_eq!(node.volt_lvl.nominal_voltage.value(), 380.0);
}

#[test]
fn context_entity_of_target_kind_skips_decoding() {
    let registry = registry();
    let existing = decode(&registry, EntityKind::Node, &scenario_record());
    let ctx = ResolvedContext::new().with("node", existing.clone());
    let decoded = registry
        .decode_entity(EntityKind::Node, &FieldRecord::new(), &ctx)
        .unwrap();
    assert!(decoded.ptr_eq(&existing));
}
