#![allow(dead_code)]

use gridmap_core::{Entity, EntityKind};
use gridmap_io::{FieldRecord, ReferenceIndex, StrategyRegistry};
use tracing_subscriber::EnvFilter;

pub const NODE_A: &str = "4ca90220-74c2-4369-9afa-a18bf068840d";
pub const NODE_B: &str = "47d29df0-ba2d-4d23-8e75-c82229c5c758";
pub const LINE_TYPE: &str = "3bed3eb3-9790-4874-89b5-a5434d408088";
pub const OPERATOR: &str = "8f9682df-0744-4b58-a122-f0dc730f6510";

/// Route `tracing` output through the test harness (`RUST_LOG` filters it).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn registry() -> StrategyRegistry {
    StrategyRegistry::with_builtin_catalog(Default::default())
}

pub fn operator_record() -> FieldRecord {
    FieldRecord::new().with("uuid", OPERATOR).with("id", "DSO Dortmund")
}

pub fn node_record(uuid: &str, id: &str) -> FieldRecord {
    FieldRecord::new()
        .with("uuid", uuid)
        .with("id", id)
        .with("vtarget", "1.0")
        .with("vrated", "20.0")
        .with("slack", "false")
        .with("subnet", "1")
        .with("voltlvl", "mv")
}

pub fn line_type_record() -> FieldRecord {
    FieldRecord::new()
        .with("uuid", LINE_TYPE)
        .with("id", "NA2XS2Y 1x240")
        .with("b", "191.636")
        .with("g", "0.0")
        .with("r", "0.125")
        .with("x", "0.1")
        .with("imax", "421.0")
        .with("vrated", "20.0")
}

pub fn line_record(uuid: &str, node_a: &str, node_b: &str) -> FieldRecord {
    FieldRecord::new()
        .with("uuid", uuid)
        .with("id", "line 1")
        .with("nodea", node_a)
        .with("nodeb", node_b)
        .with("paralleldevices", "1")
        .with("type", LINE_TYPE)
        .with("length", "1.25")
        .with("olmcharacteristic", "olm:{(0.0,1.0)}")
}

pub fn decode(registry: &StrategyRegistry, kind: EntityKind, record: &FieldRecord) -> Entity {
    decode_with(registry, kind, record, &ReferenceIndex::new())
}

pub fn decode_with(
    registry: &StrategyRegistry,
    kind: EntityKind,
    record: &FieldRecord,
    index: &ReferenceIndex,
) -> Entity {
    let catalog = registry.catalog_for(kind).unwrap();
    let ctx = index.resolve_for(&catalog, record).unwrap();
    registry.decode_entity(kind, record, &ctx).unwrap()
}

/// Operator, both nodes (node A operated by it) and the line type, decoded
/// and indexed.
pub fn grid_index(registry: &StrategyRegistry) -> ReferenceIndex {
    let mut index = ReferenceIndex::new();
    index.insert(decode(registry, EntityKind::Operator, &operator_record()));
    index.insert(decode(registry, EntityKind::LineType, &line_type_record()));

    let operated = node_record(NODE_A, "node a")
        .with("operator", OPERATOR)
        .with("operatesfrom", "")
        .with("operatesuntil", "");
    let node_a = decode_with(registry, EntityKind::Node, &operated, &index);
    index.insert(node_a);
    index.insert(decode(registry, EntityKind::Node, &node_record(NODE_B, "node b")));
    index
}
