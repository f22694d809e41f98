mod common;

use std::sync::Arc;

use gridmap_core::input::{
    no_operator_assigned, ChpInput, ChpTypeInput, CylindricalStorageInput, EmInput,
    LineGraphicInput, OperationTime, ThermalBusInput,
};
use gridmap_core::units::{Quantity, Unit};
use gridmap_core::{Entity, EntityKey, EntityKind};
use gridmap_io::{ExtractConfig, Extractor};
use uuid::Uuid;

use common::*;

fn kinds(entities: &[Entity]) -> Vec<EntityKind> {
    let mut kinds: Vec<_> = entities.iter().map(Entity::kind).collect();
    kinds.sort();
    kinds
}

#[test]
fn line_graphic_pulls_in_line_and_its_dependencies() {
    init_tracing();
    let registry = registry();
    let index = grid_index(&registry);
    let line = decode_with(
        &registry,
        EntityKind::Line,
        &line_record("b3a2c0d4-5e6f-4a1b-8c9d-0e1f2a3b4c5d", NODE_A, NODE_B),
        &index,
    );
    let graphic: Entity = LineGraphicInput::new(
        Uuid::new_v4(),
        "main",
        Arc::clone(line.as_line().unwrap()),
    )
    .into();

    let extraction = Extractor::new(ExtractConfig { parallel: true })
        .extract(&graphic)
        .unwrap();
    assert_eq!(
        kinds(extraction.entities()),
        vec![
            EntityKind::Operator,
            EntityKind::Node,
            EntityKind::Node,
            EntityKind::LineType,
            EntityKind::Line,
        ]
    );

    let order = extraction.persistence_order().unwrap();
    let position = |key: EntityKey| order.iter().position(|e| e.key() == Some(key));

    // every dependency is written before its dependent; the root is not
    // part of the order
    let mut checked = 0;
    for (dependency, dependent) in extraction.edges() {
        if let (Some(before), Some(after)) = (position(*dependency), position(*dependent)) {
            assert!(before < after, "{dependency} must precede {dependent}");
            checked += 1;
        }
    }
    // operator -> node a, node a/node b/type -> line
    assert_eq!(checked, 4);

    let node_a = Uuid::parse_str(NODE_A).unwrap();
    let at_node_a = order.iter().position(|e| e.uuid() == Some(node_a)).unwrap();
    let at_operator = order
        .iter()
        .position(|e| e.kind() == EntityKind::Operator)
        .unwrap();
    assert!(at_operator < at_node_a);
    assert_eq!(order.last().map(Entity::kind), Some(EntityKind::Line));
}

#[test]
fn chp_shares_thermal_bus_with_its_storage() {
    let bus = Arc::new(ThermalBusInput::new(
        Uuid::new_v4(),
        "district heating",
        no_operator_assigned(),
        OperationTime::not_limited(),
    ));
    let storage = Arc::new(
        CylindricalStorageInput::new(
            Uuid::new_v4(),
            "tank",
            no_operator_assigned(),
            OperationTime::not_limited(),
            Arc::clone(&bus),
            Quantity::new(1.039, Unit::CubicMetre),
            Quantity::new(110.0, Unit::Celsius),
            Quantity::new(80.0, Unit::Celsius),
            Quantity::new(1.0, Unit::KilowattHourPerKelvinCubicMetre),
            Quantity::new(20.0, Unit::Kilowatt),
        )
        .unwrap(),
    );
    let chp_type = Arc::new(
        ChpTypeInput::new(
            Uuid::new_v4(),
            "chp type",
            Quantity::new(100.0, Unit::KilovoltAmpere),
            Quantity::new(0.95, Unit::PerUnit),
            Quantity::new(19.0, Unit::Percent),
            Quantity::new(76.0, Unit::Percent),
            Quantity::new(49.59, Unit::Kilowatt),
            Quantity::new(0.0, Unit::Kilowatt),
        )
        .unwrap(),
    );
    let parent = Arc::new(
        EmInput::new(
            Uuid::new_v4(),
            "district em",
            no_operator_assigned(),
            OperationTime::not_limited(),
            "priority",
            None,
        )
        .unwrap(),
    );
    let em = Arc::new(
        EmInput::new(
            Uuid::new_v4(),
            "plant em",
            no_operator_assigned(),
            OperationTime::not_limited(),
            "priority",
            Some(Arc::clone(&parent)),
        )
        .unwrap(),
    );

    let registry = registry();
    let node = decode(&registry, EntityKind::Node, &node_record(NODE_B, "node b"));
    let chp: Entity = ChpInput::new(
        Uuid::new_v4(),
        "chp",
        no_operator_assigned(),
        OperationTime::not_limited(),
        Arc::clone(node.as_node().unwrap()),
        "cosPhiFixed:{(0.00,1.00)}",
        chp_type,
        Arc::clone(&bus),
        storage,
        false,
        Some(em),
    )
    .unwrap()
    .into();

    for parallel in [false, true] {
        let extraction = Extractor::new(ExtractConfig { parallel })
            .extract(&chp)
            .unwrap();
        assert!(extraction.is_complete());
        assert_eq!(
            kinds(extraction.entities()),
            vec![
                EntityKind::Node,
                EntityKind::EnergyManager,
                EntityKind::EnergyManager,
                EntityKind::ChpType,
                EntityKind::ThermalBus,
                EntityKind::CylindricalStorage,
            ]
        );
        assert!(extraction.contains(&Entity::EnergyManager(Arc::clone(&parent))));
    }
}
