mod common;

use std::sync::Arc;

use chrono::DateTime;
use gridmap_core::geo::GeoPoint;
use gridmap_core::input::{no_operator_assigned, EmInput, LoadInput, OperationTime};
use gridmap_core::timeseries::{
    IndividualTimeSeries, IrradianceValue, TemperatureValue, TimeBasedValue, TsValue,
    WeatherValue, WindValue,
};
use gridmap_core::units::{Quantity, Unit};
use gridmap_core::{Entity, EntityKind};
use gridmap_io::processor::{self, flatten_time_series};
use gridmap_io::{FieldRecord, ReferenceIndex, StrategyRegistry};
use uuid::Uuid;

use common::*;

fn round_trip(registry: &StrategyRegistry, entity: &Entity, index: &ReferenceIndex) -> Entity {
    let flat = processor::flatten(entity).unwrap();
    decode_with(registry, entity.kind(), &FieldRecord::from(&flat), index)
}

#[test]
fn node_with_operator_position_and_operation_time() {
    init_tracing();
    let registry = registry();
    let index = grid_index(&registry);
    let record = node_record("8f0fcb33-6a43-4a37-8a2f-6e0e7b3b1f01", "node c")
        .with("operator", OPERATOR)
        .with("operatesfrom", "2020-03-24T15:11:31Z")
        .with("operatesuntil", "2020-03-25T15:11:31+01:00")
        .with("geoposition", r#"{"type":"Point","coordinates":[7.4116482,51.4843281]}"#);
    let node = decode_with(&registry, EntityKind::Node, &record, &index);

    let held = node.as_node().unwrap();
    assert_eq!(held.operator.id, "DSO Dortmund");
    assert!(held.operation_time.is_limited());
    assert_eq!(held.geo_position.unwrap().lat, 51.4843281);

    assert_eq!(round_trip(&registry, &node, &index), node);
}

#[test]
fn line_resolves_references_through_index() {
    let registry = registry();
    let index = grid_index(&registry);
    let line = decode_with(
        &registry,
        EntityKind::Line,
        &line_record("1a3c1a4c-3c1d-4c5e-9a5b-0f8e5b6c7d8e", NODE_A, NODE_B),
        &index,
    );
    let flat = processor::flatten(&line).unwrap();
    assert_eq!(flat.get("nodea"), Some(NODE_A));
    assert_eq!(flat.get("type"), Some(LINE_TYPE));
    assert_eq!(flat.get("length"), Some("1.25"));

    let again = round_trip(&registry, &line, &index);
    assert_eq!(again, line);
    // references are shared with the index, not copied
    let node_a = index.get(&Uuid::parse_str(NODE_A).unwrap()).unwrap();
    assert!(Entity::Node(Arc::clone(&again.as_line().unwrap().node_a)).ptr_eq(node_a));
}

#[test]
fn load_with_energy_manager() {
    let registry = registry();
    let mut index = grid_index(&registry);
    let em: Entity = EmInput::new(
        Uuid::new_v4(),
        "home em",
        no_operator_assigned(),
        OperationTime::not_limited(),
        "self_optimization",
        None,
    )
    .unwrap()
    .into();
    index.insert(em.clone());

    let node = index
        .get(&Uuid::parse_str(NODE_B).unwrap())
        .and_then(Entity::as_node)
        .cloned()
        .unwrap();
    let load: Entity = LoadInput::new(
        Uuid::new_v4(),
        "household",
        no_operator_assigned(),
        OperationTime::not_limited(),
        node,
        "cosPhiFixed:{(0.00,0.95)}",
        em.as_energy_manager().cloned(),
        "h0",
        Quantity::new(25.0, Unit::KilovoltAmpere),
        Quantity::new(4500.0, Unit::KilowattHour),
        Quantity::new(0.95, Unit::PerUnit),
    )
    .unwrap()
    .into();

    let flat = processor::flatten(&load).unwrap();
    assert_eq!(flat.get("srated"), Some("25.0"));
    assert_eq!(flat.get("econsannual"), Some("4500.0"));
    assert_eq!(flat.get("em"), Some(em.uuid().unwrap().to_string().as_str()));
    assert_eq!(round_trip(&registry, &load, &index), load);
}

fn weather_entry() -> TimeBasedValue {
    TimeBasedValue::new(
        Uuid::new_v4(),
        DateTime::parse_from_rfc3339("2020-04-28T15:00:00+02:00").unwrap(),
        TsValue::Weather(WeatherValue {
            coordinate: GeoPoint::new(7.412152, 51.492639).unwrap(),
            irradiance: Arc::new(
                IrradianceValue::new(
                    Quantity::new(286.872985839844, Unit::WattPerSquareMetre),
                    Quantity::new(0.0, Unit::WattPerSquareMetre),
                )
                .unwrap(),
            ),
            temperature: Arc::new(
                TemperatureValue::new(Quantity::new(21.6, Unit::Celsius)).unwrap(),
            ),
            wind: Arc::new(
                WindValue::new(
                    Quantity::new(270.0, Unit::Degree),
                    Quantity::new(1.1, Unit::MetrePerSecond),
                )
                .unwrap(),
            ),
        }),
    )
}

#[test]
fn weather_entry_assembles_from_sub_values() {
    let registry = registry();
    let entity: Entity = weather_entry().into();
    let again = round_trip(&registry, &entity, &ReferenceIndex::new());
    assert_eq!(again, entity);
}

#[test]
fn series_rows_decode_back_into_entries() {
    let registry = registry();
    let entries: Vec<Arc<TimeBasedValue>> = ["10:00", "10:15", "10:30"]
        .iter()
        .enumerate()
        .map(|(i, hm)| {
            let time = DateTime::parse_from_rfc3339(&format!("2021-01-01T{hm}:00Z")).unwrap();
            let value = TsValue::pq_heat(
                Quantity::new(1.0 + i as f64, Unit::Kilowatt),
                Quantity::new(0.5, Unit::Kilovar),
                Quantity::new(3.25, Unit::Kilowatt),
            )
            .unwrap();
            Arc::new(TimeBasedValue::new(Uuid::new_v4(), time, value))
        })
        .collect();
    let series = IndividualTimeSeries::new(Uuid::new_v4(), entries.clone()).unwrap();

    let rows = flatten_time_series(&series).unwrap();
    for (row, entry) in rows.iter().zip(&entries) {
        // the series column is unknown to the entry catalog and ignored
        let decoded = decode(&registry, EntityKind::TimeBasedValue, &FieldRecord::from(row));
        assert_eq!(decoded.as_time_based_value().unwrap(), entry);
    }
}
