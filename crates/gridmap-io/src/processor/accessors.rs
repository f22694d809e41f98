//! Field accessors per entity kind, the output side of the field catalog.

use std::sync::Arc;

use gridmap_core::input::{
    ChpInput, ChpTypeInput, CylindricalStorageInput, EmInput, LineGraphicInput, LineInput,
    LineTypeInput, LoadInput, NodeInput, Operable, OperatorInput, ThermalBusInput, VoltageLevel,
};
use gridmap_core::result::{LoadResult, NodeResult};
use gridmap_core::timeseries::{IrradianceValue, TemperatureValue, WindValue};
use gridmap_core::{Entity, Value};

/// Reads one output field off an entity.
pub(crate) struct Accessor<T> {
    pub field: &'static str,
    pub get: fn(&T) -> Value,
}

macro_rules! accessors {
    ($name:ident: $ty:ty { $($field:literal => $get:expr),* $(,)? }) => {
        pub(crate) const $name: &[Accessor<$ty>] = &[
            $(Accessor { field: $field, get: $get },)*
        ];
    };
}

pub(crate) fn read<T>(accessors: &[Accessor<T>], item: &T) -> Vec<(&'static str, Value)> {
    accessors
        .iter()
        .map(|a| (a.field, (a.get)(item)))
        .collect()
}

fn operator<T: Operable>(asset: &T) -> Value {
    Entity::Operator(Arc::clone(asset.operator())).into()
}

fn operates_from<T: Operable>(asset: &T) -> Value {
    asset.operation_time().start.into()
}

fn operates_until<T: Operable>(asset: &T) -> Value {
    asset.operation_time().end.into()
}

fn em(em: &Option<Arc<EmInput>>) -> Value {
    em.clone().map(Entity::EnergyManager).into()
}

accessors!(OPERATOR: OperatorInput {
    "uuid" => |o| o.uuid.into(),
    "id" => |o| o.id.as_str().into(),
});

accessors!(VOLTAGE_LEVEL: VoltageLevel {
    "voltlvl" => |v| v.id.as_str().into(),
    "vrated" => |v| v.nominal_voltage.into(),
});

accessors!(NODE: NodeInput {
    "uuid" => |n| n.uuid.into(),
    "id" => |n| n.id.as_str().into(),
    "operator" => operator,
    "operatesfrom" => operates_from,
    "operatesuntil" => operates_until,
    "vtarget" => |n| n.v_target.into(),
    "slack" => |n| n.slack.into(),
    "geoposition" => |n| Value::GeoPoint(n.geo_position),
    "voltlvl" => |n| n.volt_lvl.id.as_str().into(),
    "vrated" => |n| n.volt_lvl.nominal_voltage.into(),
    "subnet" => |n| i64::from(n.subnet).into(),
});

accessors!(LINE_TYPE: LineTypeInput {
    "uuid" => |t| t.uuid.into(),
    "id" => |t| t.id.as_str().into(),
    "b" => |t| t.b.into(),
    "g" => |t| t.g.into(),
    "r" => |t| t.r.into(),
    "x" => |t| t.x.into(),
    "imax" => |t| t.i_max.into(),
    "vrated" => |t| t.v_rated.into(),
});

accessors!(LINE: LineInput {
    "uuid" => |l| l.uuid.into(),
    "id" => |l| l.id.as_str().into(),
    "operator" => operator,
    "operatesfrom" => operates_from,
    "operatesuntil" => operates_until,
    "nodea" => |l| Entity::Node(Arc::clone(&l.node_a)).into(),
    "nodeb" => |l| Entity::Node(Arc::clone(&l.node_b)).into(),
    "paralleldevices" => |l| i64::from(l.parallel_devices).into(),
    "type" => |l| Entity::LineType(Arc::clone(&l.line_type)).into(),
    "length" => |l| l.length.into(),
    "olmcharacteristic" => |l| l.olm_characteristic.as_str().into(),
});

accessors!(LINE_GRAPHIC: LineGraphicInput {
    "uuid" => |g| g.uuid.into(),
    "graphiclayer" => |g| g.graphic_layer.as_str().into(),
    "line" => |g| Entity::Line(Arc::clone(&g.line)).into(),
});

accessors!(LOAD: LoadInput {
    "uuid" => |l| l.uuid.into(),
    "id" => |l| l.id.as_str().into(),
    "operator" => operator,
    "operatesfrom" => operates_from,
    "operatesuntil" => operates_until,
    "node" => |l| Entity::Node(Arc::clone(&l.node)).into(),
    "qcharacteristics" => |l| l.q_characteristics.as_str().into(),
    "em" => |l| em(&l.em),
    "loadprofile" => |l| l.load_profile.as_str().into(),
    "srated" => |l| l.s_rated.into(),
    "econsannual" => |l| l.e_cons_annual.into(),
    "cosphirated" => |l| l.cos_phi_rated.into(),
});

accessors!(ENERGY_MANAGER: EmInput {
    "uuid" => |e| e.uuid.into(),
    "id" => |e| e.id.as_str().into(),
    "operator" => operator,
    "operatesfrom" => operates_from,
    "operatesuntil" => operates_until,
    "controlstrategy" => |e| e.control_strategy.as_str().into(),
    "parentem" => |e| em(&e.parent_em),
});

accessors!(CHP_TYPE: ChpTypeInput {
    "uuid" => |t| t.uuid.into(),
    "id" => |t| t.id.as_str().into(),
    "srated" => |t| t.s_rated.into(),
    "cosphirated" => |t| t.cos_phi_rated.into(),
    "etael" => |t| t.eta_el.into(),
    "etathermal" => |t| t.eta_thermal.into(),
    "pthermal" => |t| t.p_thermal.into(),
    "pown" => |t| t.p_own.into(),
});

accessors!(CHP: ChpInput {
    "uuid" => |c| c.uuid.into(),
    "id" => |c| c.id.as_str().into(),
    "operator" => operator,
    "operatesfrom" => operates_from,
    "operatesuntil" => operates_until,
    "node" => |c| Entity::Node(Arc::clone(&c.node)).into(),
    "qcharacteristics" => |c| c.q_characteristics.as_str().into(),
    "type" => |c| Entity::ChpType(Arc::clone(&c.chp_type)).into(),
    "thermalbus" => |c| Entity::ThermalBus(Arc::clone(&c.thermal_bus)).into(),
    "thermalstorage" => |c| Entity::CylindricalStorage(Arc::clone(&c.thermal_storage)).into(),
    "marketreaction" => |c| c.market_reaction.into(),
    "em" => |c| em(&c.em),
});

accessors!(THERMAL_BUS: ThermalBusInput {
    "uuid" => |b| b.uuid.into(),
    "id" => |b| b.id.as_str().into(),
    "operator" => operator,
    "operatesfrom" => operates_from,
    "operatesuntil" => operates_until,
});

accessors!(CYLINDRICAL_STORAGE: CylindricalStorageInput {
    "uuid" => |s| s.uuid.into(),
    "id" => |s| s.id.as_str().into(),
    "operator" => operator,
    "operatesfrom" => operates_from,
    "operatesuntil" => operates_until,
    "thermalbus" => |s| Entity::ThermalBus(Arc::clone(&s.thermal_bus)).into(),
    "storagevolumelvl" => |s| s.storage_volume_lvl.into(),
    "inlettemp" => |s| s.inlet_temp.into(),
    "returntemp" => |s| s.return_temp.into(),
    "c" => |s| s.c.into(),
    "pthermalmax" => |s| s.p_thermal_max.into(),
});

accessors!(NODE_RESULT: NodeResult {
    "uuid" => |r| r.uuid.into(),
    "time" => |r| r.time.into(),
    "inputmodel" => |r| r.input_model.into(),
    "vmag" => |r| r.v_mag.into(),
    "vang" => |r| r.v_ang.into(),
});

accessors!(LOAD_RESULT: LoadResult {
    "uuid" => |r| r.uuid.into(),
    "time" => |r| r.time.into(),
    "inputmodel" => |r| r.input_model.into(),
    "p" => |r| r.p.into(),
    "q" => |r| r.q.into(),
});

accessors!(IRRADIANCE: IrradianceValue {
    "diffuseirradiance" => |i| i.diffuse_irradiance.into(),
    "directirradiance" => |i| i.direct_irradiance.into(),
});

accessors!(TEMPERATURE: TemperatureValue {
    "temperature" => |t| t.temperature.into(),
});

accessors!(WIND: WindValue {
    "winddirection" => |w| w.direction.into(),
    "windvelocity" => |w| w.velocity.into(),
});
