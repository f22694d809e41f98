//! Closed table of output units per (entity kind, quantity field).

use std::collections::HashMap;

use gridmap_core::units::Unit;
use gridmap_core::EntityKind;
use once_cell::sync::Lazy;

macro_rules! unit_map {
    ($($kind:ident { $($field:literal => $unit:ident),* $(,)? })*) => {
        Lazy::new(|| {
            let mut map: HashMap<EntityKind, HashMap<&'static str, Unit>> = HashMap::new();
            $(
                let fields = map.entry(EntityKind::$kind).or_default();
                $(fields.insert($field, Unit::$unit);)*
            )*
            map
        })
    };
}

static OUTPUT_UNITS: Lazy<HashMap<EntityKind, HashMap<&'static str, Unit>>> = unit_map! {
    VoltageLevel { "vrated" => Kilovolt }
    Node { "vtarget" => PerUnit, "vrated" => Kilovolt }
    LineType {
        "b" => MicrosiemensPerKilometre,
        "g" => MicrosiemensPerKilometre,
        "r" => OhmPerKilometre,
        "x" => OhmPerKilometre,
        "imax" => Ampere,
        "vrated" => Kilovolt,
    }
    Line { "length" => Kilometre }
    Load {
        "srated" => KilovoltAmpere,
        "econsannual" => KilowattHour,
        "cosphirated" => PerUnit,
    }
    ChpType {
        "srated" => KilovoltAmpere,
        "cosphirated" => PerUnit,
        "etael" => Percent,
        "etathermal" => Percent,
        "pthermal" => Kilowatt,
        "pown" => Kilowatt,
    }
    CylindricalStorage {
        "storagevolumelvl" => CubicMetre,
        "inlettemp" => Celsius,
        "returntemp" => Celsius,
        "c" => KilowattHourPerKelvinCubicMetre,
        "pthermalmax" => Kilowatt,
    }
    NodeResult { "vmag" => PerUnit, "vang" => Degree }
    LoadResult { "p" => Megawatt, "q" => Megavar }
    TimeBasedValue {
        "price" => EuroPerMegawattHour,
        "p" => Kilowatt,
        "q" => Kilovar,
        "heatdemand" => Kilowatt,
    }
    Irradiance {
        "diffuseirradiance" => WattPerSquareMetre,
        "directirradiance" => WattPerSquareMetre,
    }
    Temperature { "temperature" => Kelvin }
    Wind { "winddirection" => Degree, "windvelocity" => MetrePerSecond }
};

/// Unit a quantity field is written in, if the pair is declared.
pub fn output_unit(kind: EntityKind, field: &str) -> Option<Unit> {
    OUTPUT_UNITS.get(&kind)?.get(field).copied()
}
