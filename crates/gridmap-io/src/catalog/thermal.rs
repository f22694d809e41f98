use gridmap_core::input::{CylindricalStorageInput, ThermalBusInput};
use gridmap_core::units::Unit;
use gridmap_core::{Entity, EntityKind};

use super::{Args, CatalogBuilder, EntityCatalog, OPERATED};
use crate::strategy::LeafKind;

pub(super) fn thermal_bus() -> EntityCatalog {
    CatalogBuilder::new(EntityKind::ThermalBus)
        .direct("uuid", LeafKind::Uuid)
        .direct("id", LeafKind::Text)
        .operated()
        .variants(OPERATED, build_thermal_bus)
        .finish()
}

fn build_thermal_bus(args: &Args) -> anyhow::Result<Entity> {
    Ok(ThermalBusInput::new(
        args.uuid("uuid")?,
        args.text("id")?,
        args.operator()?,
        args.operation_time()?,
    )
    .into())
}

pub(super) fn cylindrical_storage() -> EntityCatalog {
    CatalogBuilder::new(EntityKind::CylindricalStorage)
        .direct("uuid", LeafKind::Uuid)
        .direct("id", LeafKind::Text)
        .operated()
        .external("thermalbus", EntityKind::ThermalBus)
        .quantity("storagevolumelvl", Unit::CubicMetre)
        .quantity("inlettemp", Unit::Celsius)
        .quantity("returntemp", Unit::Celsius)
        .quantity("c", Unit::KilowattHourPerKelvinCubicMetre)
        .quantity("pthermalmax", Unit::Kilowatt)
        .variants(OPERATED, build_cylindrical_storage)
        .finish()
}

fn build_cylindrical_storage(args: &Args) -> anyhow::Result<Entity> {
    Ok(CylindricalStorageInput::new(
        args.uuid("uuid")?,
        args.text("id")?,
        args.operator()?,
        args.operation_time()?,
        args.entity_ref("thermalbus", Entity::as_thermal_bus)?,
        args.quantity("storagevolumelvl")?,
        args.quantity("inlettemp")?,
        args.quantity("returntemp")?,
        args.quantity("c")?,
        args.quantity("pthermalmax")?,
    )?
    .into())
}
