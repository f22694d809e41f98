//! System participants: loads, energy managers and CHP plants.

use gridmap_core::input::{ChpInput, ChpTypeInput, EmInput, LoadInput};
use gridmap_core::units::Unit;
use gridmap_core::{Entity, EntityKind};

use super::{Args, CatalogBuilder, EntityCatalog};
use crate::strategy::LeafKind;

pub(super) fn load() -> EntityCatalog {
    CatalogBuilder::new(EntityKind::Load)
        .direct("uuid", LeafKind::Uuid)
        .direct("id", LeafKind::Text)
        .operated()
        .external("node", EntityKind::Node)
        .direct("qcharacteristics", LeafKind::Text)
        .external("em", EntityKind::EnergyManager)
        .direct("loadprofile", LeafKind::Text)
        .quantity("srated", Unit::KilovoltAmpere)
        .quantity("econsannual", Unit::KilowattHour)
        .quantity("cosphirated", Unit::PerUnit)
        .variants(&["operator", "operatesfrom", "operatesuntil", "em"], build_load)
        .finish()
}

fn build_load(args: &Args) -> anyhow::Result<Entity> {
    Ok(LoadInput::new(
        args.uuid("uuid")?,
        args.text("id")?,
        args.operator()?,
        args.operation_time()?,
        args.entity_ref("node", Entity::as_node)?,
        args.text_or_default("qcharacteristics")?,
        args.opt_entity_ref("em", Entity::as_energy_manager)?,
        args.text_or_default("loadprofile")?,
        args.quantity("srated")?,
        args.quantity("econsannual")?,
        args.quantity("cosphirated")?,
    )?
    .into())
}

pub(super) fn energy_manager() -> EntityCatalog {
    CatalogBuilder::new(EntityKind::EnergyManager)
        .direct("uuid", LeafKind::Uuid)
        .direct("id", LeafKind::Text)
        .operated()
        .direct("controlstrategy", LeafKind::Text)
        .external("parentem", EntityKind::EnergyManager)
        .variants(
            &["operator", "operatesfrom", "operatesuntil", "parentem"],
            build_energy_manager,
        )
        .finish()
}

fn build_energy_manager(args: &Args) -> anyhow::Result<Entity> {
    Ok(EmInput::new(
        args.uuid("uuid")?,
        args.text("id")?,
        args.operator()?,
        args.operation_time()?,
        args.text_or_default("controlstrategy")?,
        args.opt_entity_ref("parentem", Entity::as_energy_manager)?,
    )?
    .into())
}

pub(super) fn chp_type() -> EntityCatalog {
    CatalogBuilder::new(EntityKind::ChpType)
        .direct("uuid", LeafKind::Uuid)
        .direct("id", LeafKind::Text)
        .quantity("srated", Unit::KilovoltAmpere)
        .quantity("cosphirated", Unit::PerUnit)
        .quantity("etael", Unit::Percent)
        .quantity("etathermal", Unit::Percent)
        .quantity("pthermal", Unit::Kilowatt)
        .quantity("pown", Unit::Kilowatt)
        .all(build_chp_type)
        .finish()
}

fn build_chp_type(args: &Args) -> anyhow::Result<Entity> {
    Ok(ChpTypeInput::new(
        args.uuid("uuid")?,
        args.text("id")?,
        args.quantity("srated")?,
        args.quantity("cosphirated")?,
        args.quantity("etael")?,
        args.quantity("etathermal")?,
        args.quantity("pthermal")?,
        args.quantity("pown")?,
    )?
    .into())
}

pub(super) fn chp() -> EntityCatalog {
    CatalogBuilder::new(EntityKind::Chp)
        .direct("uuid", LeafKind::Uuid)
        .direct("id", LeafKind::Text)
        .operated()
        .external("node", EntityKind::Node)
        .direct("qcharacteristics", LeafKind::Text)
        .external("type", EntityKind::ChpType)
        .external("thermalbus", EntityKind::ThermalBus)
        .external("thermalstorage", EntityKind::CylindricalStorage)
        .direct("marketreaction", LeafKind::Boolean)
        .external("em", EntityKind::EnergyManager)
        .variants(&["operator", "operatesfrom", "operatesuntil", "em"], build_chp)
        .finish()
}

fn build_chp(args: &Args) -> anyhow::Result<Entity> {
    Ok(ChpInput::new(
        args.uuid("uuid")?,
        args.text("id")?,
        args.operator()?,
        args.operation_time()?,
        args.entity_ref("node", Entity::as_node)?,
        args.text_or_default("qcharacteristics")?,
        args.entity_ref("type", Entity::as_chp_type)?,
        args.entity_ref("thermalbus", Entity::as_thermal_bus)?,
        args.entity_ref("thermalstorage", Entity::as_cylindrical_storage)?,
        args.boolean("marketreaction")?,
        args.opt_entity_ref("em", Entity::as_energy_manager)?,
    )?
    .into())
}
