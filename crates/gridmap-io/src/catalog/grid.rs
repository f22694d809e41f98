//! Grid assets: operators, voltage levels, nodes, lines.

use gridmap_core::input::{
    LineGraphicInput, LineInput, LineTypeInput, NodeInput, OperatorInput, VoltageLevel,
};
use gridmap_core::units::Unit;
use gridmap_core::{Entity, EntityKind};

use super::{Args, CatalogBuilder, EntityCatalog, OPERATED};
use crate::strategy::LeafKind;

/// Fields of the voltage level embedded in a node record.
const VOLTAGE_LEVEL_FIELDS: &[&str] = &["voltlvl", "vrated"];

pub(super) fn operator() -> EntityCatalog {
    CatalogBuilder::new(EntityKind::Operator)
        .direct("uuid", LeafKind::Uuid)
        .direct("id", LeafKind::Text)
        .all(build_operator)
        .finish()
}

fn build_operator(args: &Args) -> anyhow::Result<Entity> {
    Ok(OperatorInput::new(args.uuid("uuid")?, args.text("id")?)?.into())
}

pub(super) fn voltage_level() -> EntityCatalog {
    CatalogBuilder::new(EntityKind::VoltageLevel)
        .direct("voltlvl", LeafKind::Text)
        .quantity("vrated", Unit::Kilovolt)
        .all(build_voltage_level)
        .finish()
}

fn build_voltage_level(args: &Args) -> anyhow::Result<Entity> {
    Ok(VoltageLevel::new(args.text("voltlvl")?, args.quantity("vrated")?)?.into())
}

pub(super) fn node() -> EntityCatalog {
    CatalogBuilder::new(EntityKind::Node)
        .direct("uuid", LeafKind::Uuid)
        .direct("id", LeafKind::Text)
        .operated()
        .quantity("vtarget", Unit::PerUnit)
        .direct("slack", LeafKind::Boolean)
        .direct("geoposition", LeafKind::GeoPoint)
        .nested("voltlvl", EntityKind::VoltageLevel, VOLTAGE_LEVEL_FIELDS)
        .direct("subnet", LeafKind::Integer)
        .variants(
            &["operator", "operatesfrom", "operatesuntil", "geoposition"],
            build_node,
        )
        .finish()
}

fn build_node(args: &Args) -> anyhow::Result<Entity> {
    Ok(NodeInput::new(
        args.uuid("uuid")?,
        args.text("id")?,
        args.operator()?,
        args.operation_time()?,
        args.quantity("vtarget")?,
        args.boolean("slack")?,
        args.geo("geoposition")?,
        args.entity_ref("voltlvl", Entity::as_voltage_level)?,
        args.integer("subnet")?,
    )?
    .into())
}

pub(super) fn line_type() -> EntityCatalog {
    CatalogBuilder::new(EntityKind::LineType)
        .direct("uuid", LeafKind::Uuid)
        .direct("id", LeafKind::Text)
        .quantity("b", Unit::MicrosiemensPerKilometre)
        .quantity("g", Unit::MicrosiemensPerKilometre)
        .quantity("r", Unit::OhmPerKilometre)
        .quantity("x", Unit::OhmPerKilometre)
        .quantity("imax", Unit::Ampere)
        .quantity("vrated", Unit::Kilovolt)
        .all(build_line_type)
        .finish()
}

fn build_line_type(args: &Args) -> anyhow::Result<Entity> {
    Ok(LineTypeInput::new(
        args.uuid("uuid")?,
        args.text("id")?,
        args.quantity("b")?,
        args.quantity("g")?,
        args.quantity("r")?,
        args.quantity("x")?,
        args.quantity("imax")?,
        args.quantity("vrated")?,
    )?
    .into())
}

pub(super) fn line() -> EntityCatalog {
    CatalogBuilder::new(EntityKind::Line)
        .direct("uuid", LeafKind::Uuid)
        .direct("id", LeafKind::Text)
        .operated()
        .external("nodea", EntityKind::Node)
        .external("nodeb", EntityKind::Node)
        .direct("paralleldevices", LeafKind::Integer)
        .external("type", EntityKind::LineType)
        .quantity("length", Unit::Kilometre)
        .direct("olmcharacteristic", LeafKind::Text)
        .variants(OPERATED, build_line)
        .finish()
}

fn build_line(args: &Args) -> anyhow::Result<Entity> {
    Ok(LineInput::new(
        args.uuid("uuid")?,
        args.text("id")?,
        args.operator()?,
        args.operation_time()?,
        args.entity_ref("nodea", Entity::as_node)?,
        args.entity_ref("nodeb", Entity::as_node)?,
        args.integer("paralleldevices")?,
        args.entity_ref("type", Entity::as_line_type)?,
        args.quantity("length")?,
        args.text_or_default("olmcharacteristic")?,
    )?
    .into())
}

pub(super) fn line_graphic() -> EntityCatalog {
    CatalogBuilder::new(EntityKind::LineGraphic)
        .direct("uuid", LeafKind::Uuid)
        .direct("graphiclayer", LeafKind::Text)
        .external("line", EntityKind::Line)
        .all(build_line_graphic)
        .finish()
}

fn build_line_graphic(args: &Args) -> anyhow::Result<Entity> {
    Ok(LineGraphicInput::new(
        args.uuid("uuid")?,
        args.text("graphiclayer")?,
        args.entity_ref("line", Entity::as_line)?,
    )
    .into())
}
