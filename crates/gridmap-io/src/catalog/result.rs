use gridmap_core::result::{LoadResult, NodeResult};
use gridmap_core::units::Unit;
use gridmap_core::{Entity, EntityKind};

use super::{Args, CatalogBuilder, EntityCatalog};
use crate::strategy::LeafKind;

pub(super) fn node_result() -> EntityCatalog {
    CatalogBuilder::new(EntityKind::NodeResult)
        .direct("uuid", LeafKind::Uuid)
        .direct("time", LeafKind::Timestamp)
        .direct("inputmodel", LeafKind::Uuid)
        .quantity("vmag", Unit::PerUnit)
        .quantity("vang", Unit::Degree)
        .all(|args: &Args| {
            Ok(NodeResult::new(
                args.uuid("uuid")?,
                args.timestamp("time")?,
                args.uuid("inputmodel")?,
                args.quantity("vmag")?,
                args.quantity("vang")?,
            )?
            .into())
        })
        .finish()
}

pub(super) fn load_result() -> EntityCatalog {
    CatalogBuilder::new(EntityKind::LoadResult)
        .direct("uuid", LeafKind::Uuid)
        .direct("time", LeafKind::Timestamp)
        .direct("inputmodel", LeafKind::Uuid)
        .quantity("p", Unit::Megawatt)
        .quantity("q", Unit::Megavar)
        .all(|args: &Args| {
            Ok(LoadResult::new(
                args.uuid("uuid")?,
                args.timestamp("time")?,
                args.uuid("inputmodel")?,
                args.quantity("p")?,
                args.quantity("q")?,
            )?
            .into())
        })
        .finish()
}
