//! Time-based values. One signature per record family, selected by the value
//! columns a row carries.

use anyhow::anyhow;
use gridmap_core::timeseries::{
    IrradianceValue, RecordFamily, TemperatureValue, TimeBasedValue, TsValue, WeatherValue,
    WindValue,
};
use gridmap_core::units::Unit;
use gridmap_core::{Entity, EntityKind};

use super::{Args, CatalogBuilder, EntityCatalog};
use crate::strategy::LeafKind;

const IRRADIANCE_FIELDS: &[&str] = &["diffuseirradiance", "directirradiance"];
const TEMPERATURE_FIELDS: &[&str] = &["temperature"];
const WIND_FIELDS: &[&str] = &["winddirection", "windvelocity"];

pub(super) fn time_based_value() -> EntityCatalog {
    use RecordFamily::*;

    CatalogBuilder::new(EntityKind::TimeBasedValue)
        .direct("uuid", LeafKind::Uuid)
        .direct("time", LeafKind::Timestamp)
        .quantity("price", Unit::EuroPerMegawattHour)
        .quantity("p", Unit::Kilowatt)
        .quantity("q", Unit::Kilovar)
        .quantity("heatdemand", Unit::Kilowatt)
        .direct("coordinate", LeafKind::GeoPoint)
        .nested("irradiance", EntityKind::Irradiance, IRRADIANCE_FIELDS)
        .nested("temperature", EntityKind::Temperature, TEMPERATURE_FIELDS)
        .nested("wind", EntityKind::Wind, WIND_FIELDS)
        .signature(EnergyPrice.name(), &["uuid", "time", "price"], |args: &Args| {
            entry(args, TsValue::energy_price(args.quantity("price")?)?)
        })
        .signature(ActivePower.name(), &["uuid", "time", "p"], |args: &Args| {
            entry(args, TsValue::p(args.quantity("p")?)?)
        })
        .signature(ApparentPower.name(), &["uuid", "time", "p", "q"], |args: &Args| {
            entry(args, TsValue::pq(args.quantity("p")?, args.quantity("q")?)?)
        })
        .signature(HeatDemand.name(), &["uuid", "time", "heatdemand"], |args: &Args| {
            entry(args, TsValue::heat_demand(args.quantity("heatdemand")?)?)
        })
        .signature(
            ActivePowerAndHeatDemand.name(),
            &["uuid", "time", "p", "heatdemand"],
            |args: &Args| {
                entry(
                    args,
                    TsValue::p_heat(args.quantity("p")?, args.quantity("heatdemand")?)?,
                )
            },
        )
        .signature(
            ApparentPowerAndHeatDemand.name(),
            &["uuid", "time", "p", "q", "heatdemand"],
            |args: &Args| {
                entry(
                    args,
                    TsValue::pq_heat(
                        args.quantity("p")?,
                        args.quantity("q")?,
                        args.quantity("heatdemand")?,
                    )?,
                )
            },
        )
        .signature(
            Weather.name(),
            &["uuid", "time", "coordinate", "irradiance", "temperature", "wind"],
            build_weather,
        )
        .finish()
}

fn entry(args: &Args, value: TsValue) -> anyhow::Result<Entity> {
    Ok(TimeBasedValue::new(args.uuid("uuid")?, args.timestamp("time")?, value).into())
}

fn build_weather(args: &Args) -> anyhow::Result<Entity> {
    let coordinate = args
        .geo("coordinate")?
        .ok_or_else(|| anyhow!("a weather value needs a coordinate"))?;
    let value = TsValue::Weather(WeatherValue {
        coordinate,
        irradiance: args.entity_ref("irradiance", Entity::as_irradiance)?,
        temperature: args.entity_ref("temperature", Entity::as_temperature)?,
        wind: args.entity_ref("wind", Entity::as_wind)?,
    });
    entry(args, value)
}

pub(super) fn irradiance() -> EntityCatalog {
    CatalogBuilder::new(EntityKind::Irradiance)
        .quantity("diffuseirradiance", Unit::WattPerSquareMetre)
        .quantity("directirradiance", Unit::WattPerSquareMetre)
        .all(|args: &Args| {
            let value = IrradianceValue::new(
                args.quantity("diffuseirradiance")?,
                args.quantity("directirradiance")?,
            )?;
            Ok(value.into())
        })
        .finish()
}

pub(super) fn temperature() -> EntityCatalog {
    CatalogBuilder::new(EntityKind::Temperature)
        .quantity("temperature", Unit::Kelvin)
        .all(|args: &Args| Ok(TemperatureValue::new(args.quantity("temperature")?)?.into()))
        .finish()
}

pub(super) fn wind() -> EntityCatalog {
    CatalogBuilder::new(EntityKind::Wind)
        .quantity("winddirection", Unit::Degree)
        .quantity("windvelocity", Unit::MetrePerSecond)
        .all(|args: &Args| {
            Ok(WindValue::new(
                args.quantity("winddirection")?,
                args.quantity("windvelocity")?,
            )?
            .into())
        })
        .finish()
}
