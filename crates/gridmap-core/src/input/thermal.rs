use std::sync::Arc;

use uuid::Uuid;

use super::{in_unit, non_negative, OperationTime, OperatorInput};
use crate::units::{Quantity, Unit};
use crate::{MappingError, MappingResult};

/// Connection point of thermal units (the heat-side counterpart of a node).
#[derive(Debug, Clone, PartialEq)]
pub struct ThermalBusInput {
    pub uuid: Uuid,
    pub id: String,
    pub operator: Arc<OperatorInput>,
    pub operation_time: OperationTime,
}

impl ThermalBusInput {
    pub fn new(
        uuid: Uuid,
        id: impl Into<String>,
        operator: Arc<OperatorInput>,
        operation_time: OperationTime,
    ) -> Self {
        Self {
            uuid,
            id: id.into(),
            operator,
            operation_time,
        }
    }
}

/// Cylindrical hot water storage.
#[derive(Debug, Clone, PartialEq)]
pub struct CylindricalStorageInput {
    pub uuid: Uuid,
    pub id: String,
    pub operator: Arc<OperatorInput>,
    pub operation_time: OperationTime,
    pub thermal_bus: Arc<ThermalBusInput>,
    /// Usable storage volume (m³)
    pub storage_volume_lvl: Quantity,
    /// Inlet temperature (°C)
    pub inlet_temp: Quantity,
    /// Return temperature (°C)
    pub return_temp: Quantity,
    /// Specific heat capacity of the medium (kWh/(K·m³))
    pub c: Quantity,
    /// Maximum charge/discharge power (kW)
    pub p_thermal_max: Quantity,
}

impl CylindricalStorageInput {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        uuid: Uuid,
        id: impl Into<String>,
        operator: Arc<OperatorInput>,
        operation_time: OperationTime,
        thermal_bus: Arc<ThermalBusInput>,
        storage_volume_lvl: Quantity,
        inlet_temp: Quantity,
        return_temp: Quantity,
        c: Quantity,
        p_thermal_max: Quantity,
    ) -> MappingResult<Self> {
        let storage_volume_lvl = in_unit("storage volume", storage_volume_lvl, Unit::CubicMetre)?;
        let inlet_temp = in_unit("inlet temperature", inlet_temp, Unit::Celsius)?;
        let return_temp = in_unit("return temperature", return_temp, Unit::Celsius)?;
        let c = in_unit("specific heat capacity", c, Unit::KilowattHourPerKelvinCubicMetre)?;
        let p_thermal_max = in_unit("maximum thermal power", p_thermal_max, Unit::Kilowatt)?;
        non_negative("storage volume", storage_volume_lvl.value())?;
        non_negative("specific heat capacity", c.value())?;
        non_negative("maximum thermal power", p_thermal_max.value())?;
        if return_temp.value() > inlet_temp.value() {
            return Err(MappingError::Validation(format!(
                "return temperature ({}) exceeds inlet temperature ({})",
                return_temp, inlet_temp
            )));
        }
        Ok(Self {
            uuid,
            id: id.into(),
            operator,
            operation_time,
            thermal_bus,
            storage_volume_lvl,
            inlet_temp,
            return_temp,
            c,
            p_thermal_max,
        })
    }

    /// Heat that can be stored between return and inlet temperature (kWh).
    pub fn capacity_kwh(&self) -> f64 {
        self.storage_volume_lvl.value()
            * self.c.value()
            * (self.inlet_temp.value() - self.return_temp.value())
    }
}
