use std::sync::Arc;

use uuid::Uuid;

use super::{
    in_unit, non_negative, CylindricalStorageInput, NodeInput, OperationTime, OperatorInput,
    ThermalBusInput,
};
use crate::units::{Quantity, Unit};
use crate::{MappingError, MappingResult};

fn power_factor(cos_phi: Quantity) -> MappingResult<Quantity> {
    let cos_phi = in_unit("rated power factor", cos_phi, Unit::PerUnit)?;
    if !(0.0..=1.0).contains(&cos_phi.value()) {
        return Err(MappingError::Validation(format!(
            "rated power factor must lie in [0, 1], got {}",
            cos_phi.value()
        )));
    }
    Ok(cos_phi)
}

/// An energy management unit controlling participants, possibly nested under a parent.
#[derive(Debug, Clone, PartialEq)]
pub struct EmInput {
    pub uuid: Uuid,
    pub id: String,
    pub operator: Arc<OperatorInput>,
    pub operation_time: OperationTime,
    pub control_strategy: String,
    pub parent_em: Option<Arc<EmInput>>,
}

impl EmInput {
    pub fn new(
        uuid: Uuid,
        id: impl Into<String>,
        operator: Arc<OperatorInput>,
        operation_time: OperationTime,
        control_strategy: impl Into<String>,
        parent_em: Option<Arc<EmInput>>,
    ) -> MappingResult<Self> {
        if parent_em.as_ref().is_some_and(|p| p.uuid == uuid) {
            return Err(MappingError::Validation(format!(
                "energy manager {uuid} cannot be its own parent"
            )));
        }
        Ok(Self {
            uuid,
            id: id.into(),
            operator,
            operation_time,
            control_strategy: control_strategy.into(),
            parent_em,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadInput {
    pub uuid: Uuid,
    pub id: String,
    pub operator: Arc<OperatorInput>,
    pub operation_time: OperationTime,
    pub node: Arc<NodeInput>,
    /// Reactive power characteristic, e.g. `cosPhiFixed:{(0.00,0.95)}`
    pub q_characteristics: String,
    pub em: Option<Arc<EmInput>>,
    pub load_profile: String,
    /// Rated apparent power (kVA)
    pub s_rated: Quantity,
    /// Annual energy consumption (kWh)
    pub e_cons_annual: Quantity,
    pub cos_phi_rated: Quantity,
}

impl LoadInput {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        uuid: Uuid,
        id: impl Into<String>,
        operator: Arc<OperatorInput>,
        operation_time: OperationTime,
        node: Arc<NodeInput>,
        q_characteristics: impl Into<String>,
        em: Option<Arc<EmInput>>,
        load_profile: impl Into<String>,
        s_rated: Quantity,
        e_cons_annual: Quantity,
        cos_phi_rated: Quantity,
    ) -> MappingResult<Self> {
        let s_rated = in_unit("rated apparent power", s_rated, Unit::KilovoltAmpere)?;
        let e_cons_annual = in_unit("annual consumption", e_cons_annual, Unit::KilowattHour)?;
        non_negative("rated apparent power", s_rated.value())?;
        non_negative("annual consumption", e_cons_annual.value())?;
        Ok(Self {
            uuid,
            id: id.into(),
            operator,
            operation_time,
            node,
            q_characteristics: q_characteristics.into(),
            em,
            load_profile: load_profile.into(),
            s_rated,
            e_cons_annual,
            cos_phi_rated: power_factor(cos_phi_rated)?,
        })
    }
}

/// Technical data of a combined heat and power plant type.
#[derive(Debug, Clone, PartialEq)]
pub struct ChpTypeInput {
    pub uuid: Uuid,
    pub id: String,
    /// Rated apparent power (kVA)
    pub s_rated: Quantity,
    pub cos_phi_rated: Quantity,
    /// Electrical efficiency (%)
    pub eta_el: Quantity,
    /// Thermal efficiency (%)
    pub eta_thermal: Quantity,
    /// Rated thermal power (kW)
    pub p_thermal: Quantity,
    /// Internal consumption (kW)
    pub p_own: Quantity,
}

impl ChpTypeInput {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        uuid: Uuid,
        id: impl Into<String>,
        s_rated: Quantity,
        cos_phi_rated: Quantity,
        eta_el: Quantity,
        eta_thermal: Quantity,
        p_thermal: Quantity,
        p_own: Quantity,
    ) -> MappingResult<Self> {
        let s_rated = in_unit("rated apparent power", s_rated, Unit::KilovoltAmpere)?;
        let eta_el = in_unit("electrical efficiency", eta_el, Unit::Percent)?;
        let eta_thermal = in_unit("thermal efficiency", eta_thermal, Unit::Percent)?;
        let p_thermal = in_unit("thermal power", p_thermal, Unit::Kilowatt)?;
        let p_own = in_unit("internal consumption", p_own, Unit::Kilowatt)?;
        if eta_el.value() + eta_thermal.value() > 100.0 {
            return Err(MappingError::Validation(format!(
                "combined efficiency exceeds 100 % ({} % + {} %)",
                eta_el.value(),
                eta_thermal.value()
            )));
        }
        Ok(Self {
            uuid,
            id: id.into(),
            s_rated,
            cos_phi_rated: power_factor(cos_phi_rated)?,
            eta_el,
            eta_thermal,
            p_thermal,
            p_own,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChpInput {
    pub uuid: Uuid,
    pub id: String,
    pub operator: Arc<OperatorInput>,
    pub operation_time: OperationTime,
    pub node: Arc<NodeInput>,
    pub q_characteristics: String,
    pub chp_type: Arc<ChpTypeInput>,
    pub thermal_bus: Arc<ThermalBusInput>,
    pub thermal_storage: Arc<CylindricalStorageInput>,
    pub market_reaction: bool,
    pub em: Option<Arc<EmInput>>,
}

impl ChpInput {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        uuid: Uuid,
        id: impl Into<String>,
        operator: Arc<OperatorInput>,
        operation_time: OperationTime,
        node: Arc<NodeInput>,
        q_characteristics: impl Into<String>,
        chp_type: Arc<ChpTypeInput>,
        thermal_bus: Arc<ThermalBusInput>,
        thermal_storage: Arc<CylindricalStorageInput>,
        market_reaction: bool,
        em: Option<Arc<EmInput>>,
    ) -> MappingResult<Self> {
        if thermal_storage.thermal_bus.uuid != thermal_bus.uuid {
            return Err(MappingError::Validation(format!(
                "storage {} is attached to thermal bus {}, not {}",
                thermal_storage.uuid, thermal_storage.thermal_bus.uuid, thermal_bus.uuid
            )));
        }
        Ok(Self {
            uuid,
            id: id.into(),
            operator,
            operation_time,
            node,
            q_characteristics: q_characteristics.into(),
            chp_type,
            thermal_bus,
            thermal_storage,
            market_reaction,
            em,
        })
    }
}
