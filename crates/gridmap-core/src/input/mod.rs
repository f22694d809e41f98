//! Input model: grid assets, system participants and thermal units.
//!
//! Every constructor validates its domain rules and returns a
//! [`MappingResult`]; a violated rule is a [`MappingError::Validation`].

use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use once_cell::sync::Lazy;
use uuid::{uuid, Uuid};

use crate::units::{Quantity, Unit};
use crate::{MappingError, MappingResult};

mod grid;
mod participant;
mod thermal;

pub use grid::{LineGraphicInput, LineInput, LineTypeInput, NodeInput, VoltageLevel};
pub use participant::{ChpInput, ChpTypeInput, EmInput, LoadInput};
pub use thermal::{CylindricalStorageInput, ThermalBusInput};

/// The company responsible for an asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperatorInput {
    pub uuid: Uuid,
    pub id: String,
}

const NO_OPERATOR_UUID: Uuid = uuid!("f15105c4-a2de-4ab8-a621-4bc98e372d92");

static NO_OPERATOR_ASSIGNED: Lazy<Arc<OperatorInput>> = Lazy::new(|| {
    Arc::new(OperatorInput {
        uuid: NO_OPERATOR_UUID,
        id: "NO_OPERATOR_ASSIGNED".to_string(),
    })
});

/// Placeholder operator for assets without one. Never persisted.
pub fn no_operator_assigned() -> Arc<OperatorInput> {
    Arc::clone(&NO_OPERATOR_ASSIGNED)
}

impl OperatorInput {
    pub fn new(uuid: Uuid, id: impl Into<String>) -> MappingResult<Self> {
        let id = id.into();
        if uuid == NO_OPERATOR_UUID {
            return Err(MappingError::Validation(format!(
                "operator {id}: uuid {uuid} is reserved for unassigned assets"
            )));
        }
        Ok(Self { uuid, id })
    }

    pub fn is_unassigned(&self) -> bool {
        self.uuid == NO_OPERATOR_UUID
    }
}

/// Time window in which an asset is in operation. Either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperationTime {
    pub start: Option<DateTime<FixedOffset>>,
    pub end: Option<DateTime<FixedOffset>>,
}

impl OperationTime {
    pub fn new(
        start: Option<DateTime<FixedOffset>>,
        end: Option<DateTime<FixedOffset>>,
    ) -> MappingResult<Self> {
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(MappingError::Validation(format!(
                    "operation starts ({s}) after it ends ({e})"
                )));
            }
        }
        Ok(Self { start, end })
    }

    pub fn not_limited() -> Self {
        Self::default()
    }

    pub fn is_limited(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    pub fn includes(&self, at: DateTime<FixedOffset>) -> bool {
        self.start.map_or(true, |s| s <= at) && self.end.map_or(true, |e| at <= e)
    }
}

/// Assets that carry an operator and an operation time.
pub trait Operable {
    fn operator(&self) -> &Arc<OperatorInput>;
    fn operation_time(&self) -> &OperationTime;

    fn in_operation(&self, at: DateTime<FixedOffset>) -> bool {
        self.operation_time().includes(at)
    }
}

macro_rules! impl_operable {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::input::Operable for $ty {
                fn operator(&self) -> &std::sync::Arc<$crate::input::OperatorInput> {
                    &self.operator
                }
                fn operation_time(&self) -> &$crate::input::OperationTime {
                    &self.operation_time
                }
            }
        )*
    };
}

impl_operable!(
    NodeInput,
    LineInput,
    LoadInput,
    EmInput,
    ChpInput,
    ThermalBusInput,
    CylindricalStorageInput,
);

/// Express `q` in `unit`, rejecting quantities of another family.
pub(crate) fn in_unit(what: &str, q: Quantity, unit: Unit) -> MappingResult<Quantity> {
    q.to(unit)
        .map_err(|e| MappingError::Validation(format!("{what}: {e}")))
}

pub(crate) fn non_negative(what: &str, value: f64) -> MappingResult<()> {
    if value < 0.0 || !value.is_finite() {
        return Err(MappingError::Validation(format!(
            "{what} must be a non-negative number, got {value}"
        )));
    }
    Ok(())
}
