//! Unified error type for record mapping.
//!
//! Every failure the decode, flatten and extraction paths can produce is a
//! [`MappingError`]. Errors fall in two classes:
//!
//! - **per-row** failures (malformed text, a constructor rejecting its
//!   arguments, an accessor failing) are contained by batch operations, which
//!   log them and carry on with the remaining rows;
//! - **configuration** failures (no strategy for a type, a catalog that cannot
//!   describe a record, an unreadable config file) should stop a batch before
//!   any row is touched. See [`MappingError::is_configuration`].
//!
//! # Example
//!
//! ```ignore
//! use gridmap_core::{MappingError, MappingResult};
//!
//! fn load_nodes(rows: &[FieldRecord]) -> MappingResult<Vec<Entity>> {
//!     registry.prepare(&[EntityKind::Node])?;
//!     rows.iter().map(|r| registry.decode_entity(EntityKind::Node, r, &ctx)).collect()
//! }
//! ```

use std::collections::BTreeMap;

use thiserror::Error;

use crate::EntityKind;

/// Error taxonomy for the mapping engine.
#[derive(Error, Debug)]
pub enum MappingError {
    /// Malformed leaf text
    #[error("cannot parse '{raw}' as {target}: {reason}")]
    Parsing {
        target: String,
        raw: String,
        reason: String,
    },

    /// No leaf or composite strategy can be derived for a type
    #[error("no strategy available for {target}")]
    MissingStrategy { target: String },

    /// Zero or several constructor signatures match the supplied field names
    #[error(
        "{entity}: supplied fields {supplied:?} match {matches} of the known signatures {candidates:?}"
    )]
    NoMatchingSignature {
        entity: EntityKind,
        supplied: Vec<String>,
        candidates: Vec<Vec<String>>,
        matches: usize,
    },

    /// The target constructor rejected its arguments
    #[error("cannot construct {entity} from {args:?}: {reason}")]
    Construction {
        entity: EntityKind,
        reason: String,
        args: BTreeMap<String, String>,
    },

    /// Processor asked to normalize a (type, field) pair missing from the unit table
    #[error("no unit declared for quantity field {entity}.{field} (value {value})")]
    UnrecognizedQuantityField {
        entity: EntityKind,
        field: String,
        value: String,
    },

    /// An accessor or formatter failed while flattening
    #[error("cannot flatten {entity}.{field} = {value}: {reason}")]
    Flatten {
        entity: EntityKind,
        field: String,
        value: String,
        reason: String,
    },

    /// A relation-tagged type yielded no nested entities
    #[error("extraction misconfigured for {entity}: {reason}")]
    ExtractionConfiguration { entity: String, reason: String },

    /// Domain rule violated inside an entity constructor
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors (config file access)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results using MappingError.
pub type MappingResult<T> = Result<T, MappingError>;

impl MappingError {
    pub fn parsing(target: impl Into<String>, raw: &str, reason: impl std::fmt::Display) -> Self {
        MappingError::Parsing {
            target: target.into(),
            raw: raw.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Stable, distinguishable failure code.
    pub fn code(&self) -> &'static str {
        match self {
            MappingError::Parsing { .. } => "parsing",
            MappingError::MissingStrategy { .. } => "missing-strategy",
            MappingError::NoMatchingSignature { .. } => "no-matching-signature",
            MappingError::Construction { .. } => "construction",
            MappingError::UnrecognizedQuantityField { .. } => "unrecognized-quantity-field",
            MappingError::Flatten { .. } => "flatten",
            MappingError::ExtractionConfiguration { .. } => "extraction-configuration",
            MappingError::Validation(_) => "validation",
            MappingError::Config(_) => "config",
            MappingError::Io(_) => "io",
        }
    }

    /// Whether the error describes a broken setup rather than a bad row.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            MappingError::MissingStrategy { .. }
                | MappingError::ExtractionConfiguration { .. }
                | MappingError::Config(_)
                | MappingError::Io(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MappingError::parsing("integer", "abc", "invalid digit found in string");
        assert!(err.to_string().contains("'abc'"));
        assert!(err.to_string().contains("integer"));
    }

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            MappingError::parsing("uuid", "x", "bad"),
            MappingError::MissingStrategy {
                target: "NodeInput".into(),
            },
            MappingError::Construction {
                entity: EntityKind::Node,
                reason: "uuid missing".into(),
                args: BTreeMap::new(),
            },
            MappingError::UnrecognizedQuantityField {
                entity: EntityKind::Node,
                field: "p".into(),
                value: "1 kW".into(),
            },
            MappingError::ExtractionConfiguration {
                entity: "LineInput".into(),
                reason: "no relations".into(),
            },
        ];
        let mut codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_configuration_classification() {
        assert!(MappingError::MissingStrategy {
            target: "x".into()
        }
        .is_configuration());
        assert!(!MappingError::parsing("uuid", "x", "bad").is_configuration());
        assert!(!MappingError::Validation("negative length".into()).is_configuration());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: MappingError = io_err.into();
        assert!(matches!(err, MappingError::Io(_)));
        assert!(err.is_configuration());
    }
}
