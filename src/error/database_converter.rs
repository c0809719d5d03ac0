use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

use crate::error::constraint_parser::{Violation, ViolationContext};
use crate::error::{AppError, ConstraintParser};

/// Converts Diesel errors into [`AppError`] variants.
///
/// Constraint violations become `Duplicate` or `Validation` when the parser can
/// name the offending field; everything else is a `Database` error carrying
/// the operation that failed.
pub struct DatabaseErrorConverter;

impl DatabaseErrorConverter {
    pub fn convert_diesel_error(error: DieselError, operation: &str) -> AppError {
        match error {
            DieselError::DatabaseError(kind, info) => {
                Self::convert_database_error(kind, info.as_ref(), operation)
            }
            DieselError::NotFound => AppError::NotFound {
                entity: "resource".to_string(),
                field: "id".to_string(),
                value: "unknown".to_string(),
            },
            other => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::from(other),
            },
        }
    }

    fn convert_database_error(
        kind: DatabaseErrorKind,
        info: &(dyn DatabaseErrorInformation + Send + Sync),
        operation: &str,
    ) -> AppError {
        let ctx = ViolationContext::from_info(info);
        let violation = ConstraintParser::parse(&ctx);

        match (kind, violation) {
            (DatabaseErrorKind::UniqueViolation, Some(Violation { entity, field, value })) => {
                AppError::Duplicate {
                    entity,
                    field,
                    value: value.unwrap_or_else(|| "duplicate value".to_string()),
                }
            }
            (DatabaseErrorKind::NotNullViolation, Some(Violation { entity, field, .. })) => {
                AppError::Validation {
                    field,
                    reason: format!("Field is required for {}", entity),
                }
            }
            (DatabaseErrorKind::ForeignKeyViolation, Some(Violation { entity, field, value })) => {
                AppError::Validation {
                    field,
                    reason: match value {
                        Some(value) => {
                            format!("Invalid reference from {} with value '{}'", entity, value)
                        }
                        None => format!("Invalid reference from {}", entity),
                    },
                }
            }
            (DatabaseErrorKind::CheckViolation, Some(Violation { entity, field, .. })) => {
                AppError::Validation {
                    field,
                    reason: format!("Check constraint failed for {}", entity),
                }
            }
            (kind, _) => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::anyhow!("{:?}: {}", kind, info.message()),
            },
        }
    }
}
