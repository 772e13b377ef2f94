use crate::error::AppError;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// Utility for converting database errors to structured AppError variants.
///
/// PostgreSQL names constraints `{table}_{column}_{suffix}` by default
/// (`notifiers_plugin_key`, `telegram_settings_id_fkey`); the converter relies on
/// that convention to report which entity and field were involved.
pub struct DatabaseErrorConverter;

impl DatabaseErrorConverter {
    /// Converts a Diesel error to an appropriate AppError variant.
    ///
    /// # Arguments
    /// * `error` - The Diesel error to convert
    /// * `operation` - Description of the database operation that failed
    pub fn convert_diesel_error(error: DieselError, operation: &str) -> AppError {
        match error {
            DieselError::DatabaseError(kind, info) => {
                let message = info.message().to_string();
                let parsed = info.constraint_name().and_then(Self::split_constraint_name);
                Self::convert_database_error(kind, &message, parsed, operation)
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
        message: &str,
        parsed: Option<(String, String)>,
        operation: &str,
    ) -> AppError {
        match (kind, parsed) {
            (DatabaseErrorKind::UniqueViolation, Some((entity, field))) => AppError::Duplicate {
                entity,
                field,
                value: Self::extract_key_value(message).unwrap_or_default(),
            },
            (DatabaseErrorKind::ForeignKeyViolation, Some((entity, field))) => {
                AppError::Validation {
                    field,
                    reason: format!("Invalid reference from {}", entity),
                }
            }
            (DatabaseErrorKind::NotNullViolation, Some((entity, field))) => AppError::Validation {
                field,
                reason: format!("Field is required for {}", entity),
            },
            _ => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::msg(format!("Database error: {}", message)),
            },
        }
    }

    /// Splits `{table}_{column}_{suffix}` into `(table, column)`.
    ///
    /// Table names may themselves contain underscores, so the known tables are
    /// matched by prefix before falling back to the first segment.
    fn split_constraint_name(name: &str) -> Option<(String, String)> {
        const TABLES: &[&str] = &["telegram_settings", "notifiers"];
        const SUFFIXES: &[&str] = &["_key", "_fkey", "_pkey", "_not_null", "_check"];

        let stem = SUFFIXES
            .iter()
            .find_map(|suffix| name.strip_suffix(suffix))?;

        let table = TABLES
            .iter()
            .find(|t| stem.starts_with(&format!("{}_", t)))
            .map(|t| t.to_string())
            .or_else(|| stem.split('_').next().map(str::to_string))?;

        let column = stem.strip_prefix(&format!("{}_", table))?;
        if column.is_empty() {
            return None;
        }
        Some((table, column.to_string()))
    }

    /// Pulls `value` out of `Key (field)=(value) already exists.`
    fn extract_key_value(message: &str) -> Option<String> {
        let start = message.find(")=(")? + 3;
        let end = message[start..].find(')')? + start;
        Some(message[start..end].to_string())
    }
}
