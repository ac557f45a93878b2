use crate::adapters::counter_store::CounterStoreError;

pub const TABLE_NAME_ENV: &str = "TABLE_NAME";

/// Reads the counter table name from the process environment.
///
/// Resolved on every store call rather than at startup, so a missing variable
/// surfaces as a per-invocation error instead of a failed cold start.
pub fn resolve_table_name() -> Result<String, CounterStoreError> {
    table_name_from(std::env::var(TABLE_NAME_ENV).ok())
}

pub fn table_name_from(value: Option<String>) -> Result<String, CounterStoreError> {
    match value {
        Some(name) if !name.trim().is_empty() => Ok(name.trim().to_string()),
        _ => Err(CounterStoreError::Configuration(format!(
            "{TABLE_NAME_ENV} must be configured"
        ))),
    }
}
