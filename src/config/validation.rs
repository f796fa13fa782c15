use std::path::Path;
use crate::core::providers::ProviderKind;
use crate::error::{ConfigError, LexGetError, Result};

/// Centralized configuration validation utilities
pub struct ConfigValidator;

impl ConfigValidator {
    pub const MIN_TIMEOUT_SECONDS: f64 = 0.1;
    pub const MAX_TIMEOUT_SECONDS: f64 = 120.0;

    /// Validate numeric range
    pub fn validate_range<T>(value: T, min: T, max: T, field_name: &str) -> Result<()>
    where
        T: PartialOrd + std::fmt::Display + Copy,
    {
        if value < min || value > max {
            return Err(LexGetError::Validation(format!(
                "{} must be between {} and {}, got {}",
                field_name, min, max, value
            )));
        }
        Ok(())
    }

    /// Validate a per-word query timeout in seconds
    pub fn validate_timeout(seconds: f64) -> Result<()> {
        if !seconds.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "query_timeout_seconds".to_string(),
                value: seconds.to_string(),
            }
            .into());
        }
        Self::validate_range(
            seconds,
            Self::MIN_TIMEOUT_SECONDS,
            Self::MAX_TIMEOUT_SECONDS,
            "query timeout (seconds)",
        )
    }

    /// Validate a dictionary name
    pub fn validate_dict(name: &str) -> Result<()> {
        name.parse::<ProviderKind>()?;
        Ok(())
    }

    /// Validate database file extension
    pub fn validate_db_path(path: &Path) -> Result<()> {
        if let Some(ext) = path.extension() {
            if ext != "db" && ext != "sqlite" && ext != "sqlite3" {
                return Err(LexGetError::Validation(format!(
                    "Database file should have .db, .sqlite, or .sqlite3 extension, got: {}",
                    path.display()
                )));
            }
        } else {
            return Err(LexGetError::Validation(format!(
                "Database file should have an extension (.db, .sqlite, .sqlite3), got: {}",
                path.display()
            )));
        }
        Ok(())
    }
}
