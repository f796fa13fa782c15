use std::env;
use std::path::PathBuf;
use crate::error::{Result, LexGetError};

/// Environment variable configuration constants
pub struct EnvVars;

impl EnvVars {
    pub const DATABASE_PATH: &'static str = "LEXGET_DATABASE_PATH";
    pub const DICT: &'static str = "LEXGET_DICT";
    pub const QUERY_TIMEOUT: &'static str = "LEXGET_QUERY_TIMEOUT";
    pub const USE_CACHE: &'static str = "LEXGET_USE_CACHE";
    pub const SHOW_PROVIDER: &'static str = "LEXGET_SHOW_PROVIDER";
    pub const SHOW_URL: &'static str = "LEXGET_SHOW_URL";
}

/// Environment variable parsing utilities with validation
pub struct EnvParser;

impl EnvParser {
    /// Parse environment variable as string with validation
    pub fn parse_string(var_name: &str, validator: Option<fn(&str) -> Result<()>>) -> Result<Option<String>> {
        match env::var(var_name) {
            Ok(value) => {
                let trimmed = value.trim().to_string();
                if trimmed.is_empty() {
                    return Ok(None);
                }

                if let Some(validate_fn) = validator {
                    validate_fn(&trimmed)?;
                }

                Ok(Some(trimmed))
            }
            Err(env::VarError::NotPresent) => Ok(None),
            Err(env::VarError::NotUnicode(_)) => {
                Err(LexGetError::Validation(format!(
                    "Environment variable {} contains invalid UTF-8",
                    var_name
                )))
            }
        }
    }

    /// Parse environment variable as a path; the file need not exist yet
    pub fn parse_path(var_name: &str) -> Result<Option<PathBuf>> {
        Ok(Self::parse_string(var_name, None)?.map(PathBuf::from))
    }

    /// Parse environment variable as boolean with validation
    pub fn parse_bool(var_name: &str) -> Result<Option<bool>> {
        if let Some(value_str) = Self::parse_string(var_name, None)? {
            match value_str.to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(Some(true)),
                "false" | "0" | "no" | "off" => Ok(Some(false)),
                _ => Err(LexGetError::Validation(format!(
                    "Invalid boolean value in {}: '{}'. Use: true/false, 1/0, yes/no, on/off",
                    var_name, value_str
                )))
            }
        } else {
            Ok(None)
        }
    }

    /// Parse environment variable as seconds with range validation
    pub fn parse_f64(var_name: &str, min: f64, max: f64) -> Result<Option<f64>> {
        if let Some(value_str) = Self::parse_string(var_name, None)? {
            let value = value_str.parse::<f64>().map_err(|_| {
                LexGetError::Validation(format!(
                    "Invalid number in {}: '{}'. Must be a number of seconds",
                    var_name, value_str
                ))
            })?;

            if !(min..=max).contains(&value) {
                return Err(LexGetError::Validation(format!(
                    "Value in {} must be between {} and {}, got {}",
                    var_name, min, max, value
                )));
            }

            Ok(Some(value))
        } else {
            Ok(None)
        }
    }
}
