use std::path::PathBuf;

use crate::error::{Error, Result};

/// Trait for wire requests that must be checked before anything touches the OS.
/// Validation consumes the request and yields the typed value the tool runs on.
pub trait Validatable {
    type Valid;

    fn validate(self) -> Result<Self::Valid>;
}

/// Require a present, non-blank string field
pub fn require(field: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        Some(_) => Err(Error::invalid(format!("`{}` must not be empty", field))),
        None => Err(Error::invalid(format!("`{}` is required", field))),
    }
}

/// Treat an absent or empty path field as "not set"
pub fn optional_path(value: Option<String>) -> Option<PathBuf> {
    value.filter(|v| !v.is_empty()).map(PathBuf::from)
}
