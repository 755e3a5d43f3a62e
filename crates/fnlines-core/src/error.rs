//! Error types for fnlines-core.
//!
//! The source transforms themselves never fail: malformed C degrades to
//! "leave the lines alone". Errors only come from configuration and from the
//! checks a host applies before handing a file to the core.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur when working with configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] Box<figment::Error>),

    /// Configuration file not found after searching all locations.
    #[error("no configuration file found")]
    NotFound,
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Input rejected before any processing.
#[derive(Error, Debug)]
pub enum HostError {
    /// The file name does not end in a recognized source extension.
    #[error("{path} is not a C source file (expected one of: {expected})")]
    UnsupportedExtension {
        /// The offending path.
        path: Utf8PathBuf,
        /// Accepted extensions, comma separated.
        expected: String,
    },

    /// The input is larger than the configured limit.
    #[error("input too large: {source_name} is {size} bytes (limit: {limit} bytes)")]
    InputTooLarge {
        /// File path or other label for the input.
        source_name: String,
        /// Actual size in bytes.
        size: usize,
        /// Configured limit in bytes.
        limit: usize,
    },
}

/// Check `size` against an optional byte limit.
pub fn check_input_size(source_name: &str, size: usize, limit: Option<usize>) -> Result<(), HostError> {
    match limit {
        Some(limit) if size > limit => Err(HostError::InputTooLarge {
            source_name: source_name.to_string(),
            size,
            limit,
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_within_limit_is_accepted() {
        assert!(check_input_size("a.c", 10, Some(10)).is_ok());
        assert!(check_input_size("a.c", usize::MAX, None).is_ok());
    }

    #[test]
    fn oversized_input_reports_both_sizes() {
        let err = check_input_size("big.c", 11, Some(10)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "input too large: big.c is 11 bytes (limit: 10 bytes)"
        );
    }
}
