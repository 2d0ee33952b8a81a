//! Error Handling Infrastructure
//!
//! This module defines all error types used throughout the crate.
//! Every error is raised synchronously, carries the offending value or type
//! for diagnostics, and maps to a stable error code.
//!
//! # Error Categories
//! - `TypeMismatch`: typed accessor disagrees with the option's declared type
//! - `InvalidOptionValue`: textual option value cannot be parsed
//! - `UnsupportedConversion`: source kind cannot represent the target kind
//! - `InvalidPoint`: a point was built from anything but exactly two values
//! - `NumberFormat`: a coordinate is neither numeric nor numeric text
//! - `InvalidInput`: malformed text or a projection into an unfitting type
//! - `Discovery`: a client discovery collaborator failed (always swallowed)

use thiserror::Error;

use crate::option::ValueType;

/// Main error type for configuration and value operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    /// Typed access with a type other than the option's declared type
    #[error("Cannot convert value of option '{option}' from type {declared} to {requested}")]
    TypeMismatch { option: String, declared: ValueType, requested: ValueType },

    /// Option value whose text does not parse as the declared type
    #[error("Invalid value '{value}' for option '{key}': {reason}")]
    InvalidOptionValue { key: String, value: String, reason: String },

    /// Conversion between value kinds that cannot represent each other
    #[error("Converting {from} to {to} is not supported")]
    UnsupportedConversion { from: String, to: String },

    /// Point built from the wrong number of coordinates
    #[error("A point should have two and only two double values, but we got: {0}")]
    InvalidPoint(String),

    /// Coordinate that is not numeric text
    #[error("Not a number: {0}")]
    NumberFormat(String),

    /// Malformed input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Client discovery failure
    #[error("Client discovery failed: {0}")]
    Discovery(String),
}

impl ClientError {
    /// Convert error to a stable error code string
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::TypeMismatch { .. } => "TYPE_MISMATCH",
            Self::InvalidOptionValue { .. } => "INVALID_OPTION_VALUE",
            Self::UnsupportedConversion { .. } => "UNSUPPORTED_CONVERSION",
            Self::InvalidPoint(_) => "INVALID_POINT",
            Self::NumberFormat(_) => "NUMBER_FORMAT",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::Discovery(_) => "DISCOVERY_FAILED",
        }
    }

    /// Get human-readable error message
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Create a type mismatch error
    pub fn type_mismatch(option: impl Into<String>, declared: ValueType, requested: ValueType) -> Self {
        Self::TypeMismatch { option: option.into(), declared, requested }
    }

    /// Create an invalid option value error
    pub fn invalid_option_value(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidOptionValue { key: key.into(), value: value.into(), reason: reason.into() }
    }

    /// Create an unsupported conversion error
    pub fn unsupported_conversion(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::UnsupportedConversion { from: from.into(), to: to.into() }
    }

    /// Create an invalid point error reporting the offending input
    pub fn invalid_point(input: impl Into<String>) -> Self {
        Self::InvalidPoint(input.into())
    }

    /// Create a number format error
    pub fn number_format(text: impl Into<String>) -> Self {
        Self::NumberFormat(text.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a discovery error
    pub fn discovery(message: impl Into<String>) -> Self {
        Self::Discovery(message.into())
    }
}

/// Result type alias for crate operations
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ClientError::type_mismatch("async", ValueType::Bool, ValueType::Int).error_code(),
            "TYPE_MISMATCH"
        );
        assert_eq!(
            ClientError::invalid_option_value("retry", "x", "not an int").error_code(),
            "INVALID_OPTION_VALUE"
        );
        assert_eq!(
            ClientError::unsupported_conversion("Int", "MultiPolygon").error_code(),
            "UNSUPPORTED_CONVERSION"
        );
        assert_eq!(ClientError::invalid_point("[1]").error_code(), "INVALID_POINT");
        assert_eq!(ClientError::number_format("abc").error_code(), "NUMBER_FORMAT");
        assert_eq!(ClientError::invalid_input("test").error_code(), "INVALID_INPUT");
        assert_eq!(ClientError::discovery("test").error_code(), "DISCOVERY_FAILED");
    }

    #[test]
    fn test_error_messages() {
        let err = ClientError::type_mismatch("async", ValueType::Bool, ValueType::Str);
        assert!(err.message().contains("async"));
        assert!(err.message().contains("Boolean"));
        assert!(err.message().contains("String"));

        let err = ClientError::unsupported_conversion("Boolean", "MultiPolygon");
        assert_eq!(err.message(), "Converting Boolean to MultiPolygon is not supported");

        let err = ClientError::invalid_point("[1.0, 2.0, 3.0]");
        assert!(err.message().ends_with("[1.0, 2.0, 3.0]"));
    }

    #[test]
    fn test_error_constructors() {
        assert!(matches!(
            ClientError::type_mismatch("x", ValueType::Int, ValueType::Long),
            ClientError::TypeMismatch { .. }
        ));
        assert!(matches!(
            ClientError::invalid_option_value("k", "v", "r"),
            ClientError::InvalidOptionValue { .. }
        ));
        assert!(matches!(
            ClientError::unsupported_conversion("a", "b"),
            ClientError::UnsupportedConversion { .. }
        ));
        assert!(matches!(ClientError::invalid_point("p"), ClientError::InvalidPoint(_)));
        assert!(matches!(ClientError::number_format("n"), ClientError::NumberFormat(_)));
        assert!(matches!(ClientError::invalid_input("i"), ClientError::InvalidInput(_)));
        assert!(matches!(ClientError::discovery("d"), ClientError::Discovery(_)));
    }
}
