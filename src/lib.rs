//! ClickHouse Client Core - Configuration Resolution and Typed Values
//!
//! The session-independent core of a ClickHouse client: how a client's
//! configuration is assembled from layers, and how decoded values are held
//! and converted. No I/O happens here; the wire layer consumes what this
//! crate produces.
//!
//! # Core Principles
//! - Options are strongly typed; a value never disagrees with its descriptor
//! - Configurations are immutable once built and safe to share across threads
//! - Every derived setting is computed once, when the configuration is built
//! - Value updates replace the payload completely or fail without touching it
//!
//! # Module Organization
//! - [`error`] - Error types and handling
//! - [`option`] - Option descriptors, values and the built-in option tables
//! - [`registry`] - Key-to-descriptor lookup, extended by client implementations
//! - [`config`] - Layered configuration resolution and derived settings
//! - [`value`] - Typed value contract and the multi-polygon value
//!
//! # Logging
//! Events are emitted with `tracing`; installing a subscriber is left to the
//! application.

pub mod config;
pub mod error;
pub mod option;
pub mod registry;
pub mod value;

// Re-export commonly used types for convenience
pub use config::node::{Credentials, MetricRegistry, NodeSelector, Protocol};
pub use config::timezone::TimeZone;
pub use config::version::ServerVersion;
pub use config::{Configuration, ConfigurationBuilder};
pub use error::{ClientError, Result};
pub use option::{
    BufferingMode, Compression, DataFormat, OptionDescriptor, OptionMap, OptionRef, OptionValue, SslMode,
    ValueType,
};
pub use registry::{ClientDiscovery, ClientImplementation, OptionRegistry, StaticDiscovery};
pub use value::{DataValue, Datum, MultiPolygon, MultiPolygonValue, UpdateSource, ValueKind};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api_exports() {
        let config = Configuration::default();
        assert_eq!(config.format(), DataFormat::TabSeparated);
        assert!(OptionRegistry::builtin().resolve("compress").is_some());
        assert!(MultiPolygonValue::of_empty().is_null_or_empty());
    }
}
