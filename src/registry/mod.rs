//! Option Registry
//!
//! The registry maps option keys to descriptors. It is the union of the
//! built-in client options and the option sets contributed by every
//! discoverable client implementation.
//!
//! # Construction Contract
//! A registry is built once, through [`RegistryBuilder::freeze`] or
//! [`OptionRegistry::discover`], and is read-only afterwards. It is a plain
//! value: share it by reference or behind an `Arc`, or keep a process-wide
//! instance in a `std::sync::OnceLock` owned by the caller.
//!
//! # Failure Handling
//! Discovery never fails the caller. If the discovery collaborator returns an
//! error or panics, the registry degrades to the built-in options only.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::error::Result;
use crate::option::{client, defaults, OptionMap, OptionRef};

/// A client implementation known to the discovery mechanism
pub trait ClientImplementation: Send + Sync {
    /// Implementation name, used in diagnostics
    fn name(&self) -> &str;

    /// Option set declared by this implementation
    ///
    /// `None` when the implementation only understands the built-in options.
    fn option_set(&self) -> Option<&'static [OptionRef]>;
}

/// Enumerates the available client implementations
pub trait ClientDiscovery {
    fn load_clients(&self) -> Result<Vec<Arc<dyn ClientImplementation>>>;
}

/// Discovery over a fixed list of implementations
#[derive(Default, Clone)]
pub struct StaticDiscovery {
    clients: Vec<Arc<dyn ClientImplementation>>,
}

impl StaticDiscovery {
    #[must_use]
    pub fn new(clients: Vec<Arc<dyn ClientImplementation>>) -> Self {
        Self { clients }
    }
}

impl ClientDiscovery for StaticDiscovery {
    fn load_clients(&self) -> Result<Vec<Arc<dyn ClientImplementation>>> {
        Ok(self.clients.clone())
    }
}

/// Accumulates contributed descriptors before freezing them into a registry
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    contributed: HashMap<&'static str, OptionRef>,
}

impl RegistryBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one descriptor; a later registration of the same key wins
    pub fn register(&mut self, option: OptionRef) -> &mut Self {
        if let Some(previous) = self.contributed.insert(option.key(), option) {
            if previous.scope() != option.scope() {
                debug!(
                    key = option.key(),
                    replaced = previous.scope(),
                    by = option.scope(),
                    "contributed option replaced"
                );
            }
        }
        self
    }

    /// Register every descriptor of an option set
    pub fn register_set(&mut self, options: &'static [OptionRef]) -> &mut Self {
        for option in options.iter().copied() {
            self.register(option);
        }
        self
    }

    /// Freeze into a read-only registry
    #[must_use]
    pub fn freeze(self) -> OptionRegistry {
        OptionRegistry { contributed: self.contributed }
    }
}

/// Read-only mapping from option key to descriptor
#[derive(Debug, Clone, Default)]
pub struct OptionRegistry {
    contributed: HashMap<&'static str, OptionRef>,
}

impl OptionRegistry {
    /// Registry holding the built-in options only
    #[must_use]
    pub fn builtin() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Build a registry from every implementation the collaborator reports
    ///
    /// Implementations without a custom option set, or whose set is the
    /// built-in one, are skipped.
    pub fn discover(discovery: &dyn ClientDiscovery) -> Self {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| -> Result<RegistryBuilder> {
            let mut builder = RegistryBuilder::new();
            for c in discovery.load_clients()? {
                let Some(set) = c.option_set() else {
                    continue;
                };
                if set.is_empty() || std::ptr::eq(set, client::ALL) {
                    continue;
                }
                trace!(client = c.name(), options = set.len(), "registering contributed options");
                builder.register_set(set);
            }
            Ok(builder)
        }));

        match outcome {
            Ok(Ok(builder)) => {
                let registry = builder.freeze();
                debug!(contributed = registry.contributed.len(), "option registry built");
                registry
            }
            Ok(Err(e)) => {
                warn!(error = %e, "client discovery failed, using built-in options only");
                Self::builtin()
            }
            Err(_) => {
                warn!("client discovery panicked, using built-in options only");
                Self::builtin()
            }
        }
    }

    /// Look up a key among the built-in options first, then the contributed ones
    #[must_use]
    pub fn resolve(&self, key: &str) -> Option<OptionRef> {
        Self::builtin_option(key).or_else(|| self.contributed(key))
    }

    /// Look up a built-in option (client options, then `user`/`password`)
    #[must_use]
    pub fn builtin_option(key: &str) -> Option<OptionRef> {
        client::from_key(key)
            .or_else(|| defaults::PROPERTY_KEYS.iter().copied().find(|o| o.key() == key))
    }

    /// Look up a contributed option
    #[must_use]
    pub fn contributed(&self, key: &str) -> Option<OptionRef> {
        self.contributed.get(key).copied()
    }

    /// Every contributed option, sorted by key
    #[must_use]
    pub fn contributed_options(&self) -> Vec<OptionRef> {
        let mut options: Vec<_> = self.contributed.values().copied().collect();
        options.sort_by_key(|o| o.key());
        options
    }

    /// Convert string-keyed properties into a typed option map
    ///
    /// Unknown keys are ignored; each known key's value is parsed per the
    /// descriptor's declared type.
    pub fn to_client_options<I, K, V>(&self, props: I) -> Result<OptionMap>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut options = OptionMap::new();
        for (key, value) in props {
            let key = key.as_ref();
            match self.resolve(key) {
                Some(option) => {
                    options.insert_text(option, value.as_ref())?;
                }
                None => trace!(key, "ignoring unknown property"),
            }
        }
        Ok(options)
    }

    /// Convert a JSON object of properties into a typed option map
    ///
    /// `null` values are ignored; strings are used as-is and any other value
    /// contributes its JSON text.
    pub fn from_json_properties(&self, props: &serde_json::Map<String, serde_json::Value>) -> Result<OptionMap> {
        let pairs = props.iter().filter_map(|(k, v)| match v {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some((k.as_str(), s.clone())),
            other => Some((k.as_str(), other.to_string())),
        });
        self.to_client_options(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::option::{DefaultValue, OptionDescriptor, OptionValue};

    static GRPC_MAX_MESSAGE: OptionDescriptor =
        OptionDescriptor::new("grpc", "max_inbound_message_size", DefaultValue::Int(4 * 1024 * 1024), "");
    static GRPC_USE_FULL_STREAM: OptionDescriptor =
        OptionDescriptor::new("grpc", "use_full_stream_decompression", DefaultValue::Bool(false), "");
    static HTTP_MAX_MESSAGE: OptionDescriptor =
        OptionDescriptor::new("http", "max_inbound_message_size", DefaultValue::Int(1024), "");
    static HTTP_SHADOWED_ASYNC: OptionDescriptor =
        OptionDescriptor::new("http", "async", DefaultValue::Bool(false), "");

    static GRPC_OPTIONS: &[OptionRef] = &[&GRPC_MAX_MESSAGE, &GRPC_USE_FULL_STREAM];
    static HTTP_OPTIONS: &[OptionRef] = &[&HTTP_MAX_MESSAGE, &HTTP_SHADOWED_ASYNC];

    struct FakeClient {
        name: &'static str,
        options: Option<&'static [OptionRef]>,
    }

    impl ClientImplementation for FakeClient {
        fn name(&self) -> &str {
            self.name
        }

        fn option_set(&self) -> Option<&'static [OptionRef]> {
            self.options
        }
    }

    fn client(name: &'static str, options: Option<&'static [OptionRef]>) -> Arc<dyn ClientImplementation> {
        Arc::new(FakeClient { name, options })
    }

    struct FailingDiscovery;

    impl ClientDiscovery for FailingDiscovery {
        fn load_clients(&self) -> Result<Vec<Arc<dyn ClientImplementation>>> {
            Err(ClientError::discovery("service loader unavailable"))
        }
    }

    struct PanickingDiscovery;

    impl ClientDiscovery for PanickingDiscovery {
        fn load_clients(&self) -> Result<Vec<Arc<dyn ClientImplementation>>> {
            panic!("broken plugin")
        }
    }

    #[test]
    fn test_builtin_only() {
        let registry = OptionRegistry::builtin();
        assert_eq!(registry.resolve("compress"), Some(&client::COMPRESS as OptionRef));
        assert_eq!(registry.resolve("user"), Some(&defaults::USER as OptionRef));
        assert!(registry.resolve("max_inbound_message_size").is_none());
        assert!(registry.contributed_options().is_empty());
    }

    #[test]
    fn test_discovery_registers_contributed_sets() {
        let discovery = StaticDiscovery::new(vec![
            client("grpc", Some(GRPC_OPTIONS)),
            client("tcp", None),
            client("plain", Some(client::ALL)),
        ]);
        let registry = OptionRegistry::discover(&discovery);
        assert_eq!(registry.contributed_options().len(), 2);
        assert_eq!(registry.resolve("use_full_stream_decompression"), Some(&GRPC_USE_FULL_STREAM as OptionRef));
    }

    #[test]
    fn test_later_contributor_wins() {
        let discovery =
            StaticDiscovery::new(vec![client("grpc", Some(GRPC_OPTIONS)), client("http", Some(HTTP_OPTIONS))]);
        let registry = OptionRegistry::discover(&discovery);
        let option = registry.resolve("max_inbound_message_size").unwrap();
        assert_eq!(option.scope(), "http");
    }

    #[test]
    fn test_builtin_takes_precedence_on_lookup() {
        let registry = OptionRegistry::discover(&StaticDiscovery::new(vec![client("http", Some(HTTP_OPTIONS))]));
        assert_eq!(registry.resolve("async").unwrap().scope(), client::SCOPE);
        assert_eq!(registry.contributed("async").unwrap().scope(), "http");
    }

    #[test]
    fn test_failing_discovery_degrades_to_builtin() {
        let registry = OptionRegistry::discover(&FailingDiscovery);
        assert!(registry.contributed_options().is_empty());
        assert!(registry.resolve("socket_timeout").is_some());
    }

    #[test]
    fn test_panicking_discovery_degrades_to_builtin() {
        let registry = OptionRegistry::discover(&PanickingDiscovery);
        assert!(registry.contributed_options().is_empty());
        assert!(registry.resolve("socket_timeout").is_some());
    }

    #[test]
    fn test_builder_freeze() {
        let mut builder = OptionRegistry::builder();
        builder.register(&GRPC_MAX_MESSAGE).register(&HTTP_MAX_MESSAGE);
        let registry = builder.freeze();
        assert_eq!(registry.contributed("max_inbound_message_size").unwrap().scope(), "http");
    }

    #[test]
    fn test_to_client_options() {
        let registry = OptionRegistry::discover(&StaticDiscovery::new(vec![client("grpc", Some(GRPC_OPTIONS))]));
        let options = registry
            .to_client_options([
                ("compress_algorithm", "zstd"),
                ("max_inbound_message_size", "1048576"),
                ("user", "reader"),
                ("not_an_option", "whatever"),
            ])
            .unwrap();
        assert_eq!(options.len(), 3);
        assert_eq!(
            options.get(&client::COMPRESS_ALGORITHM),
            Some(&OptionValue::Compression(crate::option::Compression::Zstd))
        );
        assert_eq!(options.get(&GRPC_MAX_MESSAGE), Some(&OptionValue::Int(1_048_576)));
        assert_eq!(options.get(&defaults::USER), Some(&OptionValue::Str("reader".into())));
    }

    #[test]
    fn test_to_client_options_parse_error() {
        let err = OptionRegistry::builtin().to_client_options([("socket_timeout", "soon")]).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_OPTION_VALUE");
        assert!(err.message().contains("socket_timeout"));
    }

    #[test]
    fn test_from_json_properties_skips_null() {
        let props = serde_json::json!({
            "ssl": true,
            "retry": 3,
            "database": null,
            "client_name": "reporting",
        });
        let options = OptionRegistry::builtin().from_json_properties(props.as_object().unwrap()).unwrap();
        assert_eq!(options.len(), 3);
        assert_eq!(options.get(&client::SSL), Some(&OptionValue::Bool(true)));
        assert_eq!(options.get(&client::RETRY), Some(&OptionValue::Int(3)));
        assert!(!options.contains(&client::DATABASE));
    }
}
