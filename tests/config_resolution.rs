//! Configuration Resolution Tests
//!
//! End-to-end checks of layered resolution through the public API:
//! - last-wins option overlay vs first-wins singletons
//! - property input through a registry extended by client implementations
//! - derived fields computed from merged layers
//! - identity and idempotence of merged configurations

use std::sync::Arc;

use clickhouse_core::option::{client, defaults, DefaultValue};
use clickhouse_core::registry::RegistryBuilder;
use clickhouse_core::{
    ClientError, ClientImplementation, Compression, Configuration, Credentials, MetricRegistry, NodeSelector,
    OptionDescriptor, OptionRef, OptionRegistry, OptionValue, Protocol, StaticDiscovery,
};
use insta::assert_snapshot;
use pretty_assertions::assert_eq;

// ============================================================================
// Test Helpers
// ============================================================================

static HTTP_KEEP_ALIVE: OptionDescriptor =
    OptionDescriptor::new("http", "http_keep_alive", DefaultValue::Bool(true), "Reuse HTTP connections.");
static HTTP_CONNECTION_PROVIDER: OptionDescriptor =
    OptionDescriptor::new("http", "http_connection_provider", DefaultValue::Str("HTTP_URL_CONNECTION"), "");
static HTTP_OPTIONS: &[OptionRef] = &[&HTTP_KEEP_ALIVE, &HTTP_CONNECTION_PROVIDER];

struct HttpClient;

impl ClientImplementation for HttpClient {
    fn name(&self) -> &str {
        "http"
    }

    fn option_set(&self) -> Option<&'static [OptionRef]> {
        Some(HTTP_OPTIONS)
    }
}

struct BareClient;

impl ClientImplementation for BareClient {
    fn name(&self) -> &str {
        "bare"
    }

    fn option_set(&self) -> Option<&'static [OptionRef]> {
        None
    }
}

fn registry() -> OptionRegistry {
    OptionRegistry::discover(&StaticDiscovery::new(vec![Arc::new(BareClient), Arc::new(HttpClient)]))
}

fn layer(options: &[(OptionRef, OptionValue)]) -> Configuration {
    options
        .iter()
        .try_fold(Configuration::builder(), |b, (o, v)| b.option(*o, v.clone()))
        .unwrap()
        .build()
}

// ============================================================================
// Merge Policies
// ============================================================================

#[test]
fn test_global_node_request_layers() {
    let global = Configuration::builder()
        .option(&client::DATABASE, "metrics")
        .unwrap()
        .option(&client::SOCKET_TIMEOUT, 60_000)
        .unwrap()
        .credentials(Credentials::from_user_and_password("global", "g"))
        .build();
    let node = Configuration::builder()
        .option(&client::DATABASE, "metrics_replica")
        .unwrap()
        .credentials(Credentials::from_user_and_password("node", "n"))
        .node_selector(NodeSelector::of([Protocol::Http], ["replica"]))
        .build();
    let request = layer(&[(&client::MAX_EXECUTION_TIME, OptionValue::Int(30))]);

    let config = Configuration::merge([&global, &node, &request]);
    assert_eq!(config.database(), "metrics_replica");
    assert_eq!(config.socket_timeout(), 60_000);
    assert_eq!(config.max_execution_time(), 30);
    assert_eq!(config.credentials().user(), "global");
    assert_eq!(config.preferred_protocols(), &[Protocol::Http]);
}

#[test]
fn test_merge_of_nothing_is_default() {
    let merged = Configuration::merge(std::iter::empty());
    assert_eq!(merged, Configuration::default());
}

#[test]
fn test_merge_is_idempotent() {
    let registry = MetricRegistry::new(vec![0u64; 4]);
    let a = Configuration::builder()
        .option(&client::COMPRESS_ALGORITHM, Compression::Gzip)
        .unwrap()
        .metric_registry(registry)
        .build();
    let b = layer(&[(&client::RETRY, OptionValue::Int(2)), (&defaults::USER, OptionValue::from("svc"))]);

    let once = Configuration::merge([&a, &b]);
    let twice = Configuration::merge([&once]);
    assert_eq!(twice, once);
    assert_eq!(twice.credentials().user(), "svc");
    assert!(twice.metric_registry().is_some());
}

#[test]
fn test_explicit_credentials_beat_synthesized_ones() {
    let synthesized = layer(&[(&defaults::USER, OptionValue::from("from_options"))]);
    let explicit = Configuration::builder().credentials(Credentials::from_user_and_password("explicit", "")).build();
    let config = Configuration::merge([&synthesized, &explicit]);
    assert_eq!(config.credentials().user(), "explicit");
}

// ============================================================================
// Registry and Properties
// ============================================================================

#[test]
fn test_properties_with_contributed_options() {
    let registry = registry();
    assert_eq!(registry.contributed_options().len(), 2);

    let config = Configuration::from_properties(
        &registry,
        [
            ("http_keep_alive", "false"),
            ("compress", "1"),
            ("custom_settings", "max_threads=2"),
            ("unknown_key", "ignored"),
        ],
    )
    .unwrap();

    assert_eq!(config.option(&HTTP_KEEP_ALIVE), OptionValue::Bool(false));
    assert_eq!(config.option(&HTTP_CONNECTION_PROVIDER), OptionValue::from("HTTP_URL_CONNECTION"));
    assert!(config.is_response_compressed());
    assert_eq!(config.custom_settings().get("max_threads").map(String::as_str), Some("2"));
    assert_eq!(config.all_options().len(), 3);
}

#[test]
fn test_json_properties() {
    let props = serde_json::json!({
        "socket_timeout": 1000,
        "ssl": true,
        "sslmode": "none",
        "database": null,
    });
    let options = OptionRegistry::builtin().from_json_properties(props.as_object().unwrap()).unwrap();
    let config = Configuration::builder().options(&options).build();
    assert_eq!(config.socket_timeout(), 1000);
    assert!(config.is_ssl());
    assert_eq!(config.ssl_mode(), clickhouse_core::SslMode::None);
    assert!(!config.has_option(&client::DATABASE));
}

#[test]
fn test_registry_builder_freeze() {
    let mut builder = RegistryBuilder::new();
    builder.register_set(HTTP_OPTIONS);
    let registry = builder.freeze();
    assert_eq!(registry.resolve("http_keep_alive"), Some(&HTTP_KEEP_ALIVE as OptionRef));
    assert_eq!(registry.resolve("compress"), Some(&client::COMPRESS as OptionRef));
    assert_eq!(registry.resolve("user"), Some(&defaults::USER as OptionRef));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_type_mismatch_message() {
    let err = Configuration::default().bool_option(&client::SOCKET_TIMEOUT).unwrap_err();
    assert_eq!(err.error_code(), "TYPE_MISMATCH");
    assert_snapshot!(err.to_string(), @"Cannot convert value of option 'socket_timeout' from type Integer to Boolean");
}

#[test]
fn test_builder_rejects_wrong_type() {
    let err = Configuration::builder().option(&client::SSL, "yes").unwrap_err();
    assert!(matches!(err, ClientError::TypeMismatch { .. }));
}
