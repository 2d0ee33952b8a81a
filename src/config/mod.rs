//! Configuration Resolution
//!
//! A [`Configuration`] is an immutable snapshot of client options plus three
//! singleton fields (credentials, node selector, metric registry). It is built
//! once per session, usually by merging several layers, and then shared
//! freely between threads.
//!
//! # Resolution Precedence
//! 1. Options: the last layer defining a key wins
//! 2. Singletons: the first layer carrying an explicit value wins
//! 3. Unset options: the effective default of the option (or of the fallback
//!    passed to [`Configuration::option_or`])
//!
//! # Derived Fields
//! Every scalar a session reads (buffer sizes, compression, time zones,
//! timeouts, ...) is computed once when the configuration is built. Identity
//! ([`PartialEq`]/[`Hash`]) only covers the options and the singletons, since
//! derived fields are pure functions of those.

pub mod cascade;
pub mod node;
pub mod resolver;
pub mod timezone;
pub mod version;

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use crate::error::{ClientError, Result};
use crate::option::{
    client, defaults, to_key_value_pairs, BufferingMode, Compression, DataFormat, OptionMap, OptionRef,
    OptionType, OptionValue, SslMode,
};
use crate::registry::OptionRegistry;

use cascade::{BufferSizes, CompressionSetting};
use node::{Credentials, MetricRegistry, NodeSelector, Protocol};
use timezone::TimeZone;
use version::ServerVersion;

/// Immutable, fully-resolved client configuration
#[derive(Debug, Clone)]
pub struct Configuration {
    options: OptionMap,
    explicit_credentials: Option<Credentials>,
    explicit_node_selector: Option<NodeSelector>,
    metric_registry: Option<MetricRegistry>,

    credentials: Credentials,
    node_selector: NodeSelector,

    async_mode: bool,
    auto_discovery: bool,
    custom_settings: BTreeMap<String, String>,
    client_name: String,
    request_compression: CompressionSetting,
    response_compression: CompressionSetting,
    connection_timeout: i32,
    database: String,
    format: DataFormat,
    buffers: BufferSizes,
    buffer_queue_variation: i32,
    request_buffering: BufferingMode,
    response_buffering: BufferingMode,
    max_execution_time: i32,
    max_queued_buffers: i32,
    max_queued_requests: i32,
    max_result_rows: i64,
    max_threads: i32,
    node_check_interval: i32,
    failover: i32,
    retry: i32,
    repeat_on_session_lock: bool,
    reuse_value_wrapper: bool,
    server_info: bool,
    server_time_zone: TimeZone,
    server_version: ServerVersion,
    session_timeout: i32,
    session_check: bool,
    socket_timeout: i32,
    ssl: bool,
    ssl_mode: SslMode,
    ssl_root_cert: String,
    ssl_cert: String,
    ssl_key: String,
    transaction_timeout: i32,
    use_blocking_queue: bool,
    use_objects_in_arrays: bool,
    use_no_proxy: bool,
    use_server_time_zone: bool,
    use_server_time_zone_for_dates: bool,
    use_time_zone: TimeZone,
    time_zone_for_date: Option<TimeZone>,
}

/// Read an option whose type is guaranteed by the option map invariant
fn read<T: OptionType + Default>(options: &OptionMap, option: OptionRef) -> T {
    let value = options.get(option).cloned().unwrap_or_else(|| option.effective_default());
    T::from_option_value(&value).unwrap_or_default()
}

fn read_or<T: OptionType + Default>(options: &OptionMap, option: OptionRef, fallback: OptionRef) -> T {
    let value = options.get(option).cloned().unwrap_or_else(|| fallback.effective_default());
    T::from_option_value(&value).unwrap_or_default()
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

impl Configuration {
    /// Build a configuration from explicit parts and derive every field
    #[must_use]
    pub fn new(
        options: OptionMap,
        credentials: Option<Credentials>,
        node_selector: Option<NodeSelector>,
        metric_registry: Option<MetricRegistry>,
    ) -> Self {
        let o = &options;

        // Request compression reads the `decompress*` options and response
        // compression the `compress*` ones. This cross-wiring is how clients
        // have always interpreted these keys, so it is kept as-is.
        let request_compression = CompressionSetting::new(
            read(o, &client::DECOMPRESS),
            read(o, &client::DECOMPRESS_ALGORITHM),
            read(o, &client::DECOMPRESS_LEVEL),
        );
        let response_compression = CompressionSetting::new(
            read(o, &client::COMPRESS),
            read(o, &client::COMPRESS_ALGORITHM),
            read(o, &client::COMPRESS_LEVEL),
        );

        let buffers = BufferSizes::resolve(
            read(o, &client::MAX_BUFFER_SIZE),
            read(o, &client::BUFFER_SIZE),
            read(o, &client::READ_BUFFER_SIZE),
            read(o, &client::WRITE_BUFFER_SIZE),
            read(o, &client::REQUEST_CHUNK_SIZE),
        );

        let server_info = !is_blank(&read::<String>(o, &client::SERVER_TIME_ZONE))
            && !is_blank(&read::<String>(o, &client::SERVER_VERSION));
        let server_time_zone =
            TimeZone::parse(&read_or::<String>(o, &client::SERVER_TIME_ZONE, &defaults::SERVER_TIME_ZONE))
                .unwrap_or_else(TimeZone::utc);
        let server_version =
            ServerVersion::parse(&read_or::<String>(o, &client::SERVER_VERSION, &defaults::SERVER_VERSION));

        let session_timeout = read(o, &client::SESSION_TIMEOUT);
        let use_server_time_zone = read(o, &client::USE_SERVER_TIME_ZONE);
        let use_server_time_zone_for_dates = read(o, &client::USE_SERVER_TIME_ZONE_FOR_DATES);
        let use_time_zone = cascade::working_time_zone(
            use_server_time_zone,
            &server_time_zone,
            &read::<String>(o, &client::USE_TIME_ZONE),
        );
        let time_zone_for_date = cascade::date_time_zone(use_server_time_zone_for_dates, &use_time_zone);

        let effective_credentials = credentials.clone().unwrap_or_else(|| {
            Credentials::from_user_and_password(
                read::<String>(o, &defaults::USER),
                read::<String>(o, &defaults::PASSWORD),
            )
        });

        Self {
            async_mode: read_or(o, &client::ASYNC, &defaults::ASYNC),
            auto_discovery: read(o, &client::AUTO_DISCOVERY),
            custom_settings: to_key_value_pairs(&read::<String>(o, &client::CUSTOM_SETTINGS)),
            client_name: read(o, &client::CLIENT_NAME),
            request_compression,
            response_compression,
            connection_timeout: read(o, &client::CONNECTION_TIMEOUT),
            database: read_or(o, &client::DATABASE, &defaults::DATABASE),
            format: read_or(o, &client::FORMAT, &defaults::FORMAT),
            buffers,
            buffer_queue_variation: read(o, &client::BUFFER_QUEUE_VARIATION),
            request_buffering: read_or(o, &client::REQUEST_BUFFERING, &defaults::BUFFERING),
            response_buffering: read_or(o, &client::RESPONSE_BUFFERING, &defaults::BUFFERING),
            max_execution_time: read(o, &client::MAX_EXECUTION_TIME),
            max_queued_buffers: read(o, &client::MAX_QUEUED_BUFFERS),
            max_queued_requests: read(o, &client::MAX_QUEUED_REQUESTS),
            max_result_rows: read(o, &client::MAX_RESULT_ROWS),
            max_threads: read(o, &client::MAX_THREADS_PER_CLIENT),
            node_check_interval: read(o, &client::NODE_CHECK_INTERVAL),
            failover: read(o, &client::FAILOVER),
            retry: read(o, &client::RETRY),
            repeat_on_session_lock: read(o, &client::REPEAT_ON_SESSION_LOCK),
            reuse_value_wrapper: read(o, &client::REUSE_VALUE_WRAPPER),
            server_info,
            server_time_zone,
            server_version,
            session_timeout,
            session_check: read(o, &client::SESSION_CHECK),
            socket_timeout: read(o, &client::SOCKET_TIMEOUT),
            ssl: read(o, &client::SSL),
            ssl_mode: read(o, &client::SSL_MODE),
            ssl_root_cert: read(o, &client::SSL_ROOT_CERTIFICATE),
            ssl_cert: read(o, &client::SSL_CERTIFICATE),
            ssl_key: read(o, &client::SSL_KEY),
            transaction_timeout: cascade::transaction_timeout(read(o, &client::TRANSACTION_TIMEOUT), session_timeout),
            use_blocking_queue: read(o, &client::USE_BLOCKING_QUEUE),
            use_objects_in_arrays: read(o, &client::USE_OBJECTS_IN_ARRAYS),
            use_no_proxy: read(o, &client::USE_NO_PROXY),
            use_server_time_zone,
            use_server_time_zone_for_dates,
            use_time_zone,
            time_zone_for_date,

            credentials: effective_credentials,
            node_selector: node_selector.clone().unwrap_or(NodeSelector::EMPTY),
            explicit_credentials: credentials,
            explicit_node_selector: node_selector,
            metric_registry,
            options,
        }
    }

    #[must_use]
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::default()
    }

    /// Merge layered configurations into one
    ///
    /// Options are overlaid in order (last wins); credentials, node selector
    /// and metric registry come from the first layer that sets them.
    #[must_use]
    pub fn merge<'a, I>(sources: I) -> Self
    where
        I: IntoIterator<Item = &'a Self>,
    {
        let sources: Vec<&Self> = sources.into_iter().collect();
        Self::new(
            resolver::merge_options(&sources),
            resolver::merge_credentials(&sources),
            resolver::merge_node_selector(&sources),
            resolver::merge_metric_registry(&sources),
        )
    }

    /// Build a configuration from string properties
    ///
    /// Keys are looked up in `registry`; unknown keys are ignored.
    pub fn from_properties<I, K, V>(registry: &OptionRegistry, props: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Ok(Self::new(registry.to_client_options(props)?, None, None, None))
    }

    /// Textual form of every explicitly set option, keyed by option key
    #[must_use]
    pub fn to_properties(&self) -> BTreeMap<String, String> {
        self.options.iter().map(|(option, value)| (option.key().to_string(), value.to_string())).collect()
    }

    // Option access

    /// Whether the option was set explicitly
    #[must_use]
    pub fn has_option(&self, option: OptionRef) -> bool {
        self.options.contains(option)
    }

    /// Every explicitly set option
    #[must_use]
    pub const fn all_options(&self) -> &OptionMap {
        &self.options
    }

    /// Option value, or the option's effective default when unset
    #[must_use]
    pub fn option(&self, option: OptionRef) -> OptionValue {
        self.options.get(option).cloned().unwrap_or_else(|| option.effective_default())
    }

    /// Option value, or the effective default of `fallback` when unset
    #[must_use]
    pub fn option_or(&self, option: OptionRef, fallback: OptionRef) -> OptionValue {
        self.options.get(option).cloned().unwrap_or_else(|| fallback.effective_default())
    }

    /// Option value, or the value `fallback` resolves for it when unset
    #[must_use]
    pub fn option_or_config(&self, option: OptionRef, fallback: &Self) -> OptionValue {
        self.options.get(option).cloned().unwrap_or_else(|| fallback.option(option))
    }

    /// Typed option value
    ///
    /// # Errors
    /// `TypeMismatch` when `T` is not the option's declared type.
    pub fn option_as<T: OptionType>(&self, option: OptionRef) -> Result<T> {
        let mismatch = || ClientError::type_mismatch(option.key(), option.value_type(), T::VALUE_TYPE);
        if T::VALUE_TYPE != option.value_type() {
            return Err(mismatch());
        }
        T::from_option_value(&self.option(option)).ok_or_else(mismatch)
    }

    pub fn bool_option(&self, option: OptionRef) -> Result<bool> {
        self.option_as(option)
    }

    pub fn int_option(&self, option: OptionRef) -> Result<i32> {
        self.option_as(option)
    }

    pub fn long_option(&self, option: OptionRef) -> Result<i64> {
        self.option_as(option)
    }

    pub fn str_option(&self, option: OptionRef) -> Result<String> {
        self.option_as(option)
    }

    // Singletons

    /// Credentials in effect; synthesized from `user`/`password` when none were given
    #[must_use]
    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Credentials given explicitly, if any
    #[must_use]
    pub const fn explicit_credentials(&self) -> Option<&Credentials> {
        self.explicit_credentials.as_ref()
    }

    #[must_use]
    pub const fn node_selector(&self) -> &NodeSelector {
        &self.node_selector
    }

    #[must_use]
    pub fn preferred_protocols(&self) -> &[Protocol] {
        self.node_selector.preferred_protocols()
    }

    #[must_use]
    pub const fn metric_registry(&self) -> Option<&MetricRegistry> {
        self.metric_registry.as_ref()
    }

    // Derived fields

    #[must_use]
    pub const fn is_async(&self) -> bool {
        self.async_mode
    }

    #[must_use]
    pub const fn is_auto_discovery(&self) -> bool {
        self.auto_discovery
    }

    /// Server settings parsed from `custom_settings`
    #[must_use]
    pub const fn custom_settings(&self) -> &BTreeMap<String, String> {
        &self.custom_settings
    }

    #[must_use]
    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    #[must_use]
    pub const fn request_compression(&self) -> CompressionSetting {
        self.request_compression
    }

    #[must_use]
    pub const fn response_compression(&self) -> CompressionSetting {
        self.response_compression
    }

    /// Whether the client compresses what it sends
    #[must_use]
    pub const fn is_request_compressed(&self) -> bool {
        self.request_compression.is_enabled()
    }

    #[must_use]
    pub const fn request_compress_algorithm(&self) -> Compression {
        self.request_compression.algorithm()
    }

    #[must_use]
    pub const fn request_compress_level(&self) -> i32 {
        self.request_compression.level()
    }

    /// Whether the server compresses what it returns
    #[must_use]
    pub const fn is_response_compressed(&self) -> bool {
        self.response_compression.is_enabled()
    }

    #[must_use]
    pub const fn response_compress_algorithm(&self) -> Compression {
        self.response_compression.algorithm()
    }

    #[must_use]
    pub const fn response_compress_level(&self) -> i32 {
        self.response_compression.level()
    }

    /// Connection timeout in milliseconds
    #[must_use]
    pub const fn connection_timeout(&self) -> i32 {
        self.connection_timeout
    }

    #[must_use]
    pub fn database(&self) -> &str {
        &self.database
    }

    #[must_use]
    pub const fn format(&self) -> DataFormat {
        self.format
    }

    /// Largest buffer, in bytes, used for streaming
    #[must_use]
    pub const fn max_buffer_size(&self) -> i32 {
        self.buffers.max
    }

    /// Generic buffer size shared by reads and writes
    #[must_use]
    pub const fn buffer_size(&self) -> i32 {
        self.buffers.buffer
    }

    /// How many times the buffer queue fills up before it grows; zero or
    /// negative keeps the queue length fixed
    #[must_use]
    pub const fn buffer_queue_variation(&self) -> i32 {
        self.buffer_queue_variation
    }

    #[must_use]
    pub const fn read_buffer_size(&self) -> i32 {
        self.buffers.read
    }

    #[must_use]
    pub const fn write_buffer_size(&self) -> i32 {
        self.buffers.write
    }

    #[must_use]
    pub const fn request_chunk_size(&self) -> i32 {
        self.buffers.request_chunk
    }

    #[must_use]
    pub const fn request_buffering(&self) -> BufferingMode {
        self.request_buffering
    }

    #[must_use]
    pub const fn response_buffering(&self) -> BufferingMode {
        self.response_buffering
    }

    #[must_use]
    pub const fn max_execution_time(&self) -> i32 {
        self.max_execution_time
    }

    #[must_use]
    pub const fn max_queued_buffers(&self) -> i32 {
        self.max_queued_buffers
    }

    #[must_use]
    pub const fn max_queued_requests(&self) -> i32 {
        self.max_queued_requests
    }

    #[must_use]
    pub const fn max_result_rows(&self) -> i64 {
        self.max_result_rows
    }

    #[must_use]
    pub const fn max_threads_per_client(&self) -> i32 {
        self.max_threads
    }

    #[must_use]
    pub const fn node_check_interval(&self) -> i32 {
        self.node_check_interval
    }

    #[must_use]
    pub const fn failover(&self) -> i32 {
        self.failover
    }

    #[must_use]
    pub const fn retry(&self) -> i32 {
        self.retry
    }

    #[must_use]
    pub const fn is_repeat_on_session_lock(&self) -> bool {
        self.repeat_on_session_lock
    }

    #[must_use]
    pub const fn is_reuse_value_wrapper(&self) -> bool {
        self.reuse_value_wrapper
    }

    /// Whether both server time zone and server version were supplied
    #[must_use]
    pub const fn has_server_info(&self) -> bool {
        self.server_info
    }

    #[must_use]
    pub const fn server_time_zone(&self) -> &TimeZone {
        &self.server_time_zone
    }

    #[must_use]
    pub const fn server_version(&self) -> &ServerVersion {
        &self.server_version
    }

    #[must_use]
    pub const fn session_timeout(&self) -> i32 {
        self.session_timeout
    }

    #[must_use]
    pub const fn is_session_check(&self) -> bool {
        self.session_check
    }

    #[must_use]
    pub const fn socket_timeout(&self) -> i32 {
        self.socket_timeout
    }

    #[must_use]
    pub const fn is_ssl(&self) -> bool {
        self.ssl
    }

    #[must_use]
    pub const fn ssl_mode(&self) -> SslMode {
        self.ssl_mode
    }

    #[must_use]
    pub fn ssl_root_cert(&self) -> &str {
        &self.ssl_root_cert
    }

    #[must_use]
    pub fn ssl_cert(&self) -> &str {
        &self.ssl_cert
    }

    #[must_use]
    pub fn ssl_key(&self) -> &str {
        &self.ssl_key
    }

    /// Transaction timeout, falling back to the session timeout when unset
    #[must_use]
    pub const fn transaction_timeout(&self) -> i32 {
        self.transaction_timeout
    }

    #[must_use]
    pub const fn is_use_blocking_queue(&self) -> bool {
        self.use_blocking_queue
    }

    #[must_use]
    pub const fn is_use_objects_in_arrays(&self) -> bool {
        self.use_objects_in_arrays
    }

    #[must_use]
    pub const fn is_use_no_proxy(&self) -> bool {
        self.use_no_proxy
    }

    #[must_use]
    pub const fn is_use_server_time_zone(&self) -> bool {
        self.use_server_time_zone
    }

    #[must_use]
    pub const fn is_use_server_time_zone_for_dates(&self) -> bool {
        self.use_server_time_zone_for_dates
    }

    /// Zone used for reading and writing date-time values
    #[must_use]
    pub const fn use_time_zone(&self) -> &TimeZone {
        &self.use_time_zone
    }

    /// Zone applied to date-only values; `None` keeps them zone-naive
    #[must_use]
    pub const fn time_zone_for_date(&self) -> Option<&TimeZone> {
        self.time_zone_for_date.as_ref()
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new(OptionMap::new(), None, None, None)
    }
}

/// Two configurations are equal when their option maps, effective
/// credentials, effective node selectors and metric registry handles match.
///
/// Equality looks at the *effective* credentials while merging takes the
/// first *explicit* ones. A layer whose credentials are synthesized from the
/// `user`/`password` options can therefore equal a layer with the same
/// credentials set explicitly, yet only the latter wins as the first layer
/// of a merge.
impl PartialEq for Configuration {
    fn eq(&self, other: &Self) -> bool {
        self.options == other.options
            && self.credentials == other.credentials
            && self.metric_registry == other.metric_registry
            && self.node_selector == other.node_selector
    }
}

impl Eq for Configuration {}

impl Hash for Configuration {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.options.hash(state);
        self.credentials.hash(state);
        self.metric_registry.hash(state);
        self.node_selector.hash(state);
    }
}

/// Builder for a single configuration layer
#[derive(Debug, Clone, Default)]
pub struct ConfigurationBuilder {
    options: OptionMap,
    credentials: Option<Credentials>,
    node_selector: Option<NodeSelector>,
    metric_registry: Option<MetricRegistry>,
}

impl ConfigurationBuilder {
    /// Set an option
    ///
    /// # Errors
    /// `TypeMismatch` when the value does not have the option's declared type.
    pub fn option(mut self, option: OptionRef, value: impl Into<OptionValue>) -> Result<Self> {
        self.options.insert(option, value)?;
        Ok(self)
    }

    /// Set an option from its textual form
    pub fn option_text(mut self, option: OptionRef, text: &str) -> Result<Self> {
        self.options.insert_text(option, text)?;
        Ok(self)
    }

    /// Overlay a whole option map
    #[must_use]
    pub fn options(mut self, options: &OptionMap) -> Self {
        self.options.overlay(options);
        self
    }

    #[must_use]
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    #[must_use]
    pub fn node_selector(mut self, node_selector: NodeSelector) -> Self {
        self.node_selector = Some(node_selector);
        self
    }

    #[must_use]
    pub fn metric_registry(mut self, metric_registry: MetricRegistry) -> Self {
        self.metric_registry = Some(metric_registry);
        self
    }

    #[must_use]
    pub fn build(self) -> Configuration {
        Configuration::new(self.options, self.credentials, self.node_selector, self.metric_registry)
    }
}
