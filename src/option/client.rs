//! Built-in client options
//!
//! Keys, types and defaults shared by every client implementation.

use super::{BufferingMode, Compression, DataFormat, DefaultValue, OptionDescriptor, OptionRef, SslMode};

/// Scope of the built-in client options
pub const SCOPE: &str = "client";

const fn opt(key: &'static str, default: DefaultValue, description: &'static str) -> OptionDescriptor {
    OptionDescriptor::new(SCOPE, key, default, description)
}

pub static ASYNC: OptionDescriptor =
    opt("async", DefaultValue::Bool(true), "Whether the client should run in async mode.");
pub static AUTO_DISCOVERY: OptionDescriptor = opt(
    "auto_discovery",
    DefaultValue::Bool(false),
    "Whether the client should discover more nodes from system tables and/or clickhouse-keeper.",
);
pub static CUSTOM_SETTINGS: OptionDescriptor = opt(
    "custom_settings",
    DefaultValue::Str(""),
    "Comma separated key-value pairs of custom server settings.",
);
pub static CLIENT_NAME: OptionDescriptor = opt(
    "client_name",
    DefaultValue::Str("ClickHouse Rust Client"),
    "Client name reported to the server.",
);
pub static COMPRESS: OptionDescriptor = opt(
    "compress",
    DefaultValue::Bool(true),
    "Whether the server will compress response it sends to the client.",
);
pub static COMPRESS_ALGORITHM: OptionDescriptor = opt(
    "compress_algorithm",
    DefaultValue::Compression(Compression::Lz4),
    "Algorithm used by the server to compress response.",
);
pub static COMPRESS_LEVEL: OptionDescriptor = opt(
    "compress_level",
    DefaultValue::Int(-1),
    "Compression level for response, -1 standing for the algorithm's default.",
);
pub static DECOMPRESS: OptionDescriptor = opt(
    "decompress",
    DefaultValue::Bool(false),
    "Whether the server should decompress the request the client sends.",
);
pub static DECOMPRESS_ALGORITHM: OptionDescriptor = opt(
    "decompress_algorithm",
    DefaultValue::Compression(Compression::Lz4),
    "Algorithm for the server to decompress the request.",
);
pub static DECOMPRESS_LEVEL: OptionDescriptor = opt(
    "decompress_level",
    DefaultValue::Int(-1),
    "Compression level for request, -1 standing for the algorithm's default.",
);
pub static CONNECTION_TIMEOUT: OptionDescriptor = opt(
    "connect_timeout",
    DefaultValue::Int(5000),
    "Connection timeout in milliseconds.",
);
pub static DATABASE: OptionDescriptor =
    opt("database", DefaultValue::Str(""), "Default database.");
pub static FORMAT: OptionDescriptor = opt(
    "format",
    DefaultValue::Format(DataFormat::TabSeparated),
    "Default format.",
);
pub static MAX_BUFFER_SIZE: OptionDescriptor = opt(
    "max_buffer_size",
    DefaultValue::Int(128 * 1024),
    "Maximum buffer size in bytes which can be used for streaming.",
);
pub static BUFFER_SIZE: OptionDescriptor = opt(
    "buffer_size",
    DefaultValue::Int(4096),
    "Default buffer size in bytes for both request and response.",
);
pub static BUFFER_QUEUE_VARIATION: OptionDescriptor = opt(
    "buffer_queue_variation",
    DefaultValue::Int(100),
    "How many times the buffer queue is filled up before increasing its capacity; zero or negative means fixed.",
);
pub static READ_BUFFER_SIZE: OptionDescriptor = opt(
    "read_buffer_size",
    DefaultValue::Int(0),
    "Read buffer size in bytes; zero or negative falls back to buffer_size.",
);
pub static WRITE_BUFFER_SIZE: OptionDescriptor = opt(
    "write_buffer_size",
    DefaultValue::Int(0),
    "Write buffer size in bytes; zero or negative falls back to buffer_size.",
);
pub static REQUEST_CHUNK_SIZE: OptionDescriptor = opt(
    "request_chunk_size",
    DefaultValue::Int(0),
    "Request chunk size in bytes; zero or negative falls back to write_buffer_size.",
);
pub static REQUEST_BUFFERING: OptionDescriptor = opt(
    "request_buffering",
    DefaultValue::Buffering(BufferingMode::ResourceEfficient),
    "Request buffering mode.",
);
pub static RESPONSE_BUFFERING: OptionDescriptor = opt(
    "response_buffering",
    DefaultValue::Buffering(BufferingMode::ResourceEfficient),
    "Response buffering mode.",
);
pub static MAX_EXECUTION_TIME: OptionDescriptor = opt(
    "max_execution_time",
    DefaultValue::Int(0),
    "Maximum query execution time in seconds, zero for unlimited.",
);
pub static MAX_QUEUED_BUFFERS: OptionDescriptor = opt(
    "max_queued_buffers",
    DefaultValue::Int(512),
    "Maximum number of buffers queued for reading or writing, zero for unlimited.",
);
pub static MAX_QUEUED_REQUESTS: OptionDescriptor = opt(
    "max_queued_requests",
    DefaultValue::Int(0),
    "Maximum number of requests queued, zero for unlimited.",
);
pub static MAX_RESULT_ROWS: OptionDescriptor = opt(
    "max_result_rows",
    DefaultValue::Long(0),
    "Limit of rows to return, zero for unlimited.",
);
pub static MAX_THREADS_PER_CLIENT: OptionDescriptor = opt(
    "max_threads_per_client",
    DefaultValue::Int(0),
    "Size of the thread pool for each client, zero or negative for the shared pool.",
);
pub static NODE_CHECK_INTERVAL: OptionDescriptor = opt(
    "node_check_interval",
    DefaultValue::Int(0),
    "Interval in milliseconds between node health checks, zero to disable.",
);
pub static FAILOVER: OptionDescriptor = opt(
    "failover",
    DefaultValue::Int(0),
    "Maximum number of times failover can happen for a request, zero to disable.",
);
pub static RETRY: OptionDescriptor = opt(
    "retry",
    DefaultValue::Int(0),
    "Maximum number of times retry can happen for a request, zero to disable.",
);
pub static REPEAT_ON_SESSION_LOCK: OptionDescriptor = opt(
    "repeat_on_session_lock",
    DefaultValue::Bool(true),
    "Whether to repeat a request when its session is locked, until timed out.",
);
pub static REUSE_VALUE_WRAPPER: OptionDescriptor = opt(
    "reuse_value_wrapper",
    DefaultValue::Bool(true),
    "Whether to reuse value containers while decoding rows.",
);
pub static SERVER_TIME_ZONE: OptionDescriptor = opt(
    "server_time_zone",
    DefaultValue::Str(""),
    "Server time zone, empty until reported by the server.",
);
pub static SERVER_VERSION: OptionDescriptor = opt(
    "server_version",
    DefaultValue::Str(""),
    "Server version, empty until reported by the server.",
);
pub static SESSION_TIMEOUT: OptionDescriptor = opt(
    "session_timeout",
    DefaultValue::Int(0),
    "Session timeout in seconds, zero for the server default.",
);
pub static SESSION_CHECK: OptionDescriptor = opt(
    "session_check",
    DefaultValue::Bool(false),
    "Whether to check that the session exists before using it.",
);
pub static SOCKET_TIMEOUT: OptionDescriptor = opt(
    "socket_timeout",
    DefaultValue::Int(30_000),
    "Socket timeout in milliseconds.",
);
pub static SSL: OptionDescriptor =
    opt("ssl", DefaultValue::Bool(false), "Whether to use SSL/TLS for the connection.");
pub static SSL_MODE: OptionDescriptor = opt(
    "sslmode",
    DefaultValue::SslMode(SslMode::Strict),
    "SSL mode, STRICT to verify the server certificate.",
);
pub static SSL_ROOT_CERTIFICATE: OptionDescriptor =
    opt("sslrootcert", DefaultValue::Str(""), "SSL/TLS root certificate.");
pub static SSL_CERTIFICATE: OptionDescriptor =
    opt("sslcert", DefaultValue::Str(""), "SSL/TLS certificate.");
pub static SSL_KEY: OptionDescriptor =
    opt("sslkey", DefaultValue::Str(""), "RSA key in PKCS#8 format.");
pub static TRANSACTION_TIMEOUT: OptionDescriptor = opt(
    "transaction_timeout",
    DefaultValue::Int(0),
    "Transaction timeout in seconds; less than one falls back to session_timeout.",
);
pub static USE_BLOCKING_QUEUE: OptionDescriptor = opt(
    "use_blocking_queue",
    DefaultValue::Bool(false),
    "Whether to use a blocking queue for buffering.",
);
pub static USE_OBJECTS_IN_ARRAYS: OptionDescriptor = opt(
    "use_objects_in_arrays",
    DefaultValue::Bool(false),
    "Whether arrays of primitives are decoded as arrays of objects.",
);
pub static USE_NO_PROXY: OptionDescriptor = opt(
    "use_no_proxy",
    DefaultValue::Bool(false),
    "Whether to bypass any configured proxy.",
);
pub static USE_SERVER_TIME_ZONE: OptionDescriptor = opt(
    "use_server_time_zone",
    DefaultValue::Bool(true),
    "Whether to use the server time zone; takes precedence over use_time_zone.",
);
pub static USE_SERVER_TIME_ZONE_FOR_DATES: OptionDescriptor = opt(
    "use_server_time_zone_for_dates",
    DefaultValue::Bool(false),
    "Whether date-only values adopt the working time zone instead of staying zone-naive.",
);
pub static USE_TIME_ZONE: OptionDescriptor = opt(
    "use_time_zone",
    DefaultValue::Str(""),
    "Time zone for reading and writing temporal values; blank means the process default.",
);

/// Every built-in client option, in declaration order
pub static ALL: &[OptionRef] = &[
    &ASYNC,
    &AUTO_DISCOVERY,
    &CUSTOM_SETTINGS,
    &CLIENT_NAME,
    &COMPRESS,
    &COMPRESS_ALGORITHM,
    &COMPRESS_LEVEL,
    &DECOMPRESS,
    &DECOMPRESS_ALGORITHM,
    &DECOMPRESS_LEVEL,
    &CONNECTION_TIMEOUT,
    &DATABASE,
    &FORMAT,
    &MAX_BUFFER_SIZE,
    &BUFFER_SIZE,
    &BUFFER_QUEUE_VARIATION,
    &READ_BUFFER_SIZE,
    &WRITE_BUFFER_SIZE,
    &REQUEST_CHUNK_SIZE,
    &REQUEST_BUFFERING,
    &RESPONSE_BUFFERING,
    &MAX_EXECUTION_TIME,
    &MAX_QUEUED_BUFFERS,
    &MAX_QUEUED_REQUESTS,
    &MAX_RESULT_ROWS,
    &MAX_THREADS_PER_CLIENT,
    &NODE_CHECK_INTERVAL,
    &FAILOVER,
    &RETRY,
    &REPEAT_ON_SESSION_LOCK,
    &REUSE_VALUE_WRAPPER,
    &SERVER_TIME_ZONE,
    &SERVER_VERSION,
    &SESSION_TIMEOUT,
    &SESSION_CHECK,
    &SOCKET_TIMEOUT,
    &SSL,
    &SSL_MODE,
    &SSL_ROOT_CERTIFICATE,
    &SSL_CERTIFICATE,
    &SSL_KEY,
    &TRANSACTION_TIMEOUT,
    &USE_BLOCKING_QUEUE,
    &USE_OBJECTS_IN_ARRAYS,
    &USE_NO_PROXY,
    &USE_SERVER_TIME_ZONE,
    &USE_SERVER_TIME_ZONE_FOR_DATES,
    &USE_TIME_ZONE,
];

/// Look up a built-in client option by key
#[must_use]
pub fn from_key(key: &str) -> Option<OptionRef> {
    ALL.iter().copied().find(|o| o.key() == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_keys_are_unique() {
        let keys: HashSet<_> = ALL.iter().map(|o| o.key()).collect();
        assert_eq!(keys.len(), ALL.len());
    }

    #[test]
    fn test_all_in_client_scope() {
        assert!(ALL.iter().all(|o| o.scope() == SCOPE));
    }

    #[test]
    fn test_from_key() {
        assert_eq!(from_key("sslmode"), Some(&SSL_MODE as OptionRef));
        assert_eq!(from_key("connect_timeout"), Some(&CONNECTION_TIMEOUT as OptionRef));
        assert!(from_key("no_such_option").is_none());
    }
}
