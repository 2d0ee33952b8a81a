//! Fallback defaults
//!
//! These descriptors supply the default of a client option when the caller
//! asks for a fallback (see `Configuration::option_or`). `user` and
//! `password` are also accepted as regular options and feed the synthesized
//! default credentials.

use super::{BufferingMode, DataFormat, DefaultValue, OptionDescriptor, OptionRef};

/// Scope of the fallback default descriptors
pub const SCOPE: &str = "defaults";

pub static ASYNC: OptionDescriptor =
    OptionDescriptor::new(SCOPE, "async", DefaultValue::Bool(true), "Default async mode.");
pub static DATABASE: OptionDescriptor =
    OptionDescriptor::new(SCOPE, "database", DefaultValue::Str("default"), "Default database.");
pub static FORMAT: OptionDescriptor = OptionDescriptor::new(
    SCOPE,
    "format",
    DefaultValue::Format(DataFormat::TabSeparated),
    "Default data format.",
);
pub static BUFFERING: OptionDescriptor = OptionDescriptor::new(
    SCOPE,
    "buffering",
    DefaultValue::Buffering(BufferingMode::ResourceEfficient),
    "Default buffering mode for both request and response.",
);
pub static SERVER_TIME_ZONE: OptionDescriptor = OptionDescriptor::new(
    SCOPE,
    "server_time_zone",
    DefaultValue::Str("UTC"),
    "Server time zone assumed until the server reports one.",
);
pub static SERVER_VERSION: OptionDescriptor = OptionDescriptor::new(
    SCOPE,
    "server_version",
    DefaultValue::Str("latest"),
    "Server version assumed until the server reports one.",
);
pub static USER: OptionDescriptor =
    OptionDescriptor::new(SCOPE, "user", DefaultValue::Str("default"), "Default user name.");
pub static PASSWORD: OptionDescriptor =
    OptionDescriptor::new(SCOPE, "password", DefaultValue::Str(""), "Default password.");

/// Fallback descriptors that are also accepted as property keys
pub static PROPERTY_KEYS: &[OptionRef] = &[&USER, &PASSWORD];

pub static ALL: &[OptionRef] =
    &[&ASYNC, &DATABASE, &FORMAT, &BUFFERING, &SERVER_TIME_ZONE, &SERVER_VERSION, &USER, &PASSWORD];
