//! Option Descriptors and Values
//!
//! An option is a named, statically-typed configuration knob. Descriptors are
//! declared as `static` items and referenced as [`OptionRef`]; a descriptor's
//! value type is derived from its default value, so the two can never
//! disagree.
//!
//! # Identity
//! Descriptors are identified by `(scope, key)`. The built-in client options
//! live in scope `"client"`, the fallback defaults in scope `"defaults"`, and
//! contributed option sets use the name of the client implementation that
//! declares them.
//!
//! # Effective Defaults
//! The effective default of an option may be overridden from the process
//! environment with `CHC_<KEY>` (see [`OptionDescriptor::env_var`]).

pub mod client;
pub mod defaults;
pub mod kinds;

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};

use tracing::warn;

use crate::error::{ClientError, Result};

pub use kinds::{BufferingMode, Compression, DataFormat, SslMode};

/// Environment variable prefix for effective default overrides
pub const ENV_PREFIX: &str = "CHC_";

/// Declared value type of an option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Bool,
    Int,
    Long,
    Str,
    Compression,
    Format,
    Buffering,
    SslMode,
}

impl ValueType {
    /// Get the type name used in diagnostics
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "Boolean",
            Self::Int => "Integer",
            Self::Long => "Long",
            Self::Str => "String",
            Self::Compression => "Compression",
            Self::Format => "Format",
            Self::Buffering => "BufferingMode",
            Self::SslMode => "SslMode",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed option value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OptionValue {
    Bool(bool),
    Int(i32),
    Long(i64),
    Str(String),
    Compression(Compression),
    Format(DataFormat),
    Buffering(BufferingMode),
    SslMode(SslMode),
}

impl OptionValue {
    /// Get the value's type
    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        match self {
            Self::Bool(_) => ValueType::Bool,
            Self::Int(_) => ValueType::Int,
            Self::Long(_) => ValueType::Long,
            Self::Str(_) => ValueType::Str,
            Self::Compression(_) => ValueType::Compression,
            Self::Format(_) => ValueType::Format,
            Self::Buffering(_) => ValueType::Buffering,
            Self::SslMode(_) => ValueType::SslMode,
        }
    }

    /// Parse the textual form of a value of the given type
    ///
    /// Booleans follow the wire convention: `true` (any case) or `1` is true,
    /// everything else is false.
    pub fn parse(text: &str, value_type: ValueType) -> Result<Self> {
        let trimmed = text.trim();
        let value = match value_type {
            ValueType::Bool => Self::Bool(trimmed.eq_ignore_ascii_case("true") || trimmed == "1"),
            ValueType::Int => Self::Int(
                trimmed
                    .parse()
                    .map_err(|e| ClientError::invalid_input(format!("'{text}' is not an Integer: {e}")))?,
            ),
            ValueType::Long => Self::Long(
                trimmed
                    .parse()
                    .map_err(|e| ClientError::invalid_input(format!("'{text}' is not a Long: {e}")))?,
            ),
            ValueType::Str => Self::Str(text.to_string()),
            ValueType::Compression => Self::Compression(trimmed.parse()?),
            ValueType::Format => Self::Format(trimmed.parse()?),
            ValueType::Buffering => Self::Buffering(trimmed.parse()?),
            ValueType::SslMode => Self::SslMode(trimmed.parse()?),
        };
        Ok(value)
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_long(&self) -> Option<i64> {
        match self {
            Self::Long(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::Str(v) => f.write_str(v),
            Self::Compression(v) => write!(f, "{v}"),
            Self::Format(v) => write!(f, "{v}"),
            Self::Buffering(v) => write!(f, "{v}"),
            Self::SslMode(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for OptionValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<Compression> for OptionValue {
    fn from(v: Compression) -> Self {
        Self::Compression(v)
    }
}

impl From<DataFormat> for OptionValue {
    fn from(v: DataFormat) -> Self {
        Self::Format(v)
    }
}

impl From<BufferingMode> for OptionValue {
    fn from(v: BufferingMode) -> Self {
        Self::Buffering(v)
    }
}

impl From<SslMode> for OptionValue {
    fn from(v: SslMode) -> Self {
        Self::SslMode(v)
    }
}

/// Compile-time default of an option
///
/// Unlike [`OptionValue`] this is `const`-constructible, so descriptors can be
/// declared as `static` items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    Bool(bool),
    Int(i32),
    Long(i64),
    Str(&'static str),
    Compression(Compression),
    Format(DataFormat),
    Buffering(BufferingMode),
    SslMode(SslMode),
}

impl DefaultValue {
    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        match self {
            Self::Bool(_) => ValueType::Bool,
            Self::Int(_) => ValueType::Int,
            Self::Long(_) => ValueType::Long,
            Self::Str(_) => ValueType::Str,
            Self::Compression(_) => ValueType::Compression,
            Self::Format(_) => ValueType::Format,
            Self::Buffering(_) => ValueType::Buffering,
            Self::SslMode(_) => ValueType::SslMode,
        }
    }

    #[must_use]
    pub fn to_value(&self) -> OptionValue {
        match *self {
            Self::Bool(v) => OptionValue::Bool(v),
            Self::Int(v) => OptionValue::Int(v),
            Self::Long(v) => OptionValue::Long(v),
            Self::Str(v) => OptionValue::Str(v.to_string()),
            Self::Compression(v) => OptionValue::Compression(v),
            Self::Format(v) => OptionValue::Format(v),
            Self::Buffering(v) => OptionValue::Buffering(v),
            Self::SslMode(v) => OptionValue::SslMode(v),
        }
    }
}

/// A named, strongly-typed option key
#[derive(Debug)]
pub struct OptionDescriptor {
    scope: &'static str,
    key: &'static str,
    default: DefaultValue,
    description: &'static str,
}

/// Reference to a published descriptor
pub type OptionRef = &'static OptionDescriptor;

impl OptionDescriptor {
    /// Declare a descriptor; its value type is the type of `default`
    #[must_use]
    pub const fn new(
        scope: &'static str,
        key: &'static str,
        default: DefaultValue,
        description: &'static str,
    ) -> Self {
        Self { scope, key, default, description }
    }

    #[must_use]
    pub const fn scope(&self) -> &'static str {
        self.scope
    }

    #[must_use]
    pub const fn key(&self) -> &'static str {
        self.key
    }

    #[must_use]
    pub const fn description(&self) -> &'static str {
        self.description
    }

    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        self.default.value_type()
    }

    /// Compile-time default, ignoring environment overrides
    #[must_use]
    pub fn default_value(&self) -> OptionValue {
        self.default.to_value()
    }

    /// Name of the environment variable overriding the default
    ///
    /// `server_time_zone` becomes `CHC_SERVER_TIME_ZONE`.
    #[must_use]
    pub fn env_var(&self) -> String {
        let mut name = String::with_capacity(ENV_PREFIX.len() + self.key.len());
        name.push_str(ENV_PREFIX);
        for ch in self.key.chars() {
            match ch {
                '.' | '-' => name.push('_'),
                _ => name.push(ch.to_ascii_uppercase()),
            }
        }
        name
    }

    /// Default value after applying the environment override, if any
    #[must_use]
    pub fn effective_default(&self) -> OptionValue {
        let var = self.env_var();
        match std::env::var(&var) {
            Ok(text) => match OptionValue::parse(&text, self.value_type()) {
                Ok(value) => value,
                Err(e) => {
                    warn!(option = self.key, env = %var, error = %e, "ignoring unparsable default override");
                    self.default_value()
                }
            },
            Err(_) => self.default_value(),
        }
    }

    /// Parse the textual form of a value for this option
    pub fn parse(&self, text: &str) -> Result<OptionValue> {
        OptionValue::parse(text, self.value_type())
            .map_err(|e| ClientError::invalid_option_value(self.key, text, e.message()))
    }
}

impl PartialEq for OptionDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.scope == other.scope && self.key == other.key
    }
}

impl Eq for OptionDescriptor {}

impl Hash for OptionDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.scope.hash(state);
        self.key.hash(state);
    }
}

impl PartialOrd for OptionDescriptor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OptionDescriptor {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.scope, self.key).cmp(&(other.scope, other.key))
    }
}

impl fmt::Display for OptionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key)
    }
}

/// Rust types an option value can be read as
pub trait OptionType: Sized {
    const VALUE_TYPE: ValueType;

    fn from_option_value(value: &OptionValue) -> Option<Self>;
}

impl OptionType for bool {
    const VALUE_TYPE: ValueType = ValueType::Bool;

    fn from_option_value(value: &OptionValue) -> Option<Self> {
        value.as_bool()
    }
}

impl OptionType for i32 {
    const VALUE_TYPE: ValueType = ValueType::Int;

    fn from_option_value(value: &OptionValue) -> Option<Self> {
        value.as_int()
    }
}

impl OptionType for i64 {
    const VALUE_TYPE: ValueType = ValueType::Long;

    fn from_option_value(value: &OptionValue) -> Option<Self> {
        value.as_long()
    }
}

impl OptionType for String {
    const VALUE_TYPE: ValueType = ValueType::Str;

    fn from_option_value(value: &OptionValue) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl OptionType for Compression {
    const VALUE_TYPE: ValueType = ValueType::Compression;

    fn from_option_value(value: &OptionValue) -> Option<Self> {
        match value {
            OptionValue::Compression(v) => Some(*v),
            _ => None,
        }
    }
}

impl OptionType for DataFormat {
    const VALUE_TYPE: ValueType = ValueType::Format;

    fn from_option_value(value: &OptionValue) -> Option<Self> {
        match value {
            OptionValue::Format(v) => Some(*v),
            _ => None,
        }
    }
}

impl OptionType for BufferingMode {
    const VALUE_TYPE: ValueType = ValueType::Buffering;

    fn from_option_value(value: &OptionValue) -> Option<Self> {
        match value {
            OptionValue::Buffering(v) => Some(*v),
            _ => None,
        }
    }
}

impl OptionType for SslMode {
    const VALUE_TYPE: ValueType = ValueType::SslMode;

    fn from_option_value(value: &OptionValue) -> Option<Self> {
        match value {
            OptionValue::SslMode(v) => Some(*v),
            _ => None,
        }
    }
}

/// Option-value map whose values always match their descriptor's type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionMap {
    entries: HashMap<OptionRef, OptionValue>,
}

impl OptionMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an option, rejecting values of the wrong type
    ///
    /// Returns the previous value, if any.
    pub fn insert(&mut self, option: OptionRef, value: impl Into<OptionValue>) -> Result<Option<OptionValue>> {
        let value = value.into();
        if value.value_type() != option.value_type() {
            return Err(ClientError::type_mismatch(option.key(), option.value_type(), value.value_type()));
        }
        Ok(self.entries.insert(option, value))
    }

    /// Parse and set an option from its textual form
    pub fn insert_text(&mut self, option: OptionRef, text: &str) -> Result<Option<OptionValue>> {
        let value = option.parse(text)?;
        Ok(self.entries.insert(option, value))
    }

    #[must_use]
    pub fn get(&self, option: &OptionDescriptor) -> Option<&OptionValue> {
        self.entries.get(option)
    }

    #[must_use]
    pub fn contains(&self, option: &OptionDescriptor) -> bool {
        self.entries.contains_key(option)
    }

    pub fn remove(&mut self, option: &OptionDescriptor) -> Option<OptionValue> {
        self.entries.remove(option)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (OptionRef, &OptionValue)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    /// Overlay every entry of `other` onto this map (entries of `other` win)
    pub fn overlay(&mut self, other: &Self) {
        for (option, value) in &other.entries {
            self.entries.insert(*option, value.clone());
        }
    }

    /// Entries sorted by descriptor identity
    #[must_use]
    pub fn sorted(&self) -> Vec<(OptionRef, &OptionValue)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

impl Hash for OptionMap {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let sorted = self.sorted();
        sorted.len().hash(state);
        for (option, value) in sorted {
            option.hash(state);
            value.hash(state);
        }
    }
}

/// Parse `key=value` pairs separated by commas
///
/// A backslash escapes `,`, `=` and itself. Keys and values are trimmed,
/// entries without `=` or with a blank key are dropped, and later duplicates
/// win.
#[must_use]
pub fn to_key_value_pairs(text: &str) -> BTreeMap<String, String> {
    let mut pairs = BTreeMap::new();
    let mut key = String::new();
    let mut value = String::new();
    let mut in_value = false;
    let mut escaped = false;

    let mut flush = |key: &mut String, value: &mut String, in_value: bool| {
        let k = key.trim();
        if in_value && !k.is_empty() {
            pairs.insert(k.to_string(), value.trim().to_string());
        }
        key.clear();
        value.clear();
    };

    for ch in text.chars() {
        if escaped {
            if in_value { value.push(ch) } else { key.push(ch) }
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '=' if !in_value => in_value = true,
            ',' => {
                flush(&mut key, &mut value, in_value);
                in_value = false;
            }
            _ => {
                if in_value { value.push(ch) } else { key.push(ch) }
            }
        }
    }
    flush(&mut key, &mut value, in_value);

    pairs
}
