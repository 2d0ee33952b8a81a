//! Singleton configuration fields
//!
//! Credentials, node selection preferences and the opaque metric registry
//! handle. Unlike options, these are resolved first-wins across layers.

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{ClientError, Result};

/// Protocol a server node can be reached with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Whatever protocol the node supports
    Any,
    /// In-process server
    Local,
    Http,
    Grpc,
    Tcp,
    Postgresql,
    Mysql,
}

impl Protocol {
    pub const ALL: &'static [Self] =
        &[Self::Any, Self::Local, Self::Http, Self::Grpc, Self::Tcp, Self::Postgresql, Self::Mysql];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Local => "local",
            Self::Http => "http",
            Self::Grpc => "grpc",
            Self::Tcp => "tcp",
            Self::Postgresql => "postgresql",
            Self::Mysql => "mysql",
        }
    }

    /// Default server port, zero when the protocol has none
    #[must_use]
    pub const fn default_port(&self) -> u16 {
        match self {
            Self::Any | Self::Local => 0,
            Self::Http => 8123,
            Self::Grpc => 9100,
            Self::Tcp => 9000,
            Self::Postgresql => 9005,
            Self::Mysql => 9004,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ClientError::invalid_input(format!("Unknown protocol '{s}'")))
    }
}

/// User name and password
///
/// WARNING: the password is never serialized nor printed by `Debug`.
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Credentials {
    user: String,
    #[serde(skip)]
    password: String,
}

impl Credentials {
    #[must_use]
    pub fn from_user_and_password(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self { user: user.into(), password: password.into() }
    }

    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials").field("user", &self.user).field("password", &"***").finish()
    }
}

/// Picks the server nodes a client is interested in
///
/// The empty selector accepts every node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeSelector {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    preferred_protocols: Vec<Protocol>,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    preferred_tags: BTreeSet<String>,
}

impl NodeSelector {
    /// Selector that accepts everything
    pub const EMPTY: Self = Self { preferred_protocols: Vec::new(), preferred_tags: BTreeSet::new() };

    /// Create a selector; duplicate protocols are dropped, order is kept
    #[must_use]
    pub fn of<P, T, S>(protocols: P, tags: T) -> Self
    where
        P: IntoIterator<Item = Protocol>,
        T: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut preferred_protocols = Vec::new();
        for p in protocols {
            if !preferred_protocols.contains(&p) {
                preferred_protocols.push(p);
            }
        }
        let preferred_tags = tags
            .into_iter()
            .map(|t| -> String { t.into() })
            .filter(|t| !t.trim().is_empty())
            .collect();
        Self { preferred_protocols, preferred_tags }
    }

    #[must_use]
    pub fn preferred_protocols(&self) -> &[Protocol] {
        &self.preferred_protocols
    }

    #[must_use]
    pub fn preferred_tags(&self) -> &BTreeSet<String> {
        &self.preferred_tags
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.preferred_protocols.is_empty() && self.preferred_tags.is_empty()
    }

    /// Whether a node speaking `protocol` is acceptable
    #[must_use]
    pub fn matches_protocol(&self, protocol: Protocol) -> bool {
        self.preferred_protocols.is_empty()
            || protocol == Protocol::Any
            || self.preferred_protocols.iter().any(|p| *p == Protocol::Any || *p == protocol)
    }

    /// Whether a node carrying `tags` is acceptable (any preferred tag matches)
    #[must_use]
    pub fn matches_tags<'a, I>(&self, tags: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.preferred_tags.is_empty() || tags.into_iter().any(|t| self.preferred_tags.contains(t))
    }
}

/// Opaque handle of a metric registry owned by the caller
///
/// Two handles are equal when they point at the same registry object.
#[derive(Clone)]
pub struct MetricRegistry(Arc<dyn Any + Send + Sync>);

impl MetricRegistry {
    pub fn new<T: Any + Send + Sync>(registry: T) -> Self {
        Self(Arc::new(registry))
    }

    #[must_use]
    pub fn from_arc(registry: Arc<dyn Any + Send + Sync>) -> Self {
        Self(registry)
    }

    /// Borrow the registry as its concrete type
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    fn address(&self) -> *const () {
        Arc::as_ptr(&self.0).cast::<()>()
    }
}

impl PartialEq for MetricRegistry {
    fn eq(&self, other: &Self) -> bool {
        self.address() == other.address()
    }
}

impl Eq for MetricRegistry {}

impl Hash for MetricRegistry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address().hash(state);
    }
}

impl fmt::Debug for MetricRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MetricRegistry({:p})", self.address())
    }
}
