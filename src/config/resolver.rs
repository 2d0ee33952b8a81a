//! Layered merge policies
//!
//! The two halves of a configuration merge differently:
//!
//! - **Options** are overlaid in source order, so for a key defined by several
//!   sources the *last* one wins. A source that appears more than once (the
//!   same object, not an equal one) is only applied the first time.
//! - **Singletons** (credentials, node selector, metric registry) take the
//!   *first* explicit value found in source order.

use tracing::trace;

use crate::option::OptionMap;

use super::node::{Credentials, MetricRegistry, NodeSelector};
use super::Configuration;

/// Overlay the option maps of `sources`; the last source defining a key wins
#[must_use]
pub fn merge_options(sources: &[&Configuration]) -> OptionMap {
    let mut merged = OptionMap::new();
    for (i, source) in sources.iter().enumerate() {
        if sources[..i].iter().any(|seen| std::ptr::eq(*seen, *source)) {
            trace!(position = i, "skipping repeated configuration source");
            continue;
        }
        merged.overlay(&source.options);
    }
    merged
}

/// First explicit credentials in source order
#[must_use]
pub fn merge_credentials(sources: &[&Configuration]) -> Option<Credentials> {
    sources.iter().find_map(|c| c.explicit_credentials.clone())
}

/// First explicit node selector in source order
#[must_use]
pub fn merge_node_selector(sources: &[&Configuration]) -> Option<NodeSelector> {
    sources.iter().find_map(|c| c.explicit_node_selector.clone())
}

/// First metric registry in source order
#[must_use]
pub fn merge_metric_registry(sources: &[&Configuration]) -> Option<MetricRegistry> {
    sources.iter().find_map(|c| c.metric_registry.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::node::Protocol;
    use crate::option::{client, OptionValue};
    use pretty_assertions::assert_eq;

    fn with_database(name: &str) -> Configuration {
        Configuration::builder().option(&client::DATABASE, name).unwrap().build()
    }

    #[test]
    fn test_last_source_wins_for_options() {
        let a = with_database("a");
        let b = with_database("b");
        let merged = merge_options(&[&a, &b]);
        assert_eq!(merged.get(&client::DATABASE), Some(&OptionValue::Str("b".into())));
    }

    #[test]
    fn test_repeated_source_applied_once() {
        let a = with_database("a");
        let b = with_database("b");
        // `a` was already applied, so its second occurrence does not override `b`
        let merged = merge_options(&[&a, &b, &a]);
        assert_eq!(merged.get(&client::DATABASE), Some(&OptionValue::Str("b".into())));

        // an equal but distinct source is applied
        let a2 = with_database("a");
        let merged = merge_options(&[&a, &b, &a2]);
        assert_eq!(merged.get(&client::DATABASE), Some(&OptionValue::Str("a".into())));
    }

    #[test]
    fn test_first_source_wins_for_singletons() {
        let plain = Configuration::default();
        let first = Configuration::builder()
            .credentials(Credentials::from_user_and_password("first", ""))
            .node_selector(NodeSelector::of([Protocol::Http], ["dc1"]))
            .build();
        let second = Configuration::builder()
            .credentials(Credentials::from_user_and_password("second", ""))
            .node_selector(NodeSelector::of([Protocol::Grpc], Vec::<String>::new()))
            .build();

        let sources = [&plain, &first, &second];
        assert_eq!(merge_credentials(&sources).map(|c| c.user().to_string()), Some("first".to_string()));
        assert_eq!(merge_node_selector(&sources), Some(NodeSelector::of([Protocol::Http], ["dc1"])));
        assert_eq!(merge_metric_registry(&sources), None);
    }

    #[test]
    fn test_empty_sources() {
        assert!(merge_options(&[]).is_empty());
        assert_eq!(merge_credentials(&[]), None);
    }
}
