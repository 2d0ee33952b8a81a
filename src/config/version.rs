//! Server version
//!
//! Versions have the form `year.feature.maintenance.build`. Missing trailing
//! parts are zero, and `latest` (or blank text) stands for a version newer
//! than any numbered release.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

const PARTS: usize = 4;

/// A parsed server version
#[derive(Debug, Clone, Copy)]
pub struct ServerVersion {
    latest: bool,
    parts: [u32; PARTS],
    /// Number of parts present in the parsed text
    specified: usize,
}

impl ServerVersion {
    /// Newer than every numbered version
    pub const LATEST: Self = Self { latest: true, parts: [0; PARTS], specified: 0 };

    #[must_use]
    pub const fn new(year: u32, feature: u32, maintenance: u32, build: u32) -> Self {
        Self { latest: false, parts: [year, feature, maintenance, build], specified: PARTS }
    }

    /// Parse a version string leniently
    ///
    /// Leading non-digit text (e.g. `v`) and trailing suffixes (e.g. `-lts`)
    /// are ignored. Text without any digit parses as version zero, except
    /// `latest` and blank text which parse as [`ServerVersion::LATEST`].
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() || text.eq_ignore_ascii_case("latest") {
            return Self::LATEST;
        }

        let mut version = Self { latest: false, parts: [0; PARTS], specified: 0 };
        let Some(start) = text.find(|c: char| c.is_ascii_digit()) else {
            return version;
        };
        for (slot, part) in text[start..].split('.').take(PARTS).enumerate() {
            let digits = part.find(|c: char| !c.is_ascii_digit()).unwrap_or(part.len());
            if digits == 0 {
                break;
            }
            version.parts[slot] = part[..digits].parse().unwrap_or(u32::MAX);
            version.specified = slot + 1;
            if digits < part.len() {
                break;
            }
        }
        version
    }

    #[must_use]
    pub const fn is_latest(&self) -> bool {
        self.latest
    }

    #[must_use]
    pub const fn year(&self) -> u32 {
        self.parts[0]
    }

    #[must_use]
    pub const fn feature(&self) -> u32 {
        self.parts[1]
    }

    #[must_use]
    pub const fn maintenance(&self) -> u32 {
        self.parts[2]
    }

    #[must_use]
    pub const fn build(&self) -> u32 {
        self.parts[3]
    }

    /// Compare against `other` using only the parts `other` specifies
    ///
    /// `21.8.3.44` compared with `21.8` is equal.
    #[must_use]
    pub fn compare_prefix(&self, other: &Self) -> Ordering {
        match (self.latest, other.latest) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => {
                let n = other.specified.max(1);
                self.parts[..n].cmp(&other.parts[..n])
            }
        }
    }

    /// Whether this version is the same as or newer than `version`
    #[must_use]
    pub fn is_newer_or_equal_to(&self, version: &str) -> bool {
        self.compare_prefix(&Self::parse(version)) != Ordering::Less
    }

    /// Whether this version is older than `version`
    #[must_use]
    pub fn is_older_than(&self, version: &str) -> bool {
        self.compare_prefix(&Self::parse(version)) == Ordering::Less
    }
}

impl Default for ServerVersion {
    fn default() -> Self {
        Self::LATEST
    }
}

impl PartialEq for ServerVersion {
    fn eq(&self, other: &Self) -> bool {
        self.latest == other.latest && self.parts == other.parts
    }
}

impl Eq for ServerVersion {}

impl Hash for ServerVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.latest.hash(state);
        self.parts.hash(state);
    }
}

impl PartialOrd for ServerVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ServerVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.latest, other.latest) {
            (false, false) => self.parts.cmp(&other.parts),
            (a, b) => a.cmp(&b),
        }
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.latest {
            return f.write_str("latest");
        }
        let [year, feature, maintenance, build] = self.parts;
        write!(f, "{year}.{feature}.{maintenance}.{build}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_latest() {
        assert!(ServerVersion::parse("").is_latest());
        assert!(ServerVersion::parse(" LATEST ").is_latest());
        assert_eq!(ServerVersion::parse("latest").to_string(), "latest");
    }

    #[test]
    fn test_parse_parts() {
        let v = ServerVersion::parse("21.8.3.44");
        assert_eq!((v.year(), v.feature(), v.maintenance(), v.build()), (21, 8, 3, 44));

        let v = ServerVersion::parse("v22.3");
        assert_eq!(v, ServerVersion { latest: false, parts: [22, 3, 0, 0], specified: 2 });
        assert_eq!(v.to_string(), "22.3.0.0");

        let v = ServerVersion::parse("21.3.10-lts");
        assert_eq!(v.to_string(), "21.3.10.0");
    }

    #[test]
    fn test_parse_garbage_is_zero() {
        assert_eq!(ServerVersion::parse("unknown").to_string(), "0.0.0.0");
    }

    #[test]
    fn test_comparisons() {
        let v = ServerVersion::parse("21.8.3.44");
        assert!(v.is_newer_or_equal_to("21.8"));
        assert!(v.is_newer_or_equal_to("21.3.10"));
        assert!(!v.is_newer_or_equal_to("22"));
        assert!(v.is_older_than("22.1"));
        assert!(!v.is_older_than("21.8"));
        assert!(ServerVersion::LATEST.is_newer_or_equal_to("99.1"));
        assert!(v.is_older_than("latest"));
    }

    #[test]
    fn test_ordering() {
        let mut versions = vec![
            ServerVersion::LATEST,
            ServerVersion::new(22, 1, 0, 0),
            ServerVersion::new(21, 12, 4, 1),
        ];
        versions.sort();
        assert_eq!(versions[0], ServerVersion::new(21, 12, 4, 1));
        assert!(versions[2].is_latest());
    }
}
