//! Derived-field cascades
//!
//! Pure functions that turn possibly-unset option values into the effective
//! scalars a `Configuration` exposes. Each one is evaluated once, when the
//! configuration is built.

use crate::option::Compression;

use super::timezone::TimeZone;

/// Effective buffer size
///
/// `configured` when strictly positive, otherwise `fallback`; the result is
/// clamped to `max` when `max` is itself positive.
#[must_use]
pub const fn buffer_size(configured: i32, fallback: i32, max: i32) -> i32 {
    let size = if configured > 0 { configured } else { fallback };
    if max > 0 && size > max {
        max
    } else {
        size
    }
}

/// Resolved buffer tiers
///
/// Each tier falls back to the resolved value of the tier above it and is
/// capped by the resolved maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferSizes {
    pub max: i32,
    pub buffer: i32,
    pub read: i32,
    pub write: i32,
    pub request_chunk: i32,
}

impl BufferSizes {
    #[must_use]
    pub const fn resolve(max: i32, buffer: i32, read: i32, write: i32, request_chunk: i32) -> Self {
        let max = buffer_size(max, -1, -1);
        let buffer = buffer_size(buffer, max, max);
        let read = buffer_size(read, buffer, max);
        let write = buffer_size(write, buffer, max);
        let request_chunk = buffer_size(request_chunk, write, max);
        Self { max, buffer, read, write, request_chunk }
    }
}

/// Compression settings of one direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompressionSetting {
    enabled: bool,
    algorithm: Compression,
    level: i32,
}

impl CompressionSetting {
    #[must_use]
    pub const fn new(enabled: bool, algorithm: Compression, level: i32) -> Self {
        Self { enabled, algorithm, level }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Configured algorithm, or [`Compression::None`] when disabled
    #[must_use]
    pub const fn algorithm(&self) -> Compression {
        if self.enabled {
            self.algorithm
        } else {
            Compression::None
        }
    }

    /// Configured level, or `0` when disabled
    #[must_use]
    pub const fn level(&self) -> i32 {
        if self.enabled {
            self.level
        } else {
            0
        }
    }
}

/// Working time zone
///
/// The server zone when `use_server_time_zone` is set, otherwise the
/// configured zone, otherwise the process default.
#[must_use]
pub fn working_time_zone(use_server_time_zone: bool, server: &TimeZone, configured: &str) -> TimeZone {
    if use_server_time_zone {
        server.clone()
    } else {
        TimeZone::parse(configured).unwrap_or_else(TimeZone::system_default)
    }
}

/// Zone applied to date-only values; `None` keeps them zone-naive
#[must_use]
pub fn date_time_zone(use_server_time_zone_for_dates: bool, working: &TimeZone) -> Option<TimeZone> {
    use_server_time_zone_for_dates.then(|| working.clone())
}

/// Effective transaction timeout; values below one fall back to the session timeout
#[must_use]
pub const fn transaction_timeout(configured: i32, session_timeout: i32) -> i32 {
    if configured < 1 {
        session_timeout
    } else {
        configured
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_buffer_size_fallback() {
        assert_eq!(buffer_size(-1, 4096, -1), 4096);
        assert_eq!(buffer_size(0, 4096, -1), 4096);
    }

    #[test]
    fn test_buffer_size_clamp() {
        assert_eq!(buffer_size(8192, 1024, 4096), 4096);
        assert_eq!(buffer_size(2048, 1024, 4096), 2048);
        assert_eq!(buffer_size(-1, 8192, 4096), 4096);
        assert_eq!(buffer_size(1 << 20, 0, 0), 1 << 20);
    }

    #[test]
    fn test_buffer_tiers() {
        let sizes = BufferSizes::resolve(131_072, 4096, 0, 0, 0);
        assert_eq!(
            sizes,
            BufferSizes { max: 131_072, buffer: 4096, read: 4096, write: 4096, request_chunk: 4096 }
        );

        let sizes = BufferSizes::resolve(8192, 4096, 16_384, 2048, 0);
        assert_eq!(sizes.read, 8192);
        assert_eq!(sizes.write, 2048);
        assert_eq!(sizes.request_chunk, 2048);
    }

    #[test]
    fn test_buffer_tiers_unset_generic_size() {
        let sizes = BufferSizes::resolve(65_536, 0, 0, 0, 0);
        assert_eq!(sizes.buffer, 65_536);
        assert_eq!(sizes.request_chunk, 65_536);
    }

    #[test]
    fn test_disabled_compression_reports_none() {
        let off = CompressionSetting::new(false, Compression::Zstd, 9);
        assert!(!off.is_enabled());
        assert_eq!(off.algorithm(), Compression::None);
        assert_eq!(off.level(), 0);

        let on = CompressionSetting::new(true, Compression::Zstd, 9);
        assert_eq!(on.algorithm(), Compression::Zstd);
        assert_eq!(on.level(), 9);
    }

    #[test]
    fn test_time_zone_cascade() {
        let server = TimeZone::Named("Asia/Shanghai".into());
        assert_eq!(working_time_zone(true, &server, "Europe/Berlin"), server);
        assert_eq!(
            working_time_zone(false, &server, "Europe/Berlin"),
            TimeZone::Named("Europe/Berlin".into())
        );
        assert_eq!(working_time_zone(false, &server, " "), TimeZone::system_default());

        assert_eq!(date_time_zone(false, &server), None);
        assert_eq!(date_time_zone(true, &server), Some(server));
    }

    #[test]
    fn test_transaction_timeout() {
        assert_eq!(transaction_timeout(0, 30), 30);
        assert_eq!(transaction_timeout(-5, 30), 30);
        assert_eq!(transaction_timeout(10, 30), 10);
    }
}
