//! Enumerated option kinds
//!
//! Every kind has a canonical textual name (`as_str`) that is used for
//! property input, `Display` and serde. Parsing is case-insensitive.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ClientError, Result};

fn parse_variant<T: Copy>(all: &[T], name: fn(&T) -> &'static str, text: &str, kind: &str) -> Result<T> {
    let text = text.trim();
    all.iter().copied().find(|v| name(v).eq_ignore_ascii_case(text)).ok_or_else(|| {
        let expected: Vec<_> = all.iter().map(name).collect();
        ClientError::invalid_input(format!("Unknown {kind} '{text}', expected one of {expected:?}"))
    })
}

/// Compression algorithm used on the wire
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Compression {
    #[default]
    None,
    Brotli,
    Bz2,
    Deflate,
    Gzip,
    Lz4,
    Lzma,
    Snappy,
    Xz,
    Zstd,
}

impl Compression {
    pub const ALL: &'static [Self] = &[
        Self::None,
        Self::Brotli,
        Self::Bz2,
        Self::Deflate,
        Self::Gzip,
        Self::Lz4,
        Self::Lzma,
        Self::Snappy,
        Self::Xz,
        Self::Zstd,
    ];

    /// Get the canonical algorithm name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Brotli => "BROTLI",
            Self::Bz2 => "BZ2",
            Self::Deflate => "DEFLATE",
            Self::Gzip => "GZIP",
            Self::Lz4 => "LZ4",
            Self::Lzma => "LZMA",
            Self::Snappy => "SNAPPY",
            Self::Xz => "XZ",
            Self::Zstd => "ZSTD",
        }
    }

    /// HTTP `Content-Encoding` token, if the algorithm has one
    #[must_use]
    pub const fn encoding(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Brotli => Some("br"),
            Self::Bz2 => Some("bz2"),
            Self::Deflate => Some("deflate"),
            Self::Gzip => Some("gzip"),
            Self::Lz4 => Some("lz4"),
            Self::Lzma => Some("lzma"),
            Self::Snappy => Some("snappy"),
            Self::Xz => Some("xz"),
            Self::Zstd => Some("zstd"),
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Compression {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        parse_variant(Self::ALL, Self::as_str, s, "compression")
    }
}

/// Data format of request and response bodies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataFormat {
    #[default]
    TabSeparated,
    TabSeparatedRaw,
    TabSeparatedWithNames,
    TabSeparatedWithNamesAndTypes,
    CSV,
    CSVWithNames,
    JSON,
    JSONEachRow,
    JSONCompactEachRow,
    Native,
    RowBinary,
    RowBinaryWithNames,
    RowBinaryWithNamesAndTypes,
    Parquet,
    Arrow,
    ORC,
    Values,
    Pretty,
}

impl DataFormat {
    pub const ALL: &'static [Self] = &[
        Self::TabSeparated,
        Self::TabSeparatedRaw,
        Self::TabSeparatedWithNames,
        Self::TabSeparatedWithNamesAndTypes,
        Self::CSV,
        Self::CSVWithNames,
        Self::JSON,
        Self::JSONEachRow,
        Self::JSONCompactEachRow,
        Self::Native,
        Self::RowBinary,
        Self::RowBinaryWithNames,
        Self::RowBinaryWithNamesAndTypes,
        Self::Parquet,
        Self::Arrow,
        Self::ORC,
        Self::Values,
        Self::Pretty,
    ];

    /// Get the format name as understood by the server
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TabSeparated => "TabSeparated",
            Self::TabSeparatedRaw => "TabSeparatedRaw",
            Self::TabSeparatedWithNames => "TabSeparatedWithNames",
            Self::TabSeparatedWithNamesAndTypes => "TabSeparatedWithNamesAndTypes",
            Self::CSV => "CSV",
            Self::CSVWithNames => "CSVWithNames",
            Self::JSON => "JSON",
            Self::JSONEachRow => "JSONEachRow",
            Self::JSONCompactEachRow => "JSONCompactEachRow",
            Self::Native => "Native",
            Self::RowBinary => "RowBinary",
            Self::RowBinaryWithNames => "RowBinaryWithNames",
            Self::RowBinaryWithNamesAndTypes => "RowBinaryWithNamesAndTypes",
            Self::Parquet => "Parquet",
            Self::Arrow => "Arrow",
            Self::ORC => "ORC",
            Self::Values => "Values",
            Self::Pretty => "Pretty",
        }
    }

    /// Whether the format is binary rather than text
    #[must_use]
    pub const fn is_binary(&self) -> bool {
        matches!(
            self,
            Self::Native
                | Self::RowBinary
                | Self::RowBinaryWithNames
                | Self::RowBinaryWithNamesAndTypes
                | Self::Parquet
                | Self::Arrow
                | Self::ORC
        )
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataFormat {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        parse_variant(Self::ALL, Self::as_str, s, "format")
    }
}

/// Buffering strategy for request or response streams
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BufferingMode {
    /// Fixed-size buffer queue, lowest memory footprint
    #[default]
    ResourceEfficient,
    /// Grow the buffer queue under load
    Performance,
    /// Buffer sizes and queue length taken from options as-is
    Custom,
}

impl BufferingMode {
    pub const ALL: &'static [Self] = &[Self::ResourceEfficient, Self::Performance, Self::Custom];

    /// Get the canonical mode name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ResourceEfficient => "RESOURCE_EFFICIENT",
            Self::Performance => "PERFORMANCE",
            Self::Custom => "CUSTOM",
        }
    }
}

impl fmt::Display for BufferingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BufferingMode {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        parse_variant(Self::ALL, Self::as_str, s, "buffering mode")
    }
}

/// SSL verification mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SslMode {
    /// Trust any certificate
    None,
    /// Verify certificate chain and host name
    #[default]
    Strict,
}

impl SslMode {
    pub const ALL: &'static [Self] = &[Self::None, Self::Strict];

    /// Get the canonical mode name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Strict => "STRICT",
        }
    }
}

impl fmt::Display for SslMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SslMode {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        parse_variant(Self::ALL, Self::as_str, s, "ssl mode")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serialization() {
        assert_eq!(serde_json::to_string(&Compression::Lz4).unwrap(), r#""LZ4""#);
        assert_eq!(serde_json::to_string(&DataFormat::RowBinary).unwrap(), r#""RowBinary""#);
        assert_eq!(
            serde_json::to_string(&BufferingMode::ResourceEfficient).unwrap(),
            r#""RESOURCE_EFFICIENT""#
        );
        assert_eq!(serde_json::to_string(&SslMode::Strict).unwrap(), r#""STRICT""#);
    }

    #[test]
    fn test_serde_matches_display() {
        for c in Compression::ALL {
            assert_eq!(serde_json::to_string(c).unwrap(), format!("\"{c}\""));
        }
        for f in DataFormat::ALL {
            assert_eq!(serde_json::to_string(f).unwrap(), format!("\"{f}\""));
        }
        for b in BufferingMode::ALL {
            assert_eq!(serde_json::to_string(b).unwrap(), format!("\"{b}\""));
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("zstd".parse::<Compression>().unwrap(), Compression::Zstd);
        assert_eq!(" Lz4 ".parse::<Compression>().unwrap(), Compression::Lz4);
        assert_eq!("jsoneachrow".parse::<DataFormat>().unwrap(), DataFormat::JSONEachRow);
        assert_eq!("performance".parse::<BufferingMode>().unwrap(), BufferingMode::Performance);
        assert_eq!("none".parse::<SslMode>().unwrap(), SslMode::None);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "snappier".parse::<Compression>().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert!(err.message().contains("snappier"));
    }

    #[test]
    fn test_format_binary() {
        assert!(DataFormat::RowBinaryWithNamesAndTypes.is_binary());
        assert!(!DataFormat::TabSeparated.is_binary());
        assert!(!DataFormat::JSONEachRow.is_binary());
    }

    #[test]
    fn test_compression_encoding() {
        assert_eq!(Compression::None.encoding(), None);
        assert_eq!(Compression::Gzip.encoding(), Some("gzip"));
        assert_eq!(Compression::Brotli.encoding(), Some("br"));
    }
}
