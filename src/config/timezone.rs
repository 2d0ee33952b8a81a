//! Time zones used when reading and writing temporal values
//!
//! A zone is either an IANA name kept verbatim (resolution of the rules is
//! left to the codec layer) or a fixed UTC offset.

use chrono::{FixedOffset, Local, Offset, Utc};
use std::fmt;

/// A named or fixed-offset time zone
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TimeZone {
    /// IANA zone identifier, e.g. `Asia/Shanghai`
    Named(String),
    /// Fixed offset from UTC
    Fixed(FixedOffset),
}

impl TimeZone {
    #[must_use]
    pub fn utc() -> Self {
        Self::Fixed(Utc.fix())
    }

    /// Parse a zone id; `None` when the text is blank
    ///
    /// Accepts `UTC`/`GMT`/`Z`, offsets such as `+08:00`, `-0530`, `+8`,
    /// offsets prefixed with `UTC` or `GMT`, and otherwise keeps the text as
    /// an IANA name.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let id = text.trim();
        if id.is_empty() {
            return None;
        }
        if ["UTC", "GMT", "UCT", "Z", "Zulu", "Etc/UTC", "Etc/GMT"].iter().any(|u| u.eq_ignore_ascii_case(id)) {
            return Some(Self::utc());
        }

        let offset = strip_prefix_ignore_case(id, "UTC")
            .or_else(|| strip_prefix_ignore_case(id, "GMT"))
            .unwrap_or(id);
        if let Some(fixed) = parse_offset(offset) {
            return Some(Self::Fixed(fixed));
        }
        Some(Self::Named(id.to_string()))
    }

    /// Process-local default zone
    ///
    /// The `TZ` environment variable when set and non-blank, otherwise the
    /// current local UTC offset.
    #[must_use]
    pub fn system_default() -> Self {
        std::env::var("TZ")
            .ok()
            .and_then(|tz| Self::parse(tz.trim_start_matches(':')))
            .unwrap_or_else(|| Self::Fixed(Local::now().offset().fix()))
    }

    /// Zone id: the IANA name, `UTC`, or an offset like `+08:00`
    #[must_use]
    pub fn id(&self) -> String {
        match self {
            Self::Named(name) => name.clone(),
            Self::Fixed(offset) if offset.local_minus_utc() == 0 => "UTC".to_string(),
            Self::Fixed(offset) => offset.to_string(),
        }
    }

    /// The fixed offset, if this zone has one
    #[must_use]
    pub const fn fixed_offset(&self) -> Option<FixedOffset> {
        match self {
            Self::Named(_) => None,
            Self::Fixed(offset) => Some(*offset),
        }
    }
}

impl fmt::Display for TimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &text[prefix.len()..])
}

fn parse_offset(text: &str) -> Option<FixedOffset> {
    let sign = match text.as_bytes().first()? {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let body = &text[1..];
    if !body.is_ascii() {
        return None;
    }
    let (hours, minutes) = match body.split_once(':') {
        Some((h, m)) => (h, m),
        None if body.len() == 4 => body.split_at(2),
        None => (body, "0"),
    };
    if hours.is_empty() || !hours.bytes().chain(minutes.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 18 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
