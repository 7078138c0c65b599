use chrono::{DateTime, FixedOffset, Utc};

use crate::{Platform, RawTimestamp, ReconcileError};

/// Offset-carrying layouts accepted after RFC 3339 fails.
const STEIN_FALLBACK_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
];

/// Converts each platform's timestamp representation into absolute UTC epoch
/// seconds so the two sides can be compared directly.
#[derive(Clone, Copy, Debug, Default)]
pub struct TimestampNormalizer;

impl TimestampNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Parse `raw` into UTC epoch seconds. Sub-second precision is dropped.
    pub fn parse(&self, raw: &RawTimestamp) -> Result<i64, ReconcileError> {
        match raw {
            RawTimestamp::EpochSeconds(secs) => {
                if *secs < 0 {
                    return Err(malformed(Platform::Divera, raw, "negative epoch seconds"));
                }
                Ok(*secs)
            }
            RawTimestamp::Iso8601(s) => {
                let dt = parse_with_offset(s.trim())
                    .ok_or_else(|| malformed(Platform::Stein, raw, "expected ISO-8601 with UTC offset"))?;
                Ok(dt.with_timezone(&Utc).timestamp())
            }
        }
    }
}

fn parse_with_offset(s: &str) -> Option<DateTime<FixedOffset>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    STEIN_FALLBACK_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
}

fn malformed(platform: Platform, raw: &RawTimestamp, reason: &str) -> ReconcileError {
    ReconcileError::MalformedTimestamp {
        platform,
        raw: raw.clone(),
        reason: reason.to_string(),
    }
}
