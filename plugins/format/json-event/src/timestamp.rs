use chrono::{DateTime, Utc};

use row_api::DecodeError;

/// Display pattern of timestamp columns, always UTC.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse an RFC 3339 timestamp with an explicit offset
/// (`2021-01-01T00:00:00.000Z`, `2021-01-01T02:00:00+02:00`) and print
/// it as `yyyy-MM-dd HH:mm:ss` in UTC. Sub-second precision is dropped.
///
/// Looser than a strict `yyyy-MM-ddTHH:mm:ss.SSSZZ` parser: the fraction
/// is optional, a space may replace `T`, and second `60` is accepted as a
/// leap second.
pub fn reformat(raw: &str) -> Result<String, DecodeError> {
    let parsed = DateTime::parse_from_rfc3339(raw).map_err(|_| DecodeError::InvalidTimestamp {
        raw: raw.to_string(),
    })?;
    Ok(parsed.with_timezone(&Utc).format(DISPLAY_FORMAT).to_string())
}
