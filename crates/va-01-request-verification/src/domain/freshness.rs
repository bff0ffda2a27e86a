//! Replay window on the payload's `request.timestamp`.

use super::errors::RejectionReason;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Parse an RFC 3339 request timestamp.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, RejectionReason> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| RejectionReason::EmptyOrMalformedBody)
}

/// Reject when `|now - timestamp| > tolerance`. Skew equal to the tolerance passes.
pub fn check_freshness(
    timestamp: DateTime<Utc>,
    now: DateTime<Utc>,
    tolerance: Duration,
) -> Result<(), RejectionReason> {
    let skew = (now - timestamp)
        .abs()
        .to_std()
        .map_err(|_| RejectionReason::StaleTimestamp)?;

    if skew > tolerance {
        return Err(RejectionReason::StaleTimestamp);
    }
    Ok(())
}
