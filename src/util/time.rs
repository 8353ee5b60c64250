//! Input-boundary time helpers for the external collaborator.
//!
//! The scheduling core deals in minutes since midnight only; rejecting
//! malformed `HH:MM` strings happens here, before a `Flight` is built.

/// Parse an `HH:MM` string into minutes since midnight.
///
/// # Errors
///
/// Returns a message for malformed or out-of-range input.
pub fn parse_hhmm(input: &str) -> Result<u16, String> {
    let (h, m) = input
        .split_once(':')
        .ok_or_else(|| format!("expected HH:MM, got `{input}`"))?;
    let hours: u16 = h
        .parse()
        .map_err(|_| format!("invalid hours in `{input}`"))?;
    let minutes: u16 = m
        .parse()
        .map_err(|_| format!("invalid minutes in `{input}`"))?;
    if hours > 23 {
        return Err(format!("hours out of range in `{input}`"));
    }
    if minutes > 59 {
        return Err(format!("minutes out of range in `{input}`"));
    }
    Ok(hours * 60 + minutes)
}

/// Format minutes since midnight as `HH:MM`.
#[must_use]
pub fn format_minutes(minutes: u16) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}
