/*!
 * Conversion between SRT timestamps (`HH:MM:SS,mmm`) and seconds.
 */

use crate::errors::SubtitleError;

/// Parse an SRT timestamp into seconds.
///
/// Hours, minutes and seconds must be non-negative integers separated by
/// `:`, with the milliseconds after a `,`. Milliseconds that are missing or
/// unparseable count as zero.
pub fn decode(timestamp: &str) -> Result<f64, SubtitleError> {
    let timestamp = timestamp.trim();
    let mut parts = timestamp.splitn(3, ':');

    let (Some(hours), Some(minutes), Some(rest)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(SubtitleError::format(format!(
            "Invalid timestamp format: {:?}", timestamp
        )));
    };

    let (seconds, millis) = match rest.split_once(',') {
        Some((seconds, millis)) => (seconds, Some(millis)),
        None => (rest, None),
    };

    let hours = parse_field(hours, "hours", timestamp)?;
    let minutes = parse_field(minutes, "minutes", timestamp)?;
    let seconds = parse_field(seconds, "seconds", timestamp)?;
    let millis = millis
        .and_then(|m| m.trim().parse::<u64>().ok())
        .unwrap_or(0);

    // Sum in whole milliseconds so the single division rounds like a decimal literal
    let total_ms = hours
        .checked_mul(3_600_000)
        .and_then(|ms| ms.checked_add(minutes.checked_mul(60_000)?))
        .and_then(|ms| ms.checked_add(seconds.checked_mul(1_000)?))
        .and_then(|ms| ms.checked_add(millis))
        .ok_or_else(|| SubtitleError::format(format!("Timestamp out of range: {:?}", timestamp)))?;

    Ok(total_ms as f64 / 1000.0)
}

/// Format seconds as an SRT timestamp.
///
/// Milliseconds are truncated, never rounded. Negative and non-finite
/// values are rejected; callers clamp before encoding.
pub fn encode(seconds: f64) -> Result<String, SubtitleError> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(SubtitleError::format(format!(
            "Cannot encode {} as a timestamp", seconds
        )));
    }

    // Round to the microsecond first so 1.001 (stored as 1.000999...) keeps its millisecond
    let micros = (seconds * 1_000_000.0).round() as u64;
    let total_ms = micros / 1_000;

    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1_000;
    let millis = total_ms % 1_000;

    Ok(format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis))
}

/// Playback clock shown while previewing (`M:SS`)
pub fn format_clock(seconds: f64) -> String {
    let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
    let whole = seconds.floor() as u64;
    format!("{}:{:02}", whole / 60, whole % 60)
}

fn parse_field(field: &str, name: &str, timestamp: &str) -> Result<u64, SubtitleError> {
    field.trim().parse::<u64>().map_err(|_| {
        SubtitleError::format(format!(
            "Invalid {} in timestamp {:?}", name, timestamp
        ))
    })
}
