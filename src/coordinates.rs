//! Geographical co-ordinate helpers.
//!
//! EURING2000 and EURING2000+ store a position as one 15 character string,
//! `±DDMMSS±DDDMMSS` (latitude then longitude, degrees minutes seconds).
//! EURING2020 adds separate signed decimal `latitude` and `longitude` fields
//! and marks the combined field as fifteen dots when those are used.

/// Combined co-ordinates placeholder meaning "see latitude/longitude".
pub const UNKNOWN_COORDINATES: &str = "...............";

/// Width of the combined co-ordinates field.
pub const COORDINATES_WIDTH: usize = 15;

/// Parse a combined co-ordinates string into decimal `(latitude, longitude)`.
///
/// Returns `Ok(None)` for the fifteen-dot placeholder.
///
/// # Errors
///
/// Returns a message when the text is not a valid `±DDMMSS±DDDMMSS` value.
pub fn parse_coordinates(raw: &str) -> Result<Option<(f64, f64)>, String> {
    if raw == UNKNOWN_COORDINATES {
        return Ok(None);
    }
    let invalid = || format!("Value \"{raw}\" is not a valid set of coordinates.");
    if raw.len() != COORDINATES_WIDTH || !raw.is_ascii() {
        return Err(invalid());
    }
    let (latitude, longitude) = raw.split_at(7);
    let latitude = parse_component(latitude, 2, 90).ok_or_else(invalid)?;
    let longitude = parse_component(longitude, 3, 180).ok_or_else(invalid)?;
    Ok(Some((latitude, longitude)))
}

/// Parse one signed DMS component (`±DDMMSS` or `±DDDMMSS`) to decimal degrees.
fn parse_component(value: &str, degree_digits: usize, max_degrees: u32) -> Option<f64> {
    if value.len() != 1 + degree_digits + 4 {
        return None;
    }
    let negative = match value.as_bytes()[0] {
        b'+' => false,
        b'-' => true,
        _ => return None,
    };
    let digits = &value[1..];
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let degrees: u32 = digits[..degree_digits].parse().ok()?;
    let minutes: u32 = digits[degree_digits..degree_digits + 2].parse().ok()?;
    let seconds: u32 = digits[degree_digits + 2..].parse().ok()?;
    if degrees > max_degrees || minutes > 59 || seconds > 59 {
        return None;
    }
    let magnitude = f64::from(degrees) + f64::from(minutes) / 60.0 + f64::from(seconds) / 3600.0;
    Some(if negative { -magnitude } else { magnitude })
}

/// Format decimal latitude and longitude as a combined co-ordinates string.
///
/// Seconds are rounded to the nearest whole second, carrying into minutes and
/// degrees when they round up to 60.
#[must_use]
pub fn format_coordinates(latitude: f64, longitude: f64) -> String {
    format!(
        "{}{}",
        format_component(latitude, 2),
        format_component(longitude, 3)
    )
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn format_component(value: f64, degree_digits: usize) -> String {
    let sign = if value < 0.0 { '-' } else { '+' };
    let magnitude = value.abs();
    let mut degrees = magnitude.trunc() as u32;
    let fractional_minutes = magnitude.fract() * 60.0;
    let mut minutes = fractional_minutes.trunc() as u32;
    let mut seconds = (fractional_minutes.fract() * 60.0).round() as u32;
    if seconds == 60 {
        seconds = 0;
        minutes += 1;
    }
    if minutes == 60 {
        minutes = 0;
        degrees += 1;
    }
    format!("{sign}{degrees:0degree_digits$}{minutes:02}{seconds:02}")
}

/// Render a decimal degree value with four decimals, as EURING2020 stores it.
///
/// Never produces a negative zero.
#[must_use]
pub fn format_decimal_degrees(value: f64) -> String {
    let rendered = format!("{value:.4}");
    match rendered.strip_prefix('-') {
        Some(magnitude) if magnitude.chars().all(|c| c == '0' || c == '.') => magnitude.to_string(),
        _ => rendered,
    }
}

/// Parse a decimal degree string as stored in the EURING2020 latitude and
/// longitude fields.
#[must_use]
pub fn parse_decimal_degrees(raw: &str) -> Option<f64> {
    if raw.is_empty() || raw.starts_with('+') {
        return None;
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}
