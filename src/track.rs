//! Track builder: one vessel's reports, coerced and time ordered

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};
use log::debug;

use crate::error::SchemaError;
use crate::model::{NavigationalStatus, PositionReport, Track};
use crate::table::{RawRow, RawTable};

/// Naive layouts tried after RFC 3339 and RFC 2822, all read as UTC.
const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
    "%d/%m/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Build the time ordered track of `vessel_id` from the raw table.
///
/// The schema is checked once for the whole table. Rows whose timestamp,
/// latitude or longitude is absent or unparseable are left out of the track
/// and only counted in [`Track::dropped`]. Coordinates outside [-90, 90] and
/// [-180, 180] count as absent. An unknown vessel gives an empty track.
pub fn build_track(table: &RawTable, vessel_id: u64) -> Result<Track, SchemaError> {
    let missing = table.missing_columns();
    if !missing.is_empty() {
        return Err(SchemaError { missing });
    }

    let mut track = Track::empty(vessel_id);

    for row in table.decoded_rows() {
        if row.mmsi != Some(vessel_id) {
            continue;
        }

        match coerce_row(vessel_id, row) {
            Some(pos) => track.points.push(pos),
            None => track.dropped += 1,
        }
    }

    // sort_by_key is stable, equal timestamps keep the input order
    track.points.sort_by_key(|p| p.timestamp);

    debug!(
        "mmsi {}: {} positions, {} rows dropped",
        vessel_id,
        track.points.len(),
        track.dropped
    );

    Ok(track)
}

fn coerce_row(mmsi: u64, row: RawRow) -> Option<PositionReport> {
    let timestamp = row.timestamp.and_then(parse_timestamp)?;
    let latitude = row
        .latitude
        .filter(|lat| lat.is_finite() && (-90.0..=90.0).contains(lat))?;
    let longitude = row
        .longitude
        .filter(|lon| lon.is_finite() && (-180.0..=180.0).contains(lon))?;

    Some(PositionReport {
        mmsi,
        latitude,
        longitude,
        timestamp,
        speed: row.speed.filter(|v| v.is_finite()),
        course: row.course.filter(|v| v.is_finite()),
        navigation_status: row.navigation_status.and_then(NavigationalStatus::parse),
    })
}

/// Parse a timestamp cell: seconds since the epoch, or a date-time string.
///
/// Anything else is absent rather than an error, as are instants outside
/// the years 0 to 9999 that RFC 3339 can write back.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    parse_any_timestamp(raw.trim()).filter(|dt| (0..=9999).contains(&dt.year()))
}

fn parse_any_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if raw.is_empty() {
        return None;
    }

    if let Ok(secs) = raw.parse::<i64>() {
        return Utc.timestamp_opt(secs, 0).single();
    }

    if let Ok(secs) = raw.parse::<f64>() {
        return from_fractional_secs(secs);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn from_fractional_secs(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() || secs.abs() > i64::MAX as f64 {
        return None;
    }

    let whole = secs.floor();
    let nanos = ((secs - whole) * 1e9).round().min(999_999_999.0) as u32;

    Utc.timestamp_opt(whole as i64, nanos).single()
}
