//! CSV export of an annotated track, in the input column layout

use std::io::Write;

use chrono::SecondsFormat;
use csv::Writer;
use serde::Serialize;

use crate::model::AnnotatedPoint;

const HEADER: [&str; 10] = [
    "MMSI",
    "Latitude",
    "Longitude",
    "Timestamp",
    "Speed",
    "Course",
    "Navigation Status",
    "Navigation Status Label",
    "Course Change",
    "Abnormal",
];

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "MMSI")]
    mmsi: u64,
    #[serde(rename = "Latitude")]
    latitude: f64,
    #[serde(rename = "Longitude")]
    longitude: f64,
    #[serde(rename = "Timestamp")]
    timestamp: String,
    #[serde(rename = "Speed")]
    speed: Option<f64>,
    #[serde(rename = "Course")]
    course: Option<f64>,
    #[serde(rename = "Navigation Status")]
    navigation_status: Option<i64>,
    #[serde(rename = "Navigation Status Label")]
    navigation_status_label: Option<&'a str>,
    #[serde(rename = "Course Change")]
    course_change: f64,
    #[serde(rename = "Abnormal")]
    abnormal: bool,
}

impl<'a> From<&'a AnnotatedPoint> for ExportRow<'a> {
    fn from(point: &'a AnnotatedPoint) -> Self {
        let report = &point.report;

        Self {
            mmsi: report.mmsi,
            latitude: report.latitude,
            longitude: report.longitude,
            timestamp: report
                .timestamp
                .to_rfc3339_opts(SecondsFormat::AutoSi, true),
            speed: report.speed,
            course: report.course,
            navigation_status: report.navigation_status.map(|s| s.code()),
            navigation_status_label: point.navigation_status_label(),
            course_change: point.course_change,
            abnormal: point.is_abnormal,
        }
    }
}

/// Write the points, header first, and flush the writer.
///
/// An empty slice still writes the header.
pub fn write_track<W>(mut wtr: Writer<W>, points: &[AnnotatedPoint]) -> Result<(), csv::Error>
where
    W: Write,
{
    if points.is_empty() {
        // serialize writes the header with the first row only
        wtr.write_record(HEADER)?;
    }

    for point in points {
        wtr.serialize(ExportRow::from(point))?;
    }

    wtr.flush()?;

    Ok(())
}
