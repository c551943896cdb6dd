//! Anomaly annotation of a track

use serde::Deserialize;

use crate::model::{AnnotatedPoint, Track};

pub const DEFAULT_SPEED_KNOTS: f64 = 20.0;
pub const DEFAULT_COURSE_CHANGE_DEGREES: f64 = 45.0;

/// Limits above which a point is flagged as abnormal.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnomalyThresholds {
    /// Speed over ground, in knots
    pub speed_knots: f64,
    /// Course change between consecutive points, in degrees
    pub course_change_degrees: f64,
}

impl Default for AnomalyThresholds {
    fn default() -> Self {
        Self {
            speed_knots: DEFAULT_SPEED_KNOTS,
            course_change_degrees: DEFAULT_COURSE_CHANGE_DEGREES,
        }
    }
}

impl AnomalyThresholds {
    pub fn is_abnormal(&self, speed: f64, course_change: f64) -> bool {
        speed > self.speed_knots || course_change > self.course_change_degrees
    }
}

/// Annotate with the default thresholds, 20 knots and 45 degrees.
pub fn annotate(track: &Track) -> Vec<AnnotatedPoint> {
    annotate_with(track, &AnomalyThresholds::default())
}

/// Annotate every point of the track, in order.
///
/// Absent speed and course read as 0. The first point has no course change.
pub fn annotate_with(track: &Track, thresholds: &AnomalyThresholds) -> Vec<AnnotatedPoint> {
    let mut previous_course = match track.start() {
        Some(first) => first.course.unwrap_or(0.0),
        None => return vec![],
    };

    track
        .points
        .iter()
        .map(|report| {
            let course = report.course.unwrap_or(0.0);
            let course_change = (course - previous_course).abs();
            previous_course = course;

            AnnotatedPoint {
                is_abnormal: thresholds.is_abnormal(report.speed.unwrap_or(0.0), course_change),
                report: report.clone(),
                course_change,
            }
        })
        .collect()
}
