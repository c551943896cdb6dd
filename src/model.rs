use chrono::{DateTime, Utc};

/// AIS navigational status, resolved from the numeric code of the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationalStatus {
    UnderWayEngine,
    Anchor,
    NotUnderCommand,
    Restricted,
    Constrained,
    Moored,
    Aground,
    Fishing,
    Sailing,
    // 9, 10 and 13 share one label, the code is kept for export.
    Reserved(ReservedCode),
    TowingAstern,
    PushingAhead,
    AisSart,
    Undefined,
    Other(i64),
}

/// One of the reserved codes 9, 10 or 13, only built by [`NavigationalStatus::from_code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservedCode(u8);

impl ReservedCode {
    pub fn get(&self) -> u8 {
        self.0
    }
}

impl NavigationalStatus {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::UnderWayEngine,
            1 => Self::Anchor,
            2 => Self::NotUnderCommand,
            3 => Self::Restricted,
            4 => Self::Constrained,
            5 => Self::Moored,
            6 => Self::Aground,
            7 => Self::Fishing,
            8 => Self::Sailing,
            9 => Self::Reserved(ReservedCode(9)),
            10 => Self::Reserved(ReservedCode(10)),
            11 => Self::TowingAstern,
            12 => Self::PushingAhead,
            13 => Self::Reserved(ReservedCode(13)),
            14 => Self::AisSart,
            15 => Self::Undefined,
            other => Self::Other(other),
        }
    }

    /// Resolve a raw status cell, either a numeric code or one of the fixed labels.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        if let Ok(code) = raw.parse::<i64>() {
            return Some(Self::from_code(code));
        }

        (0..=15)
            .map(Self::from_code)
            .find(|status| status.label().eq_ignore_ascii_case(raw))
    }

    pub fn code(&self) -> i64 {
        match self {
            Self::UnderWayEngine => 0,
            Self::Anchor => 1,
            Self::NotUnderCommand => 2,
            Self::Restricted => 3,
            Self::Constrained => 4,
            Self::Moored => 5,
            Self::Aground => 6,
            Self::Fishing => 7,
            Self::Sailing => 8,
            Self::Reserved(code) => i64::from(code.get()),
            Self::TowingAstern => 11,
            Self::PushingAhead => 12,
            Self::AisSart => 14,
            Self::Undefined => 15,
            Self::Other(code) => *code,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::UnderWayEngine => "Under way using engine",
            Self::Anchor => "At anchor",
            Self::NotUnderCommand => "Not under command",
            Self::Restricted => "Restricted maneuverability",
            Self::Constrained => "Constrained by her draft",
            Self::Moored => "Moored",
            Self::Aground => "Aground",
            Self::Fishing => "Engaged in fishing",
            Self::Sailing => "Under way sailing",
            Self::Reserved(_) => "Reserved for future use",
            Self::TowingAstern => "Power-driven vessel towing astern",
            Self::PushingAhead => "Power-driven vessel pushing ahead",
            Self::AisSart => "AIS-SART (Search and Rescue)",
            Self::Undefined | Self::Other(_) => "Undefined",
        }
    }
}

/// One position report of a vessel, after coercion of the raw row.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionReport {
    pub mmsi: u64,
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
    /// Speed over ground in knots
    pub speed: Option<f64>,
    /// Course over ground in degrees
    pub course: Option<f64>,
    pub navigation_status: Option<NavigationalStatus>,
}

/// Time ordered positions of a single vessel.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub mmsi: u64,
    pub points: Vec<PositionReport>,
    /// Rows of this vessel excluded for a missing timestamp or coordinate
    pub dropped: usize,
}

impl Track {
    pub fn empty(mmsi: u64) -> Self {
        Self {
            mmsi,
            points: vec![],
            dropped: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Start marker
    pub fn start(&self) -> Option<&PositionReport> {
        self.points.first()
    }

    /// End marker
    pub fn end(&self) -> Option<&PositionReport> {
        self.points.last()
    }

    /// Polyline of (latitude, longitude) pairs, in time order.
    pub fn path(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .map(|p| (p.latitude, p.longitude))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedPoint {
    pub report: PositionReport,
    /// Absolute course difference with the previous point, 0 for the first one
    pub course_change: f64,
    pub is_abnormal: bool,
}

impl AnnotatedPoint {
    pub fn navigation_status_label(&self) -> Option<&'static str> {
        self.report.navigation_status.map(|s| s.label())
    }

    pub fn status(&self) -> &'static str {
        if self.is_abnormal {
            "Abnormal"
        } else {
            "Normal"
        }
    }
}
