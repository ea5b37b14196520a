use std::fmt;
use std::str::FromStr;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    New,
    MissingLatest,
    Stopped,
    Growth,
    Decline,
    Irregular,
    Stable,
    InsufficientData,
}

impl Status {
    pub const ALL: [Status; 8] = [
        Status::New,
        Status::MissingLatest,
        Status::Stopped,
        Status::Growth,
        Status::Decline,
        Status::Irregular,
        Status::Stable,
        Status::InsufficientData,
    ];

    /// Stable identifier, safe to persist or match on.
    pub fn id(self) -> &'static str {
        match self {
            Status::New => "NEW",
            Status::MissingLatest => "MISSING_LATEST",
            Status::Stopped => "STOPPED",
            Status::Growth => "GROWTH",
            Status::Decline => "DECLINE",
            Status::Irregular => "IRREGULAR",
            Status::Stable => "STABLE",
            Status::InsufficientData => "INSUFFICIENT_DATA",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::New => "🆕 New client",
            Status::MissingLatest => "🟠 Missing this month",
            Status::Stopped => "🔴 Stopped buying",
            Status::Growth => "🟢 Growth",
            Status::Decline => "🟡 Decline",
            Status::Irregular => "🟣 Irregular",
            Status::Stable => "🔵 Stable",
            Status::InsufficientData => "⚪ Insufficient data",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Status::New => "#17a2b8",
            Status::MissingLatest => "#ffa500",
            Status::Stopped => "#ff4b4b",
            Status::Growth => "#28a745",
            Status::Decline => "#ffc107",
            Status::Irregular => "#6f42c1",
            Status::Stable => "#1f77b4",
            Status::InsufficientData => "#adb5bd",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_");
        Status::ALL
            .into_iter()
            .find(|status| status.id().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| {
                let known: Vec<&str> = Status::ALL.iter().map(|s| s.id()).collect();
                format!("unknown status '{}', expected one of {}", s, known.join(", "))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classification {
    pub status: Status,
    /// Index of the newest period with activity; only set for `Stopped`.
    pub last_active: Option<usize>,
}

impl Classification {
    pub fn of(status: Status) -> Self {
        Self {
            status,
            last_active: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SalesRow {
    pub manager: String,
    pub client: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedRow {
    pub manager: String,
    pub client: String,
    pub values: Vec<f64>,
    pub classification: Classification,
}

impl ClassifiedRow {
    pub fn status(&self) -> Status {
        self.classification.status
    }
}

#[derive(Debug, Clone)]
pub struct StatusSummary {
    pub status: Status,
    pub count: usize,
    pub share: f64,
}

#[derive(Debug, Clone)]
pub struct ManagerTotal {
    pub manager: String,
    pub status: Status,
    pub total: f64,
}
