use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One check-in/check-out pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub user_id: i64,
    pub user_name: String,
    pub attendance_in_date_time: String,
    pub attendance_out_date_time: Option<String>,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

impl AttendanceRecord {
    /// Still checked in (no check-out recorded).
    pub fn is_open(&self) -> bool {
        self.attendance_out_date_time
            .as_deref()
            .map(|s| s.trim().is_empty())
            .unwrap_or(true)
    }

    /// Time between check-in and check-out, when both parse.
    pub fn worked(&self) -> Option<chrono::Duration> {
        let check_in = parse_timestamp(&self.attendance_in_date_time)?;
        let check_out = parse_timestamp(self.attendance_out_date_time.as_deref()?)?;
        Some(check_out - check_in)
    }
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.naive_utc())
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").ok())
        .or_else(|| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").ok())
}
