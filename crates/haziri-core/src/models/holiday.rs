use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::ApiError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holiday {
    pub id: i64,
    pub holiday_name: String,
    pub holiday_date: String,
}

impl Holiday {
    /// The calendar date, ignoring any time component the backend appends.
    pub fn date(&self) -> Option<NaiveDate> {
        let date_part = self.holiday_date.get(..10)?;
        NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
    }
}

/// Body of the create and update endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolidayRequest {
    pub holiday_name: String,
    pub holiday_date: String,
}

impl HolidayRequest {
    pub fn new(name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            holiday_name: name.into(),
            holiday_date: date.format("%Y-%m-%d").to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.holiday_name.trim().is_empty() {
            return Err(ApiError::Validation("Holiday name is required".to_string()));
        }
        NaiveDate::parse_from_str(&self.holiday_date, "%Y-%m-%d").map_err(|_| {
            ApiError::Validation(format!(
                "Holiday date '{}' must be YYYY-MM-DD",
                self.holiday_date
            ))
        })?;
        Ok(())
    }
}

/// Holidays on or after `today`, soonest first.
pub fn upcoming(holidays: &[Holiday], today: NaiveDate) -> Vec<&Holiday> {
    let mut upcoming: Vec<(NaiveDate, &Holiday)> = holidays
        .iter()
        .filter_map(|h| h.date().map(|d| (d, h)))
        .filter(|(d, _)| *d >= today)
        .collect();
    upcoming.sort_by_key(|(d, _)| *d);
    upcoming.into_iter().map(|(_, h)| h).collect()
}
