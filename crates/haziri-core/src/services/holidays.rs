use tracing::info;

use crate::api::{ApiClient, ApiError};
use crate::models::{Holiday, HolidayRequest};

const HOLIDAYS_PATH: &str = "/admin/holidays";

impl ApiClient {
    pub async fn fetch_holidays(&self) -> Result<Vec<Holiday>, ApiError> {
        Ok(self
            .get(&format!("{}/list", HOLIDAYS_PATH))
            .await?
            .into_optional()?
            .unwrap_or_default())
    }

    /// Create a holiday and return its id.
    pub async fn create_holiday(&self, request: &HolidayRequest) -> Result<i64, ApiError> {
        request.validate()?;
        let id = self
            .post::<i64, _>(&format!("{}/create", HOLIDAYS_PATH), request)
            .await?
            .into_data()?;
        info!(id, name = %request.holiday_name, "Holiday created");
        Ok(id)
    }

    pub async fn update_holiday(&self, id: i64, request: &HolidayRequest) -> Result<bool, ApiError> {
        request.validate()?;
        self.put(&format!("{}/update/{}", HOLIDAYS_PATH, id), request)
            .await?
            .into_data()
    }

    pub async fn delete_holiday(&self, id: i64) -> Result<bool, ApiError> {
        let deleted = self
            .delete::<bool>(&format!("{}/delete/{}", HOLIDAYS_PATH, id))
            .await?
            .into_data()?;
        info!(id, deleted, "Holiday delete requested");
        Ok(deleted)
    }
}
