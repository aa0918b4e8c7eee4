use crate::api::{ApiClient, ApiError};
use crate::models::{AttendanceRecord, DataTableArg, PagedData};

// The backend spells the resource "attandance".
const ATTENDANCE_PATH: &str = "/admin/attandance";

impl ApiClient {
    /// One page of an employee's attendance history.
    pub async fn fetch_attendance(
        &self,
        user_id: i64,
        arg: &DataTableArg,
    ) -> Result<PagedData<AttendanceRecord>, ApiError> {
        arg.validate()?;
        self.post(&format!("{}/list/{}", ATTENDANCE_PATH, user_id), arg)
            .await?
            .into_data()
    }

    /// Attendance history as a spreadsheet (xlsx bytes).
    pub async fn export_attendance(
        &self,
        user_id: i64,
        arg: &DataTableArg,
    ) -> Result<Vec<u8>, ApiError> {
        arg.validate()?;
        self.post_for_bytes(&format!("{}/export-excel/{}", ATTENDANCE_PATH, user_id), arg)
            .await
    }
}
