//! Leave approval workflow.

use tracing::info;

use crate::api::{ApiClient, ApiError};
use crate::models::{
    DataTableArg, LeaveBalance, LeaveDecision, LeaveRequest, LeaveStatusUpdate, PagedData,
};

const LEAVES_PATH: &str = "/admin/leaves";

impl ApiClient {
    pub async fn fetch_leave_requests(
        &self,
        arg: &DataTableArg,
    ) -> Result<PagedData<LeaveRequest>, ApiError> {
        arg.validate()?;
        self.post(&format!("{}/request-list", LEAVES_PATH), arg)
            .await?
            .into_data()
    }

    /// Approve or reject a leave request. Returns the id the backend echoes.
    pub async fn decide_leave(&self, id: i64, decision: LeaveDecision) -> Result<i64, ApiError> {
        let body = LeaveStatusUpdate {
            approval_status: decision,
        };
        let updated = self
            .put::<i64, _>(&format!("{}/approve-leaveStatus/{}", LEAVES_PATH, id), &body)
            .await?
            .into_optional()?
            .unwrap_or(id);
        info!(id, ?decision, "Leave request decided");
        Ok(updated)
    }

    pub async fn fetch_leave_balance(
        &self,
        employee_id: i64,
    ) -> Result<Vec<LeaveBalance>, ApiError> {
        Ok(self
            .get(&format!("{}/leave-balance/{}", LEAVES_PATH, employee_id))
            .await?
            .into_optional()?
            .unwrap_or_default())
    }

    /// Leave requests as a spreadsheet (xlsx bytes).
    pub async fn export_leave_requests(&self, arg: &DataTableArg) -> Result<Vec<u8>, ApiError> {
        arg.validate()?;
        self.post_for_bytes(&format!("{}/export-excel", LEAVES_PATH), arg)
            .await
    }
}
