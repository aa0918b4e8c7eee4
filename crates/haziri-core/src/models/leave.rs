//! Leave request workflow models.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::table::DataTableArg;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "Pending",
            ApprovalStatus::Approved => "Approved",
            ApprovalStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// The only transitions an admin can make on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaveDecision {
    Approved,
    Rejected,
}

impl From<LeaveDecision> for ApprovalStatus {
    fn from(decision: LeaveDecision) -> Self {
        match decision {
            LeaveDecision::Approved => ApprovalStatus::Approved,
            LeaveDecision::Rejected => ApprovalStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveStatusUpdate {
    pub approval_status: LeaveDecision,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub id: i64,
    pub employee_id: i64,
    pub employee_name: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub request_date: String,
    pub leave_days: f64,
    #[serde(default)]
    pub leave_description: String,
    pub approval_status: ApprovalStatus,
    #[serde(default)]
    pub balance: f64,
}

impl LeaveRequest {
    pub fn is_pending(&self) -> bool {
        self.approval_status == ApprovalStatus::Pending
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveBalance {
    pub leave_type: String,
    pub total_balance: f64,
    pub balance: f64,
    #[serde(default)]
    pub days: Option<f64>,
}

impl LeaveBalance {
    pub fn used(&self) -> f64 {
        (self.total_balance - self.balance).max(0.0)
    }
}

/// Filters accepted by the leave request list.
#[derive(Debug, Clone, Default)]
pub struct LeaveFilter {
    pub search_text: Option<String>,
    pub status: Option<ApprovalStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl LeaveFilter {
    pub fn to_table_arg(&self, page_no: u32, page_length: u32) -> DataTableArg {
        let mut arg = DataTableArg::page(page_no, page_length);
        if let Some(ref text) = self.search_text {
            arg = arg.with_filter("searchText", text.as_str());
        }
        if let Some(status) = self.status {
            arg = arg.with_filter("approvalStatus", status.as_str());
        }
        if let Some(date) = self.start_date {
            arg = arg.with_filter("startDate", date.format("%Y-%m-%d").to_string());
        }
        if let Some(date) = self.end_date {
            arg = arg.with_filter("endDate", date.format("%Y-%m-%d").to_string());
        }
        arg
    }
}
