//! Data models for the Haziri admin backend.
//!
//! This module contains the wire types for every endpoint the console uses:
//!
//! - `LoginRequest`, `LoginResponse`, `EmployeeInfo`: authentication and the
//!   signed-in identity
//! - `EmployeeListItem`, `EmployeeDetail`, `EmployeeRequest`: employee CRUD
//! - `AttendanceRecord`: attendance reporting
//! - `LeaveRequest`, `LeaveBalance`, `LeaveDecision`: the leave approval workflow
//! - `Holiday`, `HolidayRequest`: the holiday calendar
//! - `DataTableArg`, `PagedData`: paging shared by the list endpoints
//!
//! Request types carry `validate` methods so malformed input is rejected
//! before any network call.

pub mod attendance;
pub mod auth;
pub mod employee;
pub mod holiday;
pub mod leave;
pub mod table;

pub use attendance::AttendanceRecord;
pub use auth::{
    EmployeeInfo, EmployeeProfile, LoginRequest, LoginResponse, RefreshTokenRequest,
    UpdateProfile,
};
pub use employee::{Designation, EmployeeDetail, EmployeeListItem, EmployeeRequest, Role};
pub use holiday::{Holiday, HolidayRequest};
pub use leave::{
    ApprovalStatus, LeaveBalance, LeaveDecision, LeaveFilter, LeaveRequest, LeaveStatusUpdate,
};
pub use table::{DataTableArg, PagedData};
