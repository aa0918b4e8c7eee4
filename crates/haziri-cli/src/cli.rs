use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use haziri_core::models::table::DEFAULT_PAGE_LENGTH;
use haziri_core::models::ApprovalStatus;

#[derive(Parser)]
#[command(name = "haziri")]
#[command(about = "Haziri admin console - employees, attendance, leave and holidays")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API base URL (overrides config and HAZIRI_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Print raw JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in with phone number and password
    Login(LoginArgs),
    /// Sign out and clear the stored session
    Logout,
    /// Show the signed-in admin
    Whoami {
        /// Re-read the profile from the server first
        #[arg(long)]
        refresh: bool,
    },
    /// Check the stored token with the server
    Validate,
    /// Exchange the refresh token for a new access token now
    Refresh,
    /// Headcount, pending leave and upcoming holidays at a glance
    Summary,
    /// Employee administration
    #[command(subcommand)]
    Employees(EmployeeCommands),
    /// Attendance history
    #[command(subcommand)]
    Attendance(AttendanceCommands),
    /// Leave requests and balances
    #[command(subcommand)]
    Leaves(LeaveCommands),
    /// Holiday calendar
    #[command(subcommand)]
    Holidays(HolidayCommands),
    /// Show the effective configuration
    Config,
}

#[derive(Args)]
pub struct LoginArgs {
    /// Phone number (defaults to the last one used)
    #[arg(short, long)]
    pub phone: Option<String>,
}

#[derive(Args, Clone)]
pub struct PageArgs {
    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    /// Rows per page
    #[arg(long, default_value_t = DEFAULT_PAGE_LENGTH)]
    pub length: u32,
}

#[derive(Subcommand)]
pub enum EmployeeCommands {
    /// List employees
    List {
        #[command(flatten)]
        page: PageArgs,
        /// Filter by name or phone
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show one employee
    Show { id: i64 },
    /// Create an employee
    Create(EmployeeArgs),
    /// Update an employee
    Update {
        id: i64,
        #[command(flatten)]
        employee: EmployeeArgs,
    },
    /// Delete an employee
    Delete { id: i64 },
    /// List assignable roles
    Roles,
    /// List designations, optionally only those for a role
    Designations {
        #[arg(long)]
        role: Option<i64>,
    },
    /// Show your own profile
    Profile,
    /// Update your own profile
    UpdateProfile {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        /// Prompt for a new password
        #[arg(long)]
        change_password: bool,
    },
}

#[derive(Args)]
pub struct EmployeeArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub phone: String,
    #[arg(long)]
    pub gender: String,
    #[arg(long)]
    pub role: i64,
    #[arg(long)]
    pub designation: i64,
    /// Mark the employee inactive
    #[arg(long)]
    pub inactive: bool,
    /// Prompt for a password (always prompted on create)
    #[arg(long)]
    pub set_password: bool,
}

#[derive(Subcommand)]
pub enum AttendanceCommands {
    /// List an employee's check-ins
    List {
        user_id: i64,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Export an employee's attendance to a spreadsheet
    Export {
        user_id: i64,
        #[arg(short, long)]
        output: String,
    },
}

#[derive(Args, Clone, Default)]
pub struct LeaveFilterArgs {
    /// Filter by employee name
    #[arg(short, long)]
    pub search: Option<String>,
    #[arg(long, value_enum)]
    pub status: Option<StatusArg>,
    /// Only leave starting on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,
    /// Only leave ending on or before this date (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StatusArg {
    Pending,
    Approved,
    Rejected,
}

impl From<StatusArg> for ApprovalStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Pending => ApprovalStatus::Pending,
            StatusArg::Approved => ApprovalStatus::Approved,
            StatusArg::Rejected => ApprovalStatus::Rejected,
        }
    }
}

#[derive(Subcommand)]
pub enum LeaveCommands {
    /// List leave requests
    List {
        #[command(flatten)]
        page: PageArgs,
        #[command(flatten)]
        filter: LeaveFilterArgs,
    },
    /// Approve a pending request
    Approve { id: i64 },
    /// Reject a pending request
    Reject { id: i64 },
    /// Show an employee's leave balance
    Balance { employee_id: i64 },
    /// Export leave requests to a spreadsheet
    Export {
        #[arg(short, long)]
        output: String,
        #[command(flatten)]
        filter: LeaveFilterArgs,
    },
}

#[derive(Subcommand)]
pub enum HolidayCommands {
    /// List holidays
    List {
        /// Only holidays from today on
        #[arg(long)]
        upcoming: bool,
    },
    /// Add a holiday
    Add { name: String, date: NaiveDate },
    /// Rename or move a holiday
    Update {
        id: i64,
        name: String,
        date: NaiveDate,
    },
    /// Delete a holiday
    Delete { id: i64 },
}
