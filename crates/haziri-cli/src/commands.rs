//! Subcommand handlers.

use std::io::{self, Write};

use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;
use tracing::warn;

use haziri_core::models::holiday::upcoming;
use haziri_core::models::{
    ApprovalStatus, DataTableArg, EmployeeRequest, HolidayRequest, LeaveDecision, LeaveFilter,
    LoginRequest, UpdateProfile,
};
use haziri_core::{ApiClient, Config};

use crate::cli::{
    AttendanceCommands, Cli, Commands, EmployeeArgs, EmployeeCommands, HolidayCommands,
    LeaveCommands, LeaveFilterArgs, LoginArgs,
};
use crate::format::{
    format_date, format_days, format_phone, format_timestamp, format_worked, truncate_string,
};

/// Width of the name column in tables.
const NAME_WIDTH: usize = 24;

pub async fn run(client: &ApiClient, config: &mut Config, cli: &Cli) -> Result<()> {
    let json = cli.json;
    match &cli.command {
        Commands::Login(args) => login(client, config, args).await,
        Commands::Logout => {
            println!("{}", client.logout().await);
            Ok(())
        }
        Commands::Whoami { refresh } => whoami(client, *refresh, json).await,
        Commands::Validate => {
            client.validate_token().await?;
            println!("Session is valid");
            Ok(())
        }
        Commands::Refresh => {
            client.refresh_session().await?;
            match client.session().expires_at() {
                Some(expiry) => println!(
                    "Session refreshed, valid until {}",
                    expiry.with_timezone(&Local).format("%b %d, %Y %H:%M")
                ),
                None => println!("Session refreshed"),
            }
            Ok(())
        }
        Commands::Summary => summary(client).await,
        Commands::Employees(command) => employees(client, command, json).await,
        Commands::Attendance(command) => attendance(client, command, json).await,
        Commands::Leaves(command) => leaves(client, command, json).await,
        Commands::Holidays(command) => holidays(client, command, json).await,
        Commands::Config => show_config(config),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn prompt_line(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Prompt twice and insist both entries match.
fn prompt_new_password() -> Result<String> {
    let password = rpassword::prompt_password("New password: ")?;
    let confirm = rpassword::prompt_password("Confirm password: ")?;
    if password != confirm {
        anyhow::bail!("Passwords do not match");
    }
    Ok(password)
}

fn write_export(path: &str, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).with_context(|| format!("Failed to write {}", path))?;
    println!("Saved {} bytes to {}", bytes.len(), path);
    Ok(())
}

// ============================================================================
// Session
// ============================================================================

async fn login(client: &ApiClient, config: &mut Config, args: &LoginArgs) -> Result<()> {
    let phone = match args.phone.clone().or_else(|| config.last_phone.clone()) {
        Some(phone) => phone,
        None => prompt_line("Phone: ")?,
    };
    let password = rpassword::prompt_password("Password: ")?;

    let user = client
        .login(&LoginRequest::new(phone.as_str(), password))
        .await?;

    if let Err(e) = config.remember_phone(&phone) {
        warn!(error = %e, "Failed to save config");
    }

    println!("Signed in as {} ({})", user.name, user.designation_name);
    Ok(())
}

async fn whoami(client: &ApiClient, refresh: bool, json: bool) -> Result<()> {
    let user = if refresh {
        client.refresh_current_user().await?
    } else {
        client
            .session()
            .current_user()
            .context("Not signed in. Run `haziri login` first.")?
    };

    if json {
        return print_json(&user);
    }

    println!("Name:        {}", user.name);
    println!("Employee ID: {}", user.employee_id);
    println!("Phone:       {}", format_phone(&user.phone));
    println!("Email:       {}", user.email);
    println!("Designation: {}", user.designation_name);
    let roles = user.roles();
    if !roles.is_empty() {
        println!("Roles:       {}", roles.join(", "));
    }

    let session = client.session();
    match session.expires_at() {
        Some(expiry) => {
            let state = if !session.is_authenticated() {
                "expired"
            } else if session.is_near_expiry() {
                "refresh due"
            } else {
                "active"
            };
            println!(
                "Session:     {} (expires {})",
                state,
                expiry.with_timezone(&Local).format("%b %d, %Y %H:%M")
            );
        }
        None => println!("Session:     none"),
    }
    Ok(())
}

/// Fetch the three dashboard figures concurrently. A token close to expiry
/// is refreshed once and shared by all three requests.
async fn summary(client: &ApiClient) -> Result<()> {
    let pending = LeaveFilter {
        status: Some(ApprovalStatus::Pending),
        ..LeaveFilter::default()
    }
    .to_table_arg(1, 1);
    let first_page = DataTableArg::page(1, 1);

    let (employees, leaves, holidays) = futures::try_join!(
        client.fetch_employees(&first_page),
        client.fetch_leave_requests(&pending),
        client.fetch_holidays(),
    )?;

    let today = Local::now().date_naive();
    let next = upcoming(&holidays, today);

    println!("Employees:          {}", employees.total_records);
    println!("Pending leave:      {}", leaves.total_records);
    match next.first() {
        Some(holiday) => println!(
            "Next holiday:       {} ({})",
            holiday.holiday_name,
            format_date(&holiday.holiday_date)
        ),
        None => println!("Next holiday:       none scheduled"),
    }
    Ok(())
}

// ============================================================================
// Employees
// ============================================================================

fn employee_request(args: &EmployeeArgs, password: Option<String>) -> EmployeeRequest {
    EmployeeRequest {
        name: args.name.clone(),
        designation_id: args.designation,
        employee_role_id: args.role,
        gender: args.gender.clone(),
        phone: args.phone.clone(),
        password,
        is_active: if args.inactive { 0 } else { 1 },
    }
}

async fn employees(client: &ApiClient, command: &EmployeeCommands, json: bool) -> Result<()> {
    match command {
        EmployeeCommands::List { page, search } => {
            let mut arg = DataTableArg::page(page.page, page.length);
            if let Some(search) = search {
                arg = arg.with_filter("searchText", search.as_str());
            }
            let result = client.fetch_employees(&arg).await?;
            if json {
                return print_json(&result);
            }

            println!(
                "{:<6} {:<8} {:<w$} {:<14} {:<20} {:<8}",
                "ID", "EMP#", "NAME", "PHONE", "DESIGNATION", "STATUS",
                w = NAME_WIDTH
            );
            for employee in &result.data {
                println!(
                    "{:<6} {:<8} {:<w$} {:<14} {:<20} {:<8}",
                    employee.id,
                    employee.employee_id,
                    truncate_string(&employee.name, NAME_WIDTH),
                    format_phone(&employee.phone),
                    truncate_string(&employee.designation_name, 20),
                    if employee.active() { "active" } else { "inactive" },
                    w = NAME_WIDTH
                );
            }
            println!(
                "Page {} of {} ({} employees)",
                page.page,
                result.page_count(page.length).max(1),
                result.total_records
            );
        }
        EmployeeCommands::Show { id } => {
            let employee = client.fetch_employee(*id).await?;
            if json {
                return print_json(&employee);
            }
            println!("Name:        {}", employee.name);
            println!("Employee #:  {}", employee.employee_id);
            println!("Code:        {}", employee.employee_code);
            println!("Phone:       {}", format_phone(&employee.phone));
            println!("Gender:      {}", employee.gender);
            println!("Role ID:     {}", employee.employee_role_id);
            println!("Designation: {}", employee.designation_id);
            println!(
                "Status:      {}",
                if employee.is_active != 0 { "active" } else { "inactive" }
            );
        }
        EmployeeCommands::Create(args) => {
            let password = prompt_new_password()?;
            let message = client
                .create_employee(&employee_request(args, Some(password)))
                .await?;
            println!("{}", message);
        }
        EmployeeCommands::Update { id, employee } => {
            let password = if employee.set_password {
                Some(prompt_new_password()?)
            } else {
                None
            };
            let message = client
                .update_employee(*id, &employee_request(employee, password))
                .await?;
            println!("{}", message);
        }
        EmployeeCommands::Delete { id } => {
            println!("{}", client.delete_employee(*id).await?);
        }
        EmployeeCommands::Roles => {
            let roles = client.fetch_roles().await?;
            if json {
                return print_json(&roles);
            }
            for role in roles {
                println!("{:<4} {}", role.id, role.role_name);
            }
        }
        EmployeeCommands::Designations { role } => {
            let designations = match role {
                Some(role_id) => client.fetch_designations_for_role(*role_id).await?,
                None => client.fetch_designations().await?,
            };
            if json {
                return print_json(&designations);
            }
            for designation in designations {
                println!("{:<4} {}", designation.id, designation.name);
            }
        }
        EmployeeCommands::Profile => {
            let profile = client.fetch_profile().await?;
            if json {
                return print_json(&profile);
            }
            println!("Name:        {}", profile.name);
            println!("Email:       {}", profile.email);
            println!("Phone:       {}", format_phone(&profile.phone));
            println!("Designation: {}", profile.designation_name);
        }
        EmployeeCommands::UpdateProfile {
            name,
            email,
            phone,
            change_password,
        } => {
            let password = if *change_password {
                Some(prompt_new_password()?)
            } else {
                None
            };
            let request = UpdateProfile {
                name: name.clone(),
                email: email.clone(),
                phone: phone.clone(),
                password,
            };
            client.update_profile(&request).await?;
            // Keep the stored identity in step with what was just saved
            if let Err(e) = client.refresh_current_user().await {
                warn!(error = %e, "Failed to reload profile");
            }
            println!("Profile updated");
        }
    }
    Ok(())
}

// ============================================================================
// Attendance
// ============================================================================

async fn attendance(client: &ApiClient, command: &AttendanceCommands, json: bool) -> Result<()> {
    match command {
        AttendanceCommands::List { user_id, page } => {
            let arg = DataTableArg::page(page.page, page.length);
            let result = client.fetch_attendance(*user_id, &arg).await?;
            if json {
                return print_json(&result);
            }

            println!("{:<22} {:<22} {:<10} LOCATION", "CHECK IN", "CHECK OUT", "WORKED");
            for record in &result.data {
                let check_out = match record.attendance_out_date_time.as_deref() {
                    Some(out) if !record.is_open() => format_timestamp(out),
                    _ => "(checked in)".to_string(),
                };
                println!(
                    "{:<22} {:<22} {:<10} {:.5}, {:.5}",
                    format_timestamp(&record.attendance_in_date_time),
                    check_out,
                    format_worked(record.worked()),
                    record.latitude,
                    record.longitude
                );
            }
            println!("{} records", result.total_records);
        }
        AttendanceCommands::Export { user_id, output } => {
            let bytes = client
                .export_attendance(*user_id, &DataTableArg::all())
                .await?;
            write_export(output, &bytes)?;
        }
    }
    Ok(())
}

// ============================================================================
// Leave
// ============================================================================

fn leave_filter(args: &LeaveFilterArgs) -> LeaveFilter {
    LeaveFilter {
        search_text: args.search.clone(),
        status: args.status.map(ApprovalStatus::from),
        start_date: args.from,
        end_date: args.to,
    }
}

async fn leaves(client: &ApiClient, command: &LeaveCommands, json: bool) -> Result<()> {
    match command {
        LeaveCommands::List { page, filter } => {
            let arg = leave_filter(filter).to_table_arg(page.page, page.length);
            let result = client.fetch_leave_requests(&arg).await?;
            if json {
                return print_json(&result);
            }

            println!(
                "{:<6} {:<w$} {:<14} {:<14} {:>5} {:<9}",
                "ID", "EMPLOYEE", "FROM", "TO", "DAYS", "STATUS",
                w = NAME_WIDTH
            );
            for leave in &result.data {
                println!(
                    "{:<6} {:<w$} {:<14} {:<14} {:>5} {:<9}",
                    leave.id,
                    truncate_string(&leave.employee_name, NAME_WIDTH),
                    format_date(&leave.start_date),
                    format_date(&leave.end_date),
                    format_days(leave.leave_days),
                    leave.approval_status,
                    w = NAME_WIDTH
                );
            }
            println!("{} requests", result.total_records);
        }
        LeaveCommands::Approve { id } => {
            client.decide_leave(*id, LeaveDecision::Approved).await?;
            println!("Leave request {} approved", id);
        }
        LeaveCommands::Reject { id } => {
            client.decide_leave(*id, LeaveDecision::Rejected).await?;
            println!("Leave request {} rejected", id);
        }
        LeaveCommands::Balance { employee_id } => {
            let balances = client.fetch_leave_balance(*employee_id).await?;
            if json {
                return print_json(&balances);
            }
            println!("{:<16} {:>7} {:>7} {:>7}", "TYPE", "TOTAL", "USED", "LEFT");
            for balance in balances {
                println!(
                    "{:<16} {:>7} {:>7} {:>7}",
                    balance.leave_type,
                    format_days(balance.total_balance),
                    format_days(balance.used()),
                    format_days(balance.balance)
                );
            }
        }
        LeaveCommands::Export { output, filter } => {
            let arg = leave_filter(filter).to_table_arg(1, DataTableArg::all().page_length);
            let bytes = client.export_leave_requests(&arg).await?;
            write_export(output, &bytes)?;
        }
    }
    Ok(())
}

// ============================================================================
// Holidays
// ============================================================================

async fn holidays(client: &ApiClient, command: &HolidayCommands, json: bool) -> Result<()> {
    match command {
        HolidayCommands::List { upcoming: only_upcoming } => {
            let holidays = client.fetch_holidays().await?;
            let today = Local::now().date_naive();
            let shown: Vec<_> = if *only_upcoming {
                upcoming(&holidays, today)
            } else {
                holidays.iter().collect()
            };
            if json {
                return print_json(&shown);
            }
            for holiday in shown {
                println!(
                    "{:<6} {:<14} {}",
                    holiday.id,
                    format_date(&holiday.holiday_date),
                    holiday.holiday_name
                );
            }
        }
        HolidayCommands::Add { name, date } => {
            let id = client
                .create_holiday(&HolidayRequest::new(name.as_str(), *date))
                .await?;
            println!("Added holiday {} ({})", name, id);
        }
        HolidayCommands::Update { id, name, date } => {
            if client
                .update_holiday(*id, &HolidayRequest::new(name.as_str(), *date))
                .await?
            {
                println!("Holiday {} updated", id);
            } else {
                println!("Holiday {} was not changed", id);
            }
        }
        HolidayCommands::Delete { id } => {
            if client.delete_holiday(*id).await? {
                println!("Holiday {} deleted", id);
            } else {
                println!("Holiday {} was not deleted", id);
            }
        }
    }
    Ok(())
}

fn show_config(config: &Config) -> Result<()> {
    println!("API URL:           {}", config.base_url());
    println!("Client type:       {}", config.app_type);
    println!(
        "Refresh threshold: {} minutes",
        config.token_refresh_threshold_minutes
    );
    println!("Request timeout:   {}s", config.request_timeout_secs);
    println!("Session storage:   {:?}", config.storage);
    if let Ok(dir) = config.log_dir() {
        println!("Logs:              {}", dir.display());
    }
    Ok(())
}
