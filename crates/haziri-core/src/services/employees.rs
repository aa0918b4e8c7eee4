//! Employee administration endpoints.

use serde_json::Value;
use tracing::info;

use crate::api::{ApiClient, ApiError};
use crate::models::{
    DataTableArg, Designation, EmployeeDetail, EmployeeListItem, EmployeeProfile,
    EmployeeRequest, PagedData, Role, UpdateProfile,
};

const EMPLOYEES_PATH: &str = "/admin/employees";

impl ApiClient {
    /// One page of the employee table.
    pub async fn fetch_employees(
        &self,
        arg: &DataTableArg,
    ) -> Result<PagedData<EmployeeListItem>, ApiError> {
        arg.validate()?;
        self.post(&format!("{}/list", EMPLOYEES_PATH), arg)
            .await?
            .into_data()
    }

    /// Every employee, unpaged. Used to populate pickers.
    pub async fn fetch_all_employees(&self) -> Result<Vec<EmployeeListItem>, ApiError> {
        Ok(self
            .get(&format!("{}/all-list", EMPLOYEES_PATH))
            .await?
            .into_optional()?
            .unwrap_or_default())
    }

    pub async fn fetch_employee(&self, id: i64) -> Result<EmployeeDetail, ApiError> {
        self.get(&format!("{}/{}", EMPLOYEES_PATH, id))
            .await?
            .into_data()
    }

    /// Create an employee, returning the server's confirmation message.
    pub async fn create_employee(&self, request: &EmployeeRequest) -> Result<String, ApiError> {
        request.validate_create()?;
        let message = self
            .post::<Value, _>(&format!("{}/create", EMPLOYEES_PATH), request)
            .await?
            .into_message()?;
        info!(name = %request.name, "Employee created");
        Ok(message)
    }

    pub async fn update_employee(
        &self,
        id: i64,
        request: &EmployeeRequest,
    ) -> Result<String, ApiError> {
        request.validate_update()?;
        let message = self
            .put::<Value, _>(&format!("{}/{}/update", EMPLOYEES_PATH, id), request)
            .await?
            .into_message()?;
        info!(id, "Employee updated");
        Ok(message)
    }

    pub async fn delete_employee(&self, id: i64) -> Result<String, ApiError> {
        let message = self
            .delete::<Value>(&format!("{}/{}/delete", EMPLOYEES_PATH, id))
            .await?
            .into_message()?;
        info!(id, "Employee deleted");
        Ok(message)
    }

    pub async fn fetch_designations(&self) -> Result<Vec<Designation>, ApiError> {
        Ok(self
            .get(&format!("{}/get-designations", EMPLOYEES_PATH))
            .await?
            .into_optional()?
            .unwrap_or_default())
    }

    /// Designations available to employees of the given role.
    pub async fn fetch_designations_for_role(
        &self,
        role_id: i64,
    ) -> Result<Vec<Designation>, ApiError> {
        Ok(self
            .get(&format!("{}/get-designation/{}", EMPLOYEES_PATH, role_id))
            .await?
            .into_optional()?
            .unwrap_or_default())
    }

    pub async fn fetch_roles(&self) -> Result<Vec<Role>, ApiError> {
        Ok(self
            .get(&format!("{}/get-roles", EMPLOYEES_PATH))
            .await?
            .into_optional()?
            .unwrap_or_default())
    }

    pub async fn fetch_profile(&self) -> Result<EmployeeProfile, ApiError> {
        self.get(&format!("{}/profile", EMPLOYEES_PATH))
            .await?
            .into_data()
    }

    /// Update the signed-in admin's own profile.
    pub async fn update_profile(&self, request: &UpdateProfile) -> Result<bool, ApiError> {
        request.validate()?;
        let updated = self
            .put::<bool, _>(&format!("{}/update-profile", EMPLOYEES_PATH), request)
            .await?
            .into_optional()?
            .unwrap_or(true);
        Ok(updated)
    }
}
