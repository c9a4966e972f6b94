//! Request and response shapes for the employee records surface.

use entity::employees;
use platform_authz::Permission;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};

use crate::Caller;

/// Shown in listings when an employee has no description.
pub const DESCRIPTION_PLACEHOLDER: &str = "--";
pub const DEFAULT_PAGE_LENGTH: u64 = 10;
pub const MAX_PAGE_LENGTH: u64 = 100;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmployeeStatus {
    #[default]
    Active,
    Inactive,
}

impl EmployeeStatus {
    pub fn of(model: &employees::Model) -> Self {
        if model.is_active() {
            EmployeeStatus::Active
        } else {
            EmployeeStatus::Inactive
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EmployeeStatus::Active => "Active",
            EmployeeStatus::Inactive => "Inactive",
        }
    }

    /// Colour of the status dot next to the name in listings.
    pub fn indicator(self) -> &'static str {
        match self {
            EmployeeStatus::Active => "green",
            EmployeeStatus::Inactive => "red",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusFilter {
    Active,
    Inactive,
}

impl StatusFilter {
    /// `"1"` selects active rows, `"0"` inactive ones; anything else is no filter.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        match raw.map(str::trim) {
            Some("1") => Some(StatusFilter::Active),
            Some("0") => Some(StatusFilter::Inactive),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortColumn {
    #[default]
    Id,
    Name,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct EmployeeListQuery {
    pub name: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub start: Option<u64>,
    pub length: Option<u64>,
    #[serde(default)]
    pub order_by: SortColumn,
    #[serde(default)]
    pub order_dir: SortDirection,
    pub draw: Option<u64>,
}

impl EmployeeListQuery {
    pub fn status_filter(&self) -> Option<StatusFilter> {
        StatusFilter::parse(self.status.as_deref())
    }

    pub fn name_filter(&self) -> Option<&str> {
        non_blank(self.name.as_deref())
    }

    pub fn search_term(&self) -> Option<&str> {
        non_blank(self.search.as_deref())
    }

    pub fn offset(&self) -> u64 {
        self.start.unwrap_or(0)
    }

    pub fn limit(&self) -> u64 {
        self.length
            .unwrap_or(DEFAULT_PAGE_LENGTH)
            .clamp(1, MAX_PAGE_LENGTH)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draw: Option<u64>,
    pub records_total: u64,
    pub records_filtered: u64,
    pub data: Vec<EmployeeRow>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RowActions {
    pub edit: bool,
    pub delete: bool,
}

impl RowActions {
    pub fn for_caller(caller: &Caller) -> Self {
        Self {
            edit: caller.grants.can(Permission::EditEmployee),
            delete: caller.grants.can(Permission::DeleteEmployee),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EmployeeRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub status: EmployeeStatus,
    pub status_indicator: &'static str,
    pub actions: RowActions,
}

impl EmployeeRow {
    pub fn from_model(model: employees::Model, actions: RowActions) -> Self {
        let status = EmployeeStatus::of(&model);
        Self {
            id: model.id,
            name: model.name,
            description: model
                .description
                .unwrap_or_else(|| DESCRIPTION_PLACEHOLDER.to_string()),
            status,
            status_indicator: status.indicator(),
            actions,
        }
    }
}

/// Full record as edited in the form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EmployeeRecord {
    pub id: Option<i64>,
    pub company_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub status: EmployeeStatus,
    pub created_by_id: Option<i64>,
    pub created_at: Option<DateTimeWithTimeZone>,
    pub updated_by_id: Option<i64>,
    pub updated_at: Option<DateTimeWithTimeZone>,
    pub deleted_by_id: Option<i64>,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

impl From<employees::Model> for EmployeeRecord {
    fn from(model: employees::Model) -> Self {
        let status = EmployeeStatus::of(&model);
        Self {
            id: Some(model.id),
            company_id: Some(model.company_id),
            name: model.name,
            description: model.description,
            status,
            created_by_id: model.created_by_id,
            created_at: model.created_at,
            updated_by_id: model.updated_by_id,
            updated_at: model.updated_at,
            deleted_by_id: model.deleted_by_id,
            deleted_at: model.deleted_at,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum FormMode {
    Add,
    Edit,
}

#[derive(Clone, Debug, Serialize)]
pub struct EmployeeForm {
    pub employee: EmployeeRecord,
    pub action: FormMode,
}

/// Body of the save endpoint. Unknown fields (a client-sent `company_id`
/// included) are ignored; the tenant always comes from the caller.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SaveEmployeeInput {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub status: EmployeeStatus,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SaveOutcome {
    pub success: bool,
    pub message: &'static str,
    pub id: i64,
    #[serde(skip)]
    pub created: bool,
}

impl SaveOutcome {
    pub fn new(id: i64, created: bool) -> Self {
        let message = if created {
            "Employee Added Successfully"
        } else {
            "Employee Updated Successfully"
        };
        Self {
            success: true,
            message,
            id,
            created,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeleteOutcome {
    pub success: bool,
    pub message: &'static str,
}

impl Default for DeleteOutcome {
    fn default() -> Self {
        Self {
            success: true,
            message: "Employee Deleted Successfully",
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct DeleteEmployeeInput {
    pub id: i64,
}
