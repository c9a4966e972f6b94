//! Append-only activity log for employee writes.

use entity::{activity_logs, employees};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    QueryFilter, QueryOrder, prelude::DateTimeWithTimeZone,
};
use serde_json::{Value, json};

use crate::dto::EmployeeStatus;

pub const MODULE: &str = "Employees";
pub const ENTITY_TYPE_ID: i32 = 1420;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActivityKind {
    Created,
    Updated,
    Deleted,
}

impl ActivityKind {
    pub fn id(self) -> i32 {
        match self {
            ActivityKind::Created => 280,
            ActivityKind::Updated => 281,
            ActivityKind::Deleted => 282,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ActivityKind::Created => "Created",
            ActivityKind::Updated => "Updated",
            ActivityKind::Deleted => "Deleted",
        }
    }
}

/// Snapshot stored in `details`.
pub fn snapshot(model: &employees::Model) -> Value {
    json!({
        "id": model.id,
        "company_id": model.company_id,
        "name": model.name,
        "description": model.description,
        "status": EmployeeStatus::of(model).as_str(),
        "deleted_at": model.deleted_at.map(|at| at.to_rfc3339()),
    })
}

/// Write one entry. Callers pass their open transaction so the entry commits
/// or rolls back together with the employee write.
pub async fn append<C>(
    conn: &C,
    kind: ActivityKind,
    actor_id: i64,
    employee: &employees::Model,
    at: DateTimeWithTimeZone,
) -> Result<activity_logs::Model, DbErr>
where
    C: ConnectionTrait,
{
    activity_logs::ActiveModel {
        date_time: Set(at),
        user_id: Set(actor_id),
        module: Set(MODULE.to_string()),
        entity_id: Set(employee.id),
        entity_type_id: Set(ENTITY_TYPE_ID),
        activity_id: Set(kind.id()),
        activity: Set(kind.label().to_string()),
        details: Set(snapshot(employee)),
        ..Default::default()
    }
    .insert(conn)
    .await
}

/// Entries for one employee, newest first.
pub async fn history<C>(conn: &C, employee_id: i64) -> Result<Vec<activity_logs::Model>, DbErr>
where
    C: ConnectionTrait,
{
    activity_logs::Entity::find()
        .filter(activity_logs::Column::Module.eq(MODULE))
        .filter(activity_logs::Column::EntityTypeId.eq(ENTITY_TYPE_ID))
        .filter(activity_logs::Column::EntityId.eq(employee_id))
        .order_by_desc(activity_logs::Column::DateTime)
        .order_by_desc(activity_logs::Column::Id)
        .all(conn)
        .await
}
