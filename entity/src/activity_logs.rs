use sea_orm::prelude::{DateTimeWithTimeZone, *};
use serde::Serialize;

/// Append-only audit record. `entity_id` is a weak link: rows outlive the
/// entity they describe.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "activity_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub date_time: DateTimeWithTimeZone,
    pub user_id: i64,
    pub module: String,
    pub entity_id: i64,
    pub entity_type_id: i32,
    pub activity_id: i32,
    pub activity: String,
    pub details: Json,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
