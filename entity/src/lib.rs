//! SeaORM models backing the HR employee records surface.

pub mod activity_logs;
pub mod employees;
