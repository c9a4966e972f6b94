//! HR vertical slice.
//!
//! [`EmployeeService`] owns the employee records surface: tenant-scoped
//! listing, form payloads, validated upserts with soft delete, and force
//! delete. Every write appends one activity log entry in the same transaction.

pub mod audit;
mod caller;
pub mod dto;
mod error;
mod service;
pub mod validation;

pub use caller::Caller;
pub use error::{EmployeeError, EmployeeResult};
pub use service::EmployeeService;
