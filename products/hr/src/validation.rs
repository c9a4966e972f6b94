//! Field rules for saving an employee.
//!
//! Messages are user-facing and kept verbatim, spelling included, because
//! existing admin frontends match on them.

use crate::dto::SaveEmployeeInput;

pub const NAME_MIN_CHARS: usize = 3;
pub const NAME_MAX_CHARS: usize = 64;
pub const DESCRIPTION_MAX_CHARS: usize = 255;

pub const NAME_REQUIRED: &str = "Name is Required";
pub const NAME_TOO_SHORT: &str = "Name is Minimum 3 Charachers";
pub const NAME_TOO_LONG: &str = "Name is Maximum 64 Charachers";
pub const NAME_TAKEN: &str = "Name is already taken";
pub const DESCRIPTION_TOO_LONG: &str = "Description is Maximum 255 Charachers";

/// Input after trimming. An empty description is treated as absent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmployeeFields {
    pub name: String,
    pub description: Option<String>,
}

impl EmployeeFields {
    pub fn from_input(input: &SaveEmployeeInput) -> Self {
        Self {
            name: input.name.as_deref().map(str::trim).unwrap_or_default().to_string(),
            description: input
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
        }
    }

    /// Whether the uniqueness lookup should run at all.
    pub fn has_name(&self) -> bool {
        !self.name.is_empty()
    }
}

/// Collects every rule failure in display order. `name_taken` is the result of
/// the storage lookup, which the caller performs only when a name is present.
pub fn validate(fields: &EmployeeFields, name_taken: bool) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if fields.has_name() {
        let length = fields.name.chars().count();
        if length < NAME_MIN_CHARS {
            errors.push(NAME_TOO_SHORT.to_string());
        }
        if length > NAME_MAX_CHARS {
            errors.push(NAME_TOO_LONG.to_string());
        }
        if name_taken {
            errors.push(NAME_TAKEN.to_string());
        }
    } else {
        errors.push(NAME_REQUIRED.to_string());
    }

    if let Some(description) = &fields.description {
        if description.chars().count() > DESCRIPTION_MAX_CHARS {
            errors.push(DESCRIPTION_TOO_LONG.to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
