use std::str::FromStr;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{AppError, FieldError};
use crate::model::role::Role;

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 50;
pub const PASSWORD_MIN_LEN: usize = 4;
pub const NAME_MAX_LEN: usize = 100;

/// A directory entry. Holds the password hash and is not `Serialize`; render
/// it through [`EmployeeProfile`].
#[derive(Debug, Clone, PartialEq)]
pub struct Employee {
    pub id: u64,
    pub username: String,
    pub password_hash: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row shape of the `employees` table; `role` is stored as its lowercase name.
#[derive(Debug, sqlx::FromRow)]
pub struct EmployeeRow {
    pub id: u64,
    pub username: String,
    pub password_hash: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = String;

    fn try_from(row: EmployeeRow) -> Result<Self, Self::Error> {
        let role = Role::from_str(&row.role)
            .map_err(|_| format!("employee {} has unknown role {:?}", row.id, row.role))?;

        Ok(Self {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            name: row.name,
            email: row.email,
            phone: row.phone,
            role,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// What a store needs to create an employee; the secret is already hashed.
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeDraft {
    pub username: String,
    pub password_hash: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Role,
    pub is_active: bool,
}

impl EmployeeDraft {
    pub fn to_employee(&self, id: u64, now: DateTime<Utc>) -> Employee {
        Employee {
            id,
            username: self.username.clone(),
            password_hash: self.password_hash.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            role: self.role,
            is_active: self.is_active,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Registration input with a plaintext password.
#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub username: String,
    pub password: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Role,
}

impl NewEmployee {
    /// Trims and lower-cases where the directory stores normalized values;
    /// blank optional fields become `None`.
    pub fn normalized(self) -> Self {
        Self {
            username: self.username.trim().to_string(),
            password: self.password,
            name: self.name.trim().to_string(),
            email: non_blank(self.email).map(|e| e.to_lowercase()),
            phone: non_blank(self.phone),
            role: self.role,
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = credential_errors(&self.username, &self.password);

        let name_len = self.name.chars().count();
        if name_len == 0 {
            errors.push(FieldError::new("name", "Name is required"));
        } else if name_len > NAME_MAX_LEN {
            errors.push(FieldError::new("name", "Name must be less than 100 characters"));
        }

        if let Some(email) = &self.email {
            if !looks_like_email(email) {
                errors.push(FieldError::new("email", "Please provide a valid email"));
            }
        }

        if let Some(phone) = &self.phone {
            if !looks_like_phone(phone) {
                errors.push(FieldError::new("phone", "Please provide a valid phone number"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(errors))
        }
    }
}

/// Shape checks shared by login and registration.
pub fn credential_errors(username: &str, password: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    let username_len = username.trim().chars().count();

    if username_len == 0 {
        errors.push(FieldError::new("username", "Username is required"));
    } else if username_len < USERNAME_MIN_LEN {
        errors.push(FieldError::new("username", "Username must be at least 3 characters"));
    } else if username_len > USERNAME_MAX_LEN {
        errors.push(FieldError::new("username", "Username must be at most 50 characters"));
    }

    if password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    } else if password.chars().count() < PASSWORD_MIN_LEN {
        errors.push(FieldError::new("password", "Password must be at least 4 characters"));
    }

    errors
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    let word = "[A-Za-z0-9_]";
    let pattern = format!(r"^{word}+([.-]?{word}+)*@{word}+([.-]?{word}+)*(\.{word}{{2,3}})+$");
    Regex::new(&pattern).expect("valid email regex")
});

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9+\-\s()]+$").expect("valid phone regex"));

fn looks_like_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

fn looks_like_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

/// Outward representation of an employee. Never carries the credential.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeProfile {
    #[schema(example = 7)]
    pub id: u64,
    #[schema(example = "jdoe")]
    pub username: String,
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "john.doe@company.com")]
    pub email: Option<String>,
    #[schema(example = "+8801712345678")]
    pub phone: Option<String>,
    pub role: Role,
    pub is_active: bool,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

impl From<&Employee> for EmployeeProfile {
    fn from(employee: &Employee) -> Self {
        Self {
            id: employee.id,
            username: employee.username.clone(),
            name: employee.name.clone(),
            email: employee.email.clone(),
            phone: employee.phone.clone(),
            role: employee.role,
            is_active: employee.is_active,
            created_at: employee.created_at,
        }
    }
}

/// Who a listed record belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EmployeeRef {
    #[schema(example = 7)]
    pub id: u64,
    #[schema(example = "jdoe")]
    pub username: String,
    #[schema(example = "John Doe")]
    pub name: String,
}

impl From<&Employee> for EmployeeRef {
    fn from(employee: &Employee) -> Self {
        Self {
            id: employee.id,
            username: employee.username.clone(),
            name: employee.name.clone(),
        }
    }
}
