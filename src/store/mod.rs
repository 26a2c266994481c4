//! Persistence seam. Both adapters enforce the same unique keys and report a
//! losing write as [`StoreError::DuplicateKey`].

use async_trait::async_trait;
use chrono::NaiveDate;
use derive_more::Display;

use crate::model::attendance::{AttendanceDraft, AttendanceRecord};
use crate::model::employee::{Employee, EmployeeDraft};

pub mod memory;
pub mod mysql;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum UniqueKey {
    #[display(fmt = "employees.username")]
    Username,
    #[display(fmt = "employees.email")]
    Email,
    #[display(fmt = "attendance.(employee_id, date)")]
    EmployeeDate,
}

#[derive(Debug, Display)]
pub enum StoreError {
    #[display(fmt = "duplicate key on {}", _0)]
    DuplicateKey(UniqueKey),

    #[display(fmt = "store failure: {}", _0)]
    Backend(String),
}

impl std::error::Error for StoreError {}

#[async_trait]
pub trait EmployeeStore: Send + Sync {
    async fn insert(&self, draft: &EmployeeDraft) -> Result<Employee, StoreError>;

    async fn find_by_id(&self, id: u64) -> Result<Option<Employee>, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<Employee>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Employee>, StoreError>;
}

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    async fn insert(&self, draft: &AttendanceDraft) -> Result<AttendanceRecord, StoreError>;

    /// Overwrites every mutable column of record `id`. `Ok(None)` if it no
    /// longer exists.
    async fn update(
        &self,
        id: u64,
        draft: &AttendanceDraft,
    ) -> Result<Option<AttendanceRecord>, StoreError>;

    async fn find_by_id(&self, id: u64) -> Result<Option<AttendanceRecord>, StoreError>;

    async fn find_by_employee_and_date(
        &self,
        employee_id: u64,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, StoreError>;

    /// Newest first.
    async fn find_by_employee(&self, employee_id: u64)
    -> Result<Vec<AttendanceRecord>, StoreError>;

    /// Inclusive on both ends, oldest first.
    async fn find_by_employee_and_range(
        &self,
        employee_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, StoreError>;

    /// `Ok(false)` if nothing was deleted.
    async fn delete_by_id(&self, id: u64) -> Result<bool, StoreError>;
}
