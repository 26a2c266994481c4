use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::{
    auth::{access::authorize, auth::AuthEmployee},
    error::AppError,
    model::{
        attendance::{AttendanceDraft, AttendanceEntry, AttendanceRecord},
        summary::{MonthWindow, MonthlySummary},
    },
    store::AttendanceStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Attendance records with payroll derived on every write.
///
/// All writes go through [`AttendanceDraft::new`], which validates the entry
/// and computes pay from its current values; nothing else reaches the store.
#[derive(Clone)]
pub struct AttendanceService {
    store: Arc<dyn AttendanceStore>,
}

impl AttendanceService {
    pub fn new(store: Arc<dyn AttendanceStore>) -> Self {
        Self { store }
    }

    /// Writes the day for `employee_id`, creating it or overwriting it in
    /// place. A concurrent insert that wins the unique key surfaces as
    /// `Conflict`.
    pub async fn upsert(
        &self,
        employee_id: u64,
        entry: AttendanceEntry,
    ) -> Result<(AttendanceRecord, UpsertOutcome), AppError> {
        let draft = AttendanceDraft::new(employee_id, entry)?;
        let date = draft.entry().date;

        if let Some(existing) = self
            .store
            .find_by_employee_and_date(employee_id, date)
            .await?
        {
            let record = self
                .store
                .update(existing.id, &draft)
                .await?
                .ok_or_else(|| AppError::NotFound("Attendance record not found".to_string()))?;
            debug!(employee_id, %date, id = record.id, "Attendance updated");
            return Ok((record, UpsertOutcome::Updated));
        }

        let record = self.store.insert(&draft).await?;
        info!(employee_id, %date, id = record.id, "Attendance created");
        Ok((record, UpsertOutcome::Created))
    }

    pub async fn find_by_id(&self, id: u64) -> Result<Option<AttendanceRecord>, AppError> {
        Ok(self.store.find_by_id(id).await?)
    }

    pub async fn find_by_employee(
        &self,
        employee_id: u64,
    ) -> Result<Vec<AttendanceRecord>, AppError> {
        Ok(self.store.find_by_employee(employee_id).await?)
    }

    pub async fn find_by_employee_and_range(
        &self,
        employee_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, AppError> {
        Ok(self
            .store
            .find_by_employee_and_range(employee_id, start, end)
            .await?)
    }

    pub async fn delete_by_id(&self, id: u64) -> Result<(), AppError> {
        if self.store.delete_by_id(id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound("Attendance record not found".to_string()))
        }
    }

    /// Loads a record the actor may act on. Absence is checked before
    /// ownership so the two stay distinguishable.
    async fn owned_record(
        &self,
        actor: &AuthEmployee,
        id: u64,
    ) -> Result<AttendanceRecord, AppError> {
        let record = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Attendance record not found".to_string()))?;
        authorize(actor, record.employee_id)?;
        Ok(record)
    }

    /// Replaces every mutable field of record `id`, including its date; the
    /// owner never changes.
    pub async fn update(
        &self,
        actor: &AuthEmployee,
        id: u64,
        entry: AttendanceEntry,
    ) -> Result<AttendanceRecord, AppError> {
        let current = self.owned_record(actor, id).await?;
        let draft = AttendanceDraft::new(current.employee_id, entry)?;

        let record = self
            .store
            .update(id, &draft)
            .await?
            .ok_or_else(|| AppError::NotFound("Attendance record not found".to_string()))?;
        info!(id, actor = actor.employee_id, "Attendance record updated");
        Ok(record)
    }

    pub async fn delete(&self, actor: &AuthEmployee, id: u64) -> Result<(), AppError> {
        self.owned_record(actor, id).await?;
        self.delete_by_id(id).await?;
        info!(id, actor = actor.employee_id, "Attendance record deleted");
        Ok(())
    }

    pub async fn list_for(
        &self,
        actor: &AuthEmployee,
        employee_id: u64,
    ) -> Result<Vec<AttendanceRecord>, AppError> {
        authorize(actor, employee_id)?;
        self.find_by_employee(employee_id).await
    }

    /// The month's records (oldest first) and their summary.
    pub async fn monthly(
        &self,
        actor: &AuthEmployee,
        employee_id: u64,
        window: MonthWindow,
    ) -> Result<(Vec<AttendanceRecord>, MonthlySummary), AppError> {
        authorize(actor, employee_id)?;
        let records = self
            .find_by_employee_and_range(employee_id, window.first_day(), window.last_day())
            .await?;
        let summary = MonthlySummary::summarize(&window, &records);
        Ok((records, summary))
    }
}
