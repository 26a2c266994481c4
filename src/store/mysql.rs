use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::MySqlPool;
use tracing::error;

use super::{AttendanceStore, EmployeeStore, StoreError, UniqueKey};
use crate::model::attendance::{AttendanceDraft, AttendanceRecord};
use crate::model::employee::{Employee, EmployeeDraft, EmployeeRow};

const EMPLOYEE_SELECT: &str = r#"
    SELECT id, username, password_hash, name, email, phone, role, is_active, created_at, updated_at
    FROM employees
"#;

const ATTENDANCE_SELECT: &str = r#"
    SELECT id, employee_id, date, is_present, start_time, end_time, bills_count, remarks,
           base_payment, incentive, total_salary, created_at, updated_at
    FROM attendance
"#;

/// sqlx-backed store. Uniqueness comes from `uq_employees_username`,
/// `uq_employees_email` and `uq_attendance_employee_date`.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn backend(e: sqlx::Error) -> StoreError {
    error!(error = %e, "Database error");
    StoreError::Backend(e.to_string())
}

/// The violated index name when `e` is a unique-constraint failure.
fn unique_violation(e: &sqlx::Error) -> Option<String> {
    match e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            Some(violated_index(db_err.message()).to_string())
        }
        _ => None,
    }
}

/// MySQL reports `Duplicate entry '<value>' for key '<index>'`; only the
/// index part is trusted, the value is client input.
fn violated_index(message: &str) -> &str {
    message
        .rsplit_once("for key")
        .map_or(message, |(_, index)| index)
        .trim()
        .trim_matches('\'')
}

fn employee_key(index: &str) -> UniqueKey {
    if index.ends_with("uq_employees_email") {
        UniqueKey::Email
    } else {
        UniqueKey::Username
    }
}

fn employee_from_row(row: EmployeeRow) -> Result<Employee, StoreError> {
    Employee::try_from(row).map_err(StoreError::Backend)
}

#[async_trait]
impl EmployeeStore for MySqlStore {
    async fn insert(&self, draft: &EmployeeDraft) -> Result<Employee, StoreError> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO employees
            (username, password_hash, name, email, phone, role, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&draft.username)
        .bind(&draft.password_hash)
        .bind(&draft.name)
        .bind(&draft.email)
        .bind(&draft.phone)
        .bind(draft.role.as_ref())
        .bind(draft.is_active)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some(index) => StoreError::DuplicateKey(employee_key(&index)),
            None => backend(e),
        })?;

        let id = result.last_insert_id();
        EmployeeStore::find_by_id(self, id)
            .await?
            .ok_or_else(|| StoreError::Backend(format!("employee {id} missing after insert")))
    }

    async fn find_by_id(&self, id: u64) -> Result<Option<Employee>, StoreError> {
        let sql = format!("{EMPLOYEE_SELECT} WHERE id = ?");
        sqlx::query_as::<_, EmployeeRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?
            .map(employee_from_row)
            .transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Employee>, StoreError> {
        let sql = format!("{EMPLOYEE_SELECT} WHERE username = ?");
        sqlx::query_as::<_, EmployeeRow>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?
            .map(employee_from_row)
            .transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Employee>, StoreError> {
        let sql = format!("{EMPLOYEE_SELECT} WHERE email = ?");
        sqlx::query_as::<_, EmployeeRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?
            .map(employee_from_row)
            .transpose()
    }
}

fn attendance_write_error(e: sqlx::Error) -> StoreError {
    if unique_violation(&e).is_some() {
        StoreError::DuplicateKey(UniqueKey::EmployeeDate)
    } else {
        backend(e)
    }
}

#[async_trait]
impl AttendanceStore for MySqlStore {
    async fn insert(&self, draft: &AttendanceDraft) -> Result<AttendanceRecord, StoreError> {
        let entry = draft.entry();
        let pay = draft.payroll();
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO attendance
            (employee_id, date, is_present, start_time, end_time, bills_count, remarks,
             base_payment, incentive, total_salary, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(draft.employee_id())
        .bind(entry.date)
        .bind(entry.is_present)
        .bind(entry.start_time)
        .bind(entry.end_time)
        .bind(pay.bills_count)
        .bind(&entry.remarks)
        .bind(pay.base_payment)
        .bind(pay.incentive)
        .bind(pay.total_salary)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(attendance_write_error)?;

        let id = result.last_insert_id();
        AttendanceStore::find_by_id(self, id)
            .await?
            .ok_or_else(|| StoreError::Backend(format!("attendance {id} missing after insert")))
    }

    async fn update(
        &self,
        id: u64,
        draft: &AttendanceDraft,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        let entry = draft.entry();
        let pay = draft.payroll();

        sqlx::query(
            r#"
            UPDATE attendance
            SET employee_id = ?, date = ?, is_present = ?, start_time = ?, end_time = ?,
                bills_count = ?, remarks = ?, base_payment = ?, incentive = ?,
                total_salary = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(draft.employee_id())
        .bind(entry.date)
        .bind(entry.is_present)
        .bind(entry.start_time)
        .bind(entry.end_time)
        .bind(pay.bills_count)
        .bind(&entry.remarks)
        .bind(pay.base_payment)
        .bind(pay.incentive)
        .bind(pay.total_salary)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(attendance_write_error)?;

        // MySQL reports unchanged rows as unaffected, so re-read instead.
        AttendanceStore::find_by_id(self, id).await
    }

    async fn find_by_id(&self, id: u64) -> Result<Option<AttendanceRecord>, StoreError> {
        let sql = format!("{ATTENDANCE_SELECT} WHERE id = ?");
        sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)
    }

    async fn find_by_employee_and_date(
        &self,
        employee_id: u64,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        let sql = format!("{ATTENDANCE_SELECT} WHERE employee_id = ? AND date = ?");
        sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(employee_id)
            .bind(date)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)
    }

    async fn find_by_employee(
        &self,
        employee_id: u64,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let sql = format!("{ATTENDANCE_SELECT} WHERE employee_id = ? ORDER BY date DESC");
        sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(employee_id)
            .fetch_all(&self.pool)
            .await
            .map_err(backend)
    }

    async fn find_by_employee_and_range(
        &self,
        employee_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let sql = format!(
            "{ATTENDANCE_SELECT} WHERE employee_id = ? AND date BETWEEN ? AND ? ORDER BY date ASC"
        );
        sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(employee_id)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await
            .map_err(backend)
    }

    async fn delete_by_id(&self, id: u64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM attendance WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use rstest::rstest;

    #[rstest]
    #[case(
        "Duplicate entry 'ana' for key 'employees.uq_employees_username'",
        UniqueKey::Username
    )]
    #[case(
        "Duplicate entry 'ana@x.com' for key 'employees.uq_employees_email'",
        UniqueKey::Email
    )]
    #[case(
        "Duplicate entry 'email_fan' for key 'uq_employees_username'",
        UniqueKey::Username
    )]
    fn duplicate_key_is_read_from_the_index_name(#[case] message: &str, #[case] key: UniqueKey) {
        assert_eq!(employee_key(violated_index(message)), key);
    }

    #[test]
    fn index_name_is_unquoted() {
        assert_eq!(
            violated_index("Duplicate entry '7-2024-03-05' for key 'attendance.uq_attendance_employee_date'"),
            "attendance.uq_attendance_employee_date"
        );
    }

    #[actix_web::test]
    async fn one_pool_backs_both_stores() {
        let pool = MySqlPool::connect_lazy("mysql://attendance@localhost/attendance").unwrap();
        let store = MySqlStore::new(pool);

        let _employees: &dyn EmployeeStore = &store;
        let _attendance: &dyn AttendanceStore = &store;
        let _state = AppState::mysql(store);
    }

    #[test]
    fn usernames_compare_case_sensitively() {
        let schema = include_str!(
            "../../migrations/20240301000000_create_employees_and_attendance.sql"
        );
        let username = schema
            .lines()
            .find(|line| line.trim_start().starts_with("username"))
            .unwrap();

        assert!(username.contains("COLLATE utf8mb4_bin"), "{username}");
    }
}
