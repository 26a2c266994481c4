use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use super::{AttendanceStore, EmployeeStore, StoreError, UniqueKey};
use crate::model::attendance::{AttendanceDraft, AttendanceRecord};
use crate::model::employee::{Employee, EmployeeDraft};

/// In-process store used when no database is configured and by the tests.
/// The `(employee_id, date)` index mirrors the MySQL unique key.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    last_employee_id: u64,
    employees: BTreeMap<u64, Employee>,
    last_attendance_id: u64,
    attendance: BTreeMap<u64, AttendanceRecord>,
    by_day: HashMap<(u64, NaiveDate), u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl EmployeeStore for MemoryStore {
    async fn insert(&self, draft: &EmployeeDraft) -> Result<Employee, StoreError> {
        let mut tables = self.write()?;

        for existing in tables.employees.values() {
            if existing.username == draft.username {
                return Err(StoreError::DuplicateKey(UniqueKey::Username));
            }
            if draft.email.is_some() && existing.email == draft.email {
                return Err(StoreError::DuplicateKey(UniqueKey::Email));
            }
        }

        tables.last_employee_id += 1;
        let employee = draft.to_employee(tables.last_employee_id, Utc::now());
        tables.employees.insert(employee.id, employee.clone());
        Ok(employee)
    }

    async fn find_by_id(&self, id: u64) -> Result<Option<Employee>, StoreError> {
        Ok(self.read()?.employees.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Employee>, StoreError> {
        Ok(self
            .read()?
            .employees
            .values()
            .find(|e| e.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Employee>, StoreError> {
        Ok(self
            .read()?
            .employees
            .values()
            .find(|e| e.email.as_deref() == Some(email))
            .cloned())
    }
}

#[async_trait]
impl AttendanceStore for MemoryStore {
    async fn insert(&self, draft: &AttendanceDraft) -> Result<AttendanceRecord, StoreError> {
        let mut tables = self.write()?;
        let key = (draft.employee_id(), draft.entry().date);

        if tables.by_day.contains_key(&key) {
            return Err(StoreError::DuplicateKey(UniqueKey::EmployeeDate));
        }

        tables.last_attendance_id += 1;
        let now = Utc::now();
        let record = draft.to_record(tables.last_attendance_id, now, now);
        tables.by_day.insert(key, record.id);
        tables.attendance.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        id: u64,
        draft: &AttendanceDraft,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        let mut tables = self.write()?;

        let Some(current) = tables.attendance.get(&id) else {
            return Ok(None);
        };
        let old_key = (current.employee_id, current.date);
        let created_at = current.created_at;
        let new_key = (draft.employee_id(), draft.entry().date);

        if let Some(&holder) = tables.by_day.get(&new_key) {
            if holder != id {
                return Err(StoreError::DuplicateKey(UniqueKey::EmployeeDate));
            }
        }

        let record = draft.to_record(id, created_at, Utc::now());
        tables.by_day.remove(&old_key);
        tables.by_day.insert(new_key, id);
        tables.attendance.insert(id, record.clone());
        Ok(Some(record))
    }

    async fn find_by_id(&self, id: u64) -> Result<Option<AttendanceRecord>, StoreError> {
        Ok(self.read()?.attendance.get(&id).cloned())
    }

    async fn find_by_employee_and_date(
        &self,
        employee_id: u64,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        let tables = self.read()?;
        Ok(tables
            .by_day
            .get(&(employee_id, date))
            .and_then(|id| tables.attendance.get(id))
            .cloned())
    }

    async fn find_by_employee(
        &self,
        employee_id: u64,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let mut records: Vec<_> = self
            .read()?
            .attendance
            .values()
            .filter(|r| r.employee_id == employee_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(records)
    }

    async fn find_by_employee_and_range(
        &self,
        employee_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let mut records: Vec<_> = self
            .read()?
            .attendance
            .values()
            .filter(|r| r.employee_id == employee_id && r.date >= start && r.date <= end)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.date);
        Ok(records)
    }

    async fn delete_by_id(&self, id: u64) -> Result<bool, StoreError> {
        let mut tables = self.write()?;
        match tables.attendance.remove(&id) {
            Some(record) => {
                tables.by_day.remove(&(record.employee_id, record.date));
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::AttendanceEntry;
    use crate::model::role::Role;

    fn absent(employee_id: u64, day: u32) -> AttendanceDraft {
        let entry = AttendanceEntry {
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            is_present: false,
            start_time: None,
            end_time: None,
            bills_count: 0,
            remarks: None,
        };
        AttendanceDraft::new(employee_id, entry).unwrap()
    }

    fn employee(username: &str, email: Option<&str>) -> EmployeeDraft {
        EmployeeDraft {
            username: username.into(),
            password_hash: "hash".into(),
            name: username.into(),
            email: email.map(Into::into),
            phone: None,
            role: Role::Employee,
            is_active: true,
        }
    }

    #[actix_web::test]
    async fn second_insert_for_same_day_is_a_duplicate() {
        let store = MemoryStore::new();
        AttendanceStore::insert(&store, &absent(1, 5)).await.unwrap();

        let err = AttendanceStore::insert(&store, &absent(1, 5)).await.unwrap_err();

        assert!(matches!(err, StoreError::DuplicateKey(UniqueKey::EmployeeDate)));
        assert!(AttendanceStore::insert(&store, &absent(2, 5)).await.is_ok());
    }

    #[actix_web::test]
    async fn moving_onto_an_occupied_day_is_a_duplicate() {
        let store = MemoryStore::new();
        AttendanceStore::insert(&store, &absent(1, 5)).await.unwrap();
        let sixth = AttendanceStore::insert(&store, &absent(1, 6)).await.unwrap();

        let err = store.update(sixth.id, &absent(1, 5)).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey(UniqueKey::EmployeeDate)));

        let moved = store.update(sixth.id, &absent(1, 7)).await.unwrap().unwrap();
        assert_eq!(moved.date, NaiveDate::from_ymd_opt(2024, 3, 7).unwrap());
        assert!(
            store
                .find_by_employee_and_date(1, NaiveDate::from_ymd_opt(2024, 3, 6).unwrap())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[actix_web::test]
    async fn listing_orders_by_date() {
        let store = MemoryStore::new();
        for day in [6, 4, 5] {
            AttendanceStore::insert(&store, &absent(1, day)).await.unwrap();
        }

        let newest_first: Vec<_> = store
            .find_by_employee(1)
            .await
            .unwrap()
            .iter()
            .map(|r| r.date.format("%d").to_string())
            .collect();
        assert_eq!(newest_first, ["06", "05", "04"]);

        let window: Vec<_> = store
            .find_by_employee_and_range(
                1,
                NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 6).unwrap(),
            )
            .await
            .unwrap()
            .iter()
            .map(|r| r.date.format("%d").to_string())
            .collect();
        assert_eq!(window, ["05", "06"]);
    }

    #[actix_web::test]
    async fn delete_frees_the_day() {
        let store = MemoryStore::new();
        let record = AttendanceStore::insert(&store, &absent(1, 5)).await.unwrap();

        assert!(store.delete_by_id(record.id).await.unwrap());
        assert!(!store.delete_by_id(record.id).await.unwrap());
        assert!(AttendanceStore::insert(&store, &absent(1, 5)).await.is_ok());
    }

    #[actix_web::test]
    async fn usernames_and_emails_are_unique() {
        let store = MemoryStore::new();
        EmployeeStore::insert(&store, &employee("ana", Some("ana@x.io")))
            .await
            .unwrap();

        let by_name = EmployeeStore::insert(&store, &employee("ana", None)).await;
        let by_email = EmployeeStore::insert(&store, &employee("bea", Some("ana@x.io"))).await;
        let no_email = EmployeeStore::insert(&store, &employee("cy", None)).await;

        assert!(matches!(by_name, Err(StoreError::DuplicateKey(UniqueKey::Username))));
        assert!(matches!(by_email, Err(StoreError::DuplicateKey(UniqueKey::Email))));
        assert!(no_email.is_ok());
    }

    #[actix_web::test]
    async fn usernames_differing_in_case_are_distinct() {
        let store = MemoryStore::new();
        EmployeeStore::insert(&store, &employee("ana", None)).await.unwrap();

        assert!(EmployeeStore::insert(&store, &employee("Ana", None)).await.is_ok());
        assert!(store.find_by_username("ANA").await.unwrap().is_none());
    }
}
