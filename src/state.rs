use std::sync::Arc;

use crate::{
    service::{attendance::AttendanceService, directory::EmployeeDirectory},
    store::{AttendanceStore, EmployeeStore, MemoryStore, MySqlStore},
};

/// Services shared by every worker.
#[derive(Clone)]
pub struct AppState {
    pub directory: EmployeeDirectory,
    pub attendance: AttendanceService,
}

impl AppState {
    pub fn new(employees: Arc<dyn EmployeeStore>, attendance: Arc<dyn AttendanceStore>) -> Self {
        Self {
            directory: EmployeeDirectory::new(employees),
            attendance: AttendanceService::new(attendance),
        }
    }

    pub fn mysql(store: MySqlStore) -> Self {
        let store = Arc::new(store);
        Self::new(store.clone(), store)
    }

    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(store.clone(), store)
    }
}
