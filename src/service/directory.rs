use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    auth::password::{hash_password, verify_password},
    error::AppError,
    model::employee::{Employee, EmployeeDraft, NewEmployee},
    store::EmployeeStore,
};

#[derive(Clone)]
pub struct EmployeeDirectory {
    store: Arc<dyn EmployeeStore>,
}

impl EmployeeDirectory {
    pub fn new(store: Arc<dyn EmployeeStore>) -> Self {
        Self { store }
    }

    pub async fn find_by_id(&self, id: u64) -> Result<Option<Employee>, AppError> {
        Ok(self.store.find_by_id(id).await?)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<Employee>, AppError> {
        Ok(self.store.find_by_username(username.trim()).await?)
    }

    /// Registers an employee. The availability checks only produce the
    /// friendly message early; the store's unique keys decide races.
    pub async fn create(&self, new: NewEmployee) -> Result<Employee, AppError> {
        let new = new.normalized();
        new.validate()?;

        if self.store.find_by_username(&new.username).await?.is_some() {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }
        if let Some(email) = &new.email {
            if self.store.find_by_email(email).await?.is_some() {
                return Err(AppError::Conflict("Email already exists".to_string()));
            }
        }

        let draft = EmployeeDraft {
            password_hash: hash_password(&new.password)?,
            username: new.username,
            name: new.name,
            email: new.email,
            phone: new.phone,
            role: new.role,
            is_active: true,
        };

        let employee = self.store.insert(&draft).await?;
        info!(employee_id = employee.id, role = %employee.role, "Employee registered");
        Ok(employee)
    }

    /// Unknown user, inactive account and wrong password are indistinguishable
    /// to the caller.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Employee, AppError> {
        let Some(employee) = self.find_by_username(username).await? else {
            debug!("Invalid credentials: user not found");
            return Err(AppError::invalid_credentials());
        };

        if !Self::verify_credential(&employee, password) {
            debug!(employee_id = employee.id, "Invalid credentials: password mismatch");
            return Err(AppError::invalid_credentials());
        }

        if !employee.is_active {
            debug!(employee_id = employee.id, "Invalid credentials: account inactive");
            return Err(AppError::invalid_credentials());
        }

        Ok(employee)
    }

    pub fn verify_credential(employee: &Employee, candidate: &str) -> bool {
        verify_password(candidate, &employee.password_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::role::Role;
    use crate::store::MemoryStore;
    use rstest::{fixture, rstest};

    #[fixture]
    fn directory() -> (EmployeeDirectory, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (EmployeeDirectory::new(store.clone()), store)
    }

    fn registration(username: &str, email: Option<&str>) -> NewEmployee {
        NewEmployee {
            username: username.into(),
            password: "s3cret".into(),
            name: "Some One".into(),
            email: email.map(Into::into),
            phone: None,
            role: Role::Employee,
        }
    }

    #[rstest]
    #[actix_web::test]
    async fn create_hashes_the_password(directory: (EmployeeDirectory, Arc<MemoryStore>)) {
        let (directory, _) = directory;
        let employee = directory.create(registration("ana", None)).await.unwrap();

        assert_ne!(employee.password_hash, "s3cret");
        assert!(EmployeeDirectory::verify_credential(&employee, "s3cret"));
        assert!(employee.is_active);
    }

    #[rstest]
    #[actix_web::test]
    async fn duplicate_username_or_email_conflicts(
        directory: (EmployeeDirectory, Arc<MemoryStore>),
    ) {
        let (directory, _) = directory;
        directory
            .create(registration("ana", Some("ana@corp.com")))
            .await
            .unwrap();

        let same_name = directory.create(registration(" ana ", None)).await;
        let same_email = directory
            .create(registration("bea", Some("ANA@corp.com")))
            .await;

        assert!(matches!(same_name, Err(AppError::Conflict(m)) if m.contains("Username")));
        assert!(matches!(same_email, Err(AppError::Conflict(m)) if m.contains("Email")));
    }

    #[rstest]
    #[actix_web::test]
    async fn create_rejects_bad_input(directory: (EmployeeDirectory, Arc<MemoryStore>)) {
        let (directory, _) = directory;
        let result = directory.create(registration("ab", None)).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[rstest]
    #[actix_web::test]
    async fn authentication_failures_look_alike(directory: (EmployeeDirectory, Arc<MemoryStore>)) {
        let (directory, store) = directory;
        directory.create(registration("ana", None)).await.unwrap();
        EmployeeStore::insert(
            store.as_ref(),
            &EmployeeDraft {
                username: "gone".into(),
                password_hash: hash_password("s3cret").unwrap(),
                name: "Former".into(),
                email: None,
                phone: None,
                role: Role::Employee,
                is_active: false,
            },
        )
        .await
        .unwrap();

        let unknown = directory.authenticate("nobody", "s3cret").await.unwrap_err();
        let wrong = directory.authenticate("ana", "wrong").await.unwrap_err();
        let inactive = directory.authenticate("gone", "s3cret").await.unwrap_err();

        assert_eq!(unknown.to_string(), wrong.to_string());
        assert_eq!(wrong.to_string(), inactive.to_string());
        assert!(matches!(unknown, AppError::Auth(_)));
        assert!(directory.authenticate("ana", "s3cret").await.is_ok());
    }
}
