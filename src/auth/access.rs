use crate::{auth::auth::AuthEmployee, error::AppError};

/// Admins may touch any employee's records; everyone else only their own.
pub fn can_access(actor: &AuthEmployee, owner_id: u64) -> bool {
    actor.is_admin() || actor.employee_id == owner_id
}

pub fn authorize(actor: &AuthEmployee, owner_id: u64) -> Result<(), AppError> {
    if can_access(actor, owner_id) {
        Ok(())
    } else {
        tracing::info!(
            actor = actor.employee_id,
            owner = owner_id,
            "Access denied to another employee's attendance"
        );
        Err(AppError::forbidden())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::role::Role;
    use rstest::rstest;

    fn actor(employee_id: u64, role: Role) -> AuthEmployee {
        AuthEmployee {
            employee_id,
            username: format!("user{employee_id}"),
            role,
        }
    }

    #[rstest]
    #[case(Role::Admin, 1, 2, true)]
    #[case(Role::Admin, 1, 1, true)]
    #[case(Role::Employee, 5, 5, true)]
    #[case(Role::Employee, 5, 6, false)]
    fn access_matrix(
        #[case] role: Role,
        #[case] actor_id: u64,
        #[case] owner_id: u64,
        #[case] allowed: bool,
    ) {
        let actor = actor(actor_id, role);

        assert_eq!(can_access(&actor, owner_id), allowed);
        assert_eq!(authorize(&actor, owner_id).is_ok(), allowed);
    }

    #[test]
    fn denial_is_forbidden_not_not_found() {
        let err = authorize(&actor(5, Role::Employee), 6).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
