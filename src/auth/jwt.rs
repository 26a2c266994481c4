use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::{error::AppError, model::employee::Employee, models::Claims};

fn now() -> usize {
    Utc::now().timestamp().max(0) as usize
}

pub fn generate_token(employee: &Employee, secret: &str, ttl: usize) -> Result<String, AppError> {
    let iat = now();
    let claims = Claims {
        employee_id: employee.id,
        sub: employee.username.clone(),
        role: employee.role,
        iat,
        exp: iat + ttl,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(format!("token signing failed: {e}")))
}

/// Checks signature and expiry. Every failure reads the same to the caller.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!(error = %e, "Token rejected");
        AppError::Auth("Invalid token".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::employee::EmployeeDraft;
    use crate::model::role::Role;
    use rstest::{fixture, rstest};

    const SECRET: &str = "test-secret";

    #[fixture]
    fn admin() -> Employee {
        EmployeeDraft {
            username: "boss".into(),
            password_hash: "hash".into(),
            name: "Boss".into(),
            email: None,
            phone: None,
            role: Role::Admin,
            is_active: true,
        }
        .to_employee(3, Utc::now())
    }

    #[rstest]
    fn token_carries_identity_and_role(admin: Employee) {
        let token = generate_token(&admin, SECRET, 60).unwrap();
        let claims = verify_token(&token, SECRET).unwrap();

        assert_eq!(claims.employee_id, 3);
        assert_eq!(claims.sub, "boss");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.exp, claims.iat + 60);
    }

    #[rstest]
    fn foreign_signature_is_rejected(admin: Employee) {
        let token = generate_token(&admin, "other-secret", 60).unwrap();

        assert!(matches!(verify_token(&token, SECRET), Err(AppError::Auth(_))));
    }

    #[rstest]
    fn expired_token_is_rejected(admin: Employee) {
        let claims = Claims {
            employee_id: admin.id,
            sub: admin.username.clone(),
            role: admin.role,
            iat: now() - 7200,
            exp: now() - 3600,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(verify_token(&token, SECRET).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(verify_token("not.a.jwt", SECRET).is_err());
    }
}
