use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::auth_dto::RegisterRequest;
use crate::error::{Error, Result};
use crate::models::user::{User, ROLE_ADMIN, ROLE_INSTRUCTOR, ROLE_STUDENT};
use crate::utils::crypto::{hash_password, verify_password};

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn register(&self, payload: RegisterRequest) -> Result<User> {
        let role = payload.role.as_deref().unwrap_or(ROLE_STUDENT);
        let allowed = [ROLE_STUDENT, ROLE_INSTRUCTOR, ROLE_ADMIN];
        if !allowed.contains(&role) {
            return Err(anyhow::anyhow!("Unknown role: {}", role).into());
        }

        let exists = sqlx::query(r#"SELECT id FROM users WHERE email = $1"#)
            .bind(&payload.email)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_some() {
            return Err(
                anyhow::anyhow!("A user with this email address already exists.").into(),
            );
        }

        let password_hash = hash_password(&payload.password)?;
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&payload.name)
        .bind(&payload.email)
        .bind(&password_hash)
        .bind(role)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT * FROM users WHERE email = $1 AND is_active"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::Unauthorized("unknown email".to_string()))?;

        if !verify_password(password, &user.password_hash)? {
            return Err(Error::Unauthorized("bad password".to_string()));
        }
        Ok(user)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<User> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        user.ok_or_else(|| Error::NotFound("User not found".to_string()))
    }
}
