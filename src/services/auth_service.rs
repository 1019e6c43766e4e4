use crate::dto::auth_dto::{AuthResponse, LoginRequest, RegisterRequest};
use crate::error::{Error, Result};
use crate::models::user::{User, ROLE_STUDENT, ROLE_TEACHER};
use crate::utils::crypto::{hash_password, verify_password};
use crate::utils::token::issue_token;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct AuthService {
    pool: PgPool,
}

impl AuthService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_user_by_id(&self, user_id: Uuid) -> Result<User> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE id = $1"#)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    /// Authentication lookup: username within the role, falling back to email.
    pub async fn find_by_credentials(
        &self,
        username_or_email: &str,
        role: &str,
    ) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT * FROM users
               WHERE role = $2 AND (username = $1 OR email = $1)
               ORDER BY (username = $1) DESC
               LIMIT 1"#,
        )
        .bind(username_or_email)
        .bind(role)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// A single failure message for unknown users and wrong passwords alike.
    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse> {
        if req.role != ROLE_TEACHER && req.role != ROLE_STUDENT {
            return Err(Error::BadRequest(format!("unknown role '{}'", req.role)));
        }

        let user = self
            .find_by_credentials(&req.username_or_email, &req.role)
            .await?;

        let verified = match &user {
            Some(u) => match &u.password_hash {
                Some(hash) => verify_password(&req.password, hash)
                    .map_err(|e| Error::Internal(format!("Password verification failed: {}", e)))?,
                None => false,
            },
            None => false,
        };

        if !verified {
            tracing::info!(role = %req.role, "Rejected login attempt");
            return Err(Error::Unauthorized("invalid credentials".to_string()));
        }

        let user = user.expect("verified implies user");
        let token = issue_token(&user)?;
        Ok(AuthResponse { token, user })
    }

    /// Student self-registration. Duplicates are rejected before any write.
    pub async fn register_student(&self, req: RegisterRequest) -> Result<User> {
        let duplicate = sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS(
                   SELECT 1 FROM users
                   WHERE role = $3 AND (username = $1 OR email = $2)
               )"#,
        )
        .bind(&req.username)
        .bind(&req.email)
        .bind(ROLE_STUDENT)
        .fetch_one(&self.pool)
        .await?;

        if duplicate {
            return Err(Error::Conflict(
                "Username or email already exists".to_string(),
            ));
        }

        let password_hash = hash_password(&req.password)
            .map_err(|e| Error::Internal(format!("Password hashing failed: {}", e)))?;

        let user = sqlx::query_as::<_, User>(
            r#"INSERT INTO users (name, email, role, username, password_hash)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING *"#,
        )
        .bind(&req.name)
        .bind(&req.email)
        .bind(ROLE_STUDENT)
        .bind(&req.username)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(user_id = %user.id, "Registered new student");
        Ok(user)
    }

    pub async fn list_students(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"SELECT * FROM users WHERE role = $1 ORDER BY name ASC"#,
        )
        .bind(ROLE_STUDENT)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }
}
