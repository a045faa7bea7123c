//! Auth-related database queries.

use async_trait::async_trait;
use sqlx::PgPool;

use super::AuthError;
use super::store::AuthStore;
use crate::models::auth::{NewUser, Role, RoleAssignment, User, UserWithPassword};

/// Fetch a user by email, including the password hash.
pub async fn find_user_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<UserWithPassword>, AuthError> {
    let row = sqlx::query_as::<_, (i64, String, String, Option<String>)>(
        "SELECT id, name, email, password_hash FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|(id, name, email, password_hash)| UserWithPassword {
        user: User { id, name, email },
        password_hash,
    }))
}

/// Fetch a user by ID.
pub async fn find_user_by_id(pool: &PgPool, user_id: i64) -> Result<Option<User>, AuthError> {
    let row = sqlx::query_as::<_, (i64, String, String)>(
        "SELECT id, name, email FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|(id, name, email)| User { id, name, email }))
}

/// Create a new user, returning the stored record.
pub async fn create_user(pool: &PgPool, user: &NewUser) -> Result<User, AuthError> {
    let result = sqlx::query_scalar::<_, i64>(
        "INSERT INTO users (name, email, password_hash, mobile, age) \
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.mobile)
    .bind(user.age)
    .fetch_one(pool)
    .await;

    match result {
        Ok(id) => Ok(User {
            id,
            name: user.name.clone(),
            email: user.email.clone(),
        }),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Err(AuthError::Conflict("Email already exists".into()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Fetch role assignments for a user, joined with role names.
pub async fn get_role_assignments(
    pool: &PgPool,
    user_id: i64,
) -> Result<Vec<RoleAssignment>, AuthError> {
    let rows = sqlx::query_as::<_, (i64, i64, String)>(
        "SELECT ur.user_id, r.id, r.role_name \
         FROM user_roles ur \
         JOIN roles r ON r.id = ur.role_id \
         WHERE ur.user_id = $1 \
         ORDER BY r.id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows
        .into_iter()
        .map(|(subject_id, role_id, role_name)| RoleAssignment {
            subject_id,
            role_id,
            role_name,
        })
        .collect())
}

/// Grant a named role to a user. Granting a role the user already holds is a no-op.
pub async fn grant_role(pool: &PgPool, user_id: i64, role_name: &str) -> Result<(), AuthError> {
    let role_id =
        sqlx::query_scalar::<_, i64>("SELECT id FROM roles WHERE role_name = $1")
            .bind(role_name)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AuthError::ValidationError(format!("Unknown role '{role_name}'")))?;

    sqlx::query(
        "INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2) \
         ON CONFLICT (user_id, role_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(role_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// List the role catalogue.
pub async fn list_roles(pool: &PgPool) -> Result<Vec<Role>, AuthError> {
    let rows = sqlx::query_as::<_, (i64, String)>("SELECT id, role_name FROM roles ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(id, role_name)| Role { id, role_name })
        .collect())
}

/// Assign a role by ID, returning the new assignment.
pub async fn assign_role(
    pool: &PgPool,
    user_id: i64,
    role_id: i64,
) -> Result<RoleAssignment, AuthError> {
    let result = sqlx::query_scalar::<_, String>(
        "WITH inserted AS ( \
             INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2) RETURNING role_id \
         ) \
         SELECT r.role_name FROM inserted i JOIN roles r ON r.id = i.role_id",
    )
    .bind(user_id)
    .bind(role_id)
    .fetch_one(pool)
    .await;

    match result {
        Ok(role_name) => Ok(RoleAssignment {
            subject_id: user_id,
            role_id,
            role_name,
        }),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Err(AuthError::Conflict("Role already assigned".into()))
        }
        Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => {
            Err(AuthError::ValidationError("Unknown user or role".into()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Remove a role assignment. Returns whether a row was deleted.
pub async fn revoke_role(pool: &PgPool, user_id: i64, role_id: i64) -> Result<bool, AuthError> {
    let result = sqlx::query("DELETE FROM user_roles WHERE user_id = $1 AND role_id = $2")
        .bind(user_id)
        .bind(role_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// [`AuthStore`] backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgAuthStore {
    pool: PgPool,
}

impl PgAuthStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl AuthStore for PgAuthStore {
    async fn fetch_role_assignments(
        &self,
        subject_id: i64,
    ) -> Result<Vec<RoleAssignment>, AuthError> {
        get_role_assignments(&self.pool, subject_id).await
    }

    async fn find_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserWithPassword>, AuthError> {
        find_user_by_email(&self.pool, email).await
    }

    async fn find_user_by_id(&self, user_id: i64) -> Result<Option<User>, AuthError> {
        find_user_by_id(&self.pool, user_id).await
    }

    async fn create_user(&self, user: NewUser) -> Result<User, AuthError> {
        create_user(&self.pool, &user).await
    }

    async fn grant_role(&self, user_id: i64, role_name: &str) -> Result<(), AuthError> {
        grant_role(&self.pool, user_id, role_name).await
    }

    async fn list_roles(&self) -> Result<Vec<Role>, AuthError> {
        list_roles(&self.pool).await
    }

    async fn assign_role(&self, user_id: i64, role_id: i64) -> Result<RoleAssignment, AuthError> {
        assign_role(&self.pool, user_id, role_id).await
    }

    async fn revoke_role(&self, user_id: i64, role_id: i64) -> Result<bool, AuthError> {
        revoke_role(&self.pool, user_id, role_id).await
    }
}
