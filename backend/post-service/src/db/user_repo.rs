use super::UserStore;
use crate::error::{AppError, Result};
use crate::models::{ProviderProfile, User};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL-backed user store
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, external_id, display_name, emails, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, external_id, display_name, emails, created_at
            FROM users
            WHERE external_id = $1
            "#,
        )
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_or_create(&self, profile: &ProviderProfile) -> Result<(User, bool)> {
        // ON CONFLICT DO NOTHING leaves an existing row untouched and returns nothing,
        // so concurrent first logins converge on one user.
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, external_id, display_name, emails, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (external_id) DO NOTHING
            RETURNING id, external_id, display_name, emails, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&profile.external_id)
        .bind(&profile.display_name)
        .bind(&profile.emails)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(user) = created {
            return Ok((user, true));
        }

        let existing = self
            .find_by_external_id(&profile.external_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        Ok((existing, false))
    }
}
