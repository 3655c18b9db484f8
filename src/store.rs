use crate::{models::User, schema::user, DbPool};
use axum::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

diesel::sql_function!(fn lower(x: diesel::sql_types::Text) -> diesel::sql_types::Text);

/// Persistence for admin accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Matches case-insensitively. `email` is expected in lower case.
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;

    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<User>>;

    async fn find_by_reset_digest(&self, digest: &str) -> anyhow::Result<Option<User>>;

    async fn store_reset_digest(
        &self,
        id: i32,
        digest: &str,
        expires_at: DateTime<Utc>,
    ) -> anyhow::Result<()>;

    /// Replaces the password and clears the reset token in one step, but only
    /// while `digest` is still the user's outstanding token. Returns whether a
    /// row was updated.
    async fn complete_reset(
        &self,
        id: i32,
        digest: &str,
        password_hash: &str,
    ) -> anyhow::Result<bool>;
}

pub struct PgUserStore {
    pool: DbPool,
}

impl PgUserStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let conn = &mut self.pool.get().await?;

        Ok(user::table
            .filter(lower(user::email).eq(email))
            .first::<User>(conn)
            .await
            .optional()?)
    }

    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<User>> {
        let conn = &mut self.pool.get().await?;

        Ok(user::table
            .find(id)
            .first::<User>(conn)
            .await
            .optional()?)
    }

    async fn find_by_reset_digest(&self, digest: &str) -> anyhow::Result<Option<User>> {
        let conn = &mut self.pool.get().await?;

        Ok(user::table
            .filter(user::reset_token.eq(digest))
            .first::<User>(conn)
            .await
            .optional()?)
    }

    async fn store_reset_digest(
        &self,
        id: i32,
        digest: &str,
        expires_at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        let conn = &mut self.pool.get().await?;

        diesel::update(user::table.find(id))
            .set((
                user::reset_token.eq(digest),
                user::reset_token_exp.eq(expires_at),
            ))
            .execute(conn)
            .await?;

        Ok(())
    }

    async fn complete_reset(
        &self,
        id: i32,
        digest: &str,
        password_hash: &str,
    ) -> anyhow::Result<bool> {
        let conn = &mut self.pool.get().await?;

        let updated = diesel::update(
            user::table
                .filter(user::id.eq(id))
                .filter(user::reset_token.eq(digest)),
        )
        .set((
            user::password_hash.eq(password_hash),
            user::reset_token.eq(None::<String>),
            user::reset_token_exp.eq(None::<DateTime<Utc>>),
        ))
        .execute(conn)
        .await?;

        Ok(updated == 1)
    }
}

#[cfg(test)]
pub mod memory {
    use super::*;
    use tokio::sync::Mutex;

    /// Vec-backed store for service and router tests.
    #[derive(Default)]
    pub struct MemoryUserStore {
        users: Mutex<Vec<User>>,
    }

    impl MemoryUserStore {
        pub fn with_users(users: Vec<User>) -> Self {
            Self {
                users: Mutex::new(users),
            }
        }

        pub async fn snapshot(&self, id: i32) -> Option<User> {
            self.users.lock().await.iter().find(|u| u.id == id).cloned()
        }

        pub async fn set_reset(&self, id: i32, digest: &str, expires_at: DateTime<Utc>) {
            if let Some(u) = self.users.lock().await.iter_mut().find(|u| u.id == id) {
                u.reset_token = Some(digest.to_string());
                u.reset_token_exp = Some(expires_at);
            }
        }
    }

    #[async_trait]
    impl UserStore for MemoryUserStore {
        async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
            Ok(self
                .users
                .lock()
                .await
                .iter()
                .find(|u| u.email.to_lowercase() == email)
                .cloned())
        }

        async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<User>> {
            Ok(self.snapshot(id).await)
        }

        async fn find_by_reset_digest(&self, digest: &str) -> anyhow::Result<Option<User>> {
            Ok(self
                .users
                .lock()
                .await
                .iter()
                .find(|u| u.reset_token.as_deref() == Some(digest))
                .cloned())
        }

        async fn store_reset_digest(
            &self,
            id: i32,
            digest: &str,
            expires_at: DateTime<Utc>,
        ) -> anyhow::Result<()> {
            self.set_reset(id, digest, expires_at).await;
            Ok(())
        }

        async fn complete_reset(
            &self,
            id: i32,
            digest: &str,
            password_hash: &str,
        ) -> anyhow::Result<bool> {
            let mut users = self.users.lock().await;
            let Some(u) = users
                .iter_mut()
                .find(|u| u.id == id && u.reset_token.as_deref() == Some(digest))
            else {
                return Ok(false);
            };

            u.password_hash = password_hash.to_string();
            u.reset_token = None;
            u.reset_token_exp = None;
            Ok(true)
        }
    }
}
