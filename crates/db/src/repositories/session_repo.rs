//! Repository for the `user_sessions` table.
//!
//! Sessions back the refresh-token flow: one row per issued refresh token,
//! storing only the token's SHA-256 hash. Rotation revokes the old row and
//! inserts a new one.

use sqlx::PgPool;

use bookline_core::types::DbId;

use crate::models::session::{CreateSession, UserSession};

const COLUMNS: &str = "\
    id, user_id, refresh_token_hash, expires_at, is_revoked, \
    created_at, updated_at";

/// Session persistence for refresh tokens.
pub struct SessionRepo;

impl SessionRepo {
    pub async fn create(pool: &PgPool, input: &CreateSession) -> Result<UserSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_sessions (user_id, refresh_token_hash, expires_at) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(input.user_id)
            .bind(&input.refresh_token_hash)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find a live session by refresh token hash. Revoked and expired rows
    /// are filtered out here so callers never see a stale session.
    pub async fn find_active_by_token_hash(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<UserSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_sessions \
             WHERE refresh_token_hash = $1 \
               AND is_revoked = FALSE \
               AND expires_at > NOW()"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(token_hash)
            .fetch_optional(pool)
            .await
    }

    /// Refresh token rotation: revoke the presented session and create its
    /// replacement in one transaction. If the insert fails the revoke rolls
    /// back, so the old token is never burned without a successor.
    pub async fn rotate(
        pool: &PgPool,
        old_id: DbId,
        input: &CreateSession,
    ) -> Result<UserSession, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("UPDATE user_sessions SET is_revoked = TRUE, updated_at = NOW() WHERE id = $1")
            .bind(old_id)
            .execute(&mut *tx)
            .await?;

        let query = format!(
            "INSERT INTO user_sessions (user_id, refresh_token_hash, expires_at) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        let session = sqlx::query_as::<_, UserSession>(&query)
            .bind(input.user_id)
            .bind(&input.refresh_token_hash)
            .bind(input.expires_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(session)
    }

    /// Revoke every session a user holds (logout everywhere).
    pub async fn revoke_all_for_user(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_sessions SET is_revoked = TRUE, updated_at = NOW() \
             WHERE user_id = $1 AND is_revoked = FALSE",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Remove sessions that expired more than a day ago. Intended for a
    /// periodic maintenance call, not the request path.
    pub async fn cleanup_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM user_sessions WHERE expires_at < NOW() - INTERVAL '1 day'")
                .execute(pool)
                .await?;
        Ok(result.rows_affected())
    }
}
