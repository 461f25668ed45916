//! Error type for repository operations that combine domain rules with SQL.

use bookline_core::error::CoreError;

/// Outcome of a booking operation.
///
/// `Domain` carries normal business rejections (conflict, invalid status,
/// not found); `Db` carries infrastructure failures. The split matters to
/// callers: a transient serialization or deadlock failure under `Db` is safe
/// to retry from scratch, because the conflict check is read-only and
/// idempotent, while `Domain` outcomes must never be retried automatically.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error(transparent)]
    Domain(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] sqlx::Error),
}
