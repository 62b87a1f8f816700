//! Row shapes for admin aggregation queries.

use sqlx::FromRow;

/// One `GROUP BY status` bucket.
#[derive(Debug, Clone, FromRow)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}
