//! Shared response envelope types for API handlers.
//!
//! Most responses use a `{ "data": ... }` envelope. Admin aggregation
//! responses add `"success": true`, since their data is best-effort.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `{ "success": bool, "data": T }` envelope used by admin routes.
#[derive(Debug, Serialize)]
pub struct SuccessResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}
