//! Shared response envelope types for API handlers.
//!
//! Successful responses use a `{ "data": ... }` envelope; error responses
//! are `{ "code": ..., "message": ... }` (see [`crate::error::AppError`]).

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
