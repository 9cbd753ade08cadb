//! Shared response envelope types for API handlers.
//!
//! Metadata responses use a `{ "data": ... }` envelope. The document read
//! endpoint is the exception: its body is the document itself.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
