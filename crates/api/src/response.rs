//! Response envelope for API handlers.
//!
//! Successful responses wrap their payload in `{ "data": ... }` so clients
//! can tell payloads apart from the `{ "error", "code" }` failure envelope
//! without inspecting the status code.

use serde::Serialize;

/// The `{ "data": T }` success envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}
