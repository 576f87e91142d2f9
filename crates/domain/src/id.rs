//! Request id generation.

use uuid::Uuid;

/// Generates a new UUID v7 request id.
///
/// Ids are time-ordered, so log lines for replayed requests sort next to
/// the original attempt.
#[must_use]
pub fn generate_request_id() -> Uuid {
    Uuid::now_v7()
}
