//! Outgoing API request types.

mod api_request;
mod body;
mod method;
mod query;

pub use api_request::{ApiRequest, AUTHORIZATION};
pub use body::{MultipartFile, RequestBody};
pub use method::HttpMethod;
pub use query::QueryParams;
