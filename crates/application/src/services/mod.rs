//! Resource services for the Pet Manager API.
//!
//! Every call goes through the [`AuthInterceptor`](crate::auth::AuthInterceptor),
//! so bearer attachment and 401 recovery are shared. Non-success statuses
//! become [`ApiError::Status`].

mod pets;
mod tutors;

pub use pets::PetService;
pub use tutors::TutorService;

use petmanager_domain::ApiResponse;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{ApiError, ApiResult};

fn expect_success(response: ApiResponse) -> ApiResult<ApiResponse> {
    if response.is_success() {
        Ok(response)
    } else {
        debug!(status = %response.status, "API returned an error status");
        Err(ApiError::Status {
            status: response.status.as_u16(),
            body: response.summary(),
        })
    }
}

fn decode<T: DeserializeOwned>(response: ApiResponse) -> ApiResult<T> {
    expect_success(response)?
        .json_body()
        .map_err(|e| ApiError::Decode(e.to_string()))
}
