/// Request extractors
///
/// [`ApiJson`] behaves like `axum::Json` but rejects malformed bodies, unknown
/// enum values (such as a role other than `admin`/`analyst`) and missing
/// fields with the API's own 400 error body instead of axum's plain-text 422.

use axum::extract::{rejection::JsonRejection, FromRequest};

use crate::error::ApiError;

/// JSON body extractor with `ApiError` rejections
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
