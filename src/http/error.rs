use std::borrow::Cow;

use axum::response::IntoResponse;
use axum::Json;
use hyper::StatusCode;

use crate::dispatch::DispatchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct ApiErrorCode(pub u16);

impl ApiErrorCode {
    /// The requested route does not exist.
    pub const ROUTE_NOT_FOUND: Self = Self(404);
    /// No Clash Royale API token is configured.
    pub const MISSING_API_KEY: Self = Self(1000);
    /// A lookup was requested with an unknown choice.
    pub const INVALID_CHOICE: Self = Self(1001);
    /// The Clash Royale API failed in a way that is not reported to the user.
    pub const EXTERNAL_SERVICE_ERROR: Self = Self(2000);
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status_code: StatusCode,
    pub status: Cow<'static, str>,
    pub error_code: ApiErrorCode,
    pub error: Cow<'static, str>,
}

impl ApiError {
    pub fn new(status_code: StatusCode, error_code: ApiErrorCode, error: impl Into<Cow<'static, str>>) -> Self {
        Self {
            status_code,
            status: status_code.canonical_reason().unwrap_or("unknown").into(),
            error_code,
            error: error.into(),
        }
    }

    pub fn not_found(error_code: ApiErrorCode, error: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::NOT_FOUND, error_code, error)
    }

    pub fn internal_server_error(error_code: ApiErrorCode, error: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error_code, error)
    }

    pub fn bad_gateway(error_code: ApiErrorCode, error: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, error_code, error)
    }
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        tracing::error!(error = %err, "lookup failed");

        match err {
            DispatchError::InvalidChoice(_) => {
                Self::internal_server_error(ApiErrorCode::INVALID_CHOICE, err.to_string())
            }
            DispatchError::Client(_) => {
                Self::bad_gateway(ApiErrorCode::EXTERNAL_SERVICE_ERROR, "clash royale api request failed")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::http::Response<axum::body::Body> {
        (self.status_code, Json(self)).into_response()
    }
}
