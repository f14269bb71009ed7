//! HTTP response helpers
//!
//! Error bodies share one shape: `{"error": code, "message": text}`.

use actix_web::{cookie::Cookie, http::StatusCode, HttpResponse, HttpResponseBuilder};
use serde_json::json;

/// Unified response builder for handlers
pub struct ResponseBuilder;

impl ResponseBuilder {
    /// Create a `BadRequest` (400) error response
    #[must_use]
    pub fn bad_request() -> ErrorResponseBuilder {
        ErrorResponseBuilder::new(StatusCode::BAD_REQUEST, "invalid_request")
    }

    /// Create a `BadGateway` (502) error response
    #[must_use]
    pub fn bad_gateway() -> ErrorResponseBuilder {
        ErrorResponseBuilder::new(StatusCode::BAD_GATEWAY, "bad_gateway")
    }

    /// Create a `ServiceUnavailable` (503) error response
    #[must_use]
    pub fn service_unavailable() -> ErrorResponseBuilder {
        ErrorResponseBuilder::new(StatusCode::SERVICE_UNAVAILABLE, "service_unavailable")
    }

    #[must_use]
    pub fn invalid_redirect() -> HttpResponse {
        Self::bad_request()
            .with_error_code("invalid_redirect")
            .with_message("The redirect URL is invalid or potentially unsafe")
            .build()
    }

    /// 302 to `location`, attaching `cookies`
    #[must_use]
    pub fn redirect_with_cookies(location: &str, cookies: Vec<Cookie<'static>>) -> HttpResponse {
        let mut builder = HttpResponse::Found();
        with_cookies(&mut builder, cookies);
        builder
            .append_header(("Location", location.to_string()))
            .finish()
    }
}

/// Attach every cookie to a response under construction
pub fn with_cookies(builder: &mut HttpResponseBuilder, cookies: Vec<Cookie<'static>>) {
    for cookie in cookies {
        builder.cookie(cookie);
    }
}

/// Builder for JSON error responses
pub struct ErrorResponseBuilder {
    status: StatusCode,
    error_code: String,
    message: Option<String>,
}

impl ErrorResponseBuilder {
    fn new(status: StatusCode, default_code: &str) -> Self {
        Self {
            status,
            error_code: default_code.to_string(),
            message: None,
        }
    }

    #[must_use]
    pub fn with_error_code(mut self, code: &str) -> Self {
        self.error_code = code.to_string();
        self
    }

    #[must_use]
    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }

    #[must_use]
    pub fn build(self) -> HttpResponse {
        let message = self.message.unwrap_or_else(|| {
            self.status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });

        HttpResponse::build(self.status).json(json!({
            "error": self.error_code,
            "message": message,
        }))
    }
}
