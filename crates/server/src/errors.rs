use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::errors::ServiceError;
use tracing::error;

/// JSON-bodied API error: status code plus `{"error": ..., "message": ...}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub error: &'static str,
    pub message: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: &'static str, message: Option<String>) -> Self {
        Self { status, error, message }
    }

    /// Map a service error to its client-facing status. The four domain
    /// outcomes keep their messages; storage failures are logged and collapsed
    /// to a generic 500.
    pub fn from_service(e: ServiceError) -> Self {
        match e {
            ServiceError::AlreadyRegistered(_) => {
                Self::new(StatusCode::BAD_REQUEST, "Already Registered", Some(e.to_string()))
            }
            ServiceError::NotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, "Not Found", Some(e.to_string()))
            }
            ServiceError::StockExceeded { .. } => {
                Self::new(StatusCode::BAD_REQUEST, "Stock Exceeded", Some(e.to_string()))
            }
            ServiceError::MinimumStockExceeded { .. } => {
                Self::new(StatusCode::BAD_REQUEST, "Minimum Stock Exceeded", Some(e.to_string()))
            }
            ServiceError::Validation(_) | ServiceError::Model(_) => {
                Self::new(StatusCode::BAD_REQUEST, "Validation Error", Some(e.to_string()))
            }
            ServiceError::Storage(_) => {
                error!(err = %e, "storage failure");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", None)
            }
        }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.error,
            "message": self.message,
        });
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        Self::from_service(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::beer::BeerId;

    #[test]
    fn domain_errors_map_to_client_statuses() {
        let cases = [
            (ServiceError::AlreadyRegistered("Brahma".into()), StatusCode::BAD_REQUEST),
            (ServiceError::beer_not_found(BeerId(1)), StatusCode::NOT_FOUND),
            (ServiceError::StockExceeded { id: BeerId(1), quantity: 5 }, StatusCode::BAD_REQUEST),
            (
                ServiceError::MinimumStockExceeded { id: BeerId(1), quantity: 5 },
                StatusCode::BAD_REQUEST,
            ),
            (ServiceError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (ServiceError::Storage("disk".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(JsonApiError::from_service(err).status, status);
        }
    }

    #[test]
    fn storage_detail_is_not_leaked() {
        let mapped = JsonApiError::from_service(ServiceError::Storage("secret path".into()));
        assert!(mapped.message.is_none());
    }
}
