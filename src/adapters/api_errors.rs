use {
    crate::domain::error::WebhookError,
    axum::{
        Json,
        http::StatusCode,
        response::{IntoResponse, Response},
    },
};

/// Newtype over the domain error so the HTTP mapping lives in the
/// adapter layer. This is the only place error kinds become statuses:
/// authenticity failures are 401, every other pipeline failure is 400,
/// and backend faults are 500 with no internal detail in the body.
pub struct ApiError(pub WebhookError);

impl From<WebhookError> for ApiError {
    fn from(err: WebhookError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            WebhookError::MissingSignature => {
                // Contract body for unsigned deliveries.
                return (
                    StatusCode::UNAUTHORIZED,
                    Json(serde_json::json!({"error": "No signature provided"})),
                )
                    .into_response();
            }
            WebhookError::InvalidSignature(_) => {
                (StatusCode::UNAUTHORIZED, "invalid signature".to_string())
            }
            WebhookError::MalformedPayload(_) => {
                (StatusCode::BAD_REQUEST, "undecodable payload".to_string())
            }
            WebhookError::RefundNotFinalized(refund_status) => (
                StatusCode::BAD_REQUEST,
                format!("refund not finalized, status: {refund_status}"),
            ),
            WebhookError::UnsupportedEventType(event_type) => (
                StatusCode::BAD_REQUEST,
                format!("unsupported event type: {event_type}"),
            ),
            WebhookError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            WebhookError::ConstraintViolation => {
                (StatusCode::BAD_REQUEST, "event already recorded".to_string())
            }
            WebhookError::Database(err) => {
                tracing::error!("database error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
            }
        };

        let body = serde_json::json!({
            "error": "Webhook processing failed",
            "message": message,
        });

        (status, Json(body)).into_response()
    }
}
