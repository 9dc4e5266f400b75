//! Send email handler

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    domain::communication::mailer::{Mailer, Message},
    infrastructure::http::{errors::ApiError, state::AppState},
};

/// Send email request body
///
/// Missing fields are treated as empty strings.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct SendEmailBody {
    /// The recipient's email address
    #[schema(example = "a@example.com")]
    pub to: String,

    /// The subject line
    #[schema(example = "Hi")]
    pub subject: String,

    /// The plain text body
    #[schema(example = "Hello")]
    pub body: String,
}

impl From<SendEmailBody> for Message {
    fn from(body: SendEmailBody) -> Self {
        Self {
            to: body.to,
            subject: body.subject,
            body: body.body,
        }
    }
}

/// Send email response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SendEmailResponse {
    #[schema(example = "ok")]
    status: String,
}

impl SendEmailResponse {
    fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

impl IntoResponse for SendEmailResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            format!(r#"{{"status": "{}"}}"#, self.status),
        )
            .into_response()
    }
}

/// Relay an email through the configured SMTP server
#[utoipa::path(
    post,
    operation_id = "send_email",
    tag = "Mail",
    path = "/send",
    request_body = SendEmailBody,
    responses(
        (status = StatusCode::OK, description = "Email accepted by the SMTP server", body = SendEmailResponse),
        (status = StatusCode::BAD_REQUEST, description = "Body is not valid JSON", body = String, content_type = "text/plain"),
        (status = StatusCode::METHOD_NOT_ALLOWED, description = "Method other than POST", body = String, content_type = "text/plain"),
        (status = StatusCode::INTERNAL_SERVER_ERROR, description = "Delivery failed", body = String, content_type = "text/plain"),
    )
)]
pub async fn handler<M: Mailer>(
    State(state): State<AppState<M>>,
    body: Bytes,
) -> Result<SendEmailResponse, ApiError> {
    let request: SendEmailBody = serde_json::from_slice(&body)?;

    state.mailer.send_email(&request.into()).await?;

    Ok(SendEmailResponse::ok())
}

/// Rejects every method other than POST
pub async fn method_not_allowed() -> impl IntoResponse {
    (
        [(header::ALLOW, "POST")],
        ApiError::new_405("Method not allowed"),
    )
}
