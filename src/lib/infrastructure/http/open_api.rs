//! OpenAPI module

use utoipa::OpenApi;

use crate::infrastructure::http::handlers::send;

#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "Mail Relay"),
    paths(send::handler),
    components(schemas(send::SendEmailBody, send::SendEmailResponse))
)]
pub struct ApiDocs;
