use actix_web::{dev::Payload, web::Bytes, FromRequest, HttpMessage, HttpRequest};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::pin::Pin;

use crate::error::{AppError, AppResult};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Request body accepted as JSON or as an HTML form
///
/// An empty body deserializes like `{}`, so a bodiless DELETE reports a
/// missing `_id` rather than a parse failure.
///
/// Usage in handlers:
/// ```ignore
/// async fn my_handler(body: IssuePayload<DeleteIssue>) -> HttpResponse {
///     let input = body.into_inner();
/// }
/// ```
#[derive(Debug)]
pub struct IssuePayload<T>(pub T);

impl<T> IssuePayload<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> FromRequest for IssuePayload<T>
where
    T: DeserializeOwned + 'static,
{
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let is_form = is_form_content_type(req.content_type());
        let body = Bytes::from_request(req, payload);

        Box::pin(async move {
            let bytes = body
                .await
                .map_err(|e| AppError::InvalidBody(e.to_string()))?;

            parse_body(&bytes, is_form).map(IssuePayload)
        })
    }
}

/// MIME types compare case-insensitively
fn is_form_content_type(content_type: &str) -> bool {
    content_type.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE)
}

/// Decodes a JSON or urlencoded body
pub fn parse_body<T: DeserializeOwned>(bytes: &[u8], is_form: bool) -> AppResult<T> {
    let parsed = if is_form {
        serde_urlencoded::from_bytes(bytes).map_err(|e| e.to_string())
    } else if bytes.iter().all(u8::is_ascii_whitespace) {
        serde_json::from_slice(b"{}").map_err(|e| e.to_string())
    } else {
        serde_json::from_slice(bytes).map_err(|e| e.to_string())
    };

    parsed.map_err(|e| {
        log::debug!("Rejected request body: {}", e);
        AppError::InvalidBody(e)
    })
}
