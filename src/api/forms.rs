//! Request body and query extraction for form submissions.

use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    http::{StatusCode, header::CONTENT_TYPE},
};
use serde::Deserialize;

use super::ApiError;
use crate::domain::PageNumber;
use crate::validation::{FormInput, UploadedFile};

/// A submitted form as [`FormInput`]. Accepts `multipart/form-data`,
/// JSON objects and url-encoded bodies.
#[derive(Debug)]
pub struct FormPayload(pub FormInput);

fn body_error(status: StatusCode, message: String) -> ApiError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(message)
    } else {
        ApiError::BadRequest(message)
    }
}

impl<S> FromRequest<S> for FormPayload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| body_error(e.status(), e.body_text()))?;
            return read_multipart(multipart).await.map(Self);
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| body_error(e.status(), e.body_text()))?;

        if content_type.starts_with("application/json") {
            if bytes.is_empty() {
                return Ok(Self(FormInput::new()));
            }
            let value: serde_json::Value = serde_json::from_slice(&bytes)
                .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {e}")))?;
            return Ok(Self(FormInput::from_json(&value)));
        }

        let mut input = FormInput::new();
        for (key, value) in url::form_urlencoded::parse(&bytes) {
            input.push_text(&key, &value);
        }
        Ok(Self(input))
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<FormInput, ApiError> {
    let mut input = FormInput::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| body_error(e.status(), e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if let Some(file_name) = field.file_name().map(str::to_string) {
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| body_error(e.status(), e.body_text()))?;

            input.push_file(
                &name,
                UploadedFile {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                },
            );
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| body_error(e.status(), e.body_text()))?;
            input.push_text(&name, &text);
        }
    }

    Ok(input)
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    /// Requested page; missing, malformed or zero means the first page.
    #[must_use]
    pub fn page(&self) -> PageNumber {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<u64>().ok())
            .map(PageNumber::new)
            .unwrap_or_default()
    }
}

/// Parses a route id; anything that is not a positive integer is a 404.
pub fn parse_id(raw: &str, resource: &str) -> Result<i32, ApiError> {
    raw.parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::not_found(resource, raw))
}
