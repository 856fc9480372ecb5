use std::collections::HashMap;

use axum::{
    http::{header::CONTENT_TYPE, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Response envelope handed back to the dispatcher.
///
/// One shape covers both outcomes: success paths fill `isBase64Encoded`,
/// `headers` and `body`; failure paths fill `errorTitle` and `errorDetail`
/// (plus `body` for creation failures, which echo the original payload).
/// Unset fields are skipped during serialization, so the wire shapes stay
/// distinct even though callers parse a single type.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_base64_encoded: Option<bool>,
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

fn cors_headers() -> HashMap<String, String> {
    HashMap::from([("Access-Control-Allow-Origin".to_string(), "*".to_string())])
}

impl Envelope {
    fn success(status_code: u16, body: String) -> Self {
        Envelope {
            is_base64_encoded: Some(false),
            status_code,
            headers: Some(cors_headers()),
            body: Some(body),
            error_title: None,
            error_detail: None,
        }
    }

    fn failure(status_code: u16, title: &str, detail: String) -> Self {
        Envelope {
            is_base64_encoded: None,
            status_code,
            headers: None,
            body: None,
            error_title: Some(title.to_string()),
            error_detail: Some(detail),
        }
    }

    /// 200 with the serialized payload as the response body.
    pub fn ok(body: String) -> Self {
        Self::success(200, body)
    }

    /// 201 echoing the caller's payload.
    pub fn created(body: String) -> Self {
        Self::success(201, body)
    }

    /// 404: the store responded without a usable collection.
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::failure(404, "Not Found", detail.into())
    }

    /// 400: the store call itself failed.
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::failure(400, "Bad Request", detail.into())
    }

    /// 422: payload parse failure or store write failure. Carries the
    /// original unparsed payload back to the caller.
    pub fn unprocessable(detail: impl Into<String>, payload: String) -> Self {
        let mut envelope = Self::failure(422, "Unprocessable Entity", detail.into());
        envelope.body = Some(payload);
        envelope
    }

    pub fn is_error(&self) -> bool {
        self.error_title.is_some()
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Failure envelopes travel whole, as a JSON body.
        if self.is_error() {
            return (status, Json(self)).into_response();
        }

        // Success envelopes unwrap: the body is already serialized JSON
        // and the envelope headers become response headers.
        let headers = self.headers.unwrap_or_default();
        let mut response = (status, self.body.unwrap_or_default()).into_response();
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(&value),
            ) {
                response.headers_mut().insert(name, value);
            }
        }
        response
    }
}
