//! Thin client for the backend HTTP API.
//!
//! Every helper attaches the session's bearer token and turns a non-2xx
//! response into an `ApiError` carrying the server's `{"error": ...}`
//! message. Mock sessions never reach the network.

use common::auth::{Session, SignInRequest};
use gloo_file::{Blob, ObjectUrl};
use gloo_net::http::{Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use web_sys::FormData;

#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The request never got an answer.
    Network(String),
    /// The server answered with an error status.
    Status(u16, String),
    /// The body could not be read or decoded.
    Decode(String),
    /// Mock sessions have no server to talk to.
    Offline,
}

impl ApiError {
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e) => write!(f, "The server could not be reached: {}", e),
            ApiError::Status(401, _) => f.write_str("Your session has expired. Please sign in again."),
            ApiError::Status(_, message) => f.write_str(message),
            ApiError::Decode(e) => write!(f, "Unexpected response: {}", e),
            ApiError::Offline => f.write_str("Not available in demo mode"),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// The message shown for an error response body.
pub fn error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.error,
        Err(_) if body.trim().is_empty() => format!("Request failed with status {}", status),
        Err(_) => body.trim().to_string(),
    }
}

fn authorized(builder: RequestBuilder, session: &Session) -> ApiResult<RequestBuilder> {
    if session.is_mock() {
        return Err(ApiError::Offline);
    }
    Ok(builder.header("Authorization", &format!("Bearer {}", session.token)))
}

async fn checked(response: Result<Response, gloo_net::Error>) -> ApiResult<Response> {
    let response = response.map_err(|e| ApiError::Network(e.to_string()))?;
    if response.ok() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status(status, error_message(status, &body)))
}

async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    response.json::<T>().await.map_err(|e| ApiError::Decode(e.to_string()))
}

pub async fn get<T: DeserializeOwned>(session: &Session, url: &str) -> ApiResult<T> {
    let request = authorized(Request::get(url), session)?;
    decode(checked(request.send().await).await?).await
}

pub async fn post<B: Serialize, T: DeserializeOwned>(session: &Session, url: &str, body: &B) -> ApiResult<T> {
    send(authorized(Request::post(url), session)?, body).await
}

pub async fn put<B: Serialize, T: DeserializeOwned>(session: &Session, url: &str, body: &B) -> ApiResult<T> {
    send(authorized(Request::put(url), session)?, body).await
}

async fn send<B: Serialize, T: DeserializeOwned>(builder: RequestBuilder, body: &B) -> ApiResult<T> {
    let request = builder.json(body).map_err(|e| ApiError::Decode(e.to_string()))?;
    decode(checked(request.send().await).await?).await
}

/// POST whose answer carries no body (204).
pub async fn post_empty<B: Serialize>(session: &Session, url: &str, body: &B) -> ApiResult<()> {
    let request = authorized(Request::post(url), session)?
        .json(body)
        .map_err(|e| ApiError::Decode(e.to_string()))?;
    checked(request.send().await).await.map(|_| ())
}

pub async fn upload<T: DeserializeOwned>(session: &Session, url: &str, form: FormData) -> ApiResult<T> {
    let request = authorized(Request::post(url), session)?
        .body(form)
        .map_err(|e| ApiError::Decode(e.to_string()))?;
    decode(checked(request.send().await).await?).await
}

/// Downloads a protected file into an object URL that iframes and links can
/// use without a bearer header. The URL is revoked when dropped.
pub async fn object_url(session: &Session, url: &str, mime: &str) -> ApiResult<ObjectUrl> {
    let request = authorized(Request::get(url), session)?;
    let bytes = checked(request.send().await)
        .await?
        .binary()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))?;
    Ok(ObjectUrl::from(Blob::new_with_options(bytes.as_slice(), Some(mime))))
}

pub async fn sign_in(email: &str, password: &str) -> ApiResult<Session> {
    let body = SignInRequest {
        email: email.to_string(),
        password: password.to_string(),
    };
    send(Request::post("/api/auth/sign_in"), &body).await
}

pub async fn sign_out(session: &Session) -> ApiResult<()> {
    let request = authorized(Request::post("/api/auth/sign_out"), session)?;
    checked(request.send().await).await.map(|_| ())
}

pub async fn current_session(session: &Session) -> ApiResult<Session> {
    get(session, "/api/auth/session").await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_bodies_are_unwrapped() {
        assert_eq!(error_message(409, r#"{"error":"email already in use"}"#), "email already in use");
        assert_eq!(error_message(500, ""), "Request failed with status 500");
        assert_eq!(error_message(502, "Bad Gateway\n"), "Bad Gateway");
    }

    #[test]
    fn expired_sessions_get_a_friendly_message() {
        let err = ApiError::Status(401, "missing bearer token".to_string());
        assert_eq!(err.to_string(), "Your session has expired. Please sign in again.");
        assert!(!err.is_network());
        assert!(ApiError::Network("refused".to_string()).is_network());
    }
}
