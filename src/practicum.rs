//! Client for the Practicum homework-status API: one authenticated GET per
//! poll cycle plus shape validation of the returned JSON.
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::practicum::model::PollResponse;

pub mod model;

const PRACTICUM_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";
const HOMEWORKS_FIELD: &str = "homeworks";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("status request failed with HTTP status {0}")]
    BadStatus(StatusCode),
    #[error("response body is not valid JSON: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("response root is not a JSON object")]
    NotAnObject,
    #[error("response object has no \"{0}\" field")]
    MissingField(&'static str),
    #[error("\"{0}\" field is not a list")]
    WrongType(&'static str),
    #[error("homework entry does not match the documented schema: {0}")]
    Malformed(#[source] serde_json::Error),
}

/// Seam between the poll loop and the real HTTP client; tests substitute
/// recording fakes.
#[async_trait]
pub trait StatusApi: Send + Sync {
    async fn fetch(&self, from_date: i64) -> Result<Value, FetchError>;
}

#[derive(Clone)]
pub struct PracticumClient {
    http: Client,
    base_url: Url,
    token: String,
}

impl fmt::Debug for PracticumClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PracticumClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl PracticumClient {
    pub fn new(token: String, timeout: Duration) -> Self {
        let base_url = Url::parse(PRACTICUM_ENDPOINT).expect("valid default Practicum URL");
        Self::with_base_url(token, base_url, timeout)
    }

    pub fn with_base_url(token: String, base_url: Url, timeout: Duration) -> Self {
        let http = Client::builder()
            .user_agent("tg-statusbot/0.1")
            .timeout(timeout)
            .build()
            .expect("reqwest client");
        Self {
            http,
            base_url,
            token,
        }
    }

    pub fn build_request(&self, from_date: i64) -> Result<reqwest::Request, FetchError> {
        self.http
            .get(self.base_url.clone())
            .header("Authorization", format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .build()
            .map_err(|err| FetchError::Transport(err.to_string()))
    }
}

#[async_trait]
impl StatusApi for PracticumClient {
    async fn fetch(&self, from_date: i64) -> Result<Value, FetchError> {
        let request = self.build_request(from_date)?;
        let res = self
            .http
            .execute(request)
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        if res.status() != StatusCode::OK {
            return Err(FetchError::BadStatus(res.status()));
        }
        res.json::<Value>()
            .await
            .map_err(|err| FetchError::Decode(err.to_string()))
    }
}

/// Enforce the documented response shape before any field is read. Checks
/// run in order and stop at the first violation.
pub fn validate(raw: &Value) -> Result<PollResponse, ValidationError> {
    let object = raw.as_object().ok_or(ValidationError::NotAnObject)?;
    let homeworks = object
        .get(HOMEWORKS_FIELD)
        .ok_or(ValidationError::MissingField(HOMEWORKS_FIELD))?;
    if !homeworks.is_array() {
        return Err(ValidationError::WrongType(HOMEWORKS_FIELD));
    }
    serde_json::from_value(raw.clone()).map_err(ValidationError::Malformed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> PracticumClient {
        PracticumClient::new("token".into(), Duration::from_secs(30))
    }

    #[test]
    fn build_request_sets_auth_header_and_cursor() {
        let request = client().build_request(1_700_000_000).unwrap();
        assert_eq!(request.method(), reqwest::Method::GET);
        assert_eq!(
            request
                .headers()
                .get("Authorization")
                .and_then(|h| h.to_str().ok())
                .unwrap(),
            "OAuth token"
        );
        assert_eq!(request.url().query(), Some("from_date=1700000000"));
    }

    #[test]
    fn validate_accepts_documented_shape() {
        let raw = json!({
            "homeworks": [{"homework_name": "diff", "status": "approved"}],
            "current_date": 1_700_000_123,
        });
        let response = validate(&raw).unwrap();
        assert_eq!(response.homeworks.len(), 1);
        assert_eq!(response.homeworks[0].homework_name.as_deref(), Some("diff"));
        assert_eq!(response.homeworks[0].status, "approved");
        assert_eq!(response.current_date, Some(1_700_000_123));
    }

    #[test]
    fn validate_accepts_empty_list_without_cursor() {
        let response = validate(&json!({"homeworks": []})).unwrap();
        assert!(response.homeworks.is_empty());
        assert_eq!(response.current_date, None);
    }

    #[test]
    fn validate_rejects_non_object_root() {
        let err = validate(&json!(["not", "an", "object"])).unwrap_err();
        assert!(matches!(err, ValidationError::NotAnObject));
    }

    #[test]
    fn validate_rejects_missing_homeworks_field() {
        let err = validate(&json!({"current_date": 1})).unwrap_err();
        assert!(matches!(err, ValidationError::MissingField("homeworks")));
    }

    #[test]
    fn validate_rejects_non_list_homeworks() {
        let err = validate(&json!({"homeworks": "later"})).unwrap_err();
        assert!(matches!(err, ValidationError::WrongType("homeworks")));
    }

    #[test]
    fn validate_rejects_malformed_entry() {
        let err = validate(&json!({"homeworks": [{"homework_name": "diff"}]})).unwrap_err();
        assert!(matches!(err, ValidationError::Malformed(_)));
    }
}
