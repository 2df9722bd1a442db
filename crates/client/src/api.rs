//! Transport to the onboarding backend.

use async_trait::async_trait;
use onboard_core::onboarding::{FinalizeConfirmation, OnboardingRecord};
use onboard_core::types::DbId;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ClientError;

/// Identity issued by sign-up and login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: DbId,
    pub email: String,
    pub token: String,
}

/// The backend operations the session needs.
#[async_trait]
pub trait OnboardingApi: Send + Sync {
    async fn signup(&self, email: &str, password: &str) -> Result<Identity, ClientError>;

    async fn login(&self, email: &str, password: &str) -> Result<Identity, ClientError>;

    /// `GET /onboarding`. A missing record is [`ClientError::NotFound`].
    async fn fetch_onboarding(&self, token: &str) -> Result<OnboardingRecord, ClientError>;

    async fn autosave(
        &self,
        token: &str,
        step: &str,
        data: &Value,
        current_step: Option<i32>,
    ) -> Result<OnboardingRecord, ClientError>;

    async fn finalize(&self, token: &str) -> Result<FinalizeConfirmation, ClientError>;
}

/// [`OnboardingApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpOnboardingApi {
    client: reqwest::Client,
    /// Base URL including the `/api` prefix, without a trailing slash.
    base_url: String,
}

/// Default base URL of a locally running backend.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5001/api";

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    code: String,
}

impl HttpOnboardingApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn post_credentials(
        &self,
        path: &str,
        email: &str,
        password: &str,
    ) -> Result<Identity, ClientError> {
        let resp = self
            .client
            .post(self.url(path))
            .json(&Credentials { email, password })
            .send()
            .await?;
        decode(resp).await
    }
}

impl Default for HttpOnboardingApi {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait]
impl OnboardingApi for HttpOnboardingApi {
    async fn signup(&self, email: &str, password: &str) -> Result<Identity, ClientError> {
        self.post_credentials("/users", email, password).await
    }

    async fn login(&self, email: &str, password: &str) -> Result<Identity, ClientError> {
        self.post_credentials("/users/login", email, password).await
    }

    async fn fetch_onboarding(&self, token: &str) -> Result<OnboardingRecord, ClientError> {
        let resp = self
            .client
            .get(self.url("/onboarding"))
            .bearer_auth(token)
            .send()
            .await?;
        decode(resp).await
    }

    async fn autosave(
        &self,
        token: &str,
        step: &str,
        data: &Value,
        current_step: Option<i32>,
    ) -> Result<OnboardingRecord, ClientError> {
        let mut body = json!({ "step": step, "data": data });
        if let Some(current_step) = current_step {
            body["currentStep"] = json!(current_step);
        }

        tracing::debug!(step, "Sending autosave");
        let resp = self
            .client
            .post(self.url("/onboarding/autosave"))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        decode(resp).await
    }

    async fn finalize(&self, token: &str) -> Result<FinalizeConfirmation, ClientError> {
        let resp = self
            .client
            .post(self.url("/onboarding/finalize"))
            .bearer_auth(token)
            .json(&json!({}))
            .send()
            .await?;
        decode(resp).await
    }
}

/// Decode a success body, or turn the `{error, code}` body into a
/// [`ClientError`].
async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json::<T>().await?);
    }

    let text = resp.text().await.unwrap_or_default();
    Err(error_from_response(status, &text))
}

fn error_from_response(status: StatusCode, body: &str) -> ClientError {
    let (code, message) = match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => (parsed.code, parsed.error),
        Err(_) => (String::new(), body.to_string()),
    };

    match status {
        StatusCode::NOT_FOUND => ClientError::NotFound,
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized(message),
        _ => ClientError::Api {
            status: status.as_u16(),
            code,
            message,
        },
    }
}
