use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use crate::client::{ChatBackend, ChatRequest, ClientError};
use crate::core::credential::ApiKey;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Blocking client for the OpenAI HTTP API (or anything speaking it)
pub struct OpenAiBackend {
    client: Client,
    base_url: String,
}

impl OpenAiBackend {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

impl ChatBackend for OpenAiBackend {
    fn list_models(&self, key: &ApiKey) -> Result<(), ClientError> {
        let url = self.endpoint("models");
        debug!(%url, "checking API key");

        let response = self.client.get(url).bearer_auth(key.as_str()).send()?;
        check_status(response)?;
        Ok(())
    }

    fn complete(&self, key: &ApiKey, request: &ChatRequest) -> Result<String, ClientError> {
        let url = self.endpoint("chat/completions");
        debug!(%url, model = %request.model, "sending chat request");

        let response = self
            .client
            .post(url)
            .bearer_auth(key.as_str())
            .json(request)
            .send()?;
        let completion: ChatCompletion = check_status(response)?.json()?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ClientError::EmptyReply)
    }
}

/// Turn a non-2xx response into a typed error, keeping the service's message
fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| {
            if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("no details").to_string()
            } else {
                body.trim().to_string()
            }
        });

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ClientError::Unauthorized {
            status: status.as_u16(),
            message,
        }),
        _ => Err(ClientError::Status {
            status: status.as_u16(),
            message,
        }),
    }
}
