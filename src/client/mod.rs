use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::credential::{ApiKey, KEY_PREFIX};
use crate::core::request::{AnalysisRequest, MODEL, SYSTEM_PROMPT, TEMPERATURE};
use crate::core::verdict::AnalysisResult;
use crate::session::Session;

pub mod openai;

/// Failure talking to the remote service
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unauthorized (HTTP {status}): {message}")]
    Unauthorized { status: u16, message: String },

    #[error("Service error (HTTP {status}): {message}")]
    Status { status: u16, message: String },

    #[error("Reply contained no message content")]
    EmptyReply,

    #[error("Failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Why `set_and_verify` refused a candidate key
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("API key must start with '{}'.", KEY_PREFIX)]
    InvalidFormat,

    #[error("The API key was rejected by OpenAI.")]
    Rejected(#[source] ClientError),
}

impl VerifyError {
    pub fn title(&self) -> &'static str {
        match self {
            VerifyError::InvalidFormat => "Invalid Format",
            VerifyError::Rejected(_) => "Authentication Failed",
        }
    }
}

/// Input problems caught before any network call
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AnalyzeError {
    #[error("Please set your API key first.")]
    MissingKey,

    #[error("Please enter a URL to analyze.")]
    MissingUrl,
}

impl AnalyzeError {
    pub fn title(&self) -> &'static str {
        match self {
            AnalyzeError::MissingKey => "Missing Key",
            AnalyzeError::MissingUrl => "Missing URL",
        }
    }
}

/// Outcome of a successful `set_and_verify`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyUpdate {
    /// Blank input, nothing changed
    Unchanged,
    /// Key accepted online and committed to the session
    Verified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Body of a chat-completions call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

impl ChatRequest {
    /// System prompt followed by the JSON-encoded request
    pub fn classify(request: &AnalysisRequest) -> Result<Self, ClientError> {
        Ok(Self {
            model: MODEL.to_string(),
            messages: vec![
                ChatMessage {
                    role: Role::System,
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: Role::User,
                    content: request.to_user_message()?,
                },
            ],
            temperature: TEMPERATURE,
        })
    }
}

/// Transport to an OpenAI-compatible service
pub trait ChatBackend {
    /// Cheap authenticated read, used to check a key
    fn list_models(&self, key: &ApiKey) -> Result<(), ClientError>;

    /// Send one chat request and return the reply text
    fn complete(&self, key: &ApiKey, request: &ChatRequest) -> Result<String, ClientError>;
}

pub struct Classifier<B> {
    backend: B,
}

impl<B: ChatBackend> Classifier<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Check `raw` and, if the service accepts it, make it the session key.
    ///
    /// `on_check` runs right before the network call. On any failure the
    /// session keeps its previous key.
    pub fn set_and_verify(
        &self,
        session: &mut Session,
        raw: &str,
        on_check: impl FnOnce(),
    ) -> Result<KeyUpdate, VerifyError> {
        let candidate = raw.trim();
        if candidate.is_empty() {
            return Ok(KeyUpdate::Unchanged);
        }

        let key = ApiKey::new(candidate).map_err(|_| VerifyError::InvalidFormat)?;

        on_check();
        if let Err(e) = self.backend.list_models(&key) {
            warn!(key = %key, error = %e, "API key verification failed");
            return Err(VerifyError::Rejected(e));
        }

        info!(key = %key, "API key verified");
        session.commit(key);
        Ok(KeyUpdate::Verified)
    }

    /// Classify `url` with the session key.
    ///
    /// Input problems are returned as errors before anything is sent; every
    /// remote failure is folded into an `error` verdict.
    pub fn analyze(&self, session: &Session, url: &str) -> Result<AnalysisResult, AnalyzeError> {
        let key = session.api_key().ok_or(AnalyzeError::MissingKey)?;

        let url = url.trim();
        if url.is_empty() {
            return Err(AnalyzeError::MissingUrl);
        }

        Ok(self.analyze_request(key, &AnalysisRequest::new(url)))
    }

    /// Classify a fully built request, evidence included
    pub fn analyze_request(&self, key: &ApiKey, request: &AnalysisRequest) -> AnalysisResult {
        debug!(url = %request.url, "classifying URL");

        let reply = ChatRequest::classify(request)
            .and_then(|chat| self.backend.complete(key, &chat));

        let reply = match reply {
            Ok(reply) => reply,
            Err(e) => {
                warn!(url = %request.url, error = %e, "classification request failed");
                return AnalysisResult::error(e.to_string());
            }
        };

        match parse_reply(&reply) {
            Ok(result) => {
                debug!(verdict = %result.verdict, confidence = result.confidence, "classified");
                result
            }
            Err(e) => {
                warn!(error = %e, "reply is not a JSON object of the expected shape");
                AnalysisResult::invalid_json()
            }
        }
    }
}

/// Only a JSON object is a result; a derived struct would also take `["phishing", 0.9, ".."]`
fn parse_reply(reply: &str) -> serde_json::Result<AnalysisResult> {
    let value: serde_json::Value = serde_json::from_str(reply.trim())?;
    if !value.is_object() {
        return Err(serde::de::Error::custom("expected a JSON object"));
    }
    serde_json::from_value(value)
}


#[cfg(test)]
mod tests {
    use super::testing::StubBackend;
    use super::*;
    use crate::core::verdict::Verdict;

    fn session() -> Session {
        Session::with_key(ApiKey::new("sk-test").unwrap())
    }

    #[test]
    fn test_analyze_parses_reply() {
        let classifier = Classifier::new(StubBackend::replying(
            r#"{"verdict":"phishing","confidence":0.93,"rationale":"Homoglyph domain."}"#,
        ));

        let result = classifier
            .analyze(&session(), "http://paypal-secure-login.example")
            .unwrap();

        assert_eq!(result.verdict, Verdict::Phishing);
        assert_eq!(result.confidence_display(), "0.93");
        assert_eq!(result.rationale, "Homoglyph domain.");
    }

    #[test]
    fn test_analyze_trims_reply_whitespace() {
        let classifier = Classifier::new(StubBackend::replying(
            "\n  {\"verdict\":\"normal\",\"confidence\":0.8,\"rationale\":\"ok\"}  \n",
        ));

        let result = classifier.analyze(&session(), "https://example.com").unwrap();
        assert_eq!(result.verdict, Verdict::Normal);
    }

    #[test]
    fn test_analyze_invalid_json() {
        let classifier = Classifier::new(StubBackend::replying("not json at all"));

        let result = classifier.analyze(&session(), "http://a.example").unwrap();

        assert_eq!(result, AnalysisResult::invalid_json());
        assert_eq!(result.confidence_display(), "0.00");
    }

    #[test]
    fn test_analyze_json_of_wrong_shape_is_invalid() {
        for reply in [r#"["phishing",0.9,"x"]"#, r#""phishing""#, "0.9", "null"] {
            let classifier = Classifier::new(StubBackend::replying(reply));

            let result = classifier.analyze(&session(), "http://a.example").unwrap();

            assert_eq!(result, AnalysisResult::invalid_json(), "reply: {reply}");
        }
    }

    #[test]
    fn test_analyze_non_numeric_confidence_is_invalid() {
        let classifier = Classifier::new(StubBackend::replying(
            r#"{"verdict":"phishing","confidence":"high","rationale":"x"}"#,
        ));

        let result = classifier.analyze(&session(), "http://a.example").unwrap();
        assert_eq!(result, AnalysisResult::invalid_json());
    }

    #[test]
    fn test_analyze_transport_failure_uses_error_text() {
        let classifier = Classifier::new(StubBackend::failing("upstream overloaded"));

        let result = classifier.analyze(&session(), "http://a.example").unwrap();

        assert!(result.is_error());
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.rationale, "Service error (HTTP 503): upstream overloaded");
    }

    #[test]
    fn test_analyze_missing_key_sends_nothing() {
        let classifier = Classifier::new(StubBackend::replying("{}"));

        let err = classifier
            .analyze(&Session::new(), "http://a.example")
            .unwrap_err();

        assert_eq!(err, AnalyzeError::MissingKey);
        assert_eq!(err.title(), "Missing Key");
        assert_eq!(classifier.backend().request_count(), 0);
    }

    #[test]
    fn test_analyze_missing_url_sends_nothing() {
        let classifier = Classifier::new(StubBackend::replying("{}"));

        for url in ["", "   ", "\t\n"] {
            let err = classifier.analyze(&session(), url).unwrap_err();
            assert_eq!(err, AnalyzeError::MissingUrl);
        }
        assert_eq!(classifier.backend().request_count(), 0);
    }

    #[test]
    fn test_missing_key_is_reported_before_missing_url() {
        let classifier = Classifier::new(StubBackend::replying("{}"));
        let err = classifier.analyze(&Session::new(), "").unwrap_err();
        assert_eq!(err, AnalyzeError::MissingKey);
    }

    #[test]
    fn test_request_shape() {
        let classifier = Classifier::new(StubBackend::replying("{}"));
        classifier
            .analyze(&session(), "  http://paypal-secure-login.example ")
            .unwrap();

        let requests = classifier.backend().requests.borrow();
        let request = &requests[0];
        assert_eq!(request.model, "gpt-4.1");
        assert_eq!(request.temperature, 0.0);
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[0].content, SYSTEM_PROMPT);
        assert_eq!(request.messages[1].role, Role::User);
        assert_eq!(
            request.messages[1].content,
            r#"{"url":"http://paypal-secure-login.example","evidence":null}"#
        );
    }

    #[test]
    fn test_set_and_verify_commits_on_success() {
        let classifier = Classifier::new(StubBackend::replying(""));
        let mut session = Session::new();
        let mut checked = false;

        let update = classifier
            .set_and_verify(&mut session, "  sk-fresh  ", || checked = true)
            .unwrap();

        assert_eq!(update, KeyUpdate::Verified);
        assert!(checked);
        assert_eq!(session.api_key().unwrap().as_str(), "sk-fresh");
    }

    #[test]
    fn test_set_and_verify_blank_is_noop() {
        let classifier = Classifier::new(StubBackend::replying(""));
        let mut session = Session::new();

        let update = classifier.set_and_verify(&mut session, "   ", || {}).unwrap();

        assert_eq!(update, KeyUpdate::Unchanged);
        assert!(!session.has_key());
        assert_eq!(classifier.backend().model_calls.get(), 0);
    }

    #[test]
    fn test_set_and_verify_bad_format_skips_network() {
        let classifier = Classifier::new(StubBackend::replying(""));
        let mut session = Session::new();

        let err = classifier
            .set_and_verify(&mut session, "pk-live", || {})
            .unwrap_err();

        assert!(matches!(err, VerifyError::InvalidFormat));
        assert_eq!(err.title(), "Invalid Format");
        assert_eq!(classifier.backend().model_calls.get(), 0);
    }

    #[test]
    fn test_set_and_verify_rejected_keeps_previous_key() {
        let classifier = Classifier::new(StubBackend::rejecting_keys());
        let mut session = Session::with_key(ApiKey::new("sk-previous").unwrap());

        let err = classifier
            .set_and_verify(&mut session, "sk-rejected", || {})
            .unwrap_err();

        assert!(matches!(err, VerifyError::Rejected(_)));
        assert_eq!(err.title(), "Authentication Failed");
        assert_eq!(session.api_key().unwrap().as_str(), "sk-previous");
    }
}
