use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Model every classification is sent to
pub const MODEL: &str = "gpt-4.1";

/// Sampling temperature; zero keeps verdicts deterministic
pub const TEMPERATURE: f32 = 0.0;

/// Instructions sent as the system message of every classification.
pub const SYSTEM_PROMPT: &str = r#"
You are **“Anti-Phish-GPT”**, a senior SOC (Security-Operations-Center) analyst.

╔════════ 1. TASK ═════════╗
Given one URL plus any optional evidence the caller appends
(e.g. WHOIS record, HTTP headers, HTML snippet, screenshot reference),
decide whether the URL is **phishing**, **normal**, or **unknown**.

╔════════ 2. OUTPUT ═════════╗
Return **ONLY** valid JSON, no prose before or after, in exactly this schema:
{
  "verdict": "phishing" | "normal" | "unknown",
  "confidence": 0-1  // float with two decimals, 1.00 = certain
  "rationale": "<≤160-char sentence for auditors>"
}

╔════════ 3. DECISION HEURISTICS (non-exhaustive) ═════════╗
A. DOMAIN & REGISTRATION
  • Brand-look-alike, homoglyph, or punycode domain? → phishing↑
  • Newly registered (≤180 days) or short-lived certificate? → phishing↑
B. URL STRUCTURE
  • IP-address host, excessive sub-domains, or typosquatting? → phishing↑
  • Query/path hints: “login”, “verify”, “reset”, “update-account”, base64 blobs? → phishing↑
C. CONTENT & INTENT (when HTML/screenshot given)
  • Fake login/payment forms, blurred logos, urgency banners, or mismatched favicon? → phishing↑
D. CONTEXTUAL SIGNALS
  • Positive reputation scores, age > 2 years, canonical brand domain, no credential forms → benign↑
E. INSUFFICIENT DATA
  • If evidence is conflicting or minimal, return "unknown" with confidence ≤ 0.40.

╔════════ 4. RULES OF ENGAGEMENT ═════════╗
  • **Determinism:** Set `temperature=0`. Think step-by-step **internally** but expose ONLY the JSON.
  • **No actions:** Never fetch or “click” the link; reason only over supplied evidence.
  • **JSON police:** If the verdict is “phishing”, confidence **must** be ≥ 0.50.
  • Escape any quotes in `rationale`; keep it single-line.

╔════════ 5. EXAMPLE RESPONSE (for auditors only) ═════════╗
{
  "verdict": "phishing",
  "confidence": 0.96,
  "rationale": "Homoglyph domain imitates paypal.com; WHOIS age 3 days; URL contains /login/verify."
}

--- END OF SYSTEM PROMPT ---
"#;

/// Supporting material a caller may attach to a URL.
///
/// The interactive form never collects any, but the classifier accepts it so
/// WHOIS or page captures can be wired in later.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Evidence {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whois: Option<String>,

    #[serde(rename = "httpHeaders", skip_serializing_if = "BTreeMap::is_empty", default)]
    pub http_headers: BTreeMap<String, String>,

    #[serde(rename = "htmlSnippet", skip_serializing_if = "Option::is_none")]
    pub html_snippet: Option<String>,

    #[serde(rename = "screenshotRef", skip_serializing_if = "Option::is_none")]
    pub screenshot_ref: Option<String>,
}

impl Evidence {
    pub fn is_empty(&self) -> bool {
        self.whois.is_none()
            && self.http_headers.is_empty()
            && self.html_snippet.is_none()
            && self.screenshot_ref.is_none()
    }
}

/// The user payload of a classification: `{"url": ..., "evidence": ...}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub url: String,
    pub evidence: Option<Evidence>,
}

impl AnalysisRequest {
    /// Request for a bare URL; `evidence` goes out as `null`
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            evidence: None,
        }
    }

    pub fn with_evidence(mut self, evidence: Evidence) -> Self {
        self.evidence = if evidence.is_empty() {
            None
        } else {
            Some(evidence)
        };
        self
    }

    /// JSON text sent as the user message
    pub fn to_user_message(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
