use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Rationale used when the service replies with something that is not JSON
pub const INVALID_JSON_RATIONALE: &str = "Invalid JSON response.";

/// Classification outcome
///
/// The first three come from the service, `Error` is synthesized locally when
/// a call fails. Anything else the service sends is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Verdict {
    Phishing,
    Normal,
    Unknown,
    Error,
    #[default]
    Empty,
    Other(String),
}

impl Verdict {
    pub fn as_str(&self) -> &str {
        match self {
            Verdict::Phishing => "phishing",
            Verdict::Normal => "normal",
            Verdict::Unknown => "unknown",
            Verdict::Error => "error",
            Verdict::Empty => "",
            Verdict::Other(s) => s,
        }
    }
}

impl From<String> for Verdict {
    fn from(s: String) -> Self {
        match s.as_str() {
            "phishing" => Verdict::Phishing,
            "normal" => Verdict::Normal,
            "unknown" => Verdict::Unknown,
            "error" => Verdict::Error,
            "" => Verdict::Empty,
            _ => Verdict::Other(s),
        }
    }
}

impl From<Verdict> for String {
    fn from(v: Verdict) -> String {
        v.as_str().to_string()
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parsed reply of one classification call.
///
/// Fields the service leaves out fall back to empty / zero; values are not
/// range-checked.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub verdict: Verdict,

    #[serde(default)]
    pub confidence: f64,

    #[serde(default)]
    pub rationale: String,
}

impl AnalysisResult {
    /// Synthetic result for a failed call
    pub fn error(rationale: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::Error,
            confidence: 0.0,
            rationale: rationale.into(),
        }
    }

    pub fn invalid_json() -> Self {
        Self::error(INVALID_JSON_RATIONALE)
    }

    pub fn is_error(&self) -> bool {
        self.verdict == Verdict::Error
    }

    /// Confidence as shown in the form, always two decimals
    pub fn confidence_display(&self) -> String {
        format!("{:.2}", self.confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_from_string() {
        assert_eq!(Verdict::from("phishing".to_string()), Verdict::Phishing);
        assert_eq!(Verdict::from("normal".to_string()), Verdict::Normal);
        assert_eq!(Verdict::from("unknown".to_string()), Verdict::Unknown);
        assert_eq!(Verdict::from("error".to_string()), Verdict::Error);
        assert_eq!(
            Verdict::from("suspicious".to_string()),
            Verdict::Other("suspicious".to_string())
        );
    }

    #[test]
    fn test_parse_full_reply() {
        let reply = r#"{"verdict":"phishing","confidence":0.93,"rationale":"Homoglyph domain."}"#;
        let result: AnalysisResult = serde_json::from_str(reply).unwrap();

        assert_eq!(result.verdict, Verdict::Phishing);
        assert_eq!(result.confidence_display(), "0.93");
        assert_eq!(result.rationale, "Homoglyph domain.");
    }

    #[test]
    fn test_parse_partial_reply_uses_defaults() {
        let result: AnalysisResult = serde_json::from_str(r#"{"verdict":"normal"}"#).unwrap();

        assert_eq!(result.verdict, Verdict::Normal);
        assert_eq!(result.confidence_display(), "0.00");
        assert_eq!(result.rationale, "");
    }

    #[test]
    fn test_parse_keeps_out_of_contract_values() {
        let reply = r#"{"verdict":"maybe","confidence":7,"rationale":"x"}"#;
        let result: AnalysisResult = serde_json::from_str(reply).unwrap();

        assert_eq!(result.verdict.as_str(), "maybe");
        assert_eq!(result.confidence_display(), "7.00");
    }

    #[test]
    fn test_error_result() {
        let result = AnalysisResult::invalid_json();
        assert!(result.is_error());
        assert_eq!(result.verdict.as_str(), "error");
        assert_eq!(result.confidence_display(), "0.00");
        assert_eq!(result.rationale, "Invalid JSON response.");
    }

    #[test]
    fn test_confidence_rounding() {
        let result = AnalysisResult {
            verdict: Verdict::Unknown,
            confidence: 0.405,
            rationale: String::new(),
        };
        assert_eq!(result.confidence_display().len(), 4);
        assert!(result.confidence_display().starts_with("0.4"));
    }
}
