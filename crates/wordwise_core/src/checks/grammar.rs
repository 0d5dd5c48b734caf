//! Grammar checking against a LanguageTool-compatible HTTP service.

use crate::error::CheckError;
use crate::models::{Finding, GrammarRule};
use crate::text::utf16_to_char_offset;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// A grammar backend. Implementations must be callable from a worker thread.
pub trait GrammarService: Send + Sync {
    /// Check `text` written in `language` and return grammar findings.
    ///
    /// # Errors
    /// Returns [`CheckError`] for transport, status, or payload failures.
    fn check(&self, text: &str, language: &str) -> Result<Vec<Finding>, CheckError>;
}

/// Grammar backend used when grammar checking is switched off.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledGrammar;

impl GrammarService for DisabledGrammar {
    fn check(&self, _text: &str, _language: &str) -> Result<Vec<Finding>, CheckError> {
        Ok(Vec::new())
    }
}

#[derive(Debug, Deserialize)]
struct CheckResponse {
    matches: Vec<Match>,
}

#[derive(Debug, Deserialize)]
struct Match {
    message: String,
    offset: usize,
    length: usize,
    #[serde(default)]
    replacements: Vec<Replacement>,
    rule: Option<Rule>,
}

#[derive(Debug, Deserialize)]
struct Replacement {
    value: String,
}

#[derive(Debug, Deserialize)]
struct Rule {
    id: String,
    #[serde(default)]
    description: String,
    category: Option<Category>,
}

#[derive(Debug, Deserialize)]
struct Category {
    id: String,
}

/// Decode a LanguageTool `/v2/check` response body into findings.
///
/// LanguageTool reports offsets in UTF-16 code units; they are converted to
/// char offsets of `text`.
///
/// # Errors
/// Returns [`CheckError::Malformed`] when the body is not the expected JSON
/// or a match span does not fit in `usize`.
pub fn parse_response(text: &str, body: &str) -> Result<Vec<Finding>, CheckError> {
    let response: CheckResponse =
        serde_json::from_str(body).map_err(|err| CheckError::Malformed(err.to_string()))?;

    response
        .matches
        .into_iter()
        .map(|found| {
            let found_end = found.offset.checked_add(found.length).ok_or_else(|| {
                CheckError::Malformed(format!(
                    "match span overflows: offset {} length {}",
                    found.offset, found.length
                ))
            })?;
            let start = utf16_to_char_offset(text, found.offset);
            let end = utf16_to_char_offset(text, found_end);
            let rule = found.rule.map(|rule| GrammarRule {
                id: rule.id,
                description: rule.description,
                category: rule.category.map(|category| category.id).unwrap_or_default(),
            });
            Ok(Finding::grammar(
                found.message,
                start,
                end.saturating_sub(start),
                found.replacements.into_iter().map(|r| r.value).collect(),
                rule,
            ))
        })
        .collect()
}

/// Blocking LanguageTool client.
pub struct LanguageToolClient {
    http: reqwest::blocking::Client,
    endpoint: String,
}

impl LanguageToolClient {
    /// Build a client for `endpoint` with a per-request timeout.
    ///
    /// # Errors
    /// Returns [`CheckError::Http`] when the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, CheckError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl GrammarService for LanguageToolClient {
    fn check(&self, text: &str, language: &str) -> Result<Vec<Finding>, CheckError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .http
            .post(&self.endpoint)
            .form(&[("text", text), ("language", language)])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(CheckError::Status(status.as_u16()));
        }

        let body = response.text()?;
        let findings = parse_response(text, &body)?;
        debug!(
            target: "wordwise_core::checks",
            matches = findings.len(),
            language = language,
            "grammar response decoded"
        );
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "software": {"name": "LanguageTool"},
        "matches": [{
            "message": "Did you mean \"is\"?",
            "offset": 5,
            "length": 2,
            "replacements": [{"value": "is"}],
            "rule": {
                "id": "BE_AGREEMENT",
                "description": "Subject-verb agreement",
                "category": {"id": "GRAMMAR", "name": "Grammar"}
            }
        }]
    }"#;

    #[test]
    fn parse_response_maps_matches() {
        let findings = parse_response("This are fine.", BODY).expect("findings");
        assert_eq!(findings.len(), 1);
        let finding = &findings[0];
        assert_eq!(finding.text, "Did you mean \"is\"?");
        assert_eq!((finding.start, finding.length), (5, 2));
        assert_eq!(finding.suggestions, vec!["is".to_string()]);
        let rule = finding.rule.as_ref().expect("rule");
        assert_eq!(rule.id, "BE_AGREEMENT");
        assert_eq!(rule.category, "GRAMMAR");
    }

    #[test]
    fn parse_response_converts_utf16_offsets() {
        let body = r#"{"matches":[{"message":"m","offset":3,"length":2,"replacements":[]}]}"#;
        let findings = parse_response("😀 ab", body).expect("findings");
        assert_eq!((findings[0].start, findings[0].length), (2, 2));
        assert!(findings[0].rule.is_none());
    }

    #[test]
    fn parse_response_rejects_malformed_payloads() {
        for body in ["", "not json", r#"{"results": []}"#] {
            let err = parse_response("text", body).expect_err("malformed");
            assert!(matches!(err, CheckError::Malformed(_)), "body: {body}");
        }
    }

    #[test]
    fn parse_response_rejects_overflowing_spans() {
        let body = format!(
            r#"{{"matches":[{{"message":"m","offset":{},"length":1,"replacements":[]}}]}}"#,
            usize::MAX
        );
        let err = parse_response("abc", &body).expect_err("overflowing span");
        assert!(matches!(err, CheckError::Malformed(_)));

        let past_end = r#"{"matches":[{"message":"m","offset":40,"length":2,"replacements":[]}]}"#;
        let findings = parse_response("abc", past_end).expect("clamped");
        assert_eq!((findings[0].start, findings[0].length), (3, 0));
    }

    #[test]
    fn blank_text_skips_the_request() {
        let client = LanguageToolClient::new("http://127.0.0.1:9/v2/check", Duration::from_millis(50))
            .expect("client");
        assert!(client.check("   \n", "en-US").expect("no request").is_empty());
    }

    #[test]
    fn unreachable_service_is_an_error() {
        let client = LanguageToolClient::new("http://127.0.0.1:9/v2/check", Duration::from_millis(200))
            .expect("client");
        assert!(client.check("Some text.", "en-US").is_err());
    }
}
