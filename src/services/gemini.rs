use log::{error, warn};
use regex::Regex;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Error)]
pub enum AiError {
    #[error("GEMINI_API_KEY not configured")]
    NotConfigured,
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Response error: {0}")]
    Response(String),
    #[error("No JSON found in model output")]
    NoJson,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Generative text client. Every structured call has a canned fallback, so a
/// missing key degrades features instead of failing requests.
#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    api_key: Option<String>,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_else(|e| {
                warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });

        Self {
            http,
            api_key,
            model: model.into(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, AiError> {
        let key = self.api_key.as_deref().ok_or(AiError::NotConfigured)?;
        let url = format!("{}/{}:generateContent", API_BASE, self.model);

        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        };

        let response = self
            .http
            .post(&url)
            .query(&[("key", key)])
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AiError::Response(format!("{}: {}", status, text)));
        }

        let parsed: GenerateResponse = response.json().await?;
        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(AiError::Response("empty candidate".to_string()));
        }
        Ok(text)
    }

    pub async fn generate_object(&self, prompt: &str) -> Result<Value, AiError> {
        let text = self.generate(prompt).await?;
        extract_json_object(&text).ok_or(AiError::NoJson)
    }

    pub async fn generate_array(&self, prompt: &str) -> Result<Value, AiError> {
        let text = self.generate(prompt).await?;
        extract_json_array(&text).ok_or(AiError::NoJson)
    }

    /// Object-shaped generation with a fallback for any failure. `context`
    /// names the feature in the log line.
    pub async fn object_or<F>(&self, context: &str, prompt: &str, fallback: F) -> Value
    where
        F: FnOnce() -> Value,
    {
        match self.generate_object(prompt).await {
            Ok(value) => value,
            Err(e) => {
                log_fallback(context, &e);
                fallback()
            }
        }
    }

    pub async fn array_or<F>(&self, context: &str, prompt: &str, fallback: F) -> Value
    where
        F: FnOnce() -> Value,
    {
        match self.generate_array(prompt).await {
            Ok(value) => value,
            Err(e) => {
                log_fallback(context, &e);
                fallback()
            }
        }
    }

    /// Like [`object_or`](Self::object_or) but decodes into a typed value.
    pub async fn typed_or<T, F>(&self, context: &str, prompt: &str, fallback: F) -> T
    where
        T: DeserializeOwned,
        F: FnOnce() -> T,
    {
        match self.generate_object(prompt).await {
            Ok(value) => match serde_json::from_value(value) {
                Ok(typed) => typed,
                Err(e) => {
                    warn!("{}: model output did not match expected shape: {}", context, e);
                    fallback()
                }
            },
            Err(e) => {
                log_fallback(context, &e);
                fallback()
            }
        }
    }
}

fn log_fallback(context: &str, err: &AiError) {
    match err {
        AiError::NotConfigured => warn!("{}: AI not configured, using fallback", context),
        other => error!("{}: {}, using fallback", context, other),
    }
}

fn object_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{[\s\S]*\}").expect("valid object regex"))
}

fn array_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[[\s\S]*\]").expect("valid array regex"))
}

/// Widest `{...}` span in the text, parsed as JSON.
pub fn extract_json_object(text: &str) -> Option<Value> {
    object_pattern()
        .find(text)
        .and_then(|m| serde_json::from_str(m.as_str()).ok())
        .filter(Value::is_object)
}

/// Widest `[...]` span in the text, parsed as JSON.
pub fn extract_json_array(text: &str) -> Option<Value> {
    array_pattern()
        .find(text)
        .and_then(|m| serde_json::from_str(m.as_str()).ok())
        .filter(Value::is_array)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_object_from_fenced_text() {
        let text = "Here you go:\n```json\n{\"days\": [{\"day\": 1}]}\n```\nEnjoy!";
        assert_eq!(extract_json_object(text), Some(json!({"days": [{"day": 1}]})));
    }

    #[test]
    fn test_extract_object_rejects_broken_json() {
        assert_eq!(extract_json_object("{ not json }"), None);
        assert_eq!(extract_json_object("no braces at all"), None);
    }

    #[test]
    fn test_extract_array() {
        let text = "Tips: [{\"tip\": \"walk\"}, {\"tip\": \"bus\"}] done";
        let value = extract_json_array(text).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
    }

    #[actix_rt::test]
    async fn test_unconfigured_client_uses_fallback() {
        let client = GeminiClient::new(None, "gemini-pro");
        assert!(!client.is_configured());
        assert!(matches!(
            client.generate("hello").await,
            Err(AiError::NotConfigured)
        ));

        let value = client
            .object_or("test", "prompt", || json!({"fallback": true}))
            .await;
        assert_eq!(value["fallback"], true);
    }
}
