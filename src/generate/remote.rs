//! Remote generation backend — delegates the whole batch to a hosted
//! chat-completion endpoint and parses the reply as a JSON array.
//!
//! Thin network client: prompt templating on the way out, JSON extraction
//! on the way back. Any network or parse failure surfaces as one
//! [`GenerateError::Upstream`]; there is no partial result.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use super::{Generate, GenerateError, GenerateRequest, Record};
use crate::config::{GenerationConfig, ProviderConfig};

/// Outermost JSON array embedded in a completion that ignored the
/// "return only the array" instruction.
static JSON_ARRAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[\s\S]*\]").expect("valid regex"));

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// The online backend: one POST to `{base_url}/chat/completions`.
pub struct RemoteGenerator {
    client: reqwest::Client,
    provider: ProviderConfig,
    max_count: i64,
}

impl RemoteGenerator {
    pub fn new(provider: ProviderConfig, generation: GenerationConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(provider.timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            client,
            provider,
            max_count: generation.max_count,
        }
    }

    /// Natural-language instruction embedding count, prompt, and the
    /// optional explicit column list.
    fn build_instruction(&self, request: &GenerateRequest) -> String {
        let mut instruction = format!(
            "Generate {} rows of realistic data based on this request: {}\n\n",
            request.count,
            request.prompt.trim()
        );
        if let Some(fields) = request.fields.as_deref().filter(|f| !f.is_empty()) {
            instruction.push_str(&format!(
                "Use exactly these column names: {}\n",
                fields.join(", ")
            ));
        }
        if let Some(context) = request.context.as_deref().filter(|c| !c.trim().is_empty()) {
            instruction.push_str(&format!("Additional context: {}\n", context.trim()));
        }
        instruction.push_str(
            "\nIMPORTANT: Return ONLY a valid JSON array of objects. \
             No explanations, no markdown, no extra text. \
             Each object must have an 'id' field. \
             Make the data realistic and varied, with no null values.",
        );
        instruction
    }
}

/// Pull a record batch out of a completion body. Tolerates ```json fences
/// and surrounding prose, nothing else.
fn extract_records(content: &str) -> Result<Vec<Record>, GenerateError> {
    let mut trimmed = content.trim();
    if let Some(rest) = trimmed.strip_prefix("```json") {
        trimmed = rest;
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        trimmed = rest;
    }
    if let Some(rest) = trimmed.strip_suffix("```") {
        trimmed = rest;
    }
    let trimmed = trimmed.trim();

    let parsed: Value = match serde_json::from_str(trimmed) {
        Ok(value) => value,
        Err(_) => {
            let captured = JSON_ARRAY
                .find(trimmed)
                .ok_or_else(|| GenerateError::Upstream("response is not a JSON array".into()))?;
            serde_json::from_str(captured.as_str())
                .map_err(|e| GenerateError::Upstream(format!("malformed JSON array: {e}")))?
        }
    };

    let items = match parsed {
        Value::Array(items) => items,
        other => {
            return Err(GenerateError::Upstream(format!(
                "expected a JSON array, got {}",
                value_kind(&other)
            )))
        }
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::Object(record) => Ok(record),
            other => Err(GenerateError::Upstream(format!(
                "expected array of objects, got {}",
                value_kind(&other)
            ))),
        })
        .collect()
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[async_trait]
impl Generate for RemoteGenerator {
    async fn generate(&self, request: &GenerateRequest) -> Result<Vec<Record>, GenerateError> {
        if request.prompt.trim().is_empty() {
            return Err(GenerateError::EmptyPrompt);
        }
        if request.count < 0 || request.count > self.max_count {
            return Err(GenerateError::CountOutOfRange {
                count: request.count,
                max: self.max_count,
            });
        }

        let url = format!("{}/chat/completions", self.provider.base_url.trim_end_matches('/'));
        let payload = serde_json::json!({
            "model": self.provider.model,
            "messages": [{ "role": "user", "content": self.build_instruction(request) }],
            "temperature": 0.7,
            "max_tokens": 4096,
        });

        let mut req = self.client.post(&url).json(&payload);
        if let Some(key) = self.provider.api_key.as_deref().filter(|k| !k.is_empty()) {
            req = req.bearer_auth(key);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| GenerateError::Upstream(e.to_string()))?
            .error_for_status()
            .map_err(|e| GenerateError::Upstream(e.to_string()))?;

        let body: ChatCompletionResponse = resp
            .json()
            .await
            .map_err(|e| GenerateError::Upstream(format!("invalid completion body: {e}")))?;

        let content = body
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| GenerateError::Upstream("completion had no choices".into()))?;

        extract_records(content)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderKind;

    fn generator() -> RemoteGenerator {
        RemoteGenerator::new(
            ProviderConfig {
                kind: ProviderKind::Remote,
                base_url: "https://example.invalid/v1".to_string(),
                api_key: None,
                model: "test-model".to_string(),
                timeout_secs: 5,
            },
            GenerationConfig::default(),
        )
    }

    #[test]
    fn extracts_plain_array() {
        let records = extract_records(r#"[{"id": 1, "name": "Jane"}]"#).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["name"], "Jane");
    }

    #[test]
    fn strips_json_fences() {
        let body = "```json\n[{\"id\": 1}, {\"id\": 2}]\n```";
        let records = extract_records(body).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn finds_array_embedded_in_prose() {
        let body = "Here is your data:\n[{\"id\": 1, \"city\": \"Austin\"}]\nEnjoy!";
        let records = extract_records(body).unwrap();
        assert_eq!(records[0]["city"], "Austin");
    }

    #[test]
    fn rejects_non_array_payloads() {
        assert!(extract_records(r#"{"id": 1}"#).is_err());
        assert!(extract_records("no data here").is_err());
    }

    #[test]
    fn rejects_arrays_of_non_objects() {
        let err = extract_records("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, GenerateError::Upstream(_)));
    }

    #[test]
    fn instruction_embeds_count_prompt_and_fields() {
        let gen = generator();
        let instruction = gen.build_instruction(&GenerateRequest {
            prompt: "startup companies".to_string(),
            count: 7,
            fields: Some(vec!["name".to_string(), "industry".to_string()]),
            context: None,
        });
        assert!(instruction.contains("Generate 7 rows"));
        assert!(instruction.contains("startup companies"));
        assert!(instruction.contains("name, industry"));
        assert!(instruction.contains("JSON array"));
    }

    #[tokio::test]
    async fn empty_prompt_is_rejected_before_any_network_io() {
        let gen = generator();
        let err = gen
            .generate(&GenerateRequest {
                prompt: "   ".to_string(),
                count: 5,
                fields: None,
                context: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GenerateError::EmptyPrompt));
    }

    #[tokio::test]
    async fn out_of_range_count_is_rejected_before_any_network_io() {
        let gen = generator();
        let err = gen
            .generate(&GenerateRequest {
                prompt: "customers".to_string(),
                count: 5000,
                fields: None,
                context: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GenerateError::CountOutOfRange { .. }));
    }
}
