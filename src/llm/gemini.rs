use std::time::Duration;

use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::CONFIG;
use crate::error::GenerationError;
use crate::llm::media::{decode_data_uri, SourceImage, FALLBACK_IMAGE_MIME};
use crate::llm::ImageBackend;
use crate::prompt::{build_generation_prompt, build_refinement_prompt};
use crate::settings::HeadshotSettings;
use crate::utils::http::get_http_client;
use crate::utils::timing::log_request_timing;

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ResponsePart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: Option<String>,
    data: String,
}

fn redact_api_key(text: &str) -> String {
    let key = CONFIG.gemini_api_key.trim();
    if key.is_empty() {
        return text.to_string();
    }
    text.replace(key, "[redacted]")
}

fn truncate_for_log(value: &str, limit: usize) -> String {
    if value.chars().count() <= limit {
        return value.to_string();
    }
    let truncated: String = value.chars().take(limit).collect();
    format!("{truncated}... (truncated)")
}

fn summarize_error_body(body: &str) -> (Option<String>, String) {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return (None, "empty response body".to_string());
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        let message = value
            .pointer("/error/message")
            .and_then(|v| v.as_str())
            .map(|v| v.to_string())
            .or_else(|| {
                value
                    .get("message")
                    .and_then(|v| v.as_str())
                    .map(|v| v.to_string())
            });
        return (message, truncate_for_log(&value.to_string(), 2000));
    }

    (None, truncate_for_log(trimmed, 2000))
}

fn build_safety_settings() -> Vec<Value> {
    let profile = CONFIG.gemini_safety_settings.as_str();
    let threshold = match profile {
        "standard" => "BLOCK_MEDIUM_AND_ABOVE",
        "permissive" => "OFF",
        _ => {
            warn!(
                "Unknown GEMINI_SAFETY_SETTINGS value '{}', using permissive defaults.",
                profile
            );
            "OFF"
        }
    };

    vec![
        json!({ "category": "HARM_CATEGORY_HARASSMENT", "threshold": threshold }),
        json!({ "category": "HARM_CATEGORY_HATE_SPEECH", "threshold": threshold }),
        json!({ "category": "HARM_CATEGORY_SEXUALLY_EXPLICIT", "threshold": threshold }),
        json!({ "category": "HARM_CATEGORY_DANGEROUS_CONTENT", "threshold": threshold }),
        json!({ "category": "HARM_CATEGORY_CIVIC_INTEGRITY", "threshold": threshold }),
    ]
}

/// One image part followed by one text part, the part order the image model
/// edits against.
fn build_payload(mime_type: &str, image_bytes: &[u8], instruction: &str) -> Value {
    let parts = vec![
        json!({
            "inlineData": {
                "mimeType": mime_type,
                "data": general_purpose::STANDARD.encode(image_bytes)
            }
        }),
        json!({ "text": instruction }),
    ];

    json!({
        "contents": [{ "role": "user", "parts": parts }],
        "generationConfig": {
            "responseModalities": ["TEXT", "IMAGE"]
        },
        "safetySettings": build_safety_settings(),
    })
}

fn summarize_payload(payload: &Value) -> Value {
    let parts = payload
        .pointer("/contents/0/parts")
        .and_then(|value| value.as_array())
        .map(|parts| {
            parts
                .iter()
                .map(|part| {
                    if let Some(text) = part.get("text").and_then(|value| value.as_str()) {
                        json!({ "text": truncate_for_log(text, 200) })
                    } else if let Some(inline_data) = part.get("inlineData") {
                        let mime_type = inline_data
                            .get("mimeType")
                            .and_then(|value| value.as_str())
                            .unwrap_or("unknown");
                        let data_len = inline_data
                            .get("data")
                            .and_then(|value| value.as_str())
                            .map(|value| value.len())
                            .unwrap_or(0);
                        json!({ "inlineData": { "mimeType": mime_type, "dataLen": data_len } })
                    } else {
                        json!({ "unknownPart": true })
                    }
                })
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    json!({
        "parts": parts,
        "generationConfig": payload.get("generationConfig").cloned(),
        "safetySettingsCount": payload
            .get("safetySettings")
            .and_then(|value| value.as_array())
            .map(|value| value.len())
            .unwrap_or(0),
    })
}

fn summarize_response(response: &GenerateContentResponse) -> Value {
    let mut text_parts = 0usize;
    let mut image_parts = 0usize;
    let mut text_preview = None;

    let candidates = response.candidates.as_deref().unwrap_or(&[]);
    for candidate in candidates {
        let Some(content) = &candidate.content else {
            continue;
        };
        for part in content.parts.as_deref().unwrap_or(&[]) {
            match part {
                ResponsePart::Text { text } => {
                    text_parts += 1;
                    if text_preview.is_none() && !text.trim().is_empty() {
                        text_preview = Some(truncate_for_log(text, 200));
                    }
                }
                ResponsePart::InlineData { .. } => image_parts += 1,
            }
        }
    }

    json!({
        "candidates": candidates.len(),
        "textParts": text_parts,
        "imageParts": image_parts,
        "textPreview": text_preview
    })
}

/// Selects the first candidate part carrying inline image data and re-encodes
/// it as a data URI. A missing or empty MIME type defaults to `image/jpeg`.
/// A response with no inline data anywhere (a refusal or a text-only reply)
/// is `NoImageGenerated`.
pub(crate) fn extract_image_data_uri(
    response: GenerateContentResponse,
) -> Result<String, GenerationError> {
    for candidate in response.candidates.unwrap_or_default() {
        let Some(content) = candidate.content else {
            continue;
        };
        for part in content.parts.unwrap_or_default() {
            if let ResponsePart::InlineData { inline_data } = part {
                let mime_type = inline_data
                    .mime_type
                    .filter(|value| !value.trim().is_empty())
                    .unwrap_or_else(|| FALLBACK_IMAGE_MIME.to_string());
                return Ok(format!(
                    "data:{};base64,{}",
                    mime_type,
                    inline_data.data.trim()
                ));
            }
        }
    }

    Err(GenerationError::NoImageGenerated)
}

/// Client for the remote generation capability. Each operation makes exactly
/// one outbound call, with no retries and no caching.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    model: String,
}

impl GeminiClient {
    pub fn from_config() -> Self {
        GeminiClient {
            model: CONFIG.gemini_image_model.clone(),
        }
    }

    pub fn with_model(model: impl Into<String>) -> Self {
        GeminiClient {
            model: model.into(),
        }
    }

    async fn call_generate_content(
        &self,
        payload: Value,
    ) -> Result<GenerateContentResponse, GenerationError> {
        let client = get_http_client();
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, CONFIG.gemini_api_key
        );

        if tracing::enabled!(tracing::Level::DEBUG) {
            debug!(target: "llm.gemini", model = %self.model, payload = %summarize_payload(&payload));
        }

        let response = client
            .post(&url)
            .timeout(Duration::from_secs(CONFIG.request_timeout_secs))
            .json(&payload)
            .send()
            .await
            .map_err(|err| {
                let err_text = redact_api_key(&err.to_string());
                warn!(
                    "Image request failed to send: {} (timeout={}, connect={}, status={:?})",
                    err_text,
                    err.is_timeout(),
                    err.is_connect(),
                    err.status(),
                );
                GenerationError::Transport(format!("Image request failed: {err_text}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let (message, body_summary) = summarize_error_body(&body);
            warn!("Image API error: status={}, body={}", status, body_summary);
            let detail = message.unwrap_or(body_summary);
            return Err(GenerationError::Transport(format!(
                "Image request failed with status {status}: {detail}"
            )));
        }

        let value = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|err| GenerationError::Transport(redact_api_key(&err.to_string())))?;
        if tracing::enabled!(tracing::Level::DEBUG) {
            debug!(target: "llm.gemini", model = %self.model, response = %summarize_response(&value));
        }
        Ok(value)
    }
}

impl ImageBackend for GeminiClient {
    async fn generate_headshot(
        &self,
        source: &SourceImage,
        settings: &HeadshotSettings,
    ) -> Result<String, GenerationError> {
        let prompt = build_generation_prompt(settings);
        let payload = build_payload(&source.mime_type, &source.bytes, &prompt);

        log_request_timing("generate_headshot", &self.model, || async {
            let response = self.call_generate_content(payload).await?;
            extract_image_data_uri(response)
        })
        .await
    }

    async fn refine_headshot(
        &self,
        current_data_uri: &str,
        instruction: &str,
    ) -> Result<String, GenerationError> {
        let (mime_type, image_bytes) = decode_data_uri(current_data_uri)?;
        let prompt = build_refinement_prompt(instruction);
        let payload = build_payload(&mime_type, &image_bytes, &prompt);

        log_request_timing("refine_headshot", &self.model, || async {
            let response = self.call_generate_content(payload).await?;
            extract_image_data_uri(response)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: Value) -> GenerateContentResponse {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn extracts_first_inline_image_as_data_uri() {
        let response = parse(json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "Here is your headshot." },
                        { "inlineData": { "mimeType": "image/png", "data": "abc123" } },
                        { "inlineData": { "mimeType": "image/png", "data": "later" } }
                    ]
                }
            }]
        }));
        assert_eq!(
            extract_image_data_uri(response).unwrap(),
            "data:image/png;base64,abc123"
        );
    }

    #[test]
    fn missing_or_empty_mime_defaults_to_jpeg() {
        let missing = parse(json!({
            "candidates": [{ "content": { "parts": [
                { "inlineData": { "data": "xyz" } }
            ] } }]
        }));
        assert_eq!(
            extract_image_data_uri(missing).unwrap(),
            "data:image/jpeg;base64,xyz"
        );

        let empty = parse(json!({
            "candidates": [{ "content": { "parts": [
                { "inlineData": { "mimeType": "", "data": "xyz" } }
            ] } }]
        }));
        assert_eq!(
            extract_image_data_uri(empty).unwrap(),
            "data:image/jpeg;base64,xyz"
        );
    }

    #[test]
    fn payload_whitespace_is_trimmed() {
        let response = parse(json!({
            "candidates": [{ "content": { "parts": [
                { "inlineData": { "mimeType": "image/png", "data": "  abc123\n" } }
            ] } }]
        }));
        assert_eq!(
            extract_image_data_uri(response).unwrap(),
            "data:image/png;base64,abc123"
        );
    }

    #[test]
    fn no_candidates_is_no_image_generated() {
        let response = parse(json!({ "candidates": [] }));
        assert!(matches!(
            extract_image_data_uri(response),
            Err(GenerationError::NoImageGenerated)
        ));

        let absent = parse(json!({}));
        assert!(matches!(
            extract_image_data_uri(absent),
            Err(GenerationError::NoImageGenerated)
        ));
    }

    #[test]
    fn text_only_reply_is_no_image_generated() {
        let response = parse(json!({
            "candidates": [{ "content": { "parts": [
                { "text": "I cannot edit this photograph." }
            ] } }]
        }));
        assert!(matches!(
            extract_image_data_uri(response),
            Err(GenerationError::NoImageGenerated)
        ));
    }

    #[test]
    fn payload_puts_image_before_instruction() {
        let payload = build_payload("image/png", &[1, 2, 3], "do the thing");
        let parts = payload.pointer("/contents/0/parts").unwrap().as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(
            parts[0].pointer("/inlineData/mimeType").unwrap(),
            "image/png"
        );
        assert_eq!(
            parts[0].pointer("/inlineData/data").unwrap(),
            &json!(general_purpose::STANDARD.encode([1, 2, 3]))
        );
        assert_eq!(parts[1].get("text").unwrap(), "do the thing");
        assert_eq!(
            payload.pointer("/generationConfig/responseModalities").unwrap(),
            &json!(["TEXT", "IMAGE"])
        );
    }

    #[test]
    fn error_body_summary_prefers_error_message() {
        let (message, _) =
            summarize_error_body(r#"{"error": {"code": 429, "message": "quota exceeded"}}"#);
        assert_eq!(message.as_deref(), Some("quota exceeded"));

        let (none, summary) = summarize_error_body("");
        assert!(none.is_none());
        assert_eq!(summary, "empty response body");
    }
}
