/// Gemini `generateContent` client
///
/// One POST per edit. The request carries the parts in a fixed order:
/// source image, optional reference image, then the text instruction.
/// Only the first candidate of the response is inspected; its first part
/// with inline image data becomes the result.

use std::time::{Duration, Instant};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::GatewayError;
use crate::config::{Credential, Settings};
use crate::state::data::FALLBACK_MIME_TYPE;
use crate::state::{EditRequest, EncodedImage};

/// Image models routinely take tens of seconds
const REQUEST_TIMEOUT: Duration = Duration::from_secs(180);

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_base: String,
    model: String,
    credential: Credential,
}

impl GeminiClient {
    pub fn new(settings: &Settings, credential: Credential) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            credential,
        }
    }

    pub fn has_credential(&self) -> bool {
        self.credential.get().is_some()
    }

    fn endpoint(&self) -> String {
        let model = self.model.trim();
        let model_path = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{model}")
        };
        format!("{}/{}:generateContent", self.api_base, model_path)
    }

    /// Send one edit and wait for the edited image
    ///
    /// The credential is checked before anything is built or sent.
    pub async fn submit_edit(&self, request: &EditRequest) -> Result<EncodedImage, GatewayError> {
        let Some(api_key) = self.credential.get() else {
            warn!("edit refused: no API key configured");
            return Err(GatewayError::MissingCredential);
        };

        let body = GenerateContentRequest::for_edit(request);
        let started = Instant::now();
        info!(
            model = %self.model,
            with_reference = request.reference.is_some(),
            source_len = request.source.len(),
            "submitting edit"
        );

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(without_url)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = service_message(&text).unwrap_or_default();
            warn!(status = status.as_u16(), message = %message, "model service returned an error");
            return Err(GatewayError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let payload: GenerateContentResponse = response.json().await.map_err(without_url)?;
        let image = first_image(payload)?;

        info!(
            mime_type = image.mime_type(),
            len = image.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "edit returned an image"
        );
        Ok(image)
    }
}

// ========== Wire format ==========

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<&'static str>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, alias = "inline_data", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default, alias = "mime_type", skip_serializing_if = "Option::is_none")]
    mime_type: Option<String>,
    #[serde(default)]
    data: String,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

impl Part {
    fn image(image: &EncodedImage) -> Self {
        Self {
            inline_data: Some(InlineData {
                mime_type: Some(image.mime_type().to_string()),
                data: BASE64.encode(image.bytes()),
            }),
            text: None,
        }
    }

    fn text(text: &str) -> Self {
        Self {
            inline_data: None,
            text: Some(text.to_string()),
        }
    }
}

impl GenerateContentRequest {
    fn for_edit(request: &EditRequest) -> Self {
        let mut parts = vec![Part::image(&request.source)];
        if let Some(reference) = &request.reference {
            parts.push(Part::image(reference));
        }
        parts.push(Part::text(&request.instruction));

        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["IMAGE"],
            },
        }
    }
}

/// First inline image of the first candidate
fn first_image(payload: GenerateContentResponse) -> Result<EncodedImage, GatewayError> {
    let inline = payload
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.inline_data)
                .find(|inline| !inline.data.is_empty())
        })
        .ok_or(GatewayError::NoImageReturned)?;

    let bytes = BASE64.decode(inline.data.as_bytes())?;
    let mime_type = inline
        .mime_type
        .filter(|mime| !mime.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_MIME_TYPE.to_string());

    Ok(EncodedImage::new(bytes, mime_type))
}

/// reqwest errors print the URL, and the URL carries the key
fn without_url(err: reqwest::Error) -> GatewayError {
    GatewayError::Transport(err.without_url())
}

/// The `error.message` of a failed call, if the body has one
fn service_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error.message)
        .filter(|message| !message.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::GENERIC_FAILURE;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MODEL: &str = "gemini-test-image";
    const API_PATH: &str = "/v1beta/models/gemini-test-image:generateContent";

    fn photo() -> EncodedImage {
        EncodedImage::new(b"photo-bytes".to_vec(), "image/jpeg")
    }

    fn shirt() -> EncodedImage {
        EncodedImage::new(b"shirt-bytes".to_vec(), "image/png")
    }

    fn client(server: &MockServer, credential: Credential) -> GeminiClient {
        let settings = Settings {
            api_base: format!("{}/v1beta/", server.uri()),
            model: MODEL.to_string(),
            download_dir: None,
        };
        GeminiClient::new(&settings, credential)
    }

    fn image_response(mime: Option<&str>, bytes: &[u8]) -> Value {
        let mut inline = json!({ "data": BASE64.encode(bytes) });
        if let Some(mime) = mime {
            inline["mimeType"] = json!(mime);
        }
        json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        { "text": "Here is the edited image." },
                        { "inlineData": inline }
                    ]
                }
            }]
        })
    }

    async fn mount(server: &MockServer, template: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path(API_PATH))
            .and(query_param("key", "test-key"))
            .respond_with(template)
            .mount(server)
            .await;
    }

    async fn sent_body(server: &MockServer) -> Value {
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        serde_json::from_slice(&requests[0].body).unwrap()
    }

    #[test]
    fn test_request_body_single_image() {
        let request = EditRequest {
            source: photo(),
            reference: None,
            instruction: "去除水印".to_string(),
        };
        let body = serde_json::to_value(GenerateContentRequest::for_edit(&request)).unwrap();

        assert_eq!(
            body,
            json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        { "inlineData": { "mimeType": "image/jpeg", "data": BASE64.encode(b"photo-bytes") } },
                        { "text": "去除水印" }
                    ]
                }],
                "generationConfig": { "responseModalities": ["IMAGE"] }
            })
        );
    }

    #[test]
    fn test_endpoint_accepts_prefixed_model() {
        let settings = Settings {
            api_base: "https://example.test/v1beta".to_string(),
            model: "models/gemini-x".to_string(),
            download_dir: None,
        };
        let client = GeminiClient::new(&settings, Credential::missing());
        assert_eq!(client.endpoint(), "https://example.test/v1beta/models/gemini-x:generateContent");
        assert!(!client.has_credential());
    }

    #[tokio::test]
    async fn test_parts_are_ordered_source_reference_text() {
        let server = MockServer::start().await;
        mount(
            &server,
            ResponseTemplate::new(200).set_body_json(image_response(Some("image/webp"), b"edited")),
        )
        .await;

        let request = EditRequest {
            source: photo(),
            reference: Some(shirt()),
            instruction: "换上这件衣服".to_string(),
        };
        let image = client(&server, Credential::new("test-key"))
            .submit_edit(&request)
            .await
            .unwrap();

        assert_eq!(image.bytes(), b"edited");
        assert_eq!(image.mime_type(), "image/webp");

        let body = sent_body(&server).await;
        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0]["inlineData"]["data"], json!(BASE64.encode(b"photo-bytes")));
        assert_eq!(parts[0]["inlineData"]["mimeType"], json!("image/jpeg"));
        assert_eq!(parts[1]["inlineData"]["data"], json!(BASE64.encode(b"shirt-bytes")));
        assert_eq!(parts[1]["inlineData"]["mimeType"], json!("image/png"));
        assert_eq!(parts[2]["text"], json!("换上这件衣服"));
        assert_eq!(body["generationConfig"]["responseModalities"], json!(["IMAGE"]));
    }

    #[tokio::test]
    async fn test_missing_mime_type_falls_back_to_png() {
        let server = MockServer::start().await;
        mount(&server, ResponseTemplate::new(200).set_body_json(image_response(None, b"edited"))).await;

        let request = EditRequest {
            source: photo(),
            reference: None,
            instruction: "调亮".to_string(),
        };
        let image = client(&server, Credential::new("test-key"))
            .submit_edit(&request)
            .await
            .unwrap();

        assert_eq!(image.mime_type(), "image/png");
    }

    #[tokio::test]
    async fn test_missing_credential_sends_nothing() {
        let server = MockServer::start().await;
        mount(&server, ResponseTemplate::new(200).set_body_json(image_response(None, b"x"))).await;

        let request = EditRequest {
            source: photo(),
            reference: None,
            instruction: "调亮".to_string(),
        };
        let err = client(&server, Credential::missing())
            .submit_edit(&request)
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::MissingCredential));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_service_error_message_passes_through() {
        let server = MockServer::start().await;
        mount(
            &server,
            ResponseTemplate::new(429).set_body_json(json!({
                "error": { "code": 429, "message": "quota exceeded", "status": "RESOURCE_EXHAUSTED" }
            })),
        )
        .await;

        let request = EditRequest {
            source: photo(),
            reference: None,
            instruction: "调亮".to_string(),
        };
        let err = client(&server, Credential::new("test-key"))
            .submit_edit(&request)
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(429));
        assert_eq!(err.reason(), "quota exceeded");
    }

    #[tokio::test]
    async fn test_service_error_without_message_uses_fallback() {
        let server = MockServer::start().await;
        mount(&server, ResponseTemplate::new(503).set_body_string("upstream unavailable")).await;

        let request = EditRequest {
            source: photo(),
            reference: None,
            instruction: "调亮".to_string(),
        };
        let err = client(&server, Credential::new("test-key"))
            .submit_edit(&request)
            .await
            .unwrap_err();

        assert_eq!(err.reason(), GENERIC_FAILURE);
    }

    #[tokio::test]
    async fn test_no_candidates_is_no_image() {
        let server = MockServer::start().await;
        mount(&server, ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] }))).await;

        let request = EditRequest {
            source: photo(),
            reference: None,
            instruction: "调亮".to_string(),
        };
        let err = client(&server, Credential::new("test-key"))
            .submit_edit(&request)
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::NoImageReturned));
    }

    #[tokio::test]
    async fn test_text_only_candidate_is_no_image() {
        let server = MockServer::start().await;
        mount(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": "I can't edit this photo." }] } }]
            })),
        )
        .await;

        let request = EditRequest {
            source: photo(),
            reference: None,
            instruction: "调亮".to_string(),
        };
        let err = client(&server, Credential::new("test-key"))
            .submit_edit(&request)
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::NoImageReturned));
    }

    #[test]
    fn test_first_image_only_looks_at_first_candidate() {
        let payload: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                { "content": { "parts": [{ "text": "no image here" }] } },
                { "content": { "parts": [{ "inlineData": { "data": BASE64.encode(b"late") } }] } }
            ]
        }))
        .unwrap();

        assert!(matches!(first_image(payload), Err(GatewayError::NoImageReturned)));
    }

    #[test]
    fn test_snake_case_inline_data_is_accepted() {
        let payload: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "parts": [{ "inline_data": { "mime_type": "image/jpeg", "data": BASE64.encode(b"jpg") } }] }
            }]
        }))
        .unwrap();

        let image = first_image(payload).unwrap();
        assert_eq!(image.mime_type(), "image/jpeg");
        assert_eq!(image.bytes(), b"jpg");
    }

    #[test]
    fn test_bad_base64_is_reported() {
        let payload: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "inlineData": { "data": "!!not base64!!" } }] } }]
        }))
        .unwrap();

        assert!(matches!(first_image(payload), Err(GatewayError::InvalidPayload(_))));
    }
}
