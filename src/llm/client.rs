use super::models::{ModelDescriptor, Usage};
use crate::error::{AnalysisError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use tokio::time::timeout;

/// OpenRouter chat completions endpoint
pub(crate) const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Single deadline for the whole generation call. There is no retry.
pub const REQUEST_TIMEOUT_SECS: u64 = 120;

const TEMPERATURE: f32 = 0.7;
const TOP_P: f32 = 0.95;

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Maximum length for error content in error messages
const MAX_ERROR_CONTENT_LEN: usize = 200;

/// Mask key-shaped substrings so error messages keep the provider's text without credentials.
fn sanitize_api_response(content: &str) -> String {
    static SECRETS: OnceLock<Regex> = OnceLock::new();
    let secrets = SECRETS.get_or_init(|| {
        Regex::new(r"(?i)\b(sk-[A-Za-z0-9_\-]{4,}|bearer\s+[A-Za-z0-9_\-\.=]+)")
            .expect("secret pattern compiles")
    });

    let masked = secrets.replace_all(content, |caps: &regex::Captures<'_>| {
        if caps[0].to_ascii_lowercase().starts_with("bearer") {
            "Bearer [redacted]".to_string()
        } else {
            "sk-[redacted]".to_string()
        }
    });
    truncate_str(&masked, MAX_ERROR_CONTENT_LEN).to_string()
}

/// Generated report text plus what the provider reported about the call.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedReport {
    pub content: String,
    pub usage: Option<Usage>,
    /// Model id echoed by the provider, if any.
    pub model: Option<String>,
}

/// Anything that can turn a prompt into report text.
///
/// The batch pipeline only talks to this trait, so tests can substitute a
/// canned generator for the network client.
pub trait ReportGenerator {
    fn generate<'a>(
        &'a self,
        model: &'a ModelDescriptor,
        system: &'a str,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<GeneratedReport>> + Send + 'a>>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: usize,
    temperature: f32,
    top_p: f32,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
    model: Option<String>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<MessageContent>,
}

#[derive(Deserialize)]
struct MessageContent {
    content: Option<String>,
}

/// OpenRouter sometimes reports upstream failures inside a 200 response.
#[derive(Deserialize)]
struct OpenRouterError {
    error: OpenRouterApiError,
}

#[derive(Deserialize)]
struct OpenRouterApiError {
    message: String,
    #[serde(default)]
    code: Option<u16>,
}

fn build_request<'a>(model: &'a ModelDescriptor, system: &'a str, prompt: &'a str) -> ChatRequest<'a> {
    ChatRequest {
        model: model.name,
        messages: vec![
            ChatMessage {
                role: "system",
                content: system,
            },
            ChatMessage {
                role: "user",
                content: prompt,
            },
        ],
        max_tokens: model.max_output_tokens,
        temperature: TEMPERATURE,
        top_p: TOP_P,
        stream: false,
    }
}

/// Interpret a response body. `status` is the HTTP status code.
fn parse_completion(status: u16, text: &str) -> Result<(String, Option<Usage>, Option<String>)> {
    if !(200..300).contains(&status) {
        return Err(AnalysisError::Api {
            status,
            body: sanitize_api_response(text),
        });
    }

    if let Ok(err_resp) = serde_json::from_str::<OpenRouterError>(text) {
        return Err(AnalysisError::Api {
            status: err_resp.error.code.unwrap_or(status),
            body: sanitize_api_response(&err_resp.error.message),
        });
    }

    let parsed: ChatResponse = serde_json::from_str(text).map_err(|e| {
        AnalysisError::MalformedResponse(format!("{}: {}", e, sanitize_api_response(text)))
    })?;

    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .ok_or_else(|| AnalysisError::MalformedResponse("no message content in choices".to_string()))?;

    Ok((content, parsed.usage, parsed.model))
}

fn map_transport_error(err: reqwest::Error, timeout_secs: u64) -> AnalysisError {
    if err.is_timeout() {
        AnalysisError::Timeout { secs: timeout_secs }
    } else {
        AnalysisError::Transport(err)
    }
}

/// Create a configured HTTP client for OpenRouter requests
pub(crate) fn create_http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .build()
        .map_err(AnalysisError::Transport)
}

/// Production [`ReportGenerator`] backed by OpenRouter.
pub struct OpenRouterClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
    timeout_secs: u64,
}

impl OpenRouterClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            http: create_http_client()?,
            api_key: api_key.into(),
            endpoint: OPENROUTER_URL.to_string(),
            timeout_secs: REQUEST_TIMEOUT_SECS,
        })
    }

    /// Point the client at a different OpenRouter-compatible endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Deadline for one whole generation call, response body included.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs.max(1);
        self
    }

    async fn send(&self, model: &ModelDescriptor, system: &str, prompt: &str) -> Result<GeneratedReport> {
        let request = build_request(model, system, prompt);
        let started = Instant::now();
        tracing::info!(model = model.name, max_tokens = model.max_output_tokens, "calling OpenRouter");

        let call = async {
            let response = self
                .http
                .post(&self.endpoint)
                // Transport deadline slightly past the overall one so the outer timeout wins.
                .timeout(Duration::from_secs(self.timeout_secs + 5))
                .header("Content-Type", "application/json")
                .header("HTTP-Referer", "https://github.com/interview-digest")
                .header("X-Title", "interview-digest")
                .header("Authorization", format!("Bearer {}", self.api_key))
                .json(&request)
                .send()
                .await
                .map_err(|e| map_transport_error(e, self.timeout_secs))?;
            let status = response.status().as_u16();
            let text = response
                .text()
                .await
                .map_err(|e| map_transport_error(e, self.timeout_secs))?;
            Ok::<_, AnalysisError>((status, text))
        };

        let (status, text) = timeout(Duration::from_secs(self.timeout_secs), call)
            .await
            .map_err(|_| AnalysisError::Timeout {
                secs: self.timeout_secs,
            })??;

        let (content, usage, echoed_model) = parse_completion(status, &text)?;
        tracing::info!(
            elapsed_secs = started.elapsed().as_secs_f64(),
            chars = content.chars().count(),
            "report generated"
        );
        if let Some(usage) = &usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "token usage"
            );
        }

        Ok(GeneratedReport {
            content,
            usage,
            model: echoed_model,
        })
    }
}

impl<T: ReportGenerator + ?Sized> ReportGenerator for &T {
    fn generate<'a>(
        &'a self,
        model: &'a ModelDescriptor,
        system: &'a str,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<GeneratedReport>> + Send + 'a>> {
        (**self).generate(model, system, prompt)
    }
}

impl ReportGenerator for OpenRouterClient {
    fn generate<'a>(
        &'a self,
        model: &'a ModelDescriptor,
        system: &'a str,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<GeneratedReport>> + Send + 'a>> {
        Box::pin(self.send(model, system, prompt))
    }
}

/// Truncate a string for display (Unicode-safe)
pub(crate) fn truncate_str(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}
