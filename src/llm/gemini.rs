//! Google Gemini chat client
//!
//! Talks to `POST {base_url}/models/{model}:generateContent` with the API key
//! in the `x-goog-api-key` header. Conversation messages are mapped onto
//! Gemini's `contents` as follows:
//!
//! | Message   | Gemini                                           |
//! |-----------|--------------------------------------------------|
//! | System    | `systemInstruction`                              |
//! | User      | role `user`, text part                           |
//! | Assistant | role `model`, text and `functionCall` parts      |
//! | Tool      | role `user`, `functionResponse` part (merged)    |

use crate::llm::client::{LLMClient, LLMResponse};
use crate::types::{AppError, ConversationMessage, MessageRole, Result, ToolCall, ToolDefinition};
use crate::utils::LlmConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: strip_model_prefix(&model.into()),
            temperature,
        }
    }

    pub fn from_config(config: &LlmConfig, api_key: impl Into<String>) -> Self {
        Self::new(
            api_key,
            config.base_url.clone(),
            config.model.clone(),
            config.temperature,
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl LLMClient for GeminiClient {
    async fn generate_with_tools(
        &self,
        messages: &[ConversationMessage],
        tools: &[ToolDefinition],
    ) -> Result<LLMResponse> {
        let request = build_request(messages, tools, self.temperature);
        debug!(
            model = %self.model,
            contents = request.contents.len(),
            tools = tools.len(),
            "Calling Gemini generateContent"
        );

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::LLM(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::LLM(format!(
                "Gemini API error ({}): {}",
                status, body
            )));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AppError::LLM(format!("Failed to parse Gemini response: {}", e)))?;

        parse_response(body)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Accept both `gemini-1.5-flash` and `models/gemini-1.5-flash`.
pub(crate) fn strip_model_prefix(model: &str) -> String {
    model.strip_prefix("models/").unwrap_or(model).to_string()
}

// ============= Wire Types =============

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<GeminiTool>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiTool {
    function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct FunctionDeclaration {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<FunctionResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FunctionResponse {
    name: String,
    response: Value,
    /// Id of the `functionCall` this answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }
}

// ============= Conversion =============

fn build_request(
    messages: &[ConversationMessage],
    tools: &[ToolDefinition],
    temperature: f32,
) -> GenerateContentRequest {
    let system: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == MessageRole::System)
        .map(|m| m.content.as_str())
        .collect();

    let mut contents: Vec<Content> = Vec::new();
    for message in messages {
        match message.role {
            MessageRole::System => {}
            MessageRole::User => contents.push(Content {
                role: Some("user".to_string()),
                parts: vec![Part::text(&message.content)],
            }),
            MessageRole::Assistant => {
                let mut parts = Vec::new();
                if !message.content.is_empty() {
                    parts.push(Part::text(&message.content));
                }
                parts.extend(message.tool_calls.iter().map(|call| Part {
                    function_call: Some(FunctionCall {
                        name: call.name.clone(),
                        args: call.arguments.clone(),
                        id: Some(call.id.clone()),
                    }),
                    ..Default::default()
                }));
                if parts.is_empty() {
                    parts.push(Part::text(""));
                }
                contents.push(Content {
                    role: Some("model".to_string()),
                    parts,
                });
            }
            MessageRole::Tool => {
                let name = message.name.clone().unwrap_or_default();
                let part = Part {
                    function_response: Some(FunctionResponse {
                        name: name.clone(),
                        response: serde_json::json!({
                            "name": name,
                            "content": message.content,
                        }),
                        id: message.tool_call_id.clone(),
                    }),
                    ..Default::default()
                };

                // Results of one model turn travel together in a single content.
                match contents.last_mut() {
                    Some(last) if is_function_response_content(last) => last.parts.push(part),
                    _ => contents.push(Content {
                        role: Some("user".to_string()),
                        parts: vec![part],
                    }),
                }
            }
        }
    }

    let tools = if tools.is_empty() {
        Vec::new()
    } else {
        vec![GeminiTool {
            function_declarations: tools
                .iter()
                .map(|t| FunctionDeclaration {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: t.parameters.clone(),
                })
                .collect(),
        }]
    };

    GenerateContentRequest {
        system_instruction: (!system.is_empty()).then(|| Content {
            role: None,
            parts: vec![Part::text(system.join("\n\n"))],
        }),
        contents,
        tools,
        generation_config: GenerationConfig { temperature },
    }
}

fn is_function_response_content(content: &Content) -> bool {
    !content.parts.is_empty() && content.parts.iter().all(|p| p.function_response.is_some())
}

fn parse_response(body: GenerateContentResponse) -> Result<LLMResponse> {
    let candidate = body.candidates.into_iter().next().ok_or_else(|| {
        let feedback = body
            .prompt_feedback
            .map(|f| f.to_string())
            .unwrap_or_else(|| "none".to_string());
        AppError::LLM(format!(
            "Gemini returned no candidates (prompt feedback: {})",
            feedback
        ))
    })?;

    let finish_reason = candidate
        .finish_reason
        .unwrap_or_else(|| "UNKNOWN".to_string());

    let content = candidate.content.ok_or_else(|| {
        AppError::LLM(format!(
            "Gemini returned no content (finish reason: {})",
            finish_reason
        ))
    })?;

    let mut text = String::new();
    let mut tool_calls = Vec::new();
    for part in content.parts {
        if let Some(t) = part.text {
            text.push_str(&t);
        }
        if let Some(call) = part.function_call {
            tool_calls.push(ToolCall {
                id: call
                    .id
                    .unwrap_or_else(|| format!("call_{}", uuid::Uuid::new_v4().simple())),
                name: call.name,
                arguments: if call.args.is_null() {
                    serde_json::json!({})
                } else {
                    call.args
                },
            });
        }
    }

    Ok(LLMResponse {
        content: text,
        tool_calls,
        finish_reason,
    })
}
