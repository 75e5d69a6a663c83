//! Chat-completions wire format shared by OpenAI and Azure OpenAI

use serde::{Deserialize, Serialize};

use crate::domain::llm::{FinishReason, LlmResponseFormat, Usage};
use crate::domain::{DomainError, LlmRequest, LlmResponse, Message};

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Build the request body; `model` is omitted for Azure, which routes by deployment
pub(super) fn build_body(model: Option<&str>, request: &LlmRequest) -> serde_json::Value {
    let messages: Vec<WireMessage<'_>> = request
        .messages
        .iter()
        .map(|m| WireMessage {
            role: m.role.as_str(),
            content: m.content_text(),
        })
        .collect();

    let mut body = serde_json::json!({ "messages": messages });

    if let Some(model) = model {
        body["model"] = serde_json::json!(model);
    }

    if let Some(temp) = request.temperature {
        body["temperature"] = serde_json::json!(temp);
    }

    if let Some(max_tokens) = request.max_tokens {
        body["max_tokens"] = serde_json::json!(max_tokens);
    }

    if let Some(ref response_format) = request.response_format {
        body["response_format"] = match response_format {
            LlmResponseFormat::Text => serde_json::json!({"type": "text"}),
            LlmResponseFormat::JsonObject => serde_json::json!({"type": "json_object"}),
            LlmResponseFormat::JsonSchema { json_schema } => serde_json::json!({
                "type": "json_schema",
                "json_schema": {
                    "name": json_schema.name,
                    "strict": json_schema.strict,
                    "schema": json_schema.schema
                }
            }),
        };
    }

    body
}

pub(super) fn parse_response(
    provider: &str,
    json: serde_json::Value,
) -> Result<LlmResponse, DomainError> {
    let response: WireResponse = serde_json::from_value(json).map_err(|e| {
        DomainError::provider(provider, format!("Failed to parse response: {}", e))
    })?;

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| DomainError::provider(provider, "No choices in response"))?;

    let content = match (choice.message.content, choice.message.refusal) {
        (Some(content), _) => content,
        (None, Some(refusal)) => {
            return Err(DomainError::provider(
                provider,
                format!("Model refused: {}", refusal),
            ));
        }
        (None, None) => String::new(),
    };

    let mut llm_response =
        LlmResponse::new(response.id, response.model, Message::assistant(content));

    if let Some(reason) = choice.finish_reason {
        llm_response = llm_response.with_finish_reason(FinishReason::parse(&reason));
    }

    if let Some(usage) = response.usage {
        llm_response =
            llm_response.with_usage(Usage::new(usage.prompt_tokens, usage.completion_tokens));
    }

    Ok(llm_response)
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    id: String,
    #[serde(default)]
    model: String,
    choices: Vec<WireChoice>,
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireResponseMessage {
    content: Option<String>,
    refusal: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}
