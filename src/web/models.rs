use serde::{Deserialize, Serialize};

use crate::error::ChatError;

/// Instruction preamble placed ahead of every conversation.
pub const SYSTEM_PROMPT: &str = "Role: Senior biomedical engineering copilot for practitioners.

Operating principles:
- Assume baseline practitioner knowledge: you can use standard terms (e.g., Poisson's ratio, Nyquist sampling, impedance, HbA1c, ISO 13485) without lengthy definitions.
- Be concise and clinically/technically actionable. Favor bullet points, numbered steps, and brief justifications.
- Use equations and units when material, otherwise avoid math bloat.
- Note safety, regulatory, and validation considerations succinctly (e.g., IEC 60601, FDA 21 CFR 820, ISO 14971) when relevant.
- When uncertain, state assumptions and propose quick validation steps.
- Prefer pragmatic designs, references, and checks over theory recaps.
- If a result depends on parameters, provide defaults and ranges appropriate to typical biomedical contexts.
- Find and reference the work of industry experts and their papers to support your answers.

Response style:
- Start with a one-sentence answer, then compact details.
- Use structured sections: Summary, Steps, Key Params, Risks/Checks, References (short, and include links).
- Keep code and math minimal, but correct and runnable when requested.
- Avoid overexplaining basics; this is for field practitioners.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
    #[serde(rename = "system")]
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub model: Option<String>,
}

impl ChatRequest {
    pub fn parse(body: &[u8]) -> Result<Self, ChatError> {
        let value: serde_json::Value = serde_json::from_slice(body)
            .map_err(|e| ChatError::BadRequest(format!("invalid JSON body: {}", e)))?;
        if !value.get("messages").map_or(false, |m| m.is_array()) {
            return Err(ChatError::BadRequest("messages must be an array".to_string()));
        }
        serde_json::from_value(value)
            .map_err(|e| ChatError::BadRequest(format!("invalid chat request: {}", e)))
    }

    /// Content of the most recent user turn, or "" without one.
    pub fn latest_user_message(&self) -> &str {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or("")
    }

    /// The conversation as sent upstream: system preamble first, then the
    /// caller's messages in their original order.
    pub fn conversation(&self) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.messages.len() + 1);
        messages.push(ChatMessage {
            role: Role::System,
            content: SYSTEM_PROMPT.to_string(),
        });
        messages.extend(self.messages.iter().cloned());
        messages
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub password: String,
}

impl LoginForm {
    /// Reads a JSON or urlencoded login body. Anything unreadable, an empty
    /// body included, counts as no password.
    pub fn from_body(content_type: Option<&str>, body: &[u8]) -> Self {
        let json = content_type.map_or(false, |ct| ct.contains("json"))
            || body.iter().find(|b| !b.is_ascii_whitespace()) == Some(&b'{');
        let parsed = if json {
            serde_json::from_slice(body).ok()
        } else {
            serde_urlencoded::from_bytes(body).ok()
        };
        parsed.unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub ok: bool,
    pub version: &'static str,
    pub has_xai_api_key: bool,
    pub has_site_password: bool,
    pub env: &'static str,
}
