//! Best-effort extraction of assistant text from an upstream response body.
//! Only the CLI uses this; the gateway relays upstream bodies untouched.

use serde_json::Value;

/// Assistant text from the common response shapes:
/// Responses-style `output[].content[].text`, chat-completions `choices[0].message.content`,
/// and agent-style `messages[-1].content`.
pub fn reply_text(body: &Value) -> Option<String> {
    responses_output(body)
        .or_else(|| chat_completion(body))
        .or_else(|| agent_messages(body))
}

fn responses_output(body: &Value) -> Option<String> {
    let parts: Vec<&str> = body
        .get("output")?
        .as_array()?
        .iter()
        .filter(|item| item.get("type").and_then(Value::as_str).unwrap_or("message") == "message")
        .filter_map(|item| item.get("content").and_then(Value::as_array))
        .flatten()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}

fn chat_completion(body: &Value) -> Option<String> {
    body.get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
        .map(str::to_string)
}

fn agent_messages(body: &Value) -> Option<String> {
    body.get("messages")?
        .as_array()?
        .last()?
        .get("content")?
        .as_str()
        .map(str::to_string)
}
