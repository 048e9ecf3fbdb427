use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Events from Claude CLI's stream-json output format
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum StreamEvent {
    #[serde(rename = "assistant")]
    Assistant {
        message: AgentMessage,
        #[serde(default)]
        session_id: String,
    },

    #[serde(rename = "user")]
    User {
        #[serde(default)]
        tool_use_result: Option<Value>,
    },

    #[serde(rename = "result")]
    Result {
        subtype: String,
        #[serde(default)]
        result: Option<String>,
        #[serde(default)]
        is_error: bool,
    },

    #[serde(rename = "system")]
    System { subtype: String },
}

/// One assistant message: zero or more content blocks.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AgentMessage {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

impl AgentMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text { text: text.into() }],
        }
    }

    pub fn tool_use(name: impl Into<String>, input: Value) -> Self {
        Self {
            content: vec![ContentBlock::ToolUse {
                name: name.into(),
                input,
                id: String::new(),
            }],
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    #[serde(rename = "tool_use")]
    ToolUse {
        name: String,
        input: Value,
        #[serde(default)]
        id: String,
    },

    #[serde(rename = "text")]
    Text { text: String },

    /// Thinking and any block type we do not track.
    #[serde(other)]
    Other,
}

/// One observed action of the generation agent.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolEvent {
    pub tool_name: String,
    pub tool_input: Value,
}

impl ToolEvent {
    pub fn new(tool_name: impl Into<String>, tool_input: Value) -> Self {
        Self {
            tool_name: tool_name.into(),
            tool_input,
        }
    }

    /// Target path of a file tool (`file_path`, falling back to `path`).
    pub fn file_path(&self) -> Option<&str> {
        self.input_str("file_path")
            .or_else(|| self.input_str("path"))
            .filter(|p| !p.is_empty())
    }

    pub fn command(&self) -> &str {
        self.input_str("command").unwrap_or("")
    }

    pub fn query(&self) -> &str {
        self.input_str("query").unwrap_or("")
    }

    fn input_str(&self, key: &str) -> Option<&str> {
        self.tool_input.get(key).and_then(|v| v.as_str())
    }
}

impl ContentBlock {
    /// The tool event carried by this block, if it is a tool invocation.
    pub fn as_tool_event(&self) -> Option<ToolEvent> {
        match self {
            ContentBlock::ToolUse { name, input, .. } => {
                Some(ToolEvent::new(name.clone(), input.clone()))
            }
            _ => None,
        }
    }
}

/// Get an emoji for a tool
pub fn tool_emoji(name: &str) -> &'static str {
    match name.to_lowercase().as_str() {
        "read" => "\u{1F4D6}",
        "write" => "\u{1F4DD}",
        "edit" => "\u{270F}\u{FE0F}",
        "bash" => "\u{2699}\u{FE0F}",
        n if n.contains("research") || n.contains("lookup") => "\u{1F50D}",
        _ => "\u{1F527}",
    }
}

/// Final component of a path, or the path itself when it has none.
pub fn file_name(path: &str) -> String {
    std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

/// Truncate a string to at most `max_chars` characters with an ellipsis.
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assistant_tool_use() {
        let json = r#"{"type":"assistant","message":{"content":[{"type":"tool_use","name":"Write","input":{"file_path":"/p/drafts/v1_draft.tex"},"id":"123"}]},"session_id":"abc"}"#;
        let event: StreamEvent = serde_json::from_str(json).unwrap();

        if let StreamEvent::Assistant { message, .. } = event {
            assert_eq!(message.content.len(), 1);
            let tool = message.content[0].as_tool_event().expect("tool event");
            assert_eq!(tool.tool_name, "Write");
            assert_eq!(tool.file_path(), Some("/p/drafts/v1_draft.tex"));
        } else {
            panic!("Expected Assistant event");
        }
    }

    #[test]
    fn test_parse_assistant_text() {
        let json = r#"{"type":"assistant","message":{"content":[{"type":"text","text":"Drafting the outline"}]},"session_id":"abc"}"#;
        let event: StreamEvent = serde_json::from_str(json).unwrap();

        if let StreamEvent::Assistant { message, .. } = event {
            if let ContentBlock::Text { text } = &message.content[0] {
                assert_eq!(text, "Drafting the outline");
            } else {
                panic!("Expected Text");
            }
        } else {
            panic!("Expected Assistant event");
        }
    }

    #[test]
    fn test_parse_unknown_block_is_other() {
        let json = r#"{"type":"assistant","message":{"content":[{"type":"thinking","thinking":"hmm"}]}}"#;
        let event: StreamEvent = serde_json::from_str(json).unwrap();
        if let StreamEvent::Assistant { message, .. } = event {
            assert!(matches!(message.content[0], ContentBlock::Other));
        } else {
            panic!("Expected Assistant event");
        }
    }

    #[test]
    fn test_parse_result_error() {
        let json = r#"{"type":"result","subtype":"error_during_execution","is_error":true,"result":"boom"}"#;
        let event: StreamEvent = serde_json::from_str(json).unwrap();
        match event {
            StreamEvent::Result {
                is_error, result, ..
            } => {
                assert!(is_error);
                assert_eq!(result.as_deref(), Some("boom"));
            }
            _ => panic!("Expected Result event"),
        }
    }

    #[test]
    fn test_tool_event_path_falls_back_to_path_key() {
        let event = ToolEvent::new("Read", serde_json::json!({"path": "refs/references.bib"}));
        assert_eq!(event.file_path(), Some("refs/references.bib"));
        assert_eq!(event.command(), "");
    }

    #[test]
    fn test_truncate_str_is_char_safe() {
        assert_eq!(truncate_str("short", 10), "short");
        assert_eq!(truncate_str("ééééééééé", 6), "ééé...");
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("/a/b/main.tex"), "main.tex");
        assert_eq!(file_name("main.tex"), "main.tex");
    }
}
