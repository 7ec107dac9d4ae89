//! Code editor tool endpoints.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::model::display_value;

/// One of the AI/runner tools available from the code editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorTool {
    Run,
    Explain,
    CheckErrors,
    Convert,
    CheckPlagiarism,
    Optimize,
    Document,
    Debug,
}

/// Body posted to every tool endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRequest {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_language: Option<String>,
}

impl ToolRequest {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            target_language: None,
        }
    }

    pub fn with_target_language(mut self, language: impl Into<String>) -> Self {
        self.target_language = Some(language.into());
        self
    }
}

impl EditorTool {
    pub const ALL: [EditorTool; 8] = [
        EditorTool::Run,
        EditorTool::Explain,
        EditorTool::CheckErrors,
        EditorTool::Convert,
        EditorTool::CheckPlagiarism,
        EditorTool::Optimize,
        EditorTool::Document,
        EditorTool::Debug,
    ];

    /// Path relative to the server root.
    pub fn endpoint(self) -> &'static str {
        match self {
            EditorTool::Run => "/api/run_code",
            EditorTool::Explain => "/api/explain_code",
            EditorTool::CheckErrors => "/api/check_errors",
            EditorTool::Convert => "/api/convert_code",
            EditorTool::CheckPlagiarism => "/api/check_plagiarism",
            EditorTool::Optimize => "/api/optimize_code",
            EditorTool::Document => "/api/document_code",
            EditorTool::Debug => "/api/debug_code",
        }
    }

    /// The response field holding the tool's text.
    pub fn response_field(self) -> &'static str {
        match self {
            EditorTool::Run => "output",
            EditorTool::Explain => "explanation",
            EditorTool::CheckErrors => "errors",
            EditorTool::Convert => "converted_code",
            EditorTool::CheckPlagiarism => "plagiarism_analysis",
            EditorTool::Optimize => "optimized_code",
            EditorTool::Document => "documentation",
            EditorTool::Debug => "debug_info",
        }
    }

    pub fn requires_target_language(self) -> bool {
        matches!(self, EditorTool::Convert)
    }

    /// Turn a tool response body into the text shown in the output pane.
    pub fn render_output(self, body: &Value) -> Result<String, ApiError> {
        let field = self.response_field();
        let text = body.get(field).ok_or_else(|| {
            ApiError::Decode(format!("{} response has no `{field}` field", self.name()))
        })?;

        if self == EditorTool::CheckPlagiarism {
            let score = |key: &str| body.get(key).map(display_value).unwrap_or_default();
            return Ok(format!(
                "Plagiarism Analysis:\nSimilarity Score: {}%\nOriginality Score: {}%\n\n{}",
                score("similarity_score"),
                score("originality_score"),
                display_value(text)
            ));
        }
        Ok(display_value(text))
    }

    pub fn name(self) -> &'static str {
        match self {
            EditorTool::Run => "run",
            EditorTool::Explain => "explain",
            EditorTool::CheckErrors => "check_errors",
            EditorTool::Convert => "convert",
            EditorTool::CheckPlagiarism => "check_plagiarism",
            EditorTool::Optimize => "optimize",
            EditorTool::Document => "document",
            EditorTool::Debug => "debug",
        }
    }
}

impl fmt::Display for EditorTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EditorTool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EditorTool::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = EditorTool::ALL.iter().map(|t| t.name()).collect();
                format!("unknown tool '{s}' (expected one of: {})", names.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_the_tool_field() {
        let body = json!({"output": "4\n"});
        assert_eq!(EditorTool::Run.render_output(&body).unwrap(), "4\n");
        let body = json!({"converted_code": "console.log(4)"});
        assert_eq!(
            EditorTool::Convert.render_output(&body).unwrap(),
            "console.log(4)"
        );
    }

    #[test]
    fn plagiarism_output_is_formatted() {
        let body = json!({
            "plagiarism_analysis": "Looks original.",
            "similarity_score": 12,
            "originality_score": 88
        });
        assert_eq!(
            EditorTool::CheckPlagiarism.render_output(&body).unwrap(),
            "Plagiarism Analysis:\nSimilarity Score: 12%\nOriginality Score: 88%\n\nLooks original."
        );
    }

    #[test]
    fn missing_field_is_a_decode_error() {
        let err = EditorTool::Debug.render_output(&json!({"output": "x"})).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
        assert!(err.to_string().contains("debug_info"));
    }

    #[test]
    fn names_round_trip_through_from_str() {
        for tool in EditorTool::ALL {
            assert_eq!(tool.name().parse::<EditorTool>().unwrap(), tool);
        }
        assert!("compile".parse::<EditorTool>().is_err());
    }

    #[test]
    fn target_language_only_serialized_when_set() {
        let plain = serde_json::to_value(ToolRequest::new("x = 1")).unwrap();
        assert_eq!(plain, json!({"code": "x = 1"}));
        let convert =
            serde_json::to_value(ToolRequest::new("x = 1").with_target_language("rust")).unwrap();
        assert_eq!(convert, json!({"code": "x = 1", "target_language": "rust"}));
    }
}
