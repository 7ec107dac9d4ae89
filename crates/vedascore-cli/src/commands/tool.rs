//! The `vedascore tool` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use vedascore_core::tools::{EditorTool, ToolRequest};

use super::Source;

pub async fn execute(
    source: &Source,
    tool: EditorTool,
    file: PathBuf,
    target_language: Option<String>,
) -> Result<()> {
    let code = std::fs::read_to_string(&file)
        .with_context(|| format!("failed to read source file: {}", file.display()))?;

    let mut request = ToolRequest::new(code);
    if tool.requires_target_language() {
        let Some(language) = target_language.filter(|l| !l.trim().is_empty()) else {
            anyhow::bail!("{tool} needs a target language (--to)");
        };
        request = request.with_target_language(language);
    }

    let session = source.connect()?;
    let body = session.api.run_tool(tool, &request).await?;
    println!("{}", tool.render_output(&body)?);
    Ok(())
}
