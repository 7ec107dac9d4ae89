//! The `vedascore quiz` command.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};

use vedascore_core::quiz::render_quiz;

pub fn execute(file: Option<PathBuf>) -> Result<()> {
    let markdown = match file.filter(|f| f.as_os_str() != "-") {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read quiz: {}", path.display()))?,
        None => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("failed to read quiz from stdin")?;
            input
        }
    };

    println!("{}", render_quiz(&markdown));
    Ok(())
}
