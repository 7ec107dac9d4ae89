//! The `vedascore page` command.
//!
//! Builds one page controller on an in-memory surface, runs its initial
//! load, dispatches the requested actions in order and writes the result as
//! a standalone HTML document.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::ValueEnum;

use vedascore_views::analytics::AnalyticsPanel;
use vedascore_views::community::FeedController;
use vedascore_views::editor::EditorController;
use vedascore_views::instructor::InstructorDashboard;
use vedascore_views::student::StudentDashboard;
use vedascore_views::{Dispatcher, MemorySurface, Params};

use super::Source;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PageKind {
    Community,
    Instructor,
    Student,
    Analytics,
    Editor,
}

impl PageKind {
    fn name(self) -> &'static str {
        match self {
            PageKind::Community => "community",
            PageKind::Instructor => "instructor",
            PageKind::Student => "student",
            PageKind::Analytics => "analytics",
            PageKind::Editor => "editor",
        }
    }

    fn title(self) -> &'static str {
        match self {
            PageKind::Community => "VedaScore Community",
            PageKind::Instructor => "VedaScore Instructor Dashboard",
            PageKind::Student => "VedaScore Student Dashboard",
            PageKind::Analytics => "VedaScore Analytics",
            PageKind::Editor => "VedaScore Code Editor",
        }
    }
}

/// Split `"name key=value key=value"` into an action and its parameters.
///
/// A word without `=` continues the previous value, so
/// `community.comment post_id=1 content=Nice notes` gives
/// `content = "Nice notes"`.
pub fn parse_action(raw: &str) -> Result<(String, Params)> {
    let mut words = raw.split_whitespace();
    let Some(action) = words.next() else {
        anyhow::bail!("empty action");
    };

    let mut pairs: Vec<String> = Vec::new();
    for word in words {
        match pairs.last_mut() {
            Some(last) if !word.contains('=') => {
                last.push(' ');
                last.push_str(word);
            }
            _ => pairs.push(word.to_string()),
        }
    }
    let params = Params::parse_pairs(pairs.as_slice())
        .with_context(|| format!("invalid action '{raw}'"))?;
    Ok((action.to_string(), params))
}

pub async fn execute(
    source: &Source,
    page: PageKind,
    actions: Vec<String>,
    output: Option<PathBuf>,
) -> Result<()> {
    let actions = actions
        .iter()
        .map(|a| parse_action(a))
        .collect::<Result<Vec<_>>>()?;

    let session = source.connect()?;
    let surface = Arc::new(MemorySurface::new());
    let mut dispatcher = Dispatcher::new();
    let api = session.api.clone();

    match page {
        PageKind::Community => {
            let feed = Arc::new(FeedController::new(api, surface.clone()));
            feed.register(&mut dispatcher);
            feed.load_posts(1, false).await;
        }
        PageKind::Instructor => {
            let dashboard = Arc::new(InstructorDashboard::new(
                api,
                surface.clone(),
                session.deleted_submissions()?,
            ));
            dashboard.register(&mut dispatcher);
            dashboard.load().await;
        }
        PageKind::Student => {
            let dashboard = Arc::new(StudentDashboard::new(api, surface.clone()));
            dashboard.register(&mut dispatcher);
            dashboard.load_once().await;
        }
        PageKind::Analytics => {
            let panel = Arc::new(AnalyticsPanel::new(api, surface.clone()));
            panel.register(&mut dispatcher);
            panel.refresh().await;
        }
        PageKind::Editor => {
            let editor = Arc::new(EditorController::new(api, surface.clone()));
            editor.register(&mut dispatcher);
            editor.render();
        }
    }

    for (action, params) in actions {
        dispatcher.dispatch(&action, params).await?;
    }

    let path = output.unwrap_or_else(|| PathBuf::from(format!("vedascore-{}.html", page.name())));
    std::fs::write(&path, surface.to_document(page.title()))
        .with_context(|| format!("failed to write {}", path.display()))?;

    for notice in surface.notices() {
        println!("notice: {notice}");
    }
    println!("Wrote {}", path.display());
    Ok(())
}
