//! The `vedascore student` command.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use vedascore_core::model::{parse_due_date, DueStatus};
use vedascore_views::student::{self, describe, StudentDashboard};

use super::{Session, Source};
use crate::console::ConsoleSurface;

pub async fn execute(source: &Source, feedback: bool, watch: bool) -> Result<()> {
    let session = source.connect()?;
    if watch {
        return watch_quiz(session).await;
    }

    let assignments = session.api.student_assignments().await?.assignments;
    if assignments.is_empty() {
        println!("No assignments found.");
        return Ok(());
    }

    let now = chrono::Local::now().naive_local();
    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Due", "Status", "Progress"]);
    for a in &assignments {
        let due = parse_due_date(&a.due_date)
            .map(|d| DueStatus::between(d, now))
            .unwrap_or(DueStatus::Overdue);
        let status = if a.is_submitted {
            format!("Submitted {due}")
        } else {
            due.to_string()
        };
        table.add_row(vec![
            Cell::new(a.id),
            Cell::new(&a.title),
            Cell::new(&a.due_date),
            Cell::new(status),
            Cell::new(format!("{}%", a.progress_percent())),
        ]);
    }
    println!("{table}");

    let completed = assignments.iter().filter(|a| a.is_submitted).count();
    println!("{completed} of {} assignments completed.", assignments.len());

    if feedback {
        let response = session.api.dashboard_feedback(&describe(&assignments)).await?;
        println!("\nAI feedback:\n{}", response.feedback);
    }
    Ok(())
}

async fn watch_quiz(session: Session) -> Result<()> {
    let surface = Arc::new(ConsoleSurface::watching(&[student::COMPLETION, student::QUIZ]));
    let dashboard = Arc::new(
        StudentDashboard::new(session.api.clone(), surface)
            .with_quiz_refresh(Duration::from_secs(session.config.quiz_refresh_secs)),
    );
    dashboard.load().await;
    if !dashboard.is_quiz_refreshing() {
        println!("No assignments to generate quiz questions from.");
        return Ok(());
    }

    eprintln!(
        "Refreshing the quiz every {}s. Press Ctrl-C to stop.",
        session.config.quiz_refresh_secs
    );
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;
    dashboard.stop_quiz_refresh();
    Ok(())
}
