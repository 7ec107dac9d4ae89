//! The `vedascore delete` command.

use std::sync::Arc;

use anyhow::{Context, Result};

use vedascore_views::instructor::InstructorDashboard;
use vedascore_views::MemorySurface;

use super::Source;

pub async fn execute(source: &Source, submission_id: u64, yes: bool) -> Result<()> {
    let session = source.connect()?;
    let surface = Arc::new(MemorySurface::new());
    let dashboard = InstructorDashboard::new(
        session.api.clone(),
        surface.clone(),
        session.deleted_submissions()?,
    );
    dashboard
        .try_load_submissions()
        .await
        .context("failed to load submissions")?;

    let Some(sub) = dashboard
        .active_submissions()
        .into_iter()
        .find(|s| s.submission_id == submission_id)
    else {
        anyhow::bail!("submission {submission_id} not found");
    };

    if !yes {
        println!(
            "Are you sure you want to delete the submission from {} for \"{}\"? This action cannot be undone.",
            sub.student_name, sub.assignment_title
        );
        println!("Re-run with --yes to confirm.");
        return Ok(());
    }

    dashboard.request_delete(submission_id).await;
    dashboard.confirm_delete().await;
    for notice in surface.notices() {
        println!("{notice}");
    }
    Ok(())
}
