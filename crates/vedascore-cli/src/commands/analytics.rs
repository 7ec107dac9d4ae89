//! The `vedascore analytics` command.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use vedascore_views::analytics::{AnalyticsPanel, AnalyticsSnapshot, QUICK_STATS};

use super::{Session, Source};
use crate::console::ConsoleSurface;

pub async fn execute(source: &Source, json: bool, watch: bool) -> Result<()> {
    let session = source.connect()?;
    if watch {
        return watch_panel(session).await;
    }

    let assignments = session.api.student_assignments().await?.assignments;
    let snapshot = AnalyticsSnapshot::compute(&assignments, chrono::Local::now().naive_local());

    if json {
        let configs: Vec<_> = snapshot.charts.iter().map(|c| c.to_config()).collect();
        println!("{}", serde_json::to_string_pretty(&configs)?);
        return Ok(());
    }

    let metrics = &snapshot.metrics;
    let code = &snapshot.code;
    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);
    let rows = [
        ("Assignments", metrics.total_assignments.to_string()),
        ("Submitted", metrics.submitted_assignments.to_string()),
        ("Completion rate", format!("{}%", metrics.completion_rate)),
        ("Avg success rate", format!("{}%", metrics.average_success_rate)),
        ("Code executions", code.total_executions.to_string()),
        ("Successful runs", code.successful_executions.to_string()),
        ("Avg execution time", format!("{}ms", code.average_execution_time_ms)),
    ];
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    println!("{table}");

    if !snapshot.trend.is_empty() {
        println!("\nProgress:");
        for point in &snapshot.trend {
            let mark = if point.completed { "x" } else { " " };
            println!(
                "  [{mark}] {} ({}) {}%",
                point.assignment, point.date, point.cumulative_progress
            );
        }
    }
    Ok(())
}

async fn watch_panel(session: Session) -> Result<()> {
    let surface = Arc::new(ConsoleSurface::watching(&[QUICK_STATS]));
    let panel = Arc::new(
        AnalyticsPanel::new(session.api.clone(), surface)
            .with_refresh(Duration::from_secs(session.config.analytics_refresh_secs)),
    );
    let handle = panel.start_refresh();

    eprintln!(
        "Refreshing analytics every {}s. Press Ctrl-C to stop.",
        session.config.analytics_refresh_secs
    );
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;
    handle.abort();
    Ok(())
}
