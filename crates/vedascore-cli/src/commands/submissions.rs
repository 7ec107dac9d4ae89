//! The `vedascore submissions` and `vedascore leaderboard` commands.

use anyhow::Result;
use comfy_table::{Cell, Table};

use vedascore_core::leaderboard::{build_leaderboard, count_by_assignment};
use vedascore_core::model::Submission;

use super::{Session, Source};

/// Submissions with locally deleted ones filtered out.
async fn active_submissions(session: &Session) -> Result<Vec<Submission>> {
    let deleted = session.deleted_submissions()?;
    let list = session.api.instructor_submissions().await?;
    Ok(list
        .submissions
        .into_iter()
        .filter(|s| !deleted.contains(&s.key()))
        .collect())
}

pub async fn execute(source: &Source) -> Result<()> {
    let session = source.connect()?;
    let submissions = active_submissions(&session).await?;

    if submissions.is_empty() {
        println!("No submissions received yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "ID",
        "Student",
        "Assignment",
        "Tests",
        "Success",
        "Submitted",
    ]);
    for sub in &submissions {
        table.add_row(vec![
            Cell::new(sub.submission_id),
            Cell::new(format!("{} <{}>", sub.student_name, sub.student_email)),
            Cell::new(&sub.assignment_title),
            Cell::new(format!("{}/{}", sub.passed_tests, sub.total_tests)),
            Cell::new(format!("{:.0}%", sub.success_rate)),
            Cell::new(&sub.submission_time),
        ]);
    }
    println!("{table}");

    println!("\nReceived:");
    for (title, n) in count_by_assignment(&submissions) {
        let plural = if n == 1 { "" } else { "s" };
        println!("  {title}: {n} submission{plural}");
    }
    Ok(())
}

pub async fn leaderboard(source: &Source) -> Result<()> {
    let session = source.connect()?;
    let submissions = active_submissions(&session).await?;
    let entries = build_leaderboard(&submissions);

    if entries.is_empty() {
        println!("No leaderboard data available.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Student", "Assignment", "Tests", "Date"]);
    for entry in &entries {
        table.add_row(vec![
            Cell::new(&entry.student_name),
            Cell::new(&entry.assignment_title),
            Cell::new(format!("{}/{}", entry.passed_tests, entry.total_tests)),
            Cell::new(entry.submitted_on()),
        ]);
    }
    println!("{table}");
    Ok(())
}
