//! The `vedascore plagiarism` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use vedascore_core::model::{PlagiarismReport, Severity};

use super::Source;

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Danger => "high",
        Severity::Warning => "medium",
        Severity::Info => "low",
    }
}

fn print_report(report: &PlagiarismReport) {
    let checked = &report.submission_checked;
    println!(
        "Submission {}: {} - {}",
        checked.id, checked.student_name, checked.assignment_title
    );
    if report.similarities.is_empty() {
        println!("  No significant plagiarism detected");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Similar to", "Email", "Score", "Level", "Submitted"]);
    for sim in &report.similarities {
        table.add_row(vec![
            Cell::new(&sim.student_name),
            Cell::new(&sim.student_email),
            Cell::new(format!("{}%", sim.similarity_score)),
            Cell::new(severity_label(sim.severity())),
            Cell::new(&sim.submission_time),
        ]);
    }
    println!("Potential Plagiarism Detected\n{table}");
}

pub async fn execute(
    source: &Source,
    submission: Option<u64>,
    assignment: Option<u64>,
) -> Result<()> {
    let session = source.connect()?;

    if let Some(id) = submission {
        let report = session.api.check_submission_plagiarism(id).await?;
        print_report(&report);
        return Ok(());
    }

    let Some(assignment_id) = assignment else {
        anyhow::bail!("pass --submission or --assignment");
    };
    let assignments = session.api.instructor_assignments().await?.assignments;
    let Some(target) = assignments.iter().find(|a| a.id == assignment_id) else {
        anyhow::bail!("assignment {assignment_id} not found");
    };

    let deleted = session.deleted_submissions()?;
    let submissions = session.api.instructor_submissions().await?.submissions;
    println!("Plagiarism Analysis for: {}", target.title);

    let mut found = false;
    for sub in submissions
        .iter()
        .filter(|s| s.assignment_title == target.title && !deleted.contains(&s.key()))
    {
        match session.api.check_submission_plagiarism(sub.submission_id).await {
            Ok(report) if !report.similarities.is_empty() => {
                found = true;
                print_report(&report);
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!(submission_id = sub.submission_id, error = %e, "error checking submission");
            }
        }
    }
    if !found {
        println!("No Significant Plagiarism Detected!");
    }
    Ok(())
}
