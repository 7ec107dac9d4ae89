//! The `vedascore assignments` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use vedascore_core::leaderboard::partition_by_due_date;
use vedascore_core::model::InstructorAssignment;

use super::Source;

fn print_section(heading: &str, assignments: &[&InstructorAssignment]) {
    println!("{heading}:");
    if assignments.is_empty() {
        println!("  (none)\n");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Due", "Submissions", "Passed"]);
    for a in assignments {
        table.add_row(vec![
            Cell::new(a.id),
            Cell::new(&a.title),
            Cell::new(&a.due_date),
            Cell::new(a.total_submissions),
            Cell::new(a.passed_submissions),
        ]);
    }
    println!("{table}\n");
}

pub async fn execute(source: &Source) -> Result<()> {
    let session = source.connect()?;
    let assignments = session.api.instructor_assignments().await?.assignments;
    let (live, past) = partition_by_due_date(&assignments, chrono::Local::now().naive_local());

    print_section("Live assignments", &live);
    print_section("Past assignments", &past);
    Ok(())
}
