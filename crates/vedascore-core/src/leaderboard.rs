//! Leaderboard and submission summaries derived client-side.
//!
//! The server only hands out raw submissions; best attempts, per-assignment
//! counts and the live/past split are all computed here.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::model::{parse_due_date, ratio, InstructorAssignment, Submission};

/// A student's best attempt at one assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub student_name: String,
    pub assignment_title: String,
    pub passed_tests: u32,
    pub total_tests: u32,
    pub submission_time: String,
}

impl LeaderboardEntry {
    pub fn pass_ratio(&self) -> f64 {
        ratio(self.passed_tests, self.total_tests)
    }

    /// Date part of the submission timestamp.
    pub fn submitted_on(&self) -> &str {
        self.submission_time
            .split_once(' ')
            .map(|(date, _)| date)
            .unwrap_or(&self.submission_time)
    }
}

/// Keep the best attempt per (student, assignment) and order the result.
///
/// "Best" is the highest pass ratio; the first submission seen wins ties.
/// Rows are ordered by assignment title, then by pass ratio descending.
pub fn build_leaderboard(submissions: &[Submission]) -> Vec<LeaderboardEntry> {
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();
    let mut entries: Vec<LeaderboardEntry> = Vec::new();

    for sub in submissions {
        let key = (sub.student_name.as_str(), sub.assignment_title.as_str());
        let candidate = LeaderboardEntry {
            student_name: sub.student_name.clone(),
            assignment_title: sub.assignment_title.clone(),
            passed_tests: sub.passed_tests,
            total_tests: sub.total_tests,
            submission_time: sub.submission_time.clone(),
        };
        match index.get(&key) {
            Some(&i) => {
                if candidate.pass_ratio() > entries[i].pass_ratio() {
                    entries[i] = candidate;
                }
            }
            None => {
                index.insert(key, entries.len());
                entries.push(candidate);
            }
        }
    }

    entries.sort_by(|a, b| {
        a.assignment_title.cmp(&b.assignment_title).then_with(|| {
            b.pass_ratio()
                .partial_cmp(&a.pass_ratio())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    });
    entries
}

/// Number of submissions per assignment title, in first-seen order.
pub fn count_by_assignment(submissions: &[Submission]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for sub in submissions {
        match counts.iter_mut().find(|(title, _)| *title == sub.assignment_title) {
            Some((_, n)) => *n += 1,
            None => counts.push((sub.assignment_title.clone(), 1)),
        }
    }
    counts
}

/// Split assignments into (live, past) relative to `now`.
///
/// An assignment whose due date cannot be parsed is treated as past.
pub fn partition_by_due_date(
    assignments: &[InstructorAssignment],
    now: NaiveDateTime,
) -> (Vec<&InstructorAssignment>, Vec<&InstructorAssignment>) {
    assignments.iter().partition(|a| {
        parse_due_date(&a.due_date)
            .map(|due| due > now)
            .unwrap_or(false)
    })
}
