//! Wire data model for the VedaScore REST API.
//!
//! Field names follow the server's JSON exactly. Anything the server may
//! omit is `#[serde(default)]` so that an older or partial payload still
//! decodes.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Community
// ---------------------------------------------------------------------------

/// A post in the community discussion feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub title: String,
    pub content: String,
    #[serde(default = "default_post_type")]
    pub post_type: String,
    #[serde(default)]
    pub media_url: Option<String>,
    pub user_name: String,
    /// Single-letter avatar computed by the server.
    #[serde(default)]
    pub user_avatar: String,
    pub created_at: String,
    #[serde(default)]
    pub likes_count: u32,
    #[serde(default)]
    pub comments_count: u32,
    #[serde(default)]
    pub user_liked: bool,
}

fn default_post_type() -> String {
    POST_TYPE_TEXT.to_string()
}

/// The only post type the client creates.
pub const POST_TYPE_TEXT: &str = "text";

/// One page of the community feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostPage {
    pub posts: Vec<Post>,
    #[serde(default)]
    pub has_next: bool,
    #[serde(default)]
    pub has_prev: bool,
}

/// Body of `POST /api/community/posts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub post_type: String,
}

impl NewPost {
    pub fn text(title: &str, content: &str) -> Self {
        Self {
            title: title.to_string(),
            content: content.to_string(),
            post_type: POST_TYPE_TEXT.to_string(),
        }
    }
}

/// Moderation verdict the server attaches to a new post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModerationStatus {
    Approved,
    Flagged,
    Rejected,
    #[serde(other)]
    Unknown,
}

/// Response of `POST /api/community/posts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostCreated {
    pub moderation_status: ModerationStatus,
    #[serde(default)]
    pub post_id: Option<u64>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response of `POST /api/community/posts/:id/like`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeStatus {
    pub liked: bool,
    pub likes_count: u32,
}

/// A comment on a community post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub id: Option<u64>,
    pub content: String,
    pub user_name: String,
    #[serde(default)]
    pub user_avatar: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommentList {
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewComment {
    pub content: String,
}

// ---------------------------------------------------------------------------
// Instructor
// ---------------------------------------------------------------------------

/// Outcome of one test case run against a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCaseResult {
    #[serde(default)]
    pub case_num: u32,
    #[serde(default)]
    pub input: Value,
    #[serde(default)]
    pub expected: Value,
    #[serde(default)]
    pub actual: Value,
    #[serde(default)]
    pub passed: bool,
}

/// A student's submission as seen by the instructor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub submission_id: u64,
    pub student_name: String,
    #[serde(default)]
    pub student_email: String,
    #[serde(default)]
    pub assignment_id: u64,
    pub assignment_title: String,
    pub submission_time: String,
    #[serde(default)]
    pub passed_tests: u32,
    #[serde(default)]
    pub total_tests: u32,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub test_results: Vec<TestCaseResult>,
    #[serde(default)]
    pub success_rate: f64,
}

impl Submission {
    /// Fraction of tests passed, 0.0 when the assignment has no tests.
    pub fn pass_ratio(&self) -> f64 {
        ratio(self.passed_tests, self.total_tests)
    }

    /// Identifier as stored in the local deletion list.
    pub fn key(&self) -> String {
        self.submission_id.to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionList {
    #[serde(default)]
    pub submissions: Vec<Submission>,
}

/// An assignment as listed on the instructor dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstructorAssignment {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub due_date: String,
    #[serde(default)]
    pub total_submissions: u32,
    #[serde(default)]
    pub passed_submissions: u32,
    #[serde(default)]
    pub test_cases: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstructorAssignmentList {
    #[serde(default)]
    pub assignments: Vec<InstructorAssignment>,
}

/// Body of `POST /api/create_assignment`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewAssignment {
    pub title: String,
    pub description: String,
    pub deadline: String,
    pub test_cases: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedAssignment {
    #[serde(default)]
    pub id: Option<u64>,
    pub title: String,
    #[serde(default)]
    pub due_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentCreated {
    pub message: String,
    #[serde(default)]
    pub assignment: Option<CreatedAssignment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedTestCases {
    pub test_cases: String,
}

/// The submission a plagiarism check was run for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckedSubmission {
    pub id: u64,
    pub student_name: String,
    pub assignment_title: String,
}

/// Another submission that resembles the checked one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Similarity {
    pub similarity_score: f64,
    pub student_name: String,
    #[serde(default)]
    pub student_email: String,
    #[serde(default)]
    pub submission_id: Option<u64>,
    #[serde(default)]
    pub submission_time: String,
}

impl Similarity {
    pub fn severity(&self) -> Severity {
        Severity::for_score(self.similarity_score)
    }
}

/// How alarming a similarity score is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Danger,
}

impl Severity {
    pub fn for_score(score: f64) -> Self {
        if score > 70.0 {
            Severity::Danger
        } else if score > 40.0 {
            Severity::Warning
        } else {
            Severity::Info
        }
    }

    /// CSS color variable used for the severity stripe.
    pub fn css_color(self) -> &'static str {
        match self {
            Severity::Info => "var(--info)",
            Severity::Warning => "var(--warning)",
            Severity::Danger => "var(--danger)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlagiarismReport {
    pub submission_checked: CheckedSubmission,
    #[serde(default)]
    pub similarities: Vec<Similarity>,
}

/// Result of `DELETE /api/delete_submission/:id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    /// Absent when the server answered 2xx with a non-JSON body.
    #[serde(default)]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Student
// ---------------------------------------------------------------------------

/// An assignment as seen by the logged-in student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentAssignment {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub due_date: String,
    #[serde(default)]
    pub is_submitted: bool,
    #[serde(default)]
    pub passed_tests: u32,
    #[serde(default)]
    pub total_tests: u32,
}

impl StudentAssignment {
    pub fn progress_percent(&self) -> u32 {
        percent(self.passed_tests, self.total_tests)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentAssignmentList {
    #[serde(default)]
    pub assignments: Vec<StudentAssignment>,
}

/// Body of both dashboard AI endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardRequest {
    pub assignments_description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardFeedback {
    pub feedback: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardQuiz {
    pub content: String,
}

// ---------------------------------------------------------------------------
// Editor files
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveFile {
    pub filename: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedFile {
    pub filename: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `passed / total`, or 0.0 when there are no tests.
pub fn ratio(passed: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        passed as f64 / total as f64
    }
}

/// Rounded percentage of tests passed, 0 when there are no tests.
pub fn percent(passed: u32, total: u32) -> u32 {
    (ratio(passed, total) * 100.0).round() as u32
}

/// Render a JSON scalar the way it should read on screen (strings unquoted).
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Parse a server due date.
///
/// Instructor endpoints send `YYYY-MM-DD`, the student endpoint sends
/// `YYYY-MM-DD HH:MM:SS`. A bare date is taken as midnight.
pub fn parse_due_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// How far away a deadline is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueStatus {
    DaysLeft(i64),
    DueToday,
    Overdue,
}

impl DueStatus {
    /// Whole days remaining, rounded up.
    pub fn between(due: NaiveDateTime, now: NaiveDateTime) -> Self {
        let millis = (due - now).num_milliseconds();
        let day = 86_400_000i64;
        let days = if millis > 0 {
            (millis + day - 1) / day
        } else {
            // truncation is the ceiling for negative spans
            millis / day
        };
        match days {
            d if d > 0 => DueStatus::DaysLeft(d),
            0 => DueStatus::DueToday,
            _ => DueStatus::Overdue,
        }
    }
}

impl fmt::Display for DueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DueStatus::DaysLeft(d) => write!(f, "({d} days left)"),
            DueStatus::DueToday => write!(f, "(Due Today)"),
            DueStatus::Overdue => write!(f, "(Overdue)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(raw: &str) -> NaiveDateTime {
        parse_due_date(raw).unwrap()
    }

    #[test]
    fn parse_both_due_date_formats() {
        assert_eq!(at("2025-03-01"), at("2025-03-01 00:00:00"));
        assert!(parse_due_date("next tuesday").is_none());
    }

    #[test]
    fn due_status_rounds_up() {
        let now = at("2025-03-01 12:00:00");
        assert_eq!(
            DueStatus::between(at("2025-03-02 13:00:00"), now),
            DueStatus::DaysLeft(2)
        );
        assert_eq!(
            DueStatus::between(at("2025-03-01 18:00:00"), now),
            DueStatus::DaysLeft(1)
        );
        assert_eq!(DueStatus::between(now, now), DueStatus::DueToday);
        assert_eq!(
            DueStatus::between(at("2025-03-01 06:00:00"), now),
            DueStatus::DueToday
        );
        assert_eq!(
            DueStatus::between(at("2025-02-27 12:00:00"), now),
            DueStatus::Overdue
        );
        assert_eq!(DueStatus::DaysLeft(3).to_string(), "(3 days left)");
    }

    #[test]
    fn progress_handles_zero_tests() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(5, 5), 100);
    }

    #[test]
    fn severity_thresholds() {
        assert_eq!(Severity::for_score(70.0), Severity::Warning);
        assert_eq!(Severity::for_score(70.5), Severity::Danger);
        assert_eq!(Severity::for_score(40.0), Severity::Info);
        assert_eq!(Severity::for_score(41.0).css_color(), "var(--warning)");
    }

    #[test]
    fn decode_submission_with_missing_optionals() {
        let json = serde_json::json!({
            "submission_id": 7,
            "student_name": "Asha",
            "assignment_title": "Loops",
            "submission_time": "2025-03-01 10:00:00",
            "passed_tests": 2,
            "total_tests": 4,
            "test_results": [{"case_num": 1, "input": 3, "expected": "9", "actual": "9", "passed": true}]
        });
        let sub: Submission = serde_json::from_value(json).unwrap();
        assert_eq!(sub.pass_ratio(), 0.5);
        assert_eq!(sub.key(), "7");
        assert_eq!(display_value(&sub.test_results[0].input), "3");
        assert_eq!(display_value(&sub.test_results[0].expected), "9");
    }

    #[test]
    fn unknown_moderation_status_decodes() {
        let created: PostCreated =
            serde_json::from_str(r#"{"moderation_status": "PENDING_REVIEW"}"#).unwrap();
        assert_eq!(created.moderation_status, ModerationStatus::Unknown);
        let flagged: PostCreated =
            serde_json::from_str(r#"{"moderation_status": "FLAGGED", "post_id": 4}"#).unwrap();
        assert_eq!(flagged.moderation_status, ModerationStatus::Flagged);
    }
}
