//! Instructor dashboard: submissions, leaderboard, assignments, plagiarism
//! checks and the submission delete flow.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::NaiveDateTime;

use vedascore_core::leaderboard::{build_leaderboard, count_by_assignment, partition_by_due_date};
use vedascore_core::markup::html_escape;
use vedascore_core::model::{
    display_value, InstructorAssignment, NewAssignment, PlagiarismReport, Similarity, Submission,
};
use vedascore_core::tools::{EditorTool, ToolRequest};
use vedascore_core::{ApiError, VedaApi};

use crate::dispatch::Dispatcher;
use crate::loader::{error_html, LoadSpec, ResourceLoader};
use crate::storage::DeletedSubmissions;
use crate::surface::Surface;

pub const SUBMISSIONS: &str = "student-submissions-container";
pub const RECEIVED: &str = "received-submissions-list";
pub const LEADERBOARD: &str = "leaderboard-body";
pub const LIVE_ASSIGNMENTS: &str = "live-assignments-list";
pub const PAST_ASSIGNMENTS: &str = "past-assignments-list";
pub const ASSIGNMENT_SELECT: &str = "assignment-select";
pub const PLAGIARISM_RESULTS: &str = "plagiarism-results";
pub const PLAGIARISM_CONTAINER: &str = "plagiarism-results-container";
pub const TEST_CASES: &str = "assignment-test-cases";
pub const CODE_MODAL: &str = "code-modal";
pub const MODAL_TITLE: &str = "modal-title";
pub const MODAL_CODE: &str = "modal-code-content";
pub const MODAL_OUTPUT: &str = "modal-output-content";
pub const CONFIRM_MODAL: &str = "confirmation-modal";
pub const CONFIRM_MESSAGE: &str = "confirmation-message";

const DELETE_SUCCESS: &str = "Submission deleted successfully";
const DELETE_FALLBACK: &str =
    "Submission removed from view. Note: This is a client-side removal only.";

#[derive(Debug, Default)]
struct DashboardState {
    submissions: Vec<Submission>,
    assignments: Vec<InstructorAssignment>,
    current_submission: Option<u64>,
    pending_delete: Option<u64>,
}

pub struct InstructorDashboard {
    api: Arc<dyn VedaApi>,
    surface: Arc<dyn Surface>,
    loader: ResourceLoader,
    deleted: Arc<DeletedSubmissions>,
    state: Mutex<DashboardState>,
}

impl InstructorDashboard {
    pub fn new(
        api: Arc<dyn VedaApi>,
        surface: Arc<dyn Surface>,
        deleted: Arc<DeletedSubmissions>,
    ) -> Self {
        Self {
            api,
            loader: ResourceLoader::new(surface.clone()),
            surface,
            deleted,
            state: Mutex::new(DashboardState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, DashboardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn current_submission(&self) -> Option<u64> {
        self.state().current_submission
    }

    pub fn pending_delete(&self) -> Option<u64> {
        self.state().pending_delete
    }

    /// Submissions currently shown, with locally deleted ones filtered out.
    pub fn active_submissions(&self) -> Vec<Submission> {
        self.state().submissions.clone()
    }

    /// Initial page load.
    pub async fn load(&self) {
        self.load_assignments().await;
        self.load_submissions().await;
    }

    fn filter_deleted(&self, submissions: Vec<Submission>) -> Vec<Submission> {
        submissions
            .into_iter()
            .filter(|s| !self.deleted.contains(&s.key()))
            .collect()
    }

    /// Fetch submissions once and render the list, the received summary and
    /// the leaderboard from it.
    pub async fn load_submissions(&self) {
        // already logged and drawn into the regions
        let _ = self.try_load_submissions().await;
    }

    /// [`load_submissions`](Self::load_submissions), handing a failed
    /// request back to the caller as well.
    pub async fn try_load_submissions(&self) -> Result<(), ApiError> {
        let spec = LoadSpec::new("Error loading submissions");
        let list = self
            .loader
            .fetch(&[], &spec, self.api.instructor_submissions(), |e| {
                self.surface
                    .set_html(SUBMISSIONS, error_html(&spec.error_prefix, e));
                self.surface
                    .set_html(RECEIVED, error_html(&spec.error_prefix, e));
                self.surface.set_html(
                    LEADERBOARD,
                    format!(
                        "<tr><td colspan=\"4\">Error loading leaderboard data: {}</td></tr>",
                        html_escape(&e.to_string())
                    ),
                );
            })
            .await?;
        let active = self.filter_deleted(list.submissions);
        self.state().submissions = active;
        self.render_submission_views();
        Ok(())
    }

    fn render_submission_views(&self) {
        let submissions = self.active_submissions();
        self.surface
            .set_html(SUBMISSIONS, render_submission_list(&submissions));
        self.surface.set_html(RECEIVED, render_received(&submissions));
        self.surface
            .set_html(LEADERBOARD, render_leaderboard(&submissions));
    }

    /// Fetch assignments and render the live/past lists and the plagiarism
    /// assignment picker.
    pub async fn load_assignments(&self) {
        let spec = LoadSpec::new("Error loading assignments");
        let result = self
            .loader
            .fetch(&[], &spec, self.api.instructor_assignments(), |_| {
                self.surface.set_html(
                    ASSIGNMENT_SELECT,
                    "<option value=\"\">Error loading assignments</option>".to_string(),
                );
            })
            .await;
        let Ok(list) = result else {
            return;
        };
        let now = chrono::Local::now().naive_local();
        self.render_assignments(&list.assignments, now);
        self.surface
            .set_html(ASSIGNMENT_SELECT, render_assignment_options(&list.assignments));
        self.state().assignments = list.assignments;
    }

    fn render_assignments(&self, assignments: &[InstructorAssignment], now: NaiveDateTime) {
        let (live, past) = partition_by_due_date(assignments, now);
        let items = |list: Vec<&InstructorAssignment>| -> String {
            list.into_iter().map(render_assignment_item).collect()
        };
        self.surface.set_html(LIVE_ASSIGNMENTS, items(live));
        self.surface.set_html(PAST_ASSIGNMENTS, items(past));
    }

    async fn find_submission(&self, submission_id: u64) -> Result<Option<Submission>, ApiError> {
        let cached = self
            .state()
            .submissions
            .iter()
            .find(|s| s.submission_id == submission_id)
            .cloned();
        if cached.is_some() {
            return Ok(cached);
        }
        let list = self.api.instructor_submissions().await?;
        Ok(list
            .submissions
            .into_iter()
            .find(|s| s.submission_id == submission_id))
    }

    /// Open the code modal for a submission.
    pub async fn view_submission(&self, submission_id: u64) {
        let spec = LoadSpec::new("Error loading submission code");
        let Some(found) = self.loader.notify(&spec, self.find_submission(submission_id)).await
        else {
            return;
        };
        let Some(sub) = found else {
            tracing::warn!(submission_id, "submission not found");
            return;
        };

        self.state().current_submission = Some(submission_id);
        self.surface.set_html(
            MODAL_TITLE,
            html_escape(&format!(
                "Code Submission - {} - {}",
                sub.student_name, sub.assignment_title
            )),
        );
        self.surface.set_html(
            MODAL_CODE,
            format!("<pre><code>{}</code></pre>", html_escape(&sub.code)),
        );
        let output = sub.output.as_deref().unwrap_or("No output available");
        self.surface
            .set_html(MODAL_OUTPUT, format!("<pre>{}</pre>", html_escape(output)));
        self.surface.set_visible(CODE_MODAL, true);
    }

    pub fn close_modal(&self) {
        self.surface.set_visible(CODE_MODAL, false);
    }

    /// Ask the explain tool about the submission open in the modal.
    pub async fn analyze_current(&self) {
        let Some(id) = self.current_submission() else {
            return;
        };
        let spec = LoadSpec::new("Error analyzing code");
        let found = self
            .loader
            .fetch(&[], &spec, self.find_submission(id), |_| {
                self.surface
                    .set_html(MODAL_OUTPUT, "<pre>Error analyzing code</pre>".to_string())
            })
            .await;
        let Ok(Some(sub)) = found else {
            return;
        };

        let spec = LoadSpec::new("Error getting AI analysis");
        let call = async {
            let body = self
                .api
                .run_tool(EditorTool::Explain, &ToolRequest::new(sub.code))
                .await?;
            Ok::<_, ApiError>(
                EditorTool::Explain
                    .render_output(&body)
                    .unwrap_or_else(|_| "No AI analysis available".to_string()),
            )
        };
        let text = match self.loader.fetch(&[], &spec, call, |_| {}).await {
            Ok(text) => text,
            Err(e) => format!("{}: {e}", spec.error_prefix),
        };
        self.surface
            .set_html(MODAL_OUTPUT, format!("<pre>{}</pre>", html_escape(&text)));
    }

    pub async fn check_submission_plagiarism(&self, submission_id: u64) {
        let spec = LoadSpec::new("Error checking plagiarism");
        self.loader
            .load(
                PLAGIARISM_CONTAINER,
                &spec,
                self.api.check_submission_plagiarism(submission_id),
                render_plagiarism_report,
            )
            .await;
        self.surface.set_visible(PLAGIARISM_RESULTS, true);
    }

    /// Plagiarism check from the code modal.
    pub async fn check_current_plagiarism(&self) {
        if let Some(id) = self.current_submission() {
            self.close_modal();
            self.check_submission_plagiarism(id).await;
        }
    }

    /// Check every active submission of one assignment, one after another.
    pub async fn check_assignment_plagiarism(&self, assignment_id: u64) {
        let title = self
            .state()
            .assignments
            .iter()
            .find(|a| a.id == assignment_id)
            .map(|a| a.title.clone());
        let Some(title) = title else {
            self.surface.notify("Please select an assignment first");
            return;
        };

        self.surface.set_visible(PLAGIARISM_RESULTS, true);
        let spec = LoadSpec::new("Error Checking Plagiarism")
            .with_loading("Analyzing submissions for plagiarism...");
        let result = self
            .loader
            .fetch(
                &[PLAGIARISM_CONTAINER],
                &spec,
                self.api.instructor_submissions(),
                |e| {
                    self.surface
                        .set_html(PLAGIARISM_CONTAINER, error_html(&spec.error_prefix, e))
                },
            )
            .await;
        let Ok(list) = result else {
            return;
        };
        let submissions = self.filter_deleted(list.submissions);

        let mut html = format!(
            "<h4>Plagiarism Analysis for: {}</h4>\n",
            html_escape(&title)
        );
        // a submission whose check fails is skipped
        let spec = LoadSpec::new("Error checking submission");
        let mut found = false;
        for sub in submissions.iter().filter(|s| s.assignment_title == title) {
            let request = self.api.check_submission_plagiarism(sub.submission_id);
            let Ok(report) = self.loader.fetch(&[], &spec, request, |_| {}).await else {
                continue;
            };
            if !report.similarities.is_empty() {
                found = true;
                html.push_str(&render_match(&report));
            }
        }
        if !found {
            html.push_str(
                "<div class=\"plagiarism-clear\"><h4>No Significant Plagiarism Detected!</h4><p>All submissions analyzed successfully.</p></div>\n",
            );
        }
        self.surface.set_html(PLAGIARISM_CONTAINER, html);
    }

    pub async fn create_assignment(&self, new: NewAssignment) {
        let new = NewAssignment {
            title: new.title.trim().to_string(),
            description: new.description.trim().to_string(),
            deadline: new.deadline.trim().to_string(),
            test_cases: new.test_cases.trim().to_string(),
        };
        if new.title.is_empty() || new.description.is_empty() || new.deadline.is_empty() {
            self.surface.notify("Please fill in all assignment details.");
            return;
        }

        let spec = LoadSpec::new("Error");
        let Some(created) = self.loader.notify(&spec, self.api.create_assignment(&new)).await
        else {
            return;
        };
        self.surface.notify(&created.message);
        if let Some(a) = &created.assignment {
            self.surface.append_html(
                LIVE_ASSIGNMENTS,
                &format!(
                    "<li><div class=\"assignment-title\">{}</div><div class=\"assignment-meta\">Due: {}</div></li>\n",
                    html_escape(&a.title),
                    html_escape(&a.due_date)
                ),
            );
        }
        self.surface.set_html(TEST_CASES, String::new());
        self.load_assignments().await;
    }

    pub async fn generate_test_cases(&self, description: &str) {
        let description = description.trim();
        if description.is_empty() {
            self.surface.notify(
                "Please enter an Assignment Description first to get AI-suggested test cases.",
            );
            return;
        }
        let spec = LoadSpec::new("Error");
        if let Some(generated) = self
            .loader
            .notify(&spec, self.api.generate_test_cases(description))
            .await
        {
            self.surface
                .set_html(TEST_CASES, html_escape(&generated.test_cases));
        }
    }

    /// Show the delete confirmation for a submission.
    pub async fn request_delete(&self, submission_id: u64) {
        let spec = LoadSpec::new("Error fetching submission details");
        let found = self
            .loader
            .fetch(&[], &spec, self.find_submission(submission_id), |_| {})
            .await;
        let Ok(found) = found else {
            return;
        };
        let Some(sub) = found else {
            tracing::warn!(submission_id, "submission not found");
            return;
        };
        {
            let mut state = self.state();
            state.pending_delete = Some(submission_id);
            state.current_submission = Some(submission_id);
        }
        self.surface.set_html(
            CONFIRM_MESSAGE,
            html_escape(&format!(
                "Are you sure you want to delete the submission from {} for \"{}\"? This action cannot be undone.",
                sub.student_name, sub.assignment_title
            )),
        );
        self.surface.set_visible(CONFIRM_MODAL, true);
    }

    /// Delete button inside the code modal.
    pub async fn request_delete_current(&self) {
        if let Some(id) = self.current_submission() {
            self.close_modal();
            self.request_delete(id).await;
        }
    }

    pub fn cancel_delete(&self) {
        self.state().pending_delete = None;
        self.surface.set_visible(CONFIRM_MODAL, false);
    }

    /// Delete the pending submission, falling back to hiding it locally.
    pub async fn confirm_delete(&self) {
        let Some(id) = self.state().pending_delete.take() else {
            return;
        };
        self.surface.set_visible(CONFIRM_MODAL, false);

        match self.api.delete_submission(id).await {
            Ok(outcome) => {
                let message = outcome.message.unwrap_or_else(|| DELETE_SUCCESS.to_string());
                self.surface.notify(&message);
            }
            Err(e) => {
                tracing::warn!(submission_id = id, error = %e, "delete failed, hiding submission locally");
                self.surface.notify(DELETE_FALLBACK);
            }
        }
        self.mark_deleted(id);
    }

    fn mark_deleted(&self, submission_id: u64) {
        if let Err(e) = self.deleted.insert(&submission_id.to_string()) {
            tracing::error!(submission_id, error = %e, "failed to persist deleted submission");
        }
        {
            let mut state = self.state();
            state.submissions.retain(|s| s.submission_id != submission_id);
            if state.current_submission == Some(submission_id) {
                state.current_submission = None;
            }
        }
        self.render_submission_views();
    }

    /// Register `instructor.*` actions.
    pub fn register(self: &Arc<Self>, dispatcher: &mut Dispatcher) {
        let this = self.clone();
        dispatcher.register("instructor.load", move |_| {
            let this = this.clone();
            async move {
                this.load().await;
                Ok(())
            }
        });

        let this = self.clone();
        dispatcher.register("instructor.view_submission", move |params| {
            let this = this.clone();
            async move {
                this.view_submission(params.parse("submission_id")?).await;
                Ok(())
            }
        });

        let this = self.clone();
        dispatcher.register("instructor.analyze", move |_| {
            let this = this.clone();
            async move {
                this.analyze_current().await;
                Ok(())
            }
        });

        let this = self.clone();
        dispatcher.register("instructor.close_modal", move |_| {
            let this = this.clone();
            async move {
                this.close_modal();
                Ok(())
            }
        });

        let this = self.clone();
        dispatcher.register("instructor.check_plagiarism", move |params| {
            let this = this.clone();
            async move {
                match params.opt("submission_id") {
                    Some(_) => {
                        this.check_submission_plagiarism(params.parse("submission_id")?)
                            .await
                    }
                    None => this.check_current_plagiarism().await,
                }
                Ok(())
            }
        });

        let this = self.clone();
        dispatcher.register("instructor.check_assignment_plagiarism", move |params| {
            let this = this.clone();
            async move {
                this.check_assignment_plagiarism(params.parse("assignment_id")?)
                    .await;
                Ok(())
            }
        });

        let this = self.clone();
        dispatcher.register("instructor.create_assignment", move |params| {
            let this = this.clone();
            async move {
                let field = |name: &str| params.opt(name).unwrap_or_default().to_string();
                this.create_assignment(NewAssignment {
                    title: field("title"),
                    description: field("description"),
                    deadline: field("deadline"),
                    test_cases: field("test_cases"),
                })
                .await;
                Ok(())
            }
        });

        let this = self.clone();
        dispatcher.register("instructor.generate_test_cases", move |params| {
            let this = this.clone();
            async move {
                this.generate_test_cases(params.opt("description").unwrap_or_default())
                    .await;
                Ok(())
            }
        });

        let this = self.clone();
        dispatcher.register("instructor.request_delete", move |params| {
            let this = this.clone();
            async move {
                match params.opt("submission_id") {
                    Some(_) => this.request_delete(params.parse("submission_id")?).await,
                    None => this.request_delete_current().await,
                }
                Ok(())
            }
        });

        let this = self.clone();
        dispatcher.register("instructor.cancel_delete", move |_| {
            let this = this.clone();
            async move {
                this.cancel_delete();
                Ok(())
            }
        });

        let this = self.clone();
        dispatcher.register("instructor.confirm_delete", move |_| {
            let this = this.clone();
            async move {
                this.confirm_delete().await;
                Ok(())
            }
        });
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

const NO_SUBMISSIONS: &str = "<div class=\"empty-state\">No submissions received yet.</div>";

/// Score badge class for a success rate in percent.
pub fn score_class(success_rate: f64) -> &'static str {
    if success_rate >= 70.0 {
        "score-passed"
    } else {
        "score-failed"
    }
}

fn format_rate(rate: f64) -> String {
    let rounded = (rate * 100.0).round() / 100.0;
    format!("{rounded}")
}

pub fn render_submission_list(submissions: &[Submission]) -> String {
    if submissions.is_empty() {
        return NO_SUBMISSIONS.to_string();
    }
    submissions.iter().map(render_submission).collect()
}

pub fn render_submission(sub: &Submission) -> String {
    let mut html = String::new();
    html.push_str(&format!(
        "<div class=\"submission-item\" id=\"submission-{}\">\n",
        sub.submission_id
    ));
    html.push_str(&format!(
        "<div class=\"submission-header\"><div class=\"student-info\">{} ({})<div class=\"submission-meta\">Assignment: {} | Submitted: {}</div></div>",
        html_escape(&sub.student_name),
        html_escape(&sub.student_email),
        html_escape(&sub.assignment_title),
        html_escape(&sub.submission_time)
    ));
    html.push_str(&format!(
        "<div class=\"score-badge {}\">{}/{} ({}%)</div></div>\n",
        score_class(sub.success_rate),
        sub.passed_tests,
        sub.total_tests,
        format_rate(sub.success_rate)
    ));

    html.push_str("<div class=\"test-results\"><strong>Test Results:</strong>");
    if sub.test_results.is_empty() {
        html.push_str("<div>No test results available</div>");
    }
    for test in &sub.test_results {
        let (class, label) = if test.passed {
            ("passed", "PASSED")
        } else {
            ("failed", "FAILED")
        };
        html.push_str(&format!(
            "<div class=\"test-case {class}\">Test {}: Input: {} | Expected: {} | Actual: {} | <strong>{label}</strong></div>",
            test.case_num,
            html_escape(&display_value(&test.input)),
            html_escape(&display_value(&test.expected)),
            html_escape(&display_value(&test.actual)),
        ));
    }
    html.push_str("</div>\n");

    html.push_str(&format!(
        "<div class=\"submission-actions\" data-submission-id=\"{id}\"><button class=\"view-code-btn\" data-action=\"instructor.view_submission\">View Code</button><button class=\"check-plagiarism-btn\" data-action=\"instructor.check_plagiarism\">Check Plagiarism</button><button class=\"delete-submission-btn\" data-action=\"instructor.request_delete\">Delete</button></div>\n",
        id = sub.submission_id
    ));
    html.push_str("</div>\n");
    html
}

pub fn render_received(submissions: &[Submission]) -> String {
    if submissions.is_empty() {
        return NO_SUBMISSIONS.to_string();
    }
    count_by_assignment(submissions)
        .into_iter()
        .map(|(title, n)| {
            format!(
                "<div class=\"received-item\"><strong>{}</strong><div class=\"received-count\">{n} submission{}</div></div>\n",
                html_escape(&title),
                if n == 1 { "" } else { "s" }
            )
        })
        .collect()
}

pub fn render_leaderboard(submissions: &[Submission]) -> String {
    let entries = build_leaderboard(submissions);
    if entries.is_empty() {
        return "<tr><td colspan=\"4\">No leaderboard data available.</td></tr>".to_string();
    }
    entries
        .iter()
        .map(|e| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}/{}</td><td>{}</td></tr>\n",
                html_escape(&e.student_name),
                html_escape(&e.assignment_title),
                e.passed_tests,
                e.total_tests,
                html_escape(e.submitted_on())
            )
        })
        .collect()
}

fn render_assignment_item(a: &InstructorAssignment) -> String {
    format!(
        "<li><div class=\"assignment-title\">{}</div><div class=\"assignment-meta\">Due: {} | Submissions: {}</div></li>\n",
        html_escape(&a.title),
        html_escape(&a.due_date),
        a.total_submissions
    )
}

fn render_assignment_options(assignments: &[InstructorAssignment]) -> String {
    let mut html = String::from("<option value=\"\">Select Assignment to Check</option>");
    for a in assignments {
        html.push_str(&format!(
            "<option value=\"{}\">{} ({} submissions)</option>",
            a.id,
            html_escape(&a.title),
            a.total_submissions
        ));
    }
    html
}

fn render_similarity(sim: &Similarity, with_details: bool) -> String {
    let color = sim.severity().css_color();
    let who = if with_details {
        format!(
            "{} ({})",
            html_escape(&sim.student_name),
            html_escape(&sim.student_email)
        )
    } else {
        html_escape(&sim.student_name)
    };
    let mut html = format!(
        "<div class=\"similarity\" style=\"border-left: 3px solid {color};\"><strong>{who}</strong> <span style=\"color: {color}; font-weight: bold;\">{}% similar</span>",
        sim.similarity_score
    );
    if with_details {
        html.push_str(&format!(
            "<div class=\"similarity-time\">Submitted: {}</div>",
            html_escape(&sim.submission_time)
        ));
    }
    html.push_str("</div>\n");
    html
}

/// Report for a single submission check.
pub fn render_plagiarism_report(report: &PlagiarismReport) -> String {
    let checked = &report.submission_checked;
    let mut html = String::from("<h4>Plagiarism Analysis Results</h4>\n");
    html.push_str(&format!(
        "<div><strong>Submission:</strong> {} - {}</div>\n",
        html_escape(&checked.student_name),
        html_escape(&checked.assignment_title)
    ));
    if report.similarities.is_empty() {
        html.push_str("<div class=\"plagiarism-clear\">No significant plagiarism detected</div>\n");
        return html;
    }
    html.push_str("<div class=\"plagiarism-warning\"><strong>Potential Plagiarism Detected</strong></div>\n");
    html.push_str("<div><strong>Similar Submissions Found:</strong>\n");
    for sim in &report.similarities {
        html.push_str(&render_similarity(sim, true));
    }
    html.push_str("</div>\n");
    html
}

fn render_match(report: &PlagiarismReport) -> String {
    let mut html = String::from(
        "<div class=\"plagiarism-match\"><strong>Potential Plagiarism Detected</strong>\n",
    );
    html.push_str(&format!(
        "<div><strong>Student:</strong> {}</div>\n<div><strong>Similar Submissions Found:</strong>\n",
        html_escape(&report.submission_checked.student_name)
    ));
    for sim in &report.similarities {
        html.push_str(&render_similarity(sim, false));
    }
    html.push_str("</div></div>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    use vedascore_client::MockApi;

    use crate::dispatch::Params;
    use crate::storage::LocalStore;
    use crate::surface::MemorySurface;

    struct Fixture {
        api: Arc<MockApi>,
        surface: Arc<MemorySurface>,
        store: Arc<LocalStore>,
        dashboard: Arc<InstructorDashboard>,
    }

    fn fixture_with(api: MockApi, store: LocalStore) -> Fixture {
        let api = Arc::new(api);
        let surface = Arc::new(MemorySurface::new());
        let store = Arc::new(store);
        let deleted = Arc::new(DeletedSubmissions::load(store.clone()));
        let dashboard = Arc::new(InstructorDashboard::new(
            api.clone(),
            surface.clone(),
            deleted,
        ));
        Fixture {
            api,
            surface,
            store,
            dashboard,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(MockApi::demo(), LocalStore::in_memory())
    }

    #[tokio::test]
    async fn load_renders_all_sections() {
        let f = fixture();
        f.dashboard.load().await;

        let list = f.surface.html(SUBMISSIONS);
        assert_eq!(list.matches("class=\"submission-item\"").count(), 3);
        assert!(list.contains("score-badge score-passed\">2/2 (100%)"));
        assert!(list.contains("score-badge score-failed\">1/2 (50%)"));
        assert!(list.contains("Test 2: Input: 3 | Expected: 6 | Actual: 5 | <strong>FAILED</strong>"));

        let received = f.surface.html(RECEIVED);
        assert!(received.contains("<strong>Loops</strong><div class=\"received-count\">2 submissions"));
        assert!(received.contains("1 submission</div>"));

        let board = f.surface.html(LEADERBOARD);
        let asha = board.find("<td>Asha</td><td>Loops</td>").unwrap();
        let ravi = board.find("<td>Ravi</td><td>Loops</td>").unwrap();
        assert!(asha < ravi);

        assert!(f.surface.html(LIVE_ASSIGNMENTS).contains("Loops"));
        assert!(f.surface.html(PAST_ASSIGNMENTS).contains("Strings"));
        assert!(f
            .surface
            .html(ASSIGNMENT_SELECT)
            .contains("<option value=\"1\">Loops (2 submissions)</option>"));
    }

    #[tokio::test]
    async fn failed_submission_load_is_drawn_and_returned() {
        let api = MockApi::demo();
        api.fail("instructor_submissions");
        let f = fixture_with(api, LocalStore::in_memory());

        let err = f.dashboard.try_load_submissions().await.unwrap_err();
        assert_eq!(err.to_string(), "instructor_submissions failed (HTTP 500)");
        assert!(f.dashboard.active_submissions().is_empty());
        assert!(f
            .surface
            .html(SUBMISSIONS)
            .contains("Error loading submissions: instructor_submissions failed"));
        assert!(f
            .surface
            .html(LEADERBOARD)
            .contains("Error loading leaderboard data: instructor_submissions failed"));

        f.api.recover("instructor_submissions");
        f.dashboard.try_load_submissions().await.unwrap();
        assert_eq!(f.dashboard.active_submissions().len(), 3);
    }

    #[tokio::test]
    async fn view_and_analyze_submission() {
        let f = fixture();
        f.dashboard.load().await;

        f.dashboard.view_submission(102).await;
        assert_eq!(f.dashboard.current_submission(), Some(102));
        assert!(f.surface.is_visible(CODE_MODAL));
        assert_eq!(
            f.surface.html(MODAL_TITLE),
            "Code Submission - Ravi - Loops"
        );

        f.dashboard.analyze_current().await;
        assert!(f.surface.html(MODAL_OUTPUT).contains("explain: 2 line(s) processed"));

        f.dashboard.close_modal();
        assert!(!f.surface.is_visible(CODE_MODAL));
    }

    #[tokio::test]
    async fn single_plagiarism_report_shows_severity() {
        let f = fixture();
        f.dashboard.check_submission_plagiarism(102).await;
        let html = f.surface.html(PLAGIARISM_CONTAINER);
        assert!(f.surface.is_visible(PLAGIARISM_RESULTS));
        assert!(html.contains("Potential Plagiarism Detected"));
        assert!(html.contains("var(--danger)"));
        assert!(html.contains("82.5% similar"));

        f.dashboard.check_submission_plagiarism(101).await;
        assert!(f
            .surface
            .html(PLAGIARISM_CONTAINER)
            .contains("No significant plagiarism detected"));
    }

    #[tokio::test]
    async fn assignment_plagiarism_combines_reports() {
        let f = fixture();
        f.dashboard.load().await;

        f.dashboard.check_assignment_plagiarism(1).await;
        let html = f.surface.html(PLAGIARISM_CONTAINER);
        assert!(html.starts_with("<h4>Plagiarism Analysis for: Loops</h4>"));
        assert_eq!(html.matches("plagiarism-match").count(), 1);
        assert_eq!(f.api.call_count("check_submission_plagiarism"), 2);

        f.dashboard.check_assignment_plagiarism(2).await;
        assert!(f
            .surface
            .html(PLAGIARISM_CONTAINER)
            .contains("No Significant Plagiarism Detected!"));
    }

    #[tokio::test]
    async fn assignment_plagiarism_skips_failed_checks() {
        let f = fixture();
        f.dashboard.load().await;
        f.api.fail("check_submission_plagiarism");

        f.dashboard.check_assignment_plagiarism(1).await;
        assert!(f
            .surface
            .html(PLAGIARISM_CONTAINER)
            .contains("No Significant Plagiarism Detected!"));
    }

    #[tokio::test]
    async fn create_assignment_requires_fields() {
        let f = fixture();
        f.dashboard
            .create_assignment(NewAssignment {
                title: "Recursion".into(),
                ..NewAssignment::default()
            })
            .await;
        assert_eq!(
            f.surface.last_notice().as_deref(),
            Some("Please fill in all assignment details.")
        );
        assert_eq!(f.api.call_count("create_assignment"), 0);

        f.dashboard
            .create_assignment(NewAssignment {
                title: "Recursion".into(),
                description: "Compute factorial.".into(),
                deadline: "2099-06-01".into(),
                test_cases: String::new(),
            })
            .await;
        assert_eq!(
            f.surface.last_notice().as_deref(),
            Some("Assignment created successfully")
        );
        assert!(f.surface.html(LIVE_ASSIGNMENTS).contains("Recursion"));
    }

    #[tokio::test]
    async fn generate_test_cases_fills_field() {
        let f = fixture();
        f.dashboard.generate_test_cases("  ").await;
        assert!(f
            .surface
            .last_notice()
            .unwrap()
            .starts_with("Please enter an Assignment Description first"));

        f.dashboard.generate_test_cases("Reverse a list").await;
        assert!(f.surface.html(TEST_CASES).contains("Reverse a list"));
    }

    #[tokio::test]
    async fn delete_through_server() {
        let f = fixture();
        f.dashboard.load().await;

        f.dashboard.request_delete(101).await;
        assert!(f.surface.is_visible(CONFIRM_MODAL));
        assert!(f
            .surface
            .html(CONFIRM_MESSAGE)
            .contains("from Asha for &quot;Loops&quot;"));

        f.dashboard.confirm_delete().await;
        assert!(!f.surface.is_visible(CONFIRM_MODAL));
        assert_eq!(
            f.surface.last_notice().as_deref(),
            Some("Submission deleted successfully")
        );
        assert_eq!(f.api.submission_ids(), vec![102, 103]);
        assert!(!f.surface.html(SUBMISSIONS).contains("submission-101"));
        assert!(f.surface.html(RECEIVED).contains("1 submission</div>"));
    }

    #[tokio::test]
    async fn cancel_delete_keeps_submission() {
        let f = fixture();
        f.dashboard.load().await;
        f.dashboard.request_delete(103).await;
        f.dashboard.cancel_delete();
        assert!(!f.surface.is_visible(CONFIRM_MODAL));
        assert_eq!(f.dashboard.pending_delete(), None);

        f.dashboard.confirm_delete().await;
        assert_eq!(f.api.call_count("delete_submission"), 0);
    }

    #[tokio::test]
    async fn delete_fallback_hides_after_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local-storage.json");

        let api = MockApi::demo();
        api.fail("delete_submission");
        let f = fixture_with(api, LocalStore::open(&path).unwrap());
        f.dashboard.load().await;

        f.dashboard.request_delete(103).await;
        f.dashboard.confirm_delete().await;
        assert_eq!(f.surface.last_notice().as_deref(), Some(DELETE_FALLBACK));
        assert_eq!(f.api.submission_ids(), vec![101, 102, 103]);
        assert_eq!(
            f.store.get::<Vec<String>>("deletedSubmissions"),
            Some(vec!["103".to_string()])
        );

        // A fresh page load reads the persisted list and keeps it hidden.
        let reloaded = fixture_with(MockApi::demo(), LocalStore::open(&path).unwrap());
        reloaded.dashboard.load().await;
        let ids: Vec<u64> = reloaded
            .dashboard
            .active_submissions()
            .iter()
            .map(|s| s.submission_id)
            .collect();
        assert_eq!(ids, vec![101, 102]);
        assert!(!reloaded.surface.html(SUBMISSIONS).contains("submission-103"));
        assert!(!reloaded.surface.html(LEADERBOARD).contains("Strings"));
    }

    #[tokio::test]
    async fn deleting_last_submission_shows_empty_state() {
        let api = MockApi::new();
        let demo = MockApi::demo();
        let only = demo.instructor_submissions().await.unwrap().submissions[0].clone();
        api.add_submission(only);
        let f = fixture_with(api, LocalStore::in_memory());
        f.dashboard.load().await;

        f.dashboard.request_delete(101).await;
        f.dashboard.confirm_delete().await;
        assert!(f.surface.html(SUBMISSIONS).contains("No submissions received yet."));
        assert!(f
            .surface
            .html(LEADERBOARD)
            .contains("No leaderboard data available."));
    }

    #[tokio::test]
    async fn delete_flow_through_dispatcher() {
        let f = fixture();
        let mut dispatcher = Dispatcher::new();
        f.dashboard.register(&mut dispatcher);

        dispatcher
            .dispatch("instructor.load", Params::default())
            .await
            .unwrap();
        dispatcher
            .dispatch(
                "instructor.request_delete",
                Params::new([("submission_id", "102")]),
            )
            .await
            .unwrap();
        dispatcher
            .dispatch("instructor.confirm_delete", Params::default())
            .await
            .unwrap();
        assert_eq!(f.api.submission_ids(), vec![101, 103]);

        let err = dispatcher
            .dispatch(
                "instructor.view_submission",
                Params::new([("submission_id", "abc")]),
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains("invalid value 'abc'"));
    }

    #[test]
    fn score_badge_threshold() {
        assert_eq!(score_class(70.0), "score-passed");
        assert_eq!(score_class(69.9), "score-failed");
        assert_eq!(format_rate(66.666_666), "66.67");
        assert_eq!(format_rate(100.0), "100");
    }
}
