//! Student dashboard: assignment cards, deadlines, AI feedback and the
//! self-refreshing quiz.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::NaiveDateTime;
use tokio::task::JoinHandle;

use vedascore_core::markup::{html_escape, render_markdown};
use vedascore_core::model::{parse_due_date, DueStatus, StudentAssignment};
use vedascore_core::quiz::render_quiz;
use vedascore_core::VedaApi;

use crate::dispatch::Dispatcher;
use crate::loader::{LoadSpec, ResourceLoader};
use crate::poll::{self, QUIZ_REFRESH};
use crate::surface::Surface;

pub const ASSIGNMENTS: &str = "assignments-list";
pub const DEADLINES: &str = "sidebar-assignments-deadlines";
pub const COMPLETION: &str = "assignment-completion-status";
pub const FEEDBACK: &str = "ai-feedback-dashboard";
pub const QUIZ: &str = "imp-quiz-dashboard";

pub struct StudentDashboard {
    api: Arc<dyn VedaApi>,
    surface: Arc<dyn Surface>,
    loader: ResourceLoader,
    quiz_period: Duration,
    quiz_task: Mutex<Option<JoinHandle<()>>>,
}

impl StudentDashboard {
    pub fn new(api: Arc<dyn VedaApi>, surface: Arc<dyn Surface>) -> Self {
        Self {
            api,
            loader: ResourceLoader::new(surface.clone()),
            surface,
            quiz_period: QUIZ_REFRESH,
            quiz_task: Mutex::new(None),
        }
    }

    pub fn with_quiz_refresh(mut self, period: Duration) -> Self {
        self.quiz_period = period;
        self
    }

    fn quiz_task(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.quiz_task.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Page load: assignments, then feedback and the quiz loop when there is
    /// anything to describe.
    pub async fn load(self: &Arc<Self>) {
        if let Some(description) = self.load_content().await {
            self.start_quiz_refresh(description);
        }
    }

    /// Like [`load`](Self::load) but fetches the quiz once instead of
    /// starting the refresh loop.
    pub async fn load_once(&self) {
        if let Some(description) = self.load_content().await {
            self.refresh_quiz(&description).await;
        }
    }

    /// Assignments and feedback. Returns the assignment description the quiz
    /// is generated from, if there are any assignments.
    async fn load_content(&self) -> Option<String> {
        let now = chrono::Local::now().naive_local();
        let assignments = self.load_assignments(now).await?;
        if assignments.is_empty() {
            return None;
        }
        let description = describe(&assignments);
        self.load_feedback(&description).await;
        Some(description)
    }

    /// Fetch and render the assignment list, the deadline sidebar and the
    /// completion line. `None` when the request failed.
    pub async fn load_assignments(&self, now: NaiveDateTime) -> Option<Vec<StudentAssignment>> {
        let spec = LoadSpec::new("Error loading student assignments");
        let list = self
            .loader
            .fetch(&[], &spec, self.api.student_assignments(), |e| {
                let message = html_escape(&e.to_string());
                self.surface.set_html(
                    DEADLINES,
                    "<li>Error loading assignments.</li>".to_string(),
                );
                self.surface.set_html(
                    FEEDBACK,
                    format!(
                        "<span class=\"error\">Error loading assignments for AI feedback: {message}</span>"
                    ),
                );
                self.surface.set_html(
                    QUIZ,
                    format!(
                        "<span class=\"error\">Error loading assignments for Imp/Quiz: {message}</span>"
                    ),
                );
            })
            .await
            .ok()?;
        let assignments = list.assignments;

        if assignments.is_empty() {
            self.surface
                .set_html(ASSIGNMENTS, "<li>No assignments found.</li>".to_string());
            self.surface
                .set_html(DEADLINES, "<li>No assignments found.</li>".to_string());
            self.surface
                .set_html(COMPLETION, "No assignments to track.".to_string());
            self.surface.set_html(
                FEEDBACK,
                "No assignments available to generate feedback.".to_string(),
            );
            self.surface.set_html(
                QUIZ,
                "No assignments available to generate quiz questions.".to_string(),
            );
            return Some(assignments);
        }

        self.surface.set_html(
            ASSIGNMENTS,
            assignments.iter().map(|a| render_card(a, now)).collect(),
        );
        self.surface.set_html(
            DEADLINES,
            assignments.iter().map(|a| render_deadline(a, now)).collect(),
        );
        self.surface
            .set_html(COMPLETION, render_completion(&assignments));
        Some(assignments)
    }

    pub async fn load_feedback(&self, description: &str) {
        let spec = LoadSpec::new("Error generating AI feedback")
            .with_loading("Generating general AI feedback...");
        self.loader
            .load(
                FEEDBACK,
                &spec,
                self.api.dashboard_feedback(description),
                |f| render_markdown(&f.feedback),
            )
            .await;
    }

    pub async fn refresh_quiz(&self, description: &str) {
        let spec = LoadSpec::new("Error generating Imp/Quiz")
            .with_loading("Generating quiz questions...");
        self.loader
            .load(
                QUIZ,
                &spec,
                self.api.dashboard_quiz(description),
                |q| render_quiz(&q.content),
            )
            .await;
    }

    /// Fetch the quiz now and then every quiz period. A previous loop is
    /// replaced.
    pub fn start_quiz_refresh(self: &Arc<Self>, description: String) {
        let weak = Arc::downgrade(self);
        let handle = poll::every(self.quiz_period, move || {
            let weak = weak.clone();
            let description = description.clone();
            async move {
                if let Some(this) = weak.upgrade() {
                    this.refresh_quiz(&description).await;
                }
            }
        });
        if let Some(previous) = self.quiz_task().replace(handle) {
            previous.abort();
        }
    }

    pub fn stop_quiz_refresh(&self) {
        if let Some(handle) = self.quiz_task().take() {
            handle.abort();
        }
    }

    pub fn is_quiz_refreshing(&self) -> bool {
        self.quiz_task()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Register `student.*` actions.
    pub fn register(self: &Arc<Self>, dispatcher: &mut Dispatcher) {
        let this = self.clone();
        dispatcher.register("student.load", move |_| {
            let this = this.clone();
            async move {
                this.load().await;
                Ok(())
            }
        });

        let this = self.clone();
        dispatcher.register("student.stop_quiz", move |_| {
            let this = this.clone();
            async move {
                this.stop_quiz_refresh();
                Ok(())
            }
        });
    }
}

impl Drop for StudentDashboard {
    fn drop(&mut self) {
        let task = self
            .quiz_task
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = task.take() {
            handle.abort();
        }
    }
}

/// The text sent to both dashboard AI endpoints.
pub fn describe(assignments: &[StudentAssignment]) -> String {
    assignments
        .iter()
        .map(|a| a.description.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Due date and remaining-time label. Unreadable dates count as overdue.
fn due_text(assignment: &StudentAssignment, now: NaiveDateTime) -> (String, DueStatus) {
    match parse_due_date(&assignment.due_date) {
        Some(due) => (
            due.format("%Y-%m-%d").to_string(),
            DueStatus::between(due, now),
        ),
        None => (assignment.due_date.clone(), DueStatus::Overdue),
    }
}

pub fn render_card(assignment: &StudentAssignment, now: NaiveDateTime) -> String {
    let (date, status) = due_text(assignment, now);
    let progress = assignment.progress_percent();
    let class = if assignment.is_submitted {
        "assignment-item submitted"
    } else {
        "assignment-item"
    };
    let submitted = if assignment.is_submitted {
        " <span class=\"assignment-submitted\">Submitted</span>"
    } else {
        ""
    };
    format!(
        "<li class=\"{class}\"><div class=\"assignment-header\"><a href=\"/assignment/{id}\" class=\"assignment-title-link\"><div class=\"assignment-title\">{title}</div></a><div class=\"assignment-due\">Due: {date} {status}{submitted}</div></div><div class=\"assignment-desc\">{desc}</div><div class=\"assignment-progress\"><div class=\"progress-bar\"><div class=\"progress-value\" style=\"width: {progress}%\"></div></div><div class=\"progress-text\">{progress}%</div></div></li>\n",
        id = assignment.id,
        title = html_escape(&assignment.title),
        date = html_escape(&date),
        desc = html_escape(&assignment.description),
    )
}

pub fn render_deadline(assignment: &StudentAssignment, now: NaiveDateTime) -> String {
    let (date, status) = due_text(assignment, now);
    let (class, label) = if assignment.is_submitted {
        ("assignment-status submitted", " - Submitted")
    } else {
        ("assignment-status", "")
    };
    format!(
        "<li><strong>{}</strong> - {} {status} <span class=\"{class}\">{label}</span></li>\n",
        html_escape(&assignment.title),
        html_escape(&date)
    )
}

pub fn render_completion(assignments: &[StudentAssignment]) -> String {
    let completed = assignments.iter().filter(|a| a.is_submitted).count();
    format!(
        "<p>{completed} of {} assignments completed.</p>",
        assignments.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    use vedascore_client::MockApi;

    use crate::surface::MemorySurface;

    fn dashboard(api: MockApi) -> (Arc<MockApi>, Arc<MemorySurface>, Arc<StudentDashboard>) {
        let api = Arc::new(api);
        let surface = Arc::new(MemorySurface::new());
        let dashboard = Arc::new(StudentDashboard::new(api.clone(), surface.clone()));
        (api, surface, dashboard)
    }

    fn at(raw: &str) -> NaiveDateTime {
        parse_due_date(raw).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn load_renders_dashboard_and_refreshes_quiz() {
        let (api, surface, dashboard) = dashboard(MockApi::demo());
        dashboard.load().await;

        assert_eq!(
            surface.html(COMPLETION),
            "<p>1 of 2 assignments completed.</p>"
        );
        let cards = surface.html(ASSIGNMENTS);
        assert!(cards.contains("assignment-item submitted"));
        assert!(cards.contains("<div class=\"progress-text\">100%</div>"));
        assert!(cards.contains("<div class=\"progress-text\">0%</div>"));
        assert!(surface.html(DEADLINES).contains("(Overdue)"));
        assert!(surface
            .html(FEEDBACK)
            .contains("<strong>Good progress.</strong>"));

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(surface.html(QUIZ).contains("quiz-option-correct"));
        assert_eq!(api.call_count("dashboard_quiz"), 1);
        assert!(dashboard.is_quiz_refreshing());

        tokio::time::sleep(QUIZ_REFRESH).await;
        assert_eq!(api.call_count("dashboard_quiz"), 2);

        dashboard.stop_quiz_refresh();
        tokio::time::sleep(QUIZ_REFRESH * 2).await;
        assert_eq!(api.call_count("dashboard_quiz"), 2);
        assert!(!dashboard.is_quiz_refreshing());
    }

    #[tokio::test(start_paused = true)]
    async fn reload_replaces_quiz_loop() {
        let (api, _surface, dashboard) = dashboard(MockApi::demo());
        dashboard.load().await;
        tokio::time::sleep(Duration::from_millis(1)).await;
        dashboard.load().await;
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(api.call_count("dashboard_quiz"), 2);

        tokio::time::sleep(QUIZ_REFRESH).await;
        assert_eq!(api.call_count("dashboard_quiz"), 3);
    }

    #[tokio::test]
    async fn due_labels_use_ceiling_days() {
        let (_api, surface, dashboard) = dashboard(MockApi::demo());
        dashboard
            .load_assignments(at("2098-12-30 00:00:00"))
            .await
            .unwrap();
        let deadlines = surface.html(DEADLINES);
        assert!(deadlines.contains(
            "<strong>Loops</strong> - 2099-01-01 (3 days left) <span class=\"assignment-status submitted\"> - Submitted</span>"
        ));
        assert!(deadlines.contains("<strong>Strings</strong> - 2024-01-01 (Overdue)"));

        dashboard
            .load_assignments(at("2099-01-01 08:00:00"))
            .await
            .unwrap();
        assert!(surface.html(DEADLINES).contains("(1 days left)"));
    }

    #[tokio::test]
    async fn load_once_fetches_quiz_without_loop() {
        let (api, surface, dashboard) = dashboard(MockApi::demo());
        dashboard.load_once().await;
        assert!(surface.html(QUIZ).contains("quiz-option-correct"));
        assert_eq!(api.call_count("dashboard_quiz"), 1);
        assert!(!dashboard.is_quiz_refreshing());
    }

    #[tokio::test]
    async fn empty_assignments_show_messages() {
        let (api, surface, dashboard) = dashboard(MockApi::new());
        dashboard.load().await;
        assert_eq!(surface.html(COMPLETION), "No assignments to track.");
        assert_eq!(surface.html(DEADLINES), "<li>No assignments found.</li>");
        assert!(surface.html(QUIZ).contains("No assignments available"));
        assert_eq!(api.call_count("dashboard_feedback"), 0);
        assert!(!dashboard.is_quiz_refreshing());
    }

    #[tokio::test]
    async fn failed_load_shows_errors_everywhere() {
        let api = MockApi::demo();
        api.fail("student_assignments");
        let (_api, surface, dashboard) = dashboard(api);
        dashboard.load().await;
        assert_eq!(surface.html(DEADLINES), "<li>Error loading assignments.</li>");
        assert!(surface.html(FEEDBACK).contains(
            "Error loading assignments for AI feedback: student_assignments failed (HTTP 500)"
        ));
        assert!(surface
            .html(QUIZ)
            .contains("Error loading assignments for Imp/Quiz"));
    }

    #[tokio::test]
    async fn failed_quiz_renders_inline_error() {
        let api = MockApi::demo();
        api.fail("dashboard_quiz");
        let (_api, surface, dashboard) = dashboard(api);
        dashboard.refresh_quiz("anything").await;
        assert!(surface
            .html(QUIZ)
            .starts_with("<div class=\"error\">Error generating Imp/Quiz: "));
    }

    #[test]
    fn descriptions_joined_by_blank_line() {
        let a = |d: &str| StudentAssignment {
            id: 1,
            title: "t".into(),
            description: d.into(),
            due_date: "2025-01-01".into(),
            is_submitted: false,
            passed_tests: 0,
            total_tests: 0,
        };
        assert_eq!(describe(&[a("one"), a("two")]), "one\n\ntwo");
        assert_eq!(render_completion(&[a("one")]), "<p>0 of 1 assignments completed.</p>");
    }

    #[test]
    fn card_escapes_text() {
        let assignment = StudentAssignment {
            id: 9,
            title: "<Loops>".into(),
            description: "a & b".into(),
            due_date: "not a date".into(),
            is_submitted: false,
            passed_tests: 1,
            total_tests: 3,
        };
        let html = render_card(&assignment, at("2025-01-01 00:00:00"));
        assert!(html.contains("&lt;Loops&gt;"));
        assert!(html.contains("a &amp; b"));
        assert!(html.contains("Due: not a date (Overdue)"));
        assert!(html.contains("width: 33%"));
    }
}
