//! In-memory `VedaApi` for tests and offline demos.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use vedascore_core::model::{
    AssignmentCreated, CheckedSubmission, Comment, CommentList, CreatedAssignment,
    DashboardFeedback, DashboardQuiz, DeleteOutcome, GeneratedTestCases, InstructorAssignment,
    InstructorAssignmentList, LikeStatus, LoadedFile, MessageResponse, ModerationStatus,
    NewAssignment, NewPost, PlagiarismReport, Post, PostCreated, PostPage, SaveFile, Similarity,
    StudentAssignment, StudentAssignmentList, Submission, SubmissionList, TestCaseResult,
};
use vedascore_core::tools::{EditorTool, ToolRequest};
use vedascore_core::{ApiError, VedaApi};

/// Posts per feed page, matching the server.
pub const PAGE_SIZE: usize = 10;

const MOCK_USER: &str = "You";
const MOCK_TIMESTAMP: &str = "2025-03-01 10:00:00";

#[derive(Default)]
struct MockState {
    posts: Vec<Post>,
    comments: HashMap<u64, Vec<Comment>>,
    submissions: Vec<Submission>,
    instructor_assignments: Vec<InstructorAssignment>,
    student_assignments: Vec<StudentAssignment>,
    similarities: HashMap<u64, Vec<Similarity>>,
    files: HashMap<String, LoadedFile>,
    feedback: String,
    quiz: String,
    moderation: Option<ModerationStatus>,
    failing: HashSet<String>,
    calls: Vec<String>,
    latency: Option<Duration>,
    next_id: u64,
}

/// A stateful fake server.
///
/// Every trait method records its name in the call log. Endpoints named in
/// [`MockApi::fail`] answer with a 500 instead of touching state.
#[derive(Default)]
pub struct MockApi {
    state: Mutex<MockState>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock pre-filled with a small course: posts, submissions,
    /// assignments and a dashboard quiz.
    pub fn demo() -> Self {
        let api = Self::new();
        for i in 1..=3u64 {
            api.add_post(Post {
                id: i,
                title: format!("Study group {i}"),
                content: format!("Meeting notes for week {i}."),
                post_type: "text".into(),
                media_url: None,
                user_name: "Asha".into(),
                user_avatar: "A".into(),
                created_at: format!("2025-03-0{i} 09:00:00"),
                likes_count: i as u32,
                comments_count: 0,
                user_liked: false,
            });
        }
        api.add_instructor_assignment(InstructorAssignment {
            id: 1,
            title: "Loops".into(),
            description: "Sum the numbers from 1 to n.".into(),
            due_date: "2099-01-01".into(),
            total_submissions: 2,
            passed_submissions: 1,
            test_cases: json!([{"input": 3, "expected": 6}]),
        });
        api.add_instructor_assignment(InstructorAssignment {
            id: 2,
            title: "Strings".into(),
            description: "Reverse a string.".into(),
            due_date: "2024-01-01".into(),
            total_submissions: 1,
            passed_submissions: 1,
            test_cases: json!([{"input": "ab", "expected": "ba"}]),
        });
        let result = |case_num: u32, passed: bool| TestCaseResult {
            case_num,
            input: json!(3),
            expected: json!(6),
            actual: json!(if passed { 6 } else { 5 }),
            passed,
        };
        let submissions = [
            (101, "Asha", 1, "Loops", 2u32, vec![result(1, true), result(2, true)]),
            (102, "Ravi", 1, "Loops", 1, vec![result(1, true), result(2, false)]),
            (103, "Asha", 2, "Strings", 1, vec![result(1, true)]),
        ];
        for (id, student, assignment_id, title, passed, results) in submissions {
            let total = results.len() as u32;
            api.add_submission(Submission {
                submission_id: id,
                student_name: student.into(),
                student_email: format!("{}@example.edu", student.to_lowercase()),
                assignment_id,
                assignment_title: title.into(),
                submission_time: MOCK_TIMESTAMP.into(),
                passed_tests: passed,
                total_tests: total,
                code: "def solve(n):\n    return sum(range(n + 1))\n".into(),
                output: Some("6".into()),
                test_results: results,
                success_rate: passed as f64 / total as f64 * 100.0,
            });
        }
        api.add_similarity(
            102,
            Similarity {
                similarity_score: 82.5,
                student_name: "Asha".into(),
                student_email: "asha@example.edu".into(),
                submission_id: Some(101),
                submission_time: MOCK_TIMESTAMP.into(),
            },
        );
        api.add_student_assignment(StudentAssignment {
            id: 1,
            title: "Loops".into(),
            description: "Sum the numbers from 1 to n.".into(),
            due_date: "2099-01-01 23:59:00".into(),
            is_submitted: true,
            passed_tests: 2,
            total_tests: 2,
        });
        api.add_student_assignment(StudentAssignment {
            id: 2,
            title: "Strings".into(),
            description: "Reverse a string.".into(),
            due_date: "2024-01-01 23:59:00".into(),
            is_submitted: false,
            passed_tests: 0,
            total_tests: 1,
        });
        api.set_feedback("**Good progress.** Review string slicing.");
        api.set_quiz(
            "### Question 1\nWhat does `range(3)` yield?\na) 1, 2, 3\nb) 0, 1, 2\n\
             Correct Answer: b\n\n### Important Exam Questions\n- Explain loop invariants.",
        );
        api.add_file(LoadedFile {
            filename: "hello.py".into(),
            content: "print('hello')\n".into(),
        });
        api
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // -- seeding ----------------------------------------------------------

    pub fn add_post(&self, post: Post) {
        let mut state = self.state();
        state.next_id = state.next_id.max(post.id);
        state.posts.insert(0, post);
    }

    pub fn add_comment_seed(&self, post_id: u64, comment: Comment) {
        self.state().comments.entry(post_id).or_default().push(comment);
    }

    pub fn add_submission(&self, submission: Submission) {
        self.state().submissions.push(submission);
    }

    pub fn add_instructor_assignment(&self, assignment: InstructorAssignment) {
        let mut state = self.state();
        state.next_id = state.next_id.max(assignment.id);
        state.instructor_assignments.push(assignment);
    }

    pub fn add_student_assignment(&self, assignment: StudentAssignment) {
        self.state().student_assignments.push(assignment);
    }

    pub fn add_similarity(&self, submission_id: u64, similarity: Similarity) {
        self.state()
            .similarities
            .entry(submission_id)
            .or_default()
            .push(similarity);
    }

    pub fn add_file(&self, file: LoadedFile) {
        self.state().files.insert(file.filename.clone(), file);
    }

    pub fn set_feedback(&self, feedback: &str) {
        self.state().feedback = feedback.to_string();
    }

    pub fn set_quiz(&self, quiz: &str) {
        self.state().quiz = quiz.to_string();
    }

    /// Moderation verdict returned for newly created posts.
    pub fn set_moderation(&self, status: ModerationStatus) {
        self.state().moderation = Some(status);
    }

    /// Make every call to `endpoint` (a trait method name) fail with a 500.
    pub fn fail(&self, endpoint: &str) {
        self.state().failing.insert(endpoint.to_string());
    }

    pub fn recover(&self, endpoint: &str) {
        self.state().failing.remove(endpoint);
    }

    /// Delay every response, to let tests overlap calls.
    pub fn set_latency(&self, latency: Duration) {
        self.state().latency = Some(latency);
    }

    // -- inspection -------------------------------------------------------

    /// Names of the trait methods called so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn call_count(&self, endpoint: &str) -> usize {
        self.state().calls.iter().filter(|c| *c == endpoint).count()
    }

    pub fn post(&self, post_id: u64) -> Option<Post> {
        self.state().posts.iter().find(|p| p.id == post_id).cloned()
    }

    pub fn submission_ids(&self) -> Vec<u64> {
        self.state()
            .submissions
            .iter()
            .map(|s| s.submission_id)
            .collect()
    }

    /// Log the call, apply latency, and fail if the endpoint is marked.
    async fn enter(&self, endpoint: &str) -> Result<(), ApiError> {
        let (latency, failing) = {
            let mut state = self.state();
            state.calls.push(endpoint.to_string());
            (state.latency, state.failing.contains(endpoint))
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if failing {
            return Err(ApiError::Server {
                status: 500,
                message: format!("{endpoint} failed"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl VedaApi for MockApi {
    async fn list_posts(&self, page: u32) -> Result<PostPage, ApiError> {
        self.enter("list_posts").await?;
        let state = self.state();
        let page = page.max(1) as usize;
        let start = (page - 1) * PAGE_SIZE;
        let posts: Vec<Post> = state.posts.iter().skip(start).take(PAGE_SIZE).cloned().collect();
        Ok(PostPage {
            posts,
            has_next: state.posts.len() > page * PAGE_SIZE,
            has_prev: page > 1,
        })
    }

    async fn create_post(&self, post: &NewPost) -> Result<PostCreated, ApiError> {
        self.enter("create_post").await?;
        if post.title.trim().is_empty() || post.content.trim().is_empty() {
            return Err(ApiError::Server {
                status: 400,
                message: "Title and content are required".into(),
            });
        }
        let mut state = self.state();
        let status = state.moderation.unwrap_or(ModerationStatus::Approved);
        if status == ModerationStatus::Rejected {
            return Ok(PostCreated {
                moderation_status: status,
                post_id: None,
                message: Some("Post rejected by moderation".into()),
            });
        }
        state.next_id += 1;
        let id = state.next_id;
        state.posts.insert(
            0,
            Post {
                id,
                title: post.title.clone(),
                content: post.content.clone(),
                post_type: post.post_type.clone(),
                media_url: None,
                user_name: MOCK_USER.into(),
                user_avatar: "Y".into(),
                created_at: MOCK_TIMESTAMP.into(),
                likes_count: 0,
                comments_count: 0,
                user_liked: false,
            },
        );
        Ok(PostCreated {
            moderation_status: status,
            post_id: Some(id),
            message: None,
        })
    }

    async fn like_post(&self, post_id: u64) -> Result<LikeStatus, ApiError> {
        self.enter("like_post").await?;
        let mut state = self.state();
        let post = state
            .posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .ok_or_else(|| ApiError::NotFound(format!("post {post_id}")))?;
        post.user_liked = !post.user_liked;
        if post.user_liked {
            post.likes_count += 1;
        } else {
            post.likes_count = post.likes_count.saturating_sub(1);
        }
        Ok(LikeStatus {
            liked: post.user_liked,
            likes_count: post.likes_count,
        })
    }

    async fn list_comments(&self, post_id: u64) -> Result<CommentList, ApiError> {
        self.enter("list_comments").await?;
        Ok(CommentList {
            comments: self.state().comments.get(&post_id).cloned().unwrap_or_default(),
        })
    }

    async fn add_comment(&self, post_id: u64, content: &str) -> Result<(), ApiError> {
        self.enter("add_comment").await?;
        let mut state = self.state();
        let post = state
            .posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .ok_or_else(|| ApiError::NotFound(format!("post {post_id}")))?;
        post.comments_count += 1;
        let id = state.comments.values().map(Vec::len).sum::<usize>() as u64 + 1;
        state.comments.entry(post_id).or_default().push(Comment {
            id: Some(id),
            content: content.to_string(),
            user_name: MOCK_USER.into(),
            user_avatar: "Y".into(),
            created_at: MOCK_TIMESTAMP.into(),
        });
        Ok(())
    }

    async fn instructor_submissions(&self) -> Result<SubmissionList, ApiError> {
        self.enter("instructor_submissions").await?;
        Ok(SubmissionList {
            submissions: self.state().submissions.clone(),
        })
    }

    async fn instructor_assignments(&self) -> Result<InstructorAssignmentList, ApiError> {
        self.enter("instructor_assignments").await?;
        Ok(InstructorAssignmentList {
            assignments: self.state().instructor_assignments.clone(),
        })
    }

    async fn create_assignment(
        &self,
        assignment: &NewAssignment,
    ) -> Result<AssignmentCreated, ApiError> {
        self.enter("create_assignment").await?;
        let mut state = self.state();
        state.next_id += 1;
        let id = state.next_id;
        state.instructor_assignments.push(InstructorAssignment {
            id,
            title: assignment.title.clone(),
            description: assignment.description.clone(),
            due_date: assignment.deadline.clone(),
            total_submissions: 0,
            passed_submissions: 0,
            test_cases: serde_json::from_str(&assignment.test_cases).unwrap_or(Value::Null),
        });
        Ok(AssignmentCreated {
            message: "Assignment created successfully".into(),
            assignment: Some(CreatedAssignment {
                id: Some(id),
                title: assignment.title.clone(),
                due_date: assignment.deadline.clone(),
            }),
        })
    }

    async fn generate_test_cases(
        &self,
        description: &str,
    ) -> Result<GeneratedTestCases, ApiError> {
        self.enter("generate_test_cases").await?;
        let test_cases = json!([
            {"input": "example", "expected": "result", "note": description}
        ]);
        Ok(GeneratedTestCases {
            test_cases: test_cases.to_string(),
        })
    }

    async fn check_submission_plagiarism(
        &self,
        submission_id: u64,
    ) -> Result<PlagiarismReport, ApiError> {
        self.enter("check_submission_plagiarism").await?;
        let state = self.state();
        let sub = state
            .submissions
            .iter()
            .find(|s| s.submission_id == submission_id)
            .ok_or_else(|| ApiError::NotFound(format!("submission {submission_id}")))?;
        Ok(PlagiarismReport {
            submission_checked: CheckedSubmission {
                id: sub.submission_id,
                student_name: sub.student_name.clone(),
                assignment_title: sub.assignment_title.clone(),
            },
            similarities: state
                .similarities
                .get(&submission_id)
                .cloned()
                .unwrap_or_default(),
        })
    }

    async fn delete_submission(&self, submission_id: u64) -> Result<DeleteOutcome, ApiError> {
        self.enter("delete_submission").await?;
        let mut state = self.state();
        let before = state.submissions.len();
        state.submissions.retain(|s| s.submission_id != submission_id);
        if state.submissions.len() == before {
            return Err(ApiError::NotFound(format!("submission {submission_id}")));
        }
        Ok(DeleteOutcome {
            message: Some("Submission deleted successfully".into()),
        })
    }

    async fn student_assignments(&self) -> Result<StudentAssignmentList, ApiError> {
        self.enter("student_assignments").await?;
        Ok(StudentAssignmentList {
            assignments: self.state().student_assignments.clone(),
        })
    }

    async fn dashboard_feedback(
        &self,
        _description: &str,
    ) -> Result<DashboardFeedback, ApiError> {
        self.enter("dashboard_feedback").await?;
        Ok(DashboardFeedback {
            feedback: self.state().feedback.clone(),
        })
    }

    async fn dashboard_quiz(&self, _description: &str) -> Result<DashboardQuiz, ApiError> {
        self.enter("dashboard_quiz").await?;
        Ok(DashboardQuiz {
            content: self.state().quiz.clone(),
        })
    }

    async fn run_tool(&self, tool: EditorTool, request: &ToolRequest) -> Result<Value, ApiError> {
        self.enter("run_tool").await?;
        let lines = request.code.lines().count();
        let body = match tool {
            EditorTool::CheckPlagiarism => json!({
                "plagiarism_analysis": "No matching sources found.",
                "similarity_score": 5,
                "originality_score": 95
            }),
            EditorTool::Convert => {
                let target = request.target_language.as_deref().unwrap_or("python");
                json!({ "converted_code": format!("// {target}\n{}", request.code) })
            }
            other => {
                let mut body = serde_json::Map::new();
                body.insert(
                    other.response_field().to_string(),
                    json!(format!("{other}: {lines} line(s) processed")),
                );
                Value::Object(body)
            }
        };
        Ok(body)
    }

    async fn save_file(&self, file: &SaveFile) -> Result<MessageResponse, ApiError> {
        self.enter("save_file").await?;
        self.state().files.insert(
            file.filename.clone(),
            LoadedFile {
                filename: file.filename.clone(),
                content: file.content.clone(),
            },
        );
        Ok(MessageResponse {
            message: format!("File {} saved successfully", file.filename),
        })
    }

    async fn load_file(&self, file_id: &str) -> Result<LoadedFile, ApiError> {
        self.enter("load_file").await?;
        self.state()
            .files
            .get(file_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound("File not found".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn like_toggles() {
        let api = MockApi::demo();
        let first = api.like_post(1).await.unwrap();
        assert!(first.liked);
        assert_eq!(first.likes_count, 2);
        let second = api.like_post(1).await.unwrap();
        assert!(!second.liked);
        assert_eq!(second.likes_count, 1);
        assert_eq!(api.call_count("like_post"), 2);
    }

    #[tokio::test]
    async fn comments_append_and_count() {
        let api = MockApi::demo();
        api.add_comment(2, "Nice notes").await.unwrap();
        let comments = api.list_comments(2).await.unwrap().comments;
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].content, "Nice notes");
        assert_eq!(api.post(2).unwrap().comments_count, 1);
    }

    #[tokio::test]
    async fn pagination() {
        let api = MockApi::new();
        for _ in 0..12 {
            api.create_post(&NewPost::text("t", "c")).await.unwrap();
        }
        let first = api.list_posts(1).await.unwrap();
        assert_eq!(first.posts.len(), PAGE_SIZE);
        assert!(first.has_next);
        assert_eq!(first.posts[0].id, 12);
        let second = api.list_posts(2).await.unwrap();
        assert_eq!(second.posts.len(), 2);
        assert!(!second.has_next);
        assert!(second.has_prev);
    }

    #[tokio::test]
    async fn failing_endpoint_returns_server_error() {
        let api = MockApi::demo();
        api.fail("delete_submission");
        let err = api.delete_submission(101).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(api.submission_ids(), vec![101, 102, 103]);

        api.recover("delete_submission");
        api.delete_submission(101).await.unwrap();
        assert_eq!(api.submission_ids(), vec![102, 103]);
    }

    #[tokio::test]
    async fn tool_responses_use_tool_fields() {
        let api = MockApi::new();
        for tool in EditorTool::ALL {
            let body = api.run_tool(tool, &ToolRequest::new("x = 1")).await.unwrap();
            assert!(tool.render_output(&body).is_ok(), "{tool}");
        }
    }

    #[tokio::test]
    async fn files_round_trip_by_name() {
        let api = MockApi::new();
        api.save_file(&SaveFile {
            filename: "a.py".into(),
            content: "pass".into(),
        })
        .await
        .unwrap();
        assert_eq!(api.load_file("a.py").await.unwrap().content, "pass");
        assert!(matches!(
            api.load_file("b.py").await.unwrap_err(),
            ApiError::NotFound(_)
        ));
    }
}
