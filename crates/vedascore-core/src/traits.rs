//! The API seam every view talks through.
//!
//! Implemented by `vedascore-client` (reqwest over HTTP, plus an in-memory
//! mock for tests and demos).

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ApiError;
use crate::model::{
    AssignmentCreated, CommentList, DashboardFeedback, DashboardQuiz, DeleteOutcome,
    GeneratedTestCases, InstructorAssignmentList, LikeStatus, LoadedFile, MessageResponse,
    NewAssignment, NewPost, PlagiarismReport, PostCreated, PostPage, SaveFile,
    StudentAssignmentList, SubmissionList,
};
use crate::tools::{EditorTool, ToolRequest};

/// Typed access to the VedaScore REST API.
#[async_trait]
pub trait VedaApi: Send + Sync {
    // -- community --------------------------------------------------------

    /// `GET /api/community/posts?page=N`
    async fn list_posts(&self, page: u32) -> Result<PostPage, ApiError>;

    /// `POST /api/community/posts`
    async fn create_post(&self, post: &NewPost) -> Result<PostCreated, ApiError>;

    /// `POST /api/community/posts/:id/like`
    async fn like_post(&self, post_id: u64) -> Result<LikeStatus, ApiError>;

    /// `GET /api/community/posts/:id/comments`
    async fn list_comments(&self, post_id: u64) -> Result<CommentList, ApiError>;

    /// `POST /api/community/posts/:id/comments`
    async fn add_comment(&self, post_id: u64, content: &str) -> Result<(), ApiError>;

    // -- instructor -------------------------------------------------------

    async fn instructor_submissions(&self) -> Result<SubmissionList, ApiError>;

    async fn instructor_assignments(&self) -> Result<InstructorAssignmentList, ApiError>;

    async fn create_assignment(
        &self,
        assignment: &NewAssignment,
    ) -> Result<AssignmentCreated, ApiError>;

    async fn generate_test_cases(&self, description: &str)
        -> Result<GeneratedTestCases, ApiError>;

    async fn check_submission_plagiarism(
        &self,
        submission_id: u64,
    ) -> Result<PlagiarismReport, ApiError>;

    /// `DELETE /api/delete_submission/:id`. A 2xx body that is not JSON
    /// yields a `DeleteOutcome` with no message.
    async fn delete_submission(&self, submission_id: u64) -> Result<DeleteOutcome, ApiError>;

    // -- student ----------------------------------------------------------

    async fn student_assignments(&self) -> Result<StudentAssignmentList, ApiError>;

    async fn dashboard_feedback(&self, description: &str)
        -> Result<DashboardFeedback, ApiError>;

    async fn dashboard_quiz(&self, description: &str) -> Result<DashboardQuiz, ApiError>;

    // -- editor -----------------------------------------------------------

    /// Post code to one of the editor tool endpoints and return the raw
    /// JSON body. Use [`EditorTool::render_output`] to pull out the text.
    async fn run_tool(&self, tool: EditorTool, request: &ToolRequest) -> Result<Value, ApiError>;

    async fn save_file(&self, file: &SaveFile) -> Result<MessageResponse, ApiError>;

    async fn load_file(&self, file_id: &str) -> Result<LoadedFile, ApiError>;
}
