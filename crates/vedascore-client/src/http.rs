//! reqwest implementation of `VedaApi`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use vedascore_core::model::{
    AssignmentCreated, CommentList, DashboardFeedback, DashboardQuiz, DashboardRequest,
    DeleteOutcome, GeneratedTestCases, InstructorAssignmentList, LikeStatus, LoadedFile,
    MessageResponse, NewAssignment, NewComment, NewPost, PlagiarismReport, PostCreated, PostPage,
    SaveFile, StudentAssignmentList, SubmissionList,
};
use vedascore_core::tools::{EditorTool, ToolRequest};
use vedascore_core::{ApiError, VedaApi};

use crate::config::ClientConfig;

/// Client for a running VedaScore server.
pub struct HttpApi {
    base_url: String,
    cookie: Option<String>,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpApi {
    pub fn new(base_url: &str, cookie: Option<String>, timeout_secs: u64) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            cookie,
            timeout_secs,
            client,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::new(&config.base_url, config.cookie.clone(), config.timeout_secs)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut req = self
            .client
            .request(method, format!("{}{path}", self.base_url))
            .header("accept", "application/json");
        if let Some(cookie) = &self.cookie {
            req = req.header("cookie", cookie);
        }
        req
    }

    /// Send and turn any non-2xx status into an `ApiError`.
    async fn send(&self, req: RequestBuilder) -> Result<Response, ApiError> {
        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout(self.timeout_secs)
            } else {
                ApiError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body)
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
        debug!(status = status.as_u16(), %message, "request failed");
        Err(ApiError::from_status(status.as_u16(), message))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(self.request(Method::GET, path)).await?;
        decode(response).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .send(self.request(Method::POST, path).json(body))
            .await?;
        decode(response).await
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(self.request(Method::POST, path)).await?;
        decode(response).await
    }
}

/// The server's error text: the `error` field of a JSON body, else the raw
/// body when non-empty.
fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    let from_json = serde_json::from_str::<Value>(trimmed).ok().and_then(|v| {
        v.get("error")
            .or_else(|| v.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
    });
    Some(from_json.unwrap_or_else(|| trimmed.to_string()))
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let text = response
        .text()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;
    serde_json::from_str(&text).map_err(|e| ApiError::Decode(format!("failed to parse response: {e}")))
}

#[async_trait]
impl VedaApi for HttpApi {
    #[instrument(skip(self))]
    async fn list_posts(&self, page: u32) -> Result<PostPage, ApiError> {
        self.get(&format!("/api/community/posts?page={page}")).await
    }

    #[instrument(skip(self, post), fields(title = %post.title))]
    async fn create_post(&self, post: &NewPost) -> Result<PostCreated, ApiError> {
        self.post("/api/community/posts", post).await
    }

    #[instrument(skip(self))]
    async fn like_post(&self, post_id: u64) -> Result<LikeStatus, ApiError> {
        self.post_empty(&format!("/api/community/posts/{post_id}/like"))
            .await
    }

    #[instrument(skip(self))]
    async fn list_comments(&self, post_id: u64) -> Result<CommentList, ApiError> {
        self.get(&format!("/api/community/posts/{post_id}/comments"))
            .await
    }

    #[instrument(skip(self, content))]
    async fn add_comment(&self, post_id: u64, content: &str) -> Result<(), ApiError> {
        let body = NewComment {
            content: content.to_string(),
        };
        self.send(
            self.request(Method::POST, &format!("/api/community/posts/{post_id}/comments"))
                .json(&body),
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn instructor_submissions(&self) -> Result<SubmissionList, ApiError> {
        self.get("/api/instructor_submissions").await
    }

    #[instrument(skip(self))]
    async fn instructor_assignments(&self) -> Result<InstructorAssignmentList, ApiError> {
        self.get("/api/instructor_assignments").await
    }

    #[instrument(skip(self, assignment), fields(title = %assignment.title))]
    async fn create_assignment(
        &self,
        assignment: &NewAssignment,
    ) -> Result<AssignmentCreated, ApiError> {
        self.post("/api/create_assignment", assignment).await
    }

    #[instrument(skip(self, description))]
    async fn generate_test_cases(
        &self,
        description: &str,
    ) -> Result<GeneratedTestCases, ApiError> {
        self.post(
            "/api/generate_test_cases",
            &json!({ "description": description }),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn check_submission_plagiarism(
        &self,
        submission_id: u64,
    ) -> Result<PlagiarismReport, ApiError> {
        self.post_empty(&format!("/api/plagiarism/check_submission/{submission_id}"))
            .await
    }

    #[instrument(skip(self))]
    async fn delete_submission(&self, submission_id: u64) -> Result<DeleteOutcome, ApiError> {
        let response = self
            .send(self.request(
                Method::DELETE,
                &format!("/api/delete_submission/{submission_id}"),
            ))
            .await?;
        let text = response.text().await.unwrap_or_default();
        Ok(serde_json::from_str(&text).unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn student_assignments(&self) -> Result<StudentAssignmentList, ApiError> {
        self.get("/api/student_assignments").await
    }

    #[instrument(skip(self, description))]
    async fn dashboard_feedback(
        &self,
        description: &str,
    ) -> Result<DashboardFeedback, ApiError> {
        let body = DashboardRequest {
            assignments_description: description.to_string(),
        };
        self.post("/api/get_ai_feedback_dashboard", &body).await
    }

    #[instrument(skip(self, description))]
    async fn dashboard_quiz(&self, description: &str) -> Result<DashboardQuiz, ApiError> {
        let body = DashboardRequest {
            assignments_description: description.to_string(),
        };
        self.post("/api/get_imp_quiz_dashboard", &body).await
    }

    #[instrument(skip(self, request), fields(tool = %tool))]
    async fn run_tool(&self, tool: EditorTool, request: &ToolRequest) -> Result<Value, ApiError> {
        self.post(tool.endpoint(), request).await
    }

    #[instrument(skip(self, file), fields(filename = %file.filename))]
    async fn save_file(&self, file: &SaveFile) -> Result<MessageResponse, ApiError> {
        self.post("/api/save_file", file).await
    }

    #[instrument(skip(self))]
    async fn load_file(&self, file_id: &str) -> Result<LoadedFile, ApiError> {
        self.get(&format!("/api/load_file/{file_id}")).await
    }
}
