//! API client for the school-management REST backend.
//!
//! All endpoints live under `{base_url}/api`. Every request carries the
//! bearer token when one is set. Reads retry on HTTP 429; writes are sent
//! exactly once.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, multipart, Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::auth::SessionData;
use crate::models::{
    ActionResponse, AssignManager, Attendance, AttendanceRecord, AvatarUpload, DashboardStats,
    EmailLog, Enrollment, EnrollmentRequest, EnrollmentStatus, Event, EventEligibility,
    EventInput, EventRegistration, GradeRequirement, GradeRequirementUpdate, HandleRequest,
    Lesson, LessonFilter, LessonSchedule, MailRequest, ManualGradeChange, Media, MediaType,
    MySchool, NewGradeRequirement, NewLesson, NewLessonSchedule, NewProductCategory, NewRequest,
    NewUser, Page, Product, ProductCategory, ProductInput, Registration, RegistrationForm,
    RegistrationReceipt, RequestFilter, RequestStatus, School, SchoolInput, SeminarEvaluation,
    ServiceRequest, Student, StudentApproval, StudentFilter, StudentProfile, User, UserFilter,
    UserUpdate, YoutubeImport,
};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Path prefix for every endpoint.
const API_PREFIX: &str = "/api";

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
/// 3 retries with exponential backoff usually succeeds without excessive delay.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
/// 1 second is polite to the server while not making users wait too long.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Page size for list endpoints. The server caps `limit` at 100.
pub const DEFAULT_PAGE_LIMIT: u32 = 100;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Serialize)]
struct ChangePasswordRequest<'a> {
    current_password: &'a str,
    new_password: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
}

/// A file ready to be sent as a multipart upload.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Read a file from disk, guessing its content type from the extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        Ok(Self {
            mime: mime_for_extension(ext).to_string(),
            file_name,
            bytes,
        })
    }

    pub fn media_type(&self) -> Option<MediaType> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(MediaType::from_extension)
    }

    fn into_form(self) -> Result<multipart::Form> {
        let part = multipart::Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(&self.mime)
            .context("Invalid upload content type")?;
        Ok(multipart::Form::new().part("file", part))
    }
}

fn mime_for_extension(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        _ => "application/octet-stream",
    }
}

/// Query string pairs, skipping unset filters.
#[derive(Debug, Default)]
struct Query(Vec<(&'static str, String)>);

impl Query {
    fn with_limit(limit: Option<u32>) -> Self {
        let mut q = Self::default();
        q.push("limit", Some(limit.unwrap_or(DEFAULT_PAGE_LIMIT).min(DEFAULT_PAGE_LIMIT)));
        q
    }

    fn push<V: ToString>(&mut self, key: &'static str, value: Option<V>) -> &mut Self {
        if let Some(v) = value {
            let v = v.to_string();
            if !v.is_empty() {
                self.0.push((key, v));
            }
        }
        self
    }
}

/// API client for the school-management backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client for a server root such as `http://localhost:8000`.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(), // Cheap clone, shares connection pool
            base_url: self.base_url.clone(),
            token: Some(token),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref token) = self.token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(
        response: reqwest::Response,
    ) -> Result<Option<reqwest::Response>> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response, url: &str) -> Result<T> {
        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {}", url))?;
        debug!(url = url, bytes = text.len(), "Response received");
        serde_json::from_str(&text).map_err(|e| {
            ApiError::InvalidResponse(format!("{} from {}", e, url)).into()
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &Query) -> Result<T> {
        let url = self.url(path);
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = self
                .client
                .get(&url)
                .headers(self.auth_headers()?)
                .query(&query.0)
                .send()
                .await
                .map_err(ApiError::from)
                .with_context(|| format!("Failed to send GET request to {}", url))?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => return Self::parse(response, &url).await,
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited.into());
                    }
                    warn!(url = %url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2; // Exponential backoff
                }
            }
        }
    }

    /// Send a write request once. A 429 here is an error like any other.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, url: &str) -> Result<T> {
        let response = request
            .headers(self.auth_headers()?)
            .send()
            .await
            .map_err(ApiError::from)
            .with_context(|| format!("Failed to send request to {}", url))?;
        let response = Self::check_response(response).await?;
        Self::parse(response, url).await
    }

    async fn write<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T> {
        let url = self.url(path);
        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }
        self.send(request, &url).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        self.write(Method::POST, path, Some(body)).await
    }

    /// POST without a request body (approve/reject style actions).
    async fn post_action(&self, path: &str) -> Result<ActionResponse> {
        self.write::<_, ()>(Method::POST, path, None).await
    }

    async fn put<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        self.write(Method::PUT, path, Some(body)).await
    }

    async fn delete(&self, path: &str) -> Result<ActionResponse> {
        self.write::<_, ()>(Method::DELETE, path, None).await
    }

    async fn upload<T: DeserializeOwned>(&self, path: &str, upload: Upload) -> Result<T> {
        let url = self.url(path);
        let request = self.client.post(&url).multipart(upload.into_form()?);
        self.send(request, &url).await
    }

    // ========================================================================
    // Auth
    // ========================================================================

    /// Log in and return a fresh session.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionData> {
        let tokens: TokenResponse = self
            .post("/auth/login", &LoginRequest { email, password })
            .await
            .context("Login failed")?;
        Ok(SessionData::new(
            tokens.access_token,
            tokens.refresh_token,
            email.to_string(),
        ))
    }

    /// Trade a refresh token for a new token pair.
    pub async fn refresh(&self, refresh_token: &str, email: &str) -> Result<SessionData> {
        let tokens: TokenResponse = self
            .post("/auth/refresh", &RefreshRequest { refresh_token })
            .await
            .context("Token refresh failed")?;
        Ok(SessionData::new(
            tokens.access_token,
            tokens.refresh_token,
            email.to_string(),
        ))
    }

    /// Self-service signup. The new account is pending until approved.
    pub async fn register(&self, registration: &Registration) -> Result<User> {
        self.post("/auth/register", registration).await
    }

    pub async fn fetch_me(&self) -> Result<User> {
        self.get("/auth/me", &Query::default()).await
    }

    pub async fn change_password(&self, current: &str, new: &str) -> Result<ActionResponse> {
        self.post(
            "/auth/change-password",
            &ChangePasswordRequest {
                current_password: current,
                new_password: new,
            },
        )
        .await
    }

    // ========================================================================
    // Dashboard
    // ========================================================================

    pub async fn fetch_dashboard(&self) -> Result<DashboardStats> {
        self.get("/dashboard/stats", &Query::default()).await
    }

    // ========================================================================
    // Schools
    // ========================================================================

    pub async fn fetch_schools(&self, search: Option<&str>, limit: Option<u32>) -> Result<Page<School>> {
        let mut q = Query::with_limit(limit);
        q.push("search", search);
        self.get("/schools/", &q).await
    }

    pub async fn fetch_school(&self, id: &str) -> Result<School> {
        self.get(&format!("/schools/{}", id), &Query::default()).await
    }

    pub async fn fetch_my_school(&self) -> Result<MySchool> {
        self.get("/schools/my-school", &Query::default()).await
    }

    pub async fn create_school(&self, input: &SchoolInput) -> Result<School> {
        self.post("/schools/", input).await
    }

    pub async fn update_school(&self, id: &str, input: &SchoolInput) -> Result<School> {
        self.put(&format!("/schools/{}", id), input).await
    }

    pub async fn delete_school(&self, id: &str) -> Result<ActionResponse> {
        self.delete(&format!("/schools/{}", id)).await
    }

    pub async fn assign_manager(&self, school_id: &str, user_id: &str) -> Result<ActionResponse> {
        self.post(
            &format!("/schools/{}/managers", school_id),
            &AssignManager {
                user_id: user_id.to_string(),
            },
        )
        .await
    }

    pub async fn remove_manager(&self, school_id: &str, user_id: &str) -> Result<ActionResponse> {
        self.delete(&format!("/schools/{}/managers/{}", school_id, user_id))
            .await
    }

    // ========================================================================
    // Students
    // ========================================================================

    pub async fn fetch_students(&self, filter: &StudentFilter) -> Result<Page<Student>> {
        let mut q = Query::with_limit(filter.limit);
        q.push("school_id", filter.school_id.as_deref())
            .push("branch", filter.branch.map(|b| b.as_str()))
            .push("search", filter.search.as_deref());
        self.get("/students/", &q).await
    }

    pub async fn fetch_pending_students(&self) -> Result<Page<Student>> {
        self.get("/students/pending", &Query::default()).await
    }

    pub async fn fetch_student(&self, id: &str) -> Result<Student> {
        self.get(&format!("/students/{}", id), &Query::default()).await
    }

    pub async fn fetch_my_profile(&self) -> Result<StudentProfile> {
        self.get("/students/my-profile", &Query::default()).await
    }

    pub async fn upload_avatar(&self, upload: Upload) -> Result<AvatarUpload> {
        self.upload("/students/my-profile/avatar", upload).await
    }

    pub async fn approve_student(&self, id: &str, approved: bool) -> Result<ActionResponse> {
        self.post(
            &format!("/students/{}/approve", id),
            &StudentApproval { approved },
        )
        .await
    }

    // ========================================================================
    // Enrollments
    // ========================================================================

    pub async fn request_enrollment(&self, request: &EnrollmentRequest) -> Result<Enrollment> {
        self.post("/enrollments/", request).await
    }

    pub async fn fetch_enrollments(&self, status: Option<EnrollmentStatus>) -> Result<Page<Enrollment>> {
        let mut q = Query::with_limit(None);
        q.push("status", status.map(|s| s.as_str()));
        self.get("/enrollments/", &q).await
    }

    pub async fn approve_enrollment(&self, id: &str) -> Result<ActionResponse> {
        self.post_action(&format!("/enrollments/{}/approve", id)).await
    }

    pub async fn reject_enrollment(&self, id: &str) -> Result<ActionResponse> {
        self.post_action(&format!("/enrollments/{}/reject", id)).await
    }

    // ========================================================================
    // Lessons, schedules, attendance
    // ========================================================================

    pub async fn fetch_lessons(&self, filter: &LessonFilter) -> Result<Page<Lesson>> {
        let mut q = Query::with_limit(filter.limit);
        q.push("school_id", filter.school_id.as_deref())
            .push("branch", filter.branch.map(|b| b.as_str()))
            .push("lesson_type", filter.lesson_type.map(|t| t.as_str()));
        self.get("/lessons/", &q).await
    }

    pub async fn create_lesson(&self, lesson: &NewLesson) -> Result<Lesson> {
        self.post("/lessons/", lesson).await
    }

    pub async fn fetch_lesson(&self, id: &str) -> Result<Lesson> {
        self.get(&format!("/lessons/{}", id), &Query::default()).await
    }

    pub async fn delete_lesson(&self, id: &str) -> Result<ActionResponse> {
        self.delete(&format!("/lessons/{}", id)).await
    }

    pub async fn fetch_schedules(&self) -> Result<Page<LessonSchedule>> {
        self.get("/lesson-schedules/", &Query::default()).await
    }

    /// Create a weekly schedule. The server generates its lessons right away.
    pub async fn create_schedule(&self, schedule: &NewLessonSchedule) -> Result<ActionResponse> {
        self.post("/lesson-schedules/", schedule).await
    }

    pub async fn delete_schedule(&self, id: &str) -> Result<ActionResponse> {
        self.delete(&format!("/lesson-schedules/{}", id)).await
    }

    /// Generate any missing lessons for a schedule.
    pub async fn generate_schedule_lessons(&self, id: &str) -> Result<ActionResponse> {
        self.post_action(&format!("/lesson-schedules/{}/generate", id))
            .await
    }

    pub async fn record_attendance(&self, record: &AttendanceRecord) -> Result<Page<Attendance>> {
        self.post("/attendance/", record).await
    }

    pub async fn fetch_attendance(&self, lesson_id: &str) -> Result<Page<Attendance>> {
        self.get(&format!("/attendance/lesson/{}", lesson_id), &Query::default())
            .await
    }

    pub async fn delete_attendance(&self, id: &str) -> Result<ActionResponse> {
        self.delete(&format!("/attendance/{}", id)).await
    }

    // ========================================================================
    // Events
    // ========================================================================

    pub async fn fetch_events(&self, limit: Option<u32>) -> Result<Page<Event>> {
        self.get("/events/", &Query::with_limit(limit)).await
    }

    pub async fn create_event(&self, event: &EventInput) -> Result<Event> {
        self.post("/events/", event).await
    }

    pub async fn fetch_event(&self, id: &str) -> Result<Event> {
        self.get(&format!("/events/{}", id), &Query::default()).await
    }

    pub async fn update_event(&self, id: &str, event: &EventInput) -> Result<Event> {
        self.put(&format!("/events/{}", id), event).await
    }

    pub async fn delete_event(&self, id: &str) -> Result<ActionResponse> {
        self.delete(&format!("/events/{}", id)).await
    }

    pub async fn register_for_event(
        &self,
        id: &str,
        form: &RegistrationForm,
    ) -> Result<RegistrationReceipt> {
        self.post(&format!("/events/{}/register", id), form).await
    }

    pub async fn fetch_registrations(&self, id: &str) -> Result<Vec<EventRegistration>> {
        self.get(&format!("/events/{}/registrations", id), &Query::default())
            .await
    }

    pub async fn fetch_my_eligibility(&self, id: &str) -> Result<EventEligibility> {
        self.get(&format!("/events/{}/my-eligibility", id), &Query::default())
            .await
    }

    /// Close a seminar. Exam takers missing from `passed_student_ids` fail.
    pub async fn evaluate_seminar(
        &self,
        id: &str,
        evaluation: &SeminarEvaluation,
    ) -> Result<ActionResponse> {
        self.post(&format!("/events/{}/evaluate", id), evaluation)
            .await
    }

    // ========================================================================
    // Grades
    // ========================================================================

    pub async fn fetch_grade_requirements(&self) -> Result<Vec<GradeRequirement>> {
        self.get("/grades/requirements", &Query::default()).await
    }

    pub async fn create_grade_requirement(
        &self,
        requirement: &NewGradeRequirement,
    ) -> Result<GradeRequirement> {
        self.post("/grades/requirements", requirement).await
    }

    pub async fn update_grade_requirement(
        &self,
        id: &str,
        update: &GradeRequirementUpdate,
    ) -> Result<GradeRequirement> {
        self.put(&format!("/grades/requirements/{}", id), update)
            .await
    }

    pub async fn change_grade(&self, change: &ManualGradeChange) -> Result<ActionResponse> {
        self.post("/grades/manual-change", change).await
    }

    // ========================================================================
    // Products
    // ========================================================================

    pub async fn fetch_products(&self, limit: Option<u32>) -> Result<Page<Product>> {
        self.get("/products/", &Query::with_limit(limit)).await
    }

    pub async fn fetch_product_categories(&self) -> Result<Vec<ProductCategory>> {
        self.get("/products/categories", &Query::default()).await
    }

    pub async fn create_product_category(
        &self,
        category: &NewProductCategory,
    ) -> Result<ProductCategory> {
        self.post("/products/categories", category).await
    }

    pub async fn create_product(&self, product: &ProductInput) -> Result<Product> {
        self.post("/products/", product).await
    }

    pub async fn update_product(&self, id: &str, product: &ProductInput) -> Result<Product> {
        self.put(&format!("/products/{}", id), product).await
    }

    pub async fn delete_product(&self, id: &str) -> Result<ActionResponse> {
        self.delete(&format!("/products/{}", id)).await
    }

    // ========================================================================
    // Requests
    // ========================================================================

    pub async fn fetch_requests(&self, filter: &RequestFilter) -> Result<Page<ServiceRequest>> {
        let mut q = Query::with_limit(filter.limit);
        q.push("request_type", filter.request_type.map(|t| t.as_str()))
            .push("status", filter.status.map(|s| s.as_str()));
        self.get("/requests/", &q).await
    }

    pub async fn create_request(&self, request: &NewRequest) -> Result<ServiceRequest> {
        self.post("/requests/", request).await
    }

    pub async fn handle_request(&self, id: &str, status: RequestStatus) -> Result<ActionResponse> {
        self.post(
            &format!("/requests/{}/handle", id),
            &HandleRequest { status },
        )
        .await
    }

    // ========================================================================
    // Mail
    // ========================================================================

    pub async fn send_mail(&self, mail: &MailRequest) -> Result<ActionResponse> {
        self.post("/mail/send", mail).await
    }

    pub async fn fetch_mail_logs(&self, limit: Option<u32>) -> Result<Page<EmailLog>> {
        self.get("/mail/logs", &Query::with_limit(limit)).await
    }

    // ========================================================================
    // Media
    // ========================================================================

    pub async fn fetch_media(&self) -> Result<Vec<Media>> {
        self.get("/media/", &Query::default()).await
    }

    pub async fn upload_media(&self, upload: Upload) -> Result<Media> {
        self.upload("/media/upload", upload).await
    }

    pub async fn import_youtube(&self, import: &YoutubeImport) -> Result<Media> {
        self.post("/media/youtube", import).await
    }

    pub async fn delete_media(&self, id: &str) -> Result<ActionResponse> {
        self.delete(&format!("/media/{}", id)).await
    }

    // ========================================================================
    // Users
    // ========================================================================

    pub async fn fetch_users(&self, filter: &UserFilter) -> Result<Page<User>> {
        let mut q = Query::with_limit(filter.limit);
        q.push("role", filter.role.map(|r| r.as_str()))
            .push("status", filter.status.map(|s| s.as_str()))
            .push("search", filter.search.as_deref());
        self.get("/users/", &q).await
    }

    pub async fn create_user(&self, user: &NewUser) -> Result<User> {
        self.post("/users/", user).await
    }

    pub async fn fetch_user(&self, id: &str) -> Result<User> {
        self.get(&format!("/users/{}", id), &Query::default()).await
    }

    pub async fn update_user(&self, id: &str, update: &UserUpdate) -> Result<User> {
        self.put(&format!("/users/{}", id), update).await
    }

    pub async fn delete_user(&self, id: &str) -> Result<ActionResponse> {
        self.delete(&format!("/users/{}", id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building() {
        let client = ApiClient::new("http://localhost:8000/").expect("client");
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url("/events/"), "http://localhost:8000/api/events/");
    }

    #[test]
    fn test_query_skips_unset_values() {
        let mut q = Query::with_limit(Some(500));
        q.push("search", Some("")).push::<&str>("branch", None).push("status", Some("PENDING"));
        assert_eq!(
            q.0,
            vec![("limit", "100".to_string()), ("status", "PENDING".to_string())]
        );
    }

    #[test]
    fn test_with_token_shares_base_url() {
        let client = ApiClient::new("http://api.test").expect("client");
        assert!(!client.has_token());
        let authed = client.with_token("abc".into());
        assert!(authed.has_token());
        assert_eq!(authed.base_url(), "http://api.test");
        let headers = authed.auth_headers().expect("headers");
        assert_eq!(
            headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()),
            Some("Bearer abc")
        );
    }

    #[test]
    fn test_upload_mime_guess() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("kata.PNG");
        std::fs::write(&path, b"png").expect("write");
        let upload = Upload::from_path(&path).expect("upload");
        assert_eq!(upload.file_name, "kata.PNG");
        assert_eq!(upload.mime, "image/png");
        assert_eq!(upload.media_type(), Some(MediaType::Image));
    }
}
