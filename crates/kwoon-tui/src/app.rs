//! Application state management for kwoon.
//!
//! This module contains the core `App` struct that manages all application state,
//! including UI state, per-screen data, the signed-in user's capabilities, session
//! management, and background task coordination.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::future::Future;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use kwoon_core::api::{ApiClient, ApiError};
use kwoon_core::auth::{AuthContext, CredentialStore, Session, SessionData};
use kwoon_core::cache::{CacheAges, CacheManager};
use kwoon_core::capability::{Capability, Screen};
use kwoon_core::config::{Config, ENV_PASSWORD};
use kwoon_core::models::{
    ActionResponse, Branch, BranchProgress, DashboardStats, EmailLog, Enrollment,
    EnrollmentRequest, EnrollmentStatus, Event, EventEligibility, EventRegistration, EventType,
    GradeRequirement, Lesson, LessonFilter, Media, MySchool, Product, RegistrationForm,
    RequestFilter, RequestStatus, School, SeminarEvaluation, ServiceRequest, Student,
    StudentFilter, StudentProfile, StudentSortColumn, User, UserFilter,
};
use kwoon_core::notice::{Listing, Notice};
use kwoon_core::registration::{ExamSelection, ExamVerdicts, RegistrationState};
use kwoon_core::utils::contains_ignore_case;

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// A full refresh sends one message per screen plus a few for the session.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for email input (the SMTP path limit).
const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Number of items to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

/// Maximum concurrent API requests during a refresh.
const MAX_CONCURRENT_REQUESTS: usize = 4;

/// Cached resources live below the cache dir, next to `session.json`.
const DATA_SUBDIR: &str = "data";

// ============================================================================
// UI State Types
// ============================================================================

/// Current UI focus area (list panel or detail panel)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Detail,
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    ShowingHelp,
    LoggingIn,
    ConfirmingQuit,
    Registering,
    Evaluating,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoginFocus {
    Email,
    Password,
    Button,
}

/// One line of the event registration form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormRow {
    Register(Branch),
    TakeExam,
    Exam(Branch),
    Submit,
}

/// Registration form being filled in for one event.
#[derive(Debug, Clone)]
pub struct RegistrationDraft {
    pub event_id: String,
    pub event_name: String,
    pub event_type: EventType,
    pub form: RegistrationForm,
    pub cursor: usize,
    pub error: Option<String>,
}

impl RegistrationDraft {
    pub fn new(event: &Event) -> Self {
        Self {
            event_id: event.id.clone(),
            event_name: event.name.clone(),
            event_type: event.event_type,
            form: RegistrationForm::default(),
            cursor: 0,
            error: None,
        }
    }

    /// Exam rows only appear for seminars, and branch rows only once an
    /// exam is requested.
    pub fn rows(&self) -> Vec<FormRow> {
        let mut rows = vec![
            FormRow::Register(Branch::WingTsun),
            FormRow::Register(Branch::Escrima),
        ];
        if self.event_type == EventType::Seminar {
            rows.push(FormRow::TakeExam);
            if self.form.will_take_exam {
                rows.extend(Branch::ALL.iter().map(|b| FormRow::Exam(*b)));
            }
        }
        rows.push(FormRow::Submit);
        rows
    }

    pub fn current_row(&self) -> FormRow {
        let rows = self.rows();
        rows.get(self.cursor).copied().unwrap_or(FormRow::Submit)
    }

    pub fn move_cursor(&mut self, down: bool) {
        let last = self.rows().len().saturating_sub(1);
        self.cursor = if down {
            (self.cursor + 1).min(last)
        } else {
            self.cursor.saturating_sub(1)
        };
    }

    /// Flip the checkbox under the cursor. Returns false on the submit row.
    pub fn toggle(&mut self) -> bool {
        self.error = None;
        match self.current_row() {
            FormRow::Register(branch) => self.form.toggle_branch(branch),
            FormRow::TakeExam => {
                self.form.will_take_exam = !self.form.will_take_exam;
                if !self.form.will_take_exam {
                    self.form.exam_branch_wt = false;
                    self.form.exam_branch_escrima = false;
                }
            }
            FormRow::Exam(branch) => {
                let on = !self.form.exam_in(branch);
                self.form.set_exam(branch, on);
            }
            FormRow::Submit => return false,
        }
        self.cursor = self.cursor.min(self.rows().len().saturating_sub(1));
        true
    }
}

/// Pass/fail marks for a seminar's exam candidates.
#[derive(Debug, Clone)]
pub struct EvaluationDraft {
    pub event_id: String,
    pub event_name: String,
    pub candidates: Vec<EventRegistration>,
    pub passed: BTreeSet<String>,
    pub cursor: usize,
}

impl EvaluationDraft {
    /// Only approved exam takers can be evaluated.
    pub fn new(event: &Event, registrations: &[EventRegistration]) -> Self {
        Self {
            event_id: event.id.clone(),
            event_name: event.name.clone(),
            candidates: registrations
                .iter()
                .filter(|r| r.is_evaluable())
                .cloned()
                .collect(),
            passed: BTreeSet::new(),
            cursor: 0,
        }
    }

    pub fn move_cursor(&mut self, down: bool) {
        let last = self.candidates.len().saturating_sub(1);
        self.cursor = if down {
            (self.cursor + 1).min(last)
        } else {
            self.cursor.saturating_sub(1)
        };
    }

    pub fn toggle(&mut self) {
        if let Some(candidate) = self.candidates.get(self.cursor) {
            if !self.passed.remove(&candidate.student_id) {
                self.passed.insert(candidate.student_id.clone());
            }
        }
    }

    pub fn is_passed(&self, registration: &EventRegistration) -> bool {
        self.passed.contains(&registration.student_id)
    }

    pub fn to_evaluation(&self) -> SeminarEvaluation {
        SeminarEvaluation {
            passed_student_ids: self.passed.iter().cloned().collect(),
        }
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Messages sent from background fetches and actions back to the app.
enum RefreshResult {
    Me(User),
    Session(SessionData),
    Dashboard(DashboardStats),
    Profile(StudentProfile),
    MySchool(MySchool),
    Schools(Vec<School>),
    Students(Vec<Student>),
    Enrollments(Vec<Enrollment>),
    Lessons(Vec<Lesson>),
    Events(Vec<Event>),
    Eligibility(String, EventEligibility),
    Registrations(String, Vec<EventRegistration>),
    GradeRequirements(Vec<GradeRequirement>),
    Products(Vec<Product>),
    Requests(Vec<ServiceRequest>),
    MailLogs(Vec<EmailLog>),
    Media(Vec<Media>),
    Users(Vec<User>),
    /// A seminar evaluation was accepted (event_id, passed student ids)
    Evaluated(String, BTreeSet<String>),
    ActionDone {
        key: String,
        message: String,
        reload: Screen,
    },
    ActionFailed {
        key: String,
        error: anyhow::Error,
    },
    /// A read failed. `screen` is the list that was waiting on it.
    Failed {
        what: &'static str,
        screen: Option<Screen>,
        error: anyhow::Error,
    },
    /// End of the refresh started with this generation number.
    RefreshComplete(u64),
}

type Fetch = BoxFuture<'static, RefreshResult>;

/// Wrap one API read into a future that always yields a message.
fn fetch<T, Fut, W>(what: &'static str, screen: Option<Screen>, request: Fut, wrap: W) -> Fetch
where
    T: Send + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
    W: FnOnce(T) -> RefreshResult + Send + 'static,
{
    async move {
        match request.await {
            Ok(data) => {
                debug!(what, "Fetched");
                wrap(data)
            }
            Err(error) => RefreshResult::Failed {
                what,
                screen,
                error,
            },
        }
    }
    .boxed()
}

/// The reads backing one screen for the given user.
fn screen_fetches(screen: Screen, auth: &AuthContext, api: &ApiClient) -> Vec<Fetch> {
    let api = api.clone();
    let s = Some(screen);
    match screen {
        Screen::Dashboard => vec![fetch(
            "dashboard",
            s,
            async move { api.fetch_dashboard().await },
            RefreshResult::Dashboard,
        )],
        // Only students have a profile; everyone else sees their account.
        Screen::Profile if auth.can(Capability::RegisterForEvents) => vec![fetch(
            "profile",
            s,
            async move { api.fetch_my_profile().await },
            RefreshResult::Profile,
        )],
        Screen::Profile => Vec::new(),
        Screen::MySchool => vec![fetch(
            "my school",
            s,
            async move { api.fetch_my_school().await },
            RefreshResult::MySchool,
        )],
        Screen::Schools => vec![fetch(
            "schools",
            s,
            async move { api.fetch_schools(None, None).await },
            |page| RefreshResult::Schools(page.items),
        )],
        Screen::Students => vec![fetch(
            "students",
            s,
            async move { api.fetch_students(&StudentFilter::default()).await },
            |page| RefreshResult::Students(page.items),
        )],
        Screen::PendingEnrollments => vec![fetch(
            "enrollments",
            s,
            async move { api.fetch_enrollments(Some(EnrollmentStatus::Pending)).await },
            |page| RefreshResult::Enrollments(page.items),
        )],
        Screen::Lessons => vec![fetch(
            "lessons",
            s,
            async move { api.fetch_lessons(&LessonFilter::default()).await },
            |page| RefreshResult::Lessons(page.items),
        )],
        Screen::Events => vec![fetch(
            "events",
            s,
            async move { api.fetch_events(None).await },
            |page| RefreshResult::Events(page.items),
        )],
        Screen::Grades => vec![fetch(
            "grade requirements",
            s,
            async move { api.fetch_grade_requirements().await },
            RefreshResult::GradeRequirements,
        )],
        Screen::Products => vec![fetch(
            "products",
            s,
            async move { api.fetch_products(None).await },
            |page| RefreshResult::Products(page.items),
        )],
        Screen::Requests => vec![fetch(
            "requests",
            s,
            async move { api.fetch_requests(&RequestFilter::default()).await },
            |page| RefreshResult::Requests(page.items),
        )],
        Screen::Mail => vec![fetch(
            "mail logs",
            s,
            async move { api.fetch_mail_logs(None).await },
            |page| RefreshResult::MailLogs(page.items),
        )],
        Screen::Media => vec![fetch(
            "media",
            s,
            async move { api.fetch_media().await },
            RefreshResult::Media,
        )],
        Screen::Users => vec![fetch(
            "users",
            s,
            async move { api.fetch_users(&UserFilter::default()).await },
            |page| RefreshResult::Users(page.items),
        )],
    }
}

fn ack_message(ack: ActionResponse, fallback: &str) -> String {
    if ack.message.trim().is_empty() {
        fallback.to_string()
    } else {
        ack.message
    }
}

/// A list still waiting on a failed fetch shows its empty state instead.
fn settle<T>(listing: &mut Listing<T>) {
    if listing.is_loading() {
        *listing = Listing::Empty;
    }
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    pub session: Session,
    pub api: ApiClient,
    pub cache: CacheManager,
    pub auth: Option<AuthContext>,

    // UI State
    pub state: AppState,
    pub screen: Screen,
    pub focus: Focus,
    pub search_query: String,
    selections: HashMap<Screen, usize>,
    pub student_sort: StudentSortColumn,

    // Login form state
    pub login_email: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,

    // Screen data
    pub dashboard: Option<DashboardStats>,
    pub profile: Option<StudentProfile>,
    pub my_school: Option<MySchool>,
    pub schools: Listing<School>,
    pub students: Listing<Student>,
    pub enrollments: Listing<Enrollment>,
    pub lessons: Listing<Lesson>,
    pub events: Listing<Event>,
    pub grade_requirements: Listing<GradeRequirement>,
    pub products: Listing<Product>,
    pub requests: Listing<ServiceRequest>,
    pub mail_logs: Listing<EmailLog>,
    pub media: Listing<Media>,
    pub users: Listing<User>,

    /// Per-event data, keyed by event id
    pub eligibility: HashMap<String, EventEligibility>,
    pub registrations: HashMap<String, Vec<EventRegistration>>,
    /// Seminars evaluated in this session and who passed
    pub evaluated: HashMap<String, BTreeSet<String>>,

    // Forms
    pub registration_draft: Option<RegistrationDraft>,
    pub evaluation_draft: Option<EvaluationDraft>,

    // Feedback
    pub notices: Vec<Notice>,
    in_flight: HashSet<String>,
    pub refreshing: bool,
    /// Bumped per refresh and per session end; older completions are stale.
    refresh_generation: u64,

    // Background task channel
    refresh_rx: mpsc::Receiver<RefreshResult>,
    refresh_tx: mpsc::Sender<RefreshResult>,

    // Cache ages for status bar
    pub cache_ages: CacheAges,

    // Offline mode - when true, only use cached data
    pub offline_mode: bool,
}

impl App {
    /// Create a new application instance
    pub fn new() -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };
        debug!(api = config.base_url(), "Config loaded");

        let cache_dir = config
            .cache_dir()
            .unwrap_or_else(|_| PathBuf::from("./cache"));

        Self::with_config(config, cache_dir)
    }

    /// Build the app over an explicit cache directory.
    fn with_config(config: Config, cache_dir: PathBuf) -> Result<Self> {
        let mut session = Session::new(cache_dir.clone());
        match session.load() {
            Ok(found) => debug!(found, "Session loaded"),
            Err(e) => warn!(error = %e, "Failed to load session"),
        }

        let mut api = ApiClient::new(config.base_url())?;
        if let Some(token) = session.token() {
            api.set_token(token.to_string());
        }

        let cache = CacheManager::new(cache_dir.join(DATA_SUBDIR))?;

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let login_email = config.email().map(str::to_string).unwrap_or_default();
        let login_password = std::env::var(ENV_PASSWORD)
            .ok()
            .filter(|p| !p.is_empty())
            .or_else(|| {
                if login_email.is_empty() || !CredentialStore::has_credentials(&login_email) {
                    return None;
                }
                CredentialStore::get_password(&login_email).ok()
            })
            .unwrap_or_default();

        let offline_mode = config.offline_mode;

        Ok(Self {
            config,
            session,
            api,
            cache,
            auth: None,

            state: AppState::Normal,
            screen: Screen::Dashboard,
            focus: Focus::List,
            search_query: String::new(),
            selections: HashMap::new(),
            student_sort: StudentSortColumn::default(),

            login_email,
            login_password,
            login_focus: LoginFocus::Email,
            login_error: None,

            dashboard: None,
            profile: None,
            my_school: None,
            schools: Listing::Loading,
            students: Listing::Loading,
            enrollments: Listing::Loading,
            lessons: Listing::Loading,
            events: Listing::Loading,
            grade_requirements: Listing::Loading,
            products: Listing::Loading,
            requests: Listing::Loading,
            mail_logs: Listing::Loading,
            media: Listing::Loading,
            users: Listing::Loading,

            eligibility: HashMap::new(),
            registrations: HashMap::new(),
            evaluated: HashMap::new(),

            registration_draft: None,
            evaluation_draft: None,

            notices: Vec::new(),
            in_flight: HashSet::new(),
            refreshing: false,
            refresh_generation: 0,

            refresh_rx: rx,
            refresh_tx: tx,

            cache_ages: Default::default(),
            offline_mode,
        })
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// A usable access token, or a refresh token to get one.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_valid() || self.session.refresh_token().is_some()
    }

    pub fn can(&self, cap: Capability) -> bool {
        self.auth.as_ref().is_some_and(|a| a.can(cap))
    }

    /// Interactive login on stdin/stdout, for `kwoon --login`.
    pub async fn login_interactive(&mut self) -> Result<()> {
        println!("\n=== kwoon login ({}) ===\n", self.config.base_url());

        let email = match self.config.email().map(str::to_string) {
            Some(last) => {
                print!("Email [{}]: ", last);
                io::stdout().flush()?;
                let input = read_line()?;
                if input.is_empty() {
                    last
                } else {
                    input
                }
            }
            None => {
                print!("Email: ");
                io::stdout().flush()?;
                read_line()?
            }
        };

        let password = match std::env::var(ENV_PASSWORD).ok().filter(|p| !p.is_empty()) {
            Some(password) => password,
            None if CredentialStore::has_credentials(&email) => {
                print!("Use stored password? [Y/n]: ");
                io::stdout().flush()?;
                if read_line()?.to_lowercase() != "n" {
                    CredentialStore::get_password(&email)?
                } else {
                    rpassword::prompt_password("Password: ")?
                }
            }
            None => rpassword::prompt_password("Password: ")?,
        };

        println!("\nAuthenticating...");
        let session_data = self.api.login(&email, &password).await?;
        self.complete_login(email, &password, session_data);

        let user = self.api.fetch_me().await?;
        println!(
            "Logged in as {} ({})\n",
            user.titled_name(),
            user.role.label()
        );
        if let Err(e) = self.cache.save_me(&user) {
            warn!(error = %e, "Failed to cache user");
        }
        Ok(())
    }

    /// Attempt login with the credentials from the login form
    pub async fn attempt_login(&mut self) -> Result<()> {
        let email = self.login_email.trim().to_string();
        let password = self.login_password.clone();

        if email.is_empty() || password.is_empty() {
            self.login_error = Some("Email and password required".to_string());
            return Err(anyhow::anyhow!("Email and password required"));
        }

        self.login_error = None;

        match self.api.login(&email, &password).await {
            Ok(session_data) => {
                self.complete_login(email, &password, session_data);
                self.login_password.clear();
                self.state = AppState::Normal;
                info!("Login successful");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                let message = if ApiError::is_auth_error(&e) {
                    "Invalid email or password".to_string()
                } else {
                    Notice::from_error(&e).message
                };
                self.login_error = Some(message);
                Err(e)
            }
        }
    }

    /// Persist a fresh session and remember who logged in.
    fn complete_login(&mut self, email: String, password: &str, session_data: SessionData) {
        if let Err(e) = CredentialStore::store(&email, password) {
            warn!(error = %e, "Failed to store credentials");
        }

        self.config.remember_email(email);
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }

        self.api.set_token(session_data.access_token.clone());
        self.session.update(session_data);
        if let Err(e) = self.session.save() {
            warn!(error = %e, "Failed to save session");
        }
    }

    /// Start the login process (show login overlay)
    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.login_focus = if self.login_email.is_empty() {
            LoginFocus::Email
        } else {
            LoginFocus::Password
        };
        self.login_error = None;
    }

    /// Sign out and forget everything fetched for this account.
    pub fn logout(&mut self) {
        info!("Logging out");
        self.end_session();
        if let Err(e) = self.cache.clear() {
            warn!(error = %e, "Failed to clear cache");
        }
        self.clear_data();
        self.start_login();
    }

    /// The server rejected our token: back to the login overlay, keeping
    /// cached data on screen behind it.
    fn expire_session(&mut self) {
        warn!("Session rejected by server, returning to login");
        self.end_session();
        self.start_login();
        self.login_error = Some("Session expired. Please log in again.".to_string());
    }

    fn end_session(&mut self) {
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "Failed to clear session");
        }
        self.api.clear_token();
        self.auth = None;
        self.refreshing = false;
        self.refresh_generation += 1;
        self.registration_draft = None;
        self.evaluation_draft = None;
        self.screen = Screen::Dashboard;
    }

    fn clear_data(&mut self) {
        self.dashboard = None;
        self.profile = None;
        self.my_school = None;
        self.schools = Listing::Loading;
        self.students = Listing::Loading;
        self.enrollments = Listing::Loading;
        self.lessons = Listing::Loading;
        self.events = Listing::Loading;
        self.grade_requirements = Listing::Loading;
        self.products = Listing::Loading;
        self.requests = Listing::Loading;
        self.mail_logs = Listing::Loading;
        self.media = Listing::Loading;
        self.users = Listing::Loading;
        self.eligibility.clear();
        self.registrations.clear();
        self.evaluated.clear();
        self.selections.clear();
        self.cache_ages = Default::default();
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Load all data from cache
    pub fn load_from_cache(&mut self) {
        if let Ok(Some(cached)) = self.cache.load_me() {
            self.auth = Some(AuthContext::new(cached.data));
        }
        if let Ok(Some(cached)) = self.cache.load_dashboard() {
            self.dashboard = Some(cached.data);
        }
        if let Ok(Some(cached)) = self.cache.load_profile() {
            self.profile = Some(cached.data);
        }
        if let Ok(Some(cached)) = self.cache.load_my_school() {
            self.my_school = Some(cached.data);
        }
        if let Ok(Some(cached)) = self.cache.load_schools() {
            self.schools = Listing::from_items(cached.data);
        }
        if let Ok(Some(mut cached)) = self.cache.load_students() {
            self.student_sort.sort(&mut cached.data);
            self.students = Listing::from_items(cached.data);
        }
        if let Ok(Some(cached)) = self.cache.load_enrollments() {
            self.enrollments = Listing::from_items(cached.data);
        }
        if let Ok(Some(cached)) = self.cache.load_lessons() {
            self.lessons = Listing::from_items(cached.data);
        }
        if let Ok(Some(cached)) = self.cache.load_events() {
            self.events = Listing::from_items(cached.data);
        }
        if let Ok(Some(cached)) = self.cache.load_grade_requirements() {
            self.grade_requirements = Listing::from_items(cached.data);
        }
        if let Ok(Some(cached)) = self.cache.load_products() {
            self.products = Listing::from_items(cached.data);
        }
        if let Ok(Some(cached)) = self.cache.load_requests() {
            self.requests = Listing::from_items(cached.data);
        }
        if let Ok(Some(cached)) = self.cache.load_mail_logs() {
            self.mail_logs = Listing::from_items(cached.data);
        }
        if let Ok(Some(cached)) = self.cache.load_media() {
            self.media = Listing::from_items(cached.data);
        }
        if let Ok(Some(cached)) = self.cache.load_users() {
            self.users = Listing::from_items(cached.data);
        }

        if self.offline_mode {
            // Nothing else is coming; show empty states instead of spinners.
            for screen in Screen::ALL {
                self.settle_listing(screen);
            }
        }

        self.cache_ages = self.cache.get_cache_ages();
    }

    /// Check if any cache data is stale
    pub fn is_cache_stale(&self) -> bool {
        self.cache.any_stale()
    }

    /// Enter or leave offline mode.
    pub fn toggle_offline(&mut self) {
        self.offline_mode = !self.offline_mode;
        self.config.offline_mode = self.offline_mode;
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }

        if self.offline_mode {
            info!("Entering offline mode");
            for screen in Screen::ALL {
                self.settle_listing(screen);
            }
            self.notify(Notice::info("Offline - showing cached data"));
        } else {
            info!("Leaving offline mode");
            self.notify(Notice::info("Back online"));
            self.refresh_all_background();
        }
    }

    // =========================================================================
    // Background Data Refresh
    // =========================================================================

    /// Spawn a background task that renews the token if needed, reloads the
    /// signed-in user and fetches every screen they can open.
    pub fn refresh_all_background(&mut self) {
        if self.offline_mode {
            self.notify(Notice::info("Offline - press o to go online"));
            return;
        }
        if self.refreshing {
            debug!("Refresh already running");
            return;
        }

        let needs_refresh = self.session.data.as_ref().map(|d| d.needs_refresh());
        let renew = match needs_refresh {
            None => {
                self.start_login();
                return;
            }
            Some(false) => None,
            Some(true) => {
                let credentials = self
                    .session
                    .refresh_token()
                    .map(str::to_string)
                    .zip(self.session.email().map(str::to_string));
                match credentials {
                    Some(credentials) => Some(credentials),
                    None => {
                        self.start_login();
                        return;
                    }
                }
            }
        };

        info!(renew = renew.is_some(), "Starting background refresh");
        let tx = self.refresh_tx.clone();
        let api = self.api.clone();
        self.refreshing = true;
        self.refresh_generation += 1;
        let generation = self.refresh_generation;

        tokio::spawn(async move {
            Self::execute_background_refresh(tx, api, renew, generation).await;
        });
    }

    /// Helper to send refresh results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<RefreshResult>, result: RefreshResult) {
        if let Err(e) = tx.send(result).await {
            error!(error = %e, "Failed to send refresh result - channel closed");
        }
    }

    /// Run reads with bounded concurrency, forwarding each result as it lands.
    async fn run_fetches(tx: &mpsc::Sender<RefreshResult>, fetches: Vec<Fetch>) {
        stream::iter(fetches)
            .buffer_unordered(MAX_CONCURRENT_REQUESTS)
            .for_each(|result| async move {
                Self::send_result(tx, result).await;
            })
            .await;
    }

    async fn execute_background_refresh(
        tx: mpsc::Sender<RefreshResult>,
        api: ApiClient,
        renew: Option<(String, String)>,
        generation: u64,
    ) {
        let api = match renew {
            Some((refresh_token, email)) => match api.refresh(&refresh_token, &email).await {
                Ok(data) => {
                    debug!(minutes = data.minutes_until_expiry(), "Access token renewed");
                    let api = api.with_token(data.access_token.clone());
                    Self::send_result(&tx, RefreshResult::Session(data)).await;
                    api
                }
                Err(error) => {
                    Self::send_result(
                        &tx,
                        RefreshResult::Failed {
                            what: "session",
                            screen: None,
                            error,
                        },
                    )
                    .await;
                    Self::send_result(&tx, RefreshResult::RefreshComplete(generation)).await;
                    return;
                }
            },
            None => api,
        };

        let user = match api.fetch_me().await {
            Ok(user) => user,
            Err(error) => {
                Self::send_result(
                    &tx,
                    RefreshResult::Failed {
                        what: "account",
                        screen: None,
                        error,
                    },
                )
                .await;
                Self::send_result(&tx, RefreshResult::RefreshComplete(generation)).await;
                return;
            }
        };

        let auth = AuthContext::new(user.clone());
        Self::send_result(&tx, RefreshResult::Me(user)).await;

        let fetches: Vec<Fetch> = auth
            .navigation()
            .into_iter()
            .flat_map(|screen| screen_fetches(screen, &auth, &api))
            .collect();
        debug!(count = fetches.len(), "Fetching screens");
        Self::run_fetches(&tx, fetches).await;

        info!("Background refresh complete");
        Self::send_result(&tx, RefreshResult::RefreshComplete(generation)).await;
    }

    /// Refresh only the data behind one screen
    pub fn refresh_screen(&mut self, screen: Screen) {
        if self.offline_mode {
            return;
        }
        let Some(auth) = self.auth.as_ref() else {
            return;
        };

        let fetches = screen_fetches(screen, auth, &self.api);
        if !fetches.is_empty() {
            let tx = self.refresh_tx.clone();
            tokio::spawn(async move {
                Self::run_fetches(&tx, fetches).await;
            });
        }

        if screen == Screen::Events {
            self.load_event_detail(true);
        }
    }

    /// Fetch registrations (and, for students, exam eligibility) for the
    /// selected event unless they are already loaded.
    pub fn load_event_detail(&self, force: bool) {
        if self.offline_mode {
            return;
        }
        let (Some(auth), Some(event)) = (self.auth.as_ref(), self.selected_event()) else {
            return;
        };

        let mut fetches = Vec::new();

        if force || !self.registrations.contains_key(&event.id) {
            let api = self.api.clone();
            let id = event.id.clone();
            let key = event.id.clone();
            fetches.push(fetch(
                "registrations",
                None,
                async move { api.fetch_registrations(&id).await },
                move |list| RefreshResult::Registrations(key, list),
            ));
        }

        if auth.can(Capability::RegisterForEvents)
            && event.is_seminar()
            && (force || !self.eligibility.contains_key(&event.id))
        {
            let api = self.api.clone();
            let id = event.id.clone();
            let key = event.id.clone();
            fetches.push(fetch(
                "eligibility",
                None,
                async move { api.fetch_my_eligibility(&id).await },
                move |eligibility| RefreshResult::Eligibility(key, eligibility),
            ));
        }

        if fetches.is_empty() {
            return;
        }
        let tx = self.refresh_tx.clone();
        tokio::spawn(async move {
            Self::run_fetches(&tx, fetches).await;
        });
    }

    /// Check for completed background tasks and process results
    pub fn check_background_tasks(&mut self) {
        // Collect all pending results first to avoid borrow conflicts
        let mut results = Vec::new();
        while let Ok(result) = self.refresh_rx.try_recv() {
            results.push(result);
        }

        for result in results {
            self.process_refresh_result(result);
        }

        self.notices.retain(|n| !n.is_expired());
    }

    /// Apply one background result to app state and the cache.
    fn process_refresh_result(&mut self, result: RefreshResult) {
        match result {
            RefreshResult::Me(user) => {
                if let Err(e) = self.cache.save_me(&user) {
                    warn!(error = %e, "Failed to cache user");
                }
                let auth = AuthContext::new(user);
                self.screen = self.screen.guard(&auth.capabilities);
                info!(
                    role = auth.role().as_str(),
                    screens = auth.navigation().len(),
                    "Signed-in user loaded"
                );
                self.auth = Some(auth);
            }
            RefreshResult::Session(data) => {
                self.api.set_token(data.access_token.clone());
                self.session.update(data);
                if let Err(e) = self.session.save() {
                    warn!(error = %e, "Failed to save session");
                }
            }
            RefreshResult::Dashboard(stats) => {
                if let DashboardStats::Student(ref student) = stats {
                    Self::check_progress(&student.branch_progress());
                }
                if let Err(e) = self.cache.save_dashboard(&stats) {
                    warn!(error = %e, "Failed to cache dashboard");
                }
                self.dashboard = Some(stats);
                self.cache_ages = self.cache.get_cache_ages();
            }
            RefreshResult::Profile(profile) => {
                Self::check_progress(&profile.progress);
                if let Err(e) = self.cache.save_profile(&profile) {
                    warn!(error = %e, "Failed to cache profile");
                }
                self.profile = Some(profile);
            }
            RefreshResult::MySchool(school) => {
                if let Err(e) = self.cache.save_my_school(&school) {
                    warn!(error = %e, "Failed to cache school");
                }
                self.my_school = Some(school);
            }
            RefreshResult::Schools(data) => {
                if let Err(e) = self.cache.save_schools(&data) {
                    warn!(error = %e, "Failed to cache schools");
                }
                self.schools = Listing::from_items(data);
            }
            RefreshResult::Students(mut data) => {
                self.student_sort.sort(&mut data);
                if let Err(e) = self.cache.save_students(&data) {
                    warn!(error = %e, "Failed to cache students");
                }
                self.students = Listing::from_items(data);
            }
            RefreshResult::Enrollments(data) => {
                if let Err(e) = self.cache.save_enrollments(&data) {
                    warn!(error = %e, "Failed to cache enrollments");
                }
                self.enrollments = Listing::from_items(data);
            }
            RefreshResult::Lessons(data) => {
                if let Err(e) = self.cache.save_lessons(&data) {
                    warn!(error = %e, "Failed to cache lessons");
                }
                self.lessons = Listing::from_items(data);
            }
            RefreshResult::Events(data) => {
                if let Err(e) = self.cache.save_events(&data) {
                    warn!(error = %e, "Failed to cache events");
                }
                self.events = Listing::from_items(data);
                self.cache_ages = self.cache.get_cache_ages();
                if self.screen == Screen::Events {
                    self.load_event_detail(false);
                }
            }
            RefreshResult::Eligibility(event_id, eligibility) => {
                self.eligibility.insert(event_id, eligibility);
            }
            RefreshResult::Registrations(event_id, list) => {
                self.registrations.insert(event_id, list);
            }
            RefreshResult::GradeRequirements(data) => {
                if let Err(e) = self.cache.save_grade_requirements(&data) {
                    warn!(error = %e, "Failed to cache grade requirements");
                }
                self.grade_requirements = Listing::from_items(data);
            }
            RefreshResult::Products(data) => {
                if let Err(e) = self.cache.save_products(&data) {
                    warn!(error = %e, "Failed to cache products");
                }
                self.products = Listing::from_items(data);
            }
            RefreshResult::Requests(data) => {
                if let Err(e) = self.cache.save_requests(&data) {
                    warn!(error = %e, "Failed to cache requests");
                }
                self.requests = Listing::from_items(data);
            }
            RefreshResult::MailLogs(data) => {
                if let Err(e) = self.cache.save_mail_logs(&data) {
                    warn!(error = %e, "Failed to cache mail logs");
                }
                self.mail_logs = Listing::from_items(data);
            }
            RefreshResult::Media(data) => {
                if let Err(e) = self.cache.save_media(&data) {
                    warn!(error = %e, "Failed to cache media");
                }
                self.media = Listing::from_items(data);
            }
            RefreshResult::Users(data) => {
                if let Err(e) = self.cache.save_users(&data) {
                    warn!(error = %e, "Failed to cache users");
                }
                self.users = Listing::from_items(data);
            }
            RefreshResult::Evaluated(event_id, passed) => {
                self.evaluated.insert(event_id, passed);
            }
            RefreshResult::ActionDone {
                key,
                message,
                reload,
            } => {
                self.in_flight.remove(&key);
                info!(action = %key, "Action completed");
                self.notify(Notice::success(message));
                self.refresh_screen(reload);
            }
            RefreshResult::ActionFailed { key, error } => {
                self.in_flight.remove(&key);
                error!(action = %key, error = %error, "Action failed");
                if ApiError::is_auth_error(&error) {
                    self.expire_session();
                } else {
                    self.notify(Notice::from_error(&error));
                }
            }
            RefreshResult::Failed {
                what,
                screen,
                error,
            } => {
                if ApiError::is_auth_error(&error) {
                    self.expire_session();
                    return;
                }
                error!(what, error = %error, "Fetch failed");
                if let Some(screen) = screen {
                    self.settle_listing(screen);
                }
                self.notify(Notice::from_error(&error));
            }
            RefreshResult::RefreshComplete(generation) => {
                if generation != self.refresh_generation {
                    debug!(generation, current = self.refresh_generation, "Stale refresh finished");
                    return;
                }
                self.refreshing = false;
                self.cache_ages = self.cache.get_cache_ages();
            }
        }
    }

    /// Server data that breaks the hour invariants is still shown as-is.
    fn check_progress(progress: &[BranchProgress]) {
        for branch in progress {
            if let Err(e) = branch.check() {
                warn!(branch = branch.branch.as_str(), error = %e, "Inconsistent progress data");
            }
        }
    }

    fn settle_listing(&mut self, screen: Screen) {
        match screen {
            Screen::Schools => settle(&mut self.schools),
            Screen::Students => settle(&mut self.students),
            Screen::PendingEnrollments => settle(&mut self.enrollments),
            Screen::Lessons => settle(&mut self.lessons),
            Screen::Events => settle(&mut self.events),
            Screen::Grades => settle(&mut self.grade_requirements),
            Screen::Products => settle(&mut self.products),
            Screen::Requests => settle(&mut self.requests),
            Screen::Mail => settle(&mut self.mail_logs),
            Screen::Media => settle(&mut self.media),
            Screen::Users => settle(&mut self.users),
            Screen::Dashboard | Screen::Profile | Screen::MySchool => {}
        }
    }

    // =========================================================================
    // Notices
    // =========================================================================

    /// Show a transient notice. Repeats of the visible notice are dropped so
    /// one outage does not flood the status bar.
    pub fn notify(&mut self, notice: Notice) {
        if self
            .current_notice()
            .is_some_and(|n| n.message == notice.message)
        {
            return;
        }
        self.notices.push(notice);
    }

    pub fn current_notice(&self) -> Option<&Notice> {
        self.notices.iter().rev().find(|n| !n.is_expired())
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn navigation(&self) -> Vec<Screen> {
        match self.auth {
            Some(ref auth) => auth.navigation(),
            None => vec![Screen::Dashboard],
        }
    }

    /// Switch screens through the capability guard.
    pub fn go_to(&mut self, screen: Screen) {
        let target = match self.auth {
            Some(ref auth) => screen.guard(&auth.capabilities),
            None => Screen::Dashboard,
        };
        if target != self.screen {
            self.search_query.clear();
        }
        self.screen = target;
        self.focus = Focus::List;
        if target == Screen::Events {
            self.load_event_detail(false);
        }
    }

    pub fn next_screen(&mut self) {
        self.step_screen(1);
    }

    pub fn prev_screen(&mut self) {
        self.step_screen(-1);
    }

    fn step_screen(&mut self, step: isize) {
        let nav = self.navigation();
        let len = nav.len() as isize;
        if len == 0 {
            return;
        }
        let current = nav.iter().position(|s| *s == self.screen).unwrap_or(0) as isize;
        let next = (current + step).rem_euclid(len) as usize;
        self.go_to(nav[next]);
    }

    pub fn selection(&self) -> usize {
        self.selection_for(self.screen)
    }

    fn selection_for(&self, screen: Screen) -> usize {
        self.selections.get(&screen).copied().unwrap_or(0)
    }

    pub fn reset_selection(&mut self) {
        self.selections.insert(self.screen, 0);
    }

    /// Move the current screen's selection, clamped to its visible rows.
    pub fn move_selection(&mut self, delta: isize) {
        let last = self.list_len().saturating_sub(1);
        let current = self.selection().min(last);
        let next = if delta < 0 {
            current.saturating_sub(delta.unsigned_abs())
        } else {
            (current + delta as usize).min(last)
        };
        self.selections.insert(self.screen, next);
        if self.screen == Screen::Events && next != current {
            self.load_event_detail(false);
        }
    }

    pub fn select_last(&mut self) {
        let last = self.list_len().saturating_sub(1);
        self.selections.insert(self.screen, last);
        if self.screen == Screen::Events {
            self.load_event_detail(false);
        }
    }

    /// Number of selectable rows on the current screen.
    pub fn list_len(&self) -> usize {
        match self.screen {
            Screen::Schools => self.visible_schools().len(),
            Screen::Students => self.visible_students().len(),
            Screen::PendingEnrollments => self.enrollments.len(),
            Screen::Lessons => self.lessons.len(),
            Screen::Events => self.visible_events().len(),
            Screen::Grades => self.grade_requirements.len(),
            Screen::Products => self.visible_products().len(),
            Screen::Requests => self.requests.len(),
            Screen::Mail => self.mail_logs.len(),
            Screen::Media => self.media.len(),
            Screen::Users => self.visible_users().len(),
            Screen::Dashboard | Screen::Profile | Screen::MySchool => 0,
        }
    }

    /// Screens whose list can be filtered with `/`.
    pub fn is_searchable(&self) -> bool {
        matches!(
            self.screen,
            Screen::Schools | Screen::Students | Screen::Events | Screen::Products | Screen::Users
        )
    }

    pub fn cycle_student_sort(&mut self) {
        let sort = self.student_sort.next();
        self.student_sort = sort;
        if let Some(items) = self.students.items_mut() {
            sort.sort(items);
        }
        self.reset_selection();
    }

    // =========================================================================
    // Filtered views
    // =========================================================================

    fn matches_search(&self, fields: &[&str]) -> bool {
        self.search_query.is_empty()
            || fields
                .iter()
                .any(|f| contains_ignore_case(f, &self.search_query))
    }

    pub fn visible_schools(&self) -> Vec<&School> {
        self.schools
            .items()
            .iter()
            .filter(|s| self.matches_search(&[s.name.as_str(), s.address.as_deref().unwrap_or("")]))
            .collect()
    }

    pub fn visible_students(&self) -> Vec<&Student> {
        self.students
            .items()
            .iter()
            .filter(|s| {
                self.matches_search(&[
                    s.name(),
                    s.user_email.as_deref().unwrap_or(""),
                    s.school_name.as_deref().unwrap_or(""),
                ])
            })
            .collect()
    }

    pub fn visible_events(&self) -> Vec<&Event> {
        self.events
            .items()
            .iter()
            .filter(|e| self.matches_search(&[e.name.as_str(), e.location.as_deref().unwrap_or("")]))
            .collect()
    }

    pub fn visible_products(&self) -> Vec<&Product> {
        self.products
            .items()
            .iter()
            .filter(|p| self.matches_search(&[p.name.as_str(), p.category_name.as_deref().unwrap_or("")]))
            .collect()
    }

    pub fn visible_users(&self) -> Vec<&User> {
        self.users
            .items()
            .iter()
            .filter(|u| {
                let name = u.full_name();
                self.matches_search(&[name.as_str(), u.email.as_str(), u.role.label()])
            })
            .collect()
    }

    pub fn selected_event(&self) -> Option<&Event> {
        self.visible_events()
            .get(self.selection_for(Screen::Events))
            .copied()
    }

    /// Exam verdicts for an event, from the student's hours and the
    /// server's report. None until either has loaded.
    pub fn exam_verdicts(&self, event_id: &str) -> Option<ExamVerdicts> {
        let reported = self.eligibility.get(event_id);
        let progress = self.profile.as_ref().map(|p| p.progress.as_slice());
        if reported.is_none() && progress.is_none() {
            return None;
        }
        Some(ExamVerdicts::resolve(progress.unwrap_or(&[]), reported))
    }

    /// The signed-in student's own registration for an event.
    pub fn my_registration(&self, event_id: &str) -> Option<&EventRegistration> {
        let student_id = &self.profile.as_ref()?.id;
        self.registrations
            .get(event_id)?
            .iter()
            .find(|r| &r.student_id == student_id)
    }

    /// Where the signed-in student stands for an event. `None` once an
    /// exam was taken: results are only visible to instructors.
    pub fn registration_state(&self, event: &Event) -> Option<RegistrationState> {
        if !self.can(Capability::RegisterForEvents) {
            return None;
        }
        let record = self.my_registration(&event.id);
        if event.is_completed && record.is_some_and(|r| r.will_take_exam) {
            return None;
        }
        Some(RegistrationState::derive(record, event.is_completed, false))
    }

    /// State of another student's registration, as seen by staff. Results
    /// of completed seminars are known only if evaluated in this session.
    pub fn registrant_state(
        &self,
        event: &Event,
        registration: &EventRegistration,
    ) -> Option<RegistrationState> {
        if !event.is_completed {
            return Some(RegistrationState::derive(Some(registration), false, false));
        }
        let passed = self.evaluated.get(&event.id)?;
        Some(RegistrationState::derive(
            Some(registration),
            true,
            passed.contains(&registration.student_id),
        ))
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Run a write in the background. Writes are never retried, and a
    /// second press while the first is in flight is ignored.
    fn spawn_action<Fut>(&mut self, key: String, reload: Screen, action: Fut)
    where
        Fut: Future<Output = Result<String>> + Send + 'static,
    {
        if self.offline_mode {
            self.notify(Notice::error("Not available offline"));
            return;
        }
        if !self.in_flight.insert(key.clone()) {
            debug!(action = %key, "Action already in flight");
            return;
        }

        info!(action = %key, "Submitting action");
        let tx = self.refresh_tx.clone();
        tokio::spawn(async move {
            let result = match action.await {
                Ok(message) => RefreshResult::ActionDone {
                    key,
                    message,
                    reload,
                },
                Err(error) => RefreshResult::ActionFailed { key, error },
            };
            Self::send_result(&tx, result).await;
        });
    }

    pub fn is_in_flight(&self, key: &str) -> bool {
        self.in_flight.contains(key)
    }

    /// Approve or reject the selected pending enrollment.
    pub fn review_selected_enrollment(&mut self, approve: bool) {
        if !self.can(Capability::ReviewEnrollments) {
            return;
        }
        let Some((id, pending)) = self
            .enrollments
            .get(self.selection())
            .map(|e| (e.id.clone(), e.is_pending()))
        else {
            return;
        };
        if !pending {
            self.notify(Notice::info("Enrollment already reviewed"));
            return;
        }

        let api = self.api.clone();
        self.spawn_action(
            format!("enrollment:{}", id),
            Screen::PendingEnrollments,
            async move {
                if approve {
                    let ack = api.approve_enrollment(&id).await?;
                    Ok(ack_message(ack, "Enrollment approved"))
                } else {
                    let ack = api.reject_enrollment(&id).await?;
                    Ok(ack_message(ack, "Enrollment rejected"))
                }
            },
        );
    }

    /// Approve or reject the selected pending request.
    pub fn handle_selected_request(&mut self, approve: bool) {
        if !self.can(Capability::HandleRequests) {
            return;
        }
        let Some((id, pending)) = self
            .requests
            .get(self.selection())
            .map(|r| (r.id.clone(), r.is_pending()))
        else {
            return;
        };
        if !pending {
            self.notify(Notice::info("Request already handled"));
            return;
        }

        let status = if approve {
            RequestStatus::Approved
        } else {
            RequestStatus::Rejected
        };
        let api = self.api.clone();
        self.spawn_action(format!("request:{}", id), Screen::Requests, async move {
            let ack = api.handle_request(&id, status).await?;
            Ok(ack_message(ack, &format!("Request {}", status.label().to_lowercase())))
        });
    }

    /// Ask to join the selected school.
    pub fn request_enrollment_for_selected(&mut self) {
        if !self.can(Capability::RequestEnrollment) {
            return;
        }
        let Some((school_id, name)) = self
            .visible_schools()
            .get(self.selection())
            .map(|s| (s.id.clone(), s.name.clone()))
        else {
            return;
        };

        let api = self.api.clone();
        self.spawn_action(
            format!("enroll:{}", school_id),
            Screen::Schools,
            async move {
                let request = EnrollmentRequest {
                    school_id,
                    notes: None,
                };
                api.request_enrollment(&request).await?;
                Ok(format!("Enrollment requested at {}", name))
            },
        );
    }

    /// Open the registration form for the selected event.
    pub fn open_registration(&mut self) {
        if !self.can(Capability::RegisterForEvents) {
            return;
        }
        let Some(event) = self.selected_event() else {
            return;
        };

        let blocker = if event.is_completed {
            Some("This event has ended")
        } else if self.my_registration(&event.id).is_some() {
            Some("Already registered for this event")
        } else if event.is_full() {
            Some("This event is full")
        } else {
            None
        };

        match blocker {
            Some(reason) => {
                let notice = Notice::info(reason);
                self.notify(notice);
            }
            None => {
                let draft = RegistrationDraft::new(event);
                self.load_event_detail(false);
                self.registration_draft = Some(draft);
                self.state = AppState::Registering;
            }
        }
    }

    /// Validate the form against the student's eligibility and submit it.
    pub fn submit_registration(&mut self) {
        let Some(mut draft) = self.registration_draft.take() else {
            self.state = AppState::Normal;
            return;
        };

        let verdicts = self
            .exam_verdicts(&draft.event_id)
            .unwrap_or_else(|| ExamVerdicts::resolve(&[], None));

        let selection = match ExamSelection::validate(&draft.form, draft.event_type, &verdicts) {
            Ok(selection) => selection,
            Err(e) => {
                draft.error = Some(e.to_string());
                self.registration_draft = Some(draft);
                return;
            }
        };

        match selection.expected_state() {
            Ok(state) => debug!(event = %draft.event_id, expected = %state, "Registration validated"),
            Err(e) => warn!(event = %draft.event_id, error = %e, "Unexpected registration state"),
        }

        self.state = AppState::Normal;
        let api = self.api.clone();
        let event_id = draft.event_id.clone();
        self.spawn_action(format!("register:{}", event_id), Screen::Events, async move {
            let receipt = api.register_for_event(&event_id, &selection.form).await?;
            let fallback = if selection.needs_approval || receipt.needs_manager_approval {
                "Registered - exam awaits instructor approval"
            } else {
                "Registered"
            };
            Ok(if receipt.message.trim().is_empty() {
                fallback.to_string()
            } else {
                receipt.message
            })
        });
    }

    pub fn cancel_registration(&mut self) {
        self.registration_draft = None;
        self.state = AppState::Normal;
    }

    /// Open pass/fail marking for the selected seminar.
    pub fn open_evaluation(&mut self) {
        if !self.can(Capability::EvaluateSeminars) {
            return;
        }
        let Some(event) = self.selected_event() else {
            return;
        };
        if !event.accepts_exams() {
            self.notify(Notice::info("Only open seminars can be evaluated"));
            return;
        }
        let Some(registrations) = self.registrations.get(&event.id) else {
            self.load_event_detail(false);
            self.notify(Notice::info("Loading registrations..."));
            return;
        };

        let draft = EvaluationDraft::new(event, registrations);
        if draft.candidates.is_empty() {
            self.notify(Notice::info("No approved exam candidates"));
            return;
        }
        self.evaluation_draft = Some(draft);
        self.state = AppState::Evaluating;
    }

    /// Submit the evaluation. Candidates left unmarked fail.
    pub fn submit_evaluation(&mut self) {
        self.state = AppState::Normal;
        let Some(draft) = self.evaluation_draft.take() else {
            return;
        };

        let evaluation = draft.to_evaluation();
        let api = self.api.clone();
        let tx = self.refresh_tx.clone();
        let event_id = draft.event_id;
        let passed = draft.passed;
        self.spawn_action(format!("evaluate:{}", event_id), Screen::Events, async move {
            let ack = api.evaluate_seminar(&event_id, &evaluation).await?;
            Self::send_result(&tx, RefreshResult::Evaluated(event_id, passed)).await;
            Ok(ack_message(ack, "Seminar evaluated"))
        });
    }

    pub fn cancel_evaluation(&mut self) {
        self.evaluation_draft = None;
        self.state = AppState::Normal;
    }
}

fn read_line() -> Result<String> {
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if an email character should be accepted
pub fn can_add_email_char(current_len: usize, c: char) -> bool {
    current_len < MAX_EMAIL_LENGTH && is_valid_input_char(c) && !c.is_whitespace()
}

/// Check if a password character should be accepted
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use kwoon_core::progress::EligibilityVerdict;

    fn event(event_type: &str) -> Event {
        serde_json::from_value(serde_json::json!({
            "id": "e1",
            "name": "Spring seminar",
            "event_type": event_type,
            "start_datetime": "2026-04-11T10:00:00"
        }))
        .expect("valid event")
    }

    fn registration(student_id: &str, exam: bool, needs_approval: bool) -> EventRegistration {
        serde_json::from_value(serde_json::json!({
            "id": format!("r-{}", student_id),
            "event_id": "e1",
            "student_id": student_id,
            "register_wt": true,
            "register_escrima": false,
            "will_take_exam": exam,
            "exam_branch_wt": exam,
            "exam_branch_escrima": false,
            "needs_manager_approval": needs_approval,
            "manager_approved": false
        }))
        .expect("valid registration")
    }

    // -------------------------------------------------------------------------
    // Registration form
    // -------------------------------------------------------------------------

    #[test]
    fn test_plain_event_has_no_exam_rows() {
        let draft = RegistrationDraft::new(&event("EVENT"));
        assert_eq!(
            draft.rows(),
            vec![
                FormRow::Register(Branch::WingTsun),
                FormRow::Register(Branch::Escrima),
                FormRow::Submit,
            ]
        );
    }

    #[test]
    fn test_exam_rows_follow_take_exam() {
        let mut draft = RegistrationDraft::new(&event("SEMINAR"));
        assert_eq!(draft.rows().len(), 4);

        draft.cursor = 2;
        assert_eq!(draft.current_row(), FormRow::TakeExam);
        assert!(draft.toggle());
        assert_eq!(draft.rows().len(), 6);

        draft.cursor = 3;
        assert!(draft.toggle());
        assert!(draft.form.exam_branch_wt);

        // Turning the exam off clears the branch choices and the cursor
        // stays on a real row.
        draft.cursor = 2;
        draft.toggle();
        assert!(!draft.form.exam_branch_wt);
        assert_eq!(draft.rows().len(), 4);
    }

    #[test]
    fn test_cursor_is_clamped() {
        let mut draft = RegistrationDraft::new(&event("EVENT"));
        draft.move_cursor(true);
        draft.move_cursor(true);
        draft.move_cursor(true);
        assert_eq!(draft.current_row(), FormRow::Submit);
        assert!(!draft.toggle());
        draft.move_cursor(false);
        assert_eq!(draft.current_row(), FormRow::Register(Branch::Escrima));
    }

    #[test]
    fn test_toggle_clears_error() {
        let mut draft = RegistrationDraft::new(&event("EVENT"));
        draft.error = Some("select at least one branch".into());
        draft.toggle();
        assert!(draft.error.is_none());
        assert!(draft.form.register_wt);
    }

    // -------------------------------------------------------------------------
    // Seminar evaluation
    // -------------------------------------------------------------------------

    #[test]
    fn test_evaluation_only_lists_approved_exam_takers() {
        let regs = vec![
            registration("s1", true, false),
            registration("s2", false, false),
            registration("s3", true, true),
        ];
        let draft = EvaluationDraft::new(&event("SEMINAR"), &regs);
        let ids: Vec<&str> = draft.candidates.iter().map(|r| r.student_id.as_str()).collect();
        assert_eq!(ids, vec!["s1"]);
    }

    #[test]
    fn test_evaluation_toggle_marks_passed() {
        let regs = vec![registration("s1", true, false), registration("s4", true, false)];
        let mut draft = EvaluationDraft::new(&event("SEMINAR"), &regs);
        draft.move_cursor(true);
        draft.toggle();
        assert!(draft.is_passed(&regs[1]));
        assert!(!draft.is_passed(&regs[0]));
        assert_eq!(draft.to_evaluation().passed_student_ids, vec!["s4".to_string()]);

        draft.toggle();
        assert!(draft.to_evaluation().passed_student_ids.is_empty());
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    #[test]
    fn test_ack_message_fallback() {
        assert_eq!(ack_message(ActionResponse::default(), "Done"), "Done");
        let ack = ActionResponse {
            message: "Enrollment approved".into(),
            ..Default::default()
        };
        assert_eq!(ack_message(ack, "Done"), "Enrollment approved");
    }

    #[test]
    fn test_settle_only_touches_loading() {
        let mut loading: Listing<u8> = Listing::Loading;
        settle(&mut loading);
        assert!(matches!(loading, Listing::Empty));

        let mut items = Listing::from_items(vec![1u8]);
        settle(&mut items);
        assert_eq!(items.len(), 1);
    }

    // -------------------------------------------------------------------------
    // Input Validation Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_can_add_email_char() {
        assert!(can_add_email_char(0, 'a'));
        assert!(can_add_email_char(253, '@'));
        assert!(!can_add_email_char(254, 'a'));
        assert!(!can_add_email_char(0, ' '));
        assert!(!can_add_email_char(0, '\n'));
    }

    #[test]
    fn test_can_add_password_char() {
        assert!(can_add_password_char(0, 'a'));
        assert!(can_add_password_char(127, ' '));
        assert!(!can_add_password_char(128, 'a'));
        assert!(!can_add_password_char(0, '\x00'));
        assert!(!can_add_password_char(0, '\r'));
    }

    // -------------------------------------------------------------------------
    // Session and background results
    // -------------------------------------------------------------------------

    fn app_in(dir: &tempfile::TempDir) -> App {
        App::with_config(Config::default(), dir.path().to_path_buf()).expect("app builds")
    }

    fn student() -> User {
        serde_json::from_value(serde_json::json!({
            "id": "u1",
            "email": "mei@example.com",
            "first_name": "Mei",
            "last_name": "Lin",
            "role": "USER",
            "status": "ACTIVE"
        }))
        .expect("valid user")
    }

    fn signed_in(dir: &tempfile::TempDir) -> App {
        let mut app = app_in(dir);
        app.session.update(SessionData::new(
            "access".into(),
            "refresh".into(),
            "mei@example.com".into(),
        ));
        app.session.save().expect("save session");
        app.api.set_token("access".into());
        app.auth = Some(AuthContext::new(student()));
        app.events = Listing::from_items(vec![event("SEMINAR")]);
        app
    }

    #[test]
    fn test_unauthorized_read_returns_to_login() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = signed_in(&dir);

        app.process_refresh_result(RefreshResult::Failed {
            what: "events",
            screen: Some(Screen::Events),
            error: ApiError::Unauthorized.into(),
        });

        assert_eq!(app.state, AppState::LoggingIn);
        assert!(app.auth.is_none());
        assert!(!app.api.has_token());
        assert!(app.login_error.is_some());
        // Cached data stays visible behind the overlay
        assert_eq!(app.events.len(), 1);

        let mut stored = Session::new(dir.path().to_path_buf());
        assert!(!stored.load().expect("load session"));
    }

    #[test]
    fn test_unauthorized_action_returns_to_login() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = signed_in(&dir);
        app.in_flight.insert("register:e1".into());

        app.process_refresh_result(RefreshResult::ActionFailed {
            key: "register:e1".into(),
            error: ApiError::Unauthorized.into(),
        });

        assert_eq!(app.state, AppState::LoggingIn);
        assert!(!app.is_in_flight("register:e1"));
        assert!(app.session.token().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_action_is_ignored_while_pending() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = signed_in(&dir);
        let runs = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));

        app.spawn_action(
            "approve:r1".into(),
            Screen::Requests,
            std::future::pending::<Result<String>>(),
        );
        assert!(app.is_in_flight("approve:r1"));

        let counter = runs.clone();
        app.spawn_action("approve:r1".into(), Screen::Requests, async move {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok("Approved".to_string())
        });
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        assert_eq!(runs.load(std::sync::atomic::Ordering::SeqCst), 0);
        app.check_background_tasks();
        assert!(app.notices.is_empty());
        assert!(app.is_in_flight("approve:r1"));
    }

    #[test]
    fn test_stale_refresh_completion_is_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = signed_in(&dir);
        app.refreshing = true;
        app.refresh_generation = 1;

        // Session expires mid-refresh, the user logs in and a new refresh starts
        app.expire_session();
        app.refreshing = true;
        app.refresh_generation += 1;
        let current = app.refresh_generation;

        app.process_refresh_result(RefreshResult::RefreshComplete(1));
        assert!(app.refreshing);

        app.process_refresh_result(RefreshResult::RefreshComplete(current));
        assert!(!app.refreshing);
    }

    #[test]
    fn test_registration_gate_uses_student_hours() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = signed_in(&dir);
        app.profile = Some(
            serde_json::from_value(serde_json::json!({
                "id": "s1",
                "user_id": "u1",
                "first_name": "Mei",
                "last_name": "Lin",
                "email": "mei@example.com",
                "progress": [{
                    "branch": "WING_TSUN",
                    "current_grade": 4,
                    "completed_hours": 10.0,
                    "required_hours": 60.0,
                    "minimum_hours": 52.0
                }]
            }))
            .expect("valid profile"),
        );
        app.eligibility.insert(
            "e1".into(),
            EventEligibility {
                wt_eligibility: Some(EligibilityVerdict::Eligible),
                ..Default::default()
            },
        );

        let mut draft = RegistrationDraft::new(&event("SEMINAR"));
        draft.form.register_wt = true;
        draft.form.will_take_exam = true;
        draft.form.exam_branch_wt = true;
        app.registration_draft = Some(draft);
        app.state = AppState::Registering;

        app.submit_registration();

        assert_eq!(app.state, AppState::Registering);
        let draft = app.registration_draft.as_ref().expect("draft kept");
        assert_eq!(
            draft.error.as_deref(),
            Some("not eligible for the Wing Tsun exam")
        );
        assert!(!app.is_in_flight("register:e1"));
    }
}
