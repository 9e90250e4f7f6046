use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::models::{
    DashboardStats, EmailLog, Enrollment, Event, GradeRequirement, Lesson, Media, MySchool,
    Product, School, ServiceRequest, Student, StudentProfile, User,
};

/// Consider cache stale after 1 hour.
/// School data changes slowly; the dashboard is refreshed on every login anyway.
const CACHE_STALE_MINUTES: i64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Clock skew lands here too
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            if minutes % 60 >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            if (minutes % 1440) / 60 >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }

    pub fn is_stale(&self) -> bool {
        self.age_minutes() > CACHE_STALE_MINUTES
    }
}

/// JSON file cache, one file per resource, used to show the last fetched
/// data while offline or before the first refresh completes.
pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)?;
        Ok(Self { cache_dir })
    }

    fn cache_path(&self, name: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", name))
    }

    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<CachedData<T>>> {
        let path = self.cache_path(name);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache file: {}", name))?;

        let cached: CachedData<T> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache file: {}", name))?;

        Ok(Some(cached))
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let cached = CachedData::new(data);
        let contents = serde_json::to_string_pretty(&cached)?;
        std::fs::write(self.cache_path(name), contents)?;
        Ok(())
    }

    /// Remove every cached file. Called on logout so the next account never
    /// sees the previous one's data.
    pub fn clear(&self) -> Result<()> {
        for entry in std::fs::read_dir(&self.cache_dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                std::fs::remove_file(&path)
                    .with_context(|| format!("Failed to remove {}", path.display()))?;
            }
        }
        Ok(())
    }

    // ===== Signed-in user =====

    pub fn load_me(&self) -> Result<Option<CachedData<User>>> {
        self.load("me")
    }

    pub fn save_me(&self, user: &User) -> Result<()> {
        self.save("me", user)
    }

    // ===== Dashboard & Profile =====

    pub fn load_dashboard(&self) -> Result<Option<CachedData<DashboardStats>>> {
        self.load("dashboard")
    }

    pub fn save_dashboard(&self, stats: &DashboardStats) -> Result<()> {
        self.save("dashboard", stats)
    }

    pub fn load_profile(&self) -> Result<Option<CachedData<StudentProfile>>> {
        self.load("profile")
    }

    pub fn save_profile(&self, profile: &StudentProfile) -> Result<()> {
        self.save("profile", profile)
    }

    pub fn load_my_school(&self) -> Result<Option<CachedData<MySchool>>> {
        self.load("my_school")
    }

    pub fn save_my_school(&self, school: &MySchool) -> Result<()> {
        self.save("my_school", school)
    }

    // ===== Directory =====

    pub fn load_schools(&self) -> Result<Option<CachedData<Vec<School>>>> {
        self.load("schools")
    }

    pub fn save_schools(&self, schools: &[School]) -> Result<()> {
        self.save("schools", &schools)
    }

    pub fn load_students(&self) -> Result<Option<CachedData<Vec<Student>>>> {
        self.load("students")
    }

    pub fn save_students(&self, students: &[Student]) -> Result<()> {
        self.save("students", &students)
    }

    pub fn load_users(&self) -> Result<Option<CachedData<Vec<User>>>> {
        self.load("users")
    }

    pub fn save_users(&self, users: &[User]) -> Result<()> {
        self.save("users", &users)
    }

    pub fn load_enrollments(&self) -> Result<Option<CachedData<Vec<Enrollment>>>> {
        self.load("enrollments")
    }

    pub fn save_enrollments(&self, enrollments: &[Enrollment]) -> Result<()> {
        self.save("enrollments", &enrollments)
    }

    // ===== Training =====

    pub fn load_lessons(&self) -> Result<Option<CachedData<Vec<Lesson>>>> {
        self.load("lessons")
    }

    pub fn save_lessons(&self, lessons: &[Lesson]) -> Result<()> {
        self.save("lessons", &lessons)
    }

    pub fn load_events(&self) -> Result<Option<CachedData<Vec<Event>>>> {
        self.load("events")
    }

    pub fn save_events(&self, events: &[Event]) -> Result<()> {
        self.save("events", &events)
    }

    pub fn load_grade_requirements(&self) -> Result<Option<CachedData<Vec<GradeRequirement>>>> {
        self.load("grade_requirements")
    }

    pub fn save_grade_requirements(&self, requirements: &[GradeRequirement]) -> Result<()> {
        self.save("grade_requirements", &requirements)
    }

    // ===== Shop & Requests =====

    pub fn load_products(&self) -> Result<Option<CachedData<Vec<Product>>>> {
        self.load("products")
    }

    pub fn save_products(&self, products: &[Product]) -> Result<()> {
        self.save("products", &products)
    }

    pub fn load_requests(&self) -> Result<Option<CachedData<Vec<ServiceRequest>>>> {
        self.load("requests")
    }

    pub fn save_requests(&self, requests: &[ServiceRequest]) -> Result<()> {
        self.save("requests", &requests)
    }

    // ===== Media & Mail =====

    pub fn load_media(&self) -> Result<Option<CachedData<Vec<Media>>>> {
        self.load("media")
    }

    pub fn save_media(&self, media: &[Media]) -> Result<()> {
        self.save("media", &media)
    }

    pub fn load_mail_logs(&self) -> Result<Option<CachedData<Vec<EmailLog>>>> {
        self.load("mail_logs")
    }

    pub fn save_mail_logs(&self, logs: &[EmailLog]) -> Result<()> {
        self.save("mail_logs", &logs)
    }

    // ===== Cache Age Information =====

    /// Helper to load cache and log errors without failing
    fn load_age<T>(
        &self,
        name: &str,
        loader: impl FnOnce() -> Result<Option<CachedData<T>>>,
    ) -> Option<String> {
        match loader() {
            Ok(Some(cached)) => Some(cached.age_display()),
            Ok(None) => None,
            Err(e) => {
                debug!(cache = name, error = %e, "Failed to load cache for age display");
                None
            }
        }
    }

    pub fn get_cache_ages(&self) -> CacheAges {
        CacheAges {
            dashboard: self.load_age("dashboard", || self.load_dashboard()),
            schools: self.load_age("schools", || self.load_schools()),
            students: self.load_age("students", || self.load_students()),
            events: self.load_age("events", || self.load_events()),
            requests: self.load_age("requests", || self.load_requests()),
        }
    }

    /// Helper to check staleness and log errors without failing
    fn is_cache_stale<T>(
        &self,
        name: &str,
        loader: impl FnOnce() -> Result<Option<CachedData<T>>>,
    ) -> bool {
        match loader() {
            Ok(Some(cached)) => cached.is_stale(),
            Ok(None) => true,
            Err(e) => {
                debug!(cache = name, error = %e, "Failed to load cache for staleness check");
                true
            }
        }
    }

    /// True when the data every role sees on startup is missing or old.
    pub fn any_stale(&self) -> bool {
        self.is_cache_stale("dashboard", || self.load_dashboard())
            || self.is_cache_stale("events", || self.load_events())
    }
}

#[derive(Debug, Default)]
pub struct CacheAges {
    pub dashboard: Option<String>,
    pub schools: Option<String>,
    pub students: Option<String>,
    pub events: Option<String>,
    pub requests: Option<String>,
}

impl CacheAges {
    pub fn events_age(&self) -> String {
        self.events.clone().unwrap_or_else(|| "never".to_string())
    }

    /// Age of the dashboard, falling back to whichever list was cached.
    pub fn last_updated(&self) -> String {
        [
            &self.dashboard,
            &self.events,
            &self.students,
            &self.schools,
            &self.requests,
        ]
        .into_iter()
        .flatten()
        .next()
        .cloned()
        .unwrap_or_else(|| "never".to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================
