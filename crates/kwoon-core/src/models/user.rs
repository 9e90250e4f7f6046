use serde::{Deserialize, Serialize};

/// Account role as issued by the backend.
///
/// Unknown role strings fall back to `Member`, the least privileged role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    SuperAdmin,
    Admin,
    Manager,
    User,
    #[serde(other)]
    Member,
}

impl Role {
    /// Human label shown in the sidebar badge. Managers are instructors and
    /// users are enrolled students.
    pub fn label(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "Super Admin",
            Role::Admin => "Admin",
            Role::Manager => "Instructor",
            Role::User => "Student",
            Role::Member => "Member",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::Admin => "ADMIN",
            Role::Manager => "MANAGER",
            Role::User => "USER",
            Role::Member => "MEMBER",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::SuperAdmin | Role::Admin)
    }

    pub fn is_manager_or_above(&self) -> bool {
        self.is_admin() || *self == Role::Manager
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    #[default]
    Pending,
    Active,
    Inactive,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Pending => "PENDING",
            UserStatus::Active => "ACTIVE",
            UserStatus::Inactive => "INACTIVE",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UserStatus::Pending => "Pending",
            UserStatus::Active => "Active",
            UserStatus::Inactive => "Inactive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstructorTitle {
    Sifu,
    Sihing,
}

impl InstructorTitle {
    pub fn label(&self) -> &'static str {
        match self {
            InstructorTitle::Sifu => "Sifu",
            InstructorTitle::Sihing => "Sihing",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub status: UserStatus,
    #[serde(default)]
    pub instructor_title: Option<InstructorTitle>,
    #[serde(default)]
    pub can_upload_media: bool,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn display_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }

    /// Two-letter monogram used where no avatar is available.
    pub fn initials(&self) -> String {
        self.first_name
            .chars()
            .take(1)
            .chain(self.last_name.chars().take(1))
            .collect::<String>()
            .to_uppercase()
    }

    /// Name with the instructor title prefixed, e.g. "Sifu Ada Lee".
    pub fn titled_name(&self) -> String {
        match self.instructor_title {
            Some(title) => format!("{} {}", title.label(), self.full_name()),
            None => self.full_name(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

/// Body for `POST /users/` (admin-created accounts).
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructor_title: Option<InstructorTitle>,
    pub can_upload_media: bool,
}

/// Body for `PUT /users/{id}`. Only set fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructor_title: Option<InstructorTitle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_upload_media: Option<bool>,
}

/// Self-service signup. `school_id` is the school picked on the
/// registration form; the account starts out pending approval.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
    pub search: Option<String>,
    pub limit: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        serde_json::from_str(
            r#"{
                "id": "u1",
                "email": "ada@example.com",
                "first_name": "Ada",
                "last_name": "Lee",
                "phone": null,
                "role": "MANAGER",
                "status": "ACTIVE",
                "instructor_title": "SIFU",
                "can_upload_media": true,
                "created_at": "2026-01-05T10:00:00"
            }"#,
        )
        .expect("valid user json")
    }

    #[test]
    fn test_user_parses() {
        let user = sample_user();
        assert_eq!(user.role, Role::Manager);
        assert!(user.is_active());
        assert!(user.can_upload_media);
        assert_eq!(user.titled_name(), "Sifu Ada Lee");
        assert_eq!(user.initials(), "AL");
    }

    #[test]
    fn test_unknown_role_is_member() {
        let role: Role = serde_json::from_str(r#""GUEST""#).expect("falls back");
        assert_eq!(role, Role::Member);
    }

    #[test]
    fn test_role_predicates() {
        assert!(Role::SuperAdmin.is_admin());
        assert!(Role::Admin.is_manager_or_above());
        assert!(Role::Manager.is_manager_or_above());
        assert!(!Role::User.is_manager_or_above());
        assert_eq!(Role::Manager.label(), "Instructor");
    }

    #[test]
    fn test_user_update_skips_unset_fields() {
        let update = UserUpdate {
            status: Some(UserStatus::Active),
            ..Default::default()
        };
        let json = serde_json::to_string(&update).expect("serializes");
        assert_eq!(json, r#"{"status":"ACTIVE"}"#);
    }
}
