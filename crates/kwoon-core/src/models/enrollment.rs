use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnrollmentStatus {
    Pending,
    Approved,
    Rejected,
}

impl EnrollmentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            EnrollmentStatus::Pending => "Pending",
            EnrollmentStatus::Approved => "Approved",
            EnrollmentStatus::Rejected => "Rejected",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Pending => "PENDING",
            EnrollmentStatus::Approved => "APPROVED",
            EnrollmentStatus::Rejected => "REJECTED",
        }
    }
}

/// A member's request to join a school.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: String,
    pub user_id: String,
    pub school_id: String,
    pub status: EnrollmentStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub school_name: Option<String>,
}

impl Enrollment {
    pub fn is_pending(&self) -> bool {
        self.status == EnrollmentStatus::Pending
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrollmentRequest {
    pub school_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enrollment_parses() {
        let e: Enrollment = serde_json::from_str(
            r#"{"id": "e1", "user_id": "u1", "school_id": "sc1", "status": "PENDING",
                "created_at": "2026-02-01T09:00:00", "user_name": "Kim Park"}"#,
        )
        .expect("valid enrollment");
        assert!(e.is_pending());
        assert_eq!(e.user_name.as_deref(), Some("Kim Park"));
    }
}
