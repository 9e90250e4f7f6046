use serde::{Deserialize, Serialize};

use super::student::Branch;

/// Bulk mail to students. `school_ids: None` targets every school, which
/// only admins may do; managers are pinned to their own school server-side.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MailRequest {
    pub subject: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<Branch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade_min: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade_max: Option<u8>,
}

impl MailRequest {
    /// Subject and body must both be non-blank and the grade window ordered.
    pub fn is_sendable(&self) -> bool {
        let window_ok = match (self.grade_min, self.grade_max) {
            (Some(lo), Some(hi)) => lo <= hi,
            _ => true,
        };
        !self.subject.trim().is_empty() && !self.body.trim().is_empty() && window_ok
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailLog {
    pub id: String,
    #[serde(default)]
    pub sent_by: Option<String>,
    pub subject: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub recipient_count: u32,
    #[serde(default)]
    pub filters_applied: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub sender_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mail_request_validation() {
        let mut mail = MailRequest {
            subject: "Seminar".into(),
            body: "See you Saturday".into(),
            ..Default::default()
        };
        assert!(mail.is_sendable());
        mail.grade_min = Some(5);
        mail.grade_max = Some(3);
        assert!(!mail.is_sendable());
        mail.grade_max = None;
        mail.subject = "  ".into();
        assert!(!mail.is_sendable());
    }

    #[test]
    fn test_mail_request_omits_unset_filters() {
        let mail = MailRequest {
            subject: "s".into(),
            body: "b".into(),
            branch: Some(Branch::WingTsun),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_string(&mail).expect("serializes"),
            r#"{"subject":"s","body":"b","branch":"WING_TSUN"}"#
        );
    }
}
