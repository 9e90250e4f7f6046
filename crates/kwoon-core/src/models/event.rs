use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::common::is_false;
use super::student::Branch;
use crate::progress::EligibilityVerdict;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Event,
    Seminar,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventType::Event => write!(f, "Event"),
            EventType::Seminar => write!(f, "Seminar"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventScope {
    #[default]
    AllSchools,
    SelectedSchools,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub event_type: EventType,
    pub start_datetime: String,
    #[serde(default)]
    pub end_datetime: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub scope: EventScope,
    #[serde(default)]
    pub wt_fee: Option<f64>,
    #[serde(default)]
    pub escrima_fee: Option<f64>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub registration_count: u32,
    #[serde(default)]
    pub selected_school_ids: Vec<String>,
}

impl Event {
    pub fn is_seminar(&self) -> bool {
        self.event_type == EventType::Seminar
    }

    /// Seminars that have not been evaluated yet accept exam candidates.
    pub fn accepts_exams(&self) -> bool {
        self.is_seminar() && !self.is_completed
    }

    pub fn is_full(&self) -> bool {
        matches!(self.capacity, Some(cap) if self.registration_count >= cap)
    }

    pub fn start(&self) -> Option<NaiveDateTime> {
        crate::utils::parse_timestamp(&self.start_datetime)
    }

    pub fn fee_for(&self, branch: Branch) -> Option<f64> {
        match branch {
            Branch::WingTsun => self.wt_fee,
            Branch::Escrima => self.escrima_fee,
        }
    }

    /// "12/40" when capped, otherwise just the registration count.
    pub fn capacity_display(&self) -> String {
        match self.capacity {
            Some(cap) => format!("{}/{}", self.registration_count, cap),
            None => self.registration_count.to_string(),
        }
    }
}

/// Create/update payload for events.
#[derive(Debug, Clone, Serialize)]
pub struct EventInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub event_type: EventType,
    pub start_datetime: String,
    pub end_datetime: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    pub scope: EventScope,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub selected_school_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wt_fee: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escrima_fee: Option<f64>,
}

/// Registration record as returned by `GET /events/{id}/registrations`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRegistration {
    pub id: String,
    pub event_id: String,
    pub student_id: String,
    #[serde(default)]
    pub register_wt: bool,
    #[serde(default)]
    pub register_escrima: bool,
    #[serde(default)]
    pub will_take_exam: bool,
    #[serde(default)]
    pub exam_branch_wt: bool,
    #[serde(default)]
    pub exam_branch_escrima: bool,
    #[serde(default)]
    pub needs_manager_approval: bool,
    #[serde(default)]
    pub manager_approved: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub student_name: Option<String>,
}

impl EventRegistration {
    pub fn exam_branches(&self) -> Vec<Branch> {
        let mut out = Vec::new();
        if self.exam_branch_wt {
            out.push(Branch::WingTsun);
        }
        if self.exam_branch_escrima {
            out.push(Branch::Escrima);
        }
        out
    }

    /// Candidates an instructor can grade: exam takers who either never
    /// needed sign-off or already got it.
    pub fn is_evaluable(&self) -> bool {
        self.will_take_exam && (!self.needs_manager_approval || self.manager_approved)
    }

    pub fn name(&self) -> &str {
        self.student_name.as_deref().unwrap_or("Unknown")
    }
}

/// Body for `POST /events/{id}/register`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationForm {
    pub register_wt: bool,
    pub register_escrima: bool,
    pub will_take_exam: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub exam_branch_wt: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub exam_branch_escrima: bool,
}

impl RegistrationForm {
    pub fn registers_for(&self, branch: Branch) -> bool {
        match branch {
            Branch::WingTsun => self.register_wt,
            Branch::Escrima => self.register_escrima,
        }
    }

    pub fn exam_in(&self, branch: Branch) -> bool {
        match branch {
            Branch::WingTsun => self.exam_branch_wt,
            Branch::Escrima => self.exam_branch_escrima,
        }
    }

    pub fn set_exam(&mut self, branch: Branch, on: bool) {
        match branch {
            Branch::WingTsun => self.exam_branch_wt = on,
            Branch::Escrima => self.exam_branch_escrima = on,
        }
    }

    pub fn toggle_branch(&mut self, branch: Branch) {
        match branch {
            Branch::WingTsun => self.register_wt = !self.register_wt,
            Branch::Escrima => self.register_escrima = !self.register_escrima,
        }
    }

    pub fn selected_exams(&self) -> Vec<Branch> {
        Branch::ALL
            .iter()
            .copied()
            .filter(|b| self.exam_in(*b))
            .collect()
    }
}

/// Response of a successful registration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationReceipt {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub needs_manager_approval: bool,
}

/// Per-branch exam verdicts for the signed-in student, from
/// `GET /events/{id}/my-eligibility`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventEligibility {
    #[serde(default)]
    pub wt_eligibility: Option<EligibilityVerdict>,
    #[serde(default)]
    pub escrima_eligibility: Option<EligibilityVerdict>,
    #[serde(default)]
    pub wt_completed_hours: Option<f64>,
    #[serde(default)]
    pub wt_required_hours: Option<f64>,
    #[serde(default)]
    pub escrima_completed_hours: Option<f64>,
    #[serde(default)]
    pub escrima_required_hours: Option<f64>,
}

impl EventEligibility {
    /// A branch without a verdict (no progress row) cannot sit an exam.
    pub fn verdict_for(&self, branch: Branch) -> EligibilityVerdict {
        let verdict = match branch {
            Branch::WingTsun => self.wt_eligibility,
            Branch::Escrima => self.escrima_eligibility,
        };
        verdict.unwrap_or(EligibilityVerdict::NotEligible)
    }

    /// "41/60" style hours hint shown next to a branch needing sign-off.
    pub fn hours_hint(&self, branch: Branch) -> Option<String> {
        let (done, required) = match branch {
            Branch::WingTsun => (self.wt_completed_hours, self.wt_required_hours),
            Branch::Escrima => (self.escrima_completed_hours, self.escrima_required_hours),
        };
        Some(format!(
            "{}/{}",
            crate::utils::format_hours(done?),
            crate::utils::format_hours(required?)
        ))
    }
}

/// Body for `POST /events/{id}/evaluate`. Exam takers not listed fail.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SeminarEvaluation {
    pub passed_student_ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(exam: bool, needs: bool, approved: bool) -> EventRegistration {
        EventRegistration {
            id: "r1".into(),
            event_id: "e1".into(),
            student_id: "s1".into(),
            register_wt: true,
            register_escrima: false,
            will_take_exam: exam,
            exam_branch_wt: exam,
            exam_branch_escrima: false,
            needs_manager_approval: needs,
            manager_approved: approved,
            created_at: None,
            student_name: None,
        }
    }

    #[test]
    fn test_evaluable_filter() {
        assert!(registration(true, false, false).is_evaluable());
        assert!(registration(true, true, true).is_evaluable());
        assert!(!registration(true, true, false).is_evaluable());
        assert!(!registration(false, false, false).is_evaluable());
    }

    #[test]
    fn test_registration_defaults_approval_flags() {
        let reg: EventRegistration = serde_json::from_str(
            r#"{"id": "r1", "event_id": "e1", "student_id": "s1", "register_wt": true,
                "will_take_exam": true, "exam_branch_wt": true}"#,
        )
        .expect("valid registration");
        assert!(!reg.needs_manager_approval);
        assert!(!reg.manager_approved);
        assert_eq!(reg.exam_branches(), vec![Branch::WingTsun]);
    }

    #[test]
    fn test_eligibility_missing_branch_is_not_eligible() {
        let elig: EventEligibility =
            serde_json::from_str(r#"{"wt_eligibility": "NEEDS_APPROVAL"}"#).expect("valid");
        assert_eq!(
            elig.verdict_for(Branch::WingTsun),
            EligibilityVerdict::NeedsApproval
        );
        assert_eq!(
            elig.verdict_for(Branch::Escrima),
            EligibilityVerdict::NotEligible
        );
        assert!(elig.hours_hint(Branch::WingTsun).is_none());
    }

    #[test]
    fn test_event_capacity_and_fees() {
        let event: Event = serde_json::from_str(
            r#"{"id": "e1", "name": "Spring Seminar", "event_type": "SEMINAR",
                "start_datetime": "2026-04-11T10:00:00", "capacity": 2,
                "registration_count": 2, "wt_fee": 40.0}"#,
        )
        .expect("valid event");
        assert!(event.accepts_exams());
        assert!(event.is_full());
        assert_eq!(event.capacity_display(), "2/2");
        assert_eq!(event.fee_for(Branch::WingTsun), Some(40.0));
        assert!(event.start().is_some());
    }

    #[test]
    fn test_form_omits_unset_exam_branches() {
        let form = RegistrationForm {
            register_wt: true,
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_string(&form).expect("serializes"),
            r#"{"register_wt":true,"register_escrima":false,"will_take_exam":false}"#
        );
    }
}
