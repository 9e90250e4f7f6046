use serde::{Deserialize, Serialize};

use super::common::nullable_hours;
use super::student::Branch;

/// Lowest and highest grade on either ladder.
pub const MIN_GRADE: u8 = 1;
pub const MAX_GRADE: u8 = 17;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeRequirement {
    pub id: String,
    pub branch: Branch,
    pub grade: u8,
    pub grade_name: String,
    #[serde(default, deserialize_with = "nullable_hours")]
    pub required_hours: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewGradeRequirement {
    pub branch: Branch,
    pub grade: u8,
    pub grade_name: String,
    pub required_hours: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GradeRequirementUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_hours: Option<f64>,
}

/// Admin correction of a student's grade. `note` is mandatory on the
/// server and ends up in the audit log.
#[derive(Debug, Clone, Serialize)]
pub struct ManualGradeChange {
    pub student_id: String,
    pub branch: Branch,
    pub new_grade: u8,
    pub note: String,
}

impl ManualGradeChange {
    pub fn is_valid_grade(&self) -> bool {
        (MIN_GRADE..=MAX_GRADE).contains(&self.new_grade)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requirement_parses() {
        let req: GradeRequirement = serde_json::from_str(
            r#"{"id": "g1", "branch": "ESCRIMA", "grade": 3, "grade_name": "3rd Student Grade", "required_hours": 54}"#,
        )
        .expect("valid requirement");
        assert_eq!(req.branch, Branch::Escrima);
        assert_eq!(req.required_hours, 54.0);
    }

    #[test]
    fn test_manual_change_grade_range() {
        let mut change = ManualGradeChange {
            student_id: "s1".into(),
            branch: Branch::WingTsun,
            new_grade: 17,
            note: "Transfer".into(),
        };
        assert!(change.is_valid_grade());
        change.new_grade = 0;
        assert!(!change.is_valid_grade());
        change.new_grade = 18;
        assert!(!change.is_valid_grade());
    }
}
