use serde::{Deserialize, Serialize};

use super::common::nullable_hours;
use crate::progress::EligibilityVerdict;

/// Martial-arts branch. Each branch has its own grade ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Branch {
    WingTsun,
    Escrima,
}

impl Branch {
    pub const ALL: [Branch; 2] = [Branch::WingTsun, Branch::Escrima];

    pub fn label(&self) -> &'static str {
        match self {
            Branch::WingTsun => "Wing Tsun",
            Branch::Escrima => "Escrima",
        }
    }

    /// Short tag used in narrow table columns.
    pub fn short(&self) -> &'static str {
        match self {
            Branch::WingTsun => "WT",
            Branch::Escrima => "ESC",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Branch::WingTsun => "WING_TSUN",
            Branch::Escrima => "ESCRIMA",
        }
    }
}

impl std::fmt::Display for Branch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Per-branch progress row attached to a student listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentProgress {
    pub id: String,
    pub branch: Branch,
    pub current_grade: u8,
    #[serde(default, deserialize_with = "nullable_hours")]
    pub completed_hours: f64,
    #[serde(default, deserialize_with = "nullable_hours")]
    pub remaining_hours: f64,
}

/// Progress snapshot for one branch of the signed-in student, including
/// the hour thresholds for the current grade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchProgress {
    pub branch: Branch,
    pub current_grade: u8,
    #[serde(default, deserialize_with = "nullable_hours")]
    pub completed_hours: f64,
    #[serde(default, deserialize_with = "nullable_hours")]
    pub required_hours: f64,
    #[serde(default, deserialize_with = "nullable_hours")]
    pub minimum_hours: f64,
    /// Verdict as reported by the server. The client recomputes its own
    /// with [`BranchProgress::eligibility`].
    #[serde(default, rename = "exam_eligibility")]
    pub reported_eligibility: Option<EligibilityVerdict>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentProfile {
    pub id: String,
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub school_name: Option<String>,
    #[serde(default)]
    pub school_id: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub progress: Vec<BranchProgress>,
}

impl StudentProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn progress_for(&self, branch: Branch) -> Option<&BranchProgress> {
        self.progress.iter().find(|p| p.branch == branch)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub user_id: String,
    pub school_id: String,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub emergency_contact: Option<String>,
    #[serde(default)]
    pub emergency_phone: Option<String>,
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
    #[serde(default)]
    pub progress: Vec<StudentProgress>,
}

impl Student {
    pub fn name(&self) -> &str {
        self.user_name.as_deref().unwrap_or("Unknown")
    }

    pub fn grade_in(&self, branch: Branch) -> Option<u8> {
        self.progress
            .iter()
            .find(|p| p.branch == branch)
            .map(|p| p.current_grade)
    }

    /// Compact grade summary, e.g. "WT 4 / ESC 2".
    pub fn grade_summary(&self) -> String {
        let parts: Vec<String> = Branch::ALL
            .iter()
            .filter_map(|b| self.grade_in(*b).map(|g| format!("{} {}", b.short(), g)))
            .collect();
        if parts.is_empty() {
            "-".to_string()
        } else {
            parts.join(" / ")
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StudentSortColumn {
    #[default]
    Name,
    School,
    WingTsun,
    Escrima,
}

impl StudentSortColumn {
    pub fn next(&self) -> Self {
        match self {
            StudentSortColumn::Name => StudentSortColumn::School,
            StudentSortColumn::School => StudentSortColumn::WingTsun,
            StudentSortColumn::WingTsun => StudentSortColumn::Escrima,
            StudentSortColumn::Escrima => StudentSortColumn::Name,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StudentSortColumn::Name => "name",
            StudentSortColumn::School => "school",
            StudentSortColumn::WingTsun => "WT grade",
            StudentSortColumn::Escrima => "Escrima grade",
        }
    }

    /// Sort in place. Grade columns put the highest grade first and
    /// students without a grade last.
    pub fn sort(&self, students: &mut [Student]) {
        match self {
            StudentSortColumn::Name => {
                students.sort_by(|a, b| crate::utils::cmp_ignore_case(a.name(), b.name()))
            }
            StudentSortColumn::School => students.sort_by(|a, b| {
                crate::utils::cmp_ignore_case(
                    a.school_name.as_deref().unwrap_or(""),
                    b.school_name.as_deref().unwrap_or(""),
                )
                .then_with(|| crate::utils::cmp_ignore_case(a.name(), b.name()))
            }),
            StudentSortColumn::WingTsun => {
                students.sort_by_key(|s| std::cmp::Reverse(s.grade_in(Branch::WingTsun)))
            }
            StudentSortColumn::Escrima => {
                students.sort_by_key(|s| std::cmp::Reverse(s.grade_in(Branch::Escrima)))
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StudentFilter {
    pub school_id: Option<String>,
    pub branch: Option<Branch>,
    pub search: Option<String>,
    pub limit: Option<u32>,
}

/// Body for `POST /students/{id}/approve`.
#[derive(Debug, Clone, Serialize)]
pub struct StudentApproval {
    pub approved: bool,
}

/// Response of the avatar upload endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AvatarUpload {
    pub avatar_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_parses_progress() {
        let json = r#"{
            "id": "s1",
            "user_id": "u1",
            "first_name": "Bruce",
            "last_name": "Chan",
            "email": "b@example.com",
            "phone": null,
            "school_name": "Central Kwoon",
            "school_id": "sc1",
            "progress": [
                {
                    "branch": "WING_TSUN",
                    "current_grade": 4,
                    "completed_hours": 40.5,
                    "required_hours": 60,
                    "minimum_hours": 52,
                    "remaining_hours": 19.5,
                    "exam_eligibility": "NOT_ELIGIBLE"
                },
                {
                    "branch": "ESCRIMA",
                    "current_grade": 1,
                    "completed_hours": null,
                    "required_hours": 54,
                    "minimum_hours": null
                }
            ]
        }"#;
        let profile: StudentProfile = serde_json::from_str(json).expect("valid profile");
        assert_eq!(profile.full_name(), "Bruce Chan");
        let wt = profile.progress_for(Branch::WingTsun).expect("wt row");
        assert_eq!(wt.completed_hours, 40.5);
        assert_eq!(wt.reported_eligibility, Some(EligibilityVerdict::NotEligible));
        let esc = profile.progress_for(Branch::Escrima).expect("escrima row");
        assert_eq!(esc.completed_hours, 0.0);
        assert_eq!(esc.minimum_hours, 0.0);
        assert_eq!(esc.reported_eligibility, None);
    }

    #[test]
    fn test_student_grade_summary() {
        let json = r#"{
            "id": "s1",
            "user_id": "u1",
            "school_id": "sc1",
            "user_name": "Bruce Chan",
            "progress": [
                {"id": "p1", "branch": "ESCRIMA", "current_grade": 2, "completed_hours": 3, "remaining_hours": 51}
            ]
        }"#;
        let student: Student = serde_json::from_str(json).expect("valid student");
        assert_eq!(student.grade_summary(), "ESC 2");
        assert_eq!(student.grade_in(Branch::WingTsun), None);
        assert_eq!(student.name(), "Bruce Chan");
    }

    #[test]
    fn test_branch_wire_names() {
        assert_eq!(
            serde_json::to_string(&Branch::WingTsun).expect("serializes"),
            r#""WING_TSUN""#
        );
        assert_eq!(Branch::Escrima.as_str(), "ESCRIMA");
    }
}
