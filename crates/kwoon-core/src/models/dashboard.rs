use serde::{Deserialize, Serialize};

use super::student::{Branch, BranchProgress};
use crate::progress::{hours, GradeHours};

/// `GET /dashboard/stats` returns a different shape per role. Variants are
/// tried in order, so the most specific shape comes first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DashboardStats {
    Admin(AdminStats),
    Manager(ManagerStats),
    Student(StudentStats),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminStats {
    pub total_schools: u32,
    pub total_students: u32,
    pub total_managers: u32,
    pub active_events: u32,
    pub pending_requests: u32,
    pub pending_approvals: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerStats {
    pub school_name: String,
    pub total_students: u32,
    pub pending_requests: u32,
    pub pending_approvals: u32,
    pub upcoming_events: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentStats {
    pub school_name: Option<String>,
    pub wt_grade: Option<u8>,
    pub wt_completed_hours: Option<f64>,
    pub wt_remaining_hours: Option<f64>,
    pub wt_required_hours: Option<f64>,
    pub wt_minimum_hours: Option<f64>,
    pub escrima_grade: Option<u8>,
    pub escrima_completed_hours: Option<f64>,
    pub escrima_remaining_hours: Option<f64>,
    pub escrima_required_hours: Option<f64>,
    pub escrima_minimum_hours: Option<f64>,
    #[serde(default)]
    pub upcoming_events: u32,
}

impl StudentStats {
    /// Progress rows for every branch the student holds a grade in.
    ///
    /// Older servers omit the thresholds; those fall back to the grade
    /// table so the dashboard and profile agree.
    pub fn branch_progress(&self) -> Vec<BranchProgress> {
        Branch::ALL
            .iter()
            .filter_map(|branch| self.progress_for(*branch))
            .collect()
    }

    fn progress_for(&self, branch: Branch) -> Option<BranchProgress> {
        let (grade, completed, required, minimum) = match branch {
            Branch::WingTsun => (
                self.wt_grade,
                self.wt_completed_hours,
                self.wt_required_hours,
                self.wt_minimum_hours,
            ),
            Branch::Escrima => (
                self.escrima_grade,
                self.escrima_completed_hours,
                self.escrima_required_hours,
                self.escrima_minimum_hours,
            ),
        };
        let grade = grade?;
        let table = GradeHours::for_grade(grade);
        Some(BranchProgress {
            branch,
            current_grade: grade,
            completed_hours: hours(completed),
            required_hours: required.map(|v| hours(Some(v))).unwrap_or(table.required),
            minimum_hours: minimum.map(|v| hours(Some(v))).unwrap_or(table.minimum),
            reported_eligibility: None,
        })
    }
}

impl DashboardStats {
    pub fn pending_approvals(&self) -> u32 {
        match self {
            DashboardStats::Admin(s) => s.pending_approvals,
            DashboardStats::Manager(s) => s.pending_approvals,
            DashboardStats::Student(_) => 0,
        }
    }

    pub fn pending_requests(&self) -> u32 {
        match self {
            DashboardStats::Admin(s) => s.pending_requests,
            DashboardStats::Manager(s) => s.pending_requests,
            DashboardStats::Student(_) => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_shape() {
        let stats: DashboardStats = serde_json::from_str(
            r#"{"total_schools": 3, "total_students": 120, "total_managers": 6,
                "active_events": 2, "pending_requests": 4, "pending_approvals": 1}"#,
        )
        .expect("admin stats");
        assert!(matches!(stats, DashboardStats::Admin(_)));
        assert_eq!(stats.pending_requests(), 4);
    }

    #[test]
    fn test_manager_shape() {
        let stats: DashboardStats = serde_json::from_str(
            r#"{"school_name": "Central", "total_students": 40, "pending_requests": 2,
                "pending_approvals": 3, "upcoming_events": 1}"#,
        )
        .expect("manager stats");
        assert!(matches!(stats, DashboardStats::Manager(_)));
        assert_eq!(stats.pending_approvals(), 3);
    }

    #[test]
    fn test_student_shape_fills_thresholds_from_grade_table() {
        let stats: DashboardStats = serde_json::from_str(
            r#"{"school_name": null, "wt_grade": 4, "wt_completed_hours": 40.0,
                "wt_remaining_hours": 20.0, "escrima_grade": null,
                "escrima_completed_hours": null, "escrima_remaining_hours": null,
                "upcoming_events": 0}"#,
        )
        .expect("student stats");
        let DashboardStats::Student(student) = stats else {
            panic!("expected student stats");
        };
        let rows = student.branch_progress();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].branch, Branch::WingTsun);
        assert_eq!(rows[0].required_hours, 60.0);
        assert_eq!(rows[0].minimum_hours, 52.0);
    }

    #[test]
    fn test_student_shape_prefers_server_thresholds() {
        let stats: StudentStats = serde_json::from_str(
            r#"{"school_name": "Central", "wt_grade": null, "wt_completed_hours": null,
                "wt_remaining_hours": null, "escrima_grade": 2,
                "escrima_completed_hours": 40, "escrima_remaining_hours": 10,
                "escrima_required_hours": 50, "escrima_minimum_hours": 35,
                "upcoming_events": 1}"#,
        )
        .expect("student stats");
        let rows = stats.branch_progress();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].required_hours, 50.0);
        assert_eq!(rows[0].minimum_hours, 35.0);
    }
}
