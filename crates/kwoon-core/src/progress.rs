//! Grade progress and exam eligibility.
//!
//! Both the dashboard and the profile screen derive their progress bars,
//! status labels and exam verdicts from the functions in this module, so
//! the two views can never disagree for the same snapshot.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Branch, BranchProgress};
use crate::models::grade::{MAX_GRADE, MIN_GRADE};

// ============================================================================
// Hour sanitizing
// ============================================================================

/// Normalize an hour value from the wire. Missing, NaN, infinite and
/// negative values all count as zero.
pub fn hours(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

// ============================================================================
// Progress calculator
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressStatus {
    Ready,
    Approve,
    InProgress,
}

impl ProgressStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ProgressStatus::Ready => "Ready",
            ProgressStatus::Approve => "Approve",
            ProgressStatus::InProgress => "In progress",
        }
    }
}

impl std::fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Completion toward the required hours, 0-100.
    pub percent: u8,
    /// Where the minimum-hours marker sits on the same scale.
    pub min_percent: u32,
    pub status: ProgressStatus,
}

impl Progress {
    /// Fraction for gauge widgets.
    pub fn ratio(&self) -> f64 {
        f64::from(self.percent) / 100.0
    }
}

/// Compute completion percentage and status for one branch.
///
/// A student who is not done yet never shows 100%, even when rounding
/// would get there (49.8 of 50 hours reads 99%).
pub fn calculate(completed: f64, required: f64, minimum: f64) -> Progress {
    let completed = hours(Some(completed));
    let required = hours(Some(required));
    let minimum = hours(Some(minimum));

    if required == 0.0 {
        return Progress {
            percent: 0,
            min_percent: 0,
            status: ProgressStatus::InProgress,
        };
    }

    let mut raw = (completed / required * 100.0).round().clamp(0.0, 100.0);
    if completed < required {
        raw = raw.min(99.0);
    }
    let percent = raw as u8;
    let min_percent = (minimum / required * 100.0).round() as u32;

    let status = if percent >= 100 {
        ProgressStatus::Ready
    } else if u32::from(percent) >= min_percent {
        ProgressStatus::Approve
    } else {
        ProgressStatus::InProgress
    };

    Progress {
        percent,
        min_percent,
        status,
    }
}

// ============================================================================
// Exam eligibility
// ============================================================================

/// Ordered from most to least restrictive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EligibilityVerdict {
    NotEligible,
    NeedsApproval,
    Eligible,
}

impl EligibilityVerdict {
    /// Whether an exam branch may be selected at all.
    pub fn allows_exam(&self) -> bool {
        !matches!(self, EligibilityVerdict::NotEligible)
    }

    pub fn requires_approval(&self) -> bool {
        matches!(self, EligibilityVerdict::NeedsApproval)
    }

    pub fn stricter(self, other: EligibilityVerdict) -> EligibilityVerdict {
        self.min(other)
    }

    pub fn label(&self) -> &'static str {
        match self {
            EligibilityVerdict::NotEligible => "Not eligible",
            EligibilityVerdict::NeedsApproval => "Needs approval",
            EligibilityVerdict::Eligible => "Eligible",
        }
    }
}

impl std::fmt::Display for EligibilityVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Classify a student for exam registration.
///
/// A grade with no hour requirement (`required == 0`) is open to everyone.
pub fn resolve_eligibility(completed: f64, required: f64, minimum: f64) -> EligibilityVerdict {
    let completed = hours(Some(completed));
    let required = hours(Some(required));
    let minimum = hours(Some(minimum));

    if completed >= required {
        EligibilityVerdict::Eligible
    } else if completed >= minimum {
        EligibilityVerdict::NeedsApproval
    } else {
        EligibilityVerdict::NotEligible
    }
}

// ============================================================================
// Grade hour table
// ============================================================================

/// Hours a student must train at a grade before the next exam.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradeHours {
    pub required: f64,
    pub minimum: f64,
}

impl GradeHours {
    pub const NONE: GradeHours = GradeHours {
        required: 0.0,
        minimum: 0.0,
    };

    /// Thresholds for a grade. Grades past 12 have no fixed requirement.
    pub fn for_grade(grade: u8) -> Self {
        let (required, minimum) = match grade {
            1..=3 => (54.0, 44.0),
            4..=8 => (60.0, 52.0),
            9..=10 => (96.0, 80.0),
            11..=12 => (128.0, 110.0),
            _ => return Self::NONE,
        };
        GradeHours { required, minimum }
    }
}

// ============================================================================
// Snapshot helpers
// ============================================================================

#[derive(Error, Debug, PartialEq)]
pub enum ProgressError {
    #[error("{branch} grade {grade} is outside 1-17")]
    GradeOutOfRange { branch: Branch, grade: u8 },

    #[error("{branch} minimum hours {minimum} exceed required hours {required}")]
    MinimumExceedsRequired {
        branch: Branch,
        minimum: f64,
        required: f64,
    },

    #[error("{branch} server verdict {reported} disagrees with computed {computed}")]
    VerdictMismatch {
        branch: Branch,
        reported: EligibilityVerdict,
        computed: EligibilityVerdict,
    },
}

impl BranchProgress {
    pub fn progress(&self) -> Progress {
        calculate(self.completed_hours, self.required_hours, self.minimum_hours)
    }

    pub fn eligibility(&self) -> EligibilityVerdict {
        resolve_eligibility(self.completed_hours, self.required_hours, self.minimum_hours)
    }

    pub fn remaining_hours(&self) -> f64 {
        (hours(Some(self.required_hours)) - hours(Some(self.completed_hours))).max(0.0)
    }

    /// Report the first inconsistency in this snapshot. Callers log it and
    /// keep rendering; the values are never corrected client-side.
    pub fn check(&self) -> Result<(), ProgressError> {
        if !(MIN_GRADE..=MAX_GRADE).contains(&self.current_grade) {
            return Err(ProgressError::GradeOutOfRange {
                branch: self.branch,
                grade: self.current_grade,
            });
        }
        if self.minimum_hours > self.required_hours {
            return Err(ProgressError::MinimumExceedsRequired {
                branch: self.branch,
                minimum: self.minimum_hours,
                required: self.required_hours,
            });
        }
        if let Some(reported) = self.reported_eligibility {
            let computed = self.eligibility();
            if reported != computed {
                return Err(ProgressError::VerdictMismatch {
                    branch: self.branch,
                    reported,
                    computed,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(completed: f64, required: f64, minimum: f64) -> BranchProgress {
        BranchProgress {
            branch: Branch::WingTsun,
            current_grade: 4,
            completed_hours: completed,
            required_hours: required,
            minimum_hours: minimum,
            reported_eligibility: None,
        }
    }

    #[test]
    fn test_needs_approval_scenario() {
        let p = calculate(40.0, 50.0, 35.0);
        assert_eq!(p.percent, 80);
        assert_eq!(p.min_percent, 70);
        assert_eq!(p.status, ProgressStatus::Approve);
        assert_eq!(
            resolve_eligibility(40.0, 50.0, 35.0),
            EligibilityVerdict::NeedsApproval
        );
    }

    #[test]
    fn test_ready_scenario() {
        let p = calculate(50.0, 50.0, 35.0);
        assert_eq!(p.percent, 100);
        assert_eq!(p.status, ProgressStatus::Ready);
        assert_eq!(resolve_eligibility(50.0, 50.0, 35.0), EligibilityVerdict::Eligible);
    }

    #[test]
    fn test_in_progress_scenario() {
        let p = calculate(10.0, 50.0, 35.0);
        assert_eq!(p.percent, 20);
        assert_eq!(p.status, ProgressStatus::InProgress);
        assert_eq!(
            resolve_eligibility(10.0, 50.0, 35.0),
            EligibilityVerdict::NotEligible
        );
    }

    #[test]
    fn test_zero_required() {
        let p = calculate(0.0, 0.0, 0.0);
        assert_eq!(p.percent, 0);
        assert_eq!(p.min_percent, 0);
        assert_eq!(p.status, ProgressStatus::InProgress);
        assert_eq!(resolve_eligibility(0.0, 0.0, 0.0), EligibilityVerdict::Eligible);
    }

    #[test]
    fn test_over_completion_clamps() {
        let p = calculate(75.0, 50.0, 35.0);
        assert_eq!(p.percent, 100);
        assert_eq!(p.status, ProgressStatus::Ready);
    }

    #[test]
    fn test_almost_done_is_not_100() {
        let p = calculate(49.8, 50.0, 35.0);
        assert_eq!(p.percent, 99);
        assert_eq!(p.status, ProgressStatus::Approve);
    }

    #[test]
    fn test_bad_hour_values_count_as_zero() {
        assert_eq!(hours(None), 0.0);
        assert_eq!(hours(Some(f64::NAN)), 0.0);
        assert_eq!(hours(Some(-3.0)), 0.0);
        assert_eq!(hours(Some(f64::INFINITY)), 0.0);
        assert_eq!(calculate(f64::NAN, 50.0, 35.0).percent, 0);
        assert_eq!(calculate(-10.0, 50.0, 35.0).percent, 0);
        assert_eq!(calculate(10.0, f64::NAN, 35.0).percent, 0);
    }

    #[test]
    fn test_grade_hours_table() {
        assert_eq!(GradeHours::for_grade(1).required, 54.0);
        assert_eq!(GradeHours::for_grade(3).minimum, 44.0);
        assert_eq!(GradeHours::for_grade(8).required, 60.0);
        assert_eq!(GradeHours::for_grade(10).minimum, 80.0);
        assert_eq!(GradeHours::for_grade(12).required, 128.0);
        assert_eq!(GradeHours::for_grade(13), GradeHours::NONE);
        assert_eq!(GradeHours::for_grade(0), GradeHours::NONE);
    }

    #[test]
    fn test_verdict_helpers() {
        assert!(!EligibilityVerdict::NotEligible.allows_exam());
        assert!(EligibilityVerdict::NeedsApproval.allows_exam());
        assert!(EligibilityVerdict::NeedsApproval.requires_approval());
        assert!(!EligibilityVerdict::Eligible.requires_approval());
        assert_eq!(
            serde_json::to_string(&EligibilityVerdict::NeedsApproval).expect("serializes"),
            r#""NEEDS_APPROVAL""#
        );
    }

    #[test]
    fn test_snapshot_helpers() {
        let snap = snapshot(40.0, 50.0, 35.0);
        assert_eq!(snap.remaining_hours(), 10.0);
        assert_eq!(snap.progress().percent, 80);
        assert_eq!(snap.eligibility(), EligibilityVerdict::NeedsApproval);
        assert!(snap.check().is_ok());
        assert_eq!(snapshot(60.0, 50.0, 35.0).remaining_hours(), 0.0);
    }

    #[test]
    fn test_check_reports_violations() {
        let mut snap = snapshot(40.0, 50.0, 60.0);
        assert!(matches!(
            snap.check(),
            Err(ProgressError::MinimumExceedsRequired { .. })
        ));

        snap.minimum_hours = 35.0;
        snap.current_grade = 18;
        assert!(matches!(snap.check(), Err(ProgressError::GradeOutOfRange { .. })));

        snap.current_grade = 4;
        snap.reported_eligibility = Some(EligibilityVerdict::Eligible);
        assert!(matches!(snap.check(), Err(ProgressError::VerdictMismatch { .. })));
    }

    mod properties {
        use proptest::prelude::*;

        use super::super::*;

        fn arb_thresholds() -> impl Strategy<Value = (f64, f64)> {
            (0.5f64..500.0).prop_flat_map(|required| (Just(required), 0.0..=required))
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(512))]

            #[test]
            fn prop_percent_in_range(completed in 0.0f64..2000.0, (required, minimum) in arb_thresholds()) {
                let p = calculate(completed, required, minimum);
                prop_assert!(p.percent <= 100);
            }

            #[test]
            fn prop_percent_monotonic(
                a in 0.0f64..1000.0,
                b in 0.0f64..1000.0,
                (required, minimum) in arb_thresholds(),
            ) {
                let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
                let p_lo = calculate(lo, required, minimum).percent;
                let p_hi = calculate(hi, required, minimum).percent;
                prop_assert!(p_lo <= p_hi, "{} -> {}, {} -> {}", lo, p_lo, hi, p_hi);
            }

            #[test]
            fn prop_full_iff_complete(completed in 0.0f64..1000.0, (required, minimum) in arb_thresholds()) {
                let p = calculate(completed, required, minimum);
                prop_assert_eq!(p.percent == 100, completed >= required);
            }

            #[test]
            fn prop_zero_required_is_zero(completed in 0.0f64..1000.0) {
                prop_assert_eq!(calculate(completed, 0.0, 0.0).percent, 0);
            }

            #[test]
            fn prop_eligibility_partition(completed in 0.0f64..1000.0, (required, minimum) in arb_thresholds()) {
                let verdict = resolve_eligibility(completed, required, minimum);
                let eligible = completed >= required;
                let needs = minimum <= completed && completed < required;
                let not = completed < minimum;
                prop_assert_eq!(u8::from(eligible) + u8::from(needs) + u8::from(not), 1);
                let expected = if eligible {
                    EligibilityVerdict::Eligible
                } else if needs {
                    EligibilityVerdict::NeedsApproval
                } else {
                    EligibilityVerdict::NotEligible
                };
                prop_assert_eq!(verdict, expected);
            }
        }
    }
}
