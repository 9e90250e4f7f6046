//! Seminar registration lifecycle.
//!
//! The server owns registration records; this module models the states a
//! record moves through so the client can render them and check a form
//! before it is sent.
//!
//! ```text
//! Unregistered -> Registered -> ExamPending -> AwaitingInstructorApproval -> ApprovedForExam -> Passed | Failed
//!                                          \-> ApprovedForExam (eligible)
//! ```

use thiserror::Error;
use tracing::warn;

use crate::models::{
    Branch, BranchProgress, EventEligibility, EventRegistration, EventType, RegistrationForm,
};
use crate::progress::EligibilityVerdict;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationState {
    Unregistered,
    Registered,
    /// An exam branch is selected but the request is not submitted yet.
    ExamPending(EligibilityVerdict),
    AwaitingInstructorApproval,
    ApprovedForExam,
    Passed,
    Failed,
    /// The event is over and there is no exam outcome for this student.
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationEvent {
    Register,
    SelectExam(EligibilityVerdict),
    Submit,
    InstructorApproved,
    InstructorDeclined,
    Evaluated { passed: bool },
    EventCompleted,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TransitionError {
    #[error("not eligible to take this exam")]
    NotEligible,

    #[error("registration is already final ({0})")]
    Terminal(RegistrationState),

    #[error("cannot apply {event:?} while {from}")]
    Invalid {
        from: RegistrationState,
        event: RegistrationEvent,
    },
}

impl RegistrationState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RegistrationState::Passed | RegistrationState::Failed | RegistrationState::Closed
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            RegistrationState::Unregistered => "Not registered",
            RegistrationState::Registered => "Registered",
            RegistrationState::ExamPending(_) => "Exam selected",
            RegistrationState::AwaitingInstructorApproval => "Awaiting instructor approval",
            RegistrationState::ApprovedForExam => "Approved for exam",
            RegistrationState::Passed => "Passed",
            RegistrationState::Failed => "Failed",
            RegistrationState::Closed => "Closed",
        }
    }

    pub fn apply(self, event: RegistrationEvent) -> Result<Self, TransitionError> {
        use RegistrationEvent as E;
        use RegistrationState as S;

        if self.is_terminal() {
            return Err(TransitionError::Terminal(self));
        }

        let next = match (self, event) {
            (S::Unregistered, E::Register) => S::Registered,

            (S::Registered | S::ExamPending(_), E::SelectExam(verdict)) => {
                if !verdict.allows_exam() {
                    return Err(TransitionError::NotEligible);
                }
                S::ExamPending(verdict)
            }

            (S::ExamPending(verdict), E::Submit) => {
                if verdict.requires_approval() {
                    S::AwaitingInstructorApproval
                } else {
                    S::ApprovedForExam
                }
            }

            (S::AwaitingInstructorApproval, E::InstructorApproved) => S::ApprovedForExam,
            (S::AwaitingInstructorApproval, E::InstructorDeclined) => S::Registered,

            (S::ApprovedForExam, E::Evaluated { passed: true }) => S::Passed,
            (S::ApprovedForExam, E::Evaluated { passed: false }) => S::Failed,

            // Exam candidates left unevaluated when the seminar closes
            // are recorded as failed.
            (S::AwaitingInstructorApproval | S::ApprovedForExam, E::EventCompleted) => S::Failed,
            (S::Unregistered | S::Registered | S::ExamPending(_), E::EventCompleted) => S::Closed,

            (from, event) => return Err(TransitionError::Invalid { from, event }),
        };
        Ok(next)
    }

    /// Reconstruct the state of a server-side registration record.
    ///
    /// `passed` is whether the student is among the evaluation's passed
    /// list; it only matters once the event is completed.
    pub fn derive(
        record: Option<&EventRegistration>,
        event_completed: bool,
        passed: bool,
    ) -> Self {
        let Some(record) = record else {
            return if event_completed {
                RegistrationState::Closed
            } else {
                RegistrationState::Unregistered
            };
        };

        if !record.will_take_exam {
            return if event_completed {
                RegistrationState::Closed
            } else {
                RegistrationState::Registered
            };
        }

        if event_completed {
            return if passed {
                RegistrationState::Passed
            } else {
                RegistrationState::Failed
            };
        }

        if record.needs_manager_approval && !record.manager_approved {
            RegistrationState::AwaitingInstructorApproval
        } else {
            RegistrationState::ApprovedForExam
        }
    }
}

impl std::fmt::Display for RegistrationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ============================================================================
// Form validation
// ============================================================================

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SelectionError {
    #[error("select at least one branch to register for")]
    NoBranch,

    #[error("select which branch to take the exam in")]
    NoExamBranch,

    #[error("register for {0} before taking its exam")]
    ExamWithoutRegistration(Branch),

    #[error("not eligible for the {0} exam")]
    NotEligible(Branch),
}

/// Per-branch exam verdicts for one student and one seminar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExamVerdicts {
    wing_tsun: EligibilityVerdict,
    escrima: EligibilityVerdict,
}

impl ExamVerdicts {
    /// Resolve each branch from the student's own hours. When the server
    /// also sent a verdict the stricter one wins, and a disagreement is
    /// logged. A branch with neither is not eligible.
    pub fn resolve(progress: &[BranchProgress], reported: Option<&EventEligibility>) -> Self {
        let verdict = |branch: Branch| {
            let snapshot = progress.iter().find(|p| p.branch == branch);
            let server = reported.map(|r| r.verdict_for(branch));
            match (snapshot, server) {
                (Some(snapshot), Some(server)) => {
                    let checked = BranchProgress {
                        reported_eligibility: Some(server),
                        ..snapshot.clone()
                    };
                    if let Err(e) = checked.check() {
                        warn!(error = %e, "Eligibility inconsistency");
                    }
                    snapshot.eligibility().stricter(server)
                }
                (Some(snapshot), None) => snapshot.eligibility(),
                (None, Some(server)) => server,
                (None, None) => EligibilityVerdict::NotEligible,
            }
        };
        Self {
            wing_tsun: verdict(Branch::WingTsun),
            escrima: verdict(Branch::Escrima),
        }
    }

    pub fn verdict_for(&self, branch: Branch) -> EligibilityVerdict {
        match branch {
            Branch::WingTsun => self.wing_tsun,
            Branch::Escrima => self.escrima,
        }
    }
}

/// A registration form that passed client-side checks.
#[derive(Debug, Clone, PartialEq)]
pub struct ExamSelection {
    pub form: RegistrationForm,
    /// At least one exam branch needs instructor sign-off.
    pub needs_approval: bool,
}

impl ExamSelection {
    /// Validate a form against the student's per-branch verdicts.
    ///
    /// Exam fields are dropped for anything other than a seminar, and
    /// exam branches are dropped when no exam is requested.
    pub fn validate(
        form: &RegistrationForm,
        event_type: EventType,
        verdicts: &ExamVerdicts,
    ) -> Result<Self, SelectionError> {
        let mut form = form.clone();

        if event_type != EventType::Seminar || !form.will_take_exam {
            form.will_take_exam = false;
            form.exam_branch_wt = false;
            form.exam_branch_escrima = false;
        }

        if !form.register_wt && !form.register_escrima {
            return Err(SelectionError::NoBranch);
        }

        let exams = form.selected_exams();
        if form.will_take_exam && exams.is_empty() {
            return Err(SelectionError::NoExamBranch);
        }

        let mut needs_approval = false;
        for branch in exams {
            if !form.registers_for(branch) {
                return Err(SelectionError::ExamWithoutRegistration(branch));
            }
            let verdict = verdicts.verdict_for(branch);
            if !verdict.allows_exam() {
                return Err(SelectionError::NotEligible(branch));
            }
            needs_approval |= verdict.requires_approval();
        }

        Ok(Self {
            form,
            needs_approval,
        })
    }

    /// State the registration lands in once the server accepts it.
    pub fn expected_state(&self) -> Result<RegistrationState, TransitionError> {
        let registered = RegistrationState::Unregistered.apply(RegistrationEvent::Register)?;
        if !self.form.will_take_exam {
            return Ok(registered);
        }
        let verdict = if self.needs_approval {
            EligibilityVerdict::NeedsApproval
        } else {
            EligibilityVerdict::Eligible
        };
        registered
            .apply(RegistrationEvent::SelectExam(verdict))?
            .apply(RegistrationEvent::Submit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use RegistrationEvent as E;
    use RegistrationState as S;

    fn record(exam: bool, needs: bool, approved: bool) -> EventRegistration {
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

    fn reported(wt: EligibilityVerdict, esc: EligibilityVerdict) -> EventEligibility {
        EventEligibility {
            wt_eligibility: Some(wt),
            escrima_eligibility: Some(esc),
            ..Default::default()
        }
    }

    fn eligibility(wt: EligibilityVerdict, esc: EligibilityVerdict) -> ExamVerdicts {
        ExamVerdicts::resolve(&[], Some(&reported(wt, esc)))
    }

    fn snapshot(branch: Branch, completed: f64) -> BranchProgress {
        BranchProgress {
            branch,
            current_grade: 4,
            completed_hours: completed,
            required_hours: 60.0,
            minimum_hours: 52.0,
            reported_eligibility: None,
        }
    }

    #[test]
    fn test_eligible_path_skips_approval() {
        let state = S::Unregistered
            .apply(E::Register)
            .and_then(|s| s.apply(E::SelectExam(EligibilityVerdict::Eligible)))
            .and_then(|s| s.apply(E::Submit))
            .expect("valid path");
        assert_eq!(state, S::ApprovedForExam);
        assert_eq!(state.apply(E::Evaluated { passed: true }), Ok(S::Passed));
    }

    #[test]
    fn test_needs_approval_path() {
        let state = S::Registered
            .apply(E::SelectExam(EligibilityVerdict::NeedsApproval))
            .and_then(|s| s.apply(E::Submit))
            .expect("valid path");
        assert_eq!(state, S::AwaitingInstructorApproval);
        assert_eq!(state.apply(E::InstructorApproved), Ok(S::ApprovedForExam));
        assert_eq!(state.apply(E::InstructorDeclined), Ok(S::Registered));
    }

    #[test]
    fn test_not_eligible_cannot_select_exam() {
        assert_eq!(
            S::Registered.apply(E::SelectExam(EligibilityVerdict::NotEligible)),
            Err(TransitionError::NotEligible)
        );
    }

    #[test]
    fn test_terminal_states_reject_everything() {
        for state in [S::Passed, S::Failed, S::Closed] {
            assert!(state.is_terminal());
            assert_eq!(state.apply(E::Register), Err(TransitionError::Terminal(state)));
        }
        assert_eq!(S::Unregistered.apply(E::EventCompleted), Ok(S::Closed));
        assert!(!S::Unregistered.is_terminal());
    }

    #[test]
    fn test_unevaluated_candidates_fail_on_completion() {
        assert_eq!(S::ApprovedForExam.apply(E::EventCompleted), Ok(S::Failed));
        assert_eq!(
            S::AwaitingInstructorApproval.apply(E::EventCompleted),
            Ok(S::Failed)
        );
        assert_eq!(S::Registered.apply(E::EventCompleted), Ok(S::Closed));
    }

    #[test]
    fn test_invalid_transition() {
        assert_eq!(
            S::Unregistered.apply(E::Submit),
            Err(TransitionError::Invalid {
                from: S::Unregistered,
                event: E::Submit
            })
        );
        assert!(S::Registered.apply(E::Evaluated { passed: true }).is_err());
    }

    #[test]
    fn test_derive_from_record() {
        assert_eq!(S::derive(None, false, false), S::Unregistered);
        assert_eq!(S::derive(None, true, false), S::Closed);
        assert_eq!(S::derive(Some(&record(false, false, false)), false, false), S::Registered);
        assert_eq!(
            S::derive(Some(&record(true, true, false)), false, false),
            S::AwaitingInstructorApproval
        );
        assert_eq!(
            S::derive(Some(&record(true, true, true)), false, false),
            S::ApprovedForExam
        );
        assert_eq!(S::derive(Some(&record(true, false, false)), true, true), S::Passed);
        assert_eq!(S::derive(Some(&record(true, false, false)), true, false), S::Failed);
    }

    #[test]
    fn test_selection_flags_approval() {
        let form = RegistrationForm {
            register_wt: true,
            register_escrima: true,
            will_take_exam: true,
            exam_branch_wt: true,
            exam_branch_escrima: true,
        };
        let elig = eligibility(EligibilityVerdict::Eligible, EligibilityVerdict::NeedsApproval);
        let selection =
            ExamSelection::validate(&form, EventType::Seminar, &elig).expect("valid selection");
        assert!(selection.needs_approval);
        assert_eq!(
            selection.expected_state(),
            Ok(S::AwaitingInstructorApproval)
        );
    }

    #[test]
    fn test_selection_rejects_not_eligible_branch() {
        let form = RegistrationForm {
            register_wt: true,
            will_take_exam: true,
            exam_branch_wt: true,
            ..Default::default()
        };
        let elig = eligibility(EligibilityVerdict::NotEligible, EligibilityVerdict::Eligible);
        assert_eq!(
            ExamSelection::validate(&form, EventType::Seminar, &elig),
            Err(SelectionError::NotEligible(Branch::WingTsun))
        );
    }

    #[test]
    fn test_selection_requires_branch_and_exam_choice() {
        let elig = eligibility(EligibilityVerdict::Eligible, EligibilityVerdict::Eligible);
        assert_eq!(
            ExamSelection::validate(&RegistrationForm::default(), EventType::Seminar, &elig),
            Err(SelectionError::NoBranch)
        );

        let form = RegistrationForm {
            register_wt: true,
            will_take_exam: true,
            ..Default::default()
        };
        assert_eq!(
            ExamSelection::validate(&form, EventType::Seminar, &elig),
            Err(SelectionError::NoExamBranch)
        );

        let form = RegistrationForm {
            register_wt: true,
            will_take_exam: true,
            exam_branch_escrima: true,
            ..Default::default()
        };
        assert_eq!(
            ExamSelection::validate(&form, EventType::Seminar, &elig),
            Err(SelectionError::ExamWithoutRegistration(Branch::Escrima))
        );
    }

    #[test]
    fn test_exam_fields_cleared_for_plain_events() {
        let form = RegistrationForm {
            register_wt: true,
            will_take_exam: true,
            exam_branch_wt: true,
            ..Default::default()
        };
        let elig = eligibility(EligibilityVerdict::NotEligible, EligibilityVerdict::NotEligible);
        let selection =
            ExamSelection::validate(&form, EventType::Event, &elig).expect("exam ignored");
        assert!(!selection.form.will_take_exam);
        assert!(!selection.form.exam_branch_wt);
        assert!(!selection.needs_approval);
        assert_eq!(selection.expected_state(), Ok(S::Registered));
    }

    #[test]
    fn test_hours_override_lenient_server_verdict() {
        let progress = [snapshot(Branch::WingTsun, 10.0)];
        let verdicts = ExamVerdicts::resolve(
            &progress,
            Some(&reported(EligibilityVerdict::Eligible, EligibilityVerdict::Eligible)),
        );
        assert_eq!(verdicts.verdict_for(Branch::WingTsun), EligibilityVerdict::NotEligible);
        // No progress row for Escrima, so the server's word stands
        assert_eq!(verdicts.verdict_for(Branch::Escrima), EligibilityVerdict::Eligible);

        let form = RegistrationForm {
            register_wt: true,
            will_take_exam: true,
            exam_branch_wt: true,
            ..Default::default()
        };
        assert_eq!(
            ExamSelection::validate(&form, EventType::Seminar, &verdicts),
            Err(SelectionError::NotEligible(Branch::WingTsun))
        );
    }

    #[test]
    fn test_verdicts_from_hours_alone() {
        let progress = [snapshot(Branch::WingTsun, 55.0), snapshot(Branch::Escrima, 60.0)];
        let verdicts = ExamVerdicts::resolve(&progress, None);
        assert_eq!(verdicts.verdict_for(Branch::WingTsun), EligibilityVerdict::NeedsApproval);
        assert_eq!(verdicts.verdict_for(Branch::Escrima), EligibilityVerdict::Eligible);
        assert_eq!(
            ExamVerdicts::resolve(&[], None).verdict_for(Branch::Escrima),
            EligibilityVerdict::NotEligible
        );
    }

    #[test]
    fn test_stricter_server_verdict_wins() {
        let progress = [snapshot(Branch::WingTsun, 60.0)];
        let verdicts = ExamVerdicts::resolve(
            &progress,
            Some(&reported(EligibilityVerdict::NeedsApproval, EligibilityVerdict::NotEligible)),
        );
        assert_eq!(verdicts.verdict_for(Branch::WingTsun), EligibilityVerdict::NeedsApproval);
    }
}
