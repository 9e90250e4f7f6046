//! Role-based permissions.
//!
//! A user's role and flags resolve once into a set of [`Capability`]
//! values. Navigation, screen guards and per-action buttons all consult
//! that set instead of matching on roles directly.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub use crate::models::Role;
use crate::models::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Capability {
    ViewDashboard,
    ViewProfile,
    ViewEvents,
    ViewProducts,
    ViewMySchool,
    RegisterForEvents,
    CreateRequests,
    BrowseSchools,
    RequestEnrollment,
    ManageSchools,
    CreateEvents,
    EvaluateSeminars,
    ManageGrades,
    ManageProducts,
    ManageUsers,
    ManageAdmins,
    FilterStudentsBySchool,
    MailAnySchool,
    ViewStudents,
    ReviewEnrollments,
    ManageLessons,
    RecordAttendance,
    HandleRequests,
    ViewRequests,
    SendMail,
    ViewMedia,
    UploadMedia,
    DeleteMedia,
}

/// Per-account switches that widen a role's capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoleFlags {
    pub can_upload_media: bool,
}

impl RoleFlags {
    pub fn from_user(user: &User) -> Self {
        Self {
            can_upload_media: user.can_upload_media,
        }
    }
}

/// Resolve the capability set for a role.
pub fn resolve(role: Role, flags: RoleFlags) -> BTreeSet<Capability> {
    use Capability::*;

    let mut caps: BTreeSet<Capability> =
        [ViewDashboard, ViewProfile, ViewEvents, ViewProducts].into();

    let admin = role.is_admin();
    let staff = role.is_manager_or_above();

    if role == Role::User {
        caps.extend([ViewMySchool, RegisterForEvents, CreateRequests]);
    }
    if matches!(role, Role::User | Role::Member) {
        caps.insert(RequestEnrollment);
    }
    if admin || matches!(role, Role::User | Role::Member) {
        caps.insert(BrowseSchools);
    }
    if admin {
        caps.extend([
            ManageSchools,
            CreateEvents,
            EvaluateSeminars,
            ManageGrades,
            ManageProducts,
            ManageUsers,
            DeleteMedia,
            FilterStudentsBySchool,
            MailAnySchool,
        ]);
    }
    if staff {
        caps.extend([
            ViewStudents,
            ReviewEnrollments,
            ManageLessons,
            RecordAttendance,
            HandleRequests,
            SendMail,
        ]);
    }
    if role != Role::Member {
        caps.insert(ViewRequests);
    }

    let uploader = role == Role::Manager && flags.can_upload_media;
    if admin || role == Role::User || uploader {
        caps.insert(ViewMedia);
    }
    if admin || uploader {
        caps.insert(UploadMedia);
    }
    if role == Role::SuperAdmin {
        caps.insert(ManageAdmins);
    }

    caps
}

// ============================================================================
// Screens
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Screen {
    #[default]
    Dashboard,
    Profile,
    MySchool,
    Schools,
    Students,
    PendingEnrollments,
    Lessons,
    Events,
    Grades,
    Products,
    Requests,
    Mail,
    Media,
    Users,
}

impl Screen {
    /// Navigation order.
    pub const ALL: [Screen; 14] = [
        Screen::Dashboard,
        Screen::Profile,
        Screen::MySchool,
        Screen::Schools,
        Screen::Students,
        Screen::PendingEnrollments,
        Screen::Lessons,
        Screen::Events,
        Screen::Grades,
        Screen::Products,
        Screen::Requests,
        Screen::Mail,
        Screen::Media,
        Screen::Users,
    ];

    pub fn required_capability(&self) -> Capability {
        match self {
            Screen::Dashboard => Capability::ViewDashboard,
            Screen::Profile => Capability::ViewProfile,
            Screen::MySchool => Capability::ViewMySchool,
            Screen::Schools => Capability::BrowseSchools,
            Screen::Students => Capability::ViewStudents,
            Screen::PendingEnrollments => Capability::ReviewEnrollments,
            Screen::Lessons => Capability::ManageLessons,
            Screen::Events => Capability::ViewEvents,
            Screen::Grades => Capability::ManageGrades,
            Screen::Products => Capability::ViewProducts,
            Screen::Requests => Capability::ViewRequests,
            Screen::Mail => Capability::SendMail,
            Screen::Media => Capability::ViewMedia,
            Screen::Users => Capability::ManageUsers,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Screen::Dashboard => "Dashboard",
            Screen::Profile => "Profile",
            Screen::MySchool => "My School",
            Screen::Schools => "Schools",
            Screen::Students => "Students",
            Screen::PendingEnrollments => "Enrollments",
            Screen::Lessons => "Lessons",
            Screen::Events => "Events",
            Screen::Grades => "Grades",
            Screen::Products => "Products",
            Screen::Requests => "Requests",
            Screen::Mail => "Mail",
            Screen::Media => "Media",
            Screen::Users => "Users",
        }
    }

    pub fn is_accessible(&self, caps: &BTreeSet<Capability>) -> bool {
        caps.contains(&self.required_capability())
    }

    /// Screens visible to a capability set, in navigation order.
    pub fn navigation(caps: &BTreeSet<Capability>) -> Vec<Screen> {
        Self::ALL
            .iter()
            .copied()
            .filter(|s| s.is_accessible(caps))
            .collect()
    }

    /// Route guard: inaccessible screens redirect to the dashboard.
    pub fn guard(self, caps: &BTreeSet<Capability>) -> Screen {
        if self.is_accessible(caps) {
            self
        } else {
            Screen::Dashboard
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(role: Role) -> BTreeSet<Capability> {
        resolve(role, RoleFlags::default())
    }

    fn uploader_caps(role: Role) -> BTreeSet<Capability> {
        resolve(
            role,
            RoleFlags {
                can_upload_media: true,
            },
        )
    }

    #[test]
    fn test_everyone_sees_basics() {
        for role in [Role::SuperAdmin, Role::Admin, Role::Manager, Role::User, Role::Member] {
            let c = caps(role);
            for cap in [
                Capability::ViewDashboard,
                Capability::ViewProfile,
                Capability::ViewEvents,
                Capability::ViewProducts,
            ] {
                assert!(c.contains(&cap), "{:?} missing {:?}", role, cap);
            }
        }
    }

    #[test]
    fn test_student_capabilities() {
        let c = caps(Role::User);
        assert!(c.contains(&Capability::ViewMySchool));
        assert!(c.contains(&Capability::RegisterForEvents));
        assert!(c.contains(&Capability::CreateRequests));
        assert!(c.contains(&Capability::ViewMedia));
        assert!(c.contains(&Capability::ViewRequests));
        assert!(!c.contains(&Capability::ViewStudents));
        assert!(!c.contains(&Capability::UploadMedia));
    }

    #[test]
    fn test_member_is_most_restricted() {
        let c = caps(Role::Member);
        assert!(c.contains(&Capability::BrowseSchools));
        assert!(c.contains(&Capability::RequestEnrollment));
        assert!(!c.contains(&Capability::ViewRequests));
        assert!(!c.contains(&Capability::ViewMedia));
        assert!(!c.contains(&Capability::RegisterForEvents));
    }

    #[test]
    fn test_manager_media_depends_on_flag() {
        let plain = caps(Role::Manager);
        assert!(!plain.contains(&Capability::ViewMedia));
        assert!(!plain.contains(&Capability::UploadMedia));
        let flagged = uploader_caps(Role::Manager);
        assert!(flagged.contains(&Capability::ViewMedia));
        assert!(flagged.contains(&Capability::UploadMedia));
        assert!(!flagged.contains(&Capability::DeleteMedia));
    }

    #[test]
    fn test_upload_flag_is_ignored_for_students() {
        assert!(!uploader_caps(Role::User).contains(&Capability::UploadMedia));
    }

    #[test]
    fn test_manager_does_not_browse_schools() {
        let c = caps(Role::Manager);
        assert!(!c.contains(&Capability::BrowseSchools));
        assert!(c.contains(&Capability::ReviewEnrollments));
        assert!(c.contains(&Capability::SendMail));
        assert!(!c.contains(&Capability::MailAnySchool));
    }

    #[test]
    fn test_only_super_admin_manages_admins() {
        assert!(caps(Role::SuperAdmin).contains(&Capability::ManageAdmins));
        assert!(!caps(Role::Admin).contains(&Capability::ManageAdmins));
        assert!(caps(Role::Admin).contains(&Capability::ManageUsers));
    }

    #[test]
    fn test_navigation_order_and_visibility() {
        let nav = Screen::navigation(&caps(Role::User));
        assert_eq!(
            nav,
            vec![
                Screen::Dashboard,
                Screen::Profile,
                Screen::MySchool,
                Screen::Schools,
                Screen::Events,
                Screen::Products,
                Screen::Requests,
                Screen::Media,
            ]
        );

        let admin_nav = Screen::navigation(&caps(Role::Admin));
        assert!(admin_nav.contains(&Screen::Users));
        assert!(admin_nav.contains(&Screen::Grades));
        assert!(!admin_nav.contains(&Screen::MySchool));
    }

    #[test]
    fn test_guard_redirects_to_dashboard() {
        let member = caps(Role::Member);
        assert_eq!(Screen::Users.guard(&member), Screen::Dashboard);
        assert_eq!(Screen::Schools.guard(&member), Screen::Schools);
    }
}
