use std::collections::BTreeSet;

use crate::capability::{self, Capability, RoleFlags, Screen};
use crate::models::{Role, User};

/// The signed-in user and what they may do. Built once per `/auth/me`
/// response and handed to every view.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: User,
    pub capabilities: BTreeSet<Capability>,
}

impl AuthContext {
    pub fn new(user: User) -> Self {
        let capabilities = capability::resolve(user.role, RoleFlags::from_user(&user));
        Self { user, capabilities }
    }

    pub fn can(&self, cap: Capability) -> bool {
        self.capabilities.contains(&cap)
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn navigation(&self) -> Vec<Screen> {
        Screen::navigation(&self.capabilities)
    }

    pub fn can_open(&self, screen: Screen) -> bool {
        screen.is_accessible(&self.capabilities)
    }

    pub fn display_name(&self) -> String {
        self.user.titled_name()
    }

    pub fn role_label(&self) -> &'static str {
        self.user.role.label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserStatus;

    fn user(role: Role, can_upload_media: bool) -> User {
        User {
            id: "u1".into(),
            email: "x@example.com".into(),
            first_name: "Lin".into(),
            last_name: "Wu".into(),
            phone: None,
            role,
            status: UserStatus::Active,
            instructor_title: None,
            can_upload_media,
            avatar_url: None,
            created_at: None,
        }
    }

    #[test]
    fn test_context_resolves_capabilities_once() {
        let ctx = AuthContext::new(user(Role::Manager, true));
        assert!(ctx.can(Capability::UploadMedia));
        assert!(ctx.can_open(Screen::Media));
        assert!(!ctx.can_open(Screen::Users));
        assert_eq!(ctx.role_label(), "Instructor");
        assert_eq!(ctx.display_name(), "Lin Wu");
    }

    #[test]
    fn test_navigation_follows_role() {
        let member = AuthContext::new(user(Role::Member, false));
        assert_eq!(
            member.navigation(),
            vec![Screen::Dashboard, Screen::Profile, Screen::Schools, Screen::Events, Screen::Products]
        );
    }
}
