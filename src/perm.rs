//! Role hierarchy and permission checks.

use serde::{Deserialize, Serialize};

/// Community role, ordered from least to most privileged.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    User,
    Blogger,
    Streamer,
    Mod,
    Admin,
    Owner,
}

impl Role {
    /// Whether this role sits at or above `required` in the hierarchy.
    pub fn has_at_least(self, required: Role) -> bool {
        self >= required
    }

    /// Publishing posts requires Blogger or above.
    pub fn can_publish(self) -> bool {
        self.has_at_least(Role::Blogger)
    }

    /// Moderation requires Mod or above.
    pub fn can_moderate(self) -> bool {
        self.has_at_least(Role::Mod)
    }

    pub fn is_admin(self) -> bool {
        self.has_at_least(Role::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hierarchy_ordering() {
        assert!(Role::Owner.has_at_least(Role::Admin));
        assert!(Role::Admin.has_at_least(Role::Admin));
        assert!(!Role::Mod.has_at_least(Role::Admin));
        assert!(Role::User.has_at_least(Role::User));
    }

    #[test]
    fn test_publish_boundary() {
        assert!(!Role::User.can_publish());
        assert!(Role::Blogger.can_publish());
        assert!(Role::Streamer.can_publish());
        assert!(Role::Owner.can_publish());
    }

    #[test]
    fn test_moderate_and_admin() {
        assert!(!Role::Blogger.can_moderate());
        assert!(Role::Mod.can_moderate());
        assert!(!Role::Mod.is_admin());
        assert!(Role::Admin.is_admin());
        assert!(Role::Owner.is_admin());
    }
}
