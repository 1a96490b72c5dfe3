use crate::auth::{AuthUser, Role};

/// Decides whether an authenticated user may check tickets in.
pub trait CheckInPolicy: Send + Sync {
    fn can_check_in(&self, operator: &AuthUser) -> bool;
}

/// Grants check-in to a fixed set of roles.
#[derive(Debug, Clone)]
pub struct RolePolicy {
    allowed: Vec<Role>,
}

impl RolePolicy {
    pub fn new(allowed: impl Into<Vec<Role>>) -> Self {
        Self {
            allowed: allowed.into(),
        }
    }
}

impl Default for RolePolicy {
    fn default() -> Self {
        Self::new([Role::Supervisor, Role::Manager])
    }
}

impl CheckInPolicy for RolePolicy {
    fn can_check_in(&self, operator: &AuthUser) -> bool {
        self.allowed.contains(&operator.role)
    }
}
