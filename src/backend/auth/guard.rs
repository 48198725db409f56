/**
 * Authorization Guard
 *
 * Bridges the pure access engine and the HTTP layer: runs `decide` and
 * turns a denial into a `Forbidden` error carrying the reason.
 */

use crate::backend::error::BackendError;
use crate::shared::access::{decide, Action, Decision, Identity};

/// Require that `identity` may perform `action`
pub fn authorize(identity: &Identity, action: &Action<'_>) -> Result<(), BackendError> {
    match decide(identity, action) {
        Decision::Allow => Ok(()),
        Decision::Deny(reason) => {
            tracing::warn!(
                user_id = %identity.user_id,
                role = %identity.role,
                "Access denied: {}",
                reason
            );
            Err(BackendError::forbidden(reason))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::model::Role;
    use axum::http::StatusCode;
    use uuid::Uuid;

    #[test]
    fn test_denial_becomes_forbidden() {
        let identity = Identity { user_id: Uuid::new_v4(), role: Role::Member, team_id: None };
        let err = authorize(&identity, &Action::CreateTeam).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(err.message(), "Only admins can create teams");
    }

    #[test]
    fn test_allow_passes() {
        let identity = Identity { user_id: Uuid::new_v4(), role: Role::Admin, team_id: None };
        assert!(authorize(&identity, &Action::CreateTeam).is_ok());
    }
}
