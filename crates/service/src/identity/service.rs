use std::sync::Arc;

use models::user::Role;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::jwks::KeySet;
use super::token::{bearer_token, verify};
use crate::errors::ServiceError;
use crate::users::{resolve_or_create, UserRepository};

/// The authenticated caller for one request.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user: models::user::Model,
    pub email: String,
    pub role: Role,
}

impl Principal {
    /// `role` is the effective role for this request and is mirrored onto `user`.
    pub fn new(mut user: models::user::Model, role: Role) -> Self {
        user.role = role;
        Principal { email: user.email.clone(), role, user }
    }

    pub fn id(&self) -> Uuid {
        self.user.id
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> Result<(), ServiceError> {
        if self.is_admin() { Ok(()) } else { Err(ServiceError::forbidden()) }
    }

    /// Owner of the record or an admin.
    pub fn may_access(&self, owner: Uuid) -> bool {
        self.is_admin() || self.user.id == owner
    }
}

pub struct IdentityService<R: UserRepository> {
    keys: Arc<KeySet>,
    users: Arc<R>,
}

impl<R: UserRepository> IdentityService<R> {
    pub fn new(keys: Arc<KeySet>, users: Arc<R>) -> Self { Self { keys, users } }

    pub fn keys(&self) -> &Arc<KeySet> {
        &self.keys
    }

    /// Validate the `Authorization` header value and resolve the caller.
    #[instrument(skip_all)]
    pub async fn authenticate(&self, authorization: Option<&str>) -> Result<Principal, ServiceError> {
        let token = bearer_token(authorization)?;
        let claims = verify(token, &self.keys.snapshot())?;
        models::user::validate_email(&claims.email)
            .map_err(|_| ServiceError::Unauthorized("invalid email claim".into()))?;
        let user = resolve_or_create(self.users.as_ref(), &claims.email).await?;
        let role = claims.role.unwrap_or(user.role);
        debug!(email = %user.email, role = role.as_str(), "principal resolved");
        Ok(Principal::new(user, role))
    }
}
