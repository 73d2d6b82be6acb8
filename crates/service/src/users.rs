//! User administration and the resolve-or-create step of identity bootstrap.

use std::sync::Arc;

use async_trait::async_trait;
use models::user::Role;
use serde::Deserialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::identity::Principal;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<models::user::Model>, ServiceError>;
    async fn create(&self, email: &str, role: Role) -> Result<models::user::Model, ServiceError>;
    async fn list(&self) -> Result<Vec<models::user::Model>, ServiceError>;
    async fn set_role(&self, id: Uuid, role: Role) -> Result<Option<models::user::Model>, ServiceError>;
    async fn set_all_allowances(&self, annual: i32, sick: i32, casual: i32) -> Result<u64, ServiceError>;
}

/// Find the user for `email`, creating one with the default role and allowances if absent.
///
/// A concurrent first request for the same email can win the insert; the
/// loser re-reads and returns the winner's row.
pub async fn resolve_or_create<R: UserRepository + ?Sized>(repo: &R, email: &str) -> Result<models::user::Model, ServiceError> {
    if let Some(found) = repo.find_by_email(email).await? {
        return Ok(found);
    }
    match repo.create(email, Role::User).await {
        Ok(created) => {
            info!(email = %created.email, user_id = %created.id, "user_created");
            Ok(created)
        }
        Err(e) => {
            warn!(error = %e, "user create failed; re-reading");
            repo.find_by_email(email).await?.ok_or(e)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoleInput {
    pub role: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AllowancesInput {
    pub annual: i32,
    pub sick: i32,
    pub casual: i32,
}

pub struct UserService<R: UserRepository> {
    repo: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    pub fn me(&self, principal: &Principal) -> models::user::Model {
        principal.user.clone()
    }

    pub async fn list(&self, principal: &Principal) -> Result<Vec<models::user::Model>, ServiceError> {
        principal.require_admin()?;
        self.repo.list().await
    }

    #[instrument(skip(self, principal), fields(by = %principal.email))]
    pub async fn set_role(&self, principal: &Principal, id: Uuid, input: RoleInput) -> Result<models::user::Model, ServiceError> {
        principal.require_admin()?;
        let role = Role::parse(&input.role)
            .ok_or_else(|| ServiceError::InvalidType(format!("unknown role '{}'", input.role)))?;
        let updated = self.repo.set_role(id, role).await?.ok_or_else(|| ServiceError::not_found("user"))?;
        info!(user_id = %id, role = role.as_str(), "user_role_changed");
        Ok(updated)
    }

    #[instrument(skip(self, principal), fields(by = %principal.email))]
    pub async fn set_allowances(&self, principal: &Principal, input: AllowancesInput) -> Result<u64, ServiceError> {
        principal.require_admin()?;
        if input.annual < 0 || input.sick < 0 || input.casual < 0 {
            return Err(ServiceError::InvalidRequest("allowances must be non-negative".into()));
        }
        let rows = self.repo.set_all_allowances(input.annual, input.sick, input.casual).await?;
        info!(rows, "allowances_updated");
        Ok(rows)
    }
}

pub mod seaorm {
    use super::*;
    use models::pool::DbPool;

    pub struct SeaOrmUserRepository {
        pub pool: Arc<DbPool>,
    }

    impl SeaOrmUserRepository {
        pub fn new(pool: Arc<DbPool>) -> Self { Self { pool } }
    }

    #[async_trait]
    impl UserRepository for SeaOrmUserRepository {
        async fn find_by_email(&self, email: &str) -> Result<Option<models::user::Model>, ServiceError> {
            Ok(models::user::find_by_email(self.pool.conn().as_ref(), email).await?)
        }

        async fn create(&self, email: &str, role: Role) -> Result<models::user::Model, ServiceError> {
            Ok(models::user::create(self.pool.conn().as_ref(), email, role).await?)
        }

        async fn list(&self) -> Result<Vec<models::user::Model>, ServiceError> {
            Ok(models::user::list(self.pool.conn().as_ref()).await?)
        }

        async fn set_role(&self, id: Uuid, role: Role) -> Result<Option<models::user::Model>, ServiceError> {
            Ok(models::user::set_role(self.pool.conn().as_ref(), id, role).await?)
        }

        async fn set_all_allowances(&self, annual: i32, sick: i32, casual: i32) -> Result<u64, ServiceError> {
            Ok(models::user::set_all_allowances(self.pool.conn().as_ref(), annual, sick, casual).await?)
        }
    }
}

/// Simple in-memory mock repository for tests
pub mod mock {
    use super::*;
    use chrono::Utc;
    use models::user::{DEFAULT_ANNUAL_ALLOWANCE, DEFAULT_CASUAL_ALLOWANCE, DEFAULT_SICK_ALLOWANCE};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockUserRepository {
        users: Mutex<HashMap<Uuid, models::user::Model>>,
        creates: AtomicUsize,
    }

    impl MockUserRepository {
        pub fn create_calls(&self) -> usize {
            self.creates.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl UserRepository for MockUserRepository {
        async fn find_by_email(&self, email: &str) -> Result<Option<models::user::Model>, ServiceError> {
            Ok(self.users.lock().unwrap().values().find(|u| u.email == email).cloned())
        }

        async fn create(&self, email: &str, role: Role) -> Result<models::user::Model, ServiceError> {
            self.creates.fetch_add(1, Ordering::SeqCst);
            models::user::validate_email(email)?;
            let mut users = self.users.lock().unwrap();
            if users.values().any(|u| u.email == email) {
                return Err(ServiceError::Conflict("email already registered".into()));
            }
            let user = models::user::Model {
                id: Uuid::new_v4(),
                email: email.to_string(),
                role,
                sick_allowance: DEFAULT_SICK_ALLOWANCE,
                annual_allowance: DEFAULT_ANNUAL_ALLOWANCE,
                casual_allowance: DEFAULT_CASUAL_ALLOWANCE,
                department: None,
                avatar: None,
                created_at: Utc::now().into(),
            };
            users.insert(user.id, user.clone());
            Ok(user)
        }

        async fn list(&self) -> Result<Vec<models::user::Model>, ServiceError> {
            let mut all: Vec<_> = self.users.lock().unwrap().values().cloned().collect();
            all.sort_by(|a, b| a.email.cmp(&b.email));
            Ok(all)
        }

        async fn set_role(&self, id: Uuid, role: Role) -> Result<Option<models::user::Model>, ServiceError> {
            let mut users = self.users.lock().unwrap();
            Ok(users.get_mut(&id).map(|u| {
                u.role = role;
                u.clone()
            }))
        }

        async fn set_all_allowances(&self, annual: i32, sick: i32, casual: i32) -> Result<u64, ServiceError> {
            let mut users = self.users.lock().unwrap();
            for u in users.values_mut() {
                u.annual_allowance = annual;
                u.sick_allowance = sick;
                u.casual_allowance = casual;
            }
            Ok(users.len() as u64)
        }
    }
}
