//! Bookable resources catalogue.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::identity::Principal;
use crate::json::{capture, serialize_raw};

/// Body of `POST /api/resources` and `PUT /api/resources/:id`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceInput {
    pub name: String,
    #[serde(rename = "type", default)]
    pub resource_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub min_lead_time_hours: Option<i32>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub specs: Option<Box<RawValue>>,
    #[serde(default)]
    pub form_fields: Option<Box<RawValue>>,
}

/// Validated resource fields, JSON payloads captured as text.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceFields {
    pub name: String,
    pub resource_type: String,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    pub min_lead_time_hours: Option<i32>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub specs: Option<String>,
    pub form_fields: Option<String>,
}

impl ResourceInput {
    fn validate(self) -> Result<ResourceFields, ServiceError> {
        models::resource::validate_name(&self.name)?;
        if let Some(hours) = self.min_lead_time_hours {
            models::resource::validate_lead_time(hours)?;
        }
        Ok(ResourceFields {
            name: self.name.trim().to_string(),
            resource_type: self.resource_type,
            description: self.description,
            is_active: self.is_active,
            min_lead_time_hours: self.min_lead_time_hours,
            icon: self.icon,
            color: self.color,
            specs: capture(self.specs),
            form_fields: capture(self.form_fields),
        })
    }
}

impl ResourceFields {
    fn apply(self, m: &mut models::resource::Model) {
        m.name = self.name;
        m.resource_type = self.resource_type;
        m.description = self.description;
        if let Some(active) = self.is_active {
            m.is_active = active;
        }
        if let Some(hours) = self.min_lead_time_hours {
            m.min_lead_time_hours = hours;
        }
        m.icon = self.icon;
        m.color = self.color;
        m.specs = self.specs;
        m.form_fields = self.form_fields;
    }

    fn into_model(self, id: Uuid) -> models::resource::Model {
        let mut m = models::resource::Model {
            id,
            name: String::new(),
            resource_type: String::new(),
            description: None,
            is_active: true,
            min_lead_time_hours: 0,
            icon: None,
            color: None,
            specs: None,
            form_fields: None,
            created_at: chrono::Utc::now().into(),
        };
        self.apply(&mut m);
        m
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceView {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub min_lead_time_hours: i32,
    pub icon: Option<String>,
    pub color: Option<String>,
    #[serde(serialize_with = "serialize_raw")]
    pub specs: Option<String>,
    #[serde(serialize_with = "serialize_raw")]
    pub form_fields: Option<String>,
    pub created_at: String,
}

impl From<models::resource::Model> for ResourceView {
    fn from(m: models::resource::Model) -> Self {
        ResourceView {
            id: m.id,
            name: m.name,
            resource_type: m.resource_type,
            description: m.description,
            is_active: m.is_active,
            min_lead_time_hours: m.min_lead_time_hours,
            icon: m.icon,
            color: m.color,
            specs: m.specs,
            form_fields: m.form_fields,
            created_at: m.created_at.to_rfc3339(),
        }
    }
}

#[async_trait]
pub trait ResourceRepository: Send + Sync {
    /// Ordered by name.
    async fn list(&self) -> Result<Vec<models::resource::Model>, ServiceError>;
    async fn create(&self, fields: ResourceFields) -> Result<models::resource::Model, ServiceError>;
    async fn update(&self, id: Uuid, fields: ResourceFields) -> Result<Option<models::resource::Model>, ServiceError>;
    /// Deletes the resource; its bookings go with it.
    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError>;
}

pub struct ResourceService<R: ResourceRepository> {
    repo: Arc<R>,
}

impl<R: ResourceRepository> ResourceService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    pub async fn list(&self) -> Result<Vec<ResourceView>, ServiceError> {
        Ok(self.repo.list().await?.into_iter().map(ResourceView::from).collect())
    }

    /// Raw models, for the utilisation report.
    pub async fn models(&self) -> Result<Vec<models::resource::Model>, ServiceError> {
        self.repo.list().await
    }

    #[instrument(skip(self, principal, input), fields(by = %principal.email))]
    pub async fn create(&self, principal: &Principal, input: ResourceInput) -> Result<ResourceView, ServiceError> {
        principal.require_admin()?;
        let created = self.repo.create(input.validate()?).await?;
        info!(resource_id = %created.id, name = %created.name, "resource_created");
        Ok(created.into())
    }

    #[instrument(skip(self, principal, input), fields(resource_id = %id, by = %principal.email))]
    pub async fn update(&self, principal: &Principal, id: Uuid, input: ResourceInput) -> Result<ResourceView, ServiceError> {
        principal.require_admin()?;
        let updated = self
            .repo
            .update(id, input.validate()?)
            .await?
            .ok_or_else(|| ServiceError::not_found("resource"))?;
        info!(active = updated.is_active, "resource_updated");
        Ok(updated.into())
    }

    #[instrument(skip(self, principal), fields(resource_id = %id, by = %principal.email))]
    pub async fn delete(&self, principal: &Principal, id: Uuid) -> Result<(), ServiceError> {
        principal.require_admin()?;
        if !self.repo.delete(id).await? {
            return Err(ServiceError::not_found("resource"));
        }
        info!("resource_deleted");
        Ok(())
    }
}

pub mod seaorm {
    use super::*;
    use models::pool::DbPool;
    use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel, QueryOrder};

    pub struct SeaOrmResourceRepository {
        pub pool: Arc<DbPool>,
    }

    impl SeaOrmResourceRepository {
        pub fn new(pool: Arc<DbPool>) -> Self { Self { pool } }
    }

    #[async_trait]
    impl ResourceRepository for SeaOrmResourceRepository {
        async fn list(&self) -> Result<Vec<models::resource::Model>, ServiceError> {
            Ok(models::resource::Entity::find()
                .order_by_asc(models::resource::Column::Name)
                .all(self.pool.conn().as_ref())
                .await?)
        }

        async fn create(&self, fields: ResourceFields) -> Result<models::resource::Model, ServiceError> {
            let am = fields.into_model(Uuid::new_v4()).into_active_model().reset_all();
            Ok(am.insert(self.pool.conn().as_ref()).await?)
        }

        async fn update(&self, id: Uuid, fields: ResourceFields) -> Result<Option<models::resource::Model>, ServiceError> {
            let db = self.pool.conn();
            let Some(mut current) = models::resource::Entity::find_by_id(id).one(db.as_ref()).await? else {
                return Ok(None);
            };
            fields.apply(&mut current);
            // reset_all marks every column dirty so the full row is written
            let am = current.into_active_model().reset_all();
            Ok(Some(am.update(db.as_ref()).await?))
        }

        async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
            let res = models::resource::Entity::delete_by_id(id).exec(self.pool.conn().as_ref()).await?;
            Ok(res.rows_affected > 0)
        }
    }
}

/// Resources held alongside bookings in the booking mock, so deletes cascade.
pub mod mock {
    use super::*;
    use crate::booking::repository::mock::MockBookingRepository;

    #[async_trait]
    impl ResourceRepository for MockBookingRepository {
        async fn list(&self) -> Result<Vec<models::resource::Model>, ServiceError> {
            let rows = self.rows.lock().unwrap();
            let mut out: Vec<_> = rows.resources.values().cloned().collect();
            out.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(out)
        }

        async fn create(&self, fields: ResourceFields) -> Result<models::resource::Model, ServiceError> {
            let m = fields.into_model(Uuid::new_v4());
            self.rows.lock().unwrap().resources.insert(m.id, m.clone());
            Ok(m)
        }

        async fn update(&self, id: Uuid, fields: ResourceFields) -> Result<Option<models::resource::Model>, ServiceError> {
            let mut rows = self.rows.lock().unwrap();
            Ok(rows.resources.get_mut(&id).map(|m| {
                fields.apply(m);
                m.clone()
            }))
        }

        async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
            let mut rows = self.rows.lock().unwrap();
            let found = rows.resources.remove(&id).is_some();
            rows.bookings.retain(|_, b| b.resource_id != id);
            Ok(found)
        }
    }
}
