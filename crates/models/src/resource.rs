use sea_orm::entity::prelude::*;
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "resources")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(column_name = "type")]
    pub resource_type: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub is_active: bool,
    pub min_lead_time_hours: i32,
    pub icon: Option<String>,
    pub color: Option<String>,
    /// Client JSON text, stored verbatim.
    #[sea_orm(column_type = "Text", nullable)]
    pub specs: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub form_fields: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Booking,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Booking => Entity::has_many(crate::booking::Entity).into(),
        }
    }
}

impl Related<crate::booking::Entity> for Entity {
    fn to() -> RelationDef { Relation::Booking.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() {
        return Err(ModelError::Validation("resource name required".into()));
    }
    Ok(())
}

pub fn validate_lead_time(hours: i32) -> Result<(), ModelError> {
    if hours < 0 {
        return Err(ModelError::Validation("minLeadTimeHours must be >= 0".into()));
    }
    Ok(())
}
