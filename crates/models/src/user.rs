use sea_orm::{entity::prelude::*, ConnectionTrait, QueryOrder, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

pub const DEFAULT_SICK_ALLOWANCE: i32 = 15;
pub const DEFAULT_ANNUAL_ALLOWANCE: i32 = 10;
pub const DEFAULT_CASUAL_ALLOWANCE: i32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[sea_orm(string_value = "user")]
    User,
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl Role {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub role: Role,
    pub sick_allowance: i32,
    pub annual_allowance: i32,
    pub casual_allowance: i32,
    pub department: Option<String>,
    pub avatar: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Leave,
    Booking,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Leave => Entity::has_many(crate::leave::Entity).into(),
            Relation::Booking => Entity::has_many(crate::booking::Entity).into(),
        }
    }
}

impl Related<crate::leave::Entity> for Entity {
    fn to() -> RelationDef { Relation::Leave.def() }
}

impl Related<crate::booking::Entity> for Entity {
    fn to() -> RelationDef { Relation::Booking.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    let trimmed = email.trim();
    if trimmed.is_empty() || !trimmed.contains('@') {
        return Err(ModelError::Validation("invalid email".into()));
    }
    Ok(())
}

/// Insert a user with the default allowances.
pub async fn create<C: ConnectionTrait>(db: &C, email: &str, role: Role) -> Result<Model, ModelError> {
    validate_email(email)?;
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.trim().to_string()),
        role: Set(role),
        sick_allowance: Set(DEFAULT_SICK_ALLOWANCE),
        annual_allowance: Set(DEFAULT_ANNUAL_ALLOWANCE),
        casual_allowance: Set(DEFAULT_CASUAL_ALLOWANCE),
        department: Set(None),
        avatar: Set(None),
        created_at: Set(Utc::now().into()),
    };
    Ok(am.insert(db).await?)
}

pub async fn find_by_email<C: ConnectionTrait>(db: &C, email: &str) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find().filter(Column::Email.eq(email.trim())).one(db).await?)
}

pub async fn list<C: ConnectionTrait>(db: &C) -> Result<Vec<Model>, ModelError> {
    Ok(Entity::find().order_by_asc(Column::Email).all(db).await?)
}

pub async fn set_role<C: ConnectionTrait>(db: &C, id: Uuid, role: Role) -> Result<Option<Model>, ModelError> {
    let Some(found) = Entity::find_by_id(id).one(db).await? else { return Ok(None) };
    let mut am: ActiveModel = found.into();
    am.role = Set(role);
    Ok(Some(am.update(db).await?))
}

/// Overwrite the three allowances on every user. Returns the number of rows touched.
pub async fn set_all_allowances<C: ConnectionTrait>(db: &C, annual: i32, sick: i32, casual: i32) -> Result<u64, ModelError> {
    if annual < 0 || sick < 0 || casual < 0 {
        return Err(ModelError::Validation("allowances must be non-negative".into()));
    }
    let res = Entity::update_many()
        .col_expr(Column::AnnualAllowance, Expr::value(annual))
        .col_expr(Column::SickAllowance, Expr::value(sick))
        .col_expr(Column::CasualAllowance, Expr::value(casual))
        .exec(db)
        .await?;
    Ok(res.rows_affected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parse_round_trips_known_values() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("user").map(|r| r.as_str()), Some("user"));
        assert_eq!(Role::parse("Admin"), None);
        assert_eq!(Role::parse("owner"), None);
    }

    #[test]
    fn email_validation() {
        assert!(validate_email("a@b.com").is_ok());
        assert!(validate_email("  ").is_err());
        assert!(validate_email("nobody").is_err());
    }
}
