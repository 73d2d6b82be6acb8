use sea_orm::entity::prelude::*;
use uuid::Uuid;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum LeaveType {
    #[sea_orm(string_value = "sick")]
    Sick,
    #[sea_orm(string_value = "annual")]
    Annual,
    #[sea_orm(string_value = "casual")]
    Casual,
}

impl LeaveType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sick" => Some(LeaveType::Sick),
            "annual" => Some(LeaveType::Annual),
            "casual" => Some(LeaveType::Casual),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl LeaveStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(LeaveStatus::Pending),
            "approved" => Some(LeaveStatus::Approved),
            "rejected" => Some(LeaveStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "leaves")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    #[sea_orm(column_name = "type")]
    pub leave_type: LeaveType,
    pub start_date: Date,
    pub end_date: Date,
    #[sea_orm(column_type = "Double")]
    pub total_days: f64,
    #[sea_orm(column_type = "Text")]
    pub reason: String,
    pub status: LeaveStatus,
    #[sea_orm(column_type = "Text", nullable)]
    pub approver_comment: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    User,
    LeaveDay,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(crate::user::Entity)
                .from(Column::UserId)
                .to(crate::user::Column::Id)
                .into(),
            Relation::LeaveDay => Entity::has_many(crate::leave_day::Entity).into(),
        }
    }
}

impl Related<crate::user::Entity> for Entity {
    fn to() -> RelationDef { Relation::User.def() }
}

impl Related<crate::leave_day::Entity> for Entity {
    fn to() -> RelationDef { Relation::LeaveDay.def() }
}

impl ActiveModelBehavior for ActiveModel {}
