use sea_orm::entity::prelude::*;
use uuid::Uuid;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "checked_in")]
    CheckedIn,
    #[sea_orm(string_value = "proposed")]
    Proposed,
}

impl BookingStatus {
    /// Statuses that never block a slot.
    pub const RELEASED: [BookingStatus; 2] = [BookingStatus::Cancelled, BookingStatus::Rejected];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "rejected" => Some(BookingStatus::Rejected),
            "cancelled" => Some(BookingStatus::Cancelled),
            "completed" => Some(BookingStatus::Completed),
            "checked_in" => Some(BookingStatus::CheckedIn),
            "proposed" => Some(BookingStatus::Proposed),
            _ => None,
        }
    }

    /// Whether a booking in this status occupies its interval.
    pub fn holds_slot(&self) -> bool {
        !Self::RELEASED.contains(self)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub resource_id: Uuid,
    pub user_id: Uuid,
    pub start_time: DateTimeWithTimeZone,
    pub end_time: DateTimeWithTimeZone,
    pub status: BookingStatus,
    #[sea_orm(column_type = "Text", nullable)]
    pub rejection_reason: Option<String>,
    /// Client JSON text, stored verbatim.
    #[sea_orm(column_type = "Text", nullable)]
    pub details: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Resource,
    User,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Resource => Entity::belongs_to(crate::resource::Entity)
                .from(Column::ResourceId)
                .to(crate::resource::Column::Id)
                .into(),
            Relation::User => Entity::belongs_to(crate::user::Entity)
                .from(Column::UserId)
                .to(crate::user::Column::Id)
                .into(),
        }
    }
}

impl Related<crate::resource::Entity> for Entity {
    fn to() -> RelationDef { Relation::Resource.def() }
}

impl Related<crate::user::Entity> for Entity {
    fn to() -> RelationDef { Relation::User.def() }
}

impl ActiveModelBehavior for ActiveModel {}
