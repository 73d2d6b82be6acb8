use sea_orm::entity::prelude::*;
use uuid::Uuid;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum HalfDayPeriod {
    #[sea_orm(string_value = "morning")]
    Morning,
    #[sea_orm(string_value = "evening")]
    Evening,
}

impl HalfDayPeriod {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "morning" => Some(HalfDayPeriod::Morning),
            "evening" => Some(HalfDayPeriod::Evening),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "leave_days")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub leave_id: Uuid,
    pub date: Date,
    pub is_half_day: bool,
    pub half_day_period: Option<HalfDayPeriod>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Leave,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Leave => Entity::belongs_to(crate::leave::Entity)
                .from(Column::LeaveId)
                .to(crate::leave::Column::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .into(),
        }
    }
}

impl Related<crate::leave::Entity> for Entity {
    fn to() -> RelationDef { Relation::Leave.def() }
}

impl ActiveModelBehavior for ActiveModel {}
