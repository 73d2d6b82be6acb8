use sea_orm::{entity::prelude::*, sea_query::OnConflict, ConnectionTrait, QueryOrder, Set};
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "holidays")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub date: Date,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub async fn all<C: ConnectionTrait>(db: &C) -> Result<Vec<Model>, ModelError> {
    Ok(Entity::find().order_by_asc(Column::Date).all(db).await?)
}

/// Holidays with `start <= date <= end`, in date order.
pub async fn in_range<C: ConnectionTrait>(db: &C, start: Date, end: Date) -> Result<Vec<Model>, ModelError> {
    Ok(Entity::find()
        .filter(Column::Date.gte(start))
        .filter(Column::Date.lte(end))
        .order_by_asc(Column::Date)
        .all(db)
        .await?)
}

/// Insert or rename the holiday on `date`.
pub async fn upsert<C: ConnectionTrait>(db: &C, date: Date, name: &str) -> Result<Model, ModelError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ModelError::Validation("holiday name required".into()));
    }
    let am = ActiveModel { id: Set(Uuid::new_v4()), date: Set(date), name: Set(name.to_string()) };
    Entity::insert(am)
        .on_conflict(OnConflict::column(Column::Date).update_column(Column::Name).to_owned())
        .exec_without_returning(db)
        .await?;
    Entity::find()
        .filter(Column::Date.eq(date))
        .one(db)
        .await?
        .ok_or_else(|| ModelError::Db("holiday vanished after upsert".into()))
}

pub async fn delete_on<C: ConnectionTrait>(db: &C, date: Date) -> Result<bool, ModelError> {
    let res = Entity::delete_many().filter(Column::Date.eq(date)).exec(db).await?;
    Ok(res.rows_affected > 0)
}
