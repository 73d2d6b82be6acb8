//! Create `resources` table.
//! `specs` and `form_fields` hold client JSON text verbatim.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Resources::Table)
                    .if_not_exists()
                    .col(uuid(Resources::Id).primary_key())
                    .col(string_len(Resources::Name, 255).not_null())
                    .col(string_len(Resources::Type, 64).not_null())
                    .col(text_null(Resources::Description))
                    .col(boolean(Resources::IsActive).not_null().default(true))
                    .col(integer(Resources::MinLeadTimeHours).not_null().default(0))
                    .col(string_len_null(Resources::Icon, 64))
                    .col(string_len_null(Resources::Color, 32))
                    .col(text_null(Resources::Specs))
                    .col(text_null(Resources::FormFields))
                    .col(timestamp_with_time_zone(Resources::CreatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Resources::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Resources {
    Table,
    Id,
    Name,
    Type,
    Description,
    IsActive,
    MinLeadTimeHours,
    Icon,
    Color,
    Specs,
    FormFields,
    CreatedAt,
}
