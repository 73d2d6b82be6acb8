use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // LeaveDays: FK lookup and one row per date within a leave
        manager
            .create_index(
                Index::create()
                    .name("idx_leave_days_leave")
                    .table(LeaveDays::Table)
                    .col(LeaveDays::LeaveId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("uniq_leave_days_leave_date")
                    .table(LeaveDays::Table)
                    .col(LeaveDays::LeaveId)
                    .col(LeaveDays::Date)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Leaves: owner listing
        manager
            .create_index(
                Index::create()
                    .name("idx_leaves_user")
                    .table(Leaves::Table)
                    .col(Leaves::UserId)
                    .to_owned(),
            )
            .await?;

        // Bookings: overlap scan per resource, owner listing
        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_resource_interval")
                    .table(Bookings::Table)
                    .col(Bookings::ResourceId)
                    .col(Bookings::StartTime)
                    .col(Bookings::EndTime)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_user")
                    .table(Bookings::Table)
                    .col(Bookings::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_leave_days_leave").table(LeaveDays::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uniq_leave_days_leave_date").table(LeaveDays::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_leaves_user").table(Leaves::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_bookings_resource_interval").table(Bookings::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_bookings_user").table(Bookings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum LeaveDays { Table, LeaveId, Date }

#[derive(DeriveIden)]
enum Leaves { Table, UserId }

#[derive(DeriveIden)]
enum Bookings { Table, ResourceId, StartTime, EndTime, UserId }
