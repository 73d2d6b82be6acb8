//! Migrator registering table migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_user;
mod m20250301_000002_create_holiday;
mod m20250301_000003_create_leave;
mod m20250301_000004_create_leave_day;
mod m20250301_000005_create_resource;
mod m20250301_000006_create_booking;
mod m20250301_000010_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_user::Migration),
            Box::new(m20250301_000002_create_holiday::Migration),
            Box::new(m20250301_000003_create_leave::Migration),
            Box::new(m20250301_000004_create_leave_day::Migration),
            Box::new(m20250301_000005_create_resource::Migration),
            Box::new(m20250301_000006_create_booking::Migration),
            // Indexes should always be applied last
            Box::new(m20250301_000010_add_indexes::Migration),
        ]
    }
}
