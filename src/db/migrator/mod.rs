use sea_orm_migration::prelude::*;

mod m20250301_initial;
mod m20250308_add_system_logs;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_initial::Migration),
            Box::new(m20250308_add_system_logs::Migration),
        ]
    }
}
