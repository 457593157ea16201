use sea_orm_migration::prelude::*;

use crate::migrations;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(migrations::m202606010001_create_users::Migration),
            Box::new(migrations::m202606010002_create_groups::Migration),
            Box::new(migrations::m202606010003_create_group_members::Migration),
            Box::new(migrations::m202606070001_create_assignments::Migration),
            Box::new(migrations::m202606070002_create_submissions::Migration),
            Box::new(migrations::m202607120001_create_attendance::Migration),
        ]
    }
}
