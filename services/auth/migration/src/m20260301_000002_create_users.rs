use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::ProjectId).uuid().not_null())
                    .col(ColumnDef::new(Users::PrimaryEmail).string().not_null())
                    .col(
                        ColumnDef::new(Users::PrimaryEmailVerified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Users::Table, Users::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Sign-up inserts against this constraint instead of reading first.
        manager
            .create_index(
                Index::create()
                    .table(Users::Table)
                    .col(Users::ProjectId)
                    .col(Users::PrimaryEmail)
                    .unique()
                    .name("uq_users_project_id_primary_email")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    ProjectId,
    PrimaryEmail,
    PrimaryEmailVerified,
    PasswordHash,
    CreatedAt,
}

#[derive(Iden)]
enum Projects {
    Table,
    Id,
}
