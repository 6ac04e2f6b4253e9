use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VerificationCodes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VerificationCodes::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(VerificationCodes::ProjectId).uuid().not_null())
                    .col(ColumnDef::new(VerificationCodes::Code).string().not_null())
                    .col(ColumnDef::new(VerificationCodes::Kind).string().not_null())
                    .col(ColumnDef::new(VerificationCodes::Email).string().not_null())
                    .col(
                        ColumnDef::new(VerificationCodes::Payload)
                            .json_binary()
                            .not_null(),
                    )
                    .col(ColumnDef::new(VerificationCodes::RedirectUrl).text().not_null())
                    .col(
                        ColumnDef::new(VerificationCodes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VerificationCodes::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(VerificationCodes::UsedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .from(VerificationCodes::Table, VerificationCodes::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(VerificationCodes::Table)
                    .col(VerificationCodes::ProjectId)
                    .col(VerificationCodes::Code)
                    .unique()
                    .name("uq_verification_codes_project_id_code")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VerificationCodes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum VerificationCodes {
    Table,
    Id,
    ProjectId,
    Code,
    Kind,
    Email,
    Payload,
    RedirectUrl,
    CreatedAt,
    ExpiresAt,
    UsedAt,
}

#[derive(Iden)]
enum Projects {
    Table,
    Id,
}
