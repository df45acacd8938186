use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Uploads::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Uploads::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Uploads::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Uploads::LevelId).big_integer().not_null())
                    .col(ColumnDef::new(Uploads::ImagePath).string().not_null())
                    .col(
                        ColumnDef::new(Uploads::Accepted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Uploads::AcceptedBy).uuid())
                    .col(ColumnDef::new(Uploads::AcceptedTime).timestamp_with_time_zone())
                    .col(ColumnDef::new(Uploads::Reason).text())
                    .col(
                        ColumnDef::new(Uploads::UploadTime)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    // Owners are never deleted while they own uploads; a merge
                    // repoints ownership before removing the absorbed user.
                    .foreign_key(
                        ForeignKey::create()
                            .from(Uploads::Table, Uploads::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Uploads::Table, Uploads::AcceptedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Uploads::Table)
                    .col(Uploads::OwnerId)
                    .name("idx_uploads_owner_id")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Uploads::Table)
                    .col(Uploads::AcceptedBy)
                    .name("idx_uploads_accepted_by")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Uploads::Table)
                    .col(Uploads::LevelId)
                    .col(Uploads::UploadTime)
                    .name("idx_uploads_level_id_upload_time")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Uploads::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Uploads {
    Table,
    Id,
    OwnerId,
    LevelId,
    ImagePath,
    Accepted,
    AcceptedBy,
    AcceptedTime,
    Reason,
    UploadTime,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
