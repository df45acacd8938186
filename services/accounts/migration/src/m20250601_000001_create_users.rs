use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Checked at commit so an identity merge may copy the source's external
/// account id onto the target before deleting the source.
const UNIQUE_EXTERNAL_ACCOUNT_ID: &str = "ALTER TABLE users \
    ADD CONSTRAINT users_external_account_id_key UNIQUE (external_account_id) \
    DEFERRABLE INITIALLY DEFERRED";

const ROLE_CHECK: &str = "ALTER TABLE users \
    ADD CONSTRAINT users_role_check \
    CHECK (role IN ('user', 'verified', 'moderator', 'admin'))";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Users::ExternalAccountId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Users::Username).string().not_null())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string_len(16)
                            .not_null()
                            .default("user"),
                    )
                    .to_owned(),
            )
            .await?;

        let db = manager.get_connection();
        db.execute_unprepared(UNIQUE_EXTERNAL_ACCOUNT_ID).await?;
        db.execute_unprepared(ROLE_CHECK).await?;
        Ok(())
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
    ExternalAccountId,
    Username,
    Role,
}
