use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ExternalIdentityLinks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExternalIdentityLinks::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ExternalIdentityLinks::AccountId)
                            .integer()
                            .not_null()
                            .unique_key(),
                    )
                    // 一个外部身份只能绑定一个账户，并发首次登录依赖该约束判定胜负
                    .col(
                        ColumnDef::new(ExternalIdentityLinks::ExternalId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(ExternalIdentityLinks::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_external_identity_links_account_id")
                            .from(ExternalIdentityLinks::Table, ExternalIdentityLinks::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ExternalIdentityLinks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ExternalIdentityLinks {
    Table,
    Id,
    AccountId,
    ExternalId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Accounts {
    Table,
    Id,
}
