use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Exercises::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Exercises::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Exercises::Slug)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Exercises::Category)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Exercises::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Exercises::Description).text().not_null().default(""))
                    .col(ColumnDef::new(Exercises::Template).text().not_null().default(""))
                    .col(ColumnDef::new(Exercises::TestCode).text().not_null().default(""))
                    .col(ColumnDef::new(Exercises::Hints).text().not_null().default(""))
                    .col(
                        ColumnDef::new(Exercises::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Exercises::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Exercises::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_exercises_category_active")
                    .table(Exercises::Table)
                    .col(Exercises::Category)
                    .col(Exercises::IsActive)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Exercises::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Exercises {
    Table,
    Id,
    Slug,
    Category,
    Title,
    Description,
    Template,
    TestCode,
    Hints,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
