use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Append-only time series of prices per region, no uniqueness on state
        manager
            .create_table(
                Table::create()
                    .table(ElectricityPrices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ElectricityPrices::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ElectricityPrices::State)
                            .string_len(3)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ElectricityPrices::Price).double().null())
                    .col(
                        ColumnDef::new(ElectricityPrices::Timestamp)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Lookups match on LOWER(state), so index the expression
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE INDEX IF NOT EXISTS idx_electricity_prices_state_lower
                ON electricity_prices (LOWER(state))
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ElectricityPrices::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ElectricityPrices {
    Table,
    Id,
    State,
    Price,
    Timestamp,
}
