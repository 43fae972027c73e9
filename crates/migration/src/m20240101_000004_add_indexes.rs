use sea_orm_migration::prelude::*;

/// (index name, column) pairs for the listing filters and default sort.
const APARTMENT_INDEXES: [(&str, Apartment); 6] = [
    ("idx_apartment_price", Apartment::Price),
    ("idx_apartment_bedrooms", Apartment::Bedrooms),
    ("idx_apartment_city", Apartment::City),
    ("idx_apartment_state", Apartment::State),
    ("idx_apartment_is_available", Apartment::IsAvailable),
    ("idx_apartment_created_at", Apartment::CreatedAt),
];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Apartment: composite unique (unit_number, project)
        manager
            .create_index(
                Index::create()
                    .name("uniq_apartment_unit_project")
                    .table(Apartment::Table)
                    .col(Apartment::UnitNumber)
                    .col(Apartment::Project)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_apartment_user")
                    .table(Apartment::Table)
                    .col(Apartment::UserId)
                    .to_owned(),
            )
            .await?;

        for (name, col) in APARTMENT_INDEXES {
            manager
                .create_index(Index::create().name(name).table(Apartment::Table).col(col).to_owned())
                .await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, _) in APARTMENT_INDEXES {
            manager
                .drop_index(Index::drop().name(name).table(Apartment::Table).to_owned())
                .await?;
        }
        manager
            .drop_index(Index::drop().name("idx_apartment_user").table(Apartment::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uniq_apartment_unit_project").table(Apartment::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden, Clone, Copy)]
enum Apartment {
    Table,
    UnitNumber,
    Project,
    UserId,
    Price,
    Bedrooms,
    City,
    State,
    IsAvailable,
    CreatedAt,
}
