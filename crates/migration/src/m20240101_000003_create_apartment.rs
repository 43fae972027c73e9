//! Create `apartment` table owned by a `user`.
//!
//! List-valued attributes (amenities, images, lease terms) are JSON arrays so
//! the schema stays portable between Postgres and SQLite.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Apartment::Table)
                    .if_not_exists()
                    .col(uuid(Apartment::Id).primary_key())
                    .col(string_len(Apartment::UnitName, 100).not_null())
                    .col(string_len(Apartment::UnitNumber, 20).not_null())
                    .col(string_len(Apartment::Project, 100).not_null())
                    .col(text(Apartment::Description).not_null())
                    .col(integer(Apartment::Bedrooms).not_null())
                    .col(double(Apartment::Bathrooms).not_null())
                    .col(integer(Apartment::SquareFootage).not_null())
                    .col(double(Apartment::Price).not_null())
                    .col(string_len(Apartment::Address, 200).not_null())
                    .col(string_len(Apartment::City, 100).not_null())
                    .col(string_len(Apartment::State, 50).not_null())
                    .col(string_len(Apartment::ZipCode, 10).not_null())
                    .col(json_binary(Apartment::Amenities).not_null())
                    .col(json_binary(Apartment::Images).not_null())
                    .col(boolean(Apartment::IsAvailable).not_null().default(true))
                    .col(ColumnDef::new(Apartment::FloorPlan).string_len(500).null())
                    .col(string_len(Apartment::PetPolicy, 16).not_null())
                    .col(integer(Apartment::ParkingSpaces).not_null().default(0))
                    .col(json_binary(Apartment::LeaseTerms).not_null())
                    .col(string_len(Apartment::ContactEmail, 100).not_null())
                    .col(string_len(Apartment::ContactPhone, 20).not_null())
                    .col(ColumnDef::new(Apartment::VirtualTourUrl).string_len(500).null())
                    .col(uuid(Apartment::UserId).not_null())
                    .col(timestamp_with_time_zone(Apartment::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Apartment::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_apartment_user")
                            .from(Apartment::Table, Apartment::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Apartment::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Apartment {
    Table,
    Id,
    UnitName,
    UnitNumber,
    Project,
    Description,
    Bedrooms,
    Bathrooms,
    SquareFootage,
    Price,
    Address,
    City,
    State,
    ZipCode,
    Amenities,
    Images,
    IsAvailable,
    FloorPlan,
    PetPolicy,
    ParkingSpaces,
    LeaseTerms,
    ContactEmail,
    ContactPhone,
    VirtualTourUrl,
    UserId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum User { Table, Id }
