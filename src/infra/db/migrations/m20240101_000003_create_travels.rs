//! Migration: cars, travels and inscriptions.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_accounts::{Drivers, Users};
use super::m20240101_000002_create_catalog::{Cities, Colors, Models};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Cars::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Cars::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Cars::Immat).string_len(9).not_null().unique_key())
                    .col(ColumnDef::new(Cars::ModelId).integer().not_null())
                    .col(ColumnDef::new(Cars::ColorId).integer().not_null())
                    .col(ColumnDef::new(Cars::DriverId).integer().not_null())
                    .col(
                        ColumnDef::new(Cars::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cars_model")
                            .from(Cars::Table, Cars::ModelId)
                            .to(Models::Table, Models::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cars_color")
                            .from(Cars::Table, Cars::ColorId)
                            .to(Colors::Table, Colors::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cars_driver")
                            .from(Cars::Table, Cars::DriverId)
                            .to(Drivers::Table, Drivers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Travels::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Travels::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Travels::Date)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Travels::Kms).integer().not_null())
                    .col(ColumnDef::new(Travels::AvailableSeats).integer().not_null())
                    .col(ColumnDef::new(Travels::DriverId).integer().not_null())
                    .col(ColumnDef::new(Travels::CarId).integer().not_null())
                    .col(ColumnDef::new(Travels::DepartureCityId).integer().not_null())
                    .col(ColumnDef::new(Travels::ArrivalCityId).integer().not_null())
                    .col(
                        ColumnDef::new(Travels::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_travels_driver")
                            .from(Travels::Table, Travels::DriverId)
                            .to(Drivers::Table, Drivers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_travels_car")
                            .from(Travels::Table, Travels::CarId)
                            .to(Cars::Table, Cars::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_travels_departure_city")
                            .from(Travels::Table, Travels::DepartureCityId)
                            .to(Cities::Table, Cities::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_travels_arrival_city")
                            .from(Travels::Table, Travels::ArrivalCityId)
                            .to(Cities::Table, Cities::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_travels_route_date")
                    .table(Travels::Table)
                    .col(Travels::DepartureCityId)
                    .col(Travels::ArrivalCityId)
                    .col(Travels::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Inscriptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Inscriptions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Inscriptions::UserId).integer().not_null())
                    .col(ColumnDef::new(Inscriptions::TravelId).integer().not_null())
                    .col(
                        ColumnDef::new(Inscriptions::Status)
                            .string_len(16)
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(
                        ColumnDef::new(Inscriptions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_inscriptions_user")
                            .from(Inscriptions::Table, Inscriptions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_inscriptions_travel")
                            .from(Inscriptions::Table, Inscriptions::TravelId)
                            .to(Travels::Table, Travels::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_inscriptions_travel_status")
                    .table(Inscriptions::Table)
                    .col(Inscriptions::TravelId)
                    .col(Inscriptions::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Inscriptions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Travels::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Cars::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Cars {
    Table,
    Id,
    Immat,
    ModelId,
    ColorId,
    DriverId,
    CreatedAt,
}

#[derive(Iden)]
enum Travels {
    Table,
    Id,
    Date,
    Kms,
    AvailableSeats,
    DriverId,
    CarId,
    DepartureCityId,
    ArrivalCityId,
    CreatedAt,
}

#[derive(Iden)]
enum Inscriptions {
    Table,
    Id,
    UserId,
    TravelId,
    Status,
    CreatedAt,
}
