//! Migration: Create events and event_organizers tables.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Events::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Events::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Events::Description).text().not_null())
                    .col(
                        ColumnDef::new(Events::StartAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Events::EndAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Events::EventType).string_len(16).not_null())
                    .col(ColumnDef::new(Events::Venue).string().null())
                    .col(ColumnDef::new(Events::JoinLink).text().null())
                    .col(ColumnDef::new(Events::ContactInfo).string().null())
                    .col(ColumnDef::new(Events::Thumbnail).text().null())
                    .col(ColumnDef::new(Events::TotalSeats).integer().null())
                    .col(
                        ColumnDef::new(Events::ConfirmedCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Events::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Events::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Events::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_events_deleted_at")
                    .table(Events::Table)
                    .col(Events::DeletedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_events_start_at")
                    .table(Events::Table)
                    .col(Events::StartAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EventOrganizers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(EventOrganizers::EventId).uuid().not_null())
                    .col(ColumnDef::new(EventOrganizers::UserId).uuid().not_null())
                    .primary_key(
                        Index::create()
                            .col(EventOrganizers::EventId)
                            .col(EventOrganizers::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_organizers_event_id")
                            .from(EventOrganizers::Table, EventOrganizers::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_organizers_user_id")
                            .from(EventOrganizers::Table, EventOrganizers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_event_organizers_user_id")
                    .table(EventOrganizers::Table)
                    .col(EventOrganizers::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EventOrganizers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Events::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub(super) enum Events {
    Table,
    Id,
    Title,
    Description,
    StartAt,
    EndAt,
    EventType,
    Venue,
    JoinLink,
    ContactInfo,
    Thumbnail,
    TotalSeats,
    ConfirmedCount,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(Iden)]
enum EventOrganizers {
    Table,
    EventId,
    UserId,
}
