//! Initial schema migration - creates all tables from scratch.
//!
//! Complete schema for tabsplit:
//!
//! - `users`: people splitting bills
//! - `bills`: shared receipts addressed by a short group code
//! - `bill_items`: line items on a bill
//! - `item_selections`: per-user fractional claims on items
//! - `bill_participants`: per-bill membership with owed/paid amounts

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    Phone,
}

#[derive(Iden)]
enum Bills {
    Table,
    Id,
    GroupCode,
    Name,
    Subtotal,
    Tax,
    ServiceCharge,
    Total,
    CreatedAt,
}

#[derive(Iden)]
enum BillItems {
    Table,
    Id,
    BillId,
    Name,
    Quantity,
    Price,
}

#[derive(Iden)]
enum ItemSelections {
    Table,
    Id,
    ItemId,
    UserId,
    SplitRatio,
}

#[derive(Iden)]
enum BillParticipants {
    Table,
    Id,
    BillId,
    UserId,
    AmountOwed,
    AmountPaid,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(ColumnDef::new(Users::Phone).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-users-email-unique")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Bills
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Bills::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Bills::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Bills::GroupCode).string().not_null())
                    .col(ColumnDef::new(Bills::Name).string().not_null())
                    .col(ColumnDef::new(Bills::Subtotal).double().not_null())
                    .col(ColumnDef::new(Bills::Tax).double().not_null())
                    .col(ColumnDef::new(Bills::ServiceCharge).double().not_null())
                    .col(ColumnDef::new(Bills::Total).double().not_null())
                    .col(
                        ColumnDef::new(Bills::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-bills-group_code-unique")
                    .table(Bills::Table)
                    .col(Bills::GroupCode)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Bill items
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(BillItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BillItems::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BillItems::BillId).string().not_null())
                    .col(ColumnDef::new(BillItems::Name).string().not_null())
                    .col(ColumnDef::new(BillItems::Quantity).integer().not_null())
                    .col(ColumnDef::new(BillItems::Price).double().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-bill_items-bill_id")
                            .from(BillItems::Table, BillItems::BillId)
                            .to(Bills::Table, Bills::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-bill_items-bill_id")
                    .table(BillItems::Table)
                    .col(BillItems::BillId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Item selections
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ItemSelections::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ItemSelections::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ItemSelections::ItemId).string().not_null())
                    .col(ColumnDef::new(ItemSelections::UserId).string().not_null())
                    .col(
                        ColumnDef::new(ItemSelections::SplitRatio)
                            .double()
                            .not_null()
                            .default(1.0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-item_selections-item_id")
                            .from(ItemSelections::Table, ItemSelections::ItemId)
                            .to(BillItems::Table, BillItems::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-item_selections-user_id")
                            .from(ItemSelections::Table, ItemSelections::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-item_selections-item_id-user_id-unique")
                    .table(ItemSelections::Table)
                    .col(ItemSelections::ItemId)
                    .col(ItemSelections::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Bill participants
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(BillParticipants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BillParticipants::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BillParticipants::BillId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BillParticipants::UserId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BillParticipants::AmountOwed)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(BillParticipants::AmountPaid)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-bill_participants-bill_id")
                            .from(BillParticipants::Table, BillParticipants::BillId)
                            .to(Bills::Table, Bills::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-bill_participants-user_id")
                            .from(BillParticipants::Table, BillParticipants::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-bill_participants-bill_id-user_id-unique")
                    .table(BillParticipants::Table)
                    .col(BillParticipants::BillId)
                    .col(BillParticipants::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BillParticipants::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ItemSelections::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BillItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Bills::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
