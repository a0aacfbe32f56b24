//! Initial schema migration.
//!
//! Creates the complete schema for Nodefolio:
//!
//! - `profiles`: members and admins, balance and moderation flags
//! - `products`: the investable node catalog
//! - `investments`: a member's purchase of a product
//! - `transactions`: append-only ledger explaining every balance change
//! - `coupons`: admin-issued credit codes
//! - `settings`: the `global` settings singleton
//! - `chat_messages`: member/support chat threads

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Profiles {
    Table,
    Id,
    Email,
    Role,
    Balance,
    IsFrozen,
    IsRestricted,
    WarningMessage,
    UsedCoupons,
    ReferralCode,
    ReferredBy,
    Version,
    CreatedAt,
}

#[derive(Iden)]
enum Products {
    Table,
    Id,
    Name,
    Price,
    DailyRoi,
    DurationDays,
    ImageUrl,
    CreatedAt,
}

#[derive(Iden)]
enum Investments {
    Table,
    Id,
    UserId,
    ProductId,
    ProductName,
    Amount,
    DailyRoi,
    StartDate,
    EndDate,
    Status,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    UserId,
    Amount,
    Kind,
    Status,
    Description,
    CreatedAt,
    BankName,
    BankCode,
    AccountNumber,
    AccountName,
    ProofUrl,
    Reference,
    ReviewedBy,
    ReviewedAt,
}

#[derive(Iden)]
enum Coupons {
    Table,
    Id,
    Code,
    Amount,
    CreatedAt,
}

#[derive(Iden)]
enum Settings {
    Table,
    Id,
    WithdrawalMin,
    MaintenanceMode,
    WithdrawalsPaused,
    DepositBankName,
    DepositAccountNumber,
    DepositAccountName,
    SupportUrl,
    CommunityUrl,
    BackgroundMediaUrl,
    UpdatedAt,
}

#[derive(Iden)]
enum ChatMessages {
    Table,
    Id,
    UserId,
    Sender,
    Body,
    CreatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Profiles
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Profiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Profiles::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Profiles::Email).string().not_null())
                    .col(
                        ColumnDef::new(Profiles::Role)
                            .string()
                            .not_null()
                            .default("user"),
                    )
                    .col(
                        ColumnDef::new(Profiles::Balance)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Profiles::IsFrozen)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Profiles::IsRestricted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Profiles::WarningMessage).string())
                    .col(
                        ColumnDef::new(Profiles::UsedCoupons)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(ColumnDef::new(Profiles::ReferralCode).string().not_null())
                    .col(ColumnDef::new(Profiles::ReferredBy).string())
                    .col(
                        ColumnDef::new(Profiles::Version)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Profiles::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-profiles-email-unique")
                    .table(Profiles::Table)
                    .col(Profiles::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-profiles-referral_code-unique")
                    .table(Profiles::Table)
                    .col(Profiles::ReferralCode)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-profiles-referred_by")
                    .table(Profiles::Table)
                    .col(Profiles::ReferredBy)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Products
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Products::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Products::Name).string().not_null())
                    .col(ColumnDef::new(Products::Price).big_integer().not_null())
                    .col(ColumnDef::new(Products::DailyRoi).double().not_null())
                    .col(ColumnDef::new(Products::DurationDays).integer().not_null())
                    .col(ColumnDef::new(Products::ImageUrl).string())
                    .col(ColumnDef::new(Products::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Investments
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Investments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Investments::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Investments::UserId).string().not_null())
                    .col(ColumnDef::new(Investments::ProductId).string().not_null())
                    .col(ColumnDef::new(Investments::ProductName).string().not_null())
                    .col(ColumnDef::new(Investments::Amount).big_integer().not_null())
                    .col(ColumnDef::new(Investments::DailyRoi).double().not_null())
                    .col(
                        ColumnDef::new(Investments::StartDate)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Investments::EndDate).timestamp().not_null())
                    .col(
                        ColumnDef::new(Investments::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-investments-user_id")
                            .from(Investments::Table, Investments::UserId)
                            .to(Profiles::Table, Profiles::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-investments-product_id")
                            .from(Investments::Table, Investments::ProductId)
                            .to(Products::Table, Products::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-investments-user_id-status")
                    .table(Investments::Table)
                    .col(Investments::UserId)
                    .col(Investments::Status)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::UserId).string().not_null())
                    .col(ColumnDef::new(Transactions::Amount).big_integer().not_null())
                    .col(ColumnDef::new(Transactions::Kind).string().not_null())
                    .col(ColumnDef::new(Transactions::Status).string().not_null())
                    .col(ColumnDef::new(Transactions::Description).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::BankName).string())
                    .col(ColumnDef::new(Transactions::BankCode).string())
                    .col(ColumnDef::new(Transactions::AccountNumber).string())
                    .col(ColumnDef::new(Transactions::AccountName).string())
                    .col(ColumnDef::new(Transactions::ProofUrl).string())
                    .col(ColumnDef::new(Transactions::Reference).string())
                    .col(ColumnDef::new(Transactions::ReviewedBy).string())
                    .col(ColumnDef::new(Transactions::ReviewedAt).timestamp())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-user_id")
                            .from(Transactions::Table, Transactions::UserId)
                            .to(Profiles::Table, Profiles::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-user_id-created_at")
                    .table(Transactions::Table)
                    .col(Transactions::UserId)
                    .col(Transactions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-kind-status")
                    .table(Transactions::Table)
                    .col(Transactions::Kind)
                    .col(Transactions::Status)
                    .to_owned(),
            )
            .await?;

        // Gateway references are unique; NULLs do not collide in SQLite.
        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-reference-unique")
                    .table(Transactions::Table)
                    .col(Transactions::Reference)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Coupons
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Coupons::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Coupons::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Coupons::Code).string().not_null())
                    .col(ColumnDef::new(Coupons::Amount).big_integer().not_null())
                    .col(ColumnDef::new(Coupons::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-coupons-code-unique")
                    .table(Coupons::Table)
                    .col(Coupons::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Settings
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Settings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Settings::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Settings::WithdrawalMin)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Settings::MaintenanceMode)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Settings::WithdrawalsPaused)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Settings::DepositBankName).string())
                    .col(ColumnDef::new(Settings::DepositAccountNumber).string())
                    .col(ColumnDef::new(Settings::DepositAccountName).string())
                    .col(ColumnDef::new(Settings::SupportUrl).string())
                    .col(ColumnDef::new(Settings::CommunityUrl).string())
                    .col(ColumnDef::new(Settings::BackgroundMediaUrl).string())
                    .col(ColumnDef::new(Settings::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Chat messages
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ChatMessages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ChatMessages::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ChatMessages::UserId).string().not_null())
                    .col(ColumnDef::new(ChatMessages::Sender).string().not_null())
                    .col(ColumnDef::new(ChatMessages::Body).text().not_null())
                    .col(
                        ColumnDef::new(ChatMessages::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-chat_messages-user_id")
                            .from(ChatMessages::Table, ChatMessages::UserId)
                            .to(Profiles::Table, Profiles::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-chat_messages-user_id-created_at")
                    .table(ChatMessages::Table)
                    .col(ChatMessages::UserId)
                    .col(ChatMessages::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ChatMessages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Settings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Coupons::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Investments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Profiles::Table).to_owned())
            .await
    }
}
