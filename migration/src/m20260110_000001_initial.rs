use sea_orm_migration::prelude::extension::postgres::Type;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Statement;

/// Accounts (账户: 真实余额与体验余额在同一行, 共享行锁)
#[derive(DeriveIden)]
enum Accounts {
    Table,
    Id,
    DisplayName,
    RealBalanceCents,
    DemoBalanceCents,
    AccountMode,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

/// Boxes (盲盒配置)
#[derive(DeriveIden)]
enum Boxes {
    Table,
    Id,
    Name,
    PriceCents,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

/// Prizes (奖品配置: 同一个盲盒在 real/demo 两种模式下各有独立奖品表)
#[derive(DeriveIden)]
enum Prizes {
    Table,
    Id,
    BoxId,
    Mode,
    Name,
    ValueCents,
    Weight,
    IsDrawable,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

/// Ledger Entries (流水: 只追加, 永不修改)
#[derive(DeriveIden)]
enum LedgerEntries {
    Table,
    Id,
    AccountId,
    Kind,
    AmountCents,
    BalanceBeforeCents,
    BalanceAfterCents,
    Description,
    CreatedAt,
}

/// Audit Records (购买审计: 幂等与对账的锚点)
#[derive(DeriveIden)]
enum AuditRecords {
    Table,
    Id,
    PurchaseId,
    AccountId,
    Items,
    PerUnitDraw,
    TotalDebitedCents,
    TotalWonCents,
    BalanceBeforeCents,
    BalanceAfterCents,
    Status,
    ErrorMessage,
    CreatedAt,
}

/// Draw Sessions (旧版两阶段流程的服务端状态)
#[derive(DeriveIden)]
enum DrawSessions {
    Table,
    Id,
    AccountId,
    BoxId,
    State,
    PrizeId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // enums
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("account_mode"))
                    .values(vec![Alias::new("real"), Alias::new("demo")])
                    .to_owned(),
            )
            .await?;
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("ledger_entry_kind"))
                    .values(vec![Alias::new("debit"), Alias::new("credit")])
                    .to_owned(),
            )
            .await?;
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("audit_status"))
                    .values(vec![
                        Alias::new("completed"),
                        Alias::new("error"),
                        Alias::new("flagged"),
                    ])
                    .to_owned(),
            )
            .await?;
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("draw_session_state"))
                    .values(vec![
                        Alias::new("debited"),
                        Alias::new("drawn"),
                        Alias::new("credited"),
                    ])
                    .to_owned(),
            )
            .await?;

        // 账户表
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Accounts::DisplayName)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Accounts::RealBalanceCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Accounts::DemoBalanceCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Accounts::AccountMode)
                            .custom(Alias::new("account_mode"))
                            .not_null()
                            .default(Expr::cust("'real'::account_mode")),
                    )
                    .col(
                        ColumnDef::new(Accounts::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Accounts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Accounts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        // 余额永不为负 (应用层守护之外的数据库约束)
        let conn = manager.get_connection();
        conn.execute(Statement::from_string(
            manager.get_database_backend(),
            r#"ALTER TABLE accounts
               ADD CONSTRAINT chk_accounts_balances_non_negative
               CHECK (real_balance_cents >= 0 AND demo_balance_cents >= 0)"#
                .to_string(),
        ))
        .await?;

        // 盲盒表
        manager
            .create_table(
                Table::create()
                    .table(Boxes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Boxes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Boxes::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Boxes::PriceCents).big_integer().not_null())
                    .col(
                        ColumnDef::new(Boxes::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Boxes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Boxes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_boxes_name_unique")
                    .table(Boxes::Table)
                    .col(Boxes::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 奖品表
        manager
            .create_table(
                Table::create()
                    .table(Prizes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Prizes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Prizes::BoxId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Prizes::Mode)
                            .custom(Alias::new("account_mode"))
                            .not_null(),
                    )
                    .col(ColumnDef::new(Prizes::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Prizes::ValueCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Prizes::Weight).double().not_null())
                    .col(
                        ColumnDef::new(Prizes::IsDrawable)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Prizes::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Prizes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Prizes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_prizes_box_mode")
                    .table(Prizes::Table)
                    .col(Prizes::BoxId)
                    .col(Prizes::Mode)
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Prizes::Table)
                    .add_foreign_key(
                        TableForeignKey::new()
                            .name("fk_prizes_box")
                            .from_tbl(Prizes::Table)
                            .from_col(Prizes::BoxId)
                            .to_tbl(Boxes::Table)
                            .to_col(Boxes::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // 流水表
        manager
            .create_table(
                Table::create()
                    .table(LedgerEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LedgerEntries::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LedgerEntries::AccountId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerEntries::Kind)
                            .custom(Alias::new("ledger_entry_kind"))
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerEntries::AmountCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerEntries::BalanceBeforeCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerEntries::BalanceAfterCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerEntries::Description)
                            .string_len(512)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(LedgerEntries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_ledger_entries_account")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::AccountId)
                    .to_owned(),
            )
            .await?;

        // 审计表
        manager
            .create_table(
                Table::create()
                    .table(AuditRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuditRecords::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AuditRecords::PurchaseId)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AuditRecords::AccountId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AuditRecords::Items).text().not_null())
                    .col(ColumnDef::new(AuditRecords::PerUnitDraw).text().not_null())
                    .col(
                        ColumnDef::new(AuditRecords::TotalDebitedCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(AuditRecords::TotalWonCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(AuditRecords::BalanceBeforeCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(AuditRecords::BalanceAfterCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(AuditRecords::Status)
                            .custom(Alias::new("audit_status"))
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AuditRecords::ErrorMessage)
                            .string_len(1024)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AuditRecords::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        // 同一个 purchase_id 只允许一条 completed 记录 (幂等的第二道防线);
        // error 记录不占用幂等键, 允许失败后用同一 id 重试。
        conn.execute(Statement::from_string(
            manager.get_database_backend(),
            r#"CREATE UNIQUE INDEX IF NOT EXISTS idx_audit_records_purchase_completed
               ON audit_records (purchase_id) WHERE status = 'completed'"#
                .to_string(),
        ))
        .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_audit_records_account_created")
                    .table(AuditRecords::Table)
                    .col(AuditRecords::AccountId)
                    .col(AuditRecords::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // 两阶段流程状态表
        manager
            .create_table(
                Table::create()
                    .table(DrawSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DrawSessions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DrawSessions::AccountId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DrawSessions::BoxId).big_integer().not_null())
                    .col(
                        ColumnDef::new(DrawSessions::State)
                            .custom(Alias::new("draw_session_state"))
                            .not_null(),
                    )
                    .col(ColumnDef::new(DrawSessions::PrizeId).big_integer().null())
                    .col(
                        ColumnDef::new(DrawSessions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(DrawSessions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_draw_sessions_account_box_unique")
                    .table(DrawSessions::Table)
                    .col(DrawSessions::AccountId)
                    .col(DrawSessions::BoxId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 删除顺序: 依赖表 -> 基础表 -> 枚举类型
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(DrawSessions::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(AuditRecords::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(LedgerEntries::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Prizes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Boxes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Accounts::Table).to_owned())
            .await?;

        manager
            .drop_type(
                Type::drop()
                    .if_exists()
                    .name(Alias::new("draw_session_state"))
                    .to_owned(),
            )
            .await?;
        manager
            .drop_type(
                Type::drop()
                    .if_exists()
                    .name(Alias::new("audit_status"))
                    .to_owned(),
            )
            .await?;
        manager
            .drop_type(
                Type::drop()
                    .if_exists()
                    .name(Alias::new("ledger_entry_kind"))
                    .to_owned(),
            )
            .await?;
        manager
            .drop_type(
                Type::drop()
                    .if_exists()
                    .name(Alias::new("account_mode"))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
