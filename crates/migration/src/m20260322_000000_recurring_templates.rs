//! Recurring materialization bookkeeping.
//!
//! Materialized instances record the id of the recurring template that
//! produced them, and a composite unique index makes one instance per
//! template per competence month the hard rule. Rows with a NULL
//! `template_id` (ordinary transactions and the templates themselves) stay
//! unconstrained: SQL unique indexes treat NULLs as distinct.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Transactions {
    Table,
    UserId,
    TemplateId,
    CompetenceMonth,
    CompetenceYear,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Transactions::Table)
                    .add_column(ColumnDef::new(Transactions::TemplateId).blob())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-template-competence-unique")
                    .table(Transactions::Table)
                    .col(Transactions::UserId)
                    .col(Transactions::TemplateId)
                    .col(Transactions::CompetenceYear)
                    .col(Transactions::CompetenceMonth)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx-transactions-template-competence-unique")
                    .table(Transactions::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .alter_table(
                Table::alter()
                    .table(Transactions::Table)
                    .drop_column(Transactions::TemplateId)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
