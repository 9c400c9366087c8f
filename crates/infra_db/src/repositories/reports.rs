//! Reports repository
//!
//! Row selection for the DRE: settled money joined to its chart
//! account's DRE metadata. Two sources feed the statement - settlements
//! of classified ledger entries, and classified system movements -
//! unioned into one shape the aggregator consumes. Amounts with no
//! classification come back with NULL metadata so the aggregator can
//! report them instead of dropping them.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use core_kernel::Period;
use domain_reports::{ClassifiedAmount, DreClassification};

use crate::error::DatabaseError;
use crate::repositories::text;

/// Repository for report row selection
#[derive(Debug, Clone)]
pub struct ReportsRepository {
    pool: PgPool,
}

#[derive(Debug, FromRow)]
struct DreRow {
    amount: Decimal,
    dre_group: Option<String>,
    dre_subgroup: Option<String>,
    dre_order: Option<i16>,
    dre_sign: Option<String>,
}

impl DreRow {
    fn into_domain(self) -> Result<ClassifiedAmount, DatabaseError> {
        let classification = match (self.dre_group, self.dre_sign) {
            (Some(group), Some(sign)) => Some(DreClassification {
                group,
                subgroup: self.dre_subgroup.unwrap_or_default(),
                order: self.dre_order.unwrap_or(0).max(0) as u16,
                sign: text::dre_sign(&sign)?,
            }),
            _ => None,
        };
        Ok(ClassifiedAmount {
            classification,
            amount: self.amount,
        })
    }
}

impl ReportsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Loads the classified amounts feeding the DRE for a period
    pub async fn dre_rows(&self, period: Period) -> Result<Vec<ClassifiedAmount>, DatabaseError> {
        let rows = sqlx::query_as::<_, DreRow>(
            r#"
            SELECT s.amount,
                   c.dre_group, c.dre_subgroup, c.dre_order, c.dre_sign
            FROM settlements s
            JOIN ledger_entries e ON e.entry_id = s.entry_id
            LEFT JOIN chart_accounts c ON c.chart_account_id = e.chart_account_id
            WHERE s.settlement_date BETWEEN $1 AND $2

            UNION ALL

            SELECT m.amount,
                   c.dre_group, c.dre_subgroup, c.dre_order, c.dre_sign
            FROM system_movements m
            LEFT JOIN chart_accounts c ON c.chart_account_id = m.chart_account_id
            WHERE m.movement_date BETWEEN $1 AND $2
            "#,
        )
        .bind(period.start())
        .bind(period.end())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(DreRow::into_domain).collect()
    }

    /// Settled totals per day, used by the cash listing screens
    pub async fn settled_totals_by_day(
        &self,
        period: Period,
    ) -> Result<Vec<(NaiveDate, Decimal)>, DatabaseError> {
        let rows: Vec<(NaiveDate, Decimal)> = sqlx::query_as(
            r#"
            SELECT settlement_date, SUM(amount)
            FROM settlements
            WHERE settlement_date BETWEEN $1 AND $2
            GROUP BY settlement_date
            ORDER BY settlement_date
            "#,
        )
        .bind(period.start())
        .bind(period.end())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
