//! Reconciliation repository
//!
//! Database access for statement imports, statement entries, system
//! movements and reconciliations. The statement-entry table carries a
//! unique index over the dedup signature (bank account, posted date,
//! amount, direction, normalized FITID) as a second line of defense
//! behind the importer's in-memory dedup; inserts use ON CONFLICT DO
//! NOTHING so a race between two imports still cannot duplicate a line.
//!
//! "Matched" is not a stored flag: it is the existence of a link row.
//! Reversal deletes the reconciliation and its links inside one
//! transaction, which is exactly what restores both sides to an
//! unmatched state.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use core_kernel::{
    BankAccountId, ChartAccountId, MovementId, ReconciliationId, SettlementId, StatementEntryId,
    StatementImportId, Money,
};
use domain_reconciliation::{
    EntrySignature, ImportOutcome, Reconciliation, StatementCandidate, StatementEntry,
    SystemCandidate, SystemItemRef, SystemMovement,
};

use crate::error::DatabaseError;
use crate::repositories::text;

/// Repository for bank reconciliation data
#[derive(Debug, Clone)]
pub struct ReconciliationRepository {
    pool: PgPool,
}

#[derive(Debug, FromRow)]
struct StatementEntryRow {
    entry_id: Uuid,
    import_id: Uuid,
    bank_account_id: Uuid,
    posted_at: NaiveDate,
    amount: Decimal,
    currency: String,
    direction: String,
    fit_id: String,
    trn_type: String,
    name: String,
    memo: String,
    check_number: String,
    created_at: DateTime<Utc>,
}

impl StatementEntryRow {
    fn into_domain(self) -> Result<StatementEntry, DatabaseError> {
        let currency = text::currency(&self.currency)?;
        Ok(StatementEntry {
            id: StatementEntryId::from(self.entry_id),
            import_id: StatementImportId::from(self.import_id),
            bank_account_id: BankAccountId::from(self.bank_account_id),
            posted_at: self.posted_at,
            amount: Money::new(self.amount, currency),
            direction: text::direction(&self.direction)?,
            fit_id: self.fit_id,
            trn_type: self.trn_type,
            name: self.name,
            memo: self.memo,
            check_number: self.check_number,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct MovementRow {
    movement_id: Uuid,
    bank_account_id: Uuid,
    chart_account_id: Option<Uuid>,
    movement_date: NaiveDate,
    description: String,
    amount: Decimal,
    currency: String,
    direction: String,
    source: String,
    notes: String,
    created_at: DateTime<Utc>,
}

impl MovementRow {
    fn into_domain(self) -> Result<SystemMovement, DatabaseError> {
        let currency = text::currency(&self.currency)?;
        Ok(SystemMovement {
            id: MovementId::from(self.movement_id),
            bank_account_id: BankAccountId::from(self.bank_account_id),
            chart_account_id: self.chart_account_id.map(ChartAccountId::from),
            movement_date: self.movement_date,
            description: self.description,
            amount: Money::new(self.amount, currency),
            direction: text::direction(&self.direction)?,
            source: text::movement_source(&self.source)?,
            notes: self.notes,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct SignatureRow {
    posted_at: NaiveDate,
    amount: Decimal,
    direction: String,
    fit_id: String,
}

#[derive(Debug, FromRow)]
struct ReconciliationRow {
    reconciliation_id: Uuid,
    bank_account_id: Uuid,
    total_system: Decimal,
    total_statement: Decimal,
    difference: Decimal,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct SystemItemRow {
    settlement_id: Option<Uuid>,
    movement_id: Option<Uuid>,
}

impl ReconciliationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ------------------------------------------------------------------
    // Statement imports
    // ------------------------------------------------------------------

    /// Signatures of everything already imported for the account
    pub async fn known_signatures(
        &self,
        bank_account_id: BankAccountId,
    ) -> Result<Vec<EntrySignature>, DatabaseError> {
        let rows = sqlx::query_as::<_, SignatureRow>(
            r#"
            SELECT posted_at, amount, direction, fit_id
            FROM statement_entries WHERE bank_account_id = $1
            "#,
        )
        .bind(bank_account_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let direction = text::direction(&row.direction)?;
                Ok(EntrySignature::new(
                    row.posted_at,
                    row.amount,
                    direction,
                    &row.fit_id,
                ))
            })
            .collect()
    }

    /// Persists an import run and its new entries atomically
    pub async fn insert_import(&self, outcome: &ImportOutcome) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO statement_imports (
                import_id, bank_account_id, original_filename,
                ofx_bank_id, ofx_account_id, statement_start, statement_end, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(outcome.import.id.as_uuid())
        .bind(outcome.import.bank_account_id.as_uuid())
        .bind(&outcome.import.original_filename)
        .bind(&outcome.import.ofx_bank_id)
        .bind(&outcome.import.ofx_account_id)
        .bind(outcome.import.statement_start)
        .bind(outcome.import.statement_end)
        .bind(outcome.import.created_at)
        .execute(&mut *tx)
        .await?;

        for entry in &outcome.entries {
            // Unique signature index backs up the in-memory dedup
            sqlx::query(
                r#"
                INSERT INTO statement_entries (
                    entry_id, import_id, bank_account_id, posted_at,
                    amount, currency, direction, fit_id,
                    trn_type, name, memo, check_number, created_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(entry.id.as_uuid())
            .bind(entry.import_id.as_uuid())
            .bind(entry.bank_account_id.as_uuid())
            .bind(entry.posted_at)
            .bind(entry.amount.amount())
            .bind(entry.amount.currency().code())
            .bind(text::direction_str(entry.direction))
            .bind(&entry.fit_id)
            .bind(&entry.trn_type)
            .bind(&entry.name)
            .bind(&entry.memo)
            .bind(&entry.check_number)
            .bind(entry.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Statement entries for an account, optionally only unmatched ones
    pub async fn list_statement_entries(
        &self,
        bank_account_id: BankAccountId,
        unmatched_only: bool,
    ) -> Result<Vec<StatementEntry>, DatabaseError> {
        let sql = if unmatched_only {
            r#"
            SELECT e.* FROM statement_entries e
            WHERE e.bank_account_id = $1
              AND NOT EXISTS (
                  SELECT 1 FROM reconciliation_statement_items i
                  WHERE i.statement_entry_id = e.entry_id
              )
            ORDER BY e.posted_at DESC, e.created_at DESC
            "#
        } else {
            r#"
            SELECT e.* FROM statement_entries e
            WHERE e.bank_account_id = $1
            ORDER BY e.posted_at DESC, e.created_at DESC
            "#
        };
        let rows = sqlx::query_as::<_, StatementEntryRow>(sql)
            .bind(bank_account_id.as_uuid())
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(StatementEntryRow::into_domain).collect()
    }

    pub async fn get_statement_entry(
        &self,
        id: StatementEntryId,
    ) -> Result<StatementEntry, DatabaseError> {
        let row = sqlx::query_as::<_, StatementEntryRow>(
            "SELECT * FROM statement_entries WHERE entry_id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("StatementEntry", id))?;
        row.into_domain()
    }

    // ------------------------------------------------------------------
    // System movements
    // ------------------------------------------------------------------

    pub async fn insert_movement(&self, movement: &SystemMovement) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO system_movements (
                movement_id, bank_account_id, chart_account_id, movement_date,
                description, amount, currency, direction, source, notes, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(movement.id.as_uuid())
        .bind(movement.bank_account_id.as_uuid())
        .bind(movement.chart_account_id.map(|c| *c.as_uuid()))
        .bind(movement.movement_date)
        .bind(&movement.description)
        .bind(movement.amount.amount())
        .bind(movement.amount.currency().code())
        .bind(text::direction_str(movement.direction))
        .bind(text::movement_source_str(movement.source))
        .bind(&movement.notes)
        .bind(movement.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn list_movements(
        &self,
        bank_account_id: BankAccountId,
    ) -> Result<Vec<SystemMovement>, DatabaseError> {
        let rows = sqlx::query_as::<_, MovementRow>(
            r#"
            SELECT * FROM system_movements
            WHERE bank_account_id = $1
            ORDER BY movement_date DESC, created_at DESC
            "#,
        )
        .bind(bank_account_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(MovementRow::into_domain).collect()
    }

    // ------------------------------------------------------------------
    // Matching
    // ------------------------------------------------------------------

    /// Loads matcher candidates for settlements and movements
    ///
    /// `matched` reflects whether a live reconciliation links the item.
    pub async fn load_system_candidates(
        &self,
        settlement_ids: &[SettlementId],
        movement_ids: &[MovementId],
    ) -> Result<Vec<SystemCandidate>, DatabaseError> {
        let mut candidates = Vec::new();

        for id in settlement_ids {
            let row: Option<(Uuid, Decimal, String, bool)> = sqlx::query_as(
                r#"
                SELECT e.bank_account_id,
                       s.amount,
                       CASE WHEN e.kind = 'receivable' THEN 'credit' ELSE 'debit' END,
                       EXISTS (
                           SELECT 1 FROM reconciliation_system_items i
                           WHERE i.settlement_id = s.settlement_id
                       )
                FROM settlements s
                JOIN ledger_entries e ON e.entry_id = s.entry_id
                WHERE s.settlement_id = $1
                "#,
            )
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

            // Settlement direction follows the entry kind: money received
            // for receivables, money paid for payables
            let (bank_account, amount, direction, matched) =
                row.ok_or_else(|| DatabaseError::not_found("Settlement", id))?;
            candidates.push(SystemCandidate {
                reference: SystemItemRef::Settlement(*id),
                bank_account_id: BankAccountId::from(bank_account),
                amount,
                direction: text::direction(&direction)?,
                matched,
            });
        }

        for id in movement_ids {
            let row: Option<(Uuid, Decimal, String, bool)> = sqlx::query_as(
                r#"
                SELECT m.bank_account_id,
                       m.amount,
                       m.direction,
                       EXISTS (
                           SELECT 1 FROM reconciliation_system_items i
                           WHERE i.movement_id = m.movement_id
                       )
                FROM system_movements m
                WHERE m.movement_id = $1
                "#,
            )
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

            let (bank_account, amount, direction, matched) =
                row.ok_or_else(|| DatabaseError::not_found("SystemMovement", id))?;
            candidates.push(SystemCandidate {
                reference: SystemItemRef::Movement(*id),
                bank_account_id: BankAccountId::from(bank_account),
                amount,
                direction: text::direction(&direction)?,
                matched,
            });
        }

        Ok(candidates)
    }

    pub async fn load_statement_candidates(
        &self,
        entry_ids: &[StatementEntryId],
    ) -> Result<Vec<StatementCandidate>, DatabaseError> {
        let mut candidates = Vec::new();
        for id in entry_ids {
            let row: Option<(Uuid, Decimal, String, bool)> = sqlx::query_as(
                r#"
                SELECT e.bank_account_id,
                       e.amount,
                       e.direction,
                       EXISTS (
                           SELECT 1 FROM reconciliation_statement_items i
                           WHERE i.statement_entry_id = e.entry_id
                       )
                FROM statement_entries e
                WHERE e.entry_id = $1
                "#,
            )
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

            let (bank_account, amount, direction, matched) =
                row.ok_or_else(|| DatabaseError::not_found("StatementEntry", id))?;
            candidates.push(StatementCandidate {
                entry_id: *id,
                bank_account_id: BankAccountId::from(bank_account),
                amount,
                direction: text::direction(&direction)?,
                matched,
            });
        }
        Ok(candidates)
    }

    /// Persists a planned reconciliation and its links atomically
    pub async fn insert_reconciliation(
        &self,
        reconciliation: &Reconciliation,
        system: &[SystemCandidate],
        statement: &[StatementCandidate],
    ) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO reconciliations (
                reconciliation_id, bank_account_id, total_system,
                total_statement, difference, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(reconciliation.id.as_uuid())
        .bind(reconciliation.bank_account_id.as_uuid())
        .bind(reconciliation.total_system)
        .bind(reconciliation.total_statement)
        .bind(reconciliation.difference)
        .bind(reconciliation.created_at)
        .execute(&mut *tx)
        .await?;

        for candidate in system {
            let (settlement_id, movement_id) = match candidate.reference {
                SystemItemRef::Settlement(id) => (Some(*id.as_uuid()), None),
                SystemItemRef::Movement(id) => (None, Some(*id.as_uuid())),
            };
            sqlx::query(
                r#"
                INSERT INTO reconciliation_system_items (
                    reconciliation_id, settlement_id, movement_id, amount, direction
                ) VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(reconciliation.id.as_uuid())
            .bind(settlement_id)
            .bind(movement_id)
            .bind(candidate.amount)
            .bind(text::direction_str(candidate.direction))
            .execute(&mut *tx)
            .await?;
        }

        for candidate in statement {
            sqlx::query(
                r#"
                INSERT INTO reconciliation_statement_items (
                    reconciliation_id, statement_entry_id, amount, direction
                ) VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(reconciliation.id.as_uuid())
            .bind(candidate.entry_id.as_uuid())
            .bind(candidate.amount)
            .bind(text::direction_str(candidate.direction))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn list_reconciliations(
        &self,
        bank_account_id: BankAccountId,
    ) -> Result<Vec<Reconciliation>, DatabaseError> {
        let rows = sqlx::query_as::<_, ReconciliationRow>(
            r#"
            SELECT * FROM reconciliations
            WHERE bank_account_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(bank_account_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        let mut reconciliations = Vec::with_capacity(rows.len());
        for row in rows {
            reconciliations.push(self.hydrate(row).await?);
        }
        Ok(reconciliations)
    }

    pub async fn get_reconciliation(
        &self,
        id: ReconciliationId,
    ) -> Result<Reconciliation, DatabaseError> {
        let row = sqlx::query_as::<_, ReconciliationRow>(
            "SELECT * FROM reconciliations WHERE reconciliation_id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Reconciliation", id))?;
        self.hydrate(row).await
    }

    async fn hydrate(&self, row: ReconciliationRow) -> Result<Reconciliation, DatabaseError> {
        let system_rows = sqlx::query_as::<_, SystemItemRow>(
            r#"
            SELECT settlement_id, movement_id
            FROM reconciliation_system_items WHERE reconciliation_id = $1
            "#,
        )
        .bind(row.reconciliation_id)
        .fetch_all(&self.pool)
        .await?;

        let mut system_items = Vec::with_capacity(system_rows.len());
        for item in system_rows {
            let reference = match (item.settlement_id, item.movement_id) {
                (Some(id), None) => SystemItemRef::Settlement(SettlementId::from(id)),
                (None, Some(id)) => SystemItemRef::Movement(MovementId::from(id)),
                _ => {
                    return Err(DatabaseError::invalid_value(
                        "reconciliation_system_items",
                        "exactly one reference must be set",
                    ))
                }
            };
            system_items.push(reference);
        }

        let statement_rows: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT statement_entry_id
            FROM reconciliation_statement_items WHERE reconciliation_id = $1
            "#,
        )
        .bind(row.reconciliation_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Reconciliation {
            id: ReconciliationId::from(row.reconciliation_id),
            bank_account_id: BankAccountId::from(row.bank_account_id),
            total_system: row.total_system,
            total_statement: row.total_statement,
            difference: row.difference,
            system_items,
            statement_entries: statement_rows
                .into_iter()
                .map(|(id,)| StatementEntryId::from(id))
                .collect(),
            created_at: row.created_at,
        })
    }

    /// Reverses a reconciliation: deletes the link rows and the record
    ///
    /// Nothing else is touched; both sides become re-matchable because
    /// matched state is exactly the existence of these rows.
    pub async fn reverse_reconciliation(
        &self,
        id: ReconciliationId,
    ) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM reconciliation_system_items WHERE reconciliation_id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM reconciliation_statement_items WHERE reconciliation_id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM reconciliations WHERE reconciliation_id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Reconciliation", id));
        }

        tx.commit().await?;
        Ok(())
    }
}
