//! Ledger repository
//!
//! Database access for ledger entries, settlements, invoices and the
//! chart of accounts. Settlement registration and invoice persistence
//! are multi-row mutations and run inside a single transaction, keeping
//! the entry, its settlement rows and the dependent invoice status
//! consistent.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use core_kernel::{
    BankAccountId, ChartAccountId, ClientId, ConsultantId, EntryId, InvoiceId, InvoiceItemId,
    Money, Period, ProjectId, SettlementId, SupplierId,
};
use domain_ledger::{
    derive_payment_status, AccountStatus, ChartAccount, ChartTemplate, Counterparty, EntryKind,
    EntryStatus, Invoice, InvoiceItem, LedgerEntry, Settlement, SyncOutcome,
};

use crate::error::DatabaseError;
use crate::repositories::text;

/// Repository for the financial ledger
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: PgPool,
}

#[derive(Debug, FromRow)]
struct EntryRow {
    entry_id: Uuid,
    kind: String,
    document_number: String,
    description: String,
    issue_date: NaiveDate,
    due_date: NaiveDate,
    amount: Decimal,
    discount: Decimal,
    interest: Decimal,
    penalty: Decimal,
    currency: String,
    status: String,
    settlement_date: Option<NaiveDate>,
    payment_method: Option<String>,
    client_id: Option<Uuid>,
    supplier_id: Option<Uuid>,
    consultant_id: Option<Uuid>,
    invoice_id: Option<Uuid>,
    chart_account_id: Option<Uuid>,
    notes: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl EntryRow {
    fn into_domain(self) -> Result<LedgerEntry, DatabaseError> {
        let currency = text::currency(&self.currency)?;
        let counterparty = match (self.client_id, self.supplier_id) {
            (Some(client), None) => Counterparty::Client(ClientId::from(client)),
            (None, Some(supplier)) => Counterparty::Supplier(SupplierId::from(supplier)),
            _ => {
                return Err(DatabaseError::invalid_value(
                    "counterparty",
                    "exactly one of client_id/supplier_id must be set",
                ))
            }
        };
        let payment_method = self
            .payment_method
            .as_deref()
            .map(text::payment_method)
            .transpose()?;

        Ok(LedgerEntry {
            id: EntryId::from(self.entry_id),
            kind: text::entry_kind(&self.kind)?,
            document_number: self.document_number,
            description: self.description,
            issue_date: self.issue_date,
            due_date: self.due_date,
            amount: Money::new(self.amount, currency),
            discount: Money::new(self.discount, currency),
            interest: Money::new(self.interest, currency),
            penalty: Money::new(self.penalty, currency),
            status: text::entry_status(&self.status)?,
            settlement_date: self.settlement_date,
            payment_method,
            counterparty,
            consultant_id: self.consultant_id.map(ConsultantId::from),
            invoice_id: self.invoice_id.map(InvoiceId::from),
            chart_account_id: self.chart_account_id.map(ChartAccountId::from),
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct SettlementRow {
    settlement_id: Uuid,
    entry_id: Uuid,
    bank_account_id: Uuid,
    settlement_date: NaiveDate,
    amount: Decimal,
    currency: String,
    method: Option<String>,
    notes: String,
    created_at: DateTime<Utc>,
}

impl SettlementRow {
    fn into_domain(self) -> Result<Settlement, DatabaseError> {
        let currency = text::currency(&self.currency)?;
        Ok(Settlement {
            id: SettlementId::from(self.settlement_id),
            entry_id: EntryId::from(self.entry_id),
            bank_account_id: BankAccountId::from(self.bank_account_id),
            date: self.settlement_date,
            amount: Money::new(self.amount, currency),
            method: self.method.as_deref().map(text::payment_method).transpose()?,
            notes: self.notes,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct InvoiceRow {
    invoice_id: Uuid,
    number: String,
    client_id: Uuid,
    project_id: Option<Uuid>,
    period_start: NaiveDate,
    period_end: NaiveDate,
    total_hours: Decimal,
    total_value: Decimal,
    currency: String,
    payment_status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct InvoiceItemRow {
    item_id: Uuid,
    consultant_id: Uuid,
    description: String,
    hours: Decimal,
    hourly_rate: Decimal,
    total: Decimal,
    currency: String,
}

impl InvoiceItemRow {
    fn into_domain(self) -> Result<InvoiceItem, DatabaseError> {
        let currency = text::currency(&self.currency)?;
        Ok(InvoiceItem {
            id: InvoiceItemId::from(self.item_id),
            consultant_id: ConsultantId::from(self.consultant_id),
            description: self.description,
            hours: self.hours,
            hourly_rate: Money::new(self.hourly_rate, currency),
            total: Money::new(self.total, currency),
        })
    }
}

#[derive(Debug, FromRow)]
struct ChartAccountRow {
    chart_account_id: Uuid,
    code: String,
    description: String,
    level: i16,
    parent_code: Option<String>,
    account_type: String,
    nature: String,
    is_analytic: bool,
    status: String,
    dre_group: String,
    dre_subgroup: String,
    dre_order: i16,
    dre_sign: String,
}

impl ChartAccountRow {
    fn into_domain(self) -> Result<ChartAccount, DatabaseError> {
        Ok(ChartAccount {
            id: ChartAccountId::from(self.chart_account_id),
            code: self.code,
            description: self.description,
            level: self.level.max(0) as u8,
            parent_code: self.parent_code,
            account_type: text::account_type(&self.account_type)?,
            nature: text::nature(&self.nature)?,
            is_analytic: self.is_analytic,
            status: text::account_status(&self.status)?,
            dre_group: self.dre_group,
            dre_subgroup: self.dre_subgroup,
            dre_order: self.dre_order.max(0) as u16,
            dre_sign: text::dre_sign(&self.dre_sign)?,
        })
    }
}

impl LedgerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ------------------------------------------------------------------
    // Entries
    // ------------------------------------------------------------------

    pub async fn insert_entry(&self, entry: &LedgerEntry) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        Self::insert_entry_tx(&mut tx, entry).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn insert_entry_tx(
        tx: &mut Transaction<'_, Postgres>,
        entry: &LedgerEntry,
    ) -> Result<(), DatabaseError> {
        let (client_id, supplier_id) = match entry.counterparty {
            Counterparty::Client(id) => (Some(*id.as_uuid()), None),
            Counterparty::Supplier(id) => (None, Some(*id.as_uuid())),
        };
        sqlx::query(
            r#"
            INSERT INTO ledger_entries (
                entry_id, kind, document_number, description, issue_date, due_date,
                amount, discount, interest, penalty, currency, status,
                settlement_date, payment_method, client_id, supplier_id,
                consultant_id, invoice_id, chart_account_id, notes,
                created_at, updated_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                $13, $14, $15, $16, $17, $18, $19, $20, $21, $22
            )
            "#,
        )
        .bind(entry.id.as_uuid())
        .bind(text::entry_kind_str(entry.kind))
        .bind(&entry.document_number)
        .bind(&entry.description)
        .bind(entry.issue_date)
        .bind(entry.due_date)
        .bind(entry.amount.amount())
        .bind(entry.discount.amount())
        .bind(entry.interest.amount())
        .bind(entry.penalty.amount())
        .bind(entry.amount.currency().code())
        .bind(text::entry_status_str(entry.status))
        .bind(entry.settlement_date)
        .bind(entry.payment_method.map(text::payment_method_str))
        .bind(client_id)
        .bind(supplier_id)
        .bind(entry.consultant_id.map(|c| *c.as_uuid()))
        .bind(entry.invoice_id.map(|i| *i.as_uuid()))
        .bind(entry.chart_account_id.map(|c| *c.as_uuid()))
        .bind(&entry.notes)
        .bind(entry.created_at)
        .bind(entry.updated_at)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    pub async fn update_entry(&self, entry: &LedgerEntry) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        Self::update_entry_tx(&mut tx, entry).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn update_entry_tx(
        tx: &mut Transaction<'_, Postgres>,
        entry: &LedgerEntry,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE ledger_entries SET
                document_number = $2, description = $3, issue_date = $4, due_date = $5,
                amount = $6, discount = $7, interest = $8, penalty = $9,
                status = $10, settlement_date = $11, payment_method = $12,
                chart_account_id = $13, notes = $14, updated_at = $15
            WHERE entry_id = $1
            "#,
        )
        .bind(entry.id.as_uuid())
        .bind(&entry.document_number)
        .bind(&entry.description)
        .bind(entry.issue_date)
        .bind(entry.due_date)
        .bind(entry.amount.amount())
        .bind(entry.discount.amount())
        .bind(entry.interest.amount())
        .bind(entry.penalty.amount())
        .bind(text::entry_status_str(entry.status))
        .bind(entry.settlement_date)
        .bind(entry.payment_method.map(text::payment_method_str))
        .bind(entry.chart_account_id.map(|c| *c.as_uuid()))
        .bind(&entry.notes)
        .bind(entry.updated_at)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("LedgerEntry", entry.id));
        }
        Ok(())
    }

    pub async fn get_entry(&self, id: EntryId) -> Result<LedgerEntry, DatabaseError> {
        let row = sqlx::query_as::<_, EntryRow>(
            "SELECT * FROM ledger_entries WHERE entry_id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("LedgerEntry", id))?;
        row.into_domain()
    }

    /// Lists entries of a kind, optionally filtered by status
    pub async fn list_entries(
        &self,
        kind: EntryKind,
        status: Option<EntryStatus>,
    ) -> Result<Vec<LedgerEntry>, DatabaseError> {
        let rows = match status {
            Some(status) => {
                sqlx::query_as::<_, EntryRow>(
                    r#"
                    SELECT * FROM ledger_entries
                    WHERE kind = $1 AND status = $2
                    ORDER BY due_date, created_at
                    "#,
                )
                .bind(text::entry_kind_str(kind))
                .bind(text::entry_status_str(status))
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, EntryRow>(
                    r#"
                    SELECT * FROM ledger_entries
                    WHERE kind = $1
                    ORDER BY due_date, created_at
                    "#,
                )
                .bind(text::entry_kind_str(kind))
                .fetch_all(&self.pool)
                .await?
            }
        };
        rows.into_iter().map(EntryRow::into_domain).collect()
    }

    pub async fn list_settlements(&self, entry_id: EntryId) -> Result<Vec<Settlement>, DatabaseError> {
        let rows = sqlx::query_as::<_, SettlementRow>(
            r#"
            SELECT * FROM settlements
            WHERE entry_id = $1
            ORDER BY settlement_date, created_at
            "#,
        )
        .bind(entry_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(SettlementRow::into_domain).collect()
    }

    /// Persists a settlement together with the already-updated entry,
    /// then re-derives the dependent invoice's payment status
    ///
    /// The caller runs the domain logic (`apply_settlements`) first;
    /// this method makes the result durable atomically.
    pub async fn add_settlement(
        &self,
        settlement: &Settlement,
        entry: &LedgerEntry,
    ) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO settlements (
                settlement_id, entry_id, bank_account_id, settlement_date,
                amount, currency, method, notes, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(settlement.id.as_uuid())
        .bind(settlement.entry_id.as_uuid())
        .bind(settlement.bank_account_id.as_uuid())
        .bind(settlement.date)
        .bind(settlement.amount.amount())
        .bind(settlement.amount.currency().code())
        .bind(settlement.method.map(text::payment_method_str))
        .bind(&settlement.notes)
        .bind(settlement.created_at)
        .execute(&mut *tx)
        .await?;

        Self::update_entry_tx(&mut tx, entry).await?;

        // Receivable settled: cascade to the invoice's payment status
        if entry.kind == EntryKind::Receivable {
            if let Some(invoice_id) = entry.invoice_id {
                Self::sync_invoice_payment_status_tx(&mut tx, invoice_id, true).await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Invoices
    // ------------------------------------------------------------------

    pub async fn insert_invoice(&self, invoice: &Invoice) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        Self::insert_invoice_tx(&mut tx, invoice).await?;
        tx.commit().await?;
        Ok(())
    }

    pub(crate) async fn insert_invoice_tx(
        tx: &mut Transaction<'_, Postgres>,
        invoice: &Invoice,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO invoices (
                invoice_id, number, client_id, project_id, period_start, period_end,
                total_hours, total_value, currency, payment_status, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(invoice.id.as_uuid())
        .bind(&invoice.number)
        .bind(invoice.client_id.as_uuid())
        .bind(invoice.project_id.map(|p| *p.as_uuid()))
        .bind(invoice.period.start())
        .bind(invoice.period.end())
        .bind(invoice.total_hours)
        .bind(invoice.total_value.amount())
        .bind(invoice.total_value.currency().code())
        .bind(text::invoice_payment_status_str(invoice.payment_status))
        .bind(invoice.created_at)
        .bind(invoice.updated_at)
        .execute(&mut **tx)
        .await?;

        for item in &invoice.items {
            sqlx::query(
                r#"
                INSERT INTO invoice_items (
                    item_id, invoice_id, consultant_id, description,
                    hours, hourly_rate, total, currency
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(item.id.as_uuid())
            .bind(invoice.id.as_uuid())
            .bind(item.consultant_id.as_uuid())
            .bind(&item.description)
            .bind(item.hours)
            .bind(item.hourly_rate.amount())
            .bind(item.total.amount())
            .bind(item.total.currency().code())
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    pub async fn get_invoice(&self, id: InvoiceId) -> Result<Invoice, DatabaseError> {
        let row = sqlx::query_as::<_, InvoiceRow>(
            "SELECT * FROM invoices WHERE invoice_id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Invoice", id))?;
        self.hydrate_invoice(row).await
    }

    pub async fn list_invoices(&self) -> Result<Vec<Invoice>, DatabaseError> {
        let rows = sqlx::query_as::<_, InvoiceRow>(
            "SELECT * FROM invoices ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut invoices = Vec::with_capacity(rows.len());
        for row in rows {
            invoices.push(self.hydrate_invoice(row).await?);
        }
        Ok(invoices)
    }

    async fn hydrate_invoice(&self, row: InvoiceRow) -> Result<Invoice, DatabaseError> {
        let items = sqlx::query_as::<_, InvoiceItemRow>(
            r#"
            SELECT item_id, consultant_id, description, hours, hourly_rate, total, currency
            FROM invoice_items WHERE invoice_id = $1 ORDER BY created_at
            "#,
        )
        .bind(row.invoice_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(InvoiceItemRow::into_domain)
        .collect::<Result<Vec<_>, _>>()?;

        let currency = text::currency(&row.currency)?;
        let period = Period::new(row.period_start, row.period_end)
            .map_err(|e| DatabaseError::invalid_value("period", e))?;

        Ok(Invoice {
            id: InvoiceId::from(row.invoice_id),
            number: row.number,
            client_id: ClientId::from(row.client_id),
            project_id: row.project_id.map(ProjectId::from),
            period,
            total_hours: row.total_hours,
            total_value: Money::new(row.total_value, currency),
            payment_status: text::invoice_payment_status(&row.payment_status)?,
            items,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    /// Statuses of the receivables financing an invoice
    pub async fn receivable_statuses(
        &self,
        invoice_id: InvoiceId,
    ) -> Result<Vec<EntryStatus>, DatabaseError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT status FROM ledger_entries
            WHERE invoice_id = $1 AND kind = 'receivable'
            "#,
        )
        .bind(invoice_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(|(s,)| text::entry_status(s)).collect()
    }

    /// Re-derives one invoice's payment status; returns true when changed
    pub async fn sync_invoice_payment_status(
        &self,
        invoice_id: InvoiceId,
        commit: bool,
    ) -> Result<bool, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let changed = Self::sync_invoice_payment_status_tx(&mut tx, invoice_id, commit).await?;
        tx.commit().await?;
        Ok(changed)
    }

    async fn sync_invoice_payment_status_tx(
        tx: &mut Transaction<'_, Postgres>,
        invoice_id: InvoiceId,
        commit: bool,
    ) -> Result<bool, DatabaseError> {
        let current: Option<(String,)> = sqlx::query_as(
            "SELECT payment_status FROM invoices WHERE invoice_id = $1",
        )
        .bind(invoice_id.as_uuid())
        .fetch_optional(&mut **tx)
        .await?;
        let current = match current {
            Some((status,)) => text::invoice_payment_status(&status)?,
            None => return Err(DatabaseError::not_found("Invoice", invoice_id)),
        };

        let statuses: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT status FROM ledger_entries
            WHERE invoice_id = $1 AND kind = 'receivable'
            "#,
        )
        .bind(invoice_id.as_uuid())
        .fetch_all(&mut **tx)
        .await?;
        let statuses = statuses
            .iter()
            .map(|(s,)| text::entry_status(s))
            .collect::<Result<Vec<_>, _>>()?;

        let derived = derive_payment_status(&statuses);
        if derived == current {
            return Ok(false);
        }
        if commit {
            sqlx::query(
                "UPDATE invoices SET payment_status = $2, updated_at = $3 WHERE invoice_id = $1",
            )
            .bind(invoice_id.as_uuid())
            .bind(text::invoice_payment_status_str(derived))
            .bind(Utc::now())
            .execute(&mut **tx)
            .await?;
        }
        Ok(true)
    }

    /// Bulk payment-status sync over every invoice
    ///
    /// Mirrors the periodic maintenance job; dry-run counts without
    /// writing.
    pub async fn sync_all_invoice_payment_statuses(
        &self,
        commit: bool,
    ) -> Result<SyncOutcome, DatabaseError> {
        let ids: Vec<(Uuid,)> = sqlx::query_as("SELECT invoice_id FROM invoices ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;

        let mut outcome = SyncOutcome::default();
        for (id,) in ids {
            outcome.total += 1;
            let changed = self
                .sync_invoice_payment_status(InvoiceId::from(id), commit)
                .await?;
            if changed {
                outcome.updated += 1;
            } else {
                outcome.unchanged += 1;
            }
        }
        Ok(outcome)
    }

    // ------------------------------------------------------------------
    // Chart of accounts
    // ------------------------------------------------------------------

    /// Persists an imported chart template, replacing its accounts
    pub async fn replace_chart_template(
        &self,
        template: &ChartTemplate,
    ) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM chart_accounts WHERE template = $1")
            .bind(&template.name)
            .execute(&mut *tx)
            .await?;

        for account in template.accounts() {
            sqlx::query(
                r#"
                INSERT INTO chart_accounts (
                    chart_account_id, template, code, description, level, parent_code,
                    account_type, nature, is_analytic, status,
                    dre_group, dre_subgroup, dre_order, dre_sign
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
                "#,
            )
            .bind(account.id.as_uuid())
            .bind(&template.name)
            .bind(&account.code)
            .bind(&account.description)
            .bind(account.level as i16)
            .bind(&account.parent_code)
            .bind(text::account_type_str(account.account_type))
            .bind(text::nature_str(account.nature))
            .bind(account.is_analytic)
            .bind(text::account_status_str(account.status))
            .bind(&account.dre_group)
            .bind(&account.dre_subgroup)
            .bind(account.dre_order as i16)
            .bind(text::dre_sign_str(account.dre_sign))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn list_chart_accounts(
        &self,
        template: &str,
    ) -> Result<Vec<ChartAccount>, DatabaseError> {
        let rows = sqlx::query_as::<_, ChartAccountRow>(
            r#"
            SELECT chart_account_id, code, description, level, parent_code,
                   account_type, nature, is_analytic, status,
                   dre_group, dre_subgroup, dre_order, dre_sign
            FROM chart_accounts WHERE template = $1 ORDER BY code
            "#,
        )
        .bind(template)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(ChartAccountRow::into_domain).collect()
    }

    /// Active analytic accounts are the only valid classifications
    pub async fn get_active_chart_account(
        &self,
        id: ChartAccountId,
    ) -> Result<ChartAccount, DatabaseError> {
        let row = sqlx::query_as::<_, ChartAccountRow>(
            r#"
            SELECT chart_account_id, code, description, level, parent_code,
                   account_type, nature, is_analytic, status,
                   dre_group, dre_subgroup, dre_order, dre_sign
            FROM chart_accounts WHERE chart_account_id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("ChartAccount", id))?;

        let account = row.into_domain()?;
        if account.status != AccountStatus::Active {
            return Err(DatabaseError::ConstraintViolation(format!(
                "chart account {} is not active",
                account.code
            )));
        }
        Ok(account)
    }
}
