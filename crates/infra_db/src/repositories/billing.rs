//! Billing repository
//!
//! Database access for time records and billing closure persistence.
//! A closure run writes the invoice, its items, the receivable, the
//! payable and the time-record links in one transaction: either the
//! whole group is billed or none of it is.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use core_kernel::{
    ActivityId, ClientId, ConsultantId, InvoiceId, ProjectId, TimeRecordId,
};
use domain_billing::{ClosureFilter, ClosureGroup, TimeRecord, WeekHours};

use crate::error::DatabaseError;
use crate::repositories::ledger::LedgerRepository;
use crate::repositories::text;

/// Repository for time records and closures
#[derive(Debug, Clone)]
pub struct BillingRepository {
    pool: PgPool,
}

#[derive(Debug, FromRow)]
struct TimeRecordRow {
    record_id: Uuid,
    activity_id: Uuid,
    project_id: Uuid,
    client_id: Uuid,
    consultant_id: Uuid,
    kind: String,
    status: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    hours: Option<Decimal>,
    hours_monday: Option<Decimal>,
    hours_tuesday: Option<Decimal>,
    hours_wednesday: Option<Decimal>,
    hours_thursday: Option<Decimal>,
    hours_friday: Option<Decimal>,
    hours_saturday: Option<Decimal>,
    hours_sunday: Option<Decimal>,
    total_hours: Decimal,
    description: String,
    rejection_reason: String,
    reviewed_by: Option<String>,
    reviewed_at: Option<DateTime<Utc>>,
    invoice_id: Option<Uuid>,
    invoice_number: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TimeRecordRow {
    fn into_domain(self) -> Result<TimeRecord, DatabaseError> {
        Ok(TimeRecord {
            id: TimeRecordId::from(self.record_id),
            activity_id: ActivityId::from(self.activity_id),
            project_id: ProjectId::from(self.project_id),
            client_id: ClientId::from(self.client_id),
            consultant_id: ConsultantId::from(self.consultant_id),
            kind: text::time_record_kind(&self.kind)?,
            status: text::time_record_status(&self.status)?,
            start_date: self.start_date,
            end_date: self.end_date,
            hours: self.hours,
            week_hours: WeekHours {
                monday: self.hours_monday,
                tuesday: self.hours_tuesday,
                wednesday: self.hours_wednesday,
                thursday: self.hours_thursday,
                friday: self.hours_friday,
                saturday: self.hours_saturday,
                sunday: self.hours_sunday,
            },
            total_hours: self.total_hours,
            description: self.description,
            rejection_reason: self.rejection_reason,
            reviewed_by: self.reviewed_by,
            reviewed_at: self.reviewed_at,
            invoice_id: self.invoice_id.map(InvoiceId::from),
            invoice_number: self.invoice_number,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl BillingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert_time_record(&self, record: &TimeRecord) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO time_records (
                record_id, activity_id, project_id, client_id, consultant_id,
                kind, status, start_date, end_date, hours,
                hours_monday, hours_tuesday, hours_wednesday, hours_thursday,
                hours_friday, hours_saturday, hours_sunday,
                total_hours, description, rejection_reason,
                reviewed_by, reviewed_at, invoice_id, invoice_number,
                created_at, updated_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                $11, $12, $13, $14, $15, $16, $17,
                $18, $19, $20, $21, $22, $23, $24, $25, $26
            )
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.activity_id.as_uuid())
        .bind(record.project_id.as_uuid())
        .bind(record.client_id.as_uuid())
        .bind(record.consultant_id.as_uuid())
        .bind(text::time_record_kind_str(record.kind))
        .bind(text::time_record_status_str(record.status))
        .bind(record.start_date)
        .bind(record.end_date)
        .bind(record.hours)
        .bind(record.week_hours.monday)
        .bind(record.week_hours.tuesday)
        .bind(record.week_hours.wednesday)
        .bind(record.week_hours.thursday)
        .bind(record.week_hours.friday)
        .bind(record.week_hours.saturday)
        .bind(record.week_hours.sunday)
        .bind(record.total_hours)
        .bind(&record.description)
        .bind(&record.rejection_reason)
        .bind(&record.reviewed_by)
        .bind(record.reviewed_at)
        .bind(record.invoice_id.map(|i| *i.as_uuid()))
        .bind(&record.invoice_number)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn update_time_record(&self, record: &TimeRecord) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE time_records SET
                status = $2, hours = $3,
                hours_monday = $4, hours_tuesday = $5, hours_wednesday = $6,
                hours_thursday = $7, hours_friday = $8, hours_saturday = $9,
                hours_sunday = $10, total_hours = $11, description = $12,
                rejection_reason = $13, reviewed_by = $14, reviewed_at = $15,
                invoice_id = $16, invoice_number = $17, updated_at = $18
            WHERE record_id = $1
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(text::time_record_status_str(record.status))
        .bind(record.hours)
        .bind(record.week_hours.monday)
        .bind(record.week_hours.tuesday)
        .bind(record.week_hours.wednesday)
        .bind(record.week_hours.thursday)
        .bind(record.week_hours.friday)
        .bind(record.week_hours.saturday)
        .bind(record.week_hours.sunday)
        .bind(record.total_hours)
        .bind(&record.description)
        .bind(&record.rejection_reason)
        .bind(&record.reviewed_by)
        .bind(record.reviewed_at)
        .bind(record.invoice_id.map(|i| *i.as_uuid()))
        .bind(&record.invoice_number)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("TimeRecord", record.id));
        }
        Ok(())
    }

    pub async fn get_time_record(&self, id: TimeRecordId) -> Result<TimeRecord, DatabaseError> {
        let row = sqlx::query_as::<_, TimeRecordRow>(
            "SELECT * FROM time_records WHERE record_id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("TimeRecord", id))?;
        row.into_domain()
    }

    pub async fn list_time_records(
        &self,
        consultant_id: Option<ConsultantId>,
    ) -> Result<Vec<TimeRecord>, DatabaseError> {
        let rows = match consultant_id {
            Some(id) => {
                sqlx::query_as::<_, TimeRecordRow>(
                    r#"
                    SELECT * FROM time_records
                    WHERE consultant_id = $1
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(id.as_uuid())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, TimeRecordRow>(
                    "SELECT * FROM time_records ORDER BY created_at DESC",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        rows.into_iter().map(TimeRecordRow::into_domain).collect()
    }

    /// Approved, unbilled records matching the closure filter
    ///
    /// The domain aggregator re-applies the filter; this query just
    /// narrows the candidate set.
    pub async fn load_billable_records(
        &self,
        filter: &ClosureFilter,
    ) -> Result<Vec<TimeRecord>, DatabaseError> {
        let rows = sqlx::query_as::<_, TimeRecordRow>(
            r#"
            SELECT * FROM time_records
            WHERE status = 'approved'
              AND invoice_id IS NULL
              AND start_date BETWEEN $1 AND $2
            ORDER BY consultant_id, start_date
            "#,
        )
        .bind(filter.period.start())
        .bind(filter.period.end())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TimeRecordRow::into_domain).collect()
    }

    /// Next invoice sequence number for the month, e.g. 3 when
    /// FAT-202501-002 is the highest issued
    pub async fn next_invoice_sequence(&self, year_month: &str) -> Result<u32, DatabaseError> {
        let prefix = format!("FAT-{year_month}-%");
        let row: Option<(Option<String>,)> = sqlx::query_as(
            "SELECT MAX(number) FROM invoices WHERE number LIKE $1",
        )
        .bind(&prefix)
        .fetch_optional(&self.pool)
        .await?;

        let max_number = row.and_then(|(n,)| n);
        let next = match max_number {
            Some(number) => number
                .rsplit('-')
                .next()
                .and_then(|seq| seq.parse::<u32>().ok())
                .map(|n| n + 1)
                .unwrap_or(1),
            None => 1,
        };
        Ok(next)
    }

    /// Persists one closure group atomically
    ///
    /// Invoice + items + receivable + payable + record links commit or
    /// roll back together.
    pub async fn persist_closure_group(&self, group: &ClosureGroup) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        LedgerRepository::insert_invoice_tx(&mut tx, &group.invoice).await?;

        for entry in [&group.receivable, &group.payable] {
            let (client_id, supplier_id) = match entry.counterparty {
                domain_ledger::Counterparty::Client(id) => (Some(*id.as_uuid()), None),
                domain_ledger::Counterparty::Supplier(id) => (None, Some(*id.as_uuid())),
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
            .execute(&mut *tx)
            .await?;
        }

        for record_id in &group.time_records {
            let result = sqlx::query(
                r#"
                UPDATE time_records
                SET invoice_id = $2, invoice_number = $3, updated_at = $4
                WHERE record_id = $1 AND invoice_id IS NULL
                "#,
            )
            .bind(record_id.as_uuid())
            .bind(group.invoice.id.as_uuid())
            .bind(&group.invoice.number)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

            // A record billed by a concurrent closure aborts the group
            if result.rows_affected() == 0 {
                return Err(DatabaseError::ConstraintViolation(format!(
                    "time record {record_id} is no longer billable"
                )));
            }
        }

        tx.commit().await?;
        Ok(())
    }
}
