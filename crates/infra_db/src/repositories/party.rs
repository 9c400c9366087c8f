//! Party repository
//!
//! Database access for clients, suppliers, consultants, rates, and
//! company bank accounts.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use core_kernel::{BankAccountId, ClientId, ConsultantId, Money, SupplierId};
use domain_party::{
    Client, CompanyBankAccount, Consultant, ConsultantRate, RateTable, Supplier, TaxId,
};

use crate::error::DatabaseError;
use crate::repositories::text;

/// Repository for party records
#[derive(Debug, Clone)]
pub struct PartyRepository {
    pool: PgPool,
}

#[derive(Debug, FromRow)]
struct ClientRow {
    client_id: Uuid,
    legal_name: String,
    trade_name: String,
    tax_id: String,
    payment_term_days: i32,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ClientRow {
    fn into_domain(self) -> Result<Client, DatabaseError> {
        Ok(Client {
            id: ClientId::from(self.client_id),
            legal_name: self.legal_name,
            trade_name: self.trade_name,
            tax_id: TaxId::parse(&self.tax_id)
                .map_err(|e| DatabaseError::invalid_value("tax_id", e))?,
            payment_term_days: self.payment_term_days.max(0) as u32,
            status: text::party_status(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct SupplierRow {
    supplier_id: Uuid,
    legal_name: String,
    trade_name: String,
    tax_id: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SupplierRow {
    fn into_domain(self) -> Result<Supplier, DatabaseError> {
        Ok(Supplier {
            id: SupplierId::from(self.supplier_id),
            legal_name: self.legal_name,
            trade_name: self.trade_name,
            tax_id: TaxId::parse(&self.tax_id)
                .map_err(|e| DatabaseError::invalid_value("tax_id", e))?,
            status: text::party_status(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ConsultantRow {
    consultant_id: Uuid,
    name: String,
    email: String,
    consultant_type: String,
    supplier_id: Option<Uuid>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ConsultantRow {
    fn into_domain(self) -> Result<Consultant, DatabaseError> {
        Ok(Consultant {
            id: ConsultantId::from(self.consultant_id),
            name: self.name,
            email: self.email,
            consultant_type: text::consultant_type(&self.consultant_type)?,
            supplier_id: self.supplier_id.map(SupplierId::from),
            status: text::party_status(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct RateRow {
    consultant_id: Uuid,
    effective_from: NaiveDate,
    hourly_rate: Decimal,
}

#[derive(Debug, FromRow)]
struct BankAccountRow {
    bank_account_id: Uuid,
    label: String,
    bank_code: String,
    branch: String,
    account_number: String,
    holder_type: String,
    active: bool,
    created_at: DateTime<Utc>,
}

impl BankAccountRow {
    fn into_domain(self) -> Result<CompanyBankAccount, DatabaseError> {
        Ok(CompanyBankAccount {
            id: BankAccountId::from(self.bank_account_id),
            label: self.label,
            bank_code: self.bank_code,
            branch: self.branch,
            account_number: self.account_number,
            holder_type: text::holder_type(&self.holder_type)?,
            active: self.active,
            created_at: self.created_at,
        })
    }
}

impl PartyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert_client(&self, client: &Client) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO clients (
                client_id, legal_name, trade_name, tax_id,
                payment_term_days, status, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(client.id.as_uuid())
        .bind(&client.legal_name)
        .bind(&client.trade_name)
        .bind(client.tax_id.digits())
        .bind(client.payment_term_days as i32)
        .bind(text::party_status_str(client.status))
        .bind(client.created_at)
        .bind(client.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_client(&self, id: ClientId) -> Result<Client, DatabaseError> {
        let row = sqlx::query_as::<_, ClientRow>(
            "SELECT * FROM clients WHERE client_id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Client", id))?;
        row.into_domain()
    }

    pub async fn list_clients(&self) -> Result<Vec<Client>, DatabaseError> {
        let rows = sqlx::query_as::<_, ClientRow>(
            "SELECT * FROM clients ORDER BY trade_name",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(ClientRow::into_domain).collect()
    }

    pub async fn insert_supplier(&self, supplier: &Supplier) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO suppliers (
                supplier_id, legal_name, trade_name, tax_id,
                status, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(supplier.id.as_uuid())
        .bind(&supplier.legal_name)
        .bind(&supplier.trade_name)
        .bind(supplier.tax_id.digits())
        .bind(text::party_status_str(supplier.status))
        .bind(supplier.created_at)
        .bind(supplier.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn list_suppliers(&self) -> Result<Vec<Supplier>, DatabaseError> {
        let rows = sqlx::query_as::<_, SupplierRow>(
            "SELECT * FROM suppliers ORDER BY trade_name",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(SupplierRow::into_domain).collect()
    }

    pub async fn insert_consultant(&self, consultant: &Consultant) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO consultants (
                consultant_id, name, email, consultant_type,
                supplier_id, status, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(consultant.id.as_uuid())
        .bind(&consultant.name)
        .bind(&consultant.email)
        .bind(text::consultant_type_str(consultant.consultant_type))
        .bind(consultant.supplier_id.map(|s| *s.as_uuid()))
        .bind(text::party_status_str(consultant.status))
        .bind(consultant.created_at)
        .bind(consultant.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_consultant(&self, id: ConsultantId) -> Result<Consultant, DatabaseError> {
        let row = sqlx::query_as::<_, ConsultantRow>(
            "SELECT * FROM consultants WHERE consultant_id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Consultant", id))?;
        row.into_domain()
    }

    pub async fn list_consultants(&self) -> Result<Vec<Consultant>, DatabaseError> {
        let rows = sqlx::query_as::<_, ConsultantRow>(
            "SELECT * FROM consultants ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(ConsultantRow::into_domain).collect()
    }

    pub async fn insert_rate(&self, rate: &ConsultantRate) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO consultant_rates (consultant_id, effective_from, hourly_rate, currency)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(rate.consultant_id.as_uuid())
        .bind(rate.effective_from)
        .bind(rate.hourly_rate.amount())
        .bind(rate.hourly_rate.currency().code())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Loads every rate into an in-memory table for closure pricing
    pub async fn load_rate_table(&self) -> Result<RateTable, DatabaseError> {
        let rows = sqlx::query_as::<_, RateRow>(
            "SELECT consultant_id, effective_from, hourly_rate FROM consultant_rates",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut table = RateTable::new();
        for row in rows {
            table
                .add(ConsultantRate {
                    consultant_id: ConsultantId::from(row.consultant_id),
                    effective_from: row.effective_from,
                    hourly_rate: Money::brl(row.hourly_rate),
                })
                .map_err(|e| DatabaseError::invalid_value("consultant_rates", e))?;
        }
        Ok(table)
    }

    pub async fn insert_bank_account(
        &self,
        account: &CompanyBankAccount,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO bank_accounts (
                bank_account_id, label, bank_code, branch,
                account_number, holder_type, active, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(account.id.as_uuid())
        .bind(&account.label)
        .bind(&account.bank_code)
        .bind(&account.branch)
        .bind(&account.account_number)
        .bind(text::holder_type_str(account.holder_type))
        .bind(account.active)
        .bind(account.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_bank_account(
        &self,
        id: BankAccountId,
    ) -> Result<CompanyBankAccount, DatabaseError> {
        let row = sqlx::query_as::<_, BankAccountRow>(
            "SELECT * FROM bank_accounts WHERE bank_account_id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("BankAccount", id))?;
        row.into_domain()
    }

    pub async fn list_bank_accounts(&self) -> Result<Vec<CompanyBankAccount>, DatabaseError> {
        let rows = sqlx::query_as::<_, BankAccountRow>(
            "SELECT * FROM bank_accounts ORDER BY label",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(BankAccountRow::into_domain).collect()
    }
}
