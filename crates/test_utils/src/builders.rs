//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible
//! defaults. These builders allow tests to specify only the relevant
//! fields while using defaults for everything else.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{
    ActivityId, BankAccountId, ClientId, ConsultantId, Money, ProjectId, StatementEntryId,
    StatementImportId, SupplierId,
};
use domain_billing::TimeRecord;
use domain_ledger::{Counterparty, EntryKind, LedgerEntry};
use domain_reconciliation::{Direction, StatementEntry};

use crate::fixtures::TemporalFixtures;

/// Builder for ledger entries
pub struct LedgerEntryBuilder {
    kind: EntryKind,
    document_number: String,
    description: String,
    counterparty: Counterparty,
    amount: Money,
    discount: Option<Money>,
    interest: Option<Money>,
    penalty: Option<Money>,
    issue_date: NaiveDate,
    due_date: NaiveDate,
}

impl LedgerEntryBuilder {
    /// A receivable against a fresh client, due at month end
    pub fn receivable() -> Self {
        Self {
            kind: EntryKind::Receivable,
            document_number: "NF-1001".to_string(),
            description: "Consulting services".to_string(),
            counterparty: Counterparty::Client(ClientId::new()),
            amount: Money::brl(dec!(1000.00)),
            discount: None,
            interest: None,
            penalty: None,
            issue_date: TemporalFixtures::month_start(),
            due_date: TemporalFixtures::month_end(),
        }
    }

    /// A payable to a fresh supplier, due at month end
    pub fn payable() -> Self {
        Self {
            counterparty: Counterparty::Supplier(SupplierId::new()),
            kind: EntryKind::Payable,
            document_number: "DOC-2001".to_string(),
            ..Self::receivable()
        }
    }

    pub fn with_document_number(mut self, number: impl Into<String>) -> Self {
        self.document_number = number.into();
        self
    }

    pub fn with_counterparty(mut self, counterparty: Counterparty) -> Self {
        self.counterparty = counterparty;
        self
    }

    pub fn with_amount(mut self, amount: Money) -> Self {
        self.amount = amount;
        self
    }

    pub fn with_discount(mut self, discount: Money) -> Self {
        self.discount = Some(discount);
        self
    }

    pub fn with_interest(mut self, interest: Money) -> Self {
        self.interest = Some(interest);
        self
    }

    pub fn with_penalty(mut self, penalty: Money) -> Self {
        self.penalty = Some(penalty);
        self
    }

    pub fn with_dates(mut self, issue: NaiveDate, due: NaiveDate) -> Self {
        self.issue_date = issue;
        self.due_date = due;
        self
    }

    pub fn build(self) -> LedgerEntry {
        let mut entry = LedgerEntry::new(
            self.kind,
            self.document_number,
            self.description,
            self.counterparty,
            self.amount,
            self.issue_date,
            self.due_date,
        );
        if let Some(discount) = self.discount {
            entry = entry.with_discount(discount);
        }
        if let Some(interest) = self.interest {
            entry = entry.with_interest(interest);
        }
        if let Some(penalty) = self.penalty {
            entry = entry.with_penalty(penalty);
        }
        entry
    }
}

/// Builder for approved daily time records
pub struct TimeRecordBuilder {
    client_id: ClientId,
    consultant_id: ConsultantId,
    project_id: ProjectId,
    day: NaiveDate,
    hours: Decimal,
    approved: bool,
}

impl TimeRecordBuilder {
    pub fn new(client_id: ClientId, consultant_id: ConsultantId) -> Self {
        Self {
            client_id,
            consultant_id,
            project_id: ProjectId::new(),
            day: TemporalFixtures::mid_month(),
            hours: dec!(8),
            approved: true,
        }
    }

    pub fn with_project(mut self, project_id: ProjectId) -> Self {
        self.project_id = project_id;
        self
    }

    pub fn on_day(mut self, day: NaiveDate) -> Self {
        self.day = day;
        self
    }

    pub fn with_hours(mut self, hours: Decimal) -> Self {
        self.hours = hours;
        self
    }

    pub fn pending(mut self) -> Self {
        self.approved = false;
        self
    }

    pub fn build(self) -> TimeRecord {
        let mut record = TimeRecord::daily(
            ActivityId::new(),
            self.project_id,
            self.client_id,
            self.consultant_id,
            self.day,
            self.hours,
        );
        if self.approved {
            record.approve("manager").unwrap();
        }
        record
    }
}

/// Builder for statement entries
pub struct StatementEntryBuilder {
    bank_account_id: BankAccountId,
    posted_at: NaiveDate,
    amount: Money,
    direction: Direction,
    fit_id: String,
}

impl StatementEntryBuilder {
    pub fn credit(bank_account_id: BankAccountId, amount: Money) -> Self {
        Self {
            bank_account_id,
            posted_at: TemporalFixtures::mid_month(),
            amount,
            direction: Direction::Credit,
            fit_id: "FIT-001".to_string(),
        }
    }

    pub fn debit(bank_account_id: BankAccountId, amount: Money) -> Self {
        Self {
            direction: Direction::Debit,
            ..Self::credit(bank_account_id, amount)
        }
    }

    pub fn posted_on(mut self, day: NaiveDate) -> Self {
        self.posted_at = day;
        self
    }

    pub fn with_fit_id(mut self, fit_id: impl Into<String>) -> Self {
        self.fit_id = fit_id.into();
        self
    }

    pub fn build(self) -> StatementEntry {
        StatementEntry {
            id: StatementEntryId::new_v7(),
            import_id: StatementImportId::new(),
            bank_account_id: self.bank_account_id,
            posted_at: self.posted_at,
            amount: self.amount,
            direction: self.direction,
            fit_id: self.fit_id,
            trn_type: "OTHER".to_string(),
            name: String::new(),
            memo: String::new(),
            check_number: String::new(),
            created_at: chrono::Utc::now(),
        }
    }
}
