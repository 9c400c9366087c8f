//! Billing closure
//!
//! The closure run turns approved, unbilled time records inside a period
//! into money: grouped by client and consultant, each group emits one
//! invoice with a line item per time record, one receivable against the
//! client, and one payable to the consultant's supplier. The consumed
//! records are attached to their invoice so a record is never billed
//! twice.
//!
//! Emitted entries carry the configured revenue and cost
//! classifications; a closure with eligible records and no
//! classification configured fails before emitting anything.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use core_kernel::{ChartAccountId, ClientId, ConsultantId, Period, ProjectId, TimeRecordId};
use domain_ledger::{Counterparty, EntryKind, Invoice, InvoiceItem, LedgerEntry};
use domain_party::{Client, Consultant, RateTable};

use crate::error::BillingError;
use crate::time_record::TimeRecord;

/// Selection filters for a closure run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosureFilter {
    pub period: Period,
    pub client_id: Option<ClientId>,
    pub project_id: Option<ProjectId>,
    pub consultant_id: Option<ConsultantId>,
}

impl ClosureFilter {
    pub fn for_period(period: Period) -> Self {
        Self {
            period,
            client_id: None,
            project_id: None,
            consultant_id: None,
        }
    }

    fn selects(&self, record: &TimeRecord) -> bool {
        if !record.is_billable() {
            return false;
        }
        if !self.period.contains(record.start_date) {
            return false;
        }
        if let Some(client) = self.client_id {
            if record.client_id != client {
                return false;
            }
        }
        if let Some(project) = self.project_id {
            if record.project_id != project {
                return false;
            }
        }
        if let Some(consultant) = self.consultant_id {
            if record.consultant_id != consultant {
                return false;
            }
        }
        true
    }
}

/// Monthly invoice number sequence: FAT-YYYYMM-NNN
///
/// The repository seeds `next` from the highest sequence already issued
/// for the month.
#[derive(Debug, Clone)]
pub struct InvoiceNumberSequence {
    year_month: String,
    next: u32,
}

impl InvoiceNumberSequence {
    pub fn new(reference: NaiveDate, next: u32) -> Self {
        Self {
            year_month: reference.format("%Y%m").to_string(),
            next,
        }
    }

    pub fn next_number(&mut self) -> String {
        let number = format!("FAT-{}-{:03}", self.year_month, self.next);
        self.next += 1;
        number
    }
}

/// Everything emitted for one (client, consultant) group
#[derive(Debug, Clone)]
pub struct ClosureGroup {
    pub invoice: Invoice,
    pub receivable: LedgerEntry,
    pub payable: LedgerEntry,
    pub time_records: Vec<TimeRecordId>,
}

/// The result of a closure run
#[derive(Debug, Clone, Default)]
pub struct ClosureOutcome {
    pub groups: Vec<ClosureGroup>,
}

impl ClosureOutcome {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn total_billed(&self) -> Decimal {
        self.groups
            .iter()
            .map(|g| g.invoice.total_value.amount())
            .sum()
    }
}

/// Runs billing closures over in-memory records
///
/// The repository loads the records, rate table, clients and
/// consultants; the aggregator is pure and deterministic given those
/// inputs and the run date.
pub struct ClosureAggregator<'a> {
    rates: &'a RateTable,
    clients: &'a HashMap<ClientId, Client>,
    consultants: &'a HashMap<ConsultantId, Consultant>,
    revenue_account: Option<ChartAccountId>,
    cost_account: Option<ChartAccountId>,
    payable_term_days: u32,
}

impl<'a> ClosureAggregator<'a> {
    pub fn new(
        rates: &'a RateTable,
        clients: &'a HashMap<ClientId, Client>,
        consultants: &'a HashMap<ConsultantId, Consultant>,
    ) -> Self {
        Self {
            rates,
            clients,
            consultants,
            revenue_account: None,
            cost_account: None,
            payable_term_days: 15,
        }
    }

    /// Classification applied to emitted receivables
    pub fn with_revenue_account(mut self, id: ChartAccountId) -> Self {
        self.revenue_account = Some(id);
        self
    }

    /// Classification applied to emitted payables
    pub fn with_cost_account(mut self, id: ChartAccountId) -> Self {
        self.cost_account = Some(id);
        self
    }

    pub fn with_payable_term_days(mut self, days: u32) -> Self {
        self.payable_term_days = days;
        self
    }

    /// Runs the closure, attaching consumed records to their invoices
    ///
    /// Returns an empty outcome when no record matches the filter.
    pub fn run(
        &self,
        filter: &ClosureFilter,
        records: &mut [TimeRecord],
        sequence: &mut InvoiceNumberSequence,
        today: NaiveDate,
    ) -> Result<ClosureOutcome, BillingError> {
        let selected: Vec<usize> = records
            .iter()
            .enumerate()
            .filter(|(_, r)| filter.selects(r))
            .map(|(i, _)| i)
            .collect();

        if selected.is_empty() {
            return Ok(ClosureOutcome::default());
        }

        let revenue_account = self
            .revenue_account
            .ok_or(BillingError::MissingClassification("revenue"))?;
        let cost_account = self
            .cost_account
            .ok_or(BillingError::MissingClassification("cost"))?;

        // Group by (client, consultant), preserving first-seen order
        let mut groups: Vec<((ClientId, ConsultantId), Vec<usize>)> = Vec::new();
        for index in selected {
            let key = (records[index].client_id, records[index].consultant_id);
            match groups.iter().position(|(k, _)| *k == key) {
                Some(i) => groups[i].1.push(index),
                None => groups.push((key, vec![index])),
            }
        }

        let mut outcome = ClosureOutcome::default();

        for ((client_id, consultant_id), members) in groups {
            let client = self
                .clients
                .get(&client_id)
                .ok_or_else(|| BillingError::UnknownClient(client_id.to_string()))?;
            let consultant = self
                .consultants
                .get(&consultant_id)
                .ok_or_else(|| BillingError::MissingSupplier(consultant_id.to_string()))?;
            let supplier_id = consultant
                .supplier_id
                .ok_or_else(|| BillingError::MissingSupplier(consultant.name.clone()))?;

            let number = sequence.next_number();
            let mut invoice = Invoice::new(number.clone(), client_id, filter.period);
            if let Some(project_id) = filter.project_id {
                invoice = invoice.with_project(project_id);
            }

            for &index in &members {
                let record = &records[index];
                let rate = self.rates.effective_rate(consultant_id, record.start_date)?;
                let description = if record.description.is_empty() {
                    format!("Time record {}", record.start_date)
                } else {
                    record.description.clone()
                };
                invoice.add_item(InvoiceItem::new(
                    consultant_id,
                    description,
                    record.total_hours,
                    rate,
                ));
            }

            let receivable_due = today
                .checked_add_days(Days::new(client.payment_term_days as u64))
                .unwrap_or(today);
            let receivable = LedgerEntry::new(
                EntryKind::Receivable,
                number.clone(),
                format!("Invoice {number} - {}", client.trade_name),
                Counterparty::Client(client_id),
                invoice.total_value,
                today,
                receivable_due,
            )
            .with_invoice(invoice.id)
            .with_chart_account(revenue_account);
            receivable.validate()?;

            let payable_due = today
                .checked_add_days(Days::new(self.payable_term_days as u64))
                .unwrap_or(today);
            let payable = LedgerEntry::new(
                EntryKind::Payable,
                number.clone(),
                format!("Invoice {number} - {}", consultant.name),
                Counterparty::Supplier(supplier_id),
                invoice.total_value,
                today,
                payable_due,
            )
            .with_invoice(invoice.id)
            .with_consultant(consultant_id)
            .with_chart_account(cost_account);
            payable.validate()?;

            let mut consumed = Vec::with_capacity(members.len());
            for &index in &members {
                records[index].attach_to_invoice(invoice.id, number.clone());
                consumed.push(records[index].id);
            }

            tracing::info!(
                invoice = %number,
                client = %client_id,
                consultant = %consultant_id,
                hours = %invoice.total_hours,
                total = %invoice.total_value,
                "billing closure group emitted"
            );

            outcome.groups.push(ClosureGroup {
                invoice,
                receivable,
                payable,
                time_records: consumed,
            });
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_record::TimeRecord;
    use core_kernel::{ActivityId, Money};
    use domain_party::{ConsultantRate, ConsultantType, PartyStatus, Supplier, TaxId};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    struct Fixture {
        rates: RateTable,
        clients: HashMap<ClientId, Client>,
        consultants: HashMap<ConsultantId, Consultant>,
        client_id: ClientId,
        consultant_id: ConsultantId,
        project_id: ProjectId,
    }

    fn fixture() -> Fixture {
        let client = Client::new(
            "Acme Ltda",
            "Acme",
            TaxId::parse("11.222.333/0001-81").unwrap(),
        )
        .with_payment_term(30);
        let supplier = Supplier::new(
            "Dev Servicos ME",
            "Dev Servicos",
            TaxId::parse("11.222.333/0001-81").unwrap(),
        );
        let consultant =
            Consultant::new("Ana Souza", "ana@example.com", ConsultantType::Contractor)
                .with_supplier(supplier.id);

        let mut rates = RateTable::new();
        rates
            .add(ConsultantRate {
                consultant_id: consultant.id,
                effective_from: date(2024, 1, 1),
                hourly_rate: Money::brl(dec!(150.00)),
            })
            .unwrap();

        let client_id = client.id;
        let consultant_id = consultant.id;
        Fixture {
            rates,
            clients: HashMap::from([(client.id, client)]),
            consultants: HashMap::from([(consultant.id, consultant)]),
            client_id,
            consultant_id,
            project_id: ProjectId::new(),
        }
    }

    fn approved_record(f: &Fixture, day: NaiveDate, hours: Decimal) -> TimeRecord {
        let mut record = TimeRecord::daily(
            ActivityId::new(),
            f.project_id,
            f.client_id,
            f.consultant_id,
            day,
            hours,
        );
        record.approve("manager").unwrap();
        record
    }

    #[test]
    fn test_closure_emits_invoice_receivable_and_payable() {
        let f = fixture();
        let mut records = vec![
            approved_record(&f, date(2025, 1, 10), dec!(8)),
            approved_record(&f, date(2025, 1, 11), dec!(4)),
        ];
        let filter = ClosureFilter::for_period(
            Period::new(date(2025, 1, 1), date(2025, 1, 31)).unwrap(),
        );
        let aggregator = ClosureAggregator::new(&f.rates, &f.clients, &f.consultants)
            .with_revenue_account(ChartAccountId::new())
            .with_cost_account(ChartAccountId::new());
        let mut sequence = InvoiceNumberSequence::new(date(2025, 1, 31), 1);

        let outcome = aggregator
            .run(&filter, &mut records, &mut sequence, date(2025, 2, 1))
            .unwrap();

        assert_eq!(outcome.groups.len(), 1);
        let group = &outcome.groups[0];
        assert_eq!(group.invoice.number, "FAT-202501-001");
        assert_eq!(group.invoice.total_hours, dec!(12));
        assert_eq!(group.invoice.total_value.amount(), dec!(1800.00));

        // Receivable finances the invoice against the client
        assert_eq!(group.receivable.amount, group.invoice.total_value);
        assert_eq!(group.receivable.due_date, date(2025, 3, 3));
        assert_eq!(group.receivable.invoice_id, Some(group.invoice.id));

        // Payable goes to the consultant's supplier
        assert_eq!(group.payable.amount, group.invoice.total_value);
        assert_eq!(group.payable.consultant_id, Some(f.consultant_id));

        // Records were consumed
        assert!(records.iter().all(|r| r.invoice_id == Some(group.invoice.id)));
        assert!(records.iter().all(|r| !r.is_billable()));
    }

    #[test]
    fn test_closure_over_empty_period_emits_nothing() {
        let f = fixture();
        let mut records = vec![approved_record(&f, date(2025, 1, 10), dec!(8))];
        // February window does not contain the January record
        let filter = ClosureFilter::for_period(
            Period::new(date(2025, 2, 1), date(2025, 2, 28)).unwrap(),
        );
        let aggregator = ClosureAggregator::new(&f.rates, &f.clients, &f.consultants);
        let mut sequence = InvoiceNumberSequence::new(date(2025, 2, 28), 1);

        let outcome = aggregator
            .run(&filter, &mut records, &mut sequence, date(2025, 3, 1))
            .unwrap();
        assert!(outcome.is_empty());
        assert!(records[0].is_billable());
    }

    #[test]
    fn test_closure_skips_pending_and_billed_records() {
        let f = fixture();
        let pending = TimeRecord::daily(
            ActivityId::new(),
            f.project_id,
            f.client_id,
            f.consultant_id,
            date(2025, 1, 10),
            dec!(8),
        );
        let mut billed = approved_record(&f, date(2025, 1, 11), dec!(8));
        billed.attach_to_invoice(core_kernel::InvoiceId::new(), "FAT-OLD");
        let mut records = vec![pending, billed];

        let filter = ClosureFilter::for_period(
            Period::new(date(2025, 1, 1), date(2025, 1, 31)).unwrap(),
        );
        let aggregator = ClosureAggregator::new(&f.rates, &f.clients, &f.consultants)
            .with_revenue_account(ChartAccountId::new())
            .with_cost_account(ChartAccountId::new());
        let mut sequence = InvoiceNumberSequence::new(date(2025, 1, 31), 1);

        let outcome = aggregator
            .run(&filter, &mut records, &mut sequence, date(2025, 2, 1))
            .unwrap();
        assert!(outcome.is_empty());
    }

    #[test]
    fn test_missing_classification_fails_run() {
        let f = fixture();
        let mut records = vec![approved_record(&f, date(2025, 1, 10), dec!(8))];
        let filter = ClosureFilter::for_period(
            Period::new(date(2025, 1, 1), date(2025, 1, 31)).unwrap(),
        );
        let aggregator = ClosureAggregator::new(&f.rates, &f.clients, &f.consultants)
            .with_cost_account(ChartAccountId::new());
        let mut sequence = InvoiceNumberSequence::new(date(2025, 1, 31), 1);

        let err = aggregator
            .run(&filter, &mut records, &mut sequence, date(2025, 2, 1))
            .unwrap_err();
        assert!(matches!(
            err,
            BillingError::MissingClassification("revenue")
        ));
        // Nothing was consumed
        assert!(records[0].is_billable());
    }

    #[test]
    fn test_missing_rate_fails_run() {
        let mut f = fixture();
        f.rates = RateTable::new();
        let mut records = vec![approved_record(&f, date(2025, 1, 10), dec!(8))];
        let filter = ClosureFilter::for_period(
            Period::new(date(2025, 1, 1), date(2025, 1, 31)).unwrap(),
        );
        let aggregator = ClosureAggregator::new(&f.rates, &f.clients, &f.consultants)
            .with_revenue_account(ChartAccountId::new())
            .with_cost_account(ChartAccountId::new());
        let mut sequence = InvoiceNumberSequence::new(date(2025, 1, 31), 1);

        assert!(matches!(
            aggregator.run(&filter, &mut records, &mut sequence, date(2025, 2, 1)),
            Err(BillingError::Rate(_))
        ));
    }

    #[test]
    fn test_rate_change_mid_period_prices_per_record() {
        let mut f = fixture();
        f.rates
            .add(ConsultantRate {
                consultant_id: f.consultant_id,
                effective_from: date(2025, 1, 15),
                hourly_rate: Money::brl(dec!(200.00)),
            })
            .unwrap();
        let mut records = vec![
            approved_record(&f, date(2025, 1, 10), dec!(10)),
            approved_record(&f, date(2025, 1, 20), dec!(10)),
        ];
        let filter = ClosureFilter::for_period(
            Period::new(date(2025, 1, 1), date(2025, 1, 31)).unwrap(),
        );
        let aggregator = ClosureAggregator::new(&f.rates, &f.clients, &f.consultants)
            .with_revenue_account(ChartAccountId::new())
            .with_cost_account(ChartAccountId::new());
        let mut sequence = InvoiceNumberSequence::new(date(2025, 1, 31), 1);

        let outcome = aggregator
            .run(&filter, &mut records, &mut sequence, date(2025, 2, 1))
            .unwrap();
        // 10h @ 150 + 10h @ 200
        assert_eq!(outcome.groups[0].invoice.total_value.amount(), dec!(3500.00));
    }

    #[test]
    fn test_sequence_formats_numbers() {
        let mut sequence = InvoiceNumberSequence::new(date(2025, 1, 31), 7);
        assert_eq!(sequence.next_number(), "FAT-202501-007");
        assert_eq!(sequence.next_number(), "FAT-202501-008");
    }

    #[test]
    fn test_consultant_status_does_not_block_closure() {
        // Deactivated consultants still get paid for approved work
        let mut f = fixture();
        for consultant in f.consultants.values_mut() {
            consultant.deactivate();
            assert_eq!(consultant.status, PartyStatus::Inactive);
        }
        let mut records = vec![approved_record(&f, date(2025, 1, 10), dec!(8))];
        let filter = ClosureFilter::for_period(
            Period::new(date(2025, 1, 1), date(2025, 1, 31)).unwrap(),
        );
        let aggregator = ClosureAggregator::new(&f.rates, &f.clients, &f.consultants)
            .with_revenue_account(ChartAccountId::new())
            .with_cost_account(ChartAccountId::new());
        let mut sequence = InvoiceNumberSequence::new(date(2025, 1, 31), 1);

        assert!(aggregator
            .run(&filter, &mut records, &mut sequence, date(2025, 2, 1))
            .is_ok());
    }
}
