//! Conservation properties of billing closure
//!
//! Whatever the input records, the money emitted by a closure is
//! internally consistent: item totals sum to the invoice total, and the
//! receivable and payable mirror it exactly.

use std::collections::HashMap;

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{ActivityId, ChartAccountId, Money, Period, ProjectId};
use domain_billing::{ClosureAggregator, ClosureFilter, InvoiceNumberSequence, TimeRecord};
use domain_party::{Client, Consultant, ConsultantRate, ConsultantType, RateTable, Supplier, TaxId};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn closure_conserves_money(
        hour_halves in proptest::collection::vec(1u32..40, 1..15),
        rate_cents in 5_000i64..50_000,
    ) {
        let client = Client::new("Acme Ltda", "Acme", TaxId::parse("11.222.333/0001-81").unwrap());
        let supplier = Supplier::new("Dev ME", "Dev", TaxId::parse("11.222.333/0001-81").unwrap());
        let consultant = Consultant::new("Ana", "ana@example.com", ConsultantType::Contractor)
            .with_supplier(supplier.id);

        let mut rates = RateTable::new();
        rates.add(ConsultantRate {
            consultant_id: consultant.id,
            effective_from: date(2024, 1, 1),
            hourly_rate: Money::brl(Decimal::new(rate_cents, 2)),
        }).unwrap();

        let clients = HashMap::from([(client.id, client.clone())]);
        let consultants = HashMap::from([(consultant.id, consultant.clone())]);
        let project = ProjectId::new();

        let mut records: Vec<TimeRecord> = hour_halves
            .iter()
            .map(|halves| {
                // Hours in 0.5 steps, always positive
                let hours = Decimal::new(*halves as i64 * 5, 1);
                let mut record = TimeRecord::daily(
                    ActivityId::new(),
                    project,
                    client.id,
                    consultant.id,
                    date(2025, 1, 10),
                    hours,
                );
                record.approve("manager").unwrap();
                record
            })
            .collect();

        let filter = ClosureFilter::for_period(
            Period::new(date(2025, 1, 1), date(2025, 1, 31)).unwrap(),
        );
        let aggregator = ClosureAggregator::new(&rates, &clients, &consultants)
            .with_revenue_account(ChartAccountId::new())
            .with_cost_account(ChartAccountId::new());
        let mut sequence = InvoiceNumberSequence::new(date(2025, 1, 31), 1);

        let outcome = aggregator
            .run(&filter, &mut records, &mut sequence, date(2025, 2, 1))
            .unwrap();

        prop_assert_eq!(outcome.groups.len(), 1);
        let group = &outcome.groups[0];

        // Item totals sum to the invoice total
        let item_sum: Decimal = group.invoice.items.iter().map(|i| i.total.amount()).sum();
        prop_assert_eq!(item_sum, group.invoice.total_value.amount());

        // Receivable and payable mirror the invoice exactly
        prop_assert_eq!(group.receivable.total_amount().amount(), group.invoice.total_value.amount());
        prop_assert_eq!(group.payable.total_amount().amount(), group.invoice.total_value.amount());

        // Every record was consumed exactly once
        prop_assert_eq!(group.time_records.len(), records.len());
        prop_assert!(records.iter().all(|r| !r.is_billable()));
    }
}

#[test]
fn second_closure_over_same_period_is_empty() {
    let client = Client::new("Acme Ltda", "Acme", TaxId::parse("11.222.333/0001-81").unwrap());
    let supplier = Supplier::new("Dev ME", "Dev", TaxId::parse("11.222.333/0001-81").unwrap());
    let consultant = Consultant::new("Ana", "ana@example.com", ConsultantType::Contractor)
        .with_supplier(supplier.id);

    let mut rates = RateTable::new();
    rates
        .add(ConsultantRate {
            consultant_id: consultant.id,
            effective_from: date(2024, 1, 1),
            hourly_rate: Money::brl(dec!(150.00)),
        })
        .unwrap();

    let clients = HashMap::from([(client.id, client.clone())]);
    let consultants = HashMap::from([(consultant.id, consultant.clone())]);

    let mut record = TimeRecord::daily(
        ActivityId::new(),
        ProjectId::new(),
        client.id,
        consultant.id,
        date(2025, 1, 10),
        dec!(8),
    );
    record.approve("manager").unwrap();
    let mut records = vec![record];

    let filter =
        ClosureFilter::for_period(Period::new(date(2025, 1, 1), date(2025, 1, 31)).unwrap());
    let aggregator = ClosureAggregator::new(&rates, &clients, &consultants)
        .with_revenue_account(ChartAccountId::new())
        .with_cost_account(ChartAccountId::new());
    let mut sequence = InvoiceNumberSequence::new(date(2025, 1, 31), 1);

    let first = aggregator
        .run(&filter, &mut records, &mut sequence, date(2025, 2, 1))
        .unwrap();
    assert_eq!(first.groups.len(), 1);

    let second = aggregator
        .run(&filter, &mut records, &mut sequence, date(2025, 2, 1))
        .unwrap();
    assert!(second.is_empty());
}
