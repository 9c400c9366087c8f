//! Integration Tests for Consulting Finance Core
//!
//! These tests verify cross-domain workflows and end-to-end scenarios
//! that involve multiple crates working together: time approval through
//! billing closure, settlement through invoice status, and statement
//! import through reconciliation.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use core_kernel::{ChartAccountId, Currency, Money};
use test_utils::{
    LedgerEntryBuilder, MoneyFixtures, PartyFixtures, TemporalFixtures, TimeRecordBuilder,
    assert_entry_status, assert_money_eq,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

mod closure_to_settlement_workflow {
    use super::*;
    use domain_billing::{ClosureAggregator, ClosureFilter, InvoiceNumberSequence};
    use domain_ledger::{
        apply_settlements, derive_payment_status, EntryStatus, InvoicePaymentStatus, Settlement,
    };
    use domain_party::{ConsultantRate, RateTable};

    /// A full billing month: record time, approve, close, settle the
    /// receivable, and watch the invoice flip to paid.
    #[test]
    fn test_time_to_paid_invoice() {
        let client = PartyFixtures::client();
        let supplier = PartyFixtures::supplier();
        let consultant = PartyFixtures::contractor(&supplier);

        let mut rates = RateTable::new();
        rates
            .add(ConsultantRate {
                consultant_id: consultant.id,
                effective_from: date(2024, 1, 1),
                hourly_rate: MoneyFixtures::brl_rate(),
            })
            .unwrap();

        let mut records = vec![
            TimeRecordBuilder::new(client.id, consultant.id)
                .on_day(date(2025, 1, 10))
                .with_hours(dec!(8))
                .build(),
            TimeRecordBuilder::new(client.id, consultant.id)
                .on_day(date(2025, 1, 17))
                .with_hours(dec!(6.5))
                .build(),
        ];

        let clients = HashMap::from([(client.id, client.clone())]);
        let consultants = HashMap::from([(consultant.id, consultant.clone())]);
        let aggregator = ClosureAggregator::new(&rates, &clients, &consultants)
            .with_revenue_account(ChartAccountId::new())
            .with_cost_account(ChartAccountId::new());

        let filter = ClosureFilter::for_period(TemporalFixtures::billing_month());
        let mut sequence = InvoiceNumberSequence::new(TemporalFixtures::month_end(), 1);
        let outcome = aggregator
            .run(&filter, &mut records, &mut sequence, date(2025, 2, 1))
            .unwrap();

        assert_eq!(outcome.groups.len(), 1);
        let group = &outcome.groups[0];

        // 14.5h at 180.00
        assert_money_eq(group.invoice.total_value, Money::brl(dec!(2610.00)));
        assert_money_eq(group.receivable.amount, group.invoice.total_value);
        assert_money_eq(group.payable.amount, group.invoice.total_value);

        // Settle the receivable in full
        let mut receivable = group.receivable.clone();
        let settlement = Settlement::new(
            receivable.id,
            core_kernel::BankAccountId::new(),
            date(2025, 2, 20),
            receivable.total_amount(),
        );
        apply_settlements(&mut receivable, &[settlement], date(2025, 2, 20)).unwrap();
        assert_entry_status(&receivable, EntryStatus::Paid);

        // The invoice's payment status follows its receivables
        let derived = derive_payment_status(&[receivable.status]);
        assert_eq!(derived, InvoicePaymentStatus::Paid);
    }

    /// Closing the same period twice bills nothing the second time.
    #[test]
    fn test_closure_idempotent_over_billed_records() {
        let client = PartyFixtures::client();
        let supplier = PartyFixtures::supplier();
        let consultant = PartyFixtures::contractor(&supplier);

        let mut rates = RateTable::new();
        rates
            .add(ConsultantRate {
                consultant_id: consultant.id,
                effective_from: date(2024, 1, 1),
                hourly_rate: MoneyFixtures::brl_rate(),
            })
            .unwrap();

        let mut records = vec![TimeRecordBuilder::new(client.id, consultant.id).build()];
        let clients = HashMap::from([(client.id, client.clone())]);
        let consultants = HashMap::from([(consultant.id, consultant.clone())]);
        let aggregator = ClosureAggregator::new(&rates, &clients, &consultants)
            .with_revenue_account(ChartAccountId::new())
            .with_cost_account(ChartAccountId::new());
        let filter = ClosureFilter::for_period(TemporalFixtures::billing_month());
        let mut sequence = InvoiceNumberSequence::new(TemporalFixtures::month_end(), 1);

        let first = aggregator
            .run(&filter, &mut records, &mut sequence, date(2025, 2, 1))
            .unwrap();
        assert_eq!(first.groups.len(), 1);

        let second = aggregator
            .run(&filter, &mut records, &mut sequence, date(2025, 2, 1))
            .unwrap();
        assert!(second.is_empty());
    }
}

mod statement_to_reconciliation_workflow {
    use super::*;
    use domain_ledger::{apply_settlements, Settlement};
    use domain_reconciliation::{
        Direction, Matcher, OfxDocument, ReconciliationError, StatementCandidate,
        StatementImporter, SystemCandidate, SystemItemRef,
    };

    const OFX: &str = "\
OFXHEADER:100

<OFX><BANKMSGSRSV1><STMTTRNRS><STMTRS>
<CURDEF>BRL
<BANKACCTFROM><BANKID>0341<ACCTID>1234</BANKACCTFROM>
<BANKTRANLIST>
<STMTTRN><TRNTYPE>PIX<DTPOSTED>20250120<TRNAMT>2610.00<FITID>RCV-1</STMTTRN>
</BANKTRANLIST>
</STMTRS></STMTTRNRS></BANKMSGSRSV1></OFX>
";

    /// A settlement reconciles against the statement entry that paid it.
    #[test]
    fn test_settlement_matches_imported_entry() {
        let bank_account = core_kernel::BankAccountId::new();

        // Import the bank statement
        let document = OfxDocument::parse(OFX).unwrap();
        let mut importer = StatementImporter::new(bank_account, Currency::BRL);
        let outcome = importer.import(&document, "fev.ofx").unwrap();
        assert_eq!(outcome.imported, 1);
        let statement_entry = &outcome.entries[0];

        // Settle a receivable for the same amount
        let mut receivable = LedgerEntryBuilder::receivable()
            .with_amount(Money::brl(dec!(2610.00)))
            .build();
        let settlement = Settlement::new(
            receivable.id,
            bank_account,
            date(2025, 1, 20),
            Money::brl(dec!(2610.00)),
        );
        apply_settlements(&mut receivable, std::slice::from_ref(&settlement), date(2025, 1, 20))
            .unwrap();

        // Match: receivable settlements are credits on the bank side
        let system = SystemCandidate {
            reference: SystemItemRef::Settlement(settlement.id),
            bank_account_id: bank_account,
            amount: settlement.amount.amount(),
            direction: Direction::Credit,
            matched: false,
        };
        let statement = StatementCandidate {
            entry_id: statement_entry.id,
            bank_account_id: bank_account,
            amount: statement_entry.amount.amount(),
            direction: statement_entry.direction,
            matched: false,
        };

        let reconciliation = Matcher::plan(bank_account, &[system.clone()], &[statement.clone()])
            .unwrap();
        assert_eq!(reconciliation.total_system, dec!(2610.00));
        assert!(reconciliation.difference.is_zero());

        // Reversal releases both sides for a new match
        let released = Matcher::reverse(&reconciliation);
        assert_eq!(released.statement_entries, vec![statement_entry.id]);
        assert!(Matcher::plan(bank_account, &[system], &[statement]).is_ok());
    }

    /// The statement side must equal the system side to the centavo.
    #[test]
    fn test_partial_amounts_do_not_reconcile() {
        let bank_account = core_kernel::BankAccountId::new();
        let system = SystemCandidate {
            reference: SystemItemRef::Settlement(core_kernel::SettlementId::new()),
            bank_account_id: bank_account,
            amount: dec!(150.00),
            direction: Direction::Credit,
            matched: false,
        };
        let statement = StatementCandidate {
            entry_id: core_kernel::StatementEntryId::new(),
            bank_account_id: bank_account,
            amount: dec!(140.00),
            direction: Direction::Credit,
            matched: false,
        };

        assert!(matches!(
            Matcher::plan(bank_account, &[system], &[statement]),
            Err(ReconciliationError::UnbalancedMatch { .. })
        ));
    }
}

mod ledger_status_workflow {
    use super::*;
    use domain_ledger::EntryStatus;

    /// Status derivation across the entry's whole lifecycle.
    #[test]
    fn test_entry_lifecycle_statuses() {
        let mut entry = LedgerEntryBuilder::payable()
            .with_dates(date(2025, 1, 1), date(2025, 1, 31))
            .build();

        entry.sync_status(date(2025, 1, 15));
        assert_entry_status(&entry, EntryStatus::Open);

        entry.sync_status(date(2025, 2, 5));
        assert_entry_status(&entry, EntryStatus::Overdue);

        entry
            .mark_settled(date(2025, 2, 10), None, date(2025, 2, 10))
            .unwrap();
        assert_entry_status(&entry, EntryStatus::Paid);
    }
}
