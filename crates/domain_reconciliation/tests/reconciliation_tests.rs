//! End-to-end reconciliation flow tests
//!
//! Parse an OFX file, import it with deduplication, mirror an entry as
//! a system movement, match, reverse, and match again - all in memory.

use rust_decimal_macros::dec;

use core_kernel::{BankAccountId, ChartAccountId, Currency};
use domain_reconciliation::{
    Direction, Matcher, OfxDocument, ReconciliationError, StatementCandidate, StatementImporter,
    SystemCandidate, SystemItemRef, SystemMovement,
};

const OFX: &str = "\
OFXHEADER:100
DATA:OFXSGML
VERSION:102

<OFX>
<BANKMSGSRSV1><STMTTRNRS><STMTRS>
<CURDEF>BRL
<BANKACCTFROM><BANKID>0341<ACCTID>45678-9</BANKACCTFROM>
<BANKTRANLIST>
<DTSTART>20250101
<DTEND>20250131
<STMTTRN>
<TRNTYPE>CREDIT
<DTPOSTED>20250110
<TRNAMT>1500.00
<FITID>T1
<MEMO>TED ACME
</STMTTRN>
<STMTTRN>
<TRNTYPE>DEBIT
<DTPOSTED>20250115
<TRNAMT>-230.50
<FITID>T2
<MEMO>TARIFA
</STMTTRN>
</BANKTRANLIST>
</STMTRS></STMTTRNRS></BANKMSGSRSV1>
</OFX>
";

fn statement_candidate(
    entry: &domain_reconciliation::StatementEntry,
    matched: bool,
) -> StatementCandidate {
    StatementCandidate {
        entry_id: entry.id,
        bank_account_id: entry.bank_account_id,
        amount: entry.amount.amount(),
        direction: entry.direction,
        matched,
    }
}

fn movement_candidate(movement: &SystemMovement, matched: bool) -> SystemCandidate {
    SystemCandidate {
        reference: SystemItemRef::Movement(movement.id),
        bank_account_id: movement.bank_account_id,
        amount: movement.amount.amount(),
        direction: movement.direction,
        matched,
    }
}

#[test]
fn import_mirror_match_reverse_rematch() {
    let account = BankAccountId::new();
    let document = OfxDocument::parse(OFX).unwrap();
    assert_eq!(document.transactions.len(), 2);

    let mut importer = StatementImporter::new(account, Currency::BRL);
    let outcome = importer.import(&document, "janeiro.ofx").unwrap();
    assert_eq!(outcome.imported, 2);

    // Mirror the bank fee into the ledger with a classification
    let fee_entry = outcome
        .entries
        .iter()
        .find(|e| e.direction == Direction::Debit)
        .unwrap();
    let movement = SystemMovement::from_statement_entry(fee_entry, ChartAccountId::new());
    assert_eq!(movement.amount.amount(), dec!(230.50));

    // Match the mirrored movement against its statement entry
    let reconciliation = Matcher::plan(
        account,
        &[movement_candidate(&movement, false)],
        &[statement_candidate(fee_entry, false)],
    )
    .unwrap();
    assert_eq!(reconciliation.total_system, dec!(-230.50));

    // While matched, neither side is re-matchable
    let err = Matcher::plan(
        account,
        &[movement_candidate(&movement, true)],
        &[statement_candidate(fee_entry, true)],
    )
    .unwrap_err();
    assert!(matches!(err, ReconciliationError::AlreadyMatched(_)));

    // Reversal releases both sides; the same pair matches again
    let released = Matcher::reverse(&reconciliation);
    assert_eq!(released.statement_entries, vec![fee_entry.id]);

    let again = Matcher::plan(
        account,
        &[movement_candidate(&movement, false)],
        &[statement_candidate(fee_entry, false)],
    );
    assert!(again.is_ok());
}

#[test]
fn reimporting_the_same_file_adds_nothing() {
    let account = BankAccountId::new();
    let document = OfxDocument::parse(OFX).unwrap();

    let mut importer = StatementImporter::new(account, Currency::BRL);
    let first = importer.import(&document, "janeiro.ofx").unwrap();
    let second = importer.import(&document, "janeiro.ofx").unwrap();

    assert_eq!(first.imported, 2);
    assert_eq!(second.imported, 0);
    assert_eq!(second.duplicates, 2);
}

#[test]
fn unequal_totals_spec_example_rejected() {
    // System total 150.00 vs statement total 140.00 must be rejected
    let account = BankAccountId::new();
    let movement = SystemMovement::new(
        account,
        chrono::NaiveDate::from_ymd_opt(2025, 1, 20).unwrap(),
        "Deposit",
        core_kernel::Money::brl(dec!(150.00)),
        Direction::Credit,
    );

    let statement = StatementCandidate {
        entry_id: core_kernel::StatementEntryId::new(),
        bank_account_id: account,
        amount: dec!(140.00),
        direction: Direction::Credit,
        matched: false,
    };

    let err = Matcher::plan(account, &[movement_candidate(&movement, false)], &[statement])
        .unwrap_err();
    match err {
        ReconciliationError::UnbalancedMatch { difference, .. } => {
            assert_eq!(difference, dec!(10.00));
        }
        other => panic!("expected UnbalancedMatch, got {other:?}"),
    }
}
