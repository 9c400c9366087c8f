//! Statement import and deduplication
//!
//! Importing the same OFX file twice must not duplicate movements, and
//! banks re-send overlapping date ranges routinely. Every statement
//! entry therefore carries a composite signature — posted date, amount,
//! direction, normalized FITID — unique per bank account. The importer
//! silently skips any line whose signature is already known (previously
//! imported, or earlier in the same file) and reports the counts; a
//! duplicate is never an error, and each line is independent, so there
//! is no partial-batch rollback to worry about.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use core_kernel::{BankAccountId, Currency, Money, StatementEntryId, StatementImportId};
use crate::error::ReconciliationError;
use crate::ofx::OfxDocument;

/// Direction of money movement from the account's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Credit,
    Debit,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Credit => "credit",
            Direction::Debit => "debit",
        }
    }

    /// Applies the direction's sign to a magnitude
    pub fn signed(&self, amount: Decimal) -> Decimal {
        match self {
            Direction::Credit => amount,
            Direction::Debit => -amount,
        }
    }
}

/// One import run of an OFX file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementImport {
    pub id: StatementImportId,
    pub bank_account_id: BankAccountId,
    pub original_filename: String,
    /// BANKID / ACCTID as exported by the bank
    pub ofx_bank_id: String,
    pub ofx_account_id: String,
    pub statement_start: Option<NaiveDate>,
    pub statement_end: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// A deduplicated statement line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementEntry {
    pub id: StatementEntryId,
    pub import_id: StatementImportId,
    pub bank_account_id: BankAccountId,
    pub posted_at: NaiveDate,
    /// Magnitude; direction carries the sign
    pub amount: Money,
    pub direction: Direction,
    pub fit_id: String,
    pub trn_type: String,
    pub name: String,
    pub memo: String,
    pub check_number: String,
    pub created_at: DateTime<Utc>,
}

impl StatementEntry {
    /// Signed amount (credits positive, debits negative)
    pub fn signed_amount(&self) -> Decimal {
        self.direction.signed(self.amount.amount())
    }

    pub fn signature(&self) -> EntrySignature {
        EntrySignature::new(self.posted_at, self.amount.amount(), self.direction, &self.fit_id)
    }
}

/// Composite dedup signature, unique per bank account
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntrySignature {
    pub posted_at: NaiveDate,
    pub amount: Decimal,
    pub direction: Direction,
    /// FITID trimmed and uppercased; may be empty
    pub fit_id: String,
}

impl EntrySignature {
    pub fn new(posted_at: NaiveDate, amount: Decimal, direction: Direction, fit_id: &str) -> Self {
        Self {
            posted_at,
            // Normalize so 10.5 and 10.50 collide
            amount: amount.normalize(),
            direction,
            fit_id: fit_id.trim().to_uppercase(),
        }
    }
}

/// Counts and records produced by one import run
#[derive(Debug)]
pub struct ImportOutcome {
    pub import: StatementImport,
    pub entries: Vec<StatementEntry>,
    pub imported: usize,
    pub duplicates: usize,
}

/// Imports parsed OFX documents for one bank account
///
/// Seed the importer with the signatures already stored for the account
/// (the repository supplies them); successive imports through the same
/// importer instance keep extending that set.
#[derive(Debug)]
pub struct StatementImporter {
    bank_account_id: BankAccountId,
    currency: Currency,
    known: HashSet<EntrySignature>,
}

impl StatementImporter {
    pub fn new(bank_account_id: BankAccountId, currency: Currency) -> Self {
        Self {
            bank_account_id,
            currency,
            known: HashSet::new(),
        }
    }

    /// Seeds the signatures of previously imported entries
    pub fn with_known_signatures(mut self, signatures: impl IntoIterator<Item = EntrySignature>) -> Self {
        self.known.extend(signatures);
        self
    }

    /// Imports a parsed document, skipping duplicate lines
    pub fn import(
        &mut self,
        document: &OfxDocument,
        original_filename: impl Into<String>,
    ) -> Result<ImportOutcome, ReconciliationError> {
        let import = StatementImport {
            id: StatementImportId::new_v7(),
            bank_account_id: self.bank_account_id,
            original_filename: original_filename.into(),
            ofx_bank_id: document.bank_id.clone(),
            ofx_account_id: document.account_id.clone(),
            statement_start: document.statement_start,
            statement_end: document.statement_end,
            created_at: Utc::now(),
        };

        let mut entries = Vec::new();
        let mut duplicates = 0usize;

        for txn in &document.transactions {
            let direction = if txn.amount.is_sign_negative() {
                Direction::Debit
            } else {
                Direction::Credit
            };
            let magnitude = txn.amount.abs();
            let signature =
                EntrySignature::new(txn.posted_at, magnitude, direction, &txn.fit_id);

            if self.known.contains(&signature) {
                duplicates += 1;
                continue;
            }
            self.known.insert(signature);

            entries.push(StatementEntry {
                id: StatementEntryId::new_v7(),
                import_id: import.id,
                bank_account_id: self.bank_account_id,
                posted_at: txn.posted_at,
                amount: Money::new(magnitude, self.currency),
                direction,
                fit_id: txn.fit_id.trim().to_string(),
                trn_type: txn.trn_type.clone(),
                name: txn.name.clone(),
                memo: txn.memo.clone(),
                check_number: txn.check_number.clone(),
                created_at: Utc::now(),
            });
        }

        tracing::info!(
            bank_account = %self.bank_account_id,
            imported = entries.len(),
            duplicates,
            "statement import finished"
        );

        Ok(ImportOutcome {
            import,
            imported: entries.len(),
            duplicates,
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ofx::OfxTransaction;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn txn(day: NaiveDate, amount: Decimal, fit_id: &str) -> OfxTransaction {
        OfxTransaction {
            posted_at: day,
            amount,
            fit_id: fit_id.to_string(),
            trn_type: "OTHER".to_string(),
            name: String::new(),
            memo: String::new(),
            check_number: String::new(),
        }
    }

    fn doc(transactions: Vec<OfxTransaction>) -> OfxDocument {
        OfxDocument {
            bank_id: "0341".to_string(),
            account_id: "1234".to_string(),
            currency: "BRL".to_string(),
            statement_start: None,
            statement_end: None,
            transactions,
        }
    }

    #[test]
    fn test_import_splits_direction_and_magnitude() {
        let mut importer = StatementImporter::new(BankAccountId::new(), Currency::BRL);
        let outcome = importer
            .import(
                &doc(vec![
                    txn(date(2025, 1, 10), dec!(1500.00), "A"),
                    txn(date(2025, 1, 15), dec!(-230.50), "B"),
                ]),
                "janeiro.ofx",
            )
            .unwrap();

        assert_eq!(outcome.imported, 2);
        assert_eq!(outcome.entries[0].direction, Direction::Credit);
        assert_eq!(outcome.entries[1].direction, Direction::Debit);
        assert_eq!(outcome.entries[1].amount.amount(), dec!(230.50));
        assert_eq!(outcome.entries[1].signed_amount(), dec!(-230.50));
    }

    #[test]
    fn test_reimport_of_identical_batch_is_idempotent() {
        let mut importer = StatementImporter::new(BankAccountId::new(), Currency::BRL);
        let document = doc(vec![
            txn(date(2025, 1, 10), dec!(100.00), "A"),
            txn(date(2025, 1, 11), dec!(200.00), "B"),
        ]);

        let first = importer.import(&document, "jan.ofx").unwrap();
        assert_eq!(first.imported, 2);
        assert_eq!(first.duplicates, 0);

        let second = importer.import(&document, "jan.ofx").unwrap();
        assert_eq!(second.imported, 0);
        assert_eq!(second.duplicates, 2);
        assert!(second.entries.is_empty());
    }

    #[test]
    fn test_duplicates_within_one_file_are_skipped() {
        let mut importer = StatementImporter::new(BankAccountId::new(), Currency::BRL);
        let document = doc(vec![
            txn(date(2025, 1, 10), dec!(100.00), "A"),
            txn(date(2025, 1, 10), dec!(100.00), "A"),
        ]);

        let outcome = importer.import(&document, "jan.ofx").unwrap();
        assert_eq!(outcome.imported, 1);
        assert_eq!(outcome.duplicates, 1);
    }

    #[test]
    fn test_seeded_signatures_count_as_duplicates() {
        let account = BankAccountId::new();
        let seeded = EntrySignature::new(date(2025, 1, 10), dec!(100.00), Direction::Credit, "a");
        let mut importer =
            StatementImporter::new(account, Currency::BRL).with_known_signatures([seeded]);

        // FITID normalization: "A" matches seeded "a"
        let outcome = importer
            .import(&doc(vec![txn(date(2025, 1, 10), dec!(100.00), "A")]), "x.ofx")
            .unwrap();
        assert_eq!(outcome.imported, 0);
        assert_eq!(outcome.duplicates, 1);
    }

    #[test]
    fn test_same_line_different_fitid_is_not_a_duplicate() {
        let mut importer = StatementImporter::new(BankAccountId::new(), Currency::BRL);
        let document = doc(vec![
            txn(date(2025, 1, 10), dec!(100.00), "A"),
            txn(date(2025, 1, 10), dec!(100.00), "B"),
        ]);

        let outcome = importer.import(&document, "jan.ofx").unwrap();
        assert_eq!(outcome.imported, 2);
    }

    #[test]
    fn test_signature_normalizes_amount_scale() {
        let a = EntrySignature::new(date(2025, 1, 1), dec!(10.5), Direction::Credit, "F");
        let b = EntrySignature::new(date(2025, 1, 1), dec!(10.50), Direction::Credit, "F");
        assert_eq!(a, b);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::ofx::OfxTransaction;
    use proptest::prelude::*;

    fn arb_txn() -> impl Strategy<Value = OfxTransaction> {
        (
            2020i32..2030,
            1u32..13,
            1u32..29,
            -1_000_000i64..1_000_000,
            "[A-Z0-9]{0,8}",
        )
            .prop_map(|(y, m, d, cents, fit)| OfxTransaction {
                posted_at: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
                amount: Decimal::new(cents, 2),
                fit_id: fit,
                trn_type: String::new(),
                name: String::new(),
                memo: String::new(),
                check_number: String::new(),
            })
    }

    proptest! {
        /// Importing any batch twice never produces new entries
        #[test]
        fn reimport_never_creates_entries(txns in proptest::collection::vec(arb_txn(), 0..20)) {
            let mut importer = StatementImporter::new(BankAccountId::new(), Currency::BRL);
            let document = OfxDocument {
                transactions: txns,
                ..OfxDocument::default()
            };

            let first = importer.import(&document, "a.ofx").unwrap();
            let second = importer.import(&document, "a.ofx").unwrap();

            prop_assert_eq!(second.imported, 0);
            prop_assert_eq!(second.duplicates, first.imported + first.duplicates);
        }
    }
}
